use std::fmt;

use chrono::Utc;
use rand::RngCore;
use serde::{Deserialize, Serialize};

const OBJECT_ID_LEN: usize = 24;

/// 24-character lowercase hexadecimal record identifier.
///
/// The first 4 bytes are the big-endian creation time in seconds, the
/// remaining 8 bytes are random.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(String);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid object id: {0}")]
pub struct InvalidObjectId(pub String);

impl ObjectId {
    pub fn generate() -> Self {
        let mut bytes = [0u8; 12];
        let seconds = Utc::now().timestamp() as u32;
        bytes[..4].copy_from_slice(&seconds.to_be_bytes());
        rand::thread_rng().fill_bytes(&mut bytes[4..]);

        Self(bytes.iter().map(|b| format!("{:02x}", b)).collect())
    }

    /// Accepts upper or lower case hex; always stored lowercase.
    pub fn parse(value: &str) -> Result<Self, InvalidObjectId> {
        if value.len() != OBJECT_ID_LEN || !value.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(InvalidObjectId(value.to_string()));
        }
        Ok(Self(value.to_ascii_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for ObjectId {
    type Err = InvalidObjectId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
