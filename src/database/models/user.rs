use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::database::ObjectId;

/// Stored user record. The password hash never leaves the service layer;
/// use [`PublicUser`] for anything serialized outward.
#[derive(Debug, Clone)]
pub struct User {
    pub id: ObjectId,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields required to persist a new user. The email is already lowercased.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublicUser {
    pub id: ObjectId,
    pub username: String,
    pub email: String,
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            username: user.username.clone(),
            email: user.email.clone(),
        }
    }
}
