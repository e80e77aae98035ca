// handlers/public/auth/mod.rs - Account creation and token acquisition
use serde::Deserialize;

pub mod login;    // POST /api/auth/login - exchange credentials for a JWT
pub mod register; // POST /api/auth/register - create a new account

pub use login::login_post;
pub use register::register_post;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub confirm_password: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}
