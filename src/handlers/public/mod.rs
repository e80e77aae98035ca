// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Token acquisition and liveness. These handlers receive no caller identity
// and validate every input themselves.
pub mod auth;
pub mod health;
