// handlers/protected/mod.rs - Handlers behind `jwt_auth_middleware`
//
// Every handler here receives `Extension<AuthUser>` and scopes all store
// access to that caller.
pub mod todos;
