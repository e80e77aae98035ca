// handlers/mod.rs - Handler tiers
//
// Public (no auth) -> Protected (bearer JWT required, /api/todos/*)
pub mod protected;
pub mod public;
