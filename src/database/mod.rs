pub mod manager;
pub mod memory;
pub mod models;
pub mod object_id;
pub mod postgres;
pub mod repository;

pub use manager::{DatabaseError, DatabaseManager};
pub use object_id::{InvalidObjectId, ObjectId};
pub use repository::{TodoPage, TodoRepository, UserRepository};
