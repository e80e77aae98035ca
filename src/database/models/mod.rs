pub mod todo;
pub mod user;

pub use todo::{NewTodo, Todo, TodoPatch, TodoPriority, TodoStatus};
pub use user::{NewUser, PublicUser, User};
