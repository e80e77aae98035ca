pub mod extract;
pub mod format;

pub use extract::{parse_todo_id, ApiJson, ApiPath, ApiQuery};
pub use format::TodoView;
