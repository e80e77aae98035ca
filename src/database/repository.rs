use async_trait::async_trait;

use crate::database::manager::DatabaseError;
use crate::database::models::{NewTodo, NewUser, Todo, TodoPatch, User};
use crate::database::ObjectId;
use crate::filter::TodoQuery;

pub const TODO_NOT_FOUND: &str = "Todo not found";

/// One page of todos plus the pre-pagination match count.
#[derive(Debug, Clone)]
pub struct TodoPage {
    pub items: Vec<Todo>,
    pub total: u64,
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fails with [`DatabaseError::Conflict`] when the email or username is taken.
    async fn create(&self, user: NewUser) -> Result<User, DatabaseError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError>;

    async fn find_by_email_or_username(
        &self,
        email: &str,
        username: &str,
    ) -> Result<Option<User>, DatabaseError>;
}

/// Every operation is scoped by owner. A record owned by someone else is
/// reported exactly like a missing one.
#[async_trait]
pub trait TodoRepository: Send + Sync {
    async fn create(&self, owner: &ObjectId, todo: NewTodo) -> Result<Todo, DatabaseError>;

    async fn list(&self, owner: &ObjectId, query: &TodoQuery) -> Result<TodoPage, DatabaseError>;

    async fn find(&self, owner: &ObjectId, id: &ObjectId) -> Result<Todo, DatabaseError>;

    async fn update(
        &self,
        owner: &ObjectId,
        id: &ObjectId,
        patch: TodoPatch,
    ) -> Result<Todo, DatabaseError>;

    async fn delete(&self, owner: &ObjectId, id: &ObjectId) -> Result<(), DatabaseError>;

    /// Returns the number of removed records; zero is not an error.
    async fn delete_all(&self, owner: &ObjectId) -> Result<u64, DatabaseError>;
}
