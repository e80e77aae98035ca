use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::database::manager::DatabaseError;
use crate::database::models::{NewTodo, NewUser, Todo, TodoPatch, User};
use crate::database::repository::{TodoPage, TodoRepository, UserRepository, TODO_NOT_FOUND};
use crate::database::ObjectId;
use crate::filter::{FilterOrder, FilterWhere, TodoQuery};

/// In-process user store. Uniqueness is checked under the write lock so
/// concurrent registrations cannot both succeed.
#[derive(Default)]
pub struct MemoryUserRepository {
    users: RwLock<HashMap<ObjectId, User>>,
}

#[derive(Default)]
pub struct MemoryTodoRepository {
    todos: RwLock<HashMap<ObjectId, Todo>>,
}

impl MemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MemoryTodoRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn create(&self, user: NewUser) -> Result<User, DatabaseError> {
        let mut users = self.users.write().await;

        if users
            .values()
            .any(|u| u.email == user.email || u.username == user.username)
        {
            return Err(DatabaseError::Conflict("users".to_string()));
        }

        let now = Utc::now();
        let record = User {
            id: ObjectId::generate(),
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            created_at: now,
            updated_at: now,
        };
        users.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_email_or_username(
        &self,
        email: &str,
        username: &str,
    ) -> Result<Option<User>, DatabaseError> {
        let users = self.users.read().await;
        Ok(users
            .values()
            .find(|u| u.email == email || u.username == username)
            .cloned())
    }
}

#[async_trait]
impl TodoRepository for MemoryTodoRepository {
    async fn create(&self, owner: &ObjectId, todo: NewTodo) -> Result<Todo, DatabaseError> {
        let now = Utc::now();
        let record = Todo {
            id: ObjectId::generate(),
            title: todo.title,
            description: todo.description,
            status: todo.status,
            priority: todo.priority,
            due_date: todo.due_date,
            owner_id: owner.clone(),
            created_at: now,
            updated_at: now,
        };

        self.todos.write().await.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    async fn list(&self, owner: &ObjectId, query: &TodoQuery) -> Result<TodoPage, DatabaseError> {
        let mut matching: Vec<Todo> = {
            let todos = self.todos.read().await;
            todos
                .values()
                .filter(|t| &t.owner_id == owner && FilterWhere::matches(&query.filter, t))
                .cloned()
                .collect()
        };

        matching.sort_by(|a, b| FilterOrder::compare(&query.sort, a, b));

        let total = matching.len() as u64;
        let items = matching
            .into_iter()
            .skip(query.offset() as usize)
            .take(query.limit as usize)
            .collect();

        Ok(TodoPage { items, total })
    }

    async fn find(&self, owner: &ObjectId, id: &ObjectId) -> Result<Todo, DatabaseError> {
        let todos = self.todos.read().await;
        todos
            .get(id)
            .filter(|t| &t.owner_id == owner)
            .cloned()
            .ok_or_else(|| DatabaseError::NotFound(TODO_NOT_FOUND.to_string()))
    }

    async fn update(
        &self,
        owner: &ObjectId,
        id: &ObjectId,
        patch: TodoPatch,
    ) -> Result<Todo, DatabaseError> {
        let mut todos = self.todos.write().await;
        let todo = todos
            .get_mut(id)
            .filter(|t| &t.owner_id == owner)
            .ok_or_else(|| DatabaseError::NotFound(TODO_NOT_FOUND.to_string()))?;

        todo.apply(&patch, Utc::now());
        Ok(todo.clone())
    }

    async fn delete(&self, owner: &ObjectId, id: &ObjectId) -> Result<(), DatabaseError> {
        let mut todos = self.todos.write().await;
        match todos.get(id) {
            Some(t) if &t.owner_id == owner => {
                todos.remove(id);
                Ok(())
            }
            _ => Err(DatabaseError::NotFound(TODO_NOT_FOUND.to_string())),
        }
    }

    async fn delete_all(&self, owner: &ObjectId) -> Result<u64, DatabaseError> {
        let mut todos = self.todos.write().await;
        let before = todos.len();
        todos.retain(|_, t| &t.owner_id != owner);
        Ok((before - todos.len()) as u64)
    }
}
