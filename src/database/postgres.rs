use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};

use crate::database::manager::DatabaseError;
use crate::database::models::{NewTodo, NewUser, Todo, TodoPatch, User};
use crate::database::repository::{TodoPage, TodoRepository, UserRepository, TODO_NOT_FOUND};
use crate::database::ObjectId;
use crate::filter::{FilterOrder, TodoFilter, TodoQuery};

const USER_COLUMNS: &str = "id, username, email, password_hash, created_at, updated_at";
const TODO_COLUMNS: &str =
    "id, title, description, status, priority, due_date, owner_id, created_at, updated_at";

/// Idempotent schema setup, run once at startup.
const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id            TEXT PRIMARY KEY,
        username      TEXT NOT NULL UNIQUE,
        email         TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        created_at    TIMESTAMPTZ NOT NULL,
        updated_at    TIMESTAMPTZ NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS todos (
        id          TEXT PRIMARY KEY,
        title       TEXT NOT NULL,
        description TEXT NOT NULL DEFAULT '',
        status      TEXT NOT NULL DEFAULT 'pending'
                    CHECK (status IN ('pending', 'in_progress', 'completed')),
        priority    TEXT NOT NULL DEFAULT 'medium'
                    CHECK (priority IN ('low', 'medium', 'high')),
        due_date    TIMESTAMPTZ,
        owner_id    TEXT NOT NULL REFERENCES users (id) ON DELETE CASCADE,
        created_at  TIMESTAMPTZ NOT NULL,
        updated_at  TIMESTAMPTZ NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS todos_owner_status_idx ON todos (owner_id, status)",
    "CREATE INDEX IF NOT EXISTS todos_owner_priority_idx ON todos (owner_id, priority)",
    "CREATE INDEX IF NOT EXISTS todos_owner_created_at_idx ON todos (owner_id, created_at DESC)",
    "CREATE INDEX IF NOT EXISTS todos_owner_due_date_idx ON todos (owner_id, due_date)",
];

pub async fn ensure_schema(pool: &PgPool) -> Result<(), DatabaseError> {
    for statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }
    Ok(())
}

#[derive(Debug, FromRow)]
struct UserRow {
    id: String,
    username: String,
    email: String,
    password_hash: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
struct TodoRow {
    id: String,
    title: String,
    description: String,
    status: String,
    priority: String,
    due_date: Option<DateTime<Utc>>,
    owner_id: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = DatabaseError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(User {
            id: parse_id(&row.id)?,
            username: row.username,
            email: row.email,
            password_hash: row.password_hash,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

impl TryFrom<TodoRow> for Todo {
    type Error = DatabaseError;

    fn try_from(row: TodoRow) -> Result<Self, Self::Error> {
        Ok(Todo {
            id: parse_id(&row.id)?,
            title: row.title,
            description: row.description,
            status: row
                .status
                .parse()
                .map_err(|e| DatabaseError::QueryError(format!("{}", e)))?,
            priority: row
                .priority
                .parse()
                .map_err(|e| DatabaseError::QueryError(format!("{}", e)))?,
            due_date: row.due_date,
            owner_id: parse_id(&row.owner_id)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn parse_id(value: &str) -> Result<ObjectId, DatabaseError> {
    ObjectId::parse(value).map_err(|e| DatabaseError::QueryError(e.to_string()))
}

/// Map unique-constraint violations to [`DatabaseError::Conflict`].
fn map_unique(err: sqlx::Error, table: &str) -> DatabaseError {
    match err.as_database_error() {
        Some(db_err) if db_err.is_unique_violation() => DatabaseError::Conflict(table.to_string()),
        _ => DatabaseError::Sqlx(err),
    }
}

pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create(&self, user: NewUser) -> Result<User, DatabaseError> {
        let now = Utc::now();
        let sql = format!(
            "INSERT INTO users ({}) VALUES ($1, $2, $3, $4, $5, $5) RETURNING {}",
            USER_COLUMNS, USER_COLUMNS
        );

        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(ObjectId::generate().as_str())
            .bind(&user.username)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(now)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_unique(e, "users"))?;

        row.try_into()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        let sql = format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS);
        sqlx::query_as::<_, UserRow>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?
            .map(User::try_from)
            .transpose()
    }

    async fn find_by_email_or_username(
        &self,
        email: &str,
        username: &str,
    ) -> Result<Option<User>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM users WHERE email = $1 OR username = $2 LIMIT 1",
            USER_COLUMNS
        );
        sqlx::query_as::<_, UserRow>(&sql)
            .bind(email)
            .bind(username)
            .fetch_optional(&self.pool)
            .await?
            .map(User::try_from)
            .transpose()
    }
}

pub struct PgTodoRepository {
    pool: PgPool,
}

impl PgTodoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn push_owner_filter(qb: &mut QueryBuilder<'_, Postgres>, owner: &ObjectId, filter: &TodoFilter) {
    qb.push(" WHERE owner_id = ").push_bind(owner.as_str().to_string());
    if let Some(status) = filter.status {
        qb.push(" AND status = ").push_bind(status.as_str());
    }
    if let Some(priority) = filter.priority {
        qb.push(" AND priority = ").push_bind(priority.as_str());
    }
}

#[async_trait]
impl TodoRepository for PgTodoRepository {
    async fn create(&self, owner: &ObjectId, todo: NewTodo) -> Result<Todo, DatabaseError> {
        let now = Utc::now();
        let sql = format!(
            "INSERT INTO todos ({}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8) RETURNING {}",
            TODO_COLUMNS, TODO_COLUMNS
        );

        let row = sqlx::query_as::<_, TodoRow>(&sql)
            .bind(ObjectId::generate().as_str())
            .bind(&todo.title)
            .bind(&todo.description)
            .bind(todo.status.as_str())
            .bind(todo.priority.as_str())
            .bind(todo.due_date)
            .bind(owner.as_str())
            .bind(now)
            .fetch_one(&self.pool)
            .await?;

        row.try_into()
    }

    async fn list(&self, owner: &ObjectId, query: &TodoQuery) -> Result<TodoPage, DatabaseError> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM todos");
        push_owner_filter(&mut count, owner, &query.filter);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut select = QueryBuilder::<Postgres>::new(format!("SELECT {} FROM todos", TODO_COLUMNS));
        push_owner_filter(&mut select, owner, &query.filter);
        select
            .push(" ")
            .push(FilterOrder::generate(&query.sort))
            .push(" LIMIT ")
            .push_bind(query.limit as i64)
            .push(" OFFSET ")
            .push_bind(query.offset() as i64);

        let rows = select.build_query_as::<TodoRow>().fetch_all(&self.pool).await?;
        let items = rows
            .into_iter()
            .map(Todo::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(TodoPage { items, total: total.max(0) as u64 })
    }

    async fn find(&self, owner: &ObjectId, id: &ObjectId) -> Result<Todo, DatabaseError> {
        let sql = format!("SELECT {} FROM todos WHERE id = $1 AND owner_id = $2", TODO_COLUMNS);
        sqlx::query_as::<_, TodoRow>(&sql)
            .bind(id.as_str())
            .bind(owner.as_str())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(TODO_NOT_FOUND.to_string()))?
            .try_into()
    }

    async fn update(
        &self,
        owner: &ObjectId,
        id: &ObjectId,
        patch: TodoPatch,
    ) -> Result<Todo, DatabaseError> {
        let sql = format!(
            r#"
            UPDATE todos SET
                title       = COALESCE($3, title),
                description = COALESCE($4, description),
                status      = COALESCE($5, status),
                priority    = COALESCE($6, priority),
                due_date    = CASE WHEN $7 THEN $8 ELSE due_date END,
                updated_at  = $9
            WHERE id = $1 AND owner_id = $2
            RETURNING {}
            "#,
            TODO_COLUMNS
        );

        sqlx::query_as::<_, TodoRow>(&sql)
            .bind(id.as_str())
            .bind(owner.as_str())
            .bind(patch.title)
            .bind(patch.description)
            .bind(patch.status.map(|s| s.as_str()))
            .bind(patch.priority.map(|p| p.as_str()))
            .bind(patch.due_date.is_some())
            .bind(patch.due_date.flatten())
            .bind(Utc::now())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(TODO_NOT_FOUND.to_string()))?
            .try_into()
    }

    async fn delete(&self, owner: &ObjectId, id: &ObjectId) -> Result<(), DatabaseError> {
        let result = sqlx::query("DELETE FROM todos WHERE id = $1 AND owner_id = $2")
            .bind(id.as_str())
            .bind(owner.as_str())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(TODO_NOT_FOUND.to_string()));
        }
        Ok(())
    }

    async fn delete_all(&self, owner: &ObjectId) -> Result<u64, DatabaseError> {
        let result = sqlx::query("DELETE FROM todos WHERE owner_id = $1")
            .bind(owner.as_str())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

/// These run against the database named by `DATABASE_URL` and are skipped
/// when it is unset. Every test works under freshly generated users, so they
/// can share one database and run in parallel.
#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use sqlx::postgres::PgPoolOptions;
    use tokio::sync::OnceCell;

    use crate::database::models::{TodoPriority, TodoStatus};
    use crate::filter::{SortDirection, SortField, TodoFilter, TodoSort};

    static SCHEMA_READY: OnceCell<()> = OnceCell::const_new();

    async fn pool() -> Option<PgPool> {
        let Ok(url) = std::env::var("DATABASE_URL") else {
            eprintln!("DATABASE_URL not set; skipping PostgreSQL repository test");
            return None;
        };
        let pool = PgPoolOptions::new().max_connections(2).connect(&url).await.unwrap();
        SCHEMA_READY
            .get_or_try_init(|| ensure_schema(&pool))
            .await
            .unwrap();
        Some(pool)
    }

    fn new_user() -> NewUser {
        let tag = ObjectId::generate();
        NewUser {
            username: format!("user-{}", tag),
            email: format!("{}@example.com", tag),
            password_hash: "hash".to_string(),
        }
    }

    async fn owner(pool: &PgPool) -> ObjectId {
        PgUserRepository::new(pool.clone()).create(new_user()).await.unwrap().id
    }

    fn new_todo(title: &str) -> NewTodo {
        NewTodo {
            title: title.to_string(),
            description: String::new(),
            status: TodoStatus::Pending,
            priority: TodoPriority::Medium,
            due_date: None,
        }
    }

    fn page(page: u32, limit: u32) -> TodoQuery {
        TodoQuery { page, limit, ..Default::default() }
    }

    #[tokio::test]
    async fn duplicate_users_conflict() {
        let Some(pool) = pool().await else { return };
        let repo = PgUserRepository::new(pool);
        let user = new_user();
        let created = repo.create(user.clone()).await.unwrap();

        let same_email = NewUser { username: new_user().username, ..user.clone() };
        assert!(matches!(repo.create(same_email).await, Err(DatabaseError::Conflict(_))));

        let same_name = NewUser { email: new_user().email, ..user.clone() };
        assert!(matches!(repo.create(same_name).await, Err(DatabaseError::Conflict(_))));

        let found = repo.find_by_email(&user.email).await.unwrap().unwrap();
        assert_eq!(found.id, created.id);
        let found = repo
            .find_by_email_or_username("nobody@example.com", &user.username)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, created.id);
        assert!(repo.find_by_email("nobody@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn update_only_touches_present_fields() {
        let Some(pool) = pool().await else { return };
        let alice = owner(&pool).await;
        let repo = PgTodoRepository::new(pool);

        let due = Utc::now() + Duration::days(2);
        let todo = repo
            .create(
                &alice,
                NewTodo {
                    description: "two litres".to_string(),
                    due_date: Some(due),
                    ..new_todo("buy milk")
                },
            )
            .await
            .unwrap();

        let patch = TodoPatch { title: Some("buy oat milk".to_string()), ..Default::default() };
        let updated = repo.update(&alice, &todo.id, patch).await.unwrap();
        assert_eq!(updated.title, "buy oat milk");
        assert_eq!(updated.description, "two litres");
        assert_eq!(updated.status, TodoStatus::Pending);
        assert_eq!(updated.priority, TodoPriority::Medium);
        assert_eq!(updated.due_date, todo.due_date);
        assert!(updated.updated_at >= todo.updated_at);

        let patch = TodoPatch {
            status: Some(TodoStatus::Completed),
            priority: Some(TodoPriority::High),
            ..Default::default()
        };
        let updated = repo.update(&alice, &todo.id, patch).await.unwrap();
        assert_eq!(updated.status, TodoStatus::Completed);
        assert_eq!(updated.priority, TodoPriority::High);
        assert_eq!(updated.due_date, todo.due_date);

        let clear = TodoPatch { due_date: Some(None), ..Default::default() };
        let cleared = repo.update(&alice, &todo.id, clear).await.unwrap();
        assert_eq!(cleared.due_date, None);
        assert_eq!(cleared.title, "buy oat milk");
        assert_eq!(repo.find(&alice, &todo.id).await.unwrap().due_date, None);
    }

    #[tokio::test]
    async fn foreign_records_look_missing() {
        let Some(pool) = pool().await else { return };
        let alice = owner(&pool).await;
        let bob = owner(&pool).await;
        let repo = PgTodoRepository::new(pool);
        let todo = repo.create(&alice, new_todo("secret")).await.unwrap();

        assert!(matches!(repo.find(&bob, &todo.id).await, Err(DatabaseError::NotFound(_))));
        assert!(matches!(
            repo.update(&bob, &todo.id, TodoPatch::default()).await,
            Err(DatabaseError::NotFound(_))
        ));
        assert!(matches!(repo.delete(&bob, &todo.id).await, Err(DatabaseError::NotFound(_))));
        assert_eq!(repo.delete_all(&bob).await.unwrap(), 0);
        assert_eq!(repo.find(&alice, &todo.id).await.unwrap().title, "secret");

        repo.delete(&alice, &todo.id).await.unwrap();
        assert!(matches!(repo.find(&alice, &todo.id).await, Err(DatabaseError::NotFound(_))));
    }

    #[tokio::test]
    async fn list_paginates_filters_and_counts() {
        let Some(pool) = pool().await else { return };
        let alice = owner(&pool).await;
        let bob = owner(&pool).await;
        let repo = PgTodoRepository::new(pool);
        for i in 0..12 {
            let status = if i % 3 == 0 { TodoStatus::Completed } else { TodoStatus::Pending };
            repo.create(&alice, NewTodo { status, ..new_todo(&format!("todo {}", i)) })
                .await
                .unwrap();
        }
        repo.create(&bob, new_todo("not alice's")).await.unwrap();

        let first = repo.list(&alice, &page(1, 5)).await.unwrap();
        assert_eq!(first.items.len(), 5);
        assert_eq!(first.total, 12);
        assert_eq!(repo.list(&alice, &page(3, 5)).await.unwrap().items.len(), 2);
        let beyond = repo.list(&alice, &page(4, 5)).await.unwrap();
        assert!(beyond.items.is_empty());
        assert_eq!(beyond.total, 12);

        let completed = TodoQuery {
            filter: TodoFilter { status: Some(TodoStatus::Completed), priority: None },
            ..page(1, 50)
        };
        let done = repo.list(&alice, &completed).await.unwrap();
        assert_eq!(done.total, 4);
        assert!(done.items.iter().all(|t| t.status == TodoStatus::Completed));

        assert_eq!(repo.delete_all(&alice).await.unwrap(), 12);
        assert_eq!(repo.list(&bob, &TodoQuery::default()).await.unwrap().total, 1);
    }

    #[tokio::test]
    async fn sql_ordering_agrees_with_in_memory_ordering() {
        let Some(pool) = pool().await else { return };
        let alice = owner(&pool).await;
        let repo = PgTodoRepository::new(pool);

        let now = Utc::now();
        let fixtures = [
            (TodoStatus::Pending, TodoPriority::High, Some(now + Duration::days(3))),
            (TodoStatus::Completed, TodoPriority::Low, None),
            (TodoStatus::InProgress, TodoPriority::Medium, Some(now + Duration::days(1))),
            (TodoStatus::Pending, TodoPriority::Low, Some(now + Duration::days(1))),
            (TodoStatus::InProgress, TodoPriority::High, None),
            (TodoStatus::Completed, TodoPriority::Medium, Some(now + Duration::days(7))),
        ];
        let mut created = Vec::new();
        for (i, (status, priority, due_date)) in fixtures.into_iter().enumerate() {
            let todo = NewTodo { status, priority, due_date, ..new_todo(&format!("todo {}", i)) };
            created.push(repo.create(&alice, todo).await.unwrap());
        }

        let fields = [SortField::CreatedAt, SortField::Priority, SortField::Status, SortField::DueDate];
        for field in fields {
            for direction in [SortDirection::Asc, SortDirection::Desc] {
                let sort = TodoSort { field, direction };
                let mut expected = created.clone();
                expected.sort_by(|a, b| FilterOrder::compare(&sort, a, b));

                let listed = repo
                    .list(&alice, &TodoQuery { sort, ..page(1, 50) })
                    .await
                    .unwrap();
                let got: Vec<_> = listed.items.iter().map(|t| t.id.clone()).collect();
                let want: Vec<_> = expected.iter().map(|t| t.id.clone()).collect();
                assert_eq!(got, want, "order differs for {:?}", sort);
            }
        }
    }
}
