/// Persistence abstraction
///
/// The services talk to storage only through the traits in this module. Every
/// category and task method takes the owning `user_id` and implementations must
/// put it in the same statement as the read or write, so a row owned by another
/// user is unreachable rather than filtered after the fact.
///
/// # Implementations
///
/// - [`postgres::PgStore`]: PostgreSQL via sqlx
/// - [`memory::MemoryStore`]: in-process store for tests and local development
///
/// # Example
///
/// ```
/// use tasktrack_shared::store::{memory::MemoryStore, SharedStore, CategoryStore};
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), tasktrack_shared::store::StoreError> {
/// let store: SharedStore = Arc::new(MemoryStore::new());
/// let categories = store.list_categories(1).await?;
/// assert!(categories.is_empty());
/// # Ok(())
/// # }
/// ```
use std::sync::Arc;

use async_trait::async_trait;

use crate::models::{
    category::{Category, NewCategory},
    task::{Task, TaskDraft},
    user::{NewUser, User},
};
use crate::query::TaskQuery;

pub mod memory;
pub mod postgres;

/// Store operation error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// Unique constraint violation
    #[error("{0}")]
    Conflict(String),

    /// Not-null, check, or foreign key violation
    #[error("{0}")]
    Constraint(String),

    /// Connection or query failure
    #[error("Database error: {0}")]
    Database(String),
}

/// Result alias for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// User records
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Inserts a user, failing with `Conflict` on a duplicate email or username
    async fn insert_user(&self, new_user: NewUser) -> StoreResult<User>;

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;
}

/// Per-user categories
#[async_trait]
pub trait CategoryStore: Send + Sync {
    /// Lists a user's categories in creation order
    async fn list_categories(&self, user_id: i64) -> StoreResult<Vec<Category>>;

    /// Inserts default categories, skipping any default name the user already has
    async fn seed_categories(&self, user_id: i64, defaults: &[NewCategory]) -> StoreResult<()>;

    async fn insert_category(&self, user_id: i64, category: NewCategory) -> StoreResult<Category>;

    /// Deletes a category; tasks referencing it keep existing with no category
    ///
    /// Returns false when no category with that id is owned by the user.
    async fn delete_category(&self, user_id: i64, category_id: i64) -> StoreResult<bool>;
}

/// Per-user tasks with their subtasks
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Runs a filtered, paginated listing, newest first
    async fn list_tasks(&self, user_id: i64, query: &TaskQuery) -> StoreResult<Vec<Task>>;

    /// Every live task of the user, unpaginated
    async fn all_tasks(&self, user_id: i64) -> StoreResult<Vec<Task>>;

    async fn find_task(&self, user_id: i64, task_id: i64) -> StoreResult<Option<Task>>;

    async fn insert_task(&self, user_id: i64, draft: TaskDraft) -> StoreResult<Task>;

    /// Overwrites a task and replaces its subtask set in one atomic unit
    ///
    /// Returns `None` (and changes nothing) if the task is missing, deleted, or
    /// owned by another user.
    async fn replace_task(
        &self,
        user_id: i64,
        task_id: i64,
        draft: TaskDraft,
    ) -> StoreResult<Option<Task>>;

    /// Marks a task deleted; returns false if nothing owned by the user matched
    async fn soft_delete_task(&self, user_id: i64, task_id: i64) -> StoreResult<bool>;
}

/// Complete backing store
#[async_trait]
pub trait Store: UserStore + CategoryStore + TaskStore {
    /// Verifies the store is reachable
    async fn ping(&self) -> StoreResult<()>;
}

/// Store handle shared across requests
pub type SharedStore = Arc<dyn Store>;
