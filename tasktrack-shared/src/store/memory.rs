/// In-memory store
///
/// Mirrors the PostgreSQL schema's observable behavior (unique users, partial
/// unique default categories, `ON DELETE SET NULL` for task categories, soft
/// deletes, owner-joined categories) behind a single `tokio::sync::RwLock`.
/// Each trait method takes the lock once, so every operation is atomic.
///
/// Used by the test suites and when the API runs without `DATABASE_URL`.
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::{CategoryStore, Store, StoreError, StoreResult, TaskStore, UserStore};
use crate::models::{
    category::{Category, NewCategory},
    task::{Subtask, SubtaskInput, Task, TaskDraft, TaskPriority, TaskStatus},
    user::{NewUser, User},
};
use crate::query::TaskQuery;

#[derive(Debug, Clone)]
struct CategoryRecord {
    category: Category,
    is_default: bool,
}

#[derive(Debug, Clone)]
struct TaskRecord {
    id: i64,
    user_id: i64,
    category_id: Option<i64>,
    title: String,
    description: String,
    status: TaskStatus,
    priority: TaskPriority,
    due_date: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
struct SubtaskRecord {
    subtask: Subtask,
    deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Default)]
struct State {
    users: Vec<User>,
    categories: Vec<CategoryRecord>,
    tasks: Vec<TaskRecord>,
    subtasks: Vec<SubtaskRecord>,
    last_id: i64,
}

impl State {
    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }

    fn user_exists(&self, user_id: i64) -> bool {
        self.users.iter().any(|u| u.id == user_id)
    }

    fn check_category_reference(&self, category_id: Option<i64>) -> StoreResult<()> {
        match category_id {
            Some(id) if !self.categories.iter().any(|c| c.category.id == id) => Err(
                StoreError::Constraint(format!("Category {} does not exist", id)),
            ),
            _ => Ok(()),
        }
    }

    fn check_title(title: &str) -> StoreResult<()> {
        if title.trim().is_empty() {
            return Err(StoreError::Constraint("Task title cannot be blank".to_string()));
        }
        Ok(())
    }

    fn live_task(&self, user_id: i64, task_id: i64) -> Option<usize> {
        self.tasks
            .iter()
            .position(|t| t.id == task_id && t.user_id == user_id && t.deleted_at.is_none())
    }

    fn materialize(&self, record: &TaskRecord) -> Task {
        let category = record.category_id.and_then(|id| {
            self.categories
                .iter()
                .find(|c| c.category.id == id && c.category.user_id == record.user_id)
                .map(|c| c.category.clone())
        });

        let mut subtasks: Vec<Subtask> = self
            .subtasks
            .iter()
            .filter(|s| s.subtask.task_id == record.id && s.deleted_at.is_none())
            .map(|s| s.subtask.clone())
            .collect();
        subtasks.sort_by_key(|s| s.id);

        Task {
            id: record.id,
            user_id: record.user_id,
            category_id: record.category_id,
            category,
            title: record.title.clone(),
            description: record.description.clone(),
            status: record.status,
            priority: record.priority,
            due_date: record.due_date,
            subtasks,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }

    fn live_tasks_of(&self, user_id: i64) -> Vec<Task> {
        let mut tasks: Vec<Task> = self
            .tasks
            .iter()
            .filter(|t| t.user_id == user_id && t.deleted_at.is_none())
            .map(|t| self.materialize(t))
            .collect();
        tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        tasks
    }

    fn insert_subtask(&mut self, task_id: i64, input: &SubtaskInput, now: DateTime<Utc>) {
        let id = self.next_id();
        self.subtasks.push(SubtaskRecord {
            subtask: Subtask {
                id,
                task_id,
                title: input.title.clone(),
                is_completed: input.is_completed,
                created_at: now,
                updated_at: now,
            },
            deleted_at: None,
        });
    }

    /// Applies the desired subtask set: update listed ids, insert the rest,
    /// soft-delete whatever is no longer listed
    fn replace_subtasks(&mut self, task_id: i64, inputs: &[SubtaskInput], now: DateTime<Utc>) {
        let mut kept = Vec::with_capacity(inputs.len());

        for input in inputs {
            let existing = input.id.and_then(|id| {
                self.subtasks.iter().position(|s| {
                    s.subtask.id == id && s.subtask.task_id == task_id && s.deleted_at.is_none()
                })
            });

            match existing {
                Some(index) => {
                    let record = &mut self.subtasks[index].subtask;
                    record.title = input.title.clone();
                    record.is_completed = input.is_completed;
                    record.updated_at = now;
                    kept.push(record.id);
                }
                None => {
                    self.insert_subtask(task_id, input, now);
                    kept.push(self.last_id);
                }
            }
        }

        for record in self
            .subtasks
            .iter_mut()
            .filter(|s| s.subtask.task_id == task_id && s.deleted_at.is_none())
        {
            if !kept.contains(&record.subtask.id) {
                record.deleted_at = Some(now);
            }
        }
    }
}

/// Thread-safe in-memory implementation of [`Store`]
///
/// Cloning shares the underlying data.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<RwLock<State>>,
}

impl MemoryStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn insert_user(&self, new_user: NewUser) -> StoreResult<User> {
        let mut state = self.state.write().await;

        if state
            .users
            .iter()
            .any(|u| u.email == new_user.email || u.username == new_user.username)
        {
            return Err(StoreError::Conflict("User already exists".to_string()));
        }

        let now = Utc::now();
        let user = User {
            id: state.next_id(),
            username: new_user.username,
            email: new_user.email,
            password_hash: new_user.password_hash,
            created_at: now,
            updated_at: now,
        };
        state.users.push(user.clone());

        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let state = self.state.read().await;
        Ok(state.users.iter().find(|u| u.email == email).cloned())
    }
}

#[async_trait]
impl CategoryStore for MemoryStore {
    async fn list_categories(&self, user_id: i64) -> StoreResult<Vec<Category>> {
        let state = self.state.read().await;
        Ok(state
            .categories
            .iter()
            .filter(|c| c.category.user_id == user_id)
            .map(|c| c.category.clone())
            .collect())
    }

    async fn seed_categories(&self, user_id: i64, defaults: &[NewCategory]) -> StoreResult<()> {
        let mut state = self.state.write().await;

        if !state.user_exists(user_id) {
            return Err(StoreError::Constraint(format!("User {} does not exist", user_id)));
        }

        for default in defaults {
            let present = state.categories.iter().any(|c| {
                c.is_default && c.category.user_id == user_id && c.category.name == default.name
            });
            if present {
                continue;
            }

            let id = state.next_id();
            state.categories.push(CategoryRecord {
                category: Category {
                    id,
                    user_id,
                    name: default.name.clone(),
                    color: default.color.clone(),
                },
                is_default: true,
            });
        }

        Ok(())
    }

    async fn insert_category(&self, user_id: i64, category: NewCategory) -> StoreResult<Category> {
        let mut state = self.state.write().await;

        if !state.user_exists(user_id) {
            return Err(StoreError::Constraint(format!("User {} does not exist", user_id)));
        }

        let category = Category {
            id: state.next_id(),
            user_id,
            name: category.name,
            color: category.color,
        };
        state.categories.push(CategoryRecord {
            category: category.clone(),
            is_default: false,
        });

        Ok(category)
    }

    async fn delete_category(&self, user_id: i64, category_id: i64) -> StoreResult<bool> {
        let mut state = self.state.write().await;

        let before = state.categories.len();
        state
            .categories
            .retain(|c| !(c.category.id == category_id && c.category.user_id == user_id));
        if state.categories.len() == before {
            return Ok(false);
        }

        for task in state
            .tasks
            .iter_mut()
            .filter(|t| t.category_id == Some(category_id))
        {
            task.category_id = None;
        }

        Ok(true)
    }
}

#[async_trait]
impl TaskStore for MemoryStore {
    async fn list_tasks(&self, user_id: i64, query: &TaskQuery) -> StoreResult<Vec<Task>> {
        let state = self.state.read().await;

        let offset = usize::try_from(query.page.offset()).unwrap_or(usize::MAX);
        let limit = usize::try_from(query.page.limit()).unwrap_or(0);

        Ok(state
            .live_tasks_of(user_id)
            .into_iter()
            .filter(|t| query.matches(t))
            .skip(offset)
            .take(limit)
            .collect())
    }

    async fn all_tasks(&self, user_id: i64) -> StoreResult<Vec<Task>> {
        let state = self.state.read().await;
        Ok(state.live_tasks_of(user_id))
    }

    async fn find_task(&self, user_id: i64, task_id: i64) -> StoreResult<Option<Task>> {
        let state = self.state.read().await;
        Ok(state
            .live_task(user_id, task_id)
            .map(|index| state.materialize(&state.tasks[index])))
    }

    async fn insert_task(&self, user_id: i64, draft: TaskDraft) -> StoreResult<Task> {
        let mut state = self.state.write().await;

        if !state.user_exists(user_id) {
            return Err(StoreError::Constraint(format!("User {} does not exist", user_id)));
        }
        State::check_title(&draft.title)?;
        state.check_category_reference(draft.category_id)?;

        let now = Utc::now();
        let id = state.next_id();
        state.tasks.push(TaskRecord {
            id,
            user_id,
            category_id: draft.category_id,
            title: draft.title,
            description: draft.description,
            status: draft.status,
            priority: draft.priority,
            due_date: draft.due_date,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        });

        for input in draft.subtasks.iter().flatten() {
            state.insert_subtask(id, input, now);
        }

        let record = state.tasks.last().cloned().ok_or_else(|| {
            StoreError::Database("Inserted task disappeared".to_string())
        })?;
        Ok(state.materialize(&record))
    }

    async fn replace_task(
        &self,
        user_id: i64,
        task_id: i64,
        draft: TaskDraft,
    ) -> StoreResult<Option<Task>> {
        let mut state = self.state.write().await;

        let Some(index) = state.live_task(user_id, task_id) else {
            return Ok(None);
        };
        State::check_title(&draft.title)?;
        state.check_category_reference(draft.category_id)?;

        let now = Utc::now();
        {
            let record = &mut state.tasks[index];
            record.category_id = draft.category_id;
            record.title = draft.title;
            record.description = draft.description;
            record.status = draft.status;
            record.priority = draft.priority;
            record.due_date = draft.due_date;
            record.updated_at = now;
        }
        if let Some(inputs) = &draft.subtasks {
            state.replace_subtasks(task_id, inputs, now);
        }

        let record = state.tasks[index].clone();
        Ok(Some(state.materialize(&record)))
    }

    async fn soft_delete_task(&self, user_id: i64, task_id: i64) -> StoreResult<bool> {
        let mut state = self.state.write().await;

        match state.live_task(user_id, task_id) {
            Some(index) => {
                state.tasks[index].deleted_at = Some(Utc::now());
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}
