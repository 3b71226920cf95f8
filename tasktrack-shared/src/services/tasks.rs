/// Task operations
///
/// Reads and writes are always scoped by the caller's user id. A task that
/// does not exist and a task owned by someone else produce the same
/// `NotFound("Task")`.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use tasktrack_shared::models::task::TaskPayload;
/// use tasktrack_shared::models::user::NewUser;
/// use tasktrack_shared::query::ListTasksParams;
/// use tasktrack_shared::services::TaskService;
/// use tasktrack_shared::store::{memory::MemoryStore, UserStore};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = MemoryStore::new();
/// let user = store
///     .insert_user(NewUser {
///         username: "ada".to_string(),
///         email: "ada@example.com".to_string(),
///         password_hash: "$argon2id$...".to_string(),
///     })
///     .await?;
///
/// let tasks = TaskService::new(Arc::new(store));
/// tasks
///     .create_task(user.id, TaskPayload {
///         title: Some("Write report".to_string()),
///         ..Default::default()
///     })
///     .await?;
///
/// let page = tasks.list_tasks(user.id, &ListTasksParams::default()).await?;
/// assert_eq!(page.len(), 1);
/// # Ok(())
/// # }
/// ```
use tracing::debug;

use crate::error::{ServiceError, ServiceResult};
use crate::models::task::{Task, TaskDraft, TaskPayload};
use crate::query::{ListTasksParams, TaskQuery};
use crate::store::SharedStore;

#[derive(Clone)]
pub struct TaskService {
    store: SharedStore,
}

impl TaskService {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// Filtered, paginated listing, newest first
    ///
    /// # Errors
    ///
    /// Returns `Validation` for a non-numeric `category_id`.
    pub async fn list_tasks(
        &self,
        user_id: i64,
        params: &ListTasksParams,
    ) -> ServiceResult<Vec<Task>> {
        let query = TaskQuery::from_params(params)?;
        debug!(
            user_id,
            filters = query.filters.len(),
            page = query.page.number,
            limit = query.page.size,
            "Listing tasks"
        );

        Ok(self.store.list_tasks(user_id, &query).await?)
    }

    pub async fn get_task(&self, user_id: i64, task_id: i64) -> ServiceResult<Task> {
        self.store
            .find_task(user_id, task_id)
            .await?
            .ok_or(ServiceError::NotFound("Task"))
    }

    /// Creates a task owned by the caller
    ///
    /// # Errors
    ///
    /// Returns `Validation` for a missing title or a category the caller does
    /// not own.
    pub async fn create_task(&self, user_id: i64, payload: TaskPayload) -> ServiceResult<Task> {
        let draft = TaskDraft::for_create(payload).map_err(ServiceError::Validation)?;
        self.check_category(user_id, draft.category_id).await?;

        let task = self.store.insert_task(user_id, draft).await?;
        debug!(user_id, task_id = task.id, "Task created");
        Ok(task)
    }

    /// Applies present payload fields and replaces the subtask set atomically
    ///
    /// # Errors
    ///
    /// - `NotFound` if the task is missing, deleted, or not owned by the caller
    /// - `Validation` for a blank title, a foreign category, or a store
    ///   constraint violation
    pub async fn update_task(
        &self,
        user_id: i64,
        task_id: i64,
        payload: TaskPayload,
    ) -> ServiceResult<Task> {
        let current = self.get_task(user_id, task_id).await?;
        let draft = TaskDraft::for_update(&current, payload).map_err(ServiceError::Validation)?;
        self.check_category(user_id, draft.category_id).await?;

        let task = self
            .store
            .replace_task(user_id, task_id, draft)
            .await?
            .ok_or(ServiceError::NotFound("Task"))?;

        debug!(user_id, task_id, "Task updated");
        Ok(task)
    }

    /// Soft-deletes a task
    pub async fn delete_task(&self, user_id: i64, task_id: i64) -> ServiceResult<()> {
        if !self.store.soft_delete_task(user_id, task_id).await? {
            return Err(ServiceError::NotFound("Task"));
        }

        debug!(user_id, task_id, "Task deleted");
        Ok(())
    }

    async fn check_category(&self, user_id: i64, category_id: Option<i64>) -> ServiceResult<()> {
        let Some(category_id) = category_id else {
            return Ok(());
        };

        let owned = self
            .store
            .list_categories(user_id)
            .await?
            .iter()
            .any(|c| c.id == category_id);

        if owned {
            Ok(())
        } else {
            Err(ServiceError::validation(format!(
                "Category {} does not exist",
                category_id
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::models::category::NewCategory;
    use crate::models::task::{SubtaskInput, TaskPriority, TaskStatus};
    use crate::models::user::NewUser;
    use crate::store::memory::MemoryStore;
    use crate::store::{CategoryStore, UserStore};

    struct Fixture {
        service: TaskService,
        store: MemoryStore,
        alice: i64,
        bob: i64,
    }

    async fn fixture() -> Fixture {
        let store = MemoryStore::new();
        let mut ids = Vec::new();
        for name in ["alice", "bob"] {
            let user = store
                .insert_user(NewUser {
                    username: name.to_string(),
                    email: format!("{}@example.com", name),
                    password_hash: "hash".to_string(),
                })
                .await
                .unwrap();
            ids.push(user.id);
        }

        Fixture {
            service: TaskService::new(Arc::new(store.clone())),
            store,
            alice: ids[0],
            bob: ids[1],
        }
    }

    fn payload(title: &str) -> TaskPayload {
        TaskPayload {
            title: Some(title.to_string()),
            ..Default::default()
        }
    }

    fn params(pairs: &[(&str, &str)]) -> ListTasksParams {
        let value = |key: &str| {
            pairs
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.to_string())
        };
        ListTasksParams {
            page: value("page"),
            limit: value("limit"),
            search: value("search"),
            status: value("status"),
            category_id: value("category_id"),
        }
    }

    #[tokio::test]
    async fn test_create_applies_defaults() {
        let f = fixture().await;
        let task = f.service.create_task(f.alice, payload("Buy milk")).await.unwrap();

        assert_eq!(task.user_id, f.alice);
        assert_eq!(task.status, TaskStatus::Pending);
        assert_eq!(task.priority, TaskPriority::Medium);
    }

    #[tokio::test]
    async fn test_create_requires_title() {
        let f = fixture().await;
        let result = f.service.create_task(f.alice, TaskPayload::default()).await;
        assert!(matches!(result, Err(ServiceError::Validation(_))));
    }

    #[tokio::test]
    async fn test_create_rejects_foreign_category() {
        let f = fixture().await;
        let bobs = f
            .store
            .insert_category(f.bob, NewCategory::new("Bob only", "red"))
            .await
            .unwrap();

        let result = f
            .service
            .create_task(
                f.alice,
                TaskPayload {
                    category_id: Some(Some(bobs.id)),
                    ..payload("Sneaky")
                },
            )
            .await;
        assert!(matches!(result, Err(ServiceError::Validation(_))));
    }

    #[tokio::test]
    async fn test_listing_never_crosses_users() {
        let f = fixture().await;
        for i in 0..5 {
            f.service.create_task(f.alice, payload(&format!("a{}", i))).await.unwrap();
            f.service.create_task(f.bob, payload(&format!("b{}", i))).await.unwrap();
        }

        let tasks = f
            .service
            .list_tasks(f.alice, &params(&[("page", "1"), ("limit", "10"), ("status", "all")]))
            .await
            .unwrap();

        assert_eq!(tasks.len(), 5);
        assert!(tasks.iter().all(|t| t.user_id == f.alice));
    }

    #[tokio::test]
    async fn test_listing_combines_filters() {
        let f = fixture().await;
        let work = f
            .store
            .insert_category(f.alice, NewCategory::new("Work", "blue"))
            .await
            .unwrap();

        f.service
            .create_task(
                f.alice,
                TaskPayload {
                    category_id: Some(Some(work.id)),
                    status: Some(TaskStatus::Completed),
                    ..payload("Quarterly Report")
                },
            )
            .await
            .unwrap();
        f.service
            .create_task(
                f.alice,
                TaskPayload {
                    category_id: Some(Some(work.id)),
                    ..payload("Report draft")
                },
            )
            .await
            .unwrap();
        f.service.create_task(f.alice, payload("Groceries")).await.unwrap();

        let category = work.id.to_string();
        let tasks = f
            .service
            .list_tasks(
                f.alice,
                &params(&[
                    ("search", "report"),
                    ("status", "completed"),
                    ("category_id", category.as_str()),
                ]),
            )
            .await
            .unwrap();

        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].title, "Quarterly Report");
        assert_eq!(tasks[0].category.as_ref().map(|c| c.id), Some(work.id));
    }

    #[tokio::test]
    async fn test_listing_paginates() {
        let f = fixture().await;
        for i in 0..12 {
            f.service.create_task(f.alice, payload(&format!("t{}", i))).await.unwrap();
        }

        let first = f.service.list_tasks(f.alice, &params(&[])).await.unwrap();
        let second = f
            .service
            .list_tasks(f.alice, &params(&[("page", "2")]))
            .await
            .unwrap();

        assert_eq!(first.len(), 10);
        assert_eq!(first[0].title, "t11");
        assert_eq!(second.len(), 2);
        assert_eq!(second[1].title, "t0");
    }

    #[tokio::test]
    async fn test_listing_rejects_non_numeric_category() {
        let f = fixture().await;
        let result = f
            .service
            .list_tasks(f.alice, &params(&[("category_id", "work")]))
            .await;
        assert!(matches!(result, Err(ServiceError::Validation(_))));
    }

    #[tokio::test]
    async fn test_get_foreign_task_is_not_found() {
        let f = fixture().await;
        let task = f.service.create_task(f.alice, payload("Private")).await.unwrap();

        let result = f.service.get_task(f.bob, task.id).await;
        assert!(matches!(result, Err(ServiceError::NotFound("Task"))));
    }

    #[tokio::test]
    async fn test_update_foreign_task_is_not_found_and_unchanged() {
        let f = fixture().await;
        let task = f.service.create_task(f.alice, payload("Private")).await.unwrap();

        let result = f.service.update_task(f.bob, task.id, payload("Hijacked")).await;
        assert!(matches!(result, Err(ServiceError::NotFound("Task"))));

        let missing = f.service.update_task(f.alice, 9999, payload("Ghost")).await;
        assert!(matches!(missing, Err(ServiceError::NotFound("Task"))));

        let unchanged = f.service.get_task(f.alice, task.id).await.unwrap();
        assert_eq!(unchanged.title, "Private");
    }

    #[tokio::test]
    async fn test_update_replaces_subtasks() {
        let f = fixture().await;
        let task = f
            .service
            .create_task(
                f.alice,
                TaskPayload {
                    subtasks: Some(vec![
                        SubtaskInput {
                            id: None,
                            title: "Draft".to_string(),
                            is_completed: false,
                        },
                        SubtaskInput {
                            id: None,
                            title: "Review".to_string(),
                            is_completed: false,
                        },
                    ]),
                    ..payload("Essay")
                },
            )
            .await
            .unwrap();

        let updated = f
            .service
            .update_task(
                f.alice,
                task.id,
                TaskPayload {
                    subtasks: Some(vec![SubtaskInput {
                        id: None,
                        title: "Publish".to_string(),
                        is_completed: false,
                    }]),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.title, "Essay");
        let titles: Vec<&str> = updated.subtasks.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["Publish"]);
    }

    #[tokio::test]
    async fn test_update_without_subtasks_keeps_them() {
        let f = fixture().await;
        let task = f
            .service
            .create_task(
                f.alice,
                TaskPayload {
                    subtasks: Some(vec![SubtaskInput {
                        id: None,
                        title: "Step".to_string(),
                        is_completed: false,
                    }]),
                    ..payload("Keep steps")
                },
            )
            .await
            .unwrap();

        let updated = f
            .service
            .update_task(
                f.alice,
                task.id,
                TaskPayload {
                    status: Some(TaskStatus::InProgress),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.status, TaskStatus::InProgress);
        assert_eq!(updated.subtasks, task.subtasks);
    }

    #[tokio::test]
    async fn test_delete_then_get_is_not_found() {
        let f = fixture().await;
        let task = f.service.create_task(f.alice, payload("Done soon")).await.unwrap();

        f.service.delete_task(f.alice, task.id).await.unwrap();

        assert!(matches!(
            f.service.get_task(f.alice, task.id).await,
            Err(ServiceError::NotFound("Task"))
        ));
        assert!(matches!(
            f.service.delete_task(f.alice, task.id).await,
            Err(ServiceError::NotFound("Task"))
        ));
    }

    #[tokio::test]
    async fn test_delete_foreign_task_is_not_found() {
        let f = fixture().await;
        let task = f.service.create_task(f.alice, payload("Mine")).await.unwrap();

        let result = f.service.delete_task(f.bob, task.id).await;
        assert!(matches!(result, Err(ServiceError::NotFound("Task"))));
        assert!(f.service.get_task(f.alice, task.id).await.is_ok());
    }
}
