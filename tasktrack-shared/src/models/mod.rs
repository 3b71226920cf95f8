/// Domain models for tasktrack
///
/// Plain data types shared by the store implementations, the services and the
/// HTTP layer. Persistence lives in [`crate::store`].
///
/// # Models
///
/// - `user`: User accounts
/// - `category`: Per-user task categories and the default set
/// - `task`: Tasks, subtasks, and the create/update payloads
///
/// # Example
///
/// ```
/// use tasktrack_shared::models::task::{TaskDraft, TaskPayload, TaskStatus};
///
/// let draft = TaskDraft::for_create(TaskPayload {
///     title: Some("Ship release".to_string()),
///     ..Default::default()
/// })
/// .unwrap();
/// assert_eq!(draft.status, TaskStatus::Pending);
/// ```

pub mod category;
pub mod task;
pub mod user;
