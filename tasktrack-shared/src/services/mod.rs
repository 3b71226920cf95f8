/// Per-user operations on categories, tasks, and dashboard statistics
///
/// Every method takes the authenticated user id as its first argument and
/// passes it down to the store, which scopes the statement with it.

pub mod categories;
pub mod stats;
pub mod tasks;

pub use categories::CategoryService;
pub use stats::{compute_stats, ChartPoint, StatsService, TaskStats};
pub use tasks::TaskService;
