/// PostgreSQL store
///
/// Implements the store traits on a [`PgPool`]. Listing filters are appended
/// with `QueryBuilder::push_bind`, so user input only ever travels as bound
/// parameters. Categories are joined only when owned by the task's owner and
/// subtasks are loaded with one extra `ANY($1)` query per batch of tasks.
///
/// # Example
///
/// ```no_run
/// use tasktrack_shared::db::pool::{create_pool, DatabaseConfig};
/// use tasktrack_shared::store::{postgres::PgStore, TaskStore};
/// use tasktrack_shared::query::TaskQuery;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig {
///     url: std::env::var("DATABASE_URL")?,
///     ..Default::default()
/// })
/// .await?;
///
/// let store = PgStore::new(pool);
/// let tasks = store.list_tasks(1, &TaskQuery::new()).await?;
/// println!("{} tasks on the first page", tasks.len());
/// # Ok(())
/// # }
/// ```
use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{error::ErrorKind, PgConnection, PgPool, Postgres, QueryBuilder};
use tracing::{debug, error};

use super::{CategoryStore, Store, StoreError, StoreResult, TaskStore, UserStore};
use crate::db::pool::health_check;
use crate::models::{
    category::{Category, NewCategory},
    task::{ParseEnumError, Subtask, SubtaskInput, Task, TaskDraft},
    user::{NewUser, User},
};
use crate::query::{escape_like, TaskFilter, TaskQuery};

const TASK_SELECT: &str = r#"
SELECT t.id, t.user_id, t.category_id, t.title, t.description, t.status, t.priority,
       t.due_date, t.created_at, t.updated_at,
       c.id AS joined_category_id, c.name AS category_name, c.color AS category_color
FROM tasks t
LEFT JOIN categories c ON c.id = t.category_id AND c.user_id = t.user_id
"#;

const TASK_ORDER: &str = " ORDER BY t.created_at DESC, t.id DESC";

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            match db_err.kind() {
                ErrorKind::UniqueViolation => {
                    return StoreError::Conflict(db_err.message().to_string())
                }
                ErrorKind::ForeignKeyViolation
                | ErrorKind::NotNullViolation
                | ErrorKind::CheckViolation => {
                    return StoreError::Constraint(db_err.message().to_string())
                }
                _ => {}
            }
        }

        error!(error = %err, "Database operation failed");
        StoreError::Database(err.to_string())
    }
}

#[derive(Debug, sqlx::FromRow)]
struct TaskRow {
    id: i64,
    user_id: i64,
    category_id: Option<i64>,
    title: String,
    description: String,
    status: String,
    priority: String,
    due_date: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    joined_category_id: Option<i64>,
    category_name: Option<String>,
    category_color: Option<String>,
}

impl TaskRow {
    fn into_task(self, subtasks: Vec<Subtask>) -> StoreResult<Task> {
        let category = match (self.joined_category_id, self.category_name) {
            (Some(id), Some(name)) => Some(Category {
                id,
                user_id: self.user_id,
                name,
                color: self.category_color.unwrap_or_default(),
            }),
            _ => None,
        };

        Ok(Task {
            id: self.id,
            user_id: self.user_id,
            category_id: self.category_id,
            category,
            title: self.title,
            description: self.description,
            status: self
                .status
                .parse()
                .map_err(|e: ParseEnumError| StoreError::Database(e.to_string()))?,
            priority: self
                .priority
                .parse()
                .map_err(|e: ParseEnumError| StoreError::Database(e.to_string()))?,
            due_date: self.due_date,
            subtasks,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Builds the filtered, paginated listing statement for one user
fn build_list_query(user_id: i64, query: &TaskQuery) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new(TASK_SELECT);
    builder.push(" WHERE t.deleted_at IS NULL AND t.user_id = ");
    builder.push_bind(user_id);

    for filter in &query.filters {
        match filter {
            TaskFilter::TitleContains(needle) => {
                builder.push(" AND t.title ILIKE ");
                builder.push_bind(format!("%{}%", escape_like(needle)));
            }
            TaskFilter::StatusIs(status) => {
                builder.push(" AND t.status = ");
                builder.push_bind(status.clone());
            }
            TaskFilter::CategoryIs(category_id) => {
                builder.push(" AND t.category_id = ");
                builder.push_bind(*category_id);
            }
        }
    }

    builder.push(TASK_ORDER);
    builder.push(" LIMIT ");
    builder.push_bind(query.page.limit());
    builder.push(" OFFSET ");
    builder.push_bind(query.page.offset());

    builder
}

/// PostgreSQL implementation of [`Store`]
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Attaches live subtasks to task rows, preserving row order
    async fn hydrate(&self, rows: Vec<TaskRow>) -> StoreResult<Vec<Task>> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let task_ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
        let subtasks: Vec<Subtask> = sqlx::query_as(
            r#"
            SELECT id, task_id, title, is_completed, created_at, updated_at
            FROM subtasks
            WHERE task_id = ANY($1) AND deleted_at IS NULL
            ORDER BY id
            "#,
        )
        .bind(&task_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut by_task: HashMap<i64, Vec<Subtask>> = HashMap::new();
        for subtask in subtasks {
            by_task.entry(subtask.task_id).or_default().push(subtask);
        }

        rows.into_iter()
            .map(|row| {
                let subtasks = by_task.remove(&row.id).unwrap_or_default();
                row.into_task(subtasks)
            })
            .collect()
    }
}

async fn insert_subtask(
    conn: &mut PgConnection,
    task_id: i64,
    input: &SubtaskInput,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar(
        r#"
        INSERT INTO subtasks (task_id, title, is_completed)
        VALUES ($1, $2, $3)
        RETURNING id
        "#,
    )
    .bind(task_id)
    .bind(&input.title)
    .bind(input.is_completed)
    .fetch_one(conn)
    .await
}

/// Applies the desired subtask set inside the caller's transaction
async fn replace_subtasks(
    conn: &mut PgConnection,
    task_id: i64,
    inputs: &[SubtaskInput],
) -> Result<(), sqlx::Error> {
    let mut kept: Vec<i64> = Vec::with_capacity(inputs.len());

    for input in inputs {
        let updated: Option<i64> = match input.id {
            Some(id) => {
                sqlx::query_scalar(
                    r#"
                    UPDATE subtasks
                    SET title = $1, is_completed = $2, updated_at = NOW()
                    WHERE id = $3 AND task_id = $4 AND deleted_at IS NULL
                    RETURNING id
                    "#,
                )
                .bind(&input.title)
                .bind(input.is_completed)
                .bind(id)
                .bind(task_id)
                .fetch_optional(&mut *conn)
                .await?
            }
            None => None,
        };

        let id = match updated {
            Some(id) => id,
            None => insert_subtask(&mut *conn, task_id, input).await?,
        };
        kept.push(id);
    }

    sqlx::query(
        r#"
        UPDATE subtasks
        SET deleted_at = NOW()
        WHERE task_id = $1 AND deleted_at IS NULL AND NOT (id = ANY($2))
        "#,
    )
    .bind(task_id)
    .bind(&kept)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

#[async_trait]
impl UserStore for PgStore {
    async fn insert_user(&self, new_user: NewUser) -> StoreResult<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, username, email, password_hash, created_at, updated_at
            "#,
        )
        .bind(&new_user.username)
        .bind(&new_user.email)
        .bind(&new_user.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match StoreError::from(e) {
            StoreError::Conflict(_) => StoreError::Conflict("User already exists".to_string()),
            other => other,
        })?;

        debug!(user_id = user.id, "Inserted user");
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }
}

#[async_trait]
impl CategoryStore for PgStore {
    async fn list_categories(&self, user_id: i64) -> StoreResult<Vec<Category>> {
        let categories = sqlx::query_as::<_, Category>(
            r#"
            SELECT id, user_id, name, color
            FROM categories
            WHERE user_id = $1
            ORDER BY id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(categories)
    }

    async fn seed_categories(&self, user_id: i64, defaults: &[NewCategory]) -> StoreResult<()> {
        if defaults.is_empty() {
            return Ok(());
        }

        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new("INSERT INTO categories (user_id, name, color, is_default) ");
        builder.push_values(defaults, |mut row, category| {
            row.push_bind(user_id)
                .push_bind(category.name.clone())
                .push_bind(category.color.clone())
                .push_bind(true);
        });
        builder.push(" ON CONFLICT (user_id, name) WHERE is_default DO NOTHING");

        let result = builder.build().execute(&self.pool).await?;
        debug!(user_id, inserted = result.rows_affected(), "Seeded default categories");

        Ok(())
    }

    async fn insert_category(&self, user_id: i64, category: NewCategory) -> StoreResult<Category> {
        let category = sqlx::query_as::<_, Category>(
            r#"
            INSERT INTO categories (user_id, name, color)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, name, color
            "#,
        )
        .bind(user_id)
        .bind(&category.name)
        .bind(&category.color)
        .fetch_one(&self.pool)
        .await?;

        Ok(category)
    }

    async fn delete_category(&self, user_id: i64, category_id: i64) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1 AND user_id = $2")
            .bind(category_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl TaskStore for PgStore {
    async fn list_tasks(&self, user_id: i64, query: &TaskQuery) -> StoreResult<Vec<Task>> {
        let mut builder = build_list_query(user_id, query);
        let rows: Vec<TaskRow> = builder.build_query_as().fetch_all(&self.pool).await?;

        self.hydrate(rows).await
    }

    async fn all_tasks(&self, user_id: i64) -> StoreResult<Vec<Task>> {
        let sql = format!(
            "{} WHERE t.user_id = $1 AND t.deleted_at IS NULL{}",
            TASK_SELECT, TASK_ORDER
        );
        let rows: Vec<TaskRow> = sqlx::query_as(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        self.hydrate(rows).await
    }

    async fn find_task(&self, user_id: i64, task_id: i64) -> StoreResult<Option<Task>> {
        let sql = format!(
            "{} WHERE t.id = $1 AND t.user_id = $2 AND t.deleted_at IS NULL",
            TASK_SELECT
        );
        let row: Option<TaskRow> = sqlx::query_as(&sql)
            .bind(task_id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(self.hydrate(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn insert_task(&self, user_id: i64, draft: TaskDraft) -> StoreResult<Task> {
        let mut tx = self.pool.begin().await?;

        let task_id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO tasks (user_id, category_id, title, description, status, priority, due_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            "#,
        )
        .bind(user_id)
        .bind(draft.category_id)
        .bind(&draft.title)
        .bind(&draft.description)
        .bind(draft.status.as_str())
        .bind(draft.priority.as_str())
        .bind(draft.due_date)
        .fetch_one(&mut *tx)
        .await?;

        for input in draft.subtasks.iter().flatten() {
            insert_subtask(&mut *tx, task_id, input).await?;
        }

        tx.commit().await?;
        debug!(user_id, task_id, "Inserted task");

        self.find_task(user_id, task_id)
            .await?
            .ok_or_else(|| StoreError::Database(format!("Task {} vanished after insert", task_id)))
    }

    async fn replace_task(
        &self,
        user_id: i64,
        task_id: i64,
        draft: TaskDraft,
    ) -> StoreResult<Option<Task>> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE tasks
            SET category_id = $1, title = $2, description = $3, status = $4,
                priority = $5, due_date = $6, updated_at = NOW()
            WHERE id = $7 AND user_id = $8 AND deleted_at IS NULL
            "#,
        )
        .bind(draft.category_id)
        .bind(&draft.title)
        .bind(&draft.description)
        .bind(draft.status.as_str())
        .bind(draft.priority.as_str())
        .bind(draft.due_date)
        .bind(task_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(None);
        }

        if let Some(inputs) = &draft.subtasks {
            replace_subtasks(&mut *tx, task_id, inputs).await?;
        }
        tx.commit().await?;
        debug!(user_id, task_id, "Replaced task");

        self.find_task(user_id, task_id).await
    }

    async fn soft_delete_task(&self, user_id: i64, task_id: i64) -> StoreResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE tasks
            SET deleted_at = NOW()
            WHERE id = $1 AND user_id = $2 AND deleted_at IS NULL
            "#,
        )
        .bind(task_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> StoreResult<()> {
        health_check(&self.pool).await?;
        Ok(())
    }
}
