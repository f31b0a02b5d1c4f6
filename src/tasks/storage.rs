//! Task SQLite operations.
//!
//! Every statement carries the owner predicate. Visibility and mutation are
//! scoped to the requesting user inside the SQL itself, so there is no window
//! between an ownership check and the operation it guards.

use anyhow::Result;
use chrono::Utc;
use sqlx::SqlitePool;

use super::model::{new_id, TaskFilter, TaskRow, TaskStatus};
use crate::storage::with_timeout;

#[derive(Clone)]
pub struct TaskStorage {
    pub(crate) pool: SqlitePool,
}

impl TaskStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create_task(
        &self,
        owner_id: &str,
        title: &str,
        description: &str,
    ) -> Result<TaskRow> {
        let id = new_id();
        let now = Utc::now().to_rfc3339();
        sqlx::query(
            "INSERT INTO tasks (id, title, description, status, owner_id, created_at, updated_at) \
             VALUES (?, ?, ?, 'OPEN', ?, ?, ?)",
        )
        .bind(&id)
        .bind(title)
        .bind(description)
        .bind(owner_id)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;
        self.get_task(&id, owner_id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("task not found after insert"))
    }

    pub async fn get_task(&self, id: &str, owner_id: &str) -> Result<Option<TaskRow>> {
        Ok(
            sqlx::query_as("SELECT * FROM tasks WHERE id = ? AND owner_id = ?")
                .bind(id)
                .bind(owner_id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    /// List tasks owned by `owner_id`, narrowed by the optional filters.
    ///
    /// `status` narrows to exact status equality; `search` narrows to rows
    /// whose title or description contains the text as a substring (LIKE,
    /// store default collation). All conditions are ANDed.
    pub async fn list_tasks(&self, owner_id: &str, filter: &TaskFilter) -> Result<Vec<TaskRow>> {
        let pattern = filter.search.as_deref().map(|s| format!("%{s}%"));
        with_timeout(async {
            match (filter.status, pattern) {
                (Some(status), Some(pattern)) => Ok(sqlx::query_as(
                    "SELECT * FROM tasks WHERE owner_id = ? AND status = ? \
                     AND (title LIKE ? OR description LIKE ?) \
                     ORDER BY created_at ASC, id ASC",
                )
                .bind(owner_id)
                .bind(status.as_str())
                .bind(&pattern)
                .bind(&pattern)
                .fetch_all(&self.pool)
                .await?),
                (Some(status), None) => Ok(sqlx::query_as(
                    "SELECT * FROM tasks WHERE owner_id = ? AND status = ? \
                     ORDER BY created_at ASC, id ASC",
                )
                .bind(owner_id)
                .bind(status.as_str())
                .fetch_all(&self.pool)
                .await?),
                (None, Some(pattern)) => Ok(sqlx::query_as(
                    "SELECT * FROM tasks WHERE owner_id = ? \
                     AND (title LIKE ? OR description LIKE ?) \
                     ORDER BY created_at ASC, id ASC",
                )
                .bind(owner_id)
                .bind(&pattern)
                .bind(&pattern)
                .fetch_all(&self.pool)
                .await?),
                (None, None) => Ok(sqlx::query_as(
                    "SELECT * FROM tasks WHERE owner_id = ? ORDER BY created_at ASC, id ASC",
                )
                .bind(owner_id)
                .fetch_all(&self.pool)
                .await?),
            }
        })
        .await
    }

    /// Set the status of an owned task. Returns the number of rows affected;
    /// 0 means no task with that id belongs to `owner_id`.
    pub async fn update_status(
        &self,
        id: &str,
        owner_id: &str,
        status: TaskStatus,
    ) -> Result<u64> {
        let now = Utc::now().to_rfc3339();
        let result = sqlx::query(
            "UPDATE tasks SET status = ?, updated_at = ? WHERE id = ? AND owner_id = ?",
        )
        .bind(status.as_str())
        .bind(&now)
        .bind(id)
        .bind(owner_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Delete an owned task. Returns the number of rows affected;
    /// 0 means no task with that id belongs to `owner_id`.
    pub async fn delete_task(&self, id: &str, owner_id: &str) -> Result<u64> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = ? AND owner_id = ?")
            .bind(id)
            .bind(owner_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_storage() -> TaskStorage {
        let pool = sqlx::SqlitePool::connect("sqlite::memory:").await.unwrap();
        let sql = include_str!("../storage/migrations/001_init.sql");
        for stmt in sql.split(';') {
            let stmt = stmt.trim();
            if !stmt.is_empty() {
                sqlx::query(stmt).execute(&pool).await.unwrap();
            }
        }
        // Owner rows for the foreign key on tasks.owner_id
        for id in ["u1", "u2"] {
            sqlx::query(
                "INSERT INTO users (id, username, password_hash, created_at) VALUES (?, ?, 'h', '')",
            )
            .bind(id)
            .bind(id)
            .execute(&pool)
            .await
            .unwrap();
        }
        TaskStorage::new(pool)
    }

    fn filter(status: Option<TaskStatus>, search: Option<&str>) -> TaskFilter {
        TaskFilter {
            status,
            search: search.map(|s| s.to_string()),
        }
    }

    #[tokio::test]
    async fn test_create_defaults_to_open() {
        let s = test_storage().await;
        let task = s.create_task("u1", "Tarea 1", "Desc 1").await.unwrap();
        assert_eq!(task.status, "OPEN");
        assert_eq!(task.owner_id, "u1");
        assert!(!task.id.is_empty());
    }

    #[tokio::test]
    async fn test_list_scopes_to_owner() {
        let s = test_storage().await;
        s.create_task("u1", "mine", "d").await.unwrap();
        s.create_task("u2", "theirs", "d").await.unwrap();

        let mine = s.list_tasks("u1", &TaskFilter::default()).await.unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].title, "mine");
    }

    #[tokio::test]
    async fn test_list_filters_by_status_and_search() {
        let s = test_storage().await;
        let open = s.create_task("u1", "Tarea 1", "Desc 1").await.unwrap();
        let other = s.create_task("u1", "Tarea 2", "Desc 2").await.unwrap();
        s.update_status(&other.id, "u1", TaskStatus::Done)
            .await
            .unwrap();

        let rows = s
            .list_tasks("u1", &filter(Some(TaskStatus::Open), Some("Tarea")))
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, open.id);

        let rows = s
            .list_tasks("u1", &filter(Some(TaskStatus::Done), None))
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, other.id);

        // Search matches description as well as title
        let rows = s
            .list_tasks("u1", &filter(None, Some("Desc 2")))
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, other.id);

        let rows = s
            .list_tasks("u1", &filter(None, Some("no such text")))
            .await
            .unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn test_mutations_report_affected_rows() {
        let s = test_storage().await;
        let task = s.create_task("u1", "t", "d").await.unwrap();

        // Wrong owner touches nothing
        assert_eq!(
            s.update_status(&task.id, "u2", TaskStatus::Done).await.unwrap(),
            0
        );
        assert_eq!(s.delete_task(&task.id, "u2").await.unwrap(), 0);
        let row = s.get_task(&task.id, "u1").await.unwrap().unwrap();
        assert_eq!(row.status, "OPEN");

        // Right owner: one row each, second delete finds nothing
        assert_eq!(
            s.update_status(&task.id, "u1", TaskStatus::Done).await.unwrap(),
            1
        );
        assert_eq!(s.delete_task(&task.id, "u1").await.unwrap(), 1);
        assert_eq!(s.delete_task(&task.id, "u1").await.unwrap(), 0);
    }
}
