//! Ownership-scoped task CRUD.
//!
//! All operations take the authenticated user's id as a scoping parameter.
//! A task that does not exist and a task owned by someone else produce the
//! same `NotFound` error, so callers cannot probe for other users' task ids.

pub mod model;
pub mod storage;

use sqlx::SqlitePool;

use model::{TaskFilter, TaskRow, TaskStatus};
use storage::TaskStorage;

/// Errors surfaced by task operations.
#[derive(Debug, thiserror::Error)]
pub enum TaskError {
    #[error("Task with ID \"{0}\" not found")]
    NotFound(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

#[derive(Clone)]
pub struct TaskService {
    store: TaskStorage,
}

impl TaskService {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            store: TaskStorage::new(pool),
        }
    }

    /// List the caller's tasks, narrowed by the optional filter.
    /// An empty result is not an error.
    pub async fn list(&self, filter: &TaskFilter, owner_id: &str) -> Result<Vec<TaskRow>, TaskError> {
        Ok(self.store.list_tasks(owner_id, filter).await?)
    }

    /// Create a task for the caller. New tasks always start OPEN.
    pub async fn create(
        &self,
        title: &str,
        description: &str,
        owner_id: &str,
    ) -> Result<TaskRow, TaskError> {
        Ok(self.store.create_task(owner_id, title, description).await?)
    }

    pub async fn get(&self, id: &str, owner_id: &str) -> Result<TaskRow, TaskError> {
        self.store
            .get_task(id, owner_id)
            .await?
            .ok_or_else(|| TaskError::NotFound(id.to_string()))
    }

    /// Set the status of one of the caller's tasks and return the updated row.
    pub async fn update_status(
        &self,
        id: &str,
        status: TaskStatus,
        owner_id: &str,
    ) -> Result<TaskRow, TaskError> {
        let affected = self.store.update_status(id, owner_id, status).await?;
        if affected == 0 {
            return Err(TaskError::NotFound(id.to_string()));
        }
        // The row can vanish between the update and this read if a concurrent
        // delete wins the race; report that as NotFound too.
        self.get(id, owner_id).await
    }

    pub async fn delete(&self, id: &str, owner_id: &str) -> Result<(), TaskError> {
        let affected = self.store.delete_task(id, owner_id).await?;
        if affected == 0 {
            return Err(TaskError::NotFound(id.to_string()));
        }
        Ok(())
    }
}
