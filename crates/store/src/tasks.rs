//! In-memory task tracker.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::Serialize;
use serde_json::Value;

use goal_agent_core::{
    traits::{TaskStatus, TaskTracker, TaskType},
    Error, Result,
};

/// A tracked task.
#[derive(Debug, Clone, Serialize)]
pub struct TaskRecord {
    pub id: String,
    pub description: String,
    pub task_type: TaskType,
    pub details: Value,
    pub status: TaskStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Task tracker using DashMap.
#[derive(Default)]
pub struct InMemoryTaskTracker {
    tasks: DashMap<String, TaskRecord>,
}

impl InMemoryTaskTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &str) -> Option<TaskRecord> {
        self.tasks.get(id).map(|t| t.value().clone())
    }

    /// All tasks, oldest first.
    pub fn list(&self) -> Vec<TaskRecord> {
        let mut tasks: Vec<_> = self.tasks.iter().map(|t| t.value().clone()).collect();
        tasks.sort_by_key(|t| t.created_at);
        tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

#[async_trait]
impl TaskTracker for InMemoryTaskTracker {
    async fn create_task(
        &self,
        description: &str,
        task_type: TaskType,
        details: Value,
    ) -> Result<String> {
        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now();

        self.tasks.insert(
            id.clone(),
            TaskRecord {
                id: id.clone(),
                description: description.to_string(),
                task_type,
                details,
                status: TaskStatus::Pending,
                created_at: now,
                updated_at: now,
            },
        );

        tracing::info!(task_id = %id, task_type = ?task_type, "Task created");
        Ok(id)
    }

    async fn update_status(&self, id: &str, status: TaskStatus) -> Result<()> {
        let mut task = self
            .tasks
            .get_mut(id)
            .ok_or_else(|| Error::storage(format!("Task not found: {}", id)))?;
        task.status = status;
        task.updated_at = Utc::now();
        tracing::debug!(task_id = %id, status = ?status, "Task status updated");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_create_and_get() {
        let tracker = InMemoryTaskTracker::new();

        let id = tracker
            .create_task("build an app", TaskType::Project, json!({"steps": 3}))
            .await
            .unwrap();

        let task = tracker.get(&id).unwrap();
        assert_eq!(task.description, "build an app");
        assert_eq!(task.task_type, TaskType::Project);
        assert_eq!(task.status, TaskStatus::Pending);
        assert_eq!(task.details["steps"], 3);
    }

    #[tokio::test]
    async fn test_ids_are_unique() {
        let tracker = InMemoryTaskTracker::new();

        let a = tracker.create_task("a", TaskType::Goal, Value::Null).await.unwrap();
        let b = tracker.create_task("b", TaskType::Goal, Value::Null).await.unwrap();

        assert_ne!(a, b);
        assert_eq!(tracker.len(), 2);
        assert_eq!(tracker.list().len(), 2);
    }

    #[tokio::test]
    async fn test_update_status() {
        let tracker = InMemoryTaskTracker::new();
        let id = tracker.create_task("a", TaskType::Project, Value::Null).await.unwrap();

        tracker.update_status(&id, TaskStatus::InProgress).await.unwrap();
        assert_eq!(tracker.get(&id).unwrap().status, TaskStatus::InProgress);

        let missing = tracker.update_status("missing", TaskStatus::Failed).await;
        assert!(matches!(missing, Err(Error::Storage(_))));
    }
}
