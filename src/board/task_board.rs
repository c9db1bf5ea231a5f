//! Status-partitioned task collection

use chrono::{DateTime, Utc};
use tracing::warn;

use crate::models::{Task, TaskStatus};

/// Which column changes the board accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransitionPolicy {
    /// Any column to any other, including backward moves and skips
    #[default]
    AllowAll,
    /// pending -> in-progress -> completed; skipping ahead is allowed
    ForwardOnly,
}

impl TransitionPolicy {
    pub fn permits(self, from: TaskStatus, to: TaskStatus) -> bool {
        match self {
            TransitionPolicy::AllowAll => true,
            TransitionPolicy::ForwardOnly => to.rank() > from.rank(),
        }
    }
}

/// Every task sits in exactly one column, and its `status` is that column's
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TaskBoard {
    pending: Vec<Task>,
    in_progress: Vec<Task>,
    completed: Vec<Task>,
}

impl TaskBoard {
    /// Partition by exact status string; unknown statuses are dropped
    pub fn from_tasks(tasks: Vec<Task>) -> Self {
        let mut board = Self::default();
        for task in tasks {
            match task.task_status() {
                Some(status) => board.column_mut(status).push(task),
                None => warn!(task = %task.id, status = %task.status, "task with unknown status left off the board"),
            }
        }
        board
    }

    pub fn column(&self, status: TaskStatus) -> &[Task] {
        match status {
            TaskStatus::Pending => &self.pending,
            TaskStatus::InProgress => &self.in_progress,
            TaskStatus::Completed => &self.completed,
        }
    }

    fn column_mut(&mut self, status: TaskStatus) -> &mut Vec<Task> {
        match status {
            TaskStatus::Pending => &mut self.pending,
            TaskStatus::InProgress => &mut self.in_progress,
            TaskStatus::Completed => &mut self.completed,
        }
    }

    pub fn len(&self) -> usize {
        TaskStatus::ALL.iter().map(|status| self.column(*status).len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Column currently holding the task
    pub fn locate(&self, task_id: &str) -> Option<TaskStatus> {
        TaskStatus::ALL
            .into_iter()
            .find(|status| self.column(*status).iter().any(|task| task.id == task_id))
    }

    pub fn get(&self, task_id: &str) -> Option<&Task> {
        let status = self.locate(task_id)?;
        self.column(status).iter().find(|task| task.id == task_id)
    }

    /// Move a task from `from` to the end of `to`, updating its status
    ///
    /// Entering `completed` stamps the completion time. Returns the moved
    /// task, or `None` when it is not in `from`.
    pub fn move_task(&mut self, task_id: &str, from: TaskStatus, to: TaskStatus, now: DateTime<Utc>) -> Option<Task> {
        let source = self.column_mut(from);
        let index = source.iter().position(|task| task.id == task_id)?;
        let mut task = source.remove(index);

        task.status = to.as_str().to_string();
        if to == TaskStatus::Completed {
            task.completion_date_time = Some(now);
        }
        self.column_mut(to).push(task.clone());
        Some(task)
    }

    /// Put `original` back into `into` if the task now sits elsewhere
    ///
    /// A task that is already in `into`, or no longer on the board, is left
    /// alone. Returns whether the board changed.
    pub fn restore(&mut self, original: Task, into: TaskStatus) -> bool {
        let Some(current) = self.locate(&original.id) else { return false };
        if current == into {
            return false;
        }
        self.column_mut(current).retain(|task| task.id != original.id);
        self.column_mut(into).push(original);
        true
    }
}

#[cfg(test)]
pub(crate) fn task(id: &str, status: &str) -> Task {
    Task {
        id: id.to_string(),
        job: None,
        job_title: Some(format!("Job {}", id)),
        job_category: None,
        job_sub_category: None,
        location: None,
        helper_email: Some("a@x.com".to_string()),
        seeker_email: None,
        status: status.to_string(),
        completion_date_time: None,
    }
}
