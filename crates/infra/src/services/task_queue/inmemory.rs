use super::{check_horizon, EnqueueOptions, ITaskQueue, ScheduledTask};
use crate::system::ISys;
use reminder_scheduler_domain::ReminderTask;
use std::sync::{Arc, Mutex};

pub struct InMemoryTaskQueue {
    sys: Arc<dyn ISys>,
    max_horizon_millis: i64,
    tasks: Mutex<Vec<ScheduledTask>>,
}

impl InMemoryTaskQueue {
    pub fn new(sys: Arc<dyn ISys>, max_horizon_millis: i64) -> Self {
        Self {
            sys,
            max_horizon_millis,
            tasks: Mutex::new(Vec::new()),
        }
    }

    /// Pending tasks ordered by schedule time, without claiming them
    pub fn scheduled(&self) -> Vec<ScheduledTask> {
        let mut tasks = self.tasks.lock().unwrap_or_else(|e| e.into_inner()).clone();
        tasks.sort_by_key(|t| t.schedule_time);
        tasks
    }
}

#[async_trait::async_trait]
impl ITaskQueue for InMemoryTaskQueue {
    async fn enqueue(&self, task: &ReminderTask, options: EnqueueOptions) -> anyhow::Result<()> {
        check_horizon(
            options.schedule_time,
            self.sys.get_timestamp_millis(),
            self.max_horizon_millis,
        )?;
        let scheduled = ScheduledTask::new(task.clone(), options);
        let mut tasks = self.tasks.lock().unwrap_or_else(|e| e.into_inner());
        if !tasks.iter().any(|t| t.name == scheduled.name) {
            tasks.push(scheduled);
        }
        Ok(())
    }

    async fn claim_due(&self, now: i64, limit: usize) -> anyhow::Result<Vec<ScheduledTask>> {
        let mut tasks = self.tasks.lock().unwrap_or_else(|e| e.into_inner());
        tasks.sort_by_key(|t| t.schedule_time);
        let due = tasks
            .iter()
            .take_while(|t| t.schedule_time <= now)
            .take(limit)
            .count();
        Ok(tasks.drain(..due).collect())
    }

    async fn retry(&self, task: &ScheduledTask, next_attempt_at: i64) -> anyhow::Result<()> {
        let mut retried = task.clone();
        retried.attempts += 1;
        retried.schedule_time = next_attempt_at;
        let mut tasks = self.tasks.lock().unwrap_or_else(|e| e.into_inner());
        if !tasks.iter().any(|t| t.name == retried.name) {
            tasks.push(retried);
        }
        Ok(())
    }
}
