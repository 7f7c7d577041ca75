mod inmemory;
mod postgres;

pub use inmemory::InMemoryTaskQueue;
pub use postgres::PostgresTaskQueue;
use reminder_scheduler_domain::ReminderTask;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnqueueOptions {
    /// Epoch millis at which the task should run
    pub schedule_time: i64,
    pub dispatch_deadline_secs: u64,
}

/// A `ReminderTask` waiting in the queue
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledTask {
    pub name: String,
    pub task: ReminderTask,
    pub schedule_time: i64,
    pub dispatch_deadline_secs: u64,
    /// Attempts already used
    pub attempts: u32,
}

impl ScheduledTask {
    pub fn new(task: ReminderTask, options: EnqueueOptions) -> Self {
        Self {
            name: task_name(&task, options.schedule_time),
            task,
            schedule_time: options.schedule_time,
            dispatch_deadline_secs: options.dispatch_deadline_secs,
            attempts: 0,
        }
    }
}

/// Identity of a task in the queue. Enqueueing a task with a name that is
/// already pending does nothing.
pub fn task_name(task: &ReminderTask, schedule_time: i64) -> String {
    format!(
        "{}:{}:{}",
        task.appointment_ref,
        task.offset_id(),
        schedule_time
    )
}

fn check_horizon(schedule_time: i64, now: i64, max_horizon_millis: i64) -> anyhow::Result<()> {
    if schedule_time > now + max_horizon_millis {
        return Err(anyhow::anyhow!(
            "Schedule time {} is beyond the maximum horizon of the queue ({} + {})",
            schedule_time,
            now,
            max_horizon_millis
        ));
    }
    Ok(())
}

/// Deferred task queue that can schedule work at most `max_horizon` ahead
#[async_trait::async_trait]
pub trait ITaskQueue: Send + Sync {
    async fn enqueue(&self, task: &ReminderTask, options: EnqueueOptions) -> anyhow::Result<()>;
    /// Removes and returns at most `limit` tasks that are due at `now`
    async fn claim_due(&self, now: i64, limit: usize) -> anyhow::Result<Vec<ScheduledTask>>;
    /// Puts a claimed task back with one more attempt used
    async fn retry(&self, task: &ScheduledTask, next_attempt_at: i64) -> anyhow::Result<()>;
}
