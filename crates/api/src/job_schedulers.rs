use crate::reminder::execute_reminder_task::ExecuteReminderTaskUseCase;
use crate::reminder::sweep_appointment_reminders::SweepAppointmentRemindersUseCase;
use crate::shared::usecase::execute;
use actix_web::rt::time::{interval, timeout};
use futures::stream::{self, StreamExt};
use reminder_scheduler_infra::{ReminderContext, ScheduledTask};
use reminder_scheduler_utils::jittered_backoff_millis;
use std::time::Duration;
use tracing::{error, warn};

/// Tasks claimed per poll, relative to the number of concurrent dispatches
const CLAIM_BATCH_FACTOR: usize = 5;

pub fn start_reminders_sweep_job(ctx: ReminderContext) {
    actix_web::rt::spawn(async move {
        let mut interval = interval(Duration::from_secs(ctx.config.sweep_interval_secs.max(1)));
        loop {
            interval.tick().await;

            let usecase = SweepAppointmentRemindersUseCase {};
            let _ = execute(usecase, &ctx).await;
        }
    });
}

pub fn start_task_queue_worker(ctx: ReminderContext) {
    actix_web::rt::spawn(async move {
        let mut interval = interval(Duration::from_secs(ctx.config.task_poll_interval_secs.max(1)));
        loop {
            interval.tick().await;
            run_due_tasks(&ctx).await;
        }
    });
}

/// Claims the due tasks and runs them with bounded concurrency. Returns how
/// many tasks were claimed.
pub async fn run_due_tasks(ctx: &ReminderContext) -> usize {
    let now = ctx.sys.get_timestamp_millis();
    let concurrency = ctx.config.task_max_concurrent_dispatches.max(1);
    let tasks = match ctx
        .services
        .task_queue
        .claim_due(now, concurrency * CLAIM_BATCH_FACTOR)
        .await
    {
        Ok(tasks) => tasks,
        Err(e) => {
            error!("Unable to claim due reminder tasks. Err: {:?}", e);
            return 0;
        }
    };
    let claimed = tasks.len();

    stream::iter(tasks)
        .for_each_concurrent(concurrency, |task| dispatch_task(ctx, task))
        .await;

    claimed
}

async fn dispatch_task(ctx: &ReminderContext, scheduled: ScheduledTask) {
    let usecase = ExecuteReminderTaskUseCase {
        task: scheduled.task.clone(),
    };
    let deadline = Duration::from_secs(scheduled.dispatch_deadline_secs);
    let failure = match timeout(deadline, execute(usecase, ctx)).await {
        Ok(Ok(_)) => return,
        Ok(Err(e)) => format!("{:?}", e),
        Err(_) => format!(
            "Dispatch deadline of {}s exceeded",
            scheduled.dispatch_deadline_secs
        ),
    };

    let attempts = scheduled.attempts + 1;
    if attempts >= ctx.config.task_max_attempts {
        error!(
            "Dropping reminder task {} after {} attempts. Last error: {}",
            scheduled.name, attempts, failure
        );
        return;
    }

    let next_attempt_at = ctx.sys.get_timestamp_millis()
        + jittered_backoff_millis(
            scheduled.attempts,
            ctx.config.task_min_backoff_secs,
            ctx.config.task_max_backoff_secs,
        );
    warn!(
        "Reminder task {} failed on attempt {}, retrying at {}. Err: {}",
        scheduled.name, attempts, next_attempt_at, failure
    );
    if let Err(e) = ctx
        .services
        .task_queue
        .retry(&scheduled, next_attempt_at)
        .await
    {
        error!(
            "Unable to reschedule reminder task {}. Err: {:?}",
            scheduled.name, e
        );
    }
}
