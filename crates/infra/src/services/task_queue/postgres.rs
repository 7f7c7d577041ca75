use super::{check_horizon, EnqueueOptions, ITaskQueue, ScheduledTask};
use crate::system::ISys;
use reminder_scheduler_domain::ReminderTask;
use sqlx::{types::Json, FromRow, PgPool};
use std::sync::Arc;

pub struct PostgresTaskQueue {
    pool: PgPool,
    sys: Arc<dyn ISys>,
    max_horizon_millis: i64,
}

impl PostgresTaskQueue {
    pub fn new(pool: PgPool, sys: Arc<dyn ISys>, max_horizon_millis: i64) -> Self {
        Self {
            pool,
            sys,
            max_horizon_millis,
        }
    }

    async fn insert(&self, task: &ScheduledTask) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO reminder_tasks (name, payload, schedule_time, dispatch_deadline_secs, attempts)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (name) DO NOTHING
            "#,
        )
        .bind(&task.name)
        .bind(Json(&task.task))
        .bind(task.schedule_time)
        .bind(task.dispatch_deadline_secs as i64)
        .bind(task.attempts as i32)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[derive(Debug, FromRow)]
struct ScheduledTaskRaw {
    name: String,
    payload: Json<ReminderTask>,
    schedule_time: i64,
    dispatch_deadline_secs: i64,
    attempts: i32,
}

impl From<ScheduledTaskRaw> for ScheduledTask {
    fn from(raw: ScheduledTaskRaw) -> Self {
        Self {
            name: raw.name,
            task: raw.payload.0,
            schedule_time: raw.schedule_time,
            dispatch_deadline_secs: raw.dispatch_deadline_secs.max(0) as u64,
            attempts: raw.attempts.max(0) as u32,
        }
    }
}

#[async_trait::async_trait]
impl ITaskQueue for PostgresTaskQueue {
    async fn enqueue(&self, task: &ReminderTask, options: EnqueueOptions) -> anyhow::Result<()> {
        check_horizon(
            options.schedule_time,
            self.sys.get_timestamp_millis(),
            self.max_horizon_millis,
        )?;
        self.insert(&ScheduledTask::new(task.clone(), options)).await
    }

    async fn claim_due(&self, now: i64, limit: usize) -> anyhow::Result<Vec<ScheduledTask>> {
        let raws = sqlx::query_as::<_, ScheduledTaskRaw>(
            r#"
            DELETE FROM reminder_tasks
            WHERE name IN (
                SELECT name FROM reminder_tasks
                WHERE schedule_time <= $1
                ORDER BY schedule_time
                LIMIT $2
                FOR UPDATE SKIP LOCKED
            )
            RETURNING *
            "#,
        )
        .bind(now)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        let mut tasks = raws
            .into_iter()
            .map(ScheduledTask::from)
            .collect::<Vec<_>>();
        tasks.sort_by_key(|t| t.schedule_time);
        Ok(tasks)
    }

    async fn retry(&self, task: &ScheduledTask, next_attempt_at: i64) -> anyhow::Result<()> {
        let mut retried = task.clone();
        retried.attempts += 1;
        retried.schedule_time = next_attempt_at;
        self.insert(&retried).await
    }
}
