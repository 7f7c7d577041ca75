use super::resolve_reminder_offsets::ResolveReminderOffsetsUseCase;
use crate::shared::usecase::{execute, UseCase};
use reminder_scheduler_domain::{Appointment, AppointmentRef, PlanOutcome, ReminderTask};
use reminder_scheduler_infra::{EnqueueOptions, ReminderContext};
use tracing::{error, info};

/// Enqueues the reminder tasks of one appointment.
///
/// Appointments further away than the queue horizon get a single checkpoint
/// task at `start - horizon` which plans again once the appointment is in
/// range. Safe to run any number of times for the same appointment: sent
/// offsets are skipped and the queue drops tasks it already holds.
#[derive(Debug)]
pub struct PlanAppointmentRemindersUseCase {
    pub appointment_ref: AppointmentRef,
    pub appointment: Appointment,
    /// Tenant to use when neither the storage location nor the appointment
    /// itself tells
    pub tenant_hint: Option<String>,
}

#[derive(Debug, PartialEq)]
pub enum UseCaseError {
    StorageError,
    QueueError,
}

impl PlanAppointmentRemindersUseCase {
    fn tenant_id(&self) -> Option<String> {
        self.appointment_ref
            .tenant_id()
            .or_else(|| self.appointment.explicit_tenant_id())
            .or_else(|| {
                self.tenant_hint
                    .as_deref()
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
            })
            .map(String::from)
    }

    async fn enqueue(
        &self,
        ctx: &ReminderContext,
        task: ReminderTask,
        fire_at: i64,
    ) -> Result<(), UseCaseError> {
        let options = EnqueueOptions {
            schedule_time: fire_at,
            dispatch_deadline_secs: ctx.config.task_dispatch_deadline_secs,
        };
        ctx.services
            .task_queue
            .enqueue(&task, options)
            .await
            .map_err(|e| {
                error!(
                    "Unable to enqueue reminder task {} for {} at {}. Err: {:?}",
                    task.offset_id(),
                    self.appointment_ref,
                    fire_at,
                    e
                );
                UseCaseError::QueueError
            })
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for PlanAppointmentRemindersUseCase {
    type Response = PlanOutcome;

    type Error = UseCaseError;

    const NAME: &'static str = "PlanAppointmentReminders";

    async fn execute(&mut self, ctx: &ReminderContext) -> Result<Self::Response, Self::Error> {
        let tenant_id = match self.tenant_id() {
            Some(tenant_id) => tenant_id,
            None => {
                info!(
                    "Missing tenant on appointment {}, skipping scheduling",
                    self.appointment_ref
                );
                return Ok(PlanOutcome::MissingTenant);
            }
        };
        let start = match self.appointment.start_ts() {
            Some(start) => start,
            None => {
                info!(
                    "Appointment {} of tenant {} has no start, skipping scheduling",
                    self.appointment_ref, tenant_id
                );
                return Ok(PlanOutcome::MissingStart);
            }
        };
        let now = ctx.sys.get_timestamp_millis();
        if start <= now {
            return Ok(PlanOutcome::Elapsed);
        }

        let horizon = ctx.config.max_horizon_millis;
        if start - now > horizon {
            let fire_at = start - horizon;
            let task = ReminderTask::checkpoint(&tenant_id, &self.appointment_ref);
            self.enqueue(ctx, task, fire_at).await?;
            return Ok(PlanOutcome::Checkpoint { tenant_id, fire_at });
        }

        let offsets = execute(
            ResolveReminderOffsetsUseCase {
                tenant_id: tenant_id.clone(),
                invalidate_cache: false,
            },
            ctx,
        )
        .await
        .map_err(|_| UseCaseError::StorageError)?;

        let mut offset_ids = Vec::new();
        for offset in offsets.iter().filter(|o| o.active) {
            let fire_at = start - offset.millis_before();
            if fire_at <= now || self.appointment.has_sent_flag(&offset.id) {
                continue;
            }
            let task = ReminderTask::offset(
                &tenant_id,
                &self.appointment_ref,
                &offset.id,
                offset.minutes_before,
            );
            self.enqueue(ctx, task, fire_at).await?;
            offset_ids.push(offset.id.clone());
        }

        Ok(PlanOutcome::Scheduled {
            tenant_id,
            offset_ids,
        })
    }
}
