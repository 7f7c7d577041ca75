use super::plan_appointment_reminders::{
    PlanAppointmentRemindersUseCase, UseCaseError as PlanError,
};
use super::send_reminder_notification::SendReminderNotificationUseCase;
use crate::error::ReminderApiError;
use crate::shared::auth::protect_internal_route;
use crate::shared::usecase::{execute, UseCase};
use actix_web::{web, HttpRequest, HttpResponse};
use reminder_scheduler_api_structs::execute_reminder_task::{APIResponse, RequestBody};
use reminder_scheduler_domain::{ReminderTarget, ReminderTask, TaskOutcome};
use reminder_scheduler_infra::ReminderContext;
use tracing::{error, info};

pub async fn execute_reminder_task_controller(
    http_req: HttpRequest,
    body: web::Json<RequestBody>,
    ctx: web::Data<ReminderContext>,
) -> Result<HttpResponse, ReminderApiError> {
    protect_internal_route(&http_req, &ctx)?;

    let usecase = ExecuteReminderTaskUseCase {
        task: body.into_inner(),
    };

    execute(usecase, &ctx)
        .await
        .map(|outcome| HttpResponse::Ok().json(APIResponse::new(outcome)))
        .map_err(ReminderApiError::from)
}

/// Runs one `ReminderTask` handed back by the deferred queue.
///
/// Every stale or duplicate execution ends in a terminal `TaskOutcome`. Only
/// infrastructure failures are errors, which makes the queue retry the task.
#[derive(Debug)]
pub struct ExecuteReminderTaskUseCase {
    pub task: ReminderTask,
}

#[derive(Debug, PartialEq)]
pub enum UseCaseError {
    StorageError,
    QueueError,
}

impl From<PlanError> for UseCaseError {
    fn from(e: PlanError) -> Self {
        match e {
            PlanError::StorageError => Self::StorageError,
            PlanError::QueueError => Self::QueueError,
        }
    }
}

impl From<UseCaseError> for ReminderApiError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::StorageError | UseCaseError::QueueError => Self::InternalError,
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for ExecuteReminderTaskUseCase {
    type Response = TaskOutcome;

    type Error = UseCaseError;

    const NAME: &'static str = "ExecuteReminderTask";

    async fn execute(&mut self, ctx: &ReminderContext) -> Result<Self::Response, Self::Error> {
        let task = &self.task;
        let appointment = match ctx.repos.appointments.find(&task.appointment_ref).await {
            Ok(Some(appointment)) => appointment,
            Ok(None) => {
                info!(
                    "Reminder task {} skipped: appointment {} not found",
                    task.offset_id(),
                    task.appointment_ref
                );
                return Ok(TaskOutcome::AppointmentNotFound);
            }
            Err(e) => {
                error!(
                    "Unable to read appointment {}. Err: {:?}",
                    task.appointment_ref, e
                );
                return Err(UseCaseError::StorageError);
            }
        };
        if appointment.is_cancelled() {
            return Ok(TaskOutcome::Cancelled);
        }

        let (offset_id, offset_minutes) = match &task.target {
            ReminderTarget::Checkpoint => {
                let usecase = PlanAppointmentRemindersUseCase {
                    appointment_ref: task.appointment_ref.clone(),
                    appointment,
                    tenant_hint: Some(task.tenant_id.clone()),
                };
                // Settings edits become visible at every checkpoint
                ctx.offsets_cache.invalidate(&task.tenant_id);
                return execute(usecase, ctx)
                    .await
                    .map(TaskOutcome::Replanned)
                    .map_err(UseCaseError::from);
            }
            ReminderTarget::Offset {
                offset_id,
                offset_minutes,
            } => (offset_id.clone(), *offset_minutes),
        };

        if appointment.has_sent_flag(&offset_id) {
            return Ok(TaskOutcome::AlreadySent);
        }
        let now = ctx.sys.get_timestamp_millis();
        match appointment.start_ts() {
            Some(start) if start > now => (),
            _ => return Ok(TaskOutcome::Elapsed),
        }

        // Claim the offset before sending. A concurrent execution of the same
        // task loses the claim and sends nothing.
        let claimed = ctx
            .repos
            .appointments
            .mark_sent_if_unset(&task.appointment_ref, &offset_id)
            .await
            .map_err(|e| {
                error!(
                    "Unable to mark reminder {} of {} as sent. Err: {:?}",
                    offset_id, task.appointment_ref, e
                );
                UseCaseError::StorageError
            })?;
        if !claimed {
            return Ok(TaskOutcome::AlreadySent);
        }

        let usecase = SendReminderNotificationUseCase {
            appointment,
            tenant_id: task.tenant_id.clone(),
            appointment_id: task.appointment_id.clone(),
            offset_id,
            offset_minutes,
        };
        match execute(usecase, ctx).await {
            Ok(report) => Ok(TaskOutcome::Sent(report)),
            Err(e) => match e {},
        }
    }
}
