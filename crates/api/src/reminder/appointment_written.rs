use super::plan_appointment_reminders::{
    PlanAppointmentRemindersUseCase, UseCaseError as PlanError,
};
use crate::error::ReminderApiError;
use crate::shared::auth::protect_internal_route;
use crate::shared::usecase::{execute, UseCase};
use actix_web::{web, HttpRequest, HttpResponse};
use reminder_scheduler_api_structs::appointment_written::{APIResponse, RequestBody};
use reminder_scheduler_domain::{AppointmentRef, PlanOutcome};
use reminder_scheduler_infra::ReminderContext;
use tracing::error;

pub async fn appointment_written_controller(
    http_req: HttpRequest,
    body: web::Json<RequestBody>,
    ctx: web::Data<ReminderContext>,
) -> Result<HttpResponse, ReminderApiError> {
    protect_internal_route(&http_req, &ctx)?;

    let body = body.into_inner();
    let usecase = AppointmentWrittenUseCase {
        appointment_ref: body.appointment_ref,
        tenant_hint: body.tenant_id,
    };

    execute(usecase, &ctx)
        .await
        .map(|outcome| {
            let res = match outcome {
                WriteOutcome::AppointmentNotFound => APIResponse::not_found(),
                WriteOutcome::Cancelled => APIResponse::cancelled(),
                WriteOutcome::Planned(plan) => APIResponse::planned(plan),
            };
            HttpResponse::Ok().json(res)
        })
        .map_err(ReminderApiError::from)
}

/// Reacts to a created or updated appointment by planning its reminders
#[derive(Debug)]
pub struct AppointmentWrittenUseCase {
    pub appointment_ref: AppointmentRef,
    /// Tenant of the write trigger, if it knows one
    pub tenant_hint: Option<String>,
}

#[derive(Debug, PartialEq)]
pub enum WriteOutcome {
    /// Deleted appointments have nothing to plan
    AppointmentNotFound,
    Cancelled,
    Planned(PlanOutcome),
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
impl UseCase for AppointmentWrittenUseCase {
    type Response = WriteOutcome;

    type Error = UseCaseError;

    const NAME: &'static str = "AppointmentWritten";

    async fn execute(&mut self, ctx: &ReminderContext) -> Result<Self::Response, Self::Error> {
        let appointment = match ctx.repos.appointments.find(&self.appointment_ref).await {
            Ok(Some(appointment)) => appointment,
            Ok(None) => return Ok(WriteOutcome::AppointmentNotFound),
            Err(e) => {
                error!(
                    "Unable to read appointment {}. Err: {:?}",
                    self.appointment_ref, e
                );
                return Err(UseCaseError::StorageError);
            }
        };
        if appointment.is_cancelled() {
            return Ok(WriteOutcome::Cancelled);
        }

        let usecase = PlanAppointmentRemindersUseCase {
            appointment_ref: self.appointment_ref.clone(),
            appointment,
            tenant_hint: self.tenant_hint.clone(),
        };
        let plan = execute(usecase, ctx).await?;
        Ok(WriteOutcome::Planned(plan))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::testing::{setup, HOUR, NOW};
    use serde_json::json;

    #[actix_web::test]
    async fn plans_written_appointments() {
        let t = setup();
        t.save_settings("t1", json!({ "oneHourEnabled": true })).await;
        let r = t
            .save_appointment("tenants/t1/appointments/a1", json!({ "start": NOW + 3 * HOUR }))
            .await;

        let mut usecase = AppointmentWrittenUseCase {
            appointment_ref: r,
            tenant_hint: None,
        };
        let res = usecase.execute(&t.ctx).await.unwrap();
        assert_eq!(
            res,
            WriteOutcome::Planned(PlanOutcome::Scheduled {
                tenant_id: "t1".into(),
                offset_ids: vec!["M60".into()]
            })
        );
        assert_eq!(t.scheduled(), vec![("M60".to_string(), NOW + 2 * HOUR)]);
    }

    #[actix_web::test]
    async fn ignores_deleted_and_cancelled_appointments() {
        let t = setup();
        t.save_settings("t1", json!({ "oneHourEnabled": true })).await;
        let r = t
            .save_appointment(
                "tenants/t1/appointments/a1",
                json!({ "start": NOW + 3 * HOUR, "cancelled": true, "status": "confirmed" }),
            )
            .await;

        let mut usecase = AppointmentWrittenUseCase {
            appointment_ref: r,
            tenant_hint: None,
        };
        assert_eq!(usecase.execute(&t.ctx).await.unwrap(), WriteOutcome::Cancelled);

        let mut usecase = AppointmentWrittenUseCase {
            appointment_ref: "appointments/gone".parse().unwrap(),
            tenant_hint: Some("t1".into()),
        };
        assert_eq!(
            usecase.execute(&t.ctx).await.unwrap(),
            WriteOutcome::AppointmentNotFound
        );
        assert!(t.scheduled().is_empty());
    }
}
