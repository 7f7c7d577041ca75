use super::plan_appointment_reminders::PlanAppointmentRemindersUseCase;
use crate::error::ReminderApiError;
use crate::shared::auth::protect_internal_route;
use crate::shared::usecase::{execute, UseCase};
use actix_web::{web, HttpRequest, HttpResponse};
use futures::future::join_all;
use reminder_scheduler_api_structs::sweep_appointment_reminders::APIResponse;
use reminder_scheduler_domain::{PlanOutcome, StartField, SweepReport};
use reminder_scheduler_infra::ReminderContext;
use std::collections::HashSet;
use tracing::{error, info};

pub async fn sweep_appointment_reminders_controller(
    http_req: HttpRequest,
    ctx: web::Data<ReminderContext>,
) -> Result<HttpResponse, ReminderApiError> {
    protect_internal_route(&http_req, &ctx)?;

    execute(SweepAppointmentRemindersUseCase {}, &ctx)
        .await
        .map(|report| HttpResponse::Ok().json(APIResponse::new(report)))
        .map_err(ReminderApiError::from)
}

/// Plans again every appointment that starts inside the horizon, healing
/// lost write triggers and settings edits
#[derive(Debug)]
pub struct SweepAppointmentRemindersUseCase {}

#[derive(Debug, PartialEq)]
pub enum UseCaseError {
    StorageError,
}

impl From<UseCaseError> for ReminderApiError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::StorageError => Self::InternalError,
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for SweepAppointmentRemindersUseCase {
    type Response = SweepReport;

    type Error = UseCaseError;

    const NAME: &'static str = "SweepAppointmentReminders";

    async fn execute(&mut self, ctx: &ReminderContext) -> Result<Self::Response, Self::Error> {
        let now = ctx.sys.get_timestamp_millis();
        let until = now + ctx.config.max_horizon_millis;

        let mut seen = HashSet::new();
        let mut snapshots = Vec::new();
        for field in StartField::ALL.iter() {
            let found = ctx
                .repos
                .appointments
                .find_starting_between(*field, now, until, ctx.config.sweep_batch_limit)
                .await
                .map_err(|e| {
                    error!(
                        "Unable to query appointments by {}. Err: {:?}",
                        field.field_name(),
                        e
                    );
                    UseCaseError::StorageError
                })?;
            for snapshot in found {
                if seen.insert(snapshot.reference.path()) {
                    snapshots.push(snapshot);
                }
            }
        }

        let mut report = SweepReport {
            scanned: snapshots.len(),
            ..Default::default()
        };
        let mut plans = Vec::with_capacity(snapshots.len());
        for snapshot in snapshots {
            if snapshot.appointment.is_cancelled() {
                report.skipped_cancelled += 1;
                continue;
            }
            plans.push(execute(
                PlanAppointmentRemindersUseCase {
                    appointment_ref: snapshot.reference,
                    appointment: snapshot.appointment,
                    tenant_hint: None,
                },
                ctx,
            ));
        }
        for res in join_all(plans).await {
            match res {
                Ok(PlanOutcome::Scheduled { .. }) | Ok(PlanOutcome::Checkpoint { .. }) => {
                    report.planned += 1
                }
                Ok(PlanOutcome::MissingTenant)
                | Ok(PlanOutcome::MissingStart)
                | Ok(PlanOutcome::Elapsed) => report.skipped_incomplete += 1,
                Err(_) => report.failed += 1,
            }
        }

        info!(
            "Reminder sweep planned {} of {} appointments ({} cancelled, {} incomplete, {} failed)",
            report.planned,
            report.scanned,
            report.skipped_cancelled,
            report.skipped_incomplete,
            report.failed
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::testing::{setup, DAY, HOUR, MINUTE, NOW};
    use serde_json::json;

    #[actix_web::test]
    async fn plans_appointments_inside_horizon_once() {
        let t = setup();
        t.save_settings("t1", json!({ "appointmentOffsetsMinutes": [60] }))
            .await;
        let start = NOW + 2 * DAY;
        t.save_appointment(
            "tenants/t1/appointments/a1",
            json!({ "start": start, "startAt": start }),
        )
        .await;
        t.save_appointment(
            "tenants/t1/appointments/a2",
            json!({ "startAt": NOW + 5 * HOUR, "status": "CANCELLED" }),
        )
        .await;
        t.save_appointment("tenants/t1/appointments/a3", json!({ "start": NOW + 40 * DAY }))
            .await;
        t.save_appointment("tenants/t1/appointments/a4", json!({ "start": NOW - DAY }))
            .await;

        let report = SweepAppointmentRemindersUseCase {}
            .execute(&t.ctx)
            .await
            .unwrap();
        assert_eq!(
            report,
            SweepReport {
                scanned: 2,
                planned: 1,
                skipped_cancelled: 1,
                skipped_incomplete: 0,
                failed: 0,
            }
        );
        assert_eq!(t.scheduled(), vec![("M60".to_string(), start - 60 * MINUTE)]);
    }

    #[actix_web::test]
    async fn appointments_without_tenant_are_reported_as_incomplete() {
        let t = setup();
        t.save_appointment("appointments/a1", json!({ "start": NOW + HOUR }))
            .await;
        let report = SweepAppointmentRemindersUseCase {}
            .execute(&t.ctx)
            .await
            .unwrap();
        assert_eq!(report.scanned, 1);
        assert_eq!(report.planned, 0);
        assert_eq!(report.skipped_incomplete, 1);
        assert!(t.scheduled().is_empty());
    }
}
