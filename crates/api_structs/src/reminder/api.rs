use crate::dtos::{PlanOutcomeDTO, SweepReportDTO, TaskOutcomeDTO};
use reminder_scheduler_domain::{PlanOutcome, SweepReport, TaskOutcome};
use serde::{Deserialize, Serialize};

pub mod execute_reminder_task {
    use super::*;

    pub type RequestBody = reminder_scheduler_domain::ReminderTask;

    #[derive(Debug, Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct APIResponse {
        pub result: TaskOutcomeDTO,
    }

    impl APIResponse {
        pub fn new(outcome: TaskOutcome) -> Self {
            Self {
                result: TaskOutcomeDTO::new(&outcome),
            }
        }
    }
}

pub mod appointment_written {
    use super::*;
    use reminder_scheduler_domain::AppointmentRef;

    #[derive(Debug, Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct RequestBody {
        pub appointment_ref: AppointmentRef,
        #[serde(default)]
        pub tenant_id: Option<String>,
    }

    #[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
    #[serde(tag = "outcome", rename_all = "camelCase")]
    pub enum WriteOutcomeDTO {
        AppointmentNotFound,
        Cancelled,
        Planned { plan: PlanOutcomeDTO },
    }

    #[derive(Debug, Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct APIResponse {
        pub result: WriteOutcomeDTO,
    }

    impl APIResponse {
        pub fn not_found() -> Self {
            Self {
                result: WriteOutcomeDTO::AppointmentNotFound,
            }
        }

        pub fn cancelled() -> Self {
            Self {
                result: WriteOutcomeDTO::Cancelled,
            }
        }

        pub fn planned(plan: PlanOutcome) -> Self {
            Self {
                result: WriteOutcomeDTO::Planned {
                    plan: PlanOutcomeDTO::new(&plan),
                },
            }
        }
    }
}

pub mod sweep_appointment_reminders {
    use super::*;

    #[derive(Debug, Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct APIResponse {
        pub report: SweepReportDTO,
    }

    impl APIResponse {
        pub fn new(report: SweepReport) -> Self {
            Self {
                report: SweepReportDTO::new(&report),
            }
        }
    }
}
