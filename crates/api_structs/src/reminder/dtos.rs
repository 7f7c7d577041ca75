use reminder_scheduler_domain::{
    DispatchReport, OutboxStatus, PlanOutcome, SweepReport, TaskOutcome,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum PlanOutcomeDTO {
    MissingTenant,
    MissingStart,
    Elapsed,
    #[serde(rename_all = "camelCase")]
    Checkpoint { tenant_id: String, fire_at: i64 },
    #[serde(rename_all = "camelCase")]
    Scheduled {
        tenant_id: String,
        offset_ids: Vec<String>,
    },
}

impl PlanOutcomeDTO {
    pub fn new(outcome: &PlanOutcome) -> Self {
        match outcome {
            PlanOutcome::MissingTenant => Self::MissingTenant,
            PlanOutcome::MissingStart => Self::MissingStart,
            PlanOutcome::Elapsed => Self::Elapsed,
            PlanOutcome::Checkpoint { tenant_id, fire_at } => Self::Checkpoint {
                tenant_id: tenant_id.clone(),
                fire_at: *fire_at,
            },
            PlanOutcome::Scheduled {
                tenant_id,
                offset_ids,
            } => Self::Scheduled {
                tenant_id: tenant_id.clone(),
                offset_ids: offset_ids.clone(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchReportDTO {
    pub client_id: Option<String>,
    pub token_count: usize,
    pub status: OutboxStatus,
    pub success_count: usize,
    pub failure_count: usize,
    pub invalid_token_count: usize,
    pub removed_token_count: usize,
}

impl DispatchReportDTO {
    pub fn new(report: &DispatchReport) -> Self {
        Self {
            client_id: report.client_id.clone(),
            token_count: report.token_count,
            status: report.status,
            success_count: report.metadata.success_count,
            failure_count: report.metadata.failure_count,
            invalid_token_count: report.metadata.invalid_token_count,
            removed_token_count: report.removed_token_count,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum TaskOutcomeDTO {
    AppointmentNotFound,
    Cancelled,
    Replanned { plan: PlanOutcomeDTO },
    AlreadySent,
    Elapsed,
    Sent { report: DispatchReportDTO },
}

impl TaskOutcomeDTO {
    pub fn new(outcome: &TaskOutcome) -> Self {
        match outcome {
            TaskOutcome::AppointmentNotFound => Self::AppointmentNotFound,
            TaskOutcome::Cancelled => Self::Cancelled,
            TaskOutcome::Replanned(plan) => Self::Replanned {
                plan: PlanOutcomeDTO::new(plan),
            },
            TaskOutcome::AlreadySent => Self::AlreadySent,
            TaskOutcome::Elapsed => Self::Elapsed,
            TaskOutcome::Sent(report) => Self::Sent {
                report: DispatchReportDTO::new(report),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SweepReportDTO {
    pub scanned: usize,
    pub planned: usize,
    pub skipped_cancelled: usize,
    pub skipped_incomplete: usize,
    pub failed: usize,
}

impl SweepReportDTO {
    pub fn new(report: &SweepReport) -> Self {
        Self {
            scanned: report.scanned,
            planned: report.planned,
            skipped_cancelled: report.skipped_cancelled,
            skipped_incomplete: report.skipped_incomplete,
            failed: report.failed,
        }
    }
}
