use crate::outbox::{OutboxMetadata, OutboxStatus};

/// What planning did for one appointment
#[derive(Debug, Clone, PartialEq)]
pub enum PlanOutcome {
    /// No tenant could be resolved for the appointment
    MissingTenant,
    MissingStart,
    /// The appointment has already started
    Elapsed,
    /// The appointment is beyond the horizon, planning continues at `fire_at`
    Checkpoint { tenant_id: String, fire_at: i64 },
    /// Reminder tasks were enqueued for these offsets. Offsets that are
    /// inactive, already sent or already due are left out.
    Scheduled {
        tenant_id: String,
        offset_ids: Vec<String>,
    },
}

/// Result of one delivery attempt of a reminder
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchReport {
    /// The client the outbox entry was written for
    pub client_id: Option<String>,
    pub token_count: usize,
    pub status: OutboxStatus,
    pub metadata: OutboxMetadata,
    /// Invalid tokens removed from the stored token set of the client
    pub removed_token_count: usize,
}

/// Terminal state of one execution of a `ReminderTask`
#[derive(Debug, Clone, PartialEq)]
pub enum TaskOutcome {
    AppointmentNotFound,
    Cancelled,
    Replanned(PlanOutcome),
    AlreadySent,
    Elapsed,
    Sent(DispatchReport),
}

/// Result of one reconciliation sweep
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SweepReport {
    /// Distinct appointments found inside the horizon
    pub scanned: usize,
    /// Appointments that got reminder or checkpoint tasks
    pub planned: usize,
    pub skipped_cancelled: usize,
    /// Appointments without a tenant or a start, or already started, where
    /// planning scheduled nothing
    pub skipped_incomplete: usize,
    /// Appointments where planning failed. They are picked up again by the
    /// next sweep.
    pub failed: usize,
}
