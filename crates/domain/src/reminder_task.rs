use crate::appointment::AppointmentRef;
use serde::{Deserialize, Serialize};

/// Offset id used on the wire for checkpoint tasks
pub const CHECKPOINT_OFFSET_ID: &str = "CHECKPOINT";

/// What a `ReminderTask` does once the deferred queue hands it back
#[derive(Debug, Clone, PartialEq)]
pub enum ReminderTarget {
    /// Re-run planning for the appointment. Scheduled when the appointment
    /// starts further away than the queue can schedule.
    Checkpoint,
    /// Send the reminder for one configured offset
    Offset {
        offset_id: String,
        offset_minutes: Option<i64>,
    },
}

/// The message passed through the deferred task queue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "ReminderTaskPayload", into = "ReminderTaskPayload")]
pub struct ReminderTask {
    pub tenant_id: String,
    pub appointment_id: String,
    pub appointment_ref: AppointmentRef,
    pub target: ReminderTarget,
}

impl ReminderTask {
    pub fn checkpoint(tenant_id: &str, appointment_ref: &AppointmentRef) -> Self {
        Self {
            tenant_id: tenant_id.to_string(),
            appointment_id: appointment_ref.appointment_id().to_string(),
            appointment_ref: appointment_ref.clone(),
            target: ReminderTarget::Checkpoint,
        }
    }

    pub fn offset(
        tenant_id: &str,
        appointment_ref: &AppointmentRef,
        offset_id: &str,
        offset_minutes: i64,
    ) -> Self {
        Self {
            tenant_id: tenant_id.to_string(),
            appointment_id: appointment_ref.appointment_id().to_string(),
            appointment_ref: appointment_ref.clone(),
            target: ReminderTarget::Offset {
                offset_id: offset_id.to_string(),
                offset_minutes: Some(offset_minutes),
            },
        }
    }

    pub fn offset_id(&self) -> &str {
        match &self.target {
            ReminderTarget::Checkpoint => CHECKPOINT_OFFSET_ID,
            ReminderTarget::Offset { offset_id, .. } => offset_id,
        }
    }

    pub fn is_checkpoint(&self) -> bool {
        self.target == ReminderTarget::Checkpoint
    }
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReminderTaskPayload {
    tenant_id: String,
    appointment_id: String,
    appointment_ref: AppointmentRef,
    offset_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    offset_minutes: Option<i64>,
}

impl From<ReminderTaskPayload> for ReminderTask {
    fn from(p: ReminderTaskPayload) -> Self {
        let target = if p.offset_id == CHECKPOINT_OFFSET_ID {
            ReminderTarget::Checkpoint
        } else {
            ReminderTarget::Offset {
                offset_id: p.offset_id,
                offset_minutes: p.offset_minutes,
            }
        };
        Self {
            tenant_id: p.tenant_id,
            appointment_id: p.appointment_id,
            appointment_ref: p.appointment_ref,
            target,
        }
    }
}

impl From<ReminderTask> for ReminderTaskPayload {
    fn from(task: ReminderTask) -> Self {
        let (offset_id, offset_minutes) = match task.target {
            ReminderTarget::Checkpoint => (CHECKPOINT_OFFSET_ID.to_string(), None),
            ReminderTarget::Offset {
                offset_id,
                offset_minutes,
            } => (offset_id, offset_minutes),
        };
        Self {
            tenant_id: task.tenant_id,
            appointment_id: task.appointment_id,
            appointment_ref: task.appointment_ref,
            offset_id,
            offset_minutes,
        }
    }
}
