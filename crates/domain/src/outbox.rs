use crate::reminder_offset::normalize_slug;
use crate::shared::entity::Entity;
use serde::{Deserialize, Serialize};

pub const REMINDER_OUTBOX_TYPE: &str = "appointment_reminder";
pub const PUSH_CHANNEL: &str = "push";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutboxStatus {
    Sent,
    Failed,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutboxMetadata {
    pub success_count: usize,
    pub failure_count: usize,
    pub invalid_token_count: usize,
}

/// Audit record of one reminder delivery attempt.
///
/// There is exactly one entry per (tenant, client, appointment, offset):
/// re-running the same delivery overwrites the entry, keeping `scheduled_at`
/// and `created_at` from the first attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutboxEntry {
    pub id: String,
    pub tenant_id: String,
    pub client_id: String,
    pub appointment_id: String,
    pub offset_id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub channel: String,
    pub status: OutboxStatus,
    pub title: String,
    pub body: String,
    pub offset_minutes: Option<i64>,
    pub appointment_start: Option<i64>,
    pub relative_label: Option<String>,
    pub scheduled_at: i64,
    pub sent_at: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
    pub metadata: OutboxMetadata,
}

impl OutboxEntry {
    pub fn reminder_id(
        tenant_id: &str,
        client_id: &str,
        appointment_id: &str,
        offset_id: &str,
    ) -> String {
        format!(
            "reminder_{}_{}_{}_{}",
            tenant_id,
            client_id,
            appointment_id,
            normalize_slug(Some(offset_id), "OFFSET")
        )
    }

    pub fn status_for(metadata: &OutboxMetadata) -> OutboxStatus {
        if metadata.success_count > 0 {
            OutboxStatus::Sent
        } else {
            OutboxStatus::Failed
        }
    }
}

impl Entity for OutboxEntry {
    fn id(&self) -> &str {
        &self.id
    }
}
