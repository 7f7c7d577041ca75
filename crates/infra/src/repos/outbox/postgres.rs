use super::IOutboxRepo;
use reminder_scheduler_domain::{OutboxEntry, OutboxMetadata, OutboxStatus};
use sqlx::{types::Json, FromRow, PgPool};

pub struct PostgresOutboxRepo {
    pool: PgPool,
}

impl PostgresOutboxRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct OutboxEntryRaw {
    entry_id: String,
    tenant_id: String,
    client_id: String,
    appointment_id: String,
    offset_id: String,
    kind: String,
    channel: String,
    status: String,
    title: String,
    body: String,
    offset_minutes: Option<i64>,
    appointment_start: Option<i64>,
    relative_label: Option<String>,
    scheduled_at: i64,
    sent_at: Option<i64>,
    created_at: i64,
    updated_at: i64,
    metadata: Json<OutboxMetadata>,
}

fn status_to_str(status: OutboxStatus) -> &'static str {
    match status {
        OutboxStatus::Sent => "sent",
        OutboxStatus::Failed => "failed",
    }
}

impl From<OutboxEntryRaw> for OutboxEntry {
    fn from(raw: OutboxEntryRaw) -> Self {
        Self {
            id: raw.entry_id,
            tenant_id: raw.tenant_id,
            client_id: raw.client_id,
            appointment_id: raw.appointment_id,
            offset_id: raw.offset_id,
            kind: raw.kind,
            channel: raw.channel,
            status: if raw.status == "sent" {
                OutboxStatus::Sent
            } else {
                OutboxStatus::Failed
            },
            title: raw.title,
            body: raw.body,
            offset_minutes: raw.offset_minutes,
            appointment_start: raw.appointment_start,
            relative_label: raw.relative_label,
            scheduled_at: raw.scheduled_at,
            sent_at: raw.sent_at,
            created_at: raw.created_at,
            updated_at: raw.updated_at,
            metadata: raw.metadata.0,
        }
    }
}

#[async_trait::async_trait]
impl IOutboxRepo for PostgresOutboxRepo {
    async fn upsert(&self, e: &OutboxEntry) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO message_outbox (
                entry_id,
                tenant_id,
                client_id,
                appointment_id,
                offset_id,
                kind,
                channel,
                status,
                title,
                body,
                offset_minutes,
                appointment_start,
                relative_label,
                scheduled_at,
                sent_at,
                created_at,
                updated_at,
                metadata
            )
            VALUES($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)
            ON CONFLICT (entry_id) DO UPDATE SET
                status = EXCLUDED.status,
                title = EXCLUDED.title,
                body = EXCLUDED.body,
                offset_minutes = EXCLUDED.offset_minutes,
                appointment_start = EXCLUDED.appointment_start,
                relative_label = EXCLUDED.relative_label,
                sent_at = EXCLUDED.sent_at,
                updated_at = EXCLUDED.updated_at,
                metadata = EXCLUDED.metadata
            "#,
        )
        .bind(&e.id)
        .bind(&e.tenant_id)
        .bind(&e.client_id)
        .bind(&e.appointment_id)
        .bind(&e.offset_id)
        .bind(&e.kind)
        .bind(&e.channel)
        .bind(status_to_str(e.status))
        .bind(&e.title)
        .bind(&e.body)
        .bind(e.offset_minutes)
        .bind(e.appointment_start)
        .bind(&e.relative_label)
        .bind(e.scheduled_at)
        .bind(e.sent_at)
        .bind(e.created_at)
        .bind(e.updated_at)
        .bind(Json(&e.metadata))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find(&self, entry_id: &str) -> anyhow::Result<Option<OutboxEntry>> {
        let raw = sqlx::query_as::<_, OutboxEntryRaw>(
            r#"
            SELECT * FROM message_outbox
            WHERE entry_id = $1
            "#,
        )
        .bind(entry_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(raw.map(OutboxEntry::from))
    }
}
