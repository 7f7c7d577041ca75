mod inmemory;
mod postgres;

pub use inmemory::InMemoryOutboxRepo;
pub use postgres::PostgresOutboxRepo;
use reminder_scheduler_domain::OutboxEntry;

#[async_trait::async_trait]
pub trait IOutboxRepo: Send + Sync {
    /// Creates the entry, or updates the entry with the same id while keeping
    /// its `scheduled_at` and `created_at`
    async fn upsert(&self, entry: &OutboxEntry) -> anyhow::Result<()>;
    async fn find(&self, entry_id: &str) -> anyhow::Result<Option<OutboxEntry>>;
}

#[cfg(test)]
mod tests {
    use crate::ReminderContext;
    use reminder_scheduler_domain::{OutboxEntry, OutboxMetadata, OutboxStatus};

    fn entry(ts: i64, status: OutboxStatus) -> OutboxEntry {
        OutboxEntry {
            id: OutboxEntry::reminder_id("t1", "c1", "a1", "M60"),
            tenant_id: "t1".into(),
            client_id: "c1".into(),
            appointment_id: "a1".into(),
            offset_id: "M60".into(),
            kind: "appointment_reminder".into(),
            channel: "push".into(),
            status,
            title: "title".into(),
            body: "body".into(),
            offset_minutes: Some(60),
            appointment_start: None,
            relative_label: None,
            scheduled_at: ts,
            sent_at: None,
            created_at: ts,
            updated_at: ts,
            metadata: OutboxMetadata::default(),
        }
    }

    #[tokio::test]
    async fn upsert_keeps_first_schedule_time() {
        let ctx = ReminderContext::create_inmemory();
        let repo = &ctx.repos.outbox;

        let first = entry(100, OutboxStatus::Failed);
        repo.upsert(&first).await.unwrap();
        let second = entry(200, OutboxStatus::Sent);
        repo.upsert(&second).await.unwrap();

        let stored = repo.find(&first.id).await.unwrap().expect("To find entry");
        assert_eq!(stored.status, OutboxStatus::Sent);
        assert_eq!(stored.scheduled_at, 100);
        assert_eq!(stored.created_at, 100);
        assert_eq!(stored.updated_at, 200);
    }
}
