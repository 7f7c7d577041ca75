use super::IOutboxRepo;
use crate::repos::shared::inmemory_repo::*;
use reminder_scheduler_domain::OutboxEntry;
use std::sync::Mutex;

pub struct InMemoryOutboxRepo {
    entries: Mutex<Vec<OutboxEntry>>,
}

impl InMemoryOutboxRepo {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait::async_trait]
impl IOutboxRepo for InMemoryOutboxRepo {
    async fn upsert(&self, entry: &OutboxEntry) -> anyhow::Result<()> {
        let mut entry = entry.clone();
        if let Some(existing) = find(&entry.id, &self.entries) {
            entry.scheduled_at = existing.scheduled_at;
            entry.created_at = existing.created_at;
        }
        upsert(&entry, &self.entries);
        Ok(())
    }

    async fn find(&self, entry_id: &str) -> anyhow::Result<Option<OutboxEntry>> {
        Ok(find(entry_id, &self.entries))
    }
}
