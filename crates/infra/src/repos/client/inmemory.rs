use super::IClientRepo;
use crate::repos::shared::inmemory_repo::*;
use reminder_scheduler_domain::Client;
use std::sync::Mutex;

pub struct InMemoryClientRepo {
    clients: Mutex<Vec<Client>>,
}

impl InMemoryClientRepo {
    pub fn new() -> Self {
        Self {
            clients: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait::async_trait]
impl IClientRepo for InMemoryClientRepo {
    async fn save(&self, client: &Client) -> anyhow::Result<()> {
        upsert(client, &self.clients);
        Ok(())
    }

    async fn find(&self, client_id: &str) -> anyhow::Result<Option<Client>> {
        Ok(find(client_id, &self.clients))
    }

    async fn remove_tokens(&self, client_id: &str, tokens: &[String]) -> anyhow::Result<()> {
        update_one(
            &self.clients,
            |c| c.id == client_id,
            |c| c.fcm_tokens.retain(|t| !tokens.contains(t)),
        );
        Ok(())
    }
}
