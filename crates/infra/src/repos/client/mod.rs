mod inmemory;
mod postgres;

pub use inmemory::InMemoryClientRepo;
pub use postgres::PostgresClientRepo;
use reminder_scheduler_domain::Client;

#[async_trait::async_trait]
pub trait IClientRepo: Send + Sync {
    async fn save(&self, client: &Client) -> anyhow::Result<()>;
    async fn find(&self, client_id: &str) -> anyhow::Result<Option<Client>>;
    /// Removes the given tokens from the stored token set of the client.
    /// Not transactional with any other write.
    async fn remove_tokens(&self, client_id: &str, tokens: &[String]) -> anyhow::Result<()>;
}
