mod appointment;
mod client;
mod outbox;
mod shared;
mod tenant_settings;

pub use appointment::IAppointmentRepo;
use appointment::{InMemoryAppointmentRepo, PostgresAppointmentRepo};
pub use client::IClientRepo;
use client::{InMemoryClientRepo, PostgresClientRepo};
pub use outbox::IOutboxRepo;
use outbox::{InMemoryOutboxRepo, PostgresOutboxRepo};
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::sync::Arc;
pub use tenant_settings::ITenantSettingsRepo;
use tenant_settings::{InMemoryTenantSettingsRepo, PostgresTenantSettingsRepo};
use tracing::info;

#[derive(Clone)]
pub struct Repos {
    pub tenant_settings: Arc<dyn ITenantSettingsRepo>,
    pub appointments: Arc<dyn IAppointmentRepo>,
    pub clients: Arc<dyn IClientRepo>,
    pub outbox: Arc<dyn IOutboxRepo>,
}

impl Repos {
    pub async fn create_postgres(connection_string: &str) -> anyhow::Result<(Self, PgPool)> {
        info!("DB CHECKING CONNECTION ...");
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(connection_string)
            .await?;
        info!("DB CHECKING CONNECTION ... [done]");

        let repos = Self {
            tenant_settings: Arc::new(PostgresTenantSettingsRepo::new(pool.clone())),
            appointments: Arc::new(PostgresAppointmentRepo::new(pool.clone())),
            clients: Arc::new(PostgresClientRepo::new(pool.clone())),
            outbox: Arc::new(PostgresOutboxRepo::new(pool.clone())),
        };
        Ok((repos, pool))
    }

    pub fn create_inmemory() -> Self {
        Self {
            tenant_settings: Arc::new(InMemoryTenantSettingsRepo::new()),
            appointments: Arc::new(InMemoryAppointmentRepo::new()),
            clients: Arc::new(InMemoryClientRepo::new()),
            outbox: Arc::new(InMemoryOutboxRepo::new()),
        }
    }
}
