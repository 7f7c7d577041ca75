mod cache;
mod config;
mod repos;
mod services;
mod system;

pub use cache::{create_offsets_cache, OffsetsCache};
pub use config::Config;
pub use repos::{IAppointmentRepo, IClientRepo, IOutboxRepo, ITenantSettingsRepo, Repos};
pub use services::push::{
    is_invalid_token_code, FcmPushSender, IPushSender, InMemoryPushSender, MulticastResponse,
    PushCall, PushNotification, SendResult, INVALID_TOKEN_CODES,
};
pub use services::task_queue::{
    task_name, EnqueueOptions, ITaskQueue, InMemoryTaskQueue, PostgresTaskQueue, ScheduledTask,
};
pub use services::Services;
use sqlx::migrate::MigrateError;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
pub use system::{ISys, RealSys, StaticTimeSys};

#[derive(Clone)]
pub struct ReminderContext {
    pub repos: Repos,
    pub services: Services,
    pub config: Config,
    pub sys: Arc<dyn ISys>,
    pub offsets_cache: OffsetsCache,
}

struct ContextParams {
    pub postgres_connection_string: String,
    pub fcm_project_id: String,
    pub fcm_access_token: String,
}

impl ReminderContext {
    async fn create(params: ContextParams) -> Self {
        let config = Config::new();
        let sys: Arc<dyn ISys> = Arc::new(RealSys {});
        let (repos, pool) = Repos::create_postgres(&params.postgres_connection_string)
            .await
            .expect("Postgres credentials must be set and valid");
        let services = Services {
            push: Arc::new(FcmPushSender::new(
                params.fcm_project_id,
                params.fcm_access_token,
            )),
            task_queue: Arc::new(PostgresTaskQueue::new(
                pool,
                sys.clone(),
                config.max_horizon_millis,
            )),
        };
        Self {
            offsets_cache: create_offsets_cache(&config),
            repos,
            services,
            config,
            sys,
        }
    }

    /// Context backed by in-memory repositories and services, running on the
    /// real clock
    pub fn create_inmemory() -> Self {
        Self::create_inmemory_with_sys(Arc::new(RealSys {}))
    }

    /// Context backed by in-memory repositories and services with the clock
    /// frozen at `now`
    pub fn create_inmemory_at(now: i64) -> Self {
        Self::create_inmemory_with_sys(Arc::new(StaticTimeSys(now)))
    }

    fn create_inmemory_with_sys(sys: Arc<dyn ISys>) -> Self {
        let config = Config::new();
        let services = Services {
            push: Arc::new(InMemoryPushSender::new()),
            task_queue: Arc::new(InMemoryTaskQueue::new(
                sys.clone(),
                config.max_horizon_millis,
            )),
        };
        Self {
            repos: Repos::create_inmemory(),
            offsets_cache: create_offsets_cache(&config),
            services,
            config,
            sys,
        }
    }
}

/// Will setup the infrastructure context given the environment
pub async fn setup_context() -> ReminderContext {
    ReminderContext::create(ContextParams {
        postgres_connection_string: get_psql_connection_string(),
        fcm_project_id: get_env_var("FCM_PROJECT_ID"),
        fcm_access_token: get_env_var("FCM_ACCESS_TOKEN"),
    })
    .await
}

fn get_env_var(key: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| panic!("{} env var to be present.", key))
}

fn get_psql_connection_string() -> String {
    get_env_var("DATABASE_URL")
}

pub async fn run_migration() -> Result<(), MigrateError> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&get_psql_connection_string())
        .await
        .expect("TO CONNECT TO POSTGRES");

    sqlx::migrate!().run(&pool).await
}
