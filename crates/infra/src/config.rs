use reminder_scheduler_domain::Tz;
use reminder_scheduler_utils::create_random_secret;
use std::str::FromStr;
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct Config {
    /// Port for the application to run on
    pub port: usize,
    /// Key that internal callers (task queue, store triggers, operators)
    /// must send in the `reminders-internal-key` header
    pub internal_api_key: String,
    /// The furthest ahead the deferred task queue accepts a schedule time.
    /// Appointments starting later than this get a checkpoint task instead
    /// of their reminders.
    pub max_horizon_millis: i64,
    /// How long resolved reminder offsets of a tenant are cached
    pub offsets_cache_ttl_millis: i64,
    /// Tenants kept in the offsets cache before the least recently used are
    /// evicted
    pub offsets_cache_max_capacity: u64,
    /// Timezone used for notification copy when the tenant has none configured
    pub default_timezone: Tz,
    /// Period of the reconciliation sweep
    pub sweep_interval_secs: u64,
    /// Maximum appointments fetched per start field variant in one sweep
    pub sweep_batch_limit: usize,
    /// Every attempt of a reminder task must finish within this deadline
    pub task_dispatch_deadline_secs: u64,
    /// Attempts after which a failing reminder task is dropped
    pub task_max_attempts: u32,
    pub task_max_concurrent_dispatches: usize,
    pub task_poll_interval_secs: u64,
    pub task_min_backoff_secs: u64,
    pub task_max_backoff_secs: u64,
}

fn env_or_default<T: FromStr + std::fmt::Display + Copy>(key: &str, default: T) -> T {
    match std::env::var(key) {
        Ok(value) => match value.parse::<T>() {
            Ok(value) => value,
            Err(_) => {
                warn!(
                    "The given {}: {} is not valid, falling back to the default: {}.",
                    key, value, default
                );
                default
            }
        },
        Err(_) => default,
    }
}

impl Config {
    pub fn new() -> Self {
        let internal_api_key = match std::env::var("REMINDERS_INTERNAL_KEY") {
            Ok(key) => key,
            Err(_) => {
                info!("Did not find REMINDERS_INTERNAL_KEY environment variable. Going to create one.");
                let key = create_random_secret(16);
                info!("Internal api key was generated and set to: {}", key);
                key
            }
        };
        let default_timezone = match std::env::var("REMINDERS_DEFAULT_TIMEZONE") {
            Ok(tz) => match tz.parse::<Tz>() {
                Ok(tz) => tz,
                Err(_) => {
                    warn!(
                        "The given REMINDERS_DEFAULT_TIMEZONE: {} is not valid, falling back to Europe/Rome.",
                        tz
                    );
                    chrono_tz::Europe::Rome
                }
            },
            Err(_) => chrono_tz::Europe::Rome,
        };

        Self {
            port: env_or_default("PORT", 5000),
            internal_api_key,
            max_horizon_millis: 1000 * 60 * 60 * 24 * 30, // 30 days
            offsets_cache_ttl_millis: 1000 * 60 * 5,       // 5 minutes
            offsets_cache_max_capacity: 10_000,
            default_timezone,
            sweep_interval_secs: env_or_default("REMINDERS_SWEEP_INTERVAL_SECS", 15 * 60),
            sweep_batch_limit: 500,
            task_dispatch_deadline_secs: 300,
            task_max_attempts: 5,
            task_max_concurrent_dispatches: env_or_default("REMINDERS_MAX_CONCURRENT_TASKS", 20),
            task_poll_interval_secs: 5,
            task_min_backoff_secs: 10,
            task_max_backoff_secs: 60 * 60,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
