use crate::Config;
use moka::sync::Cache;
use reminder_scheduler_domain::ReminderOffsetConfig;
use std::time::Duration;

/// Resolved reminder offsets keyed by tenant id. Entries expire after the
/// configured ttl and the least recently used tenants are evicted once the
/// capacity is reached.
pub type OffsetsCache = Cache<String, Vec<ReminderOffsetConfig>>;

pub fn create_offsets_cache(config: &Config) -> OffsetsCache {
    Cache::builder()
        .max_capacity(config.offsets_cache_max_capacity)
        .time_to_live(Duration::from_millis(
            config.offsets_cache_ttl_millis.max(1) as u64,
        ))
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offsets(minutes: &[i64]) -> Vec<ReminderOffsetConfig> {
        minutes
            .iter()
            .map(|m| ReminderOffsetConfig {
                id: format!("M{}", m),
                minutes_before: *m,
                active: true,
                title: None,
                body_template: None,
            })
            .collect()
    }

    #[test]
    fn entries_expire_after_ttl() {
        let mut config = Config::new();
        config.offsets_cache_ttl_millis = 50;
        let cache = create_offsets_cache(&config);

        cache.insert("t1".to_string(), offsets(&[60]));
        assert_eq!(cache.get("t1"), Some(offsets(&[60])));
        assert_eq!(cache.get("t2"), None);

        std::thread::sleep(Duration::from_millis(120));
        assert_eq!(cache.get("t1"), None);
    }

    #[test]
    fn invalidates_entries() {
        let cache = create_offsets_cache(&Config::new());
        cache.insert("t1".to_string(), offsets(&[60, 180]));
        cache.invalidate("t1");
        assert_eq!(cache.get("t1"), None);
    }
}
