use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Smallest lead time a tenant can configure
pub const MIN_OFFSET_MINUTES: i64 = 15;
/// Largest lead time a tenant can configure (7 days)
pub const MAX_OFFSET_MINUTES: i64 = 10080;
/// Maximum number of offsets kept per tenant
pub const MAX_OFFSETS_COUNT: usize = 5;

/// A `ReminderOffsetConfig` is a configured lead time before the start of an
/// `Appointment` at which the client should be notified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderOffsetConfig {
    /// Uppercased slug, unique per tenant. Also used in the sent-flag
    /// field name of the `Appointment`.
    pub id: String,
    pub minutes_before: i64,
    pub active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body_template: Option<String>,
}

impl ReminderOffsetConfig {
    pub fn millis_before(&self) -> i64 {
        self.minutes_before * 60 * 1000
    }
}

pub fn clamp_minutes(minutes: i64) -> i64 {
    minutes.max(MIN_OFFSET_MINUTES).min(MAX_OFFSET_MINUTES)
}

/// Uppercases the value and replaces everything outside of `[A-Z0-9_-]`
/// with a single `_`. Returns `fallback` if nothing is left.
pub fn normalize_slug(value: Option<&str>, fallback: &str) -> String {
    let value = match value {
        Some(v) => v.trim(),
        None => return fallback.to_string(),
    };
    if value.is_empty() {
        return fallback.to_string();
    }

    let mut slug = String::with_capacity(value.len());
    for c in value.to_uppercase().chars() {
        let c = if c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_' || c == '-' {
            c
        } else {
            '_'
        };
        if c == '_' && slug.ends_with('_') {
            continue;
        }
        slug.push(c);
    }
    slug
}

/// Hands out offset ids that are unique within one tenant configuration
#[derive(Debug, Default)]
pub struct OffsetIdAllocator {
    used: HashSet<String>,
}

impl OffsetIdAllocator {
    pub fn allocate(&mut self, base: &str, minutes: i64) -> String {
        let mut candidate = if base.is_empty() {
            format!("M{}", minutes)
        } else {
            base.to_string()
        };
        let suffix_base = if base.is_empty() { "OFFSET" } else { base };
        let mut suffix = 1;
        while self.used.contains(&candidate) {
            candidate = format!("{}_{}", suffix_base, suffix);
            suffix += 1;
        }
        self.used.insert(candidate.clone());
        candidate
    }
}

/// Caps and sorts normalized offsets into their canonical order
pub fn finalize_offsets(mut offsets: Vec<ReminderOffsetConfig>) -> Vec<ReminderOffsetConfig> {
    offsets.truncate(MAX_OFFSETS_COUNT);
    offsets.sort_by_key(|o| o.minutes_before);
    offsets
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamps_minutes() {
        assert_eq!(clamp_minutes(0), MIN_OFFSET_MINUTES);
        assert_eq!(clamp_minutes(-30), MIN_OFFSET_MINUTES);
        assert_eq!(clamp_minutes(60), 60);
        assert_eq!(clamp_minutes(20000), MAX_OFFSET_MINUTES);
    }

    #[test]
    fn normalizes_slugs() {
        assert_eq!(normalize_slug(Some("day before"), "X"), "DAY_BEFORE");
        assert_eq!(normalize_slug(Some("  one--hour "), "X"), "ONE--HOUR");
        assert_eq!(normalize_slug(Some("a!!b"), "X"), "A_B");
        assert_eq!(normalize_slug(Some("   "), "M60"), "M60");
        assert_eq!(normalize_slug(None, "M60"), "M60");
    }

    #[test]
    fn allocates_unique_ids() {
        let mut ids = OffsetIdAllocator::default();
        assert_eq!(ids.allocate("M60", 60), "M60");
        assert_eq!(ids.allocate("M60", 60), "M60_1");
        assert_eq!(ids.allocate("M60", 60), "M60_2");
        assert_eq!(ids.allocate("", 30), "M30");
        assert_eq!(ids.allocate("", 30), "OFFSET_1");
    }

    #[test]
    fn finalize_truncates_before_sorting() {
        let offsets = [300, 200, 100, 90, 80, 15]
            .iter()
            .map(|m| ReminderOffsetConfig {
                id: format!("M{}", m),
                minutes_before: *m,
                active: true,
                title: None,
                body_template: None,
            })
            .collect();
        let offsets = finalize_offsets(offsets);
        let minutes = offsets.iter().map(|o| o.minutes_before).collect::<Vec<_>>();
        assert_eq!(minutes, vec![80, 90, 100, 200, 300]);
    }
}
