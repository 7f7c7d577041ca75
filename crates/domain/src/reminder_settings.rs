use crate::notification::Locale;
use crate::reminder_offset::{
    clamp_minutes, finalize_offsets, normalize_slug, OffsetIdAllocator, ReminderOffsetConfig,
};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;

/// Minutes used by the three legacy toggles
const DAY_BEFORE_MINUTES: i64 = 1440;
const THREE_HOURS_MINUTES: i64 = 180;
const ONE_HOUR_MINUTES: i64 = 60;

/// The reminder settings document stored per tenant.
///
/// Tenants have configured their reminders in several shapes over time, so
/// every field is kept as raw json and interpreted on its own by its
/// accessor. A field of an unexpected type is ignored without affecting the
/// others. Use `offset_sources` to get the closed set of shapes this
/// document carries.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantReminderSettings {
    #[serde(default)]
    pub offsets: Option<Value>,
    #[serde(default)]
    pub appointment_offsets_minutes: Option<Value>,
    #[serde(default)]
    pub day_before_enabled: Option<Value>,
    #[serde(default)]
    pub three_hours_enabled: Option<Value>,
    #[serde(default)]
    pub one_hour_enabled: Option<Value>,
    #[serde(default)]
    pub locale: Option<Value>,
    #[serde(default)]
    pub timezone: Option<Value>,
}

/// One way a tenant can express its reminder offsets, in resolution order
#[derive(Debug, Clone, PartialEq)]
pub enum OffsetSource {
    /// Structured entries with `minutesBefore` and optional `id`, `title`,
    /// `bodyTemplate` and `active`
    Explicit(Vec<Value>),
    /// A flat list of minute values
    Minutes(Vec<Value>),
    /// The three legacy boolean toggles
    Legacy {
        day_before: bool,
        three_hours: bool,
        one_hour: bool,
    },
}

fn is_true(value: &Option<Value>) -> bool {
    matches!(value, Some(Value::Bool(true)))
}

fn as_str(value: &Option<Value>) -> Option<&str> {
    value.as_ref().and_then(Value::as_str)
}

impl TenantReminderSettings {
    pub fn offset_sources(&self) -> Vec<OffsetSource> {
        let mut sources = Vec::with_capacity(3);
        if let Some(Value::Array(entries)) = &self.offsets {
            sources.push(OffsetSource::Explicit(entries.clone()));
        }
        if let Some(Value::Array(minutes)) = &self.appointment_offsets_minutes {
            sources.push(OffsetSource::Minutes(minutes.clone()));
        }
        sources.push(OffsetSource::Legacy {
            day_before: is_true(&self.day_before_enabled),
            three_hours: is_true(&self.three_hours_enabled),
            one_hour: is_true(&self.one_hour_enabled),
        });
        sources
    }

    /// Resolves the canonical offsets: the first source that normalizes to a
    /// non-empty list wins, capped and sorted ascending.
    pub fn resolve_offsets(&self) -> Vec<ReminderOffsetConfig> {
        let offsets = self
            .offset_sources()
            .iter()
            .map(OffsetSource::normalize)
            .find(|offsets| !offsets.is_empty())
            .unwrap_or_default();
        finalize_offsets(offsets)
    }

    pub fn locale(&self) -> Locale {
        as_str(&self.locale).map(Locale::from_tag).unwrap_or_default()
    }

    pub fn timezone(&self, default: Tz) -> Tz {
        as_str(&self.timezone)
            .and_then(|tz| tz.trim().parse::<Tz>().ok())
            .unwrap_or(default)
    }
}

impl OffsetSource {
    pub fn normalize(&self) -> Vec<ReminderOffsetConfig> {
        match self {
            Self::Explicit(entries) => normalize_explicit(entries),
            Self::Minutes(values) => normalize_minutes(values),
            Self::Legacy {
                day_before,
                three_hours,
                one_hour,
            } => {
                let minutes = [
                    (*day_before, DAY_BEFORE_MINUTES),
                    (*three_hours, THREE_HOURS_MINUTES),
                    (*one_hour, ONE_HOUR_MINUTES),
                ]
                .iter()
                .filter(|(enabled, _)| *enabled)
                .map(|(_, minutes)| *minutes)
                .collect::<Vec<_>>();
                synthesize(&minutes)
            }
        }
    }
}

fn parse_minutes(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

fn non_empty_string(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

fn normalize_explicit(entries: &[Value]) -> Vec<ReminderOffsetConfig> {
    let mut ids = OffsetIdAllocator::default();
    entries
        .iter()
        .filter_map(Value::as_object)
        .filter_map(|raw| {
            let minutes = raw
                .get("minutesBefore")
                .and_then(parse_minutes)
                .or_else(|| raw.get("minutes").and_then(parse_minutes))?;
            let minutes = clamp_minutes(minutes);
            let slug = normalize_slug(
                raw.get("id").and_then(Value::as_str),
                &format!("M{}", minutes),
            );
            Some(ReminderOffsetConfig {
                id: ids.allocate(&slug, minutes),
                minutes_before: minutes,
                active: raw.get("active") != Some(&Value::Bool(false)),
                title: non_empty_string(raw.get("title")),
                body_template: non_empty_string(raw.get("bodyTemplate")),
            })
        })
        .collect()
}

fn normalize_minutes(values: &[Value]) -> Vec<ReminderOffsetConfig> {
    let minutes = values
        .iter()
        .filter_map(parse_minutes)
        .map(clamp_minutes)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect::<Vec<_>>();
    synthesize(&minutes)
}

fn synthesize(minutes: &[i64]) -> Vec<ReminderOffsetConfig> {
    let mut ids = OffsetIdAllocator::default();
    minutes
        .iter()
        .map(|m| {
            let minutes = clamp_minutes(*m);
            ReminderOffsetConfig {
                id: ids.allocate(&format!("M{}", minutes), minutes),
                minutes_before: minutes,
                active: true,
                title: None,
                body_template: None,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reminder_offset::{MAX_OFFSETS_COUNT, MAX_OFFSET_MINUTES, MIN_OFFSET_MINUTES};
    use serde_json::json;

    fn settings(value: Value) -> TenantReminderSettings {
        serde_json::from_value(value).expect("valid settings document")
    }

    fn minutes(offsets: &[ReminderOffsetConfig]) -> Vec<i64> {
        offsets.iter().map(|o| o.minutes_before).collect()
    }

    #[test]
    fn empty_document_has_no_offsets() {
        assert!(settings(json!({})).resolve_offsets().is_empty());
    }

    #[test]
    fn explicit_offsets_win_over_other_shapes() {
        let s = settings(json!({
            "offsets": [
                { "id": "day before", "minutesBefore": 1440, "title": " Tomorrow " },
                { "minutesBefore": "60", "active": false, "bodyTemplate": "" },
            ],
            "appointmentOffsetsMinutes": [30],
            "oneHourEnabled": true,
        }));
        let offsets = s.resolve_offsets();
        assert_eq!(minutes(&offsets), vec![60, 1440]);
        assert_eq!(offsets[0].id, "M60");
        assert!(!offsets[0].active);
        assert_eq!(offsets[0].body_template, None);
        assert_eq!(offsets[1].id, "DAY_BEFORE");
        assert_eq!(offsets[1].title.as_deref(), Some("Tomorrow"));
    }

    #[test]
    fn falls_through_empty_explicit_list() {
        let s = settings(json!({
            "offsets": ["garbage", { "title": "no minutes" }],
            "appointmentOffsetsMinutes": [180, "60", 60, "x", 5],
        }));
        let offsets = s.resolve_offsets();
        assert_eq!(minutes(&offsets), vec![15, 60, 180]);
        assert_eq!(offsets[2].id, "M180");
    }

    #[test]
    fn legacy_toggles_only_enable_on_true() {
        let s = settings(json!({
            "dayBeforeEnabled": true,
            "threeHoursEnabled": false,
            "oneHourEnabled": true,
        }));
        let offsets = s.resolve_offsets();
        assert_eq!(minutes(&offsets), vec![60, 1440]);
        assert_eq!(offsets[0].id, "M60");
        assert_eq!(offsets[1].id, "M1440");
    }

    #[test]
    fn resolved_offsets_are_bounded_sorted_and_unique() {
        let s = settings(json!({
            "offsets": [
                { "id": "a", "minutesBefore": 100000 },
                { "id": "a", "minutesBefore": 1 },
                { "id": "a", "minutes": 90 },
                { "minutesBefore": 240 },
                { "minutesBefore": 240 },
                { "minutesBefore": 30 },
                { "minutesBefore": 45 },
            ],
        }));
        let offsets = s.resolve_offsets();
        assert_eq!(offsets.len(), MAX_OFFSETS_COUNT);
        assert!(offsets
            .windows(2)
            .all(|w| w[0].minutes_before <= w[1].minutes_before));
        assert!(offsets.iter().all(|o| o.minutes_before >= MIN_OFFSET_MINUTES
            && o.minutes_before <= MAX_OFFSET_MINUTES));
        let ids = offsets.iter().map(|o| o.id.clone()).collect::<BTreeSet<_>>();
        assert_eq!(ids.len(), offsets.len());
        assert!(ids.contains("A_1"));
        assert!(ids.contains("M240_1"));
    }

    #[test]
    fn mistyped_fields_do_not_hide_valid_ones() {
        let s = settings(json!({
            "offsets": [{ "minutesBefore": 60 }],
            "locale": 5,
            "timezone": ["Europe/Rome"],
        }));
        assert_eq!(minutes(&s.resolve_offsets()), vec![60]);
        assert_eq!(s.locale(), Locale::It);
        assert_eq!(s.timezone(chrono_tz::Europe::London), chrono_tz::Europe::London);

        let s = settings(json!({
            "offsets": { "minutesBefore": 30 },
            "appointmentOffsetsMinutes": [60],
            "oneHourEnabled": "true",
        }));
        assert_eq!(minutes(&s.resolve_offsets()), vec![60]);

        let s = settings(json!({
            "offsets": null,
            "appointmentOffsetsMinutes": "60",
            "threeHoursEnabled": true,
        }));
        assert_eq!(minutes(&s.resolve_offsets()), vec![180]);
    }

    #[test]
    fn parses_locale_and_timezone() {
        let s = settings(json!({ "locale": "en-GB", "timezone": "Europe/London" }));
        assert_eq!(s.locale(), Locale::En);
        assert_eq!(s.timezone(chrono_tz::Europe::Rome), chrono_tz::Europe::London);

        let s = settings(json!({ "timezone": "Nowhere/Special" }));
        assert_eq!(s.locale(), Locale::It);
        assert_eq!(s.timezone(chrono_tz::Europe::Rome), chrono_tz::Europe::Rome);
    }
}
