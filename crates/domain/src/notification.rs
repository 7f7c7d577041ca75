use chrono::{DateTime, Datelike, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// Languages reminder notifications can be written in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    It,
    En,
}

impl Default for Locale {
    fn default() -> Self {
        Self::It
    }
}

impl Locale {
    /// Parses a language tag like `it`, `en` or `en-GB`, falling back to
    /// the default locale for anything unknown.
    pub fn from_tag(tag: &str) -> Self {
        let lang = tag
            .trim()
            .split(|c| c == '-' || c == '_')
            .next()
            .unwrap_or_default()
            .to_lowercase();
        match lang.as_str() {
            "en" => Self::En,
            _ => Self::It,
        }
    }

    fn title(&self) -> &'static str {
        match self {
            Self::It => "Promemoria appuntamento",
            Self::En => "Appointment reminder",
        }
    }

    fn default_label(&self) -> &'static str {
        match self {
            Self::It => "Il tuo appuntamento",
            Self::En => "Your appointment",
        }
    }

    fn soon(&self) -> &'static str {
        match self {
            Self::It => "tra pochi minuti",
            Self::En => "in a few minutes",
        }
    }

    fn unit(&self, value: i64, unit: TimeUnit) -> String {
        let (one, many) = match (self, unit) {
            (Self::It, TimeUnit::Day) => ("giorno", "giorni"),
            (Self::It, TimeUnit::Hour) => ("ora", "ore"),
            (Self::It, TimeUnit::Minute) => ("minuto", "minuti"),
            (Self::En, TimeUnit::Day) => ("day", "days"),
            (Self::En, TimeUnit::Hour) => ("hour", "hours"),
            (Self::En, TimeUnit::Minute) => ("minute", "minutes"),
        };
        format!("{} {}", value, if value == 1 { one } else { many })
    }

    fn month(&self, month0: u32) -> &'static str {
        const IT: [&str; 12] = [
            "gennaio", "febbraio", "marzo", "aprile", "maggio", "giugno", "luglio", "agosto",
            "settembre", "ottobre", "novembre", "dicembre",
        ];
        const EN: [&str; 12] = [
            "January", "February", "March", "April", "May", "June", "July", "August",
            "September", "October", "November", "December",
        ];
        let months = match self {
            Self::It => &IT,
            Self::En => &EN,
        };
        months[month0 as usize % 12]
    }
}

#[derive(Debug, Clone, Copy)]
enum TimeUnit {
    Day,
    Hour,
    Minute,
}

/// Human readable "time until" phrase, e.g. `tra 1 giorno e 3 ore`
pub fn format_offset_label(minutes: i64, locale: Locale) -> String {
    if minutes <= 0 {
        return locale.soon().to_string();
    }
    let parts = [
        (minutes / 1440, TimeUnit::Day),
        ((minutes % 1440) / 60, TimeUnit::Hour),
        (minutes % 60, TimeUnit::Minute),
    ]
    .iter()
    .filter(|(value, _)| *value > 0)
    .map(|(value, unit)| locale.unit(*value, *unit))
    .collect::<Vec<_>>();

    let (prefix, and) = match locale {
        Locale::It => ("tra", "e"),
        Locale::En => ("in", "and"),
    };
    match parts.split_last() {
        None => locale.soon().to_string(),
        Some((last, [])) => format!("{} {}", prefix, last),
        Some((last, initial)) => format!("{} {} {} {}", prefix, initial.join(", "), and, last),
    }
}

/// Title and body of one reminder notification
#[derive(Debug, Clone, PartialEq)]
pub struct ReminderCopy {
    pub title: String,
    pub body: String,
    pub minutes_until: Option<i64>,
    pub relative_label: Option<String>,
}

/// Everything needed to write the copy of a reminder
#[derive(Debug, Clone)]
pub struct ReminderCopyInput<'a> {
    pub appointment_title: Option<&'a str>,
    pub start: Option<i64>,
    /// The configured lead time. When absent the wall clock distance to
    /// `start` is used.
    pub offset_minutes: Option<i64>,
    pub now: i64,
    pub timezone: Tz,
    pub locale: Locale,
}

fn to_local(millis: i64, tz: Tz) -> Option<DateTime<Tz>> {
    Utc.timestamp_millis_opt(millis)
        .single()
        .map(|dt| dt.with_timezone(&tz))
}

pub fn build_reminder_copy(input: &ReminderCopyInput) -> ReminderCopy {
    let locale = input.locale;
    let label = input
        .appointment_title
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| locale.default_label());
    let configured = input.offset_minutes.map(|m| m.max(0));

    let start = match input.start.and_then(|s| to_local(s, input.timezone)) {
        Some(start) => start,
        None => {
            let body = match locale {
                Locale::It => format!("{} sta per iniziare.", label),
                Locale::En => format!("{} is about to start.", label),
            };
            return ReminderCopy {
                title: locale.title().to_string(),
                body,
                minutes_until: configured,
                relative_label: configured.map(|m| format_offset_label(m, locale)),
            };
        }
    };

    let minutes_until = configured.unwrap_or_else(|| {
        let diff = start.timestamp_millis() - input.now;
        ((diff as f64) / 60_000.0).round().max(0.0) as i64
    });
    let relative_label = format_offset_label(minutes_until, locale);
    let time = start.format("%H:%M").to_string();
    let same_day = to_local(input.now, input.timezone)
        .map(|now| now.date_naive() == start.date_naive())
        .unwrap_or(false);
    let date = format!(
        "{} {} {}",
        start.day(),
        locale.month(start.month0()),
        start.year()
    );

    let body = match (locale, same_day) {
        (Locale::It, true) => format!("{} è alle {} ({}).", label, time, relative_label),
        (Locale::It, false) => format!(
            "{} è il {} alle {} ({}).",
            label, date, time, relative_label
        ),
        (Locale::En, true) => format!("{} is at {} ({}).", label, time, relative_label),
        (Locale::En, false) => format!(
            "{} is on {} at {} ({}).",
            label, date, time, relative_label
        ),
    };

    ReminderCopy {
        title: locale.title().to_string(),
        body,
        minutes_until: Some(minutes_until),
        relative_label: Some(relative_label),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::Europe::Rome;

    // Fri Oct 16 2026 10:00:00 Europe/Rome
    const NOW: i64 = 1792137600000;

    #[test]
    fn formats_offset_labels() {
        assert_eq!(format_offset_label(0, Locale::It), "tra pochi minuti");
        assert_eq!(format_offset_label(60, Locale::It), "tra 1 ora");
        assert_eq!(format_offset_label(1, Locale::It), "tra 1 minuto");
        assert_eq!(format_offset_label(1440, Locale::It), "tra 1 giorno");
        assert_eq!(
            format_offset_label(2 * 1440 + 180 + 5, Locale::It),
            "tra 2 giorni, 3 ore e 5 minuti"
        );
        assert_eq!(format_offset_label(75, Locale::En), "in 1 hour and 15 minutes");
        assert_eq!(format_offset_label(-5, Locale::En), "in a few minutes");
    }

    #[test]
    fn parses_locale_tags() {
        assert_eq!(Locale::from_tag("en"), Locale::En);
        assert_eq!(Locale::from_tag("EN_us"), Locale::En);
        assert_eq!(Locale::from_tag("it-IT"), Locale::It);
        assert_eq!(Locale::from_tag("fr"), Locale::It);
    }

    #[test]
    fn same_day_copy_uses_clock_time() {
        let copy = build_reminder_copy(&ReminderCopyInput {
            appointment_title: Some(" Taglio "),
            start: Some(NOW + 2 * 60 * 60 * 1000),
            offset_minutes: Some(60),
            now: NOW,
            timezone: Rome,
            locale: Locale::It,
        });
        assert_eq!(copy.title, "Promemoria appuntamento");
        assert_eq!(copy.body, "Taglio è alle 12:00 (tra 1 ora).");
        assert_eq!(copy.minutes_until, Some(60));
    }

    #[test]
    fn other_day_copy_uses_date() {
        let copy = build_reminder_copy(&ReminderCopyInput {
            appointment_title: None,
            start: Some(NOW + 24 * 60 * 60 * 1000),
            offset_minutes: None,
            now: NOW,
            timezone: Rome,
            locale: Locale::En,
        });
        assert_eq!(
            copy.body,
            "Your appointment is on 17 October 2026 at 10:00 (in 1 day)."
        );
        assert_eq!(copy.relative_label.as_deref(), Some("in 1 day"));
    }

    #[test]
    fn copy_without_start() {
        let copy = build_reminder_copy(&ReminderCopyInput {
            appointment_title: None,
            start: None,
            offset_minutes: Some(180),
            now: NOW,
            timezone: Rome,
            locale: Locale::It,
        });
        assert_eq!(copy.body, "Il tuo appuntamento sta per iniziare.");
        assert_eq!(copy.relative_label.as_deref(), Some("tra 3 ore"));
    }
}
