use serde::{de::Visitor, Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};
use std::fmt::Display;
use std::str::FromStr;
use thiserror::Error;

/// Where an `Appointment` is stored. Appointments either live under their
/// tenant or in the flat top level collection.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AppointmentRef {
    Tenant {
        tenant_id: String,
        appointment_id: String,
    },
    Root {
        appointment_id: String,
    },
}

impl AppointmentRef {
    pub fn appointment_id(&self) -> &str {
        match self {
            Self::Tenant { appointment_id, .. } => appointment_id,
            Self::Root { appointment_id } => appointment_id,
        }
    }

    /// The tenant implied by the storage location, if any
    pub fn tenant_id(&self) -> Option<&str> {
        match self {
            Self::Tenant { tenant_id, .. } => Some(tenant_id),
            Self::Root { .. } => None,
        }
    }

    pub fn path(&self) -> String {
        self.to_string()
    }
}

impl Display for AppointmentRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Tenant {
                tenant_id,
                appointment_id,
            } => write!(f, "tenants/{}/appointments/{}", tenant_id, appointment_id),
            Self::Root { appointment_id } => write!(f, "appointments/{}", appointment_id),
        }
    }
}

#[derive(Error, Debug)]
pub enum InvalidAppointmentRefError {
    #[error("Appointment path: {0} is malformed")]
    Malformed(String),
}

impl FromStr for AppointmentRef {
    type Err = InvalidAppointmentRefError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let segments = s.trim_matches('/').split('/').collect::<Vec<_>>();
        if segments.iter().any(|s| s.is_empty()) {
            return Err(InvalidAppointmentRefError::Malformed(s.to_string()));
        }
        match segments.as_slice() {
            ["tenants", tenant_id, "appointments", appointment_id] => Ok(Self::Tenant {
                tenant_id: tenant_id.to_string(),
                appointment_id: appointment_id.to_string(),
            }),
            ["appointments", appointment_id] => Ok(Self::Root {
                appointment_id: appointment_id.to_string(),
            }),
            _ => Err(InvalidAppointmentRefError::Malformed(s.to_string())),
        }
    }
}

impl Serialize for AppointmentRef {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.path())
    }
}

impl<'de> Deserialize<'de> for AppointmentRef {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct AppointmentRefVisitor;

        impl<'de> Visitor<'de> for AppointmentRefVisitor {
            type Value = AppointmentRef;

            fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                formatter.write_str("An appointment document path")
            }

            fn visit_str<E>(self, value: &str) -> Result<AppointmentRef, E>
            where
                E: serde::de::Error,
            {
                value
                    .parse::<AppointmentRef>()
                    .map_err(|_| E::custom(format!("Malformed appointment path: {}", value)))
            }
        }

        deserializer.deserialize_str(AppointmentRefVisitor)
    }
}

/// The start time fields an `Appointment` document may carry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartField {
    Start,
    StartAt,
}

impl StartField {
    pub const ALL: [StartField; 2] = [StartField::Start, StartField::StartAt];

    pub fn field_name(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::StartAt => "startAt",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmbeddedClient {
    #[serde(default, deserialize_with = "lenient::or_none")]
    pub id: Option<String>,
}

/// Field deserializers that read a value of an unexpected type as absent, so
/// that one malformed field does not make the whole document unreadable
mod lenient {
    use super::*;
    use serde::de::DeserializeOwned;

    pub fn or_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(serde_json::from_value(value).ok())
    }

    pub fn or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned + Default,
    {
        Ok(or_none(deserializer)?.unwrap_or_default())
    }

    /// Epoch millis, truncating fractional values
    pub fn millis<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Value::deserialize(deserializer)? {
            Value::Number(n) => n.as_i64().or_else(|| {
                n.as_f64()
                    .filter(|f| f.is_finite())
                    .map(|f| f.trunc() as i64)
            }),
            _ => None,
        })
    }

    /// The string entries of a list, skipping everything else
    pub fn strings<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Value::deserialize(deserializer)? {
            Value::Array(values) => values
                .into_iter()
                .filter_map(|v| match v {
                    Value::String(s) => Some(s),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        })
    }
}

/// An `Appointment` document as owned by the appointment store.
///
/// Only the fields reminders care about are typed, everything else is kept in
/// `fields` so that the document round trips unchanged. A typed field holding
/// a value of another type reads as absent. Sent-flags are stored as
/// `reminder_<offsetId>_sent` top level fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub id: String,
    #[serde(
        default,
        deserialize_with = "lenient::or_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub tenant_id: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::or_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub client_id: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::or_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub client_uid: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::or_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub customer_id: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::or_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub customer_uid: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::or_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub client: Option<EmbeddedClient>,
    /// Epoch millis
    #[serde(
        default,
        deserialize_with = "lenient::millis",
        skip_serializing_if = "Option::is_none"
    )]
    pub start: Option<i64>,
    /// Epoch millis, preferred over `start`
    #[serde(
        default,
        deserialize_with = "lenient::millis",
        skip_serializing_if = "Option::is_none"
    )]
    pub start_at: Option<i64>,
    #[serde(
        default,
        deserialize_with = "lenient::or_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub status: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::or_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub cancelled: Option<bool>,
    #[serde(
        default,
        deserialize_with = "lenient::or_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub title: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::or_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub device_token: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::strings",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub device_tokens: Vec<String>,
    #[serde(flatten)]
    pub fields: BTreeMap<String, Value>,
}

type ClientIdExtractor = fn(&Appointment) -> Option<&str>;

/// Fields that may reference the client of an `Appointment`, in priority order
const CLIENT_ID_EXTRACTORS: [(&str, ClientIdExtractor); 5] = [
    ("clientId", |a| a.client_id.as_deref()),
    ("clientUid", |a| a.client_uid.as_deref()),
    ("customerId", |a| a.customer_id.as_deref()),
    ("customerUid", |a| a.customer_uid.as_deref()),
    ("client.id", |a| a.client.as_ref().and_then(|c| c.id.as_deref())),
];

pub fn normalize_token(token: &str) -> Option<&str> {
    let token = token.trim();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

impl Appointment {
    pub fn sent_flag_key(offset_id: &str) -> String {
        format!("reminder_{}_sent", offset_id)
    }

    pub fn has_sent_flag(&self, offset_id: &str) -> bool {
        matches!(
            self.fields.get(&Self::sent_flag_key(offset_id)),
            Some(Value::Bool(true))
        )
    }

    pub fn set_sent_flag(&mut self, offset_id: &str) {
        self.fields
            .insert(Self::sent_flag_key(offset_id), Value::Bool(true));
    }

    pub fn start_ts(&self) -> Option<i64> {
        self.start_at.or(self.start)
    }

    pub fn start_value(&self, field: StartField) -> Option<i64> {
        match field {
            StartField::Start => self.start,
            StartField::StartAt => self.start_at,
        }
    }

    /// An explicit `cancelled` flag takes precedence over `status`
    pub fn is_cancelled(&self) -> bool {
        match self.cancelled {
            Some(cancelled) => cancelled,
            None => self
                .status
                .as_deref()
                .map(|s| s.trim().eq_ignore_ascii_case("cancelled"))
                .unwrap_or(false),
        }
    }

    pub fn explicit_tenant_id(&self) -> Option<&str> {
        self.tenant_id
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }

    /// Candidate client ids, trimmed and deduplicated, in priority order
    pub fn candidate_client_ids(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        CLIENT_ID_EXTRACTORS
            .iter()
            .filter_map(|(_, extract)| extract(self))
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .filter(|id| seen.insert(id.to_string()))
            .map(String::from)
            .collect()
    }

    /// Push tokens stored directly on the appointment
    pub fn embedded_tokens(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.device_token
            .iter()
            .chain(self.device_tokens.iter())
            .filter_map(|t| normalize_token(t))
            .filter(|t| seen.insert(t.to_string()))
            .map(String::from)
            .collect()
    }
}

/// An `Appointment` together with where it is stored
#[derive(Debug, Clone, PartialEq)]
pub struct AppointmentSnapshot {
    pub reference: AppointmentRef,
    pub appointment: Appointment,
}
