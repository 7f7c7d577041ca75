mod appointment;
mod client;
mod notification;
mod outbox;
mod outcome;
mod reminder_offset;
mod reminder_settings;
mod reminder_task;
mod shared;

pub use appointment::{
    normalize_token, Appointment, AppointmentRef, AppointmentSnapshot, EmbeddedClient,
    InvalidAppointmentRefError, StartField,
};
pub use chrono_tz::Tz;
pub use client::Client;
pub use notification::{
    build_reminder_copy, format_offset_label, Locale, ReminderCopy, ReminderCopyInput,
};
pub use outbox::{
    OutboxEntry, OutboxMetadata, OutboxStatus, PUSH_CHANNEL, REMINDER_OUTBOX_TYPE,
};
pub use outcome::{DispatchReport, PlanOutcome, SweepReport, TaskOutcome};
pub use reminder_offset::{
    clamp_minutes, normalize_slug, ReminderOffsetConfig, MAX_OFFSETS_COUNT, MAX_OFFSET_MINUTES,
    MIN_OFFSET_MINUTES,
};
pub use reminder_settings::{OffsetSource, TenantReminderSettings};
pub use reminder_task::{ReminderTarget, ReminderTask, CHECKPOINT_OFFSET_ID};
pub use shared::entity::Entity;
