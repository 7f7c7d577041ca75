use crate::shared::usecase::UseCase;
use reminder_scheduler_domain::{
    build_reminder_copy, Appointment, Client, DispatchReport, OutboxEntry, OutboxMetadata,
    ReminderCopy, ReminderCopyInput, TenantReminderSettings, PUSH_CHANNEL, REMINDER_OUTBOX_TYPE,
};
use reminder_scheduler_infra::{MulticastResponse, PushNotification, ReminderContext};
use std::collections::{HashMap, HashSet};
use tracing::{debug, error, warn};

/// Delivers one reminder to every device of the appointment's client and
/// records the attempt in the outbox.
///
/// Delivery failures never surface as errors: a reminder attempt is one-shot
/// and its result is only visible in the outbox and the logs.
#[derive(Debug)]
pub struct SendReminderNotificationUseCase {
    pub appointment: Appointment,
    pub tenant_id: String,
    pub appointment_id: String,
    pub offset_id: String,
    pub offset_minutes: Option<i64>,
}

#[derive(Debug, PartialEq)]
pub enum UseCaseError {}

/// Tokens a reminder goes to
#[derive(Debug, Default)]
struct Recipients {
    /// Embedded tokens first, then the tokens of the client
    tokens: Vec<String>,
    /// The client whose stored tokens were used
    client: Option<Client>,
    client_tokens: HashSet<String>,
}

impl SendReminderNotificationUseCase {
    /// The first candidate client with at least one stored token wins
    async fn resolve_recipients(&self, ctx: &ReminderContext) -> Recipients {
        let mut recipients = Recipients {
            tokens: self.appointment.embedded_tokens(),
            ..Default::default()
        };
        for client_id in self.appointment.candidate_client_ids() {
            let client = match ctx.repos.clients.find(&client_id).await {
                Ok(Some(client)) => client,
                Ok(None) => continue,
                Err(e) => {
                    warn!(
                        "Unable to read client {} of tenant {}. Err: {:?}",
                        client_id, self.tenant_id, e
                    );
                    continue;
                }
            };
            let tokens = client.tokens();
            if tokens.is_empty() {
                continue;
            }
            for token in tokens {
                if !recipients.tokens.contains(&token) {
                    recipients.tokens.push(token.clone());
                }
                recipients.client_tokens.insert(token);
            }
            recipients.client = Some(client);
            break;
        }
        recipients
    }

    async fn tenant_settings(&self, ctx: &ReminderContext) -> TenantReminderSettings {
        match ctx.repos.tenant_settings.find(&self.tenant_id).await {
            Ok(settings) => settings.unwrap_or_default(),
            Err(e) => {
                warn!(
                    "Unable to read reminder settings of tenant {}, using defaults for the copy. Err: {:?}",
                    self.tenant_id, e
                );
                TenantReminderSettings::default()
            }
        }
    }

    fn copy(&self, ctx: &ReminderContext, settings: &TenantReminderSettings) -> ReminderCopy {
        build_reminder_copy(&ReminderCopyInput {
            appointment_title: self.appointment.title.as_deref(),
            start: self.appointment.start_ts(),
            offset_minutes: self.offset_minutes,
            now: ctx.sys.get_timestamp_millis(),
            timezone: settings.timezone(ctx.config.default_timezone),
            locale: settings.locale(),
        })
    }

    /// Removes the invalid tokens that came from the client's stored set
    async fn prune_client_tokens(
        &self,
        ctx: &ReminderContext,
        recipients: &Recipients,
        response: &MulticastResponse,
    ) -> (usize, usize) {
        let mut invalid_count = 0;
        let mut invalid_from_client = Vec::new();
        for (token, result) in recipients.tokens.iter().zip(response.responses.iter()) {
            if !result.is_invalid_token() {
                continue;
            }
            invalid_count += 1;
            if recipients.client_tokens.contains(token) {
                invalid_from_client.push(token.clone());
            }
        }

        let client = match &recipients.client {
            Some(client) if !invalid_from_client.is_empty() => client,
            _ => return (invalid_count, 0),
        };
        match ctx
            .repos
            .clients
            .remove_tokens(&client.id, &invalid_from_client)
            .await
        {
            Ok(_) => {
                debug!(
                    "Removed {} invalid reminder tokens from client {} of tenant {}",
                    invalid_from_client.len(),
                    client.id,
                    self.tenant_id
                );
                (invalid_count, invalid_from_client.len())
            }
            Err(e) => {
                error!(
                    "Unable to remove invalid tokens from client {} of tenant {}. Err: {:?}",
                    client.id, self.tenant_id, e
                );
                (invalid_count, 0)
            }
        }
    }

    async fn store_outbox_entry(
        &self,
        ctx: &ReminderContext,
        client_id: Option<&str>,
        copy: &ReminderCopy,
        metadata: &OutboxMetadata,
    ) {
        let client_id = match client_id {
            Some(client_id) => client_id,
            None => {
                warn!(
                    "Appointment {} of tenant {} has no client, not recording reminder {} in the outbox",
                    self.appointment_id, self.tenant_id, self.offset_id
                );
                return;
            }
        };
        let now = ctx.sys.get_timestamp_millis();
        let status = OutboxEntry::status_for(metadata);
        let entry = OutboxEntry {
            id: OutboxEntry::reminder_id(
                &self.tenant_id,
                client_id,
                &self.appointment_id,
                &self.offset_id,
            ),
            tenant_id: self.tenant_id.clone(),
            client_id: client_id.to_string(),
            appointment_id: self.appointment_id.clone(),
            offset_id: self.offset_id.clone(),
            kind: REMINDER_OUTBOX_TYPE.to_string(),
            channel: PUSH_CHANNEL.to_string(),
            status,
            title: copy.title.clone(),
            body: copy.body.clone(),
            offset_minutes: self.offset_minutes.map(|m| m.max(0)).or(copy.minutes_until),
            appointment_start: self.appointment.start_ts(),
            relative_label: copy.relative_label.clone(),
            scheduled_at: now,
            sent_at: if metadata.success_count > 0 {
                Some(now)
            } else {
                None
            },
            created_at: now,
            updated_at: now,
            metadata: metadata.clone(),
        };
        if let Err(e) = ctx.repos.outbox.upsert(&entry).await {
            error!(
                "Failed to persist reminder outbox entry {}. Err: {:?}",
                entry.id, e
            );
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for SendReminderNotificationUseCase {
    type Response = DispatchReport;

    type Error = UseCaseError;

    const NAME: &'static str = "SendReminderNotification";

    async fn execute(&mut self, ctx: &ReminderContext) -> Result<Self::Response, Self::Error> {
        let recipients = self.resolve_recipients(ctx).await;
        let settings = self.tenant_settings(ctx).await;
        let copy = self.copy(ctx, &settings);
        let client_id = recipients
            .client
            .as_ref()
            .map(|c| c.id.clone())
            .or_else(|| self.appointment.candidate_client_ids().into_iter().next());

        let mut removed_token_count = 0;
        let metadata = if recipients.tokens.is_empty() {
            debug!(
                "No push tokens for reminder {} of appointment {} of tenant {}",
                self.offset_id, self.appointment_id, self.tenant_id
            );
            OutboxMetadata::default()
        } else {
            let notification = PushNotification {
                title: copy.title.clone(),
                body: copy.body.clone(),
            };
            let mut data = HashMap::new();
            data.insert("tenantId".to_string(), self.tenant_id.clone());
            data.insert("appointmentId".to_string(), self.appointment_id.clone());
            data.insert("offsetId".to_string(), self.offset_id.clone());

            match ctx
                .services
                .push
                .send_multicast(&recipients.tokens, &notification, &data)
                .await
            {
                Ok(response) => {
                    let (invalid_token_count, removed) =
                        self.prune_client_tokens(ctx, &recipients, &response).await;
                    removed_token_count = removed;
                    if response.success_count() == 0 {
                        let errors = response
                            .responses
                            .iter()
                            .filter_map(|r| r.error_message.as_deref())
                            .collect::<Vec<_>>();
                        warn!(
                            "Reminder {} of appointment {} of tenant {} failed for all tokens: {:?}",
                            self.offset_id, self.appointment_id, self.tenant_id, errors
                        );
                    }
                    OutboxMetadata {
                        success_count: response.success_count(),
                        failure_count: response.failure_count(),
                        invalid_token_count,
                    }
                }
                Err(e) => {
                    error!(
                        "Failed to send reminder {} of appointment {} of tenant {}. Err: {:?}",
                        self.offset_id, self.appointment_id, self.tenant_id, e
                    );
                    OutboxMetadata {
                        success_count: 0,
                        failure_count: recipients.tokens.len(),
                        invalid_token_count: 0,
                    }
                }
            }
        };

        self.store_outbox_entry(ctx, client_id.as_deref(), &copy, &metadata)
            .await;

        Ok(DispatchReport {
            client_id,
            token_count: recipients.tokens.len(),
            status: OutboxEntry::status_for(&metadata),
            metadata,
            removed_token_count,
        })
    }
}
