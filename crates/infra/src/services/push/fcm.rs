use super::{IPushSender, MulticastResponse, PushNotification, SendResult};
use futures::future::join_all;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::error;

const FCM_API_BASE_URL: &str = "https://fcm.googleapis.com/v1/projects";

#[derive(Debug, Serialize)]
struct FcmSendRequest<'a> {
    message: FcmMessage<'a>,
}

#[derive(Debug, Serialize)]
struct FcmMessage<'a> {
    token: &'a str,
    notification: &'a PushNotification,
    data: &'a HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct FcmErrorResponse {
    error: FcmError,
}

#[derive(Debug, Deserialize)]
struct FcmError {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
    #[serde(default)]
    details: Vec<FcmErrorDetail>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FcmErrorDetail {
    #[serde(default)]
    error_code: Option<String>,
}

impl FcmError {
    /// The FCM specific error code when present, else the generic status
    fn code(&self) -> &str {
        self.details
            .iter()
            .find_map(|d| d.error_code.as_deref())
            .unwrap_or(&self.status)
    }
}

/// Maps FCM HTTP v1 error codes to the provider neutral codes
fn to_provider_code(fcm_code: &str) -> String {
    match fcm_code {
        "UNREGISTERED" | "NOT_FOUND" => "messaging/registration-token-not-registered".into(),
        "INVALID_ARGUMENT" => "messaging/invalid-argument".into(),
        "" => "messaging/unknown-error".into(),
        other => format!("messaging/{}", other.to_lowercase().replace('_', "-")),
    }
}

/// Sends notifications through the FCM HTTP v1 api, one request per token
pub struct FcmPushSender {
    client: Client,
    project_id: String,
    access_token: String,
}

enum TokenOutcome {
    Delivered(SendResult),
    /// The credentials were rejected, no token can be delivered
    Unauthorized(String),
}

impl FcmPushSender {
    pub fn new(project_id: String, access_token: String) -> Self {
        Self {
            client: Client::new(),
            project_id,
            access_token,
        }
    }

    async fn send_one(
        &self,
        token: &str,
        notification: &PushNotification,
        data: &HashMap<String, String>,
    ) -> TokenOutcome {
        let body = FcmSendRequest {
            message: FcmMessage {
                token,
                notification,
                data,
            },
        };
        let res = match self
            .client
            .post(&format!(
                "{}/{}/messages:send",
                FCM_API_BASE_URL, self.project_id
            ))
            .header("authorization", format!("Bearer {}", self.access_token))
            .json(&body)
            .send()
            .await
        {
            Ok(res) => res,
            Err(e) => {
                error!("[Network Error] FCM send error. Error message: {:?}", e);
                return TokenOutcome::Delivered(SendResult::error(
                    "messaging/network-error",
                    e.to_string(),
                ));
            }
        };

        let status = res.status();
        if status.is_success() {
            return TokenOutcome::Delivered(SendResult::ok());
        }
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return TokenOutcome::Unauthorized(format!("FCM rejected the credentials: {}", status));
        }
        match res.json::<FcmErrorResponse>().await {
            Ok(err) => TokenOutcome::Delivered(SendResult::error(
                &to_provider_code(err.error.code()),
                err.error.message,
            )),
            Err(e) => {
                error!(
                    "[Unexpected Response] FCM send error. Status: {}. Error message: {:?}",
                    status, e
                );
                TokenOutcome::Delivered(SendResult::error(
                    "messaging/unknown-error",
                    status.to_string(),
                ))
            }
        }
    }
}

#[async_trait::async_trait]
impl IPushSender for FcmPushSender {
    async fn send_multicast(
        &self,
        tokens: &[String],
        notification: &PushNotification,
        data: &HashMap<String, String>,
    ) -> anyhow::Result<MulticastResponse> {
        if tokens.is_empty() {
            return Err(anyhow::anyhow!("Multicast requires at least one token"));
        }
        let outcomes = join_all(
            tokens
                .iter()
                .map(|token| self.send_one(token, notification, data)),
        )
        .await;

        let mut responses = Vec::with_capacity(outcomes.len());
        for outcome in outcomes {
            match outcome {
                TokenOutcome::Delivered(result) => responses.push(result),
                TokenOutcome::Unauthorized(reason) => return Err(anyhow::anyhow!(reason)),
            }
        }
        Ok(MulticastResponse { responses })
    }
}
