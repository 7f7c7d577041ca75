mod fcm;
mod inmemory;

pub use fcm::FcmPushSender;
pub use inmemory::{InMemoryPushSender, PushCall};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Provider error codes telling that a token will never be deliverable again
pub const INVALID_TOKEN_CODES: [&str; 3] = [
    "messaging/registration-token-not-registered",
    "messaging/invalid-registration-token",
    "messaging/invalid-argument",
];

pub fn is_invalid_token_code(code: &str) -> bool {
    INVALID_TOKEN_CODES.contains(&code)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PushNotification {
    pub title: String,
    pub body: String,
}

/// Delivery result of one token, in the same position as the token
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SendResult {
    pub success: bool,
    pub error_code: Option<String>,
    pub error_message: Option<String>,
}

impl SendResult {
    pub fn ok() -> Self {
        Self {
            success: true,
            ..Default::default()
        }
    }

    pub fn error(code: &str, message: impl Into<String>) -> Self {
        Self {
            success: false,
            error_code: Some(code.to_string()),
            error_message: Some(message.into()),
        }
    }

    pub fn is_invalid_token(&self) -> bool {
        !self.success
            && self
                .error_code
                .as_deref()
                .map(is_invalid_token_code)
                .unwrap_or(false)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct MulticastResponse {
    pub responses: Vec<SendResult>,
}

impl MulticastResponse {
    pub fn success_count(&self) -> usize {
        self.responses.iter().filter(|r| r.success).count()
    }

    pub fn failure_count(&self) -> usize {
        self.responses.len() - self.success_count()
    }
}

/// Delivers one notification to many device tokens.
///
/// Per token failures are reported in the `MulticastResponse`. An `Err` means
/// the call as a whole failed and nothing is known about the tokens.
#[async_trait::async_trait]
pub trait IPushSender: Send + Sync {
    async fn send_multicast(
        &self,
        tokens: &[String],
        notification: &PushNotification,
        data: &HashMap<String, String>,
    ) -> anyhow::Result<MulticastResponse>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_invalid_tokens() {
        assert!(SendResult::error("messaging/invalid-argument", "bad").is_invalid_token());
        assert!(
            SendResult::error("messaging/registration-token-not-registered", "gone")
                .is_invalid_token()
        );
        assert!(!SendResult::error("messaging/internal-error", "oops").is_invalid_token());
        assert!(!SendResult::ok().is_invalid_token());
    }

    #[test]
    fn counts_results() {
        let res = MulticastResponse {
            responses: vec![
                SendResult::ok(),
                SendResult::error("messaging/internal-error", ""),
                SendResult::ok(),
            ],
        };
        assert_eq!(res.success_count(), 2);
        assert_eq!(res.failure_count(), 1);
    }
}
