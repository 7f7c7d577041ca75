use super::{IPushSender, MulticastResponse, PushNotification, SendResult};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// A recorded `send_multicast` invocation
#[derive(Debug, Clone, PartialEq)]
pub struct PushCall {
    pub tokens: Vec<String>,
    pub notification: PushNotification,
    pub data: HashMap<String, String>,
}

/// Push sender used in tests. Every token succeeds unless an error code has
/// been scripted for it.
pub struct InMemoryPushSender {
    calls: Mutex<Vec<PushCall>>,
    scripted_errors: Mutex<HashMap<String, String>>,
    unavailable: AtomicBool,
}

impl InMemoryPushSender {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            scripted_errors: Mutex::new(HashMap::new()),
            unavailable: AtomicBool::new(false),
        }
    }

    /// Makes every future delivery to `token` fail with `code`
    pub fn fail_token(&self, token: &str, code: &str) {
        self.scripted_errors
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(token.to_string(), code.to_string());
    }

    /// Makes every future call fail as a whole
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<PushCall> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl Default for InMemoryPushSender {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl IPushSender for InMemoryPushSender {
    async fn send_multicast(
        &self,
        tokens: &[String],
        notification: &PushNotification,
        data: &HashMap<String, String>,
    ) -> anyhow::Result<MulticastResponse> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(PushCall {
                tokens: tokens.to_vec(),
                notification: notification.clone(),
                data: data.clone(),
            });

        if self.unavailable.load(Ordering::SeqCst) {
            return Err(anyhow::anyhow!("Push provider is unavailable"));
        }

        let errors = self
            .scripted_errors
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        let responses = tokens
            .iter()
            .map(|token| match errors.get(token) {
                Some(code) => SendResult::error(code, format!("Scripted failure for {}", token)),
                None => SendResult::ok(),
            })
            .collect();
        Ok(MulticastResponse { responses })
    }
}
