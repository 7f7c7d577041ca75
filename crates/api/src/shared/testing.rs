use reminder_scheduler_domain::{Appointment, AppointmentRef, Client};
use reminder_scheduler_infra::{InMemoryPushSender, InMemoryTaskQueue, ReminderContext};
use serde_json::Value;
use std::sync::Arc;

// Fri Oct 16 2026 10:00:00 Europe/Rome
pub const NOW: i64 = 1792137600000;
pub const MINUTE: i64 = 60 * 1000;
pub const HOUR: i64 = 60 * MINUTE;
pub const DAY: i64 = 24 * HOUR;

/// An in-memory context together with handles to inspect its push sender
/// and task queue
pub struct TestContext {
    pub ctx: ReminderContext,
    pub push: Arc<InMemoryPushSender>,
    pub queue: Arc<InMemoryTaskQueue>,
}

pub fn setup() -> TestContext {
    let mut ctx = ReminderContext::create_inmemory_at(NOW);
    let push = Arc::new(InMemoryPushSender::new());
    let queue = Arc::new(InMemoryTaskQueue::new(
        ctx.sys.clone(),
        ctx.config.max_horizon_millis,
    ));
    ctx.services.push = push.clone();
    ctx.services.task_queue = queue.clone();
    TestContext { ctx, push, queue }
}

impl TestContext {
    pub async fn save_settings(&self, tenant_id: &str, settings: Value) {
        self.ctx
            .repos
            .tenant_settings
            .save(tenant_id, &settings)
            .await
            .unwrap();
    }

    pub async fn save_appointment(&self, path: &str, doc: Value) -> AppointmentRef {
        let reference: AppointmentRef = path.parse().unwrap();
        let appointment: Appointment = serde_json::from_value(doc).unwrap();
        self.ctx
            .repos
            .appointments
            .save(&reference, &appointment)
            .await
            .unwrap();
        reference
    }

    pub async fn appointment(&self, reference: &AppointmentRef) -> Appointment {
        self.ctx
            .repos
            .appointments
            .find(reference)
            .await
            .unwrap()
            .expect("Appointment to exist")
    }

    pub async fn save_client(&self, client_id: &str, tokens: &[&str]) {
        let client = Client::new(client_id, tokens.iter().map(|t| t.to_string()).collect());
        self.ctx.repos.clients.save(&client).await.unwrap();
    }

    pub async fn client_tokens(&self, client_id: &str) -> Vec<String> {
        self.ctx
            .repos
            .clients
            .find(client_id)
            .await
            .unwrap()
            .map(|c| c.fcm_tokens)
            .unwrap_or_default()
    }

    /// `(offset id, schedule time)` of every pending task
    pub fn scheduled(&self) -> Vec<(String, i64)> {
        self.queue
            .scheduled()
            .into_iter()
            .map(|t| (t.task.offset_id().to_string(), t.schedule_time))
            .collect()
    }
}
