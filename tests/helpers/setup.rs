use reminder_scheduler_api::Application;
use reminder_scheduler_infra::{Config, ReminderContext};

pub struct TestApp {
    pub config: Config,
    pub ctx: ReminderContext,
    pub address: String,
    pub client: reqwest::Client,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}/api/v1{}", self.address, path)
    }

    pub async fn post(&self, path: &str, body: serde_json::Value) -> reqwest::Response {
        self.client
            .post(&self.url(path))
            .header("reminders-internal-key", &self.config.internal_api_key)
            .json(&body)
            .send()
            .await
            .expect("Failed to execute request.")
    }
}

// Launch the application as a background task
pub async fn spawn_app() -> TestApp {
    let mut ctx = ReminderContext::create_inmemory();
    ctx.config.port = 0; // Random port

    let config = ctx.config.clone();
    let application = Application::new(ctx.clone())
        .await
        .expect("Failed to build application.");

    let address = format!("http://localhost:{}", application.port());
    let _ = actix_web::rt::spawn(async move {
        application
            .start()
            .await
            .expect("Expected application to start");
    });

    TestApp {
        config,
        ctx,
        address,
        client: reqwest::Client::new(),
    }
}
