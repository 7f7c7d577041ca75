use super::{parse_settings, ITenantSettingsRepo};
use reminder_scheduler_domain::TenantReminderSettings;
use std::collections::HashMap;
use std::sync::Mutex;

pub struct InMemoryTenantSettingsRepo {
    settings: Mutex<HashMap<String, serde_json::Value>>,
}

impl InMemoryTenantSettingsRepo {
    pub fn new() -> Self {
        Self {
            settings: Mutex::new(HashMap::new()),
        }
    }
}

#[async_trait::async_trait]
impl ITenantSettingsRepo for InMemoryTenantSettingsRepo {
    async fn find(&self, tenant_id: &str) -> anyhow::Result<Option<TenantReminderSettings>> {
        let settings = self.settings.lock().unwrap_or_else(|e| e.into_inner());
        Ok(settings.get(tenant_id).map(|doc| parse_settings(tenant_id, doc)))
    }

    async fn save(&self, tenant_id: &str, settings: &serde_json::Value) -> anyhow::Result<()> {
        let mut stored = self.settings.lock().unwrap_or_else(|e| e.into_inner());
        stored.insert(tenant_id.to_string(), settings.clone());
        Ok(())
    }
}
