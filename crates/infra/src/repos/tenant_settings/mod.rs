mod inmemory;
mod postgres;

pub use inmemory::InMemoryTenantSettingsRepo;
pub use postgres::PostgresTenantSettingsRepo;
use reminder_scheduler_domain::TenantReminderSettings;
use tracing::warn;

/// Read only access to the reminder settings document of each tenant
#[async_trait::async_trait]
pub trait ITenantSettingsRepo: Send + Sync {
    /// `Ok(None)` when the tenant has no settings document. Fields of an
    /// unexpected type are ignored one by one, and a document that is not a
    /// json object is treated as an empty document.
    async fn find(&self, tenant_id: &str) -> anyhow::Result<Option<TenantReminderSettings>>;
    async fn save(&self, tenant_id: &str, settings: &serde_json::Value) -> anyhow::Result<()>;
}

fn parse_settings(tenant_id: &str, doc: &serde_json::Value) -> TenantReminderSettings {
    match serde_json::from_value(doc.clone()) {
        Ok(settings) => settings,
        Err(e) => {
            warn!(
                "Reminder settings of tenant {} are malformed, ignoring them. Err: {:?}",
                tenant_id, e
            );
            TenantReminderSettings::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::ReminderContext;
    use serde_json::json;

    #[tokio::test]
    async fn mistyped_fields_are_ignored_one_by_one() {
        let ctx = ReminderContext::create_inmemory();
        let repo = &ctx.repos.tenant_settings;

        assert!(repo.find("t1").await.unwrap().is_none());

        repo.save("t1", &json!({ "offsets": [{ "minutesBefore": 60 }], "locale": 5 }))
            .await
            .unwrap();
        let settings = repo.find("t1").await.unwrap().expect("To find settings");
        assert_eq!(settings.resolve_offsets()[0].minutes_before, 60);

        repo.save(
            "t1",
            &json!({ "offsets": { "minutesBefore": 30 }, "appointmentOffsetsMinutes": [60] }),
        )
        .await
        .unwrap();
        let settings = repo.find("t1").await.unwrap().expect("To find settings");
        let offsets = settings.resolve_offsets();
        assert_eq!(offsets.len(), 1);
        assert_eq!(offsets[0].minutes_before, 60);

        repo.save("t1", &json!("not a document")).await.unwrap();
        let settings = repo.find("t1").await.unwrap().expect("To find settings");
        assert!(settings.resolve_offsets().is_empty());
    }
}
