use super::{parse_settings, ITenantSettingsRepo};
use reminder_scheduler_domain::TenantReminderSettings;
use sqlx::{types::Json, FromRow, PgPool};

pub struct PostgresTenantSettingsRepo {
    pool: PgPool,
}

impl PostgresTenantSettingsRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct TenantSettingsRaw {
    data: serde_json::Value,
}

#[async_trait::async_trait]
impl ITenantSettingsRepo for PostgresTenantSettingsRepo {
    async fn find(&self, tenant_id: &str) -> anyhow::Result<Option<TenantReminderSettings>> {
        let raw = sqlx::query_as::<_, TenantSettingsRaw>(
            r#"
            SELECT data FROM tenant_reminder_settings
            WHERE tenant_id = $1
            "#,
        )
        .bind(tenant_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(raw.map(|raw| parse_settings(tenant_id, &raw.data)))
    }

    async fn save(&self, tenant_id: &str, settings: &serde_json::Value) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO tenant_reminder_settings (tenant_id, data)
            VALUES ($1, $2)
            ON CONFLICT (tenant_id) DO UPDATE SET data = EXCLUDED.data
            "#,
        )
        .bind(tenant_id)
        .bind(Json(settings))
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
