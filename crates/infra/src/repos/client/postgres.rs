use super::IClientRepo;
use reminder_scheduler_domain::Client;
use sqlx::{FromRow, PgPool};

pub struct PostgresClientRepo {
    pool: PgPool,
}

impl PostgresClientRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct ClientRaw {
    client_id: String,
    display_name: Option<String>,
    fcm_tokens: Vec<String>,
}

impl From<ClientRaw> for Client {
    fn from(raw: ClientRaw) -> Self {
        Self {
            id: raw.client_id,
            display_name: raw.display_name,
            fcm_tokens: raw.fcm_tokens,
        }
    }
}

#[async_trait::async_trait]
impl IClientRepo for PostgresClientRepo {
    async fn save(&self, client: &Client) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO clients (client_id, display_name, fcm_tokens)
            VALUES ($1, $2, $3)
            ON CONFLICT (client_id) DO UPDATE SET
                display_name = EXCLUDED.display_name,
                fcm_tokens = EXCLUDED.fcm_tokens
            "#,
        )
        .bind(&client.id)
        .bind(&client.display_name)
        .bind(&client.fcm_tokens)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find(&self, client_id: &str) -> anyhow::Result<Option<Client>> {
        let raw = sqlx::query_as::<_, ClientRaw>(
            r#"
            SELECT client_id, display_name, fcm_tokens FROM clients
            WHERE client_id = $1
            "#,
        )
        .bind(client_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(raw.map(Client::from))
    }

    async fn remove_tokens(&self, client_id: &str, tokens: &[String]) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            UPDATE clients
            SET fcm_tokens = ARRAY(
                SELECT t FROM unnest(fcm_tokens) AS t
                WHERE NOT (t = ANY($2))
            )
            WHERE client_id = $1
            "#,
        )
        .bind(client_id)
        .bind(tokens)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
