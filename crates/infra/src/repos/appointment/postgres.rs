use super::IAppointmentRepo;
use reminder_scheduler_domain::{Appointment, AppointmentRef, AppointmentSnapshot, StartField};
use sqlx::{types::Json, FromRow, PgPool};
use tracing::error;

pub struct PostgresAppointmentRepo {
    pool: PgPool,
}

impl PostgresAppointmentRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct AppointmentRaw {
    path: String,
    data: serde_json::Value,
}

impl AppointmentRaw {
    fn into_snapshot(self) -> Option<AppointmentSnapshot> {
        let reference = match self.path.parse::<AppointmentRef>() {
            Ok(r) => r,
            Err(e) => {
                error!("Stored appointment has an invalid path. Err: {:?}", e);
                return None;
            }
        };
        match serde_json::from_value(self.data) {
            Ok(appointment) => Some(AppointmentSnapshot {
                reference,
                appointment,
            }),
            Err(e) => {
                error!(
                    "Stored appointment {} could not be read. Err: {:?}",
                    self.path, e
                );
                None
            }
        }
    }
}

#[async_trait::async_trait]
impl IAppointmentRepo for PostgresAppointmentRepo {
    async fn save(
        &self,
        reference: &AppointmentRef,
        appointment: &Appointment,
    ) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO appointments (path, tenant_id, data)
            VALUES ($1, $2, $3)
            ON CONFLICT (path) DO UPDATE SET
                tenant_id = EXCLUDED.tenant_id,
                data = EXCLUDED.data
            "#,
        )
        .bind(reference.path())
        .bind(reference.tenant_id())
        .bind(Json(appointment))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find(&self, reference: &AppointmentRef) -> anyhow::Result<Option<Appointment>> {
        let raw = sqlx::query_as::<_, AppointmentRaw>(
            r#"
            SELECT path, data FROM appointments
            WHERE path = $1
            "#,
        )
        .bind(reference.path())
        .fetch_optional(&self.pool)
        .await?;

        Ok(raw
            .and_then(AppointmentRaw::into_snapshot)
            .map(|snapshot| snapshot.appointment))
    }

    async fn mark_sent_if_unset(
        &self,
        reference: &AppointmentRef,
        offset_id: &str,
    ) -> anyhow::Result<bool> {
        let flag = Appointment::sent_flag_key(offset_id);
        let res = sqlx::query(
            r#"
            UPDATE appointments
            SET data = jsonb_set(data, ARRAY[$2::text], 'true'::jsonb, true)
            WHERE path = $1 AND COALESCE(data->>$2, 'false') <> 'true'
            "#,
        )
        .bind(reference.path())
        .bind(&flag)
        .execute(&self.pool)
        .await?;

        Ok(res.rows_affected() == 1)
    }

    async fn find_starting_between(
        &self,
        field: StartField,
        from: i64,
        to: i64,
        limit: usize,
    ) -> anyhow::Result<Vec<AppointmentSnapshot>> {
        let raws = sqlx::query_as::<_, AppointmentRaw>(
            r#"
            SELECT path, data FROM appointments
            WHERE (
                CASE WHEN jsonb_typeof(data->$1) = 'number'
                THEN (data->>$1)::numeric END
            ) BETWEEN $2 AND $3
            ORDER BY path
            LIMIT $4
            "#,
        )
        .bind(field.field_name())
        .bind(from)
        .bind(to)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(raws
            .into_iter()
            .filter_map(AppointmentRaw::into_snapshot)
            .collect())
    }
}
