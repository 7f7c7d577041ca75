use crate::shared::usecase::UseCase;
use reminder_scheduler_domain::ReminderOffsetConfig;
use reminder_scheduler_infra::ReminderContext;
use tracing::error;

/// Resolves the canonical reminder offsets of a tenant, going through the
/// per tenant offsets cache of the context.
///
/// Missing or malformed settings resolve to no offsets. Only an unavailable
/// settings store is an error.
#[derive(Debug)]
pub struct ResolveReminderOffsetsUseCase {
    pub tenant_id: String,
    /// Drop the cached offsets of the tenant before resolving
    pub invalidate_cache: bool,
}

#[derive(Debug, PartialEq)]
pub enum UseCaseError {
    StorageError,
}

#[async_trait::async_trait(?Send)]
impl UseCase for ResolveReminderOffsetsUseCase {
    type Response = Vec<ReminderOffsetConfig>;

    type Error = UseCaseError;

    const NAME: &'static str = "ResolveReminderOffsets";

    async fn execute(&mut self, ctx: &ReminderContext) -> Result<Self::Response, Self::Error> {
        if self.invalidate_cache {
            ctx.offsets_cache.invalidate(&self.tenant_id);
        }
        if let Some(offsets) = ctx.offsets_cache.get(&self.tenant_id) {
            return Ok(offsets);
        }

        let settings = ctx
            .repos
            .tenant_settings
            .find(&self.tenant_id)
            .await
            .map_err(|e| {
                error!(
                    "Unable to read reminder settings of tenant {}. Err: {:?}",
                    self.tenant_id, e
                );
                UseCaseError::StorageError
            })?;
        let offsets = settings
            .map(|s| s.resolve_offsets())
            .unwrap_or_default();

        ctx.offsets_cache
            .insert(self.tenant_id.clone(), offsets.clone());
        Ok(offsets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::testing::setup;
    use reminder_scheduler_infra::create_offsets_cache;
    use serde_json::json;

    fn usecase(invalidate_cache: bool) -> ResolveReminderOffsetsUseCase {
        ResolveReminderOffsetsUseCase {
            tenant_id: "t1".into(),
            invalidate_cache,
        }
    }

    fn minutes(offsets: &[ReminderOffsetConfig]) -> Vec<i64> {
        offsets.iter().map(|o| o.minutes_before).collect()
    }

    #[actix_web::test]
    async fn tenant_without_settings_has_no_offsets() {
        let t = setup();
        let res = usecase(false).execute(&t.ctx).await.unwrap();
        assert!(res.is_empty());
    }

    #[actix_web::test]
    async fn serves_cached_offsets_until_invalidated() {
        let t = setup();
        t.save_settings("t1", json!({ "appointmentOffsetsMinutes": [60] }))
            .await;
        let res = usecase(false).execute(&t.ctx).await.unwrap();
        assert_eq!(minutes(&res), vec![60]);

        t.save_settings("t1", json!({ "appointmentOffsetsMinutes": [60, 180] }))
            .await;
        let res = usecase(false).execute(&t.ctx).await.unwrap();
        assert_eq!(minutes(&res), vec![60]);

        let res = usecase(true).execute(&t.ctx).await.unwrap();
        assert_eq!(minutes(&res), vec![60, 180]);
    }

    #[actix_web::test]
    async fn expired_offsets_are_resolved_again() {
        let mut t = setup();
        t.ctx.config.offsets_cache_ttl_millis = 50;
        t.ctx.offsets_cache = create_offsets_cache(&t.ctx.config);
        t.save_settings("t1", json!({ "appointmentOffsetsMinutes": [60] }))
            .await;
        let res = usecase(false).execute(&t.ctx).await.unwrap();
        assert_eq!(minutes(&res), vec![60]);

        t.save_settings("t1", json!({ "appointmentOffsetsMinutes": [180] }))
            .await;
        actix_web::rt::time::sleep(std::time::Duration::from_millis(120)).await;
        let res = usecase(false).execute(&t.ctx).await.unwrap();
        assert_eq!(minutes(&res), vec![180]);
    }

    #[actix_web::test]
    async fn resolved_offsets_are_canonical_for_any_settings_shape() {
        let docs = vec![
            json!({ "offsets": [
                { "id": "x", "minutesBefore": 99999 },
                { "id": "x", "minutesBefore": -4 },
                { "id": "y", "minutesBefore": "120" },
                { "minutesBefore": 30 },
                { "minutesBefore": 30 },
                { "minutesBefore": 45 },
                { "minutesBefore": 50 },
            ]}),
            json!({ "appointmentOffsetsMinutes": [1, 2, 3, 10081, 600, 700, 800, 900] }),
            json!({ "dayBeforeEnabled": true, "threeHoursEnabled": true, "oneHourEnabled": true }),
            json!({ "offsets": 12, "dayBeforeEnabled": "true" }),
        ];
        for (i, doc) in docs.into_iter().enumerate() {
            let t = setup();
            let tenant_id = format!("t{}", i);
            t.save_settings(&tenant_id, doc).await;
            let mut usecase = ResolveReminderOffsetsUseCase {
                tenant_id,
                invalidate_cache: false,
            };
            let offsets = usecase.execute(&t.ctx).await.unwrap();
            assert!(offsets.len() <= 5);
            assert!(offsets
                .windows(2)
                .all(|w| w[0].minutes_before <= w[1].minutes_before));
            assert!(offsets
                .iter()
                .all(|o| o.minutes_before >= 15 && o.minutes_before <= 10080));
            let mut ids = offsets.iter().map(|o| o.id.clone()).collect::<Vec<_>>();
            ids.sort();
            ids.dedup();
            assert_eq!(ids.len(), offsets.len());
        }
    }
}
