use crate::error::ReminderApiError;
use actix_web::HttpRequest;
use reminder_scheduler_infra::ReminderContext;

/// Header internal callers (task queue, store triggers, operators) send their
/// key in
pub const INTERNAL_KEY_HEADER: &str = "reminders-internal-key";

/// Only lets requests through that carry the configured internal api key
pub fn protect_internal_route(
    req: &HttpRequest,
    ctx: &ReminderContext,
) -> Result<(), ReminderApiError> {
    let key = match req.headers().get(INTERNAL_KEY_HEADER) {
        Some(key) => match key.to_str() {
            Ok(key) => key,
            Err(_) => {
                return Err(ReminderApiError::Unauthorized(format!(
                    "Malformed key provided in {} header",
                    INTERNAL_KEY_HEADER
                )))
            }
        },
        None => {
            return Err(ReminderApiError::Unauthorized(format!(
                "Unable to find key in {} header",
                INTERNAL_KEY_HEADER
            )))
        }
    };

    if key == ctx.config.internal_api_key {
        Ok(())
    } else {
        Err(ReminderApiError::Unauthorized(format!(
            "Invalid key provided in {} header",
            INTERNAL_KEY_HEADER
        )))
    }
}
