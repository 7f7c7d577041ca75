use rand::Rng;

const SECRET_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Alphanumeric secret, used when no internal api key is configured
pub fn create_random_secret(secret_len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..secret_len)
        .map(|_| SECRET_CHARSET[rng.gen_range(0..SECRET_CHARSET.len())] as char)
        .collect()
}

/// Delay before retry number `attempt` (0 based): `min_secs * 2^attempt`,
/// capped at `max_secs`
pub fn exponential_backoff_secs(attempt: u32, min_secs: u64, max_secs: u64) -> u64 {
    let factor = 2u64.checked_pow(attempt).unwrap_or(u64::MAX);
    min_secs.saturating_mul(factor).min(max_secs)
}

/// `exponential_backoff_secs` with up to 10% random jitter added, so that
/// tasks failing together do not retry together
pub fn jittered_backoff_millis(attempt: u32, min_secs: u64, max_secs: u64) -> i64 {
    let base_millis = exponential_backoff_secs(attempt, min_secs, max_secs).saturating_mul(1000);
    let jitter = rand::thread_rng().gen_range(0..=base_millis / 10);
    base_millis.saturating_add(jitter).min(i64::MAX as u64) as i64
}
