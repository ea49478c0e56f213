//! Deciding whether a bearer token must be refreshed before use.

use chrono::{DateTime, Duration, Utc};
use dbcsv_core::protocol::TokenClaims;

use crate::error::{Error, Result};

/// Environment variable overriding the refresh threshold, in seconds.
pub const REFRESH_THRESHOLD_ENV: &str = "ACCESS_TOKEN_DELTA_SECONDS";

/// Default refresh threshold in seconds.
pub const DEFAULT_REFRESH_THRESHOLD_SECONDS: i64 = 60;

/// What to do with the current token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenCheck {
    /// Valid for longer than the threshold.
    Keep,
    /// Still valid but within the threshold.
    Refresh,
    /// No validity left.
    Expired,
}

/// Reads the refresh threshold from the environment, falling back to 60 s.
#[must_use]
pub fn refresh_threshold_from_env() -> Duration {
    let seconds = std::env::var(REFRESH_THRESHOLD_ENV)
        .ok()
        .and_then(|raw| raw.trim().parse().ok())
        .unwrap_or(DEFAULT_REFRESH_THRESHOLD_SECONDS);
    Duration::seconds(seconds)
}

/// Classifies `token` at `now` without verifying it.
///
/// # Errors
///
/// Returns `Error::Authentication` if the expiry cannot be read.
pub fn check_token(token: &str, threshold: Duration, now: DateTime<Utc>) -> Result<TokenCheck> {
    let claims = TokenClaims::decode(token)
        .ok_or_else(|| Error::Authentication("Malformed access token".to_string()))?;
    let remaining = claims.remaining(now);

    Ok(if remaining > threshold {
        TokenCheck::Keep
    } else if remaining <= Duration::zero() {
        TokenCheck::Expired
    } else {
        TokenCheck::Refresh
    })
}
