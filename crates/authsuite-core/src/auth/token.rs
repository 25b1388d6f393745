//! Access token inspection.
//!
//! Only the JWT payload is read, to learn when the token expires. The
//! signature is the server's business; a token that cannot be read simply
//! gets no scheduled refresh.

use std::collections::HashSet;
use std::time::Duration;

use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct Claims {
    exp: Option<f64>,
}

/// Validation that only parses: no signature, audience or expiry checks.
fn inspect_only() -> Validation {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims = HashSet::new();
    validation
}

/// Expiry instant encoded in a JWT's `exp` claim.
pub fn decode_expiry(token: &str) -> Option<DateTime<Utc>> {
    // Segments are unpadded base64url; tolerate servers that pad them.
    let token = token
        .split('.')
        .map(|segment| segment.trim_end_matches('='))
        .collect::<Vec<_>>()
        .join(".");

    let data = decode::<Claims>(&token, &DecodingKey::from_secret(&[]), &inspect_only()).ok()?;
    let exp = data.claims.exp?;
    if !exp.is_finite() {
        return None;
    }
    DateTime::from_timestamp_millis((exp * 1000.0) as i64)
}

/// How long to wait before refreshing `token`: `lead` ahead of its expiry,
/// floored at zero. `None` when the expiry cannot be read or sits too close
/// to the edge of the representable range.
pub fn refresh_delay(token: &str, now: DateTime<Utc>, lead: Duration) -> Option<Duration> {
    let expires_at = decode_expiry(token)?;
    let lead = chrono::Duration::from_std(lead).ok()?;
    let fire_at = expires_at.checked_sub_signed(lead)?;
    Some(
        fire_at
            .signed_duration_since(now)
            .to_std()
            .unwrap_or(Duration::ZERO),
    )
}
