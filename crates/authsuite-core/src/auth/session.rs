use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

#[cfg(feature = "ts")]
use ts_rs::TS;

use crate::models::UserProfile;

use super::token;

/// Snapshot of the signed-in state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(TS), ts(export))]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub access_token: Option<String>,
    pub is_authenticated: bool,
    pub user: Option<UserProfile>,
}

impl Session {
    pub fn authenticated(access_token: String, user: Option<UserProfile>) -> Self {
        Self {
            access_token: Some(access_token),
            is_authenticated: true,
            user,
        }
    }

    /// Get the bearer token if signed in
    pub fn token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    /// Get the user id if a profile is known
    pub fn user_id(&self) -> Option<&str> {
        self.user.as_ref().and_then(|u| u.id.as_deref())
    }

    /// Expiry decoded from the access token, if readable
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.token().and_then(token::decode_expiry)
    }

    pub fn time_until_expiry(&self, now: DateTime<Utc>) -> Option<Duration> {
        self.expires_at().map(|exp| exp - now)
    }

    /// Get minutes remaining until expiry (for display)
    pub fn minutes_until_expiry(&self, now: DateTime<Utc>) -> Option<i64> {
        self.time_until_expiry(now).map(|d| d.num_minutes().max(0))
    }
}
