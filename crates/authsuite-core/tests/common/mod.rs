//! Helpers shared by the integration tests.

#![allow(dead_code)]

use std::time::Duration;

use authsuite_core::auth::DEFAULT_REFRESH_LEAD;
use authsuite_core::{ApiClient, AuthSuite, Config, LoadingTracker, SessionCoordinator};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::Utc;
use serde_json::{json, Value};
use wiremock::MockServer;

pub const USERNAME: &str = "admin@authsuite.dev";
pub const PASSWORD: &str = "correct horse battery staple";
pub const USER_ID: &str = "3f2b8c1e-7d4a-4f7e-9b1a-2c5d6e7f8a9b";

/// Unsigned JWT for `USERNAME` that expires `secs` from now.
pub fn token_expiring_in(secs: i64) -> String {
    token_with_exp(Utc::now().timestamp() + secs)
}

/// Unsigned JWT for `USERNAME` with a raw `exp` claim.
pub fn token_with_exp(exp: i64) -> String {
    let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(format!(r#"{{"sub":"{}","exp":{}}}"#, USERNAME, exp));
    format!("{}.{}.sig", header, payload)
}

pub fn user_json() -> Value {
    json!({ "id": USER_ID, "email": USERNAME })
}

pub fn auth_body(token: &str) -> Value {
    json!({ "user": user_json(), "accessToken": token })
}

pub fn client(server: &MockServer) -> ApiClient {
    ApiClient::new(&server.uri(), Duration::from_secs(5)).expect("Failed to build client")
}

pub fn coordinator(server: &MockServer) -> SessionCoordinator {
    SessionCoordinator::new(client(server), LoadingTracker::new(), DEFAULT_REFRESH_LEAD)
}

pub fn suite(server: &MockServer) -> AuthSuite {
    let config = Config {
        api_base_url: Some(server.uri()),
        request_timeout_secs: Some(5),
        ..Default::default()
    };
    AuthSuite::new(&config).expect("Failed to build suite")
}
