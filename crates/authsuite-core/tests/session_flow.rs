//! Session lifecycle against a mock auth API.

mod common;

use std::time::Duration;

use authsuite_core::{Credentials, LoginError};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::*;

fn credentials() -> Credentials {
    Credentials::new(USERNAME, PASSWORD).expect("valid credentials")
}

async fn mount_login(server: &MockServer, token: &str) {
    Mock::given(method("POST"))
        .and(path("/login"))
        .and(body_json(json!({ "username": USERNAME, "password": PASSWORD })))
        .respond_with(ResponseTemplate::new(200).set_body_json(auth_body(token)))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_login_success_authenticates_and_schedules_refresh() {
    let server = MockServer::start().await;
    let token = token_expiring_in(15 * 60);
    mount_login(&server, &token).await;

    let session = coordinator(&server);
    session.login(&credentials()).await.expect("login");

    let state = session.snapshot();
    assert!(state.is_authenticated);
    assert_eq!(state.token(), Some(token.as_str()));
    assert_eq!(state.user_id(), Some(USER_ID));
    assert!(session.has_pending_refresh());
    assert_eq!(session.refresh_generation(), 1);
    assert_eq!(session.authorized_client().token(), Some(token.as_str()));
}

#[tokio::test]
async fn test_login_failure_kinds() {
    for (status, expected) in [(404, "UserNotFound"), (401, "InvalidCredentials"), (500, "Failed")] {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/login"))
            .respond_with(ResponseTemplate::new(status))
            .expect(1)
            .mount(&server)
            .await;

        let session = coordinator(&server);
        let err = session.login(&credentials()).await.unwrap_err();
        let kind = match err {
            LoginError::UserNotFound => "UserNotFound",
            LoginError::InvalidCredentials => "InvalidCredentials",
            LoginError::Failed(_) => "Failed",
            LoginError::InvalidInput(_) => "InvalidInput",
        };
        assert_eq!(kind, expected, "status {}", status);

        let state = session.snapshot();
        assert!(!state.is_authenticated);
        assert!(state.token().is_none());
        assert!(!session.has_pending_refresh());
    }
}

#[tokio::test]
async fn test_failed_login_clears_previous_session() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(auth_body(&token_expiring_in(900))))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let session = coordinator(&server);
    session.login(&credentials()).await.expect("first login");
    assert!(session.is_authenticated());

    let err = session.login(&credentials()).await.unwrap_err();
    assert!(matches!(err, LoginError::InvalidCredentials));
    assert!(!session.is_authenticated());
    assert!(!session.has_pending_refresh());
}

#[tokio::test]
async fn test_login_without_token_is_a_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "user": user_json() })))
        .mount(&server)
        .await;

    let session = coordinator(&server);
    assert!(matches!(
        session.login(&credentials()).await,
        Err(LoginError::Failed(_))
    ));
    assert!(!session.is_authenticated());
}

#[tokio::test]
async fn test_each_token_change_keeps_a_single_timer() {
    let server = MockServer::start().await;
    mount_login(&server, &token_expiring_in(15 * 60)).await;

    let session = coordinator(&server);
    session.login(&credentials()).await.expect("login");
    session.login(&credentials()).await.expect("second login");

    assert!(session.has_pending_refresh());
    assert_eq!(session.refresh_generation(), 2);
}

#[tokio::test]
async fn test_opaque_token_gets_no_timer() {
    let server = MockServer::start().await;
    mount_login(&server, "opaque-access-token").await;

    let session = coordinator(&server);
    session.login(&credentials()).await.expect("login");

    assert!(session.is_authenticated());
    assert!(!session.has_pending_refresh());
}

#[tokio::test]
async fn test_expiry_at_edge_of_time_range_gets_no_timer() {
    let server = MockServer::start().await;
    let token = token_with_exp(chrono::DateTime::<chrono::Utc>::MIN_UTC.timestamp() + 10);
    mount_login(&server, &token).await;

    let session = coordinator(&server);
    session.login(&credentials()).await.expect("login");

    assert!(session.is_authenticated());
    assert!(!session.has_pending_refresh());
}

#[tokio::test]
async fn test_refresh_replays_cookie_and_is_idempotent() {
    let server = MockServer::start().await;
    let refreshed = token_expiring_in(15 * 60);

    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("set-cookie", "auth_rt=refresh-cookie; Path=/; HttpOnly")
                .set_body_json(auth_body(&token_expiring_in(15 * 60))),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/refresh"))
        .and(header("cookie", "auth_rt=refresh-cookie"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "accessToken": refreshed })))
        .expect(2)
        .mount(&server)
        .await;

    let session = coordinator(&server);
    session.login(&credentials()).await.expect("login");

    assert!(session.refresh().await);
    let first = session.snapshot();
    assert!(session.refresh().await);
    let second = session.snapshot();

    assert_eq!(first, second);
    assert!(second.is_authenticated);
    assert_eq!(second.token(), Some(refreshed.as_str()));
    // /refresh answered without a profile, so the login profile is kept.
    assert_eq!(second.user_id(), Some(USER_ID));
    assert!(session.has_pending_refresh());
}

#[tokio::test]
async fn test_refresh_failure_clears_session() {
    let server = MockServer::start().await;
    mount_login(&server, &token_expiring_in(15 * 60)).await;
    Mock::given(method("POST"))
        .and(path("/refresh"))
        .respond_with(ResponseTemplate::new(400).set_body_string("Invalid refresh token"))
        .mount(&server)
        .await;

    let session = coordinator(&server);
    session.login(&credentials()).await.expect("login");

    assert!(!session.refresh().await);
    let state = session.snapshot();
    assert!(!state.is_authenticated);
    assert!(state.token().is_none());
    assert!(state.user.is_none());
    assert!(!session.has_pending_refresh());
}

#[tokio::test]
async fn test_token_inside_lead_window_refreshes_immediately() {
    let server = MockServer::start().await;
    let renewed = token_expiring_in(15 * 60);
    mount_login(&server, &token_expiring_in(30)).await;
    Mock::given(method("POST"))
        .and(path("/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(auth_body(&renewed)))
        .expect(1)
        .mount(&server)
        .await;

    let session = coordinator(&server);
    let mut changes = session.subscribe();
    session.login(&credentials()).await.expect("login");

    tokio::time::timeout(Duration::from_secs(5), async {
        while changes.borrow_and_update().token() != Some(renewed.as_str()) {
            changes.changed().await.expect("session dropped");
        }
    })
    .await
    .expect("scheduled refresh did not run");

    assert!(session.is_authenticated());
    assert!(session.has_pending_refresh());
}

#[tokio::test]
async fn test_logout_sends_bearer_and_clears() {
    let server = MockServer::start().await;
    let token = token_expiring_in(15 * 60);
    mount_login(&server, &token).await;
    Mock::given(method("POST"))
        .and(path("/logout"))
        .and(header("authorization", format!("Bearer {}", token).as_str()))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let session = coordinator(&server);
    session.login(&credentials()).await.expect("login");
    session.logout().await.expect("logout");

    assert!(!session.is_authenticated());
    assert!(!session.has_pending_refresh());
}

#[tokio::test]
async fn test_logout_clears_even_when_server_fails() {
    let server = MockServer::start().await;
    mount_login(&server, &token_expiring_in(15 * 60)).await;
    Mock::given(method("POST"))
        .and(path("/logout"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let session = coordinator(&server);
    session.login(&credentials()).await.expect("login");

    assert!(session.logout().await.is_err());
    assert!(!session.is_authenticated());
    assert!(session.snapshot().token().is_none());
    assert!(!session.has_pending_refresh());
}

#[tokio::test]
async fn test_logout_when_signed_out_stays_signed_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/logout"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let session = coordinator(&server);
    session.logout().await.expect("logout");
    assert!(!session.is_authenticated());
}

#[tokio::test]
async fn test_refresh_in_flight_during_logout_is_discarded() {
    let server = MockServer::start().await;
    mount_login(&server, &token_expiring_in(15 * 60)).await;
    Mock::given(method("POST"))
        .and(path("/refresh"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(auth_body(&token_expiring_in(15 * 60)))
                .set_delay(Duration::from_millis(300)),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/logout"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let session = coordinator(&server);
    session.login(&credentials()).await.expect("login");

    let in_flight = tokio::spawn({
        let session = session.clone();
        async move { session.refresh().await }
    });
    tokio::time::sleep(Duration::from_millis(50)).await;
    session.logout().await.expect("logout");

    assert!(!in_flight.await.expect("refresh task"));
    assert!(!session.is_authenticated());
    assert!(!session.has_pending_refresh());
}

#[tokio::test]
async fn test_resume_at_startup() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(auth_body(&token_expiring_in(900))))
        .mount(&server)
        .await;

    let session = coordinator(&server);
    assert!(session.resume().await);
    assert!(session.is_authenticated());
    assert_eq!(session.snapshot().user_id(), Some(USER_ID));
}

#[tokio::test]
async fn test_resume_without_cookie_stays_signed_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/refresh"))
        .respond_with(ResponseTemplate::new(400))
        .mount(&server)
        .await;

    let session = coordinator(&server);
    assert!(!session.resume().await);
    assert!(!session.is_authenticated());
}
