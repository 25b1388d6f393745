//! Session lifecycle coordination.
//!
//! `SessionCoordinator` owns the session state and the refresh timer. Every
//! token change goes through [`SessionCoordinator::apply`], which publishes
//! the new state and re-arms (or cancels) the single refresh timer.
//!
//! Login and logout bump a session epoch. A refresh that started under an
//! older epoch drops its result, so a refresh still in flight when the user
//! logs out cannot sign them back in.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::api::{ApiClient, ApiError, AuthResponse};
use crate::loading::LoadingTracker;

use super::scheduler::RefreshTimer;
use super::{token, Credentials, CredentialsError, Session};

/// Refresh this long before the access token expires.
pub const DEFAULT_REFRESH_LEAD: Duration = Duration::from_secs(60);

#[derive(Error, Debug)]
pub enum LoginError {
    #[error("{0}")]
    InvalidInput(#[from] CredentialsError),

    #[error("User not found.")]
    UserNotFound,

    #[error("Invalid credentials.")]
    InvalidCredentials,

    #[error("Login failed: {0}")]
    Failed(anyhow::Error),
}

impl LoginError {
    /// Map a failed login call onto the kinds the login form distinguishes.
    fn classify(err: anyhow::Error) -> Self {
        match err.downcast_ref::<ApiError>().and_then(ApiError::status) {
            Some(404) => LoginError::UserNotFound,
            Some(401) => LoginError::InvalidCredentials,
            _ => LoginError::Failed(err),
        }
    }
}

struct Inner {
    api: ApiClient,
    state: watch::Sender<Session>,
    timer: Mutex<RefreshTimer>,
    epoch: AtomicU64,
    lead: Duration,
    loading: LoadingTracker,
}

/// Cheap to clone; clones share the same session.
#[derive(Clone)]
pub struct SessionCoordinator {
    inner: Arc<Inner>,
}

impl SessionCoordinator {
    pub fn new(api: ApiClient, loading: LoadingTracker, lead: Duration) -> Self {
        let (state, _) = watch::channel(Session::default());
        Self {
            inner: Arc::new(Inner {
                api,
                state,
                timer: Mutex::new(RefreshTimer::new()),
                epoch: AtomicU64::new(0),
                lead,
                loading,
            }),
        }
    }

    // =========================================================================
    // Read access
    // =========================================================================

    pub fn snapshot(&self) -> Session {
        self.inner.state.borrow().clone()
    }

    /// Receiver that observes every session change.
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.inner.state.subscribe()
    }

    pub fn is_authenticated(&self) -> bool {
        self.inner.state.borrow().is_authenticated
    }

    /// API client carrying the current bearer token, if any.
    pub fn authorized_client(&self) -> ApiClient {
        self.inner.api.with_token(self.snapshot().access_token)
    }

    pub fn has_pending_refresh(&self) -> bool {
        self.lock_timer().is_pending()
    }

    /// How many times a refresh has been scheduled over this session's life.
    pub fn refresh_generation(&self) -> u64 {
        self.lock_timer().generation()
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Log in. Any failure leaves the session cleared. Never retries.
    pub async fn login(&self, credentials: &Credentials) -> Result<(), LoginError> {
        let epoch = self.inner.epoch.fetch_add(1, Ordering::SeqCst) + 1;

        let result = self
            .inner
            .api
            .login(credentials.username(), credentials.password())
            .await;

        if self.inner.epoch.load(Ordering::SeqCst) != epoch {
            warn!("Session changed while logging in; discarding login result");
            return Err(LoginError::Failed(anyhow::anyhow!(
                "Login was superseded by a later session change"
            )));
        }

        match result {
            Ok(AuthResponse {
                access_token: Some(token),
                user,
            }) if !token.is_empty() => {
                let session = Session::authenticated(token, Some(user.unwrap_or_default()));
                info!(user = session.user.as_ref().map(|u| u.display_name()), "Login successful");
                self.apply(session);
                Ok(())
            }
            Ok(_) => {
                self.clear();
                warn!("Login response carried no access token");
                Err(LoginError::Failed(
                    ApiError::InvalidResponse("Login response carried no access token".to_string())
                        .into(),
                ))
            }
            Err(e) => {
                self.clear();
                warn!(error = %e, "Login failed");
                Err(LoginError::classify(e))
            }
        }
    }

    /// Renew the access token using the refresh cookie. Any failure clears
    /// the session. Returns whether the session is authenticated afterwards.
    pub async fn refresh(&self) -> bool {
        let epoch = self.inner.epoch.load(Ordering::SeqCst);
        let result = self.inner.api.refresh().await;

        if self.inner.epoch.load(Ordering::SeqCst) != epoch {
            debug!("Session changed during refresh; discarding refresh result");
            return false;
        }

        match result {
            Ok(AuthResponse {
                access_token: Some(token),
                user,
            }) if !token.is_empty() => {
                // /refresh may omit the profile; keep the one we already have.
                let user = user
                    .or_else(|| self.snapshot().user)
                    .unwrap_or_default();
                self.apply(Session::authenticated(token, Some(user)));
                info!("Access token refreshed");
                true
            }
            Ok(_) => {
                warn!("Refresh response carried no access token");
                self.clear();
                false
            }
            Err(e) => {
                warn!(error = %e, "Token refresh failed");
                self.clear();
                false
            }
        }
    }

    /// Try to pick up a previous session at startup.
    pub async fn resume(&self) -> bool {
        let _loading = self.inner.loading.begin();
        let resumed = self.refresh().await;
        if resumed {
            info!("Resumed previous session");
        } else {
            debug!("No previous session to resume");
        }
        resumed
    }

    /// Sign out. Local state is cleared before the server is contacted, so
    /// the session ends even when the server call fails; that failure is
    /// still returned for display.
    pub async fn logout(&self) -> Result<()> {
        self.inner.epoch.fetch_add(1, Ordering::SeqCst);
        let client = self.authorized_client();
        self.clear();
        info!("Signed out");

        client
            .logout()
            .await
            .context("Server did not confirm logout")
    }

    // =========================================================================
    // State transitions
    // =========================================================================

    fn apply(&self, session: Session) {
        let token = session.access_token.clone();
        self.inner.state.send_replace(session);
        self.reschedule(token.as_deref());
    }

    fn clear(&self) {
        self.inner.state.send_replace(Session::default());
        self.lock_timer().cancel();
    }

    fn reschedule(&self, token: Option<&str>) {
        let mut timer = self.lock_timer();
        let delay = token.and_then(|t| token::refresh_delay(t, Utc::now(), self.inner.lead));

        let Some(delay) = delay else {
            if timer.cancel() {
                debug!("Access token has no readable expiry; cancelled pending refresh");
            }
            return;
        };

        debug!(delay_secs = delay.as_secs(), "Scheduling token refresh");
        let inner = Arc::downgrade(&self.inner);
        timer.arm(delay, async move {
            if let Some(inner) = inner.upgrade() {
                let refreshed = SessionCoordinator { inner }.refresh().await;
                debug!(refreshed, "Scheduled refresh finished");
            }
        });
    }

    fn lock_timer(&self) -> MutexGuard<'_, RefreshTimer> {
        self.inner.timer.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
