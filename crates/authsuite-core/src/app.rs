//! Application services wired together.
//!
//! `AuthSuite` owns one of each service (session, theme, loading flag) and
//! hands them out explicitly instead of through process-wide globals.

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::api::ApiClient;
use crate::auth::{Credentials, LoginError, SessionCoordinator};
use crate::config::Config;
use crate::loading::LoadingTracker;
use crate::models::ThemeSettings;
use crate::routing::{self, Resolution};
use crate::theme::{ThemeStore, ThemeUpdate};

pub struct AuthSuite {
    api: ApiClient,
    session: SessionCoordinator,
    theme: ThemeStore,
    loading: LoadingTracker,
}

impl AuthSuite {
    pub fn new(config: &Config) -> Result<Self> {
        let api = ApiClient::new(config.api_base_url()?, config.request_timeout())
            .context("Failed to create API client")?;
        debug!(base_url = api.base_url(), "API client configured");
        Ok(Self::with_client(api, config))
    }

    pub fn with_client(api: ApiClient, config: &Config) -> Self {
        let loading = LoadingTracker::new();
        let session = SessionCoordinator::new(api.clone(), loading.clone(), config.refresh_lead());
        let theme = ThemeStore::new(loading.clone());
        Self {
            api,
            session,
            theme,
            loading,
        }
    }

    pub fn session(&self) -> &SessionCoordinator {
        &self.session
    }

    pub fn theme(&self) -> &ThemeStore {
        &self.theme
    }

    pub fn is_loading(&self) -> bool {
        self.loading.is_loading()
    }

    /// Startup: resume any previous session and load the theme, together.
    /// Returns whether a previous session was resumed.
    pub async fn start(&self) -> bool {
        let (resumed, _) = futures::join!(self.session.resume(), self.theme.fetch(&self.api));
        info!(resumed, "AuthSuite started");
        resumed
    }

    /// Load the theme without touching the session. For one-shot callers
    /// that have no refresh cookie to resume from.
    pub async fn load_theme(&self) -> ThemeSettings {
        self.theme.fetch(&self.api).await
    }

    /// Validate the login form input, then log in.
    pub async fn login(&self, username: &str, password: &str) -> Result<(), LoginError> {
        let credentials = Credentials::new(username, password)?;
        self.session.login(&credentials).await
    }

    pub async fn logout(&self) -> Result<()> {
        self.session.logout().await
    }

    /// Save theme settings as the signed-in user.
    pub async fn save_theme(&self, update: ThemeUpdate) -> Result<ThemeSettings> {
        let session = self.session.snapshot();
        let api = self.session.authorized_client();
        self.theme.save(&api, update, session.user_id()).await
    }

    /// Reset the theme to its defaults as the signed-in user.
    pub async fn reset_theme(&self) -> Result<ThemeSettings> {
        let session = self.session.snapshot();
        let api = self.session.authorized_client();
        self.theme.reset(&api, session.user_id()).await
    }

    /// Route `path` against the current session and loading state.
    pub fn resolve(&self, path: &str) -> Resolution {
        routing::resolve(path, self.session.is_authenticated(), self.is_loading())
    }
}
