use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use tokio::sync::watch;
use tracing::{error, info};

use crate::api::ApiClient;
use crate::loading::LoadingTracker;
use crate::models::ThemeSettings;

use super::{ThemeForm, ThemeUpdate};

/// In-memory copy of the suite's theme settings.
///
/// Settings are only ever replaced wholesale with what the server returns.
#[derive(Clone)]
pub struct ThemeStore {
    current: Arc<watch::Sender<ThemeSettings>>,
    loading: LoadingTracker,
}

impl ThemeStore {
    pub fn new(loading: LoadingTracker) -> Self {
        let (current, _) = watch::channel(ThemeSettings::default());
        Self {
            current: Arc::new(current),
            loading,
        }
    }

    pub fn current(&self) -> ThemeSettings {
        self.current.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ThemeSettings> {
        self.current.subscribe()
    }

    /// Whether saving `update` would change anything.
    pub fn has_changes(&self, update: &ThemeUpdate) -> bool {
        update.has_attachments()
            || update.settings.without_audit() != self.current.borrow().without_audit()
    }

    /// Whether a reset would change anything.
    pub fn is_default(&self) -> bool {
        self.current.borrow().is_default()
    }

    /// Load the stored theme. When the server cannot be reached the default
    /// theme is used instead.
    pub async fn fetch(&self, api: &ApiClient) -> ThemeSettings {
        let _loading = self.loading.begin();
        let theme = match api.fetch_theme().await {
            Ok(theme) => {
                info!("Theme loaded");
                theme
            }
            Err(e) => {
                error!(error = %e, "Error fetching theme, using default theme");
                ThemeSettings::default()
            }
        };
        self.current.send_replace(theme.clone());
        theme
    }

    /// Save new settings and adopt the server's answer. On failure the
    /// current settings are left as they were.
    pub async fn save(
        &self,
        api: &ApiClient,
        update: ThemeUpdate,
        updated_by: Option<&str>,
    ) -> Result<ThemeSettings> {
        let form = ThemeForm::save(update, updated_by, Utc::now());
        self.submit(api, form).await
    }

    /// Restore the default theme and drop any uploaded images.
    pub async fn reset(&self, api: &ApiClient, updated_by: Option<&str>) -> Result<ThemeSettings> {
        let form = ThemeForm::reset(updated_by, Utc::now());
        self.submit(api, form).await
    }

    async fn submit(&self, api: &ApiClient, form: ThemeForm) -> Result<ThemeSettings> {
        let _loading = self.loading.begin();
        let reset = form.is_reset();
        match api.update_theme(form).await {
            Ok(theme) => {
                info!(reset, "Theme saved");
                self.current.send_replace(theme.clone());
                Ok(theme)
            }
            Err(e) => {
                error!(error = %e, reset, "Error saving theme");
                Err(e)
            }
        }
    }
}
