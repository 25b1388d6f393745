//! Subcommand implementations.

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use authsuite_core::config::ENV_PASSWORD;
use authsuite_core::{
    AuthSuite, Config, LoginError, Page, Resolution, Session, ThemeAttachment, ThemeSettings,
    ThemeUpdate,
};
use chrono::Utc;
use clap::Args;
use tracing::{info, warn};

/// Options for `theme save`.
#[derive(Args, Debug, Default)]
pub struct ThemeChanges {
    #[arg(long)]
    pub primary_color: Option<String>,
    #[arg(long)]
    pub secondary_color: Option<String>,
    #[arg(long)]
    pub tertiary_color: Option<String>,
    #[arg(long)]
    pub title_font: Option<String>,
    #[arg(long)]
    pub body_font: Option<String>,
    /// Image file to upload as the suite logo
    #[arg(long)]
    pub logo: Option<PathBuf>,
    /// Image file to upload as the favicon
    #[arg(long)]
    pub favicon: Option<PathBuf>,
}

impl ThemeChanges {
    /// Apply the requested changes on top of `current`.
    pub fn into_update(self, current: ThemeSettings) -> Result<ThemeUpdate> {
        let mut settings = current;
        if let Some(color) = self.primary_color {
            settings.primary_color = color;
        }
        if let Some(color) = self.secondary_color {
            settings.secondary_color = color;
        }
        if let Some(color) = self.tertiary_color {
            settings.tertiary_color = color;
        }
        if let Some(font) = self.title_font {
            settings.title_font = font;
        }
        if let Some(font) = self.body_font {
            settings.body_font = font;
        }

        let mut update = ThemeUpdate::new(settings);
        if let Some(path) = self.logo {
            update = update.with_logo(ThemeAttachment::from_path(&path)?);
        }
        if let Some(path) = self.favicon {
            update = update.with_favicon(ThemeAttachment::from_path(&path)?);
        }
        Ok(update)
    }
}

// ============================================================================
// Login
// ============================================================================

/// Log in (or resume) and keep the session alive until Ctrl+C.
pub async fn hold_session(config: &mut Config, username: Option<String>) -> Result<()> {
    // The refresh cookie lives only as long as this process, so there is
    // never a previous session to resume.
    let suite = AuthSuite::new(config)?;
    sign_in(&suite, config, username).await?;
    print_session(&suite.session().snapshot());
    println!("Keeping the session alive. Press Ctrl+C to log out.");

    let mut changes = suite.session().subscribe();
    changes.borrow_and_update();
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = changes.changed() => {
                if changed.is_err() {
                    break;
                }
                let session = changes.borrow_and_update().clone();
                if session.is_authenticated {
                    print_session(&session);
                } else {
                    println!("Session ended: the access token could not be refreshed.");
                    return Ok(());
                }
            }
        }
    }

    sign_out(&suite).await;
    Ok(())
}

/// Prompt for credentials and log in, remembering the username on success.
async fn sign_in(suite: &AuthSuite, config: &mut Config, username: Option<String>) -> Result<()> {
    let username = match username.or_else(|| config.default_username()) {
        Some(name) => name,
        None => prompt_username()?,
    };
    let password = match std::env::var(ENV_PASSWORD) {
        Ok(password) if !password.is_empty() => password,
        _ => rpassword::prompt_password(format!("Password for {}: ", username))?,
    };

    println!("Authenticating...");
    match suite.login(username.trim(), &password).await {
        Ok(()) => {
            config.last_username = Some(username.trim().to_string());
            if let Err(e) = config.save() {
                warn!(error = %e, "Failed to save config");
            }
            info!("Login successful");
            println!("Login successful!");
            Ok(())
        }
        Err(LoginError::Failed(e)) => Err(e.context("Login failed. Please try again.")),
        Err(e) => bail!("{}", e),
    }
}

async fn sign_out(suite: &AuthSuite) {
    match suite.logout().await {
        Ok(()) => println!("Logged out."),
        Err(e) => {
            warn!(error = %e, "Logout request failed");
            println!("Logged out locally; the server did not confirm: {}", e);
        }
    }
}

fn prompt_username() -> Result<String> {
    print!("Email: ");
    io::stdout().flush()?;

    let mut username = String::new();
    io::stdin().read_line(&mut username)?;
    Ok(username.trim().to_string())
}

fn print_session(session: &Session) {
    let who = session
        .user
        .as_ref()
        .map(|u| u.display_name().to_string())
        .unwrap_or_else(|| "unknown user".to_string());
    match session.minutes_until_expiry(Utc::now()) {
        Some(minutes) => println!("Signed in as {} (token expires in {}m)", who, minutes),
        None => println!("Signed in as {}", who),
    }
}

// ============================================================================
// Theme
// ============================================================================

pub async fn show_theme(config: &Config) -> Result<()> {
    let suite = AuthSuite::new(config)?;
    let theme = suite.load_theme().await;
    println!("{}", serde_json::to_string_pretty(&theme)?);
    Ok(())
}

pub async fn save_theme(
    config: &mut Config,
    username: Option<String>,
    changes: ThemeChanges,
) -> Result<()> {
    let suite = AuthSuite::new(config)?;
    suite.load_theme().await;

    let update = changes.into_update(suite.theme().current())?;
    if !suite.theme().has_changes(&update) {
        println!("No changes to save.");
        return Ok(());
    }

    sign_in(&suite, config, username).await?;
    let result = suite
        .save_theme(update)
        .await
        .context("There was an error saving your theme settings");
    sign_out(&suite).await;

    let saved = result?;
    println!("Theme saved.");
    println!("{}", serde_json::to_string_pretty(&saved)?);
    Ok(())
}

pub async fn reset_theme(config: &mut Config, username: Option<String>) -> Result<()> {
    let suite = AuthSuite::new(config)?;
    suite.load_theme().await;

    if suite.theme().is_default() {
        println!("Theme already uses the default settings.");
        return Ok(());
    }

    sign_in(&suite, config, username).await?;
    let result = suite
        .reset_theme()
        .await
        .context("There was an error resetting your theme settings");
    sign_out(&suite).await;

    result?;
    println!("Theme reset to default.");
    Ok(())
}

// ============================================================================
// Routing
// ============================================================================

pub fn describe_route(path: &str, authenticated: bool) -> String {
    match authsuite_core::routing::resolve(path, authenticated, false) {
        Resolution::Redirect(to) => format!("{} -> redirect to {}", path, to),
        Resolution::Render(page) => format!("{} -> {}", path, page_name(page)),
    }
}

fn page_name(page: Page) -> &'static str {
    match page {
        Page::Loading => "loading screen",
        Page::Login => "login form",
        Page::Home => "home",
        Page::Settings => "settings",
        Page::NotFound => "404 not found",
    }
}
