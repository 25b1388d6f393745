//! AuthSuite core library.
//!
//! Session lifecycle (login, silent token refresh, logout), the auth API
//! client, the shared theme settings, and the client route table.

pub mod api;
pub mod app;
pub mod auth;
pub mod config;
pub mod loading;
pub mod models;
pub mod routing;
pub mod theme;

pub use api::{ApiClient, ApiError};
pub use app::AuthSuite;
pub use auth::{Credentials, CredentialsError, LoginError, Session, SessionCoordinator};
pub use config::Config;
pub use loading::LoadingTracker;
pub use models::{ThemeAttachment, ThemeSettings, UpdatedBy, UserProfile};
pub use routing::{Page, Resolution, Route};
pub use theme::{ThemeStore, ThemeUpdate};
