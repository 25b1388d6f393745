//! Data models shared between the session and theme services.
//!
//! - `UserProfile`: the opaque user record returned by login/refresh
//! - `ThemeSettings`, `UpdatedBy`: the suite-wide branding settings
//! - `ThemeAttachment`: a logo or favicon image to upload

pub mod theme;
pub mod user;

pub use theme::{ThemeAttachment, ThemeSettings, UpdatedBy};
pub use user::UserProfile;
