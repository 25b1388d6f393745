//! Theme settings and upload attachments.

use std::path::Path;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[cfg(feature = "ts")]
use ts_rs::TS;

use super::UserProfile;

pub const DEFAULT_PRIMARY_COLOR: &str = "#20a2fe";
pub const DEFAULT_SECONDARY_COLOR: &str = "#3cdb76";
pub const DEFAULT_TERTIARY_COLOR: &str = "#ff704d";
pub const DEFAULT_TITLE_FONT: &str = "DM Sans";
pub const DEFAULT_BODY_FONT: &str = "Roboto";

/// Who last changed the theme.
///
/// The server answers with the full user record while clients send only the
/// user id, so both shapes are accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(TS), ts(export))]
#[serde(untagged)]
pub enum UpdatedBy {
    Id(String),
    User(UserProfile),
}

impl UpdatedBy {
    pub fn id(&self) -> Option<&str> {
        match self {
            UpdatedBy::Id(id) => Some(id),
            UpdatedBy::User(user) => user.id.as_deref(),
        }
    }
}

/// Suite-wide branding. Missing fields in a server response fall back to
/// the default theme's values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(TS), ts(export))]
#[serde(rename_all = "camelCase", default)]
pub struct ThemeSettings {
    pub primary_color: String,
    pub secondary_color: String,
    pub tertiary_color: String,
    pub title_font: String,
    pub body_font: String,
    pub favicon: Option<String>,
    pub logo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[cfg_attr(feature = "ts", ts(type = "string | null"))]
    pub last_updated: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated_by: Option<UpdatedBy>,
}

impl Default for ThemeSettings {
    fn default() -> Self {
        Self {
            primary_color: DEFAULT_PRIMARY_COLOR.to_string(),
            secondary_color: DEFAULT_SECONDARY_COLOR.to_string(),
            tertiary_color: DEFAULT_TERTIARY_COLOR.to_string(),
            title_font: DEFAULT_TITLE_FONT.to_string(),
            body_font: DEFAULT_BODY_FONT.to_string(),
            favicon: None,
            logo: None,
            last_updated: None,
            last_updated_by: None,
        }
    }
}

impl ThemeSettings {
    /// Copy with the audit fields cleared, for comparing visual content only.
    pub fn without_audit(&self) -> Self {
        Self {
            last_updated: None,
            last_updated_by: None,
            ..self.clone()
        }
    }

    /// True when the visual content equals the built-in default theme.
    pub fn is_default(&self) -> bool {
        self.without_audit() == Self::default()
    }
}

/// An image uploaded alongside a theme save (`logo` or `favicon` part).
#[derive(Debug, Clone, PartialEq)]
pub struct ThemeAttachment {
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl ThemeAttachment {
    /// Build an attachment, rejecting anything the server would refuse:
    /// empty payloads, names without an extension and non-image types.
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Result<Self> {
        let file_name = file_name.into();
        if bytes.is_empty() {
            bail!("{} is empty", file_name);
        }
        let mime = Self::image_mime(&file_name)
            .with_context(|| format!("{} is not a supported image file", file_name))?;
        Ok(Self {
            file_name,
            mime: mime.to_string(),
            bytes,
        })
    }

    /// Read an image from disk.
    pub fn from_path(path: &Path) -> Result<Self> {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .with_context(|| format!("Invalid file name: {}", path.display()))?
            .to_string();
        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::new(file_name, bytes)
    }

    fn image_mime(file_name: &str) -> Option<&'static str> {
        let (_, ext) = file_name.rsplit_once('.')?;
        match ext.to_ascii_lowercase().as_str() {
            "png" => Some("image/png"),
            "jpg" | "jpeg" => Some("image/jpeg"),
            "gif" => Some("image/gif"),
            "webp" => Some("image/webp"),
            "svg" => Some("image/svg+xml"),
            "ico" => Some("image/x-icon"),
            _ => None,
        }
    }
}
