//! Multipart encoding for theme saves and resets.
//!
//! Save and reset go through the same field encoder so both send the same
//! field names and the same RFC 3339 timestamp format.

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::multipart::{Form, Part};

use crate::models::{ThemeAttachment, ThemeSettings};

/// A theme change requested by the user: new settings plus optional images.
#[derive(Debug, Clone, Default)]
pub struct ThemeUpdate {
    pub settings: ThemeSettings,
    pub logo: Option<ThemeAttachment>,
    pub favicon: Option<ThemeAttachment>,
}

impl ThemeUpdate {
    pub fn new(settings: ThemeSettings) -> Self {
        Self {
            settings,
            logo: None,
            favicon: None,
        }
    }

    pub fn with_logo(mut self, logo: ThemeAttachment) -> Self {
        self.logo = Some(logo);
        self
    }

    pub fn with_favicon(mut self, favicon: ThemeAttachment) -> Self {
        self.favicon = Some(favicon);
        self
    }

    pub fn has_attachments(&self) -> bool {
        self.logo.is_some() || self.favicon.is_some()
    }
}

/// The body of a `PATCH /theme` request before it becomes a multipart form.
#[derive(Debug, Clone)]
pub struct ThemeForm {
    pub fields: Vec<(&'static str, String)>,
    pub logo: Option<ThemeAttachment>,
    pub favicon: Option<ThemeAttachment>,
}

impl ThemeForm {
    /// Encode a save. Image URLs in the settings are never sent back;
    /// only freshly attached files replace the stored images.
    pub fn save(update: ThemeUpdate, updated_by: Option<&str>, now: DateTime<Utc>) -> Self {
        Self {
            fields: Self::encode_fields(&update.settings, updated_by, now),
            logo: update.logo,
            favicon: update.favicon,
        }
    }

    /// Encode a reset: the default theme, no images, and the reset flag.
    pub fn reset(updated_by: Option<&str>, now: DateTime<Utc>) -> Self {
        let mut fields = Self::encode_fields(&ThemeSettings::default(), updated_by, now);
        fields.push(("reset", "true".to_string()));
        Self {
            fields,
            logo: None,
            favicon: None,
        }
    }

    fn encode_fields(
        settings: &ThemeSettings,
        updated_by: Option<&str>,
        now: DateTime<Utc>,
    ) -> Vec<(&'static str, String)> {
        let mut fields = vec![
            ("primaryColor", settings.primary_color.clone()),
            ("secondaryColor", settings.secondary_color.clone()),
            ("tertiaryColor", settings.tertiary_color.clone()),
            ("titleFont", settings.title_font.clone()),
            ("bodyFont", settings.body_font.clone()),
            (
                "lastUpdated",
                now.to_rfc3339_opts(SecondsFormat::Millis, true),
            ),
        ];
        if let Some(id) = updated_by {
            fields.push(("lastUpdatedBy", id.to_string()));
        }
        fields
    }

    /// Value of a scalar field, if present.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn is_reset(&self) -> bool {
        self.field("reset") == Some("true")
    }

    pub fn into_multipart(self) -> Result<Form> {
        let mut form = Form::new();
        for (name, value) in self.fields {
            form = form.text(name, value);
        }
        if let Some(logo) = self.logo {
            form = form.part("logo", Self::file_part(logo)?);
        }
        if let Some(favicon) = self.favicon {
            form = form.part("favicon", Self::file_part(favicon)?);
        }
        Ok(form)
    }

    fn file_part(attachment: ThemeAttachment) -> Result<Part> {
        Part::bytes(attachment.bytes)
            .file_name(attachment.file_name.clone())
            .mime_str(&attachment.mime)
            .with_context(|| format!("Invalid content type for {}", attachment.file_name))
    }
}
