use reqwest::multipart::{Form, Part};

use crate::config::WireNames;
use crate::form::{Configuration, LogoFile};

/// Multipart part name under which the logo is attached.
pub const LOGO_PART: &str = "logo";

/// Part names owned by the core fields. Auxiliary fields may not use them.
const RESERVED_PARTS: [&str; 6] = [
    "shop_name",
    "upi_id",
    "tagline",
    "primary_color",
    "text_color",
    LOGO_PART,
];

/// Snapshot of the configuration taken when an exchange starts.
///
/// Later edits to the form never reach an exchange that is already running.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PosterPayload {
    fields: Vec<(String, String)>,
    logo: Option<LogoFile>,
    shop_name: String,
}

impl PosterPayload {
    pub fn capture(config: &Configuration, wire_names: &WireNames) -> Self {
        let shop_name = config.shop_name.trim().to_string();
        let mut fields = vec![
            ("shop_name".to_string(), shop_name.clone()),
            ("upi_id".to_string(), config.upi_id.trim().to_string()),
            ("tagline".to_string(), config.tagline.trim().to_string()),
            ("primary_color".to_string(), config.primary_color.to_string()),
            ("text_color".to_string(), config.text_color.to_string()),
        ];
        for (name, value) in &config.extras {
            let wire_name = wire_names.wire_name(name);
            if RESERVED_PARTS.contains(&wire_name) {
                log::warn!(
                    "Skipping auxiliary field '{}': '{}' is a reserved part name",
                    name,
                    wire_name
                );
                continue;
            }
            fields.push((wire_name.to_string(), value.trim().to_string()));
        }

        Self {
            fields,
            logo: config.logo.clone(),
            shop_name,
        }
    }

    /// Text parts in transmission order, keyed by wire name.
    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }

    pub fn field(&self, wire_name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(name, _)| name == wire_name)
            .map(|(_, value)| value.as_str())
    }

    pub fn logo(&self) -> Option<&LogoFile> {
        self.logo.as_ref()
    }

    /// Trimmed shop name, used to name the returned document.
    pub fn shop_name(&self) -> &str {
        &self.shop_name
    }

    pub fn into_form(self) -> Form {
        let mut form = Form::new();
        for (name, value) in self.fields {
            form = form.text(name, value);
        }

        if let Some(logo) = self.logo {
            let part = Part::bytes(logo.bytes().to_vec()).file_name(logo.file_name.clone());
            let part = match part.mime_str(&logo.mime_type) {
                Ok(part) => part,
                Err(e) => {
                    log::warn!(
                        "Logo has unusable MIME type '{}', sending without one: {}",
                        logo.mime_type,
                        e
                    );
                    Part::bytes(logo.bytes().to_vec()).file_name(logo.file_name.clone())
                }
            };
            form = form.part(LOGO_PART, part);
        }

        form
    }
}
