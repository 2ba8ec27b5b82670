use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use super::color::HexColor;

pub const SHOP_NAME_MAX_CHARS: usize = 25;

/// Binary logo content picked by the user.
///
/// Cloning is cheap: the bytes are shared, so payload snapshots and the
/// preview store never copy the image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogoFile {
    pub file_name: String,
    pub mime_type: String,
    bytes: Arc<[u8]>,
}

impl LogoFile {
    pub fn new(file_name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            bytes: Arc::from(bytes),
        }
    }

    /// Read a logo from disk, guessing its MIME type from the extension.
    pub fn from_path(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("logo")
            .to_string();
        let mime_type = mime_guess::from_path(path)
            .first_or_octet_stream()
            .essence_str()
            .to_string();
        Ok(Self::new(file_name, mime_type, bytes))
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Extension to use when materialising the logo as a file.
    pub fn extension(&self) -> &str {
        Path::new(&self.file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .or_else(|| {
                mime_guess::get_mime_extensions_str(&self.mime_type)
                    .and_then(|exts| exts.first().copied())
            })
            .unwrap_or("bin")
    }
}

/// The full set of user-editable branding fields for one session.
///
/// Every field always holds a value: optional text is the empty string and a
/// missing logo is `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Configuration {
    pub shop_name: String,
    pub upi_id: String,
    pub tagline: String,
    pub primary_color: HexColor,
    pub text_color: HexColor,
    /// Auxiliary display fields such as social handles, keyed by field name.
    pub extras: BTreeMap<String, String>,
    pub logo: Option<LogoFile>,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            shop_name: "My Shop".to_string(),
            upi_id: "payment@bank".to_string(),
            tagline: "Quality you can trust".to_string(),
            primary_color: HexColor::from_static("#646cff"),
            text_color: HexColor::from_static("#000000"),
            extras: BTreeMap::new(),
            logo: None,
        }
    }
}

/// A single-field replacement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldUpdate {
    ShopName(String),
    UpiId(String),
    Tagline(String),
    PrimaryColor(HexColor),
    TextColor(HexColor),
    Extra { name: String, value: String },
    Logo(Option<LogoFile>),
}

impl FieldUpdate {
    pub fn extra(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Extra {
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn touches_logo(&self) -> bool {
        matches!(self, FieldUpdate::Logo(_))
    }
}

impl Configuration {
    pub fn apply(&mut self, update: FieldUpdate) {
        match update {
            FieldUpdate::ShopName(name) => self.shop_name = clamp_shop_name(name),
            FieldUpdate::UpiId(upi) => self.upi_id = upi,
            FieldUpdate::Tagline(tagline) => self.tagline = tagline,
            FieldUpdate::PrimaryColor(color) => self.primary_color = color,
            FieldUpdate::TextColor(color) => self.text_color = color,
            FieldUpdate::Extra { name, value } => {
                self.extras.insert(name, value);
            }
            FieldUpdate::Logo(logo) => self.logo = logo,
        }
    }

    pub fn extra(&self, name: &str) -> &str {
        self.extras.get(name).map(String::as_str).unwrap_or("")
    }
}

fn clamp_shop_name(name: String) -> String {
    match name.char_indices().nth(SHOP_NAME_MAX_CHARS) {
        Some((cut, _)) => name[..cut].to_string(),
        None => name,
    }
}
