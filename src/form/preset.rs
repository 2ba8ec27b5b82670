//! Preset catalog support.
//!
//! A preset is a named partial configuration. Applying one overwrites exactly
//! the fields it names. Presets never carry a logo.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use super::color::HexColor;
use super::model::FieldUpdate;

#[derive(Debug, thiserror::Error)]
pub enum PresetError {
    #[error("failed to read preset catalog: {0}")]
    Io(#[source] std::io::Error),
    #[error("invalid preset catalog: {0}")]
    Parse(#[source] serde_json::Error),
    #[error("preset '{0}' not found")]
    NotFound(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresetFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shop_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upi_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tagline: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_color: Option<HexColor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_color: Option<HexColor>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extras: BTreeMap<String, String>,
}

impl PresetFields {
    /// The field replacements this preset performs, in a fixed order.
    pub fn updates(&self) -> Vec<FieldUpdate> {
        let mut updates = Vec::new();
        if let Some(name) = &self.shop_name {
            updates.push(FieldUpdate::ShopName(name.clone()));
        }
        if let Some(upi) = &self.upi_id {
            updates.push(FieldUpdate::UpiId(upi.clone()));
        }
        if let Some(tagline) = &self.tagline {
            updates.push(FieldUpdate::Tagline(tagline.clone()));
        }
        if let Some(color) = &self.primary_color {
            updates.push(FieldUpdate::PrimaryColor(color.clone()));
        }
        if let Some(color) = &self.text_color {
            updates.push(FieldUpdate::TextColor(color.clone()));
        }
        for (name, value) in &self.extras {
            updates.push(FieldUpdate::extra(name.clone(), value.clone()));
        }
        updates
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preset {
    pub name: String,
    #[serde(flatten)]
    pub fields: PresetFields,
}

impl Preset {
    pub fn new(name: impl Into<String>, fields: PresetFields) -> Self {
        Self {
            name: name.into(),
            fields,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PresetCatalog {
    presets: Vec<Preset>,
}

impl PresetCatalog {
    pub fn new(presets: Vec<Preset>) -> Self {
        Self { presets }
    }

    pub fn from_json(json: &str) -> Result<Self, PresetError> {
        serde_json::from_str(json).map_err(PresetError::Parse)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, PresetError> {
        let json = std::fs::read_to_string(path).map_err(PresetError::Io)?;
        Self::from_json(&json)
    }

    pub fn get(&self, name: &str) -> Result<&Preset, PresetError> {
        self.presets
            .iter()
            .find(|preset| preset.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| PresetError::NotFound(name.to_string()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.presets.iter().map(|preset| preset.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.presets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }
}
