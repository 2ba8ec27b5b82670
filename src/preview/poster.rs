use serde::Serialize;
use std::path::PathBuf;

use super::handle::PreviewHandle;
use crate::form::Configuration;

const SHOP_NAME_PLACEHOLDER: &str = "YOUR SHOP";
const TAGLINE_PLACEHOLDER: &str = "Tagline here";

/// What the live poster preview shows for the current form state.
///
/// Pure projection: no IO, no network, recomputed on every change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PosterPreview {
    pub headline: String,
    pub tagline: String,
    pub upi_id: String,
    pub primary_color: String,
    pub text_color: String,
    pub extras: Vec<(String, String)>,
    pub logo: Option<PathBuf>,
}

impl PosterPreview {
    pub fn project(config: &Configuration, logo: Option<&PreviewHandle>) -> Self {
        Self {
            headline: or_placeholder(&config.shop_name, SHOP_NAME_PLACEHOLDER),
            tagline: or_placeholder(&config.tagline, TAGLINE_PLACEHOLDER),
            upi_id: config.upi_id.clone(),
            primary_color: config.primary_color.to_string(),
            text_color: config.text_color.to_string(),
            extras: config
                .extras
                .iter()
                .filter(|(_, value)| !value.trim().is_empty())
                .map(|(name, value)| (name.clone(), value.clone()))
                .collect(),
            logo: logo.map(|handle| handle.locator.clone()),
        }
    }
}

fn or_placeholder(value: &str, placeholder: &str) -> String {
    if value.is_empty() {
        placeholder.to_string()
    } else {
        value.to_string()
    }
}
