use chrono::{DateTime, Utc};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

const FILE_SUFFIX: &str = "_MYQR.pdf";
const FALLBACK_NAME: &str = "poster";

/// The PDF returned by a successful exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PosterArtifact {
    pub file_name: String,
    pub received_at: DateTime<Utc>,
    bytes: Arc<[u8]>,
}

impl PosterArtifact {
    pub fn new(shop_name: &str, bytes: Vec<u8>) -> Self {
        Self {
            file_name: suggested_file_name(shop_name),
            received_at: Utc::now(),
            bytes: Arc::from(bytes),
        }
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

    /// Write the document into `dir` under its suggested file name.
    pub fn save_to(&self, dir: impl AsRef<Path>) -> std::io::Result<PathBuf> {
        let path = dir.as_ref().join(&self.file_name);
        std::fs::write(&path, &self.bytes)?;
        Ok(path)
    }
}

fn whitespace_runs() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("Whitespace pattern must compile"))
}

/// Derive the download name from the shop name.
///
/// Each run of whitespace becomes a single `_`; characters that are not legal
/// in file names are stripped.
pub fn suggested_file_name(shop_name: &str) -> String {
    let collapsed = whitespace_runs().replace_all(shop_name.trim(), "_");
    let safe = sanitize_filename::sanitize(&*collapsed);
    let stem = if safe.is_empty() { FALLBACK_NAME } else { safe.as_str() };
    format!("{}{}", stem, FILE_SUFFIX)
}
