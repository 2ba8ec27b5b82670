//! Preview handles for the logo.
//!
//! A handle is a locally addressable copy of the current logo bytes that a
//! renderer can load directly. `PreviewManager` is the only owner: whenever
//! the logo changes it revokes the superseded handle and creates a new one, so
//! at most one handle is live at a time.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::TempDir;
use uuid::Uuid;

use crate::form::LogoFile;

#[derive(Debug, thiserror::Error)]
pub enum PreviewError {
    #[error("failed to create preview directory: {0}")]
    TempDir(#[source] std::io::Error),
    #[error("failed to write preview file: {0}")]
    Write(#[source] std::io::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewHandle {
    pub id: Uuid,
    pub locator: PathBuf,
    pub mime_type: String,
}

impl PreviewHandle {
    pub fn path(&self) -> &Path {
        &self.locator
    }
}

/// Backing storage for preview handles.
pub trait PreviewStore: Send + Sync {
    fn create(&self, logo: &LogoFile) -> Result<PreviewHandle, PreviewError>;
    fn revoke(&self, handle: &PreviewHandle);
}

/// Writes each logo into a private temporary directory.
///
/// The directory and anything left in it are removed when the store drops.
pub struct TempDirPreviewStore {
    dir: TempDir,
}

impl TempDirPreviewStore {
    pub fn new() -> Result<Self, PreviewError> {
        let dir = tempfile::Builder::new()
            .prefix("myqr-preview-")
            .tempdir()
            .map_err(PreviewError::TempDir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        self.dir.path()
    }
}

impl PreviewStore for TempDirPreviewStore {
    fn create(&self, logo: &LogoFile) -> Result<PreviewHandle, PreviewError> {
        let id = Uuid::new_v4();
        let locator = self
            .dir
            .path()
            .join(format!("logo-{}.{}", id, logo.extension()));
        fs::write(&locator, logo.bytes()).map_err(PreviewError::Write)?;
        Ok(PreviewHandle {
            id,
            locator,
            mime_type: logo.mime_type.clone(),
        })
    }

    fn revoke(&self, handle: &PreviewHandle) {
        if let Err(e) = fs::remove_file(&handle.locator) {
            log::warn!(
                "Failed to remove preview file {}: {}",
                handle.locator.display(),
                e
            );
        }
    }
}

pub struct PreviewManager {
    store: Arc<dyn PreviewStore>,
    current: Option<PreviewHandle>,
}

impl PreviewManager {
    pub fn new(store: Arc<dyn PreviewStore>) -> Self {
        Self {
            store,
            current: None,
        }
    }

    pub fn current(&self) -> Option<&PreviewHandle> {
        self.current.as_ref()
    }

    /// Follow a change of the logo field.
    ///
    /// The previous handle is revoked before the new one is created, so the
    /// store never holds two handles for this manager. If creation fails no
    /// preview is exposed.
    pub fn sync(&mut self, logo: Option<&LogoFile>) {
        self.teardown();

        let Some(logo) = logo else {
            return;
        };
        match self.store.create(logo) {
            Ok(handle) => {
                log::debug!("Created preview handle {}", handle.id);
                self.current = Some(handle);
            }
            Err(e) => {
                log::error!("Failed to create logo preview for {}: {}", logo.file_name, e);
            }
        }
    }

    /// Revoke the live handle, if any. Safe to call more than once.
    pub fn teardown(&mut self) {
        if let Some(handle) = self.current.take() {
            self.release(handle);
        }
    }

    fn release(&self, handle: PreviewHandle) {
        log::debug!("Revoking preview handle {}", handle.id);
        self.store.revoke(&handle);
    }
}

impl Drop for PreviewManager {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temp_dir_store_writes_and_removes() {
        let store = TempDirPreviewStore::new().unwrap();
        let logo = LogoFile::new("brand.png", "image/png", vec![0x89, 0x50, 0x4E, 0x47]);

        let handle = store.create(&logo).unwrap();
        assert!(handle.path().starts_with(store.dir()));
        assert_eq!(fs::read(handle.path()).unwrap(), logo.bytes());
        assert_eq!(handle.mime_type, "image/png");

        store.revoke(&handle);
        assert!(!handle.path().exists());
    }

    #[test]
    fn test_manager_replaces_file_on_disk() {
        let store = Arc::new(TempDirPreviewStore::new().unwrap());
        let mut manager = PreviewManager::new(store.clone());

        manager.sync(Some(&LogoFile::new("a.png", "image/png", vec![1])));
        let first = manager.current().cloned().unwrap();

        manager.sync(Some(&LogoFile::new("b.jpg", "image/jpeg", vec![2])));
        let second = manager.current().cloned().unwrap();

        assert_ne!(first.id, second.id);
        assert!(!first.path().exists());
        assert!(second.path().exists());

        manager.sync(None);
        assert!(manager.current().is_none());
        assert!(!second.path().exists());
    }
}
