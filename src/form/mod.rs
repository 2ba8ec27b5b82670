//! Form module - the field store and everything it holds.
//!
//! - `model` - the `Configuration` record and single-field updates
//! - `color` - `#RRGGBB` color values
//! - `preset` - named partial configurations and their catalog
//! - `validation` - local checks run before submitting

pub mod color;
pub mod model;
pub mod preset;
pub mod validation;

pub use color::{ColorParseError, HexColor};
pub use model::{Configuration, FieldUpdate, LogoFile, SHOP_NAME_MAX_CHARS};
pub use preset::{Preset, PresetCatalog, PresetError, PresetFields};
pub use validation::{ValidationError, Validator};

use tokio::sync::watch;

/// What a store mutation did to the logo field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogoChange {
    Unchanged,
    Replaced(Option<LogoFile>),
}

/// Holds the live configuration.
///
/// `set`, `merge` and `reset` are the only mutation entry points. Each one is
/// published to subscribers as exactly one update, so a merge is never seen
/// half-applied.
pub struct FormStore {
    initial: Configuration,
    sender: watch::Sender<Configuration>,
}

impl FormStore {
    pub fn new(initial: Configuration) -> Self {
        let (sender, _) = watch::channel(initial.clone());
        Self { initial, sender }
    }

    pub fn snapshot(&self) -> Configuration {
        self.sender.borrow().clone()
    }

    /// Read the current configuration without cloning it.
    pub fn with<R>(&self, f: impl FnOnce(&Configuration) -> R) -> R {
        f(&*self.sender.borrow())
    }

    pub fn subscribe(&self) -> watch::Receiver<Configuration> {
        self.sender.subscribe()
    }

    pub fn set(&self, update: FieldUpdate) -> LogoChange {
        self.merge(std::iter::once(update))
    }

    pub fn merge(&self, updates: impl IntoIterator<Item = FieldUpdate>) -> LogoChange {
        let mut change = LogoChange::Unchanged;
        self.sender.send_modify(|config| {
            for update in updates {
                let touches_logo = update.touches_logo();
                config.apply(update);
                if touches_logo {
                    change = LogoChange::Replaced(config.logo.clone());
                }
            }
        });
        change
    }

    /// Restore the configuration the session started with.
    pub fn reset(&self) -> LogoChange {
        let initial = self.initial.clone();
        let mut change = LogoChange::Unchanged;
        self.sender.send_modify(|config| {
            if config.logo.is_some() || initial.logo.is_some() {
                change = LogoChange::Replaced(initial.logo.clone());
            }
            *config = initial;
        });
        change
    }
}

impl Default for FormStore {
    fn default() -> Self {
        Self::new(Configuration::default())
    }
}
