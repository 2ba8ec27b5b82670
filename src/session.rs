//! Session - the command surface a presentation shell talks to.
//!
//! Commands: `set_field`, `apply_preset`, `submit`, `reset`, `cancel_session`.
//! Observables: the configuration, the logo preview handle, the poster
//! projection and the exchange lifecycle state.

use std::sync::Arc;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

use crate::config::ClientConfig;
use crate::exchange::{
    ExchangeState, ExchangeTicket, HttpTransport, PosterTransport, RequestController,
};
use crate::form::{Configuration, FieldUpdate, FormStore, LogoChange, Preset, ValidationError};
use crate::preview::{
    PosterPreview, PreviewError, PreviewHandle, PreviewManager, PreviewStore, TempDirPreviewStore,
};

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
    #[error(transparent)]
    Preview(#[from] PreviewError),
}

pub struct Session {
    form: FormStore,
    previews: PreviewManager,
    controller: RequestController,
}

impl Session {
    /// Build a session that talks to the configured endpoint over HTTP and
    /// keeps logo previews in a private temporary directory.
    pub fn from_config(config: &ClientConfig) -> Result<Self, SessionError> {
        let transport = Arc::new(HttpTransport::new(config)?);
        let store = Arc::new(TempDirPreviewStore::new()?);
        let controller = RequestController::new(transport)
            .with_wire_names(config.wire_names.clone())
            .with_expected_content_type(config.expected_content_type.clone());
        Ok(Self::with_parts(Configuration::default(), store, controller))
    }

    pub fn new(transport: Arc<dyn PosterTransport>, store: Arc<dyn PreviewStore>) -> Self {
        Self::with_parts(
            Configuration::default(),
            store,
            RequestController::new(transport),
        )
    }

    pub fn with_parts(
        initial: Configuration,
        store: Arc<dyn PreviewStore>,
        controller: RequestController,
    ) -> Self {
        let mut previews = PreviewManager::new(store);
        previews.sync(initial.logo.as_ref());
        Self {
            form: FormStore::new(initial),
            previews,
            controller,
        }
    }

    pub fn config(&self) -> Configuration {
        self.form.snapshot()
    }

    pub fn subscribe_config(&self) -> watch::Receiver<Configuration> {
        self.form.subscribe()
    }

    pub fn preview(&self) -> Option<&PreviewHandle> {
        self.previews.current()
    }

    pub fn poster(&self) -> PosterPreview {
        self.form
            .with(|config| PosterPreview::project(config, self.previews.current()))
    }

    pub fn state(&self) -> ExchangeState {
        self.controller.state()
    }

    pub fn subscribe_state(&self) -> watch::Receiver<ExchangeState> {
        self.controller.subscribe()
    }

    /// Lifecycle states as a stream, starting with the current one.
    pub fn state_updates(&self) -> WatchStream<ExchangeState> {
        WatchStream::new(self.controller.subscribe())
    }

    pub fn set_field(&mut self, update: FieldUpdate) {
        let change = self.form.set(update);
        self.follow_logo(change);
    }

    pub fn apply_preset(&mut self, preset: &Preset) {
        log::debug!("Applying preset '{}'", preset.name);
        let change = self.form.merge(preset.fields.updates());
        self.follow_logo(change);
    }

    pub fn reset(&mut self) {
        let change = self.form.reset();
        self.follow_logo(change);
    }

    pub fn submit(&self) -> Result<ExchangeTicket, ValidationError> {
        let snapshot = self.form.snapshot();
        self.controller.submit(&snapshot)
    }

    pub fn acknowledge(&self) {
        self.controller.acknowledge();
    }

    /// End the session: cancel any exchange and release the preview handle.
    ///
    /// Every call does both, so work started after an earlier close is
    /// released too. Both steps are no-ops when there is nothing live.
    pub fn cancel_session(&mut self) {
        self.controller.cancel();
        self.previews.teardown();
        log::debug!("Session cancelled");
    }

    fn follow_logo(&mut self, change: LogoChange) {
        if let LogoChange::Replaced(logo) = change {
            self.previews.sync(logo.as_ref());
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.cancel_session();
    }
}
