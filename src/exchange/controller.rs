//! Request lifecycle controller.
//!
//! Owns at most one outstanding exchange. Every submit bumps a generation
//! counter; a completion may only touch shared state while its generation is
//! still current, so a superseded exchange can never publish a result even if
//! its response arrives later.

use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::{oneshot, watch};
use tokio_util::sync::CancellationToken;

use super::artifact::PosterArtifact;
use super::payload::PosterPayload;
use super::transport::{PosterTransport, TransportResponse};
use super::{content_type_matches, ExchangeError, ExchangeOutcome, ExchangeState};
use crate::config::{WireNames, EXPECTED_DOCUMENT_TYPE};
use crate::form::{Configuration, ValidationError, Validator};

#[derive(Default)]
struct Inflight {
    generation: u64,
    cancel: Option<CancellationToken>,
}

/// Handle to one submitted exchange.
pub struct ExchangeTicket {
    generation: u64,
    outcome: oneshot::Receiver<ExchangeOutcome>,
}

impl ExchangeTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Wait for this exchange to finish.
    ///
    /// A superseded or torn-down exchange resolves to `Cancelled`.
    pub async fn wait(self) -> ExchangeOutcome {
        self.outcome.await.unwrap_or(ExchangeOutcome::Cancelled)
    }
}

pub struct RequestController {
    transport: Arc<dyn PosterTransport>,
    wire_names: WireNames,
    expected_content_type: String,
    inflight: Arc<Mutex<Inflight>>,
    state: Arc<watch::Sender<ExchangeState>>,
}

impl RequestController {
    pub fn new(transport: Arc<dyn PosterTransport>) -> Self {
        let (state, _) = watch::channel(ExchangeState::Idle);
        Self {
            transport,
            wire_names: WireNames::default(),
            expected_content_type: EXPECTED_DOCUMENT_TYPE.to_string(),
            inflight: Arc::new(Mutex::new(Inflight::default())),
            state: Arc::new(state),
        }
    }

    pub fn with_wire_names(mut self, wire_names: WireNames) -> Self {
        self.wire_names = wire_names;
        self
    }

    pub fn with_expected_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.expected_content_type = content_type.into();
        self
    }

    pub fn state(&self) -> ExchangeState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ExchangeState> {
        self.state.subscribe()
    }

    /// Validate `config` and, if it passes, start an exchange for it.
    ///
    /// Any exchange still in flight is cancelled first. Must be called from
    /// within a tokio runtime.
    pub fn submit(&self, config: &Configuration) -> Result<ExchangeTicket, ValidationError> {
        if let Err(violation) = config.validate() {
            log::info!("Submit rejected: {}", violation);
            let inflight = self.inflight.lock();
            if inflight.cancel.is_none() {
                self.state.send_replace(ExchangeState::Idle);
            }
            return Err(violation);
        }

        let payload = PosterPayload::capture(config, &self.wire_names);
        let token = CancellationToken::new();

        let generation = {
            let mut inflight = self.inflight.lock();
            if let Some(previous) = inflight.cancel.take() {
                log::debug!("Superseding exchange {}", inflight.generation);
                previous.cancel();
            }
            inflight.generation += 1;
            inflight.cancel = Some(token.clone());
            self.state.send_replace(ExchangeState::Submitting);
            inflight.generation
        };

        log::info!(
            "Starting exchange {} for '{}'",
            generation,
            payload.shop_name()
        );

        let (tx, rx) = oneshot::channel();
        let task = ExchangeTask {
            generation,
            token,
            transport: Arc::clone(&self.transport),
            expected_content_type: self.expected_content_type.clone(),
            inflight: Arc::clone(&self.inflight),
            state: Arc::clone(&self.state),
        };
        tokio::spawn(task.run(payload, tx));

        Ok(ExchangeTicket {
            generation,
            outcome: rx,
        })
    }

    /// Cancel the outstanding exchange, if any, and rest in `Cancelled`.
    pub fn cancel(&self) {
        let mut inflight = self.inflight.lock();
        if let Some(token) = inflight.cancel.take() {
            log::debug!("Cancelling exchange {}", inflight.generation);
            token.cancel();
            inflight.generation += 1;
            self.state.send_replace(ExchangeState::Cancelled);
        }
    }

    /// Return a resting state to `Idle` once the shell has shown it.
    pub fn acknowledge(&self) {
        self.state.send_if_modified(|state| {
            if state.is_terminal() {
                *state = ExchangeState::Idle;
                true
            } else {
                false
            }
        });
    }

    pub fn is_submitting(&self) -> bool {
        self.inflight.lock().cancel.is_some()
    }
}

impl Drop for RequestController {
    fn drop(&mut self) {
        self.cancel();
    }
}

struct ExchangeTask {
    generation: u64,
    token: CancellationToken,
    transport: Arc<dyn PosterTransport>,
    expected_content_type: String,
    inflight: Arc<Mutex<Inflight>>,
    state: Arc<watch::Sender<ExchangeState>>,
}

impl ExchangeTask {
    async fn run(self, payload: PosterPayload, tx: oneshot::Sender<ExchangeOutcome>) {
        let shop_name = payload.shop_name().to_string();

        let result = tokio::select! {
            biased;
            _ = self.token.cancelled() => None,
            result = self.transport.send(payload) => Some(result),
        };

        let mut inflight = self.inflight.lock();
        let result = match result {
            Some(result) if inflight.generation == self.generation => result,
            _ => {
                drop(inflight);
                log::debug!("Discarding completion of exchange {}", self.generation);
                let _ = tx.send(ExchangeOutcome::Cancelled);
                return;
            }
        };

        inflight.cancel = None;
        let outcome = match classify(result, &self.expected_content_type) {
            Ok(bytes) => {
                let artifact = PosterArtifact::new(&shop_name, bytes);
                log::info!(
                    "Exchange {} succeeded: {} ({} bytes)",
                    self.generation,
                    artifact.file_name,
                    artifact.len()
                );
                ExchangeOutcome::Succeeded(artifact)
            }
            Err(error) => {
                match &error {
                    ExchangeError::UnexpectedContentType(content_type) => log::warn!(
                        "Exchange {} violated the document contract: received '{}'",
                        self.generation,
                        content_type
                    ),
                    other => log::warn!("Exchange {} failed: {}", self.generation, other),
                }
                ExchangeOutcome::Failed(error)
            }
        };
        self.state.send_replace(ExchangeState::from(&outcome));
        drop(inflight);

        let _ = tx.send(outcome);
    }
}

/// Turn a raw transport result into the document bytes or a classified error.
pub fn classify(
    result: Result<TransportResponse, ExchangeError>,
    expected_content_type: &str,
) -> Result<Vec<u8>, ExchangeError> {
    let response = result?;
    if !response.is_success() {
        return Err(ExchangeError::Status(response.status));
    }
    if !content_type_matches(response.content_type.as_deref(), expected_content_type) {
        return Err(ExchangeError::UnexpectedContentType(
            response.content_type.unwrap_or_default(),
        ));
    }
    Ok(response.body)
}
