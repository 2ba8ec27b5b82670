//! Exchange module - one request/response cycle against the poster service.
//!
//! - `payload` - the multipart snapshot taken at submit time
//! - `transport` - the network seam and its reqwest implementation
//! - `controller` - the at-most-one-in-flight lifecycle
//! - `artifact` - the returned PDF and its suggested file name

pub mod artifact;
pub mod controller;
pub mod payload;
pub mod transport;

pub use artifact::PosterArtifact;
pub use controller::{ExchangeTicket, RequestController};
pub use payload::{PosterPayload, LOGO_PART};
pub use transport::{HttpTransport, PosterTransport, TransportResponse};

/// User-facing failure classes.
///
/// Both classes share one message; the distinction exists for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    TransportUnreachable,
    UnexpectedContentType,
}

impl FailureKind {
    pub fn user_message(&self) -> &'static str {
        "The server is still warming up. Please try again in 10 seconds."
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExchangeError {
    #[error("could not reach the poster service: {0}")]
    Unreachable(String),
    #[error("poster service responded with status {0}")]
    Status(u16),
    #[error("expected a PDF but the poster service returned '{0}'")]
    UnexpectedContentType(String),
}

impl ExchangeError {
    pub fn kind(&self) -> FailureKind {
        match self {
            ExchangeError::Unreachable(_) | ExchangeError::Status(_) => {
                FailureKind::TransportUnreachable
            }
            ExchangeError::UnexpectedContentType(_) => FailureKind::UnexpectedContentType,
        }
    }

    pub fn user_message(&self) -> &'static str {
        self.kind().user_message()
    }
}

/// Observable lifecycle of the request controller.
///
/// `Succeeded`, `Failed` and `Cancelled` are resting states: they accept a new
/// submit exactly like `Idle`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExchangeState {
    Idle,
    Submitting,
    Succeeded(PosterArtifact),
    Failed(ExchangeError),
    Cancelled,
}

impl ExchangeState {
    pub fn is_submitting(&self) -> bool {
        matches!(self, ExchangeState::Submitting)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ExchangeState::Succeeded(_) | ExchangeState::Failed(_) | ExchangeState::Cancelled
        )
    }
}

/// How a single exchange ended, as seen by whoever submitted it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExchangeOutcome {
    Succeeded(PosterArtifact),
    Failed(ExchangeError),
    Cancelled,
}

impl ExchangeOutcome {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ExchangeOutcome::Cancelled)
    }
}

impl From<&ExchangeOutcome> for ExchangeState {
    fn from(outcome: &ExchangeOutcome) -> Self {
        match outcome {
            ExchangeOutcome::Succeeded(artifact) => ExchangeState::Succeeded(artifact.clone()),
            ExchangeOutcome::Failed(error) => ExchangeState::Failed(error.clone()),
            ExchangeOutcome::Cancelled => ExchangeState::Cancelled,
        }
    }
}

/// Check whether a declared content type names the expected document type.
///
/// Parameters such as `charset` are ignored and the comparison is
/// case-insensitive.
pub fn content_type_matches(declared: Option<&str>, expected: &str) -> bool {
    let Some(declared) = declared else {
        return false;
    };
    match (
        declared.trim().parse::<mime_guess::Mime>(),
        expected.parse::<mime_guess::Mime>(),
    ) {
        (Ok(declared), Ok(expected)) => declared.essence_str() == expected.essence_str(),
        _ => false,
    }
}
