use serde::{Deserialize, Serialize};

pub mod config;
pub mod exchange;
pub mod form;
pub mod preview;
pub mod session;

pub use crate::config::ClientConfig;
pub use crate::session::{Session, SessionError};

/// A classified failure, ready for a shell to render.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    pub error: String,
    pub title: String,
    pub message: String,
    pub timestamp: String,
}

impl ErrorResponse {
    pub fn new(error_type: &str, title: &str, message: &str) -> Self {
        Self {
            error: error_type.to_string(),
            title: title.to_string(),
            message: message.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn validation(error: &form::ValidationError) -> Self {
        match error {
            form::ValidationError::MissingShopName => {
                Self::new("MissingShopName", "Shop Name Missing", error.suggestion())
            }
            form::ValidationError::InvalidPaymentIdentifier => {
                Self::new("InvalidPaymentIdentifier", "Invalid UPI ID", error.suggestion())
            }
        }
    }

    /// Transport and content-type failures read the same to the user; only
    /// `error` tells them apart.
    pub fn exchange(error: &exchange::ExchangeError) -> Self {
        let error_type = match error.kind() {
            exchange::FailureKind::TransportUnreachable => "TransportUnreachable",
            exchange::FailureKind::UnexpectedContentType => "UnexpectedContentType",
        };
        Self::new(error_type, "Server Timeout", error.user_message())
    }
}

/// Initialise `env_logger`, defaulting to `info` when `RUST_LOG` is unset.
pub fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
}
