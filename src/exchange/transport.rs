use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Url;

use super::payload::PosterPayload;
use super::ExchangeError;
use crate::config::ClientConfig;

/// Raw response from the poster service, before classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl TransportResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[async_trait]
pub trait PosterTransport: Send + Sync {
    /// Send one payload. Dropping the returned future abandons the request.
    async fn send(&self, payload: PosterPayload) -> Result<TransportResponse, ExchangeError>;
}

pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: Url,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> reqwest::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self::with_client(client, config.endpoint.clone()))
    }

    pub fn with_client(client: reqwest::Client, endpoint: Url) -> Self {
        Self { client, endpoint }
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl PosterTransport for HttpTransport {
    async fn send(&self, payload: PosterPayload) -> Result<TransportResponse, ExchangeError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .multipart(payload.into_form())
            .send()
            .await
            .map_err(|e| ExchangeError::Unreachable(e.to_string()))?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let body = response
            .bytes()
            .await
            .map_err(|e| ExchangeError::Unreachable(e.to_string()))?;

        Ok(TransportResponse {
            status,
            content_type,
            body: body.to_vec(),
        })
    }
}
