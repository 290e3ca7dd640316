use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use mx_lang::{Matrix, Request};
use tracing::debug;
use url::Url;

use crate::{config::Config, error::TransportError};

/// Carries a request to a named remote operation and brings back its result.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn call(&self, operation: &str, request: &Request) -> Result<Matrix, TransportError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn call(&self, operation: &str, request: &Request) -> Result<Matrix, TransportError> {
        (**self).call(operation, request).await
    }
}

/// Posts the request as JSON to `<endpoint>/<operation>`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: Url,
}

impl HttpTransport {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, TransportError> {
        let invalid = |reason: String| TransportError::InvalidEndpoint {
            endpoint: endpoint.to_string(),
            reason,
        };
        let endpoint_url = Url::parse(endpoint).map_err(|e| invalid(e.to_string()))?;

        if !matches!(endpoint_url.scheme(), "http" | "https") {
            return Err(invalid(format!("unsupported scheme `{}`", endpoint_url.scheme())));
        }

        let client = reqwest::Client::builder()
            .user_agent(format!("mx-client/{}", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .connect_timeout(timeout.min(Duration::from_secs(10)))
            .build()
            .map_err(TransportError::Build)?;

        Ok(Self {
            client,
            endpoint: endpoint_url,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, TransportError> {
        Self::new(&config.endpoint, config.timeout)
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn operation_url(&self, operation: &str) -> Result<Url, TransportError> {
        let mut url = self.endpoint.clone();
        url.path_segments_mut()
            .map_err(|_| TransportError::InvalidEndpoint {
                endpoint: self.endpoint.to_string(),
                reason: "cannot be a base URL".to_string(),
            })?
            .pop_if_empty()
            .push(operation);

        Ok(url)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn call(&self, operation: &str, request: &Request) -> Result<Matrix, TransportError> {
        let url = self.operation_url(operation)?;
        debug!(%url, operation, "Posting request");

        let response = self
            .client
            .post(url.clone())
            .json(request)
            .send()
            .await
            .map_err(|source| TransportError::Request {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TransportError::Status {
                operation: operation.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|source| TransportError::Request { url, source })?;

        serde_json::from_slice(&body).map_err(|source| TransportError::MalformedReply {
            operation: operation.to_string(),
            source,
        })
    }
}
