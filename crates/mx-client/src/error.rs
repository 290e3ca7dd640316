use thiserror::Error;
use url::Url;

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Invalid endpoint `{endpoint}`: {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },
    #[error("Failed to build HTTP client: {0}")]
    Build(#[source] reqwest::Error),
    #[error("Request to `{url}` failed: {source}")]
    Request {
        url: Url,
        #[source]
        source: reqwest::Error,
    },
    #[error("Operation `{operation}` failed with status {status}: {body}")]
    Status {
        operation: String,
        status: u16,
        body: String,
    },
    #[error("Operation `{operation}` returned a malformed matrix: {source}")]
    MalformedReply {
        operation: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Error, Debug)]
pub enum ClientError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    InvalidRequest(#[from] mx_lang::Error),
}
