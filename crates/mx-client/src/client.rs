use mx_lang::{InnerError, Matrix, Request};
use tracing::{debug, warn};

use crate::{
    config::Config,
    error::{ClientError, TransportError},
    transport::{HttpTransport, Transport},
};

pub const DEFAULT_OPERATION: &str = "solveProblem";

/// Sends requests to one remote operation over a [`Transport`].
///
/// A request is checked locally before it is sent: an expression that does
/// not parse, or that names an operand the request does not carry, fails with
/// [`ClientError::InvalidRequest`] and never reaches the transport. Transport
/// failures are returned as they are, without retrying.
#[derive(Debug, Clone)]
pub struct Client<T> {
    transport: T,
    operation: String,
}

impl<T: Transport> Client<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            operation: DEFAULT_OPERATION.to_string(),
        }
    }

    pub fn with_operation(mut self, operation: impl Into<String>) -> Self {
        self.operation = operation.into();
        self
    }

    pub fn operation(&self) -> &str {
        &self.operation
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub async fn solve(&self, request: &Request) -> Result<Matrix, ClientError> {
        let missing = request.missing_operands()?;
        if !missing.is_empty() {
            warn!(expr = request.expr(), missing = ?missing, "Refusing to send request with unbound operands");
            return Err(mx_lang::Error::from_error(request.expr(), InnerError::MissingOperands(missing)).into());
        }

        debug!(
            operation = %self.operation,
            expr = request.expr(),
            operands = request.operands().len(),
            "Sending request"
        );

        let result = self
            .transport
            .call(&self.operation, request)
            .await
            .inspect_err(|e| warn!(operation = %self.operation, error = %e, "Remote call failed"))?;

        debug!(operation = %self.operation, shape = %result.shape(), "Received result");

        Ok(result)
    }
}

impl Client<HttpTransport> {
    pub fn from_config(config: &Config) -> Result<Self, TransportError> {
        Ok(Self::new(HttpTransport::from_config(config)?).with_operation(config.operation.clone()))
    }
}
