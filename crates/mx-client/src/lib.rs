//! `mx-client` submits matrix expressions to a remote solver.
//!
//! A [`Request`](mx_lang::Request) bundles an expression with the matrices
//! its operands name. The [`Client`] checks it locally and hands it to a
//! [`Transport`], by default [`HttpTransport`], which posts it as JSON to
//! `<endpoint>/solveProblem` and decodes the result matrix.
//!
//! ## Examples
//!
//! ```rust,no_run
//! use mx_client::{Client, Config};
//! use mx_lang::{Matrix, Request};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::from_env();
//! mx_client::init_tracing(&config)?;
//!
//! let client = Client::from_config(&config)?;
//! let request = Request::new("(a*b)+c")
//!     .with_operand("a", Matrix::zeros(2, 3))
//!     .with_operand("b", Matrix::zeros(3, 4))
//!     .with_operand("c", Matrix::zeros(2, 4));
//!
//! let result = client.solve(&request).await?;
//! println!("{}", result);
//! # Ok(())
//! # }
//! ```
mod client;
mod config;
mod error;
mod log;
mod transport;

pub use client::{Client, DEFAULT_OPERATION};
pub use config::{Config, LogFormat};
pub use error::{ClientError, TransportError};
pub use log::init_tracing;
pub use transport::{HttpTransport, Transport};
