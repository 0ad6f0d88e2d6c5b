//! content-studio domain crate
//!
//! Core of the studio, free of any transport:
//! - `model`: Domain entities and value objects
//! - `request`: Provider-facing request/response shapes
//! - `ports`: Trait definitions for external dependencies (adapters)
//! - `retry`: Exponential-backoff retry executor
//! - `normalize` / `repair`: Structured data extraction from model output
//! - `error`: User-facing error taxonomy and classifier
//! - `prompts`: Prompt texts
//! - `usecases`: Generation client, refinement session, video job poller

pub mod error;
pub mod limiter;
pub mod model;
pub mod normalize;
pub mod ports;
pub mod prompts;
pub mod repair;
pub mod request;
pub mod retry;
pub mod usecases;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{AppError, CallContext, ConfigurationError, ErrorKind, RawError, classify};
pub use limiter::RateLimiter;
pub use model::*;
pub use ports::*;
pub use retry::{RetryPolicy, with_retry};
