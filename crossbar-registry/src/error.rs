//! Registry errors

use thiserror::Error;

/// Errors raised while talking to discovery endpoints.
///
/// These never escape [`discover`](crate::ServiceRegistry::discover):
/// they are caught per endpoint and surfaced as `errors` entries on the
/// result instead.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("endpoint {endpoint} returned status {status}")]
    EndpointStatus { endpoint: String, status: u16 },
}
