//! Discovery poller errors

use thiserror::Error;

/// Errors surfaced by a single endpoint request.
///
/// The poll cycle isolates these per endpoint: a failing endpoint is
/// logged and skipped, never fatal to the cycle.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("endpoint {endpoint} returned status {status}")]
    EndpointStatus { endpoint: String, status: u16 },

    #[error("all {attempts} attempts against {endpoint} failed: {last_error}")]
    RetriesExhausted {
        endpoint: String,
        attempts: u32,
        last_error: String,
    },
}
