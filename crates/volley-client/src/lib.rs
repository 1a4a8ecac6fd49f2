//! Client side of the volley harness: payload generation, paced uploads,
//! and the concurrent request fan-out.

pub mod driver;
pub mod generate;
pub mod throttle;

pub type Result<T> = core::result::Result<T, ClientError>;

/// Failure modes of one request attempt. An encode failure costs only the
/// attempt; a transport failure retires the worker that hit it.
#[derive(thiserror::Error, Debug)]
pub enum ClientError {
    #[error("encode error: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
}
