use crate::{Config, FetchRequest, provider::hgbrasil::HgBrasilFetcher};
use async_trait::async_trait;
use serde_json::Value;
use std::fmt::Debug;
use thiserror::Error;

pub mod hgbrasil;

/// Failure of a single fetch attempt.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("connection failed: {0}")]
    Connection(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("request timed out")]
    Timeout,

    #[error("provider answered with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("failed to decode provider response: {0}")]
    Decode(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl FetchError {
    /// The provider could not be reached at all.
    pub fn is_unreachable(&self) -> bool {
        matches!(self, FetchError::Connection(_) | FetchError::Timeout)
    }
}

/// Source of raw provider envelopes.
#[async_trait]
pub trait WeatherFetcher: Send + Sync + Debug {
    /// Returns the whole JSON envelope; the payload is expected under `results`.
    async fn fetch(&self, request: &FetchRequest) -> Result<Value, FetchError>;
}

/// Construct the HTTP fetcher from config.
pub fn fetcher_from_config(config: &Config) -> anyhow::Result<Box<dyn WeatherFetcher>> {
    let fetcher = HgBrasilFetcher::new(config.endpoint.clone())?;
    Ok(Box::new(fetcher))
}
