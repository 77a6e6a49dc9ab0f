//! Core library for the `weatherview` panel.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The fetcher seam and its HTTP implementation
//! - Defensive normalization of provider payloads into a display-ready view
//! - Mock fallback data and the refresh orchestrator
//!
//! It is used by `weatherview-cli`, but any renderer can subscribe to
//! [`WeatherService`] snapshots instead.

pub mod clock;
pub mod condition;
pub mod config;
pub mod format;
pub mod mock;
pub mod model;
pub mod normalize;
pub mod orchestrator;
pub mod provider;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::Config;
pub use model::{
    DailyForecast, ErrorCause, ErrorState, FetchRequest, HourlyForecast, RawForecastDay,
    RawWeatherPayload, WeatherView,
};
pub use normalize::{NormalizationError, normalize, normalize_json, normalize_or_mock};
pub use orchestrator::{LoadError, LoadStatus, Loaded, WeatherService, WeatherSnapshot};
pub use provider::{FetchError, WeatherFetcher, fetcher_from_config};
