//! Fetch -> normalize sequencing with mock fallback and a single observable
//! state slot.

use std::{
    collections::BTreeSet,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

use serde_json::Value;
use thiserror::Error;
use tokio::{sync::watch, time::timeout};
use tracing::{debug, info, warn};

use crate::{
    clock::Clock,
    mock::mock_payload,
    model::{ErrorCause, ErrorState, FetchRequest, WeatherView},
    normalize::{NormalizationError, normalize, normalize_json},
    provider::{FetchError, WeatherFetcher},
};

/// Why a load fell back to mock data.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("network failure: {0}")]
    Network(#[from] FetchError),

    #[error("response envelope has no `results` field")]
    MalformedEnvelope,

    #[error("could not normalize payload: {0}")]
    Normalization(#[from] NormalizationError),
}

impl LoadError {
    pub fn cause(&self) -> ErrorCause {
        match self {
            LoadError::Network(err) if err.is_unreachable() => ErrorCause::NoConnection,
            _ => ErrorCause::LoadFailed,
        }
    }

    /// Text shown to the user next to the mock view.
    pub fn user_message(&self) -> &'static str {
        self.cause().message()
    }
}

/// Result of one fetch/normalize pass. `view` is always usable; `error` is
/// set when it was built from mock data.
#[derive(Debug)]
pub struct Loaded {
    pub view: WeatherView,
    pub error: Option<LoadError>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStatus {
    Loading,
    Ready,
}

/// Everything a renderer needs, replaced as one unit.
#[derive(Debug, Clone)]
pub struct WeatherSnapshot {
    pub status: LoadStatus,
    /// Last view produced; kept while a refresh is in flight.
    pub view: Option<Arc<WeatherView>>,
    /// Cleared when a refresh starts, so a retry does not show a stale error.
    pub error: Option<ErrorState>,
    /// Whether `view` was built from mock data. Survives the `Loading` phase.
    mock: bool,
    /// Generations started but not yet published or dropped.
    in_flight: BTreeSet<u64>,
    /// Generation of `view`.
    applied: u64,
}

impl WeatherSnapshot {
    fn initial() -> Self {
        Self {
            status: LoadStatus::Loading,
            view: None,
            error: None,
            mock: false,
            in_flight: BTreeSet::new(),
            applied: 0,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.status == LoadStatus::Loading
    }

    /// True when the displayed view is placeholder data, including while a
    /// refresh is in flight.
    pub fn is_mock(&self) -> bool {
        self.mock
    }

    pub fn generation(&self) -> u64 {
        self.applied
    }

    /// `Loading` while a refresh newer than the shown view may still land,
    /// or while nothing has been shown yet.
    fn settle_status(&mut self) {
        let newer_pending = self.in_flight.last().is_some_and(|g| *g > self.applied);
        self.status = if newer_pending || self.view.is_none() {
            LoadStatus::Loading
        } else {
            LoadStatus::Ready
        };
    }
}

/// Owns the fetcher and the current snapshot.
///
/// Call [`WeatherService::refresh`] once at startup and again on every user
/// refresh. Concurrent refreshes are allowed: each takes a generation number
/// and a response older than the displayed one is discarded.
#[derive(Debug)]
pub struct WeatherService {
    fetcher: Box<dyn WeatherFetcher>,
    clock: Arc<dyn Clock>,
    request: FetchRequest,
    state: watch::Sender<WeatherSnapshot>,
    generations: AtomicU64,
}

impl WeatherService {
    pub fn new(fetcher: Box<dyn WeatherFetcher>, clock: Arc<dyn Clock>, request: FetchRequest) -> Self {
        let (state, _) = watch::channel(WeatherSnapshot::initial());
        Self { fetcher, clock, request, state, generations: AtomicU64::new(0) }
    }

    pub fn subscribe(&self) -> watch::Receiver<WeatherSnapshot> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> WeatherSnapshot {
        self.state.borrow().clone()
    }

    /// Run one load and publish it, unless a newer one is already shown.
    pub async fn refresh(&self) -> WeatherSnapshot {
        let generation = self.generations.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.send_modify(|s| {
            s.status = LoadStatus::Loading;
            s.error = None;
            s.in_flight.insert(generation);
        });
        let mut pending = PendingRefresh { state: &self.state, generation, settled: false };
        debug!(generation, "refresh started");

        let Loaded { view, error } = self.load().await;
        let error = error.as_ref().map(|e| ErrorState::from(e.cause()));

        self.state.send_if_modified(|s| {
            s.in_flight.remove(&generation);
            let before = s.status;
            if generation <= s.applied {
                debug!(generation, applied = s.applied, "dropping stale response");
                s.settle_status();
                return s.status != before;
            }
            s.mock = error.is_some();
            s.view = Some(Arc::new(view));
            s.error = error;
            s.applied = generation;
            s.settle_status();
            true
        });
        pending.settled = true;

        self.snapshot()
    }

    /// One fetch/normalize pass with mock fallback. Does not touch the
    /// published snapshot.
    pub async fn load(&self) -> Loaded {
        let clock = self.clock.as_ref();

        let result = match self.fetch_results().await {
            Ok(results) => normalize_json(&results, clock).map_err(LoadError::from),
            Err(err) => Err(err),
        };

        match result {
            Ok(view) => {
                info!(city = %view.city, "weather loaded");
                Loaded { view, error: None }
            }
            Err(err) => {
                warn!(
                    error = %err,
                    message = err.user_message(),
                    "weather load failed, showing mock data"
                );
                Loaded { view: normalize(&mock_payload(clock), clock), error: Some(err) }
            }
        }
    }

    async fn fetch_results(&self) -> Result<Value, LoadError> {
        let envelope = timeout(self.request.timeout, self.fetcher.fetch(&self.request))
            .await
            .map_err(|_| FetchError::Timeout)??;

        take_results(envelope)
    }
}

fn take_results(mut envelope: Value) -> Result<Value, LoadError> {
    match envelope.get_mut("results").map(Value::take) {
        Some(results) if !results.is_null() => Ok(results),
        _ => Err(LoadError::MalformedEnvelope),
    }
}

/// Restores the status if a refresh future is dropped before it publishes.
struct PendingRefresh<'a> {
    state: &'a watch::Sender<WeatherSnapshot>,
    generation: u64,
    settled: bool,
}

impl Drop for PendingRefresh<'_> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        let generation = self.generation;
        self.state.send_if_modified(|s| {
            if !s.in_flight.remove(&generation) {
                return false;
            }
            let before = s.status;
            s.settle_status();
            s.status != before
        });
    }
}
