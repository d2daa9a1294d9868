//! Client for the event service's seat-reservation contract.
//!
//! The [`EventServiceClient`] trait is the capability set the booking
//! state machine sees: look an event up, reserve seats, release seats.
//! None of its methods can fail. A transport problem degrades to the
//! same answer as a business refusal (`None` / `false` / no-op), so the
//! caller cannot tell "no seats" from "ledger down" and must treat the
//! negative as authoritative.
//!
//! [`RestEventServiceClient`] is the live implementation: a reqwest
//! transport with a bounded timeout, wrapped in an explicit circuit
//! breaker. While the breaker is open the client answers with the same
//! safe defaults without touching the network.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use parking_lot::Mutex;
use reqwest::StatusCode;
use shared::{EventSummary, SeatsQuery};
use tracing::warn;

/// Capabilities the booking service needs from the event service.
#[async_trait]
pub trait EventServiceClient: Send + Sync {
    async fn event_by_id(&self, event_id: i64) -> Option<EventSummary>;

    /// `true` only when the ledger actually decremented its counter.
    async fn reserve_seats(&self, event_id: i64, number_of_seats: i32) -> bool;

    /// Best effort; the caller proceeds regardless of the outcome.
    async fn release_seats(&self, event_id: i64, number_of_seats: i32);
}

#[derive(Debug, thiserror::Error)]
enum ClientError {
    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("upstream returned {0}")]
    Status(StatusCode),
}

/// Circuit breaker tuning.
#[derive(Debug, Clone)]
pub struct BreakerConfig {
    /// Consecutive failures before the circuit opens.
    pub failure_threshold: u32,
    /// How long the circuit stays open before a probe is allowed.
    pub open_timeout: Duration,
}

impl Default for BreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            open_timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BreakerState {
    Closed { failures: u32 },
    Open { until: Instant },
    HalfOpen,
}

/// Explicit Closed/Open/HalfOpen state machine driven by a consecutive
/// failure counter and a reopen timer.
#[derive(Debug)]
pub struct CircuitBreaker {
    config: BreakerConfig,
    state: Mutex<BreakerState>,
}

impl CircuitBreaker {
    pub fn new(config: BreakerConfig) -> Self {
        Self {
            config,
            state: Mutex::new(BreakerState::Closed { failures: 0 }),
        }
    }

    /// Whether a call may go out. Once the open deadline has passed the
    /// state moves to half-open and exactly the caller that observed the
    /// transition gets through as the probe.
    pub fn allow(&self) -> bool {
        let mut state = self.state.lock();
        match *state {
            BreakerState::Closed { .. } => true,
            BreakerState::HalfOpen => false,
            BreakerState::Open { until } => {
                if Instant::now() >= until {
                    *state = BreakerState::HalfOpen;
                    true
                } else {
                    false
                }
            }
        }
    }

    pub fn record_success(&self) {
        *self.state.lock() = BreakerState::Closed { failures: 0 };
    }

    pub fn record_failure(&self) {
        let mut state = self.state.lock();
        *state = match *state {
            BreakerState::Closed { failures } => {
                let failures = failures + 1;
                if failures >= self.config.failure_threshold {
                    BreakerState::Open {
                        until: Instant::now() + self.config.open_timeout,
                    }
                } else {
                    BreakerState::Closed { failures }
                }
            }
            // A failed probe re-opens the circuit with a fresh deadline.
            BreakerState::HalfOpen | BreakerState::Open { .. } => BreakerState::Open {
                until: Instant::now() + self.config.open_timeout,
            },
        };
    }

    pub fn is_open(&self) -> bool {
        matches!(*self.state.lock(), BreakerState::Open { .. })
    }
}

/// Construction-time configuration for [`RestEventServiceClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the event service, e.g. `http://event-service:8080`.
    pub base_url: String,
    /// Per-request timeout; an elapsed timeout counts as a failure.
    pub request_timeout: Duration,
    pub breaker: BreakerConfig,
}

pub struct RestEventServiceClient {
    http: reqwest::Client,
    base_url: String,
    breaker: CircuitBreaker,
}

impl RestEventServiceClient {
    pub fn new(config: ClientConfig) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            breaker: CircuitBreaker::new(config.breaker),
        })
    }

    async fn try_event_by_id(&self, event_id: i64) -> Result<Option<EventSummary>, ClientError> {
        let url = format!("{}/events/{}", self.base_url, event_id);
        let response = self.http.get(&url).send().await?;
        let status = response.status();
        if status.is_success() {
            Ok(Some(response.json::<EventSummary>().await?))
        } else if status.is_server_error() {
            Err(ClientError::Status(status))
        } else {
            // The service answered; the event just does not exist.
            Ok(None)
        }
    }

    async fn try_reserve(&self, event_id: i64, number_of_seats: i32) -> Result<bool, ClientError> {
        let url = format!("{}/events/{}/reserve", self.base_url, event_id);
        let response = self
            .http
            .post(&url)
            .query(&SeatsQuery { number_of_seats })
            .send()
            .await?;
        let status = response.status();
        if status.is_success() {
            Ok(response.json::<bool>().await?)
        } else if status.is_server_error() {
            Err(ClientError::Status(status))
        } else {
            Ok(false)
        }
    }

    async fn try_release(&self, event_id: i64, number_of_seats: i32) -> Result<(), ClientError> {
        let url = format!("{}/events/{}/release", self.base_url, event_id);
        let response = self
            .http
            .post(&url)
            .query(&SeatsQuery { number_of_seats })
            .send()
            .await?;
        let status = response.status();
        if status.is_server_error() {
            Err(ClientError::Status(status))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl EventServiceClient for RestEventServiceClient {
    async fn event_by_id(&self, event_id: i64) -> Option<EventSummary> {
        if !self.breaker.allow() {
            warn!(event_id, "event service circuit open, skipping lookup");
            return None;
        }
        match self.try_event_by_id(event_id).await {
            Ok(summary) => {
                self.breaker.record_success();
                summary
            }
            Err(err) => {
                self.breaker.record_failure();
                warn!(event_id, error = %err, "event service unreachable for lookup");
                None
            }
        }
    }

    async fn reserve_seats(&self, event_id: i64, number_of_seats: i32) -> bool {
        if !self.breaker.allow() {
            warn!(
                event_id,
                number_of_seats, "event service circuit open, declining reservation"
            );
            return false;
        }
        match self.try_reserve(event_id, number_of_seats).await {
            Ok(reserved) => {
                self.breaker.record_success();
                reserved
            }
            Err(err) => {
                self.breaker.record_failure();
                warn!(
                    event_id,
                    number_of_seats,
                    error = %err,
                    "event service unreachable, treating reservation as declined"
                );
                false
            }
        }
    }

    async fn release_seats(&self, event_id: i64, number_of_seats: i32) {
        if !self.breaker.allow() {
            warn!(
                event_id,
                number_of_seats,
                "event service circuit open, seat release needs later reconciliation"
            );
            return;
        }
        match self.try_release(event_id, number_of_seats).await {
            Ok(()) => self.breaker.record_success(),
            Err(err) => {
                self.breaker.record_failure();
                warn!(
                    event_id,
                    number_of_seats,
                    error = %err,
                    "event service unreachable, seat release needs later reconciliation"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    use axum::extract::State;
    use axum::http::StatusCode as AxumStatus;
    use axum::response::{IntoResponse, Response};
    use axum::routing::{get, post};
    use axum::{Json, Router};

    fn quick_breaker(threshold: u32, open_ms: u64) -> BreakerConfig {
        BreakerConfig {
            failure_threshold: threshold,
            open_timeout: Duration::from_millis(open_ms),
        }
    }

    fn client_for(base_url: String, breaker: BreakerConfig) -> RestEventServiceClient {
        RestEventServiceClient::new(ClientConfig {
            base_url,
            request_timeout: Duration::from_millis(500),
            breaker,
        })
        .unwrap()
    }

    /// Bound-then-dropped listener: connections to the port are refused.
    fn refused_port_url() -> String {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        format!("http://{addr}")
    }

    #[derive(Clone)]
    struct UpstreamState {
        healthy: Arc<AtomicBool>,
    }

    async fn upstream_event(State(state): State<UpstreamState>) -> Response {
        if state.healthy.load(Ordering::SeqCst) {
            Json(EventSummary {
                id: 1,
                name: "Open Air Concert".to_string(),
                location: "Paris".to_string(),
                available_seats: 5,
            })
            .into_response()
        } else {
            AxumStatus::INTERNAL_SERVER_ERROR.into_response()
        }
    }

    async fn upstream_reserve(State(state): State<UpstreamState>) -> Response {
        if state.healthy.load(Ordering::SeqCst) {
            Json(true).into_response()
        } else {
            AxumStatus::INTERNAL_SERVER_ERROR.into_response()
        }
    }

    async fn upstream_release(State(state): State<UpstreamState>) -> Response {
        if state.healthy.load(Ordering::SeqCst) {
            AxumStatus::OK.into_response()
        } else {
            AxumStatus::INTERNAL_SERVER_ERROR.into_response()
        }
    }

    async fn spawn_upstream() -> (String, Arc<AtomicBool>) {
        let healthy = Arc::new(AtomicBool::new(true));
        let app = Router::new()
            .route("/events/:id", get(upstream_event))
            .route("/events/:id/reserve", post(upstream_reserve))
            .route("/events/:id/release", post(upstream_release))
            .with_state(UpstreamState {
                healthy: Arc::clone(&healthy),
            });
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{addr}"), healthy)
    }

    #[test]
    fn breaker_opens_after_consecutive_failures() {
        let breaker = CircuitBreaker::new(quick_breaker(3, 10_000));
        assert!(breaker.allow());
        breaker.record_failure();
        breaker.record_failure();
        assert!(!breaker.is_open());
        breaker.record_failure();
        assert!(breaker.is_open());
        assert!(!breaker.allow());
    }

    #[test]
    fn breaker_success_resets_failure_count() {
        let breaker = CircuitBreaker::new(quick_breaker(2, 10_000));
        breaker.record_failure();
        breaker.record_success();
        breaker.record_failure();
        assert!(!breaker.is_open());
    }

    #[test]
    fn breaker_half_open_allows_one_probe() {
        let breaker = CircuitBreaker::new(quick_breaker(1, 20));
        breaker.record_failure();
        assert!(!breaker.allow());

        std::thread::sleep(Duration::from_millis(40));
        assert!(breaker.allow());
        // Probe in flight: no second call gets through.
        assert!(!breaker.allow());

        breaker.record_success();
        assert!(breaker.allow());
    }

    #[test]
    fn breaker_failed_probe_reopens() {
        let breaker = CircuitBreaker::new(quick_breaker(1, 20));
        breaker.record_failure();
        std::thread::sleep(Duration::from_millis(40));
        assert!(breaker.allow());
        breaker.record_failure();
        assert!(breaker.is_open());
        assert!(!breaker.allow());
    }

    #[tokio::test]
    async fn live_upstream_round_trips() {
        let (url, _healthy) = spawn_upstream().await;
        let client = client_for(url, BreakerConfig::default());

        let summary = client.event_by_id(1).await.unwrap();
        assert_eq!(summary.available_seats, 5);
        assert!(client.reserve_seats(1, 2).await);
        client.release_seats(1, 2).await;
        assert!(!client.breaker.is_open());
    }

    #[tokio::test]
    async fn transport_failure_degrades_to_safe_defaults() {
        let client = client_for(refused_port_url(), quick_breaker(2, 10_000));

        assert!(client.event_by_id(1).await.is_none());
        assert!(!client.reserve_seats(1, 2).await);
        // Two failures tripped the breaker; release short-circuits quietly.
        assert!(client.breaker.is_open());
        client.release_seats(1, 2).await;
        assert!(!client.reserve_seats(1, 2).await);
    }

    #[tokio::test]
    async fn server_errors_trip_the_breaker_then_probe_recovers() {
        let (url, healthy) = spawn_upstream().await;
        healthy.store(false, Ordering::SeqCst);
        let client = client_for(url, quick_breaker(2, 500));

        assert!(!client.reserve_seats(1, 1).await);
        assert!(!client.reserve_seats(1, 1).await);
        assert!(client.breaker.is_open());

        // Upstream heals, but the circuit is still within its open window.
        healthy.store(true, Ordering::SeqCst);
        assert!(!client.reserve_seats(1, 1).await);

        tokio::time::sleep(Duration::from_millis(600)).await;
        assert!(client.reserve_seats(1, 1).await);
        assert!(!client.breaker.is_open());
        assert!(client.reserve_seats(1, 1).await);
    }
}
