// Refresh scheduler - periodic and on-demand fetch/transform/render cycles
use crate::application::api_client::{AuthError, ClientError};
use crate::application::battery_api::BatteryApi;
use crate::application::renderer::{DashboardStatus, Renderer};
use crate::domain::chart::transform;
use crate::domain::telemetry::PredictionResult;
use futures::StreamExt;
use futures::stream::FuturesUnordered;
use std::future::Future;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tokio::time::MissedTickBehavior;

/// How one refresh cycle ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleReport {
    Rendered { generation: u64, samples: usize, prediction: bool },
    NoData { generation: u64 },
    Unavailable { generation: u64 },
    /// A newer cycle rendered first; this cycle's results were dropped.
    Superseded { generation: u64 },
}

pub struct RefreshScheduler {
    api: Arc<BatteryApi>,
    renderer: Arc<dyn Renderer>,
    battery_id: String,
    interval: Duration,
    next_generation: AtomicU64,
    // Newest generation that has drawn anything.
    rendered: Mutex<u64>,
    trigger: Notify,
}

impl RefreshScheduler {
    pub fn new(api: Arc<BatteryApi>, renderer: Arc<dyn Renderer>, battery_id: String, interval: Duration) -> Self {
        Self {
            api,
            renderer,
            battery_id,
            interval,
            next_generation: AtomicU64::new(0),
            rendered: Mutex::new(0),
            trigger: Notify::new(),
        }
    }

    pub fn battery_id(&self) -> &str {
        &self.battery_id
    }

    /// Asks the running loop for an extra cycle.
    pub fn request_refresh(&self) {
        self.trigger.notify_one();
    }

    /// Runs one cycle: history, then prediction.
    ///
    /// A history failure skips the prediction and marks the data unavailable,
    /// leaving earlier series on screen. Only [`AuthError`] is returned as an
    /// error; the session is already torn down by then.
    pub async fn refresh(&self) -> Result<CycleReport, AuthError> {
        let generation = self.next_generation.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::debug!(generation, battery_id = %self.battery_id, "Refresh cycle started");

        let history = match self.api.fetch_history(&self.battery_id).await {
            Ok(history) => history,
            Err(ClientError::Auth(e)) => return Err(e),
            Err(e) => {
                tracing::warn!(generation, "History fetch failed: {}", e);
                let status = DashboardStatus::Unavailable(e.to_string());
                let report = if self.commit(generation, |r| r.render_status(&status)) {
                    CycleReport::Unavailable { generation }
                } else {
                    CycleReport::Superseded { generation }
                };
                return Ok(report);
            }
        };

        let latest = history.last().cloned();
        let drawn = self.commit(generation, |r| match &latest {
            Some(sample) => {
                r.render_series(&transform(&history));
                r.render_latest(sample);
            }
            None => r.render_status(&DashboardStatus::NoData),
        });
        if !drawn {
            return Ok(CycleReport::Superseded { generation });
        }

        let fallback_cycle = latest.as_ref().map_or(0, |s| s.cycle_number);
        let prediction = match self.api.fetch_prediction(&self.battery_id).await {
            Ok(payload) => Ok(PredictionResult::from_payload(payload, fallback_cycle)),
            Err(ClientError::Auth(e)) => return Err(e),
            Err(e) => {
                tracing::warn!(generation, "Prediction fetch failed: {}", e);
                Err(DashboardStatus::PredictionUnavailable(e.to_string()))
            }
        };

        let has_history = latest.is_some();
        let drawn = self.commit(generation, |r| match &prediction {
            Ok(p) => r.render_prediction(p),
            // With no history the placeholder stays up.
            Err(status) if has_history => r.render_status(status),
            Err(_) => {}
        });
        if !drawn {
            return Ok(CycleReport::Superseded { generation });
        }

        Ok(if has_history {
            CycleReport::Rendered {
                generation,
                samples: history.len(),
                prediction: prediction.is_ok(),
            }
        } else {
            CycleReport::NoData { generation }
        })
    }

    /// Drives cycles on every tick and on every [`request_refresh`] until
    /// `shutdown` resolves. Cycles may overlap; stale ones are discarded.
    ///
    /// [`request_refresh`]: RefreshScheduler::request_refresh
    pub async fn run<F>(&self, shutdown: F) -> Result<(), AuthError>
    where
        F: Future<Output = ()>,
    {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut in_flight = FuturesUnordered::new();
        tokio::pin!(shutdown);

        tracing::info!(
            battery_id = %self.battery_id,
            "Refreshing every {}s",
            self.interval.as_secs()
        );

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    tracing::info!("Refresh loop stopped ({} cycle(s) abandoned)", in_flight.len());
                    return Ok(());
                }
                _ = ticker.tick() => in_flight.push(self.refresh()),
                _ = self.trigger.notified() => in_flight.push(self.refresh()),
                Some(outcome) = in_flight.next() => match outcome {
                    Ok(report) => tracing::debug!(?report, "Refresh cycle finished"),
                    Err(e) => {
                        tracing::warn!("Refresh loop stopped: {}", e);
                        return Err(e);
                    }
                },
            }
        }
    }

    /// Renders only if no newer cycle has rendered yet.
    fn commit(&self, generation: u64, render: impl FnOnce(&dyn Renderer)) -> bool {
        let mut rendered = self.rendered.lock().unwrap_or_else(|e| e.into_inner());
        if generation < *rendered {
            tracing::debug!(generation, newest = *rendered, "Discarding stale refresh result");
            return false;
        }
        *rendered = generation;
        render(self.renderer.as_ref());
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::api_client::AuthenticatedClient;
    use crate::application::session_store::SessionContext;
    use crate::infrastructure::memory_session_store::MemorySessionStore;
    use crate::test_support::{RecordingNavigator, RecordingRenderer, RenderEvent, ScriptedTransport, sample};
    use serde_json::json;

    const HISTORY: &str = "/battery-history/BATT001";
    const PREDICT: &str = "/predict-rul/BATT001";

    struct Fixture {
        scheduler: RefreshScheduler,
        transport: Arc<ScriptedTransport>,
        renderer: Arc<RecordingRenderer>,
        navigator: Arc<RecordingNavigator>,
        session: SessionContext,
    }

    fn fixture() -> Fixture {
        let session = SessionContext::new(Arc::new(MemorySessionStore::default()));
        session.init("tok".to_string(), "alice".to_string(), None).unwrap();
        let transport = Arc::new(ScriptedTransport::default());
        let renderer = Arc::new(RecordingRenderer::default());
        let navigator = Arc::new(RecordingNavigator::default());
        let client = AuthenticatedClient::new(
            "http://backend/api".to_string(),
            transport.clone(),
            session.clone(),
            navigator.clone(),
        );
        let scheduler = RefreshScheduler::new(
            Arc::new(BatteryApi::new(client)),
            renderer.clone(),
            "BATT001".to_string(),
            Duration::from_secs(3600),
        );
        Fixture {
            scheduler,
            transport,
            renderer,
            navigator,
            session,
        }
    }

    fn history(cycles: &[(u32, f64)]) -> serde_json::Value {
        let data: Vec<_> = cycles.iter().map(|(c, cap)| sample("BATT001", *c, *cap)).collect();
        json!({"battery_id": "BATT001", "data": data})
    }

    fn prediction(current_cycle: u32) -> serde_json::Value {
        json!({"predicted_rul": 480.0, "confidence": 0.82, "current_cycle": current_cycle})
    }

    #[tokio::test]
    async fn test_cycle_renders_series_latest_and_prediction_in_order() {
        let f = fixture();
        f.transport.respond(HISTORY, 200, history(&[(1, 99.9), (2, 99.8)]));
        f.transport.respond(PREDICT, 200, prediction(2));

        let report = f.scheduler.refresh().await.unwrap();

        assert_eq!(report, CycleReport::Rendered { generation: 1, samples: 2, prediction: true });
        let events = f.renderer.events();
        assert_eq!(events.len(), 3);
        assert!(matches!(&events[0], RenderEvent::Series(s) if s.labels() == [1, 2]));
        assert!(matches!(&events[1], RenderEvent::Latest(s) if s.cycle_number == 2));
        assert!(matches!(&events[2], RenderEvent::Prediction(p) if p.current_cycle == 2));

        let requests = f.transport.requests();
        assert!(requests[0].url.ends_with(HISTORY));
        assert!(requests[1].url.ends_with(PREDICT));
    }

    #[tokio::test]
    async fn test_history_failure_skips_prediction_and_keeps_series() {
        let f = fixture();
        f.transport.respond(HISTORY, 200, history(&[(1, 99.9)]));
        f.transport.respond(PREDICT, 200, prediction(1));
        f.transport.respond(HISTORY, 503, json!({"detail": "database offline"}));

        f.scheduler.refresh().await.unwrap();
        let report = f.scheduler.refresh().await.unwrap();

        assert_eq!(report, CycleReport::Unavailable { generation: 2 });
        assert_eq!(f.transport.count(PREDICT), 1);
        assert_eq!(f.renderer.series().len(), 1);
        assert!(matches!(
            f.renderer.statuses().last(),
            Some(DashboardStatus::Unavailable(reason)) if reason.contains("503")
        ));
    }

    #[tokio::test]
    async fn test_network_failure_marks_unavailable() {
        let f = fixture();
        f.transport.fail(HISTORY, "connection refused");

        let report = f.scheduler.refresh().await.unwrap();

        assert_eq!(report, CycleReport::Unavailable { generation: 1 });
        assert_eq!(f.transport.count(PREDICT), 0);
        assert!(f.renderer.series().is_empty());
    }

    #[tokio::test]
    async fn test_empty_history_shows_placeholder() {
        let f = fixture();
        f.transport.respond(HISTORY, 200, json!({"battery_id": "BATT001", "data": []}));
        f.transport.respond(PREDICT, 404, json!({"detail": "Battery data not found"}));

        let report = f.scheduler.refresh().await.unwrap();

        assert_eq!(report, CycleReport::NoData { generation: 1 });
        assert!(f.renderer.series().is_empty());
        assert_eq!(f.renderer.statuses(), vec![DashboardStatus::NoData]);
    }

    #[tokio::test]
    async fn test_prediction_failure_is_shown_as_status() {
        let f = fixture();
        f.transport.respond(HISTORY, 200, history(&[(3, 99.7)]));
        f.transport.respond(PREDICT, 400, json!({"detail": "Prediction failed"}));

        let report = f.scheduler.refresh().await.unwrap();

        assert_eq!(report, CycleReport::Rendered { generation: 1, samples: 1, prediction: false });
        assert!(matches!(
            f.renderer.statuses().last(),
            Some(DashboardStatus::PredictionUnavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_prediction_without_cycle_uses_latest_sample() {
        let f = fixture();
        f.transport.respond(HISTORY, 200, history(&[(7, 99.3), (8, 99.2)]));
        f.transport.respond(PREDICT, 200, json!({"rul": 300.0, "confidence": 0.5}));

        f.scheduler.refresh().await.unwrap();

        assert_eq!(f.renderer.predictions()[0].current_cycle, 8);
    }

    #[tokio::test]
    async fn test_unauthorized_history_propagates_auth_error() {
        let f = fixture();
        f.transport.respond(HISTORY, 401, json!({"detail": "expired"}));

        let err = f.scheduler.refresh().await.unwrap_err();

        assert_eq!(err, AuthError::Rejected);
        assert!(f.session.current().is_empty());
        assert_eq!(f.navigator.redirects(), 1);
        assert!(f.renderer.events().is_empty());
    }

    #[tokio::test]
    async fn test_slow_cycle_cannot_overwrite_newer_render() {
        let f = Arc::new(fixture());
        let (entered, release) = f.transport.hold(HISTORY, 200, history(&[(1, 99.9)]));
        f.transport.respond(HISTORY, 200, history(&[(1, 99.9), (2, 99.8)]));
        f.transport.respond(PREDICT, 200, prediction(2));
        f.transport.respond(PREDICT, 200, prediction(1));

        let slow = {
            let f = f.clone();
            tokio::spawn(async move { f.scheduler.refresh().await })
        };
        entered.await.unwrap();

        let fast = f.scheduler.refresh().await.unwrap();
        assert_eq!(fast, CycleReport::Rendered { generation: 2, samples: 2, prediction: true });

        release.send(()).unwrap();
        let slow = slow.await.unwrap().unwrap();

        assert_eq!(slow, CycleReport::Superseded { generation: 1 });
        let series = f.renderer.series();
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].labels(), &[1, 2]);
        // The stale cycle stopped before asking for a prediction.
        assert_eq!(f.transport.count(PREDICT), 1);
    }

    #[tokio::test]
    async fn test_run_ticks_immediately_and_honours_manual_trigger() {
        let f = fixture();
        f.transport.respond(HISTORY, 500, json!({"detail": "boom"}));
        f.transport.respond(HISTORY, 200, history(&[(1, 99.9)]));
        f.transport.respond(PREDICT, 200, prediction(1));

        let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();
        let driver = async {
            while f.renderer.statuses().is_empty() {
                tokio::task::yield_now().await;
            }
            // The failed first cycle must not stop the loop.
            f.scheduler.request_refresh();
            while f.renderer.predictions().is_empty() {
                tokio::task::yield_now().await;
            }
            let _ = stop_tx.send(());
        };

        let (result, ()) = tokio::join!(
            f.scheduler.run(async {
                let _ = stop_rx.await;
            }),
            driver
        );

        assert!(result.is_ok());
        assert_eq!(f.transport.count(HISTORY), 2);
        assert_eq!(f.renderer.series().len(), 1);
    }

    #[tokio::test]
    async fn test_run_stops_on_auth_error() {
        let f = fixture();
        f.transport.respond(HISTORY, 401, json!({"detail": "revoked"}));

        let result = f.scheduler.run(std::future::pending()).await;

        assert_eq!(result, Err(AuthError::Rejected));
        assert!(!f.session.is_authenticated());
        assert_eq!(f.navigator.redirects(), 1);
    }
}
