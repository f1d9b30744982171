// Test doubles for the transport, renderer and navigator seams
use crate::application::http_transport::{ApiRequest, ApiResponse, HttpTransport, TransportError};
use crate::application::navigator::Navigator;
use crate::application::renderer::{DashboardStatus, Renderer};
use crate::domain::chart::DashboardSeries;
use crate::domain::telemetry::{PredictionResult, TelemetrySample};
use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::StatusCode;
use serde_json::{Value, json};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::oneshot;

enum Scripted {
    Respond(ApiResponse),
    Fail(String),
    Held {
        response: ApiResponse,
        entered: oneshot::Sender<()>,
        release: oneshot::Receiver<()>,
    },
}

/// Replays queued responses per route (matched as a URL suffix).
/// Unscripted routes answer 404.
#[derive(Default)]
pub struct ScriptedTransport {
    routes: Mutex<Vec<(String, VecDeque<Scripted>)>>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl ScriptedTransport {
    fn push(&self, route: &str, scripted: Scripted) {
        let mut routes = self.routes.lock().unwrap();
        match routes.iter_mut().find(|(r, _)| r == route) {
            Some((_, queue)) => queue.push_back(scripted),
            None => routes.push((route.to_string(), VecDeque::from([scripted]))),
        }
    }

    pub fn respond(&self, route: &str, status: u16, body: Value) {
        self.push(route, Scripted::Respond(response(status, &body)));
    }

    pub fn fail(&self, route: &str, message: &str) {
        self.push(route, Scripted::Fail(message.to_string()));
    }

    /// Queues a response that is only delivered once the returned sender
    /// fires. The receiver completes when the request has arrived.
    pub fn hold(&self, route: &str, status: u16, body: Value) -> (oneshot::Receiver<()>, oneshot::Sender<()>) {
        let (entered_tx, entered_rx) = oneshot::channel();
        let (release_tx, release_rx) = oneshot::channel();
        self.push(
            route,
            Scripted::Held {
                response: response(status, &body),
                entered: entered_tx,
                release: release_rx,
            },
        );
        (entered_rx, release_tx)
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn count(&self, route: &str) -> usize {
        self.requests().iter().filter(|r| r.url.ends_with(route)).count()
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        let next = {
            let mut routes = self.routes.lock().unwrap();
            routes
                .iter_mut()
                .find(|(route, _)| request.url.ends_with(route.as_str()))
                .and_then(|(_, queue)| queue.pop_front())
        };
        self.requests.lock().unwrap().push(request);

        match next {
            Some(Scripted::Respond(response)) => Ok(response),
            Some(Scripted::Fail(message)) => Err(TransportError::Connect(message)),
            Some(Scripted::Held {
                response,
                entered,
                release,
            }) => {
                let _ = entered.send(());
                let _ = release.await;
                Ok(response)
            }
            None => Ok(response(404, &json!({"detail": "Not Found"}))),
        }
    }
}

fn response(status: u16, body: &Value) -> ApiResponse {
    ApiResponse::new(
        StatusCode::from_u16(status).unwrap(),
        serde_json::to_vec(body).unwrap(),
    )
}

/// In-memory backend with the same routes as the prediction service.
pub struct FakeBackend {
    token: String,
    history: Mutex<Vec<TelemetrySample>>,
    pub retrain_calls: AtomicUsize,
}

impl FakeBackend {
    pub fn new(token: &str, history: Vec<TelemetrySample>) -> Self {
        Self {
            token: token.to_string(),
            history: Mutex::new(history),
            retrain_calls: AtomicUsize::new(0),
        }
    }

    pub fn history(&self) -> Vec<TelemetrySample> {
        self.history.lock().unwrap().clone()
    }

    fn route(&self, request: &ApiRequest) -> (u16, Value) {
        let path = request.url.split("/api").nth(1).unwrap_or_default();

        if path == "/auth/login" {
            let body: Value = serde_json::from_slice(request.body.as_deref().unwrap_or_default()).unwrap();
            return if body["username"] == "alice" && body["password"] == "secret" {
                (200, json!({"access_token": self.token, "token_type": "bearer"}))
            } else {
                (401, json!({"detail": "Invalid credentials"}))
            };
        }
        if path == "/health" {
            return (200, json!({"status": "healthy", "model_trained": true}));
        }

        let expected = format!("Bearer {}", self.token);
        if request.headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok()) != Some(expected.as_str()) {
            return (401, json!({"detail": "Could not validate credentials"}));
        }

        match (request.method.as_str(), path) {
            ("GET", p) if p.starts_with("/battery-history/") => {
                let id = &p["/battery-history/".len()..];
                let history = self.history.lock().unwrap();
                let data: Vec<&TelemetrySample> = history.iter().filter(|s| s.battery_id == id).collect();
                (200, json!({"battery_id": id, "data": data}))
            }
            ("GET", p) if p.starts_with("/predict-rul/") => {
                let history = self.history.lock().unwrap();
                match history.last() {
                    Some(last) => (
                        200,
                        json!({
                            "battery_id": last.battery_id,
                            "predicted_rul": 500.0 - f64::from(last.cycle_number),
                            "confidence": 0.9,
                            "current_cycle": last.cycle_number
                        }),
                    ),
                    None => (404, json!({"detail": "Battery data not found"})),
                }
            }
            ("POST", "/battery-data") => {
                let sample: TelemetrySample =
                    serde_json::from_slice(request.body.as_deref().unwrap_or_default()).unwrap();
                self.history.lock().unwrap().push(sample);
                (200, json!({"message": "Data added successfully", "id": 1}))
            }
            ("POST", "/retrain-model") => {
                self.retrain_calls.fetch_add(1, Ordering::SeqCst);
                (200, json!({"success": true, "message": "Model retrained"}))
            }
            _ => (404, json!({"detail": "Not Found"})),
        }
    }
}

#[async_trait]
impl HttpTransport for FakeBackend {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        let (status, body) = self.route(&request);
        Ok(response(status, &body))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RenderEvent {
    Series(DashboardSeries),
    Latest(TelemetrySample),
    Prediction(PredictionResult),
    Status(DashboardStatus),
}

#[derive(Default)]
pub struct RecordingRenderer {
    events: Mutex<Vec<RenderEvent>>,
}

impl RecordingRenderer {
    pub fn events(&self) -> Vec<RenderEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn series(&self) -> Vec<DashboardSeries> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                RenderEvent::Series(s) => Some(s),
                _ => None,
            })
            .collect()
    }

    pub fn statuses(&self) -> Vec<DashboardStatus> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                RenderEvent::Status(s) => Some(s),
                _ => None,
            })
            .collect()
    }

    pub fn predictions(&self) -> Vec<PredictionResult> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                RenderEvent::Prediction(p) => Some(p),
                _ => None,
            })
            .collect()
    }

    fn record(&self, event: RenderEvent) {
        self.events.lock().unwrap().push(event);
    }
}

impl Renderer for RecordingRenderer {
    fn render_series(&self, series: &DashboardSeries) {
        self.record(RenderEvent::Series(series.clone()));
    }

    fn render_latest(&self, sample: &TelemetrySample) {
        self.record(RenderEvent::Latest(sample.clone()));
    }

    fn render_prediction(&self, prediction: &PredictionResult) {
        self.record(RenderEvent::Prediction(prediction.clone()));
    }

    fn render_status(&self, status: &DashboardStatus) {
        self.record(RenderEvent::Status(status.clone()));
    }
}

#[derive(Default)]
pub struct RecordingNavigator {
    redirects: AtomicUsize,
}

impl RecordingNavigator {
    pub fn redirects(&self) -> usize {
        self.redirects.load(Ordering::SeqCst)
    }
}

impl Navigator for RecordingNavigator {
    fn redirect_to_login(&self) {
        self.redirects.fetch_add(1, Ordering::SeqCst);
    }
}

pub fn sample(battery_id: &str, cycle_number: u32, capacity: f64) -> TelemetrySample {
    TelemetrySample::new(battery_id.to_string(), cycle_number, 3.8, 2.1, 26.0, capacity)
}
