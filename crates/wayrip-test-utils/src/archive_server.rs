use std::{
    collections::HashMap,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use axum::{
    Router,
    extract::{Request, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tokio::net::TcpListener;
use url::Url;

#[derive(Clone, Default)]
struct FixtureState {
    responses: Arc<HashMap<String, Vec<u8>>>,
    captures: Arc<HashMap<String, Vec<String>>>,
    requests: Arc<Mutex<Vec<String>>>,
    in_flight: Arc<AtomicUsize>,
    peak: Arc<AtomicUsize>,
}

async fn serve(State(state): State<FixtureState>, request: Request) -> Response {
    let path = request.uri().path().to_string();
    let query = request.uri().query().unwrap_or_default().to_string();
    state.requests.lock().expect("requests lock").push(path.clone());

    // Hold each request open briefly so concurrent fetches overlap and the
    // peak counter actually observes them.
    let current = state.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
    state.peak.fetch_max(current, Ordering::SeqCst);
    tokio::time::sleep(Duration::from_millis(10)).await;
    state.in_flight.fetch_sub(1, Ordering::SeqCst);

    if path == "/cdx" {
        return cdx_response(&state, &query);
    }

    match state.responses.get(&path) {
        Some(body) => (StatusCode::OK, body.clone()).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

fn cdx_response(state: &FixtureState, query: &str) -> Response {
    let original = url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == "url")
        .map(|(_, value)| value.into_owned())
        .unwrap_or_default();

    let mut rows = vec![serde_json::json!(["timestamp"])];
    if let Some(timestamps) = state.captures.get(&original) {
        for timestamp in timestamps {
            rows.push(serde_json::json!([timestamp]));
        }
    }
    serde_json::Value::Array(rows).to_string().into_response()
}

/// Declarative setup for an [`ArchiveServer`].
#[derive(Default)]
pub struct ArchiveServerBuilder {
    responses: HashMap<String, Vec<u8>>,
    captures: HashMap<String, Vec<String>>,
}

impl ArchiveServerBuilder {
    /// Serves `body` as the raw snapshot of `original` at `timestamp`.
    #[must_use]
    pub fn snapshot(mut self, timestamp: &str, original: &str, body: impl Into<Vec<u8>>) -> Self {
        self.responses
            .insert(format!("/web/{timestamp}id_/{original}"), body.into());
        self
    }

    /// Lists `timestamps` as the CDX captures of `original`.
    #[must_use]
    pub fn captures(mut self, original: &str, timestamps: &[&str]) -> Self {
        self.captures.insert(
            original.to_string(),
            timestamps.iter().map(ToString::to_string).collect(),
        );
        self
    }

    /// Binds a random localhost port and starts serving.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot bind; test-only code.
    pub async fn start(self) -> ArchiveServer {
        let state = FixtureState {
            responses: Arc::new(self.responses),
            captures: Arc::new(self.captures),
            ..FixtureState::default()
        };
        let router = Router::new()
            .fallback(serve)
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind fixture listener");
        let addr = listener.local_addr().expect("read fixture listener addr");

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
        let server = axum::serve(listener, router).with_graceful_shutdown(async {
            shutdown_rx.await.ok();
        });
        tokio::spawn(async move {
            server.await.expect("run fixture server");
        });

        ArchiveServer {
            base_url: Url::parse(&format!("http://{addr}")).expect("parse fixture base URL"),
            state,
            shutdown_tx: Some(shutdown_tx),
        }
    }
}

/// A running fake archive. Shuts down when dropped.
pub struct ArchiveServer {
    base_url: Url,
    state: FixtureState,
    shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl ArchiveServer {
    #[must_use]
    pub fn builder() -> ArchiveServerBuilder {
        ArchiveServerBuilder::default()
    }

    /// Base URL to use in place of `https://web.archive.org`.
    #[must_use]
    pub fn archive_base(&self) -> Url {
        self.base_url.clone()
    }

    /// CDX endpoint served by this fixture.
    ///
    /// # Panics
    ///
    /// Never in practice: the joined URL is always valid.
    #[must_use]
    pub fn cdx_endpoint(&self) -> Url {
        self.base_url.join("/cdx").expect("join cdx endpoint")
    }

    /// Number of requests whose path contains `fragment`.
    ///
    /// # Panics
    ///
    /// Panics if the request log mutex is poisoned; test-only code.
    #[must_use]
    pub fn request_count(&self, fragment: &str) -> usize {
        self.state
            .requests
            .lock()
            .expect("requests lock")
            .iter()
            .filter(|path| path.contains(fragment))
            .count()
    }

    /// Total requests the fixture has seen.
    ///
    /// # Panics
    ///
    /// Panics if the request log mutex is poisoned; test-only code.
    #[must_use]
    pub fn total_requests(&self) -> usize {
        self.state.requests.lock().expect("requests lock").len()
    }

    /// Highest number of requests that were in flight at once.
    #[must_use]
    pub fn peak_concurrency(&self) -> usize {
        self.state.peak.load(Ordering::SeqCst)
    }
}

impl Drop for ArchiveServer {
    fn drop(&mut self) {
        if let Some(shutdown_tx) = self.shutdown_tx.take() {
            let _ = shutdown_tx.send(());
        }
    }
}
