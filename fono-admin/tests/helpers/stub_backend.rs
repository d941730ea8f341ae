//! In-process stub of the catalogue backend
//!
//! Routes are matched on method and path (query ignored). Unknown routes
//! answer 404 with a failure envelope. Every request is recorded, in arrival
//! order, so tests can assert what the client sent.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Router;
use serde_json::{json, Value};

/// One request as the backend saw it
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub body: Vec<u8>,
}

impl RecordedCall {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("request body should be JSON")
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Value of one query parameter, if present
    pub fn query_param(&self, name: &str) -> Option<String> {
        self.query.as_deref()?.split('&').find_map(|pair| {
            let (key, value) = pair.split_once('=')?;
            (key == name).then(|| value.to_string())
        })
    }
}

#[derive(Debug, Clone)]
struct Canned {
    status: StatusCode,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
    delay: Option<Duration>,
}

#[derive(Default)]
struct Inner {
    routes: HashMap<(String, String), Canned>,
    calls: Vec<RecordedCall>,
}

/// Stub backend listening on an ephemeral local port
#[derive(Clone)]
pub struct StubBackend {
    inner: Arc<Mutex<Inner>>,
    base_url: String,
}

/// `{ success: true, data }`
pub fn envelope_ok(data: Value) -> Value {
    json!({ "success": true, "data": data, "message": "Success" })
}

impl StubBackend {
    /// Bind `127.0.0.1:0` and serve until the test runtime shuts down
    pub async fn start() -> Self {
        let inner = Arc::new(Mutex::new(Inner::default()));
        let router = Router::new()
            .fallback(dispatch)
            .with_state(Arc::clone(&inner));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Should bind ephemeral port");
        let addr = listener.local_addr().expect("Should have local address");
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Stub backend failed");
        });

        Self {
            inner,
            base_url: format!("http://{}", addr),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Answer `method path` with a JSON body
    pub fn on(&self, method: &str, path: &str, status: u16, body: Value) {
        self.on_raw(
            method,
            path,
            status,
            vec![("content-type".into(), "application/json".into())],
            body.to_string().into_bytes(),
        );
    }

    /// Answer with JSON text as written, keeping its key order
    pub fn on_json_text(&self, method: &str, path: &str, status: u16, body: &str) {
        self.on_raw(
            method,
            path,
            status,
            vec![("content-type".into(), "application/json".into())],
            body.as_bytes().to_vec(),
        );
    }

    /// Answer `method path` with arbitrary headers and bytes
    pub fn on_raw(
        &self,
        method: &str,
        path: &str,
        status: u16,
        headers: Vec<(String, String)>,
        body: Vec<u8>,
    ) {
        let canned = Canned {
            status: StatusCode::from_u16(status).expect("valid status"),
            headers,
            body,
            delay: None,
        };
        self.inner
            .lock()
            .unwrap()
            .routes
            .insert((method.to_string(), path.to_string()), canned);
    }

    /// Hold the response of an already-registered route
    pub fn delay(&self, method: &str, path: &str, delay: Duration) {
        let mut inner = self.inner.lock().unwrap();
        let route = inner
            .routes
            .get_mut(&(method.to_string(), path.to_string()))
            .expect("route must be registered before delaying it");
        route.delay = Some(delay);
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.inner.lock().unwrap().calls.clone()
    }

    /// Recorded calls to one route
    pub fn calls_to(&self, method: &str, path: &str) -> Vec<RecordedCall> {
        self.calls()
            .into_iter()
            .filter(|c| c.method == method && c.path == path)
            .collect()
    }
}

async fn dispatch(
    State(inner): State<Arc<Mutex<Inner>>>,
    method: Method,
    uri: Uri,
    body: Bytes,
) -> Response {
    let key = (method.as_str().to_string(), uri.path().to_string());
    let canned = {
        let mut inner = inner.lock().unwrap();
        inner.calls.push(RecordedCall {
            method: key.0.clone(),
            path: key.1.clone(),
            query: uri.query().map(str::to_string),
            body: body.to_vec(),
        });
        inner.routes.get(&key).cloned()
    };

    let Some(canned) = canned else {
        let body = json!({ "success": false, "error": "Not found" });
        return (StatusCode::NOT_FOUND, axum::Json(body)).into_response();
    };

    if let Some(delay) = canned.delay {
        tokio::time::sleep(delay).await;
    }

    let mut headers = HeaderMap::new();
    for (name, value) in &canned.headers {
        headers.insert(
            HeaderName::from_bytes(name.as_bytes()).expect("valid header name"),
            HeaderValue::from_str(value).expect("valid header value"),
        );
    }
    (canned.status, headers, canned.body).into_response()
}
