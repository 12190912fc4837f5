use std::sync::{Arc, Mutex};

use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use sms_smoke::{Client, DONE_LINE, Invoker, InvokerConfig, Outcome, RestErrorKind, SmsRequest};
use tokio::net::TcpListener;

#[derive(Clone, Debug)]
struct Received {
    content_type: Option<String>,
    body: Bytes,
}

#[derive(Clone, Default)]
struct AppState {
    received: Arc<Mutex<Vec<Received>>>,
}

async fn run(config: &InvokerConfig) -> (Outcome, String) {
    let invoker = Invoker::new(Client::new());
    let mut out = Vec::new();
    let outcome = invoker
        .send_sms(config, &mut out)
        .await
        .expect("transcript should be written");
    (outcome, String::from_utf8(out).expect("utf-8 transcript"))
}

#[tokio::test]
async fn e2e_send_sms_success_roundtrip() {
    let server = TestServer::start().await;
    let config = InvokerConfig {
        url: server.url("/notifications/send-sms/"),
        ..InvokerConfig::default()
    };

    let (outcome, transcript) = run(&config).await;

    assert_eq!(outcome, Outcome::Responded { status: 200 });
    assert!(transcript.contains(r#"{"status":"success","message":"SMS sent"}"#));
    assert!(transcript.ends_with("Done.\n"));

    let received = server.received();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].content_type.as_deref(), Some("application/json"));
    let parsed: SmsRequest = sonic_rs::from_slice(&received[0].body).expect("json body");
    assert_eq!(parsed, SmsRequest::default());
}

#[tokio::test]
async fn e2e_server_error_still_completes() {
    let server = TestServer::start().await;
    let config = InvokerConfig {
        url: server.url("/notifications/fail/"),
        ..InvokerConfig::default()
    };

    let (outcome, transcript) = run(&config).await;

    assert_eq!(outcome, Outcome::Responded { status: 500 });
    assert_eq!(outcome.exit_code(), 0);
    assert_eq!(transcript.lines().last(), Some(DONE_LINE));
}

#[tokio::test]
async fn e2e_unreachable_endpoint_still_completes() {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind probe listener");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);

    let config = InvokerConfig {
        url: format!("http://{addr}/notifications/send-sms/"),
        ..InvokerConfig::default()
    };

    let (outcome, transcript) = run(&config).await;

    assert_eq!(
        outcome,
        Outcome::Failed {
            kind: RestErrorKind::Connect
        }
    );
    assert_eq!(outcome.exit_code(), 7);
    assert!(transcript.contains("error: "));
    assert_eq!(transcript.lines().last(), Some(DONE_LINE));
}

struct TestServer {
    base_url: String,
    state: AppState,
    task: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn start() -> Self {
        let state = AppState::default();
        let app = Router::new()
            .route("/notifications/send-sms/", post(send_sms_handler))
            .route("/notifications/fail/", post(failing_handler))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind test listener");
        let addr = listener.local_addr().expect("local addr");
        let base_url = format!("http://{}", addr);

        let task = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            base_url,
            state,
            task,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn received(&self) -> Vec<Received> {
        self.state
            .received
            .lock()
            .expect("received log mutex poisoned")
            .clone()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn send_sms_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, &'static str) {
    let content_type = headers
        .get("content-type")
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    state
        .received
        .lock()
        .expect("received log mutex poisoned")
        .push(Received { content_type, body });
    (StatusCode::OK, r#"{"status":"success","message":"SMS sent"}"#)
}

async fn failing_handler() -> (StatusCode, &'static str) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        r#"{"status":"error","message":"Failed to send SMS"}"#,
    )
}
