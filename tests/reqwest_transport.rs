use std::time::Duration;

use sms_smoke::{Client, DONE_LINE, Invoker, InvokerConfig, Outcome, RestErrorKind};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

async fn run(config: &InvokerConfig) -> (Outcome, String) {
    let invoker = Invoker::new(Client::new());
    let mut out = Vec::new();
    let outcome = invoker
        .send_sms(config, &mut out)
        .await
        .expect("transcript should be written");
    (outcome, String::from_utf8(out).expect("utf-8 transcript"))
}

fn config_for(url: String, timeout: Option<Duration>) -> InvokerConfig {
    InvokerConfig {
        url,
        timeout,
        ..InvokerConfig::default()
    }
}

#[tokio::test]
async fn malformed_url_is_internal_not_a_send_failure() {
    let (outcome, transcript) = run(&config_for("not a url".to_string(), None)).await;

    assert_eq!(
        outcome,
        Outcome::Failed {
            kind: RestErrorKind::Internal
        }
    );
    assert_eq!(outcome.exit_code(), 1);
    assert!(transcript.contains("error: builder error"), "{transcript}");
    assert_eq!(transcript.lines().last(), Some(DONE_LINE));
}

#[tokio::test]
async fn closed_port_maps_to_connect() {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind listener");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);

    let (outcome, _) = run(&config_for(format!("http://{addr}/notifications/send-sms/"), None)).await;

    assert_eq!(outcome.exit_code(), 7);
}

#[tokio::test]
async fn silent_server_maps_to_timeout() {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind listener");
    let addr = listener.local_addr().expect("local addr");
    let server = tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((stream, _)) = listener.accept().await {
            held.push(stream);
        }
    });

    let (outcome, transcript) = run(&config_for(
        format!("http://{addr}/notifications/send-sms/"),
        Some(Duration::from_millis(300)),
    ))
    .await;
    server.abort();

    assert_eq!(
        outcome,
        Outcome::Failed {
            kind: RestErrorKind::Timeout
        }
    );
    assert_eq!(outcome.exit_code(), 28);
    assert_eq!(transcript.lines().last(), Some(DONE_LINE));
}

#[tokio::test]
async fn truncated_body_maps_to_receive() {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind listener");
    let addr = listener.local_addr().expect("local addr");
    let server = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.expect("accept");
        let mut request = vec![0u8; 4096];
        let _ = stream.read(&mut request).await;
        stream
            .write_all(b"HTTP/1.1 200 OK\r\ncontent-length: 100\r\n\r\n{\"status\":")
            .await
            .expect("write partial response");
        stream.shutdown().await.ok();
    });

    let (outcome, transcript) = run(&config_for(
        format!("http://{addr}/notifications/send-sms/"),
        Some(Duration::from_secs(5)),
    ))
    .await;
    server.abort();

    assert_eq!(
        outcome,
        Outcome::Failed {
            kind: RestErrorKind::Receive
        }
    );
    assert_eq!(outcome.exit_code(), 56);
    assert_eq!(transcript.lines().last(), Some(DONE_LINE));
}
