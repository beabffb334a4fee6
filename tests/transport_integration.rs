//! Integration tests for the retrying transport.

mod support;
use support::socket_guard::{should_skip_socket_bound_test, start_mock_server_or_skip};

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use lms_mirror::crawler::{Materialized, write_file};
use lms_mirror::{PortalConfig, RetryPolicy, Session, Transport, TransportError};
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

fn session() -> Session {
    Session::new(&PortalConfig::default()).expect("session should build")
}

#[tokio::test]
async fn test_get_gives_up_after_five_attempts() {
    let Some(mock_server) = start_mock_server_or_skip().await else {
        return;
    };

    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(500))
        .expect(5)
        .mount(&mock_server)
        .await;

    let url = format!("{}/flaky", mock_server.uri());
    let error = Transport::default()
        .get(&session(), &url)
        .await
        .expect_err("persistent 500 should exhaust retries");

    match &error {
        TransportError::Exhausted { attempts, .. } => assert_eq!(*attempts, 5),
        other => panic!("expected Exhausted, got {other:?}"),
    }
    assert_eq!(error.status(), Some(500));
}

#[tokio::test]
async fn test_get_succeeds_after_transient_failures() {
    let Some(mock_server) = start_mock_server_or_skip().await else {
        return;
    };

    Mock::given(method("GET"))
        .and(path("/listing"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .expect(2)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/listing"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let url = format!("{}/listing", mock_server.uri());
    let response = Transport::default()
        .get(&session(), &url)
        .await
        .expect("third attempt should succeed");

    assert_eq!(response.status().as_u16(), 200);
    assert_eq!(response.text().await.expect("body"), "ok");
}

#[tokio::test]
async fn test_custom_retry_bound_is_respected() {
    let Some(mock_server) = start_mock_server_or_skip().await else {
        return;
    };

    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .expect(2)
        .mount(&mock_server)
        .await;

    let transport = Transport::new(RetryPolicy::with_max_attempts(2));
    let url = format!("{}/missing", mock_server.uri());
    let error = transport
        .get(&session(), &url)
        .await
        .expect_err("404 should fail after two attempts");

    assert_eq!(error.status(), Some(404));
}

#[tokio::test]
async fn test_head_returns_headers_without_body() {
    let Some(mock_server) = start_mock_server_or_skip().await else {
        return;
    };

    Mock::given(method("HEAD"))
        .and(path("/download/file_1"))
        .respond_with(ResponseTemplate::new(200).insert_header("content-type", "application/pdf"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let url = format!("{}/download/file_1", mock_server.uri());
    let response = Transport::default()
        .head(&session(), &url)
        .await
        .expect("HEAD should succeed");

    assert_eq!(
        response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok()),
        Some("application/pdf")
    );
}

#[tokio::test]
async fn test_get_follows_redirects_to_final_url() {
    let Some(mock_server) = start_mock_server_or_skip().await else {
        return;
    };

    let target = format!("{}/forum/7", mock_server.uri());
    Mock::given(method("GET"))
        .and(path("/goto/forum"))
        .respond_with(ResponseTemplate::new(302).insert_header("location", target.as_str()))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/forum/7"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let url = format!("{}/goto/forum", mock_server.uri());
    let response = Transport::default()
        .get(&session(), &url)
        .await
        .expect("redirect chain should succeed");

    assert_eq!(response.url().as_str(), target);
}

#[tokio::test]
async fn test_invalid_url_sends_no_request() {
    let error = Transport::default()
        .get(&session(), "not a url")
        .await
        .expect_err("invalid URL must fail");

    assert!(matches!(error, TransportError::InvalidUrl { .. }));
}

/// Serves a fixed-length body in `chunks` pieces, pausing `gap` before each.
/// Returns the file URL and a counter of accepted connections.
async fn spawn_trickle_server(
    chunks: usize,
    chunk: &'static [u8],
    gap: Duration,
) -> (String, Arc<AtomicUsize>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    let connections = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&connections);

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            counter.fetch_add(1, Ordering::SeqCst);
            tokio::spawn(async move {
                let mut request = [0_u8; 2048];
                let _ = socket.read(&mut request).await;
                let head = format!(
                    "HTTP/1.1 200 OK\r\ncontent-type: video/mp4\r\ncontent-length: {}\r\nconnection: close\r\n\r\n",
                    chunks * chunk.len()
                );
                if socket.write_all(head.as_bytes()).await.is_err() {
                    return;
                }
                for _ in 0..chunks {
                    tokio::time::sleep(gap).await;
                    if socket.write_all(chunk).await.is_err() {
                        return;
                    }
                    let _ = socket.flush().await;
                }
            });
        }
    });

    (format!("http://{addr}/goto/download/lecture_1"), connections)
}

#[tokio::test]
async fn test_slow_body_longer_than_read_timeout_still_completes() {
    if should_skip_socket_bound_test() {
        return;
    }
    let (url, connections) =
        spawn_trickle_server(3, b"0123456789", Duration::from_millis(700)).await;
    // Each gap stays under the 1 s read timeout while the whole transfer exceeds it.
    let config = PortalConfig::default().with_timeouts(1, 1);
    let session = Session::new(&config).expect("session should build");
    let transport = Transport::from_config(&config);
    let temp = TempDir::new().expect("temp dir");
    let target = temp.path().join("Lecture.mp4");

    let outcome = write_file(&transport, &session, &target, &url)
        .await
        .expect("slow but steady download should succeed");

    assert_eq!(outcome, Materialized::Created);
    assert_eq!(
        std::fs::read(&target).expect("file written"),
        b"012345678901234567890123456789"
    );
    assert_eq!(connections.load(Ordering::SeqCst), 1);
}
