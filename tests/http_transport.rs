//! `HttpTransport` against a local tiny_http server.

use std::io::Read;
use std::sync::mpsc;
use std::thread;
use tiny_http::{Header, Response, Server};
use tracing_subscriber::EnvFilter;
use webpdf::{
    interpret_response, HttpTransport, ImageCandidate, Orchestrator, SnapshotConfig,
    SnapshotTransport, WebPdfError,
};

/// What the server saw for one request.
struct Captured {
    method: String,
    path: String,
    content_type: Option<String>,
    body: serde_json::Value,
}

/// Serve exactly one request with `status`/`body` and report what arrived.
fn serve_once(status: u16, body: &'static [u8]) -> (String, mpsc::Receiver<Captured>) {
    let server = Server::http("127.0.0.1:0").unwrap();
    let endpoint = format!("http://{}", server.server_addr());
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        if let Ok(mut req) = server.recv() {
            let mut raw = String::new();
            let _ = req.as_reader().read_to_string(&mut raw);
            let content_type = req
                .headers()
                .iter()
                .find(|h| h.field.equiv("Content-Type"))
                .map(|h| h.value.to_string());
            let captured = Captured {
                method: req.method().to_string(),
                path: req.url().to_string(),
                content_type,
                body: serde_json::from_str(&raw).unwrap_or(serde_json::Value::Null),
            };
            let header: Header = "Content-Type: application/pdf".parse().unwrap();
            let _ = req.respond(
                Response::from_data(body)
                    .with_status_code(status)
                    .with_header(header),
            );
            let _ = tx.send(captured);
        }
    });

    (endpoint, rx)
}

/// Route library logs through the test harness; `RUST_LOG` overrides.
fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("webpdf=debug")),
        )
        .with_test_writer()
        .try_init();
}

fn config(endpoint: &str) -> SnapshotConfig {
    SnapshotConfig::builder()
        .endpoint(endpoint)
        .request_timeout_secs(10)
        .build()
        .unwrap()
}

#[tokio::test]
async fn posts_json_and_returns_pdf_bytes() {
    init_logging();
    let (endpoint, rx) = serve_once(200, b"%PDF-1.7 local");
    let mut session = Orchestrator::from_config(config(&endpoint)).unwrap();
    session.set_url("https://www.rust-lang.org");
    session
        .add_images(vec![ImageCandidate::from_bytes(
            "dot.gif",
            "image/gif",
            b"GIF89a".to_vec(),
        )])
        .await;

    let info = session.submit().await.unwrap();
    assert_eq!(info.size_bytes, 14);
    assert_eq!(session.artifact().unwrap().bytes(), b"%PDF-1.7 local");

    let seen = rx.recv().unwrap();
    assert_eq!(seen.method, "POST");
    assert_eq!(seen.path, "/");
    assert_eq!(seen.content_type.as_deref(), Some("application/json"));
    assert_eq!(seen.body["url"], "https://www.rust-lang.org/");
    assert_eq!(seen.body["waitForTimeout"], 2000);
    assert_eq!(seen.body["pdfOptions"]["format"], "A4");
    assert_eq!(seen.body["pdfOptions"]["landscape"], false);
    assert_eq!(seen.body["pdfOptions"]["printBackground"], true);
    assert_eq!(seen.body["pdfOptions"]["displayHeaderFooter"], false);
    assert_eq!(seen.body["pdfOptions"]["margin"]["top"], "1cm");
    assert_eq!(seen.body["images"][0], "data:image/gif;base64,R0lGODlh");
}

#[tokio::test]
async fn status_codes_are_classified() {
    init_logging();
    let cases: [(u16, &'static [u8]); 4] = [
        (429, b"rate limited"),
        (502, b"<html>bad gateway</html>"),
        (413, b"too big"),
        (200, b""),
    ];

    for (status, body) in cases {
        let (endpoint, _rx) = serve_once(status, body);
        let transport = HttpTransport::new(&config(&endpoint)).unwrap();
        let mut session = Orchestrator::from_config(config(&endpoint)).unwrap();
        session.set_url("https://example.org");
        let request = session.build_request().unwrap();

        let response = transport.send(&request).await.unwrap();
        assert_eq!(response.status, status);

        let err = interpret_response(response).unwrap_err();
        match status {
            429 => assert!(matches!(err, WebPdfError::RateLimited)),
            502 => assert!(matches!(err, WebPdfError::UpstreamUnavailable)),
            413 => assert!(matches!(err, WebPdfError::PayloadTooLarge)),
            _ => assert!(matches!(err, WebPdfError::EmptyArtifact)),
        }
    }
}

#[tokio::test]
async fn other_failures_surface_the_response_text() {
    init_logging();
    let (endpoint, _rx) = serve_once(500, b"Navigation timeout of 30000 ms exceeded");
    let mut session = Orchestrator::from_config(config(&endpoint)).unwrap();
    session.set_url("https://example.org");

    let err = session.submit().await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "Error: Navigation timeout of 30000 ms exceeded"
    );
    assert_eq!(session.status().message, err.to_string());
}

#[tokio::test]
async fn unreachable_endpoint_is_a_transport_error() {
    init_logging();
    // Bind then drop to get a port nobody listens on.
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let endpoint = format!("http://127.0.0.1:{port}");
    let mut session = Orchestrator::from_config(config(&endpoint)).unwrap();
    session.set_url("https://example.org");

    let err = session.submit().await.unwrap_err();
    assert!(matches!(err, WebPdfError::Transport { .. }), "got {err:?}");
    assert!(session.artifact().is_none());
}
