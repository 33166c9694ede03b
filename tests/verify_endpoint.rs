//! End-to-end checks of the reqwest transport against a local stub endpoint.

use std::collections::HashMap;
use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

use adcaptcha::{
    AdCaptcha, DEFAULT_ERROR_MESSAGE, FailureReason, OutcomeCounter, VerificationOutcome,
};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

const VERIFIED: &str = r#"{"message":"Token verified"}"#;
const INVALID: &str = r#"{"message":"Token invalid"}"#;

#[derive(Debug)]
struct CapturedRequest {
    request_line: String,
    headers: HashMap<String, String>,
    body: String,
}

/// Serves the scripted responses, one connection each, then returns what it saw.
async fn stub_endpoint(
    responses: Vec<(u16, &'static str)>,
) -> Result<(String, JoinHandle<Vec<CapturedRequest>>), Box<dyn Error>> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let url = format!("http://{}/v1/verify", listener.local_addr()?);

    let handle = tokio::spawn(async move {
        let mut captured = Vec::new();
        for (status, body) in responses {
            let (mut stream, _) = listener.accept().await.expect("accept");
            captured.push(read_request(&mut stream).await);
            let response = format!(
                "HTTP/1.1 {status} Stub\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(response.as_bytes()).await.expect("write");
            stream.shutdown().await.ok();
        }
        captured
    });

    Ok((url, handle))
}

async fn read_request(stream: &mut TcpStream) -> CapturedRequest {
    let mut raw = Vec::new();
    let mut chunk = [0u8; 1024];

    let header_end = loop {
        let read = stream.read(&mut chunk).await.expect("read");
        assert!(read > 0, "connection closed before headers");
        raw.extend_from_slice(&chunk[..read]);
        if let Some(pos) = raw.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos;
        }
    };

    let head = String::from_utf8_lossy(&raw[..header_end]).to_string();
    let mut lines = head.split("\r\n");
    let request_line = lines.next().unwrap_or_default().to_string();
    let headers: HashMap<String, String> = lines
        .filter_map(|line| line.split_once(':'))
        .map(|(name, value)| (name.trim().to_ascii_lowercase(), value.trim().to_string()))
        .collect();

    let length: usize = headers
        .get("content-length")
        .and_then(|value| value.parse().ok())
        .unwrap_or(0);
    let mut body = raw[header_end + 4..].to_vec();
    while body.len() < length {
        let read = stream.read(&mut chunk).await.expect("read body");
        assert!(read > 0, "connection closed before body");
        body.extend_from_slice(&chunk[..read]);
    }

    CapturedRequest {
        request_line,
        headers,
        body: String::from_utf8_lossy(&body).to_string(),
    }
}

fn client_for(url: &str, counter: &OutcomeCounter) -> AdCaptcha {
    AdCaptcha::builder()
        .with_api_key("test-api-key")
        .with_placement_id("PL-test")
        .with_verify_url(url)
        .with_event_handler(Arc::new(counter.clone()))
        .build()
        .expect("build adcaptcha")
}

#[tokio::test]
async fn verified_token_posts_json_with_bearer_key() -> Result<(), Box<dyn Error>> {
    let (url, server) = stub_endpoint(vec![(200, VERIFIED)]).await?;
    let counter = OutcomeCounter::new();
    let adcaptcha = client_for(&url, &counter);

    assert!(adcaptcha.verify_token("success-token").await);

    let requests = server.await?;
    let request = &requests[0];
    assert!(request.request_line.starts_with("POST /v1/verify "));
    assert_eq!(request.headers["authorization"], "Bearer test-api-key");
    assert_eq!(request.headers["content-type"], "application/json");
    let body: serde_json::Value = serde_json::from_str(&request.body)?;
    assert_eq!(body, serde_json::json!({ "token": "success-token" }));
    assert_eq!(counter.snapshot().verified, 1);
    Ok(())
}

#[tokio::test]
async fn error_status_is_not_verified_even_with_success_body() -> Result<(), Box<dyn Error>> {
    let (url, server) = stub_endpoint(vec![(500, VERIFIED)]).await?;
    let adcaptcha = client_for(&url, &OutcomeCounter::new());

    assert_eq!(
        adcaptcha.verify_token_outcome("tok").await,
        VerificationOutcome::NotVerified(FailureReason::Status(500))
    );
    server.await?;
    Ok(())
}

#[tokio::test]
async fn malformed_body_is_not_verified() -> Result<(), Box<dyn Error>> {
    let (url, server) = stub_endpoint(vec![(200, "<html>oops</html>")]).await?;
    let adcaptcha = client_for(&url, &OutcomeCounter::new());

    assert_eq!(
        adcaptcha.verify_token_outcome("tok").await,
        VerificationOutcome::NotVerified(FailureReason::MalformedBody)
    );
    server.await?;
    Ok(())
}

#[tokio::test]
async fn unreachable_endpoint_is_not_verified() -> Result<(), Box<dyn Error>> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let url = format!("http://{}/v1/verify", listener.local_addr()?);
    drop(listener);

    let counter = OutcomeCounter::new();
    let adcaptcha = client_for(&url, &counter);

    assert!(!adcaptcha.verify_token("tok").await);
    assert_eq!(counter.snapshot().rejected, 1);
    Ok(())
}

#[tokio::test]
async fn empty_token_still_reaches_the_endpoint() -> Result<(), Box<dyn Error>> {
    let (url, server) = stub_endpoint(vec![(200, INVALID)]).await?;
    let adcaptcha = client_for(&url, &OutcomeCounter::new());

    let rejected = adcaptcha.guard().check_body(b"comment=hi").await.unwrap_err();
    assert_eq!(rejected.message, DEFAULT_ERROR_MESSAGE);

    let requests = server.await?;
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].body, r#"{"token":""}"#);
    Ok(())
}

#[tokio::test]
async fn sequential_submissions_are_judged_independently() -> Result<(), Box<dyn Error>> {
    let (url, server) = stub_endpoint(vec![(200, VERIFIED), (200, INVALID)]).await?;
    let counter = OutcomeCounter::new();
    let adcaptcha = client_for(&url, &counter);

    assert!(adcaptcha.verify_token("first").await);
    assert!(!adcaptcha.verify_token("second").await);

    let requests = server.await?;
    assert!(requests[0].body.contains("first"));
    assert!(requests[1].body.contains("second"));
    assert_eq!(counter.snapshot().verified, 1);
    assert_eq!(counter.snapshot().rejected, 1);
    Ok(())
}

#[tokio::test]
async fn sub_second_timeout_still_verifies() -> Result<(), Box<dyn Error>> {
    let (url, server) = stub_endpoint(vec![(200, VERIFIED)]).await?;
    let adcaptcha = AdCaptcha::builder()
        .with_api_key("test-api-key")
        .with_verify_url(url)
        .with_timeout(Duration::from_millis(500))
        .build()?;

    assert_eq!(adcaptcha.config().timeout(), Some(Duration::from_millis(500)));
    assert_eq!(
        adcaptcha.verify_token_outcome("tok").await,
        VerificationOutcome::Verified
    );
    server.await?;
    Ok(())
}
