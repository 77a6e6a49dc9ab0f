use anyhow::Context;
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde_json::Value;
use tracing::debug;

use crate::model::FetchRequest;

use super::{FetchError, WeatherFetcher};

/// Fetches current weather from the HG Brasil weather endpoint.
#[derive(Debug, Clone)]
pub struct HgBrasilFetcher {
    endpoint: Url,
    http: Client,
}

impl HgBrasilFetcher {
    pub fn new(endpoint: String) -> anyhow::Result<Self> {
        let endpoint = Url::parse(&endpoint)
            .with_context(|| format!("Invalid endpoint '{endpoint}'"))?;

        Ok(Self { endpoint, http: Client::new() })
    }
}

#[async_trait]
impl WeatherFetcher for HgBrasilFetcher {
    async fn fetch(&self, request: &FetchRequest) -> Result<Value, FetchError> {
        debug!(city = %request.city_id, endpoint = %self.endpoint, "requesting weather");

        let res = self
            .http
            .get(self.endpoint.clone())
            .query(&[("key", request.api_key.as_str()), ("city_name", request.city_id.as_str())])
            .timeout(request.timeout)
            .send()
            .await
            .map_err(classify)?;

        let status = res.status();
        let body = res.text().await.map_err(classify)?;

        if !status.is_success() {
            return Err(FetchError::Status { status: status.as_u16(), body: truncate_body(&body) });
        }

        serde_json::from_str(&body).map_err(|e| FetchError::Decode(Box::new(e)))
    }
}

fn classify(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        FetchError::Timeout
    } else if err.is_decode() || err.is_body() {
        FetchError::Decode(Box::new(err))
    } else {
        FetchError::Connection(Box::new(err))
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((cut, _)) => format!("{}...", &body[..cut]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::{
        io::{AsyncReadExt, AsyncWriteExt},
        net::TcpListener,
        sync::oneshot,
    };

    /// Serve a single canned HTTP response and hand back the request line.
    async fn serve_once(status: &'static str, body: &'static str) -> (String, oneshot::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = oneshot::channel();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 4096];
            let n = socket.read(&mut buf).await.unwrap();
            let head = String::from_utf8_lossy(&buf[..n]);
            let _ = tx.send(head.lines().next().unwrap_or_default().to_string());

            let response = format!(
                "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
        });

        (format!("http://{addr}/weather"), rx)
    }

    fn request(timeout: Duration) -> FetchRequest {
        FetchRequest { city_id: "recife".into(), api_key: "KEY".into(), timeout }
    }

    #[tokio::test]
    async fn fetch_returns_envelope_and_sends_query() {
        let (endpoint, request_line) =
            serve_once("200 OK", r#"{"by":"default","results":{"temp":27}}"#).await;
        let fetcher = HgBrasilFetcher::new(endpoint).unwrap();

        let envelope = fetcher.fetch(&request(Duration::from_secs(5))).await.unwrap();
        assert_eq!(envelope["results"]["temp"], 27);

        let line = request_line.await.unwrap();
        assert!(line.starts_with("GET /weather?"));
        assert!(line.contains("key=KEY"));
        assert!(line.contains("city_name=recife"));
    }

    #[tokio::test]
    async fn non_success_status_is_reported() {
        let (endpoint, _) = serve_once("503 Service Unavailable", r#"{"error":true}"#).await;
        let fetcher = HgBrasilFetcher::new(endpoint).unwrap();

        let err = fetcher.fetch(&request(Duration::from_secs(5))).await.unwrap_err();
        assert!(matches!(err, FetchError::Status { status: 503, .. }));
    }

    #[tokio::test]
    async fn invalid_json_is_a_decode_error() {
        let (endpoint, _) = serve_once("200 OK", "<html>oops</html>").await;
        let fetcher = HgBrasilFetcher::new(endpoint).unwrap();

        let err = fetcher.fetch(&request(Duration::from_secs(5))).await.unwrap_err();
        assert!(matches!(err, FetchError::Decode(_)));
    }

    #[tokio::test]
    async fn silent_server_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let endpoint = format!("http://{}/weather", listener.local_addr().unwrap());
        tokio::spawn(async move {
            let (_socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(30)).await;
        });

        let fetcher = HgBrasilFetcher::new(endpoint).unwrap();
        let err = fetcher.fetch(&request(Duration::from_millis(100))).await.unwrap_err();
        assert!(matches!(err, FetchError::Timeout));
    }

    #[test]
    fn truncate_body_respects_char_boundaries() {
        let long = "é".repeat(300);
        let cut = truncate_body(&long);
        assert!(cut.ends_with("..."));
        assert_eq!(cut.chars().count(), 203);
        assert_eq!(truncate_body("short"), "short");
    }
}
