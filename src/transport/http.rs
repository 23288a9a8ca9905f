// src/transport/http.rs

//! reqwest-backed transport.

use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, HeaderValue};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use url::Url;

use crate::error::{AppError, Result};
use crate::models::ApiConfig;
use crate::transport::{ApiRequest, Method, Transport};
use crate::utils::http::{create_client, endpoint, parse_base_url};

/// Transport that sends requests to a backend over HTTP.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: Url,
}

impl HttpTransport {
    /// Build a transport from API configuration.
    pub fn new(config: &ApiConfig) -> Result<Self> {
        Ok(Self {
            client: create_client(config)?,
            base_url: parse_base_url(&config.base_url)?,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn method(method: Method) -> reqwest::Method {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &ApiRequest) -> Result<Option<Value>> {
        let url = endpoint(&self.base_url, &request.path)?;
        log::debug!("{} {}", request.method, url);

        let mut builder = self
            .client
            .request(Self::method(request.method), url.clone());
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if request.method.is_mutation() {
            builder = builder.header(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(AppError::NotFound(url.to_string()));
        }
        if !status.is_success() {
            return Err(AppError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let bytes = response.bytes().await?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }
        Ok(Some(serde_json::from_slice(&bytes)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Serve a single canned response and hand back the raw request text.
    async fn serve_once(
        status: &'static str,
        body: &'static str,
    ) -> (HttpTransport, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let config = ApiConfig {
            base_url: format!("http://{}/", listener.local_addr().unwrap()),
            ..ApiConfig::default()
        };

        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut raw = Vec::new();
            let mut buf = [0u8; 1024];
            while !request_complete(&raw) {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                raw.extend_from_slice(&buf[..n]);
            }

            let response = format!(
                "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
            String::from_utf8_lossy(&raw).into_owned()
        });

        (HttpTransport::new(&config).unwrap(), server)
    }

    fn request_complete(raw: &[u8]) -> bool {
        let text = String::from_utf8_lossy(raw).to_ascii_lowercase();
        let Some(end) = text.find("\r\n\r\n") else {
            return false;
        };
        let length = text[..end]
            .lines()
            .find_map(|line| line.strip_prefix("content-length:"))
            .and_then(|value| value.trim().parse::<usize>().ok())
            .unwrap_or(0);
        raw.len() >= end + 4 + length
    }

    fn request_line(raw: &str) -> &str {
        raw.lines().next().unwrap_or_default()
    }

    fn has_json_content_type(raw: &str) -> bool {
        raw.to_ascii_lowercase()
            .contains("content-type: application/json")
    }

    #[tokio::test]
    async fn test_send_encodes_name_query() {
        let (transport, server) = serve_once("200 OK", r#"[{"id":11,"name":"Dr Nice"}]"#).await;

        let body = transport
            .send(&ApiRequest::get("api/memheroes/").with_query("name", "a b"))
            .await
            .unwrap();
        let raw = server.await.unwrap();

        assert_eq!(request_line(&raw), "GET /api/memheroes/?name=a+b HTTP/1.1");
        assert!(!has_json_content_type(&raw));
        assert_eq!(body, Some(json!([{ "id": 11, "name": "Dr Nice" }])));
    }

    #[tokio::test]
    async fn test_send_id_filter() {
        let (transport, server) = serve_once("200 OK", "[]").await;

        let body = transport
            .send(&ApiRequest::get("api/memheroes/").with_query("id", 12))
            .await
            .unwrap();

        assert_eq!(
            request_line(&server.await.unwrap()),
            "GET /api/memheroes/?id=12 HTTP/1.1"
        );
        assert_eq!(body, Some(json!([])));
    }

    #[tokio::test]
    async fn test_put_sends_json_and_accepts_empty_body() {
        let (transport, server) = serve_once("200 OK", "").await;

        let body = transport
            .send(&ApiRequest::put(
                "api/memheroes",
                json!({ "id": 12, "name": "Narcotic" }),
            ))
            .await
            .unwrap();
        let raw = server.await.unwrap();

        assert_eq!(request_line(&raw), "PUT /api/memheroes HTTP/1.1");
        assert!(has_json_content_type(&raw));
        assert!(raw.ends_with(r#"{"id":12,"name":"Narcotic"}"#));
        assert_eq!(body, None);
    }

    #[tokio::test]
    async fn test_delete_carries_json_content_type() {
        let (transport, server) = serve_once("200 OK", "  ").await;

        let body = transport
            .send(&ApiRequest::delete("api/memheroes/3"))
            .await
            .unwrap();
        let raw = server.await.unwrap();

        assert_eq!(request_line(&raw), "DELETE /api/memheroes/3 HTTP/1.1");
        assert!(has_json_content_type(&raw));
        assert_eq!(body, None);
    }

    #[tokio::test]
    async fn test_not_found_maps_to_not_found() {
        let (transport, server) = serve_once("404 Not Found", "").await;

        let result = transport.send(&ApiRequest::get("api/memheroes/99")).await;
        server.await.unwrap();

        assert!(matches!(result, Err(AppError::NotFound(url)) if url.ends_with("/api/memheroes/99")));
    }

    #[tokio::test]
    async fn test_server_error_maps_to_status() {
        let (transport, server) = serve_once("500 Internal Server Error", "").await;

        let result = transport.send(&ApiRequest::get("api/memheroes")).await;
        server.await.unwrap();

        assert!(matches!(result, Err(AppError::Status { status: 500, .. })));
    }

    #[test]
    fn test_new_normalizes_base_url() {
        let config = ApiConfig {
            base_url: "http://localhost:5000/app".to_string(),
            ..ApiConfig::default()
        };
        let transport = HttpTransport::new(&config).unwrap();
        assert_eq!(transport.base_url().as_str(), "http://localhost:5000/app/");
    }

    #[test]
    fn test_new_rejects_invalid_base_url() {
        let config = ApiConfig {
            base_url: "::nope::".to_string(),
            ..ApiConfig::default()
        };
        assert!(HttpTransport::new(&config).is_err());
    }
}
