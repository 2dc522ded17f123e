//! Forwards requests that pass the gate to the storefront upstream.

use std::time::Duration;

use axum::body::{Body, Bytes};
use axum::extract::rejection::{BytesRejection, FailedToBufferBody};
use axum::extract::{FromRequest, Request};
use axum::http::{self, header, HeaderMap, HeaderName};
use axum::response::Response;
use thiserror::Error;

/// Largest request body forwarded upstream (checkout and review payloads).
/// The router installs it as the `DefaultBodyLimit`.
pub const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Connection-scoped headers that must not be forwarded
const HOP_BY_HOP: [HeaderName; 9] = [
    header::CONNECTION,
    header::HOST,
    header::PROXY_AUTHENTICATE,
    header::PROXY_AUTHORIZATION,
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
    header::UPGRADE,
    header::CONTENT_LENGTH,
];

#[derive(Debug, Error)]
pub enum ForwardError {
    #[error("request body too large")]
    TooLarge,

    #[error("failed to read request body: {0}")]
    Body(BytesRejection),

    #[error("upstream request failed: {0}")]
    Upstream(#[from] reqwest::Error),

    #[error("invalid upstream response: {0}")]
    Response(#[from] axum::http::Error),
}

#[derive(Debug, Clone)]
pub struct Upstream {
    client: reqwest::Client,
    base_url: String,
}

impl Upstream {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ForwardError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send `request` upstream and relay the response, status and headers included.
    pub async fn forward(&self, request: Request) -> Result<Response, ForwardError> {
        let path_and_query = request
            .uri()
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or("/");
        let url = format!("{}{}", self.base_url, path_and_query);
        let method = request.method().clone();
        let headers = without_hop_by_hop(request.headers().clone());
        let body = read_body(request).await?;

        let upstream = self
            .client
            .request(method, url)
            .headers(headers)
            .body(body)
            .send()
            .await?;

        let status = upstream.status();
        let headers = without_hop_by_hop(upstream.headers().clone());
        let bytes = upstream.bytes().await?;

        let mut builder = http::Response::builder().status(status);
        if let Some(response_headers) = builder.headers_mut() {
            response_headers.extend(headers);
        }
        Ok(builder.body(Body::from(bytes))?)
    }
}

/// Buffer the request body, honouring the `DefaultBodyLimit` the router sets.
async fn read_body(request: Request) -> Result<Bytes, ForwardError> {
    match Bytes::from_request(request, &()).await {
        Ok(bytes) => Ok(bytes),
        Err(BytesRejection::FailedToBufferBody(FailedToBufferBody::LengthLimitError(_))) => {
            Err(ForwardError::TooLarge)
        }
        Err(e) => Err(ForwardError::Body(e)),
    }
}

fn without_hop_by_hop(mut headers: HeaderMap) -> HeaderMap {
    for name in HOP_BY_HOP {
        headers.remove(name);
    }
    headers.remove("keep-alive");
    headers
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use axum::http::{Method, Request, StatusCode};
    use wiremock::matchers::{body_string, header as header_is, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn upstream(server: &MockServer) -> Upstream {
        Upstream::new(format!("{}/", server.uri()), Duration::from_secs(2)).unwrap()
    }

    #[test]
    fn test_strips_hop_by_hop_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONNECTION, "keep-alive".parse().unwrap());
        headers.insert("keep-alive", "timeout=5".parse().unwrap());
        headers.insert(header::HOST, "shop.example.com".parse().unwrap());
        headers.insert(header::ACCEPT_LANGUAGE, "ar".parse().unwrap());

        let kept = without_hop_by_hop(headers);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[header::ACCEPT_LANGUAGE], "ar");
    }

    #[tokio::test]
    async fn test_forwards_path_query_and_headers() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/en/products"))
            .and(query_param("page", "2"))
            .and(header_is("user-agent", "Mozilla/5.0"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("x-storefront", "1")
                    .set_body_string("<html>products</html>"),
            )
            .expect(1)
            .mount(&server)
            .await;

        let request = Request::builder()
            .method(Method::GET)
            .uri("/en/products?page=2")
            .header(header::USER_AGENT, "Mozilla/5.0")
            .body(Body::empty())
            .unwrap();

        let response = upstream(&server).forward(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["x-storefront"], "1");

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"<html>products</html>");
    }

    #[tokio::test]
    async fn test_forwards_body_and_method() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/reviews"))
            .and(body_string(r#"{"rating":5}"#))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/reviews")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"rating":5}"#))
            .unwrap();

        let response = upstream(&server).forward(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    #[tokio::test]
    async fn test_upstream_redirects_are_relayed_not_followed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/en/checkout"))
            .respond_with(ResponseTemplate::new(307).insert_header("location", "/en/login"))
            .mount(&server)
            .await;

        let request = Request::builder()
            .uri("/en/checkout")
            .body(Body::empty())
            .unwrap();

        let response = upstream(&server).forward(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(response.headers()[header::LOCATION], "/en/login");
    }

    #[tokio::test]
    async fn test_oversized_body_is_not_forwarded() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/reviews")
            .body(Body::from(vec![b'x'; MAX_BODY_BYTES + 1]))
            .unwrap();

        assert!(matches!(
            upstream(&server).forward(request).await,
            Err(ForwardError::TooLarge)
        ));
    }

    #[tokio::test]
    async fn test_unreachable_upstream() {
        let upstream = Upstream::new("http://127.0.0.1:1", Duration::from_millis(500)).unwrap();
        let request = Request::builder().uri("/en").body(Body::empty()).unwrap();

        assert!(matches!(
            upstream.forward(request).await,
            Err(ForwardError::Upstream(_))
        ));
    }
}
