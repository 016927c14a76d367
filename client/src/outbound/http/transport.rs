//! Reqwest-backed HTTP transport adapter.
//!
//! This adapter owns transport details only: URL resolution against the API
//! base, header and JSON body serialisation, timeout and status mapping, and
//! JSON decoding of response bodies.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde_json::Value;
use tracing::debug;

use crate::domain::ports::{ApiRequest, ApiResponse, HttpTransport, Method, TransportError};

/// Parse `raw` as an API base URL, forcing a trailing slash so relative
/// endpoint paths resolve beneath it.
///
/// # Examples
/// ```
/// use grading_admin::outbound::http::normalise_base_url;
///
/// let base = normalise_base_url("http://localhost:8000/api").unwrap();
/// assert_eq!(base.as_str(), "http://localhost:8000/api/");
/// ```
///
/// # Errors
///
/// Returns an error when `raw` is not an absolute URL.
pub fn normalise_base_url(raw: &str) -> Result<Url, url::ParseError> {
    let mut url = Url::parse(raw.trim())?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/// Transport that sends every request to paths beneath one base URL.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
    base: Url,
}

impl ReqwestTransport {
    /// Build a transport using a reqwest client with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(base: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base })
    }

    fn resolve(&self, request: &ApiRequest) -> Result<Url, TransportError> {
        let path = request.path().trim_start_matches('/');
        let mut url = self.base.join(path).map_err(|error| {
            TransportError::network(format!("invalid request path {path:?}: {error}"))
        })?;
        if !request.query().is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in request.query() {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError> {
        let url = self.resolve(request)?;
        let mut builder = match request.method() {
            Method::Get => self.client.get(url),
            Method::Post => self.client.post(url),
        }
        .header(reqwest::header::ACCEPT, "application/json");
        for (name, value) in request.headers() {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body() {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(map_transport_error)?;
        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            debug!(
                status = status.as_u16(),
                body = %body_preview(body.as_ref()),
                path = request.path(),
                "api returned error status"
            );
            return Err(map_status_error(status, body.as_ref()));
        }

        Ok(ApiResponse::new(status.as_u16(), decode_body(body.as_ref())?))
    }
}

fn decode_body(body: &[u8]) -> Result<Value, TransportError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    serde_json::from_slice(body).map_err(|error| {
        TransportError::decode(format!(
            "invalid JSON payload ({error}): {}",
            body_preview(body)
        ))
    })
}

fn map_transport_error(error: reqwest::Error) -> TransportError {
    if error.is_timeout() {
        TransportError::timeout(error.to_string())
    } else {
        TransportError::network(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> TransportError {
    TransportError::status(status.as_u16(), String::from_utf8_lossy(body).into_owned())
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}

#[cfg(test)]
mod tests {
    //! Coverage for the non-network helpers; request round trips live in
    //! `tests/session_http.rs`.

    use super::*;
    use rstest::rstest;
    use serde_json::json;

    fn transport(base: &str) -> ReqwestTransport {
        let base = normalise_base_url(base).expect("valid base");
        ReqwestTransport::new(base, Duration::from_secs(5)).expect("client builds")
    }

    #[rstest]
    #[case("http://localhost:8000/api", "http://localhost:8000/api/")]
    #[case("http://localhost:8000/api/", "http://localhost:8000/api/")]
    #[case("  https://grading.example/  ", "https://grading.example/")]
    fn base_urls_gain_a_trailing_slash(#[case] raw: &str, #[case] expected: &str) {
        let base = normalise_base_url(raw).expect("valid base");
        assert_eq!(base.as_str(), expected);
    }

    #[rstest]
    fn relative_bases_are_rejected() {
        assert!(normalise_base_url("/api/").is_err());
    }

    #[rstest]
    #[case(ApiRequest::get("me/"), "http://localhost:8000/api/me/")]
    #[case(ApiRequest::get("/directions/"), "http://localhost:8000/api/directions/")]
    #[case(
        ApiRequest::get("directions/").with_query("search", "applied math"),
        "http://localhost:8000/api/directions/?search=applied+math"
    )]
    fn paths_resolve_beneath_the_base(#[case] request: ApiRequest, #[case] expected: &str) {
        let url = transport("http://localhost:8000/api")
            .resolve(&request)
            .expect("path resolves");
        assert_eq!(url.as_str(), expected);
    }

    #[rstest]
    fn error_statuses_keep_the_full_body() {
        let body = br#"{"detail": "Given token not valid for any token type"}"#;
        let error = map_status_error(StatusCode::UNAUTHORIZED, body);
        assert!(error.is_unauthorized());
        assert_eq!(
            error,
            TransportError::status(
                401_u16,
                r#"{"detail": "Given token not valid for any token type"}"#
            )
        );
    }

    #[rstest]
    #[case(&b""[..], Value::Null)]
    #[case(&b"  \n"[..], Value::Null)]
    #[case(&br#"{"id": 1}"#[..], json!({"id": 1}))]
    fn bodies_decode_to_json(#[case] body: &[u8], #[case] expected: Value) {
        assert_eq!(decode_body(body).expect("decodes"), expected);
    }

    #[rstest]
    fn malformed_bodies_are_decode_errors() {
        let error = decode_body(b"<html>oops</html>").expect_err("not json");
        assert!(matches!(error, TransportError::Decode { .. }));
    }

    #[rstest]
    fn previews_are_compacted_and_truncated() {
        let long = "word ".repeat(100);
        let preview = body_preview(long.as_bytes());
        assert!(preview.ends_with("..."));
        assert_eq!(body_preview(b"a \n  b"), "a b");
    }
}
