//! HTTP response building module
//!
//! Builders for every response the server sends. All bodies are small and
//! fully buffered.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{self, HeaderValue};
use hyper::{Response, StatusCode};
use serde::Serialize;

use crate::config::HttpConfig;

/// Methods accepted on the solve route
pub const SOLVE_ALLOW: &str = "POST, OPTIONS";

/// Build a JSON response from any serializable body
pub fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response<Full<Bytes>> {
    let json = match serde_json::to_string(body) {
        Ok(j) => j,
        Err(e) => {
            crate::logger::log_error(&format!("Failed to serialize response: {e}"));
            return Response::builder()
                .status(StatusCode::INTERNAL_SERVER_ERROR)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Full::new(Bytes::from_static(
                    br#"{"error":"Internal server error"}"#,
                )))
                .unwrap_or_else(|_| Response::new(Full::new(Bytes::from("Error"))));
        }
    };

    Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Full::new(Bytes::from(json)))
        .unwrap_or_else(|e| {
            log_build_error(status.as_str(), &e);
            Response::new(Full::new(Bytes::from("Error")))
        })
}

/// Build `{"error": message}` with the given status
pub fn build_error_response(status: StatusCode, message: &str) -> Response<Full<Bytes>> {
    json_response(status, &serde_json::json!({ "error": message }))
}

/// Build 404 Not Found response
pub fn build_404_response() -> Response<Full<Bytes>> {
    build_error_response(StatusCode::NOT_FOUND, "Not Found")
}

/// Build 405 Method Not Allowed response
pub fn build_405_response(allow: &'static str) -> Response<Full<Bytes>> {
    let mut resp = build_error_response(StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed");
    resp.headers_mut()
        .insert(header::ALLOW, HeaderValue::from_static(allow));
    resp
}

/// Build 413 Payload Too Large response
pub fn build_413_response(max_body_size: u64) -> Response<Full<Bytes>> {
    build_error_response(
        StatusCode::PAYLOAD_TOO_LARGE,
        &format!("Request body exceeds {max_body_size} bytes"),
    )
}

/// Build plain-text health probe response
pub fn build_health_response(status: &'static str) -> Response<Full<Bytes>> {
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/plain")
        .header(header::CACHE_CONTROL, "no-cache")
        .body(Full::new(Bytes::from_static(status.as_bytes())))
        .unwrap_or_else(|e| {
            log_build_error("health", &e);
            Response::new(Full::new(Bytes::from_static(status.as_bytes())))
        })
}

/// Build CORS preflight response
///
/// Requested headers are echoed back so any client header is permitted.
pub fn build_options_response(
    allow: &'static str,
    requested_headers: Option<&HeaderValue>,
    enable_cors: bool,
) -> Response<Full<Bytes>> {
    let mut builder = Response::builder()
        .status(StatusCode::NO_CONTENT)
        .header(header::ALLOW, allow);

    if enable_cors {
        builder = builder
            .header(header::ACCESS_CONTROL_ALLOW_METHODS, allow)
            .header(
                header::ACCESS_CONTROL_ALLOW_HEADERS,
                requested_headers
                    .cloned()
                    .unwrap_or_else(|| HeaderValue::from_static("Content-Type")),
            )
            .header(header::ACCESS_CONTROL_MAX_AGE, "86400");
    }

    builder.body(Full::new(Bytes::new())).unwrap_or_else(|e| {
        log_build_error("OPTIONS", &e);
        Response::new(Full::new(Bytes::new()))
    })
}

/// Stamp headers every response carries: `Server` and, when enabled, the
/// wildcard CORS origin
pub fn apply_common_headers(resp: &mut Response<Full<Bytes>>, http: &HttpConfig) {
    let headers = resp.headers_mut();
    if let Ok(name) = HeaderValue::from_str(&http.server_name) {
        headers.insert(header::SERVER, name);
    }
    if http.enable_cors {
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        );
    }
}

/// Log response build error
fn log_build_error(status: &str, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_json(resp: Response<Full<Bytes>>) -> serde_json::Value {
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn http_config(enable_cors: bool) -> HttpConfig {
        HttpConfig {
            server_name: "cube-solve-server".to_string(),
            enable_cors,
            max_body_size: 1024,
        }
    }

    #[tokio::test]
    async fn test_error_response_shape() {
        let resp = build_error_response(StatusCode::BAD_REQUEST, "nope");
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(resp.headers()[header::CONTENT_TYPE], "application/json");
        assert_eq!(body_json(resp).await, serde_json::json!({ "error": "nope" }));
    }

    #[test]
    fn test_405_lists_allowed_methods() {
        let resp = build_405_response(SOLVE_ALLOW);
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(resp.headers()[header::ALLOW], "POST, OPTIONS");
    }

    #[test]
    fn test_preflight_echoes_requested_headers() {
        let requested = HeaderValue::from_static("content-type, x-trace-id");
        let resp = build_options_response(SOLVE_ALLOW, Some(&requested), true);
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);
        assert_eq!(
            resp.headers()[header::ACCESS_CONTROL_ALLOW_HEADERS],
            "content-type, x-trace-id"
        );
        assert_eq!(resp.headers()[header::ACCESS_CONTROL_ALLOW_METHODS], SOLVE_ALLOW);
    }

    #[test]
    fn test_preflight_without_cors() {
        let resp = build_options_response(SOLVE_ALLOW, None, false);
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);
        assert!(resp
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_METHODS)
            .is_none());
    }

    #[test]
    fn test_common_headers() {
        let mut resp = build_404_response();
        apply_common_headers(&mut resp, &http_config(true));
        assert_eq!(resp.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert_eq!(resp.headers()[header::SERVER], "cube-solve-server");

        let mut resp = build_404_response();
        apply_common_headers(&mut resp, &http_config(false));
        assert!(resp
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .is_none());
    }
}
