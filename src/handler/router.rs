//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: health probes, the solve route
//! with its CORS preflight, and 404/405 for everything else.

use crate::config::AppState;
use crate::handler::solve;
use crate::http;
use crate::logger::{self, AccessLogEntry};
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::{Body, Bytes};
use hyper::header::{self, HeaderMap};
use hyper::{Method, Request, Response, StatusCode};
use std::convert::Infallible;
use std::error::Error as StdError;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Path of the solve endpoint
pub const SOLVE_PATH: &str = "/solve";

/// Main entry point for HTTP request handling
///
/// Generic over the body so tests can drive it with in-memory bodies.
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn StdError + Send + Sync>>,
{
    let started = Instant::now();
    let mut entry = state.config.logging.access_log.then(|| {
        let mut entry = AccessLogEntry::new(
            peer_addr.ip().to_string(),
            req.method().to_string(),
            req.uri().path().to_string(),
        );
        entry.http_version = version_label(req.version()).to_string();
        entry.user_agent = header_string(req.headers(), &header::USER_AGENT);
        entry
    });

    let (mut response, outcome) = route_request(req, &state).await;
    http::apply_common_headers(&mut response, &state.config.http);

    if let Some(entry) = entry.as_mut() {
        entry.status = response.status().as_u16();
        entry.body_bytes = response
            .body()
            .size_hint()
            .exact()
            .and_then(|n| usize::try_from(n).ok())
            .unwrap_or_default();
        entry.outcome = outcome;
        entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

/// Route request based on path and method
///
/// The second element tags solve attempts for the access log.
async fn route_request<B>(
    req: Request<B>,
    state: &AppState,
) -> (Response<Full<Bytes>>, Option<&'static str>)
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn StdError + Send + Sync>>,
{
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    // 1. Health check endpoints
    let health = &state.config.health;
    if health.enabled
        && matches!(method, Method::GET | Method::HEAD)
        && (path == health.liveness_path || path == health.readiness_path)
    {
        return (http::build_health_response("ok"), None);
    }

    // 2. Everything except the solve route is unknown
    if path != SOLVE_PATH {
        return (http::build_404_response(), None);
    }

    // 3. Solve route
    match method {
        Method::POST => {
            let response = solve_route(req, state).await;
            let outcome = if response.status().is_success() {
                "solved"
            } else {
                "rejected"
            };
            (response, Some(outcome))
        }
        Method::OPTIONS => (
            http::build_options_response(
                http::SOLVE_ALLOW,
                req.headers().get(header::ACCESS_CONTROL_REQUEST_HEADERS),
                state.config.http.enable_cors,
            ),
            None,
        ),
        _ => {
            logger::log_warning(&format!("Method not allowed: {method} {path}"));
            (http::build_405_response(http::SOLVE_ALLOW), None)
        }
    }
}

/// Read the body under the size limit and hand it to the solve handler
async fn solve_route<B>(req: Request<B>, state: &AppState) -> Response<Full<Bytes>>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn StdError + Send + Sync>>,
{
    let max_body_size = state.config.http.max_body_size;
    if let Some(resp) = check_body_size(req.headers(), max_body_size) {
        return resp;
    }

    // Content-Length may be absent (chunked) or wrong, so enforce while reading too
    let limit = usize::try_from(max_body_size).unwrap_or(usize::MAX);
    let reading = Limited::new(req.into_body(), limit).collect();
    let read_timeout = state.config.performance.read_timeout;
    let collected = if read_timeout == 0 {
        reading.await
    } else {
        match tokio::time::timeout(Duration::from_secs(read_timeout), reading).await {
            Ok(collected) => collected,
            Err(_) => {
                logger::log_error(&format!(
                    "Request body not received within {read_timeout} seconds"
                ));
                return http::build_error_response(
                    StatusCode::REQUEST_TIMEOUT,
                    "Timed out reading request body",
                );
            }
        }
    };

    let body = match collected {
        Ok(collected) => collected.to_bytes(),
        Err(e) if e.downcast_ref::<LengthLimitError>().is_some() => {
            logger::log_error(&format!(
                "Request body too large while reading (max: {max_body_size})"
            ));
            return http::build_413_response(max_body_size);
        }
        Err(e) => {
            logger::log_error(&format!("Failed to read request body: {e}"));
            return http::build_error_response(
                StatusCode::BAD_REQUEST,
                "Failed to read request body",
            );
        }
    };

    solve::handle_solve(&body, Arc::clone(&state.solver)).await
}

/// Validate Content-Length header and return 413 if exceeded
fn check_body_size(headers: &HeaderMap, max_body_size: u64) -> Option<Response<Full<Bytes>>> {
    let size_str = header_string(headers, &header::CONTENT_LENGTH)?;
    match size_str.parse::<u64>() {
        Ok(size) if size > max_body_size => {
            logger::log_error(&format!(
                "Request body too large: {size} bytes (max: {max_body_size})"
            ));
            Some(http::build_413_response(max_body_size))
        }
        Err(_) => {
            logger::log_warning(&format!(
                "Invalid Content-Length value: '{size_str}', skipping size check"
            ));
            None
        }
        _ => None,
    }
}

fn header_string(headers: &HeaderMap, name: &header::HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string)
}

fn version_label(version: hyper::Version) -> &'static str {
    if version == hyper::Version::HTTP_10 {
        "1.0"
    } else if version == hyper::Version::HTTP_2 {
        "2"
    } else {
        "1.1"
    }
}
