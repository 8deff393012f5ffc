//! Response Assembler
//!
//! Turns orchestrator results into HTTP responses with diagnostic headers.

use axum::{
    http::{
        header::{CACHE_CONTROL, CONTENT_TYPE},
        HeaderMap, HeaderName, HeaderValue, StatusCode,
    },
    response::{IntoResponse, Response},
};

use crate::error::MirrorError;
use crate::mirror::Served;
use crate::routes::RouteDescriptor;

pub const HEADER_CACHE: HeaderName = HeaderName::from_static("x-bootible-cache");
pub const HEADER_DEVICE: HeaderName = HeaderName::from_static("x-bootible-device");
pub const HEADER_INTEGRITY: HeaderName = HeaderName::from_static("x-bootible-integrity");
pub const HEADER_CACHED_AT: HeaderName = HeaderName::from_static("x-bootible-cached-at");
pub const HEADER_CACHE_AGE: HeaderName = HeaderName::from_static("x-bootible-cache-age");
pub const HEADER_STALE_REASON: HeaderName = HeaderName::from_static("x-bootible-stale-reason");

const TEXT_PLAIN: &str = "text/plain; charset=utf-8";
const NO_STORE: &str = "no-cache, no-store, must-revalidate";

/// 200 response carrying verified script content.
pub fn assemble(route: &RouteDescriptor, served: Served) -> Response {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(TEXT_PLAIN));
    headers.insert(CACHE_CONTROL, HeaderValue::from_static(NO_STORE));
    headers.insert(HEADER_CACHE, HeaderValue::from_static(served.status.as_str()));
    headers.insert(HEADER_DEVICE, header_value(&route.label));
    headers.insert(
        HEADER_INTEGRITY,
        header_value(&format!("sha256-{}", served.digest)),
    );
    headers.insert(HEADER_CACHED_AT, header_value(&served.inserted_at.to_rfc3339()));
    headers.insert(HEADER_CACHE_AGE, HeaderValue::from(served.age.as_secs()));
    if let Some(reason) = &served.stale_reason {
        headers.insert(HEADER_STALE_REASON, header_value(reason));
    }

    (StatusCode::OK, headers, served.content).into_response()
}

/// 502 response explaining why no verified content is available.
pub fn failure(err: &MirrorError, support_url: &str) -> Response {
    let body = format!(
        "Failed to fetch script: {}\n\nIf this keeps happening, please report it at {}\n",
        err, support_url
    );
    (
        StatusCode::BAD_GATEWAY,
        [(CONTENT_TYPE, TEXT_PLAIN), (CACHE_CONTROL, NO_STORE)],
        body,
    )
        .into_response()
}

/// Builds a header value, blanking control characters.
fn header_value(text: &str) -> HeaderValue {
    let cleaned: String = text
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect();
    HeaderValue::from_bytes(cleaned.as_bytes()).unwrap_or_else(|_| HeaderValue::from_static("-"))
}
