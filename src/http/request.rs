//! Request identification.
//!
//! Every inbound request gets an `x-request-id` (generated by the server
//! layer when the caller did not send one). The same id is forwarded to
//! the backend and echoed on the response.

use axum::http::HeaderMap;

/// Header carrying the request id.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Request id of an inbound request, or `"unknown"`.
pub fn request_id(headers: &HeaderMap) -> String {
    headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn reads_or_defaults() {
        let mut headers = HeaderMap::new();
        assert_eq!(request_id(&headers), "unknown");

        headers.insert(X_REQUEST_ID, HeaderValue::from_static("req-1"));
        assert_eq!(request_id(&headers), "req-1");
    }
}
