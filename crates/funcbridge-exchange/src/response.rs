use bytes::{Bytes, BytesMut};
use http::StatusCode;
use serde::Serialize;

use crate::header::HeaderMap;

pub const CONTENT_TYPE: &str = "Content-Type";
pub const LOCATION: &str = "Location";
pub const TEXT_PLAIN_UTF8: &str = "text/plain; charset=UTF-8";
pub const APPLICATION_JSON: &str = "application/json";

/// Captures everything a handler writes as its HTTP response.
///
/// The status starts at 500 so that a handler which never responds is
/// visible to the host instead of looking like a success.
#[derive(Debug, Clone)]
pub struct ResponseSink {
    status: StatusCode,
    headers: HeaderMap,
    body: BytesMut,
}

impl Default for ResponseSink {
    fn default() -> Self {
        Self::new()
    }
}

impl ResponseSink {
    pub fn new() -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            headers: HeaderMap::new(),
            body: BytesMut::new(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn set_status(&mut self, status: StatusCode) {
        self.status = status;
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    /// Append raw bytes to the body.
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.body.extend_from_slice(bytes);
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Respond with a plain-text body.
    pub fn text(&mut self, status: StatusCode, body: impl AsRef<str>) {
        self.headers.set(CONTENT_TYPE, TEXT_PLAIN_UTF8);
        self.status = status;
        self.write_bytes(body.as_ref().as_bytes());
    }

    /// Respond with `value` serialized as JSON.
    pub fn json<T: Serialize + ?Sized>(&mut self, status: StatusCode, value: &T) -> serde_json::Result<()> {
        let encoded = serde_json::to_vec(value)?;
        self.headers.set(CONTENT_TYPE, APPLICATION_JSON);
        self.status = status;
        self.write_bytes(&encoded);
        Ok(())
    }

    /// Respond with a status and no body.
    pub fn no_content(&mut self, status: StatusCode) {
        self.status = status;
    }

    pub fn redirect(&mut self, status: StatusCode, location: impl Into<String>) {
        self.headers.set(LOCATION, location);
        self.status = status;
    }

    /// Take the captured parts: status, headers, body.
    pub fn into_parts(self) -> (StatusCode, HeaderMap, Bytes) {
        (self.status, self.headers, self.body.freeze())
    }
}

impl std::io::Write for ResponseSink {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.write_bytes(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn defaults_to_internal_error() {
        let sink = ResponseSink::new();
        assert_eq!(sink.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(sink.headers().is_empty());
        assert!(sink.body().is_empty());
    }

    #[test]
    fn text_sets_status_type_and_body() {
        let mut sink = ResponseSink::new();
        sink.text(StatusCode::OK, "ok");
        assert_eq!(sink.status(), StatusCode::OK);
        assert_eq!(sink.headers().get("content-type"), Some(TEXT_PLAIN_UTF8));
        assert_eq!(sink.body(), b"ok");
    }

    #[test]
    fn json_body() {
        let mut sink = ResponseSink::new();
        sink.json(StatusCode::CREATED, &serde_json::json!({"id": 1}))
            .unwrap();
        assert_eq!(sink.status(), StatusCode::CREATED);
        assert_eq!(sink.headers().get(CONTENT_TYPE), Some(APPLICATION_JSON));
        assert_eq!(sink.body(), br#"{"id":1}"#);
    }

    #[test]
    fn io_write_appends() {
        let mut sink = ResponseSink::new();
        write!(sink, "hello ").unwrap();
        sink.write_all(b"world").unwrap();
        assert_eq!(sink.body(), b"hello world");
        // Writing a body does not imply a status.
        assert_eq!(sink.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn redirect_sets_location() {
        let mut sink = ResponseSink::new();
        sink.redirect(StatusCode::FOUND, "https://example.com/");
        assert_eq!(sink.status(), StatusCode::FOUND);
        assert_eq!(sink.headers().get("location"), Some("https://example.com/"));
    }

    #[test]
    fn into_parts() {
        let mut sink = ResponseSink::new();
        sink.no_content(StatusCode::ACCEPTED);
        sink.headers_mut().append("X-A", "1");
        let (status, headers, body) = sink.into_parts();
        assert_eq!(status, StatusCode::ACCEPTED);
        assert_eq!(headers.get("x-a"), Some("1"));
        assert!(body.is_empty());
    }
}
