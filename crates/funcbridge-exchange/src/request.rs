use bytes::Bytes;
use http::{Method, Uri};
use serde_json::Value;

use crate::header::HeaderMap;

/// The synthesized inbound request of a virtual exchange.
///
/// Built once from the trigger description and never mutated afterwards;
/// handlers only get a shared reference.
#[derive(Debug, Clone)]
pub struct Request {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
    identities: Vec<Value>,
}

impl Request {
    /// Create a request with a buffered body.
    pub fn new(method: Method, uri: Uri, headers: HeaderMap, body: impl Into<Bytes>) -> Self {
        Self {
            method,
            uri,
            headers,
            body: body.into(),
            identities: Vec::new(),
        }
    }

    /// Create a request with an empty body.
    pub fn empty(method: Method, uri: Uri, headers: HeaderMap) -> Self {
        Self::new(method, uri, headers, Bytes::new())
    }

    /// Attach the caller identities the host forwarded.
    pub fn with_identities(mut self, identities: Vec<Value>) -> Self {
        self.identities = identities;
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    pub fn path(&self) -> &str {
        self.uri.path()
    }

    pub fn query(&self) -> Option<&str> {
        self.uri.query()
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body_bytes(&self) -> &Bytes {
        &self.body
    }

    /// The body as UTF-8 text.
    pub fn body_text(&self) -> Result<&str, std::str::Utf8Error> {
        std::str::from_utf8(&self.body)
    }

    /// Opaque identity claims; not interpreted by funcbridge.
    pub fn identities(&self) -> &[Value] {
        &self.identities
    }
}
