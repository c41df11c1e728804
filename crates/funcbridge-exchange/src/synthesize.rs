//! Builds a virtual HTTP exchange from a decoded trigger description.

use bytes::Bytes;
use http::{Method, Uri};
use tracing::debug;

use funcbridge_envelope::{EnvelopeError, EnvelopeResult, TriggerDescription};

use crate::header::HeaderMap;
use crate::request::Request;
use crate::response::ResponseSink;

/// A synthesized request paired with a sink capturing the response.
#[derive(Debug)]
pub struct VirtualExchange {
    pub request: Request,
    pub response: ResponseSink,
}

impl VirtualExchange {
    pub fn new(request: Request) -> Self {
        Self {
            request,
            response: ResponseSink::new(),
        }
    }
}

/// Build the exchange for one invocation.
///
/// Method, URL and body are taken verbatim. For headers only the last
/// declared value of each name survives, with names folded to canonical
/// case, so `x-test` and `X-Test` collapse into one header.
pub fn synthesize(trigger: TriggerDescription) -> EnvelopeResult<VirtualExchange> {
    let method = parse_method(&trigger.method)?;
    let uri = parse_uri(&trigger.url)?;

    let mut headers = HeaderMap::new();
    for (name, values) in &trigger.headers {
        for value in values {
            headers.set(name, value.as_str());
        }
    }

    debug!(%method, %uri, headers = headers.len(), "synthesized request");

    let request = Request::new(method, uri, headers, Bytes::from(trigger.body))
        .with_identities(trigger.identities);
    Ok(VirtualExchange::new(request))
}

fn parse_method(method: &str) -> EnvelopeResult<Method> {
    if method.is_empty() {
        return Ok(Method::GET);
    }
    Method::from_bytes(method.as_bytes())
        .map_err(|e| EnvelopeError::InvalidTriggerBinding(format!("invalid method {method:?}: {e}")))
}

/// Accept absolute URIs and origin-form targets; an empty URL means `/`.
fn parse_uri(url: &str) -> EnvelopeResult<Uri> {
    if url.is_empty() {
        return Ok(Uri::from_static("/"));
    }
    let invalid = |reason: String| EnvelopeError::InvalidTriggerBinding(format!("invalid url {url:?}: {reason}"));

    let uri: Uri = url.parse().map_err(|e: http::uri::InvalidUri| invalid(e.to_string()))?;
    if uri.scheme().is_none() && !url.starts_with('/') {
        return Err(invalid("missing protocol scheme".to_string()));
    }
    Ok(uri)
}

#[cfg(test)]
mod tests {
    use indexmap::IndexMap;

    use super::*;

    fn trigger(url: &str, method: &str) -> TriggerDescription {
        TriggerDescription {
            url: url.to_string(),
            method: method.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn synthesize_basic_request() {
        let mut t = trigger("http://localhost:7071/api/hello?name=x", "POST");
        t.body = "payload".to_string();

        let exchange = synthesize(t).unwrap();
        let req = &exchange.request;
        assert_eq!(req.method(), Method::POST);
        assert_eq!(req.path(), "/api/hello");
        assert_eq!(req.query(), Some("name=x"));
        assert_eq!(req.body_bytes().as_ref(), b"payload");
    }

    #[test]
    fn synthesize_origin_form() {
        let exchange = synthesize(trigger("/", "GET")).unwrap();
        assert_eq!(exchange.request.uri(), "/");
    }

    #[test]
    fn sink_starts_unanswered() {
        let exchange = synthesize(trigger("/", "GET")).unwrap();
        assert_eq!(exchange.response.status(), http::StatusCode::INTERNAL_SERVER_ERROR);
        assert!(exchange.response.headers().is_empty());
    }

    #[test]
    fn empty_method_and_url_default() {
        let exchange = synthesize(TriggerDescription::default()).unwrap();
        assert_eq!(exchange.request.method(), Method::GET);
        assert_eq!(exchange.request.path(), "/");
    }

    #[test]
    fn rejects_url_without_scheme_or_path() {
        let err = synthesize(trigger(":", "GET")).unwrap_err();
        assert!(matches!(err, EnvelopeError::InvalidTriggerBinding(_)));
    }

    #[test]
    fn rejects_unparsable_url() {
        let err = synthesize(trigger("http://exa mple.com/", "GET")).unwrap_err();
        assert!(matches!(err, EnvelopeError::InvalidTriggerBinding(_)));
    }

    #[test]
    fn rejects_invalid_method() {
        let err = synthesize(trigger("/", "GE T")).unwrap_err();
        assert!(matches!(err, EnvelopeError::InvalidTriggerBinding(_)));
    }

    #[test]
    fn custom_method_accepted() {
        let exchange = synthesize(trigger("/", "PURGE")).unwrap();
        assert_eq!(exchange.request.method().as_str(), "PURGE");
    }

    #[test]
    fn headers_last_value_wins_across_case() {
        let mut headers = IndexMap::new();
        headers.insert("x-test".to_string(), vec!["a".to_string(), "b".to_string()]);
        headers.insert("X-TEST".to_string(), vec!["c".to_string()]);
        headers.insert("accept".to_string(), vec!["*/*".to_string()]);
        let mut t = trigger("/", "GET");
        t.headers = headers;

        let exchange = synthesize(t).unwrap();
        let req_headers = exchange.request.headers();
        assert_eq!(req_headers.len(), 2);
        assert_eq!(req_headers.get_all("x-test"), vec!["c"]);
        assert_eq!(req_headers.flatten()["X-Test"], "c");
        assert_eq!(req_headers.flatten()["Accept"], "*/*");
    }

    #[test]
    fn identities_passed_through() {
        let mut t = trigger("/", "GET");
        t.identities = vec![serde_json::json!({"claims": []})];
        let exchange = synthesize(t).unwrap();
        assert_eq!(exchange.request.identities().len(), 1);
    }
}
