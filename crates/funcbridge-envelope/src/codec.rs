//! Envelope decoding and encoding.

use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde_json::value::RawValue;

use crate::error::{EnvelopeError, EnvelopeResult};
use crate::types::{InvocationEnvelope, ResponseEnvelope, TriggerDescription};

/// Queue payloads arrive wrapped in at most this many layers of JSON strings.
const MAX_STRING_LAYERS: usize = 2;

/// Decode the top-level invocation envelope.
///
/// The envelope must be a JSON object; derived struct decoding would
/// otherwise also take an array and bind its elements by position.
pub fn decode(raw: &[u8]) -> EnvelopeResult<InvocationEnvelope> {
    if first_byte(raw) != Some(b'{') {
        return Err(EnvelopeError::MalformedEnvelope("expected a JSON object".to_string()));
    }
    serde_json::from_slice(raw).map_err(|e| EnvelopeError::MalformedEnvelope(e.to_string()))
}

/// Look up the raw payload of one binding.
pub fn extract_binding<'a>(envelope: &'a InvocationEnvelope, name: &str) -> EnvelopeResult<&'a RawValue> {
    envelope
        .data
        .get(name)
        .map(|raw| raw.as_ref())
        .ok_or_else(|| EnvelopeError::BindingNotFound(name.to_string()))
}

/// Decode an HTTP trigger payload.
///
/// A `null` payload is an empty trigger (`GET /`). Anything else must be
/// a JSON object.
pub fn decode_trigger(raw: &RawValue) -> EnvelopeResult<TriggerDescription> {
    let text = raw.get();
    match first_byte(text.as_bytes()) {
        Some(b'{') => serde_json::from_str(text)
            .map_err(|e| EnvelopeError::InvalidTriggerBinding(e.to_string())),
        Some(b'n') if text.trim() == "null" => Ok(TriggerDescription::default()),
        _ => Err(EnvelopeError::InvalidTriggerBinding(format!(
            "expected a JSON object, got {text}"
        ))),
    }
}

/// Decode a non-HTTP binding payload (e.g. a queue message).
///
/// The host delivers these as a JSON string that holds a JSON-encoded
/// string that holds the document. String layers are peeled off before
/// the document is decoded; a payload that is already a document decodes
/// directly.
pub fn decode_binding<T: DeserializeOwned>(raw: &RawValue) -> EnvelopeResult<T> {
    let invalid = |e: serde_json::Error| EnvelopeError::InvalidTriggerBinding(e.to_string());

    let mut text = raw.get().to_string();
    for _ in 0..MAX_STRING_LAYERS {
        if !text.trim_start().starts_with('"') {
            break;
        }
        text = serde_json::from_str::<String>(&text).map_err(invalid)?;
    }
    serde_json::from_str(&text).map_err(invalid)
}

fn first_byte(raw: &[u8]) -> Option<u8> {
    raw.iter().copied().find(|b| !b.is_ascii_whitespace())
}

/// Encode a reply for the host.
pub fn encode(envelope: &ResponseEnvelope) -> EnvelopeResult<Bytes> {
    Ok(Bytes::from(serde_json::to_vec(envelope)?))
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::*;
    use crate::types::{HttpReturnValue, OutputSet};

    #[test]
    fn decode_full_envelope() {
        let envelope = decode(
            br#"{"Data":{"req":{"Url":"/","Method":"GET"}},"Metadata":{"sys":{"MethodName":"hello"}}}"#,
        )
        .unwrap();
        assert_eq!(envelope.binding_names().collect::<Vec<_>>(), vec!["req"]);
        assert_eq!(envelope.metadata["sys"]["MethodName"], "hello");
    }

    #[test]
    fn decode_bare_scalar_is_malformed() {
        let err = decode(b"0").unwrap_err();
        assert!(matches!(err, EnvelopeError::MalformedEnvelope(_)));
    }

    #[test]
    fn decode_garbage_is_malformed() {
        let err = decode(b"{not json").unwrap_err();
        assert!(matches!(err, EnvelopeError::MalformedEnvelope(_)));
    }

    #[test]
    fn decode_rejects_arrays() {
        for raw in [&b"[]"[..], br#" [{"req":{"Url":"/","Method":"GET"}}]"#] {
            let err = decode(raw).unwrap_err();
            assert!(matches!(err, EnvelopeError::MalformedEnvelope(_)));
        }
    }

    #[test]
    fn decode_empty_object_has_no_bindings() {
        let envelope = decode(b"{}").unwrap();
        assert!(envelope.data.is_empty());
        assert!(envelope.metadata.is_empty());
    }

    #[test]
    fn decode_null_data() {
        let envelope = decode(br#"{"Data":null}"#).unwrap();
        assert!(envelope.data.is_empty());
    }

    #[test]
    fn extract_missing_binding() {
        let envelope = decode(br#"{"Data":{"other":{}}}"#).unwrap();
        let err = extract_binding(&envelope, "req").unwrap_err();
        match err {
            EnvelopeError::BindingNotFound(name) => assert_eq!(name, "req"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn extract_keeps_payload_raw() {
        let envelope = decode(br#"{"Data":{"req":{"Url": "/a"}}}"#).unwrap();
        let raw = extract_binding(&envelope, "req").unwrap();
        assert_eq!(raw.get(), r#"{"Url": "/a"}"#);
    }

    #[test]
    fn decode_trigger_rejects_scalar() {
        let envelope = decode(br#"{"Data":{"req":0}}"#).unwrap();
        let raw = extract_binding(&envelope, "req").unwrap();
        let err = decode_trigger(raw).unwrap_err();
        assert!(matches!(err, EnvelopeError::InvalidTriggerBinding(_)));
    }

    #[test]
    fn decode_trigger_rejects_array() {
        let envelope = decode(br#"{"Data":{"req":["/","GET"]}}"#).unwrap();
        let raw = extract_binding(&envelope, "req").unwrap();
        let err = decode_trigger(raw).unwrap_err();
        assert!(matches!(err, EnvelopeError::InvalidTriggerBinding(_)));
    }

    #[test]
    fn decode_trigger_null_is_empty_trigger() {
        let envelope = decode(br#"{"Data":{"req":null}}"#).unwrap();
        let trigger = decode_trigger(extract_binding(&envelope, "req").unwrap()).unwrap();
        assert_eq!(trigger, TriggerDescription::default());
    }

    #[test]
    fn decode_trigger_rejects_object_body() {
        let envelope = decode(br#"{"Data":{"req":{"Url":"/","Body":{"a":1}}}}"#).unwrap();
        let raw = extract_binding(&envelope, "req").unwrap();
        let err = decode_trigger(raw).unwrap_err();
        assert!(matches!(err, EnvelopeError::InvalidTriggerBinding(_)));
    }

    #[test]
    fn decode_trigger_fields() {
        let envelope = decode(
            br#"{"Data":{"req":{"Url":"http://localhost/api/hello?x=1","Method":"POST","Query":{"x":"1"},"Headers":{"x-test":["ok"]},"Body":"hi"}}}"#,
        )
        .unwrap();
        let trigger = decode_trigger(extract_binding(&envelope, "req").unwrap()).unwrap();
        assert_eq!(trigger.url, "http://localhost/api/hello?x=1");
        assert_eq!(trigger.method, "POST");
        assert_eq!(trigger.query["x"], "1");
        assert_eq!(trigger.headers["x-test"], vec!["ok".to_string()]);
        assert_eq!(trigger.body, "hi");
    }

    #[derive(Debug, Deserialize, PartialEq)]
    #[serde(rename_all = "PascalCase")]
    struct Message {
        installation_id: i64,
        owner: String,
    }

    #[test]
    fn decode_binding_double_encoded() {
        let doc = r#"{"InstallationId":7,"Owner":"octo"}"#;
        let once = serde_json::to_string(doc).unwrap();
        let twice = serde_json::to_string(&once).unwrap();
        let body = format!(r#"{{"Data":{{"msg":{twice}}}}}"#);

        let envelope = decode(body.as_bytes()).unwrap();
        let msg: Message = decode_binding(extract_binding(&envelope, "msg").unwrap()).unwrap();
        assert_eq!(
            msg,
            Message {
                installation_id: 7,
                owner: "octo".into()
            }
        );
    }

    #[test]
    fn decode_binding_plain_document() {
        let envelope = decode(br#"{"Data":{"msg":{"InstallationId":1,"Owner":"a"}}}"#).unwrap();
        let msg: Message = decode_binding(extract_binding(&envelope, "msg").unwrap()).unwrap();
        assert_eq!(msg.installation_id, 1);
    }

    #[test]
    fn decode_binding_plain_string_value() {
        let envelope = decode(br#"{"Data":{"msg":"hello"}}"#).unwrap();
        let raw = extract_binding(&envelope, "msg").unwrap();
        let err = decode_binding::<String>(raw).unwrap_err();
        assert!(matches!(err, EnvelopeError::InvalidTriggerBinding(_)));
    }

    #[test]
    fn decode_binding_wrong_shape() {
        let envelope = decode(br#"{"Data":{"msg":[1,2]}}"#).unwrap();
        let raw = extract_binding(&envelope, "msg").unwrap();
        assert!(decode_binding::<Message>(raw).is_err());
    }

    #[test]
    fn encode_http_envelope() {
        let mut rv = HttpReturnValue::new(200, "ok");
        rv.headers.insert("Content-Type".into(), "text/plain".into());
        let bytes = encode(&ResponseEnvelope::http(rv, OutputSet::new())).unwrap();
        assert_eq!(
            std::str::from_utf8(&bytes).unwrap(),
            r#"{"Outputs":{},"ReturnValue":{"Status":200,"Body":"ok","Headers":{"Content-Type":"text/plain"}}}"#
        );
    }
}
