//! Wire types of the functions host protocol.

use std::collections::{BTreeMap, HashMap};

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use serde_json::value::RawValue;

/// Output bindings produced by one invocation, keyed by binding name.
pub type OutputSet = serde_json::Map<String, Value>;

/// An inbound invocation from the host.
///
/// Binding payloads are kept as raw JSON and only decoded when a consumer
/// asks for them.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct InvocationEnvelope {
    #[serde(rename = "Data", default, deserialize_with = "null_as_default")]
    pub data: HashMap<String, Box<RawValue>>,
    #[serde(rename = "Metadata", default, deserialize_with = "null_as_default")]
    pub metadata: serde_json::Map<String, Value>,
}

impl InvocationEnvelope {
    pub fn binding_names(&self) -> impl Iterator<Item = &str> {
        self.data.keys().map(String::as_str)
    }
}

/// The HTTP request the host received, as described inside the envelope.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TriggerDescription {
    #[serde(rename = "Url", alias = "url", default, deserialize_with = "null_as_default")]
    pub url: String,
    #[serde(rename = "Method", alias = "method", default, deserialize_with = "null_as_default")]
    pub method: String,
    #[serde(rename = "Query", alias = "query", default, deserialize_with = "null_as_default")]
    pub query: HashMap<String, String>,
    /// Header values in the order the host declared them.
    #[serde(rename = "Headers", alias = "headers", default, deserialize_with = "null_as_default")]
    pub headers: IndexMap<String, Vec<String>>,
    #[serde(rename = "Params", alias = "params", default, deserialize_with = "null_as_default")]
    pub params: HashMap<String, String>,
    #[serde(rename = "Identities", alias = "identities", default, deserialize_with = "null_as_default")]
    pub identities: Vec<Value>,
    #[serde(rename = "Body", alias = "body", default, deserialize_with = "null_as_default")]
    pub body: String,
}

/// What the simulated HTTP exchange would have written to the socket.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct HttpReturnValue {
    pub status: u16,
    pub body: String,
    pub headers: BTreeMap<String, String>,
}

impl HttpReturnValue {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
            headers: BTreeMap::new(),
        }
    }
}

/// The reply to the host.
///
/// `Outputs` is always present, even when empty. `ReturnValue` is omitted
/// only for functions that are not HTTP-triggered.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResponseEnvelope {
    #[serde(default)]
    pub outputs: OutputSet,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logs: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_value: Option<HttpReturnValue>,
}

impl ResponseEnvelope {
    /// An envelope with no outputs and no return value.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn http(return_value: HttpReturnValue, outputs: OutputSet) -> Self {
        Self {
            outputs,
            logs: None,
            return_value: Some(return_value),
        }
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
