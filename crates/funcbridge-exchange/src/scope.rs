//! Layered key/value context for one invocation.
//!
//! A [`ScopedContext`] owns a writable inner [`Scope`] and holds the
//! caller's scope read-only. Reads fall through from inner to outer; writes
//! always land in inner, so a value set during an invocation shadows the
//! caller's value without ever changing what the caller sees.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use funcbridge_envelope::OutputSet;

/// Reserved key under which output bindings are collected.
pub const OUTPUTS_KEY: &str = "Outputs";

/// A flat key/value scope.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scope {
    values: HashMap<String, Value>,
}

impl Scope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Scope {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Two-level context: per-invocation inner scope over a shared outer scope.
///
/// The outer scope is behind an `Arc` so concurrent invocations can read
/// the same caller scope; nothing here ever writes to it.
#[derive(Debug, Clone)]
pub struct ScopedContext {
    inner: Scope,
    outer: Arc<Scope>,
}

impl ScopedContext {
    pub fn new(outer: Arc<Scope>) -> Self {
        Self {
            inner: Scope::new(),
            outer,
        }
    }

    /// A context whose outer scope is empty.
    pub fn detached() -> Self {
        Self::new(Arc::new(Scope::new()))
    }

    /// Inner scope first, then outer.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.inner.get(key).or_else(|| self.outer.get(key))
    }

    /// Write to the inner scope, shadowing any outer value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.inner.set(key, value);
    }

    pub fn inner(&self) -> &Scope {
        &self.inner
    }

    pub fn outer(&self) -> &Scope {
        &self.outer
    }

    /// Record `value` for the output binding `name`.
    ///
    /// The output set is created in the inner scope on first write, seeded
    /// from the outer set if there is one. Later writes update it in place.
    pub fn set_output<T: Serialize + ?Sized>(&mut self, name: impl Into<String>, value: &T) -> serde_json::Result<()> {
        let value = serde_json::to_value(value)?;
        if !matches!(self.inner.get(OUTPUTS_KEY), Some(Value::Object(_))) {
            let seed = self.outputs();
            self.inner.set(OUTPUTS_KEY, Value::Object(seed));
        }
        if let Some(outputs) = self
            .inner
            .values
            .get_mut(OUTPUTS_KEY)
            .and_then(Value::as_object_mut)
        {
            outputs.insert(name.into(), value);
        }
        Ok(())
    }

    /// The output set visible from this context, or an empty one.
    ///
    /// A non-object value under the reserved key counts as no outputs.
    pub fn outputs(&self) -> OutputSet {
        match self.get(OUTPUTS_KEY) {
            Some(Value::Object(outputs)) => outputs.clone(),
            _ => OutputSet::new(),
        }
    }
}
