//! Placeholder tokens and their extraction/substitution over JSON trees.
//!
//! A placeholder is a `${name}` token. It occurs either as an *exact* leaf (the whole JSON string
//! equals the token) or *embedded* inside a longer string such as a formatter. Exact leaves are
//! replaced by the bound value verbatim, so an array binding produces an array node. Embedded
//! occurrences are replaced textually.

use crate::{Error, Result};
use indexmap::IndexMap;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::borrow::Borrow;
use std::collections::BTreeSet;

/// Placeholder -> value bindings used by [`substitute`].
pub type Bindings = IndexMap<Placeholder, Value>;

fn token_regex() -> &'static Regex {
    static RE: std::sync::OnceLock<Regex> = std::sync::OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\$\{[^}]+\}").expect("valid regex"))
}

fn exact_regex() -> &'static Regex {
    static RE: std::sync::OnceLock<Regex> = std::sync::OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\$\{[^}]+\}$").expect("valid regex"))
}

/// A `${name}` token. The enclosed name is never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Placeholder(String);

impl Placeholder {
    /// Parses an exact token such as `${chart_title}`.
    pub fn parse(token: &str) -> Option<Self> {
        is_placeholder(token).then(|| Self(token.to_string()))
    }

    /// Wraps a bare variable name into a token: `chart_title` -> `${chart_title}`.
    pub fn from_variable(name: &str) -> Option<Self> {
        let name = name.trim();
        if name.is_empty() || name.contains('}') {
            return None;
        }
        Some(Self(format!("${{{name}}}")))
    }

    /// Accepts either a full token or a bare variable name.
    pub fn from_token_or_variable(raw: &str) -> Option<Self> {
        Self::parse(raw.trim()).or_else(|| Self::from_variable(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The enclosed name, without the `${` `}` wrapper.
    pub fn variable(&self) -> &str {
        &self.0[2..self.0.len() - 1]
    }
}

impl std::fmt::Display for Placeholder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for Placeholder {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Placeholder {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Placeholder {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        if is_placeholder(&value) {
            Ok(Self(value))
        } else {
            Err(Error::InvalidPlaceholder { token: value })
        }
    }
}

impl std::str::FromStr for Placeholder {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::try_from(s.to_string())
    }
}

impl From<Placeholder> for String {
    fn from(value: Placeholder) -> Self {
        value.0
    }
}

/// Returns `true` if `text` is exactly one placeholder token.
pub fn is_placeholder(text: &str) -> bool {
    exact_regex().is_match(text)
}

/// Every placeholder occurring in `text`, exact or embedded, in order of appearance.
pub fn placeholders_in(text: &str) -> impl Iterator<Item = Placeholder> + '_ {
    token_regex()
        .find_iter(text)
        .map(|m| Placeholder(m.as_str().to_string()))
}

/// Collects the placeholders of every string leaf in `tree`. Map keys are not inspected.
pub fn extract(tree: &Value) -> BTreeSet<Placeholder> {
    let mut out = BTreeSet::new();
    collect(tree, &mut out);
    out
}

fn collect(node: &Value, out: &mut BTreeSet<Placeholder>) {
    match node {
        Value::String(text) => out.extend(placeholders_in(text)),
        Value::Array(items) => items.iter().for_each(|item| collect(item, out)),
        Value::Object(map) => map.values().for_each(|value| collect(value, out)),
        Value::Null | Value::Bool(_) | Value::Number(_) => {}
    }
}

/// Returns a new tree with bound placeholders replaced.
///
/// Unbound placeholders are left in place, which is how leftovers are detected afterwards with
/// [`extract`].
pub fn substitute(tree: &Value, bindings: &Bindings) -> Value {
    match tree {
        Value::String(text) => substitute_text(text, bindings),
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| substitute(item, bindings))
                .collect(),
        ),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, value)| (key.clone(), substitute(value, bindings)))
                .collect(),
        ),
        other => other.clone(),
    }
}

fn substitute_text(text: &str, bindings: &Bindings) -> Value {
    if is_placeholder(text) {
        if let Some(value) = bindings.get(text) {
            return value.clone();
        }
    }
    if !text.contains("${") {
        return Value::String(text.to_string());
    }

    let replaced = token_regex().replace_all(text, |caps: &Captures<'_>| {
        match bindings.get(&caps[0]) {
            Some(value) => coerce_to_text(value),
            None => caps[0].to_string(),
        }
    });
    Value::String(replaced.into_owned())
}

/// Deterministic string form used for embedded substitution.
pub fn coerce_to_text(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(_) | Value::Object(_) => {
            serde_json::to_string(value).unwrap_or_else(|_| value.to_string())
        }
    }
}

/// Placeholders in `tree` that have no binding.
pub fn missing(tree: &Value, bindings: &Bindings) -> BTreeSet<Placeholder> {
    extract(tree)
        .into_iter()
        .filter(|placeholder| !bindings.contains_key(placeholder))
        .collect()
}
