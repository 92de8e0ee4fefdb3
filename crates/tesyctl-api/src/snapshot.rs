// Raw device state snapshot.
//
// The heater answers every API call with a flat JSON object. Depending on
// firmware build the same field may arrive as a JSON string or a bare
// number, so deserialization coerces scalars to their string form and the
// rest of the stack only ever sees string values.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use crate::error::Error;
use crate::fields;

/// One complete state readout of the device: an immutable flat map of
/// string field keys to string values, exactly as reported.
///
/// A snapshot is produced atomically per fetch and never mutated in
/// place -- [`merged`](Self::merged) returns a new snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RawSnapshot {
    #[serde(flatten)]
    fields: BTreeMap<String, String>,
}

impl RawSnapshot {
    /// Build a snapshot from a parsed JSON body.
    ///
    /// The body must be a JSON object. Scalar values are coerced to
    /// strings; nested arrays/objects are kept as their compact JSON text
    /// (some firmwares nest the weekly program fields).
    pub fn from_value(value: Value) -> Result<Self, Error> {
        let Value::Object(map) = value else {
            return Err(Error::Deserialization {
                message: "expected a JSON object".into(),
                body: value.to_string(),
            });
        };

        let mut fields = BTreeMap::new();
        for (key, val) in map {
            let text = match val {
                Value::String(s) => s,
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => if b { "1" } else { "0" }.to_string(),
                Value::Null => continue,
                other => other.to_string(),
            };
            fields.insert(key, text);
        }
        Ok(Self { fields })
    }

    /// Build a snapshot directly from key/value pairs (tests, merges).
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            fields: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Look up a raw field value.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    /// Whether the field is present.
    pub fn contains(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// Boolean-like field accessor: `true` iff the value is the literal `"1"`.
    pub fn flag(&self, key: &str) -> bool {
        self.get(key) == Some("1")
    }

    /// API-level success: the `api` field equals the literal `"OK"`.
    pub fn api_ok(&self) -> bool {
        self.get(fields::API) == Some("OK")
    }

    /// Number of reported fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterate over `(key, value)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// A copy of this snapshot with one field replaced (or inserted).
    pub fn merged(&self, key: &str, value: &str) -> Self {
        let mut fields = self.fields.clone();
        fields.insert(key.to_owned(), value.to_owned());
        Self { fields }
    }
}

/// Read a device response body into a snapshot, mapping HTTP-level and
/// JSON-level failures onto [`Error`]. Shared by both client variants.
pub(crate) async fn read_snapshot(resp: reqwest::Response) -> Result<RawSnapshot, Error> {
    let status = resp.status();
    if !status.is_success() {
        return Err(Error::Http {
            status: status.as_u16(),
        });
    }

    let body = resp.text().await.map_err(Error::Transport)?;
    let value: Value = serde_json::from_str(&body).map_err(|e| {
        let preview = truncate(&body, 200);
        Error::Deserialization {
            message: format!("{e} (body preview: {preview:?})"),
            body: body.clone(),
        }
    })?;

    RawSnapshot::from_value(value)
}

/// Cut `s` down to at most `max` bytes without splitting a multi-byte
/// character.
pub(crate) fn truncate(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_owned();
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    s[..end].to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn coerces_scalars_to_strings() {
        let snap = RawSnapshot::from_value(json!({
            "api": "OK",
            "tmpC": 48,
            "pwr": true,
            "wdBm": -67,
            "gone": null,
        }))
        .unwrap();

        assert_eq!(snap.get("tmpC"), Some("48"));
        assert_eq!(snap.get("pwr"), Some("1"));
        assert_eq!(snap.get("wdBm"), Some("-67"));
        assert!(!snap.contains("gone"));
        assert!(snap.api_ok());
    }

    #[test]
    fn rejects_non_object_bodies() {
        let err = RawSnapshot::from_value(json!(["not", "an", "object"])).unwrap_err();
        assert!(matches!(err, Error::Deserialization { .. }));
    }

    #[test]
    fn merged_keeps_original_untouched() {
        let snap = RawSnapshot::from_pairs([("mode", "0"), ("pwr", "1")]);
        let merged = snap.merged("mode", "4");

        assert_eq!(snap.get("mode"), Some("0"));
        assert_eq!(merged.get("mode"), Some("4"));
        assert_eq!(merged.get("pwr"), Some("1"));
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello", 3), "hel");
        // 'é' is two bytes; truncating mid-char must back off.
        assert_eq!(truncate("héllo", 2), "h");
    }

    #[test]
    fn flag_requires_the_one_literal() {
        let snap = RawSnapshot::from_pairs([("bst", "1"), ("vac", "0"), ("lck", "yes")]);
        assert!(snap.flag("bst"));
        assert!(!snap.flag("vac"));
        assert!(!snap.flag("lck"));
        assert!(!snap.flag("missing"));
    }
}
