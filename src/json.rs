//! JavaScript-flavoured JSON values.
//!
//! Grid settings are plain JSON except for callbacks, which jqGrid expects as
//! executable code. `JsValue::Expr` carries such code and is written out
//! verbatim by the encoder instead of as a quoted string.

use std::fmt;

const INDENT: &str = "    ";

/// A JSON value that may also hold a raw JavaScript expression.
#[derive(Debug, Clone, PartialEq)]
pub enum JsValue {
    Null,
    Bool(bool),
    Number(serde_json::Number),
    String(String),
    Array(Vec<JsValue>),
    Object(JsObject),
    /// Raw code, emitted without quoting or escaping.
    Expr(String),
}

impl JsValue {
    /// Wrap a piece of JavaScript so it is emitted as code.
    pub fn expr(code: impl Into<String>) -> Self {
        JsValue::Expr(code.into())
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            JsValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            JsValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            JsValue::Number(n) => n.as_i64(),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&JsObject> {
        match self {
            JsValue::Object(o) => Some(o),
            _ => None,
        }
    }

    /// True for `null`, `false` and `""`.
    pub fn is_blank(&self) -> bool {
        match self {
            JsValue::Null => true,
            JsValue::Bool(b) => !b,
            JsValue::String(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Compact encoding.
    pub fn to_json(&self) -> String {
        let mut out = String::new();
        write_value(self, &mut out, None);
        out
    }

    /// Indented encoding, four spaces per level.
    pub fn to_json_pretty(&self) -> String {
        let mut out = String::new();
        write_value(self, &mut out, Some(0));
        out
    }
}

/// Encode `value`, pretty-printed when `pretty` is set.
pub fn encode(value: &JsValue, pretty: bool) -> String {
    if pretty {
        value.to_json_pretty()
    } else {
        value.to_json()
    }
}

impl fmt::Display for JsValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_json())
    }
}

fn write_value(value: &JsValue, out: &mut String, depth: Option<usize>) {
    match value {
        JsValue::Null => out.push_str("null"),
        JsValue::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        JsValue::Number(n) => out.push_str(&n.to_string()),
        JsValue::String(s) => write_string(s, out),
        JsValue::Expr(code) => out.push_str(code),
        JsValue::Array(items) => {
            if items.is_empty() {
                out.push_str("[]");
                return;
            }
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                newline(out, depth.map(|d| d + 1));
                write_value(item, out, depth.map(|d| d + 1));
            }
            newline(out, depth);
            out.push(']');
        }
        JsValue::Object(object) => {
            if object.is_empty() {
                out.push_str("{}");
                return;
            }
            out.push('{');
            for (i, (key, item)) in object.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                newline(out, depth.map(|d| d + 1));
                write_string(key, out);
                out.push(':');
                if depth.is_some() {
                    out.push(' ');
                }
                write_value(item, out, depth.map(|d| d + 1));
            }
            newline(out, depth);
            out.push('}');
        }
    }
}

fn write_string(s: &str, out: &mut String) {
    // serde_json's Display for a string value is its escaped, quoted form
    out.push_str(&serde_json::Value::from(s).to_string());
}

fn newline(out: &mut String, depth: Option<usize>) {
    if let Some(depth) = depth {
        out.push('\n');
        for _ in 0..depth {
            out.push_str(INDENT);
        }
    }
}

/// An insertion-ordered JSON object.
///
/// Inserting an existing key replaces its value in place, so the key keeps
/// the slot it was first given.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JsObject {
    entries: Vec<(String, JsValue)>,
}

impl JsObject {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<JsValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert or replace; returns the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<JsValue>) -> Option<JsValue> {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&JsValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn remove(&mut self, key: &str) -> Option<JsValue> {
        let index = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(index).1)
    }

    /// Copy every entry of `other` over this object; `other` wins on collisions.
    pub fn merge(&mut self, other: &JsObject) {
        for (key, value) in other.iter() {
            self.insert(key.clone(), value.clone());
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &JsValue)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }
}

impl<K: Into<String>, V: Into<JsValue>> FromIterator<(K, V)> for JsObject {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut object = JsObject::new();
        for (key, value) in iter {
            object.insert(key, value);
        }
        object
    }
}

impl IntoIterator for JsObject {
    type Item = (String, JsValue);
    type IntoIter = std::vec::IntoIter<(String, JsValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

// ==================== Conversions ====================

impl From<bool> for JsValue {
    fn from(value: bool) -> Self {
        JsValue::Bool(value)
    }
}

macro_rules! from_integer {
    ($($t:ty),*) => {
        $(impl From<$t> for JsValue {
            fn from(value: $t) -> Self {
                JsValue::Number(value.into())
            }
        })*
    };
}

from_integer!(i32, i64, u32, u64, usize);

impl From<f64> for JsValue {
    fn from(value: f64) -> Self {
        serde_json::Number::from_f64(value)
            .map(JsValue::Number)
            .unwrap_or(JsValue::Null)
    }
}

impl From<&str> for JsValue {
    fn from(value: &str) -> Self {
        JsValue::String(value.to_string())
    }
}

impl From<String> for JsValue {
    fn from(value: String) -> Self {
        JsValue::String(value)
    }
}

impl From<&String> for JsValue {
    fn from(value: &String) -> Self {
        JsValue::String(value.clone())
    }
}

impl From<JsObject> for JsValue {
    fn from(value: JsObject) -> Self {
        JsValue::Object(value)
    }
}

impl<T: Into<JsValue>> From<Vec<T>> for JsValue {
    fn from(value: Vec<T>) -> Self {
        JsValue::Array(value.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<JsValue>> From<Option<T>> for JsValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(JsValue::Null)
    }
}

impl From<serde_json::Value> for JsValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => JsValue::Null,
            serde_json::Value::Bool(b) => JsValue::Bool(b),
            serde_json::Value::Number(n) => JsValue::Number(n),
            serde_json::Value::String(s) => JsValue::String(s),
            serde_json::Value::Array(items) => {
                JsValue::Array(items.into_iter().map(JsValue::from).collect())
            }
            serde_json::Value::Object(map) => JsValue::Object(map.into_iter().collect()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scalars_compact() {
        assert_eq!(JsValue::Null.to_json(), "null");
        assert_eq!(JsValue::from(true).to_json(), "true");
        assert_eq!(JsValue::from(42).to_json(), "42");
        assert_eq!(JsValue::from("a\"b").to_json(), r#""a\"b""#);
    }

    #[test]
    fn test_expr_is_not_quoted() {
        let object = JsObject::new()
            .with("name", "grid")
            .with("onSelectRow", JsValue::expr("function(id) { edit(id); }"));

        assert_eq!(
            JsValue::from(object).to_json(),
            r#"{"name":"grid","onSelectRow":function(id) { edit(id); }}"#
        );
    }

    #[test]
    fn test_expr_inside_string_stays_string() {
        let value = JsValue::from("function() {}");
        assert_eq!(value.to_json(), r#""function() {}""#);
    }

    #[test]
    fn test_pretty_output() {
        let value = JsValue::from(JsObject::new().with("a", 1).with("b", vec![1, 2]));
        assert_eq!(
            value.to_json_pretty(),
            "{\n    \"a\": 1,\n    \"b\": [\n        1,\n        2\n    ]\n}"
        );
    }

    #[test]
    fn test_empty_containers() {
        assert_eq!(JsValue::from(JsObject::new()).to_json_pretty(), "{}");
        assert_eq!(JsValue::Array(vec![]).to_json_pretty(), "[]");
    }

    #[test]
    fn test_insert_keeps_first_slot() {
        let mut object = JsObject::new().with("a", 1).with("b", 2);
        let previous = object.insert("a", 3);

        assert_eq!(previous, Some(JsValue::from(1)));
        assert_eq!(object.keys().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(object.get("a"), Some(&JsValue::from(3)));
    }

    #[test]
    fn test_merge_overrides() {
        let mut base = JsObject::new().with("a", 1).with("b", 2);
        base.merge(&JsObject::new().with("b", 20).with("c", 30));

        assert_eq!(JsValue::from(base).to_json(), r#"{"a":1,"b":20,"c":30}"#);
    }

    #[test]
    fn test_from_serde_value_keeps_order() {
        let value = JsValue::from(json!({ "z": 1, "a": [true, null] }));
        assert_eq!(value.to_json(), r#"{"z":1,"a":[true,null]}"#);
    }

    #[test]
    fn test_is_blank() {
        assert!(JsValue::from("").is_blank());
        assert!(JsValue::Null.is_blank());
        assert!(!JsValue::from("500").is_blank());
        assert!(!JsValue::from(500).is_blank());
    }

    #[test]
    fn test_nan_becomes_null() {
        assert_eq!(JsValue::from(f64::NAN), JsValue::Null);
    }
}
