//! Reading values and their canonical text encoding.
//!
//! Producers hand the store a mix of booleans, numbers, strings and nested
//! structures. Every value is persisted as text: scalars in their natural
//! form (`87.5`, `true`, `Active`) and nested structures as compact JSON with
//! sorted mapping keys. [`Value`]'s `Display` impl is that encoding.

use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize};

/// One value in a [`Reading`](crate::Reading).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
  Null,
  Bool(bool),
  Number(serde_json::Number),
  String(String),
  Sequence(Vec<Value>),
  Mapping(BTreeMap<String, Value>),
}

impl Value {
  /// The canonical text stored in the `value` columns.
  pub fn encode(&self) -> String { self.to_string() }

  /// Convert into the equivalent [`serde_json::Value`].
  pub fn to_json(&self) -> serde_json::Value {
    match self {
      Self::Null => serde_json::Value::Null,
      Self::Bool(b) => serde_json::Value::Bool(*b),
      Self::Number(n) => serde_json::Value::Number(n.clone()),
      Self::String(s) => serde_json::Value::String(s.clone()),
      Self::Sequence(items) => {
        serde_json::Value::Array(items.iter().map(Self::to_json).collect())
      }
      Self::Mapping(entries) => serde_json::Value::Object(
        entries
          .iter()
          .map(|(k, v)| (k.clone(), v.to_json()))
          .collect(),
      ),
    }
  }

  pub fn is_null(&self) -> bool { matches!(self, Self::Null) }
}

impl fmt::Display for Value {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Null => f.write_str("null"),
      Self::Bool(b) => write!(f, "{b}"),
      Self::Number(n) => write!(f, "{n}"),
      // Strings pass through unquoted.
      Self::String(s) => f.write_str(s),
      Self::Sequence(_) | Self::Mapping(_) => write!(f, "{}", self.to_json()),
    }
  }
}

// ─── Conversions ─────────────────────────────────────────────────────────────

impl From<bool> for Value {
  fn from(b: bool) -> Self { Self::Bool(b) }
}

/// Non-finite floats have no textual JSON form and become [`Value::Null`].
impl From<f64> for Value {
  fn from(n: f64) -> Self {
    serde_json::Number::from_f64(n).map_or(Self::Null, Self::Number)
  }
}

impl From<f32> for Value {
  fn from(n: f32) -> Self { Self::from(f64::from(n)) }
}

macro_rules! from_integer {
  ($($t:ty),*) => {
    $(
      impl From<$t> for Value {
        fn from(n: $t) -> Self { Self::Number(serde_json::Number::from(n)) }
      }
    )*
  };
}

from_integer!(i8, i16, i32, i64, u8, u16, u32, u64, usize);

impl From<&str> for Value {
  fn from(s: &str) -> Self { Self::String(s.to_owned()) }
}

impl From<String> for Value {
  fn from(s: String) -> Self { Self::String(s) }
}

impl From<Vec<Value>> for Value {
  fn from(items: Vec<Value>) -> Self { Self::Sequence(items) }
}

impl From<BTreeMap<String, Value>> for Value {
  fn from(entries: BTreeMap<String, Value>) -> Self { Self::Mapping(entries) }
}

impl<T: Into<Value>> From<Option<T>> for Value {
  fn from(v: Option<T>) -> Self { v.map_or(Self::Null, Into::into) }
}

impl From<serde_json::Value> for Value {
  fn from(v: serde_json::Value) -> Self {
    match v {
      serde_json::Value::Null => Self::Null,
      serde_json::Value::Bool(b) => Self::Bool(b),
      serde_json::Value::Number(n) => Self::Number(n),
      serde_json::Value::String(s) => Self::String(s),
      serde_json::Value::Array(items) => {
        Self::Sequence(items.into_iter().map(Self::from).collect())
      }
      serde_json::Value::Object(entries) => Self::Mapping(
        entries.into_iter().map(|(k, v)| (k, Self::from(v))).collect(),
      ),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn scalars_use_their_natural_form() {
    assert_eq!(Value::from(87.5).encode(), "87.5");
    assert_eq!(Value::from(1.2).encode(), "1.2");
    assert_eq!(Value::from(120_i64).encode(), "120");
    assert_eq!(Value::from(true).encode(), "true");
    assert_eq!(Value::from("Delivery in progress").encode(), "Delivery in progress");
    assert_eq!(Value::Null.encode(), "null");
  }

  #[test]
  fn whole_floats_keep_their_decimal_point() {
    assert_eq!(Value::from(0.0).encode(), "0.0");
  }

  #[test]
  fn nested_values_encode_as_compact_json() {
    let errors = Value::from(vec![Value::from("Error 1"), Value::from("Error 2")]);
    assert_eq!(errors.encode(), r#"["Error 1","Error 2"]"#);

    let mut position = BTreeMap::new();
    position.insert("y".to_owned(), Value::from(2.5));
    position.insert("x".to_owned(), Value::from(10.25));
    assert_eq!(Value::from(position).encode(), r#"{"x":10.25,"y":2.5}"#);
  }

  #[test]
  fn non_finite_floats_become_null() {
    assert!(Value::from(f64::NAN).is_null());
    assert!(Value::from(f64::INFINITY).is_null());
  }

  #[test]
  fn deserializes_from_arbitrary_json() {
    let v: Value =
      serde_json::from_str(r#"{"a": [1, {"b": null}], "c": "x"}"#).unwrap();
    let Value::Mapping(entries) = &v else {
      panic!("expected a mapping, got {v:?}");
    };
    assert_eq!(entries["c"], Value::from("x"));
    assert_eq!(v.encode(), r#"{"a":[1,{"b":null}],"c":"x"}"#);
  }

  #[test]
  fn option_maps_none_to_null() {
    assert!(Value::from(None::<i32>).is_null());
    assert_eq!(Value::from(Some(3)).encode(), "3");
  }
}
