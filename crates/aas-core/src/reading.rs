//! A single snapshot of key→value telemetry produced by one worker cycle.

use std::collections::{BTreeMap, btree_map};

use serde::{Deserialize, Serialize};

use crate::Value;

/// One reading. Keys are element keys; a key may appear in several submodels
/// of a template and is written to each of them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Reading(BTreeMap<String, Value>);

impl Reading {
  pub fn new() -> Self { Self::default() }

  /// Builder-style [`insert`](Self::insert).
  pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
    self.insert(key, value);
    self
  }

  pub fn insert(
    &mut self,
    key: impl Into<String>,
    value: impl Into<Value>,
  ) -> Option<Value> {
    self.0.insert(key.into(), value.into())
  }

  pub fn get(&self, key: &str) -> Option<&Value> { self.0.get(key) }

  pub fn contains_key(&self, key: &str) -> bool { self.0.contains_key(key) }

  pub fn keys(&self) -> impl Iterator<Item = &str> { self.0.keys().map(String::as_str) }

  pub fn iter(&self) -> btree_map::Iter<'_, String, Value> { self.0.iter() }

  pub fn len(&self) -> usize { self.0.len() }

  pub fn is_empty(&self) -> bool { self.0.is_empty() }
}

impl<K, V> FromIterator<(K, V)> for Reading
where
  K: Into<String>,
  V: Into<Value>,
{
  fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
    Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
  }
}

impl<'a> IntoIterator for &'a Reading {
  type Item = (&'a String, &'a Value);
  type IntoIter = btree_map::Iter<'a, String, Value>;

  fn into_iter(self) -> Self::IntoIter { self.0.iter() }
}
