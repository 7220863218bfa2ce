//! Templates — the declared structure of an asset class.
//!
//! A template is an ordered mapping from submodel title to an ordered list of
//! element keys. Titles are unique within a template and keys are unique
//! within a submodel; the builder merges repeats instead of duplicating them.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Namespace prefix of every derived submodel semantic identifier.
pub const SEMANTIC_ID_NAMESPACE: &str = "http://omnifactory-assets.com/";

/// The semantic identifier stored for a submodel with the given title.
pub fn semantic_id(title: &str) -> String { format!("{SEMANTIC_ID_NAMESPACE}{title}") }

/// One submodel entry of a [`Template`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmodelTemplate {
  pub title: String,
  pub keys:  Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Template {
  submodels: Vec<SubmodelTemplate>,
}

impl Template {
  pub fn new() -> Self { Self::default() }

  /// Append a submodel, or extend it if `title` is already declared.
  pub fn submodel<I, K>(mut self, title: impl Into<String>, keys: I) -> Self
  where
    I: IntoIterator<Item = K>,
    K: Into<String>,
  {
    let title = title.into();
    let idx = match self.submodels.iter().position(|s| s.title == title) {
      Some(idx) => idx,
      None => {
        self.submodels.push(SubmodelTemplate { title, keys: Vec::new() });
        self.submodels.len() - 1
      }
    };
    let entry = &mut self.submodels[idx];
    for key in keys {
      let key = key.into();
      if !entry.keys.contains(&key) {
        entry.keys.push(key);
      }
    }
    self
  }

  pub fn iter(&self) -> std::slice::Iter<'_, SubmodelTemplate> { self.submodels.iter() }

  pub fn get(&self, title: &str) -> Option<&SubmodelTemplate> {
    self.submodels.iter().find(|s| s.title == title)
  }

  /// Whether any submodel declares `key`.
  pub fn declares(&self, key: &str) -> bool {
    self.submodels.iter().any(|s| s.keys.iter().any(|k| k == key))
  }

  pub fn len(&self) -> usize { self.submodels.len() }

  pub fn is_empty(&self) -> bool { self.submodels.is_empty() }

  /// Reject empty templates and blank titles or keys.
  pub fn validate(&self) -> Result<()> {
    if self.submodels.is_empty() {
      return Err(Error::InvalidInput("template declares no submodels".into()));
    }
    for sm in &self.submodels {
      if sm.title.trim().is_empty() {
        return Err(Error::InvalidInput("submodel title is empty".into()));
      }
      if sm.keys.iter().any(|k| k.trim().is_empty()) {
        return Err(Error::InvalidInput(format!(
          "submodel {:?} declares an empty element key",
          sm.title
        )));
      }
    }
    Ok(())
  }
}

impl<'a> IntoIterator for &'a Template {
  type Item = &'a SubmodelTemplate;
  type IntoIter = std::slice::Iter<'a, SubmodelTemplate>;

  fn into_iter(self) -> Self::IntoIter { self.submodels.iter() }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn preserves_declaration_order() {
    let t = Template::new()
      .submodel("OperationalData", ["velocity", "battery_percentage"])
      .submodel("Navigation", ["positionX"]);

    let titles: Vec<_> = t.iter().map(|s| s.title.as_str()).collect();
    assert_eq!(titles, ["OperationalData", "Navigation"]);
    assert_eq!(t.get("OperationalData").unwrap().keys, ["velocity", "battery_percentage"]);
  }

  #[test]
  fn repeated_titles_and_keys_merge() {
    let t = Template::new()
      .submodel("A", ["x", "y", "x"])
      .submodel("A", ["y", "z"]);

    assert_eq!(t.len(), 1);
    assert_eq!(t.get("A").unwrap().keys, ["x", "y", "z"]);
  }

  #[test]
  fn validate_rejects_empty_and_blank() {
    assert!(matches!(Template::new().validate(), Err(Error::InvalidInput(_))));
    assert!(Template::new().submodel(" ", ["k"]).validate().is_err());
    assert!(Template::new().submodel("A", [""]).validate().is_err());
    assert!(Template::new().submodel("A", ["k"]).validate().is_ok());
  }

  #[test]
  fn declares_searches_all_submodels() {
    let t = Template::new().submodel("A", ["x"]).submodel("B", ["y"]);
    assert!(t.declares("y"));
    assert!(!t.declares("z"));
  }

  #[test]
  fn semantic_id_is_namespaced_title() {
    assert_eq!(semantic_id("OperationalData"), "http://omnifactory-assets.com/OperationalData");
  }
}
