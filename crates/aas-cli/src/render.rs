//! Plain-text tables for terminal output.

use std::fmt::Write as _;

use aas_core::shell::{Asset, AssetView, HistoryEntry, SubmodelElement, SubmodelView};

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Rendered in place of a value that was never recorded.
const UNSET: &str = "-";

pub fn assets(assets: &[Asset]) -> String {
  if assets.is_empty() {
    return "no assets\n".to_owned();
  }
  let width = assets.iter().map(|a| a.asset_id.len()).max().unwrap_or(0);
  let mut out = String::new();
  for a in assets {
    let _ = writeln!(out, "{:<width$}  {}", a.asset_id, a.name);
  }
  out
}

pub fn asset(view: &AssetView) -> String {
  let mut out = String::new();
  let _ = writeln!(out, "{} ({})", view.asset.name, view.asset.asset_id);
  let _ = writeln!(out, "{}", view.asset.description);
  for sm in &view.submodels {
    out.push('\n');
    out.push_str(&submodel(sm));
  }
  out
}

pub fn submodel(view: &SubmodelView) -> String {
  let mut out = String::new();
  let _ = writeln!(out, "[{}]", view.submodel.title);
  let width = view.values.keys().map(String::len).max().unwrap_or(0);
  for (key, value) in &view.values {
    let _ = writeln!(out, "  {key:<width$}  {}", value.as_deref().unwrap_or(UNSET));
  }
  out
}

pub fn element(element: &SubmodelElement) -> String {
  format!(
    "{} = {} ({})\n",
    element.key,
    element.value.as_deref().unwrap_or(UNSET),
    element.value_type.as_str(),
  )
}

pub fn history(entries: &[HistoryEntry]) -> String {
  let mut out = String::new();
  for e in entries {
    let _ = writeln!(out, "{}  {}", e.recorded_at.format(TIME_FORMAT), e.value);
  }
  out
}

#[cfg(test)]
mod tests {
  use std::collections::BTreeMap;

  use aas_core::shell::{Submodel, ValueType};
  use chrono::{TimeZone, Utc};
  use uuid::Uuid;

  use super::*;

  fn asset_row(id: &str, name: &str) -> Asset {
    Asset {
      asset_id:    id.to_owned(),
      name:        name.to_owned(),
      description: format!("AAS for {name}"),
      created_at:  Utc::now(),
    }
  }

  #[test]
  fn asset_ids_are_aligned() {
    let out = assets(&[asset_row("SN-1", "One"), asset_row("SN-KUKA", "Arm")]);
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines, ["SN-1     One", "SN-KUKA  Arm"]);
  }

  #[test]
  fn empty_list_says_so() {
    assert_eq!(assets(&[]), "no assets\n");
  }

  #[test]
  fn unset_values_render_as_dash() {
    let view = SubmodelView {
      submodel: Submodel {
        submodel_id: Uuid::new_v4(),
        asset_id:    "SN-1".to_owned(),
        title:       "OperationalData".to_owned(),
        semantic_id: "http://omnifactory-assets.com/OperationalData".to_owned(),
        created_at:  Utc::now(),
      },
      values: BTreeMap::from([
        ("velocity".to_owned(), Some("1.2".to_owned())),
        ("battery_percentage".to_owned(), None),
      ]),
    };
    assert_eq!(
      submodel(&view),
      "[OperationalData]\n  battery_percentage  -\n  velocity            1.2\n"
    );
  }

  #[test]
  fn element_shows_type() {
    let el = SubmodelElement {
      element_id:  Uuid::new_v4(),
      submodel_id: Uuid::new_v4(),
      key:         "velocity".to_owned(),
      value:       Some("0.5".to_owned()),
      value_type:  ValueType::String,
      created_at:  Utc::now(),
    };
    assert_eq!(element(&el), "velocity = 0.5 (string)\n");
  }

  #[test]
  fn history_lines_carry_timestamps() {
    let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
    let entry = HistoryEntry {
      history_id:  Uuid::new_v4(),
      element_id:  Uuid::new_v4(),
      value:       "87.5".to_owned(),
      recorded_at: at,
    };
    assert_eq!(history(&[entry]), "2024-05-01 12:00:00.000  87.5\n");
  }
}
