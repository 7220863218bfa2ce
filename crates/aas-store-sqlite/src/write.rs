//! Reading writer: one history row plus one current-value update per element,
//! committed together.

use std::collections::HashMap;

use aas_core::{
  Reading, Template,
  store::{RecordedReading, WritePolicy},
};
use chrono::{DateTime, Utc};
use rusqlite::{Connection, TransactionBehavior, params};
use uuid::Uuid;

use crate::{
  Result,
  encode::{encode_dt, encode_uuid},
  sync::submodel_id,
};

/// Write `reading` for `asset_id` inside one immediate transaction. Any error
/// drops the transaction, rolling back every row already written.
///
/// `clock` is read only once the write lock is held, so history timestamps
/// follow commit order across connections.
pub fn record_reading(
  conn: &mut Connection,
  asset_id: &str,
  template: &Template,
  reading: &Reading,
  policy: WritePolicy,
  clock: impl FnOnce() -> DateTime<Utc>,
) -> Result<RecordedReading> {
  let strict = policy == WritePolicy::Strict;
  if strict && let Some(key) = reading.keys().find(|k| !template.declares(k)) {
    return Err(aas_core::Error::UnknownKey(key.to_owned()).into());
  }

  let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
  let now = clock();
  let recorded_at = encode_dt(now);
  let mut elements_written = 0;
  let mut skipped = Vec::new();

  for sm in template {
    let present = sm.keys.iter().filter(|k| reading.contains_key(k));

    let Some(sm_id) = submodel_id(&tx, asset_id, &sm.title)? else {
      if strict {
        return Err(
          aas_core::Error::MissingSubmodel {
            asset_id: asset_id.to_owned(),
            title:    sm.title.clone(),
          }
          .into(),
        );
      }
      skipped.extend(present.map(|k| format!("{}/{k}", sm.title)));
      continue;
    };

    let element_ids = element_ids(&tx, &sm_id)?;
    for key in present {
      let Some(element_id) = element_ids.get(key) else {
        if strict {
          return Err(
            aas_core::Error::MissingElement {
              asset_id: asset_id.to_owned(),
              title:    sm.title.clone(),
              key:      key.clone(),
            }
            .into(),
          );
        }
        skipped.push(format!("{}/{key}", sm.title));
        continue;
      };

      // `present` only yields keys the reading contains.
      let Some(value) = reading.get(key) else { continue };
      let encoded = value.encode();

      tx.execute(
        "INSERT INTO submodel_element_history (id, submodel_element_id, value, recorded_at)
         VALUES (?1, ?2, ?3, ?4)",
        params![encode_uuid(Uuid::new_v4()), element_id, encoded, recorded_at],
      )?;
      tx.execute(
        "UPDATE submodel_element SET value = ?1 WHERE id = ?2",
        params![encoded, element_id],
      )?;
      elements_written += 1;
    }
  }

  tx.commit()?;
  Ok(RecordedReading { recorded_at: now, elements_written, skipped })
}

/// Map of element key → element id for one submodel.
fn element_ids(conn: &Connection, submodel_id: &str) -> Result<HashMap<String, String>> {
  let mut stmt = conn.prepare("SELECT key, id FROM submodel_element WHERE submodel_id = ?1")?;
  let ids = stmt
    .query_map(params![submodel_id], |r| Ok((r.get(0)?, r.get(1)?)))?
    .collect::<rusqlite::Result<HashMap<String, String>>>()?;
  Ok(ids)
}
