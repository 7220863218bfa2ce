//! MiR mobile robot: template and random reading generator.

use aas_core::{Reading, Template, shell::NewAsset};
use rand::{Rng, SeedableRng, rngs::StdRng};

use super::{ReadingSource, round2};

pub fn template() -> Template {
  Template::new()
    .submodel(
      "OperationalData",
      [
        "mode_text",
        "state_text",
        "battery_percentage",
        "battery_time_remaining",
        "velocity",
        "velocityAngular",
      ],
    )
    .submodel(
      "NavigationAndMission",
      [
        "mission_queue_id",
        "mission_text",
        "moved",
        "distance_to_next_target",
        "positionX",
        "positionY",
        "orientation",
      ],
    )
    .submodel(
      "ConfigurationAndSettings",
      [
        "joystick_low_speed_mode_enabled",
        "safety_system_muted",
        "unloadedMapChanges",
      ],
    )
}

pub struct MirSource {
  asset:    NewAsset,
  template: Template,
  rng:      StdRng,
}

impl MirSource {
  pub fn new(asset: NewAsset) -> Self { Self::with_rng(asset, StdRng::from_os_rng()) }

  pub fn with_rng(asset: NewAsset, rng: StdRng) -> Self {
    Self { asset, template: template(), rng }
  }
}

impl ReadingSource for MirSource {
  fn asset(&self) -> NewAsset { self.asset.clone() }

  fn template(&self) -> &Template { &self.template }

  fn next_reading(&mut self) -> Reading {
    let rng = &mut self.rng;
    Reading::new()
      .with("mode_text", "Operational")
      .with("state_text", "Active")
      .with("battery_percentage", round2(rng.random_range(0.0..=100.0)))
      .with("battery_time_remaining", rng.random_range(0..=120_i64))
      .with("velocity", round2(rng.random_range(0.0..=2.0)))
      .with("velocityAngular", round2(rng.random_range(-1.0..=1.0)))
      .with("mission_queue_id", rng.random_range(0..=10_i64))
      .with("mission_text", "Delivery in progress")
      .with("moved", rng.random_range(0..=1000_i64))
      .with("distance_to_next_target", round2(rng.random_range(0.0..=10.0)))
      .with("positionX", round2(rng.random_range(0.0..=100.0)))
      .with("positionY", round2(rng.random_range(0.0..=100.0)))
      .with("orientation", round2(rng.random_range(0.0..=360.0)))
      .with("joystick_low_speed_mode_enabled", rng.random_bool(0.5))
      .with("safety_system_muted", rng.random_bool(0.5))
      .with("unloadedMapChanges", rng.random_range(0..=5_i64))
  }
}

#[cfg(test)]
mod tests {
  use aas_core::Value;

  use super::*;

  fn source(seed: u64) -> MirSource {
    MirSource::with_rng(
      NewAsset::new("SN-MIR1234", "MiR-100", "AAS for MiR-100"),
      StdRng::seed_from_u64(seed),
    )
  }

  #[test]
  fn reading_covers_exactly_the_template() {
    let mut src = source(7);
    let reading = src.next_reading();

    for sm in src.template() {
      for key in &sm.keys {
        assert!(reading.contains_key(key), "missing {key}");
      }
    }
    assert!(reading.keys().all(|k| src.template().declares(k)));
  }

  #[test]
  fn battery_stays_in_range_with_two_decimals() {
    let mut src = source(1);
    for _ in 0..100 {
      let reading = src.next_reading();
      let Some(Value::Number(n)) = reading.get("battery_percentage") else {
        panic!("battery_percentage is not a number");
      };
      let v = n.as_f64().unwrap();
      assert!((0.0..=100.0).contains(&v));
      assert!(((v * 100.0).round() - v * 100.0).abs() < 1e-6);
    }
  }

  #[test]
  fn same_seed_same_readings() {
    assert_eq!(source(42).next_reading(), source(42).next_reading());
  }
}
