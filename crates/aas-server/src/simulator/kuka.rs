//! KUKA arm: template and random reading generator.

use aas_core::{Reading, Template, shell::NewAsset};
use rand::{Rng, SeedableRng, rngs::StdRng};

use super::{ReadingSource, pick, round2};

const BATTERY_STATES: &[&str] = &["Charging", "Discharging", "Full"];
const TOOL_STATES: &[&str] = &["Active", "Inactive", "Error"];
const MOTION_STATES: &[&str] = &["Moving", "Stopped", "Paused"];
const PROGRAM_STATES: &[&str] = &["Running", "Stopped", "Error"];

pub fn template() -> Template {
  Template::new()
    .submodel(
      "Operational_Data",
      ["battery_state", "robot_runtime", "velocity", "acceleration", "load"],
    )
    .submodel("Navigation_Data", ["position", "tool_status", "orientation"])
    .submodel("Mission_Data", ["number_of_missions", "timer"])
    .submodel("Process_Data", ["motion_state", "distance_to_next", "program_state"])
}

pub struct KukaSource {
  asset:    NewAsset,
  template: Template,
  rng:      StdRng,
}

impl KukaSource {
  pub fn new(asset: NewAsset) -> Self { Self::with_rng(asset, StdRng::from_os_rng()) }

  pub fn with_rng(asset: NewAsset, rng: StdRng) -> Self {
    Self { asset, template: template(), rng }
  }
}

impl ReadingSource for KukaSource {
  fn asset(&self) -> NewAsset { self.asset.clone() }

  fn template(&self) -> &Template { &self.template }

  fn next_reading(&mut self) -> Reading {
    let rng = &mut self.rng;

    let position = format!(
      "X:{} Y:{} Z:{}",
      round2(rng.random_range(0.0..=100.0)),
      round2(rng.random_range(0.0..=100.0)),
      round2(rng.random_range(0.0..=100.0)),
    );
    let orientation = format!(
      "Yaw:{} Pitch:{} Roll:{}",
      round2(rng.random_range(0.0..=360.0)),
      round2(rng.random_range(-90.0..=90.0)),
      round2(rng.random_range(-180.0..=180.0)),
    );
    let timer = format!(
      "{}:{}:{}",
      rng.random_range(0..=23),
      rng.random_range(0..=59),
      rng.random_range(0..=59),
    );

    Reading::new()
      .with("battery_state", pick(rng, BATTERY_STATES))
      .with("robot_runtime", rng.random_range(0..=10_000_i64))
      .with("velocity", round2(rng.random_range(0.0..=2.0)))
      .with("acceleration", round2(rng.random_range(0.0..=5.0)))
      .with("load", round2(rng.random_range(0.0..=50.0)))
      .with("position", position)
      .with("tool_status", pick(rng, TOOL_STATES))
      .with("orientation", orientation)
      .with("number_of_missions", rng.random_range(0..=10_i64))
      .with("timer", timer)
      .with("motion_state", pick(rng, MOTION_STATES))
      .with("distance_to_next", round2(rng.random_range(0.0..=20.0)))
      .with("program_state", pick(rng, PROGRAM_STATES))
  }
}
