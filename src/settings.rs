//! Dryer settings
//!
//! Stored as JSON. Missing fields take their defaults, so a settings file
//! only needs the values it changes.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::dryer::Dryer;
use crate::notes::DEFAULT_BASE_NOTE;
use crate::params::{ControlFrame, ParameterLimits};
use crate::sim::{BallPreset, PhysicsConfig};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Drum ===
    /// Drum speed (rpm)
    pub rpm: f32,
    /// Drum radius (cm)
    pub drum_size_cm: f32,
    pub vanes: u32,
    /// Vane height as a percentage of the drum radius
    pub vane_height_percent: f32,

    // === Ball and environment ===
    pub ball: BallPreset,
    pub moon_gravity: bool,
    pub physics: PhysicsConfig,

    // === Triggers ===
    pub lint_trap: bool,
    /// Minimum impact speed (m/s) that passes the lint trap
    pub lint_threshold: f32,
    /// MIDI note for the first surface
    pub base_note: u8,

    pub limits: ParameterLimits,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            rpm: DEFAULT_RPM,
            drum_size_cm: DEFAULT_DRUM_RADIUS * 100.0,
            vanes: DEFAULT_VANE_COUNT,
            vane_height_percent: DEFAULT_VANE_HEIGHT * 100.0,
            ball: BallPreset::Tennis,
            moon_gravity: false,
            physics: PhysicsConfig::default(),
            lint_trap: false,
            lint_threshold: LINT_TRAP_THRESHOLD,
            base_note: DEFAULT_BASE_NOTE,
            limits: ParameterLimits::default(),
        }
    }
}

impl Settings {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Load settings from a JSON file, falling back to defaults
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let json = match std::fs::read_to_string(path) {
            Ok(json) => json,
            Err(e) => {
                log::warn!("Could not read {}: {}; using default settings", path.display(), e);
                return Self::default();
            }
        };
        match Self::from_json(&json) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                log::warn!("Invalid settings in {}: {}; using default settings", path.display(), e);
                Self::default()
            }
        }
    }

    /// A new dryer configured from these settings
    pub fn build(&self) -> Dryer {
        let mut dryer = Dryer::with_limits(self.limits);
        self.apply(&mut dryer);
        dryer
    }

    /// Push every setting into an existing dryer
    pub fn apply(&self, dryer: &mut Dryer) {
        dryer.set_parameters(self.rpm, self.drum_size_cm, self.vanes as i64, self.vane_height_percent);
        if dryer.ball_preset() != self.ball {
            dryer.set_ball_preset(self.ball);
        }
        dryer.set_moon_gravity(self.moon_gravity);
        dryer.set_physics(self.physics);
        dryer.set_lint_trap(self.lint_trap);
        dryer.set_lint_threshold(self.lint_threshold);
    }

    /// The same settings as a control reading, e.g. to seed a parameter source
    pub fn to_control_frame(&self) -> ControlFrame {
        ControlFrame {
            rpm: self.rpm,
            drum_size_cm: self.drum_size_cm,
            vanes: self.vanes as i64,
            vane_height_percent: self.vane_height_percent,
            balloon: self.ball == BallPreset::Balloon,
            lint_trap: self.lint_trap,
            moon_gravity: self.moon_gravity,
        }
    }
}
