//! Parameter acquisition boundary
//!
//! Knobs and switches arrive as a [`ControlFrame`]. Where they come from
//! (potentiometers, a UI, a test) is up to the [`ParameterSource`].

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Accepted ranges for drum parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParameterLimits {
    pub rpm_min: f32,
    pub rpm_max: f32,
    pub drum_size_min_cm: f32,
    pub drum_size_max_cm: f32,
    pub vanes_min: u32,
    pub vanes_max: u32,
    pub vane_height_min_percent: f32,
    pub vane_height_max_percent: f32,
}

impl Default for ParameterLimits {
    fn default() -> Self {
        Self {
            rpm_min: 1.0,
            rpm_max: 40.0,
            drum_size_min_cm: 60.0,
            drum_size_max_cm: 100.0,
            vanes_min: 1,
            vanes_max: 9,
            vane_height_min_percent: 10.0,
            vane_height_max_percent: 50.0,
        }
    }
}

impl ParameterLimits {
    /// Repair inverted or out-of-domain bounds so clamping cannot panic
    pub fn sanitized(self) -> Self {
        let ordered = |lo: f32, hi: f32| if lo <= hi { (lo, hi) } else { (hi, lo) };
        let (rpm_min, rpm_max) = ordered(self.rpm_min.max(0.0), self.rpm_max.max(0.0));
        let (drum_size_min_cm, drum_size_max_cm) =
            ordered(self.drum_size_min_cm.max(1.0), self.drum_size_max_cm.max(1.0));
        let (vane_height_min_percent, vane_height_max_percent) = ordered(
            self.vane_height_min_percent.clamp(1.0, 99.0),
            self.vane_height_max_percent.clamp(1.0, 99.0),
        );
        let vanes_min = self.vanes_min.max(1);
        Self {
            rpm_min,
            rpm_max,
            drum_size_min_cm,
            drum_size_max_cm,
            vanes_min,
            vanes_max: self.vanes_max.max(vanes_min),
            vane_height_min_percent,
            vane_height_max_percent,
        }
    }

    pub fn clamp_rpm(&self, rpm: f32) -> f32 {
        rpm.clamp(self.rpm_min, self.rpm_max)
    }

    pub fn clamp_drum_size(&self, cm: f32) -> f32 {
        cm.clamp(self.drum_size_min_cm, self.drum_size_max_cm)
    }

    pub fn clamp_vanes(&self, vanes: i64) -> u32 {
        vanes.clamp(self.vanes_min as i64, self.vanes_max as i64) as u32
    }

    pub fn clamp_vane_height(&self, percent: f32) -> f32 {
        percent.clamp(self.vane_height_min_percent, self.vane_height_max_percent)
    }
}

/// One reading of every control
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlFrame {
    pub rpm: f32,
    pub drum_size_cm: f32,
    pub vanes: i64,
    pub vane_height_percent: f32,
    /// Balloon instead of tennis ball
    pub balloon: bool,
    pub lint_trap: bool,
    pub moon_gravity: bool,
}

impl Default for ControlFrame {
    fn default() -> Self {
        Self {
            rpm: DEFAULT_RPM,
            drum_size_cm: DEFAULT_DRUM_RADIUS * 100.0,
            vanes: DEFAULT_VANE_COUNT as i64,
            vane_height_percent: DEFAULT_VANE_HEIGHT * 100.0,
            balloon: false,
            lint_trap: false,
            moon_gravity: false,
        }
    }
}

/// Something that can be polled for the current control settings
pub trait ParameterSource {
    fn read(&mut self) -> ControlFrame;
}

/// Always returns the same reading
#[derive(Debug, Clone, Default)]
pub struct FixedSource {
    pub frame: ControlFrame,
}

impl FixedSource {
    pub fn new(frame: ControlFrame) -> Self {
        Self { frame }
    }
}

impl ParameterSource for FixedSource {
    fn read(&mut self) -> ControlFrame {
        self.frame
    }
}

/// A seeded random walk over the knobs, standing in for a performer.
///
/// Switches flip rarely; knobs move a small step per reading and stay
/// within the limits.
#[derive(Debug, Clone)]
pub struct DriftSource {
    frame: ControlFrame,
    limits: ParameterLimits,
    rng: Pcg32,
    /// Chance per reading that any one switch flips
    pub switch_chance: f64,
    /// Chance per reading that the vane knob clicks to a neighbor
    pub vane_chance: f64,
}

impl DriftSource {
    pub fn new(start: ControlFrame, limits: ParameterLimits, seed: u64) -> Self {
        Self {
            frame: start,
            limits: limits.sanitized(),
            rng: Pcg32::seed_from_u64(seed),
            switch_chance: 0.002,
            vane_chance: 0.01,
        }
    }

    fn wander(&mut self, value: f32, lo: f32, hi: f32) -> f32 {
        let step = (hi - lo) * 0.01;
        (value + self.rng.random_range(-step..=step)).clamp(lo, hi)
    }
}

impl ParameterSource for DriftSource {
    fn read(&mut self) -> ControlFrame {
        let l = self.limits;
        self.frame.rpm = self.wander(self.frame.rpm, l.rpm_min, l.rpm_max);
        self.frame.drum_size_cm =
            self.wander(self.frame.drum_size_cm, l.drum_size_min_cm, l.drum_size_max_cm);
        self.frame.vane_height_percent = self.wander(
            self.frame.vane_height_percent,
            l.vane_height_min_percent,
            l.vane_height_max_percent,
        );

        if self.rng.random_bool(self.vane_chance) {
            let delta = if self.rng.random_bool(0.5) { 1 } else { -1 };
            self.frame.vanes = l.clamp_vanes(self.frame.vanes + delta) as i64;
        }
        if self.rng.random_bool(self.switch_chance) {
            self.frame.balloon = !self.frame.balloon;
        }
        if self.rng.random_bool(self.switch_chance) {
            self.frame.lint_trap = !self.frame.lint_trap;
        }
        if self.rng.random_bool(self.switch_chance) {
            self.frame.moon_gravity = !self.frame.moon_gravity;
        }
        self.frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limits_clamp() {
        let limits = ParameterLimits::default();
        assert_eq!(limits.clamp_rpm(0.0), 1.0);
        assert_eq!(limits.clamp_rpm(100.0), 40.0);
        assert_eq!(limits.clamp_drum_size(80.0), 80.0);
        assert_eq!(limits.clamp_vanes(-3), 1);
        assert_eq!(limits.clamp_vanes(12), 9);
        assert_eq!(limits.clamp_vane_height(99.0), 50.0);
    }

    #[test]
    fn test_sanitized_fixes_inverted_bounds() {
        let limits = ParameterLimits {
            rpm_min: 50.0,
            rpm_max: 10.0,
            vanes_min: 0,
            vanes_max: 0,
            ..Default::default()
        }
        .sanitized();
        assert_eq!((limits.rpm_min, limits.rpm_max), (10.0, 50.0));
        assert_eq!((limits.vanes_min, limits.vanes_max), (1, 1));
    }

    #[test]
    fn test_fixed_source() {
        let frame = ControlFrame { rpm: 33.0, ..Default::default() };
        let mut source = FixedSource::new(frame);
        assert_eq!(source.read(), frame);
        assert_eq!(source.read(), frame);
    }

    #[test]
    fn test_drift_is_seeded_and_bounded() {
        let limits = ParameterLimits::default();
        let mut a = DriftSource::new(ControlFrame::default(), limits, 7);
        let mut b = DriftSource::new(ControlFrame::default(), limits, 7);
        for _ in 0..2000 {
            let fa = a.read();
            assert_eq!(fa, b.read());
            assert!((limits.rpm_min..=limits.rpm_max).contains(&fa.rpm));
            assert!((limits.drum_size_min_cm..=limits.drum_size_max_cm).contains(&fa.drum_size_cm));
            assert!((1..=9).contains(&fa.vanes));
        }
    }
}
