//! Simulation state types
//!
//! The ball, the drum geometry and the per-step physics switches.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::forces::Diagnostics;
use super::surface::{Surface, SurfaceId, regenerate};
use crate::consts::*;

/// Physical makeup of the ball, swapped as a whole
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BallPreset {
    #[default]
    Tennis,
    Balloon,
}

impl BallPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            BallPreset::Tennis => "tennis",
            BallPreset::Balloon => "balloon",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "tennis" => Some(BallPreset::Tennis),
            "balloon" => Some(BallPreset::Balloon),
            _ => None,
        }
    }

    /// Physical constants for this preset
    pub fn properties(&self) -> BallProperties {
        match self {
            BallPreset::Tennis => BallProperties {
                radius: 0.035,
                mass: 0.058,
                restitution: 0.75,
                drag_coefficient: 0.55,
            },
            BallPreset::Balloon => BallProperties {
                radius: 0.075,
                mass: 0.001,
                restitution: 0.10,
                drag_coefficient: 0.47,
            },
        }
    }
}

/// Constants of the ball body
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BallProperties {
    /// Meters, > 0
    pub radius: f32,
    /// Kilograms, > 0
    pub mass: f32,
    /// Fraction of normal velocity kept after a bounce, in [0, 1]
    pub restitution: f32,
    pub drag_coefficient: f32,
}

impl BallProperties {
    /// Cross-sectional area (m²)
    #[inline]
    pub fn area(&self) -> f32 {
        std::f32::consts::PI * self.radius * self.radius
    }
}

/// The simulated ball, in the drum's rotating frame
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ball {
    /// Meters from the drum center
    pub pos: Vec2,
    /// Meters per second
    pub vel: Vec2,
    pub props: BallProperties,
}

impl Default for Ball {
    fn default() -> Self {
        Self::new(BallPreset::default())
    }
}

impl Ball {
    pub fn new(preset: BallPreset) -> Self {
        Self {
            pos: Vec2::ZERO,
            vel: Vec2::ZERO,
            props: preset.properties(),
        }
    }

    #[inline]
    pub fn radius(&self) -> f32 {
        self.props.radius
    }

    #[inline]
    pub fn speed(&self) -> f32 {
        self.vel.length()
    }

    /// Place the ball at rest at its start offset
    pub fn reset(&mut self, drum_radius: f32) {
        self.pos = Vec2::new(drum_radius * START_OFFSET, 0.0);
        self.vel = Vec2::ZERO;
    }

    pub fn is_finite(&self) -> bool {
        self.pos.is_finite() && self.vel.is_finite()
    }
}

/// Drum geometry and spin
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DrumConfig {
    pub rpm: f32,
    /// Meters
    pub radius: f32,
    /// At least 1
    pub vane_count: u32,
    /// Fraction of the radius a vane reaches inward, in (0, 1)
    pub vane_height: f32,
}

impl Default for DrumConfig {
    fn default() -> Self {
        Self {
            rpm: DEFAULT_RPM,
            radius: DEFAULT_DRUM_RADIUS,
            vane_count: DEFAULT_VANE_COUNT,
            vane_height: DEFAULT_VANE_HEIGHT,
        }
    }
}

impl DrumConfig {
    /// Radians per second
    #[inline]
    pub fn angular_velocity(&self) -> f32 {
        self.rpm * std::f32::consts::TAU / 60.0
    }

    /// Distance from the center to the inner tip of each vane
    #[inline]
    pub fn vane_inner_radius(&self) -> f32 {
        self.radius * (1.0 - self.vane_height)
    }
}

/// How air resistance is modelled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DragModel {
    /// Exponential velocity decay applied straight to the velocity
    #[default]
    Linear,
    /// ½ρv²CdA opposing motion, added to the acceleration
    Quadratic,
}

/// Direction multiplier for the Coriolis term
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CoriolisSign {
    #[default]
    Positive,
    Negative,
}

impl CoriolisSign {
    #[inline]
    pub fn factor(&self) -> f32 {
        match self {
            CoriolisSign::Positive => 1.0,
            CoriolisSign::Negative => -1.0,
        }
    }
}

/// Which pseudo-forces and drag terms are simulated.
///
/// Read once per step and handed to the force model by value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    pub coriolis: bool,
    pub centrifugal: bool,
    pub drag: bool,
    pub drag_model: DragModel,
    pub coriolis_sign: CoriolisSign,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            coriolis: true,
            centrifugal: true,
            drag: true,
            drag_model: DragModel::Linear,
            coriolis_sign: CoriolisSign::Positive,
        }
    }
}

impl PhysicsConfig {
    /// Gravity only: every pseudo-force and drag switched off
    pub fn gravity_only() -> Self {
        Self {
            coriolis: false,
            centrifugal: false,
            drag: false,
            ..Self::default()
        }
    }
}

/// Everything the physics step reads and writes
#[derive(Debug, Clone)]
pub struct DrumState {
    pub ball: Ball,
    pub preset: BallPreset,
    pub drum: DrumConfig,
    pub physics: PhysicsConfig,
    /// Gravitational acceleration magnitude (m/s²)
    pub gravity: f32,
    /// kg/m³
    pub air_density: f32,
    /// Accumulated rotation (radians, never wrapped)
    pub angle: f32,
    /// Collidable surfaces for the current vane count
    pub surfaces: Vec<Surface>,
    /// Force magnitudes from the latest step
    pub diagnostics: Diagnostics,
    /// Steps taken since construction
    pub steps: u64,
}

impl Default for DrumState {
    fn default() -> Self {
        Self::new(DrumConfig::default())
    }
}

impl DrumState {
    pub fn new(drum: DrumConfig) -> Self {
        let mut state = Self {
            ball: Ball::new(BallPreset::default()),
            preset: BallPreset::default(),
            drum,
            physics: PhysicsConfig::default(),
            gravity: EARTH_GRAVITY,
            air_density: AIR_DENSITY,
            angle: 0.0,
            surfaces: regenerate(drum.vane_count),
            diagnostics: Diagnostics::default(),
            steps: 0,
        };
        state.reset();
        state
    }

    /// Ball back to its start offset, drum back to angle zero
    pub fn reset(&mut self) {
        self.ball.reset(self.drum.radius);
        self.angle = 0.0;
    }

    /// Swap the ball's physical constants, keeping its motion
    pub fn set_preset(&mut self, preset: BallPreset) {
        self.preset = preset;
        self.ball.props = preset.properties();
    }

    /// Look up a surface of the current catalog
    pub fn surface(&self, id: SurfaceId) -> Option<&Surface> {
        self.surfaces
            .get(id.catalog_position())
            .filter(|surface| surface.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_are_physical() {
        for preset in [BallPreset::Tennis, BallPreset::Balloon] {
            let p = preset.properties();
            assert!(p.radius > 0.0);
            assert!(p.mass > 0.0);
            assert!((0.0..=1.0).contains(&p.restitution));
        }
    }

    #[test]
    fn test_preset_from_str() {
        assert_eq!(BallPreset::from_str("Balloon"), Some(BallPreset::Balloon));
        assert_eq!(BallPreset::from_str("tennis"), Some(BallPreset::Tennis));
        assert_eq!(BallPreset::from_str("bowling"), None);
    }

    #[test]
    fn test_ball_reset() {
        let mut ball = Ball::default();
        ball.vel = Vec2::new(3.0, -1.0);
        ball.reset(0.8);
        assert!((ball.pos.x - 0.24).abs() < 1e-6);
        assert_eq!(ball.pos.y, 0.0);
        assert_eq!(ball.vel, Vec2::ZERO);
    }

    #[test]
    fn test_state_surface_lookup() {
        let state = DrumState::default();
        assert_eq!(state.surfaces.len(), 15);
        let id = SurfaceId::vane_trailing(4);
        assert_eq!(state.surface(id).map(|s| s.id), Some(id));
        assert!(state.surface(SurfaceId::drum(5)).is_none());
    }

    #[test]
    fn test_set_preset_keeps_motion() {
        let mut state = DrumState::default();
        state.ball.vel = Vec2::new(0.5, 0.5);
        state.set_preset(BallPreset::Balloon);
        assert_eq!(state.ball.props, BallPreset::Balloon.properties());
        assert_eq!(state.ball.vel, Vec2::new(0.5, 0.5));
    }

    #[test]
    fn test_drum_angular_velocity() {
        let drum = DrumConfig { rpm: 60.0, ..Default::default() };
        assert!((drum.angular_velocity() - std::f32::consts::TAU).abs() < 1e-5);
        assert!((DrumConfig::default().vane_inner_radius() - 0.56).abs() < 1e-6);
    }
}
