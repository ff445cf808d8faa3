//! Dryer - a ball tumbling in a rotating, vaned drum
//!
//! Collisions between the ball and the drum's surfaces become percussion
//! triggers.
//!
//! Core modules:
//! - `sim`: Rotating-frame physics (forces, integration, collisions, dispatch)
//! - `dryer`: The simulation facade (configuration, stepping, render egress)
//! - `render`: Screen-space projections and collision highlights
//! - `notes`: Surface to MIDI note / trigger mapping
//! - `params`: Parameter acquisition boundary (knobs and switches)
//! - `runner`: Frame loop with physics sub-stepping
//! - `settings`: JSON configuration

pub mod dryer;
pub mod notes;
pub mod params;
pub mod render;
pub mod runner;
pub mod settings;
pub mod sim;

pub use dryer::Dryer;
pub use notes::{NoteEvent, NoteMap, TriggerOutput};
pub use params::{ControlFrame, DriftSource, FixedSource, ParameterLimits, ParameterSource};
pub use runner::Runner;
pub use settings::Settings;
pub use sim::{BallPreset, CollisionEvent, DragModel, PhysicsConfig, Surface, SurfaceId, SurfaceKind};

use glam::Vec2;

/// Simulation constants
pub mod consts {
    /// Rendered frame period (60 Hz)
    pub const FRAME_DT: f32 = 1.0 / 60.0;
    /// Physics sub-steps per rendered frame
    pub const SUBSTEPS: u32 = 4;
    /// Physics timestep (240 Hz)
    pub const SIM_DT: f32 = FRAME_DT / SUBSTEPS as f32;
    /// Longest wall-clock frame the runner will simulate in one go
    pub const MAX_FRAME_DT: f32 = 0.033;
    /// How often knobs and switches are re-read (seconds)
    pub const PARAM_INTERVAL: f32 = 0.05;

    /// Gravitational acceleration (m/s²)
    pub const EARTH_GRAVITY: f32 = 9.81;
    pub const MOON_GRAVITY: f32 = 1.635;
    /// Air density at sea level (kg/m³)
    pub const AIR_DENSITY: f32 = 1.225;
    /// Exponential decay rate of the linear drag model (1/s)
    pub const LINEAR_DRAG_RATE: f32 = 0.1;

    /// Drum defaults
    pub const DEFAULT_RPM: f32 = 20.0;
    pub const DEFAULT_DRUM_RADIUS: f32 = 0.80;
    pub const DEFAULT_VANE_COUNT: u32 = 5;
    pub const DEFAULT_VANE_HEIGHT: f32 = 0.30;

    /// Ball start position as a fraction of the drum radius (along +x)
    pub const START_OFFSET: f32 = 0.3;

    /// Lint trap: collisions slower than this never reach listeners (m/s)
    pub const LINT_TRAP_THRESHOLD: f32 = 0.15;

    /// Distances below this are treated as zero (m)
    pub const DISTANCE_EPSILON: f32 = 1.0e-4;
    /// Speeds below this produce no quadratic drag (m/s)
    pub const SPEED_EPSILON: f32 = 1.0e-3;

    /// Canvas spans this many drum radii
    pub const VIEW_SPAN: f32 = 2.2;
}

/// Normalize an angle of any magnitude to [0, 2π)
#[inline]
pub fn normalize_angle(angle: f32) -> f32 {
    let wrapped = angle.rem_euclid(std::f32::consts::TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs
    if wrapped >= std::f32::consts::TAU { 0.0 } else { wrapped }
}

/// Convert polar (r, theta) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: f32, theta: f32) -> Vec2 {
    Vec2::new(r * theta.cos(), r * theta.sin())
}

/// Convert cartesian (x, y) to polar (r, theta)
#[inline]
pub fn cartesian_to_polar(pos: Vec2) -> (f32, f32) {
    (pos.length(), pos.y.atan2(pos.x))
}

/// Rotate a vector counter-clockwise by `angle` radians
#[inline]
pub fn rotate(v: Vec2, angle: f32) -> Vec2 {
    Vec2::from_angle(angle).rotate(v)
}
