//! The dryer: drum, ball and collision dispatch behind one handle
//!
//! All mutation goes through `&mut Dryer`, so configuration, stepping and
//! listener registration are serialized by the borrow checker. Listeners run
//! inside [`Dryer::step`] and cannot reach back into the dryer.

use crate::consts::{EARTH_GRAVITY, MOON_GRAVITY};
use crate::params::{ControlFrame, ParameterLimits};
use crate::render::{BallSprite, DrumArc, VaneLine, View};
use crate::sim::{
    Ball, BallPreset, CoriolisSign, Diagnostics, DispatchStats, Dispatcher, DragModel, DrumConfig,
    DrumState, PhysicsConfig, Surface, regenerate, tick,
};

#[derive(Debug)]
pub struct Dryer {
    state: DrumState,
    dispatcher: Dispatcher,
    limits: ParameterLimits,
    moon_gravity: bool,
    /// Bumped whenever the vane count changes and surface ids are reissued
    surface_generation: u64,
}

impl Default for Dryer {
    fn default() -> Self {
        Self::new()
    }
}

impl Dryer {
    /// Default drum (20 rpm, 80 cm, 5 vanes at 30 %) with a tennis ball
    pub fn new() -> Self {
        Self::with_limits(ParameterLimits::default())
    }

    pub fn with_limits(limits: ParameterLimits) -> Self {
        Self {
            state: DrumState::default(),
            dispatcher: Dispatcher::new(),
            limits: limits.sanitized(),
            moon_gravity: false,
            surface_generation: 0,
        }
    }

    // === Configuration ===

    /// Update the drum from knob values, clamped to the configured limits.
    ///
    /// Non-finite values keep the current setting. Surfaces are rebuilt; if the
    /// vane count changed, previously issued surface ids are invalid.
    pub fn set_parameters(&mut self, rpm: f32, drum_size_cm: f32, vane_count: i64, vane_height_percent: f32) {
        let current = self.state.drum;
        let limits = self.limits;

        let rpm = finite_or(rpm, current.rpm, "rpm");
        let drum_cm = finite_or(drum_size_cm, current.radius * 100.0, "drum size");
        let height_percent = finite_or(vane_height_percent, current.vane_height * 100.0, "vane height");

        let drum = DrumConfig {
            rpm: limits.clamp_rpm(rpm),
            radius: limits.clamp_drum_size(drum_cm) / 100.0,
            vane_count: limits.clamp_vanes(vane_count),
            vane_height: limits.clamp_vane_height(height_percent) / 100.0,
        };
        if drum.vane_count as i64 != vane_count {
            log::warn!("Vane count {} clamped to {}", vane_count, drum.vane_count);
        }

        self.state.drum = drum;
        self.state.surfaces = regenerate(drum.vane_count);

        if drum.vane_count != current.vane_count {
            self.surface_generation += 1;
            self.dispatcher.forget_last();
            log::debug!(
                "Surfaces regenerated for {} vanes (generation {})",
                drum.vane_count,
                self.surface_generation
            );
        }
    }

    /// Apply a full control reading
    pub fn apply_controls(&mut self, frame: &ControlFrame) {
        self.set_parameters(frame.rpm, frame.drum_size_cm, frame.vanes, frame.vane_height_percent);
        let preset = if frame.balloon { BallPreset::Balloon } else { BallPreset::Tennis };
        if preset != self.state.preset {
            self.set_ball_preset(preset);
        }
        if frame.lint_trap != self.lint_trap() {
            self.set_lint_trap(frame.lint_trap);
        }
        if frame.moon_gravity != self.moon_gravity {
            self.set_moon_gravity(frame.moon_gravity);
        }
    }

    /// Replace the ball's physical constants
    pub fn set_ball_preset(&mut self, preset: BallPreset) {
        self.state.set_preset(preset);
        log::info!("Ball: {}", preset.as_str());
    }

    pub fn set_lint_trap(&mut self, enabled: bool) {
        self.dispatcher.set_lint_trap(enabled);
        log::info!("Lint trap: {}", on_off(enabled));
    }

    pub fn set_lint_threshold(&mut self, threshold: f32) {
        self.dispatcher.set_lint_threshold(threshold);
    }

    pub fn set_moon_gravity(&mut self, enabled: bool) {
        self.moon_gravity = enabled;
        self.state.gravity = if enabled { MOON_GRAVITY } else { EARTH_GRAVITY };
        log::info!("Moon gravity: {}", on_off(enabled));
    }

    /// Replace every physics switch at once
    pub fn set_physics(&mut self, physics: PhysicsConfig) {
        self.state.physics = physics;
    }

    pub fn set_coriolis(&mut self, enabled: bool) {
        self.state.physics.coriolis = enabled;
        log::info!("Coriolis: {}", on_off(enabled));
    }

    pub fn set_centrifugal(&mut self, enabled: bool) {
        self.state.physics.centrifugal = enabled;
        log::info!("Centrifugal: {}", on_off(enabled));
    }

    pub fn set_drag(&mut self, enabled: bool) {
        self.state.physics.drag = enabled;
        log::info!("Air drag: {}", on_off(enabled));
    }

    pub fn set_drag_model(&mut self, model: DragModel) {
        self.state.physics.drag_model = model;
        log::info!("Drag model: {:?}", model);
    }

    pub fn set_coriolis_sign(&mut self, sign: CoriolisSign) {
        self.state.physics.coriolis_sign = sign;
    }

    // === Simulation ===

    /// Advance by `dt` seconds; listeners fire before this returns
    pub fn step(&mut self, dt: f32) {
        if !dt.is_finite() || dt <= 0.0 {
            log::warn!("Ignoring step with dt = {}", dt);
            return;
        }
        tick(&mut self.state, &mut self.dispatcher, dt);
    }

    /// Ball back to its start offset at rest, drum angle back to zero
    pub fn reset(&mut self) {
        self.state.reset();
    }

    /// Register a collision listener; listeners are called in registration order
    pub fn on_collision(&mut self, listener: impl FnMut(&Surface, f32) + 'static) {
        self.dispatcher.subscribe(Box::new(listener));
    }

    // === Accessors ===

    pub fn ball(&self) -> &Ball {
        &self.state.ball
    }

    /// Mutable ball access for setting up initial conditions
    pub fn ball_mut(&mut self) -> &mut Ball {
        &mut self.state.ball
    }

    pub fn ball_preset(&self) -> BallPreset {
        self.state.preset
    }

    pub fn surfaces(&self) -> &[Surface] {
        &self.state.surfaces
    }

    pub fn surface_generation(&self) -> u64 {
        self.surface_generation
    }

    pub fn drum(&self) -> &DrumConfig {
        &self.state.drum
    }

    pub fn drum_angle(&self) -> f32 {
        self.state.angle
    }

    pub fn drum_radius(&self) -> f32 {
        self.state.drum.radius
    }

    pub fn vane_count(&self) -> u32 {
        self.state.drum.vane_count
    }

    pub fn vane_height(&self) -> f32 {
        self.state.drum.vane_height
    }

    pub fn angular_velocity(&self) -> f32 {
        self.state.drum.angular_velocity()
    }

    pub fn gravity(&self) -> f32 {
        self.state.gravity
    }

    pub fn physics(&self) -> PhysicsConfig {
        self.state.physics
    }

    pub fn lint_trap(&self) -> bool {
        self.dispatcher.lint_trap()
    }

    pub fn moon_gravity(&self) -> bool {
        self.moon_gravity
    }

    pub fn limits(&self) -> &ParameterLimits {
        &self.limits
    }

    pub fn diagnostics(&self) -> Diagnostics {
        self.state.diagnostics
    }

    pub fn dispatch_stats(&self) -> DispatchStats {
        self.dispatcher.stats()
    }

    pub fn steps(&self) -> u64 {
        self.state.steps
    }

    // === Render egress ===

    fn view(&self, canvas_size: u32) -> View {
        View::new(canvas_size, self.state.drum.radius, self.state.angle)
    }

    /// Ball on a square canvas, with the drum's rotation applied
    pub fn ball_sprite(&self, canvas_size: u32) -> BallSprite {
        self.view(canvas_size).ball(&self.state.ball)
    }

    /// Vane endpoints on a square canvas
    pub fn vane_lines(&self, canvas_size: u32) -> Vec<VaneLine> {
        self.view(canvas_size).vanes(&self.state.drum)
    }

    /// Drum wall segments on a square canvas, colored by surface
    pub fn drum_arcs(&self, canvas_size: u32) -> Vec<DrumArc> {
        self.view(canvas_size).drum_arcs(&self.state.drum, &self.state.surfaces)
    }
}

fn finite_or(value: f32, fallback: f32, name: &str) -> f32 {
    if value.is_finite() {
        value
    } else {
        log::warn!("Non-finite {} ({}), keeping {}", name, value, fallback);
        fallback
    }
}

fn on_off(enabled: bool) -> &'static str {
    if enabled { "ON" } else { "OFF" }
}
