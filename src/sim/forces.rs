//! Forces on the ball in the drum's rotating frame
//!
//! The simulation lives in the frame that spins with the drum, so:
//! - gravity, fixed in the world, appears to rotate backwards with the drum angle
//! - centrifugal and Coriolis pseudo-forces appear
//! - drag opposes the ball's velocity relative to the drum (and its air)

use glam::Vec2;
use serde::Serialize;

use super::state::{Ball, DragModel, PhysicsConfig};
use crate::consts::{DISTANCE_EPSILON, LINEAR_DRAG_RATE, SPEED_EPSILON};

/// Drum-side inputs to the force model for one step
#[derive(Debug, Clone, Copy)]
pub struct DrumFrame {
    /// Accumulated drum rotation (radians, unbounded)
    pub angle: f32,
    /// Radians per second
    pub angular_velocity: f32,
    /// Magnitude of gravitational acceleration (m/s²)
    pub gravity: f32,
    /// kg/m³
    pub air_density: f32,
}

/// Individual acceleration terms (m/s²)
#[derive(Debug, Clone, Copy, Default)]
pub struct ForceBreakdown {
    pub gravity: Vec2,
    pub centrifugal: Vec2,
    pub coriolis: Vec2,
    /// Quadratic drag only; the linear model acts on velocity directly
    pub drag: Vec2,
    /// Reported drag strength for whichever model is active
    pub drag_magnitude: f32,
}

impl ForceBreakdown {
    #[inline]
    pub fn total(&self) -> Vec2 {
        self.gravity + self.centrifugal + self.coriolis + self.drag
    }
}

/// Force magnitudes from the latest step, for display and tuning
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Diagnostics {
    pub centrifugal_magnitude: f32,
    pub coriolis_magnitude: f32,
    pub drag_magnitude: f32,
    /// Ball speed after integration
    pub total_velocity: f32,
}

impl Diagnostics {
    pub fn from_forces(forces: &ForceBreakdown, speed: f32) -> Self {
        Self {
            centrifugal_magnitude: forces.centrifugal.length(),
            coriolis_magnitude: forces.coriolis.length(),
            drag_magnitude: forces.drag_magnitude,
            total_velocity: speed,
        }
    }
}

/// World-fixed gravity seen from a drum rotated by `angle`
#[inline]
pub fn gravity(angle: f32, g: f32) -> Vec2 {
    let (sin, cos) = angle.sin_cos();
    Vec2::new(-g * sin, -g * cos)
}

/// Outward pseudo-force ω²d along the ball's radius; zero at the center
pub fn centrifugal(pos: Vec2, angular_velocity: f32) -> Vec2 {
    let dist = pos.length();
    if dist < DISTANCE_EPSILON {
        return Vec2::ZERO;
    }
    pos / dist * (angular_velocity * angular_velocity * dist)
}

/// Coriolis term `sign * (2ωvy, -2ωvx)`
#[inline]
pub fn coriolis(vel: Vec2, angular_velocity: f32, sign: f32) -> Vec2 {
    Vec2::new(2.0 * angular_velocity * vel.y, -2.0 * angular_velocity * vel.x) * sign
}

/// Quadratic drag acceleration: ½ρ|v|²CdA / m, opposing velocity
pub fn quadratic_drag(ball: &Ball, air_density: f32) -> Vec2 {
    let speed = ball.speed();
    if speed < SPEED_EPSILON {
        return Vec2::ZERO;
    }
    let force = 0.5 * air_density * speed * speed * ball.props.drag_coefficient * ball.props.area();
    -ball.vel / speed * (force / ball.props.mass)
}

/// Linear drag: exponential decay of velocity over `dt`
#[inline]
pub fn linear_drag(vel: Vec2, dt: f32) -> Vec2 {
    vel * (-LINEAR_DRAG_RATE * dt).exp()
}

/// Acceleration on the ball for the current state.
///
/// Pure: the linear drag model is not included here, see [`linear_drag`].
pub fn acceleration(ball: &Ball, frame: &DrumFrame, config: &PhysicsConfig) -> ForceBreakdown {
    let mut forces = ForceBreakdown {
        gravity: gravity(frame.angle, frame.gravity),
        ..Default::default()
    };

    if config.centrifugal {
        forces.centrifugal = centrifugal(ball.pos, frame.angular_velocity);
    }

    if config.coriolis {
        forces.coriolis = coriolis(ball.vel, frame.angular_velocity, config.coriolis_sign.factor());
    }

    if config.drag {
        match config.drag_model {
            DragModel::Quadratic => {
                forces.drag = quadratic_drag(ball, frame.air_density);
                forces.drag_magnitude = forces.drag.length();
            }
            DragModel::Linear => {
                forces.drag_magnitude = LINEAR_DRAG_RATE * ball.speed();
            }
        }
    }

    forces
}
