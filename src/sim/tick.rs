//! Fixed timestep physics step
//!
//! One call advances the drum and ball by `dt`, resolves contacts and hands
//! every resulting collision to the dispatcher before returning.

use glam::Vec2;

use super::collision::resolve_collisions;
use super::events::Dispatcher;
use super::forces::{Diagnostics, DrumFrame, acceleration, linear_drag};
use super::state::{Ball, DragModel, DrumState};

/// Semi-implicit Euler: velocity first, then position with the new velocity
#[inline]
pub fn integrate(ball: &mut Ball, accel: Vec2, dt: f32) {
    ball.vel += accel * dt;
    ball.pos += ball.vel * dt;
}

/// Advance the simulation by one timestep
pub fn tick(state: &mut DrumState, dispatcher: &mut Dispatcher, dt: f32) {
    let angular_velocity = state.drum.angular_velocity();
    state.angle += angular_velocity * dt;
    state.steps += 1;

    let frame = DrumFrame {
        angle: state.angle,
        angular_velocity,
        gravity: state.gravity,
        air_density: state.air_density,
    };
    let physics = state.physics;
    let forces = acceleration(&state.ball, &frame, &physics);

    if physics.drag && physics.drag_model == DragModel::Linear {
        state.ball.vel = linear_drag(state.ball.vel, dt);
    }

    integrate(&mut state.ball, forces.total(), dt);
    state.diagnostics = Diagnostics::from_forces(&forces, state.ball.speed());

    let surfaces = &state.surfaces;
    resolve_collisions(&mut state.ball, &state.drum, |event| {
        let found = surfaces
            .get(event.surface.catalog_position())
            .filter(|surface| surface.id == event.surface);
        match found {
            Some(surface) => {
                dispatcher.consider_collision(surface, event.speed);
            }
            None => log::warn!("Collision with unknown surface {}", event.surface),
        }
    });

    if !state.ball.is_finite() {
        log::error!("Ball state became non-finite at step {}, resetting", state.steps);
        state.ball.reset(state.drum.radius);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::{EARTH_GRAVITY, LINEAR_DRAG_RATE, SIM_DT};
    use crate::sim::forces::gravity;
    use crate::sim::state::{DrumConfig, PhysicsConfig};
    use crate::sim::surface::{Surface, SurfaceId};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn still_drum() -> DrumState {
        DrumState::new(DrumConfig { rpm: 0.0, ..Default::default() })
    }

    #[test]
    fn test_integrate_semi_implicit() {
        let mut ball = Ball::default();
        ball.pos = Vec2::new(0.1, 0.2);
        ball.vel = Vec2::new(1.0, 0.0);
        integrate(&mut ball, Vec2::new(0.0, -10.0), 0.1);
        assert!((ball.vel - Vec2::new(1.0, -1.0)).length() < 1e-6);
        // Position uses the updated velocity
        assert!((ball.pos - Vec2::new(0.2, 0.1)).length() < 1e-6);
    }

    #[test]
    fn test_gravity_only_step_is_exact() {
        let mut state = DrumState::default();
        state.physics = PhysicsConfig::gravity_only();
        state.ball.vel = Vec2::new(0.3, -0.2);
        let v0 = state.ball.vel;
        let mut dispatcher = Dispatcher::new();

        tick(&mut state, &mut dispatcher, SIM_DT);

        let expected = v0 + gravity(state.angle, EARTH_GRAVITY) * SIM_DT;
        assert!((state.ball.vel - expected).length() < 1e-6);
    }

    #[test]
    fn test_angle_accumulates_without_wrapping() {
        let mut state = DrumState::new(DrumConfig { rpm: 60.0, ..Default::default() });
        let mut dispatcher = Dispatcher::new();
        for _ in 0..480 {
            tick(&mut state, &mut dispatcher, SIM_DT);
        }
        // Two full turns at 60 rpm
        assert!((state.angle - 2.0 * std::f32::consts::TAU).abs() < 1e-2);
        assert_eq!(state.steps, 480);
    }

    #[test]
    fn test_linear_drag_applied_to_velocity() {
        let mut state = still_drum();
        state.gravity = 0.0;
        state.physics = PhysicsConfig {
            coriolis: false,
            centrifugal: false,
            ..Default::default()
        };
        state.ball.vel = Vec2::new(1.0, 0.0);
        let mut dispatcher = Dispatcher::new();

        tick(&mut state, &mut dispatcher, 0.5);
        assert!((state.ball.vel.x - (-LINEAR_DRAG_RATE * 0.5).exp()).abs() < 1e-6);
        assert!((state.diagnostics.drag_magnitude - LINEAR_DRAG_RATE).abs() < 1e-6);
    }

    #[test]
    fn test_falling_ball_hits_floor_once() {
        let mut state = still_drum();
        state.physics = PhysicsConfig::gravity_only();
        // Between vanes 3 and 4 so only the wall is in reach
        state.ball.pos = Vec2::new(0.0, -0.5);
        let hits = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&hits);
        let mut dispatcher = Dispatcher::new();
        dispatcher.subscribe(Box::new(move |s: &Surface, v: f32| sink.borrow_mut().push((s.id, v))));

        for _ in 0..240 {
            tick(&mut state, &mut dispatcher, SIM_DT);
            assert!(state.ball.pos.length() + state.ball.radius() <= state.drum.radius + 1e-4);
        }

        let hits = hits.borrow();
        assert!(!hits.is_empty());
        // 270° falls in segment 3 of 5 (216°..288°); repeated floor hits debounce
        assert_eq!(hits[0].0, SurfaceId::drum(3));
        assert!(hits.iter().all(|(id, _)| *id == SurfaceId::drum(3)));
        assert_eq!(hits.len(), 1);
    }
}
