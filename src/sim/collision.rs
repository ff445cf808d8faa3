//! Collision detection and response against the drum wall and vanes
//!
//! Both checks run on the post-integration ball. A contact pushes the ball
//! out along the contact normal; only a ball moving into the surface has its
//! velocity reflected and produces a collision event.

use glam::Vec2;

use super::state::{Ball, DrumConfig};
use super::surface::{SurfaceId, segment_for_angle, vane_angle};
use crate::consts::DISTANCE_EPSILON;
use crate::polar_to_cartesian;

/// A resolved hit, ready for dispatch
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionEvent {
    pub surface: SurfaceId,
    /// Magnitude of the normal velocity before reflection (m/s)
    pub speed: f32,
}

/// Geometric overlap between the ball and a surface
#[derive(Debug, Clone, Copy)]
pub struct Contact {
    /// Unit normal pointing from the surface toward the ball center
    pub normal: Vec2,
    /// Overlap depth (for position correction)
    pub penetration: f32,
}

/// Which face of a vane the ball is on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VaneSide {
    Leading,
    Trailing,
}

/// A vane as a line segment in the drum frame
#[derive(Debug, Clone, Copy)]
pub struct VaneSegment {
    pub index: u32,
    /// Inner tip
    pub start: Vec2,
    /// Where the vane meets the wall
    pub end: Vec2,
}

impl VaneSegment {
    pub fn new(index: u32, drum: &DrumConfig) -> Self {
        let angle = vane_angle(index, drum.vane_count);
        Self {
            index,
            start: polar_to_cartesian(drum.vane_inner_radius(), angle),
            end: polar_to_cartesian(drum.radius, angle),
        }
    }

    /// Vanes of the drum, in index order
    pub fn all(drum: &DrumConfig) -> impl Iterator<Item = VaneSegment> + '_ {
        (0..drum.vane_count).map(move |i| Self::new(i, drum))
    }

    /// Unit perpendicular, pointing toward increasing drum angle
    pub fn perpendicular(&self) -> Option<Vec2> {
        let dir = self.end - self.start;
        let len = dir.length();
        if len < DISTANCE_EPSILON {
            return None;
        }
        Some(Vec2::new(-dir.y, dir.x) / len)
    }

    /// Which face a point lies on
    pub fn side_of(&self, point: Vec2) -> Option<VaneSide> {
        let perp = self.perpendicular()?;
        if (point - self.start).dot(perp) > 0.0 {
            Some(VaneSide::Leading)
        } else {
            Some(VaneSide::Trailing)
        }
    }

    pub fn surface_id(&self, side: VaneSide) -> SurfaceId {
        match side {
            VaneSide::Leading => SurfaceId::vane_leading(self.index),
            VaneSide::Trailing => SurfaceId::vane_trailing(self.index),
        }
    }
}

/// Check the ball against the outer wall.
///
/// Returns `None` when inside, or when the ball sits on the center where
/// no normal exists.
pub fn wall_contact(pos: Vec2, ball_radius: f32, drum_radius: f32) -> Option<Contact> {
    let dist = pos.length();
    if dist < DISTANCE_EPSILON || dist + ball_radius <= drum_radius {
        return None;
    }
    Some(Contact {
        normal: -pos / dist, // Point inward
        penetration: dist + ball_radius - drum_radius,
    })
}

/// Check the ball against one vane segment.
///
/// Only the segment's interior counts: a ball whose projection falls past
/// either endpoint never touches it.
pub fn vane_contact(pos: Vec2, ball_radius: f32, vane: &VaneSegment) -> Option<Contact> {
    let line_vec = vane.end - vane.start;
    let line_len_sq = line_vec.length_squared();
    if line_len_sq < DISTANCE_EPSILON * DISTANCE_EPSILON {
        return None; // Degenerate segment
    }

    let t = (pos - vane.start).dot(line_vec) / line_len_sq;
    if !(0.0..=1.0).contains(&t) {
        return None;
    }

    let closest = vane.start + line_vec * t;
    let offset = pos - closest;
    let dist = offset.length();
    if dist >= ball_radius || dist < DISTANCE_EPSILON {
        return None;
    }

    Some(Contact {
        normal: offset / dist,
        penetration: ball_radius - dist,
    })
}

/// Bounce with restitution: v' = v - (1 + e)(v·n)n
#[inline]
pub fn reflect_velocity(velocity: Vec2, normal: Vec2, restitution: f32) -> Vec2 {
    velocity - (1.0 + restitution) * velocity.dot(normal) * normal
}

/// Push the ball out of a contact and bounce it if it is moving inward.
///
/// Returns the incoming normal speed when the ball was reflected.
pub fn resolve_contact(ball: &mut Ball, contact: &Contact) -> Option<f32> {
    ball.pos += contact.normal * contact.penetration;

    let vn = ball.vel.dot(contact.normal);
    if vn >= 0.0 {
        return None;
    }
    ball.vel = reflect_velocity(ball.vel, contact.normal, ball.props.restitution);
    Some(vn.abs())
}

/// Resolve the outer wall, reporting which drum segment was struck
pub fn resolve_wall(ball: &mut Ball, drum: &DrumConfig) -> Option<CollisionEvent> {
    let contact = wall_contact(ball.pos, ball.radius(), drum.radius)?;
    let speed = resolve_contact(ball, &contact)?;
    let angle = ball.pos.y.atan2(ball.pos.x);
    Some(CollisionEvent {
        surface: SurfaceId::drum(segment_for_angle(angle, drum.vane_count)),
        speed,
    })
}

/// Resolve one vane, reporting the face that was struck
pub fn resolve_vane(ball: &mut Ball, vane: &VaneSegment) -> Option<CollisionEvent> {
    let contact = vane_contact(ball.pos, ball.radius(), vane)?;
    // Classify before the correction moves the ball
    let side = vane.side_of(ball.pos)?;
    let speed = resolve_contact(ball, &contact)?;
    Some(CollisionEvent {
        surface: vane.surface_id(side),
        speed,
    })
}

/// Run the wall check then every vane check, emitting each hit in order
pub fn resolve_collisions(ball: &mut Ball, drum: &DrumConfig, mut emit: impl FnMut(CollisionEvent)) {
    if let Some(event) = resolve_wall(ball, drum) {
        emit(event);
    }
    for vane in VaneSegment::all(drum) {
        if let Some(event) = resolve_vane(ball, &vane) {
            emit(event);
        }
    }
}
