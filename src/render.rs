//! Screen-space projections for a display collaborator
//!
//! Everything here is a pure function of the simulation state. The drum's
//! accumulated rotation is applied for display only; physics never sees it.
//! Output structs are plain-old-data so they can be uploaded as-is.

use std::collections::HashMap;
use std::f32::consts::TAU;

use bytemuck::{Pod, Zeroable};
use glam::Vec2;

use crate::consts::VIEW_SPAN;
use crate::rotate;
use crate::sim::surface::vane_angle;
use crate::sim::{Ball, DrumConfig, Surface, SurfaceId, SurfaceKind};

/// Highlight lost per rendered frame
pub const HIGHLIGHT_DECAY: f32 = 0.05;

/// Ball position and size in pixels
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct BallSprite {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
}

/// One vane as a pixel-space line
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct VaneLine {
    pub inner: [f32; 2],
    pub outer: [f32; 2],
    pub index: u32,
}

/// One drum wall segment.
///
/// Angles are counter-clockwise with y up (flip for y-down screens).
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct DrumArc {
    pub center: [f32; 2],
    pub radius: f32,
    pub start_angle: f32,
    pub end_angle: f32,
    pub color: [f32; 4],
    pub index: u32,
}

/// 0xRRGGBB to linear RGBA floats
pub fn rgba(color: u32, alpha: f32) -> [f32; 4] {
    let channel = |shift: u32| ((color >> shift) & 0xff) as f32 / 255.0;
    [channel(16), channel(8), channel(0), alpha.clamp(0.0, 1.0)]
}

/// Maps drum coordinates (meters, rotating frame) onto a square canvas
#[derive(Debug, Clone, Copy)]
pub struct View {
    center: Vec2,
    scale: f32,
    angle: f32,
}

impl View {
    pub fn new(canvas_size: u32, drum_radius: f32, drum_angle: f32) -> Self {
        let size = canvas_size as f32;
        Self {
            center: Vec2::splat(size / 2.0),
            scale: size / (drum_radius * VIEW_SPAN),
            angle: drum_angle,
        }
    }

    /// Pixels per meter
    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Drum-frame point to pixels (y down)
    pub fn project(&self, point: Vec2) -> Vec2 {
        let world = rotate(point, self.angle);
        Vec2::new(self.center.x + world.x * self.scale, self.center.y - world.y * self.scale)
    }

    pub fn ball(&self, ball: &Ball) -> BallSprite {
        let p = self.project(ball.pos);
        BallSprite {
            x: p.x,
            y: p.y,
            radius: ball.radius() * self.scale,
        }
    }

    pub fn vanes(&self, drum: &DrumConfig) -> Vec<VaneLine> {
        let inner_r = drum.vane_inner_radius();
        (0..drum.vane_count)
            .map(|i| {
                let dir = Vec2::from_angle(vane_angle(i, drum.vane_count));
                VaneLine {
                    inner: self.project(dir * inner_r).to_array(),
                    outer: self.project(dir * drum.radius).to_array(),
                    index: i,
                }
            })
            .collect()
    }

    pub fn drum_arcs(&self, drum: &DrumConfig, surfaces: &[Surface]) -> Vec<DrumArc> {
        let span = TAU / drum.vane_count.max(1) as f32;
        surfaces
            .iter()
            .filter(|s| s.kind() == SurfaceKind::Drum)
            .map(|s| {
                let start = s.index() as f32 * span + self.angle;
                DrumArc {
                    center: self.center.to_array(),
                    radius: drum.radius * self.scale,
                    start_angle: start,
                    end_angle: start + span,
                    color: rgba(s.color, 1.0),
                    index: s.index(),
                }
            })
            .collect()
    }
}

/// Fading per-surface flash after a collision
#[derive(Debug, Clone, Default)]
pub struct Highlights {
    active: HashMap<SurfaceId, f32>,
}

impl Highlights {
    pub fn new() -> Self {
        Self::default()
    }

    /// Light a surface at full intensity
    pub fn hit(&mut self, id: SurfaceId) {
        self.active.insert(id, 1.0);
    }

    /// Fade every highlight by one frame, dropping the spent ones
    pub fn decay(&mut self) {
        self.active.retain(|_, intensity| {
            *intensity -= HIGHLIGHT_DECAY;
            *intensity > 0.0
        });
    }

    /// Forget everything (surface ids were reissued)
    pub fn clear(&mut self) {
        self.active.clear();
    }

    pub fn intensity(&self, id: SurfaceId) -> f32 {
        self.active.get(&id).copied().unwrap_or(0.0)
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    /// Alpha for a drum wall segment
    pub fn drum_alpha(&self, index: u32) -> f32 {
        0.3 + self.intensity(SurfaceId::drum(index)) * 0.5
    }

    /// Alpha for a vane; either face lights the whole vane
    pub fn vane_alpha(&self, index: u32) -> f32 {
        let lead = self.intensity(SurfaceId::vane_leading(index));
        let trail = self.intensity(SurfaceId::vane_trailing(index));
        0.8 + lead.max(trail) * 0.2
    }
}
