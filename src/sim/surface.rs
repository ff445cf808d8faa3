//! Collidable surfaces of the drum
//!
//! Every vane slot contributes three surfaces: the arc of drum wall that
//! follows it, and the two faces of the vane itself. The set is a pure
//! function of the vane count.

use std::fmt;
use std::f32::consts::TAU;

use serde::{Deserialize, Serialize};

use crate::normalize_angle;

/// Display palette (0xRRGGBB), indexed modulo its length
pub const SURFACE_COLORS: [u32; 12] = [
    0xff6b6b, 0x4ecdc4, 0xffe66d, 0xa8e6cf, 0xff8b94, 0xc7ceea, 0xffd3b6, 0xffaaa5, 0xdcedc1,
    0xa8d8ea, 0xffccf9, 0xb4f8c8,
];

/// What kind of surface the ball struck
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SurfaceKind {
    /// A 1/N arc of the outer wall
    Drum,
    /// The face of a vane whose perpendicular points toward increasing angle
    VaneLeading,
    /// The opposite face of the vane
    VaneTrailing,
}

impl SurfaceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SurfaceKind::Drum => "drum",
            SurfaceKind::VaneLeading => "vane_leading",
            SurfaceKind::VaneTrailing => "vane_trailing",
        }
    }

    pub fn is_vane(&self) -> bool {
        matches!(self, SurfaceKind::VaneLeading | SurfaceKind::VaneTrailing)
    }
}

/// Stable identity of a surface while the vane count is unchanged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SurfaceId {
    pub kind: SurfaceKind,
    pub index: u32,
}

impl SurfaceId {
    pub const fn new(kind: SurfaceKind, index: u32) -> Self {
        Self { kind, index }
    }

    pub const fn drum(index: u32) -> Self {
        Self::new(SurfaceKind::Drum, index)
    }

    pub const fn vane_leading(index: u32) -> Self {
        Self::new(SurfaceKind::VaneLeading, index)
    }

    pub const fn vane_trailing(index: u32) -> Self {
        Self::new(SurfaceKind::VaneTrailing, index)
    }

    /// Position of this surface in the catalog produced by [`regenerate`]
    pub fn catalog_position(&self) -> usize {
        let offset = match self.kind {
            SurfaceKind::Drum => 0,
            SurfaceKind::VaneLeading => 1,
            SurfaceKind::VaneTrailing => 2,
        };
        self.index as usize * 3 + offset
    }
}

impl fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            SurfaceKind::Drum => write!(f, "drum_{}", self.index),
            SurfaceKind::VaneLeading => write!(f, "vane_{}_lead", self.index),
            SurfaceKind::VaneTrailing => write!(f, "vane_{}_trail", self.index),
        }
    }
}

/// A collidable surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Surface {
    pub id: SurfaceId,
    /// Display color (0xRRGGBB)
    pub color: u32,
}

impl Surface {
    #[inline]
    pub fn kind(&self) -> SurfaceKind {
        self.id.kind
    }

    #[inline]
    pub fn index(&self) -> u32 {
        self.id.index
    }
}

/// Palette lookup, wrapping around
#[inline]
pub fn surface_color(slot: u32) -> u32 {
    SURFACE_COLORS[slot as usize % SURFACE_COLORS.len()]
}

/// Build the surface catalog for `vane_count` vanes.
///
/// Order is drum, leading, trailing for each index. The drum arc takes palette
/// slot `2i` and both vane faces share slot `2i + 1`, so neighbors differ.
pub fn regenerate(vane_count: u32) -> Vec<Surface> {
    let mut surfaces = Vec::with_capacity(vane_count as usize * 3);
    for i in 0..vane_count {
        let wall = surface_color(i * 2);
        let vane = surface_color(i * 2 + 1);
        surfaces.push(Surface { id: SurfaceId::drum(i), color: wall });
        surfaces.push(Surface { id: SurfaceId::vane_leading(i), color: vane });
        surfaces.push(Surface { id: SurfaceId::vane_trailing(i), color: vane });
    }
    surfaces
}

/// Index of the drum segment containing `angle` (any magnitude)
pub fn segment_for_angle(angle: f32, vane_count: u32) -> u32 {
    let count = vane_count.max(1);
    let per_segment = TAU / count as f32;
    let segment = (normalize_angle(angle) / per_segment).floor() as u32;
    segment % count
}

/// Angle of vane `index` in the drum frame
#[inline]
pub fn vane_angle(index: u32, vane_count: u32) -> f32 {
    index as f32 / vane_count.max(1) as f32 * TAU
}
