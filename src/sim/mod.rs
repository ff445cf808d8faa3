//! Rotating-drum physics
//!
//! Everything here is deterministic and synchronous:
//! - Fixed timestep supplied by the caller
//! - Forces computed in the frame that spins with the drum
//! - Collision events dispatched inline, in a stable order

pub mod collision;
pub mod events;
pub mod forces;
pub mod state;
pub mod surface;
pub mod tick;

pub use collision::{CollisionEvent, Contact, VaneSegment, VaneSide, reflect_velocity};
pub use events::{CollisionListener, DispatchStats, Dispatcher};
pub use forces::{Diagnostics, DrumFrame, ForceBreakdown, acceleration};
pub use state::{
    Ball, BallPreset, BallProperties, CoriolisSign, DragModel, DrumConfig, DrumState, PhysicsConfig,
};
pub use surface::{SURFACE_COLORS, Surface, SurfaceId, SurfaceKind, regenerate, segment_for_angle};
pub use tick::{integrate, tick};
