//! Surface to MIDI note and trigger mapping
//!
//! Notes are assigned in catalog order, so the map is only valid for the
//! surface generation it was built from.

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::sim::{Surface, SurfaceId, SurfaceKind};

/// C2, a good bass range for percussion
pub const DEFAULT_BASE_NOTE: u8 = 36;
/// Impact speed (m/s) to MIDI velocity
pub const VELOCITY_SCALE: f32 = 300.0;
/// How long a note sounds before its note-off
pub const NOTE_LENGTH: Duration = Duration::from_millis(100);

/// Gate output pulsed for a hit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TriggerOutput {
    /// Wall hits
    Drum,
    /// Either face of any vane
    Vane,
}

impl TriggerOutput {
    pub fn for_kind(kind: SurfaceKind) -> Self {
        if kind.is_vane() { TriggerOutput::Vane } else { TriggerOutput::Drum }
    }
}

/// Everything an emitter needs to sound one collision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NoteEvent {
    pub surface: SurfaceId,
    pub note: u8,
    pub velocity: u8,
    pub trigger: TriggerOutput,
    #[serde(skip)]
    pub duration: Duration,
}

/// MIDI velocity for an impact speed, 0..=127
pub fn midi_velocity(speed: f32) -> u8 {
    (speed.max(0.0) * VELOCITY_SCALE).min(127.0) as u8
}

/// Note assignments for one surface generation
#[derive(Debug, Clone, Default)]
pub struct NoteMap {
    notes: HashMap<SurfaceId, u8>,
    generation: u64,
    base_note: u8,
}

impl NoteMap {
    /// Assign `base_note + i` to the i-th surface; notes past 127 are left out
    pub fn build(surfaces: &[Surface], base_note: u8, generation: u64) -> Self {
        let notes = surfaces
            .iter()
            .enumerate()
            .filter_map(|(i, s)| {
                let note = base_note as usize + i;
                (note <= 127).then_some((s.id, note as u8))
            })
            .collect();
        Self {
            notes,
            generation,
            base_note,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn base_note(&self) -> u8 {
        self.base_note
    }

    /// True when surfaces were reissued since this map was built
    pub fn is_stale(&self, current_generation: u64) -> bool {
        self.generation != current_generation
    }

    pub fn note_for(&self, id: SurfaceId) -> Option<u8> {
        self.notes.get(&id).copied()
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Turn a dispatched collision into a note, if the surface is mapped
    pub fn note_event(&self, surface: &Surface, speed: f32) -> Option<NoteEvent> {
        let note = self.note_for(surface.id)?;
        Some(NoteEvent {
            surface: surface.id,
            note,
            velocity: midi_velocity(speed),
            trigger: TriggerOutput::for_kind(surface.kind()),
            duration: NOTE_LENGTH,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::regenerate;

    #[test]
    fn test_notes_follow_catalog_order() {
        let surfaces = regenerate(5);
        let map = NoteMap::build(&surfaces, DEFAULT_BASE_NOTE, 0);
        assert_eq!(map.len(), 15);
        assert_eq!(map.note_for(SurfaceId::drum(0)), Some(36));
        assert_eq!(map.note_for(SurfaceId::vane_leading(0)), Some(37));
        assert_eq!(map.note_for(SurfaceId::vane_trailing(4)), Some(50));
        assert_eq!(map.note_for(SurfaceId::drum(5)), None);
    }

    #[test]
    fn test_notes_stop_at_127() {
        let map = NoteMap::build(&regenerate(9), 120, 0);
        assert_eq!(map.len(), 8);
    }

    #[test]
    fn test_velocity_scaling() {
        assert_eq!(midi_velocity(0.0), 0);
        assert_eq!(midi_velocity(0.1), 30);
        assert_eq!(midi_velocity(2.0), 127);
        assert_eq!(midi_velocity(-1.0), 0);
    }

    #[test]
    fn test_note_event_trigger() {
        let surfaces = regenerate(2);
        let map = NoteMap::build(&surfaces, DEFAULT_BASE_NOTE, 3);
        let drum = map.note_event(&surfaces[3], 0.2).expect("mapped");
        assert_eq!(drum.trigger, TriggerOutput::Drum);
        assert_eq!(drum.note, 39);
        let vane = map.note_event(&surfaces[5], 0.2).expect("mapped");
        assert_eq!(vane.trigger, TriggerOutput::Vane);
        assert_eq!(vane.duration, NOTE_LENGTH);

        assert!(!map.is_stale(3));
        assert!(map.is_stale(4));
    }
}
