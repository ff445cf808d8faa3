//! Frame loop
//!
//! Each rendered frame runs [`SUBSTEPS`] physics steps, polls the parameter
//! source every [`PARAM_INTERVAL`] of simulated time and turns dispatched
//! collisions into [`NoteEvent`]s.

use std::cell::RefCell;
use std::rc::Rc;

use crate::consts::{FRAME_DT, MAX_FRAME_DT, PARAM_INTERVAL, SIM_DT, SUBSTEPS};
use crate::dryer::Dryer;
use crate::notes::{NoteEvent, NoteMap};
use crate::params::ParameterSource;
use crate::render::Highlights;
use crate::sim::Surface;

type HitLog = Rc<RefCell<Vec<(Surface, f32)>>>;

pub struct Runner {
    dryer: Dryer,
    source: Box<dyn ParameterSource>,
    notes: NoteMap,
    base_note: u8,
    highlights: Highlights,
    hits: HitLog,
    /// Physics steps between parameter reads
    poll_every: u64,
    accumulator: f32,
    frames: u64,
}

impl std::fmt::Debug for Runner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runner")
            .field("dryer", &self.dryer)
            .field("base_note", &self.base_note)
            .field("frames", &self.frames)
            .finish_non_exhaustive()
    }
}

impl Runner {
    /// Take over `dryer`; the source is read once immediately
    pub fn new(mut dryer: Dryer, source: impl ParameterSource + 'static, base_note: u8) -> Self {
        let hits: HitLog = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&hits);
        dryer.on_collision(move |surface: &Surface, speed: f32| {
            sink.borrow_mut().push((*surface, speed));
        });

        let mut runner = Self {
            notes: NoteMap::build(dryer.surfaces(), base_note, dryer.surface_generation()),
            dryer,
            source: Box::new(source),
            base_note,
            highlights: Highlights::new(),
            hits,
            poll_every: ((PARAM_INTERVAL / SIM_DT).round() as u64).max(1),
            accumulator: 0.0,
            frames: 0,
        };
        runner.poll_parameters();
        runner
    }

    /// Run one rendered frame and return the notes it produced
    pub fn frame(&mut self) -> Vec<NoteEvent> {
        self.highlights.decay();

        let mut notes = Vec::new();
        for _ in 0..SUBSTEPS {
            if self.dryer.steps() > 0 && self.dryer.steps() % self.poll_every == 0 {
                self.poll_parameters();
            }
            self.dryer.step(SIM_DT);
            self.drain_hits(&mut notes);
        }
        self.frames += 1;
        notes
    }

    /// Feed wall-clock time; runs as many whole frames as have accumulated
    pub fn advance(&mut self, elapsed: f32) -> Vec<NoteEvent> {
        if !elapsed.is_finite() || elapsed <= 0.0 {
            return Vec::new();
        }
        self.accumulator += elapsed.min(MAX_FRAME_DT);

        let mut notes = Vec::new();
        while self.accumulator >= FRAME_DT {
            notes.extend(self.frame());
            self.accumulator -= FRAME_DT;
        }
        notes
    }

    fn poll_parameters(&mut self) {
        let controls = self.source.read();
        self.dryer.apply_controls(&controls);

        let generation = self.dryer.surface_generation();
        if self.notes.is_stale(generation) {
            self.notes = NoteMap::build(self.dryer.surfaces(), self.base_note, generation);
            self.highlights.clear();
            log::debug!("Note map rebuilt: {} notes from {}", self.notes.len(), self.base_note);
        }
    }

    fn drain_hits(&mut self, notes: &mut Vec<NoteEvent>) {
        for (surface, speed) in self.hits.borrow_mut().drain(..) {
            self.highlights.hit(surface.id);
            match self.notes.note_event(&surface, speed) {
                Some(note) => notes.push(note),
                None => log::warn!("No note for {}", surface.id),
            }
        }
    }

    pub fn dryer(&self) -> &Dryer {
        &self.dryer
    }

    pub fn dryer_mut(&mut self) -> &mut Dryer {
        &mut self.dryer
    }

    pub fn note_map(&self) -> &NoteMap {
        &self.notes
    }

    pub fn highlights(&self) -> &Highlights {
        &self.highlights
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Simulated seconds so far
    pub fn elapsed(&self) -> f32 {
        self.dryer.steps() as f32 * SIM_DT
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notes::DEFAULT_BASE_NOTE;
    use crate::params::{ControlFrame, FixedSource};
    use crate::sim::SurfaceKind;

    /// Source that counts reads and switches vane count after a few
    struct CountingSource {
        reads: Rc<RefCell<u32>>,
        switch_after: u32,
    }

    impl ParameterSource for CountingSource {
        fn read(&mut self) -> ControlFrame {
            let mut reads = self.reads.borrow_mut();
            *reads += 1;
            let vanes = if *reads > self.switch_after { 7 } else { 5 };
            ControlFrame { vanes, ..Default::default() }
        }
    }

    #[test]
    fn test_frame_runs_substeps() {
        let mut runner = Runner::new(Dryer::new(), FixedSource::default(), DEFAULT_BASE_NOTE);
        runner.frame();
        runner.frame();
        assert_eq!(runner.dryer().steps(), 2 * SUBSTEPS as u64);
        assert_eq!(runner.frames(), 2);
        assert!((runner.elapsed() - 2.0 * FRAME_DT).abs() < 1e-6);
    }

    #[test]
    fn test_parameters_polled_every_interval() {
        let reads = Rc::new(RefCell::new(0));
        let source = CountingSource { reads: Rc::clone(&reads), switch_after: 100 };
        let mut runner = Runner::new(Dryer::new(), source, DEFAULT_BASE_NOTE);
        assert_eq!(*reads.borrow(), 1);

        // One second of simulation is 20 intervals of 50 ms
        for _ in 0..60 {
            runner.frame();
        }
        assert_eq!(*reads.borrow(), 20);
    }

    #[test]
    fn test_note_map_follows_generation() {
        let reads = Rc::new(RefCell::new(0));
        let source = CountingSource { reads: Rc::clone(&reads), switch_after: 2 };
        let mut runner = Runner::new(Dryer::new(), source, DEFAULT_BASE_NOTE);
        assert_eq!(runner.note_map().len(), 15);

        for _ in 0..12 {
            runner.frame();
        }
        assert_eq!(runner.dryer().vane_count(), 7);
        assert_eq!(runner.note_map().len(), 21);
        assert_eq!(runner.note_map().generation(), runner.dryer().surface_generation());
    }

    #[test]
    fn test_collisions_become_notes() {
        let mut runner = Runner::new(Dryer::new(), FixedSource::default(), DEFAULT_BASE_NOTE);
        let mut notes = Vec::new();
        for _ in 0..600 {
            notes.extend(runner.frame());
        }
        assert!(!notes.is_empty());
        for note in &notes {
            assert!((DEFAULT_BASE_NOTE..DEFAULT_BASE_NOTE + 15).contains(&note.note));
            assert!(note.velocity <= 127);
        }
        let stats = runner.dryer().dispatch_stats();
        assert_eq!(stats.dispatched as usize, notes.len());
        assert!(notes.iter().any(|n| n.surface.kind == SurfaceKind::Drum));
    }

    #[test]
    fn test_advance_clamps_long_frames() {
        let mut runner = Runner::new(Dryer::new(), FixedSource::default(), DEFAULT_BASE_NOTE);
        runner.advance(1.0);
        // 33 ms caps out at one whole frame
        assert_eq!(runner.frames(), 1);
        runner.advance(f32::NAN);
        runner.advance(-1.0);
        assert_eq!(runner.frames(), 1);
        runner.advance(0.02);
        assert_eq!(runner.frames(), 3);
    }
}
