//! Collaborator seams: the host renders tiles, plays effects and shows the
//! level/score display. The core only calls through these traits.

use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec3;

use crate::types::{CellState, Outcome, RuleParameters, TileHandle};

pub trait TileFactory {
    fn spawn(&mut self, kind: CellState, position: Vec3) -> TileHandle;
    fn destroy(&mut self, handle: TileHandle);
}

pub trait EffectSink {
    fn play_hover_cue(&mut self);
    fn play_replace_cue(&mut self);
    fn play_descend_cue(&mut self);
    fn shake_view(&mut self, intensity: f32, duration: f32);
}

pub trait DisplaySink {
    fn on_level_changed(&mut self, level: u32);
    fn on_level_settled(&mut self, _level: u32, _rules: &RuleParameters) {}
    fn on_outcome(&mut self, _outcome: Outcome) {}
}

/// The three collaborators one simulation talks to.
pub struct Ports {
    pub tiles: Box<dyn TileFactory>,
    pub effects: Box<dyn EffectSink>,
    pub display: Box<dyn DisplaySink>,
}

impl Ports {
    pub fn new(
        tiles: Box<dyn TileFactory>,
        effects: Box<dyn EffectSink>,
        display: Box<dyn DisplaySink>,
    ) -> Self {
        Ports { tiles, effects, display }
    }

    /// No rendering, no sound, no display.
    pub fn headless() -> Self {
        Ports::new(
            Box::new(Headless::default()),
            Box::new(Headless::default()),
            Box::new(Headless::default()),
        )
    }

    /// All three seams writing into one shared log.
    pub fn recording(recorder: &Recorder) -> Self {
        Ports::new(
            Box::new(recorder.clone()),
            Box::new(recorder.clone()),
            Box::new(recorder.clone()),
        )
    }
}

// ============================================================================
// HEADLESS
// ============================================================================

/// Hands out sequential handles and ignores everything else.
#[derive(Clone, Debug, Default)]
pub struct Headless {
    next_handle: u64,
}

impl TileFactory for Headless {
    fn spawn(&mut self, _kind: CellState, _position: Vec3) -> TileHandle {
        self.next_handle += 1;
        TileHandle(self.next_handle)
    }

    fn destroy(&mut self, _handle: TileHandle) {}
}

impl EffectSink for Headless {
    fn play_hover_cue(&mut self) {}
    fn play_replace_cue(&mut self) {}
    fn play_descend_cue(&mut self) {}
    fn shake_view(&mut self, _intensity: f32, _duration: f32) {}
}

impl DisplaySink for Headless {
    fn on_level_changed(&mut self, _level: u32) {}
}

// ============================================================================
// RECORDER
// ============================================================================

#[derive(Clone, Debug, PartialEq)]
pub enum PortEvent {
    Spawned { handle: TileHandle, kind: CellState, position: Vec3 },
    Destroyed(TileHandle),
    HoverCue,
    ReplaceCue,
    DescendCue,
    Shake { intensity: f32, duration: f32 },
    LevelChanged(u32),
    LevelSettled(u32),
    Outcome(Outcome),
}

/// Shared, cloneable event log implementing every port. Clones append to the
/// same log.
#[derive(Clone, Debug, Default)]
pub struct Recorder {
    events: Rc<RefCell<Vec<PortEvent>>>,
    next_handle: Rc<RefCell<u64>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<PortEvent> {
        self.events.borrow().clone()
    }

    pub fn count(&self, pred: impl Fn(&PortEvent) -> bool) -> usize {
        self.events.borrow().iter().filter(|e| pred(e)).count()
    }

    fn push(&self, event: PortEvent) {
        self.events.borrow_mut().push(event);
    }
}

impl TileFactory for Recorder {
    fn spawn(&mut self, kind: CellState, position: Vec3) -> TileHandle {
        let handle = {
            let mut next = self.next_handle.borrow_mut();
            *next += 1;
            TileHandle(*next)
        };
        self.push(PortEvent::Spawned { handle, kind, position });
        handle
    }

    fn destroy(&mut self, handle: TileHandle) {
        self.push(PortEvent::Destroyed(handle));
    }
}

impl EffectSink for Recorder {
    fn play_hover_cue(&mut self) {
        self.push(PortEvent::HoverCue);
    }

    fn play_replace_cue(&mut self) {
        self.push(PortEvent::ReplaceCue);
    }

    fn play_descend_cue(&mut self) {
        self.push(PortEvent::DescendCue);
    }

    fn shake_view(&mut self, intensity: f32, duration: f32) {
        self.push(PortEvent::Shake { intensity, duration });
    }
}

impl DisplaySink for Recorder {
    fn on_level_changed(&mut self, level: u32) {
        self.push(PortEvent::LevelChanged(level));
    }

    fn on_level_settled(&mut self, level: u32, _rules: &RuleParameters) {
        self.push(PortEvent::LevelSettled(level));
    }

    fn on_outcome(&mut self, outcome: Outcome) {
        self.push(PortEvent::Outcome(outcome));
    }
}
