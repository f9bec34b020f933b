use glam::Vec3;
use serde::Serialize;

use crate::types::{CellState, TileHandle, TileState};

// ============================================================================
// TILE IDS
// ============================================================================

/// Slot index plus the generation of the record stored there.
///
/// Replacing a tile bumps the slot generation, so an id held past its
/// replacement no longer resolves.
#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TileId {
    index: u32,
    generation: u32,
}

impl TileId {
    #[inline]
    pub fn index(&self) -> usize {
        self.index as usize
    }

    #[inline]
    pub fn generation(&self) -> u32 {
        self.generation
    }
}

// ============================================================================
// TILE RECORD
// ============================================================================

/// One animated tile: its kind, lifecycle state and where it is drawn.
#[derive(Clone, Debug, PartialEq)]
pub struct Tile {
    pub kind: CellState,
    pub state: TileState,
    pub x: usize,
    pub y: usize,
    pub position: Vec3,
    pub original_position: Vec3,
    pub hover_target: Vec3,
    pub handle: TileHandle,
    /// Set when Surround lifted this tile; it revives on reaching hover.
    pub(crate) revive_on_arrival: bool,
}

impl Tile {
    /// Tile resting at its cell in `Idle`.
    pub fn new(kind: CellState, x: usize, y: usize, hover_offset: Vec3, handle: TileHandle) -> Self {
        let rest = resting_position(x, y);
        Tile {
            kind,
            state: TileState::Idle,
            x,
            y,
            position: rest,
            original_position: rest,
            hover_target: rest + hover_offset,
            handle,
            revive_on_arrival: false,
        }
    }

    #[inline]
    pub fn reached_hover(&self, epsilon: f32) -> bool {
        self.position.distance(self.hover_target) < epsilon
    }

    /// Run one tick of the active state's easing. Returns `true` when a
    /// descending tile settles back into `Idle`.
    pub fn ease(&mut self, delta_time: f64, rate: f32, rest_epsilon: f32) -> bool {
        let t = (rate * delta_time as f32).clamp(0.0, 1.0);
        match self.state {
            TileState::Idle => false,
            TileState::Hover => {
                self.position = self.position.lerp(self.hover_target, t);
                false
            }
            TileState::Descend => {
                self.position = self.position.lerp(self.original_position, t);
                if self.position.distance(self.original_position) < rest_epsilon {
                    self.state = TileState::Idle;
                    return true;
                }
                false
            }
        }
    }
}

/// World position of the cell `(x, y)` at rest.
#[inline]
pub fn resting_position(x: usize, y: usize) -> Vec3 {
    Vec3::new(x as f32, y as f32, 0.0)
}

// ============================================================================
// ARENA
// ============================================================================

#[derive(Clone, Debug, Default)]
struct Slot {
    generation: u32,
    tile: Option<Tile>,
}

/// Fixed pool of tile records, one slot per grid cell.
#[derive(Clone, Debug)]
pub struct TileArena {
    slots: Vec<Slot>,
}

impl TileArena {
    pub fn with_slots(len: usize) -> Self {
        TileArena {
            slots: vec![Slot::default(); len],
        }
    }

    /// Store `tile` in slot `index`, returning its fresh id and whatever record
    /// it displaced.
    pub fn replace(&mut self, index: usize, tile: Tile) -> (TileId, Option<Tile>) {
        let slot = &mut self.slots[index];
        slot.generation = slot.generation.wrapping_add(1);
        let previous = slot.tile.replace(tile);
        let id = TileId {
            index: index as u32,
            generation: slot.generation,
        };
        (id, previous)
    }

    pub fn get(&self, id: TileId) -> Option<&Tile> {
        self.slots
            .get(id.index())
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.tile.as_ref())
    }

    pub fn get_mut(&mut self, id: TileId) -> Option<&mut Tile> {
        self.slots
            .get_mut(id.index())
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.tile.as_mut())
    }

    /// Ids of every occupied slot in slot order.
    pub fn ids(&self) -> Vec<TileId> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.tile.is_some())
            .map(|(i, slot)| TileId {
                index: i as u32,
                generation: slot.generation,
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.tile.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
