use crate::config::validate_grid_size;
use crate::tiles::TileId;
use crate::types::CellState;
use crate::LifeError;

/// Bounded rectangular lattice of cell states, plus the id of the tile that
/// currently represents each cell.
///
/// Only interior cells (`1..=width-2` by `1..=height-2`) are ever evaluated,
/// mutated or given a tile. The one-cell border ring stays `Dead`.
#[derive(Clone, Debug)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<CellState>,
    tiles: Vec<Option<TileId>>,
}

impl Grid {
    /// Allocate a `width x height` board and seed every interior cell with
    /// `seed(x, y)`.
    pub fn initialize<F>(width: usize, height: usize, mut seed: F) -> Result<Self, LifeError>
    where
        F: FnMut(usize, usize) -> CellState,
    {
        validate_grid_size(width, height)?;

        let total = width * height;
        let mut grid = Grid {
            width,
            height,
            cells: vec![CellState::Dead; total],
            tiles: vec![None; total],
        };
        for (x, y) in grid.interior() {
            let i = grid.idx(x, y);
            grid.cells[i] = seed(x, y);
        }
        Ok(grid)
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub(crate) fn idx(&self, x: usize, y: usize) -> usize {
        x * self.height + y
    }

    #[inline]
    pub fn in_bounds(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height
    }

    #[inline]
    pub fn is_interior(&self, x: usize, y: usize) -> bool {
        (1..self.width - 1).contains(&x) && (1..self.height - 1).contains(&y)
    }

    /// Cell state, or `None` outside the stored lattice.
    pub fn get(&self, x: usize, y: usize) -> Option<CellState> {
        if !self.in_bounds(x, y) {
            return None;
        }
        self.cells.get(self.idx(x, y)).copied()
    }

    /// Overwrite an interior cell. Border and out-of-range writes are dropped.
    pub fn set(&mut self, x: usize, y: usize, state: CellState) -> bool {
        if !self.is_interior(x, y) {
            return false;
        }
        let i = self.idx(x, y);
        self.cells[i] = state;
        true
    }

    pub fn tile_at(&self, x: usize, y: usize) -> Option<TileId> {
        if !self.in_bounds(x, y) {
            return None;
        }
        self.tiles[self.idx(x, y)]
    }

    pub(crate) fn set_tile(&mut self, x: usize, y: usize, tile: TileId) {
        if self.is_interior(x, y) {
            let i = self.idx(x, y);
            self.tiles[i] = Some(tile);
        }
    }

    /// Interior coordinates in sweep order: x outer, y inner.
    pub fn interior(&self) -> impl Iterator<Item = (usize, usize)> {
        let (w, h) = (self.width, self.height);
        (1..w - 1).flat_map(move |x| (1..h - 1).map(move |y| (x, y)))
    }

    /// The `n`-th interior cell in sweep order.
    pub fn interior_cell(&self, n: usize) -> (usize, usize) {
        let column = self.height - 2;
        (1 + n / column, 1 + n % column)
    }

    pub fn interior_len(&self) -> usize {
        (self.width - 2) * (self.height - 2)
    }

    /// `(alive, dead)` over interior cells.
    pub fn population(&self) -> (usize, usize) {
        let alive = self
            .interior()
            .filter(|&(x, y)| self.cells[self.idx(x, y)].is_alive())
            .count();
        (alive, self.interior_len() - alive)
    }

    /// Flat copy of all cells, x-major, border included.
    pub fn to_flags(&self) -> Vec<bool> {
        self.cells.iter().map(|c| c.is_alive()).collect()
    }
}
