//! Sparse occupancy grid, one instance per material.

use std::collections::HashMap;

/// Maps cell coordinate to the occupant's display palette index.
///
/// Occupied cells are a small fraction of the play-field and move every
/// frame, so the grid is a hash map keyed by `(x, y)` rather than a dense
/// array. Origin is top-left, y grows downward. Out-of-bounds writes are
/// no-ops.
#[derive(Debug, Clone)]
pub struct Grid {
    width: i32,
    height: i32,
    cells: HashMap<(i32, i32), u8>,
}

impl Grid {
    #[must_use]
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            width,
            height,
            cells: HashMap::new(),
        }
    }

    #[must_use]
    pub fn width(&self) -> i32 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> i32 {
        self.height
    }

    #[must_use]
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && x < self.width && y >= 0 && y < self.height
    }

    #[must_use]
    pub fn contains(&self, x: i32, y: i32) -> bool {
        self.cells.contains_key(&(x, y))
    }

    /// In bounds and unoccupied.
    #[must_use]
    pub fn is_open(&self, x: i32, y: i32) -> bool {
        self.in_bounds(x, y) && !self.contains(x, y)
    }

    #[must_use]
    pub fn get(&self, x: i32, y: i32) -> Option<u8> {
        self.cells.get(&(x, y)).copied()
    }

    /// Returns false and leaves the grid untouched if the cell is
    /// occupied or out of bounds.
    pub fn insert(&mut self, x: i32, y: i32, color: u8) -> bool {
        if !self.is_open(x, y) {
            return false;
        }
        self.cells.insert((x, y), color);
        true
    }

    /// Removing an absent cell is a no-op.
    pub fn remove(&mut self, x: i32, y: i32) -> Option<u8> {
        self.cells.remove(&(x, y))
    }

    /// Move the occupant of `from` to `to`. Returns false without
    /// touching the grid if `from` is empty or `to` is unavailable, so
    /// no caller ever observes a half-moved state.
    pub fn relocate(&mut self, from: (i32, i32), to: (i32, i32)) -> bool {
        if !self.is_open(to.0, to.1) {
            return false;
        }
        match self.cells.remove(&from) {
            Some(color) => {
                self.cells.insert(to, color);
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Live cells in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = ((i32, i32), u8)> + '_ {
        self.cells.iter().map(|(&pos, &color)| (pos, color))
    }

    /// Snapshot of the live coordinates sorted bottom of screen first.
    /// A particle that falls into a cell this pass is never re-processed,
    /// because lower particles vacate before upper ones look down.
    /// Ordering within a row is arbitrary.
    #[must_use]
    pub fn bottom_up(&self) -> Vec<(i32, i32)> {
        let mut coords: Vec<(i32, i32)> = self.cells.keys().copied().collect();
        coords.sort_unstable_by(|a, b| b.1.cmp(&a.1));
        coords
    }

    /// Drop every occupant strictly above `boundary_y`, returning how
    /// many were removed.
    pub fn reap_above(&mut self, boundary_y: i32) -> usize {
        let before = self.cells.len();
        self.cells.retain(|&(_, y), _| y >= boundary_y);
        before - self.cells.len()
    }
}
