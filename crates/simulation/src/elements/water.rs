//! Water: falls, slides diagonally, then spreads sideways seeking level.
//!
//! Water runs several sub-steps per frame so it visibly outpaces sand
//! without a different movement rule, and it treats the sand grid as a
//! collision mask: a drop never enters a sand-occupied cell. Sand does
//! not return the courtesy; it settles into water freely, which reads
//! on screen as sand sinking through the puddle.

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::grid::Grid;

/// Bright and dark display palette indices for water.
pub const WATER_BRIGHT: u8 = 12;
pub const WATER_DARK: u8 = 1;

/// Odds a drop spawns in the dark shade.
const DARK_CHANCE: f64 = 0.3;

/// Odds a fully blocked drop attempts the 2-cell lateral hop that
/// smooths stair-stepped pooling.
const LONG_HOP_CHANCE: f64 = 0.3;

/// Sub-steps per frame.
pub const DEFAULT_SUBSTEPS: u32 = 2;

/// Owns every water drop. A drop has no identity beyond its grid
/// coordinate.
#[derive(Debug)]
pub struct WaterAutomaton {
    beach_y: i32,
    grid: Grid,
}

impl WaterAutomaton {
    #[must_use]
    pub fn new(width: i32, height: i32, beach_y: i32) -> Self {
        Self {
            beach_y,
            grid: Grid::new(width, height),
        }
    }

    /// Silently rejected above the beach line, out of bounds, or on a
    /// water-occupied cell. The shade is drawn at spawn and never
    /// changes.
    pub fn spawn(&mut self, x: i32, y: i32, rng: &mut SmallRng) -> bool {
        if y < self.beach_y {
            return false;
        }
        let color = if rng.gen_bool(DARK_CHANCE) {
            WATER_DARK
        } else {
            WATER_BRIGHT
        };
        self.grid.insert(x, y, color)
    }

    /// Read-only occupancy view.
    #[must_use]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    #[must_use]
    pub fn particle_count(&self) -> usize {
        self.grid.len()
    }

    /// Snapshot of `(x, y, color)` for the renderer.
    pub fn particles(&self) -> impl Iterator<Item = (i32, i32, u8)> + '_ {
        self.grid.iter().map(|((x, y), color)| (x, y, color))
    }

    /// One frame: `substeps` full bottom-up passes against the sand
    /// mask, then drops that crossed back into the sea are removed.
    pub fn step(&mut self, sand: &Grid, substeps: u32, rng: &mut SmallRng) {
        for _ in 0..substeps {
            for (x, y) in self.grid.bottom_up() {
                self.step_drop(x, y, sand, rng);
            }
        }
        self.grid.reap_above(self.beach_y);
    }

    fn open(&self, sand: &Grid, x: i32, y: i32) -> bool {
        self.grid.is_open(x, y) && !sand.contains(x, y)
    }

    /// Descend first, level second: straight down, the two down
    /// diagonals in shuffled order, the two sides in shuffled order,
    /// then occasionally a 2-cell lateral hop.
    fn step_drop(&mut self, x: i32, y: i32, sand: &Grid, rng: &mut SmallRng) {
        if y >= self.grid.height() - 1 {
            return;
        }

        if self.open(sand, x, y + 1) {
            self.grid.relocate((x, y), (x, y + 1));
            return;
        }

        let mut diagonals = [(x - 1, y + 1), (x + 1, y + 1)];
        diagonals.shuffle(rng);
        for (tx, ty) in diagonals {
            if self.open(sand, tx, ty) {
                self.grid.relocate((x, y), (tx, ty));
                return;
            }
        }

        // Blocked below: seek level sideways.
        let mut sides = [(x - 1, y), (x + 1, y)];
        sides.shuffle(rng);
        for (tx, ty) in sides {
            if self.open(sand, tx, ty) {
                self.grid.relocate((x, y), (tx, ty));
                return;
            }
        }

        if rng.gen_bool(LONG_HOP_CHANCE) {
            let mut hops = [(x - 2, y), (x + 2, y)];
            hops.shuffle(rng);
            for (tx, ty) in hops {
                if self.open(sand, tx, ty) {
                    self.grid.relocate((x, y), (tx, ty));
                    return;
                }
            }
        }
    }
}
