//! Sand: falls straight down, settles diagonally behind a coin flip, and
//! gets washed around by the sea.

use rand::rngs::SmallRng;
use rand::Rng;
use tracing::debug;

use crate::grid::Grid;

/// Cyclable display palette: beige, yellow, orange.
pub const SAND_PALETTE: [u8; 3] = [15, 10, 9];

/// Odds that a grain takes an open diagonal on a given frame. A failed
/// flip ends the grain's turn, which is what rounds piles into an angle
/// of repose instead of a rigid pyramid.
const SETTLE_CHANCE: f64 = 0.5;

/// Incoming water scatters grains a little less readily than the
/// backwash drags them.
const APPROACH_FACTOR: f64 = 0.8;

/// Number of shell sprite variants.
const SHELL_KINDS: u8 = 3;

/// Static beach decoration left behind by a retreating wave. Never
/// simulated; persists for the life of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shell {
    pub x: i32,
    pub y: i32,
    /// Sprite variant, `0..SHELL_KINDS`.
    pub kind: u8,
}

/// Owns every sand grain plus the shell decorations. A grain has no
/// identity beyond its grid coordinate.
#[derive(Debug)]
pub struct SandAutomaton {
    beach_y: i32,
    grid: Grid,
    color_idx: usize,
    shells: Vec<Shell>,
}

impl SandAutomaton {
    #[must_use]
    pub fn new(width: i32, height: i32, beach_y: i32) -> Self {
        Self {
            beach_y,
            grid: Grid::new(width, height),
            color_idx: 0,
            shells: Vec::new(),
        }
    }

    /// Palette color newly spawned grains take.
    #[must_use]
    pub fn current_color(&self) -> u8 {
        SAND_PALETTE[self.color_idx]
    }

    pub fn cycle_color(&mut self) {
        self.color_idx = (self.color_idx + 1) % SAND_PALETTE.len();
    }

    /// Silently rejected above the beach line, out of bounds, or on an
    /// occupied cell.
    pub fn spawn(&mut self, x: i32, y: i32) -> bool {
        if y < self.beach_y {
            return false;
        }
        self.grid.insert(x, y, self.current_color())
    }

    /// Read-only occupancy view for cross-material collision checks.
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

    /// One gravity pass, bottom of screen first, then grains that
    /// crossed back into the sea are removed.
    ///
    /// Move priority is straight down, then down-left, then down-right.
    /// Straight down is unconditional; each diagonal needs a fair coin,
    /// and a failed flip on an open left slot ends the grain's turn
    /// without consulting the right one. Grains the wave dragged past
    /// the beach line belong to the sea already: they are not simulated,
    /// only reaped at the end of the pass.
    pub fn step(&mut self, rng: &mut SmallRng) {
        let floor = self.grid.height() - 1;
        for (x, y) in self.grid.bottom_up() {
            if y >= floor || y < self.beach_y {
                continue;
            }
            if self.grid.is_open(x, y + 1) {
                self.grid.relocate((x, y), (x, y + 1));
            } else if self.grid.is_open(x - 1, y + 1) {
                if rng.gen_bool(SETTLE_CHANCE) {
                    self.grid.relocate((x, y), (x - 1, y + 1));
                }
            } else if self.grid.is_open(x + 1, y + 1) && rng.gen_bool(SETTLE_CHANCE) {
                self.grid.relocate((x, y), (x + 1, y + 1));
            }
        }
        self.grid.reap_above(self.beach_y);
    }

    /// Erosion entry point driven by the wave controller. `depth` is the
    /// deepest washed row; the displacement regime flips with
    /// `returning`; `power` is the per-grain displacement probability.
    ///
    /// Every displacement is decided against the pre-wash grid before
    /// any is applied, so one grain's wash cannot open or close a cell
    /// for another grain in the same call. Grains dragged above the
    /// beach line are reaped by the next [`Self::step`].
    pub fn wave_wash(&mut self, depth: i32, returning: bool, power: f64, rng: &mut SmallRng) {
        let power = power.clamp(0.0, 1.0);
        let chance = if returning {
            power
        } else {
            power * APPROACH_FACTOR
        };
        if chance <= 0.0 {
            return;
        }

        let wet: Vec<(i32, i32)> = self
            .grid
            .iter()
            .map(|(pos, _)| pos)
            .filter(|&(_, y)| y >= self.beach_y && y <= depth)
            .collect();

        let mut washes = Vec::new();
        for (x, y) in wet {
            if !rng.gen_bool(chance) {
                continue;
            }
            let (dx, dy) = if returning {
                // Backwash drags toward the sea.
                ([-1, 0, 1][rng.gen_range(0..3)], [-1, -2][rng.gen_range(0..2)])
            } else {
                // Incoming water scatters grains sideways.
                ([-2, -1, 1, 2][rng.gen_range(0..4)], [0, 1][rng.gen_range(0..2)])
            };
            let tx = (x + dx).clamp(0, self.grid.width() - 1);
            let ty = (y + dy).clamp(0, self.grid.height() - 1);
            if (tx, ty) == (x, y) || self.grid.contains(tx, ty) {
                continue;
            }
            washes.push(((x, y), (tx, ty)));
        }

        // Two grains may still have picked the same open target;
        // relocate drops the later one and the occupancy invariant holds.
        for (from, to) in washes {
            self.grid.relocate(from, to);
        }
    }

    /// Place a shell unless another shell sits within one cell in any
    /// direction. Rejected above the beach line and out of bounds.
    pub fn add_shell(&mut self, x: i32, y: i32, rng: &mut SmallRng) -> bool {
        if y < self.beach_y || !self.grid.in_bounds(x, y) {
            return false;
        }
        let crowded = self
            .shells
            .iter()
            .any(|s| (s.x - x).abs() <= 1 && (s.y - y).abs() <= 1);
        if crowded {
            return false;
        }
        let kind: u8 = rng.gen_range(0..SHELL_KINDS);
        self.shells.push(Shell { x, y, kind });
        debug!(x, y, kind, "shell washed up");
        true
    }

    #[must_use]
    pub fn shells(&self) -> &[Shell] {
        &self.shells
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;

    const BEACH_Y: i32 = 65;

    fn automaton() -> SandAutomaton {
        SandAutomaton::new(128, 128, BEACH_Y)
    }

    fn rng() -> SmallRng {
        SmallRng::seed_from_u64(7)
    }

    #[test]
    fn spawn_rejected_above_beach_line() {
        let mut sand = automaton();
        assert!(!sand.spawn(40, BEACH_Y - 1));
        assert!(sand.spawn(40, BEACH_Y));
        assert_eq!(sand.particle_count(), 1);
    }

    #[test]
    fn spawn_rejected_on_occupied_cell() {
        let mut sand = automaton();
        assert!(sand.spawn(40, 70));
        assert!(!sand.spawn(40, 70));
        assert_eq!(sand.particle_count(), 1);
    }

    #[test]
    fn lone_grain_falls_one_cell_per_step() {
        let mut sand = automaton();
        let mut rng = rng();
        sand.spawn(40, 70);
        for expected_y in 71..=127 {
            sand.step(&mut rng);
            assert_eq!(
                sand.particles().collect::<Vec<_>>(),
                vec![(40, expected_y, 15)]
            );
        }
        // Settled on the floor; further steps are no-ops.
        sand.step(&mut rng);
        assert_eq!(sand.particles().next(), Some((40, 127, 15)));
    }

    #[test]
    fn blocked_grain_with_closed_diagonals_stays_put() {
        let mut sand = automaton();
        let mut rng = rng();
        for x in 39..=41 {
            sand.spawn(x, 127);
        }
        sand.spawn(40, 126);
        for _ in 0..20 {
            sand.step(&mut rng);
        }
        assert!(sand.grid().contains(40, 126));
        assert_eq!(sand.particle_count(), 4);
    }

    #[test]
    fn blocked_grain_eventually_settles_diagonally() {
        let mut sand = automaton();
        let mut rng = rng();
        sand.spawn(40, 127);
        sand.spawn(40, 126);
        // The upper grain has both diagonals open; the coin lets it
        // stay some frames but not forever.
        for _ in 0..64 {
            sand.step(&mut rng);
        }
        assert!(sand.grid().contains(39, 127) || sand.grid().contains(41, 127));
        assert!(sand.grid().contains(40, 127));
        assert_eq!(sand.particle_count(), 2);
    }

    #[test]
    fn grains_above_beach_line_return_to_the_sea() {
        let mut sand = automaton();
        let mut rng = rng();
        sand.spawn(40, BEACH_Y);
        // Backwash at full power always drags the lone grain upward by
        // one or two rows, past the boundary.
        sand.wave_wash(BEACH_Y + 5, true, 1.0, &mut rng);
        for _ in 0..3 {
            sand.step(&mut rng);
        }
        assert_eq!(sand.particle_count(), 0);
        assert!(sand.grid().is_empty());
    }

    #[test]
    fn cycle_color_changes_spawn_color() {
        let mut sand = automaton();
        assert_eq!(sand.current_color(), 15);
        sand.spawn(10, 70);
        sand.cycle_color();
        assert_eq!(sand.current_color(), 10);
        sand.spawn(11, 70);
        sand.cycle_color();
        sand.cycle_color();
        assert_eq!(sand.current_color(), 15);

        let mut colors: Vec<u8> = sand.particles().map(|(_, _, c)| c).collect();
        colors.sort_unstable();
        assert_eq!(colors, vec![10, 15]);
    }

    #[test]
    fn wash_at_zero_power_moves_nothing() {
        let mut sand = automaton();
        let mut rng = rng();
        for x in 0..40 {
            sand.spawn(x, BEACH_Y + 2);
        }
        let before = sand.grid().bottom_up();
        sand.wave_wash(BEACH_Y + 10, true, 0.0, &mut rng);
        sand.wave_wash(BEACH_Y + 10, false, 0.0, &mut rng);
        assert_eq!(sand.grid().bottom_up(), before);
    }

    #[test]
    fn backwash_at_full_power_always_displaces_a_free_grain() {
        for seed in 0..32 {
            let mut sand = automaton();
            let mut rng = SmallRng::seed_from_u64(seed);
            sand.spawn(40, BEACH_Y + 5);
            sand.wave_wash(BEACH_Y + 10, true, 1.0, &mut rng);
            let (x, y, _) = sand.particles().next().unwrap();
            assert_ne!((x, y), (40, BEACH_Y + 5), "seed {seed}");
            // Backwash only ever pulls upward, one or two rows.
            assert!((x - 40).abs() <= 1);
            assert!(y == BEACH_Y + 3 || y == BEACH_Y + 4);
        }
    }

    #[test]
    fn approaching_wash_scatters_sideways_or_down() {
        for seed in 0..32 {
            let mut sand = automaton();
            let mut rng = SmallRng::seed_from_u64(seed);
            sand.spawn(40, BEACH_Y + 5);
            sand.wave_wash(BEACH_Y + 10, false, 1.0, &mut rng);
            let (x, y, _) = sand.particles().next().unwrap();
            if (x, y) != (40, BEACH_Y + 5) {
                assert!((1..=2).contains(&(x - 40).abs()));
                assert!(y == BEACH_Y + 5 || y == BEACH_Y + 6);
            }
        }
    }

    #[test]
    fn wash_ignores_grains_outside_the_wet_zone() {
        let mut sand = automaton();
        let mut rng = rng();
        sand.spawn(40, BEACH_Y + 30);
        sand.wave_wash(BEACH_Y + 10, true, 1.0, &mut rng);
        assert_eq!(sand.particles().next(), Some((40, BEACH_Y + 30, 15)));
    }

    #[test]
    fn shells_reject_crowded_placement() {
        let mut sand = automaton();
        let mut rng = rng();
        assert!(sand.add_shell(40, 70, &mut rng));
        // Anywhere in the surrounding 3x3 block is too close.
        for dx in -1..=1 {
            for dy in -1..=1 {
                assert!(!sand.add_shell(40 + dx, 70 + dy, &mut rng));
            }
        }
        assert!(sand.add_shell(42, 70, &mut rng));
        assert_eq!(sand.shells().len(), 2);
    }

    #[test]
    fn shells_reject_sea_and_out_of_bounds() {
        let mut sand = automaton();
        let mut rng = rng();
        assert!(!sand.add_shell(40, BEACH_Y - 1, &mut rng));
        assert!(!sand.add_shell(-1, 70, &mut rng));
        assert!(!sand.add_shell(128, 70, &mut rng));
        assert!(sand.shells().is_empty());
    }

    #[test]
    fn shell_kinds_stay_in_range() {
        let mut sand = automaton();
        let mut rng = rng();
        for i in 0..20 {
            sand.add_shell(i * 3, 70, &mut rng);
        }
        assert!(sand.shells().iter().all(|s| s.kind < SHELL_KINDS));
    }

    // Property: a gravity pass conserves grains while everything stays
    // below the beach line, and never stacks two grains on one cell.
    proptest! {
        #[test]
        fn prop_step_conserves_grains_below_the_beach(
            coords in proptest::collection::hash_set(
                (0i32..128, BEACH_Y..128),
                1..80,
            ),
            steps in 1usize..8,
        ) {
            let mut sand = automaton();
            let mut rng = SmallRng::seed_from_u64(11);
            for &(x, y) in &coords {
                sand.spawn(x, y);
            }
            let spawned = sand.particle_count();
            for _ in 0..steps {
                sand.step(&mut rng);
            }
            prop_assert_eq!(sand.particle_count(), spawned);
            prop_assert_eq!(sand.grid().len(), spawned);
        }
    }

    // Property: washing never creates or duplicates grains, only moves
    // them (reaping is the gravity pass's job).
    proptest! {
        #[test]
        fn prop_wash_preserves_grain_count(
            coords in proptest::collection::hash_set(
                (0i32..128, BEACH_Y..128),
                1..80,
            ),
            returning in any::<bool>(),
            seed in any::<u64>(),
        ) {
            let mut sand = automaton();
            let mut rng = SmallRng::seed_from_u64(seed);
            for &(x, y) in &coords {
                sand.spawn(x, y);
            }
            let spawned = sand.particle_count();
            sand.wave_wash(BEACH_Y + 20, returning, 0.7, &mut rng);
            prop_assert_eq!(sand.particle_count(), spawned);
        }
    }
}
