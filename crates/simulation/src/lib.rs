//! Beach sand, water and wave simulation engine.
//!
//! A fixed-rate (30 Hz) frame driver owned by the embedder calls
//! [`Beach::tick`] once per logical frame. Within a frame the order is
//! fixed: the wave state machine advances first, erosion is applied
//! against the fresh wave state, shells wash up on the returning edge,
//! then sand falls, then water flows against the settled sand mask. A
//! grain the wave displaced this frame still falls under gravity in the
//! same frame.
//!
//! Everything is single-threaded and synchronous; nothing blocks or
//! suspends mid-step.

pub mod api;
pub mod config;
pub mod elements;
pub mod grid;
pub mod wave;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::config::Config;
use crate::elements::{SandAutomaton, WaterAutomaton, DEFAULT_SUBSTEPS};
use crate::wave::{Phase, WaveController};

/// Poured particles land within this many cells of the pointer.
const POUR_SPREAD: i32 = 2;
/// Shell placement attempts on each returning edge.
const SHELL_TRIES: u32 = 2;

/// Orchestrator: owns both automatons, the wave cycle, the live
/// settings and the process-wide RNG, and sequences one frame per
/// [`Self::tick`].
///
/// The grids are exclusively owned by their automatons; external
/// spawn and removal requests all pass through the pour entry points
/// here or the automatons' public operations.
#[derive(Debug)]
pub struct Beach {
    config: Config,
    beach_y: i32,
    sand: SandAutomaton,
    water: WaterAutomaton,
    wave: WaveController,
    rng: SmallRng,
}

impl Beach {
    /// `beach_y` is the first beach row; everything above it is sea.
    /// The seed fixes the process-wide RNG, the only source of
    /// randomness in the simulation.
    #[must_use]
    pub fn new(width: i32, height: i32, beach_y: i32, seed: u64) -> Self {
        Self {
            config: Config::default(),
            beach_y,
            sand: SandAutomaton::new(width, height, beach_y),
            water: WaterAutomaton::new(width, height, beach_y),
            wave: WaveController::new(beach_y),
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Advance the whole simulation by one frame.
    ///
    /// Settings are read fresh here every frame; a change made by the
    /// settings screen between frames is in effect immediately.
    pub fn tick(&mut self) {
        self.wave.step(&self.config);

        let (active, depth) = self.wave.wave_zone();
        if active {
            let returning = self.wave.phase() == Phase::Returning;
            self.sand.wave_wash(
                depth,
                returning,
                self.config.wave_power_ratio(),
                &mut self.rng,
            );
        }
        if self.wave.returning_edge() {
            self.scatter_shells(depth);
        }

        self.sand.step(&mut self.rng);
        self.water
            .step(self.sand.grid(), DEFAULT_SUBSTEPS, &mut self.rng);
    }

    /// Drop `sand_amount` grains around `x` with a little jitter.
    /// Grains aimed at occupied cells or the sea are discarded.
    pub fn pour_sand(&mut self, x: i32, y: i32) {
        for _ in 0..self.config.sand_amount {
            let jitter = self.rng.gen_range(-POUR_SPREAD..=POUR_SPREAD);
            self.sand.spawn(x + jitter, y);
        }
    }

    /// Release `water_amount` drops around `x` with a little jitter.
    pub fn pour_water(&mut self, x: i32, y: i32) {
        for _ in 0..self.config.water_amount {
            let jitter = self.rng.gen_range(-POUR_SPREAD..=POUR_SPREAD);
            self.water.spawn(x + jitter, y, &mut self.rng);
        }
    }

    /// Advance the palette newly poured sand takes.
    pub fn cycle_sand_color(&mut self) {
        self.sand.cycle_color();
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The settings screen writes through here between frames.
    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    #[must_use]
    pub fn sand(&self) -> &SandAutomaton {
        &self.sand
    }

    #[must_use]
    pub fn water(&self) -> &WaterAutomaton {
        &self.water
    }

    #[must_use]
    pub fn wave(&self) -> &WaveController {
        &self.wave
    }

    fn scatter_shells(&mut self, depth: i32) {
        let width = self.sand.grid().width();
        for _ in 0..SHELL_TRIES {
            let x = self.rng.gen_range(0..width);
            let y = self.rng.gen_range(self.beach_y..=depth.max(self.beach_y));
            self.sand.add_shell(x, y, &mut self.rng);
        }
    }
}
