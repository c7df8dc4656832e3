//! Live-tunable simulation settings.

use serde::{Deserialize, Serialize};

/// Fixed logical frame rate owned by the embedder's frame driver.
pub const FRAME_RATE: f32 = 30.0;

/// Settings the embedder's settings screen mutates between frames.
///
/// The simulation reads these fresh every frame rather than caching
/// copies, so a change made mid-session is observable on the very next
/// tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Frames between waves. 120 at 30 fps is one wave every 4 s.
    pub wave_interval: u32,
    /// Maximum vertical wave penetration below the beach line, in cells.
    pub wave_reach: i32,
    /// Erosion strength in percent, 0..=100.
    pub wave_power: u32,
    /// Sand grains dropped per pour tick.
    pub sand_amount: u32,
    /// Water drops released per pour tick.
    pub water_amount: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            wave_interval: 120,
            wave_reach: 50,
            wave_power: 50,
            sand_amount: 3,
            water_amount: 3,
        }
    }
}

impl Config {
    /// Wave interval in seconds at the fixed frame rate.
    #[must_use]
    pub fn wave_interval_secs(&self) -> f32 {
        self.wave_interval as f32 / FRAME_RATE
    }

    /// Erosion probability in `0.0..=1.0`.
    #[must_use]
    pub fn wave_power_ratio(&self) -> f64 {
        f64::from(self.wave_power.min(100)) / 100.0
    }
}
