//! WASM-facing embedder API.
//!
//! The browser owns the 30 Hz frame loop, input polling, rendering and
//! the settings screen; this wrapper only forwards requests into
//! [`Beach`] and hands back flat pixel buffers. No simulation logic
//! lives here.

use wasm_bindgen::prelude::*;

use crate::Beach;

/// Handle the embedder drives one frame at a time.
#[wasm_bindgen]
#[derive(Debug)]
pub struct BeachSim {
    inner: Beach,
}

#[wasm_bindgen]
impl BeachSim {
    /// `beach_y` is the first beach row; everything above it is sea.
    #[wasm_bindgen(constructor)]
    #[must_use]
    pub fn new(width: i32, height: i32, beach_y: i32, seed: u32) -> Self {
        Self {
            inner: Beach::new(width, height, beach_y, u64::from(seed)),
        }
    }

    /// Advance one logical frame.
    pub fn tick(&mut self) {
        self.inner.tick();
    }

    pub fn pour_sand(&mut self, x: i32, y: i32) {
        self.inner.pour_sand(x, y);
    }

    pub fn pour_water(&mut self, x: i32, y: i32) {
        self.inner.pour_water(x, y);
    }

    pub fn cycle_sand_color(&mut self) {
        self.inner.cycle_sand_color();
    }

    /// Flat `[x, y, color, ...]` triples for the renderer.
    #[must_use]
    pub fn sand_pixels(&self) -> Vec<i32> {
        let sand = self.inner.sand();
        let mut out = Vec::with_capacity(sand.particle_count() * 3);
        for (x, y, color) in sand.particles() {
            out.extend_from_slice(&[x, y, i32::from(color)]);
        }
        out
    }

    /// Flat `[x, y, color, ...]` triples for the renderer.
    #[must_use]
    pub fn water_pixels(&self) -> Vec<i32> {
        let water = self.inner.water();
        let mut out = Vec::with_capacity(water.particle_count() * 3);
        for (x, y, color) in water.particles() {
            out.extend_from_slice(&[x, y, i32::from(color)]);
        }
        out
    }

    /// Flat `[x, y, kind, ...]` triples for the shell sprites.
    #[must_use]
    pub fn shell_pixels(&self) -> Vec<i32> {
        let shells = self.inner.sand().shells();
        let mut out = Vec::with_capacity(shells.len() * 3);
        for shell in shells {
            out.extend_from_slice(&[shell.x, shell.y, i32::from(shell.kind)]);
        }
        out
    }

    #[must_use]
    pub fn wave_active(&self) -> bool {
        self.inner.wave().wave_zone().0
    }

    /// Deepest row the wave currently covers, as an absolute y.
    #[must_use]
    pub fn wave_depth(&self) -> i32 {
        self.inner.wave().wave_zone().1
    }

    // Settings-screen writes land between frames and are picked up on
    // the next tick.

    pub fn set_wave_interval(&mut self, frames: u32) {
        self.inner.config_mut().wave_interval = frames;
    }

    pub fn set_wave_reach(&mut self, cells: i32) {
        self.inner.config_mut().wave_reach = cells;
    }

    pub fn set_wave_power(&mut self, percent: u32) {
        self.inner.config_mut().wave_power = percent;
    }

    pub fn set_sand_amount(&mut self, grains: u32) {
        self.inner.config_mut().sand_amount = grains;
    }

    pub fn set_water_amount(&mut self, drops: u32) {
        self.inner.config_mut().water_amount = drops;
    }
}
