//! Per-material automatons stepped by the orchestrator.
//!
//! Each automaton exclusively owns its occupancy grid; the only
//! cross-material contact is the read-only sand view handed to the
//! water step.

pub mod sand;
pub mod water;

pub use sand::{SandAutomaton, Shell, SAND_PALETTE};
pub use water::{WaterAutomaton, DEFAULT_SUBSTEPS, WATER_BRIGHT, WATER_DARK};
