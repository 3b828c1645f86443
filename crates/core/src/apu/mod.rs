//! Reusable audio synthesis building blocks.
//!
//! `Envelope` and `SweepUnit` are shaped closely enough alike across square-wave
//! PSGs (NES's RP2A03, the Game Boy's PSG, and others) that it's worth keeping
//! them generic here; channel-specific bit widths and register wiring live in
//! the system crate that uses them.

mod envelope;
mod sweep;

pub use envelope::Envelope;
pub use sweep::{SweepEvent, SweepUnit};
