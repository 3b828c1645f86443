//! The length counter shared by all four channels.
//!
//! Unlike the NES's table-indexed length counter, the Game Boy's counters
//! are just `max - load_value` (64 steps for the pulse/noise channels, 256
//! for the wave channel), so there's no lookup table to port.

#[derive(Debug, Clone, Copy)]
pub struct LengthCounter {
    max: u16,
    counter: u16,
    pub enabled: bool,
}

impl LengthCounter {
    pub const fn new(max: u16) -> Self {
        Self {
            max,
            counter: 0,
            enabled: false,
        }
    }

    pub fn load(&mut self, value: u16) {
        self.counter = self.max - value.min(self.max);
    }

    /// Triggering a channel whose counter is currently expired reloads it
    /// to the full duration (a quirk shared by all four channels).
    pub fn trigger(&mut self) {
        if self.counter == 0 {
            self.counter = self.max;
        }
    }

    /// Clocked at 256 Hz. Returns `true` if the channel should be disabled.
    pub fn clock(&mut self) -> bool {
        if !self.enabled || self.counter == 0 {
            return false;
        }
        self.counter -= 1;
        self.counter == 0
    }
}
