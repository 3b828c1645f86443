//! Volume envelope generator for square/noise channels.
//!
//! Provides automatic volume fade driven by a period counter, as used by the
//! Game Boy's pulse and noise channels (NR12/NR22/NR42) and by similar units
//! in other PSGs.

/// Envelope generator component.
///
/// Unlike a pure decay-to-zero envelope, this one supports both directions
/// (`direction = true` increases volume, `false` decreases), matching the
/// Game Boy's `NRx2` envelope direction bit.
#[derive(Debug, Clone, Copy)]
pub struct Envelope {
    volume: u8,
    direction: bool,
    period: u8,
    timer: u8,
}

impl Envelope {
    pub const fn new() -> Self {
        Self {
            volume: 0,
            direction: false,
            period: 0,
            timer: 0,
        }
    }

    /// Reload the envelope on channel trigger.
    pub fn trigger(&mut self, initial_volume: u8, direction: bool, period: u8) {
        self.volume = initial_volume;
        self.direction = direction;
        self.period = period;
        self.timer = period;
    }

    /// Clock the envelope at the frame sequencer's envelope step (64 Hz on DMG).
    /// A period of 0 disables automatic adjustment, matching hardware.
    pub fn clock(&mut self) {
        if self.period == 0 {
            return;
        }
        if self.timer > 0 {
            self.timer -= 1;
        }
        if self.timer == 0 {
            self.timer = self.period;
            match (self.direction, self.volume) {
                (true, v) if v < 15 => self.volume += 1,
                (false, v) if v > 0 => self.volume -= 1,
                _ => {}
            }
        }
    }

    pub fn volume(&self) -> u8 {
        self.volume
    }

    /// Whether the DAC this envelope feeds would be silent right now: on the
    /// Game Boy the DAC is considered off whenever initial volume is 0 and
    /// direction is "decrease" (NRx2 upper 5 bits all zero).
    pub fn dac_enabled_from_nrx2(nrx2: u8) -> bool {
        nrx2 & 0xF8 != 0
    }
}

impl Default for Envelope {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decreasing_envelope_steps_down_to_zero_and_stops() {
        let mut e = Envelope::new();
        e.trigger(2, false, 1);
        e.clock();
        assert_eq!(e.volume(), 1);
        e.clock();
        assert_eq!(e.volume(), 0);
        e.clock();
        assert_eq!(e.volume(), 0);
    }

    #[test]
    fn increasing_envelope_clamps_at_fifteen() {
        let mut e = Envelope::new();
        e.trigger(14, true, 1);
        e.clock();
        assert_eq!(e.volume(), 15);
        e.clock();
        assert_eq!(e.volume(), 15);
    }

    #[test]
    fn zero_period_disables_automatic_adjustment() {
        let mut e = Envelope::new();
        e.trigger(5, true, 0);
        e.clock();
        e.clock();
        assert_eq!(e.volume(), 5);
    }

    #[test]
    fn dac_enable_bit_reads_upper_five_bits_of_nrx2() {
        assert!(!Envelope::dac_enabled_from_nrx2(0x00));
        assert!(!Envelope::dac_enabled_from_nrx2(0x07));
        assert!(Envelope::dac_enabled_from_nrx2(0x08));
        assert!(Envelope::dac_enabled_from_nrx2(0xF8));
    }
}
