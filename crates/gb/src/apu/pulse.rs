//! Pulse channels (CH1/CH2). CH1 additionally carries a frequency sweep;
//! CH2 is identical minus the sweep unit, so `has_sweep` just gates whether
//! trigger/clock touch it.

use super::length::LengthCounter;
use dmg_core::apu::{Envelope, SweepEvent, SweepUnit};

const DUTY_PATTERNS: [[u8; 8]; 4] = [
    [0, 0, 0, 0, 0, 0, 0, 1],
    [1, 0, 0, 0, 0, 0, 0, 1],
    [1, 0, 0, 0, 0, 1, 1, 1],
    [0, 1, 1, 1, 1, 1, 1, 0],
];

pub struct PulseChannel {
    has_sweep: bool,
    duty: u8,
    duty_step: u8,
    frequency: u16,
    timer: i32,
    envelope: Envelope,
    sweep: SweepUnit,
    length: LengthCounter,
    dac_enabled: bool,
    enabled: bool,

    nrx0: u8,
    nrx1: u8,
    nrx2: u8,
    nrx4: u8,
}

impl PulseChannel {
    pub fn new(has_sweep: bool) -> Self {
        Self {
            has_sweep,
            duty: 0,
            duty_step: 0,
            frequency: 0,
            timer: 0,
            envelope: Envelope::new(),
            sweep: SweepUnit::new(),
            length: LengthCounter::new(64),
            dac_enabled: false,
            enabled: false,
            nrx0: 0,
            nrx1: 0,
            nrx2: 0,
            nrx4: 0,
        }
    }

    pub fn read_sweep(&self) -> u8 {
        self.nrx0 | 0x80
    }

    pub fn read_duty_length(&self) -> u8 {
        self.nrx1 | 0x3F
    }

    pub fn read_envelope(&self) -> u8 {
        self.nrx2
    }

    pub fn read_freq_hi_control(&self) -> u8 {
        self.nrx4 | 0xBF
    }

    pub fn enabled(&self) -> bool {
        self.enabled && self.dac_enabled
    }

    pub fn write_sweep(&mut self, value: u8) {
        if !self.has_sweep {
            return;
        }
        self.nrx0 = value;
        let period = (value >> 4) & 0x07;
        let negate = value & 0x08 != 0;
        let shift = value & 0x07;
        self.sweep.set_params(period, negate, shift);
    }

    pub fn write_duty_length(&mut self, value: u8) {
        self.nrx1 = value;
        self.duty = (value >> 6) & 0x03;
        self.length.load((value & 0x3F) as u16);
    }

    pub fn write_envelope(&mut self, value: u8) {
        self.nrx2 = value;
        self.dac_enabled = Envelope::dac_enabled_from_nrx2(value);
        if !self.dac_enabled {
            self.enabled = false;
        }
    }

    pub fn write_freq_lo(&mut self, value: u8) {
        self.frequency = (self.frequency & 0x700) | value as u16;
    }

    pub fn write_freq_hi_control(&mut self, value: u8) {
        self.nrx4 = value;
        self.frequency = (self.frequency & 0xFF) | (((value & 0x07) as u16) << 8);
        self.length.enabled = value & 0x40 != 0;
        if value & 0x80 != 0 {
            self.trigger();
        }
    }

    fn trigger(&mut self) {
        self.enabled = self.dac_enabled;
        self.length.trigger();
        self.timer = (2048 - self.frequency as i32) * 4;
        let initial_volume = (self.nrx2 >> 4) & 0x0F;
        let direction = self.nrx2 & 0x08 != 0;
        let period = self.nrx2 & 0x07;
        self.envelope.trigger(initial_volume, direction, period);
        if self.has_sweep && self.sweep.trigger(self.frequency) {
            self.enabled = false;
        }
    }

    pub fn clock_length(&mut self) {
        if self.length.clock() {
            self.enabled = false;
        }
    }

    pub fn clock_envelope(&mut self) {
        self.envelope.clock();
    }

    pub fn clock_sweep(&mut self) {
        if !self.has_sweep {
            return;
        }
        match self.sweep.clock() {
            SweepEvent::None => {}
            SweepEvent::Updated(new_freq) => self.frequency = new_freq,
            SweepEvent::Overflowed => self.enabled = false,
        }
    }

    /// Advance the channel's own frequency timer by one T-cycle.
    pub fn step(&mut self) {
        self.timer -= 1;
        if self.timer <= 0 {
            self.timer += (2048 - self.frequency as i32) * 4;
            self.duty_step = (self.duty_step + 1) % 8;
        }
    }

    pub fn amplitude(&self) -> f32 {
        if !self.enabled() {
            return 0.0;
        }
        let bit = DUTY_PATTERNS[self.duty as usize][self.duty_step as usize];
        let volume = self.envelope.volume();
        if bit == 1 {
            volume as f32 / 7.5 - 1.0
        } else {
            -1.0
        }
    }
}
