//! Shared primitives reused by the DMG engine (`dmg-gb`) and its front end.
//!
//! This crate holds the pieces of the emulator that are genuinely
//! system-agnostic: the collaborator traits a host implements to receive
//! frames/audio/serial bytes and deliver input, a small indexed-palette
//! abstraction, and a couple of audio synthesis building blocks (envelope,
//! frequency sweep) whose shape is shared across many retro sound chips.
//!
//! Anything DMG-specific — register layouts, bit widths, timing constants —
//! lives in `dmg-gb`.

pub mod apu;
pub mod palette;

/// A single RGBA8888 framebuffer, produced once per emulated frame.
#[derive(Debug, Clone)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u32>,
}

impl Frame {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0xFF000000; (width * height) as usize],
        }
    }
}

/// A sink that receives a finished framebuffer once per frame, on entering V-blank.
pub trait FrameSink {
    fn present(&mut self, frame: &Frame);
}

/// A sink that receives interleaved stereo audio samples in `[-1.0, 1.0]`.
///
/// The engine flushes in fixed-size blocks; hosts that don't care about audio
/// can implement this as a no-op.
pub trait AudioSink {
    fn push_block(&mut self, samples: &[f32]);
}

/// A sink for bytes shifted out over the serial port. Primarily used by
/// test ROMs (e.g. Blargg's suite) as an output channel.
pub trait SerialSink {
    fn recv_byte(&mut self, byte: u8);
}

/// The eight physical buttons on a DMG.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Button {
    Right,
    Left,
    Up,
    Down,
    A,
    B,
    Select,
    Start,
}

/// A source of input edges. The engine polls this once per frame; hosts that
/// don't need live input (headless test runs) can implement it as always-empty.
pub trait InputSource {
    /// Returns the set of currently-pressed buttons.
    fn pressed(&mut self) -> Vec<Button>;
}

/// A `FrameSink`/`AudioSink`/`SerialSink`/`InputSource` that does nothing,
/// useful for tests and for running the engine without a host attached.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullHost;

impl FrameSink for NullHost {
    fn present(&mut self, _frame: &Frame) {}
}

impl AudioSink for NullHost {
    fn push_block(&mut self, _samples: &[f32]) {}
}

impl SerialSink for NullHost {
    fn recv_byte(&mut self, _byte: u8) {}
}

impl InputSource for NullHost {
    fn pressed(&mut self) -> Vec<Button> {
        Vec::new()
    }
}
