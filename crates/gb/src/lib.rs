//! A cycle-driven Game Boy (DMG) emulation core.
//!
//! [`GameBoy`] wires the [`Cpu`](cpu::Cpu) and [`Bus`](bus::Bus) together and
//! drives them one frame at a time. Everything else in this crate — the ALU,
//! the register file, the PPU/APU/timer/joypad/serial peripherals, cartridge
//! loading — is reachable through that one entry point; hosts don't need to
//! touch the internals directly.

mod alu;
mod apu;
mod bus;
mod cartridge;
mod cpu;
mod error;
mod interrupts;
mod joypad;
mod ppu;
mod registers;
mod serial;
mod timer;

pub use cartridge::Cartridge;
pub use error::LoadError;
pub use ppu::{SCREEN_HEIGHT, SCREEN_WIDTH};

use bus::Bus;
use cpu::Cpu;
use dmg_core::{AudioSink, Frame, FrameSink, InputSource, SerialSink};

const BOOT_ROM_LEN: usize = 0x100;
/// M-cycles (not T-cycles) in one 70224-dot frame.
const CYCLES_PER_FRAME: u32 = 70224 / 4;

/// The complete DMG system: CPU, bus, and every peripheral reachable through it.
pub struct GameBoy {
    cpu: Cpu,
    bus: Bus,
}

impl GameBoy {
    /// Boots straight to cartridge entry point (`0x0100`) with the documented
    /// post-boot-ROM register and I/O state, skipping the boot ROM image.
    pub fn new(cartridge: Cartridge) -> Self {
        Self {
            cpu: Cpu::with_post_boot_state(),
            bus: Bus::new(cartridge, None),
        }
    }

    /// Boots through a real 256-byte boot ROM image, starting at `0x0000`
    /// with zeroed registers, exactly as hardware does.
    pub fn with_boot_rom(cartridge: Cartridge, boot_rom: Vec<u8>) -> Result<Self, LoadError> {
        if boot_rom.len() != BOOT_ROM_LEN {
            return Err(LoadError::InvalidBootRomSize {
                size: boot_rom.len(),
            });
        }
        let mut image = [0u8; BOOT_ROM_LEN];
        image.copy_from_slice(&boot_rom);
        Ok(Self {
            cpu: Cpu::new(),
            bus: Bus::new(cartridge, Some(image)),
        })
    }

    pub fn cartridge_title(&self) -> &str {
        self.bus.cartridge_title()
    }

    /// Runs the system for exactly one frame's worth of M-cycles (70224
    /// dots), delivering the finished framebuffer, any completed audio
    /// blocks, and any bytes shifted out over serial to the given sinks, and
    /// polling `input` once per frame for currently-pressed buttons.
    ///
    /// Button presses wake the CPU from `STOP`; `Cpu` has no visibility into
    /// the joypad itself; [`Bus::poll_input`] reports whether anything is
    /// pressed so that wakeup can happen here instead.
    pub fn run_frame(
        &mut self,
        frame_sink: &mut dyn FrameSink,
        audio_sink: &mut dyn AudioSink,
        serial_sink: &mut dyn SerialSink,
        input: &mut dyn InputSource,
    ) {
        if self.bus.poll_input(input) {
            self.cpu.stopped = false;
        }

        let target = self.bus.m_cycles() + CYCLES_PER_FRAME as u64;
        while self.bus.m_cycles() < target {
            self.cpu.step(&mut self.bus);
        }

        for byte in self.bus.drain_serial() {
            serial_sink.recv_byte(byte);
        }
        while let Some(block) = self.bus.apu.take_block_if_ready() {
            audio_sink.push_block(&block);
        }
        frame_sink.present(self.frame());
    }

    pub fn frame(&self) -> &Frame {
        self.bus.ppu.frame()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dmg_core::NullHost;

    fn blank_cartridge() -> Cartridge {
        Cartridge::load(vec![0u8; 0x8000]).unwrap()
    }

    #[test]
    fn new_boots_directly_to_cartridge_entry_point() {
        let gb = GameBoy::new(blank_cartridge());
        assert_eq!(gb.cpu.regs.pc, 0x0100);
        assert_eq!(gb.cpu.regs.sp, 0xFFFE);
    }

    #[test]
    fn with_boot_rom_rejects_the_wrong_size() {
        let err = GameBoy::with_boot_rom(blank_cartridge(), vec![0u8; 10]).unwrap_err();
        assert_eq!(err, LoadError::InvalidBootRomSize { size: 10 });
    }

    #[test]
    fn with_boot_rom_starts_execution_at_zero() {
        let gb = GameBoy::with_boot_rom(blank_cartridge(), vec![0u8; BOOT_ROM_LEN]).unwrap();
        assert_eq!(gb.cpu.regs.pc, 0x0000);
    }

    #[test]
    fn run_frame_produces_a_full_screen_and_does_not_panic() {
        let mut gb = GameBoy::new(blank_cartridge());
        let (mut frames, mut audio, mut serial, mut input) =
            (NullHost, NullHost, NullHost, NullHost);
        gb.run_frame(&mut frames, &mut audio, &mut serial, &mut input);
        let frame = gb.frame();
        assert_eq!(frame.width, SCREEN_WIDTH);
        assert_eq!(frame.height, SCREEN_HEIGHT);
    }
}
