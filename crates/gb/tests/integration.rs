//! End-to-end scenarios driven entirely through the public `GameBoy` API,
//! complementing the unit tests colocated with each module.

use dmg_core::palette::DMG_GREYS;
use dmg_core::NullHost;
use dmg_gb::{Cartridge, GameBoy, LoadError, SCREEN_HEIGHT, SCREEN_WIDTH};

fn blank_rom(cartridge_type: u8) -> Vec<u8> {
    let mut rom = vec![0u8; 0x8000];
    rom[0x0147] = cartridge_type;
    rom
}

fn run_one_frame(gb: &mut GameBoy) {
    let (mut frames, mut audio, mut serial, mut input) = (NullHost, NullHost, NullHost, NullHost);
    gb.run_frame(&mut frames, &mut audio, &mut serial, &mut input);
}

#[test]
fn unsupported_cartridge_type_is_rejected_before_booting() {
    let err = Cartridge::load(blank_rom(0x01)).unwrap_err(); // MBC1
    assert_eq!(err, LoadError::UnsupportedCartridgeType { cartridge_type: 0x01 });
}

#[test]
fn boot_rom_of_the_wrong_size_is_rejected() {
    let cart = Cartridge::load(blank_rom(0x00)).unwrap();
    let err = GameBoy::with_boot_rom(cart, vec![0u8; 100]).unwrap_err();
    assert_eq!(err, LoadError::InvalidBootRomSize { size: 100 });
}

#[test]
fn blank_cartridge_runs_frames_and_produces_a_full_screen() {
    let cart = Cartridge::load(blank_rom(0x00)).unwrap();
    let mut gb = GameBoy::new(cart);
    for _ in 0..3 {
        run_one_frame(&mut gb);
    }
    let frame = gb.frame();
    assert_eq!(frame.width, SCREEN_WIDTH);
    assert_eq!(frame.height, SCREEN_HEIGHT);
    assert_eq!(frame.pixels.len(), (SCREEN_WIDTH * SCREEN_HEIGHT) as usize);
}

/// Writes an identity `BGP`, fills background tile 0 with solid color index
/// 3, then spins forever. Since tile map entry 0 (the whole 32x32 map, left
/// zero-initialized) points at tile 0, the entire screen should render as
/// the darkest DMG shade after one frame.
fn solid_tile_program() -> Vec<u8> {
    let mut program = vec![
        0x3E, 0xE4, // LD A,0xE4
        0xE0, 0x47, // LDH (0x47),A  ; BGP = identity mapping
        0x3E, 0xFF, // LD A,0xFF
        0x21, 0x00, 0x80, // LD HL,0x8000
    ];
    for _ in 0..16 {
        program.push(0x22); // LD (HL+),A
    }
    program.push(0x18);
    program.push(0xFE); // JR -2 (spin forever)
    program
}

#[test]
fn solid_background_tile_fills_the_whole_frame_with_the_darkest_shade() {
    let mut rom = blank_rom(0x00);
    let program = solid_tile_program();
    rom[0x0100..0x0100 + program.len()].copy_from_slice(&program);
    let cart = Cartridge::load(rom).unwrap();
    let mut gb = GameBoy::new(cart);

    run_one_frame(&mut gb);

    let frame = gb.frame();
    assert!(frame.pixels.iter().all(|&p| p == DMG_GREYS[3]));
}

#[test]
fn illegal_opcode_locks_the_cpu_up_without_crashing_the_engine() {
    let mut rom = blank_rom(0x00);
    rom[0x0100] = 0xD3; // one of the SM83's unused opcodes
    let cart = Cartridge::load(rom).unwrap();
    let mut gb = GameBoy::new(cart);

    for _ in 0..5 {
        run_one_frame(&mut gb);
    }
    let frame = gb.frame();
    assert_eq!(frame.pixels.len(), (SCREEN_WIDTH * SCREEN_HEIGHT) as usize);
}
