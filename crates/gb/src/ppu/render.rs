//! Scanline compositing: background, window, and sprite layers mixed into
//! one row of shade indices, then mapped through a palette to RGBA.
//!
//! The fetcher's dot-by-dot FIFO timing is modeled by [`super::Ppu::step`];
//! this module does the actual pixel math once a scanline's mode-3 budget
//! has elapsed, since the visible result is the same either way and batching
//! it keeps the tile math simple and testable in isolation.

use super::oam::SpriteEntry;
use dmg_core::palette::{DmgPalette, IndexedPalette};

const TILE_MAP_SIZE: u16 = 32;

fn tile_data_addr(lcdc: u8, tile_index: u8, row: u8) -> u16 {
    let signed_addressing = lcdc & 0x10 == 0;
    let base: i32 = if signed_addressing {
        0x9000 + (tile_index as i8 as i32) * 16
    } else {
        0x8000 + (tile_index as i32) * 16
    };
    (base as u16).wrapping_add(row as u16 * 2)
}

fn tile_row_pixels(vram: &[u8; 0x2000], addr: u16) -> [u8; 8] {
    let offset = (addr - 0x8000) as usize;
    let low = vram[offset];
    let high = vram[offset + 1];
    let mut pixels = [0u8; 8];
    for (bit, slot) in pixels.iter_mut().enumerate() {
        let shift = 7 - bit;
        let lo = (low >> shift) & 1;
        let hi = (high >> shift) & 1;
        *slot = (hi << 1) | lo;
    }
    pixels
}

/// Renders one background/window row's color indices (before the sprite
/// layer is mixed in). `window_line` is `Some(line)` when the window is
/// active on this scanline.
pub fn render_bg_row(
    vram: &[u8; 0x2000],
    lcdc: u8,
    scx: u8,
    scy: u8,
    ly: u8,
    wx: u8,
    window_line: Option<u8>,
) -> [u8; 160] {
    let mut row = [0u8; 160];
    if lcdc & 0x01 == 0 {
        // Background/window disabled: the layer reads as shade 0.
        return row;
    }
    let bg_map_base: u16 = if lcdc & 0x08 != 0 { 0x9C00 } else { 0x9800 };
    let win_map_base: u16 = if lcdc & 0x40 != 0 { 0x9C00 } else { 0x9800 };

    for x in 0..160u16 {
        let use_window = window_line.is_some() && lcdc & 0x20 != 0 && x + 7 >= wx as u16;
        let (map_base, tile_x, tile_y, fine_x, fine_y) = if use_window {
            let wl = window_line.unwrap();
            let win_x = x + 7 - wx as u16;
            (
                win_map_base,
                (win_x / 8) % TILE_MAP_SIZE,
                (wl as u16 / 8) % TILE_MAP_SIZE,
                (win_x % 8) as u8,
                (wl % 8),
            )
        } else {
            let bg_x = (x + scx as u16) & 0xFF;
            let bg_y = (ly as u16 + scy as u16) & 0xFF;
            (
                bg_map_base,
                (bg_x / 8) % TILE_MAP_SIZE,
                (bg_y / 8) % TILE_MAP_SIZE,
                (bg_x % 8) as u8,
                (bg_y % 8) as u8,
            )
        };
        let map_addr = map_base + tile_y * TILE_MAP_SIZE + tile_x;
        let tile_index = vram[(map_addr - 0x8000) as usize];
        let addr = tile_data_addr(lcdc, tile_index, fine_y as u8);
        let pixels = tile_row_pixels(vram, addr);
        row[x as usize] = pixels[fine_x as usize];
    }
    row
}

/// Mixes the sprite layer over an already-rendered background row, applying
/// DMG sprite-priority rules (lowest X wins, ties by OAM order; `bg_over`
/// flag hides non-zero-index sprite pixels behind non-zero-index background
/// pixels).
pub fn mix_sprites(
    bg_row: &[u8; 160],
    bg_colors: &[u32; 4],
    sprites: &[SpriteEntry],
    vram: &[u8; 0x2000],
    obp0: &DmgPalette,
    obp1: &DmgPalette,
    lcdc: u8,
    ly: u8,
) -> [u32; 160] {
    let mut out = [0u32; 160];
    for (x, &bg_index) in bg_row.iter().enumerate() {
        out[x] = bg_colors[bg_index as usize];
    }
    if lcdc & 0x02 == 0 {
        return out;
    }
    let sprite_height: i16 = if lcdc & 0x04 != 0 { 16 } else { 8 };

    // Iterate lowest priority first so higher-priority sprites paint last
    // and win ties at the same pixel.
    for sprite in sprites.iter().rev() {
        let top = sprite.y as i16 - 16;
        let mut row_in_sprite = (ly as i16 - top) as u8;
        if sprite.flip_y() {
            row_in_sprite = sprite_height as u8 - 1 - row_in_sprite;
        }
        let tile_index = if sprite_height == 16 {
            if row_in_sprite < 8 {
                sprite.tile & 0xFE
            } else {
                sprite.tile | 0x01
            }
        } else {
            sprite.tile
        };
        let fine_y = row_in_sprite % 8;
        let addr = 0x8000u16 + tile_index as u16 * 16 + fine_y as u16 * 2;
        let pixels = tile_row_pixels(vram, addr);
        let palette = if sprite.palette1() { obp1 } else { obp0 };

        for col in 0..8u8 {
            let screen_x = sprite.x as i16 - 8 + col as i16;
            if !(0..160).contains(&screen_x) {
                continue;
            }
            let sample_col = if sprite.flip_x() { 7 - col } else { col };
            let color_index = pixels[sample_col as usize];
            if color_index == 0 {
                continue; // transparent
            }
            if sprite.behind_bg() && bg_row[screen_x as usize] != 0 {
                continue;
            }
            out[screen_x as usize] = palette.get_color(color_index);
        }
    }
    out
}
