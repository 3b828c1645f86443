//! Error types surfaced across crate boundaries.

use thiserror::Error;

/// Failure modes when loading a cartridge or boot ROM image.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LoadError {
    #[error("rom image is too small to contain a header ({size} bytes)")]
    TooSmall { size: usize },

    #[error("unsupported cartridge type 0x{cartridge_type:02X} at header offset 0x0147")]
    UnsupportedCartridgeType { cartridge_type: u8 },

    #[error("boot rom must be exactly 256 bytes, got {size}")]
    InvalidBootRomSize { size: usize },
}
