//! CRC-16/CCITT checksums for radio packets.
//!
//! Packets carry a trailing 16-bit checksum computed over every preceding
//! byte, starting from the non-zero [`CRC16_SEED`]. The checksum is stored
//! low byte first.

use crate::consts::CRC16_SEED;

/// Folds one byte into a running CRC-CCITT value.
pub(crate) fn crc_ccitt_update(crc: u16, data: &u8) -> u16 {
    let mut d = *data as u16;
    d ^= lo8(crc);
    d ^= d << 4;
    d = (d as u8) as u16; // Ensure d is treated as a u8 for the next operations

    ((d << 8) | hi8(crc)) ^ (((d >> 4) as u8) as u16) ^ (d << 3)
}

pub(crate) fn lo8(x: u16) -> u16 {
    x & 0xff
}

pub(crate) fn hi8(x: u16) -> u16 {
    x >> 8
}

/// Computes the packet checksum of `buf`.
pub fn checksum(buf: &[u8]) -> u16 {
    buf.iter().fold(CRC16_SEED, crc_ccitt_update)
}

/// Writes the checksum of `buf[..len]` into `buf[len..len + 2]`.
///
/// # Panics
/// Panics if `buf` is shorter than `len + 2`.
pub fn append(buf: &mut [u8], len: usize) {
    let crc = checksum(&buf[..len]);
    buf[len..len + 2].copy_from_slice(&crc.to_le_bytes());
}

/// Checks that `buf[len..len + 2]` holds the checksum of `buf[..len]`.
///
/// Returns `false` when the buffer is too short to hold a checksum.
pub fn check(buf: &[u8], len: usize) -> bool {
    match buf.get(len..len + 2) {
        Some(trailer) => trailer == checksum(&buf[..len]).to_le_bytes(),
        None => false,
    }
}
