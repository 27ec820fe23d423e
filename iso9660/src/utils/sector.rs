//! Sector alignment and calculation utilities

use crate::types::SECTOR_SIZE;

/// Align value to sector boundary (round up)
pub fn align_to_sector(value: usize) -> usize {
    (value + SECTOR_SIZE - 1) & !(SECTOR_SIZE - 1)
}

/// Bytes left before the next sector boundary
pub fn remaining_in_sector(offset: usize) -> usize {
    SECTOR_SIZE - offset % SECTOR_SIZE
}

/// Calculate number of sectors needed for byte count
pub fn sectors_for_bytes(byte_count: u64) -> u32 {
    byte_count.div_ceil(SECTOR_SIZE as u64) as u32
}

/// Round up to an even length (records and path table entries)
pub fn pad_even(len: usize) -> usize {
    len + (len & 1)
}
