//! Supplementary Volume Descriptor (Joliet support)
//!
//! The Supplementary VD enables Joliet extensions for long Unicode filenames.
//! Joliet is announced by one of three escape sequences at offset 88.

use crate::directory::record::DirectoryRecord;
use crate::types::{ExtensionMask, VolumeDescriptorType};
use crate::volume::primary::VolumeDescriptor;

/// Escape sequences for Joliet levels 1, 2 and 3 (UCS-2 levels)
pub const JOLIET_ESCAPES: [[u8; 3]; 3] = [*b"%/@", *b"%/C", *b"%/E"];

/// Joliet level of an escape sequence field, if it announces one
pub fn joliet_level(escape_sequences: &[u8]) -> Option<u8> {
    let lead = escape_sequences.get(..3)?;
    JOLIET_ESCAPES
        .iter()
        .position(|esc| esc == lead)
        .map(|i| i as u8 + 1)
}

/// Is the given Joliet level enabled in the mask?
pub fn joliet_level_enabled(mask: ExtensionMask, level: u8) -> bool {
    let flag = match level {
        1 => ExtensionMask::JOLIET_LEVEL1,
        2 => ExtensionMask::JOLIET_LEVEL2,
        3 => ExtensionMask::JOLIET_LEVEL3,
        _ => return false,
    };
    mask.contains(flag)
}

/// Empty Joliet descriptor for authoring
pub fn new_joliet(level: u8, root: DirectoryRecord) -> VolumeDescriptor {
    debug_assert!((1..=3).contains(&level));
    let mut svd = VolumeDescriptor::new(VolumeDescriptorType::Supplementary, root);
    // UCS-2 spaces
    for id in [&mut svd.system_id[..], &mut svd.volume_id[..]] {
        for pair in id.chunks_exact_mut(2) {
            pair.copy_from_slice(&[0x00, 0x20]);
        }
    }
    let index = (level.clamp(1, 3) - 1) as usize;
    svd.escape_sequences[..3].copy_from_slice(&JOLIET_ESCAPES[index]);
    svd
}
