//! Locating a volume on images with unknown framing
//!
//! Raw BIN dumps wrap each sector in 2352 or 2336 byte frames and some
//! images carry a header in front of the payload or have lost their first
//! bytes. The scan looks for a Primary Volume Descriptor near sector 16
//! under each candidate frame size and derives the (possibly negative)
//! byte offset of sector 0 from where the signature sits.

use alloc::vec;
use gpt_disk_io::BlockIo;

use super::{read_pvd, read_superblock, VolumeDescriptorHeader};
use crate::error::{FormatError, Result};
use crate::source::{Framing, SectorSource};
use crate::types::{
    FuzzyValidation, MountOptions, VolumeDescriptorType, VolumeInfo, CD_FRAMESIZE_RAW,
    M2RAW_SECTOR_SIZE, SECTOR_SIZE, VOLUME_DESCRIPTOR_START,
};

/// Frame sizes tried at each candidate sector, in order
pub const FRAME_SIZES: [u32; 3] = [SECTOR_SIZE as u32, CD_FRAMESIZE_RAW, M2RAW_SECTOR_SIZE];

/// Bytes a window reaches into its neighbours: the type byte before it
/// and the rest of a signature starting at its end
const WINDOW_LEAD: u64 = 1;
const WINDOW_TAIL: u64 = VolumeDescriptorHeader::MAGIC.len() as u64;

/// Sectors at distance `i` from sector 16
fn candidate_sectors(i: u32) -> impl Iterator<Item = u32> {
    let above = Some(VOLUME_DESCRIPTOR_START + i);
    let below = (i > 0 && i <= VOLUME_DESCRIPTOR_START).then(|| VOLUME_DESCRIPTOR_START - i);
    above.into_iter().chain(below)
}

/// Positions of every `CD001` in `window`
fn signature_positions(window: &[u8]) -> impl Iterator<Item = usize> + '_ {
    window
        .windows(VolumeDescriptorHeader::MAGIC.len())
        .enumerate()
        .filter(|(_, w)| *w == VolumeDescriptorHeader::MAGIC)
        .map(|(pos, _)| pos)
}

/// Byte range of the window for `sector`, clipped to the source
fn window_range(sector: u32, frame_size: u32, source_len: u64) -> Option<(u64, usize)> {
    let start = u64::from(sector) * u64::from(frame_size);
    let begin = start.saturating_sub(WINDOW_LEAD);
    let end = (start + u64::from(frame_size) + WINDOW_TAIL).min(source_len);
    (end > begin).then(|| (begin, (end - begin) as usize))
}

/// Framing that puts a descriptor found at byte `descriptor_at` on sector 16
fn framing_for(descriptor_at: u64, frame_size: u32) -> Option<Framing> {
    let sixteen = i64::from(VOLUME_DESCRIPTOR_START) * i64::from(frame_size);
    let data_start = i64::try_from(descriptor_at).ok()?.checked_sub(sixteen)?;
    Some(Framing { frame_size, data_start })
}

fn confirm<B: BlockIo>(source: &mut SectorSource<B>, options: &MountOptions) -> Result<VolumeInfo> {
    match options.fuzzy_validation {
        FuzzyValidation::FullScan => read_superblock(source, options),
        FuzzyValidation::SignatureOnly => Ok(VolumeInfo {
            pvd: read_pvd(source, options)?,
            svd: None,
            joliet_level: 0,
            has_rock_ridge: false,
        }),
    }
}

/// Find the framing of an image and read its volume descriptor set
///
/// Searches up to `max_fuzz` sector distances around sector 16. Each
/// `CD001` preceded by a Primary type byte yields a candidate framing,
/// which is confirmed according to `options.fuzzy_validation`. The first
/// candidate that confirms stays installed on `source`; if none does, the
/// original framing is restored and [`FormatError::SuperblockNotFound`]
/// is returned.
pub fn read_superblock_fuzzy<B: BlockIo>(
    source: &mut SectorSource<B>,
    options: &MountOptions,
    max_fuzz: u16,
) -> Result<(Framing, VolumeInfo)> {
    let original = source.framing();
    let source_len = source.byte_len()?;

    for i in 0..u32::from(max_fuzz) {
        for sector in candidate_sectors(i) {
            for frame_size in FRAME_SIZES {
                let Some((begin, len)) = window_range(sector, frame_size, source_len) else {
                    continue;
                };
                let mut window = vec![0u8; len];
                if let Err(e) = source.read_bytes(begin, &mut window) {
                    tracing::trace!(sector, frame_size, error = %e, "fuzzy window unreadable");
                    continue;
                }

                for pos in signature_positions(&window) {
                    if pos == 0 || window[pos - 1] != VolumeDescriptorType::Primary as u8 {
                        continue;
                    }
                    let Some(framing) = framing_for(begin + (pos - 1) as u64, frame_size) else {
                        continue;
                    };

                    source.set_framing(framing);
                    let data_start = framing.data_start;
                    match confirm(source, options) {
                        Ok(info) => {
                            tracing::debug!(
                                frame_size,
                                data_start,
                                sector,
                                "fuzzy scan located volume"
                            );
                            return Ok((framing, info));
                        }
                        Err(e) => tracing::trace!(
                            frame_size,
                            data_start,
                            error = %e,
                            "candidate rejected"
                        ),
                    }
                }
            }
        }
    }

    source.set_framing(original);
    tracing::debug!(max_fuzz, "fuzzy scan found no volume");
    Err(FormatError::SuperblockNotFound.into())
}
