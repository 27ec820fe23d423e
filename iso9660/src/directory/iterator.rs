//! Directory iteration
//!
//! Walks the records of a directory extent and turns them into [`Stat`]
//! entries. Records never straddle a sector boundary; a zero length byte
//! means the rest of the sector is padding.

use alloc::string::String;
use alloc::vec::Vec;
use gpt_disk_io::BlockIo;

use crate::directory::record::DirectoryRecord;
use crate::error::{FormatError, Result};
use crate::extensions::{rock_ridge, xa::XaAttributes};
use crate::file::extent::Extent;
use crate::source::SectorSource;
use crate::types::{EndianPolicy, FileKind, MountOptions, Stat, VolumeInfo, SECTOR_SIZE};
use crate::utils::sector::sectors_for_bytes;
use crate::utils::string;

/// How records are decoded into entries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ListOptions {
    /// Both-endian mismatch handling
    pub endian: EndianPolicy,
    /// Surface `.` and `..`
    pub include_dot_entries: bool,
    /// Identifiers are UCS-2 when non-zero
    pub joliet_level: u8,
    /// Prefer Rock Ridge `NM` names
    pub rock_ridge: bool,
}

impl ListOptions {
    /// Options matching a mounted volume
    pub fn for_volume(volume: &VolumeInfo, options: &MountOptions) -> Self {
        Self {
            endian: options.endian,
            include_dot_entries: options.include_dot_entries,
            joliet_level: volume.joliet_level,
            rock_ridge: volume.has_rock_ridge && volume.joliet_level == 0,
        }
    }
}

/// Raw records of a directory buffer with their byte offsets
pub struct Records<'a> {
    buf: &'a [u8],
    offset: usize,
    policy: EndianPolicy,
}

impl<'a> Records<'a> {
    /// Iterate over `buf`, which starts on a sector boundary
    pub fn new(buf: &'a [u8], policy: EndianPolicy) -> Self {
        Self { buf, offset: 0, policy }
    }

    /// Offset just past the last record yielded
    pub fn offset(&self) -> usize {
        self.offset
    }
}

impl<'a> Iterator for Records<'a> {
    type Item = core::result::Result<(usize, DirectoryRecord), FormatError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let len = *self.buf.get(self.offset)? as usize;
            if len == 0 {
                // Skip padding to next sector
                self.offset = (self.offset / SECTOR_SIZE + 1) * SECTOR_SIZE;
                continue;
            }

            let start = self.offset;
            let sector_end = ((start / SECTOR_SIZE + 1) * SECTOR_SIZE).min(self.buf.len());
            if start + len > sector_end {
                self.offset = self.buf.len();
                return Some(Err(FormatError::TruncatedRecord));
            }

            return match DirectoryRecord::parse(&self.buf[start..start + len], self.policy) {
                Ok(record) => {
                    self.offset = start + len;
                    Some(Ok((start, record)))
                }
                Err(e) => {
                    self.offset = self.buf.len();
                    Some(Err(e))
                }
            };
        }
    }
}

/// On-disk identifier as text
fn raw_name(record: &DirectoryRecord, joliet_level: u8) -> String {
    if record.is_self() {
        String::from(".")
    } else if record.is_parent() {
        String::from("..")
    } else if joliet_level > 0 {
        string::decode_ucs2_be(&record.name)
    } else {
        String::from_utf8_lossy(&record.name).into_owned()
    }
}

/// Decode one record into an entry covering only its own extent
pub fn stat_from_record(record: &DirectoryRecord, opts: &ListOptions) -> Stat {
    let raw_name = raw_name(record, opts.joliet_level);
    let name = if record.is_self() || record.is_parent() {
        raw_name.clone()
    } else {
        match opts.rock_ridge.then(|| rock_ridge::alternate_name(&record.system_use)).flatten() {
            Some(nm) => nm.name,
            None => string::translate_name(&raw_name, opts.joliet_level),
        }
    };

    let timestamp = match record.recording_time() {
        Ok(t) => t,
        Err(e) => {
            tracing::warn!(name = %raw_name, error = %e, "recording time ignored");
            None
        }
    };

    Stat {
        kind: if record.is_directory() {
            FileKind::Directory
        } else {
            FileKind::File
        },
        name,
        raw_name,
        lsn: record.extent,
        size: record.size as u64,
        sector_count: record.sector_count(),
        extents: alloc::vec![Extent::new(record.extent, record.size)],
        flags: record.flags,
        xa: XaAttributes::parse(&record.system_use),
        timestamp,
        volume_sequence_number: record.volume_sequence_number,
    }
}

/// Decode every entry of a directory buffer
///
/// Multi-extent records are merged with the records that follow them under
/// the same identifier; a chain that is interrupted or never closed is
/// [`FormatError::MultiExtentMismatch`].
pub fn parse_directory(buf: &[u8], opts: &ListOptions) -> Result<Vec<Stat>> {
    let mut entries = Vec::new();
    let mut open: Option<Stat> = None;

    for item in Records::new(buf, opts.endian) {
        let (_, record) = item?;
        let dot = record.is_self() || record.is_parent();
        if dot && open.is_some() {
            return Err(FormatError::MultiExtentMismatch.into());
        }
        if dot && !opts.include_dot_entries {
            continue;
        }

        let stat = stat_from_record(&record, opts);
        let mut current = match open.take() {
            Some(mut head) => {
                if head.raw_name != stat.raw_name || head.kind != stat.kind {
                    return Err(FormatError::MultiExtentMismatch.into());
                }
                head.size += stat.size;
                head.extents.extend_from_slice(&stat.extents);
                head.sector_count = head.extents.iter().map(Extent::sector_count).sum();
                head.flags = stat.flags;
                head
            }
            None => stat,
        };

        if record.flags.is_multi_extent() {
            current.flags = record.flags;
            open = Some(current);
        } else {
            entries.push(current);
        }
    }

    if open.is_some() {
        return Err(FormatError::MultiExtentMismatch.into());
    }
    Ok(entries)
}

/// Read a directory extent and decode its entries
pub fn read_dir_entries<B: BlockIo>(
    source: &mut SectorSource<B>,
    lsn: u32,
    size: u32,
    opts: &ListOptions,
) -> Result<Vec<Stat>> {
    let buf = source.read_sectors(lsn, sectors_for_bytes(size as u64))?;
    let entries = parse_directory(&buf[..size as usize], opts)?;
    tracing::trace!(lsn, size, count = entries.len(), "directory read");
    Ok(entries)
}
