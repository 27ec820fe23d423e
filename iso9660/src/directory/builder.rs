//! Directory extent authoring
//!
//! Appends records to an in-memory directory extent. A record that would
//! cross a sector boundary is moved to the start of the next sector, the
//! gap left as zero padding.

use crate::directory::flags::FileFlags;
use crate::directory::record::{DirectoryRecord, PARENT_ID, SELF_ID};
use crate::error::{FormatError, Result};
use crate::utils::sector::{align_to_sector, remaining_in_sector};

/// Offset just past the last record in `dir`
fn end_of_records(dir: &[u8]) -> Result<usize> {
    let mut offset = 0;
    let mut last_end = 0;
    while offset < dir.len() {
        match dir[offset] as usize {
            0 => offset += 1,
            len => {
                offset += len;
                last_end = offset;
            }
        }
    }
    if offset > dir.len() {
        return Err(FormatError::TruncatedRecord.into());
    }
    Ok(last_end)
}

/// Append an encoded record, returning the offset it was written at
pub fn add_record(dir: &mut [u8], record: &DirectoryRecord) -> Result<usize> {
    let bytes = record.encode()?;
    let mut offset = end_of_records(dir)?;
    if remaining_in_sector(offset) < bytes.len() {
        offset = align_to_sector(offset);
    }
    if offset + bytes.len() > dir.len() {
        return Err(FormatError::DirectoryFull.into());
    }
    dir[offset..offset + bytes.len()].copy_from_slice(&bytes);
    tracing::trace!(offset, len = bytes.len(), "directory record added");
    Ok(offset)
}

/// Append a directory record for `name`
///
/// `dir` is the whole directory extent. The record size is
/// [`record_size`](super::record::record_size) of the name and system use
/// lengths. Returns the byte offset of the new record.
pub fn add_directory_entry(
    dir: &mut [u8],
    name: &[u8],
    extent: u32,
    size: u32,
    flags: FileFlags,
    system_use: &[u8],
) -> Result<usize> {
    if name.is_empty() {
        return Err(FormatError::InvalidName.into());
    }
    let mut record = DirectoryRecord::new(name, extent, size, flags);
    record.system_use = system_use.to_vec();
    add_record(dir, &record)
}

/// Reset `dir` and write its `.` and `..` records
pub fn init_directory(
    dir: &mut [u8],
    self_extent: u32,
    self_size: u32,
    parent_extent: u32,
    parent_size: u32,
) -> Result<()> {
    dir.fill(0);
    add_directory_entry(dir, &[SELF_ID], self_extent, self_size, FileFlags::DIRECTORY, &[])?;
    add_directory_entry(dir, &[PARENT_ID], parent_extent, parent_size, FileFlags::DIRECTORY, &[])?;
    Ok(())
}
