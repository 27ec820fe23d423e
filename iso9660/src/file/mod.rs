//! File reading and extent management

pub mod reader;
pub mod metadata;
pub mod extent;

use alloc::vec;
use alloc::vec::Vec;
use gpt_disk_io::BlockIo;

use crate::error::{FormatError, Result};
use crate::source::SectorSource;
use crate::types::Stat;
use reader::FileReader;

/// Read file contents
///
/// # Arguments
/// * `source` - Sector source
/// * `file` - File entry to read
/// * `buffer` - Buffer to read into, at least `file.size` bytes
///
/// # Returns
/// Number of bytes read
pub fn read_file<B: BlockIo>(
    source: &mut SectorSource<B>,
    file: &Stat,
    buffer: &mut [u8],
) -> Result<usize> {
    let file_size = usize::try_from(file.size).map_err(|_| FormatError::TruncatedRecord)?;
    let Some(dst) = buffer.get_mut(..file_size) else {
        return Err(FormatError::FieldOverflow { len: file_size, max: buffer.len() }.into());
    };

    let read = FileReader::new(source, file).read(dst)?;
    if read != file_size {
        return Err(FormatError::TruncatedRecord.into());
    }
    Ok(read)
}

/// Read file into new Vec
pub fn read_file_vec<B: BlockIo>(source: &mut SectorSource<B>, file: &Stat) -> Result<Vec<u8>> {
    let len = usize::try_from(file.size).map_err(|_| FormatError::TruncatedRecord)?;
    if file.size > source.byte_len()? {
        return Err(FormatError::TruncatedRecord.into());
    }
    let mut buffer = vec![0u8; len];
    read_file(source, file, &mut buffer)?;
    Ok(buffer)
}
