//! File reader implementation

use crate::error::Result;
use crate::source::SectorSource;
use crate::types::{Stat, SECTOR_SIZE};
use gpt_disk_io::BlockIo;

/// Sequential reader over every extent of a file
pub struct FileReader<'a, B: BlockIo> {
    source: &'a mut SectorSource<B>,
    file: &'a Stat,
    position: u64,
    sector: [u8; SECTOR_SIZE],
    cached_lsn: Option<u32>,
}

impl<'a, B: BlockIo> FileReader<'a, B> {
    /// Create new file reader
    pub fn new(source: &'a mut SectorSource<B>, file: &'a Stat) -> Self {
        Self {
            source,
            file,
            position: 0,
            sector: [0u8; SECTOR_SIZE],
            cached_lsn: None,
        }
    }

    /// Read bytes from current position, returning 0 at end of file
    pub fn read(&mut self, buffer: &mut [u8]) -> Result<usize> {
        let mut written = 0;
        while written < buffer.len() {
            let Some((lsn, in_sector, available)) = self.locate(self.position) else {
                break;
            };
            if self.cached_lsn != Some(lsn) {
                self.source.read_sector(lsn, &mut self.sector)?;
                self.cached_lsn = Some(lsn);
            }
            let n = available.min(buffer.len() - written);
            buffer[written..written + n].copy_from_slice(&self.sector[in_sector..in_sector + n]);
            written += n;
            self.position += n as u64;
        }
        Ok(written)
    }

    /// Map a file offset to (lsn, offset in sector, bytes readable there)
    fn locate(&self, pos: u64) -> Option<(u32, usize, usize)> {
        let mut base = 0u64;
        for extent in &self.file.extents {
            let size = extent.size as u64;
            if pos < base + size {
                let rel = pos - base;
                let lsn = extent.lsn + (rel / SECTOR_SIZE as u64) as u32;
                let in_sector = (rel % SECTOR_SIZE as u64) as usize;
                let available = (SECTOR_SIZE - in_sector).min((size - rel) as usize);
                return Some((lsn, in_sector, available));
            }
            base += size;
        }
        None
    }

    /// Seek to position
    pub fn seek(&mut self, pos: u64) {
        self.position = pos;
    }

    /// Get current position
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Get file size
    pub fn size(&self) -> u64 {
        self.file.size
    }
}
