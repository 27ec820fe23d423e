//! Logical sector access over a block device
//!
//! The filesystem addresses 2048-byte logical sectors. The device behind
//! it may use any physical block size and may wrap each logical sector in
//! a larger raw frame (2352 or 2336 bytes), carry a byte prefix in front
//! of the ISO payload, or have lost its leading bytes. [`Framing`]
//! captures that mapping and [`SectorSource`] applies it.

use alloc::string::ToString;
use alloc::vec;
use alloc::vec::Vec;
use gpt_disk_io::BlockIo;
use gpt_disk_types::Lba;

use crate::error::{Iso9660Error, Result};
use crate::types::SECTOR_SIZE;

/// Placement of logical sectors inside the byte stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Framing {
    /// Bytes per frame on the source
    pub frame_size: u32,

    /// Offset of logical sector 0's user data; negative when the source
    /// starts after sector 0
    pub data_start: i64,
}

impl Framing {
    /// Plain 2048-byte sectors starting at byte 0
    pub const STANDARD: Self = Self {
        frame_size: SECTOR_SIZE as u32,
        data_start: 0,
    };

    /// Byte offset of the user data of `lsn`, `None` when it lies before
    /// the start of the source
    pub fn byte_offset(&self, lsn: u32) -> Option<u64> {
        let offset = i64::from(lsn) * i64::from(self.frame_size) + self.data_start;
        u64::try_from(offset).ok()
    }

    /// Logical sectors are laid out back to back
    pub fn is_contiguous(&self) -> bool {
        self.frame_size as usize == SECTOR_SIZE
    }
}

impl Default for Framing {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// Block device plus the framing used to find logical sectors on it
pub struct SectorSource<B: BlockIo> {
    block_io: B,
    framing: Framing,
    len: Option<u64>,
}

impl<B: BlockIo> SectorSource<B> {
    /// Wrap a device using standard framing
    pub fn new(block_io: B) -> Self {
        Self::with_framing(block_io, Framing::STANDARD)
    }

    /// Wrap a device using the given framing
    pub fn with_framing(block_io: B, framing: Framing) -> Self {
        Self {
            block_io,
            framing,
            len: None,
        }
    }

    /// Current framing
    pub fn framing(&self) -> Framing {
        self.framing
    }

    /// Replace the framing
    pub fn set_framing(&mut self, framing: Framing) {
        self.framing = framing;
    }

    /// Borrow the device
    pub fn get_ref(&self) -> &B {
        &self.block_io
    }

    /// Release the device
    pub fn into_inner(self) -> B {
        self.block_io
    }

    /// Device size in its own blocks
    pub fn size_in_blocks(&mut self) -> Result<u64> {
        self.block_io.num_blocks().map_err(|e| Iso9660Error::Io {
            lba: 0,
            message: e.to_string(),
        })
    }

    /// Device size in bytes
    pub fn byte_len(&mut self) -> Result<u64> {
        if let Some(len) = self.len {
            return Ok(len);
        }
        let len = self.size_in_blocks()? * self.block_io.block_size().to_u64();
        self.len = Some(len);
        Ok(len)
    }

    /// Read `dst.len()` bytes starting at an arbitrary byte offset
    pub fn read_bytes(&mut self, offset: u64, dst: &mut [u8]) -> Result<()> {
        if dst.is_empty() {
            return Ok(());
        }
        let bs = self.block_io.block_size().to_u64();
        let end = offset + dst.len() as u64;
        let first = offset / bs;
        if end > self.byte_len()? {
            return Err(Iso9660Error::Io {
                lba: first,
                message: "read past end of source".to_string(),
            });
        }

        let io_err = |e: B::Error| Iso9660Error::Io {
            lba: first,
            message: e.to_string(),
        };
        if offset % bs == 0 && dst.len() as u64 % bs == 0 {
            return self.block_io.read_blocks(Lba(first), dst).map_err(io_err);
        }

        let blocks = end.div_ceil(bs) - first;
        let mut tmp = vec![0u8; (blocks * bs) as usize];
        self.block_io.read_blocks(Lba(first), &mut tmp).map_err(io_err)?;
        let skip = (offset - first * bs) as usize;
        dst.copy_from_slice(&tmp[skip..skip + dst.len()]);
        Ok(())
    }

    fn sector_offset(&self, lsn: u32) -> Result<u64> {
        self.framing.byte_offset(lsn).ok_or_else(|| Iso9660Error::Io {
            lba: lsn as u64,
            message: "sector lies before start of source".to_string(),
        })
    }

    /// Read one logical sector
    pub fn read_sector(&mut self, lsn: u32, dst: &mut [u8; SECTOR_SIZE]) -> Result<()> {
        let offset = self.sector_offset(lsn)?;
        self.read_bytes(offset, dst)
    }

    /// Read `count` consecutive logical sectors
    pub fn read_sectors(&mut self, lsn: u32, count: u32) -> Result<Vec<u8>> {
        let total = count as usize * SECTOR_SIZE;
        if self.sector_offset(lsn)? + total as u64 > self.byte_len()? {
            return Err(Iso9660Error::Io {
                lba: lsn as u64,
                message: "extent runs past end of source".to_string(),
            });
        }

        let mut buf = vec![0u8; total];
        if self.framing.is_contiguous() {
            let offset = self.sector_offset(lsn)?;
            self.read_bytes(offset, &mut buf)?;
        } else {
            for (i, chunk) in buf.chunks_exact_mut(SECTOR_SIZE).enumerate() {
                let offset = self.sector_offset(lsn + i as u32)?;
                self.read_bytes(offset, chunk)?;
            }
        }
        Ok(buf)
    }
}
