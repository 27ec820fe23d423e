//! File extent management
//!
//! Extents represent contiguous data regions on disk. A multi-extent file
//! is an ordered list of them.

use crate::utils::sector::sectors_for_bytes;

/// File extent (contiguous data region)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Extent {
    /// Starting LSN
    pub lsn: u32,

    /// Length in bytes
    pub size: u32,
}

impl Extent {
    /// Create new extent
    pub fn new(lsn: u32, size: u32) -> Self {
        Self { lsn, size }
    }

    /// Number of sectors (2048 bytes each)
    pub fn sector_count(&self) -> u32 {
        sectors_for_bytes(self.size as u64)
    }

    /// End LSN (exclusive)
    pub fn end_lsn(&self) -> u64 {
        self.lsn as u64 + self.sector_count() as u64
    }

    /// Does this extent cover `lsn`?
    pub fn contains(&self, lsn: u32) -> bool {
        lsn >= self.lsn && (lsn as u64) < self.end_lsn()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extent_range() {
        let e = Extent::new(100, 4097);
        assert_eq!(e.sector_count(), 3);
        assert!(e.contains(100) && e.contains(102));
        assert!(!e.contains(99) && !e.contains(103));
        assert!(!Extent::new(5, 0).contains(5));
    }
}
