//! File metadata extraction

use crate::types::{FileKind, Stat};

impl Stat {
    /// Get file name as string
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get file extension
    pub fn extension(&self) -> Option<&str> {
        self.name.rsplit_once('.').map(|(_, ext)| ext)
    }

    /// Is this a regular file?
    pub fn is_file(&self) -> bool {
        self.kind == FileKind::File
    }

    /// Is this a directory?
    pub fn is_directory(&self) -> bool {
        self.kind == FileKind::Directory
    }

    /// Is this hidden?
    pub fn is_hidden(&self) -> bool {
        self.flags.contains(crate::types::FileFlags::HIDDEN)
    }

    /// Stored in more than one extent
    pub fn is_multi_extent(&self) -> bool {
        self.extents.len() > 1
    }

    /// Does any extent of this entry cover `lsn`?
    pub fn contains_lsn(&self, lsn: u32) -> bool {
        self.extents.iter().any(|e| e.contains(lsn))
    }
}
