//! File flags parsing and manipulation

use bitflags::bitflags;

bitflags! {
    /// File flags from directory record (ECMA-119 9.1.6)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct FileFlags: u8 {
        /// Hidden file ("existence" bit)
        const HIDDEN = 0x01;
        /// Directory (not a file)
        const DIRECTORY = 0x02;
        /// Associated file
        const ASSOCIATED = 0x04;
        /// Extended attribute record format
        const RECORD = 0x08;
        /// Owner/group permissions in extended attributes
        const PROTECTION = 0x10;
        /// Not final directory record for this file
        const MULTIEXTENT = 0x80;
    }
}

impl FileFlags {
    /// Parse from raw byte, keeping reserved bits
    pub fn from_byte(byte: u8) -> Self {
        Self::from_bits_retain(byte)
    }

    /// Convert to raw byte
    pub fn to_byte(self) -> u8 {
        self.bits()
    }

    /// Is this a directory?
    pub fn is_directory(self) -> bool {
        self.contains(Self::DIRECTORY)
    }

    /// More records follow for the same file
    pub fn is_multi_extent(self) -> bool {
        self.contains(Self::MULTIEXTENT)
    }
}
