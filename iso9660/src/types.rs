//! Common types and constants for ISO9660

use alloc::string::String;
use alloc::vec::Vec;
use bitflags::bitflags;
use chrono::{DateTime, FixedOffset};

use crate::directory::record::DirectoryRecord;
use crate::extensions::xa::XaAttributes;
use crate::file::extent::Extent;
use crate::volume::primary::VolumeDescriptor;

pub use crate::directory::flags::FileFlags;

/// ISO9660 sector size (always 2048 bytes)
pub const SECTOR_SIZE: usize = 2048;

/// Volume descriptor set starts at sector 16
pub const VOLUME_DESCRIPTOR_START: u32 = 16;

/// Maximum path length
pub const MAX_PATH_LENGTH: usize = 255;

/// Bytes reserved at the end of a path for a `;NNNNN` version suffix
pub const VERSION_SUFFIX_RESERVE: usize = 6;

/// Raw CD frame: sync, header, user data, EDC/ECC
pub const CD_FRAMESIZE_RAW: u32 = 2352;

/// Mode 2 frame without the 12 sync and 4 header bytes
pub const M2RAW_SECTOR_SIZE: u32 = 2336;

/// Sync pattern plus sector header preceding Mode 1 user data
pub const CD_SYNC_HEADER_SIZE: u64 = 16;

/// Volume descriptor type codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum VolumeDescriptorType {
    /// Boot Record (El Torito)
    BootRecord = 0,
    /// Primary Volume Descriptor
    Primary = 1,
    /// Supplementary Volume Descriptor (Joliet)
    Supplementary = 2,
    /// Volume Partition Descriptor
    Partition = 3,
    /// Volume Descriptor Set Terminator
    Terminator = 255,
}

impl VolumeDescriptorType {
    /// Map a raw type byte, `None` for codes ECMA-119 does not define
    pub fn from_u8(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::BootRecord),
            1 => Some(Self::Primary),
            2 => Some(Self::Supplementary),
            3 => Some(Self::Partition),
            255 => Some(Self::Terminator),
            _ => None,
        }
    }
}

bitflags! {
    /// Extensions the caller is willing to honour while reading a volume
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ExtensionMask: u8 {
        /// Joliet level 1 (escape sequence `%/@`)
        const JOLIET_LEVEL1 = 0x01;
        /// Joliet level 2 (escape sequence `%/C`)
        const JOLIET_LEVEL2 = 0x02;
        /// Joliet level 3 (escape sequence `%/E`)
        const JOLIET_LEVEL3 = 0x04;
        /// Rock Ridge names
        const ROCK_RIDGE = 0x08;
        /// High Sierra (recognised, not decoded)
        const HIGH_SIERRA = 0x10;

        /// Any Joliet level
        const JOLIET = Self::JOLIET_LEVEL1.bits()
            | Self::JOLIET_LEVEL2.bits()
            | Self::JOLIET_LEVEL3.bits();
        /// Everything
        const ALL = Self::JOLIET.bits() | Self::ROCK_RIDGE.bits() | Self::HIGH_SIERRA.bits();
    }
}

/// How to treat a both-endian field whose halves disagree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EndianPolicy {
    /// Report [`FormatError::EndianMismatch`](crate::FormatError::EndianMismatch)
    #[default]
    Strict,
    /// Trust the little-endian half and log a warning
    Lenient,
}

/// How a framing found by the fuzzy scan is confirmed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FuzzyValidation {
    /// Walk the whole descriptor set up to its terminator
    #[default]
    FullScan,
    /// Accept a decodable Primary Volume Descriptor alone
    SignatureOnly,
}

/// Options applied to a mounted volume
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MountOptions {
    /// Extensions to honour
    pub extensions: ExtensionMask,
    /// Both-endian mismatch handling
    pub endian: EndianPolicy,
    /// Fuzzy scan confirmation
    pub fuzzy_validation: FuzzyValidation,
    /// Surface `.` and `..` in directory listings
    pub include_dot_entries: bool,
}

impl Default for MountOptions {
    fn default() -> Self {
        Self {
            extensions: ExtensionMask::JOLIET | ExtensionMask::ROCK_RIDGE,
            endian: EndianPolicy::Strict,
            fuzzy_validation: FuzzyValidation::FullScan,
            include_dot_entries: false,
        }
    }
}

impl MountOptions {
    /// Replace the extension mask
    pub fn with_extensions(mut self, extensions: ExtensionMask) -> Self {
        self.extensions = extensions;
        self
    }

    /// Replace the endian policy
    pub fn with_endian(mut self, endian: EndianPolicy) -> Self {
        self.endian = endian;
        self
    }

    /// Replace the fuzzy validation mode
    pub fn with_fuzzy_validation(mut self, validation: FuzzyValidation) -> Self {
        self.fuzzy_validation = validation;
        self
    }

    /// Show or hide `.` and `..`
    pub fn with_dot_entries(mut self, include: bool) -> Self {
        self.include_dot_entries = include;
        self
    }
}

/// Parsed volume information
#[derive(Debug, Clone)]
pub struct VolumeInfo {
    /// Primary Volume Descriptor
    pub pvd: VolumeDescriptor,

    /// Joliet Supplementary Volume Descriptor, if one was selected
    pub svd: Option<VolumeDescriptor>,

    /// Joliet level of `svd` (0 when absent)
    pub joliet_level: u8,

    /// Rock Ridge entries found on the root directory
    pub has_rock_ridge: bool,
}

impl VolumeInfo {
    /// Descriptor whose directory tree is walked (Joliet wins when present)
    pub fn active(&self) -> &VolumeDescriptor {
        self.svd.as_ref().unwrap_or(&self.pvd)
    }

    /// Root directory record of the walked tree
    pub fn root(&self) -> &DirectoryRecord {
        &self.active().root
    }

    /// Root directory extent location (LSN)
    pub fn root_lsn(&self) -> u32 {
        self.root().extent
    }

    /// Root directory extent length (bytes)
    pub fn root_size(&self) -> u32 {
        self.root().size
    }

    /// Volume space size (total sectors)
    pub fn volume_space_size(&self) -> u32 {
        self.pvd.volume_space_size
    }

    /// Logical block size (usually 2048)
    pub fn logical_block_size(&self) -> u16 {
        self.pvd.logical_block_size
    }

    /// Volume identifier, from the Joliet descriptor when it has one
    pub fn volume_id(&self) -> String {
        let id = self.active().volume_id();
        if id.is_empty() {
            self.pvd.volume_id()
        } else {
            id
        }
    }
}

/// Entry type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    /// Regular file
    File,
    /// Directory
    Directory,
}

/// File entry metadata
///
/// Owned independently of the record it was decoded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stat {
    /// File or directory
    pub kind: FileKind,

    /// Display name
    pub name: String,

    /// On-disk identifier (e.g. `README.TXT;1`)
    pub raw_name: String,

    /// First extent location (LSN)
    pub lsn: u32,

    /// Total size in bytes over all extents
    pub size: u64,

    /// Total sectors over all extents
    pub sector_count: u32,

    /// Extents in on-disk order
    pub extents: Vec<Extent>,

    /// Flags of the final record
    pub flags: FileFlags,

    /// CD-ROM XA attributes
    pub xa: Option<XaAttributes>,

    /// Recording time
    pub timestamp: Option<DateTime<FixedOffset>>,

    /// Volume sequence number
    pub volume_sequence_number: u16,
}
