//! Error types for ISO9660 operations

use alloc::string::String;
use thiserror::Error;

/// Result type for ISO9660 operations
pub type Result<T> = core::result::Result<T, Iso9660Error>;

/// Malformed or inconsistent on-disk data.
///
/// Every decoder in the crate reports untrusted input through this type
/// instead of panicking. Images are frequently hand-crafted or damaged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FormatError {
    /// Volume descriptor identifier is not "CD001"
    #[error("invalid volume descriptor signature")]
    BadSignature,

    /// Volume descriptor version is not 1
    #[error("unsupported volume descriptor version {0}")]
    UnsupportedVersion(u8),

    /// The little- and big-endian halves of a both-byte-order field differ
    #[error("both-endian field disagrees (le={le:#x}, be={be:#x})")]
    EndianMismatch {
        /// Value decoded from the little-endian half
        le: u32,
        /// Value decoded from the big-endian half
        be: u32,
    },

    /// Descriptor type not defined by ECMA-119 or not valid at this position
    #[error("unexpected volume descriptor type {0}")]
    UnexpectedDescriptorType(u8),

    /// Fuzzy scan exhausted every candidate framing
    #[error("no ISO9660 superblock found")]
    SuperblockNotFound,

    /// Descriptor set does not end with a terminator
    #[error("volume descriptor set terminator missing")]
    MissingTerminator,

    /// Record shorter than its header claims or running past its buffer
    #[error("truncated or overlong record")]
    TruncatedRecord,

    /// Identifier contains characters outside the permitted set
    #[error("invalid name")]
    InvalidName,

    /// Value does not fit a fixed-width on-disk field
    #[error("field overflow: {len} bytes into a {max} byte field")]
    FieldOverflow {
        /// Length of the value
        len: usize,
        /// Width of the field
        max: usize,
    },

    /// Path exceeds the maximum length
    #[error("path exceeds maximum length")]
    PathTooLong,

    /// Path table entry would break parent ordering
    #[error("path table parent ordering violated")]
    RecordOrderingViolation,

    /// Date/time field is neither unset nor a valid calendar time
    #[error("invalid timestamp")]
    InvalidTimestamp,

    /// Multi-extent chain interrupted or left open
    #[error("multi-extent chain broken")]
    MultiExtentMismatch,

    /// No room left in the directory extent for another record
    #[error("directory extent full")]
    DirectoryFull,
}

/// Errors that can occur during ISO9660 operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Iso9660Error {
    /// On-disk structure is malformed
    #[error(transparent)]
    Format(#[from] FormatError),

    /// Block source failed; carries the source's own message
    #[error("I/O error at block {lba}: {message}")]
    Io {
        /// First device block of the failed read
        lba: u64,
        /// Source error, rendered
        message: String,
    },

    /// File or directory not found
    #[error("file or directory not found")]
    NotFound,

    /// Intermediate path component is not a directory
    #[error("not a directory")]
    NotADirectory,
}

impl Iso9660Error {
    /// Format error carried by this error, if any
    pub fn format(&self) -> Option<FormatError> {
        match self {
            Self::Format(e) => Some(*e),
            _ => None,
        }
    }
}
