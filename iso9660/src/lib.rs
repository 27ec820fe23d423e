//! ISO9660 Filesystem Implementation
//!
//! A `no_std` codec for ISO9660 volumes: volume descriptors, directory
//! records, path tables and file extents, in both directions.
//!
//! # Overview
//!
//! ISO9660 is the standard filesystem for CD-ROMs and DVDs. This crate provides:
//! - Volume descriptor parsing and encoding (Primary, Supplementary, Terminator)
//! - Framing discovery for raw 2352/2336 byte images and prefixed dumps
//! - Directory tree navigation with multi-extent files
//! - Path table reading and authoring
//! - Joliet (UCS-2) names, Rock Ridge `NM` names and CD-ROM XA attributes
//!
//! # Architecture
//!
//! The implementation is layered:
//! 1. **Source layer** - Maps logical sectors onto a [`BlockIo`](gpt_disk_io::BlockIo) device
//! 2. **Volume layer** - Parses volume descriptors from sectors 16+
//! 3. **Directory layer** - Navigates directory records and path tables
//! 4. **File layer** - Reads file data from extents
//!
//! [`Filesystem`] ties them together. Diagnostics go through `tracing`;
//! install a subscriber to see them.
//!
//! # Usage
//!
//! ```ignore
//! use iso9660::{Filesystem, MountOptions};
//!
//! let mut fs = Filesystem::mount(block_io, MountOptions::default())?;
//!
//! // Find a file by path
//! let file = fs.stat("/isolinux/vmlinuz", true)?;
//!
//! // Read file contents
//! let kernel_data = fs.read_file(&file)?;
//! ```
//!
//! Raw BIN images are opened with [`Filesystem::open_fuzzy`], which finds
//! the frame size and data offset before reading the descriptors.

#![no_std]
#![warn(missing_docs)]

extern crate alloc;

pub mod directory;
pub mod error;
pub mod extensions;
pub mod file;
pub mod fs;
pub mod source;
pub mod types;
pub mod utils;
pub mod volume;

pub use error::{FormatError, Iso9660Error, Result};
pub use fs::Filesystem;
pub use source::{Framing, SectorSource};
pub use types::{
    EndianPolicy, ExtensionMask, FileFlags, FileKind, FuzzyValidation, MountOptions, Stat,
    VolumeInfo,
};

pub use directory::builder::{add_directory_entry, init_directory};
pub use directory::iterator::{parse_directory, ListOptions};
pub use directory::path_table::{read_path_table, PathTable, PathTableEntry, PathTableKind};
pub use directory::record::{record_size, DirectoryRecord};
pub use volume::primary::VolumeDescriptor;
pub use volume::{encode_terminator, read_superblock, read_superblock_fuzzy};
