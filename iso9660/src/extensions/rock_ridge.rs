//! Rock Ridge extension support
//!
//! Rock Ridge adds POSIX filesystem semantics through SUSP entries in the
//! system use area. Only presence detection and `NM` alternate names are
//! decoded here; entries stored in continuation areas (`CE`) are not
//! followed.

use alloc::string::String;
use alloc::vec::Vec;

use crate::extensions::xa::{XaAttributes, XA_RECORD_LEN};

/// System Use Entry header length: signature, length, version
pub const ENTRY_HEADER_LEN: usize = 4;

/// One SUSP entry borrowed from a system use area
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SystemUseEntry<'a> {
    /// Signature (2 bytes, e.g. "PX", "PN", "SL")
    pub signature: [u8; 2],

    /// Version
    pub version: u8,

    /// Entry-specific data after the header
    pub data: &'a [u8],
}

/// Iterator over the SUSP entries of one system use area
pub struct SystemUseEntries<'a> {
    area: &'a [u8],
    offset: usize,
}

impl<'a> SystemUseEntries<'a> {
    /// Start after an XA record if one leads the area
    pub fn new(system_use: &'a [u8]) -> Self {
        let offset = if XaAttributes::parse(system_use).is_some() {
            XA_RECORD_LEN
        } else {
            0
        };
        Self {
            area: system_use,
            offset,
        }
    }
}

impl<'a> Iterator for SystemUseEntries<'a> {
    type Item = SystemUseEntry<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let header = self.area.get(self.offset..self.offset + ENTRY_HEADER_LEN)?;
        let len = header[2] as usize;
        if len < ENTRY_HEADER_LEN {
            return None;
        }
        let entry = self.area.get(self.offset..self.offset + len)?;
        let signature = [entry[0], entry[1]];
        if &signature == signatures::TERMINATOR {
            return None;
        }
        self.offset += len;
        Some(SystemUseEntry {
            signature,
            version: entry[3],
            data: &entry[ENTRY_HEADER_LEN..],
        })
    }
}

/// Alternate name (NM entry)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlternateName {
    /// Flags of the last component
    pub flags: u8,

    /// Name content
    pub name: String,
}

/// NM flag: name continues in the next NM entry
pub const NM_CONTINUE: u8 = 0x01;
/// NM flag: refers to the current directory
pub const NM_CURRENT: u8 = 0x02;
/// NM flag: refers to the parent directory
pub const NM_PARENT: u8 = 0x04;

/// Signature constants
pub mod signatures {
    /// SUSP indicator
    pub const SUSP_INDICATOR: &[u8; 2] = b"SP";
    /// SUSP terminator
    pub const TERMINATOR: &[u8; 2] = b"ST";
    /// Continuation area
    pub const CONTINUATION: &[u8; 2] = b"CE";
    /// Extensions reference
    pub const EXTENSIONS_REFERENCE: &[u8; 2] = b"ER";
    /// Rock Ridge indicator (RRIP 1.09)
    pub const ROCK_RIDGE: &[u8; 2] = b"RR";
    /// POSIX file attributes signature
    pub const POSIX_ATTRS: &[u8; 2] = b"PX";
    /// POSIX device number signature
    pub const POSIX_DEV: &[u8; 2] = b"PN";
    /// Symbolic link signature
    pub const SYMLINK: &[u8; 2] = b"SL";
    /// Alternate name signature
    pub const ALTERNATE_NAME: &[u8; 2] = b"NM";
    /// Child link signature
    pub const CHILD_LINK: &[u8; 2] = b"CL";
    /// Parent link signature
    pub const PARENT_LINK: &[u8; 2] = b"PL";
    /// Relocated directory signature
    pub const RELOCATED_DIR: &[u8; 2] = b"RE";
    /// Timestamps signature
    pub const TIMESTAMPS: &[u8; 2] = b"TF";
}

const ROCK_RIDGE_SIGNATURES: [&[u8; 2]; 10] = [
    signatures::ROCK_RIDGE,
    signatures::POSIX_ATTRS,
    signatures::POSIX_DEV,
    signatures::SYMLINK,
    signatures::ALTERNATE_NAME,
    signatures::CHILD_LINK,
    signatures::PARENT_LINK,
    signatures::RELOCATED_DIR,
    signatures::TIMESTAMPS,
    signatures::EXTENSIONS_REFERENCE,
];

/// Does this system use area carry Rock Ridge entries?
pub fn has_rock_ridge(system_use: &[u8]) -> bool {
    SystemUseEntries::new(system_use).any(|e| ROCK_RIDGE_SIGNATURES.contains(&&e.signature))
}

/// Collect the `NM` alternate name, joining continued components
pub fn alternate_name(system_use: &[u8]) -> Option<AlternateName> {
    let mut name: Vec<u8> = Vec::new();
    let mut flags = 0;
    let mut found = false;
    for entry in SystemUseEntries::new(system_use) {
        if &entry.signature != signatures::ALTERNATE_NAME {
            continue;
        }
        let (&entry_flags, content) = entry.data.split_first()?;
        found = true;
        flags = entry_flags;
        name.extend_from_slice(content);
        if entry_flags & NM_CONTINUE == 0 {
            break;
        }
    }
    if !found || flags & (NM_CURRENT | NM_PARENT) != 0 {
        return None;
    }
    Some(AlternateName {
        flags,
        name: String::from_utf8_lossy(&name).into_owned(),
    })
}
