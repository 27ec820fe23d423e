//! Path table encoding and decoding
//!
//! A path table lists every directory with its extent and the 1-based
//! index of its parent. Entries are ordered by parent index, so a parent
//! always precedes its children. The volume stores the same list twice,
//! little-endian (type L) and big-endian (type M).

use alloc::borrow::Cow;
use alloc::vec::Vec;

use crate::error::{FormatError, Result};
use crate::utils::sector::pad_even;

/// Fixed bytes before the directory identifier
pub const ENTRY_HEADER_LEN: usize = 8;

/// Byte order of a stored table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathTableKind {
    /// Little-endian (type L)
    L,
    /// Big-endian (type M)
    M,
}

impl PathTableKind {
    fn read_u16(self, b: [u8; 2]) -> u16 {
        match self {
            Self::L => u16::from_le_bytes(b),
            Self::M => u16::from_be_bytes(b),
        }
    }

    fn read_u32(self, b: [u8; 4]) -> u32 {
        match self {
            Self::L => u32::from_le_bytes(b),
            Self::M => u32::from_be_bytes(b),
        }
    }

    fn u16_bytes(self, v: u16) -> [u8; 2] {
        match self {
            Self::L => v.to_le_bytes(),
            Self::M => v.to_be_bytes(),
        }
    }

    fn u32_bytes(self, v: u32) -> [u8; 4] {
        match self {
            Self::L => v.to_le_bytes(),
            Self::M => v.to_be_bytes(),
        }
    }
}

/// One directory in a path table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTableEntry {
    /// Directory identifier (`[0]` for the root)
    pub name: Vec<u8>,
    /// Extended attribute record length
    pub ext_attr_length: u8,
    /// Directory extent (LSN)
    pub extent: u32,
    /// 1-based index of the parent entry
    pub parent: u16,
}

impl PathTableEntry {
    /// Encoded size, padded to even
    pub fn size(&self) -> usize {
        pad_even(ENTRY_HEADER_LEN + self.name.len())
    }

    /// Identifier as text
    pub fn name_str(&self) -> Cow<'_, str> {
        alloc::string::String::from_utf8_lossy(&self.name)
    }

    fn encode_into(&self, kind: PathTableKind, out: &mut Vec<u8>) {
        let start = out.len();
        out.push(self.name.len() as u8);
        out.push(self.ext_attr_length);
        out.extend_from_slice(&kind.u32_bytes(self.extent));
        out.extend_from_slice(&kind.u16_bytes(self.parent));
        out.extend_from_slice(&self.name);
        out.resize(start + self.size(), 0);
    }
}

/// Decode a stored path table
///
/// Reading stops at a zero identifier length or at the end of `bytes`.
pub fn read_path_table(
    bytes: &[u8],
    kind: PathTableKind,
) -> core::result::Result<Vec<PathTableEntry>, FormatError> {
    let mut entries = Vec::new();
    let mut offset = 0;
    while offset < bytes.len() {
        let name_len = bytes[offset] as usize;
        if name_len == 0 {
            break;
        }
        let raw = bytes
            .get(offset..offset + ENTRY_HEADER_LEN + name_len)
            .ok_or(FormatError::TruncatedRecord)?;
        entries.push(PathTableEntry {
            name: raw[ENTRY_HEADER_LEN..].to_vec(),
            ext_attr_length: raw[1],
            extent: kind.read_u32([raw[2], raw[3], raw[4], raw[5]]),
            parent: kind.read_u16([raw[6], raw[7]]),
        });
        offset += pad_even(ENTRY_HEADER_LEN + name_len);
    }
    Ok(entries)
}

/// Logical path table, encodable in either byte order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathTable {
    entries: Vec<PathTableEntry>,
}

impl PathTable {
    /// Empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Table from decoded entries
    pub fn from_entries(entries: Vec<PathTableEntry>) -> Self {
        Self { entries }
    }

    /// Entries in table order
    pub fn entries(&self) -> &[PathTableEntry] {
        &self.entries
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// No entries yet
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append a directory, returning its 1-based index
    ///
    /// The first entry is the root and must name itself (parent 1). Later
    /// entries must name an existing entry as parent, no smaller than the
    /// previous entry's parent.
    pub fn add_entry(&mut self, name: &[u8], extent: u32, parent: u16) -> Result<u16> {
        if name.is_empty() {
            return Err(FormatError::InvalidName.into());
        }
        if name.len() > u8::MAX as usize {
            let max = u8::MAX as usize;
            return Err(FormatError::FieldOverflow { len: name.len(), max }.into());
        }

        let limit = self.entries.len().max(1);
        if parent == 0 || parent as usize > limit {
            return Err(FormatError::RecordOrderingViolation.into());
        }
        if let Some(last) = self.entries.last() {
            if parent < last.parent {
                return Err(FormatError::RecordOrderingViolation.into());
            }
        }
        let len = self.entries.len() + 1;
        let index = u16::try_from(len).map_err(|_| FormatError::FieldOverflow {
            len,
            max: u16::MAX as usize,
        })?;

        self.entries.push(PathTableEntry {
            name: name.to_vec(),
            ext_attr_length: 0,
            extent,
            parent,
        });
        Ok(index)
    }

    /// Encoded size in bytes (same for both byte orders)
    pub fn size(&self) -> usize {
        self.entries.iter().map(PathTableEntry::size).sum()
    }

    /// Encode in the given byte order
    pub fn encode(&self, kind: PathTableKind) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.size());
        for entry in &self.entries {
            entry.encode_into(kind, &mut out);
        }
        out
    }
}
