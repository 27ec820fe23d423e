//! Directory Record structure
//!
//! Directory records describe files and subdirectories.
//!
//! ```text
//! BP 1      length of directory record
//! BP 2      extended attribute record length
//! BP 3-10   extent location (both-endian u32)
//! BP 11-18  data length (both-endian u32)
//! BP 19-25  recording date and time
//! BP 26     file flags
//! BP 27     file unit size
//! BP 28     interleave gap size
//! BP 29-32  volume sequence number (both-endian u16)
//! BP 33     file identifier length
//! BP 34-    file identifier, padding byte, system use
//! ```

use alloc::vec;
use alloc::vec::Vec;

use crate::directory::flags::FileFlags;
use crate::error::FormatError;
use crate::types::EndianPolicy;
use crate::utils::datetime::{decode_short_time_zoned, ZonedTime};
use crate::utils::endian::{
    decode_dual_u16_with, decode_dual_u32_with, encode_dual_u16, encode_dual_u32,
};
use crate::utils::sector::pad_even;

/// Fixed part of a directory record, up to and including the name length
pub const HEADER_LEN: usize = 33;

/// Identifier of the `.` record
pub const SELF_ID: u8 = 0x00;

/// Identifier of the `..` record
pub const PARENT_ID: u8 = 0x01;

/// Bytes a record occupies for the given identifier and system use lengths
pub fn record_size(name_len: usize, system_use_len: usize) -> usize {
    pad_even(pad_even(HEADER_LEN + name_len) + system_use_len)
}

/// Directory Record (variable length), decoded into owned fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryRecord {
    /// Length of directory record as stored
    pub length: u8,

    /// Extended attribute record length
    pub ext_attr_length: u8,

    /// Extent location (LSN)
    pub extent: u32,

    /// Data length (bytes)
    pub size: u32,

    /// Recording date and time, raw
    pub recording_time: [u8; 7],

    /// File flags
    pub flags: FileFlags,

    /// File unit size (interleaved files)
    pub file_unit_size: u8,

    /// Interleave gap size
    pub interleave_gap: u8,

    /// Volume sequence number
    pub volume_sequence_number: u16,

    /// File identifier bytes
    pub name: Vec<u8>,

    /// System use area
    pub system_use: Vec<u8>,
}

impl DirectoryRecord {
    /// Minimum record length (header plus a one-byte identifier)
    pub const MIN_LENGTH: usize = HEADER_LEN + 1;

    /// Build a record for authoring; `length` is computed on encode
    pub fn new(name: &[u8], extent: u32, size: u32, flags: FileFlags) -> Self {
        Self {
            length: record_size(name.len(), 0).min(u8::MAX as usize) as u8,
            ext_attr_length: 0,
            extent,
            size,
            recording_time: [0; 7],
            flags,
            file_unit_size: 0,
            interleave_gap: 0,
            volume_sequence_number: 1,
            name: name.to_vec(),
            system_use: Vec::new(),
        }
    }

    /// Parse directory record from bytes
    pub fn parse(data: &[u8], policy: EndianPolicy) -> Result<Self, FormatError> {
        if data.len() < Self::MIN_LENGTH {
            return Err(FormatError::TruncatedRecord);
        }

        let length = data[0] as usize;
        if length < Self::MIN_LENGTH || length > data.len() {
            return Err(FormatError::TruncatedRecord);
        }

        let name_len = data[32] as usize;
        if name_len == 0 || HEADER_LEN + name_len > length {
            return Err(FormatError::TruncatedRecord);
        }

        let su_start = pad_even(HEADER_LEN + name_len).min(length);
        let mut recording_time = [0u8; 7];
        recording_time.copy_from_slice(&data[18..25]);

        Ok(Self {
            length: data[0],
            ext_attr_length: data[1],
            extent: decode_dual_u32_with(&data[2..10], policy)?,
            size: decode_dual_u32_with(&data[10..18], policy)?,
            recording_time,
            flags: FileFlags::from_byte(data[25]),
            file_unit_size: data[26],
            interleave_gap: data[27],
            volume_sequence_number: decode_dual_u16_with(&data[28..32], policy)?,
            name: data[HEADER_LEN..HEADER_LEN + name_len].to_vec(),
            system_use: data[su_start..length].to_vec(),
        })
    }

    /// Bytes this record occupies when encoded
    pub fn encoded_len(&self) -> usize {
        record_size(self.name.len(), self.system_use.len())
    }

    /// Serialize, computing the length byte and padding
    pub fn encode(&self) -> Result<Vec<u8>, FormatError> {
        let len = self.encoded_len();
        if len > u8::MAX as usize || self.name.is_empty() {
            return Err(FormatError::FieldOverflow { len, max: u8::MAX as usize });
        }

        let mut out = vec![0u8; len];
        out[0] = len as u8;
        out[1] = self.ext_attr_length;
        out[2..10].copy_from_slice(&encode_dual_u32(self.extent));
        out[10..18].copy_from_slice(&encode_dual_u32(self.size));
        out[18..25].copy_from_slice(&self.recording_time);
        out[25] = self.flags.to_byte();
        out[26] = self.file_unit_size;
        out[27] = self.interleave_gap;
        out[28..32].copy_from_slice(&encode_dual_u16(self.volume_sequence_number));
        out[32] = self.name.len() as u8;
        out[HEADER_LEN..HEADER_LEN + self.name.len()].copy_from_slice(&self.name);
        let su_start = pad_even(HEADER_LEN + self.name.len());
        out[su_start..su_start + self.system_use.len()].copy_from_slice(&self.system_use);
        Ok(out)
    }

    /// The `.` record
    pub fn is_self(&self) -> bool {
        self.name == [SELF_ID]
    }

    /// The `..` record
    pub fn is_parent(&self) -> bool {
        self.name == [PARENT_ID]
    }

    /// Is this a directory?
    pub fn is_directory(&self) -> bool {
        self.flags.is_directory()
    }

    /// Decoded recording time
    pub fn recording_time(&self) -> Result<Option<ZonedTime>, FormatError> {
        decode_short_time_zoned(&self.recording_time)
    }

    /// Number of sectors covered by this record's extent
    pub fn sector_count(&self) -> u32 {
        crate::utils::sector::sectors_for_bytes(self.size as u64)
    }
}
