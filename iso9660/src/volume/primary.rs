//! Primary and Supplementary Volume Descriptor codec
//!
//! Both descriptors share one 2048-byte layout (ECMA-119 8.4 / 8.5). The
//! supplementary form adds volume flags at BP 8 and escape sequences at
//! BP 89-120; Joliet uses the latter to announce UCS-2 identifiers.

use alloc::string::String;
use alloc::vec::Vec;

use crate::directory::record::DirectoryRecord;
use crate::error::FormatError;
use crate::types::{EndianPolicy, VolumeDescriptorType, SECTOR_SIZE};
use crate::utils::datetime::{decode_long_time, DateTime17, ZonedTime};
use crate::utils::endian::{
    decode_dual_u16_with, decode_dual_u32_with, decode_u32_be, decode_u32_le, encode_dual_u16,
    encode_dual_u32,
};
use crate::utils::string::{achars_to_str, decode_ucs2_be, trim_trailing_spaces};
use crate::volume::supplementary::joliet_level;
use crate::volume::VolumeDescriptorHeader;

/// Byte offsets inside a volume descriptor
pub mod offsets {
    /// Volume flags (SVD only)
    pub const FLAGS: usize = 7;
    /// System identifier
    pub const SYSTEM_ID: usize = 8;
    /// Volume identifier
    pub const VOLUME_ID: usize = 40;
    /// Volume space size
    pub const VOLUME_SPACE_SIZE: usize = 80;
    /// Escape sequences (SVD only)
    pub const ESCAPE_SEQUENCES: usize = 88;
    /// Volume set size
    pub const VOLUME_SET_SIZE: usize = 120;
    /// Volume sequence number
    pub const VOLUME_SEQUENCE_NUMBER: usize = 124;
    /// Logical block size
    pub const LOGICAL_BLOCK_SIZE: usize = 128;
    /// Path table size
    pub const PATH_TABLE_SIZE: usize = 132;
    /// Type L path table location
    pub const TYPE_L_PATH_TABLE: usize = 140;
    /// Optional type L path table location
    pub const OPT_TYPE_L_PATH_TABLE: usize = 144;
    /// Type M path table location
    pub const TYPE_M_PATH_TABLE: usize = 148;
    /// Optional type M path table location
    pub const OPT_TYPE_M_PATH_TABLE: usize = 152;
    /// Root directory record
    pub const ROOT_DIRECTORY_RECORD: usize = 156;
    /// Volume set identifier
    pub const VOLUME_SET_ID: usize = 190;
    /// Publisher identifier
    pub const PUBLISHER_ID: usize = 318;
    /// Data preparer identifier
    pub const PREPARER_ID: usize = 446;
    /// Application identifier
    pub const APPLICATION_ID: usize = 574;
    /// Copyright file identifier
    pub const COPYRIGHT_FILE_ID: usize = 702;
    /// Abstract file identifier
    pub const ABSTRACT_FILE_ID: usize = 739;
    /// Bibliographic file identifier
    pub const BIBLIOGRAPHIC_FILE_ID: usize = 776;
    /// Volume creation time
    pub const CREATION_TIME: usize = 813;
    /// Volume modification time
    pub const MODIFICATION_TIME: usize = 830;
    /// Volume expiration time
    pub const EXPIRATION_TIME: usize = 847;
    /// Volume effective time
    pub const EFFECTIVE_TIME: usize = 864;
    /// File structure version
    pub const FILE_STRUCTURE_VERSION: usize = 881;
    /// Application use area (512 bytes)
    pub const APPLICATION_USE: usize = 883;
}

/// Root directory record length inside a descriptor
pub const ROOT_RECORD_LEN: usize = 34;

/// Length of the application use area
pub const APPLICATION_USE_LEN: usize = 512;

fn field<const N: usize>(data: &[u8], at: usize) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(&data[at..at + N]);
    out
}

fn put(out: &mut [u8], at: usize, bytes: &[u8]) {
    out[at..at + bytes.len()].copy_from_slice(bytes);
}

/// Primary or Supplementary Volume Descriptor, decoded into owned fields
///
/// See ECMA-119 8.4 for the full layout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolumeDescriptor {
    /// Primary or Supplementary
    pub descriptor_type: VolumeDescriptorType,

    /// Descriptor version (1, or 2 for an enhanced descriptor)
    pub version: u8,

    /// Volume flags (SVD only)
    pub flags: u8,

    /// System identifier (32 a-characters)
    pub system_id: [u8; 32],

    /// Volume identifier (32 d-characters)
    pub volume_id: [u8; 32],

    /// Volume space size (sectors)
    pub volume_space_size: u32,

    /// Escape sequences (SVD only)
    pub escape_sequences: [u8; 32],

    /// Volume set size
    pub volume_set_size: u16,

    /// Volume sequence number
    pub volume_sequence_number: u16,

    /// Logical block size (usually 2048)
    pub logical_block_size: u16,

    /// Path table size (bytes)
    pub path_table_size: u32,

    /// Type L path table location
    pub type_l_path_table: u32,

    /// Optional type L path table location
    pub optional_type_l_path_table: u32,

    /// Type M path table location
    pub type_m_path_table: u32,

    /// Optional type M path table location
    pub optional_type_m_path_table: u32,

    /// Root directory record
    pub root: DirectoryRecord,

    /// Volume set identifier
    pub volume_set_id: [u8; 128],

    /// Publisher identifier
    pub publisher_id: [u8; 128],

    /// Data preparer identifier
    pub preparer_id: [u8; 128],

    /// Application identifier
    pub application_id: [u8; 128],

    /// Copyright file identifier
    pub copyright_file_id: [u8; 37],

    /// Abstract file identifier
    pub abstract_file_id: [u8; 37],

    /// Bibliographic file identifier
    pub bibliographic_file_id: [u8; 37],

    /// Volume creation time, raw
    pub creation_time: [u8; 17],

    /// Volume modification time, raw
    pub modification_time: [u8; 17],

    /// Volume expiration time, raw
    pub expiration_time: [u8; 17],

    /// Volume effective time, raw
    pub effective_time: [u8; 17],

    /// File structure version
    pub file_structure_version: u8,

    /// Application use area
    pub application_use: Vec<u8>,
}

impl VolumeDescriptor {
    /// Empty descriptor for authoring: space-filled identifiers, unset
    /// times, 2048-byte blocks
    pub fn new(descriptor_type: VolumeDescriptorType, root: DirectoryRecord) -> Self {
        Self {
            descriptor_type,
            version: 1,
            flags: 0,
            system_id: [b' '; 32],
            volume_id: [b' '; 32],
            volume_space_size: 0,
            escape_sequences: [0; 32],
            volume_set_size: 1,
            volume_sequence_number: 1,
            logical_block_size: SECTOR_SIZE as u16,
            path_table_size: 0,
            type_l_path_table: 0,
            optional_type_l_path_table: 0,
            type_m_path_table: 0,
            optional_type_m_path_table: 0,
            root,
            volume_set_id: [b' '; 128],
            publisher_id: [b' '; 128],
            preparer_id: [b' '; 128],
            application_id: [b' '; 128],
            copyright_file_id: [b' '; 37],
            abstract_file_id: [b' '; 37],
            bibliographic_file_id: [b' '; 37],
            creation_time: DateTime17::UNSET,
            modification_time: DateTime17::UNSET,
            expiration_time: DateTime17::UNSET,
            effective_time: DateTime17::UNSET,
            file_structure_version: 1,
            application_use: alloc::vec![0; APPLICATION_USE_LEN],
        }
    }

    /// Parse a Primary or Supplementary descriptor from sector data
    pub fn parse(data: &[u8], policy: EndianPolicy) -> Result<Self, FormatError> {
        if data.len() < SECTOR_SIZE {
            return Err(FormatError::TruncatedRecord);
        }

        let header = VolumeDescriptorHeader::parse(data)?;
        let descriptor_type = match header.descriptor_type() {
            Some(t @ (VolumeDescriptorType::Primary | VolumeDescriptorType::Supplementary)) => t,
            _ => return Err(FormatError::UnexpectedDescriptorType(header.type_code)),
        };
        header.validate(descriptor_type)?;

        use offsets::*;
        Ok(Self {
            descriptor_type,
            version: header.version,
            flags: data[FLAGS],
            system_id: field(data, SYSTEM_ID),
            volume_id: field(data, VOLUME_ID),
            volume_space_size: decode_dual_u32_with(&data[VOLUME_SPACE_SIZE..], policy)?,
            escape_sequences: field(data, ESCAPE_SEQUENCES),
            volume_set_size: decode_dual_u16_with(&data[VOLUME_SET_SIZE..], policy)?,
            volume_sequence_number: decode_dual_u16_with(&data[VOLUME_SEQUENCE_NUMBER..], policy)?,
            logical_block_size: decode_dual_u16_with(&data[LOGICAL_BLOCK_SIZE..], policy)?,
            path_table_size: decode_dual_u32_with(&data[PATH_TABLE_SIZE..], policy)?,
            type_l_path_table: decode_u32_le(&data[TYPE_L_PATH_TABLE..])?,
            optional_type_l_path_table: decode_u32_le(&data[OPT_TYPE_L_PATH_TABLE..])?,
            type_m_path_table: decode_u32_be(&data[TYPE_M_PATH_TABLE..])?,
            optional_type_m_path_table: decode_u32_be(&data[OPT_TYPE_M_PATH_TABLE..])?,
            root: DirectoryRecord::parse(
                &data[ROOT_DIRECTORY_RECORD..ROOT_DIRECTORY_RECORD + ROOT_RECORD_LEN],
                policy,
            )?,
            volume_set_id: field(data, VOLUME_SET_ID),
            publisher_id: field(data, PUBLISHER_ID),
            preparer_id: field(data, PREPARER_ID),
            application_id: field(data, APPLICATION_ID),
            copyright_file_id: field(data, COPYRIGHT_FILE_ID),
            abstract_file_id: field(data, ABSTRACT_FILE_ID),
            bibliographic_file_id: field(data, BIBLIOGRAPHIC_FILE_ID),
            creation_time: field(data, CREATION_TIME),
            modification_time: field(data, MODIFICATION_TIME),
            expiration_time: field(data, EXPIRATION_TIME),
            effective_time: field(data, EFFECTIVE_TIME),
            file_structure_version: data[FILE_STRUCTURE_VERSION],
            application_use: data[APPLICATION_USE..APPLICATION_USE + APPLICATION_USE_LEN].to_vec(),
        })
    }

    /// Serialize to a full sector
    pub fn encode(&self) -> Result<[u8; SECTOR_SIZE], FormatError> {
        let root = self.root.encode()?;
        if root.len() != ROOT_RECORD_LEN {
            return Err(FormatError::FieldOverflow { len: root.len(), max: ROOT_RECORD_LEN });
        }
        if self.application_use.len() > APPLICATION_USE_LEN {
            return Err(FormatError::FieldOverflow {
                len: self.application_use.len(),
                max: APPLICATION_USE_LEN,
            });
        }

        use offsets::*;
        let header = VolumeDescriptorHeader::new(self.descriptor_type as u8, self.version);
        let mut out = [0u8; SECTOR_SIZE];
        put(&mut out, 0, &header.to_bytes());
        out[FLAGS] = self.flags;
        put(&mut out, SYSTEM_ID, &self.system_id);
        put(&mut out, VOLUME_ID, &self.volume_id);
        put(&mut out, VOLUME_SPACE_SIZE, &encode_dual_u32(self.volume_space_size));
        put(&mut out, ESCAPE_SEQUENCES, &self.escape_sequences);
        put(&mut out, VOLUME_SET_SIZE, &encode_dual_u16(self.volume_set_size));
        put(&mut out, VOLUME_SEQUENCE_NUMBER, &encode_dual_u16(self.volume_sequence_number));
        put(&mut out, LOGICAL_BLOCK_SIZE, &encode_dual_u16(self.logical_block_size));
        put(&mut out, PATH_TABLE_SIZE, &encode_dual_u32(self.path_table_size));
        put(&mut out, TYPE_L_PATH_TABLE, &self.type_l_path_table.to_le_bytes());
        put(&mut out, OPT_TYPE_L_PATH_TABLE, &self.optional_type_l_path_table.to_le_bytes());
        put(&mut out, TYPE_M_PATH_TABLE, &self.type_m_path_table.to_be_bytes());
        put(&mut out, OPT_TYPE_M_PATH_TABLE, &self.optional_type_m_path_table.to_be_bytes());
        put(&mut out, ROOT_DIRECTORY_RECORD, &root);
        put(&mut out, VOLUME_SET_ID, &self.volume_set_id);
        put(&mut out, PUBLISHER_ID, &self.publisher_id);
        put(&mut out, PREPARER_ID, &self.preparer_id);
        put(&mut out, APPLICATION_ID, &self.application_id);
        put(&mut out, COPYRIGHT_FILE_ID, &self.copyright_file_id);
        put(&mut out, ABSTRACT_FILE_ID, &self.abstract_file_id);
        put(&mut out, BIBLIOGRAPHIC_FILE_ID, &self.bibliographic_file_id);
        put(&mut out, CREATION_TIME, &self.creation_time);
        put(&mut out, MODIFICATION_TIME, &self.modification_time);
        put(&mut out, EXPIRATION_TIME, &self.expiration_time);
        put(&mut out, EFFECTIVE_TIME, &self.effective_time);
        out[FILE_STRUCTURE_VERSION] = self.file_structure_version;
        put(&mut out, APPLICATION_USE, &self.application_use);
        Ok(out)
    }

    /// Joliet level announced by the escape sequences (SVD only)
    pub fn joliet_level(&self) -> Option<u8> {
        match self.descriptor_type {
            VolumeDescriptorType::Supplementary => joliet_level(&self.escape_sequences),
            _ => None,
        }
    }

    fn text(&self, raw: &[u8]) -> String {
        if self.joliet_level().is_some() {
            decode_ucs2_be(raw)
        } else {
            match achars_to_str(raw) {
                Ok(s) => String::from(s),
                Err(_) => String::from_utf8_lossy(trim_trailing_spaces(raw)).into_owned(),
            }
        }
    }

    /// Root directory extent location
    pub fn root_lsn(&self) -> u32 {
        self.root.extent
    }

    /// Root directory extent length (bytes)
    pub fn root_size(&self) -> u32 {
        self.root.size
    }

    /// System identifier
    pub fn system_id(&self) -> String {
        self.text(&self.system_id)
    }

    /// Volume identifier
    pub fn volume_id(&self) -> String {
        self.text(&self.volume_id)
    }

    /// Volume set identifier
    pub fn volume_set_id(&self) -> String {
        self.text(&self.volume_set_id)
    }

    /// Publisher identifier
    pub fn publisher_id(&self) -> String {
        self.text(&self.publisher_id)
    }

    /// Data preparer identifier
    pub fn preparer_id(&self) -> String {
        self.text(&self.preparer_id)
    }

    /// Application identifier
    pub fn application_id(&self) -> String {
        self.text(&self.application_id)
    }

    /// Copyright file identifier
    pub fn copyright_file_id(&self) -> String {
        self.text(&self.copyright_file_id)
    }

    /// Abstract file identifier
    pub fn abstract_file_id(&self) -> String {
        self.text(&self.abstract_file_id)
    }

    /// Bibliographic file identifier
    pub fn bibliographic_file_id(&self) -> String {
        self.text(&self.bibliographic_file_id)
    }

    /// Volume creation time
    pub fn creation_time(&self) -> Result<Option<ZonedTime>, FormatError> {
        decode_long_time(&self.creation_time)
    }

    /// Volume modification time
    pub fn modification_time(&self) -> Result<Option<ZonedTime>, FormatError> {
        decode_long_time(&self.modification_time)
    }

    /// Volume expiration time
    pub fn expiration_time(&self) -> Result<Option<ZonedTime>, FormatError> {
        decode_long_time(&self.expiration_time)
    }

    /// Volume effective time
    pub fn effective_time(&self) -> Result<Option<ZonedTime>, FormatError> {
        decode_long_time(&self.effective_time)
    }
}
