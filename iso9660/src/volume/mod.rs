//! Volume descriptor parsing
//!
//! ISO9660 volume descriptors start at sector 16 and describe the filesystem layout.
//! Multiple descriptors may be present (Primary, Supplementary, Boot Record),
//! closed by a Volume Descriptor Set Terminator.

pub mod fuzzy;
pub mod primary;
pub mod supplementary;

use gpt_disk_io::BlockIo;

use crate::directory::record::DirectoryRecord;
use crate::error::{FormatError, Result};
use crate::extensions::rock_ridge;
use crate::source::SectorSource;
use crate::types::{
    ExtensionMask, MountOptions, VolumeDescriptorType, VolumeInfo, SECTOR_SIZE,
    VOLUME_DESCRIPTOR_START,
};
use primary::VolumeDescriptor;
use supplementary::joliet_level_enabled;

pub use fuzzy::read_superblock_fuzzy;

/// Descriptors read after the PVD before giving up on a terminator
pub const MAX_DESCRIPTORS: u32 = 64;

/// Volume Descriptor header (first 7 bytes of each descriptor)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VolumeDescriptorHeader {
    /// Type code (0=boot, 1=primary, 2=supplementary, 3=partition, 255=terminator)
    pub type_code: u8,

    /// Standard identifier "CD001"
    pub identifier: [u8; 5],

    /// Version (always 1)
    pub version: u8,
}

impl VolumeDescriptorHeader {
    /// CD001 magic bytes
    pub const MAGIC: &'static [u8; 5] = b"CD001";

    /// Header with the standard identifier
    pub fn new(type_code: u8, version: u8) -> Self {
        Self {
            type_code,
            identifier: *Self::MAGIC,
            version,
        }
    }

    /// Parse the first 7 bytes of a descriptor, checking the identifier
    pub fn parse(data: &[u8]) -> core::result::Result<Self, FormatError> {
        let raw = data.get(..7).ok_or(FormatError::TruncatedRecord)?;
        let mut identifier = [0u8; 5];
        identifier.copy_from_slice(&raw[1..6]);
        if &identifier != Self::MAGIC {
            return Err(FormatError::BadSignature);
        }
        Ok(Self {
            type_code: raw[0],
            identifier,
            version: raw[6],
        })
    }

    /// Serialize
    pub fn to_bytes(&self) -> [u8; 7] {
        let mut out = [0u8; 7];
        out[0] = self.type_code;
        out[1..6].copy_from_slice(&self.identifier);
        out[6] = self.version;
        out
    }

    /// Descriptor type, `None` for codes ECMA-119 does not define
    pub fn descriptor_type(&self) -> Option<VolumeDescriptorType> {
        VolumeDescriptorType::from_u8(self.type_code)
    }

    /// Check the version for the given type. Supplementary descriptors
    /// may be enhanced (version 2); everything else must be version 1.
    pub fn validate(&self, kind: VolumeDescriptorType) -> core::result::Result<(), FormatError> {
        let ok = match kind {
            VolumeDescriptorType::Supplementary => matches!(self.version, 1 | 2),
            _ => self.version == 1,
        };
        if ok {
            Ok(())
        } else {
            Err(FormatError::UnsupportedVersion(self.version))
        }
    }
}

/// Volume Descriptor Set Terminator sector
pub fn encode_terminator() -> [u8; SECTOR_SIZE] {
    let mut out = [0u8; SECTOR_SIZE];
    out[..7].copy_from_slice(
        &VolumeDescriptorHeader::new(VolumeDescriptorType::Terminator as u8, 1).to_bytes(),
    );
    out
}

/// Read the Primary Volume Descriptor at sector 16 only
pub fn read_pvd<B: BlockIo>(
    source: &mut SectorSource<B>,
    options: &MountOptions,
) -> Result<VolumeDescriptor> {
    let mut buffer = [0u8; SECTOR_SIZE];
    source.read_sector(VOLUME_DESCRIPTOR_START, &mut buffer)?;

    let header = VolumeDescriptorHeader::parse(&buffer)?;
    if header.descriptor_type() != Some(VolumeDescriptorType::Primary) {
        return Err(FormatError::UnexpectedDescriptorType(header.type_code).into());
    }
    Ok(VolumeDescriptor::parse(&buffer, options.endian)?)
}

/// Read the volume descriptor set
///
/// Reads volume descriptors starting at sector 16 and builds VolumeInfo.
/// The first descriptor must be the PVD. The first Supplementary descriptor
/// announcing a Joliet level enabled in `options.extensions` is kept. The
/// scan ends at the terminator; a bad signature or an undefined type before
/// it is an error.
pub fn read_superblock<B: BlockIo>(
    source: &mut SectorSource<B>,
    options: &MountOptions,
) -> Result<VolumeInfo> {
    let pvd = read_pvd(source, options)?;
    tracing::debug!(
        volume_id = %pvd.volume_id(),
        sectors = pvd.volume_space_size,
        root = pvd.root_lsn(),
        "primary volume descriptor"
    );

    let mut buffer = [0u8; SECTOR_SIZE];
    let mut svd: Option<VolumeDescriptor> = None;
    let mut joliet_level = 0;

    let mut sector = VOLUME_DESCRIPTOR_START + 1;
    loop {
        if sector - VOLUME_DESCRIPTOR_START > MAX_DESCRIPTORS {
            return Err(FormatError::MissingTerminator.into());
        }
        source.read_sector(sector, &mut buffer)?;

        let header = VolumeDescriptorHeader::parse(&buffer)?;
        match header.descriptor_type() {
            Some(VolumeDescriptorType::Terminator) => break,
            Some(VolumeDescriptorType::Supplementary) => {
                header.validate(VolumeDescriptorType::Supplementary)?;
                if svd.is_none() {
                    let candidate = VolumeDescriptor::parse(&buffer, options.endian)?;
                    match candidate.joliet_level() {
                        Some(level) if joliet_level_enabled(options.extensions, level) => {
                            tracing::debug!(sector, level, "Joliet supplementary descriptor");
                            joliet_level = level;
                            svd = Some(candidate);
                        }
                        Some(level) => tracing::debug!(sector, level, "Joliet level not requested"),
                        None => {
                            tracing::debug!(sector, "non-Joliet supplementary descriptor skipped")
                        }
                    }
                }
            }
            Some(VolumeDescriptorType::Primary) => {
                tracing::warn!(sector, "additional primary volume descriptor ignored");
            }
            Some(kind @ (VolumeDescriptorType::BootRecord | VolumeDescriptorType::Partition)) => {
                tracing::trace!(sector, ?kind, "descriptor skipped");
            }
            None => return Err(FormatError::UnexpectedDescriptorType(header.type_code).into()),
        }
        sector += 1;
    }

    let has_rock_ridge = options.extensions.contains(ExtensionMask::ROCK_RIDGE)
        && root_has_rock_ridge(source, &pvd.root, options)?;

    Ok(VolumeInfo {
        pvd,
        svd,
        joliet_level,
        has_rock_ridge,
    })
}

/// Look for SUSP/Rock Ridge entries on the root directory's `.` record
fn root_has_rock_ridge<B: BlockIo>(
    source: &mut SectorSource<B>,
    root: &DirectoryRecord,
    options: &MountOptions,
) -> Result<bool> {
    let mut buffer = [0u8; SECTOR_SIZE];
    source.read_sector(root.extent, &mut buffer)?;
    if buffer[0] == 0 {
        return Ok(false);
    }
    let dot = DirectoryRecord::parse(&buffer, options.endian)?;
    let found = rock_ridge::has_rock_ridge(&dot.system_use);
    if found {
        tracing::debug!("Rock Ridge entries on root directory");
    }
    Ok(found)
}
