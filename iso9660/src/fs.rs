//! Mounted filesystem handle
//!
//! [`Filesystem`] owns the block device, the framing used to locate
//! logical sectors and the volume descriptors once read. Every operation
//! takes `&mut self`, so one handle serves one caller at a time.

use alloc::string::String;
use alloc::vec::Vec;
use gpt_disk_io::BlockIo;

use crate::directory::iterator::{self, ListOptions};
use crate::directory::path_table::{read_path_table, PathTable, PathTableKind};
use crate::directory::{self as dir};
use crate::error::{FormatError, Result};
use crate::file::{self, reader::FileReader};
use crate::source::{Framing, SectorSource};
use crate::types::{MountOptions, Stat, VolumeInfo};
use crate::utils::sector::sectors_for_bytes;
use crate::volume;

/// ISO9660 filesystem over a block device
pub struct Filesystem<B: BlockIo> {
    source: SectorSource<B>,
    options: MountOptions,
    volume: Option<VolumeInfo>,
}

impl<B: BlockIo> Filesystem<B> {
    /// Wrap a device with standard framing; no I/O is done
    pub fn open(block_io: B, options: MountOptions) -> Self {
        Self {
            source: SectorSource::new(block_io),
            options,
            volume: None,
        }
    }

    /// Wrap a device whose framing is unknown and locate the volume
    pub fn open_fuzzy(block_io: B, options: MountOptions, max_fuzz: u16) -> Result<Self> {
        let mut fs = Self::open(block_io, options);
        fs.read_superblock_fuzzy(max_fuzz)?;
        Ok(fs)
    }

    /// Wrap a device and read its volume descriptors
    ///
    /// # Example
    /// ```ignore
    /// let mut fs = Filesystem::mount(device, MountOptions::default())?;
    /// let kernel = fs.stat("/boot/vmlinuz", true)?;
    /// let data = fs.read_file(&kernel)?;
    /// ```
    pub fn mount(block_io: B, options: MountOptions) -> Result<Self> {
        let mut fs = Self::open(block_io, options);
        fs.read_superblock()?;
        Ok(fs)
    }

    /// Read the volume descriptor set under the current framing
    pub fn read_superblock(&mut self) -> Result<&VolumeInfo> {
        let info = volume::read_superblock(&mut self.source, &self.options)?;
        tracing::debug!(
            volume_id = %info.volume_id(),
            joliet = info.joliet_level,
            rock_ridge = info.has_rock_ridge,
            "mounted"
        );
        Ok(self.volume.insert(info))
    }

    /// Search for the volume under candidate framings and keep the first
    /// that validates
    pub fn read_superblock_fuzzy(&mut self, max_fuzz: u16) -> Result<&VolumeInfo> {
        let (_, info) = volume::read_superblock_fuzzy(&mut self.source, &self.options, max_fuzz)?;
        Ok(self.volume.insert(info))
    }

    /// Volume descriptors, once read
    pub fn volume(&self) -> Option<&VolumeInfo> {
        self.volume.as_ref()
    }

    /// Options in effect
    pub fn options(&self) -> &MountOptions {
        &self.options
    }

    /// Current sector framing
    pub fn framing(&self) -> Framing {
        self.source.framing()
    }

    /// Bytes per frame on the device
    pub fn frame_size(&self) -> u32 {
        self.source.framing().frame_size
    }

    /// Byte offset of logical sector 0's data
    pub fn data_start_offset(&self) -> i64 {
        self.source.framing().data_start
    }

    /// Joliet level in use, 0 when none
    pub fn joliet_level(&self) -> u8 {
        self.volume.as_ref().map_or(0, |v| v.joliet_level)
    }

    /// Rock Ridge entries were found on the root directory
    pub fn has_rock_ridge(&self) -> bool {
        self.volume.as_ref().is_some_and(|v| v.has_rock_ridge)
    }

    /// Source, volume and listing options, reading the descriptors first
    /// if needed
    fn parts(&mut self) -> Result<(&mut SectorSource<B>, &VolumeInfo, ListOptions)> {
        if self.volume.is_none() {
            self.read_superblock()?;
        }
        let Self { source, options, volume } = self;
        let volume = volume.as_ref().ok_or(FormatError::SuperblockNotFound)?;
        let opts = ListOptions::for_volume(volume, options);
        Ok((source, volume, opts))
    }

    /// Look up a path; see [`directory::stat`](crate::directory::stat)
    pub fn stat(&mut self, path: &str, translate: bool) -> Result<Stat> {
        let (source, volume, opts) = self.parts()?;
        dir::stat(source, volume, &opts, path, translate)
    }

    /// List the directory at `path`
    pub fn readdir(&mut self, path: &str) -> Result<Vec<Stat>> {
        let (source, volume, opts) = self.parts()?;
        let entry = dir::stat(source, volume, &opts, path, true)?;
        dir::list(source, &entry, &opts)
    }

    /// List the directory stored at `lsn`
    pub fn read_dir_entries(&mut self, lsn: u32, size: u32) -> Result<Vec<Stat>> {
        let (source, _, opts) = self.parts()?;
        iterator::read_dir_entries(source, lsn, size, &opts)
    }

    /// Entry whose data covers `lsn`
    pub fn find_by_lsn(&mut self, lsn: u32) -> Result<Stat> {
        let (source, volume, opts) = self.parts()?;
        dir::find_by_lsn(source, volume, &opts, lsn)
    }

    /// Entry whose data covers `lsn`, with its full path
    pub fn find_by_lsn_with_path(&mut self, lsn: u32) -> Result<(String, Stat)> {
        let (source, volume, opts) = self.parts()?;
        dir::find_by_lsn_with_path(source, volume, &opts, lsn)
    }

    /// Whole file contents
    pub fn read_file(&mut self, entry: &Stat) -> Result<Vec<u8>> {
        file::read_file_vec(&mut self.source, entry)
    }

    /// File contents into `buffer`, returning the byte count
    pub fn read_file_into(&mut self, entry: &Stat, buffer: &mut [u8]) -> Result<usize> {
        file::read_file(&mut self.source, entry, buffer)
    }

    /// Incremental reader over a file
    pub fn reader<'a>(&'a mut self, entry: &'a Stat) -> FileReader<'a, B> {
        FileReader::new(&mut self.source, entry)
    }

    /// Path table of the walked tree
    ///
    /// The type L table is decoded and compared against the type M table
    /// when one is recorded; disagreement is reported as
    /// [`FormatError::EndianMismatch`].
    pub fn path_table(&mut self) -> Result<PathTable> {
        let (source, volume, _) = self.parts()?;
        let descriptor = volume.active();
        let size = descriptor.path_table_size as usize;
        let sectors = sectors_for_bytes(size as u64);
        let l_location = descriptor.type_l_path_table;
        let m_location = descriptor.type_m_path_table;

        let l_bytes = source.read_sectors(l_location, sectors)?;
        let entries = read_path_table(&l_bytes[..size], PathTableKind::L)?;

        if m_location != 0 {
            let m_bytes = source.read_sectors(m_location, sectors)?;
            let m_entries = read_path_table(&m_bytes[..size], PathTableKind::M)?;
            if m_entries.len() != entries.len() {
                return Err(FormatError::EndianMismatch {
                    le: entries.len() as u32,
                    be: m_entries.len() as u32,
                }
                .into());
            }
            if let Some((l, m)) = entries.iter().zip(&m_entries).find(|(l, m)| l != m) {
                return Err(FormatError::EndianMismatch { le: l.extent, be: m.extent }.into());
            }
        }
        tracing::trace!(entries = entries.len(), "path table read");
        Ok(PathTable::from_entries(entries))
    }

    /// Raw logical sectors
    pub fn read_sectors(&mut self, lsn: u32, count: u32) -> Result<Vec<u8>> {
        self.source.read_sectors(lsn, count)
    }

    /// Release the device
    pub fn into_inner(self) -> B {
        self.source.into_inner()
    }
}
