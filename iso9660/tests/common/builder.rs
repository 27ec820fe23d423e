//! Image builder on top of the crate's own authoring API

use std::collections::HashMap;

use iso9660::directory::builder::{add_directory_entry, add_record, init_directory};
use iso9660::directory::path_table::{PathTable, PathTableKind};
use iso9660::directory::record::DirectoryRecord;
use iso9660::types::VolumeDescriptorType;
use iso9660::utils::string::{encode_ucs2_be, pad_and_validate, Charset};
use iso9660::volume::encode_terminator;
use iso9660::volume::primary::VolumeDescriptor;
use iso9660::volume::supplementary::new_joliet;
use iso9660::FileFlags;

use crate::common::MemoryBlockDevice;

const SECTOR: usize = 2048;

#[derive(Clone)]
struct FileDef {
    iso: String,
    joliet: String,
    content: Vec<u8>,
    chunk_sectors: Option<u32>,
    rr_name: Option<String>,
}

#[derive(Clone)]
struct DirDef {
    iso: String,
    joliet: String,
    files: Vec<FileDef>,
}

impl DirDef {
    fn identifier(&self, joliet: bool) -> Vec<u8> {
        if joliet {
            encode_ucs2_be(&self.joliet)
        } else {
            self.iso.as_bytes().to_vec()
        }
    }
}

/// Where things landed in the built image
#[derive(Debug, Clone, Default)]
#[allow(dead_code)]
pub struct Layout {
    pub root: u32,
    pub svd: Option<u32>,
    pub joliet_root: Option<u32>,
    pub dirs: HashMap<String, u32>,
    /// First LSN of each file, keyed by `/DIR/NAME` ISO path
    pub files: HashMap<String, u32>,
    pub l_path_table: u32,
    pub m_path_table: u32,
    pub terminator: u32,
    pub total_sectors: u32,
    pub data_start: i64,
}

pub struct IsoBuilder {
    volume_id: String,
    root_files: Vec<FileDef>,
    dirs: Vec<DirDef>,
    joliet_level: Option<u8>,
    extra_descriptors: Vec<Vec<u8>>,
    rock_ridge: bool,
    recording_time: [u8; 7],
    prefix: usize,
    frame_size: usize,
    block_size: usize,
}

#[allow(dead_code)]
impl IsoBuilder {
    pub fn new() -> Self {
        Self {
            volume_id: "TEST_VOLUME".to_string(),
            root_files: Vec::new(),
            dirs: Vec::new(),
            joliet_level: None,
            extra_descriptors: Vec::new(),
            rock_ridge: false,
            // 2024-02-29 08:30:15 UTC
            recording_time: [124, 2, 29, 8, 30, 15, 0],
            prefix: 0,
            frame_size: SECTOR,
            block_size: SECTOR,
        }
    }

    pub fn volume_id(mut self, id: &str) -> Self {
        self.volume_id = id.to_string();
        self
    }

    /// File in the root directory; `name` is an ISO name such as `A.TXT`
    pub fn file(mut self, name: &str, content: &[u8]) -> Self {
        self.root_files.push(FileDef {
            iso: name.to_string(),
            joliet: name.to_string(),
            content: content.to_vec(),
            chunk_sectors: None,
            rr_name: None,
        });
        self
    }

    /// Root file with a distinct Joliet name
    pub fn file_with_joliet(mut self, name: &str, joliet: &str, content: &[u8]) -> Self {
        self.root_files.push(FileDef {
            iso: name.to_string(),
            joliet: joliet.to_string(),
            content: content.to_vec(),
            chunk_sectors: None,
            rr_name: None,
        });
        self
    }

    /// Root file stored as several extents of `chunk_sectors` sectors each
    pub fn multi_extent_file(mut self, name: &str, content: &[u8], chunk_sectors: u32) -> Self {
        self.root_files.push(FileDef {
            iso: name.to_string(),
            joliet: name.to_string(),
            content: content.to_vec(),
            chunk_sectors: Some(chunk_sectors),
            rr_name: None,
        });
        self
    }

    /// Root file carrying a Rock Ridge `NM` name; marks the volume as
    /// Rock Ridge
    pub fn file_with_rock_ridge(mut self, name: &str, rr_name: &str, content: &[u8]) -> Self {
        self.rock_ridge = true;
        self.root_files.push(FileDef {
            iso: name.to_string(),
            joliet: name.to_string(),
            content: content.to_vec(),
            chunk_sectors: None,
            rr_name: Some(rr_name.to_string()),
        });
        self
    }

    pub fn dir(mut self, name: &str) -> Self {
        self.dirs.push(DirDef {
            iso: name.to_string(),
            joliet: name.to_string(),
            files: Vec::new(),
        });
        self
    }

    /// File inside a directory added earlier
    pub fn file_in(mut self, dir: &str, name: &str, content: &[u8]) -> Self {
        let def = FileDef {
            iso: name.to_string(),
            joliet: name.to_string(),
            content: content.to_vec(),
            chunk_sectors: None,
            rr_name: None,
        };
        self.dirs
            .iter_mut()
            .find(|d| d.iso == dir)
            .expect("directory added before its files")
            .files
            .push(def);
        self
    }

    pub fn joliet(mut self, level: u8) -> Self {
        self.joliet_level = Some(level);
        self
    }

    /// Extra descriptor sector placed just before the terminator
    pub fn descriptor(mut self, sector: &[u8]) -> Self {
        let mut raw = sector.to_vec();
        raw.resize(SECTOR, 0);
        self.extra_descriptors.push(raw);
        self
    }

    pub fn recording_time(mut self, raw: [u8; 7]) -> Self {
        self.recording_time = raw;
        self
    }

    /// Junk bytes in front of the image
    pub fn prefix(mut self, bytes: usize) -> Self {
        self.prefix = bytes;
        self
    }

    /// Wrap each sector in a raw frame of 2352 or 2336 bytes
    pub fn raw_frames(mut self, frame_size: usize) -> Self {
        self.frame_size = frame_size;
        self
    }

    pub fn block_size(mut self, block_size: usize) -> Self {
        self.block_size = block_size;
        self
    }

    pub fn build(self) -> MemoryBlockDevice {
        self.build_with_layout().0
    }

    pub fn build_with_layout(self) -> (MemoryBlockDevice, Layout) {
        let (image, mut layout) = self.logical_image();
        let (data, header) = self.frame(&image);
        layout.data_start = (self.prefix + header) as i64;
        (MemoryBlockDevice::with_block_size(data, self.block_size), layout)
    }

    /// Plain 2048-byte sector image and its layout
    pub fn logical_image(&self) -> (Vec<u8>, Layout) {
        let mut next = 17u32;
        let mut alloc = |n: u32| {
            let at = next;
            next += n;
            at
        };

        let svd_lsn = self.joliet_level.map(|_| alloc(1));
        let extras = alloc(self.extra_descriptors.len() as u32);
        let terminator = alloc(1);
        let l_pt = alloc(1);
        let m_pt = alloc(1);
        let joliet_pts = self.joliet_level.map(|_| (alloc(1), alloc(1)));
        let root = alloc(1);
        let dir_lsns: Vec<u32> = self.dirs.iter().map(|_| alloc(1)).collect();
        let joliet_root = self.joliet_level.map(|_| alloc(1));
        let joliet_dirs: Vec<u32> = match self.joliet_level {
            Some(_) => self.dirs.iter().map(|_| alloc(1)).collect(),
            None => Vec::new(),
        };

        let mut file_lsns: HashMap<String, u32> = HashMap::new();
        let mut place = |path: String, f: &FileDef| {
            let sectors = f.content.len().div_ceil(SECTOR).max(1) as u32;
            file_lsns.insert(path, alloc(sectors));
        };
        for f in &self.root_files {
            place(format!("/{}", f.iso), f);
        }
        for d in &self.dirs {
            for f in &d.files {
                place(format!("/{}/{}", d.iso, f.iso), f);
            }
        }
        let total = next;

        let mut image = vec![0u8; total as usize * SECTOR];
        // File data
        for (path, f) in self.all_files() {
            let lsn = file_lsns[&path] as usize;
            image[lsn * SECTOR..lsn * SECTOR + f.content.len()].copy_from_slice(&f.content);
        }

        // Directory trees
        let trees = [(false, root, &dir_lsns)]
            .into_iter()
            .chain(joliet_root.map(|jr| (true, jr, &joliet_dirs)));
        for (joliet, root_lsn, dirs) in trees {
            let mut root_buf = vec![0u8; SECTOR];
            let s = SECTOR as u32;
            let dir_flags = FileFlags::DIRECTORY;
            if self.rock_ridge && !joliet {
                let mut su = susp_entry(b"SP", &[0xbe, 0xef, 0]);
                su.extend(susp_entry(b"RR", &[0x08]));
                add_directory_entry(&mut root_buf, &[0], root_lsn, s, dir_flags, &su).unwrap();
                add_directory_entry(&mut root_buf, &[1], root_lsn, s, dir_flags, &[]).unwrap();
            } else {
                init_directory(&mut root_buf, root_lsn, s, root_lsn, s).unwrap();
            }
            for f in &self.root_files {
                let at = file_lsns[&format!("/{}", f.iso)];
                self.write_file_records(&mut root_buf, f, at, joliet);
            }
            for (d, &lsn) in self.dirs.iter().zip(dirs.iter()) {
                let name = d.identifier(joliet);
                add_directory_entry(&mut root_buf, &name, lsn, s, dir_flags, &[]).unwrap();

                let mut dir_buf = vec![0u8; SECTOR];
                init_directory(&mut dir_buf, lsn, s, root_lsn, s).unwrap();
                for f in &d.files {
                    let at = file_lsns[&format!("/{}/{}", d.iso, f.iso)];
                    self.write_file_records(&mut dir_buf, f, at, joliet);
                }
                image[sector(lsn)].copy_from_slice(&dir_buf);
            }
            image[sector(root_lsn)].copy_from_slice(&root_buf);
        }

        // Path tables
        let path_table = |joliet: bool, root_lsn: u32, dirs: &[u32]| {
            let mut table = PathTable::new();
            table.add_entry(&[0], root_lsn, 1).unwrap();
            for (d, &lsn) in self.dirs.iter().zip(dirs) {
                table.add_entry(&d.identifier(joliet), lsn, 1).unwrap();
            }
            table
        };
        let table = path_table(false, root, &dir_lsns);
        let l = table.encode(PathTableKind::L);
        let m = table.encode(PathTableKind::M);
        image[l_pt as usize * SECTOR..l_pt as usize * SECTOR + l.len()].copy_from_slice(&l);
        image[m_pt as usize * SECTOR..m_pt as usize * SECTOR + m.len()].copy_from_slice(&m);

        // Descriptors
        let mut pvd = VolumeDescriptor::new(
            VolumeDescriptorType::Primary,
            DirectoryRecord::new(&[0], root, SECTOR as u32, FileFlags::DIRECTORY),
        );
        pvd.volume_id
            .copy_from_slice(&pad_and_validate(&self.volume_id, 32, Charset::DChars).unwrap());
        pvd.volume_space_size = total;
        pvd.path_table_size = table.size() as u32;
        pvd.type_l_path_table = l_pt;
        pvd.type_m_path_table = m_pt;
        image[sector(16)].copy_from_slice(&pvd.encode().unwrap());

        if let (Some(level), Some(svd_lsn), Some(jroot), Some((jl, jm))) =
            (self.joliet_level, svd_lsn, joliet_root, joliet_pts)
        {
            let jroot_dir = DirectoryRecord::new(&[0], jroot, SECTOR as u32, FileFlags::DIRECTORY);
            let mut svd = new_joliet(level, jroot_dir);
            let id = encode_ucs2_be(&self.volume_id);
            svd.volume_id[..id.len()].copy_from_slice(&id);
            svd.volume_space_size = total;
            let jtable = path_table(true, jroot, &joliet_dirs);
            svd.path_table_size = jtable.size() as u32;
            svd.type_l_path_table = jl;
            svd.type_m_path_table = jm;
            let l = jtable.encode(PathTableKind::L);
            let m = jtable.encode(PathTableKind::M);
            image[jl as usize * SECTOR..jl as usize * SECTOR + l.len()].copy_from_slice(&l);
            image[jm as usize * SECTOR..jm as usize * SECTOR + m.len()].copy_from_slice(&m);
            image[sector(svd_lsn)].copy_from_slice(&svd.encode().unwrap());
        }

        for (i, raw) in self.extra_descriptors.iter().enumerate() {
            image[sector(extras + i as u32)].copy_from_slice(raw);
        }
        image[sector(terminator)].copy_from_slice(&encode_terminator());

        let mut dirs = HashMap::new();
        for (d, &lsn) in self.dirs.iter().zip(&dir_lsns) {
            dirs.insert(d.iso.clone(), lsn);
        }
        let layout = Layout {
            root,
            svd: svd_lsn,
            joliet_root,
            dirs,
            files: file_lsns,
            l_path_table: l_pt,
            m_path_table: m_pt,
            terminator,
            total_sectors: total,
            data_start: 0,
        };
        (image, layout)
    }

    fn all_files(&self) -> Vec<(String, &FileDef)> {
        let mut out: Vec<(String, &FileDef)> = self
            .root_files
            .iter()
            .map(|f| (format!("/{}", f.iso), f))
            .collect();
        for d in &self.dirs {
            out.extend(d.files.iter().map(|f| (format!("/{}/{}", d.iso, f.iso), f)));
        }
        out
    }

    fn write_file_records(&self, dir: &mut [u8], f: &FileDef, lsn: u32, joliet: bool) {
        let id = if joliet {
            encode_ucs2_be(&format!("{};1", f.joliet))
        } else {
            format!("{};1", f.iso).into_bytes()
        };
        let chunk = f.chunk_sectors.map(|s| s as usize * SECTOR).unwrap_or(usize::MAX);
        let pieces: Vec<&[u8]> = if f.content.is_empty() {
            vec![&f.content[..]]
        } else {
            f.content.chunks(chunk).collect()
        };
        let mut at = lsn;
        for (i, piece) in pieces.iter().enumerate() {
            let flags = if i + 1 < pieces.len() {
                FileFlags::MULTIEXTENT
            } else {
                FileFlags::empty()
            };
            let mut record = DirectoryRecord::new(&id, at, piece.len() as u32, flags);
            record.recording_time = self.recording_time;
            if let (Some(nm), false) = (&f.rr_name, joliet) {
                let mut data = vec![0u8];
                data.extend_from_slice(nm.as_bytes());
                record.system_use = susp_entry(b"NM", &data);
            }
            add_record(dir, &record).unwrap();
            at += piece.len().div_ceil(SECTOR) as u32;
        }
    }

    /// Apply prefix and raw framing; returns the bytes and the per-frame
    /// header length
    fn frame(&self, image: &[u8]) -> (Vec<u8>, usize) {
        let mut out = vec![0x5au8; self.prefix];
        let header = match self.frame_size {
            2352 => 16,
            2336 => 8,
            _ => 0,
        };
        if header == 0 {
            out.extend_from_slice(image);
            return (out, 0);
        }
        for (lsn, sector) in image.chunks(SECTOR).enumerate() {
            let mut frame = vec![0u8; self.frame_size];
            if self.frame_size == 2352 {
                frame[1..11].fill(0xff);
                let abs = lsn + 150;
                frame[12] = to_bcd(abs / (60 * 75));
                frame[13] = to_bcd((abs / 75) % 60);
                frame[14] = to_bcd(abs % 75);
                frame[15] = 1;
            }
            frame[header..header + SECTOR].copy_from_slice(sector);
            out.extend_from_slice(&frame);
        }
        (out, header)
    }
}

fn susp_entry(signature: &[u8; 2], data: &[u8]) -> Vec<u8> {
    let mut out = vec![signature[0], signature[1], (4 + data.len()) as u8, 1];
    out.extend_from_slice(data);
    out
}

fn sector(lsn: u32) -> std::ops::Range<usize> {
    lsn as usize * SECTOR..(lsn as usize + 1) * SECTOR
}

fn to_bcd(v: usize) -> u8 {
    (((v / 10) << 4) | (v % 10)) as u8
}
