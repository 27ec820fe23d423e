//! Directory record parsing and navigation

pub mod builder;
pub mod flags;
pub mod iterator;
pub mod path_table;
pub mod record;

use alloc::collections::{BTreeSet, VecDeque};
use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;
use gpt_disk_io::BlockIo;

use crate::error::{FormatError, Iso9660Error, Result};
use crate::file::extent::Extent;
use crate::source::SectorSource;
use crate::types::{Stat, VolumeInfo, MAX_PATH_LENGTH};
use iterator::{read_dir_entries, stat_from_record, ListOptions};

/// Entry describing the root directory
pub fn root_stat(volume: &VolumeInfo, opts: &ListOptions) -> Stat {
    let mut root = stat_from_record(volume.root(), opts);
    root.name = String::from("/");
    root
}

/// Extent of a directory entry
fn dir_extent(entry: &Stat) -> Result<Extent> {
    if !entry.is_directory() {
        return Err(Iso9660Error::NotADirectory);
    }
    entry.extents.first().copied().ok_or(Iso9660Error::NotADirectory)
}

/// List a directory entry's contents
pub fn list<B: BlockIo>(
    source: &mut SectorSource<B>,
    dir: &Stat,
    opts: &ListOptions,
) -> Result<Vec<Stat>> {
    let extent = dir_extent(dir)?;
    read_dir_entries(source, extent.lsn, extent.size, opts)
}

/// Find a file or directory by path
///
/// Navigates the directory tree from root. With `translate`, components are
/// matched against display names (version dropped, lowercased on plain
/// ISO9660); otherwise against on-disk identifiers such as `A.TXT;1`.
/// Both comparisons ignore ASCII case. `/` and the empty path give the root.
///
/// # Example
/// ```ignore
/// let file = directory::stat(&mut source, &volume, &opts, "/boot/vmlinuz", true)?;
/// println!("File size: {} bytes", file.size);
/// ```
pub fn stat<B: BlockIo>(
    source: &mut SectorSource<B>,
    volume: &VolumeInfo,
    opts: &ListOptions,
    path: &str,
    translate: bool,
) -> Result<Stat> {
    if path.len() > MAX_PATH_LENGTH {
        return Err(FormatError::PathTooLong.into());
    }

    let mut current = root_stat(volume, opts);
    for component in path.split('/').filter(|c| !c.is_empty()) {
        let entries = list(source, &current, opts)?;
        current = entries
            .into_iter()
            .find(|entry| {
                let candidate = if translate { &entry.name } else { &entry.raw_name };
                candidate.eq_ignore_ascii_case(component)
            })
            .ok_or(Iso9660Error::NotFound)?;
    }
    tracing::trace!(path, lsn = current.lsn, "resolved");
    Ok(current)
}

/// Find the entry whose data covers `lsn`, with its full path
///
/// Breadth-first from the root, which is checked first. Each directory
/// extent is visited once.
pub fn find_by_lsn_with_path<B: BlockIo>(
    source: &mut SectorSource<B>,
    volume: &VolumeInfo,
    opts: &ListOptions,
    lsn: u32,
) -> Result<(String, Stat)> {
    let root = root_stat(volume, opts);
    if root.contains_lsn(lsn) {
        return Ok((String::from("/"), root));
    }

    let opts = ListOptions {
        include_dot_entries: false,
        ..*opts
    };
    let mut visited = BTreeSet::new();
    let mut queue = VecDeque::new();
    visited.insert(root.lsn);
    queue.push_back((String::new(), root));

    while let Some((path, dir)) = queue.pop_front() {
        for entry in list(source, &dir, &opts)? {
            let entry_path = format!("{path}/{}", entry.name);
            if entry.contains_lsn(lsn) {
                tracing::debug!(lsn, path = %entry_path, "sector owner found");
                return Ok((entry_path, entry));
            }
            if entry.is_directory() && visited.insert(entry.lsn) {
                queue.push_back((entry_path, entry));
            }
        }
    }
    Err(Iso9660Error::NotFound)
}

/// Find the entry whose data covers `lsn`
pub fn find_by_lsn<B: BlockIo>(
    source: &mut SectorSource<B>,
    volume: &VolumeInfo,
    opts: &ListOptions,
    lsn: u32,
) -> Result<Stat> {
    find_by_lsn_with_path(source, volume, opts, lsn).map(|(_, entry)| entry)
}
