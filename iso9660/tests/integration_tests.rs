//! End-to-end tests over complete synthetic images

mod common;

use common::{IsoBuilder, MemoryBlockDevice};
use iso9660::directory::iterator::{parse_directory, read_dir_entries, ListOptions};
use iso9660::directory::path_table::PathTable;
use iso9660::error::FormatError;
use iso9660::{
    add_directory_entry, init_directory, EndianPolicy, ExtensionMask, FileFlags, FileKind,
    Filesystem, MountOptions, SectorSource,
};
use tracing_test::traced_test;

#[test]
fn test_end_to_end_scenario() {
    let device = IsoBuilder::new()
        .file("A.TXT", &[0x41; 100])
        .dir("SUB")
        .build();
    let mut fs = Filesystem::mount(device, MountOptions::default()).unwrap();

    let a = fs.stat("/A.TXT", true).unwrap();
    assert_eq!(a.kind, FileKind::File);
    assert_eq!(a.size, 100);

    let root = fs.stat("/", true).unwrap();
    let names: Vec<String> = fs
        .read_dir_entries(root.lsn, root.size as u32)
        .unwrap()
        .into_iter()
        .map(|e| e.name)
        .collect();
    assert_eq!(names, ["a.txt", "sub"]);
}

#[test]
fn test_authored_directory_round_trip() {
    let mut dir = vec![0u8; 4 * 2048];
    let n = dir.len() as u32;
    init_directory(&mut dir, 30, n, 30, n).unwrap();

    let files: Vec<(String, u32, u32)> = (0..120)
        .map(|i| (format!("F{i:03}_LONG_NAME.BIN;1"), 100 + i, i * 10))
        .collect();
    for (name, lsn, size) in &files {
        let flags = FileFlags::empty();
        let at = add_directory_entry(&mut dir, name.as_bytes(), *lsn, *size, flags, &[]).unwrap();
        let len = dir[at] as usize;
        assert_eq!(at / 2048, (at + len - 1) / 2048, "{name} straddles a sector");
    }

    // Read back through a device as well as from the buffer
    let mut image = vec![0u8; 30 * 2048];
    image.extend_from_slice(&dir);
    let mut source = SectorSource::new(MemoryBlockDevice::new(image));
    let from_device = read_dir_entries(&mut source, 30, n, &ListOptions::default()).unwrap();
    let from_buffer = parse_directory(&dir, &ListOptions::default()).unwrap();
    assert_eq!(from_device, from_buffer);

    assert_eq!(from_buffer.len(), files.len());
    for (entry, (name, lsn, size)) in from_buffer.iter().zip(&files) {
        assert_eq!(&entry.raw_name, name);
        assert_eq!(entry.lsn, *lsn);
        assert_eq!(entry.size, *size as u64);
    }
}

#[test]
fn test_path_table_parent_ordering() {
    let mut table = PathTable::new();
    table.add_entry(&[0], 20, 1).unwrap();
    table.add_entry(b"A", 21, 1).unwrap();
    table.add_entry(b"B", 22, 1).unwrap();
    table.add_entry(b"A1", 23, 2).unwrap();
    let index = table.add_entry(b"B1", 24, 3).unwrap();
    assert_eq!(index, 5);
    assert_eq!(
        table.add_entry(b"X", 25, 7).unwrap_err().format(),
        Some(FormatError::RecordOrderingViolation)
    );
}

#[test]
fn test_joliet_names() {
    let device = IsoBuilder::new()
        .joliet(3)
        .file_with_joliet("LONGFI~1.TXT", "Long File Name.txt", b"joliet")
        .dir("DOCS")
        .file_in("DOCS", "NOTE.TXT", b"note")
        .build();
    let mut fs = Filesystem::mount(device, MountOptions::default()).unwrap();
    assert_eq!(fs.joliet_level(), 3);

    let names: Vec<String> = fs.readdir("/").unwrap().into_iter().map(|e| e.name).collect();
    assert_eq!(names, ["Long File Name.txt", "DOCS"]);

    let file = fs.stat("/long file name.txt", true).unwrap();
    assert_eq!(fs.read_file(&file).unwrap(), b"joliet");
    assert_eq!(fs.stat("/DOCS/NOTE.TXT", true).unwrap().size, 4);

    // Without Joliet the primary tree is walked
    let device = IsoBuilder::new()
        .joliet(3)
        .file_with_joliet("LONGFI~1.TXT", "Long File Name.txt", b"joliet")
        .build();
    let options = MountOptions::default().with_extensions(ExtensionMask::empty());
    let mut fs = Filesystem::mount(device, options).unwrap();
    let names: Vec<String> = fs.readdir("/").unwrap().into_iter().map(|e| e.name).collect();
    assert_eq!(names, ["longfi~1.txt"]);
}

#[test]
fn test_rock_ridge_names() {
    let build = || {
        IsoBuilder::new()
            .file_with_rock_ridge("MAKEFILE.LIN", "Makefile.linux", b"all:")
            .build()
    };

    let mut fs = Filesystem::mount(build(), MountOptions::default()).unwrap();
    assert!(fs.has_rock_ridge());
    let entries = fs.readdir("/").unwrap();
    assert_eq!(entries[0].name, "Makefile.linux");
    assert_eq!(fs.stat("/Makefile.linux", true).unwrap().size, 4);

    let options = MountOptions::default().with_extensions(ExtensionMask::JOLIET);
    let fs = Filesystem::mount(build(), options).unwrap();
    assert!(!fs.has_rock_ridge());
}

#[test]
#[traced_test]
fn test_lenient_mismatch_is_logged() {
    let (mut image, layout) = IsoBuilder::new().file("A.TXT", b"abc").logical_image();
    let be = 16 * 2048 + 84;
    image[be..be + 4].copy_from_slice(&(layout.total_sectors * 2).to_be_bytes());

    let options = MountOptions::default().with_endian(EndianPolicy::Lenient);
    let mut fs = Filesystem::mount(MemoryBlockDevice::new(image), options).unwrap();
    assert_eq!(fs.stat("/A.TXT", true).unwrap().size, 3);
    assert!(logs_contain("both-endian field mismatch"));
}

#[test]
#[traced_test]
fn test_bad_timestamp_degrades_to_none() {
    let device = IsoBuilder::new()
        .recording_time([124, 13, 45, 0, 0, 0, 0])
        .file("BAD.TXT", b"x")
        .build();
    let mut fs = Filesystem::mount(device, MountOptions::default()).unwrap();
    let file = fs.stat("/BAD.TXT", true).unwrap();
    assert!(file.timestamp.is_none());
    assert!(logs_contain("recording time ignored"));
}

#[test]
#[traced_test]
fn test_fuzzy_scan_logs_framing() {
    let device = IsoBuilder::new().prefix(24).build();
    let fs = Filesystem::open_fuzzy(device, MountOptions::default(), 20).unwrap();
    assert_eq!(fs.data_start_offset(), 24);
    assert!(logs_contain("fuzzy scan located volume"));
}
