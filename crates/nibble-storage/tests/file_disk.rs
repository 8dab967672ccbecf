use nibble_storage::{ByteStorage, DiskError, FileDisk};

#[test]
fn creates_zero_filled_file_of_full_capacity() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("disk.bin");

    let mut disk = FileDisk::open_or_create(&path, 4096).unwrap();
    assert_eq!(std::fs::metadata(&path).unwrap().len(), 4096);
    assert_eq!(disk.capacity(), 4096);
    assert_eq!(disk.path(), path.as_path());

    for addr in [0u64, 1, 2047, 4095] {
        assert_eq!(disk.read_u8(addr).unwrap(), 0);
    }
}

#[test]
fn writes_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("disk.bin");

    {
        let mut disk = FileDisk::open_or_create(&path, 1024).unwrap();
        disk.write_u8(0, 0x11).unwrap();
        disk.write_u8(1023, 0xEE).unwrap();
        assert_eq!(disk.read_u8(1023).unwrap(), 0xEE);
    }

    let mut disk = FileDisk::open_or_create(&path, 1024).unwrap();
    assert_eq!(disk.read_u8(0).unwrap(), 0x11);
    assert_eq!(disk.read_u8(1023).unwrap(), 0xEE);
    assert_eq!(disk.read_u8(512).unwrap(), 0);
}

#[test]
fn write_is_visible_to_an_independent_handle_immediately() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("disk.bin");

    let mut writer = FileDisk::open_or_create(&path, 256).unwrap();
    writer.write_u8(42, 0x5A).unwrap();

    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(bytes[42], 0x5A);
}

#[test]
fn existing_file_is_reused_and_short_files_are_extended() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("disk.bin");
    std::fs::write(&path, b"abcd").unwrap();

    let mut disk = FileDisk::open_or_create(&path, 64).unwrap();
    assert_eq!(disk.read_u8(0).unwrap(), b'a');
    assert_eq!(disk.read_u8(3).unwrap(), b'd');
    assert_eq!(disk.read_u8(4).unwrap(), 0);
    assert_eq!(disk.read_u8(63).unwrap(), 0);
    assert_eq!(std::fs::metadata(&path).unwrap().len(), 64);
}

#[test]
fn out_of_bounds_access_is_rejected_without_growing_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("disk.bin");
    let mut disk = FileDisk::open_or_create(&path, 128).unwrap();

    let err = disk.write_u8(128, 1).unwrap_err();
    assert!(matches!(
        err,
        DiskError::OutOfBounds {
            addr: 128,
            capacity: 128
        }
    ));
    assert!(matches!(
        disk.read_u8(u64::MAX),
        Err(DiskError::OutOfBounds { .. })
    ));
    assert_eq!(std::fs::metadata(&path).unwrap().len(), 128);
}

#[test]
fn unopenable_path_is_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing-dir").join("disk.bin");

    let err = FileDisk::open_or_create(&path, 64).unwrap_err();
    match err {
        DiskError::Unavailable { path: p, .. } => assert_eq!(p, path),
        other => panic!("expected Unavailable, got {other:?}"),
    }
}

#[test]
fn zero_capacity_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let err = FileDisk::open_or_create(dir.path().join("d.bin"), 0).unwrap_err();
    assert!(matches!(err, DiskError::InvalidConfig(_)));
}
