//! Corruption and crash simulation tests
//!
//! These tests damage files on disk and check how the store reports it:
//! - Bad magic is rejected before anything else is read
//! - A short last record is reported as truncated by every reader
//! - `read_all` never hands back a partial list
//! - Interrupted appends in either order are visible to `verify`

use pktfile_format::{CodecError, Endian, Header, Packet, HEADER_SIZE, PACKET_PREFIX_SIZE};
use pktfile_store::{AppendOrder, FileStore, StoreConfig, StoreError};
use std::fs::OpenOptions;
use std::io::{Seek, SeekFrom, Write};
use std::path::Path;
use tempfile::TempDir;

fn write_file(path: &Path, packets: &[Packet]) {
    let mut store = FileStore::create(path).unwrap();
    for packet in packets {
        store.append(packet).unwrap();
    }
    store.close().unwrap();
}

fn three_packets() -> Vec<Packet> {
    vec![
        Packet::with_data(1, 10, vec![0xAA; 5]),
        Packet::with_data(2, 20, vec![0xBB; 6]),
        Packet::with_data(3, 30, vec![0xCC; 7]),
    ]
}

fn shrink(path: &Path, by: u64) {
    let file = OpenOptions::new().write(true).open(path).unwrap();
    let len = file.metadata().unwrap().len();
    file.set_len(len - by).unwrap();
}

fn patch(path: &Path, offset: u64, bytes: &[u8]) {
    let mut file = OpenOptions::new().write(true).open(path).unwrap();
    file.seek(SeekFrom::Start(offset)).unwrap();
    file.write_all(bytes).unwrap();
    file.sync_all().unwrap();
}

#[test]
fn test_bad_magic_rejected_everywhere() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("magic.pkt");
    write_file(&path, &three_packets());
    patch(&path, 0, b"JUNK");

    let mut store = FileStore::open(&path).unwrap();
    assert!(store.read_header().unwrap_err().is_bad_magic());
    assert!(store.read_at(0).unwrap_err().is_bad_magic());
    assert!(store.read_all().unwrap_err().is_bad_magic());
    assert!(store
        .append(&Packet::new(1).unwrap())
        .unwrap_err()
        .is_bad_magic());
    assert!(store.verify().unwrap_err().is_bad_magic());
}

#[test]
fn test_bad_magic_regardless_of_other_fields() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("fields.pkt");

    for count in [0u32, 1, u32::MAX] {
        let mut header = Header::new();
        header.count = count;
        let mut bytes = header.to_bytes();
        bytes[3] = 0x01; // "PKT\x01"
        std::fs::write(&path, bytes).unwrap();

        let mut store = FileStore::open(&path).unwrap();
        let err = store.read_header().unwrap_err();
        assert!(matches!(
            err,
            StoreError::Codec(CodecError::BadMagic { found: 0x504B_5401 })
        ));
    }
}

#[test]
fn test_truncated_last_packet() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("trunc.pkt");
    write_file(&path, &three_packets());
    shrink(&path, 2);

    let mut store = FileStore::open(&path).unwrap();
    assert_eq!(store.read_at(0).unwrap(), three_packets()[0]);
    assert_eq!(store.read_at(1).unwrap(), three_packets()[1]);

    let err = store.read_at(2).unwrap_err();
    assert!(matches!(
        err,
        StoreError::Codec(CodecError::Truncated {
            index: Some(2),
            expected: 7,
            actual: 5
        })
    ));

    let err = store.read_all().unwrap_err();
    assert!(err.is_truncated());
}

#[test]
fn test_truncated_inside_prefix() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("prefix.pkt");
    write_file(&path, &three_packets());
    // Leave 4 bytes of the last prefix
    shrink(&path, 7 + PACKET_PREFIX_SIZE as u64 - 4);

    let mut store = FileStore::open(&path).unwrap();
    let err = store.read_at(2).unwrap_err();
    assert!(matches!(
        err,
        StoreError::Codec(CodecError::Truncated {
            index: Some(2),
            expected: 14,
            actual: 4
        })
    ));
    assert!(store.read_all().unwrap_err().is_truncated());
}

#[test]
fn test_corrupt_length_in_middle_record() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("length.pkt");
    write_file(&path, &three_packets());

    // Length field of packet 1 sits after header + packet 0 + type + timestamp
    let offset = HEADER_SIZE as u64 + (PACKET_PREFIX_SIZE as u64 + 5) + 10;
    patch(&path, offset, &Endian::native().normalize32(u32::MAX).to_ne_bytes());

    let mut store = FileStore::open(&path).unwrap();
    assert_eq!(store.read_at(0).unwrap(), three_packets()[0]);

    // Reaching packet 2 has to walk past the damaged length
    let err = store.read_at(2).unwrap_err();
    assert!(matches!(
        err,
        StoreError::Codec(CodecError::Truncated { index: Some(1), .. })
    ));
    assert!(store.read_all().unwrap_err().is_truncated());
}

#[test]
fn test_corrupt_length_rejected_by_bound() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("bound.pkt");
    write_file(&path, &three_packets());

    let offset = HEADER_SIZE as u64 + 10;
    patch(&path, offset, &Endian::native().normalize32(1 << 30).to_ne_bytes());

    let config = StoreConfig::new().with_max_packet_len(1024);
    let mut store = FileStore::open_with_config(&path, config).unwrap();
    let err = store.read_at(0).unwrap_err();
    assert!(matches!(
        err,
        StoreError::Codec(CodecError::PacketTooLarge { max: 1024, .. })
    ));
}

#[test]
fn test_header_first_crash_overstates_count() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("hf.pkt");
    let packets = three_packets();
    write_file(&path, &packets);

    // Header rewritten with count 4, packet bytes never landed
    let mut header = Header::new();
    header.count = 4;
    patch(&path, 0, &header.to_bytes());

    let mut store = FileStore::open(&path).unwrap();
    for (i, packet) in packets.iter().enumerate() {
        assert_eq!(&store.read_at(i as u64).unwrap(), packet);
    }
    let err = store.read_at(3).unwrap_err();
    assert!(matches!(
        err,
        StoreError::Codec(CodecError::Truncated {
            index: Some(3),
            actual: 0,
            ..
        })
    ));
    assert!(store.read_all().unwrap_err().is_truncated());

    let report = store.verify().unwrap();
    assert_eq!(report.count, 4);
    assert_eq!(report.records_found, 3);
    assert_eq!(report.missing_records(), 1);
    assert_eq!(report.trailing_bytes(), 0);
    assert!(!report.is_consistent());
}

#[test]
fn test_packet_first_crash_leaves_orphan() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("pf.pkt");
    let packets = three_packets();
    write_file(&path, &packets[..2]);

    // Packet bytes landed, header count never bumped
    let image = packets[2].encode(Endian::native()).unwrap();
    let mut file = OpenOptions::new().append(true).open(&path).unwrap();
    file.write_all(&image).unwrap();
    drop(file);

    let config = StoreConfig::new().with_append_order(AppendOrder::PacketFirst);
    let mut store = FileStore::open_with_config(&path, config).unwrap();
    assert_eq!(store.read_all().unwrap(), packets[..2].to_vec());
    assert!(store.read_at(2).unwrap_err().is_not_found());

    let report = store.verify().unwrap();
    assert_eq!(report.count, 2);
    assert_eq!(report.records_found, 3);
    assert_eq!(report.orphaned_records(), 1);
    assert!(!report.is_consistent());
}

#[test]
fn test_packet_first_append_replaces_orphan() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("pf_next.pkt");
    let config = StoreConfig::new().with_append_order(AppendOrder::PacketFirst);

    let first = Packet::with_data(1, 1, vec![1]);
    let mut store = FileStore::create_with_config(&path, config.clone()).unwrap();
    store.append(&first).unwrap();
    store.close().unwrap();

    let orphan = Packet::with_data(9, 9, vec![9, 9]);
    let mut file = OpenOptions::new().append(true).open(&path).unwrap();
    file.write_all(&orphan.encode(Endian::native()).unwrap()).unwrap();
    drop(file);

    let next = Packet::with_data(2, 2, vec![2, 2, 2]);
    let mut store = FileStore::open_with_config(&path, config).unwrap();
    let index = store.append(&next).unwrap();
    assert_eq!(index, 1);
    assert_eq!(store.read_at(index).unwrap(), next);
    assert_eq!(store.read_all().unwrap(), vec![first.clone(), next.clone()]);

    let report = store.verify().unwrap();
    assert!(report.is_consistent(), "{:?}", report);
    assert_eq!(
        std::fs::metadata(&path).unwrap().len(),
        HEADER_SIZE as u64 + first.encoded_len() + next.encoded_len()
    );
}

#[test]
fn test_strict_append_drops_partial_tail_with_index() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("strict.pkt");
    let packets = three_packets();

    let mut store = FileStore::create_with_config(&path, StoreConfig::strict()).unwrap();
    store.append(&packets[0]).unwrap();
    store.append(&packets[1]).unwrap();

    // Half a record lands behind the open store's back
    let image = packets[2].encode(Endian::native()).unwrap();
    let mut file = OpenOptions::new().append(true).open(&path).unwrap();
    file.write_all(&image[..PACKET_PREFIX_SIZE + 2]).unwrap();
    drop(file);

    let index = store.append(&packets[2]).unwrap();
    assert_eq!(index, 2);
    assert_eq!(store.read_at(2).unwrap(), packets[2]);
    assert_eq!(store.read_all().unwrap(), packets);
    assert_eq!(store.verify().unwrap().trailing_bytes(), 0);
}

#[test]
fn test_packet_first_append_refuses_overstated_count() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("pf_over.pkt");
    write_file(&path, &three_packets());

    let mut header = Header::new();
    header.count = 4;
    patch(&path, 0, &header.to_bytes());
    let len_before = std::fs::metadata(&path).unwrap().len();

    let config = StoreConfig::new().with_append_order(AppendOrder::PacketFirst);
    let mut store = FileStore::open_with_config(&path, config).unwrap();
    let err = store.append(&Packet::with_data(4, 4, vec![4])).unwrap_err();
    assert!(err.is_truncated());
    assert_eq!(store.len().unwrap(), 4);
    assert_eq!(std::fs::metadata(&path).unwrap().len(), len_before);
}

#[test]
fn test_partial_tail_reported_as_trailing_bytes() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("tail.pkt");
    write_file(&path, &three_packets());

    let mut file = OpenOptions::new().append(true).open(&path).unwrap();
    file.write_all(&[0xFF; 9]).unwrap();
    drop(file);

    let mut store = FileStore::open(&path).unwrap();
    assert_eq!(store.read_all().unwrap(), three_packets());

    let report = store.verify().unwrap();
    assert_eq!(report.records_found, 3);
    assert_eq!(report.trailing_bytes(), 9);
}

#[test]
fn test_empty_file_has_no_header() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("empty.pkt");
    std::fs::write(&path, b"").unwrap();

    let mut store = FileStore::open(&path).unwrap();
    let err = store.read_all().unwrap_err();
    assert!(matches!(
        err,
        StoreError::Codec(CodecError::HeaderTooShort { actual: 0 })
    ));
}
