use bamdex::{
    BaiIndex, Bin, BinKey, BinningScheme, Chunk, IndexBuilder, IndexError, IndexRecord,
    VirtualOffset,
};
use std::io::Write;
use tempfile::NamedTempFile;

/// Integration tests for BAI index functionality
///
/// These tests validate that the index:
/// - Builds from a coordinate-sorted record stream
/// - Plans region queries that never miss an overlapping record
/// - Loads and saves BAI files byte for byte
/// - Rejects unsorted input and corrupt files

fn vo(raw: u64) -> VirtualOffset {
    VirtualOffset::from_raw(raw)
}

fn record(reference_sequence: u32, start: u64, end: u64, from: u64, to: u64) -> IndexRecord {
    IndexRecord::new(reference_sequence, start, end, vo(from), vo(to))
}

fn covers(chunks: &[Chunk], offset: VirtualOffset) -> bool {
    chunks.iter().any(|c| c.contains(offset))
}

/// Create a minimal BAI file for testing
///
/// This creates a valid BAI file with:
/// - 1 reference sequence
/// - 1 bin (4681) holding one chunk
/// - A two-window linear index
/// - The trailing unplaced read counter
fn create_minimal_bai() -> Vec<u8> {
    let mut data = Vec::new();

    // Magic string "BAI\1"
    data.extend_from_slice(b"BAI\x01");

    // n_ref = 1 (int32)
    data.extend_from_slice(&1i32.to_le_bytes());

    // n_bin = 1 (int32)
    data.extend_from_slice(&1i32.to_le_bytes());

    // bin = 4681 (uint32), n_chunk = 1 (int32)
    data.extend_from_slice(&4681u32.to_le_bytes());
    data.extend_from_slice(&1i32.to_le_bytes());

    // Chunk: 0x1000 .. 0x2000
    data.extend_from_slice(&0x1000u64.to_le_bytes());
    data.extend_from_slice(&0x2000u64.to_le_bytes());

    // n_intv = 2 (int32), then two offsets
    data.extend_from_slice(&2i32.to_le_bytes());
    data.extend_from_slice(&0x1000u64.to_le_bytes());
    data.extend_from_slice(&0x1500u64.to_le_bytes());

    // n_no_coor = 7 (uint64)
    data.extend_from_slice(&7u64.to_le_bytes());

    data
}

#[test]
fn test_bai_load_from_file() {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(&create_minimal_bai())
        .expect("Failed to write BAI data");

    let index = BaiIndex::from_path(file.path()).expect("Failed to load BAI index");

    assert_eq!(index.references().len(), 1);
    assert_eq!(index.unplaced_unmapped(), Some(7));
    let reference = index.reference(0).expect("reference 0 missing");
    assert_eq!(reference.bin_index().len(), 1);
    assert_eq!(reference.linear_index().len(), 2);
}

#[test]
fn test_bai_query_minimal() {
    let data = create_minimal_bai();
    let index = BaiIndex::read(&mut &data[..]).expect("Failed to parse BAI");

    let chunks = index.query(0, 0, 100_000).expect("Query failed");
    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0].start().as_raw(), 0x1000);
    assert_eq!(chunks[0].end().as_raw(), 0x2000);

    // Only bin 4682 holds positions past 16384, and it is absent
    let chunks = index.query(0, 20_000, 20_001).expect("Query failed");
    assert!(chunks.is_empty());
}

#[test]
fn test_bai_bytes_round_trip_exactly() {
    let data = create_minimal_bai();
    let index = BaiIndex::read(&mut &data[..]).expect("Failed to parse BAI");
    assert_eq!(index.to_bytes().expect("encode"), data);
}

#[test]
fn test_write_and_reload_built_index() {
    let index = IndexBuilder::new()
        .with_reference_count(2)
        .build(vec![
            record(0, 100, 200, 0x10000, 0x10040),
            record(0, 16_300, 16_500, 0x10040, 0x10090),
            record(1, 1_000_000, 1_000_150, 0x20000, 0x20070),
        ])
        .expect("build");

    let file = NamedTempFile::new().expect("Failed to create temp file");
    index.write_to_path(file.path()).expect("write");
    let reloaded = BaiIndex::from_path(file.path()).expect("reload");

    assert!(reloaded.same_contents(&index));
    for reference in 0..2 {
        let ours = index.reference(reference).unwrap();
        let theirs = reloaded.reference(reference).unwrap();
        let ours_bins: Vec<u32> = ours.bin_index().bins().iter().map(Bin::bin_number).collect();
        let theirs_bins: Vec<u32> = theirs.bin_index().bins().iter().map(Bin::bin_number).collect();
        assert_eq!(ours_bins, theirs_bins);
        assert_eq!(ours.linear_index().entries(), theirs.linear_index().entries());
    }
}

/// Records (100,200), (150,300) and (1000,1100); query [120,160).
///
/// With 100-base windows the third record sits in its own finest bin, so
/// the plan covers the first two records and nothing else.
#[test]
fn test_three_record_scenario() {
    let scheme = BinningScheme::new(3, 100).unwrap();
    let index = IndexBuilder::with_scheme(scheme)
        .build(vec![
            record(0, 100, 200, 0, 50),
            record(0, 150, 300, 50, 120),
            record(0, 1000, 1100, 120, 160),
        ])
        .expect("build");

    let chunks = index.query(0, 120, 160).expect("query");
    for offset in [0, 49, 50, 119] {
        assert!(covers(&chunks, vo(offset)), "offset {} not covered", offset);
    }
    for offset in [120, 159] {
        assert!(!covers(&chunks, vo(offset)), "offset {} wrongly covered", offset);
    }
}

#[test]
fn test_three_record_scenario_default_scheme_is_sound() {
    let index = IndexBuilder::new()
        .build(vec![
            record(0, 100, 200, 0, 50),
            record(0, 150, 300, 50, 120),
            record(0, 1000, 1100, 120, 160),
        ])
        .expect("build");

    // All three share bin 4681, so the plan may include the third record
    let chunks = index.query(0, 120, 160).expect("query");
    assert!(covers(&chunks, vo(0)));
    assert!(covers(&chunks, vo(50)));
}

#[test]
fn test_decreasing_start_is_unsorted() {
    let result = IndexBuilder::new().build(vec![
        record(0, 200, 300, 0, 50),
        record(0, 150, 250, 50, 120),
    ]);

    match result {
        Err(IndexError::UnsortedInput {
            reference_sequence,
            previous,
            current,
        }) => {
            assert_eq!(reference_sequence, 0);
            assert_eq!(previous, 200);
            assert_eq!(current, 150);
        }
        other => panic!("expected UnsortedInput, got {:?}", other),
    }
}

#[test]
fn test_bin_identity_equality() {
    let key = BinKey::new(0, 4681);
    let a = Bin::with_chunks(key, vec![Chunk::new(vo(0), vo(50)).unwrap()]);
    let b = Bin::with_chunks(key, vec![Chunk::new(vo(70), vo(90)).unwrap()]);

    assert_eq!(a, b);
    assert!(!a.same_contents(&b));
    assert_ne!(a, Bin::new(BinKey::new(1, 4681)));
}

#[test]
fn test_query_rejects_empty_and_oversized_regions() {
    let index = IndexBuilder::new()
        .build(vec![record(0, 100, 200, 10, 50)])
        .expect("build");

    assert!(matches!(
        index.query(0, 500, 500),
        Err(IndexError::InvalidInterval { .. })
    ));
    assert!(matches!(
        index.query(0, 0, 600_000_000),
        Err(IndexError::OutOfRange { .. })
    ));
}

#[test]
fn test_corrupt_files_are_rejected() {
    let data = create_minimal_bai();

    // Truncated inside the linear index
    let result = BaiIndex::read(&mut &data[..data.len() - 12]);
    assert!(matches!(result, Err(IndexError::MalformedIndex(_))));

    // Negative reference count
    let mut bad = data.clone();
    bad[4..8].copy_from_slice(&(-3i32).to_le_bytes());
    assert!(matches!(
        BaiIndex::read(&mut &bad[..]),
        Err(IndexError::MalformedIndex(_))
    ));

    // Chunk end before begin
    let mut bad = data.clone();
    bad[28..36].copy_from_slice(&0x0800u64.to_le_bytes());
    assert!(matches!(
        BaiIndex::read(&mut &bad[..]),
        Err(IndexError::MalformedIndex(_))
    ));
}

#[test]
fn test_metadata_pseudo_bin_is_rejected() {
    let mut data = create_minimal_bai();
    // bin number sits right after magic, n_ref and n_bin
    data[12..16].copy_from_slice(&37450u32.to_le_bytes());

    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(&data).expect("Failed to write BAI data");

    match BaiIndex::from_path(file.path()) {
        Err(IndexError::MalformedIndex(msg)) => assert!(msg.contains("37450")),
        other => panic!("expected MalformedIndex, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_missing_file() {
    let result = BaiIndex::from_path("tests/data/does_not_exist.bai");
    assert!(matches!(result, Err(IndexError::Io(_))));
}
