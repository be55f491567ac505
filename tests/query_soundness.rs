use bamdex::{BaiIndex, BinningScheme, IndexBuilder, IndexRecord, VirtualOffset};
use proptest::prelude::*;

/// Sorted records for `reference_count` references, laid out back to back
/// in a fake BGZF stream so offsets grow with (reference, start).
fn layout(
    scheme: BinningScheme,
    per_reference: &[Vec<(u64, u64, u16)>],
) -> Vec<IndexRecord> {
    let mut records = Vec::new();
    let mut cursor = 0x10000u64;

    for (reference_sequence, spans) in per_reference.iter().enumerate() {
        let mut spans = spans.clone();
        spans.sort_by_key(|&(start, _, _)| start);
        for (start, len, size) in spans {
            let end = (start + len).min(scheme.max_span());
            let from = cursor;
            cursor += u64::from(size);
            records.push(IndexRecord::new(
                reference_sequence as u32,
                start,
                end,
                VirtualOffset::from_raw(from),
                VirtualOffset::from_raw(cursor),
            ));
        }
    }

    records
}

fn small_scheme() -> BinningScheme {
    BinningScheme::new(4, 64).expect("valid scheme")
}

fn spans() -> impl Strategy<Value = Vec<Vec<(u64, u64, u16)>>> {
    let max_start = small_scheme().max_span() - 1;
    proptest::collection::vec(
        proptest::collection::vec((0..max_start, 1u64..2_000, 1u16..400), 0..40),
        1..4,
    )
}

proptest! {
    #[test]
    fn plans_cover_every_overlapping_record(
        per_reference in spans(),
        queries in proptest::collection::vec((0u64..32_000, 1u64..5_000), 1..20),
    ) {
        let scheme = small_scheme();
        let records = layout(scheme, &per_reference);
        let index = IndexBuilder::with_scheme(scheme)
            .build(records.clone())
            .expect("sorted input builds");

        for reference_sequence in 0..per_reference.len() as u32 {
            for &(start, len) in &queries {
                let end = (start + len).min(scheme.max_span());
                let chunks = index.query(reference_sequence, start, end).expect("valid query");

                for window in chunks.windows(2) {
                    prop_assert!(window[0].end() < window[1].start(), "plan must be coalesced");
                }

                for record in records.iter().filter(|r| {
                    r.reference_sequence == reference_sequence && r.start < end && r.end > start
                }) {
                    prop_assert!(
                        chunks.iter().any(|c| c.contains(record.start_offset)),
                        "record {}-{} missed by query {}-{}",
                        record.start,
                        record.end,
                        start,
                        end
                    );
                }
            }
        }
    }

    #[test]
    fn parallel_build_matches_streaming_build(per_reference in spans(), threads in 1usize..4) {
        let scheme = small_scheme();
        let records = layout(scheme, &per_reference);

        let streamed = IndexBuilder::with_scheme(scheme)
            .with_reference_count(per_reference.len())
            .build(records.clone())
            .expect("streaming build");

        let mut grouped = vec![Vec::new(); per_reference.len()];
        for record in records {
            grouped[record.reference_sequence as usize].push(record);
        }
        let parallel = IndexBuilder::with_scheme(scheme)
            .with_threads(threads)
            .build_parallel(grouped)
            .expect("parallel build");

        prop_assert!(parallel.same_contents(&streamed));
    }

    #[test]
    fn built_index_survives_serialization(per_reference in spans()) {
        let scheme = small_scheme();
        let mut builder = IndexBuilder::with_scheme(scheme).with_reference_count(per_reference.len());
        for record in layout(scheme, &per_reference) {
            builder.push(record).expect("sorted input");
        }
        builder.add_unplaced_unmapped(per_reference.len() as u64);
        let index = builder.finish().expect("build");

        let bytes = index.to_bytes().expect("encode");
        let parsed = BaiIndex::read_with_scheme(&mut &bytes[..], scheme).expect("decode");

        prop_assert!(parsed.same_contents(&index));
        prop_assert_eq!(parsed.to_bytes().expect("re-encode"), bytes);
    }
}
