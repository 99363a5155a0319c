#![cfg(feature = "savefile")]

use readmap::FmIndex;
use std::collections::HashSet;
use std::io::Write;

fn hits(index: &FmIndex, pattern: &[u8], max_edits: usize) -> HashSet<(usize, String)> {
    index
        .approx_matches(pattern, max_edits)
        .map(|hit| (hit.position, hit.cigar.to_string()))
        .collect()
}

#[test]
fn persisted_genome_indexes_round_trip() {
    let references = [b"acgtacgt".as_slice(), b"ttgacatt"];
    let indexes: Vec<FmIndex> = FmIndex::build_many(references).unwrap();

    let directory = tempfile::tempdir().unwrap();
    let path = directory.path().join("genome.fa.dat");

    FmIndex::save_many_to_file(&indexes, &path).unwrap();
    let loaded: Vec<FmIndex> = FmIndex::load_many_from_file(&path).unwrap();

    assert_eq!(loaded.len(), indexes.len());

    for (reference, (original, restored)) in references.iter().zip(indexes.iter().zip(&loaded)) {
        assert_eq!(original.text_len(), restored.text_len());
        assert_eq!(
            original.alphabet().io_symbols(),
            restored.alphabet().io_symbols()
        );

        for pattern in [b"acg".as_slice(), b"tt", b"gac"] {
            assert_eq!(
                hits(original, pattern, 1),
                hits(restored, pattern, 1),
                "diverging hits for {:?} in {:?}",
                String::from_utf8_lossy(pattern),
                String::from_utf8_lossy(reference)
            );
        }
    }
}

#[test]
fn single_index_round_trips_through_a_writer() {
    let index: FmIndex = FmIndex::new(b"mississippi").unwrap();

    let mut buffer = Vec::new();
    index.save_to_writer(&mut buffer).unwrap();

    let restored = FmIndex::<i32>::load_from_reader(&mut buffer.as_slice()).unwrap();

    assert_eq!(hits(&index, b"iss", 0), hits(&restored, b"iss", 0));
}

#[test]
fn garbage_index_files_fail_to_load() {
    let directory = tempfile::tempdir().unwrap();
    let path = directory.path().join("genome.fa.dat");

    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(b"this is not an index").unwrap();
    drop(file);

    assert!(FmIndex::<i32>::load_many_from_file(&path).is_err());
}
