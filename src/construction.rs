use num_traits::NumCast;

use crate::IndexStorage;
use crate::occurrence_table::OccurrenceTable;

pub(crate) struct DataStructures<I> {
    pub(crate) count: Vec<usize>,
    pub(crate) suffix_array: Vec<I>,
    pub(crate) occurrences: OccurrenceTable<I>,
}

pub(crate) fn create_data_structures<I: IndexStorage>(
    dense_text: &[u8],
    alphabet_size: usize,
) -> DataStructures<I> {
    let suffix_array = sort_suffixes(dense_text, alphabet_size);
    let bwt = bwt_from_suffix_array(&suffix_array, dense_text);

    DataStructures {
        count: count_table(dense_text, alphabet_size),
        occurrences: OccurrenceTable::construct(&bwt, alphabet_size),
        suffix_array,
    }
}

// LSD radix sort over the suffixes of the sentinel-terminated text: one
// stable counting sort per position, from the last position to the first.
// Out-of-range positions fall into the sentinel bucket, which sorts first.
pub(crate) fn sort_suffixes<I: IndexStorage>(dense_text: &[u8], alphabet_size: usize) -> Vec<I> {
    let n = dense_text.len();

    let mut order: Vec<I> = (0..n)
        .map(|start| {
            <I as NumCast>::from(start).expect("text length should fit into the index storage type")
        })
        .collect();
    let mut sorted_order = vec![I::zero(); n];
    let mut bucket_offsets = vec![0usize; alphabet_size];

    for position in (0..n).rev() {
        bucket_offsets.fill(0);

        for &start in &order {
            bucket_offsets[key_at(dense_text, to_usize(start) + position)] += 1;
        }

        let mut offset = 0;
        for bucket_offset in bucket_offsets.iter_mut() {
            let bucket_len = *bucket_offset;
            *bucket_offset = offset;
            offset += bucket_len;
        }

        for &start in &order {
            let bucket = &mut bucket_offsets[key_at(dense_text, to_usize(start) + position)];
            sorted_order[*bucket] = start;
            *bucket += 1;
        }

        std::mem::swap(&mut order, &mut sorted_order);
    }

    order
}

fn key_at(dense_text: &[u8], idx: usize) -> usize {
    if idx < dense_text.len() {
        dense_text[idx] as usize
    } else {
        0
    }
}

pub(crate) fn bwt_from_suffix_array<I: IndexStorage>(
    suffix_array: &[I],
    dense_text: &[u8],
) -> Vec<u8> {
    suffix_array
        .iter()
        .map(|&start| {
            let start = to_usize(start);
            let start = if start > 0 { start } else { dense_text.len() };

            dense_text[start - 1]
        })
        .collect()
}

// count[c] is the number of text symbols with a dense rank smaller than c,
// equivalently the first suffix array row whose suffix begins with c. The
// extra entry at the end makes count[c + 1] - count[c] the frequency of c.
pub(crate) fn count_table(dense_text: &[u8], alphabet_size: usize) -> Vec<usize> {
    let mut count = vec![0; alphabet_size + 1];

    for &symbol in dense_text {
        count[symbol as usize + 1] += 1;
    }

    for i in 1..count.len() {
        count[i] += count[i - 1];
    }

    count
}

fn to_usize<I: IndexStorage>(value: I) -> usize {
    <usize as NumCast>::from(value).expect("suffix array entries should fit into usize")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alphabet::Alphabet;
    use proptest::prelude::*;

    fn dense(text: &[u8]) -> (Vec<u8>, usize) {
        let alphabet = Alphabet::from_text(text);
        (alphabet.encode_text_with_sentinel(text), alphabet.size())
    }

    fn naive_suffix_order(dense_text: &[u8]) -> Vec<i32> {
        let mut order: Vec<i32> = (0..dense_text.len() as i32).collect();
        order.sort_by_key(|&start| &dense_text[start as usize..]);

        order
    }

    #[test]
    fn suffixes_of_mississippi_are_sorted() {
        let (dense_text, alphabet_size) = dense(b"mississippi");

        let suffix_array: Vec<i32> = sort_suffixes(&dense_text, alphabet_size);

        assert_eq!(suffix_array, naive_suffix_order(&dense_text));
        assert_eq!(suffix_array[0], dense_text.len() as i32 - 1);
    }

    #[test]
    fn bwt_of_mississippi() {
        let text = b"mississippi";
        let alphabet = Alphabet::from_text(text);
        let dense_text = alphabet.encode_text_with_sentinel(text);

        let suffix_array: Vec<i32> = sort_suffixes(&dense_text, alphabet.size());
        let bwt = bwt_from_suffix_array(&suffix_array, &dense_text);

        let io_bwt: Vec<u8> = bwt.iter().map(|&rank| alphabet.io_symbol(rank)).collect();
        assert_eq!(io_bwt, b"ipssm$pissii");
    }

    #[test]
    fn count_table_holds_exclusive_prefix_sums() {
        let (dense_text, alphabet_size) = dense(b"acgtacgtaa");

        let count = count_table(&dense_text, alphabet_size);

        // $ a c g t, with frequencies 1 4 2 2 2
        assert_eq!(count, vec![0, 1, 5, 7, 9, 11]);
    }

    proptest! {
        #[test]
        fn radix_sort_agrees_with_naive_sort(
            text in prop::collection::vec((0usize..4).prop_map(|i| b"acgt"[i]), 0..300)
        ) {
            let (dense_text, alphabet_size) = dense(&text);

            let suffix_array: Vec<i32> = sort_suffixes(&dense_text, alphabet_size);

            prop_assert_eq!(suffix_array, naive_suffix_order(&dense_text));
        }
    }
}
