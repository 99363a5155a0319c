/*! An FM-Index based approximate read mapper.
 *
 * This library builds an [FM-Index] over a reference sequence and reports
 * every location where a query occurs with at most a given number of edits
 * (insertions, deletions and substitutions at unit cost), together with a
 * run-length-compacted [CIGAR](Cigar) describing the alignment.
 *
 * The index bundles the suffix array of the sentinel-terminated reference,
 * the per-symbol rank table over its Burrows-Wheeler transform and the
 * first-occurrence table. The search is a bounded depth-first backtracking
 * walk over the index, pruned by a precomputed table of edit lower bounds.
 *
 * ## Usage
 *
 * ```
 * use readmap::FmIndex;
 *
 * let index: FmIndex = FmIndex::new(b"acgtacgt").unwrap();
 *
 * // "cgt" occurs exactly at the 1-based positions 2 and 6
 * assert_eq!(index.approx_matches(b"cgt", 0).count(), 2);
 *
 * for hit in index.approx_matches(b"cat", 1) {
 *     println!("approximate occurrence at position {}: {}", hit.position, hit.cigar);
 * }
 * ```
 *
 * The index is immutable after construction and may be shared freely
 * between threads for concurrent read-only searches. [`FmIndex::build_many`]
 * constructs the indexes of a multi-reference genome in parallel.
 *
 * [FM-Index]: https://doi.org/10.1109/SFCS.2000.892127
 */

/// Contains the alphabet abstraction used to densely encode references.
pub mod alphabet;
/// Contains parsers for the Simple-FASTA and Simple-FASTQ formats.
pub mod io;

mod cigar;
mod construction;
mod error;
mod occurrence_table;
mod search;

use num_traits::{NumCast, PrimInt};
use rayon::prelude::*;

#[doc(inline)]
pub use alphabet::Alphabet;
#[doc(inline)]
pub use cigar::{Cigar, CigarElem, CigarOp};
#[doc(inline)]
pub use error::Error;
#[doc(inline)]
pub use search::ApproxMatches;

use occurrence_table::OccurrenceTable;

/// The FM-Index of a single sentinel-terminated reference.
///
/// See [crate-level documentation](self) for details.
#[derive(Debug)]
#[cfg_attr(feature = "savefile", derive(savefile::savefile_derive::Savefile))]
pub struct FmIndex<I = i32> {
    text_len: usize,
    alphabet: Alphabet,
    count: Vec<usize>,
    occurrences: OccurrenceTable<I>,
    suffix_array: Vec<I>,
}

impl<I: IndexStorage> FmIndex<I> {
    /// Builds the index of `reference`.
    ///
    /// The reference must not contain the sentinel byte `$` and its length
    /// plus one must fit into the index storage type `I`.
    pub fn new(reference: &[u8]) -> Result<Self, Error> {
        if let Some(offset) = memchr::memchr(alphabet::SENTINEL, reference) {
            return Err(Error::SentinelCollision { offset });
        }

        let alphabet = Alphabet::from_text(reference);
        let dense_text = alphabet.encode_text_with_sentinel(reference);

        assert!(
            dense_text.len() <= <usize as NumCast>::from(I::max_value()).unwrap(),
            "the sentinel-terminated reference must fit into the index storage type"
        );

        let construction::DataStructures {
            count,
            suffix_array,
            occurrences,
        } = construction::create_data_structures(&dense_text, alphabet.size());

        log::debug!(
            "built FM-index over {} symbols (alphabet size {})",
            dense_text.len(),
            alphabet.size()
        );

        Ok(FmIndex {
            text_len: dense_text.len(),
            alphabet,
            count,
            occurrences,
            suffix_array,
        })
    }

    /// Builds one index per reference.
    ///
    /// The references are processed in parallel; the number of threads is
    /// controlled by [`rayon`]. The returned indexes are in input order.
    pub fn build_many<T: AsRef<[u8]> + Sync>(
        references: impl IntoIterator<Item = T>,
    ) -> Result<Vec<Self>, Error> {
        let references: Vec<_> = references.into_iter().collect();

        references
            .par_iter()
            .map(|reference| Self::new(reference.as_ref()))
            .collect()
    }

    /// Returns a lazy iterator over all approximate occurrences of `pattern`
    /// with at most `max_edits` edits.
    ///
    /// An empty pattern or a pattern containing a symbol that is absent from
    /// the reference alphabet yields no hits. Hit order is unspecified and
    /// duplicate (position, CIGAR) pairs arising from distinct edit paths
    /// are reported once.
    pub fn approx_matches<'a>(&'a self, pattern: &[u8], max_edits: usize) -> ApproxMatches<'a, I> {
        ApproxMatches::new(self, pattern, max_edits)
    }

    /// One backward FM step: maps `interval` to the interval of suffixes
    /// beginning with the dense `symbol` followed by the current match.
    pub fn backward_step(&self, interval: HalfOpenInterval, symbol: u8) -> HalfOpenInterval {
        HalfOpenInterval {
            start: self.count[symbol as usize] + self.occurrences.rank(symbol, interval.start),
            end: self.count[symbol as usize] + self.occurrences.rank(symbol, interval.end),
        }
    }

    /// The 0-based text positions of the suffixes in `interval`.
    pub fn positions(&self, interval: HalfOpenInterval) -> impl Iterator<Item = usize> + '_ {
        self.suffix_array[interval.start..interval.end]
            .iter()
            .map(|&start| {
                <usize as NumCast>::from(start).expect("suffix array entries should fit into usize")
            })
    }

    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    /// The length of the indexed text, including the appended sentinel.
    pub fn text_len(&self) -> usize {
        self.text_len
    }

    pub(crate) fn full_interval(&self) -> HalfOpenInterval {
        HalfOpenInterval {
            start: 0,
            end: self.text_len,
        }
    }
}

#[cfg(feature = "savefile")]
impl<I: IndexStorage> FmIndex<I> {
    const VERSION_FOR_SAVEFILE: u32 = 0;

    pub fn load_from_reader(
        reader: &mut impl std::io::Read,
    ) -> Result<Self, savefile::SavefileError> {
        savefile::load(reader, Self::VERSION_FOR_SAVEFILE)
    }

    pub fn save_to_writer(
        &self,
        writer: &mut impl std::io::Write,
    ) -> Result<(), savefile::SavefileError> {
        savefile::save(writer, Self::VERSION_FOR_SAVEFILE, self)
    }

    /// Loads the per-reference indexes of a genome, in input order.
    pub fn load_many_from_file(
        filepath: impl AsRef<std::path::Path>,
    ) -> Result<Vec<Self>, savefile::SavefileError> {
        savefile::load_file(filepath, Self::VERSION_FOR_SAVEFILE)
    }

    /// Persists the per-reference indexes of a genome, in input order.
    pub fn save_many_to_file(
        indexes: &Vec<Self>,
        filepath: impl AsRef<std::path::Path>,
    ) -> Result<(), savefile::SavefileError> {
        savefile::save_file(filepath, Self::VERSION_FOR_SAVEFILE, indexes)
    }
}

/// An approximate occurrence of a pattern in the reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Hit {
    /// 1-based start position of the matched substring in the reference.
    pub position: usize,
    /// Alignment trace from the first to the last reference-aligned
    /// character.
    pub cigar: Cigar,
}

/// A half-open interval [start, end) of suffix array rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HalfOpenInterval {
    pub start: usize,
    pub end: usize,
}

impl HalfOpenInterval {
    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}

/// Types that can be used to store suffix array entries inside the FM-Index.
///
/// The maximum value of the type is an upper bound for the length of the
/// indexed reference (including the sentinel). Larger types allow longer
/// references at the cost of higher memory usage of the index.
pub trait IndexStorage:
    PrimInt + maybe_savefile::MaybeSavefile + sealed::Sealed + Send + Sync + 'static
{
}

impl sealed::Sealed for i32 {}
impl IndexStorage for i32 {}

impl sealed::Sealed for i64 {}
impl IndexStorage for i64 {}

mod maybe_savefile {
    #[cfg(feature = "savefile")]
    pub trait MaybeSavefile: savefile::Savefile {}

    #[cfg(not(feature = "savefile"))]
    pub trait MaybeSavefile {}

    impl MaybeSavefile for i32 {}
    impl MaybeSavefile for i64 {}
}

mod sealed {
    pub trait Sealed {}
}
