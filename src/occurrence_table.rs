use num_traits::NumCast;
use rayon::prelude::*;

use crate::IndexStorage;

type OccurrenceColumn<I> = Vec<I>;

/// Dense per-symbol prefix counts over the BWT.
///
/// The column of dense symbol c holds at row i the number of occurrences of
/// c in bwt[0..i), so each column has one more entry than the text.
#[cfg_attr(feature = "savefile", derive(savefile::savefile_derive::Savefile))]
#[derive(Debug)]
pub(crate) struct OccurrenceTable<I> {
    columns: Vec<OccurrenceColumn<I>>,
}

impl<I: IndexStorage> OccurrenceTable<I> {
    pub(crate) fn construct(bwt: &[u8], alphabet_size: usize) -> Self {
        let columns = (0..alphabet_size)
            .into_par_iter()
            .map(|symbol| create_occurrence_column(symbol as u8, bwt))
            .collect();

        Self { columns }
    }

    // occurrences of the symbol in bwt[0, idx)
    pub(crate) fn rank(&self, symbol: u8, idx: usize) -> usize {
        <usize as NumCast>::from(self.columns[symbol as usize][idx])
            .expect("occurrence counts should fit into usize")
    }
}

fn create_occurrence_column<I: IndexStorage>(target_symbol: u8, bwt: &[u8]) -> OccurrenceColumn<I> {
    let mut column = Vec::with_capacity(bwt.len() + 1);

    let mut occurrences = I::zero();
    column.push(occurrences);

    for &symbol in bwt {
        if symbol == target_symbol {
            occurrences = occurrences + I::one();
        }

        column.push(occurrences);
    }

    column
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranks_are_prefix_counts() {
        // dense BWT over an alphabet of size 3
        let bwt = [2, 0, 1, 2, 2, 1];

        let table: OccurrenceTable<i32> = OccurrenceTable::construct(&bwt, 3);

        for symbol in 0..3 {
            assert_eq!(table.rank(symbol, 0), 0);

            let total = bwt.iter().filter(|&&s| s == symbol).count();
            assert_eq!(table.rank(symbol, bwt.len()), total);

            for idx in 0..bwt.len() {
                let step = <usize as From<bool>>::from(bwt[idx] == symbol);
                assert_eq!(table.rank(symbol, idx + 1), table.rank(symbol, idx) + step);
            }
        }
    }
}
