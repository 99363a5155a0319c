use std::fmt;

/// A single alignment operation.
///
/// `Match` covers matching and substituted positions alike, `Ins` is an
/// insertion into the reference (a pattern symbol without a reference
/// counterpart) and `Del` is a deletion from the reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CigarOp {
    Match,
    Ins,
    Del,
}

impl CigarOp {
    pub fn to_char(self) -> char {
        match self {
            CigarOp::Match => 'M',
            CigarOp::Ins => 'I',
            CigarOp::Del => 'D',
        }
    }
}

/// A maximal run of identical operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CigarElem {
    pub op: CigarOp,
    pub count: usize,
}

/// A run-length-compacted alignment trace, formatted like `3M1I2M`.
///
/// The operations describe the alignment from the first to the last
/// reference-aligned character.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Cigar {
    elems: Vec<CigarElem>,
}

impl Cigar {
    /// Collapses runs of identical operations, in the given order.
    pub fn from_ops(ops: impl IntoIterator<Item = CigarOp>) -> Self {
        let mut elems: Vec<CigarElem> = Vec::new();

        for op in ops {
            match elems.last_mut() {
                Some(last) if last.op == op => last.count += 1,
                _ => elems.push(CigarElem { op, count: 1 }),
            }
        }

        Self { elems }
    }

    pub fn elems(&self) -> &[CigarElem] {
        &self.elems
    }

    pub fn is_empty(&self) -> bool {
        self.elems.is_empty()
    }

    /// The operations with runs expanded, left to right.
    pub fn ops(&self) -> impl Iterator<Item = CigarOp> + '_ {
        self.elems
            .iter()
            .flat_map(|elem| std::iter::repeat_n(elem.op, elem.count))
    }
}

impl fmt::Display for Cigar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for elem in &self.elems {
            write!(f, "{}{}", elem.count, elem.op.to_char())?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runs_are_collapsed() {
        let cigar = Cigar::from_ops([
            CigarOp::Match,
            CigarOp::Match,
            CigarOp::Match,
            CigarOp::Ins,
            CigarOp::Match,
            CigarOp::Match,
        ]);

        assert_eq!(cigar.to_string(), "3M1I2M");
        assert_eq!(cigar.elems().len(), 3);
    }

    #[test]
    fn single_runs_keep_their_count() {
        let cigar = Cigar::from_ops([CigarOp::Del, CigarOp::Match, CigarOp::Ins]);

        assert_eq!(cigar.to_string(), "1D1M1I");
    }

    #[test]
    fn expanding_ops_inverts_compaction() {
        let ops = [
            CigarOp::Match,
            CigarOp::Ins,
            CigarOp::Ins,
            CigarOp::Match,
            CigarOp::Del,
        ];
        let cigar = Cigar::from_ops(ops);

        let expanded: Vec<_> = cigar.ops().collect();
        assert_eq!(expanded, ops);
    }

    #[test]
    fn empty_trace_formats_as_empty_string() {
        let cigar = Cigar::from_ops([]);

        assert!(cigar.is_empty());
        assert_eq!(cigar.to_string(), "");
    }
}
