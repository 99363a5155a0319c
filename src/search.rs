use std::collections::HashSet;

use crate::cigar::{Cigar, CigarOp};
use crate::{FmIndex, HalfOpenInterval, Hit, IndexStorage};

/// A lazy iterator over the approximate occurrences of one pattern.
///
/// The iterator performs a bounded depth-first backtracking walk over the
/// FM-Index with an explicit frame stack, pruned by per-position edit lower
/// bounds. Hits are produced on demand; dropping the iterator abandons the
/// remaining search space.
///
/// Created by [`FmIndex::approx_matches`].
pub struct ApproxMatches<'a, I> {
    index: &'a FmIndex<I>,
    pattern: Vec<u8>,
    lower_bounds: Vec<usize>,
    stack: Vec<SearchFrame>,
    pending: Vec<Hit>,
    reported: HashSet<Hit>,
}

struct SearchFrame {
    // position of the next pattern symbol to consume, -1 once exhausted
    cursor: isize,
    edits_left: isize,
    interval: HalfOpenInterval,
    // operations in consumption order; the pattern is walked right to left,
    // so this is reversed before compaction
    trace: Vec<CigarOp>,
}

impl<'a, I: IndexStorage> ApproxMatches<'a, I> {
    pub(crate) fn new(index: &'a FmIndex<I>, pattern: &[u8], max_edits: usize) -> Self {
        let mut matches = ApproxMatches {
            index,
            pattern: Vec::new(),
            lower_bounds: Vec::new(),
            stack: Vec::new(),
            pending: Vec::new(),
            reported: HashSet::new(),
        };

        // an empty pattern or one with symbols foreign to the reference
        // cannot match anything
        let Some(dense_pattern) = index.alphabet().encode_query(pattern) else {
            return matches;
        };
        if dense_pattern.is_empty() {
            return matches;
        }

        let lower_bounds = edit_lower_bounds(index, &dense_pattern);
        if lower_bounds[dense_pattern.len() - 1] > max_edits {
            return matches;
        }

        matches.stack.push(SearchFrame {
            cursor: dense_pattern.len() as isize - 1,
            edits_left: max_edits as isize,
            interval: index.full_interval(),
            trace: Vec::new(),
        });
        matches.pattern = dense_pattern;
        matches.lower_bounds = lower_bounds;

        matches
    }

    fn emit(&mut self, frame: &SearchFrame) {
        let cigar = Cigar::from_ops(frame.trace.iter().rev().copied());
        let index = self.index;

        for position in index.positions(frame.interval) {
            let hit = Hit {
                position: position + 1,
                cigar: cigar.clone(),
            };

            if self.reported.insert(hit.clone()) {
                self.pending.push(hit);
            }
        }
    }

    fn expand(&mut self, frame: SearchFrame) {
        let cursor_symbol = self.pattern[frame.cursor as usize];

        // insertion into the reference: consume a pattern symbol without
        // moving the interval
        self.stack.push(SearchFrame {
            cursor: frame.cursor - 1,
            edits_left: frame.edits_left - 1,
            interval: frame.interval,
            trace: extended(&frame.trace, CigarOp::Ins),
        });

        // the sentinel rank 0 is never expanded, a step through it would
        // cross the suffix boundary
        for symbol in 1..self.index.alphabet().size() as u8 {
            let stepped = self.index.backward_step(frame.interval, symbol);
            if stepped.is_empty() {
                continue;
            }

            // deletion from the reference: consume a reference symbol only.
            // While the trace is empty the deletion would sit at the right
            // end of the alignment and every hit would reappear padded with
            // redundant trailing deletions, so it is forbidden there.
            if !frame.trace.is_empty() {
                self.stack.push(SearchFrame {
                    cursor: frame.cursor,
                    edits_left: frame.edits_left - 1,
                    interval: stepped,
                    trace: extended(&frame.trace, CigarOp::Del),
                });
            }

            // match or substitution
            let edits_left = if symbol == cursor_symbol {
                frame.edits_left
            } else {
                frame.edits_left - 1
            };

            self.stack.push(SearchFrame {
                cursor: frame.cursor - 1,
                edits_left,
                interval: stepped,
                trace: extended(&frame.trace, CigarOp::Match),
            });
        }
    }
}

impl<I: IndexStorage> Iterator for ApproxMatches<'_, I> {
    type Item = Hit;

    fn next(&mut self) -> Option<Hit> {
        loop {
            if let Some(hit) = self.pending.pop() {
                return Some(hit);
            }

            let frame = self.stack.pop()?;

            if frame.edits_left < 0 {
                continue;
            }

            if frame.cursor < 0 {
                self.emit(&frame);
                continue;
            }

            if frame.edits_left < self.lower_bounds[frame.cursor as usize] as isize {
                continue;
            }

            self.expand(frame);
        }
    }
}

fn extended(trace: &[CigarOp], op: CigarOp) -> Vec<CigarOp> {
    let mut extended = Vec::with_capacity(trace.len() + 1);
    extended.extend_from_slice(trace);
    extended.push(op);

    extended
}

// Edit lower bounds for pruning the backtracking walk.
//
// The pattern is walked right to left through exact backward FM steps,
// resetting the interval whenever it collapses. Every collapse identifies a
// stretch of the pattern that is not a substring of the reference and must
// therefore contain at least one edit in any alignment. The bound at
// position i counts the collapsed stretches lying entirely within
// pattern[0..=i], the part a search frame with cursor i still has to
// consume. The bound at the last position is the total collapse count and
// rejects hopeless queries outright.
pub(crate) fn edit_lower_bounds<I: IndexStorage>(
    index: &FmIndex<I>,
    dense_pattern: &[u8],
) -> Vec<usize> {
    let mut stretch_ends = Vec::new();
    let mut interval = index.full_interval();
    let mut current_stretch_end = dense_pattern.len() - 1;

    for (i, &symbol) in dense_pattern.iter().enumerate().rev() {
        interval = index.backward_step(interval, symbol);

        if interval.is_empty() {
            stretch_ends.push(current_stretch_end);
            interval = index.full_interval();
            current_stretch_end = i.saturating_sub(1);
        }
    }

    // stretch_ends is strictly decreasing
    let mut bounds = vec![0; dense_pattern.len()];
    let mut contained = 0;

    for (i, bound) in bounds.iter_mut().enumerate() {
        while contained < stretch_ends.len() && stretch_ends[stretch_ends.len() - 1 - contained] <= i
        {
            contained += 1;
        }

        *bound = contained;
    }

    bounds
}
