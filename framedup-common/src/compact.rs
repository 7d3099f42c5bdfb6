//! The single pass greedy sweep at the heart of both the per-segment
//! compaction and the cross-segment pass in [`crate::reconcile`].

use std::path::Path;

use crate::compare::Comparator;
use crate::utils::cancel::CancelToken;

/// The outcome of one sweep. `keep` always contains the first examined item,
/// and no kept item is similar to the one kept just before it. `examined`
/// tells how far the sweep got before cancellation; items past it were never
/// looked at and must be left alone.
pub struct Compaction<'a, T> {
    pub keep: Vec<&'a T>,
    pub examined: usize,
}

impl<T> Compaction<'_, T> {
    pub fn removed(&self) -> usize {
        self.examined - self.keep.len()
    }
}

/// Sweep `items` in order, keeping the first and every later item that is not
/// similar to the most recently kept one. The comparison baseline is always
/// the last *kept* item, not the raw predecessor, so a run of near-identical
/// frames collapses to its first member in one O(n) pass. A frame similar to
/// some kept frame further back, but not to the current baseline, is kept
/// even though it is visually redundant; avoiding that would cost O(n^2)
/// comparisons.
///
/// The token is polled once per item and a cancelled sweep returns what it
/// has so far, not an error.
pub fn compact<'a, T, P>(
    items: &'a [T],
    path_of: P,
    comparator: &Comparator,
    cancel: &CancelToken,
) -> Compaction<'a, T>
where
    P: Fn(&T) -> &Path,
{
    let mut keep: Vec<&'a T> = Vec::new();
    let mut examined = 0;

    for item in items {
        if cancel.is_cancelled() {
            break;
        }
        examined += 1;

        match keep.last() {
            None => keep.push(item),
            Some(reference) => {
                if !comparator.is_similar(path_of(item), path_of(reference)) {
                    keep.push(item);
                }
            }
        }
    }

    Compaction { keep, examined }
}
