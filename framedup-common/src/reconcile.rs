//! The cross-segment pass. Per-segment compaction never sees across a
//! boundary, so a frame at the start of one segment can still duplicate the
//! last kept frame of the previous one. This full rescan re-reads every
//! materialized frame, restores the global order from the filenames and runs
//! the same compare-to-last-kept sweep over the whole sequence, which also
//! catches redundancy relative to earlier segments further back than the
//! direct neighbour.

use std::path::{Path, PathBuf};

use crate::compact;
use crate::compare::Comparator;
use crate::events::EventSink;
use crate::utils::{cancel::CancelToken, fsutils};

/// A materialized frame, with its provenance parsed back out of the filename.
#[derive(Debug, Clone)]
struct OutputFrame {
    path: PathBuf,
    segment_index: u64,
    counter: u64,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub kept: usize,
    pub removed: usize,
}

#[derive(thiserror::Error, Debug)]
pub enum ReconcileError {
    #[error("failed to read the output directory at {path}: {source}")]
    ReadOutput {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Remove every materialized frame that duplicates the previously kept one
/// under the global `(segment_index, counter)` order. Files whose names do
/// not parse are left alone. Every removal is reported through `events`,
/// followed by a kept/removed summary.
pub fn reconcile<S: EventSink>(
    out_dir: &Path,
    comparator: &Comparator,
    cancel: &CancelToken,
    events: &S,
) -> Result<Summary, ReconcileError> {
    let mut frames = output_frames(out_dir)?;
    frames.sort_by_key(|f| (f.segment_index, f.counter));

    let compaction = compact::compact(&frames, |f| f.path.as_path(), comparator, cancel);
    let kept: std::collections::HashSet<&Path> = compaction
        .keep
        .iter()
        .map(|f| f.path.as_path())
        .collect();

    let mut removed = 0;
    // frames past `examined` were never judged, they survive as they are
    for frame in &frames[..compaction.examined] {
        if kept.contains(frame.path.as_path()) {
            continue;
        }
        match fsutils::remove_file_if_exists(&frame.path) {
            Ok(()) => {
                removed += 1;
                events.log(&format!(
                    "removed cross-segment duplicate {}",
                    frame.path.display()
                ));
            }
            Err(e) => {
                log::warn!("failed to remove {}: {}", frame.path.display(), e);
                events.log(&format!("failed to remove {}", frame.path.display()));
            }
        }
    }

    let summary = Summary {
        kept: compaction.keep.len(),
        removed,
    };
    events.log(&format!(
        "cross-segment pass done: kept {}, removed {}",
        summary.kept, summary.removed
    ));
    Ok(summary)
}

fn output_frames(out_dir: &Path) -> Result<Vec<OutputFrame>, ReconcileError> {
    let files: Vec<PathBuf> =
        fsutils::all_files(out_dir).map_err(|source| ReconcileError::ReadOutput {
            path: out_dir.to_path_buf(),
            source,
        })?;

    Ok(files
        .into_iter()
        .filter(|path| path.is_file())
        .filter_map(|path| {
            let name = path.file_name()?.to_str()?;
            let (segment_index, counter) = parse_output_name(name)?;
            Some(OutputFrame {
                path,
                segment_index,
                counter,
            })
        })
        .collect())
}

fn parse_output_name(name: &str) -> Option<(u64, u64)> {
    let stem = name.strip_prefix("frame_")?;
    let (stem, _ext) = stem.split_once('.')?;
    let (segment_index, counter) = stem.split_once('_')?;
    Some((segment_index.parse().ok()?, counter.parse().ok()?))
}
