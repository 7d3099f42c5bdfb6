//! Drives a whole run: catalog the segments, compact and materialize each
//! one, then stitch the segments together with the cross-segment pass.

use std::path::{Path, PathBuf};

use crate::catalog::{self, CatalogError, Segment};
use crate::compact;
use crate::compare::{Comparator, Strategy};
use crate::events::EventSink;
use crate::materialize::{self, Mode};
use crate::reconcile::{self, ReconcileError};
use crate::utils::{cancel::CancelToken, fsutils, percent::Threshold};

/// The configuration surface of one run.
#[derive(Copy, Clone, Debug)]
pub struct Options {
    pub mode: Mode,
    pub threshold: Threshold,
    pub strategy: Strategy,
}

/// What a finished (or cancelled) run did. A cancelled run is not an error,
/// the counts then cover whatever completed before the token flipped.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub segments: usize,
    pub frames_seen: usize,
    pub frames_kept: usize,
    pub frames_removed: usize,
    pub cancelled: bool,
}

#[derive(thiserror::Error, Debug)]
pub enum EngineError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Reconcile(#[from] ReconcileError),
    #[error("failed to create the output directory at {path}: {source}")]
    CreateOutput {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("an output directory is required when copying frames")]
    MissingOutput,
}

enum Target<'a> {
    InPlace,
    Copy(&'a Path),
}

pub struct Deduplicator<'a, S> {
    input_dir: &'a Path,
    output_dir: Option<&'a Path>,
    options: Options,
    comparator: Comparator,
    cancel: CancelToken,
    events: &'a S,
}

impl<'a, S: EventSink> Deduplicator<'a, S> {
    pub fn new(
        input_dir: &'a Path,
        output_dir: Option<&'a Path>,
        options: Options,
        cancel: CancelToken,
        events: &'a S,
    ) -> Self {
        let comparator = Comparator::new(options.strategy, options.threshold);
        Self {
            input_dir,
            output_dir,
            options,
            comparator,
            cancel,
            events,
        }
    }

    pub fn run(&self) -> Result<RunSummary, EngineError> {
        let segments = catalog::discover(self.input_dir)?;
        let total = segments.len();
        let mut summary = RunSummary {
            segments: total,
            ..Default::default()
        };

        let target = if self.options.mode.copies_output() {
            let dir = self.output_dir.ok_or(EngineError::MissingOutput)?;
            fsutils::ensure_dir(dir).map_err(|source| EngineError::CreateOutput {
                path: dir.to_path_buf(),
                source,
            })?;
            Target::Copy(dir)
        } else {
            Target::InPlace
        };

        for segment in &segments {
            if self.cancel.is_cancelled() {
                break;
            }
            self.events.progress(
                100.0 * segment.index as f64 / total as f64,
                &format!("segment {}/{}", segment.index + 1, total),
            );
            self.events
                .log(&format!("processing segment {}", segment.dir.display()));
            self.process_segment(segment, &target, &mut summary);
        }
        summary.cancelled = self.cancel.is_cancelled();

        if let Target::Copy(out_dir) = target {
            // a lone segment has no boundary to stitch
            if !summary.cancelled && total >= 2 {
                let reconciled =
                    reconcile::reconcile(out_dir, &self.comparator, &self.cancel, self.events)?;
                summary.frames_removed += reconciled.removed;
                summary.frames_kept = summary.frames_kept.saturating_sub(reconciled.removed);
                summary.cancelled = self.cancel.is_cancelled();
            }
        }

        Ok(summary)
    }

    fn process_segment(&self, segment: &Segment, target: &Target, summary: &mut RunSummary) {
        summary.frames_seen += segment.frames.len();
        if segment.frames.is_empty() {
            return;
        }

        let compaction = compact::compact(
            &segment.frames,
            |f| f.path.as_path(),
            &self.comparator,
            &self.cancel,
        );

        match target {
            Target::InPlace => {
                let removed = materialize::delete_in_place(
                    segment,
                    &compaction.keep,
                    compaction.examined,
                    self.events,
                );
                summary.frames_kept += compaction.keep.len();
                summary.frames_removed += removed;
            }
            Target::Copy(out_dir) => {
                let copied =
                    materialize::copy_kept(segment, &compaction.keep, out_dir, self.events);
                summary.frames_kept += copied;
                summary.frames_removed += compaction.removed();

                // never purge a segment whose sweep or copy may be partial
                if self.options.mode == Mode::CopyThenPurge && !self.cancel.is_cancelled() {
                    materialize::purge_segment(segment, self.events);
                }
            }
        }
    }
}

#[cfg(test)]
mod test {
    use crate::events::NullSink;

    use super::*;

    fn options(mode: Mode) -> Options {
        Options {
            mode,
            threshold: Threshold::DEFAULT,
            strategy: Strategy::Hash,
        }
    }

    #[test]
    fn copy_mode_without_output_dir_is_an_error() {
        let input = tempfile::tempdir().unwrap();
        let sink = NullSink;
        let dedup = Deduplicator::new(
            input.path(),
            None,
            options(Mode::CopyCompact),
            CancelToken::new(),
            &sink,
        );
        assert!(matches!(dedup.run(), Err(EngineError::MissingOutput)));
    }

    #[test]
    fn unreadable_root_aborts_the_run() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        let sink = NullSink;
        let dedup = Deduplicator::new(
            &missing,
            None,
            options(Mode::InPlaceDelete),
            CancelToken::new(),
            &sink,
        );
        assert!(matches!(dedup.run(), Err(EngineError::Catalog(_))));
    }

    #[test]
    fn empty_root_finishes_with_an_empty_summary() {
        let input = tempfile::tempdir().unwrap();
        let sink = NullSink;
        let dedup = Deduplicator::new(
            input.path(),
            None,
            options(Mode::InPlaceDelete),
            CancelToken::new(),
            &sink,
        );
        assert_eq!(RunSummary::default(), dedup.run().unwrap());
    }
}
