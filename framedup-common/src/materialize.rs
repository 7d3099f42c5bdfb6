//! Applies the mode policy to a compacted segment: delete the duplicates in
//! place, or copy the kept frames into the shared output directory.
//!
//! A single failing copy or delete is logged and skipped so one bad file
//! never aborts a whole segment.

use std::collections::HashSet;
use std::{fs, io, path::Path};

use crate::catalog::{Frame, Segment};
use crate::events::EventSink;
use crate::utils::fsutils;

/// What happens to the frames that survive deduplication. Fixed for a run.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Mode {
    /// Delete duplicates where they are, keep the rest at their paths.
    InPlaceDelete,
    /// Copy kept frames into one shared output directory.
    CopyCompact,
    /// Like [`Mode::CopyCompact`], but also remove the original segment
    /// directories once their frames are copied.
    CopyThenPurge,
}

#[derive(thiserror::Error, Debug)]
#[error("{0} is not a valid mode, expected 1, 2 or 3")]
pub struct ModeError(u8);

impl TryFrom<u8> for Mode {
    type Error = ModeError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Mode::InPlaceDelete),
            2 => Ok(Mode::CopyCompact),
            3 => Ok(Mode::CopyThenPurge),
            other => Err(ModeError(other)),
        }
    }
}

impl Mode {
    /// Whether this mode writes frames to the shared output directory.
    pub fn copies_output(self) -> bool {
        matches!(self, Mode::CopyCompact | Mode::CopyThenPurge)
    }
}

/// The name a kept frame gets in the output directory. The counter restarts
/// at 1 for every segment; names stay unique through the segment index
/// prefix alone.
pub fn output_name(segment_index: usize, local_counter: u64, ext: &str) -> String {
    format!("frame_{segment_index:03}_{local_counter:06}.{ext}")
}

/// Delete every frame of the segment that was examined but not kept.
/// Only the first `examined` frames may be touched; a cancelled sweep never
/// judged the rest. Returns how many frames were removed.
pub fn delete_in_place<S: EventSink>(
    segment: &Segment,
    keep: &[&Frame],
    examined: usize,
    events: &S,
) -> usize {
    let kept: HashSet<&Path> = keep.iter().map(|f| f.path.as_path()).collect();

    let mut removed = 0;
    for frame in &segment.frames[..examined] {
        if kept.contains(frame.path.as_path()) {
            continue;
        }
        match fsutils::remove_file_if_exists(&frame.path) {
            Ok(()) => {
                removed += 1;
                events.log(&format!("removed duplicate {}", frame.path.display()));
            }
            Err(e) => {
                log::warn!("failed to remove {}: {}", frame.path.display(), e);
                events.log(&format!("failed to remove {}", frame.path.display()));
            }
        }
    }
    removed
}

/// Copy the kept frames of one segment into `out_dir`, renamed per
/// [`output_name`] with their source extension preserved. Returns how many
/// copies succeeded.
pub fn copy_kept<S: EventSink>(
    segment: &Segment,
    keep: &[&Frame],
    out_dir: &Path,
    events: &S,
) -> usize {
    let mut copied = 0;
    for (i, frame) in keep.iter().enumerate() {
        let local_counter = i as u64 + 1;
        let ext = frame
            .path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("png");
        let dst = out_dir.join(output_name(segment.index, local_counter, ext));

        match fs::copy(&frame.path, &dst) {
            Ok(_) => {
                copied += 1;
                events.log(&format!(
                    "copied {} -> {}",
                    frame.path.display(),
                    dst.display()
                ));
            }
            Err(e) => {
                log::warn!(
                    "failed to copy {} to {}: {}",
                    frame.path.display(),
                    dst.display(),
                    e
                );
                events.log(&format!("failed to copy {}", frame.path.display()));
            }
        }
    }
    copied
}

/// Remove the original segment directory tree. An already missing directory
/// is fine, a run may have been interrupted and re-invoked.
pub fn purge_segment<S: EventSink>(segment: &Segment, events: &S) {
    match fs::remove_dir_all(&segment.dir) {
        Ok(()) => events.log(&format!("purged segment {}", segment.dir.display())),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => {
            log::warn!("failed to purge {}: {}", segment.dir.display(), e);
            events.log(&format!("failed to purge {}", segment.dir.display()));
        }
    }
}

#[cfg(test)]
mod test {
    use crate::events::NullSink;

    use super::*;

    fn fake_segment(dir: &Path, index: usize, frames: usize) -> Segment {
        let seg_dir = dir.join(format!("segment_{}.0_{}.0", index, index + 1));
        fs::create_dir(&seg_dir).unwrap();
        let frames = (1..=frames as u64)
            .map(|number| {
                let path = seg_dir.join(format!("frame_{number}.png"));
                fs::write(&path, number.to_le_bytes()).unwrap();
                Frame { path, number }
            })
            .collect();
        Segment {
            dir: seg_dir,
            index,
            start_time: index as f64,
            end_time: index as f64 + 1.0,
            frames,
        }
    }

    fn list_files(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn output_names_are_zero_padded() {
        assert_eq!("frame_000_000001.png", output_name(0, 1, "png"));
        assert_eq!("frame_012_000345.jpg", output_name(12, 345, "jpg"));
        assert_eq!("frame_1000_000001.png", output_name(1000, 1, "png"));
    }

    #[test]
    fn mode_from_config_number() {
        assert_eq!(Mode::InPlaceDelete, Mode::try_from(1).unwrap());
        assert_eq!(Mode::CopyCompact, Mode::try_from(2).unwrap());
        assert_eq!(Mode::CopyThenPurge, Mode::try_from(3).unwrap());
        assert!(Mode::try_from(0).is_err());
        assert!(Mode::try_from(4).is_err());
    }

    #[test]
    fn delete_keeps_the_keepset_and_creates_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let segment = fake_segment(dir.path(), 0, 4);
        let keep = vec![&segment.frames[0], &segment.frames[2]];

        let removed = delete_in_place(&segment, &keep, segment.frames.len(), &NullSink);
        assert_eq!(2, removed);
        assert_eq!(vec!["frame_1.png", "frame_3.png"], list_files(&segment.dir));
    }

    #[test]
    fn delete_leaves_unexamined_frames_alone() {
        let dir = tempfile::tempdir().unwrap();
        let segment = fake_segment(dir.path(), 0, 4);
        let keep = vec![&segment.frames[0]];

        // a cancelled sweep that only got through the first two frames
        let removed = delete_in_place(&segment, &keep, 2, &NullSink);
        assert_eq!(1, removed);
        assert_eq!(
            vec!["frame_1.png", "frame_3.png", "frame_4.png"],
            list_files(&segment.dir)
        );
    }

    #[test]
    fn delete_tolerates_already_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let segment = fake_segment(dir.path(), 0, 2);
        fs::remove_file(&segment.frames[1].path).unwrap();
        let keep = vec![&segment.frames[0]];

        let removed = delete_in_place(&segment, &keep, segment.frames.len(), &NullSink);
        assert_eq!(1, removed);
        assert_eq!(vec!["frame_1.png"], list_files(&segment.dir));
    }

    #[test]
    fn copies_restart_the_counter_per_segment() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");
        fs::create_dir(&out).unwrap();

        let seg0 = fake_segment(dir.path(), 0, 2);
        let seg1 = fake_segment(dir.path(), 1, 2);
        let keep0: Vec<&Frame> = seg0.frames.iter().collect();
        let keep1: Vec<&Frame> = seg1.frames.iter().collect();

        assert_eq!(2, copy_kept(&seg0, &keep0, &out, &NullSink));
        assert_eq!(2, copy_kept(&seg1, &keep1, &out, &NullSink));
        assert_eq!(
            vec![
                "frame_000_000001.png",
                "frame_000_000002.png",
                "frame_001_000001.png",
                "frame_001_000002.png",
            ],
            list_files(&out)
        );
    }

    #[test]
    fn copy_skips_missing_sources() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");
        fs::create_dir(&out).unwrap();

        let segment = fake_segment(dir.path(), 0, 2);
        fs::remove_file(&segment.frames[0].path).unwrap();
        let keep: Vec<&Frame> = segment.frames.iter().collect();

        assert_eq!(1, copy_kept(&segment, &keep, &out, &NullSink));
        // the counter advanced past the failed copy
        assert_eq!(vec!["frame_000_000002.png"], list_files(&out));
    }

    #[test]
    fn purge_removes_the_whole_tree() {
        let dir = tempfile::tempdir().unwrap();
        let segment = fake_segment(dir.path(), 0, 3);
        assert!(segment.dir.exists());

        purge_segment(&segment, &NullSink);
        assert!(!segment.dir.exists());

        // purging again is a no-op
        purge_segment(&segment, &NullSink);
    }

    #[test]
    fn original_frame_is_recoverable_from_the_output_name() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");
        fs::create_dir(&out).unwrap();

        let segment = fake_segment(dir.path(), 7, 1);
        let keep: Vec<&Frame> = segment.frames.iter().collect();
        copy_kept(&segment, &keep, &out, &NullSink);

        let copied = out.join("frame_007_000001.png");
        assert!(copied.exists());
        assert_eq!(
            fs::read(&segment.frames[0].path).unwrap(),
            fs::read(&copied).unwrap()
        );
    }
}
