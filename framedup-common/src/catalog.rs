//! Discovers the segment directories written by the extraction stage and the
//! frames inside them. Everything not matching the naming convention is
//! skipped without complaint; only an unreadable root is fatal.

use std::{
    fs,
    path::{Path, PathBuf},
};

/// Extensions the catalog recognizes as frames, case insensitive.
pub const IMAGE_EXTS: &[&str] = &["png", "jpg", "jpeg", "bmp", "gif", "tiff"];

/// One extracted frame, named `frame_<number>.<ext>` on disk. Totally ordered
/// within its segment by `number`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub path: PathBuf,
    pub number: u64,
}

/// One `segment_<start>_<end>` directory and its frames, ordered by frame
/// number. `index` is the segment's position in the start-time order.
#[derive(Debug, Clone)]
pub struct Segment {
    pub dir: PathBuf,
    pub index: usize,
    pub start_time: f64,
    pub end_time: f64,
    pub frames: Vec<Frame>,
}

#[derive(thiserror::Error, Debug)]
pub enum CatalogError {
    #[error("failed to read the root directory at {path}: {source}")]
    ReadRoot {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Find all segments under `root`, sorted by start time, with their frames
/// sorted by frame number.
pub fn discover(root: &Path) -> Result<Vec<Segment>, CatalogError> {
    let entries = fs::read_dir(root).map_err(|source| CatalogError::ReadRoot {
        path: root.to_path_buf(),
        source,
    })?;

    let mut segments = Vec::new();
    for entry in entries {
        let Ok(entry) = entry else {
            continue;
        };
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let Some((start_time, end_time)) = parse_segment_name(name) else {
            continue;
        };
        let frames = segment_frames(&path);
        segments.push(Segment {
            dir: path,
            index: 0,
            start_time,
            end_time,
            frames,
        });
    }

    segments.sort_by(|a, b| a.start_time.total_cmp(&b.start_time));
    for (index, segment) in segments.iter_mut().enumerate() {
        segment.index = index;
    }
    Ok(segments)
}

fn parse_segment_name(name: &str) -> Option<(f64, f64)> {
    let times = name.strip_prefix("segment_")?;
    let (start, end) = times.split_once('_')?;
    let start: f64 = start.parse().ok().filter(|t: &f64| t.is_finite())?;
    let end: f64 = end.parse().ok().filter(|t: &f64| t.is_finite())?;
    Some((start, end))
}

fn segment_frames(dir: &Path) -> Vec<Frame> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            log::warn!("could not list the segment at {}: {}", dir.display(), e);
            return Vec::new();
        }
    };

    let mut frames: Vec<Frame> = entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().is_file())
        .filter_map(|entry| {
            let path = entry.path();
            let name = path.file_name()?.to_str()?;
            let number = parse_frame_name(name)?;
            Some(Frame { path, number })
        })
        .collect();

    frames.sort_by_key(|frame| frame.number);
    frames
}

fn parse_frame_name(name: &str) -> Option<u64> {
    let stem = name.strip_prefix("frame_")?;
    let (number, ext) = stem.split_once('.')?;
    if !IMAGE_EXTS.iter().any(|e| ext.eq_ignore_ascii_case(e)) {
        return None;
    }
    number.parse().ok()
}
