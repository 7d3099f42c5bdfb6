use std::fs;
use std::path::{Path, PathBuf};

use framedup_common::compare::Strategy;
use framedup_common::engine::{Deduplicator, Options, RunSummary};
use framedup_common::events::NullSink;
use framedup_common::materialize::Mode;
use framedup_common::utils::{cancel::CancelToken, percent::Threshold};
use image::GrayImage;

/// A horizontal ramp, the baseline picture of these tests.
pub fn horizontal() -> GrayImage {
    GrayImage::from_fn(64, 64, |x, _| image::Luma([(x * 255 / 64) as u8]))
}

/// A vertical ramp, clearly a different picture than [`horizontal`].
pub fn vertical() -> GrayImage {
    GrayImage::from_fn(64, 64, |_, y| image::Luma([(y * 255 / 64) as u8]))
}

/// The horizontal ramp mirrored in brightness, as far from [`horizontal`] as
/// the hash gets.
pub fn inverted() -> GrayImage {
    GrayImage::from_fn(64, 64, |x, _| image::Luma([255 - (x * 255 / 64) as u8]))
}

pub fn write_segment(root: &Path, name: &str, frames: &[(u64, &GrayImage)]) -> PathBuf {
    let dir = root.join(name);
    fs::create_dir(&dir).unwrap();
    for (number, img) in frames {
        img.save(dir.join(format!("frame_{number}.png"))).unwrap();
    }
    dir
}

pub fn list_files(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

pub fn run(input: &Path, output: Option<&Path>, mode: Mode) -> RunSummary {
    run_with_cancel(input, output, mode, CancelToken::new())
}

pub fn run_with_cancel(
    input: &Path,
    output: Option<&Path>,
    mode: Mode,
    cancel: CancelToken,
) -> RunSummary {
    let options = Options {
        mode,
        threshold: Threshold::new(5.0).unwrap(),
        strategy: Strategy::Hash,
    };
    let sink = NullSink;
    Deduplicator::new(input, output, options, cancel, &sink)
        .run()
        .unwrap()
}
