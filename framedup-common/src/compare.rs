use std::path::Path;

use clap::ValueEnum;
use image::imageops::{self, FilterType};

use crate::imghash;
use crate::ssim;
use crate::utils::percent::Threshold;

/// How two frames are judged to be the same picture.
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Strategy {
    /// 64 bit average hash, cheap and noise tolerant
    Hash,
    /// Structural similarity on luma, slow but accurate
    Pixel,
    /// The hash as a cheap filter, ssim to confirm its hits
    Hybrid,
}

/// Compares two frames on disk and answers whether one is a duplicate of the
/// other. The strategy and threshold are fixed at construction.
pub struct Comparator {
    strategy: Strategy,
    threshold: Threshold,
}

impl Comparator {
    pub fn new(strategy: Strategy, threshold: Threshold) -> Self {
        Self {
            strategy,
            threshold,
        }
    }

    /// Whether the frames at `a` and `b` show the same picture. A frame that
    /// cannot be decoded is never similar to anything, so corrupt files
    /// always end up kept instead of silently vanishing.
    pub fn is_similar(&self, a: &Path, b: &Path) -> bool {
        let verdict = match self.strategy {
            Strategy::Hash => self.hash_similar(a, b),
            Strategy::Pixel => self.pixel_similar(a, b),
            Strategy::Hybrid => self.hybrid_similar(a, b),
        };
        verdict.unwrap_or_else(|e| {
            log::warn!(
                "could not compare {} with {}: {}",
                a.display(),
                b.display(),
                e
            );
            false
        })
    }

    fn hash_similar(&self, a: &Path, b: &Path) -> image::ImageResult<bool> {
        let ha = imghash::hash_from_path(a)?;
        let hb = imghash::hash_from_path(b)?;
        let simi = ha.similarity_to(hb);
        log::trace!("hash {ha} vs {hb}: {simi:.1}%");
        Ok(self.threshold.is_duplicate(simi))
    }

    fn pixel_similar(&self, a: &Path, b: &Path) -> image::ImageResult<bool> {
        let first = image::open(a)?.into_luma8();
        let mut second = image::open(b)?.into_luma8();
        if second.dimensions() != first.dimensions() {
            second = imageops::resize(
                &second,
                first.width(),
                first.height(),
                FilterType::Lanczos3,
            );
        }
        let simi = 100.0 * ssim::ssim(&first, &second);
        log::trace!("ssim {} vs {}: {simi:.1}%", a.display(), b.display());
        Ok(self.threshold.is_duplicate(simi))
    }

    // A true duplicate the hash happens to reject never reaches the ssim
    // confirmation, which is the accepted cost of skipping the expensive
    // comparison for most non-duplicates.
    fn hybrid_similar(&self, a: &Path, b: &Path) -> image::ImageResult<bool> {
        if !self.hash_similar(a, b)? {
            return Ok(false);
        }
        self.pixel_similar(a, b)
    }
}
