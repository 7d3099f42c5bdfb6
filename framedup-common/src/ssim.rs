//! Structural similarity between two grayscale images of the same size.
//!
//! Local means, variances and the covariance are taken over a gaussian
//! weighted sliding window and combined with the usual two stabilizing
//! constants. Accurate, but costs O(pixels * window) per comparison, which is
//! why the hash in [`crate::imghash`] exists as the cheap alternative.

use image::GrayImage;

const WINDOW_RADIUS: usize = 5;
const GAUSS_SIGMA: f64 = 1.5;

// The standard stabilizers for 8 bit dynamic range
const C1: f64 = (0.01 * 255.0) * (0.01 * 255.0);
const C2: f64 = (0.03 * 255.0) * (0.03 * 255.0);

/// The mean structural similarity index over the whole image, in `[0, 1]`.
/// Both images must have the same dimensions.
pub fn ssim(a: &GrayImage, b: &GrayImage) -> f64 {
    assert_eq!(a.dimensions(), b.dimensions());
    let (width, height) = a.dimensions();
    if width == 0 || height == 0 {
        return 1.0;
    }
    let width = width as usize;
    let height = height as usize;

    let pa: Vec<f64> = a.as_raw().iter().map(|&p| f64::from(p)).collect();
    let pb: Vec<f64> = b.as_raw().iter().map(|&p| f64::from(p)).collect();

    let aa: Vec<f64> = pa.iter().map(|v| v * v).collect();
    let bb: Vec<f64> = pb.iter().map(|v| v * v).collect();
    let ab: Vec<f64> = pa.iter().zip(&pb).map(|(x, y)| x * y).collect();

    let kernel = gaussian_kernel();
    let mu_a = blur(&pa, width, height, &kernel);
    let mu_b = blur(&pb, width, height, &kernel);
    let m_aa = blur(&aa, width, height, &kernel);
    let m_bb = blur(&bb, width, height, &kernel);
    let m_ab = blur(&ab, width, height, &kernel);

    let mut total = 0.0;
    for i in 0..pa.len() {
        let var_a = m_aa[i] - mu_a[i] * mu_a[i];
        let var_b = m_bb[i] - mu_b[i] * mu_b[i];
        let cov = m_ab[i] - mu_a[i] * mu_b[i];

        let num = (2.0 * mu_a[i] * mu_b[i] + C1) * (2.0 * cov + C2);
        let den = (mu_a[i] * mu_a[i] + mu_b[i] * mu_b[i] + C1) * (var_a + var_b + C2);
        total += num / den;
    }
    total / pa.len() as f64
}

fn gaussian_kernel() -> Vec<f64> {
    let mut kernel = vec![0.0; 2 * WINDOW_RADIUS + 1];
    let denom = 2.0 * GAUSS_SIGMA * GAUSS_SIGMA;
    for (i, k) in kernel.iter_mut().enumerate() {
        let d = i as f64 - WINDOW_RADIUS as f64;
        *k = (-d * d / denom).exp();
    }
    let sum: f64 = kernel.iter().sum();
    kernel.iter_mut().for_each(|k| *k /= sum);
    kernel
}

/// Separable gaussian blur with edges clamped to the border pixel.
fn blur(src: &[f64], width: usize, height: usize, kernel: &[f64]) -> Vec<f64> {
    let radius = WINDOW_RADIUS as isize;

    let mut rows = vec![0.0; src.len()];
    for y in 0..height {
        for x in 0..width {
            let mut acc = 0.0;
            for (i, k) in kernel.iter().enumerate() {
                let xi = (x as isize + i as isize - radius).clamp(0, width as isize - 1);
                acc += k * src[y * width + xi as usize];
            }
            rows[y * width + x] = acc;
        }
    }

    let mut out = vec![0.0; src.len()];
    for y in 0..height {
        for x in 0..width {
            let mut acc = 0.0;
            for (i, k) in kernel.iter().enumerate() {
                let yi = (y as isize + i as isize - radius).clamp(0, height as isize - 1);
                acc += k * rows[yi as usize * width + x];
            }
            out[y * width + x] = acc;
        }
    }
    out
}
