use crate::errors::OptimizerError;
use crate::model::{Creative, FeatureVector, Signal};
use image::GrayImage;
use serde::{Deserialize, Serialize};

pub mod phash;
pub mod text;

/// Output of an external OCR pass over a creative asset. The extractor never
/// runs OCR itself; when no pass is supplied the overlay-density feature is
/// reported unknown and excluded downstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrResult {
    pub text: String,
    /// Fraction of image area covered by recognized text boxes.
    pub density: f64,
}

/// Turns a raw creative asset into a FeatureVector.
///
/// Deterministic for identical asset bytes; content-addressed caching relies
/// on this. Malformed bytes fail with `AssetUnreadable` so the caller can
/// exclude the creative instead of scoring a garbage vector.
pub fn extract(
    creative: &Creative,
    asset_bytes: &[u8],
    ocr: Option<&OcrResult>,
) -> Result<FeatureVector, OptimizerError> {
    let img = image::load_from_memory(asset_bytes).map_err(|e| {
        OptimizerError::AssetUnreadable {
            creative_id: creative.creative_id.clone(),
            reason: e.to_string(),
        }
    })?;
    let rgb = img.to_rgb8();
    let gray = img.to_luma8();

    let overlay_text_density = match ocr {
        Some(o) => Signal::Known(o.density.clamp(0.0, 1.0)),
        None => Signal::Unknown,
    };
    let copy = creative.copy_text.as_deref().unwrap_or("");

    Ok(FeatureVector {
        creative_id: creative.creative_id.clone(),
        ahash: phash::average_hash(&gray),
        dhash: phash::difference_hash(&gray),
        dominant_colors: dominant_colors(&rgb, 5),
        brightness: mean_brightness(&gray),
        entropy: shannon_entropy(&gray),
        overlay_text_density,
        text_length: text::copy_length(copy),
        copy_readability: match text::readability(copy) {
            Some(r) => Signal::Known(r),
            None => Signal::Unknown,
        },
    })
}

/// Mean grayscale intensity, normalized to [0, 1].
pub fn mean_brightness(gray: &GrayImage) -> f64 {
    let n = (gray.width() as u64 * gray.height() as u64).max(1);
    let sum: u64 = gray.pixels().map(|p| u64::from(p.0[0])).sum();
    sum as f64 / n as f64 / 255.0
}

/// Shannon entropy of the grayscale histogram, in bits (0..=8).
pub fn shannon_entropy(gray: &GrayImage) -> f64 {
    let mut hist = [0u64; 256];
    for p in gray.pixels() {
        hist[p.0[0] as usize] += 1;
    }
    let total = hist.iter().sum::<u64>() as f64;
    if total == 0.0 {
        return 0.0;
    }
    hist.iter()
        .filter(|&&c| c > 0)
        .map(|&c| {
            let p = c as f64 / total;
            -p * p.log2()
        })
        .sum()
}

/// Top-k palette via 4-bit-per-channel quantization, reported as `#rrggbb`
/// bucket centers. Ties break on bucket index so output is deterministic.
pub fn dominant_colors(rgb: &image::RgbImage, k: usize) -> Vec<String> {
    let mut counts: std::collections::HashMap<u16, u64> = std::collections::HashMap::new();
    for p in rgb.pixels() {
        let key = (u16::from(p.0[0] >> 4) << 8) | (u16::from(p.0[1] >> 4) << 4) | u16::from(p.0[2] >> 4);
        *counts.entry(key).or_default() += 1;
    }
    let mut buckets: Vec<(u16, u64)> = counts.into_iter().collect();
    buckets.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    buckets
        .into_iter()
        .take(k)
        .map(|(key, _)| {
            // Bucket center: high nibble from the key, low nibble 0x8.
            let r = (((key >> 8) & 0xf) as u8) << 4 | 0x8;
            let g = (((key >> 4) & 0xf) as u8) << 4 | 0x8;
            let b = ((key & 0xf) as u8) << 4 | 0x8;
            format!("#{r:02x}{g:02x}{b:02x}")
        })
        .collect()
}
