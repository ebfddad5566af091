use image::imageops::{self, FilterType};
use image::GrayImage;

/// Both perceptual hashes are 64-bit codes over an 8x8 grid.
pub const HASH_BITS: u32 = 64;

const GRID: u32 = 8;

/// Average hash: each bit is whether a cell of the downsampled grayscale
/// image is brighter than the grid mean.
pub fn average_hash(gray: &GrayImage) -> u64 {
    let small = imageops::resize(gray, GRID, GRID, FilterType::Triangle);
    let sum: u64 = small.pixels().map(|p| u64::from(p.0[0])).sum();
    let mean = sum as f64 / f64::from(GRID * GRID);
    let mut bits = 0u64;
    for (i, p) in small.pixels().enumerate() {
        if f64::from(p.0[0]) > mean {
            bits |= 1 << (HASH_BITS as usize - 1 - i);
        }
    }
    bits
}

/// Difference hash: each bit compares horizontally adjacent cell
/// intensities, so it is robust to global brightness shifts.
pub fn difference_hash(gray: &GrayImage) -> u64 {
    let small = imageops::resize(gray, GRID + 1, GRID, FilterType::Triangle);
    let mut bits = 0u64;
    let mut i = 0usize;
    for y in 0..GRID {
        for x in 0..GRID {
            let left = small.get_pixel(x, y).0[0];
            let right = small.get_pixel(x + 1, y).0[0];
            if right > left {
                bits |= 1 << (HASH_BITS as usize - 1 - i);
            }
            i += 1;
        }
    }
    bits
}

pub fn hamming(a: u64, b: u64) -> u32 {
    (a ^ b).count_ones()
}

/// Minimum Hamming distance from `hash` to any element of `others`.
/// None when the comparison set is empty (distance is then unknown, not 0).
pub fn min_hamming(hash: u64, others: &[u64]) -> Option<u32> {
    others.iter().map(|h| hamming(hash, *h)).min()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    fn gradient(width: u32, height: u32) -> GrayImage {
        GrayImage::from_fn(width, height, |x, _| Luma([(x * 255 / width) as u8]))
    }

    #[test]
    fn hashes_are_deterministic() {
        let img = gradient(64, 64);
        assert_eq!(average_hash(&img), average_hash(&img));
        assert_eq!(difference_hash(&img), difference_hash(&img));
    }

    #[test]
    fn identical_images_are_zero_distance() {
        let img = gradient(100, 50);
        assert_eq!(hamming(average_hash(&img), average_hash(&img)), 0);
    }

    #[test]
    fn flipped_gradient_is_far() {
        let img = gradient(64, 64);
        let flipped = image::imageops::flip_horizontal(&img);
        let d = hamming(difference_hash(&img), difference_hash(&flipped));
        assert!(d > 16, "flipped gradient should differ, got {d}");
    }

    #[test]
    fn min_hamming_of_empty_set_is_unknown() {
        assert_eq!(min_hamming(0xdead_beef, &[]), None);
        assert_eq!(min_hamming(0b1011, &[0b1001, 0b0011]), Some(1));
    }
}
