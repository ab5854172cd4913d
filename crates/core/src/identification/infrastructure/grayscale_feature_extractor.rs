use image::imageops::{self, FilterType};
use image::{GrayImage, RgbImage};

use crate::identification::domain::feature_extractor::FeatureExtractor;
use crate::shared::constants::{FEATURE_CROP_SIZE, MAX_CHANNEL_VALUE};
use crate::shared::frame::Frame;

/// BT.601 luma weights for R, G, B.
const LUMA_WEIGHTS: [f32; 3] = [0.299, 0.587, 0.114];

/// Resizes a face crop to a fixed square, converts it to grey and
/// flattens it row-major into intensities in [0, 1].
pub struct GrayscaleFeatureExtractor {
    size: u32,
}

impl GrayscaleFeatureExtractor {
    pub fn new(size: u32) -> Self {
        Self { size: size.max(1) }
    }

    fn resized_luma(&self, crop: &Frame) -> Vec<u8> {
        let (w, h) = (crop.width(), crop.height());
        match crop.channels() {
            1 => {
                let grey = GrayImage::from_raw(w, h, crop.data().to_vec());
                match grey {
                    Some(img) => imageops::resize(&img, self.size, self.size, FilterType::Triangle)
                        .into_raw(),
                    None => self.blank(),
                }
            }
            _ => {
                let rgb = RgbImage::from_raw(w, h, to_rgb(crop));
                match rgb {
                    Some(img) => {
                        imageops::resize(&img, self.size, self.size, FilterType::Triangle)
                            .pixels()
                            .map(|p| luma(p.0))
                            .collect()
                    }
                    None => self.blank(),
                }
            }
        }
    }

    fn blank(&self) -> Vec<u8> {
        vec![0; self.dimension()]
    }
}

impl Default for GrayscaleFeatureExtractor {
    fn default() -> Self {
        Self::new(FEATURE_CROP_SIZE)
    }
}

impl FeatureExtractor for GrayscaleFeatureExtractor {
    fn extract(&self, crop: &Frame) -> Vec<f32> {
        if crop.width() == 0 || crop.height() == 0 {
            return vec![0.0; self.dimension()];
        }
        self.resized_luma(crop)
            .into_iter()
            .map(|v| v as f32 / MAX_CHANNEL_VALUE)
            .collect()
    }

    fn dimension(&self) -> usize {
        (self.size as usize) * (self.size as usize)
    }
}

fn luma(rgb: [u8; 3]) -> u8 {
    let y: f32 = rgb
        .iter()
        .zip(LUMA_WEIGHTS.iter())
        .map(|(&c, &w)| c as f32 * w)
        .sum();
    y.round().clamp(0.0, MAX_CHANNEL_VALUE) as u8
}

/// Packs the first three channels of each pixel; frames with fewer than
/// three channels repeat their first.
fn to_rgb(frame: &Frame) -> Vec<u8> {
    let channels = frame.channels() as usize;
    if channels == 3 {
        return frame.data().to_vec();
    }
    frame
        .data()
        .chunks_exact(channels.max(1))
        .flat_map(|px| {
            if px.len() >= 3 {
                [px[0], px[1], px[2]]
            } else {
                [px[0]; 3]
            }
        })
        .collect()
}
