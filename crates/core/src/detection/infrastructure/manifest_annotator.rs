//! Detector and age/gender predictor backed by a precomputed JSON manifest.
//!
//! Lets batches annotated offline (by any model) flow through the same
//! orchestration as live detectors. The manifest maps image file names to
//! the detections found in them:
//!
//! ```json
//! { "images": { "thumb_01.jpg": [
//!     { "box": [10, 12, 74, 80], "category": "face",
//!       "age": 24.5, "gender": "female", "gender_confidence": 0.93 } ] } }
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;
use thiserror::Error;

use crate::detection::domain::age_gender_predictor::AgeGenderPredictor;
use crate::detection::domain::detection::{Detection, DetectionCategory, Gender};
use crate::detection::domain::face_detector::FaceDetector;
use crate::imaging::domain::batch_image::BatchImage;
use crate::shared::bounding_box::BoundingBox;

#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("failed to read manifest {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid manifest {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Default, Deserialize)]
struct Manifest {
    #[serde(default)]
    images: HashMap<String, Vec<ManifestEntry>>,
}

#[derive(Clone, Debug, Deserialize)]
struct ManifestEntry {
    #[serde(rename = "box")]
    bounding_box: BoundingBox,
    #[serde(default = "default_category")]
    category: DetectionCategory,
    #[serde(default)]
    age: Option<f64>,
    #[serde(default)]
    gender: Option<Gender>,
    #[serde(default)]
    gender_confidence: Option<f64>,
}

fn default_category() -> DetectionCategory {
    DetectionCategory::Face
}

/// Cheap to clone: the parsed manifest is shared, so one instance can be
/// boxed as the detector and a clone as the predictor.
#[derive(Clone, Debug)]
pub struct ManifestAnnotator {
    images: Arc<HashMap<String, Vec<ManifestEntry>>>,
}

impl ManifestAnnotator {
    pub fn from_file(path: &Path) -> Result<Self, ManifestError> {
        let text = fs::read_to_string(path).map_err(|source| ManifestError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text).map_err(|source| ManifestError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        let manifest: Manifest = serde_json::from_str(text)?;
        Ok(Self {
            images: Arc::new(manifest.images),
        })
    }

    /// An annotator that knows no images; every detection comes back empty.
    pub fn empty() -> Self {
        Self {
            images: Arc::new(HashMap::new()),
        }
    }

    fn entries(&self, image_ref: &str) -> &[ManifestEntry] {
        self.images
            .get(image_ref)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }
}

impl FaceDetector for ManifestAnnotator {
    fn detect(&mut self, image: &BatchImage) -> Result<Vec<Detection>, Box<dyn std::error::Error>> {
        Ok(self
            .entries(&image.image_ref)
            .iter()
            .map(|e| Detection::new(e.bounding_box, e.category))
            .collect())
    }
}

impl AgeGenderPredictor for ManifestAnnotator {
    /// Detections are matched to manifest entries by position, which holds
    /// when they came from [`FaceDetector::detect`] on the same annotator.
    fn predict(
        &mut self,
        image: &BatchImage,
        detections: &mut [Detection],
    ) -> Result<(), Box<dyn std::error::Error>> {
        let entries = self.entries(&image.image_ref);
        if entries.len() != detections.len() {
            return Err(format!(
                "Manifest lists {} detections for {}, got {}",
                entries.len(),
                image.image_ref,
                detections.len()
            )
            .into());
        }

        for (detection, entry) in detections.iter_mut().zip(entries) {
            if !detection.is_face() {
                continue;
            }
            detection.age = entry.age;
            detection.gender = entry.gender;
            detection.gender_confidence = entry.gender_confidence;
        }
        Ok(())
    }
}
