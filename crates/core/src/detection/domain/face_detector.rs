use crate::detection::domain::detection::Detection;
use crate::imaging::domain::batch_image::BatchImage;

/// Domain interface for face/person detection.
///
/// Returns boxes with their category only; attributes are left empty for
/// an [`AgeGenderPredictor`] to fill. An empty list is a valid result.
///
/// [`AgeGenderPredictor`]: crate::detection::domain::age_gender_predictor::AgeGenderPredictor
pub trait FaceDetector: Send {
    fn detect(&mut self, image: &BatchImage) -> Result<Vec<Detection>, Box<dyn std::error::Error>>;
}
