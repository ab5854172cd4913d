use crate::detection::domain::detection::Detection;
use crate::imaging::domain::batch_image::BatchImage;

/// Domain interface for age/gender estimation.
///
/// Annotates face detections in place. Leaving `age` or `gender` unset
/// is a legitimate outcome (e.g. a low-quality crop), not an error.
pub trait AgeGenderPredictor: Send {
    fn predict(
        &mut self,
        image: &BatchImage,
        detections: &mut [Detection],
    ) -> Result<(), Box<dyn std::error::Error>>;
}
