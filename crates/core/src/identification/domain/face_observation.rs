use crate::detection::domain::detection::Gender;
use crate::shared::bounding_box::BoundingBox;

/// One detected and annotated face from one image of the batch.
///
/// Only faces with both an age and a gender become observations, so the
/// two are never absent here. Immutable once built.
#[derive(Clone, Debug, PartialEq)]
pub struct FaceObservation {
    pub image_ref: String,
    pub bounding_box: BoundingBox,
    pub features: Vec<f32>,
    pub age: f64,
    pub gender: Gender,
    pub confidence: f64,
}
