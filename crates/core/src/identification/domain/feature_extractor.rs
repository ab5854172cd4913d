use crate::shared::frame::Frame;

/// Domain interface for turning a face crop into a fixed-length vector.
///
/// Every call on one extractor yields a vector of [`dimension`] values,
/// whatever the crop size, so vectors of one batch are comparable.
///
/// [`dimension`]: FeatureExtractor::dimension
pub trait FeatureExtractor: Send {
    fn extract(&self, crop: &Frame) -> Vec<f32>;

    fn dimension(&self) -> usize;
}
