use crate::identification::domain::feature_matrix::FeatureMatrix;

/// Domain interface for projecting a batch's features into fewer dimensions.
///
/// Fit and applied in one call per batch; implementations keep no state
/// between calls. The output has the same row count as the input.
pub trait DimensionalityReducer: Send {
    fn reduce(&self, features: &FeatureMatrix) -> FeatureMatrix;
}
