pub mod attribute_aggregator;
pub mod creator_estimate;
pub mod creator_identifier;
pub mod dimensionality_reducer;
pub mod dominant_identity;
pub mod face_observation;
pub mod feature_extractor;
pub mod feature_matrix;
pub mod identification_error;
pub mod identity_clusterer;
