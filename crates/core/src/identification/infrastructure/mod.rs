pub mod dbscan_clusterer;
pub mod grayscale_feature_extractor;
pub mod math;
pub mod pca_reducer;
