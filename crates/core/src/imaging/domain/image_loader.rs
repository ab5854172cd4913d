use std::path::Path;

use crate::imaging::domain::batch_image::BatchImage;

/// Domain interface for turning an image reference into pixels.
///
/// Errors are per-image: the orchestrator logs them and moves on.
pub trait ImageLoader: Send {
    fn load(&self, path: &Path) -> Result<BatchImage, Box<dyn std::error::Error>>;
}
