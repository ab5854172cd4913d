/// Side of the square crop every face is resized to before feature extraction.
pub const FEATURE_CROP_SIZE: u32 = 64;

/// Upper bound of a single 8-bit channel, used to normalize intensities to [0, 1].
pub const MAX_CHANNEL_VALUE: f32 = 255.0;

/// DBSCAN radius tuned for 64x64 grayscale features normalized to [0, 1].
///
/// The tuning assumed plain bilinear sampling. Crops here are downscaled
/// with `image`'s Triangle filter, which also averages over the source
/// footprint, so large crops come out slightly smoother and pairwise
/// distances run a little shorter than under the tuned sampling.
pub const DEFAULT_EPS: f64 = 20.0;

pub const DEFAULT_MIN_SAMPLES: usize = 1;

/// Batches with at most this many observations are clustered in raw feature space.
pub const DEFAULT_REDUCTION_THRESHOLD: usize = 10;

pub const DEFAULT_MAX_COMPONENTS: usize = 100;

/// Images handed to the detector per group.
pub const DEFAULT_BATCH_SIZE: usize = 16;

/// Gender confidence recorded when the predictor supplies none.
pub const DEFAULT_GENDER_CONFIDENCE: f64 = 0.5;

pub const ANNOTATION_MANIFEST_NAME: &str = "annotations.json";

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff", "tif", "webp"];
