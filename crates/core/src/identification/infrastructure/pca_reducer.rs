//! Principal component projection fitted per batch.
//!
//! Batches are small (tens to hundreds of faces) while raw features have
//! thousands of dimensions, so the components are taken from the
//! eigendecomposition of the centered Gram matrix (n x n) rather than the
//! feature covariance (d x d). Scores equal `U * S` of the centered data's SVD.

use ndarray::{Array1, Array2, ArrayView2, Axis};

use crate::identification::domain::dimensionality_reducer::DimensionalityReducer;
use crate::identification::domain::feature_matrix::FeatureMatrix;
use crate::identification::infrastructure::math;
use crate::shared::constants::{DEFAULT_MAX_COMPONENTS, DEFAULT_REDUCTION_THRESHOLD};

pub struct PcaReducer {
    max_components: usize,
    threshold: usize,
}

impl PcaReducer {
    /// Batches with `threshold` or fewer rows pass through unchanged.
    pub fn new(max_components: usize, threshold: usize) -> Self {
        Self {
            max_components,
            threshold,
        }
    }

    /// Component count for a batch of `rows` x `cols`.
    pub fn components_for(&self, rows: usize, cols: usize) -> usize {
        self.max_components
            .min(rows.saturating_sub(1))
            .min(cols)
    }
}

impl Default for PcaReducer {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_COMPONENTS, DEFAULT_REDUCTION_THRESHOLD)
    }
}

impl DimensionalityReducer for PcaReducer {
    fn reduce(&self, features: &FeatureMatrix) -> FeatureMatrix {
        let rows = features.rows();
        let components = self.components_for(rows, features.cols());
        if rows <= self.threshold || components == 0 {
            log::debug!("Clustering {rows} observations in raw feature space");
            return features.clone();
        }

        log::debug!(
            "Projecting {rows} observations from {} to {components} dimensions",
            features.cols()
        );
        FeatureMatrix::new(project(features.view(), components))
    }
}

/// Projects the rows of `x` onto its first `components` principal axes.
///
/// Each output column is sign-normalized so that its largest-magnitude
/// entry is positive.
fn project(x: ArrayView2<'_, f64>, components: usize) -> Array2<f64> {
    let rows = x.nrows();
    let mean = x
        .mean_axis(Axis(0))
        .unwrap_or_else(|| Array1::zeros(x.ncols()));
    let centered = &x - &mean;
    let gram = centered.dot(&centered.t());

    let (values, vectors) = math::symmetric_eigen(gram);

    let mut scores = Array2::<f64>::zeros((rows, components));
    for j in 0..components {
        let singular = values[j].max(0.0).sqrt();
        let mut column = vectors.column(j).to_owned() * singular;

        let pivot = column
            .iter()
            .enumerate()
            .fold((0, 0.0f64), |best, (i, v)| {
                if v.abs() > best.1 {
                    (i, v.abs())
                } else {
                    best
                }
            })
            .0;
        if column[pivot] < 0.0 {
            column.mapv_inplace(|v| -v);
        }
        scores.column_mut(j).assign(&column);
    }
    scores
}
