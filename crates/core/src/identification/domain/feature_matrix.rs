use ndarray::{Array2, ArrayView1, ArrayView2};

use crate::identification::domain::face_observation::FaceObservation;
use crate::identification::domain::identification_error::IdentificationError;

/// Feature vectors of a batch, one row per observation in observation order.
#[derive(Clone, Debug, PartialEq)]
pub struct FeatureMatrix {
    data: Array2<f64>,
}

impl FeatureMatrix {
    pub fn new(data: Array2<f64>) -> Self {
        Self { data }
    }

    /// Stacks the observations' feature vectors.
    ///
    /// Fails if the vectors differ in length.
    pub fn from_observations(
        observations: &[FaceObservation],
    ) -> Result<Self, IdentificationError> {
        let cols = observations.first().map_or(0, |o| o.features.len());
        let mut data = Array2::<f64>::zeros((observations.len(), cols));

        for (index, obs) in observations.iter().enumerate() {
            if obs.features.len() != cols {
                return Err(IdentificationError::InconsistentFeatureLength {
                    index,
                    expected: cols,
                    found: obs.features.len(),
                });
            }
            for (dst, &src) in data.row_mut(index).iter_mut().zip(&obs.features) {
                *dst = src as f64;
            }
        }

        Ok(Self { data })
    }

    pub fn rows(&self) -> usize {
        self.data.nrows()
    }

    pub fn cols(&self) -> usize {
        self.data.ncols()
    }

    pub fn row(&self, index: usize) -> ArrayView1<'_, f64> {
        self.data.row(index)
    }

    pub fn view(&self) -> ArrayView2<'_, f64> {
        self.data.view()
    }

    pub fn into_inner(self) -> Array2<f64> {
        self.data
    }
}
