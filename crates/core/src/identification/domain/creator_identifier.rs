use crate::identification::domain::attribute_aggregator::aggregate_attributes;
use crate::identification::domain::creator_estimate::{
    round_one_decimal, CreatorEstimate, IdentificationOutcome, NoResultReason,
};
use crate::identification::domain::dimensionality_reducer::DimensionalityReducer;
use crate::identification::domain::dominant_identity::select_dominant;
use crate::identification::domain::face_observation::FaceObservation;
use crate::identification::domain::feature_matrix::FeatureMatrix;
use crate::identification::domain::identification_error::IdentificationError;
use crate::identification::domain::identity_clusterer::IdentityClusterer;

/// Finds the dominant identity among an account's face observations and
/// reports its mean age and majority gender.
pub struct CreatorIdentifier {
    reducer: Box<dyn DimensionalityReducer>,
    clusterer: Box<dyn IdentityClusterer>,
}

impl CreatorIdentifier {
    pub fn new(
        reducer: Box<dyn DimensionalityReducer>,
        clusterer: Box<dyn IdentityClusterer>,
    ) -> Self {
        Self { reducer, clusterer }
    }

    /// Runs reduction, clustering, dominant selection and aggregation over
    /// the whole batch.
    ///
    /// Observation order decides tie-breaks, so the same ordered input
    /// always yields the same outcome.
    pub fn identify(
        &self,
        account_id: &str,
        observations: &[FaceObservation],
    ) -> Result<IdentificationOutcome, IdentificationError> {
        if observations.is_empty() {
            log::warn!("No usable face observations for {account_id}");
            return Ok(no_result(account_id, NoResultReason::NoUsableObservations));
        }

        let features = FeatureMatrix::from_observations(observations)?;
        let reduced = self.reducer.reduce(&features);
        let assignment = self.clusterer.cluster(&reduced);
        if assignment.len() != observations.len() {
            return Err(IdentificationError::AssignmentMismatch {
                observations: observations.len(),
                labels: assignment.len(),
            });
        }

        let identities = assignment.cluster_count();
        log::debug!(
            "{account_id}: {} observations in {identities} identities, {} noise",
            observations.len(),
            assignment.noise_count()
        );

        let Some(dominant) = select_dominant(&assignment) else {
            log::warn!("No dominant identity for {account_id}");
            return Ok(no_result(account_id, NoResultReason::NoDominantIdentity));
        };

        let attributes = aggregate_attributes(observations, &dominant.members)?;
        let estimate = CreatorEstimate {
            account_id: account_id.to_string(),
            age: round_one_decimal(attributes.mean_age),
            gender: attributes.gender,
            mean_confidence: attributes.mean_confidence,
            appearances: attributes.appearances,
            total_faces: observations.len(),
            identities,
        };

        log::info!(
            "{account_id}: age {:.1}, {} ({}/{} faces)",
            estimate.age,
            estimate.gender,
            estimate.appearances,
            estimate.total_faces
        );
        Ok(IdentificationOutcome::Identified(estimate))
    }
}

fn no_result(account_id: &str, reason: NoResultReason) -> IdentificationOutcome {
    IdentificationOutcome::NoResult {
        account_id: account_id.to_string(),
        reason,
    }
}
