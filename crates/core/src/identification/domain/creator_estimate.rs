use serde::Serialize;

use crate::detection::domain::detection::Gender;

/// Age and gender of an account's subject, ready for reporting.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CreatorEstimate {
    pub account_id: String,
    /// Mean age of the dominant cluster, rounded to one decimal.
    pub age: f64,
    pub gender: Gender,
    pub mean_confidence: f64,
    /// Observations in the dominant cluster.
    pub appearances: usize,
    /// Observations considered across all clusters.
    pub total_faces: usize,
    /// Distinct identities found in the batch.
    pub identities: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoResultReason {
    /// No image yielded a face with both age and gender.
    NoUsableObservations,
    /// Every observation was noise to the clusterer.
    NoDominantIdentity,
}

/// Result of identifying one account. `NoResult` is an expected outcome,
/// distinct from a processing failure.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum IdentificationOutcome {
    Identified(CreatorEstimate),
    NoResult {
        account_id: String,
        reason: NoResultReason,
    },
}

impl IdentificationOutcome {
    pub fn account_id(&self) -> &str {
        match self {
            IdentificationOutcome::Identified(estimate) => &estimate.account_id,
            IdentificationOutcome::NoResult { account_id, .. } => account_id,
        }
    }

    pub fn estimate(&self) -> Option<&CreatorEstimate> {
        match self {
            IdentificationOutcome::Identified(estimate) => Some(estimate),
            IdentificationOutcome::NoResult { .. } => None,
        }
    }
}

/// Rounds half away from zero to one decimal place.
pub fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
