use thiserror::Error;

/// Invariant violations inside one identification run.
///
/// None of these occur with well-formed input; they point at a defect
/// upstream and end the run for that account.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum IdentificationError {
    #[error("dominant cluster has no members")]
    EmptyCluster,
    #[error("observation {index} has {found} features, expected {expected}")]
    InconsistentFeatureLength {
        index: usize,
        expected: usize,
        found: usize,
    },
    #[error("cluster assignment covers {labels} points but {observations} observations were given")]
    AssignmentMismatch { observations: usize, labels: usize },
    #[error("cluster member index {index} is out of range for {observations} observations")]
    MemberOutOfRange { index: usize, observations: usize },
}
