use crate::identification::domain::feature_matrix::FeatureMatrix;

/// Domain interface for grouping feature rows into putative identities.
///
/// The same matrix must always produce the same partition. Label numbers
/// carry no meaning beyond membership.
pub trait IdentityClusterer: Send {
    fn cluster(&self, features: &FeatureMatrix) -> ClusterAssignment;
}

/// Cluster label per observation index. `None` marks noise, which only
/// occurs when the clusterer requires more than one point to seed a cluster.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClusterAssignment {
    labels: Vec<Option<usize>>,
}

impl ClusterAssignment {
    pub fn new(labels: Vec<Option<usize>>) -> Self {
        Self { labels }
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn label(&self, index: usize) -> Option<usize> {
        self.labels.get(index).copied().flatten()
    }

    pub fn labels(&self) -> &[Option<usize>] {
        &self.labels
    }

    /// Number of distinct clusters, noise excluded.
    pub fn cluster_count(&self) -> usize {
        let mut seen: Vec<usize> = self.labels.iter().flatten().copied().collect();
        seen.sort_unstable();
        seen.dedup();
        seen.len()
    }

    pub fn noise_count(&self) -> usize {
        self.labels.iter().filter(|l| l.is_none()).count()
    }

    /// Observation indices carrying `label`, ascending.
    pub fn members(&self, label: usize) -> Vec<usize> {
        self.labels
            .iter()
            .enumerate()
            .filter(|(_, l)| **l == Some(label))
            .map(|(i, _)| i)
            .collect()
    }

    /// Partition as sorted member lists, ordered by first member.
    ///
    /// Two assignments describe the same grouping exactly when their
    /// partitions are equal, whatever their label numbering.
    pub fn partition(&self) -> Vec<Vec<usize>> {
        let mut order: Vec<usize> = Vec::new();
        for label in self.labels.iter().flatten() {
            if !order.contains(label) {
                order.push(*label);
            }
        }
        order.into_iter().map(|l| self.members(l)).collect()
    }
}
