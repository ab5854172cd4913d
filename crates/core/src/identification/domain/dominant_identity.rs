use crate::identification::domain::identity_clusterer::ClusterAssignment;

/// The cluster presumed to be the account's subject.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DominantCluster {
    pub label: usize,
    /// Observation indices, ascending.
    pub members: Vec<usize>,
}

/// Picks the cluster with the most members.
///
/// Ties go to the cluster whose first member comes earliest in observation
/// order. Returns `None` when no point belongs to any cluster.
pub fn select_dominant(assignment: &ClusterAssignment) -> Option<DominantCluster> {
    // (label, members) in order of first appearance
    let mut clusters: Vec<(usize, Vec<usize>)> = Vec::new();
    for (index, label) in assignment.labels().iter().enumerate() {
        let Some(label) = *label else {
            continue;
        };
        match clusters.iter_mut().find(|(l, _)| *l == label) {
            Some((_, members)) => members.push(index),
            None => clusters.push((label, vec![index])),
        }
    }

    let mut best: Option<(usize, Vec<usize>)> = None;
    for (label, members) in clusters {
        let larger = best
            .as_ref()
            .map_or(true, |(_, current)| members.len() > current.len());
        if larger {
            best = Some((label, members));
        }
    }

    best.map(|(label, members)| DominantCluster { label, members })
}
