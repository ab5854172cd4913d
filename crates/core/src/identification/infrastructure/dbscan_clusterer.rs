//! Density-based identity clustering (DBSCAN).
//!
//! A point is a core point when at least `min_samples` points, itself
//! included, lie within `eps` of it. Core points within `eps` of each other
//! share a cluster; a non-core point joins the cluster of its
//! lowest-indexed core neighbour, or is noise when it has none. With
//! `min_samples = 1` every point is core, so clusters are exactly the
//! connected components of the eps-neighbourhood graph and nothing is noise.

use ndarray::ArrayView2;

use crate::identification::domain::feature_matrix::FeatureMatrix;
use crate::identification::domain::identity_clusterer::{ClusterAssignment, IdentityClusterer};
use crate::identification::infrastructure::math;
use crate::shared::constants::{DEFAULT_EPS, DEFAULT_MIN_SAMPLES};

pub struct DbscanClusterer {
    eps: f64,
    min_samples: usize,
}

impl DbscanClusterer {
    pub fn new(eps: f64, min_samples: usize) -> Self {
        Self {
            eps,
            min_samples: min_samples.max(1),
        }
    }

    pub fn min_samples(&self) -> usize {
        self.min_samples
    }
}

impl Default for DbscanClusterer {
    fn default() -> Self {
        Self::new(DEFAULT_EPS, DEFAULT_MIN_SAMPLES)
    }
}

impl IdentityClusterer for DbscanClusterer {
    fn cluster(&self, features: &FeatureMatrix) -> ClusterAssignment {
        let points = features.view();
        let n = points.nrows();
        if n == 0 {
            return ClusterAssignment::new(Vec::new());
        }

        let neighbours = neighbourhoods(points, self.eps);
        let core: Vec<bool> = neighbours
            .iter()
            .map(|nb| nb.len() >= self.min_samples)
            .collect();

        let mut parent: Vec<usize> = (0..n).collect();
        for i in (0..n).filter(|&i| core[i]) {
            for &j in neighbours[i].iter().filter(|&&j| j > i && core[j]) {
                math::union(&mut parent, i, j);
            }
        }

        let roots: Vec<Option<usize>> = (0..n)
            .map(|i| {
                if core[i] {
                    Some(math::find(&mut parent, i))
                } else {
                    neighbours[i]
                        .iter()
                        .find(|&&j| core[j])
                        .map(|&j| math::find(&mut parent, j))
                }
            })
            .collect();

        ClusterAssignment::new(number_by_first_member(&roots))
    }
}

/// Indices within `eps` of each row, the row itself included, ascending.
fn neighbourhoods(points: ArrayView2<'_, f64>, eps: f64) -> Vec<Vec<usize>> {
    let n = points.nrows();
    let eps_sq = eps * eps;
    let mut neighbours: Vec<Vec<usize>> = (0..n).map(|i| vec![i]).collect();

    for i in 0..n {
        for j in (i + 1)..n {
            if math::squared_distance(points.row(i), points.row(j)) <= eps_sq {
                neighbours[i].push(j);
                neighbours[j].push(i);
            }
        }
    }
    for nb in &mut neighbours {
        nb.sort_unstable();
    }
    neighbours
}

/// Replaces union-find roots with labels 0, 1, 2, ... in order of each
/// cluster's first member.
fn number_by_first_member(roots: &[Option<usize>]) -> Vec<Option<usize>> {
    let mut seen: Vec<usize> = Vec::new();
    roots
        .iter()
        .map(|root| {
            root.map(|r| match seen.iter().position(|&s| s == r) {
                Some(label) => label,
                None => {
                    seen.push(r);
                    seen.len() - 1
                }
            })
        })
        .collect()
}
