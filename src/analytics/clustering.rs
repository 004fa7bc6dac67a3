//! Single-linkage clustering of categories over a correlation matrix
//!
//! Categories are nodes; an edge joins two categories whose correlation
//! score reaches the threshold. Every connected component with at least two
//! members becomes a [`Cluster`], so membership propagates transitively
//! through intermediate categories.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

use super::correlation::CorrelationEntry;
use super::error::{AnalysisError, AnalysisResult};

/// Default similarity threshold for clustering
pub const DEFAULT_CORRELATION_THRESHOLD: f64 = 0.6;

/// A maximal group of transitively correlated categories
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cluster {
    /// Member categories (always at least two)
    pub categories: BTreeSet<String>,

    /// Mean score of the intra-cluster pairs present in the matrix
    pub avg_correlation: f64,
}

impl Cluster {
    #[must_use]
    pub fn contains(&self, category: &str) -> bool {
        self.categories.contains(category)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.categories.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Other members of the cluster, in name order
    #[must_use]
    pub fn neighbors_of(&self, category: &str) -> Vec<String> {
        if !self.contains(category) {
            return Vec::new();
        }
        self.categories
            .iter()
            .filter(|c| c.as_str() != category)
            .cloned()
            .collect()
    }
}

// ── Union-Find ──────────────────────────────────────────────────────────────

struct UnionFind {
    parent: Vec<usize>,
    rank: Vec<usize>,
}

impl UnionFind {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
            rank: vec![0; n],
        }
    }

    fn find(&mut self, x: usize) -> usize {
        let mut root = x;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        // path compression
        let mut node = x;
        while self.parent[node] != root {
            let next = self.parent[node];
            self.parent[node] = root;
            node = next;
        }
        root
    }

    fn union(&mut self, x: usize, y: usize) {
        let rx = self.find(x);
        let ry = self.find(y);
        if rx == ry {
            return;
        }
        match self.rank[rx].cmp(&self.rank[ry]) {
            std::cmp::Ordering::Less => self.parent[rx] = ry,
            std::cmp::Ordering::Greater => self.parent[ry] = rx,
            std::cmp::Ordering::Equal => {
                self.parent[ry] = rx;
                self.rank[rx] += 1;
            }
        }
    }
}

/// Group categories into clusters of transitively correlated members
///
/// # Arguments
/// * `entries` - Pairwise correlation entries from a single window
/// * `threshold` - Minimum score for an edge, within `0.0..=1.0`
///
/// # Returns
/// Clusters sorted by size, then average correlation (both descending),
/// then first member name. Categories without a qualifying edge are omitted.
pub fn cluster(entries: &[CorrelationEntry], threshold: f64) -> AnalysisResult<Vec<Cluster>> {
    if !(0.0..=1.0).contains(&threshold) {
        return Err(AnalysisError::InvalidThreshold(threshold));
    }

    // Stable node indices in sorted name order
    let names: BTreeSet<&str> = entries
        .iter()
        .flat_map(|e| [e.category_a.as_str(), e.category_b.as_str()])
        .collect();
    let index: HashMap<&str, usize> = names.iter().enumerate().map(|(i, n)| (*n, i)).collect();
    let names: Vec<&str> = names.into_iter().collect();

    let mut uf = UnionFind::new(names.len());
    let mut edges = 0usize;
    for entry in entries.iter().filter(|e| e.score >= threshold) {
        if entry.category_a == entry.category_b {
            continue;
        }
        uf.union(index[entry.category_a.as_str()], index[entry.category_b.as_str()]);
        edges += 1;
    }

    let mut components: HashMap<usize, BTreeSet<String>> = HashMap::new();
    for (i, name) in names.iter().enumerate() {
        let root = uf.find(i);
        components.entry(root).or_default().insert((*name).to_string());
    }

    let mut clusters: Vec<Cluster> = components
        .into_values()
        .filter(|members| members.len() >= 2)
        .map(|categories| {
            let avg_correlation = average_intra_score(entries, &categories);
            Cluster {
                categories,
                avg_correlation,
            }
        })
        .collect();

    clusters.sort_by(|a, b| {
        b.len()
            .cmp(&a.len())
            .then_with(|| {
                b.avg_correlation
                    .partial_cmp(&a.avg_correlation)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .then_with(|| a.categories.iter().next().cmp(&b.categories.iter().next()))
    });

    tracing::debug!(
        categories = names.len(),
        edges,
        clusters = clusters.len(),
        threshold,
        "Clustered categories"
    );

    Ok(clusters)
}

/// Mean score over the matrix entries whose both ends are members
fn average_intra_score(entries: &[CorrelationEntry], members: &BTreeSet<String>) -> f64 {
    let scores: Vec<f64> = entries
        .iter()
        .filter(|e| members.contains(&e.category_a) && members.contains(&e.category_b))
        .map(|e| e.score)
        .collect();

    if scores.is_empty() {
        0.0
    } else {
        scores.iter().sum::<f64>() / scores.len() as f64
    }
}
