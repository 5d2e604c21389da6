//! Isolation Forest evaluator
//!
//! Evaluates a fitted tree ensemble loaded from a JSON artifact. The scoring
//! contract follows the source model family exactly:
//!
//! - per-tree path length `h(x)` is the split depth to the reached leaf plus
//!   `c(n)` for the `n` training samples that reached that leaf;
//! - `s(x) = 2^(-E[h(x)] / c(max_samples))`;
//! - `score_samples` is `-s(x)`, in `[-1, 0]`;
//! - `decision_function` is `score_samples - offset`;
//! - `predict` returns `-1` (anomaly) iff the decision value is negative,
//!   `+1` otherwise.

use ndarray::{Array2, ArrayView1};
use serde::{Deserialize, Serialize};

use super::DetectorError;

/// Raw output value designating an anomalous row.
pub const OUTLIER_SENTINEL: i8 = -1;

/// Raw output value designating a normal row.
pub const INLIER_SENTINEL: i8 = 1;

const EULER_GAMMA: f64 = 0.577_215_664_901_532_9;

/// One node of an isolation tree, index-linked within the tree's node array.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        n_samples: u64,
    },
}

/// A single fitted isolation tree. Node 0 is the root.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IsolationTree {
    pub nodes: Vec<TreeNode>,
}

/// A fitted Isolation Forest, deserialized from the model artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IsolationForest {
    /// Feature count the forest was fitted on
    pub n_features: usize,
    /// Sub-sample size used during fitting; normalizes path lengths
    pub max_samples: u64,
    /// Decision offset fitted alongside the forest
    #[serde(default = "default_offset")]
    pub offset: f64,
    pub trees: Vec<IsolationTree>,
}

fn default_offset() -> f64 {
    -0.5
}

/// Expected path length of an unsuccessful search in a tree built from
/// `n` samples. Harmonic-number approximation `H(i) ~= ln(i) + gamma`.
pub fn average_path_length(n: u64) -> f64 {
    match n {
        0 | 1 => 0.0,
        2 => 1.0,
        _ => {
            let n = n as f64;
            2.0 * ((n - 1.0).ln() + EULER_GAMMA) - 2.0 * (n - 1.0) / n
        }
    }
}

impl IsolationTree {
    /// Walk one row to its leaf and return the path length.
    fn path_length(&self, row: ArrayView1<'_, f64>) -> Result<f64, DetectorError> {
        let mut idx = 0usize;
        let mut depth = 0.0f64;

        // A well-formed tree reaches a leaf within nodes.len() steps.
        for _ in 0..=self.nodes.len() {
            match self.nodes.get(idx) {
                Some(TreeNode::Split { feature, threshold, left, right }) => {
                    let value = *row
                        .get(*feature)
                        .ok_or_else(|| DetectorError::MalformedTree(format!(
                            "split references feature {} beyond row width {}",
                            feature,
                            row.len()
                        )))?;
                    idx = if value <= *threshold { *left } else { *right };
                    depth += 1.0;
                }
                Some(TreeNode::Leaf { n_samples }) => {
                    return Ok(depth + average_path_length(*n_samples));
                }
                None => {
                    return Err(DetectorError::MalformedTree(format!(
                        "node index {} out of range ({} nodes)",
                        idx,
                        self.nodes.len()
                    )));
                }
            }
        }

        Err(DetectorError::MalformedTree("cycle in tree node links".to_string()))
    }
}

impl IsolationForest {
    /// Structural checks run once at load time: every split must reference a
    /// valid feature and in-range child nodes.
    pub fn validate(&self) -> Result<(), String> {
        if self.trees.is_empty() {
            return Err("forest has no trees".to_string());
        }
        if self.n_features == 0 {
            return Err("forest declares zero features".to_string());
        }
        if self.max_samples < 2 {
            return Err("max_samples must be at least 2".to_string());
        }
        for (t, tree) in self.trees.iter().enumerate() {
            if tree.nodes.is_empty() {
                return Err(format!("tree {} has no nodes", t));
            }
            for (i, node) in tree.nodes.iter().enumerate() {
                if let TreeNode::Split { feature, threshold, left, right } = node {
                    if *feature >= self.n_features {
                        return Err(format!(
                            "tree {} node {}: feature {} out of range ({} features)",
                            t, i, feature, self.n_features
                        ));
                    }
                    if !threshold.is_finite() {
                        return Err(format!("tree {} node {}: non-finite threshold", t, i));
                    }
                    if *left >= tree.nodes.len() || *right >= tree.nodes.len() {
                        return Err(format!("tree {} node {}: child index out of range", t, i));
                    }
                }
            }
        }
        Ok(())
    }

    /// Anomaly scores in `[-1, 0]`; more negative means more anomalous.
    pub fn score_samples(&self, x: &Array2<f64>) -> Result<Vec<f64>, DetectorError> {
        let norm = average_path_length(self.max_samples);
        let mut scores = Vec::with_capacity(x.nrows());

        for row in x.rows() {
            let mut total = 0.0f64;
            for tree in &self.trees {
                total += tree.path_length(row)?;
            }
            let mean_depth = total / self.trees.len() as f64;
            scores.push(-(2.0f64.powf(-mean_depth / norm)));
        }
        Ok(scores)
    }

    /// Shifted scores: negative means anomaly, non-negative means normal.
    pub fn decision_function(&self, x: &Array2<f64>) -> Result<Vec<f64>, DetectorError> {
        let mut scores = self.score_samples(x)?;
        for s in &mut scores {
            *s -= self.offset;
        }
        Ok(scores)
    }

    /// Raw binary labels: `-1` for anomalies, `+1` for normal rows.
    pub fn predict(&self, x: &Array2<f64>) -> Result<Vec<i8>, DetectorError> {
        Ok(self
            .decision_function(x)?
            .into_iter()
            .map(|d| if d < 0.0 { OUTLIER_SENTINEL } else { INLIER_SENTINEL })
            .collect())
    }
}

/// Depth-2 tree splitting on feature 0: values above 10 isolate
/// immediately, values at or below 5 land in a populated leaf.
#[cfg(test)]
pub(crate) fn test_forest() -> IsolationForest {
    IsolationForest {
        n_features: 3,
        max_samples: 4,
        offset: -0.5,
        trees: vec![IsolationTree {
            nodes: vec![
                TreeNode::Split { feature: 0, threshold: 10.0, left: 1, right: 2 },
                TreeNode::Split { feature: 0, threshold: 5.0, left: 3, right: 4 },
                TreeNode::Leaf { n_samples: 1 },
                TreeNode::Leaf { n_samples: 2 },
                TreeNode::Leaf { n_samples: 1 },
            ],
        }],
    }
}
