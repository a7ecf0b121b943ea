//! Gradient-boosted decision trees for binary classification
//!
//! Logistic loss, Newton leaf values with L2 regularization, and
//! histogram split search over quantized feature borders:
//! 1. Quantize every feature once into at most [`MAX_BORDERS`] borders
//! 2. For each round, compute gradients/hessians of the current margins
//! 3. Grow a depth-limited tree, scanning per-feature histograms in parallel
//! 4. Add the tree's output, scaled by the learning rate, to the margins

use anyhow::Result;
use faer::Mat;
use indicatif::ProgressBar;
use rayon::prelude::*;
use serde::Serialize;

/// Boosting rounds
pub const TREE_COUNT: usize = 300;

/// Maximum tree depth
pub const TREE_DEPTH: usize = 4;

/// Shrinkage applied to every tree
pub const LEARNING_RATE: f64 = 0.05;

/// L2 regularization on leaf values
pub const L2_LEAF_REG: f64 = 3.0;

/// Maximum split borders per feature (bins fit in a `u8`)
pub const MAX_BORDERS: usize = 254;

/// Minimum gain for a split to be kept
const MIN_SPLIT_GAIN: f64 = 1e-9;

/// Floor on hessians to keep Newton steps finite
const MIN_HESSIAN: f64 = 1e-16;

/// Clamp on the base rate before taking its log-odds
const BASE_RATE_EPS: f64 = 1e-6;

/// Boosting hyperparameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoostParams {
    pub trees: usize,
    pub depth: usize,
    pub learning_rate: f64,
    pub l2_leaf_reg: f64,
}

impl Default for BoostParams {
    fn default() -> Self {
        Self {
            trees: TREE_COUNT,
            depth: TREE_DEPTH,
            learning_rate: LEARNING_RATE,
            l2_leaf_reg: L2_LEAF_REG,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        /// Rows with `value <= threshold` go left
        threshold: f64,
        /// Bin index matching `threshold`
        bin: u8,
        left: usize,
        right: usize,
    },
}

/// A single regression tree stored as a flat node list (root at 0)
#[derive(Debug, Clone, PartialEq)]
struct RegressionTree {
    nodes: Vec<Node>,
}

impl RegressionTree {
    fn predict(&self, row: &[f64]) -> f64 {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                Node::Leaf { value } => return *value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                    ..
                } => idx = if row[*feature] <= *threshold { *left } else { *right },
            }
        }
    }

    fn predict_binned(&self, bins: &[Vec<u8>], row: usize) -> f64 {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                Node::Leaf { value } => return *value,
                Node::Split {
                    feature,
                    bin,
                    left,
                    right,
                    ..
                } => idx = if bins[*feature][row] <= *bin { *left } else { *right },
            }
        }
    }
}

/// Sorted split thresholds for one feature
fn feature_borders(values: &[f64]) -> Vec<f64> {
    let mut sorted: Vec<f64> = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let mut distinct = sorted.clone();
    distinct.dedup();
    if distinct.len() < 2 {
        return Vec::new();
    }

    if distinct.len() - 1 <= MAX_BORDERS {
        return distinct.windows(2).map(|w| (w[0] + w[1]) / 2.0).collect();
    }

    // Too many distinct values: equal-frequency borders
    let n = sorted.len();
    let mut borders: Vec<f64> = (1..=MAX_BORDERS)
        .map(|i| sorted[(i * n / (MAX_BORDERS + 1)).min(n - 1)])
        .collect();
    borders.dedup();
    if borders.last() == distinct.last() {
        borders.pop();
    }
    borders
}

/// Bin of a value: the number of borders strictly below it
fn bin_of(borders: &[f64], value: f64) -> u8 {
    borders.partition_point(|b| *b < value) as u8
}

#[derive(Debug, Clone, Copy)]
struct SplitCandidate {
    feature: usize,
    bin: u8,
    gain: f64,
}

struct GrowContext<'a> {
    bins: &'a [Vec<u8>],
    borders: &'a [Vec<f64>],
    grad: &'a [f64],
    hess: &'a [f64],
    params: &'a BoostParams,
}

impl GrowContext<'_> {
    fn score(&self, g: f64, h: f64) -> f64 {
        g * g / (h + self.params.l2_leaf_reg)
    }

    fn leaf_value(&self, g: f64, h: f64) -> f64 {
        g / (h + self.params.l2_leaf_reg)
    }

    fn best_split_for_feature(
        &self,
        feature: usize,
        rows: &[usize],
        g_total: f64,
        h_total: f64,
    ) -> Option<SplitCandidate> {
        let n_borders = self.borders[feature].len();
        if n_borders == 0 {
            return None;
        }

        let mut g_hist = vec![0.0f64; n_borders + 1];
        let mut h_hist = vec![0.0f64; n_borders + 1];
        let mut c_hist = vec![0usize; n_borders + 1];
        let column = &self.bins[feature];
        for &r in rows {
            let b = column[r] as usize;
            g_hist[b] += self.grad[r];
            h_hist[b] += self.hess[r];
            c_hist[b] += 1;
        }

        let parent = self.score(g_total, h_total);
        let mut best: Option<SplitCandidate> = None;
        let (mut g_left, mut h_left, mut c_left) = (0.0, 0.0, 0usize);

        for b in 0..n_borders {
            g_left += g_hist[b];
            h_left += h_hist[b];
            c_left += c_hist[b];
            if c_left == 0 || c_left == rows.len() {
                continue;
            }
            let gain = self.score(g_left, h_left) + self.score(g_total - g_left, h_total - h_left)
                - parent;
            if gain > MIN_SPLIT_GAIN && best.map_or(true, |s| gain > s.gain) {
                best = Some(SplitCandidate {
                    feature,
                    bin: b as u8,
                    gain,
                });
            }
        }

        best
    }

    fn grow(&self, rows: Vec<usize>, depth: usize, nodes: &mut Vec<Node>) -> usize {
        let g_total: f64 = rows.iter().map(|&r| self.grad[r]).sum();
        let h_total: f64 = rows.iter().map(|&r| self.hess[r]).sum();

        let idx = nodes.len();
        nodes.push(Node::Leaf {
            value: self.leaf_value(g_total, h_total),
        });

        if depth >= self.params.depth || rows.len() < 2 {
            return idx;
        }

        // Ordered collect keeps ties deterministic: the lowest feature index wins
        let candidates: Vec<Option<SplitCandidate>> = (0..self.bins.len())
            .into_par_iter()
            .map(|f| self.best_split_for_feature(f, &rows, g_total, h_total))
            .collect();
        let best = candidates
            .into_iter()
            .flatten()
            .fold(None, |best: Option<SplitCandidate>, c| match best {
                Some(b) if b.gain >= c.gain => Some(b),
                _ => Some(c),
            });

        let Some(split) = best else {
            return idx;
        };

        let column = &self.bins[split.feature];
        let (left_rows, right_rows): (Vec<usize>, Vec<usize>) =
            rows.into_iter().partition(|&r| column[r] <= split.bin);

        let left = self.grow(left_rows, depth + 1, nodes);
        let right = self.grow(right_rows, depth + 1, nodes);
        nodes[idx] = Node::Split {
            feature: split.feature,
            threshold: self.borders[split.feature][split.bin as usize],
            bin: split.bin,
            left,
            right,
        };
        idx
    }
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// A fitted boosted ensemble over a fixed number of features
#[derive(Debug, Clone, PartialEq)]
pub struct BoostedTrees {
    params: BoostParams,
    n_features: usize,
    base_margin: f64,
    trees: Vec<RegressionTree>,
}

impl BoostedTrees {
    /// Fit on `x` (rows × features) against 0/1 labels `y`.
    ///
    /// `progress`, when given, is advanced once per tree.
    pub fn fit(
        x: &Mat<f64>,
        y: &[f64],
        params: BoostParams,
        progress: Option<&ProgressBar>,
    ) -> Result<Self> {
        let (n_rows, n_features) = (x.nrows(), x.ncols());
        if n_rows == 0 {
            anyhow::bail!("Cannot fit a model on zero rows");
        }
        if y.len() != n_rows {
            anyhow::bail!(
                "Label count {} does not match row count {}",
                y.len(),
                n_rows
            );
        }

        let borders: Vec<Vec<f64>> = (0..n_features)
            .into_par_iter()
            .map(|j| {
                let column: Vec<f64> = (0..n_rows).map(|i| x[(i, j)]).collect();
                feature_borders(&column)
            })
            .collect();
        let bins: Vec<Vec<u8>> = borders
            .par_iter()
            .enumerate()
            .map(|(j, b)| (0..n_rows).map(|i| bin_of(b, x[(i, j)])).collect())
            .collect();

        let base_rate = (y.iter().sum::<f64>() / n_rows as f64)
            .clamp(BASE_RATE_EPS, 1.0 - BASE_RATE_EPS);
        let base_margin = (base_rate / (1.0 - base_rate)).ln();

        let mut margins = vec![base_margin; n_rows];
        let mut trees = Vec::with_capacity(params.trees);

        for _ in 0..params.trees {
            let (grad, hess): (Vec<f64>, Vec<f64>) = margins
                .iter()
                .zip(y)
                .map(|(&m, &label)| {
                    let p = sigmoid(m);
                    (label - p, (p * (1.0 - p)).max(MIN_HESSIAN))
                })
                .unzip();

            let ctx = GrowContext {
                bins: &bins,
                borders: &borders,
                grad: &grad,
                hess: &hess,
                params: &params,
            };
            let mut nodes = Vec::new();
            ctx.grow((0..n_rows).collect(), 0, &mut nodes);
            let tree = RegressionTree { nodes };

            for (row, margin) in margins.iter_mut().enumerate() {
                *margin += params.learning_rate * tree.predict_binned(&bins, row);
            }
            trees.push(tree);

            if let Some(pb) = progress {
                pb.inc(1);
            }
        }

        Ok(Self {
            params,
            n_features,
            base_margin,
            trees,
        })
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn params(&self) -> &BoostParams {
        &self.params
    }

    /// Raw log-odds for one row
    pub fn margin(&self, row: &[f64]) -> f64 {
        self.trees.iter().fold(self.base_margin, |acc, tree| {
            acc + self.params.learning_rate * tree.predict(row)
        })
    }

    /// Probability of the positive class for one row
    pub fn predict_proba(&self, row: &[f64]) -> f64 {
        sigmoid(self.margin(row))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(trees: usize) -> BoostParams {
        BoostParams {
            trees,
            ..Default::default()
        }
    }

    #[test]
    fn test_feature_borders_midpoints() {
        assert_eq!(feature_borders(&[3.0, 1.0, 2.0, 2.0]), vec![1.5, 2.5]);
        assert!(feature_borders(&[4.0, 4.0]).is_empty());
    }

    #[test]
    fn test_feature_borders_capped() {
        let values: Vec<f64> = (0..10_000).map(|i| i as f64).collect();
        let borders = feature_borders(&values);
        assert!(borders.len() <= MAX_BORDERS);
        assert!(borders.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_bin_of_matches_threshold_rule() {
        let borders = vec![1.5, 2.5];
        assert_eq!(bin_of(&borders, 1.0), 0);
        assert_eq!(bin_of(&borders, 1.5), 0);
        assert_eq!(bin_of(&borders, 2.0), 1);
        assert_eq!(bin_of(&borders, 9.0), 2);
    }

    #[test]
    fn test_constant_labels_predict_base_rate() {
        let x = Mat::<f64>::from_fn(4, 1, |i, _| i as f64);
        let model = BoostedTrees::fit(&x, &[0.0; 4], params(5), None).unwrap();
        assert!(model.predict_proba(&[2.0]) < 0.01);
    }

    #[test]
    fn test_learns_threshold() {
        let n = 40;
        let x = Mat::<f64>::from_fn(n, 2, |i, j| if j == 0 { i as f64 } else { (i % 3) as f64 });
        let y: Vec<f64> = (0..n).map(|i| if i >= 20 { 1.0 } else { 0.0 }).collect();

        let model = BoostedTrees::fit(&x, &y, params(100), None).unwrap();

        assert_eq!(model.n_trees(), 100);
        assert!(model.predict_proba(&[35.0, 1.0]) > 0.8);
        assert!(model.predict_proba(&[3.0, 1.0]) < 0.2);
    }

    #[test]
    fn test_rejects_label_mismatch() {
        let x = Mat::<f64>::zeros(3, 1);
        assert!(BoostedTrees::fit(&x, &[0.0, 1.0], params(1), None).is_err());
    }
}
