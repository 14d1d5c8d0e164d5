//! Random-forest regressor (bagged CART trees with an MSE split criterion).

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use super::training::TrainingSet;
use super::{check_schema, FeatureVector, Predictor};
use crate::error::PredictError;

/// Random forest configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForestConfig {
    /// Number of trees in the forest
    pub n_trees: usize,
    /// Maximum depth of each tree
    pub max_depth: usize,
    /// Minimum samples to split
    pub min_samples_split: usize,
    /// Minimum samples in leaf
    pub min_samples_leaf: usize,
    /// Features considered per split (all if None)
    pub max_features: Option<usize>,
    /// Bootstrap sampling
    pub bootstrap: bool,
    /// Random seed
    pub seed: u64,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_trees: 100,
            max_depth: 12,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
            bootstrap: true,
            seed: 42,
        }
    }
}

// ---------------------------------------------------------------------------
// Regression tree
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
enum Node {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

impl Node {
    fn predict(&self, row: &[f64]) -> f64 {
        let mut node = self;
        loop {
            match node {
                Node::Leaf { value } => return *value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if row[*feature] <= *threshold { left } else { right };
                }
            }
        }
    }

    /// First split feature index outside `0..n_features`, if any.
    fn invalid_feature(&self, n_features: usize) -> Option<usize> {
        match self {
            Node::Leaf { .. } => None,
            Node::Split {
                feature,
                left,
                right,
                ..
            } => {
                if *feature >= n_features {
                    Some(*feature)
                } else {
                    left.invalid_feature(n_features)
                        .or_else(|| right.invalid_feature(n_features))
                }
            }
        }
    }

    fn depth(&self) -> usize {
        match self {
            Node::Leaf { .. } => 1,
            Node::Split { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }
}

struct BestSplit {
    feature: usize,
    threshold: f64,
    gain: f64,
}

/// Sum of squared deviations from the mean, from running sums.
fn sse(sum: f64, sum_sq: f64, n: usize) -> f64 {
    if n == 0 {
        0.0
    } else {
        (sum_sq - sum * sum / n as f64).max(0.0)
    }
}

struct TreeBuilder<'a> {
    config: &'a ForestConfig,
    data: &'a TrainingSet,
    max_features: usize,
    rng: ChaCha8Rng,
}

impl TreeBuilder<'_> {
    fn build(&mut self, indices: &mut [usize], depth: usize) -> Node {
        let n = indices.len();
        let (sum, sum_sq) = indices.iter().fold((0.0, 0.0), |(s, q), &i| {
            let y = self.data.targets[i];
            (s + y, q + y * y)
        });
        let mean = if n == 0 { 0.0 } else { sum / n as f64 };
        let impurity = sse(sum, sum_sq, n);

        if depth >= self.config.max_depth
            || n < 2
            || n < self.config.min_samples_split
            || n < 2 * self.config.min_samples_leaf
            || impurity < 1e-10
        {
            return Node::Leaf { value: mean };
        }

        let Some(best) = self.find_best_split(indices, sum, sum_sq, impurity) else {
            return Node::Leaf { value: mean };
        };

        let feature = best.feature;
        let threshold = best.threshold;
        let data = self.data;
        let mid = partition(indices, |i| data.features[i][feature] <= threshold);
        let (left_idx, right_idx) = indices.split_at_mut(mid);

        let left = self.build(left_idx, depth + 1);
        let right = self.build(right_idx, depth + 1);
        Node::Split {
            feature,
            threshold,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    fn find_best_split(
        &mut self,
        indices: &[usize],
        total_sum: f64,
        total_sq: f64,
        parent_impurity: f64,
    ) -> Option<BestSplit> {
        let n_features = self.data.n_features();
        let mut candidates: Vec<usize> = (0..n_features).collect();
        candidates.shuffle(&mut self.rng);
        candidates.truncate(self.max_features);

        let n = indices.len();
        let min_leaf = self.config.min_samples_leaf.max(1);
        let mut best: Option<BestSplit> = None;
        let mut order: Vec<usize> = indices.to_vec();

        for &feature in &candidates {
            let x = |i: usize| self.data.features[i][feature];
            order.sort_by(|&a, &b| x(a).total_cmp(&x(b)));

            // Sweep thresholds left→right with running sums.
            let mut left_sum = 0.0;
            let mut left_sq = 0.0;
            for k in 0..n - 1 {
                let y = self.data.targets[order[k]];
                left_sum += y;
                left_sq += y * y;

                let n_left = k + 1;
                let n_right = n - n_left;
                if n_left < min_leaf || n_right < min_leaf {
                    continue;
                }
                let (lo, hi) = (x(order[k]), x(order[k + 1]));
                if lo == hi {
                    continue;
                }

                let child = sse(left_sum, left_sq, n_left)
                    + sse(total_sum - left_sum, total_sq - left_sq, n_right);
                let gain = parent_impurity - child;
                if gain > 1e-12 && best.as_ref().map_or(true, |b| gain > b.gain) {
                    best = Some(BestSplit {
                        feature,
                        threshold: (lo + hi) / 2.0,
                        gain,
                    });
                }
            }
        }
        best
    }
}

/// Reorder `items` so that those matching `pred` come first; returns their count.
fn partition<F: Fn(usize) -> bool>(items: &mut [usize], pred: F) -> usize {
    let mut mid = 0;
    for j in 0..items.len() {
        if pred(items[j]) {
            items.swap(mid, j);
            mid += 1;
        }
    }
    mid
}

// ---------------------------------------------------------------------------
// Random forest
// ---------------------------------------------------------------------------

/// Trained random forest; serializes to JSON together with its input schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    config: ForestConfig,
    feature_names: Vec<String>,
    trees: Vec<Node>,
}

impl RandomForest {
    /// Fit one tree per configured seed offset. Deterministic for a given
    /// `config.seed`. An empty training set yields a forest with no trees.
    pub fn fit(config: &ForestConfig, data: &TrainingSet) -> Self {
        let n = data.len();
        let n_features = data.n_features();
        let max_features = config
            .max_features
            .unwrap_or(n_features)
            .clamp(1, n_features.max(1));

        let mut trees = Vec::with_capacity(config.n_trees);
        if n > 0 {
            for t in 0..config.n_trees {
                let mut rng = ChaCha8Rng::seed_from_u64(config.seed.wrapping_add(t as u64));
                let mut indices: Vec<usize> = if config.bootstrap {
                    (0..n).map(|_| rng.gen_range(0..n)).collect()
                } else {
                    (0..n).collect()
                };
                let mut builder = TreeBuilder {
                    config,
                    data,
                    max_features,
                    rng,
                };
                trees.push(builder.build(&mut indices, 0));
                log::debug!("tree {}/{} fitted", t + 1, config.n_trees);
            }
        }

        RandomForest {
            config: config.clone(),
            feature_names: data.feature_names.clone(),
            trees,
        }
    }

    pub fn config(&self) -> &ForestConfig {
        &self.config
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Depth of the deepest tree.
    pub fn max_depth(&self) -> usize {
        self.trees.iter().map(Node::depth).max().unwrap_or(0)
    }

    /// Predict for a raw row laid out as [`Predictor::feature_names`].
    pub fn predict_row(&self, row: &[f64]) -> Result<f64, PredictError> {
        if self.trees.is_empty() {
            return Err(PredictError::Untrained);
        }
        if row.len() != self.feature_names.len() {
            return Err(PredictError::EncodingMismatch {
                expected: self.feature_names.clone(),
                actual: (0..row.len()).map(|i| format!("#{i}")).collect(),
            });
        }
        let sum: f64 = self.trees.iter().map(|t| t.predict(row)).sum();
        Ok(sum / self.trees.len() as f64)
    }

    pub fn save(&self, path: &Path) -> Result<(), PredictError> {
        let file = File::create(path).map_err(|source| PredictError::ModelIo {
            path: path.to_path_buf(),
            source,
        })?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, self)?;
        writer.flush().map_err(|source| PredictError::ModelIo {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn load(path: &Path) -> Result<Self, PredictError> {
        let file = File::open(path).map_err(|source| PredictError::ModelIo {
            path: path.to_path_buf(),
            source,
        })?;
        let forest: RandomForest = serde_json::from_reader(BufReader::new(file))?;
        forest.validate()?;
        Ok(forest)
    }

    /// Reject a deserialized forest that could not predict.
    fn validate(&self) -> Result<(), PredictError> {
        if self.trees.is_empty() {
            return Err(PredictError::Untrained);
        }
        let n_features = self.feature_names.len();
        for (t, tree) in self.trees.iter().enumerate() {
            if let Some(feature) = tree.invalid_feature(n_features) {
                return Err(PredictError::InvalidModel(format!(
                    "tree {t} splits on feature {feature}, but the model has {n_features} features"
                )));
            }
        }
        Ok(())
    }
}

impl Predictor for RandomForest {
    fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    fn predict(&self, features: &FeatureVector) -> Result<f64, PredictError> {
        check_schema(&self.feature_names, features)?;
        self.predict_row(features.values())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// y = 10 for x < 5, y = 50 otherwise; second feature is noise.
    fn step_data() -> TrainingSet {
        let mut set = TrainingSet::new(vec!["x".into(), "noise".into()]);
        for i in 0..40 {
            let x = i as f64 / 4.0;
            let y = if x < 5.0 { 10.0 } else { 50.0 };
            set.push(vec![x, (i * 7 % 5) as f64], y);
        }
        set
    }

    fn row(x: f64) -> FeatureVector {
        [("x", x), ("noise", 0.0)].into_iter().collect()
    }

    #[test]
    fn single_tree_learns_a_step() {
        let config = ForestConfig {
            n_trees: 1,
            bootstrap: false,
            ..Default::default()
        };
        let forest = RandomForest::fit(&config, &step_data());
        assert_eq!(forest.predict(&row(1.0)).unwrap(), 10.0);
        assert_eq!(forest.predict(&row(9.0)).unwrap(), 50.0);
        assert_eq!(forest.max_depth(), 2);
    }

    #[test]
    fn forest_averages_trees() {
        let config = ForestConfig {
            n_trees: 25,
            ..Default::default()
        };
        let forest = RandomForest::fit(&config, &step_data());
        assert_eq!(forest.n_trees(), 25);
        let low = forest.predict(&row(0.5)).unwrap();
        let high = forest.predict(&row(9.5)).unwrap();
        assert!(low < 20.0, "low = {low}");
        assert!(high > 40.0, "high = {high}");
    }

    #[test]
    fn fitting_is_deterministic_for_a_seed() {
        let config = ForestConfig {
            n_trees: 5,
            max_features: Some(1),
            ..Default::default()
        };
        let a = RandomForest::fit(&config, &step_data());
        let b = RandomForest::fit(&config, &step_data());
        assert_eq!(a, b);
    }

    #[test]
    fn min_samples_leaf_limits_growth() {
        let config = ForestConfig {
            n_trees: 1,
            bootstrap: false,
            min_samples_leaf: 30,
            ..Default::default()
        };
        let forest = RandomForest::fit(&config, &step_data());
        // 40 rows cannot be split into two leaves of 30.
        assert_eq!(forest.max_depth(), 1);
    }

    #[test]
    fn mismatched_vector_is_rejected() {
        let forest = RandomForest::fit(&ForestConfig::default(), &step_data());
        let swapped: FeatureVector = [("noise", 0.0), ("x", 1.0)].into_iter().collect();
        assert!(matches!(
            forest.predict(&swapped),
            Err(PredictError::EncodingMismatch { .. })
        ));
    }

    #[test]
    fn empty_training_set_is_untrained() {
        let forest = RandomForest::fit(
            &ForestConfig::default(),
            &TrainingSet::new(vec!["x".into(), "noise".into()]),
        );
        assert!(matches!(forest.predict(&row(1.0)), Err(PredictError::Untrained)));
    }

    #[test]
    fn save_then_load_predicts_the_same() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        let forest = RandomForest::fit(
            &ForestConfig {
                n_trees: 10,
                ..Default::default()
            },
            &step_data(),
        );
        forest.save(&path).unwrap();

        let loaded = RandomForest::load(&path).unwrap();
        let first = loaded.predict(&row(3.3)).unwrap();
        for _ in 0..5 {
            assert_eq!(loaded.predict(&row(3.3)).unwrap(), first);
        }
        assert_eq!(first, forest.predict(&row(3.3)).unwrap());
    }

    #[test]
    fn load_rejects_out_of_range_split_feature() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        let json = r#"{
            "config": {},
            "feature_names": ["x", "noise"],
            "trees": [{"split": {"feature": 99, "threshold": 1.0,
                       "left": {"leaf": {"value": 1.0}},
                       "right": {"leaf": {"value": 2.0}}}}]
        }"#;
        std::fs::write(&path, json).unwrap();
        assert!(matches!(
            RandomForest::load(&path),
            Err(PredictError::InvalidModel(_))
        ));
    }

    #[test]
    fn load_rejects_forest_without_trees() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        std::fs::write(&path, r#"{"config": {}, "feature_names": ["x"], "trees": []}"#).unwrap();
        assert!(matches!(RandomForest::load(&path), Err(PredictError::Untrained)));
    }

    #[test]
    fn short_row_is_rejected() {
        let forest = RandomForest::fit(&ForestConfig::default(), &step_data());
        assert!(matches!(
            forest.predict_row(&[1.0]),
            Err(PredictError::EncodingMismatch { .. })
        ));
        assert!(forest.predict_row(&[1.0, 0.0]).is_ok());
    }
}
