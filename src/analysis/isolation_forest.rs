use rand::rngs::StdRng;
use rand::seq::index::sample as sample_indices;
use rand::{Rng, SeedableRng};

// Euler–Mascheroni constant, for the harmonic-number approximation.
const EULER_GAMMA: f64 = 0.577_215_664_901_532_9;

/// Forest configuration.  Tree count and subsample size follow the usual
/// isolation-forest defaults; the seed makes every fit reproducible.
#[derive(Debug, Clone)]
pub struct ForestParams {
    pub n_trees: usize,
    pub sample_size: usize,
    pub seed: u64,
}

impl Default for ForestParams {
    fn default() -> Self {
        ForestParams {
            n_trees: 100,
            sample_size: 256,
            seed: 42,
        }
    }
}

enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
    Leaf {
        size: usize,
    },
}

/// Isolation forest (Liu et al. 2008): points separated by few random
/// partitions score close to 1, buried points close to 0.
pub struct IsolationForest {
    trees: Vec<Node>,
    sample_size: usize,
}

impl IsolationForest {
    /// Fit a forest on `data` (rows × features, no missing values).
    /// Identical data and params always produce the identical forest.
    pub fn fit(data: &[Vec<f64>], params: &ForestParams) -> Self {
        let n = data.len();
        let sample_size = params.sample_size.min(n).max(1);
        let height_limit = (sample_size as f64).log2().ceil().max(0.0) as usize;
        let mut rng = StdRng::seed_from_u64(params.seed);

        let trees = (0..params.n_trees)
            .map(|_| {
                let indices: Vec<usize> = if sample_size >= n {
                    (0..n).collect()
                } else {
                    sample_indices(&mut rng, n, sample_size).into_vec()
                };
                build_node(data, &indices, 0, height_limit, &mut rng)
            })
            .collect();

        IsolationForest { trees, sample_size }
    }

    /// Anomaly score of one row: `2^(−E[h(x)] / c(ψ))`.
    pub fn score(&self, row: &[f64]) -> f64 {
        let c = average_path_length(self.sample_size);
        if self.trees.is_empty() || c <= 0.0 {
            return 0.5;
        }
        let mean_path: f64 = self
            .trees
            .iter()
            .map(|tree| path_length(tree, row, 0.0))
            .sum::<f64>()
            / self.trees.len() as f64;
        2f64.powf(-mean_path / c)
    }

    pub fn score_all(&self, data: &[Vec<f64>]) -> Vec<f64> {
        data.iter().map(|row| self.score(row)).collect()
    }
}

fn build_node(
    data: &[Vec<f64>],
    indices: &[usize],
    depth: usize,
    height_limit: usize,
    rng: &mut StdRng,
) -> Node {
    if depth >= height_limit || indices.len() <= 1 {
        return Node::Leaf {
            size: indices.len(),
        };
    }

    // Split candidates: features with spread among the current points.
    let n_features = data[indices[0]].len();
    let mut candidates = Vec::new();
    for feature in 0..n_features {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for &i in indices {
            min = min.min(data[i][feature]);
            max = max.max(data[i][feature]);
        }
        if max > min {
            candidates.push((feature, min, max));
        }
    }
    if candidates.is_empty() {
        return Node::Leaf {
            size: indices.len(),
        };
    }

    let (feature, min, max) = candidates[rng.gen_range(0..candidates.len())];
    let threshold = rng.gen_range(min..max);

    let (left, right): (Vec<usize>, Vec<usize>) = indices
        .iter()
        .copied()
        .partition(|&i| data[i][feature] < threshold);

    Node::Split {
        feature,
        threshold,
        left: Box::new(build_node(data, &left, depth + 1, height_limit, rng)),
        right: Box::new(build_node(data, &right, depth + 1, height_limit, rng)),
    }
}

fn path_length(node: &Node, row: &[f64], depth: f64) -> f64 {
    match node {
        Node::Leaf { size } => depth + average_path_length(*size),
        Node::Split {
            feature,
            threshold,
            left,
            right,
        } => {
            if row[*feature] < *threshold {
                path_length(left, row, depth + 1.0)
            } else {
                path_length(right, row, depth + 1.0)
            }
        }
    }
}

/// `c(n)`: expected path length of an unsuccessful BST search over n points,
/// the normaliser from the isolation-forest paper.
fn average_path_length(n: usize) -> f64 {
    match n {
        0 | 1 => 0.0,
        2 => 1.0,
        _ => {
            let n = n as f64;
            let harmonic = (n - 1.0).ln() + EULER_GAMMA;
            2.0 * harmonic - 2.0 * (n - 1.0) / n
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fit_scores(data: &[Vec<f64>], seed: u64) -> Vec<f64> {
        let params = ForestParams {
            seed,
            ..ForestParams::default()
        };
        IsolationForest::fit(data, &params).score_all(data)
    }

    #[test]
    fn isolated_point_scores_highest() {
        let data = vec![
            vec![1.0, 2.0],
            vec![2.0, 3.0],
            vec![3.0, 2.0],
            vec![1000.0, -500.0],
        ];
        let scores = fit_scores(&data, 42);

        assert_eq!(scores.len(), 4);
        for &s in &scores {
            assert!(s > 0.0 && s < 1.0);
        }
        for i in 0..3 {
            assert!(scores[3] > scores[i]);
        }
    }

    #[test]
    fn identical_seed_gives_identical_scores() {
        let data: Vec<Vec<f64>> = (0..50)
            .map(|i| vec![(i % 7) as f64, (i % 11) as f64])
            .collect();
        assert_eq!(fit_scores(&data, 7), fit_scores(&data, 7));
    }

    #[test]
    fn different_seeds_give_different_forests() {
        let data: Vec<Vec<f64>> = (0..50)
            .map(|i| vec![(i % 7) as f64, (i % 11) as f64])
            .collect();
        assert_ne!(fit_scores(&data, 1), fit_scores(&data, 2));
    }

    #[test]
    fn constant_data_collapses_to_leaves() {
        let data = vec![vec![5.0, 5.0]; 10];
        let scores = fit_scores(&data, 42);
        // Every point equally (un)isolatable.
        for &s in &scores {
            assert!((s - scores[0]).abs() < 1e-12);
        }
    }

    #[test]
    fn average_path_length_known_values() {
        assert_eq!(average_path_length(0), 0.0);
        assert_eq!(average_path_length(1), 0.0);
        assert_eq!(average_path_length(2), 1.0);
        // c(256) ≈ 10.24 for the default subsample.
        let c = average_path_length(256);
        assert!(c > 10.0 && c < 10.5);
    }
}
