//! Weighted branch sampling
//!
//! Branches are drawn by inverse-transform sampling: one uniform draw `u` is
//! compared against the cumulative weights of the level, taken in branch
//! storage order, and the first branch whose cumulative weight reaches `u`
//! wins. Given the same branch order and the same draw, the outcome is the
//! same, so a realization can be replayed from its seed.
//!
//! Each call consumes exactly one draw. Callers running realizations in
//! parallel give each one its own source.

use crate::level::WEIGHT_TOLERANCE;
use crate::path::PathLabel;
use crate::tree::LogicTree;
use crate::{Error, Result};
use tracing::{debug, trace, warn};

/// Source of uniform draws in `[0, 1)`
pub trait UniformSource {
    fn next_uniform(&mut self) -> f64;
}

impl<R: rand::Rng + ?Sized> UniformSource for R {
    fn next_uniform(&mut self) -> f64 {
        self.gen::<f64>()
    }
}

/// Inclusive prefix sums of `weights`, in the given order
pub fn cumulative_weights(weights: &[f64]) -> Vec<f64> {
    weights
        .iter()
        .scan(0.0, |acc, w| {
            *acc += w;
            Some(*acc)
        })
        .collect()
}

impl<E> LogicTree<E> {
    /// Draw one branch at `level_index` and return its relative id
    ///
    /// If the cumulative weights never reach the draw, the level's weight sum
    /// is checked: within [`WEIGHT_TOLERANCE`] of 1.0 the shortfall is float
    /// rounding and the last positively weighted branch is returned; otherwise
    /// the level is malformed and `SamplingUnderflow` is returned.
    pub fn sample_branching_level<S>(&self, level_index: usize, source: &mut S) -> Result<u32>
    where
        S: UniformSource + ?Sized,
    {
        let level = self.branching_level(level_index)?;

        let (ids, weights): (Vec<u32>, Vec<f64>) = level
            .branches()
            .iter()
            .map(|b| (b.relative_id(), b.weight()))
            .unzip();

        let fallback = ids
            .iter()
            .zip(&weights)
            .rev()
            .find(|(_, &w)| w > 0.0)
            .map(|(&id, _)| id)
            .ok_or(Error::EmptyLevel(level_index))?;

        let cdf = cumulative_weights(&weights);
        let u = source.next_uniform();
        trace!(level = level_index, draw = u, cdf = ?cdf, "Sampling branching level");

        // zero-weight branches share their predecessor's cumulative weight and
        // must not win a draw of exactly that value
        if let Some(position) = cdf
            .iter()
            .zip(&weights)
            .position(|(&c, &w)| w > 0.0 && c >= u)
        {
            let sampled = ids[position];
            debug!(level = level_index, draw = u, branch = sampled, "Sampled branch");
            return Ok(sampled);
        }

        let total = cdf.last().copied().unwrap_or(0.0);
        if (total - 1.0).abs() <= WEIGHT_TOLERANCE {
            warn!(
                level = level_index,
                draw = u,
                total,
                branch = fallback,
                "Cumulative weight fell short of draw by rounding; using last weighted branch"
            );
            Ok(fallback)
        } else {
            Err(Error::SamplingUnderflow {
                level: level_index,
                draw: u,
                total,
            })
        }
    }

    /// Sample one complete path, one draw per level in level order
    pub fn sample_path<S>(&self, source: &mut S) -> Result<PathLabel>
    where
        S: UniformSource + ?Sized,
    {
        self.ensure_not_empty()?;
        let mut path = PathLabel::new();
        for index in 0..self.depth() {
            path.push(self.sample_branching_level(index, source)?);
        }
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::branch::Branch;
    use crate::level::BranchingLevel;

    /// Replays a fixed list of draws
    struct FixedDraws {
        draws: Vec<f64>,
        next: usize,
    }

    impl FixedDraws {
        fn new(draws: &[f64]) -> Self {
            Self {
                draws: draws.to_vec(),
                next: 0,
            }
        }
    }

    impl UniformSource for FixedDraws {
        fn next_uniform(&mut self) -> f64 {
            let u = self.draws[self.next];
            self.next += 1;
            u
        }
    }

    fn single_level(weights: &[f64]) -> LogicTree<()> {
        let branches = weights
            .iter()
            .enumerate()
            .map(|(i, &w)| Branch::new(i as u32 + 1, w, i as i64))
            .collect();
        let mut tree = LogicTree::new();
        tree.add_branching_level(BranchingLevel::new(0, "Level", "Everything", branches));
        tree
    }

    #[test]
    fn test_cumulative_weights() {
        let cdf = cumulative_weights(&[0.2, 0.3, 0.5]);
        assert_eq!(cdf.len(), 3);
        assert!((cdf[0] - 0.2).abs() < 1e-12);
        assert!((cdf[1] - 0.5).abs() < 1e-12);
        assert!((cdf[2] - 1.0).abs() < 1e-12);
        assert!(cumulative_weights(&[]).is_empty());
    }

    #[test]
    fn test_three_branch_draws() {
        let tree = single_level(&[0.2, 0.3, 0.5]);
        let mut source = FixedDraws::new(&[0.1, 0.25, 0.9]);
        assert_eq!(tree.sample_branching_level(0, &mut source).unwrap(), 1);
        assert_eq!(tree.sample_branching_level(0, &mut source).unwrap(), 2);
        assert_eq!(tree.sample_branching_level(0, &mut source).unwrap(), 3);
        assert_eq!(source.next, 3);
    }

    #[test]
    fn test_draw_on_boundary_selects_lower_branch() {
        let tree = single_level(&[0.5, 0.5]);
        let mut source = FixedDraws::new(&[0.5, 0.0]);
        assert_eq!(tree.sample_branching_level(0, &mut source).unwrap(), 1);
        assert_eq!(tree.sample_branching_level(0, &mut source).unwrap(), 1);
    }

    #[test]
    fn test_zero_weight_branch_never_drawn() {
        let tree = single_level(&[0.0, 1.0, 0.0]);
        let mut source = FixedDraws::new(&[0.0, 1e-12, 0.999]);
        for _ in 0..3 {
            assert_eq!(tree.sample_branching_level(0, &mut source).unwrap(), 2);
        }
    }

    #[test]
    fn test_single_branch_always_selected() {
        let tree = single_level(&[1.0]);
        let mut source = FixedDraws::new(&[0.0, 0.5, 0.999_999_999]);
        for _ in 0..3 {
            assert_eq!(tree.sample_branching_level(0, &mut source).unwrap(), 1);
        }
    }

    #[test]
    fn test_rounding_shortfall_clamps_to_last_weighted_branch() {
        let shortfall = 1.0 - 1e-12;
        let tree = single_level(&[0.5, shortfall - 0.5, 0.0]);
        let mut source = FixedDraws::new(&[0.999_999_999_999_9]);
        assert_eq!(tree.sample_branching_level(0, &mut source).unwrap(), 2);
    }

    #[test]
    fn test_underweight_level_fails() {
        let tree = single_level(&[0.2, 0.3]);
        let mut source = FixedDraws::new(&[0.7]);
        let err = tree.sample_branching_level(0, &mut source).unwrap_err();
        assert!(matches!(err, Error::SamplingUnderflow { level: 0, .. }));
    }

    #[test]
    fn test_underweight_level_still_samples_below_total() {
        let tree = single_level(&[0.2, 0.3]);
        let mut source = FixedDraws::new(&[0.4]);
        assert_eq!(tree.sample_branching_level(0, &mut source).unwrap(), 2);
    }

    #[test]
    fn test_level_without_positive_weight() {
        let tree = single_level(&[0.0, 0.0]);
        let mut source = FixedDraws::new(&[0.5]);
        assert!(matches!(
            tree.sample_branching_level(0, &mut source),
            Err(Error::EmptyLevel(0))
        ));
        assert_eq!(source.next, 0);

        let empty = single_level(&[]);
        assert!(matches!(
            empty.sample_branching_level(0, &mut source),
            Err(Error::EmptyLevel(0))
        ));
    }

    #[test]
    fn test_level_index_out_of_range() {
        let tree = single_level(&[1.0]);
        let mut source = FixedDraws::new(&[0.5]);
        assert!(matches!(
            tree.sample_branching_level(1, &mut source),
            Err(Error::LevelOutOfRange { index: 1, depth: 1 })
        ));
    }

    #[test]
    fn test_sample_path_one_draw_per_level() {
        let mut tree = single_level(&[0.4, 0.6]);
        tree.add_branching_level(BranchingLevel::new(
            1,
            "Second",
            "Everything",
            vec![Branch::new(1, 0.5, 0_i64), Branch::new(2, 0.5, 1_i64)],
        ));

        let mut source = FixedDraws::new(&[0.7, 0.2]);
        let path = tree.sample_path(&mut source).unwrap();
        assert_eq!(path.to_string(), "2_1");
        assert_eq!(source.next, 2);
        assert!((tree.path_weight(&path).unwrap() - 0.3).abs() < 1e-12);
    }

    #[test]
    fn test_sample_path_on_empty_tree() {
        let tree: LogicTree<()> = LogicTree::new();
        let mut source = FixedDraws::new(&[0.5]);
        assert!(matches!(tree.sample_path(&mut source), Err(Error::EmptyTree)));
    }
}
