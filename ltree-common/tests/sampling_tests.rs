//! Integration tests for weighted branch sampling
//!
//! Tests cover:
//! - Empirical frequencies converge to branch weights
//! - Identically seeded sources replay identical outcomes
//! - Independent per-thread sources keep realizations reproducible
//! - Fixed-draw sources (caller-owned randomness)

use ltree_common::{Branch, BranchingLevel, LogicTree, PathLabel, UniformSource};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn weighted_level(index: usize, weights: &[f64]) -> BranchingLevel {
    let branches = weights
        .iter()
        .enumerate()
        .map(|(i, &w)| Branch::new(i as u32 + 1, w, i as i64))
        .collect();
    BranchingLevel::new(index, format!("level {}", index), "All sources", branches)
}

fn hazard_tree() -> LogicTree<()> {
    let mut tree = LogicTree::with_model_name("sampling");
    tree.add_branching_level(weighted_level(0, &[0.4, 0.6]));
    tree.add_branching_level(weighted_level(1, &[0.2, 0.3, 0.5]));
    tree.add_branching_level(weighted_level(2, &[0.1, 0.1, 0.8]));
    tree
}

/// Replays draws from a slice, cycling
struct Replay<'a> {
    draws: &'a [f64],
    position: usize,
}

impl UniformSource for Replay<'_> {
    fn next_uniform(&mut self) -> f64 {
        let u = self.draws[self.position % self.draws.len()];
        self.position += 1;
        u
    }
}

#[test]
fn test_frequencies_converge_to_weights() {
    const DRAWS: usize = 200_000;
    let tree = hazard_tree();
    let mut rng = StdRng::seed_from_u64(20_100_701);

    let mut counts = [0usize; 3];
    for _ in 0..DRAWS {
        let id = tree.sample_branching_level(1, &mut rng).unwrap();
        counts[id as usize - 1] += 1;
    }

    // 5 standard deviations of a binomial proportion is below 0.006 here
    for (i, &expected) in [0.2, 0.3, 0.5].iter().enumerate() {
        let observed = counts[i] as f64 / DRAWS as f64;
        assert!(
            (observed - expected).abs() < 0.006,
            "branch {}: expected frequency {}, observed {}",
            i + 1,
            expected,
            observed
        );
    }
}

#[test]
fn test_identical_seeds_replay_identical_paths() {
    let tree = hazard_tree();
    let mut a = StdRng::seed_from_u64(7);
    let mut b = StdRng::seed_from_u64(7);

    let first: Vec<PathLabel> = (0..500).map(|_| tree.sample_path(&mut a).unwrap()).collect();
    let second: Vec<PathLabel> = (0..500).map(|_| tree.sample_path(&mut b).unwrap()).collect();
    assert_eq!(first, second);
}

#[test]
fn test_identical_draw_sequences_yield_identical_ids() {
    let tree = hazard_tree();
    let draws = [0.05, 0.41, 0.999, 0.2, 0.5, 0.7];

    let run = || {
        let mut source = Replay { draws: &draws, position: 0 };
        (0..draws.len())
            .map(|_| tree.sample_branching_level(1, &mut source).unwrap())
            .collect::<Vec<u32>>()
    };
    assert_eq!(run(), vec![1, 2, 3, 1, 2, 3]);
    assert_eq!(run(), run());
}

#[test]
fn test_single_branch_level_ignores_draw() {
    let mut tree: LogicTree<()> = LogicTree::new();
    tree.add_branching_level(weighted_level(0, &[1.0]));
    let mut rng = StdRng::seed_from_u64(99);
    for _ in 0..1000 {
        assert_eq!(tree.sample_branching_level(0, &mut rng).unwrap(), 1);
    }
}

#[test]
fn test_sampled_paths_are_valid_labels() {
    let tree = hazard_tree();
    let mut rng = StdRng::seed_from_u64(3);
    for _ in 0..200 {
        let path = tree.sample_path(&mut rng).unwrap();
        assert_eq!(path.len(), 3);
        let weight = tree.path_weight(&path).unwrap();
        assert!(weight > 0.0 && weight <= 1.0);
        assert_eq!(tree.total_weight(&path.to_string()).unwrap(), weight);
    }
}

#[test]
fn test_parallel_realizations_with_own_sources() {
    let tree = hazard_tree();
    let seeds = [11_u64, 12, 13, 14];

    let sequential: Vec<Vec<PathLabel>> = seeds
        .iter()
        .map(|&seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            (0..50).map(|_| tree.sample_path(&mut rng).unwrap()).collect()
        })
        .collect();

    let parallel: Vec<Vec<PathLabel>> = std::thread::scope(|s| {
        let handles: Vec<_> = seeds
            .iter()
            .map(|&seed| {
                let tree = &tree;
                s.spawn(move || {
                    let mut rng = StdRng::seed_from_u64(seed);
                    (0..50).map(|_| tree.sample_path(&mut rng).unwrap()).collect::<Vec<_>>()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(sequential, parallel);
}

#[test]
fn test_dyn_source_is_accepted() {
    let tree = hazard_tree();
    let mut rng = StdRng::seed_from_u64(5);
    let source: &mut dyn UniformSource = &mut rng;
    let id = tree.sample_branching_level(0, source).unwrap();
    assert!(id == 1 || id == 2);
}
