//! Strategy-driven merging
//!
//! Each strategy scores compatible pairs and decides when to stop. Scores
//! carry a small multiplicative jitter drawn from the run's generator so
//! differently seeded runs explore different merge orders.

use super::{group_by_signature, ConstraintIndex};
use crate::config::StrategyName;
use crate::planning::subtasks::{IdAllocator, SubTask};
use rand::Rng;
use tracing::{debug, info};

/// Population variance above which `DistributeGoals` keeps merging
const SIZE_VARIANCE_LIMIT: f64 = 4.0;

/// Goal count `Balanced` steers towards
const BALANCED_SIZE: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    MinimizeSubtasks,
    Balanced,
    DistributeGoals,
}

impl Strategy {
    /// Resolve a configured name; `auto` draws one of the three
    pub fn select<R: Rng>(name: StrategyName, rng: &mut R) -> Self {
        match name {
            StrategyName::MinimizeSubtasks => Strategy::MinimizeSubtasks,
            StrategyName::Balanced => Strategy::Balanced,
            StrategyName::DistributeGoals => Strategy::DistributeGoals,
            StrategyName::Auto => {
                let picked = match rng.gen_range(0..3) {
                    0 => Strategy::MinimizeSubtasks,
                    1 => Strategy::Balanced,
                    _ => Strategy::DistributeGoals,
                };
                info!("Auto strategy selected {}", picked);
                picked
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Strategy::MinimizeSubtasks => "minimize_subtasks",
            Strategy::Balanced => "balanced",
            Strategy::DistributeGoals => "distribute_goals",
        }
    }

    /// Desirability of merging `a` and `b` given the current and target counts
    pub fn score<R: Rng>(
        &self,
        a: &SubTask,
        b: &SubTask,
        index: &ConstraintIndex,
        current: usize,
        target: usize,
        jitter: &mut Jitter<'_, R>,
    ) -> f64 {
        let total = (a.len() + b.len()) as f64;
        let landmarks = a.common_landmarks(b) as f64;

        match self {
            Strategy::MinimizeSubtasks => {
                let same_signature = if a.role_signature == b.role_signature {
                    100.0
                } else {
                    0.0
                };
                (1000.0 + landmarks * 10.0 + same_signature + total * 50.0) * jitter.next()
            }
            Strategy::Balanced => {
                let resources = if index.has_binary() {
                    resource_share(a, b, index) * 20.0
                } else {
                    0.0
                };
                let size = 100.0 - (total - BALANCED_SIZE).abs() * 10.0;
                let progress =
                    (target as f64 - current as f64) / (target as f64 * 0.1).max(1.0);
                (500.0 + resources + landmarks * 5.0 + size)
                    * (1.0 + progress * 0.5)
                    * jitter.next()
            }
            Strategy::DistributeGoals => {
                let small = if a.len() <= 2 || b.len() <= 2 { 300.0 } else { 0.0 };
                let range = if (3.0..=6.0).contains(&total) {
                    200.0
                } else if total > 8.0 {
                    -100.0
                } else {
                    0.0
                };
                (400.0 + small + range + landmarks * 8.0) * jitter.next()
            }
        }
    }

    pub fn should_continue(&self, subtasks: &[SubTask], target: usize) -> bool {
        if subtasks.len() <= target {
            return false;
        }
        match self {
            Strategy::MinimizeSubtasks | Strategy::Balanced => true,
            Strategy::DistributeGoals => {
                subtasks.iter().any(|s| s.len() <= 2)
                    || size_variance(subtasks) > SIZE_VARIANCE_LIMIT
            }
        }
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Multiplicative noise `1 + (u - 0.5) * randomness`, `u` uniform in [0, 1)
pub struct Jitter<'a, R: Rng> {
    rng: &'a mut R,
    randomness: f64,
}

impl<'a, R: Rng> Jitter<'a, R> {
    pub fn new(rng: &'a mut R, randomness: f64) -> Self {
        Self { rng, randomness }
    }

    pub fn next(&mut self) -> f64 {
        1.0 + (self.rng.gen::<f64>() - 0.5) * self.randomness
    }
}

/// Common related objects over all binary predicates per target, capped at 1
fn resource_share(a: &SubTask, b: &SubTask, index: &ConstraintIndex) -> f64 {
    let targets = index.targets(a, b);
    let total: usize = index
        .common_accessible(&targets)
        .iter()
        .map(|common| common.len())
        .sum();
    (total as f64 / targets.len().max(1) as f64).min(1.0)
}

fn size_variance(subtasks: &[SubTask]) -> f64 {
    if subtasks.is_empty() {
        return 0.0;
    }
    let n = subtasks.len() as f64;
    let mean = subtasks.iter().map(|s| s.len() as f64).sum::<f64>() / n;
    subtasks
        .iter()
        .map(|s| (s.len() as f64 - mean).powi(2))
        .sum::<f64>()
        / n
}

/// Merge with a strategy's score and stopping rule.
///
/// Signature groups are first reduced by at most one best-scoring merge per
/// popped subtask; then the best compatible pair overall is merged while the
/// strategy wants to continue, bounded by twice the input length.
pub fn multi_objective_merge<R: Rng>(
    subtasks: Vec<SubTask>,
    index: &ConstraintIndex,
    strategy: Strategy,
    target: Option<usize>,
    jitter: &mut Jitter<'_, R>,
    ids: &mut IdAllocator,
) -> Vec<SubTask> {
    if subtasks.is_empty() {
        return subtasks;
    }
    let before = subtasks.len();

    let merged = strategic_group_merge(subtasks, index, strategy, jitter, ids);
    let merged = strategic_cross_merge(merged, index, strategy, target, before, jitter, ids);

    debug!(
        "Strategy {} merge: {} -> {} subtasks",
        strategy,
        before,
        merged.len()
    );
    merged
}

fn strategic_group_merge<R: Rng>(
    subtasks: Vec<SubTask>,
    index: &ConstraintIndex,
    strategy: Strategy,
    jitter: &mut Jitter<'_, R>,
    ids: &mut IdAllocator,
) -> Vec<SubTask> {
    let mut merged = Vec::new();

    for group in group_by_signature(subtasks) {
        if group.len() == 1 {
            merged.extend(group);
            continue;
        }

        let group_len = group.len();
        let mut remaining = group;
        while !remaining.is_empty() {
            let current = remaining.remove(0);

            let mut best: Option<(usize, f64)> = None;
            for (i, candidate) in remaining.iter().enumerate() {
                if !index.is_compatible(&current, candidate) {
                    continue;
                }
                let score =
                    strategy.score(&current, candidate, index, remaining.len(), group_len, jitter);
                if best.map_or(true, |(_, s)| score > s) {
                    best = Some((i, score));
                }
            }

            match best {
                Some((i, score)) if score > 0.0 => {
                    let candidate = remaining.remove(i);
                    merged.push(SubTask::merge(current, candidate, ids.next_id()));
                }
                _ => merged.push(current),
            }
        }
    }

    merged
}

fn strategic_cross_merge<R: Rng>(
    mut subtasks: Vec<SubTask>,
    index: &ConstraintIndex,
    strategy: Strategy,
    target: Option<usize>,
    initial_len: usize,
    jitter: &mut Jitter<'_, R>,
    ids: &mut IdAllocator,
) -> Vec<SubTask> {
    let mut iteration = 0;

    loop {
        let target = target.unwrap_or(subtasks.len());
        if subtasks.len() <= 1 || !strategy.should_continue(&subtasks, target) {
            break;
        }

        let current = subtasks.len();
        let mut best: Option<(usize, usize, f64)> = None;
        for i in 0..subtasks.len() {
            for j in i + 1..subtasks.len() {
                if !index.is_compatible(&subtasks[i], &subtasks[j]) {
                    continue;
                }
                let score = strategy.score(&subtasks[i], &subtasks[j], index, current, target, jitter);
                if best.map_or(true, |(_, _, s)| score > s) {
                    best = Some((i, j, score));
                }
            }
        }

        let Some((i, j, _)) = best else {
            break;
        };
        let b = subtasks.remove(j);
        let a = subtasks.remove(i);
        subtasks.push(SubTask::merge(a, b, ids.next_id()));

        iteration += 1;
        if iteration > initial_len * 2 {
            break;
        }
    }

    subtasks
}
