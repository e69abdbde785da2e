//! Three-phase merge under reachability and type constraints

use super::{group_by_signature, ConstraintIndex};
use crate::planning::subtasks::{IdAllocator, SubTask};
use tracing::debug;

/// Merge partitioned subtasks while keeping every merge feasible.
///
/// 1. Greedy merging inside groups of identical role signatures.
/// 2. Repeated first-compatible-pair passes across signatures until a pass
///    changes nothing.
/// 3. With a `target`, merge the best scoring compatible pair while the
///    count exceeds it.
pub fn constraint_aware_merge(
    subtasks: Vec<SubTask>,
    index: &ConstraintIndex,
    target: Option<usize>,
    ids: &mut IdAllocator,
) -> Vec<SubTask> {
    if subtasks.is_empty() {
        return subtasks;
    }
    let before = subtasks.len();

    let merged = merge_within_signatures(subtasks, index, ids);
    let merged = merge_across_signatures(merged, index, ids);
    let merged = match target {
        Some(target) if merged.len() > target => reduce_to_target(merged, index, target, ids),
        _ => merged,
    };

    debug!("Constraint-aware merge: {} -> {} subtasks", before, merged.len());
    merged
}

fn merge_within_signatures(
    subtasks: Vec<SubTask>,
    index: &ConstraintIndex,
    ids: &mut IdAllocator,
) -> Vec<SubTask> {
    let mut merged = Vec::new();

    for group in group_by_signature(subtasks) {
        let mut remaining = group;
        while !remaining.is_empty() {
            let mut current = remaining.remove(0);
            let mut i = 0;
            while i < remaining.len() {
                if index.is_compatible(&current, &remaining[i]) {
                    let candidate = remaining.remove(i);
                    current = SubTask::merge(current, candidate, ids.next_id());
                } else {
                    i += 1;
                }
            }
            merged.push(current);
        }
    }

    merged
}

fn merge_across_signatures(
    mut subtasks: Vec<SubTask>,
    index: &ConstraintIndex,
    ids: &mut IdAllocator,
) -> Vec<SubTask> {
    loop {
        let mut changed = false;
        let mut used = vec![false; subtasks.len()];
        let mut slots: Vec<Option<SubTask>> = subtasks.into_iter().map(Some).collect();
        let mut next = Vec::with_capacity(slots.len());

        for i in 0..slots.len() {
            if used[i] {
                continue;
            }
            used[i] = true;
            let Some(current) = slots[i].take() else {
                continue;
            };

            let partner = (i + 1..slots.len()).find(|&j| {
                !used[j]
                    && slots[j]
                        .as_ref()
                        .is_some_and(|other| index.is_compatible(&current, other))
            });

            match partner.and_then(|j| {
                used[j] = true;
                slots[j].take()
            }) {
                Some(other) => {
                    next.push(SubTask::merge(current, other, ids.next_id()));
                    changed = true;
                }
                None => next.push(current),
            }
        }

        subtasks = next;
        if !changed {
            return subtasks;
        }
    }
}

fn reduce_to_target(
    mut subtasks: Vec<SubTask>,
    index: &ConstraintIndex,
    target: usize,
    ids: &mut IdAllocator,
) -> Vec<SubTask> {
    while subtasks.len() > target {
        let mut best: Option<(usize, usize, i64)> = None;

        for i in 0..subtasks.len() {
            for j in i + 1..subtasks.len() {
                if !index.is_compatible(&subtasks[i], &subtasks[j]) {
                    continue;
                }
                let score = compatibility_score(&subtasks[i], &subtasks[j], index);
                if best.map_or(true, |(_, _, s)| score > s) {
                    best = Some((i, j, score));
                }
            }
        }

        let Some((i, j, _)) = best else {
            break;
        };
        // j > i, so removing j first keeps i valid
        let b = subtasks.remove(j);
        let a = subtasks.remove(i);
        subtasks.push(SubTask::merge(a, b, ids.next_id()));
    }

    subtasks
}

/// Higher for shared related objects, a single target kind, shared
/// landmarks and fewer combined goals
pub fn compatibility_score(a: &SubTask, b: &SubTask, index: &ConstraintIndex) -> i64 {
    let targets = index.targets(a, b);

    let resources: i64 = index
        .common_accessible(&targets)
        .iter()
        .map(|common| common.len() as i64 * 10)
        .sum();
    let kinds: i64 = index
        .required_kinds(&targets)
        .iter()
        .filter(|k| k.len() <= 1)
        .count() as i64
        * 20;
    let landmarks = a.common_landmarks(b) as i64 * 2;
    let size = 10 - (a.len() + b.len()) as i64;

    resources + kinds + landmarks + size
}
