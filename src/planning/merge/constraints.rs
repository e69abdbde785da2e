//! Merge feasibility derived from init facts

use crate::config::ClusteringConfig;
use crate::planning::subtasks::SubTask;
use crate::planning::task::PlanningTask;
use std::collections::{BTreeMap, BTreeSet};

/// target object -> objects `c` with `pred(c, target)` in init
type AccessMap = BTreeMap<String, BTreeSet<String>>;

/// Precomputed constraint relations for one task
#[derive(Debug, Clone)]
pub struct ConstraintIndex {
    max_goals_per_subtask: usize,
    goal_object_index: usize,
    binary: Vec<(String, AccessMap)>,
    types: Vec<(String, BTreeMap<String, String>)>,
}

impl ConstraintIndex {
    pub fn new(task: &PlanningTask, cfg: &ClusteringConfig) -> Self {
        let binary = cfg
            .constraint_binary_predicates
            .iter()
            .map(|pred| {
                let mut access = AccessMap::new();
                for atom in task.init_with(pred) {
                    if let [source, target, ..] = atom.args.as_slice() {
                        access
                            .entry(target.clone())
                            .or_default()
                            .insert(source.clone());
                    }
                }
                (pred.clone(), access)
            })
            .collect();

        let types = cfg
            .constraint_type_predicates
            .iter()
            .map(|pred| {
                let mut kinds = BTreeMap::new();
                for atom in task.init_with(pred) {
                    if let [object, kind, ..] = atom.args.as_slice() {
                        kinds.insert(object.clone(), kind.clone());
                    }
                }
                (pred.clone(), kinds)
            })
            .collect();

        Self {
            max_goals_per_subtask: cfg.max_goals_per_subtask,
            goal_object_index: cfg.constraint_goal_object_index,
            binary,
            types,
        }
    }

    pub fn has_binary(&self) -> bool {
        !self.binary.is_empty()
    }

    /// Target objects of both subtasks' goals, `a` first
    pub fn targets<'a>(&self, a: &'a SubTask, b: &'a SubTask) -> Vec<&'a str> {
        a.goals
            .iter()
            .chain(b.goals.iter())
            .filter_map(|g| g.args.get(self.goal_object_index))
            .map(String::as_str)
            .collect()
    }

    /// Per binary predicate, the objects related to every target
    pub fn common_accessible(&self, targets: &[&str]) -> Vec<BTreeSet<String>> {
        self.binary
            .iter()
            .map(|(_, access)| {
                let Some((first, rest)) = targets.split_first() else {
                    return BTreeSet::new();
                };
                let mut common = access.get(*first).cloned().unwrap_or_default();
                for target in rest {
                    match access.get(*target) {
                        Some(sources) => common.retain(|c| sources.contains(c)),
                        None => common.clear(),
                    }
                }
                common
            })
            .collect()
    }

    /// Per type predicate, the distinct kinds among the targets
    pub fn required_kinds<'a>(&'a self, targets: &[&str]) -> Vec<BTreeSet<&'a str>> {
        self.types
            .iter()
            .map(|(_, kinds)| {
                targets
                    .iter()
                    .filter_map(|t| kinds.get(*t))
                    .map(String::as_str)
                    .collect()
            })
            .collect()
    }

    /// Two subtasks may merge when the goal cap holds, every binary predicate
    /// leaves a common related object, and every type predicate sees at most
    /// one kind among the targets.
    pub fn is_compatible(&self, a: &SubTask, b: &SubTask) -> bool {
        if a.len() + b.len() > self.max_goals_per_subtask {
            return false;
        }
        if self.binary.is_empty() && self.types.is_empty() {
            return true;
        }

        let targets = self.targets(a, b);
        if self.common_accessible(&targets).iter().any(BTreeSet::is_empty) {
            return false;
        }
        self.required_kinds(&targets).iter().all(|k| k.len() <= 1)
    }
}
