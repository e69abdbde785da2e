//! Subtask merging
//!
//! Two merge procedures share one feasibility check ([`ConstraintIndex`]):
//! a constraint-aware merge with a fixed pair score, and a strategy-driven
//! merge whose score and stopping rule come from a [`Strategy`].

mod constraint_aware;
mod constraints;
mod objective;

pub use constraint_aware::constraint_aware_merge;
pub use constraints::ConstraintIndex;
pub use objective::{multi_objective_merge, Jitter, Strategy};

use super::subtasks::SubTask;

/// Group subtasks with equal role signatures, in order of first appearance
pub(crate) fn group_by_signature(subtasks: Vec<SubTask>) -> Vec<Vec<SubTask>> {
    let mut groups: Vec<Vec<SubTask>> = Vec::new();

    for subtask in subtasks {
        match groups
            .iter_mut()
            .find(|g| g[0].role_signature == subtask.role_signature)
        {
            Some(group) => group.push(subtask),
            None => groups.push(vec![subtask]),
        }
    }

    groups
}
