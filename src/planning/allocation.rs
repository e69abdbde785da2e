//! Subtask to agent allocation

use super::roles::RoleValues;
use super::subtasks::SubTask;
use crate::config::CostFunction;
use crate::error::AllocationError;
use crate::multiagent::{Agent, Capabilities};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// subtask id -> agent name
pub type Assignment = BTreeMap<u64, String>;

/// Role constraints only bind on keys both sides know. A `|`-joined
/// requirement accepts any of its alternatives.
pub fn can_execute(subtask: &SubTask, agent_roles: &RoleValues) -> bool {
    subtask.role_signature.iter().all(|(key, required)| {
        match agent_roles.get(key) {
            Some(value) => required.split('|').any(|alt| alt == value),
            None => true,
        }
    })
}

pub fn compute_cost(function: CostFunction, capabilities: &BTreeSet<String>) -> f64 {
    match function {
        CostFunction::InverseCapabilitySize => 1.0 / (1.0 + capabilities.len() as f64),
    }
}

/// Pick the cheapest role-feasible agent for every subtask.
///
/// Agents are tried in name order and only a strictly lower cost replaces
/// the current pick, so ties go to the smallest name.
pub fn allocate_subtasks(
    subtasks: &[SubTask],
    agents: &[Agent],
    capabilities: &Capabilities,
    agent_roles: &BTreeMap<String, RoleValues>,
    function: CostFunction,
) -> Result<Assignment, AllocationError> {
    let mut ordered: Vec<&Agent> = agents.iter().collect();
    ordered.sort_by(|a, b| a.name.cmp(&b.name));

    let empty_caps = BTreeSet::new();
    let empty_roles = RoleValues::new();
    let mut assignment = Assignment::new();

    for subtask in subtasks {
        let mut best: Option<(&str, f64)> = None;

        for agent in &ordered {
            let roles = agent_roles.get(&agent.name).unwrap_or(&empty_roles);
            if !can_execute(subtask, roles) {
                continue;
            }
            let caps = capabilities.get(&agent.name).unwrap_or(&empty_caps);
            let cost = compute_cost(function, caps);
            if best.map_or(true, |(_, c)| cost < c) {
                best = Some((agent.name.as_str(), cost));
            }
        }

        let Some((name, cost)) = best else {
            return Err(AllocationError::Infeasible {
                subtask: subtask.id,
                role_signature: subtask.role_signature.clone(),
            });
        };
        debug!("Subtask {} -> {} (cost {:.3})", subtask.id, name, cost);
        assignment.insert(subtask.id, name.to_string());
    }

    Ok(assignment)
}
