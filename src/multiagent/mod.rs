//! Agents and their action capabilities

use crate::config::{CapabilityMode, MultiAgentConfig};
use crate::planning::PlanningTask;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Agent {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
}

/// agent name -> action names it can execute
pub type Capabilities = BTreeMap<String, BTreeSet<String>>;

/// Every problem object whose type is a configured agent type, sorted by name
pub fn extract_agents(task: &PlanningTask, cfg: &MultiAgentConfig) -> Vec<Agent> {
    let mut agents: Vec<Agent> = cfg
        .agent_types
        .iter()
        .flat_map(|type_name| {
            task.objects.objects(type_name).map(move |name| Agent {
                name: name.to_string(),
                type_name: type_name.clone(),
            })
        })
        .collect();

    agents.sort_by(|a, b| a.name.cmp(&b.name));
    agents.dedup_by(|a, b| a.name == b.name);
    agents
}

pub fn compute_capabilities(
    task: &PlanningTask,
    agents: &[Agent],
    cfg: &MultiAgentConfig,
) -> Capabilities {
    agents
        .iter()
        .map(|agent| {
            let actions = match cfg.capability_mode {
                CapabilityMode::ParameterType => task
                    .actions
                    .values()
                    .filter(|action| {
                        action.parameters.iter().any(|p| {
                            p.type_name.as_deref() == Some(agent.type_name.as_str())
                                && cfg.agent_types.contains(&agent.type_name)
                        })
                    })
                    .map(|action| action.name.clone())
                    .collect(),
            };
            (agent.name.clone(), actions)
        })
        .collect()
}
