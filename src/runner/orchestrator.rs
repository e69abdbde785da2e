use crate::config::Config;
use crate::error::GoalsplitError;
use crate::multiagent::{compute_capabilities, extract_agents, Agent, Capabilities};
use crate::output::{capability_lists, DecompositionReport, SubtaskRecord};
use crate::pddl::{domain_from_str, problem_from_str};
use crate::planning::{
    allocate_subtasks, extract_agent_roles, DomainRoleConfig, PlanningTask, RoleValues,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::info;

use super::retry::build_subtasks_with_retry;

/// Parsed inputs plus the configuration one decomposition runs with
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: Config,
    task: PlanningTask,
    role_config: DomainRoleConfig,
}

fn read_input(path: &Path) -> Result<String, GoalsplitError> {
    std::fs::read_to_string(path).map_err(|e| GoalsplitError::ReadInput {
        path: path.to_path_buf(),
        source: e,
    })
}

impl Pipeline {
    /// Read and parse the domain, problem and role configuration the
    /// config points at
    pub fn load(config: Config) -> Result<Self, GoalsplitError> {
        info!("Loading domain: {}", config.pddl.domain_file.display());
        let domain = domain_from_str(&read_input(&config.pddl.domain_file)?)?;

        info!("Loading problem: {}", config.pddl.problem_file.display());
        let problem = problem_from_str(&read_input(&config.pddl.problem_file)?)?;

        let role_config = DomainRoleConfig::load(&config.roles.role_config_file)?;
        if role_config.domain != domain.name {
            info!(
                "Role config is declared for domain '{}', problem uses '{}'",
                role_config.domain, domain.name
            );
        }

        let task = PlanningTask::from_ast(&domain, &problem);
        info!(
            "Parsed domain '{}' with {} actions, problem '{}' with {} objects and {} goals",
            task.domain_name,
            task.actions.len(),
            task.problem_name,
            task.objects.len(),
            task.goals.len()
        );

        Ok(Self {
            config,
            task,
            role_config,
        })
    }

    /// Same inputs, different configuration
    pub fn with_config(&self, config: Config) -> Self {
        Self {
            config,
            task: self.task.clone(),
            role_config: self.role_config.clone(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn task(&self) -> &PlanningTask {
        &self.task
    }

    pub fn agents(&self) -> (Vec<Agent>, Capabilities) {
        let agents = extract_agents(&self.task, &self.config.multiagent);
        let capabilities = compute_capabilities(&self.task, &agents, &self.config.multiagent);
        (agents, capabilities)
    }

    /// Decompose and allocate with the configured seed
    pub fn run(&self) -> Result<DecompositionReport, GoalsplitError> {
        let (agents, capabilities) = self.agents();
        info!("Found {} agents", agents.len());

        let agent_roles: BTreeMap<String, RoleValues> = agents
            .iter()
            .map(|a| {
                (
                    a.name.clone(),
                    extract_agent_roles(&self.task, &a.name, &self.role_config),
                )
            })
            .collect();

        let clustering = &self.config.clustering;
        let mut rng = StdRng::seed_from_u64(clustering.random_seed);
        let decomposition = build_subtasks_with_retry(
            &self.task,
            clustering,
            &self.role_config,
            self.config.roles.on_missing_role,
            &mut rng,
        )?;
        info!(
            "Generated {} subtasks on attempt {} (epsilon {:.2})",
            decomposition.subtasks.len(),
            decomposition.attempt,
            decomposition.epsilon
        );

        let assignment = allocate_subtasks(
            &decomposition.subtasks,
            &agents,
            &capabilities,
            &agent_roles,
            self.config.allocation.cost_function,
        )?;

        let role_fields = self.role_config.output_role_fields();
        let subtasks = decomposition
            .subtasks
            .iter()
            .map(|s| SubtaskRecord::new(s, &assignment, &role_fields))
            .collect();

        Ok(DecompositionReport {
            domain: self.task.domain_name.clone(),
            problem: self.task.problem_name.clone(),
            strategy: decomposition.strategy.map(|s| s.name().to_string()),
            subtasks,
            assignment,
            agents: agents.into_iter().map(|a| (a.name.clone(), a)).collect(),
            capabilities: capability_lists(&capabilities),
        })
    }
}
