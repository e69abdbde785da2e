use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::defaults::*;

#[derive(Debug, Clone, Default, Deserialize, Serialize, JsonSchema)]
pub struct Config {
    #[serde(default)]
    pub pddl: PddlConfig,

    #[serde(default)]
    pub roles: RolesConfigRef,

    #[serde(default)]
    pub clustering: ClusteringConfig,

    #[serde(default)]
    pub multiagent: MultiAgentConfig,

    #[serde(default)]
    pub allocation: AllocationConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
pub struct PddlConfig {
    #[serde(default = "default_domain_file")]
    pub domain_file: PathBuf,

    #[serde(default = "default_problem_file")]
    pub problem_file: PathBuf,

    /// Name of the multi-agent extension the files use, informational only
    #[serde(default)]
    pub multiagent_extension: Option<String>,
}

impl Default for PddlConfig {
    fn default() -> Self {
        Self {
            domain_file: default_domain_file(),
            problem_file: default_problem_file(),
            multiagent_extension: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
pub struct RolesConfigRef {
    #[serde(default = "default_role_config_file")]
    pub role_config_file: PathBuf,

    #[serde(default)]
    pub on_missing_role: MissingRolePolicy,
}

impl Default for RolesConfigRef {
    fn default() -> Self {
        Self {
            role_config_file: default_role_config_file(),
            on_missing_role: MissingRolePolicy::default(),
        }
    }
}

/// What to do with a goal whose roles cannot all be resolved
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum MissingRolePolicy {
    #[default]
    Error,
    SkipGoal,
}

#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
pub struct ClusteringConfig {
    #[serde(default = "default_true")]
    pub use_landmarks: bool,

    #[serde(default = "default_landmark_max_depth")]
    pub landmark_max_depth: usize,

    #[serde(default = "default_max_cluster_size")]
    pub max_cluster_size: usize,

    #[serde(default = "default_max_subtasks")]
    pub max_subtasks: usize,

    #[serde(default)]
    pub epsilon_start: f64,

    #[serde(default = "default_epsilon_step")]
    pub epsilon_step: f64,

    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    #[serde(default = "default_random_seed")]
    pub random_seed: u64,

    /// Per-solution budget in seconds, reported by the diverse driver
    #[serde(default = "default_solution_timeout")]
    pub solution_timeout: u64,

    #[serde(default = "default_true")]
    pub merge_compatible_subtasks: bool,

    #[serde(default = "default_max_goals_per_subtask")]
    pub max_goals_per_subtask: usize,

    #[serde(default)]
    pub constraint_binary_predicates: Vec<String>,

    #[serde(default)]
    pub constraint_type_predicates: Vec<String>,

    #[serde(default)]
    pub constraint_goal_object_index: usize,

    #[serde(default)]
    pub optimization_strategy: Option<StrategyName>,

    #[serde(default = "default_strategy_randomness")]
    pub strategy_randomness: f64,
}

impl Default for ClusteringConfig {
    fn default() -> Self {
        Self {
            use_landmarks: true,
            landmark_max_depth: default_landmark_max_depth(),
            max_cluster_size: default_max_cluster_size(),
            max_subtasks: default_max_subtasks(),
            epsilon_start: 0.0,
            epsilon_step: default_epsilon_step(),
            max_retries: default_max_retries(),
            random_seed: default_random_seed(),
            solution_timeout: default_solution_timeout(),
            merge_compatible_subtasks: true,
            max_goals_per_subtask: default_max_goals_per_subtask(),
            constraint_binary_predicates: Vec::new(),
            constraint_type_predicates: Vec::new(),
            constraint_goal_object_index: 0,
            optimization_strategy: None,
            strategy_randomness: default_strategy_randomness(),
        }
    }
}

/// Multi-objective merge strategy as named in configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum StrategyName {
    MinimizeSubtasks,
    Balanced,
    DistributeGoals,
    Auto,
}

impl std::fmt::Display for StrategyName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StrategyName::MinimizeSubtasks => write!(f, "minimize_subtasks"),
            StrategyName::Balanced => write!(f, "balanced"),
            StrategyName::DistributeGoals => write!(f, "distribute_goals"),
            StrategyName::Auto => write!(f, "auto"),
        }
    }
}

impl std::str::FromStr for StrategyName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "minimize_subtasks" | "minimize" => Ok(StrategyName::MinimizeSubtasks),
            "balanced" => Ok(StrategyName::Balanced),
            "distribute_goals" | "distribute" => Ok(StrategyName::DistributeGoals),
            "auto" => Ok(StrategyName::Auto),
            _ => Err(format!("Unknown optimization strategy: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
pub struct MultiAgentConfig {
    #[serde(default = "default_agent_types")]
    pub agent_types: Vec<String>,

    #[serde(default)]
    pub capability_mode: CapabilityMode,
}

impl Default for MultiAgentConfig {
    fn default() -> Self {
        Self {
            agent_types: default_agent_types(),
            capability_mode: CapabilityMode::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum CapabilityMode {
    /// An agent can run every action that has a parameter of its type
    #[default]
    #[serde(alias = "parameter-type")]
    ParameterType,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, JsonSchema)]
pub struct AllocationConfig {
    #[serde(default)]
    pub cost_function: CostFunction,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum CostFunction {
    /// cost = 1 / (1 + |capabilities|)
    #[default]
    InverseCapabilitySize,
}

impl std::fmt::Display for CostFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CostFunction::InverseCapabilitySize => write!(f, "inverse_capability_size"),
        }
    }
}
