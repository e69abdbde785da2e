use std::path::PathBuf;

pub fn default_domain_file() -> PathBuf {
    PathBuf::from("data/domain.pddl")
}

pub fn default_problem_file() -> PathBuf {
    PathBuf::from("data/problem.pddl")
}

pub fn default_role_config_file() -> PathBuf {
    PathBuf::from("configs/role_configs/example_roles.json")
}

pub fn default_landmark_max_depth() -> usize {
    3
}

pub fn default_max_cluster_size() -> usize {
    10
}

pub fn default_max_subtasks() -> usize {
    30
}

pub fn default_epsilon_step() -> f64 {
    0.2
}

pub fn default_max_retries() -> u32 {
    5
}

pub fn default_random_seed() -> u64 {
    42
}

pub fn default_solution_timeout() -> u64 {
    120
}

pub fn default_max_goals_per_subtask() -> usize {
    10
}

pub fn default_strategy_randomness() -> f64 {
    0.1
}

pub fn default_agent_types() -> Vec<String> {
    vec!["agent".to_string()]
}

pub fn default_true() -> bool {
    true
}
