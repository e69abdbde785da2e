mod defaults;
mod types;

pub use types::*;

use crate::error::ConfigError;
use std::path::Path;

impl Config {
    /// Load config from a YAML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Validate the config
    pub fn validate(&self) -> Result<(), ConfigError> {
        let c = &self.clustering;

        if c.max_cluster_size == 0 {
            return Err(ConfigError::Invalid(
                "clustering.max_cluster_size must be at least 1".to_string(),
            ));
        }
        if c.max_goals_per_subtask == 0 {
            return Err(ConfigError::Invalid(
                "clustering.max_goals_per_subtask must be at least 1".to_string(),
            ));
        }
        // Unmerged subtasks are at most max_cluster_size goals
        if c.max_cluster_size > c.max_goals_per_subtask {
            return Err(ConfigError::Invalid(format!(
                "clustering.max_cluster_size ({}) exceeds max_goals_per_subtask ({})",
                c.max_cluster_size, c.max_goals_per_subtask
            )));
        }

        for (name, value) in [
            ("epsilon_start", c.epsilon_start),
            ("epsilon_step", c.epsilon_step),
            ("strategy_randomness", c.strategy_randomness),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::Invalid(format!(
                    "clustering.{} must be within [0, 1], got {}",
                    name, value
                )));
            }
        }

        if self.multiagent.agent_types.is_empty() {
            return Err(ConfigError::Invalid(
                "multiagent.agent_types must name at least one type".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_missing_sections() {
        let config: Config = serde_yaml::from_str("pddl:\n  domain_file: d.pddl\n").unwrap();
        assert_eq!(config.pddl.domain_file, Path::new("d.pddl"));
        assert_eq!(config.pddl.problem_file, Path::new("data/problem.pddl"));
        assert_eq!(config.clustering.max_subtasks, 30);
        assert_eq!(config.clustering.max_retries, 5);
        assert!(config.clustering.use_landmarks);
        assert_eq!(config.multiagent.agent_types, vec!["agent".to_string()]);
        assert_eq!(config.roles.on_missing_role, MissingRolePolicy::Error);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_full_clustering_section() {
        let yaml = r#"
roles:
  role_config_file: roles.json
  on_missing_role: skip_goal
clustering:
  max_cluster_size: 4
  max_goals_per_subtask: 6
  epsilon_start: 0.1
  constraint_binary_predicates: [reachable]
  constraint_type_predicates: [weld_type]
  optimization_strategy: distribute_goals
  strategy_randomness: 0.3
multiagent:
  agent_types: [robot, drone]
  capability_mode: parameter-type
allocation:
  cost_function: inverse_capability_size
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.roles.on_missing_role, MissingRolePolicy::SkipGoal);
        assert_eq!(config.clustering.max_cluster_size, 4);
        assert_eq!(
            config.clustering.optimization_strategy,
            Some(StrategyName::DistributeGoals)
        );
        assert_eq!(config.multiagent.agent_types.len(), 2);
        assert_eq!(
            config.multiagent.capability_mode,
            CapabilityMode::ParameterType
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_cluster_larger_than_goal_cap() {
        let mut config = Config::default();
        config.clustering.max_cluster_size = 12;
        config.clustering.max_goals_per_subtask = 10;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_validate_rejects_out_of_range_epsilon() {
        let mut config = Config::default();
        config.clustering.epsilon_step = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unknown_cost_function_fails_to_parse() {
        let yaml = "allocation:\n  cost_function: cheapest\n";
        assert!(serde_yaml::from_str::<Config>(yaml).is_err());
    }

    #[test]
    fn test_strategy_from_str() {
        assert_eq!(
            "balanced".parse::<StrategyName>().unwrap(),
            StrategyName::Balanced
        );
        assert_eq!("AUTO".parse::<StrategyName>().unwrap(), StrategyName::Auto);
        assert!("greedy".parse::<StrategyName>().is_err());
    }
}
