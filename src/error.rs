use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GoalsplitError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Syntax error: {0}")]
    Syntax(#[from] SyntaxError),

    #[error("Role resolution error: {0}")]
    Role(#[from] RoleError),

    #[error("Clustering error: {0}")]
    Clustering(#[from] ClusteringError),

    #[error("Allocation error: {0}")]
    Allocation(#[from] AllocationError),

    #[error("Output error: {0}")]
    Output(#[from] OutputError),

    #[error("Failed to read '{path}': {source}")]
    ReadInput {
        path: PathBuf,
        source: std::io::Error,
    },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Failed to parse role config: {0}")]
    RoleConfigParse(#[from] serde_json::Error),

    #[error("Invalid binding '{0}' (expected goal:<index>, role:<name> or agent:<name>)")]
    InvalidBinding(String),

    #[error("Cluster key '{0}' is not a declared role")]
    UnknownClusterKey(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Error, Debug, PartialEq)]
pub enum SyntaxError {
    #[error("Unexpected closing parenthesis at token {position}")]
    UnexpectedClose { position: usize },

    #[error("Unmatched opening parenthesis at token {position}")]
    Unterminated { position: usize },

    #[error("No (define ({kind} ...)) form found")]
    MissingDefine { kind: &'static str },

    #[error("Empty action definition")]
    EmptyAction,
}

#[derive(Error, Debug)]
pub enum RoleError {
    #[error("Cannot extract roles for goal {goal}: missing {roles:?}")]
    Missing { goal: String, roles: Vec<String> },
}

#[derive(Error, Debug)]
pub enum ClusteringError {
    #[error(
        "Cannot satisfy max_subtasks={max_subtasks} even after {retries} retries \
         (last attempt produced {last_count} subtasks at epsilon {epsilon:.2})"
    )]
    Unsatisfiable {
        max_subtasks: usize,
        retries: u32,
        last_count: usize,
        epsilon: f64,
    },

    #[error("Role resolution failed: {0}")]
    Role(#[from] RoleError),
}

#[derive(Error, Debug)]
pub enum AllocationError {
    #[error("No agents available for subtask {subtask} with role_signature {role_signature:?}")]
    Infeasible {
        subtask: u64,
        role_signature: std::collections::BTreeMap<String, String>,
    },
}

#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Failed to create output directory: {0}")]
    CreateDir(std::io::Error),

    #[error("Failed to write result: {0}")]
    Write(std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("YAML serialization error: {0}")]
    SerializeYaml(#[from] serde_yaml::Error),
}
