//! Declarative role extraction
//!
//! A role configuration names, per domain, which objects play which role
//! for a goal (or an agent). Each role has extractor rules that read a value
//! off ground init facts, with argument positions bound to the goal's
//! arguments, to the agent itself, or to roles resolved earlier. Roles are
//! resolved with a bounded work-list fixpoint.

use super::task::{GroundAtom, PlanningTask};
use crate::config::MissingRolePolicy;
use crate::error::{ConfigError, RoleError};
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::path::Path;
use tracing::{debug, warn};

/// Upper bound on resolution rounds
pub const MAX_ROUNDS: usize = 10;

/// role name -> resolved value
pub type RoleValues = BTreeMap<String, String>;

/// What an argument position of a source fact must equal
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum Binding {
    /// `goal:<i>`: the goal's i-th argument
    GoalArg(usize),
    /// `role:<name>`: the value of an already resolved role
    Role(String),
    /// `agent:self`: the agent's own name
    AgentSelf,
    /// `agent:<name>`: a fixed object name
    AgentNamed(String),
}

impl std::str::FromStr for Binding {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ConfigError::InvalidBinding(s.to_string());
        let (kind, arg) = s.split_once(':').ok_or_else(invalid)?;

        match kind {
            "goal" => arg.parse().map(Binding::GoalArg).map_err(|_| invalid()),
            "role" if !arg.is_empty() => Ok(Binding::Role(arg.to_string())),
            "agent" if arg == "self" => Ok(Binding::AgentSelf),
            "agent" if !arg.is_empty() => Ok(Binding::AgentNamed(arg.to_string())),
            _ => Err(invalid()),
        }
    }
}

impl TryFrom<String> for Binding {
    type Error = ConfigError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Extractor {
    /// Source predicate scanned in the init facts
    pub predicate: String,

    /// argument position -> binding
    #[serde(default)]
    pub bindings: BTreeMap<usize, Binding>,

    /// Argument position read off as the candidate value
    pub value_arg: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RoleRule {
    pub extractors: Vec<Extractor>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DomainRoleConfig {
    pub domain: String,

    /// Only goals with these predicates take part in role extraction
    pub goal_predicates: Vec<String>,

    pub roles: BTreeMap<String, RoleRule>,

    /// Roles whose values form the subtask role signature
    #[serde(default)]
    pub cluster_keys: Vec<String>,

    #[serde(default)]
    pub output_role_fields: Option<Vec<String>>,

    #[serde(default)]
    pub agent_role_extractors: Option<BTreeMap<String, Extractor>>,
}

impl DomainRoleConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        let config: DomainRoleConfig = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for key in &self.cluster_keys {
            if !self.roles.contains_key(key) {
                return Err(ConfigError::UnknownClusterKey(key.clone()));
            }
        }
        Ok(())
    }

    /// Fields reported per goal; every role when not configured
    pub fn output_role_fields(&self) -> Vec<String> {
        self.output_role_fields
            .clone()
            .unwrap_or_else(|| self.roles.keys().cloned().collect())
    }
}

/// Whose roles are being resolved
#[derive(Debug, Clone, Copy)]
pub enum Subject<'a> {
    Goal(&'a GroundAtom),
    Agent(&'a str),
}

impl std::fmt::Display for Subject<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Subject::Goal(goal) => write!(f, "{}", goal),
            Subject::Agent(name) => write!(f, "agent {}", name),
        }
    }
}

impl Extractor {
    fn expected<'a>(
        &'a self,
        binding: &'a Binding,
        subject: Subject<'a>,
        resolved: &'a RoleValues,
    ) -> Option<&'a str> {
        match (binding, subject) {
            (Binding::GoalArg(i), Subject::Goal(goal)) => goal.args.get(*i).map(String::as_str),
            (Binding::Role(name), _) => resolved.get(name).map(String::as_str),
            (Binding::AgentSelf, Subject::Agent(name)) => Some(name),
            (Binding::AgentNamed(name), Subject::Agent(_)) => Some(name),
            _ => None,
        }
    }

    /// Candidate values from every init fact this extractor matches
    pub fn candidates(
        &self,
        task: &PlanningTask,
        subject: Subject<'_>,
        resolved: &RoleValues,
    ) -> BTreeSet<String> {
        task.init_with(&self.predicate)
            .filter(|atom| {
                self.bindings.iter().all(|(idx, binding)| {
                    match (atom.args.get(*idx), self.expected(binding, subject, resolved)) {
                        (Some(actual), Some(expected)) => actual == expected,
                        _ => false,
                    }
                })
            })
            .filter_map(|atom| atom.args.get(self.value_arg).cloned())
            .collect()
    }
}

/// Outcome of one fixpoint resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub values: RoleValues,
    /// Roles still without a value, in configuration order
    pub unresolved: Vec<String>,
    pub rounds: usize,
}

impl Resolution {
    pub fn is_complete(&self) -> bool {
        self.unresolved.is_empty()
    }
}

/// Resolve roles with a work-list over role names.
///
/// Each round visits every pending role once; a role resolves as soon as its
/// extractors yield any candidate (the smallest one wins). A value resolved
/// earlier in a round is visible to later roles in the same round. Stops when
/// nothing is pending, a round makes no progress, or after [`MAX_ROUNDS`].
pub fn resolve<'r, I>(task: &PlanningTask, subject: Subject<'_>, rules: I) -> Resolution
where
    I: IntoIterator<Item = (&'r str, &'r [Extractor])>,
{
    let rules: Vec<(&str, &[Extractor])> = rules.into_iter().collect();
    let mut pending: VecDeque<usize> = (0..rules.len()).collect();
    let mut values = RoleValues::new();
    let mut rounds = 0;

    while !pending.is_empty() && rounds < MAX_ROUNDS {
        rounds += 1;
        let mut progressed = false;

        for _ in 0..pending.len() {
            let Some(idx) = pending.pop_front() else {
                break;
            };
            let (name, extractors) = rules[idx];

            let mut candidates = BTreeSet::new();
            for extractor in extractors {
                candidates.extend(extractor.candidates(task, subject, &values));
            }

            match candidates.into_iter().next() {
                Some(value) => {
                    values.insert(name.to_string(), value);
                    progressed = true;
                }
                None => pending.push_back(idx),
            }
        }

        if !progressed {
            break;
        }
    }

    Resolution {
        values,
        unresolved: pending.iter().map(|&i| rules[i].0.to_string()).collect(),
        rounds,
    }
}

/// Resolve the configured goal roles for a single goal
pub fn resolve_goal_roles(task: &PlanningTask, goal: &GroundAtom, cfg: &DomainRoleConfig) -> Resolution {
    resolve(
        task,
        Subject::Goal(goal),
        cfg.roles
            .iter()
            .map(|(name, rule)| (name.as_str(), rule.extractors.as_slice())),
    )
}

/// Resolve roles for every goal whose predicate is a configured goal predicate.
///
/// Goals that cannot be fully resolved fail the call under
/// [`MissingRolePolicy::Error`] and are left out under `SkipGoal`.
pub fn extract_roles_for_goals(
    task: &PlanningTask,
    cfg: &DomainRoleConfig,
    policy: MissingRolePolicy,
) -> Result<BTreeMap<GroundAtom, RoleValues>, RoleError> {
    let mut result = BTreeMap::new();
    let mut ignored = 0;

    for goal in &task.goals {
        if !cfg.goal_predicates.contains(&goal.predicate) {
            ignored += 1;
            continue;
        }

        let resolution = resolve_goal_roles(task, goal, cfg);
        if resolution.is_complete() {
            result.insert(goal.clone(), resolution.values);
            continue;
        }

        match policy {
            MissingRolePolicy::Error => {
                return Err(RoleError::Missing {
                    goal: goal.to_string(),
                    roles: resolution.unresolved,
                })
            }
            MissingRolePolicy::SkipGoal => {
                warn!(
                    "Skipping goal {}: unresolved roles {:?}",
                    goal, resolution.unresolved
                );
            }
        }
    }

    if ignored > 0 {
        warn!(
            "{} goals have predicates outside goal_predicates and take no part in partitioning",
            ignored
        );
    }
    debug!("Resolved roles for {} goals", result.len());

    Ok(result)
}

/// Resolve an agent's role values. Unresolvable roles are simply absent.
pub fn extract_agent_roles(task: &PlanningTask, agent: &str, cfg: &DomainRoleConfig) -> RoleValues {
    let Some(extractors) = &cfg.agent_role_extractors else {
        return RoleValues::new();
    };

    resolve(
        task,
        Subject::Agent(agent),
        extractors
            .iter()
            .map(|(name, extractor)| (name.as_str(), std::slice::from_ref(extractor))),
    )
    .values
}
