use crate::error::OutputError;
use crate::multiagent::{Agent, Capabilities};
use crate::planning::{Assignment, RoleValues, SubTask};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// The decomposition result as written to disk or stdout
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecompositionReport {
    pub domain: String,
    pub problem: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strategy: Option<String>,
    pub subtasks: Vec<SubtaskRecord>,
    pub assignment: Assignment,
    pub agents: BTreeMap<String, Agent>,
    pub capabilities: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubtaskRecord {
    pub id: u64,
    pub goals: Vec<String>,
    pub landmark_predicates: Vec<String>,
    pub role_signature: BTreeMap<String, String>,
    pub assigned_agent: Option<String>,
    /// goal -> reported role values
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub goal_roles: BTreeMap<String, RoleValues>,
}

impl SubtaskRecord {
    pub fn new(subtask: &SubTask, assignment: &Assignment, role_fields: &[String]) -> Self {
        let goal_roles = subtask
            .goals
            .iter()
            .filter_map(|goal| {
                let roles = subtask.roles_per_goal.get(goal)?;
                let reported: RoleValues = roles
                    .iter()
                    .filter(|(name, _)| role_fields.contains(name))
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect();
                Some((goal.to_string(), reported))
            })
            .filter(|(_, roles)| !roles.is_empty())
            .collect();

        Self {
            id: subtask.id,
            goals: subtask.goals.iter().map(ToString::to_string).collect(),
            landmark_predicates: subtask.landmark_predicates.iter().cloned().collect(),
            role_signature: subtask.role_signature.clone(),
            assigned_agent: assignment.get(&subtask.id).cloned(),
            goal_roles,
        }
    }
}

impl DecompositionReport {
    pub fn to_json(&self) -> Result<String, OutputError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Goal counts per subtask, in subtask order
    pub fn goal_counts(&self) -> Vec<usize> {
        self.subtasks.iter().map(|s| s.goals.len()).collect()
    }
}

pub fn capability_lists(capabilities: &Capabilities) -> BTreeMap<String, Vec<String>> {
    capabilities
        .iter()
        .map(|(agent, actions)| (agent.clone(), actions.iter().cloned().collect()))
        .collect()
}

/// Write the report as pretty JSON, creating parent directories
pub fn write_report(path: &Path, report: &DecompositionReport) -> Result<(), OutputError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(OutputError::CreateDir)?;
    }
    let json = report.to_json()?;
    fs::write(path, json).map_err(OutputError::Write)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planning::subtasks::fixtures::subtask;
    use tempfile::TempDir;

    fn report() -> DecompositionReport {
        let st = subtask(3, &["delivered i1", "delivered i2"], "l1", &["at", "holding"]);
        let assignment = Assignment::from([(3, "r1".to_string())]);
        DecompositionReport {
            domain: "warehouse".to_string(),
            problem: "warehouse-4".to_string(),
            strategy: None,
            subtasks: vec![SubtaskRecord::new(&st, &assignment, &["loc".to_string()])],
            assignment,
            agents: BTreeMap::from([(
                "r1".to_string(),
                Agent {
                    name: "r1".to_string(),
                    type_name: "robot".to_string(),
                },
            )]),
            capabilities: BTreeMap::from([("r1".to_string(), vec!["move".to_string()])]),
        }
    }

    #[test]
    fn test_json_shape() {
        let value: serde_json::Value = serde_json::from_str(&report().to_json().unwrap()).unwrap();

        assert_eq!(value["domain"], "warehouse");
        assert!(value.get("strategy").is_none());
        assert_eq!(value["assignment"]["3"], "r1");
        assert_eq!(value["agents"]["r1"]["type"], "robot");

        let st = &value["subtasks"][0];
        assert_eq!(st["id"], 3);
        assert_eq!(st["goals"][0], "delivered(i1)");
        assert_eq!(st["landmark_predicates"][1], "holding");
        assert_eq!(st["role_signature"]["loc"], "l1");
        assert_eq!(st["assigned_agent"], "r1");
        assert_eq!(st["goal_roles"]["delivered(i2)"]["loc"], "l1");
    }

    #[test]
    fn test_goal_roles_follow_reported_fields() {
        let st = subtask(0, &["delivered i1"], "l1", &[]);
        let record = SubtaskRecord::new(&st, &Assignment::new(), &["zone".to_string()]);
        assert!(record.goal_roles.is_empty());
        assert_eq!(record.assigned_agent, None);
    }

    #[test]
    fn test_write_creates_parent_dirs() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("result.json");
        write_report(&path, &report()).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("\"problem\": \"warehouse-4\""));
    }
}
