//! Subtasks and the role-based partition of structural clusters

use super::causal::Landmarks;
use super::roles::{DomainRoleConfig, RoleValues};
use super::task::GroundAtom;
use std::collections::{BTreeMap, BTreeSet};

/// Hands out subtask ids for one decomposition attempt
#[derive(Debug, Default)]
pub struct IdAllocator {
    next: u64,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&mut self) -> u64 {
        let id = self.next;
        self.next += 1;
        id
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubTask {
    pub id: u64,
    pub goals: Vec<GroundAtom>,
    pub landmark_predicates: BTreeSet<String>,
    /// cluster key -> value, or a `|`-joined disjunction after merges
    pub role_signature: BTreeMap<String, String>,
    pub roles_per_goal: BTreeMap<GroundAtom, RoleValues>,
}

impl SubTask {
    pub fn len(&self) -> usize {
        self.goals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.goals.is_empty()
    }

    pub fn common_landmarks(&self, other: &SubTask) -> usize {
        self.landmark_predicates
            .intersection(&other.landmark_predicates)
            .count()
    }

    /// Combine two subtasks under a fresh id. Goals keep their order, `a` first.
    pub fn merge(a: SubTask, b: SubTask, id: u64) -> SubTask {
        let role_signature = merge_signatures(&a.role_signature, &b.role_signature);

        let mut goals = a.goals;
        goals.extend(b.goals);

        let mut landmark_predicates = a.landmark_predicates;
        landmark_predicates.extend(b.landmark_predicates);

        let mut roles_per_goal = a.roles_per_goal;
        roles_per_goal.extend(b.roles_per_goal);

        SubTask {
            id,
            goals,
            landmark_predicates,
            role_signature,
            roles_per_goal,
        }
    }
}

/// Key-wise signature union. Keys present on both sides with different
/// values become the sorted, deduplicated `|`-join of all alternatives.
pub fn merge_signatures(
    a: &BTreeMap<String, String>,
    b: &BTreeMap<String, String>,
) -> BTreeMap<String, String> {
    let mut merged = a.clone();

    for (key, value) in b {
        match merged.get_mut(key) {
            Some(existing) if existing != value => {
                let alternatives: BTreeSet<&str> =
                    existing.split('|').chain(value.split('|')).collect();
                *existing = alternatives.into_iter().collect::<Vec<_>>().join("|");
            }
            Some(_) => {}
            None => {
                merged.insert(key.clone(), value.clone());
            }
        }
    }

    merged
}

/// Split every cluster by the tuple of cluster-key values of its goals.
///
/// Goals without a role assignment take no part. Groups keep the order in
/// which their first goal appears in the cluster.
pub fn finer_partition_by_roles(
    clusters: &[Vec<GroundAtom>],
    role_assignments: &BTreeMap<GroundAtom, RoleValues>,
    cfg: &DomainRoleConfig,
    landmarks: &Landmarks,
    ids: &mut IdAllocator,
) -> Vec<SubTask> {
    let mut subtasks = Vec::new();

    for cluster in clusters {
        let mut groups: Vec<(Vec<Option<&String>>, Vec<&GroundAtom>)> = Vec::new();

        for goal in cluster {
            let Some(roles) = role_assignments.get(goal) else {
                continue;
            };
            let key: Vec<Option<&String>> = cfg.cluster_keys.iter().map(|k| roles.get(k)).collect();

            match groups.iter_mut().find(|(k, _)| *k == key) {
                Some((_, members)) => members.push(goal),
                None => groups.push((key, vec![goal])),
            }
        }

        for (key, members) in groups {
            let role_signature = cfg
                .cluster_keys
                .iter()
                .zip(key)
                .filter_map(|(k, v)| v.map(|v| (k.clone(), v.clone())))
                .collect();

            let landmark_predicates = members
                .iter()
                .filter_map(|g| landmarks.get(*g))
                .flatten()
                .cloned()
                .collect();

            let roles_per_goal = members
                .iter()
                .filter_map(|g| role_assignments.get(*g).map(|r| ((*g).clone(), r.clone())))
                .collect();

            subtasks.push(SubTask {
                id: ids.next_id(),
                goals: members.into_iter().cloned().collect(),
                landmark_predicates,
                role_signature,
                roles_per_goal,
            });
        }
    }

    subtasks
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use crate::planning::task::fixtures::atom;

    /// A subtask over `goals` with one cluster key `loc`
    pub fn subtask(id: u64, goals: &[&str], loc: &str, landmarks: &[&str]) -> SubTask {
        let goals: Vec<GroundAtom> = goals.iter().map(|g| atom(g)).collect();
        let roles = RoleValues::from([("loc".to_string(), loc.to_string())]);
        SubTask {
            id,
            roles_per_goal: goals.iter().map(|g| (g.clone(), roles.clone())).collect(),
            goals,
            landmark_predicates: landmarks.iter().map(|s| s.to_string()).collect(),
            role_signature: roles,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::subtask;
    use super::*;
    use crate::planning::task::fixtures::atom;

    fn role_config(cluster_keys: &[&str]) -> DomainRoleConfig {
        DomainRoleConfig {
            domain: "d".to_string(),
            goal_predicates: vec!["holds".to_string()],
            roles: ["location", "tool"]
                .iter()
                .map(|r| {
                    (
                        r.to_string(),
                        crate::planning::roles::RoleRule { extractors: vec![] },
                    )
                })
                .collect(),
            cluster_keys: cluster_keys.iter().map(|s| s.to_string()).collect(),
            output_role_fields: None,
            agent_role_extractors: None,
        }
    }

    fn roles(pairs: &[(&str, &str)]) -> RoleValues {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_ids_are_monotonic() {
        let mut ids = IdAllocator::new();
        assert_eq!(ids.next_id(), 0);
        assert_eq!(ids.next_id(), 1);
        assert_eq!(ids.next_id(), 2);
    }

    #[test]
    fn test_same_roles_share_a_subtask() {
        let (a, b) = (atom("holds a"), atom("holds b"));
        let assignments = BTreeMap::from([
            (a.clone(), roles(&[("location", "a"), ("tool", "t1")])),
            (b.clone(), roles(&[("location", "a"), ("tool", "t2")])),
        ]);
        let landmarks = Landmarks::from([
            (a.clone(), BTreeSet::from(["at".to_string()])),
            (b.clone(), BTreeSet::from(["free".to_string()])),
        ]);
        let mut ids = IdAllocator::new();

        let subtasks = finer_partition_by_roles(
            &[vec![a.clone(), b.clone()]],
            &assignments,
            &role_config(&["location"]),
            &landmarks,
            &mut ids,
        );

        assert_eq!(subtasks.len(), 1);
        assert_eq!(subtasks[0].goals, vec![a, b]);
        assert_eq!(subtasks[0].role_signature, roles(&[("location", "a")]));
        assert_eq!(subtasks[0].landmark_predicates.len(), 2);
        assert_eq!(subtasks[0].roles_per_goal.len(), 2);
    }

    #[test]
    fn test_differing_key_splits_and_unassigned_goals_drop() {
        let (a, b, c) = (atom("holds a"), atom("holds b"), atom("holds c"));
        let assignments = BTreeMap::from([
            (a.clone(), roles(&[("location", "x"), ("tool", "t1")])),
            (b.clone(), roles(&[("location", "y"), ("tool", "t1")])),
        ]);
        let mut ids = IdAllocator::new();

        let subtasks = finer_partition_by_roles(
            &[vec![b.clone(), c, a.clone()]],
            &assignments,
            &role_config(&["location"]),
            &Landmarks::new(),
            &mut ids,
        );

        assert_eq!(subtasks.len(), 2);
        assert_eq!(subtasks[0].goals, vec![b]);
        assert_eq!(subtasks[0].id, 0);
        assert_eq!(subtasks[1].goals, vec![a]);
        assert_eq!(subtasks[1].id, 1);
        assert_eq!(ids.next_id(), 2);
    }

    #[test]
    fn test_clusters_are_never_mixed() {
        let (a, b) = (atom("holds a"), atom("holds b"));
        let assignments = BTreeMap::from([
            (a.clone(), roles(&[("location", "x"), ("tool", "t1")])),
            (b.clone(), roles(&[("location", "x"), ("tool", "t1")])),
        ]);
        let subtasks = finer_partition_by_roles(
            &[vec![a], vec![b]],
            &assignments,
            &role_config(&["location", "tool"]),
            &Landmarks::new(),
            &mut IdAllocator::new(),
        );
        assert_eq!(subtasks.len(), 2);
        assert_eq!(subtasks[1].role_signature, roles(&[("location", "x"), ("tool", "t1")]));
    }

    #[test]
    fn test_differing_signature_values_become_disjunction() {
        let merged = SubTask::merge(
            subtask(0, &["g a"], "x", &[]),
            subtask(1, &["g b"], "y", &[]),
            2,
        );
        assert_eq!(merged.id, 2);
        assert_eq!(merged.role_signature["loc"], "x|y");
        assert_eq!(merged.goals, vec![atom("g a"), atom("g b")]);
        assert_eq!(merged.roles_per_goal.len(), 2);
    }

    #[test]
    fn test_disjunctions_stay_sorted_and_deduplicated() {
        let a = BTreeMap::from([
            ("loc".to_string(), "z|x".to_string()),
            ("tool".to_string(), "t1".to_string()),
        ]);
        let b = BTreeMap::from([
            ("loc".to_string(), "y|x".to_string()),
            ("arm".to_string(), "left".to_string()),
        ]);
        let merged = merge_signatures(&a, &b);
        assert_eq!(merged["loc"], "x|y|z");
        assert_eq!(merged["tool"], "t1");
        assert_eq!(merged["arm"], "left");

        assert_eq!(merge_signatures(&a, &a), a);
    }

    #[test]
    fn test_merge_unions_landmarks() {
        let merged = SubTask::merge(
            subtask(0, &["g a"], "x", &["at", "free"]),
            subtask(1, &["g b"], "x", &["free", "holding"]),
            7,
        );
        assert_eq!(merged.landmark_predicates.len(), 3);
        assert_eq!(merged.role_signature["loc"], "x");
        assert_eq!(
            subtask(0, &["g a"], "x", &["at", "free"])
                .common_landmarks(&subtask(1, &["g b"], "x", &["free"])),
            1
        );
    }
}
