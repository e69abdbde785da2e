use super::causal::{CausalGraph, Landmarks};
use super::task::GroundAtom;
use std::collections::{BTreeMap, BTreeSet};

/// Undirected compatibility graph over goal atoms
pub type GoalGraph = BTreeMap<GroundAtom, BTreeSet<GroundAtom>>;

/// Connect two goals when they share a predicate, when their predicates
/// are directly causally adjacent, or (with `landmarks`) when their
/// landmark sets intersect.
pub fn build_goal_graph(
    goals: &BTreeSet<GroundAtom>,
    graph: &CausalGraph,
    landmarks: Option<&Landmarks>,
) -> GoalGraph {
    let goal_list: Vec<&GroundAtom> = goals.iter().collect();
    let mut gamma: GoalGraph = goals.iter().map(|g| (g.clone(), BTreeSet::new())).collect();

    let adjacent = |p: &str, q: &str| graph.get(p).is_some_and(|succ| succ.contains(q));
    let empty = BTreeSet::new();

    for (i, gi) in goal_list.iter().enumerate() {
        for gj in &goal_list[i + 1..] {
            let (pi, pj) = (gi.predicate.as_str(), gj.predicate.as_str());

            let same_predicate = pi == pj;
            let causal = adjacent(pi, pj) || adjacent(pj, pi);
            let shared_landmark = landmarks.is_some_and(|lm| {
                let li = lm.get(*gi).unwrap_or(&empty);
                let lj = lm.get(*gj).unwrap_or(&empty);
                !li.is_disjoint(lj)
            });

            if same_predicate || causal || shared_landmark {
                if let Some(n) = gamma.get_mut(*gi) {
                    n.insert((*gj).clone());
                }
                if let Some(n) = gamma.get_mut(*gj) {
                    n.insert((*gi).clone());
                }
            }
        }
    }

    gamma
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planning::causal::{build_causal_graph, compute_landmarks};
    use crate::planning::task::fixtures::*;

    #[test]
    fn test_same_predicate_goals_are_connected() {
        let task = warehouse_task();
        let cg = build_causal_graph(&task);
        let gamma = build_goal_graph(&task.goals, &cg, None);
        assert_eq!(gamma.len(), 4);
        for neighbours in gamma.values() {
            assert_eq!(neighbours.len(), 3);
        }
    }

    #[test]
    fn test_unrelated_predicates_stay_apart_without_landmarks() {
        let domain = r#"
(define (domain d)
  (:predicates (a ?x) (b ?x) (c ?x) (src ?x))
  (:action make-a :parameters (?x) :precondition (src ?x) :effect (a ?x))
  (:action make-b :parameters (?x) :precondition (src ?x) :effect (b ?x))
  (:action make-c :parameters (?x) :precondition (a ?x) :effect (c ?x)))
"#;
        let problem = "(define (problem p) (:domain d) (:goal (and (a o1) (b o2) (c o3))))";
        let task = task_from(domain, problem);
        let cg = build_causal_graph(&task);

        let gamma = build_goal_graph(&task.goals, &cg, None);
        // a -> c is a direct causal edge, b shares nothing
        assert!(gamma[&atom("a o1")].contains(&atom("c o3")));
        assert!(gamma[&atom("c o3")].contains(&atom("a o1")));
        assert!(gamma[&atom("b o2")].is_empty());

        // a and b both need src, so their landmark sets overlap
        let lm = compute_landmarks(&task, &cg, 2);
        let gamma = build_goal_graph(&task.goals, &cg, Some(&lm));
        assert!(gamma[&atom("b o2")].contains(&atom("a o1")));
    }
}
