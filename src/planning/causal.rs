//! Predicate-level causal graph and landmark approximation

use super::task::{GroundAtom, PlanningTask};
use crate::pddl::lexer::SExpr;
use std::collections::{BTreeMap, BTreeSet};

/// predicate -> predicates it can causally enable
pub type CausalGraph = BTreeMap<String, BTreeSet<String>>;

/// goal -> predicate names found by backward traversal from its predicate
pub type Landmarks = BTreeMap<GroundAtom, BTreeSet<String>>;

/// Add an edge `p -> q` for every action with `p` in its precondition and
/// `q` among its positive effects. Only `p` has to be a declared predicate.
pub fn build_causal_graph(task: &PlanningTask) -> CausalGraph {
    let mut graph: CausalGraph = task
        .predicates
        .keys()
        .map(|p| (p.clone(), BTreeSet::new()))
        .collect();

    for action in task.actions.values() {
        let mut pre = BTreeSet::new();
        if let Some(precondition) = &action.precondition {
            collect_precondition(precondition, &mut pre);
        }
        let mut adds = BTreeSet::new();
        if let Some(effect) = &action.effect {
            collect_adds(effect, &mut adds);
        }

        for p in &pre {
            let Some(successors) = graph.get_mut(p) else {
                continue;
            };
            successors.extend(adds.iter().cloned());
        }
    }

    graph
}

/// Predicates mentioned by a precondition; `(not (p ..))` contributes `p`
fn collect_precondition(expr: &SExpr, out: &mut BTreeSet<String>) {
    match expr.as_list() {
        Some([head, rest @ ..]) if head.is_atom("and") => {
            for sub in rest {
                collect_precondition(sub, out);
            }
        }
        Some([head, inner, ..]) if head.is_atom("not") => {
            if let Some(name) = inner.head() {
                out.insert(name.to_string());
            }
        }
        Some([head, ..]) => {
            if let Some(name) = head.as_atom() {
                out.insert(name.to_string());
            }
        }
        _ => {}
    }
}

/// Predicates an effect adds; `(not ...)` is a delete and contributes nothing
fn collect_adds(expr: &SExpr, out: &mut BTreeSet<String>) {
    match expr.as_list() {
        Some([head, rest @ ..]) if head.is_atom("and") => {
            for sub in rest {
                collect_adds(sub, out);
            }
        }
        Some([head, ..]) if head.is_atom("not") => {}
        Some([head, ..]) => {
            if let Some(name) = head.as_atom() {
                out.insert(name.to_string());
            }
        }
        _ => {}
    }
}

fn reverse(graph: &CausalGraph) -> CausalGraph {
    let mut rev: CausalGraph = graph.keys().map(|p| (p.clone(), BTreeSet::new())).collect();
    for (from, successors) in graph {
        for to in successors {
            rev.entry(to.clone()).or_default().insert(from.clone());
        }
    }
    rev
}

/// For each goal, breadth-first search up to `max_depth` hops over the
/// reversed causal graph from the goal's predicate. The root is excluded.
pub fn compute_landmarks(task: &PlanningTask, graph: &CausalGraph, max_depth: usize) -> Landmarks {
    let rev = reverse(graph);

    task.goals
        .iter()
        .map(|goal| {
            let root = goal.predicate.as_str();
            let mut visited: BTreeSet<String> = BTreeSet::from([root.to_string()]);
            let mut frontier = vec![root.to_string()];

            for _ in 0..max_depth {
                if frontier.is_empty() {
                    break;
                }
                let mut next = Vec::new();
                for q in &frontier {
                    for p in rev.get(q).into_iter().flatten() {
                        if visited.insert(p.clone()) {
                            next.push(p.clone());
                        }
                    }
                }
                frontier = next;
            }

            visited.remove(root);
            (goal.clone(), visited)
        })
        .collect()
}

/// Empty landmark sets for every goal, used when landmarks are disabled
pub fn empty_landmarks(task: &PlanningTask) -> Landmarks {
    task.goals
        .iter()
        .map(|goal| (goal.clone(), BTreeSet::new()))
        .collect()
}
