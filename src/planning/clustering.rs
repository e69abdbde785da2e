//! Structural clustering of goals

use super::goal_graph::GoalGraph;
use super::task::GroundAtom;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::{BTreeSet, VecDeque};

/// Connected components of the goal graph.
///
/// Components are discovered from goals in sorted order; members are listed
/// in breadth-first order with sorted neighbour expansion.
pub fn connected_components(graph: &GoalGraph) -> Vec<Vec<GroundAtom>> {
    let mut visited: BTreeSet<&GroundAtom> = BTreeSet::new();
    let mut components = Vec::new();

    for start in graph.keys() {
        if !visited.insert(start) {
            continue;
        }

        let mut component = Vec::new();
        let mut queue = VecDeque::from([start]);
        while let Some(goal) = queue.pop_front() {
            component.push(goal.clone());
            for neighbour in graph.get(goal).into_iter().flatten() {
                if visited.insert(neighbour) {
                    queue.push_back(neighbour);
                }
            }
        }

        components.push(component);
    }

    components
}

/// Slice a cluster into chunks of at most `max_size` goals.
///
/// Oversized clusters are shuffled first with probability `epsilon`, and
/// keep their structural order otherwise. Clusters that already fit are
/// returned unchanged without touching `rng`.
pub fn split_large_cluster<R: Rng>(
    mut cluster: Vec<GroundAtom>,
    max_size: usize,
    rng: &mut R,
    epsilon: f64,
) -> Vec<Vec<GroundAtom>> {
    let max_size = max_size.max(1);
    if cluster.len() <= max_size {
        return vec![cluster];
    }

    if rng.gen::<f64>() < epsilon {
        cluster.shuffle(rng);
    }

    cluster.chunks(max_size).map(<[GroundAtom]>::to_vec).collect()
}
