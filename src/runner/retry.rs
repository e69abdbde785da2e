use crate::config::{ClusteringConfig, MissingRolePolicy};
use crate::error::ClusteringError;
use crate::planning::{
    build_causal_graph, build_goal_graph, compute_landmarks, connected_components,
    constraint_aware_merge, empty_landmarks, extract_roles_for_goals, finer_partition_by_roles,
    multi_objective_merge, split_large_cluster, ConstraintIndex, DomainRoleConfig, IdAllocator,
    Jitter, PlanningTask, Strategy, SubTask,
};
use rand::Rng;
use tracing::{debug, info, warn};

/// Accepted outcome of the retry loop
#[derive(Debug)]
pub struct Decomposition {
    pub subtasks: Vec<SubTask>,
    /// Concrete strategy used by the strategy-driven merge, if any ran
    pub strategy: Option<Strategy>,
    /// Attempt index that was accepted
    pub attempt: u32,
    pub epsilon: f64,
}

/// Partition goals into at most `max_subtasks` subtasks.
///
/// Attempts run `0..=max_retries`. Each attempt splits the structural
/// clusters at the current epsilon, partitions by role signature and merges
/// when enabled. A failed attempt raises epsilon by `epsilon_step`, capped at
/// 1.0, before the next one; the last failure is final.
pub fn build_subtasks_with_retry<R: Rng>(
    task: &PlanningTask,
    cfg: &ClusteringConfig,
    role_cfg: &DomainRoleConfig,
    policy: MissingRolePolicy,
    rng: &mut R,
) -> Result<Decomposition, ClusteringError> {
    let causal = build_causal_graph(task);
    let landmarks = if cfg.use_landmarks {
        compute_landmarks(task, &causal, cfg.landmark_max_depth)
    } else {
        empty_landmarks(task)
    };
    let goal_graph = build_goal_graph(&task.goals, &causal, cfg.use_landmarks.then_some(&landmarks));
    let components = connected_components(&goal_graph);
    debug!("{} structural components", components.len());

    let role_assignments = extract_roles_for_goals(task, role_cfg, policy)?;
    let index = ConstraintIndex::new(task, cfg);

    let strategy = match (cfg.merge_compatible_subtasks, cfg.optimization_strategy) {
        (true, Some(name)) => Some(Strategy::select(name, rng)),
        _ => None,
    };

    let mut epsilon = cfg.epsilon_start;
    let mut last_count = 0;

    for attempt in 0..=cfg.max_retries {
        let mut ids = IdAllocator::new();

        let mut clusters = Vec::new();
        for component in &components {
            clusters.extend(split_large_cluster(
                component.clone(),
                cfg.max_cluster_size,
                rng,
                epsilon,
            ));
        }

        let mut subtasks =
            finer_partition_by_roles(&clusters, &role_assignments, role_cfg, &landmarks, &mut ids);
        debug!(
            "Attempt {}: {} clusters, {} subtasks after role partition",
            attempt,
            clusters.len(),
            subtasks.len()
        );

        if cfg.merge_compatible_subtasks {
            subtasks = match strategy {
                Some(strategy) => {
                    let mut jitter = Jitter::new(&mut *rng, cfg.strategy_randomness);
                    multi_objective_merge(
                        subtasks,
                        &index,
                        strategy,
                        Some(cfg.max_subtasks),
                        &mut jitter,
                        &mut ids,
                    )
                }
                None => constraint_aware_merge(subtasks, &index, Some(cfg.max_subtasks), &mut ids),
            };
        }

        if subtasks.len() <= cfg.max_subtasks {
            info!(
                "Accepted {} subtasks on attempt {} (epsilon {:.2})",
                subtasks.len(),
                attempt,
                epsilon
            );
            return Ok(Decomposition {
                subtasks,
                strategy,
                attempt,
                epsilon,
            });
        }

        last_count = subtasks.len();
        if attempt < cfg.max_retries {
            let next = (epsilon + cfg.epsilon_step).min(1.0);
            warn!(
                "Attempt {} produced {} subtasks (max {}), retrying with epsilon {:.2}",
                attempt, last_count, cfg.max_subtasks, next
            );
            epsilon = next;
        }
    }

    Err(ClusteringError::Unsatisfiable {
        max_subtasks: cfg.max_subtasks,
        retries: cfg.max_retries,
        last_count,
        epsilon,
    })
}
