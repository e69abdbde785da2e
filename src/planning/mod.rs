//! Goal decomposition
//!
//! A grounded [`PlanningTask`] is turned into subtasks in stages: causal
//! graph and landmarks, goal graph, structural clusters, role resolution,
//! role-based partition, optional merging, and finally allocation to agents.

pub mod allocation;
pub mod causal;
pub mod clustering;
pub mod goal_graph;
pub mod merge;
pub mod roles;
pub mod subtasks;
pub mod task;

pub use allocation::{allocate_subtasks, Assignment};
pub use causal::{build_causal_graph, compute_landmarks, empty_landmarks};
pub use clustering::{connected_components, split_large_cluster};
pub use goal_graph::build_goal_graph;
pub use merge::{constraint_aware_merge, multi_objective_merge, ConstraintIndex, Jitter, Strategy};
pub use roles::{extract_agent_roles, extract_roles_for_goals, DomainRoleConfig, RoleValues};
pub use subtasks::{finer_partition_by_roles, IdAllocator, SubTask};
pub use task::{GroundAtom, PlanningTask};
