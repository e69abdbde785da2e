//! Grounded planning task built from the domain and problem ASTs

use crate::pddl::lexer::SExpr;
use crate::pddl::{ActionSchema, DomainAst, Literal, PredicateSchema, ProblemAst};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use tracing::debug;

/// A fully instantiated predicate application, e.g. `at(robot1, roomA)`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroundAtom {
    pub predicate: String,
    pub args: Vec<String>,
}

impl GroundAtom {
    pub fn new<P, I, A>(predicate: P, args: I) -> Self
    where
        P: Into<String>,
        I: IntoIterator<Item = A>,
        A: Into<String>,
    {
        Self {
            predicate: predicate.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    fn from_literal(literal: &Literal) -> Self {
        Self {
            predicate: literal.predicate.clone(),
            args: literal.args.clone(),
        }
    }
}

impl fmt::Display for GroundAtom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.predicate, self.args.join(", "))
    }
}

/// Object universe indexed both ways
#[derive(Debug, Clone, Default)]
pub struct TypeEnv {
    objects_of_type: BTreeMap<String, BTreeSet<String>>,
    type_of_object: BTreeMap<String, String>,
}

impl TypeEnv {
    pub fn add_object(&mut self, object: &str, type_name: &str) {
        self.objects_of_type
            .entry(type_name.to_string())
            .or_default()
            .insert(object.to_string());
        self.type_of_object
            .insert(object.to_string(), type_name.to_string());
    }

    pub fn objects(&self, type_name: &str) -> impl Iterator<Item = &str> {
        self.objects_of_type
            .get(type_name)
            .into_iter()
            .flatten()
            .map(String::as_str)
    }

    pub fn object_type(&self, object: &str) -> Option<&str> {
        self.type_of_object.get(object).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.type_of_object.len()
    }
}

/// The grounded problem. Built once and read-only afterwards.
#[derive(Debug, Clone)]
pub struct PlanningTask {
    pub domain_name: String,
    pub problem_name: String,
    pub objects: TypeEnv,
    pub predicates: BTreeMap<String, PredicateSchema>,
    pub actions: BTreeMap<String, ActionSchema>,
    pub init: BTreeSet<GroundAtom>,
    pub goals: BTreeSet<GroundAtom>,
    /// Predicates that no action adds or deletes
    pub static_predicates: BTreeSet<String>,
}

impl PlanningTask {
    /// Ground the ASTs. Negated init and goal literals are dropped.
    pub fn from_ast(domain: &DomainAst, problem: &ProblemAst) -> Self {
        let mut objects = TypeEnv::default();
        for (name, type_name) in &problem.objects {
            objects.add_object(name, type_name);
        }

        let init = positive_atoms(&problem.init);
        let goals = positive_atoms(&problem.goals);

        let dropped = problem.init.len() + problem.goals.len() - count_positive(problem);
        if dropped > 0 {
            debug!("Dropped {} negated init/goal literals", dropped);
        }

        Self {
            domain_name: domain.name.clone(),
            problem_name: problem.name.clone(),
            objects,
            predicates: domain.predicates.clone(),
            actions: domain.actions.clone(),
            init,
            goals,
            static_predicates: compute_static_predicates(domain),
        }
    }

    /// Init atoms of one predicate
    pub fn init_with<'a>(&'a self, predicate: &'a str) -> impl Iterator<Item = &'a GroundAtom> {
        self.init.iter().filter(move |atom| atom.predicate == predicate)
    }
}

fn positive_atoms(literals: &[Literal]) -> BTreeSet<GroundAtom> {
    literals
        .iter()
        .filter(|lit| !lit.negated)
        .map(GroundAtom::from_literal)
        .collect()
}

fn count_positive(problem: &ProblemAst) -> usize {
    problem
        .init
        .iter()
        .chain(problem.goals.iter())
        .filter(|lit| !lit.negated)
        .count()
}

/// All declared predicates minus those in any action's add or delete effects
pub fn compute_static_predicates(domain: &DomainAst) -> BTreeSet<String> {
    let mut dynamic = BTreeSet::new();
    for action in domain.actions.values() {
        if let Some(effect) = &action.effect {
            collect_effect_predicates(effect, &mut dynamic);
        }
    }

    domain
        .predicates
        .keys()
        .filter(|name| !dynamic.contains(*name))
        .cloned()
        .collect()
}

fn collect_effect_predicates(effect: &SExpr, out: &mut BTreeSet<String>) {
    let Some(items) = effect.as_list() else {
        return;
    };

    match items {
        [head, rest @ ..] if head.is_atom("and") => {
            for sub in rest {
                collect_effect_predicates(sub, out);
            }
        }
        [head, inner, ..] if head.is_atom("not") => {
            if let Some(name) = inner.head() {
                out.insert(name.to_string());
            }
        }
        [head, ..] => {
            if let Some(name) = head.as_atom() {
                out.insert(name.to_string());
            }
        }
        [] => {}
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn test_grounding_builds_object_universe() {
        let task = warehouse_task();
        assert_eq!(task.domain_name, "warehouse");
        assert_eq!(task.problem_name, "warehouse-4");
        assert_eq!(task.objects.len(), 8);
        assert_eq!(task.objects.object_type("r2"), Some("robot"));
        assert_eq!(task.objects.objects("item").count(), 4);
        assert_eq!(task.objects.objects("vehicle").count(), 0);
    }

    #[test]
    fn test_negated_init_facts_are_dropped() {
        let task = warehouse_task();
        assert_eq!(task.init.len(), 12);
        assert!(!task.init.contains(&atom("holding r1 i1")));
        assert_eq!(task.goals.len(), 4);
        assert!(task.goals.contains(&atom("delivered i3")));
    }

    #[test]
    fn test_static_predicates_exclude_added_and_deleted() {
        let task = warehouse_task();
        let expected: BTreeSet<String> = ["reachable", "weight", "zone"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(task.static_predicates, expected);
    }

    #[test]
    fn test_ground_atom_display() {
        assert_eq!(atom("at r1 l1").to_string(), "at(r1, l1)");
        assert_eq!(GroundAtom::new("done", Vec::<String>::new()).to_string(), "done()");
    }
}
