//! PDDL front end: tokenizer, S-expression reader and AST builders
//!
//! Text flows `tokenize -> parse_sexprs -> parse_domain / parse_problem`.
//! Only the STRIPS-like subset needed for goal decomposition is interpreted;
//! precondition and effect formulas are kept as raw S-expressions.

pub mod ast;
pub mod domain;
pub mod lexer;
pub mod problem;

pub use ast::{ActionSchema, DomainAst, Literal, PredicateSchema, ProblemAst};
pub use domain::parse_domain;
pub use lexer::{read, SExpr};
pub use problem::parse_problem;

use crate::error::SyntaxError;

/// Read and build a domain from PDDL text
pub fn domain_from_str(text: &str) -> Result<DomainAst, SyntaxError> {
    parse_domain(&read(text)?)
}

/// Read and build a problem from PDDL text
pub fn problem_from_str(text: &str) -> Result<ProblemAst, SyntaxError> {
    parse_problem(&read(text)?)
}
