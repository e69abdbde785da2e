use super::ast::{define_name, find_define, parse_literal, parse_typed_list, Literal, ProblemAst};
use super::lexer::SExpr;
use crate::error::SyntaxError;
use std::collections::BTreeMap;
use tracing::debug;

/// Type given to problem objects declared without `- type`
pub const DEFAULT_OBJECT_TYPE: &str = "object";

/// Build a problem from the top-level forms of a problem file
pub fn parse_problem(exprs: &[SExpr]) -> Result<ProblemAst, SyntaxError> {
    let define =
        find_define(exprs, "problem").ok_or(SyntaxError::MissingDefine { kind: "problem" })?;

    let mut problem = ProblemAst {
        name: define_name(&define[1]),
        domain_name: "unknown".to_string(),
        objects: BTreeMap::new(),
        init: Vec::new(),
        goals: Vec::new(),
    };

    for section in &define[2..] {
        let Some(items) = section.as_list() else {
            continue;
        };
        let Some((keyword, body)) = items.split_first() else {
            continue;
        };

        match keyword.as_atom() {
            Some(":domain") => {
                if let Some(name) = body.first().and_then(SExpr::as_atom) {
                    problem.domain_name = name.to_string();
                }
            }
            Some(":objects") => {
                for var in parse_typed_list(body) {
                    let type_name = var
                        .type_name
                        .unwrap_or_else(|| DEFAULT_OBJECT_TYPE.to_string());
                    problem.objects.insert(var.name, type_name);
                }
            }
            Some(":init") => problem.init = parse_literals(body),
            Some(":goal") => problem.goals = parse_goal(body),
            _ => {}
        }
    }

    Ok(problem)
}

fn parse_literals(items: &[SExpr]) -> Vec<Literal> {
    items
        .iter()
        .filter_map(|item| {
            let literal = parse_literal(item);
            if literal.is_none() {
                debug!("Skipping malformed literal {:?}", item);
            }
            literal
        })
        .collect()
}

/// A goal is either a single literal or an `(and ...)` of literals
fn parse_goal(body: &[SExpr]) -> Vec<Literal> {
    let Some(expr) = body.first() else {
        return Vec::new();
    };

    match expr.as_list() {
        Some([head, rest @ ..]) if head.is_atom("and") => parse_literals(rest),
        Some(_) => parse_literal(expr).into_iter().collect(),
        None => Vec::new(),
    }
}
