//! Typed domain and problem structures built from the S-expression tree

use super::lexer::SExpr;
use std::collections::BTreeMap;

/// A parameter or declared name with an optional `- type` suffix
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypedVar {
    pub name: String,
    /// `None` when the declaration carried no type
    pub type_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredicateSchema {
    pub name: String,
    pub parameters: Vec<TypedVar>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Literal {
    pub predicate: String,
    pub args: Vec<String>,
    pub negated: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionSchema {
    pub name: String,
    pub parameters: Vec<TypedVar>,
    pub precondition: Option<SExpr>,
    pub effect: Option<SExpr>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainAst {
    pub name: String,
    pub requirements: Vec<String>,
    /// Declared types; `type_name` holds the parent type when given
    pub types: Vec<TypedVar>,
    pub predicates: BTreeMap<String, PredicateSchema>,
    pub actions: BTreeMap<String, ActionSchema>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProblemAst {
    pub name: String,
    pub domain_name: String,
    /// object name -> type name
    pub objects: BTreeMap<String, String>,
    pub init: Vec<Literal>,
    pub goals: Vec<Literal>,
}

/// Parse a PDDL typed list: `a b - t1 c - t2 d`.
///
/// Each run of names takes the type following the next `-`; names in a
/// trailing run without a type get `None`.
pub fn parse_typed_list(items: &[SExpr]) -> Vec<TypedVar> {
    let mut result = Vec::new();
    let mut pending: Vec<String> = Vec::new();
    let mut i = 0;

    while i < items.len() {
        match items[i].as_atom() {
            Some("-") => {
                let type_name = items.get(i + 1).and_then(SExpr::as_atom);
                for name in pending.drain(..) {
                    result.push(TypedVar {
                        name,
                        type_name: type_name.map(str::to_string),
                    });
                }
                i += 2;
            }
            Some(name) => {
                pending.push(name.to_string());
                i += 1;
            }
            // `(either a b)` and other nested forms are not names
            None => i += 1,
        }
    }

    result.extend(pending.into_iter().map(|name| TypedVar {
        name,
        type_name: None,
    }));
    result
}

/// Parse `(pred a b)` or `(not (pred a b))` into a literal.
///
/// Returns `None` for shapes that are not a literal; non-atom arguments
/// are skipped.
pub fn parse_literal(expr: &SExpr) -> Option<Literal> {
    let items = expr.as_list()?;
    let (negated, inner) = match items {
        [head, inner] if head.is_atom("not") => (true, inner.as_list()?),
        [head, ..] if head.is_atom("not") => return None,
        _ => (false, items),
    };

    let (head, args) = inner.split_first()?;
    let predicate = head.as_atom()?.to_string();
    let args = args
        .iter()
        .filter_map(SExpr::as_atom)
        .map(str::to_string)
        .collect();

    Some(Literal {
        predicate,
        args,
        negated,
    })
}

/// Find the `(define (<kind> name) ...)` form among top-level expressions
pub(crate) fn find_define<'a>(exprs: &'a [SExpr], kind: &str) -> Option<&'a [SExpr]> {
    exprs.iter().find_map(|expr| {
        let items = expr.as_list()?;
        if items.len() < 3 || !items[0].is_atom("define") {
            return None;
        }
        if items[1].head() == Some(kind) {
            Some(items)
        } else {
            None
        }
    })
}

/// Name given in `(domain name)` / `(problem name)`, or "unknown"
pub(crate) fn define_name(header: &SExpr) -> String {
    header
        .as_list()
        .and_then(|items| items.get(1))
        .and_then(SExpr::as_atom)
        .unwrap_or("unknown")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pddl::lexer::read;

    fn list(text: &str) -> Vec<SExpr> {
        read(text).unwrap().remove(0).as_list().unwrap().to_vec()
    }

    #[test]
    fn test_typed_list_runs() {
        let vars = parse_typed_list(&list("(?r ?s - robot ?l - location ?x)"));
        assert_eq!(vars.len(), 4);
        assert_eq!(vars[0].type_name.as_deref(), Some("robot"));
        assert_eq!(vars[1].type_name.as_deref(), Some("robot"));
        assert_eq!(vars[2].name, "?l");
        assert_eq!(vars[2].type_name.as_deref(), Some("location"));
        assert_eq!(vars[3].type_name, None);
    }

    #[test]
    fn test_literal_negation() {
        let expr = read("(not (at r1 a))").unwrap().remove(0);
        let lit = parse_literal(&expr).unwrap();
        assert!(lit.negated);
        assert_eq!(lit.predicate, "at");
        assert_eq!(lit.args, vec!["r1", "a"]);
    }

    #[test]
    fn test_malformed_literals_are_rejected() {
        assert!(parse_literal(&read("(not a)").unwrap().remove(0)).is_none());
        assert!(parse_literal(&read("()").unwrap().remove(0)).is_none());
        assert!(parse_literal(&SExpr::Atom("x".to_string())).is_none());
    }
}
