use super::ast::{
    define_name, find_define, parse_typed_list, ActionSchema, DomainAst, PredicateSchema,
};
use super::lexer::SExpr;
use crate::error::SyntaxError;
use std::collections::BTreeMap;

/// Build a domain from the top-level forms of a domain file
pub fn parse_domain(exprs: &[SExpr]) -> Result<DomainAst, SyntaxError> {
    let define = find_define(exprs, "domain").ok_or(SyntaxError::MissingDefine { kind: "domain" })?;

    let mut domain = DomainAst {
        name: define_name(&define[1]),
        requirements: Vec::new(),
        types: Vec::new(),
        predicates: BTreeMap::new(),
        actions: BTreeMap::new(),
    };

    for section in &define[2..] {
        let Some(items) = section.as_list() else {
            continue;
        };
        let Some((keyword, body)) = items.split_first() else {
            continue;
        };

        match keyword.as_atom() {
            Some(":requirements") => {
                domain.requirements = body
                    .iter()
                    .filter_map(SExpr::as_atom)
                    .map(str::to_string)
                    .collect();
            }
            Some(":types") => domain.types = parse_typed_list(body),
            Some(":predicates") => {
                for decl in body {
                    if let Some((name, params)) = decl.as_list().and_then(|l| l.split_first()) {
                        if let Some(name) = name.as_atom() {
                            domain.predicates.insert(
                                name.to_string(),
                                PredicateSchema {
                                    name: name.to_string(),
                                    parameters: parse_typed_list(params),
                                },
                            );
                        }
                    }
                }
            }
            Some(":action") => {
                let action = parse_action(body)?;
                domain.actions.insert(action.name.clone(), action);
            }
            _ => {}
        }
    }

    Ok(domain)
}

fn parse_action(body: &[SExpr]) -> Result<ActionSchema, SyntaxError> {
    let name = body
        .first()
        .and_then(SExpr::as_atom)
        .ok_or(SyntaxError::EmptyAction)?
        .to_string();

    let mut action = ActionSchema {
        name,
        parameters: Vec::new(),
        precondition: None,
        effect: None,
    };

    let mut i = 1;
    while i < body.len() {
        match body[i].as_atom() {
            Some(":parameters") => {
                if let Some(params) = body.get(i + 1).and_then(SExpr::as_list) {
                    action.parameters = parse_typed_list(params);
                }
                i += 2;
            }
            Some(":precondition") => {
                action.precondition = body.get(i + 1).cloned();
                i += 2;
            }
            Some(":effect") => {
                action.effect = body.get(i + 1).cloned();
                i += 2;
            }
            _ => i += 1,
        }
    }

    Ok(action)
}
