//! Tokenizer and S-expression reader for PDDL text

use crate::error::SyntaxError;

/// A node of the generic S-expression tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SExpr {
    Atom(String),
    List(Vec<SExpr>),
}

impl SExpr {
    pub fn as_atom(&self) -> Option<&str> {
        match self {
            SExpr::Atom(s) => Some(s),
            SExpr::List(_) => None,
        }
    }

    pub fn as_list(&self) -> Option<&[SExpr]> {
        match self {
            SExpr::List(items) => Some(items),
            SExpr::Atom(_) => None,
        }
    }

    /// The leading atom of a non-empty list, e.g. `and` in `(and ...)`
    pub fn head(&self) -> Option<&str> {
        self.as_list()?.first()?.as_atom()
    }

    /// Whether this is the atom `s`
    pub fn is_atom(&self, s: &str) -> bool {
        self.as_atom() == Some(s)
    }
}

/// Split PDDL text into tokens.
///
/// `;` starts a comment that runs to the end of the line. Parentheses are
/// always their own token, everything else splits on whitespace.
pub fn tokenize(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();

    for line in text.lines() {
        let line = match line.find(';') {
            Some(pos) => &line[..pos],
            None => line,
        };

        let mut current = String::new();
        for c in line.chars() {
            match c {
                '(' | ')' => {
                    if !current.is_empty() {
                        tokens.push(std::mem::take(&mut current));
                    }
                    tokens.push(c.to_string());
                }
                c if c.is_whitespace() => {
                    if !current.is_empty() {
                        tokens.push(std::mem::take(&mut current));
                    }
                }
                c => current.push(c),
            }
        }
        if !current.is_empty() {
            tokens.push(current);
        }
    }

    tokens
}

/// Parse a token stream into the top-level S-expressions it contains
pub fn parse_sexprs(tokens: &[String]) -> Result<Vec<SExpr>, SyntaxError> {
    let mut result = Vec::new();
    let mut pos = 0;

    while pos < tokens.len() {
        let (expr, next) = parse_expr(tokens, pos)?;
        result.push(expr);
        pos = next;
    }

    Ok(result)
}

/// Tokenize and parse in one step
pub fn read(text: &str) -> Result<Vec<SExpr>, SyntaxError> {
    parse_sexprs(&tokenize(text))
}

fn parse_expr(tokens: &[String], start: usize) -> Result<(SExpr, usize), SyntaxError> {
    match tokens[start].as_str() {
        "(" => {
            let mut items = Vec::new();
            let mut pos = start + 1;

            loop {
                match tokens.get(pos).map(String::as_str) {
                    None => return Err(SyntaxError::Unterminated { position: start }),
                    Some(")") => return Ok((SExpr::List(items), pos + 1)),
                    Some(_) => {
                        let (item, next) = parse_expr(tokens, pos)?;
                        items.push(item);
                        pos = next;
                    }
                }
            }
        }
        ")" => Err(SyntaxError::UnexpectedClose { position: start }),
        atom => Ok((SExpr::Atom(atom.to_string()), start + 1)),
    }
}
