//! Formula expression language: lexer, parser, and evaluator
//!
//! Every size, placement, condition, quantity, and provides value in a
//! template is an expression over named numeric variables. This module owns
//! the whole path from formula text to value.

pub mod ast;
pub mod error;
pub mod eval;
pub mod grammar;
pub mod lexer;

use std::collections::BTreeSet;

pub use ast::{BinaryOp, Builtin, Expr, UnaryOp};
pub use error::{EvalError, ParseError};
pub use eval::{evaluate, evaluate_condition, evaluate_number, Bindings, Value};
pub use grammar::parse;

/// Parse and evaluate formula text in numeric context
pub fn eval_number_str(text: &str, bindings: &Bindings) -> Result<f64, ExprError> {
    let expr = parse(text)?;
    Ok(evaluate_number(&expr, bindings)?)
}

/// Parse and evaluate formula text in boolean context
pub fn eval_condition_str(text: &str, bindings: &Bindings) -> Result<bool, ExprError> {
    let expr = parse(text)?;
    Ok(evaluate_condition(&expr, bindings)?)
}

/// Either failure mode of the text-to-value path
#[derive(Debug, Clone, thiserror::Error)]
pub enum ExprError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Eval(#[from] EvalError),
}

/// Collect the variable names a formula references, excluding builtin
/// function names. Used to build the inter-part dependency graph without
/// fully parsing every formula up front.
///
/// Unlexable text yields no names; the formula itself will fail with a
/// `ParseError` when evaluated.
pub fn referenced_variables(text: &str) -> BTreeSet<String> {
    let tokens = match lexer::lex(text) {
        Ok(tokens) => tokens,
        Err(_) => return BTreeSet::new(),
    };
    tokens
        .into_iter()
        .filter_map(|(tok, _)| match tok {
            lexer::Token::Ident(name) if !Builtin::is_builtin_name(&name) => Some(name),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_referenced_variables() {
        let vars = referenced_variables("min(width, shelf_top) - panel_thickness * 2");
        let expected: BTreeSet<String> = ["width", "shelf_top", "panel_thickness"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(vars, expected);
    }

    #[test]
    fn test_referenced_variables_excludes_builtins_and_literals() {
        let vars = referenced_variables("round(10 / 3) + abs(x)");
        assert_eq!(vars.len(), 1);
        assert!(vars.contains("x"));
    }

    #[test]
    fn test_eval_str_helpers() {
        let mut b = Bindings::new();
        b.set("width", 600.0);
        assert_eq!(eval_number_str("width / 2", &b).unwrap(), 300.0);
        assert!(eval_condition_str("width > 500", &b).unwrap());
        assert!(matches!(
            eval_number_str("width +", &b),
            Err(ExprError::Parse(_))
        ));
    }
}
