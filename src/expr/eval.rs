//! Tree-walking evaluator for formula expressions
//!
//! Evaluation is typed: arithmetic and comparisons operate on numbers,
//! `&& || !` on booleans. `&&` and `||` short-circuit, so the right operand
//! of a decided logical expression is never evaluated and cannot fail.

use std::collections::BTreeMap;

use super::ast::{BinaryOp, Builtin, Expr, UnaryOp};
use super::error::EvalError;

/// A named variable environment for formula evaluation.
///
/// Backed by a `BTreeMap` so iteration order (and therefore anything derived
/// from it) is deterministic.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bindings {
    values: BTreeMap<String, f64>,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a variable, replacing any previous value
    pub fn set(&mut self, name: impl Into<String>, value: f64) {
        self.values.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// A copy of this environment extended with additional bindings.
    /// Used for part-local scopes that must not leak into the pass.
    pub fn scoped<I>(&self, extra: I) -> Self
    where
        I: IntoIterator<Item = (String, f64)>,
    {
        let mut values = self.values.clone();
        values.extend(extra);
        Self { values }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

impl FromIterator<(String, f64)> for Bindings {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

/// A value produced by evaluating an expression
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    Number(f64),
    Bool(bool),
}

impl Value {
    fn kind(&self) -> &'static str {
        match self {
            Value::Number(_) => "number",
            Value::Bool(_) => "boolean",
        }
    }

    fn as_number(&self) -> Result<f64, EvalError> {
        match self {
            Value::Number(n) => Ok(*n),
            Value::Bool(_) => Err(EvalError::TypeMismatch {
                expected: "number",
                actual: self.kind(),
            }),
        }
    }

    fn as_bool(&self) -> Result<bool, EvalError> {
        match self {
            Value::Bool(b) => Ok(*b),
            Value::Number(_) => Err(EvalError::TypeMismatch {
                expected: "boolean",
                actual: self.kind(),
            }),
        }
    }
}

/// Evaluate an expression in numeric context
pub fn evaluate_number(expr: &Expr, bindings: &Bindings) -> Result<f64, EvalError> {
    evaluate(expr, bindings)?.as_number()
}

/// Evaluate an expression in boolean context
pub fn evaluate_condition(expr: &Expr, bindings: &Bindings) -> Result<bool, EvalError> {
    evaluate(expr, bindings)?.as_bool()
}

/// Evaluate an expression to a typed value
pub fn evaluate(expr: &Expr, bindings: &Bindings) -> Result<Value, EvalError> {
    match expr {
        Expr::Number(n) => Ok(Value::Number(*n)),
        Expr::Bool(b) => Ok(Value::Bool(*b)),
        Expr::Variable(name) => bindings
            .get(name)
            .map(Value::Number)
            .ok_or_else(|| EvalError::Unresolved(name.clone())),
        Expr::Unary { op, operand } => match op {
            UnaryOp::Neg => Ok(Value::Number(-evaluate(operand, bindings)?.as_number()?)),
            UnaryOp::Not => Ok(Value::Bool(!evaluate(operand, bindings)?.as_bool()?)),
        },
        Expr::Binary { op, lhs, rhs } => evaluate_binary(*op, lhs, rhs, bindings),
        Expr::Call { function, args } => evaluate_call(*function, args, bindings),
    }
}

fn evaluate_binary(
    op: BinaryOp,
    lhs: &Expr,
    rhs: &Expr,
    bindings: &Bindings,
) -> Result<Value, EvalError> {
    // Short-circuit paths must not touch the right operand
    match op {
        BinaryOp::And => {
            if !evaluate(lhs, bindings)?.as_bool()? {
                return Ok(Value::Bool(false));
            }
            return Ok(Value::Bool(evaluate(rhs, bindings)?.as_bool()?));
        }
        BinaryOp::Or => {
            if evaluate(lhs, bindings)?.as_bool()? {
                return Ok(Value::Bool(true));
            }
            return Ok(Value::Bool(evaluate(rhs, bindings)?.as_bool()?));
        }
        _ => {}
    }

    let l = evaluate(lhs, bindings)?.as_number()?;
    let r = evaluate(rhs, bindings)?.as_number()?;

    match op {
        BinaryOp::Add => Ok(Value::Number(l + r)),
        BinaryOp::Sub => Ok(Value::Number(l - r)),
        BinaryOp::Mul => Ok(Value::Number(l * r)),
        BinaryOp::Div => {
            if r == 0.0 {
                Err(EvalError::DivisionByZero)
            } else {
                Ok(Value::Number(l / r))
            }
        }
        BinaryOp::Less => Ok(Value::Bool(l < r)),
        BinaryOp::LessEqual => Ok(Value::Bool(l <= r)),
        BinaryOp::Greater => Ok(Value::Bool(l > r)),
        BinaryOp::GreaterEqual => Ok(Value::Bool(l >= r)),
        BinaryOp::Equal => Ok(Value::Bool(l == r)),
        BinaryOp::NotEqual => Ok(Value::Bool(l != r)),
        BinaryOp::And | BinaryOp::Or => unreachable!("handled above"),
    }
}

fn evaluate_call(
    function: Builtin,
    args: &[Expr],
    bindings: &Bindings,
) -> Result<Value, EvalError> {
    match function {
        Builtin::Min | Builtin::Max => {
            if args.len() < 2 {
                return Err(EvalError::Arity {
                    function: function.name(),
                    expected: "at least 2",
                    actual: args.len(),
                });
            }
            let mut acc = evaluate(&args[0], bindings)?.as_number()?;
            for arg in &args[1..] {
                let v = evaluate(arg, bindings)?.as_number()?;
                acc = match function {
                    Builtin::Min => acc.min(v),
                    _ => acc.max(v),
                };
            }
            Ok(Value::Number(acc))
        }
        Builtin::Abs | Builtin::Round => {
            if args.len() != 1 {
                return Err(EvalError::Arity {
                    function: function.name(),
                    expected: "exactly 1",
                    actual: args.len(),
                });
            }
            let v = evaluate(&args[0], bindings)?.as_number()?;
            Ok(Value::Number(match function {
                Builtin::Abs => v.abs(),
                _ => v.round(),
            }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::grammar::parse;
    use super::*;

    fn bindings(pairs: &[(&str, f64)]) -> Bindings {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), *v))
            .collect()
    }

    fn num(expr: &str, b: &Bindings) -> Result<f64, EvalError> {
        evaluate_number(&parse(expr).unwrap(), b)
    }

    fn cond(expr: &str, b: &Bindings) -> Result<bool, EvalError> {
        evaluate_condition(&parse(expr).unwrap(), b)
    }

    #[test]
    fn test_arithmetic() {
        let b = bindings(&[("width", 600.0)]);
        assert_eq!(num("width - 2 * 18", &b).unwrap(), 564.0);
        assert_eq!(num("-width / 2", &b).unwrap(), -300.0);
    }

    #[test]
    fn test_builtins() {
        let b = bindings(&[("width", 600.0)]);
        assert_eq!(num("min(width, 450)", &b).unwrap(), 450.0);
        assert_eq!(num("max(width, 450, 900)", &b).unwrap(), 900.0);
        assert_eq!(num("abs(450 - width)", &b).unwrap(), 150.0);
        assert_eq!(num("round(width / 7)", &b).unwrap(), 86.0);
    }

    #[test]
    fn test_builtin_arity_errors() {
        let b = Bindings::new();
        assert!(matches!(num("min(1)", &b), Err(EvalError::Arity { .. })));
        assert!(matches!(num("abs(1, 2)", &b), Err(EvalError::Arity { .. })));
    }

    #[test]
    fn test_unresolved_identifier() {
        let b = Bindings::new();
        assert_eq!(
            num("depth + 1", &b),
            Err(EvalError::Unresolved("depth".to_string()))
        );
    }

    #[test]
    fn test_division_by_zero() {
        let b = bindings(&[("n", 0.0)]);
        assert_eq!(num("10 / n", &b), Err(EvalError::DivisionByZero));
    }

    #[test]
    fn test_comparisons_and_logic() {
        let b = bindings(&[("width", 600.0), ("has_doors", 1.0)]);
        assert!(cond("width >= 600", &b).unwrap());
        assert!(cond("width > 300 && has_doors == 1", &b).unwrap());
        assert!(cond("width < 300 || has_doors != 0", &b).unwrap());
        assert!(!cond("!(width == 600)", &b).unwrap());
    }

    #[test]
    fn test_short_circuit_skips_rhs() {
        // The unresolved identifier on the right is never evaluated
        let b = bindings(&[("width", 200.0)]);
        assert!(!cond("width > 300 && missing > 0", &b).unwrap());
        assert!(cond("width < 300 || missing > 0", &b).unwrap());
    }

    #[test]
    fn test_context_type_mismatch() {
        let b = bindings(&[("width", 600.0)]);
        assert!(matches!(
            num("width > 300", &b),
            Err(EvalError::TypeMismatch { .. })
        ));
        assert!(matches!(
            cond("width + 1", &b),
            Err(EvalError::TypeMismatch { .. })
        ));
        assert!(matches!(
            num("1 + (2 > 1)", &b),
            Err(EvalError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_scoped_bindings_do_not_leak() {
        let base = bindings(&[("width", 600.0)]);
        let scoped = base.scoped([("length".to_string(), 564.0)]);
        assert_eq!(scoped.get("length"), Some(564.0));
        assert_eq!(base.get("length"), None);
    }
}
