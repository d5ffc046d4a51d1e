//! Dynamic size resolver for the legacy value-object schema
//!
//! Legacy sizes are lifted into constant formula strings and run through the
//! one expression evaluator, so the two geometry schemas never need parallel
//! evaluation paths.

use thiserror::Error;

use crate::expr::{self, Bindings, ExprError};
use crate::model::{DynamicSize, SizeSource};

/// A parent-relative size references an axis that is not bound
#[derive(Debug, Clone, PartialEq, Error)]
#[error("missing parent dimension '{axis}'")]
pub struct MissingDimensionError {
    pub axis: &'static str,
}

/// Failure modes of dynamic size resolution
#[derive(Debug, Error)]
pub enum SizeError {
    #[error(transparent)]
    MissingDimension(#[from] MissingDimensionError),
    #[error(transparent)]
    Expr(#[from] ExprError),
}

/// Binding name a parent-relative source reads from
fn axis_binding(source: SizeSource) -> Option<&'static str> {
    match source {
        SizeSource::ParentWidth => Some("parent_width"),
        SizeSource::ParentDepth => Some("parent_depth"),
        SizeSource::ParentHeight => Some("parent_height"),
        SizeSource::Fixed => None,
    }
}

/// Lift a dynamic size into equivalent formula text
pub fn lift(size: &DynamicSize) -> String {
    match axis_binding(size.source) {
        Some(axis) => format!("{} + {}", axis, size.offset),
        None => format!("{} + {}", size.fixed_value.unwrap_or(0.0), size.offset),
    }
}

/// Resolve a dynamic size against the current bindings
pub fn resolve(size: &DynamicSize, bindings: &Bindings) -> Result<f64, SizeError> {
    if let Some(axis) = axis_binding(size.source) {
        if !bindings.contains(axis) {
            return Err(MissingDimensionError { axis }.into());
        }
    }
    Ok(expr::eval_number_str(&lift(size), bindings)?)
}
