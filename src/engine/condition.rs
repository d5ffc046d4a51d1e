//! Part inclusion decisions
//!
//! An absent condition is unconditional inclusion and is never parsed or
//! evaluated, so malformed text in an unused condition slot cannot fail a
//! pass.

use crate::expr::{self, Bindings, ExprError};

/// Decide whether a part is included, given its optional condition formula
pub fn included(condition: Option<&str>, bindings: &Bindings) -> Result<bool, ExprError> {
    match condition {
        None => Ok(true),
        Some(text) => expr::eval_condition_str(text, bindings),
    }
}
