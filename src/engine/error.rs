//! Error and warning taxonomy of the instantiation engine
//!
//! Every `*Error` aborts the current pass and names the offending part and
//! raw expression text. Warnings never abort; they are collected and
//! returned alongside a successful result.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::expr::{EvalError, ParseError};
use crate::model::PartId;

use super::order::CycleError;
use super::size::MissingDimensionError;

/// Which override collection a conflict or unknown target belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverrideKind {
    Part,
    Hardware,
}

impl std::fmt::Display for OverrideKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OverrideKind::Part => write!(f, "part"),
            OverrideKind::Hardware => write!(f, "hardware"),
        }
    }
}

/// More than one override targets the same template record
#[derive(Debug, Clone, PartialEq, Error)]
#[error("duplicate {kind} override for '{id}'")]
pub struct ConflictError {
    pub kind: OverrideKind,
    pub id: String,
}

/// A non-fatal finding collected during a pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Warning {
    /// An instance parameter was clamped or snapped into its constraint
    ConstraintClamped {
        name: String,
        original: f64,
        clamped: f64,
    },
    /// An override references a template part or hardware id that does not
    /// exist; the override is skipped
    UnknownOverrideTarget {
        #[serde(rename = "override_kind")]
        kind: OverrideKind,
        id: String,
    },
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Warning::ConstraintClamped {
                name,
                original,
                clamped,
            } => write!(
                f,
                "parameter '{}' clamped from {} to {}",
                name, original, clamped
            ),
            Warning::UnknownOverrideTarget { kind, id } => {
                write!(f, "{} override targets unknown id '{}'", kind, id)
            }
        }
    }
}

/// A fatal failure of one instantiation pass
#[derive(Debug, Error)]
pub enum InstantiateError {
    /// A formula failed to parse
    #[error("part '{part}': invalid formula '{expr}': {source}")]
    Parse {
        part: String,
        expr: String,
        #[source]
        source: ParseError,
    },

    /// A formula parsed but could not be evaluated
    #[error("part '{part}': cannot evaluate '{expr}': {source}")]
    Eval {
        part: String,
        expr: String,
        #[source]
        source: EvalError,
    },

    /// The provides graph contains a cycle
    #[error(transparent)]
    Cycle(#[from] CycleError),

    /// A legacy dynamic size references a parent axis that is not bound
    #[error("part '{part}': {source}")]
    MissingDimension {
        part: String,
        #[source]
        source: MissingDimensionError,
    },

    /// A formula references a provides output whose every provider was
    /// excluded by its condition
    #[error(
        "part '{part}': formula '{expr}' references '{name}' provided by excluded part '{provider}'"
    )]
    MissingBinding {
        part: String,
        expr: String,
        name: String,
        provider: PartId,
    },

    /// Duplicate override for one target
    #[error(transparent)]
    Conflict(#[from] ConflictError),

    /// An override references an unknown target and strict mode is on
    #[error("{kind} override targets unknown id '{id}'")]
    UnknownOverrideTarget { kind: OverrideKind, id: String },
}
