//! Cutout contour resolver
//!
//! Evaluates every coordinate expression of a part's shape segments to
//! produce a closed contour in part-local coordinates. Tessellation and
//! rendering are external collaborators' concerns; this module only
//! resolves numbers.

use crate::expr::{self, Bindings, ExprError};
use crate::model::{ResolvedSegment, ShapeSegment};

/// A shape coordinate failed to resolve
#[derive(Debug, thiserror::Error)]
#[error("cannot resolve shape coordinate '{expr}': {source}")]
pub struct ShapeError {
    pub expr: String,
    #[source]
    pub source: ExprError,
}

fn coord(text: &str, bindings: &Bindings) -> Result<f64, ShapeError> {
    expr::eval_number_str(text, bindings).map_err(|source| ShapeError {
        expr: text.to_string(),
        source,
    })
}

/// Resolve a contour's segments against the current bindings.
///
/// `large_arc` and `clockwise` are booleans, not formulas, and pass through
/// unchanged.
pub fn resolve(
    segments: &[ShapeSegment],
    bindings: &Bindings,
) -> Result<Vec<ResolvedSegment>, ShapeError> {
    segments
        .iter()
        .map(|segment| match segment {
            ShapeSegment::Line { x, y } => Ok(ResolvedSegment::Line {
                x: coord(x, bindings)?,
                y: coord(y, bindings)?,
            }),
            ShapeSegment::Arc {
                x,
                y,
                radius,
                large_arc,
                clockwise,
            } => Ok(ResolvedSegment::Arc {
                x: coord(x, bindings)?,
                y: coord(y, bindings)?,
                radius: coord(radius, bindings)?,
                large_arc: *large_arc,
                clockwise: *clockwise,
            }),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bindings() -> Bindings {
        let mut b = Bindings::new();
        b.set("length", 564.0);
        b.set("width", 500.0);
        b
    }

    #[test]
    fn test_line_segments_resolve_coordinates() {
        let segments = vec![
            ShapeSegment::Line {
                x: "0".to_string(),
                y: "0".to_string(),
            },
            ShapeSegment::Line {
                x: "length".to_string(),
                y: "width / 2".to_string(),
            },
        ];
        let resolved = resolve(&segments, &bindings()).unwrap();
        assert_eq!(
            resolved,
            vec![
                ResolvedSegment::Line { x: 0.0, y: 0.0 },
                ResolvedSegment::Line { x: 564.0, y: 250.0 },
            ]
        );
    }

    #[test]
    fn test_arc_flags_pass_through() {
        let segments = vec![ShapeSegment::Arc {
            x: "length".to_string(),
            y: "0".to_string(),
            radius: "25".to_string(),
            large_arc: true,
            clockwise: false,
        }];
        let resolved = resolve(&segments, &bindings()).unwrap();
        assert_eq!(
            resolved,
            vec![ResolvedSegment::Arc {
                x: 564.0,
                y: 0.0,
                radius: 25.0,
                large_arc: true,
                clockwise: false,
            }]
        );
    }

    #[test]
    fn test_unresolved_coordinate_fails_with_text() {
        let segments = vec![ShapeSegment::Line {
            x: "notch_depth".to_string(),
            y: "0".to_string(),
        }];
        let err = resolve(&segments, &Bindings::new()).unwrap_err();
        assert_eq!(err.expr, "notch_depth");
    }
}
