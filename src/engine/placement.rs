//! Anchor-based placement resolver
//!
//! Resolves a part's position inside its parent's bounding box, one axis at a
//! time. Rotation values pass through when already numeric and are evaluated
//! as formulas under the parametric schema.

use crate::expr::{self, Bindings, ExprError};
use crate::model::{Anchor, AnchoredOffset, Placement, Rotation, RotationValue};

/// Span of a parent bounding box along one axis
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisSpan {
    pub min: f64,
    pub max: f64,
}

impl AxisSpan {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn extent(&self) -> f64 {
        self.max - self.min
    }
}

/// Parent bounding box: x spans the cabinet width, y its depth, z its height
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParentBounds {
    pub x: AxisSpan,
    pub y: AxisSpan,
    pub z: AxisSpan,
}

impl ParentBounds {
    /// Bounds of a cabinet with its origin at (0, 0, 0)
    pub fn of_cabinet(width: f64, depth: f64, height: f64) -> Self {
        Self {
            x: AxisSpan::new(0.0, width),
            y: AxisSpan::new(0.0, depth),
            z: AxisSpan::new(0.0, height),
        }
    }
}

/// Resolve one axis of an anchored placement
pub fn resolve_axis(anchored: AnchoredOffset, span: AxisSpan, extent: f64) -> f64 {
    match anchored.anchor {
        Anchor::Start => span.min + anchored.offset,
        Anchor::Center => span.min + (span.extent() - extent) / 2.0 + anchored.offset,
        Anchor::End => span.max - extent - anchored.offset,
    }
}

/// Resolve a legacy placement to a concrete position.
///
/// The part's length extends along x and its width along y; panels carry no
/// extent along z.
pub fn resolve(placement: &Placement, extent: (f64, f64), bounds: &ParentBounds) -> (f64, f64, f64) {
    let (length, width) = extent;
    (
        resolve_axis(placement.x, bounds.x, length),
        resolve_axis(placement.y, bounds.y, width),
        resolve_axis(placement.z, bounds.z, 0.0),
    )
}

/// Resolve a rotation to concrete per-axis degrees
pub fn resolve_rotation(rotation: &Rotation, bindings: &Bindings) -> Result<[f64; 3], RotationError> {
    let mut out = [0.0; 3];
    for (slot, value) in out
        .iter_mut()
        .zip([&rotation.x, &rotation.y, &rotation.z])
    {
        *slot = match value {
            RotationValue::Fixed(v) => *v,
            RotationValue::Formula(text) => expr::eval_number_str(text, bindings)
                .map_err(|source| RotationError {
                    expr: text.clone(),
                    source,
                })?,
        };
    }
    Ok(out)
}

/// A rotation formula failed to resolve
#[derive(Debug, thiserror::Error)]
#[error("cannot resolve rotation formula '{expr}': {source}")]
pub struct RotationError {
    pub expr: String,
    #[source]
    pub source: ExprError,
}
