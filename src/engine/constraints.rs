//! Parametric constraint validation
//!
//! Out-of-range instance parameters are clamped into their envelope, never
//! rejected; every adjustment emits a `ConstraintClamped` warning and the
//! pass proceeds.

use crate::model::{Assembly, AxisDimension, CabinetParameters, Constraint};

use super::error::Warning;

/// Clamp a value into a constraint, snapping to the step grid when one is set.
///
/// The snap is measured from `min`, then the result is re-clamped so a snap
/// past `max` cannot escape the envelope.
pub fn validate(name: &str, value: f64, constraint: &Constraint) -> (f64, Option<Warning>) {
    let mut adjusted = value.clamp(constraint.min, constraint.max);

    if let Some(step) = constraint.step {
        if step > 0.0 {
            let steps = ((adjusted - constraint.min) / step).round();
            adjusted = (constraint.min + steps * step).clamp(constraint.min, constraint.max);
        }
    }

    if adjusted != value {
        let warning = Warning::ConstraintClamped {
            name: name.to_string(),
            original: value,
            clamped: adjusted,
        };
        (adjusted, Some(warning))
    } else {
        (value, None)
    }
}

fn axis_constraint(dimension: &AxisDimension) -> Constraint {
    Constraint::new(dimension.min, dimension.max)
}

/// Clamped instance parameters ready for binding
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedParameters {
    pub parameters: CabinetParameters,
    pub warnings: Vec<Warning>,
}

/// Validate all instance parameters against the template.
///
/// The three cabinet axes validate against the assembly dimension envelope;
/// custom parameters against the named constraint map. Parameters with no
/// constraint pass through untouched.
pub fn validate_parameters(
    parameters: &CabinetParameters,
    assembly: &Assembly,
) -> ValidatedParameters {
    let mut warnings = Vec::new();
    let mut clamped = parameters.clone();

    let axes = [
        ("width", &mut clamped.width, &assembly.dimensions.width),
        ("height", &mut clamped.height, &assembly.dimensions.height),
        ("depth", &mut clamped.depth, &assembly.dimensions.depth),
    ];
    for (name, value, dimension) in axes {
        let constraint = assembly
            .constraints
            .get(name)
            .copied()
            .unwrap_or_else(|| axis_constraint(dimension));
        let (adjusted, warning) = validate(name, *value, &constraint);
        *value = adjusted;
        warnings.extend(warning);
    }

    for (name, value) in clamped.custom.iter_mut() {
        if let Some(constraint) = assembly.constraints.get(name) {
            let (adjusted, warning) = validate(name, *value, constraint);
            *value = adjusted;
            warnings.extend(warning);
        }
    }

    ValidatedParameters {
        parameters: clamped,
        warnings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_below_min() {
        let constraint = Constraint::new(300.0, 1200.0);
        let (value, warning) = validate("width", 50.0, &constraint);
        assert_eq!(value, 300.0);
        assert_eq!(
            warning,
            Some(Warning::ConstraintClamped {
                name: "width".to_string(),
                original: 50.0,
                clamped: 300.0,
            })
        );
    }

    #[test]
    fn test_clamp_above_max() {
        let constraint = Constraint::new(300.0, 1200.0);
        let (value, warning) = validate("width", 1500.0, &constraint);
        assert_eq!(value, 1200.0);
        assert!(warning.is_some());
    }

    #[test]
    fn test_in_range_passes_untouched() {
        let constraint = Constraint::new(300.0, 1200.0);
        let (value, warning) = validate("width", 600.0, &constraint);
        assert_eq!(value, 600.0);
        assert_eq!(warning, None);
    }

    #[test]
    fn test_step_snaps_from_min() {
        // Grid: 300, 350, 400, ... 410 snaps down to 400
        let constraint = Constraint::new(300.0, 1200.0).with_step(50.0);
        let (value, warning) = validate("width", 410.0, &constraint);
        assert_eq!(value, 400.0);
        assert!(warning.is_some());
    }

    #[test]
    fn test_step_snap_cannot_escape_max() {
        // Grid from 300 by 70: nearest to 440 is 440-ish -> 300+2*70=440 exact
        let constraint = Constraint::new(300.0, 430.0).with_step(70.0);
        let (value, _) = validate("width", 429.0, &constraint);
        assert!(value <= 430.0);
        assert_eq!(value, 430.0);
    }

    #[test]
    fn test_on_grid_value_passes() {
        let constraint = Constraint::new(300.0, 1200.0).with_step(50.0);
        let (value, warning) = validate("width", 450.0, &constraint);
        assert_eq!(value, 450.0);
        assert_eq!(warning, None);
    }
}
