//! Instantiation engine: turns an assembly template plus instance parameters
//! and overrides into a concrete, fully-resolved set of cabinet parts.
//!
//! A pass is a pure, synchronous computation over in-memory data. It owns its
//! own binding environment, performs no I/O, and is deterministic: the same
//! `(template, parameters, overrides)` triple always produces the same
//! output, including part order.

pub mod condition;
pub mod constraints;
pub mod error;
pub mod order;
pub mod overrides;
pub mod placement;
pub mod shape;
pub mod size;

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, trace};

use crate::expr::{self, Bindings, EvalError, ExprError};
use crate::model::{
    Assembly, AssemblyPart, CabinetParameters, CabinetPart, HardwareAssignment, InstanceOverrides,
    Instantiation, PartGeometry, PartId, Quantity,
};

pub use error::{ConflictError, InstantiateError, OverrideKind, Warning};
pub use order::CycleError;
pub use placement::ParentBounds;
pub use size::MissingDimensionError;

/// Configuration for an instantiation pass
#[derive(Debug, Clone, Default)]
pub struct InstantiateConfig {
    /// Treat an override with an unknown target id as a hard error instead
    /// of a collected warning
    pub strict_overrides: bool,
}

impl InstantiateConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_strict_overrides(mut self, strict: bool) -> Self {
        self.strict_overrides = strict;
        self
    }
}

/// Instantiate an assembly with default configuration
pub fn instantiate(
    assembly: &Assembly,
    parameters: &CabinetParameters,
    overrides: &InstanceOverrides,
) -> Result<Instantiation, InstantiateError> {
    instantiate_with_config(assembly, parameters, overrides, &InstantiateConfig::default())
}

/// Instantiate an assembly with custom configuration.
///
/// Runs the full pass: `ValidateParams → ResolveOrder → EvaluateParts →
/// ApplyOverrides → Done`. Any error during part evaluation aborts the whole
/// pass; warnings accumulate and come back with the result.
pub fn instantiate_with_config(
    assembly: &Assembly,
    parameters: &CabinetParameters,
    overrides: &InstanceOverrides,
    config: &InstantiateConfig,
) -> Result<Instantiation, InstantiateError> {
    debug!(assembly = %assembly.id, "validating instance parameters");
    let validated = constraints::validate_parameters(parameters, assembly);

    debug!(assembly = %assembly.id, "resolving part evaluation order");
    let evaluation_order = order::resolve(&assembly.parts)?;

    let mut pass = Pass::new(assembly, config, &validated.parameters, evaluation_order);
    pass.warnings = validated.warnings;

    debug!(assembly = %assembly.id, parts = assembly.parts.len(), "evaluating parts");
    let mut parts = pass.evaluate_parts()?;

    debug!(assembly = %assembly.id, "applying instance overrides");
    pass.apply_part_overrides(&mut parts, &overrides.parts)?;
    let hardware = pass.resolve_hardware(&overrides.hardware)?;

    debug!(
        assembly = %assembly.id,
        parts = parts.len(),
        hardware = hardware.len(),
        warnings = pass.warnings.len(),
        "instantiation complete"
    );
    Ok(Instantiation {
        parts,
        hardware,
        warnings: pass.warnings,
    })
}

/// State threaded through one instantiation pass
struct Pass<'a> {
    assembly: &'a Assembly,
    config: &'a InstantiateConfig,
    bindings: Bindings,
    bounds: ParentBounds,
    sequence: Vec<usize>,
    providers: BTreeMap<String, Vec<usize>>,
    excluded: BTreeSet<usize>,
    warnings: Vec<Warning>,
}

impl<'a> Pass<'a> {
    fn new(
        assembly: &'a Assembly,
        config: &'a InstantiateConfig,
        parameters: &CabinetParameters,
        evaluation_order: order::EvaluationOrder,
    ) -> Self {
        let mut bindings = Bindings::new();
        bindings.set("width", parameters.width);
        bindings.set("height", parameters.height);
        bindings.set("depth", parameters.depth);
        bindings.set("parent_width", parameters.width);
        bindings.set("parent_height", parameters.height);
        bindings.set("parent_depth", parameters.depth);
        bindings.set("panel_thickness", assembly.construction.panel_thickness);
        bindings.set("back_thickness", assembly.construction.back_thickness);
        bindings.set("facade_thickness", assembly.construction.facade_thickness);
        for (name, value) in &parameters.custom {
            bindings.set(name.clone(), *value);
        }

        Self {
            assembly,
            config,
            bindings,
            bounds: ParentBounds::of_cabinet(parameters.width, parameters.depth, parameters.height),
            sequence: evaluation_order.sequence,
            providers: evaluation_order.providers,
            excluded: BTreeSet::new(),
            warnings: Vec::new(),
        }
    }

    /// Map an expression failure to the pass-level taxonomy.
    ///
    /// An unresolved identifier that names a provides output whose every
    /// provider was condition-excluded is a missing binding, not a plain
    /// evaluation error.
    fn classify(&self, part: &str, expr_text: &str, err: ExprError) -> InstantiateError {
        match err {
            ExprError::Parse(source) => InstantiateError::Parse {
                part: part.to_string(),
                expr: expr_text.to_string(),
                source,
            },
            ExprError::Eval(source) => {
                if let EvalError::Unresolved(name) = &source {
                    if let Some(sources) = self.providers.get(name) {
                        if !sources.is_empty()
                            && sources.iter().all(|idx| self.excluded.contains(idx))
                        {
                            let provider = self.assembly.parts[sources[0]].id.clone();
                            return InstantiateError::MissingBinding {
                                part: part.to_string(),
                                expr: expr_text.to_string(),
                                name: name.clone(),
                                provider,
                            };
                        }
                    }
                }
                InstantiateError::Eval {
                    part: part.to_string(),
                    expr: expr_text.to_string(),
                    source,
                }
            }
        }
    }

    fn eval_number(&self, part: &PartId, text: &str) -> Result<f64, InstantiateError> {
        expr::eval_number_str(text, &self.bindings)
            .map_err(|e| self.classify(part.as_str(), text, e))
    }

    fn resolve_quantity(&self, context: &str, quantity: &Quantity) -> Result<u32, InstantiateError> {
        match quantity {
            Quantity::Count(n) => Ok(*n),
            Quantity::Formula(text) => {
                let value = expr::eval_number_str(text, &self.bindings)
                    .map_err(|e| self.classify(context, text, e))?;
                Ok(value.round().max(0.0) as u32)
            }
        }
    }

    /// Step 3: evaluate every part in dependency order, publishing provides
    /// outputs of included parts as they resolve
    fn evaluate_parts(&mut self) -> Result<Vec<CabinetPart>, InstantiateError> {
        let mut resolved = Vec::with_capacity(self.sequence.len());

        for position in 0..self.sequence.len() {
            let idx = self.sequence[position];
            let part = &self.assembly.parts[idx];

            let included = condition::included(part.condition.as_deref(), &self.bindings)
                .map_err(|e| {
                    let text = part.condition.as_deref().unwrap_or_default();
                    self.classify(part.id.as_str(), text, e)
                })?;
            if !included {
                trace!(part = %part.id, "excluded by condition");
                self.excluded.insert(idx);
                continue;
            }

            let cabinet_part = self.evaluate_part(part)?;
            trace!(
                part = %part.id,
                length = cabinet_part.length,
                width = cabinet_part.width,
                "part resolved"
            );
            self.publish_provides(part, &cabinet_part)?;
            resolved.push(cabinet_part);
        }

        Ok(resolved)
    }

    fn evaluate_part(&self, part: &AssemblyPart) -> Result<CabinetPart, InstantiateError> {
        let (length, width, x, y, z) = match &part.geometry {
            PartGeometry::Parametric {
                length,
                width,
                x,
                y,
                z,
            } => (
                self.eval_number(&part.id, length)?,
                self.eval_number(&part.id, width)?,
                self.eval_number(&part.id, x)?,
                self.eval_number(&part.id, y)?,
                self.eval_number(&part.id, z)?,
            ),
            PartGeometry::Legacy {
                length,
                width,
                placement,
            } => {
                let resolved_length = self.resolve_size(&part.id, length)?;
                let resolved_width = self.resolve_size(&part.id, width)?;
                let (x, y, z) = placement::resolve(
                    placement,
                    (resolved_length, resolved_width),
                    &self.bounds,
                );
                (resolved_length, resolved_width, x, y, z)
            }
        };

        let rotation = placement::resolve_rotation(&part.rotation, &self.bindings)
            .map_err(|e| self.classify(part.id.as_str(), &e.expr, e.source))?;

        let shape = part
            .shape
            .as_deref()
            .map(|segments| {
                shape::resolve(segments, &self.bindings)
                    .map_err(|e| self.classify(part.id.as_str(), &e.expr, e.source))
            })
            .transpose()?;

        let quantity = self.resolve_quantity(part.id.as_str(), &part.quantity)?;

        Ok(CabinetPart {
            source_part_id: Some(part.id.clone()),
            role: part.role,
            name: part.name.clone(),
            length,
            width,
            x,
            y,
            z,
            rotation,
            shape,
            quantity,
            enabled: true,
            material: part.material.clone(),
        })
    }

    fn resolve_size(
        &self,
        part: &PartId,
        dynamic: &crate::model::DynamicSize,
    ) -> Result<f64, InstantiateError> {
        size::resolve(dynamic, &self.bindings).map_err(|err| match err {
            size::SizeError::MissingDimension(source) => InstantiateError::MissingDimension {
                part: part.to_string(),
                source,
            },
            size::SizeError::Expr(e) => self.classify(part.as_str(), &size::lift(dynamic), e),
        })
    }

    /// Publish a part's provides outputs. Formulas run in a part-local scope
    /// that additionally exposes the part's own resolved values.
    fn publish_provides(
        &mut self,
        part: &AssemblyPart,
        resolved: &CabinetPart,
    ) -> Result<(), InstantiateError> {
        if part.provides.is_empty() {
            return Ok(());
        }

        let scope = self.bindings.scoped([
            ("length".to_string(), resolved.length),
            ("width".to_string(), resolved.width),
            ("x".to_string(), resolved.x),
            ("y".to_string(), resolved.y),
            ("z".to_string(), resolved.z),
            ("quantity".to_string(), f64::from(resolved.quantity)),
        ]);

        for (name, formula) in &part.provides {
            let value = expr::eval_number_str(formula, &scope)
                .map_err(|e| self.classify(part.id.as_str(), formula, e))?;
            trace!(part = %part.id, name = %name, value, "provides published");
            self.bindings.set(name.clone(), value);
        }
        Ok(())
    }

    /// Step 4a: merge part overrides onto resolved parts. Override formulas
    /// are evaluated against the final binding environment of the pass.
    fn apply_part_overrides(
        &mut self,
        parts: &mut [CabinetPart],
        part_overrides: &[crate::model::CabinetPartOverride],
    ) -> Result<(), InstantiateError> {
        let index = overrides::index_part_overrides(part_overrides)?;

        for o in part_overrides {
            if self.assembly.part(&o.source_part_id).is_none() {
                self.unknown_target(OverrideKind::Part, o.source_part_id.as_str())?;
            }
        }

        for part in parts.iter_mut() {
            let Some(source_id) = &part.source_part_id else {
                continue;
            };
            let Some(o) = index.get(source_id.as_str()) else {
                continue;
            };
            if let Some(enabled) = o.is_enabled {
                part.enabled = enabled;
            }
            if let Some(quantity) = &o.quantity {
                part.quantity = self.resolve_quantity(source_id.as_str(), quantity)?;
            }
            if let Some(material) = &o.material {
                part.material = Some(material.clone());
            }
        }
        Ok(())
    }

    /// Step 4b: merge hardware overrides and resolve effective assignments.
    /// Bindings are final at this point, so position and quantity formulas
    /// see every published provides output.
    fn resolve_hardware(
        &mut self,
        hardware_overrides: &[crate::model::CabinetHardwareOverride],
    ) -> Result<Vec<HardwareAssignment>, InstantiateError> {
        let index = overrides::index_hardware_overrides(hardware_overrides)?;

        for o in hardware_overrides {
            if self.assembly.hardware_binding(&o.module_hardware_id).is_none() {
                self.unknown_target(OverrideKind::Hardware, &o.module_hardware_id)?;
            }
        }

        let mut assignments = Vec::new();
        for binding in &self.assembly.hardware {
            let effective =
                overrides::effective_hardware(binding, index.get(binding.id.as_str()).copied());
            if !effective.is_enabled {
                trace!(hardware = %binding.id, "disabled by override");
                continue;
            }

            let quantity = self.resolve_quantity(&binding.id, &effective.quantity)?;
            let position = effective
                .position
                .as_deref()
                .map(|text| {
                    expr::eval_number_str(text, &self.bindings)
                        .map_err(|e| self.classify(&binding.id, text, e))
                })
                .transpose()?;

            assignments.push(HardwareAssignment {
                role: effective.role,
                hardware_id: effective.hardware_id,
                quantity,
                position,
                material: effective.material,
            });
        }
        Ok(assignments)
    }

    fn unknown_target(&mut self, kind: OverrideKind, id: &str) -> Result<(), InstantiateError> {
        if self.config.strict_overrides {
            return Err(InstantiateError::UnknownOverrideTarget {
                kind,
                id: id.to_string(),
            });
        }
        self.warnings.push(Warning::UnknownOverrideTarget {
            kind,
            id: id.to_string(),
        });
        Ok(())
    }
}
