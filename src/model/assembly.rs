//! Template-side data model: assemblies and their templated parts
//!
//! An `Assembly` is a reusable furniture-module template authored by catalog
//! admins. It is read-mostly and treated as immutable for the duration of any
//! single instantiation pass.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Identifier of a templated part within an assembly
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PartId(pub String);

impl PartId {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PartId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Structural role of a part within a cabinet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartRole {
    Left,
    Right,
    Top,
    Bottom,
    Back,
    Shelf,
    Divider,
    Facade,
    Hinge,
    Handle,
    Leg,
    DrawerSlide,
}

/// Default envelope for one cabinet axis
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisDimension {
    pub default: f64,
    pub min: f64,
    pub max: f64,
}

impl AxisDimension {
    pub fn new(default: f64, min: f64, max: f64) -> Self {
        Self { default, min, max }
    }
}

/// Per-axis dimension envelopes of an assembly
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: AxisDimension,
    pub height: AxisDimension,
    pub depth: AxisDimension,
}

/// Validation envelope for one named instance parameter
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Constraint {
    pub min: f64,
    pub max: f64,
    #[serde(default)]
    pub step: Option<f64>,
}

impl Constraint {
    pub fn new(min: f64, max: f64) -> Self {
        Self {
            min,
            max,
            step: None,
        }
    }

    pub fn with_step(mut self, step: f64) -> Self {
        self.step = Some(step);
        self
    }
}

/// Construction defaults published into the binding environment
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Construction {
    pub panel_thickness: f64,
    pub back_thickness: f64,
    pub facade_thickness: f64,
}

impl Default for Construction {
    fn default() -> Self {
        Self {
            panel_thickness: 18.0,
            back_thickness: 3.0,
            facade_thickness: 18.0,
        }
    }
}

/// Sizing rule of the legacy value-object schema: a dimension derived from a
/// parent axis plus offset, or a fixed value
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DynamicSize {
    pub source: SizeSource,
    #[serde(default)]
    pub offset: f64,
    #[serde(default)]
    pub fixed_value: Option<f64>,
}

impl DynamicSize {
    pub fn fixed(value: f64) -> Self {
        Self {
            source: SizeSource::Fixed,
            offset: 0.0,
            fixed_value: Some(value),
        }
    }

    pub fn from_parent(source: SizeSource, offset: f64) -> Self {
        Self {
            source,
            offset,
            fixed_value: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SizeSource {
    ParentWidth,
    ParentDepth,
    ParentHeight,
    Fixed,
}

/// Where a part attaches within the parent span of one axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Anchor {
    Start,
    Center,
    End,
}

/// Anchor plus offset along one axis
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnchoredOffset {
    pub anchor: Anchor,
    #[serde(default)]
    pub offset: f64,
}

impl AnchoredOffset {
    pub fn new(anchor: Anchor, offset: f64) -> Self {
        Self { anchor, offset }
    }
}

/// Anchor-based placement of the legacy schema
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub x: AnchoredOffset,
    pub y: AnchoredOffset,
    pub z: AnchoredOffset,
}

/// A rotation component: already-numeric in the legacy schema, a formula
/// string in the parametric one
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RotationValue {
    Fixed(f64),
    Formula(String),
}

impl Default for RotationValue {
    fn default() -> Self {
        RotationValue::Fixed(0.0)
    }
}

/// Per-axis rotation of a part, in degrees
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Rotation {
    #[serde(default)]
    pub x: RotationValue,
    #[serde(default)]
    pub y: RotationValue,
    #[serde(default)]
    pub z: RotationValue,
}

impl Rotation {
    pub fn fixed(x: f64, y: f64, z: f64) -> Self {
        Self {
            x: RotationValue::Fixed(x),
            y: RotationValue::Fixed(y),
            z: RotationValue::Fixed(z),
        }
    }
}

/// The two coexisting geometry schemas of a templated part.
///
/// The parametric formula-string schema is canonical; the legacy value-object
/// schema is lifted into constant formulas by the size resolver so both run
/// through the one expression evaluator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PartGeometry {
    Parametric {
        length: String,
        width: String,
        x: String,
        y: String,
        z: String,
    },
    Legacy {
        length: DynamicSize,
        width: DynamicSize,
        placement: Placement,
    },
}

/// Part count: a literal or a formula
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Quantity {
    Count(u32),
    Formula(String),
}

impl Default for Quantity {
    fn default() -> Self {
        Quantity::Count(1)
    }
}

/// One segment of a cutout contour, coordinates as expression strings.
/// `large_arc` and `clockwise` are plain booleans, never formulas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ShapeSegment {
    Line {
        x: String,
        y: String,
    },
    Arc {
        x: String,
        y: String,
        radius: String,
        #[serde(default)]
        large_arc: bool,
        #[serde(default)]
        clockwise: bool,
    },
}

/// One templated sub-component of an assembly
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssemblyPart {
    pub id: PartId,
    pub role: PartRole,
    pub name: String,
    pub geometry: PartGeometry,
    #[serde(default)]
    pub rotation: Rotation,
    /// Boolean inclusion formula; absent means always included
    #[serde(default)]
    pub condition: Option<String>,
    /// Ordered cutout contour in part-local coordinates
    #[serde(default)]
    pub shape: Option<Vec<ShapeSegment>>,
    #[serde(default)]
    pub quantity: Quantity,
    /// Deterministic tie-break among parts with no dependency between them
    #[serde(default)]
    pub sort_order: i32,
    /// Named outputs this part publishes for sibling formulas
    #[serde(default)]
    pub provides: BTreeMap<String, String>,
    #[serde(default)]
    pub material: Option<String>,
}

impl AssemblyPart {
    pub fn new(id: impl Into<String>, role: PartRole, name: impl Into<String>) -> Self {
        Self {
            id: PartId::new(id),
            role,
            name: name.into(),
            geometry: PartGeometry::Parametric {
                length: "0".to_string(),
                width: "0".to_string(),
                x: "0".to_string(),
                y: "0".to_string(),
                z: "0".to_string(),
            },
            rotation: Rotation::default(),
            condition: None,
            shape: None,
            quantity: Quantity::default(),
            sort_order: 0,
            provides: BTreeMap::new(),
            material: None,
        }
    }

    pub fn with_geometry(mut self, geometry: PartGeometry) -> Self {
        self.geometry = geometry;
        self
    }

    pub fn with_rotation(mut self, rotation: Rotation) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_condition(mut self, condition: impl Into<String>) -> Self {
        self.condition = Some(condition.into());
        self
    }

    pub fn with_shape(mut self, shape: Vec<ShapeSegment>) -> Self {
        self.shape = Some(shape);
        self
    }

    pub fn with_quantity(mut self, quantity: Quantity) -> Self {
        self.quantity = quantity;
        self
    }

    pub fn with_sort_order(mut self, sort_order: i32) -> Self {
        self.sort_order = sort_order;
        self
    }

    pub fn with_provides(mut self, name: impl Into<String>, formula: impl Into<String>) -> Self {
        self.provides.insert(name.into(), formula.into());
        self
    }

    pub fn with_material(mut self, material: impl Into<String>) -> Self {
        self.material = Some(material.into());
        self
    }

    /// All formula texts this part can evaluate, used when collecting the
    /// names the part depends on
    pub fn formula_texts(&self) -> Vec<&str> {
        let mut texts = Vec::new();
        if let Some(cond) = &self.condition {
            texts.push(cond.as_str());
        }
        if let PartGeometry::Parametric {
            length,
            width,
            x,
            y,
            z,
        } = &self.geometry
        {
            texts.extend([
                length.as_str(),
                width.as_str(),
                x.as_str(),
                y.as_str(),
                z.as_str(),
            ]);
        }
        for value in [&self.rotation.x, &self.rotation.y, &self.rotation.z] {
            if let RotationValue::Formula(f) = value {
                texts.push(f.as_str());
            }
        }
        if let Quantity::Formula(f) = &self.quantity {
            texts.push(f.as_str());
        }
        if let Some(segments) = &self.shape {
            for segment in segments {
                match segment {
                    ShapeSegment::Line { x, y } => texts.extend([x.as_str(), y.as_str()]),
                    ShapeSegment::Arc { x, y, radius, .. } => {
                        texts.extend([x.as_str(), y.as_str(), radius.as_str()])
                    }
                }
            }
        }
        for formula in self.provides.values() {
            texts.push(formula.as_str());
        }
        texts
    }
}

/// Template-side binding of a hardware item to a module role
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleHardware {
    pub id: String,
    pub role: PartRole,
    pub hardware_id: String,
    #[serde(default)]
    pub quantity: Quantity,
    /// Optional position formula along the relevant edge
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub material: Option<String>,
}

/// Reusable parametric template for a furniture module
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assembly {
    pub id: String,
    pub category: String,
    pub kind: String,
    pub name: String,
    pub dimensions: Dimensions,
    #[serde(default)]
    pub constraints: BTreeMap<String, Constraint>,
    #[serde(default)]
    pub construction: Construction,
    pub parts: Vec<AssemblyPart>,
    #[serde(default)]
    pub hardware: Vec<ModuleHardware>,
}

impl Assembly {
    /// Look up a templated part by id
    pub fn part(&self, id: &PartId) -> Option<&AssemblyPart> {
        self.parts.iter().find(|p| &p.id == id)
    }

    /// Look up a hardware binding by id
    pub fn hardware_binding(&self, id: &str) -> Option<&ModuleHardware> {
        self.hardware.iter().find(|h| h.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_part_builder() {
        let part = AssemblyPart::new("shelf-1", PartRole::Shelf, "Shelf")
            .with_condition("shelf_count > 0")
            .with_sort_order(5)
            .with_provides("shelf_top", "z + panel_thickness");

        assert_eq!(part.id.as_str(), "shelf-1");
        assert_eq!(part.sort_order, 5);
        assert_eq!(
            part.provides.get("shelf_top").map(String::as_str),
            Some("z + panel_thickness")
        );
    }

    #[test]
    fn test_formula_texts_cover_all_schemas() {
        let part = AssemblyPart::new("p", PartRole::Shelf, "Shelf")
            .with_geometry(PartGeometry::Parametric {
                length: "width - 36".to_string(),
                width: "depth".to_string(),
                x: "18".to_string(),
                y: "0".to_string(),
                z: "height / 2".to_string(),
            })
            .with_condition("has_shelf == 1")
            .with_quantity(Quantity::Formula("shelf_count".to_string()))
            .with_shape(vec![ShapeSegment::Line {
                x: "length".to_string(),
                y: "0".to_string(),
            }])
            .with_provides("shelf_top", "z + 18");

        let texts = part.formula_texts();
        assert!(texts.contains(&"has_shelf == 1"));
        assert!(texts.contains(&"width - 36"));
        assert!(texts.contains(&"shelf_count"));
        assert!(texts.contains(&"length"));
        assert!(texts.contains(&"z + 18"));
    }

    #[test]
    fn test_legacy_geometry_has_no_formula_texts() {
        let part = AssemblyPart::new("p", PartRole::Bottom, "Bottom").with_geometry(
            PartGeometry::Legacy {
                length: DynamicSize::from_parent(SizeSource::ParentWidth, -36.0),
                width: DynamicSize::fixed(500.0),
                placement: Placement {
                    x: AnchoredOffset::new(Anchor::Start, 18.0),
                    y: AnchoredOffset::new(Anchor::Start, 0.0),
                    z: AnchoredOffset::new(Anchor::Start, 0.0),
                },
            },
        );

        assert!(part.formula_texts().is_empty());
    }
}
