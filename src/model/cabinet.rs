//! Instance-side data model: cabinet parameters, overrides, and resolved output

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::assembly::{PartId, PartRole, Quantity};

/// Parameters of one cabinet instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CabinetParameters {
    pub width: f64,
    pub height: f64,
    pub depth: f64,
    /// Named custom parameters, validated against the template constraints
    #[serde(default)]
    pub custom: BTreeMap<String, f64>,
}

impl CabinetParameters {
    pub fn new(width: f64, height: f64, depth: f64) -> Self {
        Self {
            width,
            height,
            depth,
            custom: BTreeMap::new(),
        }
    }

    pub fn with_custom(mut self, name: impl Into<String>, value: f64) -> Self {
        self.custom.insert(name.into(), value);
        self
    }
}

/// Per-cabinet override of one templated part.
///
/// At most one override may exist per source part; non-null fields win over
/// the template defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CabinetPartOverride {
    pub source_part_id: PartId,
    #[serde(default)]
    pub is_enabled: Option<bool>,
    #[serde(default)]
    pub quantity: Option<Quantity>,
    #[serde(default)]
    pub material: Option<String>,
}

impl CabinetPartOverride {
    pub fn new(source_part_id: impl Into<String>) -> Self {
        Self {
            source_part_id: PartId::new(source_part_id),
            is_enabled: None,
            quantity: None,
            material: None,
        }
    }

    pub fn disabled(mut self) -> Self {
        self.is_enabled = Some(false);
        self
    }

    pub fn with_quantity(mut self, quantity: Quantity) -> Self {
        self.quantity = Some(quantity);
        self
    }

    pub fn with_material(mut self, material: impl Into<String>) -> Self {
        self.material = Some(material.into());
        self
    }
}

/// Per-cabinet override of one module-hardware binding, keyed by the
/// template binding id. Fields mirror the template binding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CabinetHardwareOverride {
    pub module_hardware_id: String,
    #[serde(default)]
    pub role: Option<PartRole>,
    #[serde(default)]
    pub hardware_id: Option<String>,
    #[serde(default)]
    pub quantity: Option<Quantity>,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub is_enabled: Option<bool>,
    #[serde(default)]
    pub material: Option<String>,
}

impl CabinetHardwareOverride {
    pub fn new(module_hardware_id: impl Into<String>) -> Self {
        Self {
            module_hardware_id: module_hardware_id.into(),
            role: None,
            hardware_id: None,
            quantity: None,
            position: None,
            is_enabled: None,
            material: None,
        }
    }

    pub fn disabled(mut self) -> Self {
        self.is_enabled = Some(false);
        self
    }

    pub fn with_hardware(mut self, hardware_id: impl Into<String>) -> Self {
        self.hardware_id = Some(hardware_id.into());
        self
    }

    pub fn with_quantity(mut self, quantity: Quantity) -> Self {
        self.quantity = Some(quantity);
        self
    }

    pub fn with_position(mut self, position: impl Into<String>) -> Self {
        self.position = Some(position.into());
        self
    }
}

/// All instance-level overrides applied during one pass
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct InstanceOverrides {
    #[serde(default)]
    pub parts: Vec<CabinetPartOverride>,
    #[serde(default)]
    pub hardware: Vec<CabinetHardwareOverride>,
}

impl InstanceOverrides {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn with_part(mut self, part: CabinetPartOverride) -> Self {
        self.parts.push(part);
        self
    }

    pub fn with_hardware(mut self, hardware: CabinetHardwareOverride) -> Self {
        self.hardware.push(hardware);
        self
    }
}

/// A fully resolved cutout segment in part-local coordinates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResolvedSegment {
    Line {
        x: f64,
        y: f64,
    },
    Arc {
        x: f64,
        y: f64,
        radius: f64,
        large_arc: bool,
        clockwise: bool,
    },
}

/// Concrete, resolved instance of an `AssemblyPart` for one cabinet.
///
/// Parts added manually to a cabinet carry no `source_part_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CabinetPart {
    pub source_part_id: Option<PartId>,
    pub role: PartRole,
    pub name: String,
    pub length: f64,
    pub width: f64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    /// Rotation around x, y, z in degrees
    pub rotation: [f64; 3],
    pub shape: Option<Vec<ResolvedSegment>>,
    pub quantity: u32,
    pub enabled: bool,
    pub material: Option<String>,
}

/// Effective hardware assignment after the override cascade
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HardwareAssignment {
    pub role: PartRole,
    pub hardware_id: String,
    pub quantity: u32,
    pub position: Option<f64>,
    pub material: Option<String>,
}

/// Result of one instantiation pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instantiation {
    /// Resolved parts in evaluation order
    pub parts: Vec<CabinetPart>,
    pub hardware: Vec<HardwareAssignment>,
    pub warnings: Vec<crate::engine::Warning>,
}
