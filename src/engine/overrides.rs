//! Override cascade resolver
//!
//! Merges instance-level override records onto template defaults, field by
//! field: any non-null override field wins, `is_enabled` defaults to `true`.
//! At most one override may target a given template record; duplicates are
//! a `ConflictError`.

use std::collections::BTreeMap;

use crate::model::{
    CabinetHardwareOverride, CabinetPartOverride, ModuleHardware, PartRole, Quantity,
};

use super::error::{ConflictError, OverrideKind};

/// Index part overrides by source part id, rejecting duplicates
pub fn index_part_overrides(
    overrides: &[CabinetPartOverride],
) -> Result<BTreeMap<&str, &CabinetPartOverride>, ConflictError> {
    let mut index = BTreeMap::new();
    for o in overrides {
        if index.insert(o.source_part_id.as_str(), o).is_some() {
            return Err(ConflictError {
                kind: OverrideKind::Part,
                id: o.source_part_id.to_string(),
            });
        }
    }
    Ok(index)
}

/// Index hardware overrides by module hardware id, rejecting duplicates
pub fn index_hardware_overrides(
    overrides: &[CabinetHardwareOverride],
) -> Result<BTreeMap<&str, &CabinetHardwareOverride>, ConflictError> {
    let mut index = BTreeMap::new();
    for o in overrides {
        if index.insert(o.module_hardware_id.as_str(), o).is_some() {
            return Err(ConflictError {
                kind: OverrideKind::Hardware,
                id: o.module_hardware_id.clone(),
            });
        }
    }
    Ok(index)
}

/// Effective hardware binding after the cascade, before formula evaluation
#[derive(Debug, Clone, PartialEq)]
pub struct EffectiveHardware {
    pub role: PartRole,
    pub hardware_id: String,
    pub quantity: Quantity,
    pub position: Option<String>,
    pub is_enabled: bool,
    pub material: Option<String>,
}

/// Merge one hardware override onto its template binding
pub fn effective_hardware(
    template: &ModuleHardware,
    o: Option<&CabinetHardwareOverride>,
) -> EffectiveHardware {
    match o {
        None => EffectiveHardware {
            role: template.role,
            hardware_id: template.hardware_id.clone(),
            quantity: template.quantity.clone(),
            position: template.position.clone(),
            is_enabled: true,
            material: template.material.clone(),
        },
        Some(o) => EffectiveHardware {
            role: o.role.unwrap_or(template.role),
            hardware_id: o
                .hardware_id
                .clone()
                .unwrap_or_else(|| template.hardware_id.clone()),
            quantity: o.quantity.clone().unwrap_or_else(|| template.quantity.clone()),
            position: o.position.clone().or_else(|| template.position.clone()),
            is_enabled: o.is_enabled.unwrap_or(true),
            material: o.material.clone().or_else(|| template.material.clone()),
        },
    }
}
