//! Data model shared by the template catalog and the instantiation engine

pub mod assembly;
pub mod cabinet;

pub use assembly::{
    Anchor, AnchoredOffset, Assembly, AssemblyPart, AxisDimension, Constraint, Construction,
    Dimensions, DynamicSize, ModuleHardware, PartGeometry, PartId, PartRole, Placement, Quantity,
    Rotation, RotationValue, ShapeSegment, SizeSource,
};
pub use cabinet::{
    CabinetHardwareOverride, CabinetParameters, CabinetPart, CabinetPartOverride,
    HardwareAssignment, InstanceOverrides, Instantiation, ResolvedSegment,
};
