//! Cabinetry - a parametric assembly-to-cabinet-part instantiation engine
//!
//! This library converts a reusable furniture-module template (an `Assembly`
//! built from formula-driven sub-parts) into a concrete, fully-resolved set
//! of part geometries for one cabinet instance. It parses and evaluates the
//! template's formulas, orders inter-part dependencies, decides conditional
//! inclusion, resolves anchor-based placement and cutout contours, clamps
//! instance parameters to template constraints, and merges instance-level
//! overrides — all as one pure, deterministic pass over in-memory data.
//!
//! # Example
//!
//! ```rust
//! use cabinetry::model::{
//!     Assembly, AssemblyPart, AxisDimension, CabinetParameters, Dimensions,
//!     InstanceOverrides, PartGeometry, PartRole,
//! };
//!
//! let assembly = Assembly {
//!     id: "base-600".to_string(),
//!     category: "base".to_string(),
//!     kind: "standard".to_string(),
//!     name: "Base cabinet".to_string(),
//!     dimensions: Dimensions {
//!         width: AxisDimension::new(600.0, 300.0, 1200.0),
//!         height: AxisDimension::new(720.0, 600.0, 900.0),
//!         depth: AxisDimension::new(560.0, 300.0, 650.0),
//!     },
//!     constraints: Default::default(),
//!     construction: Default::default(),
//!     parts: vec![AssemblyPart::new("shelf", PartRole::Shelf, "Shelf").with_geometry(
//!         PartGeometry::Parametric {
//!             length: "width - 2 * panel_thickness".to_string(),
//!             width: "depth".to_string(),
//!             x: "panel_thickness".to_string(),
//!             y: "0".to_string(),
//!             z: "height / 2".to_string(),
//!         },
//!     )],
//!     hardware: vec![],
//! };
//!
//! let result = cabinetry::instantiate(
//!     &assembly,
//!     &CabinetParameters::new(600.0, 720.0, 560.0),
//!     &InstanceOverrides::none(),
//! )
//! .unwrap();
//!
//! assert_eq!(result.parts[0].length, 564.0);
//! assert_eq!(result.parts[0].z, 360.0);
//! ```

pub mod engine;
pub mod expr;
pub mod model;

pub use engine::{
    instantiate, instantiate_with_config, ConflictError, CycleError, InstantiateConfig,
    InstantiateError, MissingDimensionError, Warning,
};
pub use expr::{Bindings, EvalError, ParseError};
pub use model::{
    Assembly, AssemblyPart, CabinetParameters, CabinetPart, InstanceOverrides, Instantiation,
};
