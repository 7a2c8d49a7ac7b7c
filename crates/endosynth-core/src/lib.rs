//! Core primitives for the `endosynth` scene-sampling toolbox.
//!
//! This crate contains:
//! - linear algebra type aliases (`Real`, `Vec3`, `Pt3`, ...),
//! - the triangle [`Mesh`](mesh::Mesh) container used throughout the pipeline,
//! - validated sampling ranges and the immutable [`ParameterSpace`](params::ParameterSpace),
//! - the [`GeometryEngine`](geom::GeometryEngine) capability trait and the
//!   built-in [`TriKernel`](geom::TriKernel) implementation.
//!
//! Everything downstream (samplers, conformance, batch orchestration) consumes
//! these types; nothing here reads ambient global state.

/// Linear algebra type aliases and helpers.
pub mod math;
/// Triangle mesh container and derived quantities.
pub mod mesh;
/// Closed sampling intervals and per-axis triples.
pub mod range;
/// Validated, immutable sampling configuration.
pub mod params;
/// Geometry kernel capability trait and built-in implementation.
pub mod geom;

pub use geom::{GeomError, GeometryEngine, RayHit, SurfacePoint, TriKernel};
pub use math::*;
pub use mesh::{Mesh, MeshError};
pub use params::{
    CameraParams, ConfigError, DiverticulumParams, LightParams, NoClipAnchor, ParameterSpace,
    ParticleParams, RawAnchor, RawDiverticula, RawParameterSpace, RawParticles, RawTool,
    RetryBudget, RotationMode, ShrinkwrapType, ToolParams, WrapMode,
};
pub use range::{AxisRanges, ParameterRange, RangeError};
