//! Geometry kernel capability trait.
//!
//! The samplers and the scene assembler never talk to a concrete geometry
//! library; they call through [`GeometryEngine`], whose capability set is
//! exactly what the pipeline needs: ray casting, nearest-surface queries,
//! icosphere generation, boolean union, manifold checking, and point
//! containment. The built-in [`TriKernel`] is a dependency-free triangle-mesh
//! implementation; any conforming geometry library can be slotted in instead.

mod kernel;

pub use kernel::TriKernel;

use thiserror::Error;

use crate::math::{Pt3, Real, Vec3};
use crate::mesh::Mesh;

#[derive(Debug, Error)]
pub enum GeomError {
    /// A boolean union produced a mesh that fails the manifold check.
    #[error("boolean union produced a non-manifold mesh")]
    NonManifoldUnion,
    /// A boolean union would leave the operands' surfaces crossing each
    /// other in the merged mesh.
    #[error("boolean union would introduce self-intersections")]
    SelfIntersectingUnion,
    /// Operand mesh is unusable for the requested operation.
    #[error("degenerate operand: {0}")]
    DegenerateOperand(&'static str),
}

/// First intersection of a ray with a mesh surface.
#[derive(Debug, Clone, Copy)]
pub struct RayHit {
    pub point: Pt3,
    /// Unit face normal at the hit, oriented with the face winding.
    pub normal: Vec3,
    pub face: usize,
    /// Ray parameter of the hit; non-negative.
    pub t: Real,
}

/// Nearest point on a mesh surface to a query point.
#[derive(Debug, Clone, Copy)]
pub struct SurfacePoint {
    pub point: Pt3,
    pub normal: Vec3,
    pub face: usize,
}

/// Capability set required from a geometry kernel.
pub trait GeometryEngine {
    /// First intersection of the ray `origin + t * dir` (`t >= 0`) with the
    /// mesh, or `None` if the ray misses.
    fn ray_cast(&self, mesh: &Mesh, origin: &Pt3, dir: &Vec3) -> Option<RayHit>;

    /// Nearest point on the mesh surface to `query`.
    fn nearest_point(&self, mesh: &Mesh, query: &Pt3) -> SurfacePoint;

    /// Icosphere refined `subdivisions` times, centered at the origin.
    fn icosphere(&self, subdivisions: u32, radius: Real) -> Mesh;

    /// Merge `part` into `base`, producing a single manifold mesh free of
    /// new self-intersections beyond a small numerical tolerance. `base` is
    /// mutated in place.
    fn boolean_union(&self, base: &mut Mesh, part: &Mesh) -> Result<(), GeomError>;

    /// Every edge shared by exactly two faces.
    fn is_manifold(&self, mesh: &Mesh) -> bool;

    /// Ray-parity containment test for a closed mesh.
    fn contains(&self, mesh: &Mesh, point: &Pt3) -> bool;
}
