//! Surface point sampling strategies.
//!
//! Both the particle scatterer and the diverticulum generator need random
//! attachment points on the anatomy. The distribution is an explicit,
//! injectable choice: by-area is the default since debris and anomalies
//! occur per unit surface, not per tessellation density.

use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};

use endosynth_core::{Mesh, Pt3, Real, Vec3};

/// Distribution of candidate placement points over a mesh surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SurfaceSampling {
    /// Uniform over surface area (area-weighted triangle pick plus a
    /// uniform barycentric point).
    ByArea,
    /// Uniform over vertices; the point is the vertex itself.
    ByVertex,
}

impl Default for SurfaceSampling {
    fn default() -> Self {
        Self::ByArea
    }
}

/// A sampled surface point with its local normal and owning face.
#[derive(Debug, Clone, Copy)]
pub struct SampledPoint {
    pub point: Pt3,
    pub normal: Vec3,
    pub face: usize,
}

/// Precomputed per-mesh lookup tables for repeated surface draws:
/// cumulative face areas for the area-weighted pick, plus per-vertex
/// normals and a vertex-to-face map for the by-vertex pick.
pub struct SurfaceTable {
    cumulative: Vec<Real>,
    total: Real,
    vertex_normals: Vec<Vec3>,
    vertex_face: Vec<usize>,
}

impl SurfaceTable {
    pub fn new(mesh: &Mesh) -> Self {
        let mut cumulative = Vec::with_capacity(mesh.faces.len());
        let mut total = 0.0;
        // First face touching each vertex, for reporting.
        let mut vertex_face = vec![usize::MAX; mesh.vertices.len()];
        for f in 0..mesh.faces.len() {
            total += mesh.face_area(f);
            cumulative.push(total);
            for &i in &mesh.faces[f] {
                let i = i as usize;
                if vertex_face[i] == usize::MAX {
                    vertex_face[i] = f;
                }
            }
        }
        for vf in &mut vertex_face {
            if *vf == usize::MAX {
                *vf = 0;
            }
        }
        Self {
            cumulative,
            total,
            vertex_normals: mesh.vertex_normals(),
            vertex_face,
        }
    }

    fn pick_face(&self, rng: &mut StdRng) -> usize {
        if self.total <= 0.0 {
            // All faces degenerate; fall back to a uniform face pick.
            return rng.random_range(0..self.cumulative.len());
        }
        let r = rng.random_range(0.0..self.total);
        self.cumulative.partition_point(|&c| c <= r)
    }
}

/// Draw one surface point according to `mode`.
pub fn sample_surface_point(
    mesh: &Mesh,
    table: &SurfaceTable,
    mode: SurfaceSampling,
    rng: &mut StdRng,
) -> SampledPoint {
    match mode {
        SurfaceSampling::ByArea => {
            let face = table.pick_face(rng).min(mesh.faces.len() - 1);
            let [a, b, c] = mesh.triangle(face);
            // Uniform barycentric point via the square-root trick.
            let su = rng.random_range(0.0..1.0_f64).sqrt();
            let v: Real = rng.random_range(0.0..1.0);
            let p = a.coords * (1.0 - su) + b.coords * (su * (1.0 - v)) + c.coords * (su * v);
            SampledPoint {
                point: Pt3::from(p),
                normal: mesh.face_normal(face),
                face,
            }
        }
        SurfaceSampling::ByVertex => {
            let vi = rng.random_range(0..mesh.vertices.len());
            SampledPoint {
                point: mesh.vertices[vi],
                normal: table.vertex_normals[vi],
                face: table.vertex_face[vi],
            }
        }
    }
}
