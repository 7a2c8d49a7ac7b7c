//! Triangle mesh container shared by the samplers and the pipeline.
//!
//! A [`Mesh`] owns its vertex and face buffers. Components that deform
//! geometry (diverticulum growth, shrinkwrap conformance) work on copies;
//! loaded anatomy meshes stay immutable behind shared references.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::math::{Iso3, Pt3, Real, Vec3};

/// Errors raised by mesh construction.
#[derive(Debug, Error)]
pub enum MeshError {
    /// A face references a vertex index outside the vertex buffer.
    #[error("face {face} references out-of-range vertex index {index}")]
    IndexOutOfRange { face: usize, index: u32 },
    /// Vertex or face buffer is empty.
    #[error("mesh has no {0}")]
    Empty(&'static str),
}

/// Indexed triangle mesh.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mesh {
    /// Vertex positions.
    pub vertices: Vec<Pt3>,
    /// Counter-clockwise vertex index triples.
    pub faces: Vec<[u32; 3]>,
}

impl Mesh {
    /// Build a mesh, validating that every face index is in range.
    pub fn new(vertices: Vec<Pt3>, faces: Vec<[u32; 3]>) -> Result<Self, MeshError> {
        if vertices.is_empty() {
            return Err(MeshError::Empty("vertices"));
        }
        if faces.is_empty() {
            return Err(MeshError::Empty("faces"));
        }
        let n = vertices.len() as u32;
        for (fi, f) in faces.iter().enumerate() {
            for &i in f {
                if i >= n {
                    return Err(MeshError::IndexOutOfRange { face: fi, index: i });
                }
            }
        }
        Ok(Self { vertices, faces })
    }

    /// Corner positions of face `f`.
    pub fn triangle(&self, f: usize) -> [Pt3; 3] {
        let [a, b, c] = self.faces[f];
        [
            self.vertices[a as usize],
            self.vertices[b as usize],
            self.vertices[c as usize],
        ]
    }

    /// Unnormalized face normal (twice the area vector).
    pub fn face_normal_raw(&self, f: usize) -> Vec3 {
        let [a, b, c] = self.triangle(f);
        (b - a).cross(&(c - a))
    }

    /// Unit face normal; zero vector for a degenerate triangle.
    pub fn face_normal(&self, f: usize) -> Vec3 {
        let n = self.face_normal_raw(f);
        let len = n.norm();
        if len < 1e-18 {
            Vec3::zeros()
        } else {
            n / len
        }
    }

    pub fn face_area(&self, f: usize) -> Real {
        0.5 * self.face_normal_raw(f).norm()
    }

    pub fn face_centroid(&self, f: usize) -> Pt3 {
        let [a, b, c] = self.triangle(f);
        Pt3::from((a.coords + b.coords + c.coords) / 3.0)
    }

    /// Area-weighted per-vertex normals, normalized.
    pub fn vertex_normals(&self) -> Vec<Vec3> {
        let mut normals = vec![Vec3::zeros(); self.vertices.len()];
        for f in 0..self.faces.len() {
            let n = self.face_normal_raw(f);
            for &i in &self.faces[f] {
                normals[i as usize] += n;
            }
        }
        for n in &mut normals {
            let len = n.norm();
            if len > 1e-18 {
                *n /= len;
            }
        }
        normals
    }

    /// Signed volume of a closed mesh via the divergence theorem.
    ///
    /// Positive for outward-oriented faces; the absolute value is the
    /// enclosed volume.
    pub fn signed_volume(&self) -> Real {
        let mut six_v = 0.0;
        for f in 0..self.faces.len() {
            let [a, b, c] = self.triangle(f);
            six_v += a.coords.dot(&b.coords.cross(&c.coords));
        }
        six_v / 6.0
    }

    /// Axis-aligned bounding box as `(min, max)` corners.
    pub fn aabb(&self) -> (Pt3, Pt3) {
        let mut lo = self.vertices[0];
        let mut hi = self.vertices[0];
        for v in &self.vertices[1..] {
            for k in 0..3 {
                lo[k] = lo[k].min(v[k]);
                hi[k] = hi[k].max(v[k]);
            }
        }
        (lo, hi)
    }

    /// Centroid of the vertex positions.
    pub fn vertex_centroid(&self) -> Pt3 {
        let sum: Vec3 = self.vertices.iter().map(|p| p.coords).sum();
        Pt3::from(sum / self.vertices.len() as Real)
    }

    /// Total surface area.
    pub fn surface_area(&self) -> Real {
        (0..self.faces.len()).map(|f| self.face_area(f)).sum()
    }

    /// Copy transformed by a uniform scale followed by an isometry.
    pub fn transformed(&self, iso: &Iso3, scale: Real) -> Self {
        Self {
            vertices: self
                .vertices
                .iter()
                .map(|p| iso * Pt3::from(p.coords * scale))
                .collect(),
            faces: self.faces.clone(),
        }
    }

    /// Append `other`'s geometry, offsetting its face indices.
    pub fn append(&mut self, other: &Mesh) {
        let offset = self.vertices.len() as u32;
        self.vertices.extend_from_slice(&other.vertices);
        self.faces
            .extend(other.faces.iter().map(|f| f.map(|i| i + offset)));
    }
}
