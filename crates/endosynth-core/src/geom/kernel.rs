//! Built-in triangle-mesh geometry kernel.

use std::collections::HashMap;

use crate::math::{Pt3, Real, Vec3};
use crate::mesh::Mesh;

use super::{GeomError, GeometryEngine, RayHit, SurfacePoint};

const RAY_EPS: Real = 1e-12;
const WELD_TOL: Real = 1e-9;
const SEG_EPS: Real = 1e-9;

/// Pure-Rust [`GeometryEngine`] over indexed triangle meshes.
///
/// Ray casting uses Moller-Trumbore, nearest-point queries use per-triangle
/// closest-point evaluation, and the boolean union is an approximate
/// append-and-weld merge validated by the manifold post-check. The union
/// cannot cut triangles, so operands whose surfaces properly cross are
/// rejected rather than merged with interpenetrating shells; a CSG-capable
/// kernel behind the trait accepts such operands and cuts them. Queries are
/// linear in face count, which is adequate for the mesh sizes this pipeline
/// handles; a BVH-backed kernel can replace this behind the trait.
#[derive(Debug, Default, Clone, Copy)]
pub struct TriKernel;

impl TriKernel {
    pub fn new() -> Self {
        Self
    }
}

/// Moller-Trumbore ray/triangle intersection. Returns the ray parameter.
fn ray_triangle(origin: &Pt3, dir: &Vec3, a: &Pt3, b: &Pt3, c: &Pt3) -> Option<Real> {
    let e1 = b - a;
    let e2 = c - a;
    let pvec = dir.cross(&e2);
    let det = e1.dot(&pvec);
    if det.abs() < RAY_EPS {
        return None;
    }
    let inv_det = 1.0 / det;
    let tvec = origin - a;
    let u = tvec.dot(&pvec) * inv_det;
    if !(-RAY_EPS..=1.0 + RAY_EPS).contains(&u) {
        return None;
    }
    let qvec = tvec.cross(&e1);
    let v = dir.dot(&qvec) * inv_det;
    if v < -RAY_EPS || u + v > 1.0 + RAY_EPS {
        return None;
    }
    let t = e2.dot(&qvec) * inv_det;
    (t > RAY_EPS).then_some(t)
}

/// Closest point on triangle `abc` to `p` (Ericson, Real-Time Collision
/// Detection, 5.1.5).
fn closest_on_triangle(p: &Pt3, a: &Pt3, b: &Pt3, c: &Pt3) -> Pt3 {
    let ab = b - a;
    let ac = c - a;
    let ap = p - a;
    let d1 = ab.dot(&ap);
    let d2 = ac.dot(&ap);
    if d1 <= 0.0 && d2 <= 0.0 {
        return *a;
    }

    let bp = p - b;
    let d3 = ab.dot(&bp);
    let d4 = ac.dot(&bp);
    if d3 >= 0.0 && d4 <= d3 {
        return *b;
    }

    let vc = d1 * d4 - d3 * d2;
    if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
        let v = d1 / (d1 - d3);
        return a + ab * v;
    }

    let cp = p - c;
    let d5 = ab.dot(&cp);
    let d6 = ac.dot(&cp);
    if d6 >= 0.0 && d5 <= d6 {
        return *c;
    }

    let vb = d5 * d2 - d1 * d6;
    if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
        let w = d2 / (d2 - d6);
        return a + ac * w;
    }

    let va = d3 * d6 - d5 * d4;
    if va <= 0.0 && (d4 - d3) >= 0.0 && (d5 - d6) >= 0.0 {
        let w = (d4 - d3) / ((d4 - d3) + (d5 - d6));
        return b + (c - b) * w;
    }

    let denom = 1.0 / (va + vb + vc);
    let v = vb * denom;
    let w = vc * denom;
    a + ab * v + ac * w
}

/// True when the segment `p..q` properly crosses triangle `abc`, i.e. the
/// crossing lies strictly inside the segment beyond the tolerance.
fn segment_crosses(p: &Pt3, q: &Pt3, a: &Pt3, b: &Pt3, c: &Pt3) -> bool {
    let dir = q - p;
    matches!(ray_triangle(p, &dir, a, b, c), Some(t) if t < 1.0 - SEG_EPS)
}

fn triangles_cross(ta: &[Pt3; 3], tb: &[Pt3; 3]) -> bool {
    for i in 0..3 {
        let j = (i + 1) % 3;
        if segment_crosses(&ta[i], &ta[j], &tb[0], &tb[1], &tb[2])
            || segment_crosses(&tb[i], &tb[j], &ta[0], &ta[1], &ta[2])
        {
            return true;
        }
    }
    false
}

/// Any triangle of `a` properly intersecting a triangle of `b`.
fn meshes_intersect(a: &Mesh, b: &Mesh) -> bool {
    for fa in 0..a.faces.len() {
        let ta = a.triangle(fa);
        for fb in 0..b.faces.len() {
            if triangles_cross(&ta, &b.triangle(fb)) {
                return true;
            }
        }
    }
    false
}

fn quantize(p: &Pt3, tol: Real) -> (i64, i64, i64) {
    (
        (p.x / tol).round() as i64,
        (p.y / tol).round() as i64,
        (p.z / tol).round() as i64,
    )
}

/// Merge vertices closer than `tol` and drop faces that collapse.
fn weld(mesh: &mut Mesh, tol: Real) {
    let mut lookup: HashMap<(i64, i64, i64), u32> = HashMap::new();
    let mut remap = Vec::with_capacity(mesh.vertices.len());
    let mut vertices = Vec::with_capacity(mesh.vertices.len());
    for v in &mesh.vertices {
        let key = quantize(v, tol);
        let idx = *lookup.entry(key).or_insert_with(|| {
            vertices.push(*v);
            (vertices.len() - 1) as u32
        });
        remap.push(idx);
    }
    let faces = mesh
        .faces
        .iter()
        .map(|f| f.map(|i| remap[i as usize]))
        .filter(|[a, b, c]| a != b && b != c && a != c)
        .collect();
    mesh.vertices = vertices;
    mesh.faces = faces;
}

/// Icosahedron vertices and faces, unit circumradius after normalization.
fn icosahedron(radius: Real) -> Mesh {
    let t = (1.0 + 5.0_f64.sqrt()) / 2.0;
    let raw = [
        [-1.0, t, 0.0],
        [1.0, t, 0.0],
        [-1.0, -t, 0.0],
        [1.0, -t, 0.0],
        [0.0, -1.0, t],
        [0.0, 1.0, t],
        [0.0, -1.0, -t],
        [0.0, 1.0, -t],
        [t, 0.0, -1.0],
        [t, 0.0, 1.0],
        [-t, 0.0, -1.0],
        [-t, 0.0, 1.0],
    ];
    let vertices = raw
        .iter()
        .map(|v| {
            let n = Vec3::new(v[0], v[1], v[2]).normalize() * radius;
            Pt3::from(n)
        })
        .collect();
    let faces = vec![
        [0, 11, 5],
        [0, 5, 1],
        [0, 1, 7],
        [0, 7, 10],
        [0, 10, 11],
        [1, 5, 9],
        [5, 11, 4],
        [11, 10, 2],
        [10, 7, 6],
        [7, 1, 8],
        [3, 9, 4],
        [3, 4, 2],
        [3, 2, 6],
        [3, 6, 8],
        [3, 8, 9],
        [4, 9, 5],
        [2, 4, 11],
        [6, 2, 10],
        [8, 6, 7],
        [9, 8, 1],
    ];
    Mesh { vertices, faces }
}

impl GeometryEngine for TriKernel {
    fn ray_cast(&self, mesh: &Mesh, origin: &Pt3, dir: &Vec3) -> Option<RayHit> {
        let mut best: Option<(Real, usize)> = None;
        for f in 0..mesh.faces.len() {
            let [a, b, c] = mesh.triangle(f);
            if let Some(t) = ray_triangle(origin, dir, &a, &b, &c) {
                if best.map_or(true, |(bt, _)| t < bt) {
                    best = Some((t, f));
                }
            }
        }
        best.map(|(t, face)| RayHit {
            point: origin + dir * t,
            normal: mesh.face_normal(face),
            face,
            t,
        })
    }

    fn nearest_point(&self, mesh: &Mesh, query: &Pt3) -> SurfacePoint {
        let mut best_d2 = Real::INFINITY;
        let mut best = SurfacePoint {
            point: mesh.vertices[0],
            normal: Vec3::z(),
            face: 0,
        };
        for f in 0..mesh.faces.len() {
            let [a, b, c] = mesh.triangle(f);
            let p = closest_on_triangle(query, &a, &b, &c);
            let d2 = (p - query).norm_squared();
            if d2 < best_d2 {
                best_d2 = d2;
                best = SurfacePoint {
                    point: p,
                    normal: mesh.face_normal(f),
                    face: f,
                };
            }
        }
        best
    }

    fn icosphere(&self, subdivisions: u32, radius: Real) -> Mesh {
        let mut mesh = icosahedron(radius);
        for _ in 0..subdivisions {
            let mut midpoint: HashMap<(u32, u32), u32> = HashMap::new();
            let mut vertices = mesh.vertices.clone();
            let mut faces = Vec::with_capacity(mesh.faces.len() * 4);
            let mut mid = |i: u32, j: u32, vertices: &mut Vec<Pt3>| -> u32 {
                let key = (i.min(j), i.max(j));
                *midpoint.entry(key).or_insert_with(|| {
                    let m = (vertices[i as usize].coords + vertices[j as usize].coords) / 2.0;
                    vertices.push(Pt3::from(m.normalize() * radius));
                    (vertices.len() - 1) as u32
                })
            };
            for [a, b, c] in &mesh.faces {
                let ab = mid(*a, *b, &mut vertices);
                let bc = mid(*b, *c, &mut vertices);
                let ca = mid(*c, *a, &mut vertices);
                faces.push([*a, ab, ca]);
                faces.push([*b, bc, ab]);
                faces.push([*c, ca, bc]);
                faces.push([ab, bc, ca]);
            }
            mesh = Mesh { vertices, faces };
        }
        mesh
    }

    fn boolean_union(&self, base: &mut Mesh, part: &Mesh) -> Result<(), GeomError> {
        if part.faces.is_empty() {
            return Err(GeomError::DegenerateOperand("part has no faces"));
        }
        if meshes_intersect(base, part) {
            return Err(GeomError::SelfIntersectingUnion);
        }
        base.append(part);
        weld(base, WELD_TOL);
        if !self.is_manifold(base) {
            return Err(GeomError::NonManifoldUnion);
        }
        Ok(())
    }

    fn is_manifold(&self, mesh: &Mesh) -> bool {
        let mut edge_count: HashMap<(u32, u32), u32> = HashMap::new();
        for [a, b, c] in &mesh.faces {
            for (i, j) in [(a, b), (b, c), (c, a)] {
                let key = (*i.min(j), *i.max(j));
                *edge_count.entry(key).or_insert(0) += 1;
            }
        }
        edge_count.values().all(|&n| n == 2)
    }

    fn contains(&self, mesh: &Mesh, point: &Pt3) -> bool {
        // Parity count along a direction unlikely to graze edges.
        let dir = Vec3::new(0.577_215_664, 0.618_033_988, 0.533_905_932).normalize();
        let mut hits = 0u32;
        for f in 0..mesh.faces.len() {
            let [a, b, c] = mesh.triangle(f);
            if ray_triangle(point, &dir, &a, &b, &c).is_some() {
                hits += 1;
            }
        }
        hits % 2 == 1
    }
}
