//! Diverticulum (surface anomaly) growth.
//!
//! Each protrusion is an icosphere placed at a random attachment point on
//! the anatomy, offset along the local surface normal, and merged into the
//! anatomy with the geometry kernel's boolean union. The merged mesh must
//! stay manifold and free of new self-intersections; a failed merge is
//! retried with a fresh placement and the protrusion is skipped once the
//! budget runs out. How often merges succeed depends on the kernel: the
//! built-in one rejects placements whose sphere crosses the anatomy wall,
//! while a CSG-capable engine carves those into pouches.

use log::warn;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use endosynth_core::{DiverticulumParams, GeometryEngine, Iso3, Mesh, Pt3, Real, RetryBudget};

use crate::surface::{sample_surface_point, SurfaceSampling, SurfaceTable};

/// Record of one merged protrusion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Protrusion {
    /// Attachment point on the original anatomy surface.
    pub attachment: Pt3,
    /// Source sphere radius before the merge.
    pub radius: Real,
    /// Signed offset along the local surface normal.
    pub offset: Real,
}

/// Anatomy mesh augmented with protrusions, plus what was actually grown.
#[derive(Debug, Clone)]
pub struct Deformed {
    pub mesh: Mesh,
    pub protrusions: Vec<Protrusion>,
    /// Protrusions abandoned after exhausting their merge budget.
    pub skipped: usize,
}

/// Grow `params.amount` diverticula into a copy of the anatomy mesh.
pub fn grow_diverticula(
    anatomy: &Mesh,
    engine: &dyn GeometryEngine,
    params: &DiverticulumParams,
    sampling: SurfaceSampling,
    budget: &RetryBudget,
    rng: &mut StdRng,
) -> Deformed {
    let table = SurfaceTable::new(anatomy);
    let mut mesh = anatomy.clone();
    let mut protrusions = Vec::with_capacity(params.amount);
    let mut skipped = 0;

    for _ in 0..params.amount {
        let mut merged = false;
        for attempt in 0..budget.protrusion {
            let site = sample_surface_point(anatomy, &table, sampling, rng);
            let radius = params.radius.sample(rng);
            let offset = params.translation.sample(rng);
            let center = site.point + site.normal * offset;

            let sphere = engine
                .icosphere(params.subdivisions, radius)
                .transformed(&Iso3::translation(center.x, center.y, center.z), 1.0);

            let mut trial = mesh.clone();
            match engine.boolean_union(&mut trial, &sphere) {
                Ok(()) => {
                    mesh = trial;
                    protrusions.push(Protrusion {
                        attachment: site.point,
                        radius,
                        offset,
                    });
                    merged = true;
                    break;
                }
                Err(err) => {
                    warn!("protrusion merge failed on attempt {attempt}: {err}");
                }
            }
        }
        if !merged {
            skipped += 1;
        }
    }

    if skipped > 0 {
        warn!(
            "diverticula shortfall: grew {} of {}",
            protrusions.len(),
            params.amount
        );
    }

    Deformed {
        mesh,
        protrusions,
        skipped,
    }
}
