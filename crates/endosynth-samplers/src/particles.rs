//! Foreign-body particle scattering.
//!
//! Particles (tumor debris) are placed on the anatomy surface under a hard
//! per-particle volume cap. A draw whose scaled volume exceeds the cap is
//! rejected and redrawn; a particle that cannot be placed within its retry
//! budget is dropped and the shortfall reported, so a scene may carry fewer
//! particles than requested but never an oversized one.

use log::warn;
use nalgebra::Unit;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use endosynth_core::{
    math::rotation_z_to, Mesh, ParticleParams, Pt3, Real, RetryBudget, RotationMode, UnitQuat,
};

use crate::surface::{sample_surface_point, SurfaceSampling, SurfaceTable};

/// One placed particle instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    /// Attachment point on the anatomy surface.
    pub position: Pt3,
    /// Uniform scale applied to the source mesh.
    pub scale: Real,
    pub rotation: UnitQuat,
    /// Volume of the scaled instance.
    pub volume: Real,
    /// Anatomy face the particle is attached to.
    pub face: usize,
}

/// Result of a scattering pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scatter {
    pub particles: Vec<Particle>,
    /// Requested minus placed; non-zero when retry budgets ran out.
    pub shortfall: usize,
}

/// Scatter up to `params.amount` particles of `source_mesh` over the anatomy.
pub fn scatter(
    anatomy: &Mesh,
    source_mesh: &Mesh,
    params: &ParticleParams,
    sampling: SurfaceSampling,
    budget: &RetryBudget,
    rng: &mut StdRng,
) -> Scatter {
    let table = SurfaceTable::new(anatomy);
    let reference_volume = source_mesh.signed_volume().abs();
    let mut particles = Vec::with_capacity(params.amount);
    let mut shortfall = 0;

    for _ in 0..params.amount {
        match place_one(anatomy, &table, reference_volume, params, sampling, budget, rng) {
            Some(p) => particles.push(p),
            None => shortfall += 1,
        }
    }

    if shortfall > 0 {
        warn!(
            "particle shortfall: placed {} of {} (volume cap {:.3e})",
            particles.len(),
            params.amount,
            params.volume_max
        );
    }

    Scatter {
        particles,
        shortfall,
    }
}

fn place_one(
    anatomy: &Mesh,
    table: &SurfaceTable,
    reference_volume: Real,
    params: &ParticleParams,
    sampling: SurfaceSampling,
    budget: &RetryBudget,
    rng: &mut StdRng,
) -> Option<Particle> {
    for _ in 0..budget.particle {
        let site = sample_surface_point(anatomy, table, sampling, rng);
        let scale = params.scale.sample(rng);
        let volume = reference_volume * scale.powi(3);
        if volume > params.volume_max {
            continue;
        }

        let rotation = match params.mode {
            RotationMode::AlignToSurface => {
                // Local +Z onto the surface normal, then an in-plane spin
                // about that normal.
                let base = rotation_z_to(&site.normal);
                let spin = params.rotation.sample(rng);
                let axis = Unit::new_normalize(site.normal);
                UnitQuat::from_axis_angle(&axis, spin) * base
            }
            RotationMode::Free => {
                let rx = params.rotation.sample(rng);
                let ry = params.rotation.sample(rng);
                let rz = params.rotation.sample(rng);
                UnitQuat::from_euler_angles(rx, ry, rz)
            }
        };

        return Some(Particle {
            position: site.point,
            scale,
            rotation,
            volume,
            face: site.face,
        });
    }
    None
}
