//! Scene sample composition.
//!
//! [`generate_sample`] runs the full per-slot pipeline (diverticula, pose,
//! light, particles, shrinkwrap) from one seeded random stream, and
//! [`assemble`] performs the final validity pass: the camera must not be
//! enclosed by a scattered particle or by the conformed tool. Assembly is
//! pure composition; no input is mutated, and the resulting [`SceneSample`]
//! is consumed exactly once by the renderer.

use std::sync::Arc;

use nalgebra::Translation3;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::json;
use thiserror::Error;

use endosynth_core::{GeometryEngine, Iso3, Mesh, ParameterSpace};
use endosynth_samplers::{
    conform_tool, grow_diverticula, sample_light, sample_pose, scatter, CameraIntrinsics,
    CentroidTarget, ConformSettings, ConformedTool, Deformed, LightDescriptor, Particle, Pose,
    Protrusion, SamplingError, Scatter, SurfaceSampling, ToolMeshes,
};

use crate::discovery::AnatomyModel;

/// Final assembly validity failure: the camera is enclosed by scene
/// geometry. Triggers a whole-sample regeneration.
#[derive(Debug, Error)]
#[error("degenerate scene: camera enclosed by {0}")]
pub struct DegenerateScene(pub &'static str);

/// Per-sample pipeline failure.
#[derive(Debug, Error)]
pub enum SampleError {
    #[error(transparent)]
    Sampling(#[from] SamplingError),
    #[error(transparent)]
    Degenerate(#[from] DegenerateScene),
}

/// One fully specified, renderer-ready scene instance.
#[derive(Debug, Clone)]
pub struct SceneSample {
    /// Seed the sample's random stream was created from.
    pub seed: u64,
    pub model_name: String,
    pub pose: Pose,
    pub light: LightDescriptor,
    pub particles: Vec<Particle>,
    pub protrusions: Vec<Protrusion>,
    /// Particles dropped after exhausting their retry budget.
    pub particle_shortfall: usize,
    /// Protrusions skipped after exhausting their merge budget.
    pub protrusions_skipped: usize,
    pub tool: ConformedTool,
    /// Anatomy mesh with diverticula merged in.
    pub anatomy: Arc<Mesh>,
}

impl SceneSample {
    /// All sampled parameters as one JSON value.
    ///
    /// Two runs with the same configuration and seed must produce identical
    /// records; the batch tests compare these byte for byte.
    pub fn parameter_record(&self) -> serde_json::Value {
        json!({
            "seed": self.seed,
            "model": self.model_name,
            "pose": self.pose,
            "light": self.light,
            "particles": self.particles,
            "protrusions": self.protrusions,
            "particle_shortfall": self.particle_shortfall,
            "protrusions_skipped": self.protrusions_skipped,
            "wire_vertices": self.tool.wire.mesh.vertices,
            "insulation_vertices": self.tool.insulation.mesh.vertices,
        })
    }
}

fn particle_transform(p: &Particle) -> Iso3 {
    Iso3::from_parts(Translation3::from(p.position.coords), p.rotation)
}

/// Compose a validated sample from the sampler outputs.
pub fn assemble(
    pose: Pose,
    light: LightDescriptor,
    scattered: Scatter,
    deformed: Deformed,
    tool: ConformedTool,
    debris: &Mesh,
    engine: &dyn GeometryEngine,
    model_name: &str,
    seed: u64,
) -> Result<SceneSample, DegenerateScene> {
    for p in &scattered.particles {
        let instance = debris.transformed(&particle_transform(p), p.scale);
        if engine.contains(&instance, &pose.position) {
            return Err(DegenerateScene("a scattered particle"));
        }
    }
    if engine.contains(&tool.wire.mesh, &pose.position)
        || engine.contains(&tool.insulation.mesh, &pose.position)
    {
        return Err(DegenerateScene("the conformed tool"));
    }

    Ok(SceneSample {
        seed,
        model_name: model_name.to_owned(),
        pose,
        light,
        particles: scattered.particles,
        protrusions: deformed.protrusions,
        particle_shortfall: scattered.shortfall,
        protrusions_skipped: deformed.skipped,
        tool,
        anatomy: Arc::new(deformed.mesh),
    })
}

/// Run the full per-slot pipeline from one seed.
///
/// Order is fixed (diverticula, pose, light, particles, shrinkwrap) so the
/// random stream consumption is reproducible.
pub fn generate_sample(
    model: &AnatomyModel,
    tool: &ToolMeshes,
    debris: &Mesh,
    space: &ParameterSpace,
    engine: &dyn GeometryEngine,
    intrinsics: &CameraIntrinsics,
    seed: u64,
) -> Result<SceneSample, SampleError> {
    let mut rng = StdRng::seed_from_u64(seed);

    let deformed = grow_diverticula(
        &model.mesh,
        engine,
        &space.diverticula,
        SurfaceSampling::ByArea,
        &space.retries,
        &mut rng,
    );

    let pose = sample_pose(
        &deformed.mesh,
        engine,
        &space.camera,
        intrinsics,
        &CentroidTarget,
        &space.retries,
        &mut rng,
    )?;

    let light = sample_light(&space.light, &mut rng);

    let scattered = scatter(
        &deformed.mesh,
        debris,
        &space.particles,
        SurfaceSampling::ByArea,
        &space.retries,
        &mut rng,
    );

    let conformed = conform_tool(
        tool,
        &deformed.mesh,
        engine,
        &ConformSettings::from(&space.tool),
        &space.tool.anchors,
    );

    Ok(assemble(
        pose,
        light,
        scattered,
        deformed,
        conformed,
        debris,
        engine,
        &model.name,
        seed,
    )?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use endosynth_core::{Pt3, TriKernel};
    use endosynth_samplers::ConformReport;
    use nalgebra::UnitQuaternion;

    fn dummy_pose(position: Pt3) -> Pose {
        Pose {
            position,
            orientation: UnitQuaternion::identity(),
            angles: [0.0; 3],
            distance: 0.0,
            target: position,
            intrinsics: CameraIntrinsics::default(),
        }
    }

    fn dummy_tool(kernel: &TriKernel) -> ConformedTool {
        let sliver = kernel
            .icosphere(0, 0.001)
            .transformed(&Iso3::translation(5.0, 0.0, 0.0), 1.0);
        ConformedTool {
            wire: ConformReport {
                mesh: sliver.clone(),
                moved: 0,
                misses: 0,
                anchored: 0,
            },
            insulation: ConformReport {
                mesh: sliver,
                moved: 0,
                misses: 0,
                anchored: 0,
            },
        }
    }

    #[test]
    fn camera_inside_particle_is_degenerate() {
        let kernel = TriKernel::new();
        let debris = kernel.icosphere(1, 1.0);
        let camera_at = Pt3::new(0.0, 0.0, 0.0);
        let enclosing = Particle {
            position: camera_at,
            scale: 1.0,
            rotation: UnitQuaternion::identity(),
            volume: 1.0,
            face: 0,
        };
        let deformed = Deformed {
            mesh: kernel.icosphere(1, 10.0),
            protrusions: vec![],
            skipped: 0,
        };
        let err = assemble(
            dummy_pose(camera_at),
            LightDescriptor {
                emission: 1.0,
                transform: Iso3::identity(),
            },
            Scatter {
                particles: vec![enclosing],
                shortfall: 0,
            },
            deformed,
            dummy_tool(&kernel),
            &debris,
            &kernel,
            "m",
            0,
        );
        assert!(err.is_err());
    }

    #[test]
    fn clear_scene_assembles() {
        let kernel = TriKernel::new();
        let debris = kernel.icosphere(1, 0.001);
        let deformed = Deformed {
            mesh: kernel.icosphere(1, 10.0),
            protrusions: vec![],
            skipped: 0,
        };
        let sample = assemble(
            dummy_pose(Pt3::origin()),
            LightDescriptor {
                emission: 1.0,
                transform: Iso3::identity(),
            },
            Scatter {
                particles: vec![],
                shortfall: 0,
            },
            deformed,
            dummy_tool(&kernel),
            &debris,
            &kernel,
            "m",
            7,
        )
        .unwrap();
        assert_eq!(sample.seed, 7);
        let record = sample.parameter_record();
        assert_eq!(record["model"], "m");
    }
}
