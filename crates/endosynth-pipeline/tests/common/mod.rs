//! Shared fixtures: a stub renderer, an in-memory sink and a synthetic
//! parameter space over icosphere anatomies.
#![allow(dead_code)]

use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use endosynth_core::{
    GeomError, GeometryEngine, Mesh, ParameterSpace, Pt3, RawAnchor, RawDiverticula,
    RawParameterSpace, RawParticles, RawTool, RayHit, Real, RotationMode, ShrinkwrapType,
    SurfacePoint, TriKernel, Vec3, WrapMode,
};
use endosynth_pipeline::{
    AnatomyModel, ImageBuffer, OutputSink, RenderError, RenderSettings, RenderedFrame, Renderer,
    SampleMeta, SceneSample,
};
use endosynth_samplers::ToolMeshes;

pub fn test_space(samples_per_model: usize, base_seed: u64) -> ParameterSpace {
    let raw = RawParameterSpace {
        model_pattern: "bladder".into(),
        model_dir: "models".into(),
        output_dir: "out".into(),
        clear_output: false,
        samples_per_model,
        base_seed,
        distance_range: [0.0, 0.04],
        view_angle_max_deg: [45.0, 45.0, 45.0],
        emission_range: [1.0, 1.0],
        tumor_particles: RawParticles {
            amount: 5,
            volume_max: 1.0,
            scale_range: [0.5, 1.0],
            rotation_range_deg: [0.0, 360.0],
            rotation_mode: RotationMode::AlignToSurface,
        },
        diverticulum: RawDiverticula {
            amount: 1,
            subdivisions: 1,
            radius_sphere_range: [0.001, 0.02],
            translation_range: [-0.005, 0.005],
        },
        tool: RawTool {
            wire_path: "tool/wire.ply".into(),
            insulation_path: "tool/insulation.ply".into(),
            extension_dir: [0.0, 0.0, 1.0],
            wrap_mode: WrapMode::Outside,
            shrinkwrap_type: ShrinkwrapType::NearestSurface,
            max_distance: 0.05,
            projection_axis: [0.0, 0.0, 1.0],
            anchors: vec![RawAnchor {
                position: [0.0, 0.0, -2.5],
                radius: 0.25,
            }],
        },
        retries: Default::default(),
    };
    ParameterSpace::validate(raw).unwrap()
}

pub fn test_models(count: usize) -> Vec<AnatomyModel> {
    let kernel = TriKernel::new();
    (0..count)
        .map(|i| AnatomyModel {
            name: format!("bladder_{i:02}"),
            mesh: std::sync::Arc::new(kernel.icosphere(2, 0.1)),
        })
        .collect()
}

pub fn test_tool() -> ToolMeshes {
    let strip = Mesh::new(
        vec![
            Pt3::new(0.0, 0.0, 0.12),
            Pt3::new(0.01, 0.0, 0.12),
            Pt3::new(0.0, 0.01, 0.12),
        ],
        vec![[0, 1, 2]],
    )
    .unwrap();
    ToolMeshes {
        wire: strip.clone(),
        insulation: strip,
    }
}

pub fn test_debris() -> Mesh {
    TriKernel::new().icosphere(0, 0.001)
}

/// Engine that reports the camera outside the cavity for the first `n`
/// containment queries, then behaves like the real kernel. Forces pose
/// exhaustion (and with it whole-sample regeneration) for a controlled
/// number of attempts.
pub struct FlakyEngine {
    inner: TriKernel,
    failing_contains: AtomicUsize,
}

impl FlakyEngine {
    pub fn failing_first(n: usize) -> Self {
        Self {
            inner: TriKernel::new(),
            failing_contains: AtomicUsize::new(n),
        }
    }
}

impl GeometryEngine for FlakyEngine {
    fn ray_cast(&self, mesh: &Mesh, origin: &Pt3, dir: &Vec3) -> Option<RayHit> {
        self.inner.ray_cast(mesh, origin, dir)
    }

    fn nearest_point(&self, mesh: &Mesh, query: &Pt3) -> SurfacePoint {
        self.inner.nearest_point(mesh, query)
    }

    fn icosphere(&self, subdivisions: u32, radius: Real) -> Mesh {
        self.inner.icosphere(subdivisions, radius)
    }

    fn boolean_union(&self, base: &mut Mesh, part: &Mesh) -> Result<(), GeomError> {
        self.inner.boolean_union(base, part)
    }

    fn is_manifold(&self, mesh: &Mesh) -> bool {
        self.inner.is_manifold(mesh)
    }

    fn contains(&self, mesh: &Mesh, point: &Pt3) -> bool {
        let still_failing = self
            .failing_contains
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| n.checked_sub(1))
            .is_ok();
        if still_failing {
            return false;
        }
        self.inner.contains(mesh, point)
    }
}

/// Renderer stub: 1x1 frames, with an optional per-model failure.
pub struct StubRenderer {
    pub fail_model: Option<String>,
    pub renders: AtomicUsize,
}

impl StubRenderer {
    pub fn new() -> Self {
        Self {
            fail_model: None,
            renders: AtomicUsize::new(0),
        }
    }

    pub fn failing_for(model: &str) -> Self {
        Self {
            fail_model: Some(model.to_owned()),
            renders: AtomicUsize::new(0),
        }
    }
}

impl Renderer for StubRenderer {
    fn render(
        &self,
        sample: &SceneSample,
        settings: &RenderSettings,
    ) -> Result<RenderedFrame, RenderError> {
        self.renders.fetch_add(1, Ordering::Relaxed);
        if self.fail_model.as_deref() == Some(sample.model_name.as_str()) {
            return Err(RenderError {
                reason: format!("stub failure for {}", sample.model_name),
            });
        }
        let (w, h) = settings.resolution;
        Ok(RenderedFrame {
            image: ImageBuffer::new(w.min(1), h.min(1)),
            normals: None,
        })
    }
}

/// Sink stub capturing metadata in memory.
#[derive(Default)]
pub struct MemorySink {
    pub persisted: Mutex<Vec<SampleMeta>>,
    pub clears: AtomicUsize,
}

impl OutputSink for MemorySink {
    fn persist(
        &self,
        _model: &str,
        _sample_index: usize,
        _frame: &RenderedFrame,
        meta: &SampleMeta,
    ) -> io::Result<()> {
        self.persisted.lock().unwrap().push(meta.clone());
        Ok(())
    }

    fn clear(&self) -> io::Result<()> {
        self.clears.fetch_add(1, Ordering::Relaxed);
        self.persisted.lock().unwrap().clear();
        Ok(())
    }
}
