//! High-level entry crate for the `endosynth` scene-generation toolbox.
//!
//! `endosynth` produces labeled synthetic endoscopic scenes for training
//! computer-vision systems: it samples camera poses inside an anatomy
//! cavity, scatters tumor-debris particles, grows diverticula into the
//! anatomy surface, conforms a resection tool onto it, and drives the whole
//! batch deterministically from one base seed. The path tracer, mesh file
//! loading and the CLI layer stay behind traits.
//!
//! ```no_run
//! use std::sync::atomic::AtomicBool;
//! use endosynth::prelude::*;
//!
//! # fn run(
//! #     raw: endosynth::core::RawParameterSpace,
//! #     loader: &dyn endosynth::pipeline::MeshLoader,
//! #     renderer: &(impl endosynth::pipeline::Renderer + Sync),
//! #     tool: endosynth::samplers::ToolMeshes,
//! #     debris: endosynth::core::Mesh,
//! # ) -> Result<(), Box<dyn std::error::Error>> {
//! let space = ParameterSpace::validate(raw)?;
//! let kernel = TriKernel::new();
//! let models = discover_models(
//!     &space.model_dir,
//!     &ModelFilter::new(space.model_pattern.clone()),
//!     loader,
//! )?;
//! let sink = DirectorySink::new(&space.output_dir);
//!
//! let orchestrator = BatchOrchestrator {
//!     space: &space,
//!     engine: &kernel,
//!     renderer,
//!     sink: &sink,
//!     intrinsics: CameraIntrinsics::default(),
//!     settings: RenderSettings::default(),
//!     workers: Some(2),
//! };
//! let cancel = AtomicBool::new(false);
//! let summary = orchestrator.run(&models, &tool, &debris, &cancel)?;
//! println!("{} rendered, {} failed", summary.succeeded(), summary.failed());
//! # Ok(())
//! # }
//! ```

/// Core math, mesh, parameter and geometry-kernel primitives.
pub mod core {
    pub use endosynth_core::*;
}

/// Pose, light, particle, diverticulum and shrinkwrap samplers.
pub mod samplers {
    pub use endosynth_samplers::*;
}

/// Scene assembly, discovery, renderer/sink seams and batch orchestration.
pub mod pipeline {
    pub use endosynth_pipeline::*;
}

/// Convenient re-exports for common use cases.
///
/// Import with `use endosynth::prelude::*;` to get started quickly.
pub mod prelude {
    pub use crate::core::{
        GeometryEngine, Mesh, ParameterRange, ParameterSpace, RetryBudget, RotationMode,
        ShrinkwrapType, TriKernel, WrapMode,
    };

    pub use crate::samplers::{
        conform_tool, grow_diverticula, sample_light, sample_pose, scatter, CameraIntrinsics,
        ConformSettings, SurfaceSampling, ToolMeshes,
    };

    pub use crate::pipeline::{
        assemble, discover_models, generate_sample, BatchOrchestrator, BatchSummary,
        DirectorySink, ModelFilter, RenderSettings, Renderer, SceneSample,
    };
}
