//! Scene assembly and batch orchestration for `endosynth`.
//!
//! This crate ties the samplers together into renderer-ready
//! [`SceneSample`](scene::SceneSample)s and drives the whole batch:
//! - [`discovery`] enumerates anatomy models through an injectable filter
//!   and loader,
//! - [`scene`] composes and validates one sample,
//! - [`render`] and [`sink`] are the external renderer and output seams,
//! - [`seed`] derives independent per-slot random streams,
//! - [`batch`] schedules slots on a bounded worker pool with cooperative
//!   cancellation and accounts for every slot in a summary.
//!
//! Mesh file loading, the path tracer itself and the CLI layer are external
//! collaborators behind the traits in [`discovery`] and [`render`].

/// Anatomy model enumeration.
pub mod discovery;
/// Scene sample composition and validity.
pub mod scene;
/// Renderer interface and render configuration.
pub mod render;
/// Output persistence interface.
pub mod sink;
/// Deterministic per-slot seed derivation.
pub mod seed;
/// Batch orchestration.
pub mod batch;

pub use batch::{BatchOrchestrator, BatchSummary, ModelSummary, SlotOutcome, SlotRecord};
pub use discovery::{discover_models, AnatomyModel, MeshLoader, ModelFilter};
pub use render::{
    Denoiser, ImageBuffer, RenderDevice, RenderEngine, RenderError, RenderSettings, RenderedFrame,
    Renderer,
};
pub use scene::{assemble, generate_sample, DegenerateScene, SampleError, SceneSample};
pub use seed::{derive_retry_seed, derive_seed};
pub use sink::{DirectorySink, OutputSink, SampleMeta};
