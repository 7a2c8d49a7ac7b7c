//! Procedural scene samplers for `endosynth`.
//!
//! Each module generates one aspect of a scene sample from validated
//! parameter ranges and an explicit random-number stream:
//! - [`pose`] places the camera inside the anatomy cavity,
//! - [`light`] draws the light emission,
//! - [`particles`] scatters foreign-body debris over the anatomy surface,
//! - [`diverticula`] grows pouch-like protrusions into the anatomy mesh,
//! - [`shrinkwrap`] conforms the tool meshes onto the anatomy surface.
//!
//! All samplers take `&mut StdRng` seeded by the caller; none draw from a
//! shared or thread-local generator, so a fixed seed reproduces the exact
//! parameter sequence. Every rejection loop is bounded by a
//! [`RetryBudget`](endosynth_core::RetryBudget) value and surfaces
//! exhaustion as [`SamplingError::RetriesExhausted`] instead of spinning.

/// Camera pose sampling with cavity-containment validation.
pub mod pose;
/// Light emission sampling.
pub mod light;
/// Foreign-body particle scattering.
pub mod particles;
/// Diverticulum (surface protrusion) growth.
pub mod diverticula;
/// Shrinkwrap tool conformance.
pub mod shrinkwrap;
/// Surface point sampling strategies shared by the scatterers.
pub mod surface;

use thiserror::Error;

/// Recoverable sampling failures.
#[derive(Debug, Error)]
pub enum SamplingError {
    /// A bounded rejection loop ran out of attempts.
    #[error("{what} sampling exhausted {attempts} attempts")]
    RetriesExhausted { what: &'static str, attempts: usize },
}

pub use diverticula::{grow_diverticula, Deformed, Protrusion};
pub use light::{sample_light, LightDescriptor};
pub use particles::{scatter, Particle, Scatter};
pub use pose::{sample_pose, CameraIntrinsics, CentroidTarget, Pose, TargetStrategy};
pub use shrinkwrap::{conform, conform_tool, ConformReport, ConformSettings, ConformedTool, ToolMeshes};
pub use surface::SurfaceSampling;
