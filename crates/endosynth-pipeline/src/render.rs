//! Renderer seam.
//!
//! The path tracer is an external collaborator. The core hands it a fully
//! specified [`SceneSample`](crate::scene::SceneSample) plus render settings
//! and gets back an image buffer (optionally with a surface-normal pass).
//! Engine, device and denoiser selections are closed enums the core passes
//! through without inspecting.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::scene::SceneSample;

/// External renderer failure; marks the sample slot failed.
#[derive(Debug, Error)]
#[error("render failed: {reason}")]
pub struct RenderError {
    pub reason: String,
}

/// Denoiser selection, passed through opaquely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Denoiser {
    None,
    OpenImageDenoise,
    Optix,
}

/// Render engine selection, passed through opaquely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RenderEngine {
    Cycles,
    Eevee,
}

/// Compute device selection, passed through opaquely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RenderDevice {
    Cpu,
    Gpu,
    Metal,
}

/// Render configuration forwarded to the external renderer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderSettings {
    pub resolution: (u32, u32),
    pub samples_per_pixel: u32,
    pub denoiser: Denoiser,
    pub engine: RenderEngine,
    pub device: RenderDevice,
    /// Also produce a surface-normal pass.
    pub normal_pass: bool,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            resolution: (512, 512),
            samples_per_pixel: 128,
            denoiser: Denoiser::OpenImageDenoise,
            engine: RenderEngine::Cycles,
            device: RenderDevice::Gpu,
            normal_pass: false,
        }
    }
}

/// RGBA float image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageBuffer {
    pub width: u32,
    pub height: u32,
    /// Row-major RGBA, `width * height * 4` values.
    pub rgba: Vec<f32>,
}

impl ImageBuffer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            rgba: vec![0.0; (width * height * 4) as usize],
        }
    }
}

/// Renderer output for one sample.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderedFrame {
    pub image: ImageBuffer,
    pub normals: Option<ImageBuffer>,
}

/// External path-tracing renderer.
pub trait Renderer {
    fn render(
        &self,
        sample: &SceneSample,
        settings: &RenderSettings,
    ) -> Result<RenderedFrame, RenderError>;
}
