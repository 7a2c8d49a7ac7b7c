//! Validated sampling configuration.
//!
//! Configuration arrives as a serde-friendly [`RawParameterSpace`] (plain
//! numbers, degree angles, `[min, max]` pairs) and is converted exactly once
//! into an immutable [`ParameterSpace`] by [`ParameterSpace::validate`].
//! Contradictory or incomplete configuration fails fast with a
//! [`ConfigError`] before any sampling or I/O begins; downstream code only
//! ever sees the validated form, passed by reference.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::math::{deg_to_rad, Real, Vec3};
use crate::range::{AxisRanges, ParameterRange, RangeError};

/// Fatal configuration errors. These abort the run before any work begins.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid range for `{key}`: {source}")]
    Range {
        key: &'static str,
        source: RangeError,
    },
    #[error("`{key}` must be positive, got {value}")]
    NonPositive { key: &'static str, value: Real },
    #[error("`{key}` path is empty")]
    EmptyPath { key: &'static str },
    #[error("`{key}` direction vector is near zero")]
    ZeroVector { key: &'static str },
    #[error("tool conformance is configured but no no-clip anchors were given")]
    MissingAnchors,
    #[error("`{key}` must be at least 1")]
    ZeroCount { key: &'static str },
}

fn range(key: &'static str, pair: [Real; 2]) -> Result<ParameterRange, ConfigError> {
    ParameterRange::new(pair[0], pair[1]).map_err(|source| ConfigError::Range { key, source })
}

/// How scattered particles are rotated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RotationMode {
    /// Align the particle's local +Z to the surface normal, then spin it
    /// about that axis within the rotation range.
    AlignToSurface,
    /// Unconstrained per-axis rotation within the rotation range.
    Free,
}

/// Which side of the target surface shrinkwrapped vertices may land on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WrapMode {
    Inside,
    Outside,
}

/// Vertex relocation strategy for shrinkwrap conformance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShrinkwrapType {
    /// Cast along a fixed projection axis, take the first surface hit.
    Project,
    /// Move to the nearest point on the target surface.
    NearestSurface,
}

/// Landmark point whose surrounding tool geometry must stay rigid.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct NoClipAnchor {
    /// Anchor coordinate in the tool's rest frame.
    pub position: [Real; 3],
    /// Exclusion radius; vertices closer than this are never displaced.
    pub radius: Real,
}

/// Bounds on every retry loop in the system.
///
/// Exhaustion surfaces as a typed recoverable error, never an endless loop.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RetryBudget {
    /// Camera pose resamples before the sample slot is abandoned.
    pub pose: usize,
    /// Placement attempts per particle before it is dropped.
    pub particle: usize,
    /// Merge attempts per protrusion before it is skipped.
    pub protrusion: usize,
    /// Whole-sample regenerations after a degenerate assembly.
    pub sample: usize,
}

impl Default for RetryBudget {
    fn default() -> Self {
        Self {
            pose: 32,
            particle: 16,
            protrusion: 8,
            sample: 4,
        }
    }
}

/// Validated camera sampling parameters.
#[derive(Debug, Clone)]
pub struct CameraParams {
    /// Camera-to-target distance interval.
    pub distance: ParameterRange,
    /// Per-axis view angle intervals, radians, symmetric about zero.
    pub view_angles: AxisRanges,
}

/// Validated light sampling parameters.
#[derive(Debug, Clone)]
pub struct LightParams {
    /// Emission strength interval; degenerate collapses to a constant.
    pub emission: ParameterRange,
}

/// Validated tumor-particle scattering parameters.
#[derive(Debug, Clone)]
pub struct ParticleParams {
    /// Requested particle count; placed count may fall short.
    pub amount: usize,
    /// Hard per-particle volume cap.
    pub volume_max: Real,
    /// Uniform scale interval.
    pub scale: ParameterRange,
    /// Rotation interval, radians.
    pub rotation: ParameterRange,
    pub mode: RotationMode,
}

/// Validated diverticulum growth parameters.
#[derive(Debug, Clone)]
pub struct DiverticulumParams {
    pub amount: usize,
    /// Icosphere refinement level for the protrusion template.
    pub subdivisions: u32,
    /// Sphere radius interval.
    pub radius: ParameterRange,
    /// Offset along the local surface normal, signed.
    pub translation: ParameterRange,
}

/// Validated tool meshes and shrinkwrap settings.
#[derive(Debug, Clone)]
pub struct ToolParams {
    pub wire_path: PathBuf,
    pub insulation_path: PathBuf,
    /// Direction the tool extends from the camera, in camera frame.
    pub extension_dir: Vec3,
    pub wrap_mode: WrapMode,
    pub shrinkwrap_type: ShrinkwrapType,
    /// Maximum vertex displacement during conformance.
    pub max_distance: Real,
    /// Cast axis for [`ShrinkwrapType::Project`].
    pub projection_axis: Vec3,
    /// Never empty; validated in [`ParameterSpace::validate`].
    pub anchors: Vec<NoClipAnchor>,
}

/// Immutable, validated snapshot of the whole sampling configuration.
#[derive(Debug, Clone)]
pub struct ParameterSpace {
    /// Substring that anatomy model file names must contain.
    pub model_pattern: String,
    /// Directory holding anatomy model files.
    pub model_dir: PathBuf,
    /// Output location for rendered samples.
    pub output_dir: PathBuf,
    /// Remove prior output contents before the first sample.
    pub clear_output: bool,
    pub samples_per_model: usize,
    pub base_seed: u64,
    pub camera: CameraParams,
    pub light: LightParams,
    pub particles: ParticleParams,
    pub diverticula: DiverticulumParams,
    pub tool: ToolParams,
    pub retries: RetryBudget,
}

/// Serde mirror of the recognized configuration keys.
///
/// Angles are degrees and intervals are `[min, max]` pairs, matching the
/// source configuration files; [`ParameterSpace::validate`] converts and
/// checks everything.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawParameterSpace {
    pub model_pattern: String,
    pub model_dir: PathBuf,
    pub output_dir: PathBuf,
    #[serde(default)]
    pub clear_output: bool,
    pub samples_per_model: usize,
    #[serde(default)]
    pub base_seed: u64,
    pub distance_range: [Real; 2],
    pub view_angle_max_deg: [Real; 3],
    pub emission_range: [Real; 2],
    pub tumor_particles: RawParticles,
    pub diverticulum: RawDiverticula,
    pub tool: RawTool,
    #[serde(default)]
    pub retries: RetryBudget,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawParticles {
    pub amount: usize,
    pub volume_max: Real,
    pub scale_range: [Real; 2],
    pub rotation_range_deg: [Real; 2],
    pub rotation_mode: RotationMode,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawDiverticula {
    pub amount: usize,
    pub subdivisions: u32,
    pub radius_sphere_range: [Real; 2],
    pub translation_range: [Real; 2],
}

fn default_anchor_radius() -> Real {
    0.25
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawAnchor {
    pub position: [Real; 3],
    #[serde(default = "default_anchor_radius")]
    pub radius: Real,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawTool {
    pub wire_path: PathBuf,
    pub insulation_path: PathBuf,
    pub extension_dir: [Real; 3],
    pub wrap_mode: WrapMode,
    pub shrinkwrap_type: ShrinkwrapType,
    pub max_distance: Real,
    pub projection_axis: [Real; 3],
    pub anchors: Vec<RawAnchor>,
}

impl ParameterSpace {
    /// Validate a raw configuration, converting degrees to radians and
    /// `[min, max]` pairs to checked ranges.
    pub fn validate(raw: RawParameterSpace) -> Result<Self, ConfigError> {
        if raw.samples_per_model == 0 {
            return Err(ConfigError::ZeroCount {
                key: "samples_per_model",
            });
        }
        if raw.model_dir.as_os_str().is_empty() {
            return Err(ConfigError::EmptyPath { key: "model_dir" });
        }
        if raw.output_dir.as_os_str().is_empty() {
            return Err(ConfigError::EmptyPath { key: "output_dir" });
        }

        let camera = CameraParams {
            distance: range("distance_range", raw.distance_range)?,
            view_angles: AxisRanges::symmetric(raw.view_angle_max_deg.map(deg_to_rad)).map_err(
                |source| ConfigError::Range {
                    key: "view_angle_max_deg",
                    source,
                },
            )?,
        };

        let light = LightParams {
            emission: range("emission_range", raw.emission_range)?,
        };

        let p = &raw.tumor_particles;
        if p.volume_max <= 0.0 {
            return Err(ConfigError::NonPositive {
                key: "tumor_particles.volume_max",
                value: p.volume_max,
            });
        }
        let particles = ParticleParams {
            amount: p.amount,
            volume_max: p.volume_max,
            scale: range("tumor_particles.scale_range", p.scale_range)?,
            rotation: range(
                "tumor_particles.rotation_range_deg",
                p.rotation_range_deg.map(deg_to_rad),
            )?,
            mode: p.rotation_mode,
        };

        let d = &raw.diverticulum;
        let diverticula = DiverticulumParams {
            amount: d.amount,
            subdivisions: d.subdivisions,
            radius: range("diverticulum.radius_sphere_range", d.radius_sphere_range)?,
            translation: range("diverticulum.translation_range", d.translation_range)?,
        };

        let t = &raw.tool;
        if t.wire_path.as_os_str().is_empty() {
            return Err(ConfigError::EmptyPath {
                key: "tool.wire_path",
            });
        }
        if t.insulation_path.as_os_str().is_empty() {
            return Err(ConfigError::EmptyPath {
                key: "tool.insulation_path",
            });
        }
        if t.anchors.is_empty() {
            return Err(ConfigError::MissingAnchors);
        }
        if t.max_distance <= 0.0 {
            return Err(ConfigError::NonPositive {
                key: "tool.max_distance",
                value: t.max_distance,
            });
        }
        let extension_dir = Vec3::from(t.extension_dir);
        if extension_dir.norm() < 1e-12 {
            return Err(ConfigError::ZeroVector {
                key: "tool.extension_dir",
            });
        }
        let projection_axis = Vec3::from(t.projection_axis);
        if projection_axis.norm() < 1e-12 {
            return Err(ConfigError::ZeroVector {
                key: "tool.projection_axis",
            });
        }
        let tool = ToolParams {
            wire_path: t.wire_path.clone(),
            insulation_path: t.insulation_path.clone(),
            extension_dir,
            wrap_mode: t.wrap_mode,
            shrinkwrap_type: t.shrinkwrap_type,
            max_distance: t.max_distance,
            projection_axis,
            anchors: t
                .anchors
                .iter()
                .map(|a| NoClipAnchor {
                    position: a.position,
                    radius: a.radius,
                })
                .collect(),
        };

        Ok(Self {
            model_pattern: raw.model_pattern,
            model_dir: raw.model_dir,
            output_dir: raw.output_dir,
            clear_output: raw.clear_output,
            samples_per_model: raw.samples_per_model,
            base_seed: raw.base_seed,
            camera,
            light,
            particles,
            diverticula,
            tool,
            retries: raw.retries,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw() -> RawParameterSpace {
        RawParameterSpace {
            model_pattern: "bladder".into(),
            model_dir: "models".into(),
            output_dir: "out".into(),
            clear_output: true,
            samples_per_model: 2,
            base_seed: 1234,
            distance_range: [0.0, 0.04],
            view_angle_max_deg: [45.0, 45.0, 45.0],
            emission_range: [1.0, 1.0],
            tumor_particles: RawParticles {
                amount: 20,
                volume_max: 1e-7,
                scale_range: [0.5, 1.5],
                rotation_range_deg: [0.0, 360.0],
                rotation_mode: RotationMode::AlignToSurface,
            },
            diverticulum: RawDiverticula {
                amount: 1,
                subdivisions: 2,
                radius_sphere_range: [0.001, 0.02],
                translation_range: [-0.005, 0.005],
            },
            tool: RawTool {
                wire_path: "tool/wire.ply".into(),
                insulation_path: "tool/insulation.ply".into(),
                extension_dir: [0.0, 0.0, 1.0],
                wrap_mode: WrapMode::Outside,
                shrinkwrap_type: ShrinkwrapType::NearestSurface,
                max_distance: 0.01,
                projection_axis: [0.0, 0.0, 1.0],
                anchors: vec![RawAnchor {
                    position: [0.0, 0.0, -2.5],
                    radius: 0.25,
                }],
            },
            retries: RetryBudget::default(),
        }
    }

    #[test]
    fn valid_config_passes() {
        let space = ParameterSpace::validate(raw()).unwrap();
        assert_eq!(space.samples_per_model, 2);
        assert!(space.camera.distance.contains(0.04));
        // Degrees were converted.
        assert!(space.camera.view_angles.contains([0.7, -0.7, 0.0]));
        assert!(!space.camera.view_angles.contains([1.0, 0.0, 0.0]));
    }

    #[test]
    fn inverted_distance_range_fails_fast() {
        let mut r = raw();
        r.distance_range = [0.04, 0.0];
        assert!(matches!(
            ParameterSpace::validate(r),
            Err(ConfigError::Range {
                key: "distance_range",
                ..
            })
        ));
    }

    #[test]
    fn missing_anchors_rejected() {
        let mut r = raw();
        r.tool.anchors.clear();
        assert!(matches!(
            ParameterSpace::validate(r),
            Err(ConfigError::MissingAnchors)
        ));
    }

    #[test]
    fn raw_roundtrips_through_json() {
        let r = raw();
        let json = serde_json::to_string(&r).unwrap();
        let back: RawParameterSpace = serde_json::from_str(&json).unwrap();
        assert_eq!(back.tumor_particles.amount, 20);
        assert_eq!(back.tool.anchors.len(), 1);
    }
}
