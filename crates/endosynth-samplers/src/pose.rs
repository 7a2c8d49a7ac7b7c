//! Camera pose sampling.
//!
//! A pose is drawn as a distance from the look-at target plus three Euler
//! angles about the base viewing axis, then validated: the camera must sit
//! inside the anatomy cavity (a camera that has left the enclosing volume
//! cannot image it). Rejected draws are resampled up to the configured
//! budget; exhaustion is a typed error so the orchestrator can abandon the
//! sample slot.

use log::debug;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use endosynth_core::{
    CameraParams, GeometryEngine, Mesh, Pt3, Real, RetryBudget, UnitQuat, Vec3,
};

use crate::SamplingError;

/// External camera intrinsics record, consumed opaquely and attached to the
/// pose for the renderer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraIntrinsics {
    /// Focal length, millimeters.
    pub focal_length: Real,
    /// Sensor width, millimeters.
    pub sensor_width: Real,
    /// Sensor height, millimeters.
    pub sensor_height: Real,
}

impl Default for CameraIntrinsics {
    fn default() -> Self {
        Self {
            focal_length: 4.5,
            sensor_width: 6.0,
            sensor_height: 6.0,
        }
    }
}

/// A validated camera pose.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pose {
    pub position: Pt3,
    /// Rotation taking the camera's +Z (view axis) into world frame.
    pub orientation: UnitQuat,
    /// The Euler angles the pose was drawn from, radians, axis order x-y-z.
    pub angles: [Real; 3],
    /// Sampled camera-to-target distance.
    pub distance: Real,
    /// Look-at point the distance and angles are relative to.
    pub target: Pt3,
    pub intrinsics: CameraIntrinsics,
}

/// How the look-at target is chosen relative to the anatomy.
///
/// Injectable so callers can steer the view toward regions of interest;
/// [`CentroidTarget`] is the default.
pub trait TargetStrategy {
    fn target(&self, anatomy: &Mesh, rng: &mut StdRng) -> Pt3;
}

/// Look at the anatomy's vertex centroid.
#[derive(Debug, Default, Clone, Copy)]
pub struct CentroidTarget;

impl TargetStrategy for CentroidTarget {
    fn target(&self, anatomy: &Mesh, _rng: &mut StdRng) -> Pt3 {
        anatomy.vertex_centroid()
    }
}

/// Draw a camera pose within the configured distance and angle ranges.
///
/// The camera is placed at `target + R(angles) * z * distance` and oriented
/// to face the target. A draw whose position falls outside the anatomy
/// volume is rejected and resampled up to `budget.pose` times.
pub fn sample_pose(
    anatomy: &Mesh,
    engine: &dyn GeometryEngine,
    camera: &CameraParams,
    intrinsics: &CameraIntrinsics,
    target_strategy: &dyn TargetStrategy,
    budget: &RetryBudget,
    rng: &mut StdRng,
) -> Result<Pose, SamplingError> {
    for attempt in 0..budget.pose {
        let distance = camera.distance.sample(rng);
        let angles = camera.view_angles.sample(rng);
        let target = target_strategy.target(anatomy, rng);

        let rot = UnitQuat::from_euler_angles(angles[0], angles[1], angles[2]);
        let offset_dir = rot * Vec3::z();
        let position = target + offset_dir * distance;

        if !engine.contains(anatomy, &position) {
            debug!(
                "pose rejected on attempt {attempt}: camera left the cavity at distance {distance:.4}"
            );
            continue;
        }

        // Face the target; at zero distance the draw direction still defines
        // the view axis.
        let orientation = endosynth_core::math::rotation_z_to(&(-offset_dir));

        return Ok(Pose {
            position,
            orientation,
            angles,
            distance,
            target,
            intrinsics: intrinsics.clone(),
        });
    }
    Err(SamplingError::RetriesExhausted {
        what: "pose",
        attempts: budget.pose,
    })
}
