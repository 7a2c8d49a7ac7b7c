//! End-to-end bound checks over the public sampler API.
//!
//! Mirrors the acceptance scenarios for pose distance/angle limits and the
//! tumor-particle volume cap.

use endosynth_core::{
    AxisRanges, CameraParams, GeometryEngine, ParameterRange, ParticleParams, RetryBudget,
    RotationMode, TriKernel,
};
use endosynth_samplers::pose::{sample_pose, CameraIntrinsics, CentroidTarget};
use endosynth_samplers::{scatter, SurfaceSampling};
use rand::rngs::StdRng;
use rand::SeedableRng;

#[test]
fn pose_scenario_distance_and_angles() {
    // distance_range = [0.0, 0.04], view_angle_max = [45, 45, 45] degrees.
    let kernel = TriKernel::new();
    let anatomy = kernel.icosphere(2, 0.1);
    let camera = CameraParams {
        distance: ParameterRange::new(0.0, 0.04).unwrap(),
        view_angles: AxisRanges::symmetric([
            45f64.to_radians(),
            45f64.to_radians(),
            45f64.to_radians(),
        ])
        .unwrap(),
    };
    let budget = RetryBudget::default();
    let mut rng = StdRng::seed_from_u64(1001);

    for _ in 0..200 {
        let pose = sample_pose(
            &anatomy,
            &kernel,
            &camera,
            &CameraIntrinsics::default(),
            &CentroidTarget,
            &budget,
            &mut rng,
        )
        .expect("pose must be placeable in a spacious cavity");

        let d = (pose.position - pose.target).norm();
        assert!(d <= 0.04 + 1e-12, "distance {d} out of range");
        for (i, a) in pose.angles.iter().enumerate() {
            assert!(
                a.abs() <= 45f64.to_radians() + 1e-12,
                "angle {i} = {a} out of range"
            );
        }
    }
}

#[test]
fn particle_scenario_count_and_volume_cap() {
    // tumor_particles.amount = 20, volume_max = 1e-7.
    let kernel = TriKernel::new();
    let anatomy = kernel.icosphere(2, 0.1);
    let debris = kernel.icosphere(0, 0.003);
    let params = ParticleParams {
        amount: 20,
        volume_max: 1e-7,
        scale: ParameterRange::new(0.5, 2.0).unwrap(),
        rotation: ParameterRange::new(0.0, std::f64::consts::TAU).unwrap(),
        mode: RotationMode::AlignToSurface,
    };
    let mut rng = StdRng::seed_from_u64(1002);

    let out = scatter(
        &anatomy,
        &debris,
        &params,
        SurfaceSampling::ByArea,
        &RetryBudget::default(),
        &mut rng,
    );

    assert!(out.particles.len() <= 20);
    assert_eq!(out.particles.len() + out.shortfall, 20);
    for p in &out.particles {
        assert!(p.volume <= 1e-7, "particle volume {} over cap", p.volume);
    }
}
