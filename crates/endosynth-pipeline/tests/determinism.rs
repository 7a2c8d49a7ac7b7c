//! Reproducibility: fixed configuration and base seed must give
//! byte-identical sampled parameters per slot, regardless of worker count.

mod common;

use std::sync::atomic::AtomicBool;

use common::{test_debris, test_models, test_space, test_tool, MemorySink, StubRenderer};
use endosynth_core::TriKernel;
use endosynth_pipeline::{BatchOrchestrator, RenderSettings};
use endosynth_samplers::CameraIntrinsics;

fn run_and_collect(base_seed: u64, workers: usize) -> Vec<(String, usize, String)> {
    let space = test_space(3, base_seed);
    let engine = TriKernel::new();
    let renderer = StubRenderer::new();
    let sink = MemorySink::default();
    let models = test_models(2);
    let cancel = AtomicBool::new(false);

    let orchestrator = BatchOrchestrator {
        space: &space,
        engine: &engine,
        renderer: &renderer,
        sink: &sink,
        intrinsics: CameraIntrinsics::default(),
        settings: RenderSettings::default(),
        workers: Some(workers),
    };
    orchestrator
        .run(&models, &test_tool(), &test_debris(), &cancel)
        .unwrap();

    let mut rows: Vec<(String, usize, String)> = sink
        .persisted
        .lock()
        .unwrap()
        .iter()
        .map(|m| (m.model.clone(), m.sample_index, m.parameters.to_string()))
        .collect();
    // Persistence order depends on scheduling; slot identity does not.
    rows.sort();
    rows
}

#[test]
fn identical_seeds_reproduce_parameters_byte_for_byte() {
    let a = run_and_collect(42, 2);
    let b = run_and_collect(42, 2);
    assert_eq!(a, b);
}

#[test]
fn worker_count_does_not_change_sampled_parameters() {
    let serial = run_and_collect(42, 1);
    let parallel = run_and_collect(42, 4);
    assert_eq!(serial, parallel);
}

#[test]
fn different_base_seeds_diverge() {
    let a = run_and_collect(42, 2);
    let b = run_and_collect(43, 2);
    assert_ne!(a, b);
}
