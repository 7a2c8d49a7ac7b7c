//! Batch orchestration.
//!
//! The orchestrator walks discovered models × requested samples, derives an
//! independent seed per `(model_index, sample_index)` slot, and dispatches
//! slots to a bounded rayon pool sized to the renderer's capacity. Shared
//! anatomy and tool geometry is read-only; each slot works on its own mesh
//! copies and its own random stream, so the sampled parameters are
//! reproducible regardless of worker count or interleaving.
//!
//! Per-slot failures never abort the batch: a degenerate scene or exhausted
//! pose budget triggers a bounded whole-sample regeneration with a fresh
//! derived seed, render and persistence failures mark the slot failed, and
//! the summary accounts for every slot.

use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result};
use log::{debug, info, warn};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use endosynth_core::{GeometryEngine, Mesh, ParameterSpace};
use endosynth_samplers::{CameraIntrinsics, ToolMeshes};

use crate::discovery::AnatomyModel;
use crate::render::{RenderSettings, Renderer};
use crate::scene::generate_sample;
use crate::seed::{derive_retry_seed, derive_seed};
use crate::sink::{OutputSink, SampleMeta};

/// Final state of one sample slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlotOutcome {
    Succeeded {
        /// Whole-sample regenerations that were needed.
        retries: usize,
        particle_shortfall: usize,
        protrusions_skipped: usize,
    },
    Failed {
        reason: String,
        retries: usize,
    },
    /// Batch was cancelled before this slot started.
    Cancelled,
}

/// Audit record for one `(model_index, sample_index)` slot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotRecord {
    pub model_index: usize,
    pub sample_index: usize,
    pub outcome: SlotOutcome,
}

/// Per-model aggregation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelSummary {
    pub model: String,
    pub requested: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub cancelled: usize,
    /// Slots that needed at least one regeneration.
    pub retried: usize,
    pub particle_shortfall: usize,
    pub protrusions_skipped: usize,
}

/// Outcome of a whole batch run; accounts for every slot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchSummary {
    pub models: Vec<ModelSummary>,
    pub slots: Vec<SlotRecord>,
}

impl BatchSummary {
    pub fn succeeded(&self) -> usize {
        self.models.iter().map(|m| m.succeeded).sum()
    }

    pub fn failed(&self) -> usize {
        self.models.iter().map(|m| m.failed).sum()
    }

    pub fn cancelled(&self) -> usize {
        self.models.iter().map(|m| m.cancelled).sum()
    }
}

/// Drives the full pipeline over discovered models and sample slots.
pub struct BatchOrchestrator<'a, E, R, S> {
    pub space: &'a ParameterSpace,
    pub engine: &'a E,
    pub renderer: &'a R,
    pub sink: &'a S,
    pub intrinsics: CameraIntrinsics,
    pub settings: RenderSettings,
    /// Worker pool size; `None` uses the global rayon pool. Size this to
    /// the renderer's capacity, not the CPU count.
    pub workers: Option<usize>,
}

impl<E, R, S> BatchOrchestrator<'_, E, R, S>
where
    E: GeometryEngine + Sync,
    R: Renderer + Sync,
    S: OutputSink + Sync,
{
    /// Run the batch to completion (or cancellation).
    ///
    /// Output clearing, when configured, happens exactly once before any
    /// sample is produced. A clear failure is fatal; everything after that
    /// point is per-slot and recoverable.
    pub fn run(
        &self,
        models: &[AnatomyModel],
        tool: &ToolMeshes,
        debris: &Mesh,
        cancel: &AtomicBool,
    ) -> Result<BatchSummary> {
        if self.space.clear_output {
            self.sink.clear().context("clearing output location")?;
        }

        let slots: Vec<(usize, usize)> = (0..models.len())
            .flat_map(|mi| (0..self.space.samples_per_model).map(move |si| (mi, si)))
            .collect();

        let run_slot = |&(mi, si): &(usize, usize)| self.run_slot(models, tool, debris, cancel, mi, si);

        let records: Vec<SlotRecord> = match self.workers {
            Some(n) => rayon::ThreadPoolBuilder::new()
                .num_threads(n)
                .build()
                .context("building render worker pool")?
                .install(|| slots.par_iter().map(run_slot).collect()),
            None => slots.par_iter().map(run_slot).collect(),
        };

        let summary = summarize(models, self.space.samples_per_model, records);
        info!(
            "batch finished: {} succeeded, {} failed, {} cancelled over {} models",
            summary.succeeded(),
            summary.failed(),
            summary.cancelled(),
            models.len()
        );
        Ok(summary)
    }

    fn run_slot(
        &self,
        models: &[AnatomyModel],
        tool: &ToolMeshes,
        debris: &Mesh,
        cancel: &AtomicBool,
        model_index: usize,
        sample_index: usize,
    ) -> SlotRecord {
        let record = |outcome| SlotRecord {
            model_index,
            sample_index,
            outcome,
        };

        if cancel.load(Ordering::Relaxed) {
            return record(SlotOutcome::Cancelled);
        }

        let model = &models[model_index];
        let slot_seed = derive_seed(self.space.base_seed, model_index, sample_index);
        let mut last_error = String::new();

        for attempt in 0..=self.space.retries.sample {
            let seed = if attempt == 0 {
                slot_seed
            } else {
                derive_retry_seed(slot_seed, attempt)
            };

            let sample = match generate_sample(
                model,
                tool,
                debris,
                self.space,
                self.engine,
                &self.intrinsics,
                seed,
            ) {
                Ok(sample) => sample,
                Err(err) => {
                    debug!(
                        "slot ({model_index}, {sample_index}) attempt {attempt} regenerating: {err}"
                    );
                    last_error = err.to_string();
                    continue;
                }
            };

            let frame = match self.renderer.render(&sample, &self.settings) {
                Ok(frame) => frame,
                Err(err) => {
                    warn!("slot ({model_index}, {sample_index}) render failed: {err}");
                    return record(SlotOutcome::Failed {
                        reason: err.to_string(),
                        retries: attempt,
                    });
                }
            };

            let meta = SampleMeta {
                seed,
                model: model.name.clone(),
                sample_index,
                parameters: sample.parameter_record(),
            };
            return match self.sink.persist(&model.name, sample_index, &frame, &meta) {
                Ok(()) => record(SlotOutcome::Succeeded {
                    retries: attempt,
                    particle_shortfall: sample.particle_shortfall,
                    protrusions_skipped: sample.protrusions_skipped,
                }),
                Err(err) => {
                    warn!("slot ({model_index}, {sample_index}) persist failed: {err}");
                    record(SlotOutcome::Failed {
                        reason: format!("persist: {err}"),
                        retries: attempt,
                    })
                }
            };
        }

        record(SlotOutcome::Failed {
            reason: format!("sample regeneration exhausted: {last_error}"),
            retries: self.space.retries.sample,
        })
    }
}

fn summarize(
    models: &[AnatomyModel],
    samples_per_model: usize,
    slots: Vec<SlotRecord>,
) -> BatchSummary {
    let mut summaries: Vec<ModelSummary> = models
        .iter()
        .map(|m| ModelSummary {
            model: m.name.clone(),
            requested: samples_per_model,
            succeeded: 0,
            failed: 0,
            cancelled: 0,
            retried: 0,
            particle_shortfall: 0,
            protrusions_skipped: 0,
        })
        .collect();

    for slot in &slots {
        let m = &mut summaries[slot.model_index];
        match &slot.outcome {
            SlotOutcome::Succeeded {
                retries,
                particle_shortfall,
                protrusions_skipped,
            } => {
                m.succeeded += 1;
                if *retries > 0 {
                    m.retried += 1;
                }
                m.particle_shortfall += particle_shortfall;
                m.protrusions_skipped += protrusions_skipped;
            }
            SlotOutcome::Failed { retries, .. } => {
                m.failed += 1;
                if *retries > 0 {
                    m.retried += 1;
                }
            }
            SlotOutcome::Cancelled => m.cancelled += 1,
        }
    }

    BatchSummary {
        models: summaries,
        slots,
    }
}
