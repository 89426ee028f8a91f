//! Recovery of samples the initial pass got wrong.
//!
//! Each round visits every pending sample once and compares it only against the
//! current exemplars of its own ground-truth label. A confirmation is appended to the
//! store immediately, so later samples in the same round already see it. Rounds stop
//! when nothing is pending or the retry budget is spent; whatever is still pending
//! then is marked exhausted.

use crate::error::EngineError;
use crate::metric::ShapeDistance;
use crate::models::{Label, Sample, SampleState};
use crate::reference::ReferenceStore;
use log::{debug, info};
use serde::Serialize;

/// One false positive as it moves through the recovery rounds
#[derive(Debug, Clone, Serialize)]
pub struct RecoveryEntry {
    /// Position of the sample in the batch
    pub sample: usize,
    pub state: SampleState,
    /// Round in which the sample was confirmed
    pub confirmed_round: Option<usize>,
    /// Distance measured on the most recent visit
    pub last_distance: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RoundOutcome {
    pub round: usize,
    pub confirmed: Vec<String>,
    pub remaining: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RecoveryReport {
    pub entries: Vec<RecoveryEntry>,
    pub rounds: Vec<RoundOutcome>,
}

impl RecoveryReport {
    pub fn pending(&self) -> impl Iterator<Item = &RecoveryEntry> {
        self.entries
            .iter()
            .filter(|e| matches!(e.state, SampleState::Pending | SampleState::Exhausted))
    }

    pub fn confirmed(&self) -> impl Iterator<Item = &RecoveryEntry> {
        self.entries.iter().filter(|e| e.state == SampleState::Confirmed)
    }

    pub fn rounds_run(&self) -> usize {
        self.rounds.len()
    }
}

pub struct RecoveryLoop<'a, M> {
    metric: &'a M,
    threshold: f64,
    max_retries: usize,
}

impl<'a, M> RecoveryLoop<'a, M> {
    pub fn new(metric: &'a M, threshold: f64, max_retries: usize) -> Self {
        Self {
            metric,
            threshold,
            max_retries,
        }
    }

    /// Retry the queued samples (indices into `samples`, in queue order).
    pub fn run<O>(
        &self,
        store: &mut ReferenceStore<O>,
        samples: &[Sample<O>],
        queue: Vec<usize>,
    ) -> Result<RecoveryReport, EngineError>
    where
        O: Clone,
        M: ShapeDistance<O>,
    {
        let mut entries: Vec<RecoveryEntry> = queue
            .into_iter()
            .map(|sample| RecoveryEntry {
                sample,
                state: SampleState::Pending,
                confirmed_round: None,
                last_distance: None,
            })
            .collect();
        let mut rounds = Vec::new();

        for round in 1..=self.max_retries {
            if !entries.iter().any(|e| e.state == SampleState::Pending) {
                break;
            }

            let mut confirmed = Vec::new();
            for entry in entries.iter_mut().filter(|e| e.state == SampleState::Pending) {
                let sample = &samples[entry.sample];
                let distance = self.own_label_distance(store, sample)?;
                entry.last_distance = distance;

                match distance {
                    Some(d) if d <= self.threshold => {
                        debug!(
                            "round {}: {} confirmed as {} at {:.4}",
                            round, sample.identifier, sample.truth, d
                        );
                        store.confirm(sample.truth, sample.outline.clone());
                        entry.state = SampleState::Confirmed;
                        entry.confirmed_round = Some(round);
                        confirmed.push(sample.identifier.clone());
                    }
                    Some(d) => {
                        debug!("round {}: {} still pending at {:.4}", round, sample.identifier, d);
                    }
                    None => {
                        debug!(
                            "round {}: {} has no {} exemplars yet",
                            round, sample.identifier, sample.truth
                        );
                    }
                }
            }

            let remaining = entries.iter().filter(|e| e.state == SampleState::Pending).count();
            info!(
                "Recovery round {}: {} confirmed, {} remaining",
                round,
                confirmed.len(),
                remaining
            );
            rounds.push(RoundOutcome {
                round,
                confirmed,
                remaining,
            });
        }

        for entry in entries.iter_mut().filter(|e| e.state == SampleState::Pending) {
            entry.state = SampleState::Exhausted;
        }

        Ok(RecoveryReport { entries, rounds })
    }

    /// Distance to the sample's own label; `None` truth uses the residual pool.
    fn own_label_distance<O>(
        &self,
        store: &ReferenceStore<O>,
        sample: &Sample<O>,
    ) -> Result<Option<f64>, EngineError>
    where
        O: Clone,
        M: ShapeDistance<O>,
    {
        match sample.truth {
            Label::None => Ok(store.none_pool_min_distance(&sample.outline, self.metric)),
            label => store.min_distance(label, &sample.outline, self.metric).map(Some),
        }
    }
}
