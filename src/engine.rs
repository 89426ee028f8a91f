//! Batch driver: initial pass, recovery rounds, tally.

use crate::classifier::Classifier;
#[cfg(feature = "parallel")]
use crate::classifier::settle;
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::metric::ShapeDistance;
use crate::models::{Batch, Classification, Label, ReadingError, Sample, SampleState};
use crate::recovery::{RecoveryLoop, RoundOutcome};
use crate::reference::{BaseExemplars, ReferenceStore};
use crate::tally::{Summary, Tally};
use log::{info, warn};
use serde::Serialize;

/// What happened to one sample over the whole run
#[derive(Debug, Clone, Serialize)]
pub struct SampleOutcome {
    pub identifier: String,
    pub truth: Label,
    pub initial: Classification,
    /// Recovery state; absent when the initial prediction was right
    pub recovery: Option<SampleState>,
    pub recovered_round: Option<usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub summary: Summary,
    pub samples: Vec<SampleOutcome>,
    pub rounds: Vec<RoundOutcome>,
    /// False positives still unresolved when the retry budget ran out
    pub unresolved: Vec<String>,
    pub reading_errors: Vec<ReadingError>,
    #[serde(skip)]
    pub tally: Tally,
}

/// Report plus the reference sets as they stood at the end of the run
pub struct RunOutcome<O> {
    pub report: RunReport,
    pub store: ReferenceStore<O>,
}

pub struct Engine<O, M> {
    config: EngineConfig,
    metric: M,
    store: ReferenceStore<O>,
}

impl<O, M> Engine<O, M>
where
    O: Clone + Send + Sync,
    M: ShapeDistance<O>,
{
    pub fn new(
        config: EngineConfig,
        metric: M,
        base: BaseExemplars<O>,
    ) -> Result<Self, EngineError> {
        config.validate()?;
        Ok(Self {
            config,
            metric,
            store: ReferenceStore::new(base),
        })
    }

    /// Classify a batch once. Consumes the engine; the grown store is handed back.
    pub fn run(mut self, batch: Batch<O>) -> Result<RunOutcome<O>, EngineError> {
        let Batch {
            samples,
            reading_errors,
        } = batch;

        let mut tally = Tally::new(self.config.final_tally);
        for _ in &reading_errors {
            tally.record_reading_error();
        }
        for sample in &samples {
            tally.record_population(sample.truth);
        }

        info!(
            "Initial pass over {} samples ({} reading errors)",
            samples.len(),
            reading_errors.len()
        );
        let initial = self.initial_pass(&samples)?;

        let mut queue = Vec::new();
        for (idx, (sample, classification)) in samples.iter().zip(&initial).enumerate() {
            tally.record_initial(sample.truth, classification.label);
            if classification.label != sample.truth {
                queue.push(idx);
            }
        }
        info!("{} false positives after initial pass", queue.len());

        let recovery =
            RecoveryLoop::new(&self.metric, self.config.threshold, self.config.max_retries)
                .run(&mut self.store, &samples, queue)?;
        for entry in recovery.confirmed() {
            tally.record_recovery(samples[entry.sample].truth);
        }

        let mut outcomes: Vec<SampleOutcome> = samples
            .iter()
            .zip(&initial)
            .map(|(sample, classification)| SampleOutcome {
                identifier: sample.identifier.clone(),
                truth: sample.truth,
                initial: *classification,
                recovery: None,
                recovered_round: None,
            })
            .collect();
        for entry in &recovery.entries {
            outcomes[entry.sample].recovery = Some(entry.state);
            outcomes[entry.sample].recovered_round = entry.confirmed_round;
        }

        let unresolved: Vec<String> = recovery
            .pending()
            .map(|entry| samples[entry.sample].identifier.clone())
            .collect();
        if !unresolved.is_empty() {
            warn!(
                "{} samples unresolved after {} recovery rounds",
                unresolved.len(),
                recovery.rounds_run()
            );
        }

        let report = RunReport {
            summary: tally.summary(),
            samples: outcomes,
            rounds: recovery.rounds,
            unresolved,
            reading_errors,
            tally,
        };

        Ok(RunOutcome {
            report,
            store: self.store,
        })
    }

    #[cfg(not(feature = "parallel"))]
    fn initial_pass(&mut self, samples: &[Sample<O>]) -> Result<Vec<Classification>, EngineError> {
        let classifier = Classifier::new(&self.metric, self.config.threshold);
        let store = &mut self.store;

        samples
            .iter()
            .map(|sample| classifier.classify_initial(store, sample))
            .collect()
    }

    /// Scores in parallel against the base exemplars, then confirms in corpus order.
    #[cfg(feature = "parallel")]
    fn initial_pass(&mut self, samples: &[Sample<O>]) -> Result<Vec<Classification>, EngineError> {
        use rayon::prelude::*;

        let classifier = Classifier::new(&self.metric, self.config.threshold);
        let store = &self.store;
        let scores: Vec<Classification> = samples
            .par_iter()
            .map(|sample| classifier.score(store, &sample.outline))
            .collect::<Result<_, _>>()?;

        for (sample, classification) in samples.iter().zip(&scores) {
            settle(&mut self.store, sample, classification);
        }
        Ok(scores)
    }
}
