use crate::error::EngineError;
use crate::metric::ShapeDistance;
use crate::models::{Classification, Label, Sample};
use crate::reference::ReferenceStore;
use log::debug;

/// Initial-pass classifier: scores an outline against the three base exemplars.
pub struct Classifier<'a, M> {
    metric: &'a M,
    threshold: f64,
}

impl<'a, M> Classifier<'a, M> {
    pub fn new(metric: &'a M, threshold: f64) -> Self {
        Self { metric, threshold }
    }

    /// Score an outline without touching the store.
    ///
    /// The closest base exemplar wins; Paper, Rock, Scissors are tried in that order
    /// and an equal later distance does not displace an earlier one. A best distance
    /// strictly above the threshold is rejected as `None`.
    pub fn score<O>(
        &self,
        store: &ReferenceStore<O>,
        outline: &O,
    ) -> Result<Classification, EngineError>
    where
        O: Clone,
        M: ShapeDistance<O>,
    {
        let mut best: Option<Classification> = None;

        for label in Label::GESTURES {
            let distance = self.metric.distance(outline, store.base(label)?);
            match best {
                Some(current) if distance >= current.distance => {}
                _ => best = Some(Classification { label, distance }),
            }
        }

        let best = best.ok_or(EngineError::EmptyReferenceSet { label: Label::Paper })?;
        if best.distance > self.threshold {
            return Ok(Classification {
                label: Label::None,
                distance: best.distance,
            });
        }
        Ok(best)
    }

    /// Classify a sample and confirm it into the store when the prediction is right.
    pub fn classify_initial<O>(
        &self,
        store: &mut ReferenceStore<O>,
        sample: &Sample<O>,
    ) -> Result<Classification, EngineError>
    where
        O: Clone,
        M: ShapeDistance<O>,
    {
        let classification = self.score(store, &sample.outline)?;
        settle(store, sample, &classification);
        Ok(classification)
    }
}

/// Apply the confirmation side effect of an initial classification.
///
/// Returns whether the sample was confirmed.
pub fn settle<O: Clone>(
    store: &mut ReferenceStore<O>,
    sample: &Sample<O>,
    classification: &Classification,
) -> bool {
    debug!(
        "{}: predicted {} at {:.4} (truth {})",
        sample.identifier, classification.label, classification.distance, sample.truth
    );

    if classification.label != sample.truth {
        return false;
    }
    store.confirm(sample.truth, sample.outline.clone());
    true
}
