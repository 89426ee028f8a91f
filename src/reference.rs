//! Append-only store of confirmed exemplars, one set per label.
//!
//! Outlines live in a single arena; each label keeps the arena indices of its
//! exemplars in confirmation order. Nothing is ever removed.

use crate::error::EngineError;
use crate::metric::ShapeDistance;
use crate::models::Label;

/// The three base exemplars a run starts from
#[derive(Debug, Clone)]
pub struct BaseExemplars<O> {
    pub paper: O,
    pub rock: O,
    pub scissors: O,
}

impl<O> BaseExemplars<O> {
    /// Base exemplar for a gesture label; `None` has none.
    pub fn get(&self, label: Label) -> Option<&O> {
        match label {
            Label::None => None,
            Label::Paper => Some(&self.paper),
            Label::Rock => Some(&self.rock),
            Label::Scissors => Some(&self.scissors),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReferenceStore<O> {
    arena: Vec<O>,
    sets: [Vec<usize>; 4],
}

impl<O: Clone> ReferenceStore<O> {
    /// Seed Paper, Rock and Scissors with their base exemplar. The None pool starts empty.
    pub fn new(base: BaseExemplars<O>) -> Self {
        let mut store = Self {
            arena: Vec::with_capacity(3),
            sets: Default::default(),
        };
        store.confirm(Label::Paper, base.paper);
        store.confirm(Label::Rock, base.rock);
        store.confirm(Label::Scissors, base.scissors);
        store
    }

    /// Append an outline to a label's set. Duplicates are kept.
    pub fn confirm(&mut self, label: Label, outline: O) {
        let idx = self.arena.len();
        self.arena.push(outline);
        self.sets[label.index()].push(idx);
    }

    /// The first exemplar stored under a gesture label.
    pub fn base(&self, label: Label) -> Result<&O, EngineError> {
        if label == Label::None {
            return Err(EngineError::EmptyReferenceSet { label });
        }
        self.exemplars(label)
            .next()
            .ok_or(EngineError::EmptyReferenceSet { label })
    }

    /// Exemplars of a label, in confirmation order.
    pub fn exemplars(&self, label: Label) -> impl Iterator<Item = &O> + '_ {
        self.sets[label.index()].iter().map(|&idx| &self.arena[idx])
    }

    pub fn len(&self, label: Label) -> usize {
        self.sets[label.index()].len()
    }

    /// Smallest distance between `outline` and any exemplar of a gesture label.
    ///
    /// Fails for `Label::None` and for labels with no exemplars.
    pub fn min_distance<M: ShapeDistance<O>>(
        &self,
        label: Label,
        outline: &O,
        metric: &M,
    ) -> Result<f64, EngineError> {
        if label == Label::None {
            return Err(EngineError::EmptyReferenceSet { label });
        }
        self.pool_min_distance(label, outline, metric)
            .ok_or(EngineError::EmptyReferenceSet { label })
    }

    /// Smallest distance to the residual pool of samples confirmed as None, if any.
    pub fn none_pool_min_distance<M: ShapeDistance<O>>(
        &self,
        outline: &O,
        metric: &M,
    ) -> Option<f64> {
        self.pool_min_distance(Label::None, outline, metric)
    }

    fn pool_min_distance<M: ShapeDistance<O>>(
        &self,
        label: Label,
        outline: &O,
        metric: &M,
    ) -> Option<f64> {
        self.exemplars(label)
            .map(|exemplar| metric.distance(outline, exemplar))
            .fold(None, |best: Option<f64>, d| match best {
                Some(b) if b <= d => Some(b),
                _ => Some(d),
            })
    }
}
