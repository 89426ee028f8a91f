use crate::config::FinalTally;
use crate::models::Label;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Counters for one ground-truth label
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LabelTally {
    pub initial_successes: usize,
    pub final_successes: usize,
    /// Wrong on the initial pass, whether or not recovered later
    pub false_positives: usize,
    /// Confirmed during recovery
    pub recovered: usize,
    /// Ground-truth population
    pub max_count: usize,
}

/// Per-label outcome counters. Only ever incremented.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tally {
    labels: [LabelTally; 4],
    reading_errors: usize,
    mode: FinalTally,
}

impl Tally {
    pub fn new(mode: FinalTally) -> Self {
        Self {
            labels: [LabelTally::default(); 4],
            reading_errors: 0,
            mode,
        }
    }

    /// Count a sample into its label's population
    pub fn record_population(&mut self, truth: Label) {
        self.labels[truth.index()].max_count += 1;
    }

    /// Count the initial-pass outcome of a sample
    pub fn record_initial(&mut self, truth: Label, predicted: Label) {
        let entry = &mut self.labels[truth.index()];
        if truth == predicted {
            entry.initial_successes += 1;
            entry.final_successes += 1;
        } else {
            entry.false_positives += 1;
        }
    }

    /// Count a confirmation made during recovery
    pub fn record_recovery(&mut self, truth: Label) {
        let entry = &mut self.labels[truth.index()];
        entry.recovered += 1;
        if self.mode == FinalTally::PostRecovery {
            entry.final_successes += 1;
        }
    }

    /// Count a sample that could not be read; it stays out of every label total
    pub fn record_reading_error(&mut self) {
        self.reading_errors += 1;
    }

    pub fn get(&self, label: Label) -> &LabelTally {
        &self.labels[label.index()]
    }

    pub fn reading_errors(&self) -> usize {
        self.reading_errors
    }

    pub fn summary(&self) -> Summary {
        let labels: BTreeMap<Label, LabelSummary> = Label::ALL
            .into_iter()
            .map(|label| {
                let t = *self.get(label);
                let summary = LabelSummary {
                    counts: t,
                    initial_rate: ratio(t.initial_successes, t.max_count),
                    final_rate: ratio(t.final_successes, t.max_count),
                };
                (label, summary)
            })
            .collect();

        let population: usize = self.labels.iter().map(|t| t.max_count).sum();
        let initial_successes: usize = self.labels.iter().map(|t| t.initial_successes).sum();
        let final_successes: usize = self.labels.iter().map(|t| t.final_successes).sum();
        let false_positives: usize = self.labels.iter().map(|t| t.false_positives).sum();
        let recovered: usize = self.labels.iter().map(|t| t.recovered).sum();

        Summary {
            labels,
            population,
            initial_successes,
            final_successes,
            false_positives,
            recovered,
            initial_rate: ratio(initial_successes, population),
            final_rate: ratio(final_successes, population),
            reading_errors: self.reading_errors,
            final_tally: self.mode,
        }
    }
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LabelSummary {
    #[serde(flatten)]
    pub counts: LabelTally,
    pub initial_rate: f64,
    pub final_rate: f64,
}

/// Read-only view of a tally, with success ratios
#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub labels: BTreeMap<Label, LabelSummary>,
    pub population: usize,
    pub initial_successes: usize,
    pub final_successes: usize,
    pub false_positives: usize,
    pub recovered: usize,
    pub initial_rate: f64,
    pub final_rate: f64,
    pub reading_errors: usize,
    pub final_tally: FinalTally,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Gesture Classification Results ===")?;
        writeln!(f, "Samples: {} (reading errors: {})", self.population, self.reading_errors)?;

        writeln!(f, "\nInitial success rate:")?;
        for (label, s) in &self.labels {
            writeln!(
                f,
                "  {:<9} {}/{} ({:.1}%)",
                label.name(),
                s.counts.initial_successes,
                s.counts.max_count,
                s.initial_rate * 100.0
            )?;
        }

        let heading = match self.final_tally {
            FinalTally::InitialOnly => "Final success rate (initial counters):",
            FinalTally::PostRecovery => "Final success rate (after recovery):",
        };
        writeln!(f, "\n{}", heading)?;
        for (label, s) in &self.labels {
            writeln!(
                f,
                "  {:<9} {}/{} ({:.1}%)",
                label.name(),
                s.counts.final_successes,
                s.counts.max_count,
                s.final_rate * 100.0
            )?;
        }

        writeln!(f, "\nFalse positives (recovered):")?;
        for (label, s) in &self.labels {
            writeln!(
                f,
                "  {:<9} {} ({})",
                label.name(),
                s.counts.false_positives,
                s.counts.recovered
            )?;
        }

        write!(
            f,
            "\nOverall: initial {}/{} ({:.1}%), final {}/{} ({:.1}%)",
            self.initial_successes,
            self.population,
            self.initial_rate * 100.0,
            self.final_successes,
            self.population,
            self.final_rate * 100.0
        )
    }
}
