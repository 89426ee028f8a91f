use serde::{Deserialize, Serialize};
use std::fmt;

/// Gesture label. `None` is residual: it has no base exemplar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Label {
    None,
    Paper,
    Rock,
    Scissors,
}

impl Label {
    /// All labels, in report order.
    pub const ALL: [Label; 4] = [Label::None, Label::Paper, Label::Rock, Label::Scissors];

    /// Labels that own a base exemplar, in evaluation order (earlier wins ties).
    pub const GESTURES: [Label; 3] = [Label::Paper, Label::Rock, Label::Scissors];

    pub fn index(self) -> usize {
        match self {
            Label::None => 0,
            Label::Paper => 1,
            Label::Rock => 2,
            Label::Scissors => 3,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Label::None => "none",
            Label::Paper => "paper",
            Label::Rock => "rock",
            Label::Scissors => "scissors",
        }
    }

    /// Parse a label name, case-insensitively. Unknown names yield `None`.
    pub fn parse(name: &str) -> Option<Label> {
        Label::ALL
            .into_iter()
            .find(|label| label.name().eq_ignore_ascii_case(name))
    }

    /// Derive the ground truth from a sample identifier such as `rock_12`.
    ///
    /// The prefix up to the first `_` is matched against the label names.
    /// Anything unrecognised (including an empty prefix) is `Label::None`.
    pub fn from_identifier(identifier: &str) -> Label {
        let prefix = identifier.split('_').next().unwrap_or_default();
        Label::parse(prefix).unwrap_or(Label::None)
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One gesture from the corpus, with its extracted outline.
#[derive(Debug, Clone)]
pub struct Sample<O> {
    pub identifier: String,
    pub truth: Label,
    pub outline: O,
}

impl<O> Sample<O> {
    /// Build a sample whose ground truth comes from the identifier prefix.
    pub fn new(identifier: impl Into<String>, outline: O) -> Self {
        let identifier = identifier.into();
        let truth = Label::from_identifier(&identifier);
        Self {
            identifier,
            truth,
            outline,
        }
    }
}

/// A corpus entry that could not be turned into a sample.
#[derive(Debug, Clone, Serialize)]
pub struct ReadingError {
    pub identifier: String,
    pub reason: String,
}

/// The samples of one run, in corpus order.
#[derive(Debug, Clone)]
pub struct Batch<O> {
    pub samples: Vec<Sample<O>>,
    pub reading_errors: Vec<ReadingError>,
}

impl<O> Batch<O> {
    pub fn new(samples: Vec<Sample<O>>) -> Self {
        Self {
            samples,
            reading_errors: Vec::new(),
        }
    }
}

/// Result of scoring one outline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Classification {
    pub label: Label,
    pub distance: f64,
}

/// Lifecycle of a sample that was wrong on the initial pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SampleState {
    Pending,
    Confirmed,
    Exhausted,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_from_identifier() {
        assert_eq!(Label::from_identifier("paper_1"), Label::Paper);
        assert_eq!(Label::from_identifier("rock_2_extra"), Label::Rock);
        assert_eq!(Label::from_identifier("Scissors_07"), Label::Scissors);
        assert_eq!(Label::from_identifier("none_3"), Label::None);
        assert_eq!(Label::from_identifier("lizard_1"), Label::None);
        assert_eq!(Label::from_identifier("_1"), Label::None);
        assert_eq!(Label::from_identifier(""), Label::None);
    }

    #[test]
    fn test_label_without_delimiter() {
        assert_eq!(Label::from_identifier("rock"), Label::Rock);
        assert_eq!(Label::from_identifier("rocky"), Label::None);
    }

    #[test]
    fn test_sample_truth() {
        let sample = Sample::new("scissors_4", ());
        assert_eq!(sample.truth, Label::Scissors);
        assert_eq!(sample.identifier, "scissors_4");
    }
}
