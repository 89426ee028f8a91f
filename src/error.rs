use crate::models::Label;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the classification engine and its corpus boundary.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("gesture corpus unavailable: {}", path.display())]
    CorpusUnavailable {
        path: PathBuf,
        #[source]
        source: Option<std::io::Error>,
    },

    #[error("base exemplar directory unreadable: {}", path.display())]
    BaseDirUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("base exemplar for {label} unavailable: {}", path.display())]
    BaseExemplarUnavailable {
        label: Label,
        path: PathBuf,
        #[source]
        source: Option<ExtractError>,
    },

    #[error("failed to read sample {identifier}")]
    SampleDecodeFailure {
        identifier: String,
        #[source]
        source: ExtractError,
    },

    #[error("no reference exemplars stored for {label}")]
    EmptyReferenceSet { label: Label },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Errors raised while turning an image into an outline.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("image decode failed: {0}")]
    Decode(#[from] image::ImageError),

    #[error("image has no silhouette contour")]
    NoSilhouette,

    #[error("pipeline step failed: {0}")]
    Step(String),
}

impl From<anyhow::Error> for ExtractError {
    fn from(err: anyhow::Error) -> Self {
        ExtractError::Step(format!("{err:#}"))
    }
}
