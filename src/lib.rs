pub mod classifier;
pub mod config;
pub mod corpus;
pub mod engine;
pub mod error;
pub mod metric;
pub mod models;
pub mod pipeline;
pub mod recovery;
pub mod reference;
pub mod silhouette;
pub mod tally;

pub use models::{Batch, Classification, Label, ReadingError, Sample, SampleState};
pub use config::{AppConfig, EngineConfig, ExtractorConfig, FinalTally};
pub use engine::{Engine, RunOutcome, RunReport, SampleOutcome};
pub use error::{EngineError, ExtractError};
pub use metric::{HuMomentMetric, MatchMethod, ShapeDistance};
pub use reference::{BaseExemplars, ReferenceStore};
pub use silhouette::{ImageSilhouetteExtractor, Outline, SilhouetteExtractor};
pub use pipeline::{DebugConfig, MetadataValue, Pipeline, PipelineData, PipelineStep};
