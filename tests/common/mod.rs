mod fixtures;
pub use fixtures::*;

// Re-export commonly used types from handshape for tests
pub use handshape::{
    BaseExemplars, Batch, EngineConfig, Engine, FinalTally, Label, ReadingError, RunOutcome,
    Sample, SampleState, ShapeDistance,
};
