pub mod config;

pub use self::config::{EvaluationConfig, NullKeyPolicy, NullOrdering};
