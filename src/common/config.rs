use serde::{Deserialize, Serialize};

/// Where absent values land when sorting ascending
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NullOrdering {
    NullsFirst,
    NullsLast,
}

/// How absent join keys are matched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NullKeyPolicy {
    /// An absent key matches nothing, not even another absent key
    NeverMatch,
    /// Absent keys match each other
    MatchEachOther,
}

/// Configuration for pipeline evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluationConfig {
    /// Placement of absent sort keys under ascending order.
    /// Descending order reverses it.
    pub null_ordering: NullOrdering,

    /// Matching rule for absent join keys
    pub null_join_keys: NullKeyPolicy,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            null_ordering: NullOrdering::NullsFirst,
            null_join_keys: NullKeyPolicy::NeverMatch,
        }
    }
}
