// Join Operators Module
//
// This module defines the join operators for query execution in the
// iterator-based execution model.

pub use self::hash_join::HashJoin;

mod hash_join;

use std::sync::Arc;

use parking_lot::Mutex;

use crate::common::config::NullKeyPolicy;
use crate::query::executor::operators::OperatorRef;
use crate::query::executor::result::QueryResult;
use crate::query::expression::ast::Expression;
use crate::query::operation::{JoinMode, JoinSelector};

/// Create a hash join operator
pub fn create_hash_join(
    outer: OperatorRef,
    inner: OperatorRef,
    outer_key: Expression,
    inner_key: Expression,
    mode: JoinMode,
    selector: JoinSelector,
    null_keys: NullKeyPolicy,
) -> QueryResult<OperatorRef> {
    Ok(Arc::new(Mutex::new(HashJoin::new(
        outer, inner, outer_key, inner_key, mode, selector, null_keys,
    ))))
}
