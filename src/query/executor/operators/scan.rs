// Source Scan Operator
//
// This module implements the leaf operator that reads every record of a
// record source in source order.

use std::sync::Arc;

use log::trace;
use parking_lot::Mutex;

use crate::catalog::RecordSource;
use crate::query::executor::operators::{Operator, OperatorRef};
use crate::query::executor::result::{DataValue, QueryError, QueryResult, Record};

/// A scan operator that yields each record of a source as an element
pub struct ScanOperator {
    /// Source to scan
    source: Arc<dyn RecordSource>,
    /// Records snapshotted during init
    rows: Option<std::vec::IntoIter<Record>>,
}

impl ScanOperator {
    pub fn new(source: Arc<dyn RecordSource>) -> Self {
        ScanOperator { source, rows: None }
    }
}

impl Operator for ScanOperator {
    fn init(&mut self) -> QueryResult<()> {
        // Each init takes a fresh snapshot so repeated evaluation sees appends
        let rows = self.source.materialize()?;
        trace!("Scan of '{}' produced {} records", self.source.name(), rows.len());
        self.rows = Some(rows.into_iter());
        Ok(())
    }

    fn next(&mut self) -> QueryResult<Option<DataValue>> {
        match self.rows.as_mut() {
            Some(rows) => Ok(rows.next().map(DataValue::Record)),
            None => Err(QueryError::ExecutionError(format!(
                "Scan of '{}' not initialized",
                self.source.name()
            ))),
        }
    }

    fn close(&mut self) -> QueryResult<()> {
        self.rows = None;
        Ok(())
    }
}

/// Create a scan operator
pub fn create_scan(source: Arc<dyn RecordSource>) -> QueryResult<OperatorRef> {
    Ok(Arc::new(Mutex::new(ScanOperator::new(source))))
}
