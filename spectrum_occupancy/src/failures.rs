use serde::Serialize;

use crate::config::*;

/// The failed assignments, projected on a fixed set of columns.
#[derive(PartialEq, Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FailureTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl FailureTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Requests without an attributed frequency, except the ones pending
/// external coordination.
pub fn failed_records<'a>(
    records: &'a [AssignmentRecord],
    coordination_marker: &str,
) -> Vec<&'a AssignmentRecord> {
    records
        .iter()
        .filter(|r| !r.is_assigned() && !r.is_coordination_pending(coordination_marker))
        .collect()
}

fn status_matches(record: &AssignmentRecord, status: &str) -> bool {
    record.final_status.as_deref().unwrap_or(NOT_ANALYSED) == status
}

pub fn failure_table(table: &AssignmentTable, options: &ViewOptions) -> FailureTable {
    // Only the projected columns that exist in the sheet.
    let projection: Vec<(String, usize)> = options
        .failure_columns
        .iter()
        .filter_map(|c| table.column_index(c).map(|i| (c.clone(), i)))
        .collect();
    let rows: Vec<Vec<Cell>> = failed_records(&table.records, &options.coordination_marker)
        .into_iter()
        .filter(|r| match &options.failure_status {
            Some(status) => status_matches(r, status),
            None => true,
        })
        .map(|r| {
            projection
                .iter()
                .map(|(_, i)| r.cells.get(*i).cloned().unwrap_or(Cell::Empty))
                .collect()
        })
        .collect();
    FailureTable {
        columns: projection.into_iter().map(|(c, _)| c).collect(),
        rows,
    }
}
