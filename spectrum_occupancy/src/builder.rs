pub use crate::config::*;

use log::{debug, warn};

/// A builder for the assignment table.
///
/// The header is checked once against the expected column names; rows are then
/// added in sheet order.
///
/// ```
/// use spectrum_occupancy::builder::Builder;
/// use spectrum_occupancy::{Cell, ColumnNames};
/// # use spectrum_occupancy::DashboardErrors;
///
/// let names = ColumnNames::default();
/// let headers: Vec<String> = vec![
///     names.request_id.clone(),
///     names.venue.clone(),
///     names.frequency.clone(),
///     names.bandwidth.clone(),
///     names.power.clone(),
/// ];
/// let mut builder = Builder::new(&names, &headers)?;
/// builder.add_row(vec![
///     Cell::Text("R-1".to_string()),
///     Cell::Text("STA".to_string()),
///     Cell::Number(402.5),
///     Cell::Number(25.0),
///     Cell::Number(5.0),
/// ])?;
/// let table = builder.build();
/// assert_eq!(table.len(), 1);
/// assert!(table.records[0].is_assigned());
///
/// # Ok::<(), DashboardErrors>(())
/// ```
pub struct Builder {
    idx: AssignmentColumns,
    headers: Vec<String>,
    records: Vec<AssignmentRecord>,
}

// The positions of the known columns in the header.
struct AssignmentColumns {
    frequency: usize,
    bandwidth: usize,
    power: usize,
    request_id: usize,
    venue: usize,
    stakeholder: Option<usize>,
    service: Option<usize>,
    period: Option<usize>,
    tuning_lower: Option<usize>,
    tuning_upper: Option<usize>,
    final_status: Option<usize>,
    coordination: Option<usize>,
}

fn find_column(headers: &[String], name: &str) -> Option<usize> {
    headers.iter().position(|h| h.trim() == name.trim())
}

// Looks up all the required columns, collecting every missing one.
fn require_columns(headers: &[String], names: &[&String]) -> Result<Vec<usize>, DashboardErrors> {
    let mut found: Vec<usize> = Vec::new();
    let mut missing: Vec<String> = Vec::new();
    for name in names {
        match find_column(headers, name) {
            Some(i) => found.push(i),
            None => missing.push(name.to_string()),
        }
    }
    if missing.is_empty() {
        Ok(found)
    } else {
        Err(DashboardErrors::MissingColumns(missing))
    }
}

fn cell_at(cells: &[Cell], idx: Option<usize>) -> &Cell {
    idx.and_then(|i| cells.get(i)).unwrap_or(&Cell::Empty)
}

fn label_at(cells: &[Cell], idx: Option<usize>) -> Option<String> {
    cell_at(cells, idx).as_label()
}

impl Builder {
    pub fn new(names: &ColumnNames, headers: &[String]) -> Result<Builder, DashboardErrors> {
        let required = require_columns(
            headers,
            &[
                &names.frequency,
                &names.bandwidth,
                &names.power,
                &names.request_id,
                &names.venue,
            ],
        )?;
        let idx = AssignmentColumns {
            frequency: required[0],
            bandwidth: required[1],
            power: required[2],
            request_id: required[3],
            venue: required[4],
            stakeholder: find_column(headers, &names.stakeholder),
            service: find_column(headers, &names.service),
            period: find_column(headers, &names.period),
            tuning_lower: find_column(headers, &names.tuning_lower),
            tuning_upper: find_column(headers, &names.tuning_upper),
            final_status: find_column(headers, &names.final_status),
            coordination: find_column(headers, &names.coordination),
        };
        debug!(
            "Builder::new: optional columns: stakeholder {:?} service {:?} period {:?}",
            idx.stakeholder, idx.service, idx.period
        );
        Ok(Builder {
            idx,
            headers: headers.iter().map(|h| h.trim().to_string()).collect(),
            records: Vec::new(),
        })
    }

    /// Adds a row of the sheet. Rows where every cell is empty are skipped.
    pub fn add_row(&mut self, mut cells: Vec<Cell>) -> Result<(), DashboardErrors> {
        if cells.iter().all(|c| c.is_empty()) {
            return Ok(());
        }
        cells.resize(self.headers.len().max(cells.len()), Cell::Empty);
        let idx = &self.idx;
        let tuning_range = match (
            cell_at(&cells, idx.tuning_lower).as_f64(),
            cell_at(&cells, idx.tuning_upper).as_f64(),
        ) {
            (Some(lo), Some(hi)) => Some((lo, hi)),
            _ => None,
        };
        let record = AssignmentRecord {
            request_id: label_at(&cells, Some(idx.request_id)),
            stakeholder: label_at(&cells, idx.stakeholder),
            venue: label_at(&cells, Some(idx.venue)),
            service: label_at(&cells, idx.service),
            period: label_at(&cells, idx.period),
            tuning_range,
            frequency: cell_at(&cells, Some(idx.frequency)).clone(),
            bandwidth_khz: cell_at(&cells, Some(idx.bandwidth)).clone(),
            power_w: cell_at(&cells, Some(idx.power)).clone(),
            final_status: label_at(&cells, idx.final_status),
            coordination: label_at(&cells, idx.coordination),
            cells,
        };
        self.records.push(record);
        Ok(())
    }

    pub fn build(self) -> AssignmentTable {
        AssignmentTable {
            headers: self.headers,
            records: self.records,
        }
    }
}

/// A builder for the capacity sheet.
pub struct CapacityBuilder {
    venue: usize,
    lower: usize,
    upper: usize,
    total: usize,
    records: Vec<CapacityRecord>,
}

impl CapacityBuilder {
    pub fn new(names: &ColumnNames, headers: &[String]) -> Result<CapacityBuilder, DashboardErrors> {
        let idx = require_columns(
            headers,
            &[
                &names.capacity_venue,
                &names.capacity_lower,
                &names.capacity_upper,
                &names.capacity_total,
            ],
        )?;
        Ok(CapacityBuilder {
            venue: idx[0],
            lower: idx[1],
            upper: idx[2],
            total: idx[3],
            records: Vec::new(),
        })
    }

    /// Adds a band. Rows without a venue or with non-numeric bounds are skipped.
    pub fn add_row(&mut self, lineno: usize, cells: &[Cell]) {
        if cells.iter().all(|c| c.is_empty()) {
            return;
        }
        let venue = label_at(cells, Some(self.venue));
        let lower = cell_at(cells, Some(self.lower)).as_f64();
        let upper = cell_at(cells, Some(self.upper)).as_f64();
        let total = cell_at(cells, Some(self.total)).as_f64();
        match (venue, lower, upper, total) {
            (Some(venue), Some(lower_mhz), Some(upper_mhz), Some(total_mhz)) => {
                self.records.push(CapacityRecord {
                    venue,
                    lower_mhz,
                    upper_mhz,
                    total_mhz,
                });
            }
            x => {
                warn!("CapacityBuilder: line {}: skipping band {:?}", lineno, x);
            }
        }
    }

    pub fn build(self) -> Vec<CapacityRecord> {
        self.records
    }
}
