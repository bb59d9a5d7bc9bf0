use log::{debug, warn};

use crate::config::*;

/// Converts a transmission power in watts to dBm.
///
/// Undefined for a power that is not strictly positive.
pub fn power_dbm(watts: f64) -> Option<f64> {
    if watts > 0.0 && watts.is_finite() {
        Some(10.0 * (watts * 1000.0).log10())
    } else {
        None
    }
}

fn derive_row(record: &AssignmentRecord, unit: PowerUnit) -> Option<DerivedRow> {
    let request_id = record.request_id.clone()?;
    let center_mhz = record.frequency.as_f64()?;
    let bandwidth_khz = record.bandwidth_khz.as_f64()?;
    let watts = record.power_w.as_f64()?;
    let power = match unit {
        PowerUnit::Dbm => power_dbm(watts)?,
        PowerUnit::Watt => watts,
    };
    Some(DerivedRow {
        request_id,
        stakeholder: record.stakeholder.clone(),
        venue: record.venue.clone(),
        center_mhz,
        width_mhz: bandwidth_khz / 1000.0,
        bandwidth_khz,
        power,
        tuning_range: record.tuning_range,
    })
}

/// Computes the plotting columns. Rows where one of them cannot be computed
/// are dropped.
pub fn derive_rows(records: &[AssignmentRecord], unit: PowerUnit) -> Vec<DerivedRow> {
    let rows: Vec<DerivedRow> = records
        .iter()
        .filter_map(|r| derive_row(r, unit))
        .collect();
    debug!(
        "derive_rows: kept {} of {} records ({:?})",
        rows.len(),
        records.len(),
        unit
    );
    rows
}

/// The requests whose attributed frequency is outside of the requested
/// tuning range. These rows are kept, only reported.
pub fn tuning_violations(rows: &[DerivedRow]) -> Vec<String> {
    let mut res: Vec<String> = Vec::new();
    for row in rows {
        if let Some((lo, hi)) = row.tuning_range {
            if row.center_mhz < lo.min(hi) || row.center_mhz > lo.max(hi) {
                warn!(
                    "tuning_violations: request {}: {} MHz outside of [{}, {}]",
                    row.request_id, row.center_mhz, lo, hi
                );
                res.push(row.request_id.clone());
            }
        }
    }
    res
}
