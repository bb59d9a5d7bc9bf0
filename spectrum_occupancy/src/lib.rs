/*!
Filtering, numeric derivation and band occupancy for radio-frequency license
assignments.

The pipeline takes the records of an assignment workbook and a
[FilterContext], and produces the [Dashboard]: the options of the filter
cascade, a spectrum chart, status pies, the occupancy of the venue bands and
the table of failed assignments. Every step is a pure function of its inputs.

```
use spectrum_occupancy::builder::{Builder, CapacityBuilder};
use spectrum_occupancy::*;

let names = ColumnNames::default();
let headers: Vec<String> = vec![
    names.request_id.clone(),
    names.venue.clone(),
    names.frequency.clone(),
    names.bandwidth.clone(),
    names.power.clone(),
];
let mut builder = Builder::new(&names, &headers)?;
for (id, center) in [("R-1", 402.0), ("R-2", 403.5)] {
    builder.add_row(vec![
        Cell::Text(id.to_string()),
        Cell::Text("STA".to_string()),
        Cell::Number(center),
        Cell::Number(2000.0),
        Cell::Number(1.0),
    ])?;
}
let cap_headers = vec![
    names.capacity_venue.clone(),
    names.capacity_lower.clone(),
    names.capacity_upper.clone(),
    names.capacity_total.clone(),
];
let mut capacity = CapacityBuilder::new(&names, &cap_headers)?;
capacity.add_row(2, &[
    Cell::Text("STA".to_string()),
    Cell::Number(400.0),
    Cell::Number(410.0),
    Cell::Number(10.0),
]);
let data = Dataset { assignments: builder.build(), capacity: capacity.build() };

let dash = build_dashboard(&data, &FilterContext::default(), &ViewOptions::default());
// [401, 403] and [402.5, 404.5] merge into 3.5 MHz of the 10 MHz band.
assert!((dash.occupancy[0].occupancy_pct - 35.0).abs() < 1e-9);

# Ok::<(), DashboardErrors>(())
```
*/

pub mod builder;
pub mod charts;
mod config;
pub mod derive;
pub mod failures;
pub mod filter;
pub mod occupancy;

use log::info;
use serde::Serialize;
use std::collections::BTreeSet;

pub use crate::charts::*;
pub use crate::config::*;
pub use crate::failures::FailureTable;
pub use crate::filter::CascadeOptions;

#[derive(PartialEq, Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RowCounts {
    pub total: usize,
    pub filtered: usize,
    pub plotted: usize,
}

/// All the views of one render.
#[derive(PartialEq, Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub filters: FilterContext,
    pub options: CascadeOptions,
    pub counts: RowCounts,
    pub spectrum: Rendered<SpectrumChart>,
    pub status: Rendered<PieChart>,
    pub failure_reasons: Rendered<PieChart>,
    pub occupancy: Vec<OccupancyResult>,
    pub occupancy_chart: Rendered<OccupancyChart>,
    pub failures: FailureTable,
    /// Requests attributed outside of their requested tuning range.
    pub tuning_warnings: Vec<String>,
}

/// Runs the whole pipeline for one selection.
pub fn build_dashboard(data: &Dataset, ctx: &FilterContext, options: &ViewOptions) -> Dashboard {
    let cascade = filter::cascade_options(&data.assignments, ctx);
    let filtered = filter::apply(&data.assignments, ctx);
    let rows = derive::derive_rows(&filtered.records, options.power_unit);

    let venues: BTreeSet<String> = filtered
        .records
        .iter()
        .filter_map(|r| r.venue.clone())
        .collect();
    let occupancy = occupancy::compute_occupancy(&rows, &data.capacity, &venues);

    info!(
        "build_dashboard: {} records, {} filtered, {} plotted, {} bands occupied",
        data.assignments.len(),
        filtered.len(),
        rows.len(),
        occupancy.len()
    );

    Dashboard {
        filters: ctx.clone(),
        options: cascade,
        counts: RowCounts {
            total: data.assignments.len(),
            filtered: filtered.len(),
            plotted: rows.len(),
        },
        spectrum: charts::spectrum_chart(&rows, options.power_unit),
        status: charts::status_pie(&filtered.records, &options.coordination_marker),
        failure_reasons: charts::failure_reason_pie(&filtered.records),
        occupancy_chart: charts::occupancy_chart(&occupancy),
        occupancy,
        failures: failures::failure_table(&filtered, options),
        tuning_warnings: derive::tuning_violations(&rows),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn init_logs() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    #[test]
    fn empty_dataset_renders_placeholders() {
        init_logs();
        let dash = build_dashboard(
            &Dataset::default(),
            &FilterContext::default(),
            &ViewOptions::default(),
        );
        assert_eq!(dash.counts.total, 0);
        assert!(dash.spectrum.chart().is_none());
        assert!(dash.status.chart().is_none());
        assert!(dash.failure_reasons.chart().is_none());
        assert!(dash.occupancy_chart.chart().is_none());
        assert!(dash.failures.is_empty());
    }

    #[test]
    fn dashboard_serializes_in_camel_case() {
        init_logs();
        let dash = build_dashboard(
            &Dataset::default(),
            &FilterContext::default(),
            &ViewOptions::default(),
        );
        let js = serde_json::to_value(&dash).unwrap();
        assert_eq!(js["filters"]["period"], "all");
        assert_eq!(js["failureReasons"]["kind"], "noData");
        assert!(js["tuningWarnings"].as_array().unwrap().is_empty());
    }
}
