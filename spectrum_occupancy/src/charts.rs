/*!
Chart descriptions for the dashboard views.

The renderers are pure functions: they turn a prepared table into a
serializable description of the chart (series, bars, slices, axis ranges).
Drawing is left to the consumer of the JSON. An empty input produces a
[Rendered::NoData] placeholder carrying the message to display.
*/

use serde::Serialize;
use std::collections::BTreeMap;

use crate::config::*;

/// The qualitative "Dark24" palette, used for the stakeholders.
pub const DARK24: [&str; 24] = [
    "#2E91E5", "#E15F99", "#1CA71C", "#FB0D0D", "#DA16FF", "#222A2A", "#B68100", "#750D86",
    "#EB663B", "#511CFB", "#00A08B", "#FB00D1", "#FC0080", "#B2828D", "#6C7C32", "#778AAE",
    "#862A16", "#A777F1", "#620042", "#1616A7", "#DA60CA", "#6C4516", "#0D2A63", "#AF0038",
];

/// The qualitative "Set1" palette, used for the failure reasons.
pub const SET1: [&str; 9] = [
    "rgb(228,26,28)",
    "rgb(55,126,184)",
    "rgb(77,175,74)",
    "rgb(152,78,163)",
    "rgb(255,127,0)",
    "rgb(255,255,51)",
    "rgb(166,86,40)",
    "rgb(247,129,191)",
    "rgb(153,153,153)",
];

pub const ASSIGNED: &str = "ASSIGNED";
pub const NOT_ASSIGNED: &str = "NOT ASSIGNED";
pub const COORDINATION_PENDING: &str = "COORDINATION PENDING";

const UNKNOWN_GROUP: &str = "Unknown";

#[derive(PartialEq, Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Rendered<T> {
    Chart(T),
    NoData { message: String },
}

impl<T> Rendered<T> {
    fn no_data(message: &str) -> Rendered<T> {
        Rendered::NoData {
            message: message.to_string(),
        }
    }

    pub fn chart(&self) -> Option<&T> {
        match self {
            Rendered::Chart(c) => Some(c),
            Rendered::NoData { .. } => None,
        }
    }
}

#[derive(PartialEq, Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Axis {
    pub title: String,
    pub min: f64,
    pub max: f64,
}

#[derive(PartialEq, Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpectrumBar {
    pub request_id: String,
    pub center_mhz: f64,
    pub width_mhz: f64,
    pub bandwidth_khz: f64,
    pub power: f64,
}

#[derive(PartialEq, Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpectrumSeries {
    pub name: String,
    pub color: String,
    pub bars: Vec<SpectrumBar>,
}

#[derive(PartialEq, Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpectrumChart {
    pub x_axis: Axis,
    pub y_axis: Axis,
    pub series: Vec<SpectrumSeries>,
}

#[derive(PartialEq, Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PieSlice {
    pub label: String,
    pub count: u64,
    pub percent: f64,
    pub color: String,
}

#[derive(PartialEq, Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PieChart {
    pub title: String,
    pub total: u64,
    pub slices: Vec<PieSlice>,
}

impl PieChart {
    pub fn count(&self, label: &str) -> Option<u64> {
        self.slices.iter().find(|s| s.label == label).map(|s| s.count)
    }
}

#[derive(PartialEq, Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OccupancyBar {
    pub label: String,
    pub venue: String,
    pub occupancy_pct: f64,
}

#[derive(PartialEq, Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OccupancyChart {
    pub x_axis: Axis,
    pub bars: Vec<OccupancyBar>,
}

// Pads a range by 5% of its span, with at least one unit on each side.
fn padded(min: f64, max: f64) -> (f64, f64) {
    let d = ((max - min) * 0.05).max(1.0);
    (min - d, max + d)
}

/// Bars of power at each center frequency, one series per stakeholder.
pub fn spectrum_chart(rows: &[DerivedRow], unit: PowerUnit) -> Rendered<SpectrumChart> {
    if rows.is_empty() {
        return Rendered::no_data("No data available for the selected filters.");
    }
    let min_x = rows.iter().map(|r| r.lower_mhz()).fold(f64::INFINITY, f64::min);
    let max_x = rows.iter().map(|r| r.upper_mhz()).fold(f64::NEG_INFINITY, f64::max);
    let min_y = rows.iter().map(|r| r.power).fold(f64::INFINITY, f64::min);
    let max_y = rows.iter().map(|r| r.power).fold(f64::NEG_INFINITY, f64::max);
    let (x0, x1) = padded(min_x, max_x);
    let (y0, y1) = padded(min_y, max_y);

    let mut groups: BTreeMap<String, Vec<SpectrumBar>> = BTreeMap::new();
    for r in rows {
        let name = r
            .stakeholder
            .clone()
            .unwrap_or_else(|| UNKNOWN_GROUP.to_string());
        groups.entry(name).or_default().push(SpectrumBar {
            request_id: r.request_id.clone(),
            center_mhz: r.center_mhz,
            width_mhz: r.width_mhz,
            bandwidth_khz: r.bandwidth_khz,
            power: r.power,
        });
    }
    let series: Vec<SpectrumSeries> = groups
        .into_iter()
        .enumerate()
        .map(|(i, (name, bars))| SpectrumSeries {
            name,
            color: DARK24[i % DARK24.len()].to_string(),
            bars,
        })
        .collect();

    Rendered::Chart(SpectrumChart {
        x_axis: Axis {
            title: "Frequency (MHz)".to_string(),
            min: x0,
            max: x1,
        },
        y_axis: Axis {
            title: format!("Power ({})", unit.label()),
            min: y0,
            max: y1,
        },
        series,
    })
}

fn slices(counts: &[(String, u64, String)]) -> (u64, Vec<PieSlice>) {
    let total: u64 = counts.iter().map(|(_, c, _)| *c).sum();
    let slices = counts
        .iter()
        .map(|(label, count, color)| PieSlice {
            label: label.clone(),
            count: *count,
            percent: if total > 0 {
                *count as f64 / total as f64 * 100.0
            } else {
                0.0
            },
            color: color.clone(),
        })
        .collect();
    (total, slices)
}

/// Assigned / not assigned / coordination pending.
pub fn status_pie(records: &[AssignmentRecord], coordination_marker: &str) -> Rendered<PieChart> {
    if records.is_empty() {
        return Rendered::no_data("No data to compute the assignment status.");
    }
    let assigned = records.iter().filter(|r| r.is_assigned()).count() as u64;
    let pending = records
        .iter()
        .filter(|r| r.is_coordination_pending(coordination_marker))
        .count() as u64;
    let not_assigned = records.len() as u64 - assigned - pending;

    let mut counts = vec![
        (ASSIGNED.to_string(), assigned, "#2ECC71".to_string()),
        (NOT_ASSIGNED.to_string(), not_assigned, "#E74C3C".to_string()),
    ];
    if pending > 0 {
        counts.push((COORDINATION_PENDING.to_string(), pending, "#F1C40F".to_string()));
    }
    let (total, slices) = slices(&counts);
    Rendered::Chart(PieChart {
        title: "Assignment status".to_string(),
        total,
        slices,
    })
}

/// The breakdown of the failure reasons among the unassigned requests.
pub fn failure_reason_pie(records: &[AssignmentRecord]) -> Rendered<PieChart> {
    let mut by_status: BTreeMap<String, u64> = BTreeMap::new();
    for r in records.iter().filter(|r| !r.is_assigned()) {
        let status = r
            .final_status
            .clone()
            .unwrap_or_else(|| NOT_ANALYSED.to_string());
        *by_status.entry(status).or_insert(0) += 1;
    }
    if by_status.is_empty() {
        return Rendered::no_data("No status data for NOT ASSIGNED requests.");
    }
    let mut sorted: Vec<(String, u64)> = by_status.into_iter().collect();
    // Most frequent first; ties in label order (stable sort over the map order).
    sorted.sort_by(|a, b| b.1.cmp(&a.1));
    let counts: Vec<(String, u64, String)> = sorted
        .into_iter()
        .enumerate()
        .map(|(i, (label, count))| (label, count, SET1[i % SET1.len()].to_string()))
        .collect();
    let (total, slices) = slices(&counts);
    Rendered::Chart(PieChart {
        title: "Analysis of NOT ASSIGNED requests".to_string(),
        total,
        slices,
    })
}

/// Horizontal bars, one per occupied band.
pub fn occupancy_chart(results: &[OccupancyResult]) -> Rendered<OccupancyChart> {
    if results.is_empty() {
        return Rendered::no_data("No capacity/occupancy data for the current filters.");
    }
    let bars = results
        .iter()
        .map(|o| OccupancyBar {
            label: format!("{} ({}-{} MHz)", o.venue, o.lower_mhz, o.upper_mhz),
            venue: o.venue.clone(),
            occupancy_pct: o.occupancy_pct,
        })
        .collect();
    Rendered::Chart(OccupancyChart {
        x_axis: Axis {
            title: "Occupancy (%)".to_string(),
            min: 0.0,
            max: 100.0,
        },
        bars,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(freq: Cell, status: Option<&str>, coordination: Option<&str>) -> AssignmentRecord {
        AssignmentRecord {
            request_id: Some("R".to_string()),
            stakeholder: None,
            venue: Some("STA".to_string()),
            service: None,
            period: None,
            tuning_range: None,
            frequency: freq,
            bandwidth_khz: Cell::Number(25.0),
            power_w: Cell::Number(1.0),
            final_status: status.map(|s| s.to_string()),
            coordination: coordination.map(|s| s.to_string()),
            cells: vec![],
        }
    }

    fn derived(stakeholder: Option<&str>, center: f64, power: f64) -> DerivedRow {
        DerivedRow {
            request_id: format!("R{}", center),
            stakeholder: stakeholder.map(|s| s.to_string()),
            venue: Some("STA".to_string()),
            center_mhz: center,
            width_mhz: 0.2,
            bandwidth_khz: 200.0,
            power,
            tuning_range: None,
        }
    }

    #[test]
    fn empty_inputs_render_no_data() {
        assert!(matches!(spectrum_chart(&[], PowerUnit::Dbm), Rendered::NoData { .. }));
        assert!(matches!(status_pie(&[], "MoD"), Rendered::NoData { .. }));
        assert!(matches!(failure_reason_pie(&[]), Rendered::NoData { .. }));
        assert!(matches!(occupancy_chart(&[]), Rendered::NoData { .. }));
    }

    #[test]
    fn spectrum_groups_by_stakeholder() {
        let rows = vec![
            derived(Some("NBC"), 400.0, 30.0),
            derived(None, 401.0, 30.0),
            derived(Some("BBC"), 402.0, 33.0),
            derived(Some("NBC"), 403.0, 36.0),
        ];
        let chart = spectrum_chart(&rows, PowerUnit::Dbm);
        let c = chart.chart().unwrap();
        let names: Vec<&str> = c.series.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["BBC", "NBC", "Unknown"]);
        assert_eq!(c.series[1].bars.len(), 2);
        assert_eq!(c.series[0].color, DARK24[0]);
        // Spans smaller than 20 units are padded by one unit.
        assert!((c.x_axis.min - 398.9).abs() < 1e-9);
        assert!((c.y_axis.max - 37.0).abs() < 1e-9);
        assert_eq!(c.y_axis.title, "Power (dBm)");
    }

    #[test]
    fn status_pie_counts_pending_separately() {
        let records = vec![
            record(Cell::Number(400.0), None, None),
            record(Cell::Empty, None, Some(" MoD ")),
            record(Cell::Empty, Some("To Be Investigated"), None),
            record(Cell::Empty, None, Some("Other")),
        ];
        let pie = status_pie(&records, "MoD");
        let p = pie.chart().unwrap();
        assert_eq!(p.total, 4);
        assert_eq!(p.count(ASSIGNED), Some(1));
        assert_eq!(p.count(NOT_ASSIGNED), Some(2));
        assert_eq!(p.count(COORDINATION_PENDING), Some(1));
        assert!((p.slices[0].percent - 25.0).abs() < 1e-9);
    }

    #[test]
    fn status_pie_omits_pending_when_absent() {
        let records = vec![record(Cell::Number(400.0), None, None)];
        let pie = status_pie(&records, "MoD");
        let p = pie.chart().unwrap();
        assert_eq!(p.count(NOT_ASSIGNED), Some(0));
        assert_eq!(p.count(COORDINATION_PENDING), None);
    }

    #[test]
    fn failure_reasons_only_cover_unassigned() {
        let records = vec![
            record(Cell::Number(400.0), Some("To Be Investigated"), None),
            record(Cell::Empty, Some("To Be Investigated"), None),
            record(Cell::Empty, None, None),
            record(Cell::Empty, None, None),
            record(Cell::Empty, Some("Contact stakeholder"), None),
        ];
        let pie = failure_reason_pie(&records);
        let p = pie.chart().unwrap();
        assert_eq!(p.total, 4);
        let labels: Vec<&str> = p.slices.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(
            labels,
            vec![NOT_ANALYSED, "Contact stakeholder", "To Be Investigated"]
        );
        assert_eq!(p.slices[0].color, SET1[0]);

        let all_assigned = vec![record(Cell::Number(400.0), None, None)];
        assert!(failure_reason_pie(&all_assigned).chart().is_none());
    }

    #[test]
    fn occupancy_bars_are_labelled_by_band() {
        let results = vec![OccupancyResult {
            venue: "STA".to_string(),
            lower_mhz: 400.0,
            upper_mhz: 410.5,
            total_mhz: 10.5,
            occupied_mhz: 2.1,
            occupancy_pct: 20.0,
        }];
        let chart = occupancy_chart(&results);
        let c = chart.chart().unwrap();
        assert_eq!(c.bars[0].label, "STA (400-410.5 MHz)");
    }

    #[test]
    fn no_data_serializes_with_its_message() {
        let js = serde_json::to_value(occupancy_chart(&[])).unwrap();
        assert_eq!(js["kind"], "noData");
        assert!(js["message"].as_str().unwrap().contains("occupancy"));
    }
}
