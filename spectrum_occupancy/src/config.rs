// ********* Input data structures ***********

use serde::Serialize;
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::Display;

/// A raw spreadsheet value, as produced by the sheet readers.
///
/// Numeric columns are kept raw in the records: the coercion to numbers
/// happens during the derivation, where a failure excludes the row instead of
/// failing the whole render.
#[derive(PartialEq, Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Empty,
    Number(f64),
    Text(String),
}

impl Cell {
    /// Empty cells and whitespace-only strings are both treated as missing.
    pub fn is_empty(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Number(f) => f.is_nan(),
            Cell::Text(s) => s.trim().is_empty(),
        }
    }

    /// Numeric coercion. Anything that does not parse is undefined.
    pub fn as_f64(&self) -> Option<f64> {
        let x = match self {
            Cell::Empty => None,
            Cell::Number(f) => Some(*f),
            Cell::Text(s) => s.trim().parse::<f64>().ok(),
        };
        x.filter(|f| f.is_finite())
    }

    /// The categorical form of the cell, used for filtering and grouping.
    pub fn as_label(&self) -> Option<String> {
        if self.is_empty() {
            return None;
        }
        match self {
            Cell::Text(s) => Some(s.trim().to_string()),
            c => Some(c.to_string()),
        }
    }
}

impl Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Cell::Empty => Ok(()),
            // 101.0 is displayed as 101.
            Cell::Number(x) => write!(f, "{}", x),
            Cell::Text(s) => write!(f, "{}", s),
        }
    }
}

/// One spectrum request.
#[derive(PartialEq, Debug, Clone)]
pub struct AssignmentRecord {
    pub request_id: Option<String>,
    pub stakeholder: Option<String>,
    pub venue: Option<String>,
    pub service: Option<String>,
    pub period: Option<String>,
    /// Requested tuning range (MHz), when both bounds are numeric.
    pub tuning_range: Option<(f64, f64)>,
    /// The attributed center frequency (MHz). Empty means not assigned.
    pub frequency: Cell,
    pub bandwidth_khz: Cell,
    pub power_w: Cell,
    /// The failure reason of an unassigned request.
    pub final_status: Option<String>,
    pub coordination: Option<String>,
    /// The full row, in header order.
    pub cells: Vec<Cell>,
}

impl AssignmentRecord {
    pub fn is_assigned(&self) -> bool {
        !self.frequency.is_empty()
    }

    /// Unassigned and flagged with the coordination marker.
    pub fn is_coordination_pending(&self, marker: &str) -> bool {
        !self.is_assigned()
            && self
                .coordination
                .as_deref()
                .map(|c| c.trim() == marker)
                .unwrap_or(false)
    }
}

/// The assignment sheet: the header and all the records.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct AssignmentTable {
    pub headers: Vec<String>,
    pub records: Vec<AssignmentRecord>,
}

impl AssignmentTable {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h.trim() == name.trim())
    }

    /// A table with the same header and a subset of the records.
    pub fn with_records(&self, records: Vec<AssignmentRecord>) -> AssignmentTable {
        AssignmentTable {
            headers: self.headers.clone(),
            records,
        }
    }
}

/// One frequency band of a venue.
#[derive(PartialEq, Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CapacityRecord {
    pub venue: String,
    pub lower_mhz: f64,
    pub upper_mhz: f64,
    pub total_mhz: f64,
}

/// Everything loaded from a workbook.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct Dataset {
    pub assignments: AssignmentTable,
    pub capacity: Vec<CapacityRecord>,
}

// ******** Derived data structures *********

/// An assignment with all the plotting columns defined.
#[derive(PartialEq, Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedRow {
    pub request_id: String,
    pub stakeholder: Option<String>,
    pub venue: Option<String>,
    pub center_mhz: f64,
    pub width_mhz: f64,
    pub bandwidth_khz: f64,
    /// In the unit of `PowerUnit` used for the derivation.
    pub power: f64,
    #[serde(skip)]
    pub tuning_range: Option<(f64, f64)>,
}

impl DerivedRow {
    pub fn lower_mhz(&self) -> f64 {
        self.center_mhz - self.width_mhz / 2.0
    }

    pub fn upper_mhz(&self) -> f64 {
        self.center_mhz + self.width_mhz / 2.0
    }
}

#[derive(PartialEq, Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OccupancyResult {
    pub venue: String,
    pub lower_mhz: f64,
    pub upper_mhz: f64,
    pub total_mhz: f64,
    pub occupied_mhz: f64,
    pub occupancy_pct: f64,
}

/// Errors that prevent the pipeline from completing.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum DashboardErrors {
    MissingColumns(Vec<String>),
    UnknownFailureStatus(String),
    UnknownPowerUnit(String),
}

impl Error for DashboardErrors {}

impl Display for DashboardErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DashboardErrors::MissingColumns(cols) => {
                write!(f, "Missing required columns: {}", cols.join(", "))
            }
            DashboardErrors::UnknownFailureStatus(s) => {
                write!(
                    f,
                    "Unknown failure status {:?}, expected one of: {}",
                    s,
                    FAILURE_STATUS_OPTIONS.join(", ")
                )
            }
            DashboardErrors::UnknownPowerUnit(s) => {
                write!(f, "Unknown power unit {:?}, expected dbm or w", s)
            }
        }
    }
}

// ********* Configuration **********

/// The header names of the assignment and capacity sheets.
///
/// The defaults are the names used by the spectrum management workbook.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ColumnNames {
    pub frequency: String,
    pub bandwidth: String,
    pub power: String,
    pub request_id: String,
    pub venue: String,
    pub stakeholder: String,
    pub service: String,
    pub period: String,
    pub tuning_lower: String,
    pub tuning_upper: String,
    pub final_status: String,
    pub coordination: String,
    pub capacity_venue: String,
    pub capacity_lower: String,
    pub capacity_upper: String,
    pub capacity_total: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        ColumnNames {
            frequency: "Attributed Frequency TX (MHz)".to_string(),
            bandwidth: "Channel Bandwidth (kHz)".to_string(),
            power: "Transmission Power (W)".to_string(),
            request_id: "Request ID".to_string(),
            venue: "Venue Code".to_string(),
            stakeholder: "Stakeholder ID".to_string(),
            service: "Service Code".to_string(),
            period: "License Period".to_string(),
            tuning_lower: "Tuning Range Min (MHz)".to_string(),
            tuning_upper: "Tuning Range Max (MHz)".to_string(),
            final_status: "FINAL Status".to_string(),
            coordination: "PNRF".to_string(),
            capacity_venue: "Venue Code".to_string(),
            capacity_lower: "Band Lower (MHz)".to_string(),
            capacity_upper: "Band Upper (MHz)".to_string(),
            capacity_total: "Total (MHz)".to_string(),
        }
    }
}

/// The categorical columns of the filter cascade, in cascade order.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Dimension {
    Period,
    Venue,
    Service,
    Stakeholder,
}

impl Dimension {
    pub const CASCADE: [Dimension; 4] = [
        Dimension::Period,
        Dimension::Venue,
        Dimension::Service,
        Dimension::Stakeholder,
    ];

    pub fn value(self, record: &AssignmentRecord) -> Option<&str> {
        match self {
            Dimension::Period => record.period.as_deref(),
            Dimension::Venue => record.venue.as_deref(),
            Dimension::Service => record.service.as_deref(),
            Dimension::Stakeholder => record.stakeholder.as_deref(),
        }
    }
}

/// The state of one selector.
#[derive(Eq, PartialEq, Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Selection {
    All,
    Only(BTreeSet<String>),
}

impl Selection {
    /// An empty list of values selects everything, like a default-all multi-select.
    pub fn from_values<I, S>(values: I) -> Selection
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let set: BTreeSet<String> = values
            .into_iter()
            .map(|s| s.into().trim().to_string())
            .filter(|s| !s.is_empty() && s != "All")
            .collect();
        if set.is_empty() {
            Selection::All
        } else {
            Selection::Only(set)
        }
    }

    pub fn accepts(&self, value: Option<&str>) -> bool {
        match self {
            Selection::All => true,
            Selection::Only(set) => value.map(|v| set.contains(v)).unwrap_or(false),
        }
    }
}

impl Default for Selection {
    fn default() -> Self {
        Selection::All
    }
}

/// The selection of every selector of the cascade.
#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterContext {
    pub period: Selection,
    pub venues: Selection,
    pub services: Selection,
    pub stakeholders: Selection,
}

impl FilterContext {
    pub fn selection(&self, dim: Dimension) -> &Selection {
        match dim {
            Dimension::Period => &self.period,
            Dimension::Venue => &self.venues,
            Dimension::Service => &self.services,
            Dimension::Stakeholder => &self.stakeholders,
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PowerUnit {
    Dbm,
    Watt,
}

impl PowerUnit {
    pub fn parse(s: &str) -> Result<PowerUnit, DashboardErrors> {
        match s.trim().to_lowercase().as_str() {
            "dbm" => Ok(PowerUnit::Dbm),
            "w" | "watt" | "watts" => Ok(PowerUnit::Watt),
            _ => Err(DashboardErrors::UnknownPowerUnit(s.to_string())),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PowerUnit::Dbm => "dBm",
            PowerUnit::Watt => "W",
        }
    }
}

/// The status label given to unassigned requests without a failure reason.
pub const NOT_ANALYSED: &str = "Not Analysed";

/// The choices of the failure table sub-filter.
pub const FAILURE_STATUS_OPTIONS: [&str; 5] = [
    "All",
    "No Spectrum within the requested range",
    "To Be Investigated",
    "Contact stakeholder",
    NOT_ANALYSED,
];

/// Parses the failure table sub-filter. `All` means no filtering.
pub fn parse_failure_status(s: &str) -> Result<Option<String>, DashboardErrors> {
    let s = s.trim();
    match FAILURE_STATUS_OPTIONS.iter().find(|o| o.eq_ignore_ascii_case(s)) {
        Some(&"All") => Ok(None),
        Some(o) => Ok(Some(o.to_string())),
        None => Err(DashboardErrors::UnknownFailureStatus(s.to_string())),
    }
}

/// Options of the views, independent of the filters.
#[derive(PartialEq, Debug, Clone)]
pub struct ViewOptions {
    pub power_unit: PowerUnit,
    /// The value of the coordination column that marks a request as pending
    /// external coordination.
    pub coordination_marker: String,
    pub failure_status: Option<String>,
    /// The projection of the failure table.
    pub failure_columns: Vec<String>,
}

impl Default for ViewOptions {
    fn default() -> Self {
        let names = ColumnNames::default();
        ViewOptions {
            power_unit: PowerUnit::Dbm,
            coordination_marker: "MoD".to_string(),
            failure_status: None,
            failure_columns: vec![
                names.request_id,
                names.stakeholder,
                names.venue,
                names.service,
                names.period,
                names.bandwidth,
                names.power,
                names.final_status,
            ],
        }
    }
}
