use crate::args::Args;
use crate::dash::*;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_FILE_ID: &str = "1y2VzcB93oEJlGxwjBvEIhIdStFooP9O_";
pub const DEFAULT_OUTPUT_FILE: &str = "frequenze.xlsx";
pub const DEFAULT_TTL_SECONDS: u64 = 60;
pub const DEFAULT_ASSIGNMENT_SHEET: &str = "ALL NP";
pub const DEFAULT_CAPACITY_SHEET: &str = "CAPACITY";

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceSettings {
    /// A file hosted on Google Drive.
    #[serde(rename = "fileId")]
    pub file_id: Option<String>,
    pub url: Option<String>,
    /// A local workbook, relative to the configuration file.
    #[serde(rename = "filePath")]
    pub file_path: Option<String>,
    /// Where the downloaded workbook is kept.
    #[serde(rename = "outputFile")]
    pub output_file: Option<String>,
    #[serde(rename = "ttlSeconds")]
    pub ttl_seconds: Option<u64>,
}

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct SheetSettings {
    pub assignments: Option<String>,
    pub capacity: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct ColumnSettings {
    pub frequency: Option<String>,
    pub bandwidth: Option<String>,
    pub power: Option<String>,
    #[serde(rename = "requestId")]
    pub request_id: Option<String>,
    pub venue: Option<String>,
    pub stakeholder: Option<String>,
    pub service: Option<String>,
    pub period: Option<String>,
    #[serde(rename = "tuningLower")]
    pub tuning_lower: Option<String>,
    #[serde(rename = "tuningUpper")]
    pub tuning_upper: Option<String>,
    #[serde(rename = "finalStatus")]
    pub final_status: Option<String>,
    pub coordination: Option<String>,
    #[serde(rename = "capacityVenue")]
    pub capacity_venue: Option<String>,
    #[serde(rename = "capacityLower")]
    pub capacity_lower: Option<String>,
    #[serde(rename = "capacityUpper")]
    pub capacity_upper: Option<String>,
    #[serde(rename = "capacityTotal")]
    pub capacity_total: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct ViewSettings {
    #[serde(rename = "powerUnit")]
    pub power_unit: Option<String>,
    #[serde(rename = "coordinationMarker")]
    pub coordination_marker: Option<String>,
    #[serde(rename = "failureStatus")]
    pub failure_status: Option<String>,
    #[serde(rename = "failureColumns")]
    pub failure_columns: Option<Vec<String>>,
}

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct DashConfig {
    #[serde(default)]
    pub source: SourceSettings,
    #[serde(default)]
    pub sheets: SheetSettings,
    #[serde(default)]
    pub columns: ColumnSettings,
    #[serde(default)]
    pub view: ViewSettings,
}

/// Where the workbook comes from.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum WorkbookSource {
    Drive(String),
    Url(String),
    Local(PathBuf),
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct SheetNames {
    pub assignments: String,
    pub capacity: String,
}

/// The configuration file merged with the command line.
#[derive(PartialEq, Debug, Clone)]
pub struct Settings {
    pub source: WorkbookSource,
    pub output_file: PathBuf,
    pub ttl: Duration,
    pub sheets: SheetNames,
    pub columns: ColumnNames,
    pub view: ViewOptions,
}

pub fn read_config(path: &str) -> DashResult<DashConfig> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let config: DashConfig = serde_json::from_str(&contents).context(ParsingJsonSnafu {})?;
    debug!("read_config: {:?}", config);
    Ok(config)
}

fn or_default(x: &Option<String>, default: String) -> String {
    match x {
        Some(s) if !s.trim().is_empty() => s.trim().to_string(),
        _ => default,
    }
}

fn resolve_columns(cs: &ColumnSettings) -> ColumnNames {
    let d = ColumnNames::default();
    ColumnNames {
        frequency: or_default(&cs.frequency, d.frequency),
        bandwidth: or_default(&cs.bandwidth, d.bandwidth),
        power: or_default(&cs.power, d.power),
        request_id: or_default(&cs.request_id, d.request_id),
        venue: or_default(&cs.venue, d.venue),
        stakeholder: or_default(&cs.stakeholder, d.stakeholder),
        service: or_default(&cs.service, d.service),
        period: or_default(&cs.period, d.period),
        tuning_lower: or_default(&cs.tuning_lower, d.tuning_lower),
        tuning_upper: or_default(&cs.tuning_upper, d.tuning_upper),
        final_status: or_default(&cs.final_status, d.final_status),
        coordination: or_default(&cs.coordination, d.coordination),
        capacity_venue: or_default(&cs.capacity_venue, d.capacity_venue),
        capacity_lower: or_default(&cs.capacity_lower, d.capacity_lower),
        capacity_upper: or_default(&cs.capacity_upper, d.capacity_upper),
        capacity_total: or_default(&cs.capacity_total, d.capacity_total),
    }
}

fn relative_to(root: Option<&Path>, p: &str) -> PathBuf {
    match root {
        Some(r) if Path::new(p).is_relative() => r.join(p),
        _ => PathBuf::from(p),
    }
}

fn resolve_source(src: &SourceSettings, root: Option<&Path>, args: &Args) -> WorkbookSource {
    if let Some(input) = &args.input {
        WorkbookSource::Local(PathBuf::from(input))
    } else if let Some(url) = &args.url {
        WorkbookSource::Url(url.clone())
    } else if let Some(p) = &src.file_path {
        WorkbookSource::Local(relative_to(root, p))
    } else if let Some(url) = &src.url {
        WorkbookSource::Url(url.clone())
    } else {
        WorkbookSource::Drive(or_default(&src.file_id, DEFAULT_FILE_ID.to_string()))
    }
}

fn resolve_view(vs: &ViewSettings, columns: &ColumnNames, args: &Args) -> DashResult<ViewOptions> {
    let d = ViewOptions::default();
    let power_unit = match args.power_unit.as_ref().or(vs.power_unit.as_ref()) {
        Some(s) => PowerUnit::parse(s).context(InvalidOptionSnafu {})?,
        None => d.power_unit,
    };
    let failure_status = match args.failure_status.as_ref().or(vs.failure_status.as_ref()) {
        Some(s) => parse_failure_status(s).context(InvalidOptionSnafu {})?,
        None => None,
    };
    // The default projection follows the configured column names.
    let failure_columns = vs.failure_columns.clone().unwrap_or_else(|| {
        vec![
            columns.request_id.clone(),
            columns.stakeholder.clone(),
            columns.venue.clone(),
            columns.service.clone(),
            columns.period.clone(),
            columns.bandwidth.clone(),
            columns.power.clone(),
            columns.final_status.clone(),
        ]
    });
    Ok(ViewOptions {
        power_unit,
        coordination_marker: or_default(&vs.coordination_marker, d.coordination_marker),
        failure_status,
        failure_columns,
    })
}

impl Settings {
    /// Merges the configuration (if any) with the command line. The command line wins.
    pub fn resolve(config: &DashConfig, config_dir: Option<&Path>, args: &Args) -> DashResult<Settings> {
        let columns = resolve_columns(&config.columns);
        let view = resolve_view(&config.view, &columns, args)?;
        let output_file = relative_to(
            config_dir,
            &or_default(&config.source.output_file, DEFAULT_OUTPUT_FILE.to_string()),
        );
        Ok(Settings {
            source: resolve_source(&config.source, config_dir, args),
            output_file,
            ttl: Duration::from_secs(config.source.ttl_seconds.unwrap_or(DEFAULT_TTL_SECONDS)),
            sheets: SheetNames {
                assignments: or_default(
                    &config.sheets.assignments,
                    DEFAULT_ASSIGNMENT_SHEET.to_string(),
                ),
                capacity: or_default(&config.sheets.capacity, DEFAULT_CAPACITY_SHEET.to_string()),
            },
            columns,
            view,
        })
    }
}

/// The selection made on the command line.
pub fn filter_context(args: &Args) -> FilterContext {
    FilterContext {
        period: Selection::from_values(args.period.iter().cloned()),
        venues: Selection::from_values(args.venue.iter().cloned()),
        services: Selection::from_values(args.service.iter().cloned()),
        stakeholders: Selection::from_values(args.stakeholder.iter().cloned()),
    }
}
