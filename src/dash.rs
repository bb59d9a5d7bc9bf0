use log::{debug, info, warn};

use snafu::{prelude::*, Snafu};
use spectrum_occupancy::*;

use std::fs;
use std::path::Path;

use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::args::Args;

pub mod config_reader;
pub mod io_common;
pub mod io_csv;
pub mod io_fetch;
pub mod io_xlsx;
pub mod serve;

use crate::dash::config_reader::*;

#[derive(Debug, Snafu)]
pub enum DashError {
    #[snafu(display("Error opening file {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("Worksheet {sheet:?} not found in {path} (available: {available:?})"))]
    MissingSheet {
        sheet: String,
        path: String,
        available: Vec<String>,
    },
    #[snafu(display("Worksheet {sheet:?} has no header row"))]
    EmptySheet { sheet: String },
    #[snafu(display("Worksheet {sheet:?}: {source}"))]
    InvalidSheet {
        source: DashboardErrors,
        sheet: String,
    },
    #[snafu(display("Error opening file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing json"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Error downloading {url}"))]
    Fetch { source: reqwest::Error, url: String },
    #[snafu(display("Downloading {url} failed with status {status}"))]
    FetchStatus { url: String, status: u16 },
    #[snafu(display("Error writing {path}"))]
    WritingFile {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error writing csv"))]
    CsvWrite { source: csv::Error },
    #[snafu(display("{source}"))]
    InvalidOption { source: DashboardErrors },
    #[snafu(display("Error starting the server on port {port}: {message}"))]
    StartingServer { port: u16, message: String },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type DashResult<T> = Result<T, DashError>;
pub type BDashResult<T> = Result<T, Box<DashError>>;

/// Downloads (if needed) and reads the workbook described by the settings.
pub fn load_dataset(settings: &Settings) -> BDashResult<Dataset> {
    let path = io_fetch::acquire(&settings.source, &settings.output_file, settings.ttl)?;
    io_xlsx::read_workbook(&path, &settings.sheets, &settings.columns)
}

fn write_output(out: &Option<String>, contents: &str) -> DashResult<()> {
    match out.as_deref() {
        None | Some("stdout") | Some("") => {
            println!("{}", contents);
            Ok(())
        }
        Some(path) => {
            info!("Writing dashboard to {:?}", path);
            fs::write(path, contents).context(WritingFileSnafu { path })
        }
    }
}

pub fn read_reference(path: &str) -> DashResult<JSValue> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})
}

/// Compares a rendered dashboard with a reference file, printing the differences.
fn check_reference(js: &JSValue, reference_path: &str) -> DashResult<()> {
    let reference = read_reference(reference_path)?;
    debug!("check_reference: reference: {:?}", reference);
    let pretty_reference = serde_json::to_string_pretty(&reference).context(ParsingJsonSnafu {})?;
    let pretty_js = serde_json::to_string_pretty(js).context(ParsingJsonSnafu {})?;
    if pretty_reference != pretty_js {
        warn!("Found differences with the reference string");
        print_diff(pretty_reference.as_str(), pretty_js.as_str(), "\n");
        whatever!("Difference detected between the computed dashboard and the reference dashboard")
    }
    Ok(())
}

pub fn run_dashboard(args: &Args) -> BDashResult<()> {
    let config = match &args.config {
        Some(p) => read_config(p)?,
        None => DashConfig::default(),
    };
    let config_dir = args.config.as_deref().and_then(|p| Path::new(p).parent());
    let settings = Settings::resolve(&config, config_dir, args)?;
    info!("settings: {:?}", settings);

    if let Some(port) = args.serve {
        return serve::serve(port, settings);
    }

    let data = load_dataset(&settings)?;
    let ctx = filter_context(args);

    if args.list_options {
        let options = filter::cascade_options(&data.assignments, &ctx);
        let js = serde_json::to_string_pretty(&options).context(ParsingJsonSnafu {})?;
        write_output(&args.out, &js)?;
        return Ok(());
    }

    let dash = build_dashboard(&data, &ctx, &settings.view);
    let js = serde_json::to_value(&dash).context(ParsingJsonSnafu {})?;
    let pretty_js = serde_json::to_string_pretty(&js).context(ParsingJsonSnafu {})?;
    write_output(&args.out, &pretty_js)?;

    if let Some(export_path) = &args.export {
        let filtered = filter::apply(&data.assignments, &ctx);
        io_csv::export_csv(&filtered, export_path)?;
    }

    // The reference dashboard, if provided for comparison
    if let Some(reference_path) = &args.reference {
        check_reference(&js, reference_path)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn pipeline_on_a_generated_workbook() {
        let dir = tempfile::tempdir().unwrap();
        let xlsx = dir.path().join("lan.xlsx");
        io_xlsx::tests::write_sample_workbook(&xlsx);
        let out = dir.path().join("dash.json");
        let export = dir.path().join("filtered.csv");
        let args = Args::parse_from([
            "specdash",
            "--input",
            xlsx.to_str().unwrap(),
            "--out",
            out.to_str().unwrap(),
            "--export",
            export.to_str().unwrap(),
            "--period",
            "Olympic",
        ]);
        run_dashboard(&args).unwrap();

        let js: JSValue = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(js["counts"]["total"], 4);
        assert_eq!(js["counts"]["filtered"], 3);
        assert_eq!(js["counts"]["plotted"], 2);
        assert_eq!(js["occupancy"][0]["venue"], "STA");
        assert_eq!(js["occupancyChart"]["kind"], "chart");

        let csv = fs::read_to_string(&export).unwrap();
        assert_eq!(csv.lines().count(), 4);

        // The same run checked against its own output passes.
        let args_ref = Args::parse_from([
            "specdash",
            "--input",
            xlsx.to_str().unwrap(),
            "--out",
            out.to_str().unwrap(),
            "--period",
            "Olympic",
            "--reference",
            out.to_str().unwrap(),
        ]);
        run_dashboard(&args_ref).unwrap();
    }

    #[test]
    fn reference_differences_fail() {
        let dir = tempfile::tempdir().unwrap();
        let reference = dir.path().join("reference.json");
        fs::write(&reference, r#"{"counts": {"total": 1}}"#).unwrap();
        let computed = serde_json::json!({"counts": {}});
        let res = check_reference(&computed, reference.to_str().unwrap());
        assert!(matches!(res, Err(DashError::Whatever { .. })));
    }

    #[test]
    fn missing_sheet_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let xlsx = dir.path().join("lan.xlsx");
        io_xlsx::tests::write_sample_workbook(&xlsx);
        let args = Args::parse_from([
            "specdash",
            "--input",
            xlsx.to_str().unwrap(),
        ]);
        let mut settings = Settings::resolve(&DashConfig::default(), None, &args).unwrap();
        settings.sheets.capacity = "Bands".to_string();
        let err = load_dataset(&settings).unwrap_err();
        assert!(matches!(*err, DashError::MissingSheet { .. }));
        assert!(err.to_string().contains("Bands"));
    }
}
