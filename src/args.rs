use clap::Parser;

/// This is a dashboard program for radio-frequency license assignments.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) The JSON file describing the workbook source, the sheet and column names
    /// and the view options. All the entries are optional.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (file path, optional) A local workbook to read. Setting this option overrides the source
    /// that may be specified with the --config option, and nothing is downloaded.
    #[clap(short, long, value_parser)]
    pub input: Option<String>,

    /// (url, optional) The location of the workbook to download. Setting this option overrides
    /// the source that may be specified with the --config option.
    #[clap(long, value_parser)]
    pub url: Option<String>,

    /// (file path, 'stdout' or empty) Where to write the dashboard in JSON format.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path, optional) If specified, the filtered assignments are also written to this
    /// location in CSV format.
    #[clap(short, long, value_parser)]
    pub export: Option<String>,

    /// (file path) A reference file containing a dashboard in JSON format. If provided, specdash will
    /// check that the computed dashboard matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// (default all) The license period to select.
    #[clap(long, value_parser)]
    pub period: Option<String>,

    /// (repeatable, default all) The venue codes to select.
    #[clap(long, value_parser)]
    pub venue: Vec<String>,

    /// (repeatable, default all) The service codes to select.
    #[clap(long, value_parser)]
    pub service: Vec<String>,

    /// (repeatable, default all) The stakeholders to select.
    #[clap(long, value_parser)]
    pub stakeholder: Vec<String>,

    /// (default All) Restricts the failed assignments to one status.
    #[clap(long, value_parser)]
    pub failure_status: Option<String>,

    /// (dbm or w, default dbm) The unit of the power axis of the spectrum chart.
    #[clap(long, value_parser)]
    pub power_unit: Option<String>,

    /// If passed as an argument, prints the options of every filter for the current selection
    /// instead of the dashboard.
    #[clap(long, takes_value = false)]
    pub list_options: bool,

    /// (port, optional) Serves the dashboard over HTTP on this port instead of rendering it once.
    #[clap(long, value_parser)]
    pub serve: Option<u16>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
