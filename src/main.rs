mod args;
mod dash;

use clap::Parser;
use log::{info, warn};
use snafu::ErrorCompat;

use crate::args::Args;

fn main() {
    let args = Args::parse();

    if args.verbose {
        env_logger::builder()
            .filter_level(log::LevelFilter::Debug)
            .init();
    } else {
        env_logger::init();
    }
    info!("args: {:?}", args);

    if let Err(e) = dash::run_dashboard(&args) {
        warn!("Dashboard failed {:?}", e);
        eprintln!("Error: {}", e);
        if let Some(bt) = ErrorCompat::backtrace(&*e) {
            eprintln!("{}", bt);
        }
        std::process::exit(1);
    }
}
