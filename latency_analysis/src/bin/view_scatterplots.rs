//! Plots the min/max/mean latency distributions found in runner result
//! files. Only files whose "label" is a single number are included; one
//! series is drawn per scenario name.

use clap::Parser;
use latency_analysis::aggregate::aggregate_files;
use latency_analysis::inputs::expand_paths;
use latency_analysis::plot::{PlotSettings, build_picture, write_plot};
use latency_analysis::{AnalysisError, DEFAULT_TIMES_KEY, init_logging};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// JSON key name for the time property to be plot.
    #[arg(short = 'k', long, alias = "times_key", default_value = DEFAULT_TIMES_KEY)]
    times_key: String,

    /// Height (in pixels) of the plot.
    #[arg(short = 'v', long, default_value_t = 400)]
    height: u32,

    /// Width (in pixels) of the plot.
    #[arg(short = 'w', long, default_value_t = 600)]
    width: u32,

    /// Directory the .tex and .pdf files are written to.
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// Base name of the output files.
    #[arg(long, default_value = "scatterplot")]
    name: String,

    /// Result files, or directories of result files, to plot.
    #[arg(default_value = "./results")]
    result_file_to_plot: Vec<PathBuf>,
}

fn run(args: Args) -> Result<(), AnalysisError> {
    let files = expand_paths(&args.result_file_to_plot)?;
    let scenarios = aggregate_files(&files, &args.times_key);
    print!("{}", scenarios);
    let settings = PlotSettings {
        width_px: args.width,
        height_px: args.height,
        ..PlotSettings::default()
    };
    let picture = build_picture(&scenarios, &settings);
    write_plot(&picture, &args.output_dir, &args.name)?;
    Ok(())
}

fn main() -> ExitCode {
    init_logging();
    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}
