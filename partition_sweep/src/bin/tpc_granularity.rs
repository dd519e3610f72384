//! Measures matrix-multiply performance under every TPC partition size,
//! varying the partitioning method (MPS and libsmctrl, or MiG).

use clap::Parser;
use log::error;
use partition_sweep::gpu::NvidiaSmi;
use partition_sweep::runner::{DEFAULT_RUNNER, ProcessRunner};
use partition_sweep::sweep::{GranularitySweep, resolve_mode};
use partition_sweep::{SweepError, init_logging};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// The total number of TPCs on the GPU (auto-detected through libsmctrl if omitted).
    #[arg(long, alias = "tpc_count", allow_negative_numbers = true)]
    tpc_count: Option<i64>,

    /// The number of TPCs to start testing from. Can be used to resume tests if one hung.
    #[arg(long, alias = "start_count", default_value_t = 1, allow_negative_numbers = true)]
    start_count: i64,

    /// Run MiG tests instead of MPS and libsmctrl. MiG mode must already be enabled via nvidia-smi.
    #[arg(short, long)]
    mig: bool,

    /// Which GPU to test on.
    #[arg(short, long, default_value_t = 0)]
    device: i32,

    /// How many iterations to run each benchmark (~15m/iteration).
    #[arg(short, long, default_value_t = 10)]
    iterations: u32,

    /// Benchmark runner executable, given the configuration on stdin.
    #[arg(long, default_value = DEFAULT_RUNNER)]
    runner: PathBuf,

    /// Run MiG reconfiguration commands without sudo.
    #[arg(long)]
    no_sudo: bool,
}

fn run(args: Args) -> Result<(), SweepError> {
    let device = args.device;
    let (mode, start) = resolve_mode(args.tpc_count, args.start_count, args.mig, || {
        smctrl_utils::tpc_count_cuda(device)
    })?;
    let sweep = GranularitySweep {
        device,
        mode,
        start,
        iterations: args.iterations,
    };
    let mut gpu = NvidiaSmi {
        sudo: !args.no_sudo,
    };
    let mut runner = ProcessRunner::new(args.runner);
    let report = sweep.run(&mut gpu, &mut runner)?;
    if !report.failed.is_empty() {
        error!(
            "{} of {} runs failed: {:?}",
            report.failed.len(),
            report.runs,
            report.failed
        );
    }
    Ok(())
}

fn main() -> ExitCode {
    init_logging();
    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if let SweepError::Detection(_) = e {
                eprintln!("{} (pass --tpc-count)", e);
            } else {
                eprintln!("{}", e);
            }
            ExitCode::from(e.exit_code())
        }
    }
}
