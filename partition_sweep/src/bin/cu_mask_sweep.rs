//! Measures matrix-multiply performance under growing compute unit masks.

use clap::Parser;
use partition_sweep::cu_mask::{CuMaskSweep, resolve_total};
use partition_sweep::runner::{DEFAULT_RUNNER, ProcessRunner};
use partition_sweep::{SweepError, init_logging};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// The total number of CUs (TPCs) on the GPU (auto-detected through libsmctrl if omitted).
    #[arg(long, alias = "cu_count", allow_negative_numbers = true)]
    cu_count: Option<i64>,

    /// The number of CUs to start testing from. Can be used to resume tests if one hung.
    #[arg(long, alias = "start_count", default_value_t = 0)]
    start_count: u32,

    /// "Stripe" TPC assignment round-robin across GPCs (requires libsmctrl and nvdebug).
    #[arg(short, long)]
    stripe: bool,

    /// Which GPU to pull the TPC and striping configuration from.
    #[arg(short, long, default_value_t = 0)]
    device: i32,

    /// Benchmark runner executable, given the configuration on stdin.
    #[arg(long, default_value = DEFAULT_RUNNER)]
    runner: PathBuf,
}

fn run(args: Args) -> Result<(), SweepError> {
    let device = args.device;
    let total = resolve_total(args.cu_count, || smctrl_utils::tpc_count(device))?;
    let gpcs = if args.stripe {
        Some(smctrl_utils::gpc_masks(args.device).map_err(SweepError::Detection)?)
    } else {
        None
    };
    let sweep = CuMaskSweep {
        total,
        start: args.start_count,
        gpcs,
    };
    let failures = sweep.run(&mut ProcessRunner::new(args.runner))?;
    if failures != 0 {
        log::error!("{} runs failed", failures);
    }
    Ok(())
}

fn main() -> ExitCode {
    init_logging();
    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if let SweepError::Detection(_) = e {
                eprintln!("{} (pass --cu-count)", e);
            } else {
                eprintln!("{}", e);
            }
            ExitCode::from(e.exit_code())
        }
    }
}
