//! The TPC granularity sweep: every partition size under every method.

use crate::config::generate_config;
use crate::gpu::GpuManager;
use crate::runner::BenchmarkRunner;
use crate::SweepError;
use itertools::iproduct;
use log::{info, warn};
use smctrl_utils::SmctrlError;
use tpc_types::{MigProfile, PartitionMethod};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SweepMode {
    /// MPS and libsmctrl over `start..=total_tpcs`.
    Software { total_tpcs: u32 },
    /// MiG over the geometry table.
    Mig,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SweepStep {
    pub active: u32,
    pub method: PartitionMethod,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GranularitySweep {
    pub device: i32,
    pub mode: SweepMode,
    pub start: u32,
    pub iterations: u32,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub runs: usize,
    /// Steps whose runner did not exit successfully.
    pub failed: Vec<SweepStep>,
}

/// Checks the command line counts and settles the sweep mode.
///
/// `detect` is only consulted for the software methods, to fill in a
/// missing total or to bound an explicit one.
pub fn resolve_mode(
    tpc_count: Option<i64>,
    start_count: i64,
    mig: bool,
    detect: impl FnOnce() -> Result<u32, SmctrlError>,
) -> Result<(SweepMode, u32), SweepError> {
    if let Some(count) = tpc_count {
        if count <= 0 {
            return Err(SweepError::InvalidTpcCount(
                "The TPC count must be positive and non-zero.",
            ));
        }
    }
    if start_count <= 0 {
        return Err(SweepError::InvalidTpcCount(
            "The starting TPC count must be positive and non-zero.",
        ));
    }
    let start = u32::try_from(start_count)
        .map_err(|_| SweepError::InvalidTpcCount("The starting TPC count is too large."))?;
    if mig {
        return Ok((SweepMode::Mig, start));
    }
    let total_tpcs = match (tpc_count, detect()) {
        (Some(count), Ok(available)) => {
            if count > available as i64 {
                return Err(SweepError::InvalidTpcCount(
                    "The TPC count must not exceed the number of available TPCs.",
                ));
            }
            count as u32
        }
        (Some(count), Err(e)) => {
            info!("Not validating the TPC count: {}", e);
            u32::try_from(count)
                .map_err(|_| SweepError::InvalidTpcCount("The TPC count is too large."))?
        }
        (None, Ok(available)) => {
            println!("Auto-detected {} available TPCs", available);
            available
        }
        (None, Err(e)) => return Err(SweepError::Detection(e)),
    };
    Ok((SweepMode::Software { total_tpcs }, start))
}

impl GranularitySweep {
    pub fn methods(&self) -> Vec<PartitionMethod> {
        match self.mode {
            SweepMode::Software { .. } => PartitionMethod::SOFTWARE.to_vec(),
            SweepMode::Mig => vec![PartitionMethod::Mig],
        }
    }

    pub fn counts(&self) -> Vec<u32> {
        match self.mode {
            SweepMode::Software { total_tpcs } => (self.start..=total_tpcs).collect(),
            SweepMode::Mig => MigProfile::tpc_counts().filter(|c| *c >= self.start).collect(),
        }
    }

    /// Partition sizes in the outer loop, methods in the inner one.
    pub fn steps(&self) -> Vec<SweepStep> {
        iproduct!(self.counts(), self.methods())
            .map(|(active, method)| SweepStep { active, method })
            .collect()
    }

    fn total_tpcs(&self) -> u32 {
        match self.mode {
            SweepMode::Software { total_tpcs } => total_tpcs,
            // Not used by MiG configurations.
            SweepMode::Mig => 0,
        }
    }

    /// Runs every step to completion before starting the next.
    ///
    /// A runner failure is reported and the sweep goes on; configuration
    /// errors (including MiG setup) abort it.
    pub fn run(
        &self,
        gpu: &mut impl GpuManager,
        runner: &mut impl BenchmarkRunner,
    ) -> Result<SweepReport, SweepError> {
        let mut report = SweepReport::default();
        for step in self.steps() {
            println!(
                "Running test for {} active TPCs under {}.",
                step.active, step.method
            );
            let config = generate_config(
                gpu,
                self.device,
                step.method,
                self.total_tpcs(),
                step.active,
                self.iterations,
            )?;
            println!(
                "Starting test with {} TPCs enabled under {}",
                step.active, step.method
            );
            let status = runner.run(&config.to_json()?)?;
            report.runs += 1;
            if !status.success() {
                warn!(
                    "Runner for {} TPCs under {} failed: {}",
                    step.active, step.method, status
                );
                report.failed.push(step);
            }
            println!();
        }
        Ok(report)
    }
}
