//! The compute unit mask sweep: the same benchmark under growing TPC masks,
//! optionally striped across GPCs.

use crate::config::cu_mask_config;
use crate::runner::BenchmarkRunner;
use crate::SweepError;
use log::{info, warn};
use smctrl_utils::SmctrlError;
use tpc_types::CuMask;

/// Checks the command line CU count, or detects it when missing.
pub fn resolve_total(
    cu_count: Option<i64>,
    detect: impl FnOnce() -> Result<u32, SmctrlError>,
) -> Result<u32, SweepError> {
    if let Some(count) = cu_count {
        if count <= 0 {
            return Err(SweepError::InvalidTpcCount("The CU count must be positive."));
        }
    }
    match (cu_count, detect()) {
        (Some(count), Ok(available)) => {
            if count > available as i64 {
                return Err(SweepError::InvalidTpcCount(
                    "The CU count must not exceed the number of available TPCs.",
                ));
            }
            Ok(count as u32)
        }
        (Some(count), Err(e)) => {
            info!("Not validating the CU count: {}", e);
            u32::try_from(count).map_err(|_| SweepError::InvalidTpcCount("The CU count is too large."))
        }
        (None, Ok(available)) => {
            println!("Auto-detected a cu_count of {}", available);
            Ok(available)
        }
        (None, Err(e)) => Err(SweepError::Detection(e)),
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CuMaskSweep {
    pub total: u32,
    /// Number of TPCs already covered, for resuming.
    pub start: u32,
    /// Per-GPC TPC masks when striping, `None` for contiguous masks.
    pub gpcs: Option<Vec<u64>>,
}

impl CuMaskSweep {
    pub fn mask(&self, active: u32) -> Result<CuMask, SweepError> {
        Ok(match &self.gpcs {
            Some(gpcs) => CuMask::striped(active, gpcs)?,
            None => CuMask::contiguous(active)?,
        })
    }

    /// Masks for `start + 1` up to `total` enabled TPCs.
    pub fn masks(&self) -> Result<Vec<CuMask>, SweepError> {
        (self.start..self.total).map(|a| self.mask(a + 1)).collect()
    }

    pub fn run(&self, runner: &mut impl BenchmarkRunner) -> Result<usize, SweepError> {
        let striped = self.gpcs.is_some();
        let mut failures = 0;
        for (active, mask) in (self.start..self.total).zip(self.masks()?) {
            println!("Running test for {} (+ 1) active CUs.", active);
            println!("Starting test with CU mask {}", mask);
            let status = runner.run(&cu_mask_config(mask, striped).to_json()?)?;
            if !status.success() {
                warn!("Runner for CU mask {} failed: {}", mask, status);
                failures += 1;
            }
            println!("\n");
        }
        Ok(failures)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::tests::RecordingRunner;
    use serde_json::Value;

    #[test]
    fn cu_count_validation() {
        for count in [0, -1] {
            let e = resolve_total(Some(count), || Ok(54)).unwrap_err();
            assert_eq!(e.exit_code(), 22);
        }
        assert_eq!(resolve_total(Some(55), || Ok(54)).unwrap_err().exit_code(), 22);
        assert_eq!(resolve_total(Some(54), || Ok(54)).unwrap(), 54);
        assert_eq!(resolve_total(None, || Ok(36)).unwrap(), 36);
        assert_eq!(
            resolve_total(Some(80), || Err(SmctrlError::Unavailable)).unwrap(),
            80
        );
        let e = resolve_total(None, || Err(SmctrlError::Unavailable)).unwrap_err();
        assert!(matches!(e, SweepError::Detection(SmctrlError::Unavailable)));
        assert_eq!(e.exit_code(), 1);
    }

    #[test]
    fn contiguous_sweep() {
        let sweep = CuMaskSweep {
            total: 3,
            start: 0,
            gpcs: None,
        };
        let mut runner = RecordingRunner::default();
        assert_eq!(sweep.run(&mut runner).unwrap(), 0);
        let masks: Vec<Value> = runner
            .configs
            .iter()
            .map(|c| serde_json::from_str::<Value>(c).unwrap()["benchmarks"][0]["sm_mask"].clone())
            .collect();
        assert_eq!(
            masks,
            vec![
                "fffffffffffffffe",
                "fffffffffffffffc",
                "fffffffffffffff8"
            ]
        );
    }

    #[test]
    fn striped_sweep_resumes() {
        let sweep = CuMaskSweep {
            total: 4,
            start: 2,
            gpcs: Some(vec![0x3, 0xc]),
        };
        let masks = sweep.masks().unwrap();
        assert_eq!(masks.len(), 2);
        assert_eq!(masks[0].enabled(), 0x7);
        assert_eq!(masks[1].enabled(), 0xf);
    }

    #[test]
    fn striping_beyond_available() {
        let sweep = CuMaskSweep {
            total: 3,
            start: 0,
            gpcs: Some(vec![0x1, 0x2]),
        };
        assert!(matches!(sweep.masks(), Err(SweepError::Mask(_))));
    }
}
