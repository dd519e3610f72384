//! MiG instance management through `nvidia-smi`.

use crate::{SweepError, ToolExit};
use log::{info, warn};
use std::process::Command;
use tpc_types::MigProfile;

/// `nvidia-smi` return code for "a query to find an object was unsuccessful",
/// which is what listing MiG profiles yields on GPUs without MiG.
pub const NVIDIA_SMI_NOT_FOUND: i32 = 6;

/// Access to the GPU management tool.
pub trait GpuManager {
    /// Runs `nvidia-smi` with `args`. `privileged` invocations mutate GPU state.
    fn nvidia_smi(&mut self, args: &[&str], privileged: bool) -> std::io::Result<ToolExit>;
}

/// Shells out to the real `nvidia-smi`, through `sudo` for privileged calls
/// unless disabled.
#[derive(Debug, Clone)]
pub struct NvidiaSmi {
    pub sudo: bool,
}

impl Default for NvidiaSmi {
    fn default() -> Self {
        NvidiaSmi { sudo: true }
    }
}

impl GpuManager for NvidiaSmi {
    fn nvidia_smi(&mut self, args: &[&str], privileged: bool) -> std::io::Result<ToolExit> {
        let mut command = if privileged && self.sudo {
            let mut c = Command::new("sudo");
            c.arg("nvidia-smi");
            c
        } else {
            Command::new("nvidia-smi")
        };
        command.args(args);
        info!("Running {:?}", command);
        Ok(command.status()?.into())
    }
}

fn smi(
    gpu: &mut impl GpuManager,
    args: &[&str],
    privileged: bool,
) -> Result<ToolExit, SweepError> {
    gpu.nvidia_smi(args, privileged)
        .map_err(|e| SweepError::io(format!("failed to run nvidia-smi {}", args.join(" ")), e))
}

/// Fails unless `device` lists MiG GPU instance profiles.
pub fn check_mig_capable(gpu: &mut impl GpuManager, device: i32) -> Result<(), SweepError> {
    let device = device.to_string();
    let status = smi(
        gpu,
        &["mig", "-i", &device, "--list-gpu-instance-profiles"],
        false,
    )?;
    match status.code {
        None | Some(NVIDIA_SMI_NOT_FOUND) => Err(SweepError::MigNotCapable),
        Some(_) => Ok(()),
    }
}

/// Replaces whatever MiG instances exist on `device` with a single GPU
/// instance of `profile` and its default compute instance.
pub fn create_mig_instance(
    gpu: &mut impl GpuManager,
    device: i32,
    profile: MigProfile,
) -> Result<(), SweepError> {
    check_mig_capable(gpu, device)?;
    let device = device.to_string();
    // Compute instances are nested in GPU instances and go first. Both fail
    // harmlessly when nothing is configured.
    for destroy in ["--destroy-compute-instance", "--destroy-gpu-instance"] {
        let status = smi(gpu, &["mig", "-i", &device, destroy], true)?;
        if !status.success() {
            warn!("nvidia-smi mig {}: {}", destroy, status);
        }
    }
    let status = smi(
        gpu,
        &[
            "mig",
            "-i",
            &device,
            "--create-gpu-instance",
            profile.geometry(),
            "--default-compute-instance",
        ],
        true,
    )?;
    if !status.success() {
        return Err(SweepError::MigCreation(profile.geometry()));
    }
    Ok(())
}
