//! Runner configurations for the matrix-multiply plugin.

use crate::SweepError;
use crate::gpu::{GpuManager, create_mig_instance};
use serde::{Deserialize, Serialize};
use tpc_types::mask::enable_mask_string;
use tpc_types::{CuMask, MigProfile, PartitionMethod};

pub const PLUGIN_FILENAME: &str = "./bin/matrix_multiply.so";
/// Maximum block size, 32x32 = 1024 threads.
pub const THREAD_COUNT: [u32; 2] = [32, 32];
pub const GRANULARITY_MATRIX_WIDTH: u32 = 8192;
pub const CU_MASK_MATRIX_WIDTH: u32 = 1024;
pub const CU_MASK_ITERATIONS: u32 = 100;

/// MPS rounds the active thread percentage down to the TPC count it allows,
/// and the runner keeps at most 4 decimal places of it.
pub const MPS_EPSILON: f64 = 0.0001;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AdditionalInfo {
    pub matrix_width: u32,
    pub skip_copy: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PluginConfig {
    pub label: String,
    pub log_name: String,
    pub filename: String,
    pub thread_count: [u32; 2],
    /// Unused by matrix_multiply.
    pub block_count: u32,
    pub data_size: u64,
    pub additional_info: AdditionalInfo,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mps_thread_percentage: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sm_mask: Option<String>,
}

impl PluginConfig {
    fn matrix_multiply(label: String, log_name: String, matrix_width: u32) -> Self {
        PluginConfig {
            label,
            log_name,
            filename: String::from(PLUGIN_FILENAME),
            thread_count: THREAD_COUNT,
            block_count: 1,
            data_size: 0,
            additional_info: AdditionalInfo {
                matrix_width,
                skip_copy: true,
            },
            mps_thread_percentage: None,
            sm_mask: None,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct BenchmarkConfig {
    pub name: String,
    pub max_iterations: u32,
    pub max_time: u32,
    pub cuda_device: i32,
    /// Required for `mps_thread_percentage`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_processes: Option<bool>,
    pub pin_cpus: bool,
    pub do_warmup: bool,
    pub benchmarks: Vec<PluginConfig>,
}

impl BenchmarkConfig {
    pub fn to_json(&self) -> Result<String, SweepError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// How one run restricts the GPU, derived from the method and TPC counts.
#[derive(Debug, Clone, PartialEq)]
pub enum PartitionSetting {
    Mps { thread_percentage: f64 },
    Libsmctrl { enable_mask: String },
    Mig(MigProfile),
}

impl PartitionSetting {
    /// Computes the setting without touching the GPU. `total` is ignored by MiG.
    pub fn derive(method: PartitionMethod, total: u32, active: u32) -> Result<Self, SweepError> {
        if active == 0 || (!method.is_hardware() && active > total) {
            return Err(SweepError::InvalidActiveCount {
                method,
                active,
                total,
            });
        }
        match method {
            PartitionMethod::Mps => Ok(PartitionSetting::Mps {
                thread_percentage: mps_percentage(total, active),
            }),
            PartitionMethod::Libsmctrl => Ok(PartitionSetting::Libsmctrl {
                enable_mask: enable_mask_string(active),
            }),
            PartitionMethod::Mig => MigProfile::from_tpc_count(active)
                .map(PartitionSetting::Mig)
                .ok_or(SweepError::NoMigProfile(active)),
        }
    }
}

/// The MPS percentage that yields at least `active` of `total` TPCs.
pub fn mps_percentage(total: u32, active: u32) -> f64 {
    let percent = 100.0 * active as f64 / total as f64 + MPS_EPSILON;
    let rounded = (percent * 10_000.0).round() / 10_000.0;
    rounded.min(100.0)
}

/// Builds the configuration for `active` TPCs under `method`.
///
/// For MiG this destroys any existing instance on `device` and creates the
/// matching one through `gpu` before returning.
pub fn generate_config(
    gpu: &mut impl GpuManager,
    device: i32,
    method: PartitionMethod,
    total: u32,
    active: u32,
    iterations: u32,
) -> Result<BenchmarkConfig, SweepError> {
    let setting = PartitionSetting::derive(method, total, active)?;
    let mut plugin = PluginConfig::matrix_multiply(
        active.to_string(),
        format!("eurosys25_{}_{}tpcs.json", method, active),
        GRANULARITY_MATRIX_WIDTH,
    );
    match setting {
        PartitionSetting::Mps { thread_percentage } => {
            plugin.mps_thread_percentage = Some(thread_percentage)
        }
        PartitionSetting::Libsmctrl { enable_mask } => plugin.sm_mask = Some(enable_mask),
        PartitionSetting::Mig(profile) => create_mig_instance(gpu, device, profile)?,
    }
    Ok(BenchmarkConfig {
        name: format!("TPC Count vs. Performance with {}", method),
        max_iterations: iterations,
        max_time: 0,
        cuda_device: device,
        use_processes: Some(true),
        pin_cpus: true,
        do_warmup: true,
        benchmarks: vec![plugin],
    })
}

/// Same as [`generate_config`], with the method given by name.
pub fn generate_config_by_name(
    gpu: &mut impl GpuManager,
    device: i32,
    method: &str,
    total: u32,
    active: u32,
    iterations: u32,
) -> Result<BenchmarkConfig, SweepError> {
    let method: PartitionMethod = method.parse()?;
    generate_config(gpu, device, method, total, active, iterations)
}

/// Configuration for the mask sweep: only the TPC mask varies.
pub fn cu_mask_config(mask: CuMask, striped: bool) -> BenchmarkConfig {
    let hex_mask = mask.hex();
    let log_name = if striped {
        format!("cu_mask_striped_{}.json", hex_mask)
    } else {
        format!("cu_mask_{}.json", hex_mask)
    };
    let mut plugin = PluginConfig::matrix_multiply(
        mask.active_count().to_string(),
        log_name,
        CU_MASK_MATRIX_WIDTH,
    );
    plugin.sm_mask = Some(hex_mask);
    let mut name = String::from("Compute Unit Count vs. Performance");
    if striped {
        name.push_str(" (striped)");
    }
    BenchmarkConfig {
        name,
        max_iterations: CU_MASK_ITERATIONS,
        max_time: 0,
        cuda_device: 0,
        use_processes: None,
        pin_cpus: true,
        do_warmup: true,
        benchmarks: vec![plugin],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpu::tests::RecordingGpu;
    use serde_json::Value;

    #[test]
    fn mps_percentage_bounds() {
        for total in 1..=72u32 {
            for active in 1..=total {
                let p = mps_percentage(total, active);
                let exact = 100.0 * active as f64 / total as f64;
                assert!(p <= 100.0);
                assert!((p - exact).abs() <= MPS_EPSILON + 0.5e-4 + 1e-9, "{} {}", total, active);
                assert_eq!((p * 10_000.0).round() / 10_000.0, p);
            }
        }
        assert_eq!(mps_percentage(54, 54), 100.0);
        assert_eq!(mps_percentage(3, 1), 33.3334);
    }

    #[test]
    fn libsmctrl_config() {
        let mut gpu = RecordingGpu::default();
        let config = generate_config(&mut gpu, 0, PartitionMethod::Libsmctrl, 54, 5, 10).unwrap();
        assert_eq!(config.benchmarks[0].sm_mask.as_deref(), Some("~0x1f"));
        assert_eq!(config.benchmarks[0].mps_thread_percentage, None);
        assert_eq!(config.benchmarks[0].label, "5");
        assert_eq!(config.benchmarks[0].log_name, "eurosys25_libsmctrl_5tpcs.json");
        assert!(gpu.calls.is_empty());
    }

    #[test]
    fn mps_config_json() {
        let mut gpu = RecordingGpu::default();
        let config = generate_config_by_name(&mut gpu, 1, "MPS", 4, 1, 3).unwrap();
        let json: Value = serde_json::from_str(&config.to_json().unwrap()).unwrap();
        assert_eq!(json["name"], "TPC Count vs. Performance with mps");
        assert_eq!(json["max_iterations"], 3);
        assert_eq!(json["cuda_device"], 1);
        assert_eq!(json["use_processes"], true);
        let plugin = &json["benchmarks"][0];
        assert_eq!(plugin["mps_thread_percentage"], 25.0001);
        assert_eq!(plugin["thread_count"], serde_json::json!([32, 32]));
        assert_eq!(plugin["additional_info"]["matrix_width"], 8192);
        assert_eq!(plugin["additional_info"]["skip_copy"], true);
        assert!(plugin.get("sm_mask").is_none());
    }

    #[test]
    fn rejects_bad_counts() {
        let mut gpu = RecordingGpu::default();
        assert!(matches!(
            generate_config(&mut gpu, 0, PartitionMethod::Mps, 10, 11, 1),
            Err(SweepError::InvalidActiveCount { .. })
        ));
        assert!(matches!(
            generate_config(&mut gpu, 0, PartitionMethod::Libsmctrl, 10, 0, 1),
            Err(SweepError::InvalidActiveCount { .. })
        ));
        assert!(matches!(
            generate_config_by_name(&mut gpu, 0, "green", 10, 1, 1),
            Err(SweepError::UnknownMethod(_))
        ));
    }

    #[test]
    fn mig_only_accepts_table_sizes() {
        for active in 1..=54 {
            let setting = PartitionSetting::derive(PartitionMethod::Mig, 54, active);
            if [7, 14, 21, 28, 49].contains(&active) {
                assert!(matches!(setting, Ok(PartitionSetting::Mig(_))));
            } else {
                assert!(matches!(setting, Err(SweepError::NoMigProfile(a)) if a == active));
            }
        }
    }

    #[test]
    fn mig_config_creates_instance() {
        let mut gpu = RecordingGpu::default();
        let config = generate_config(&mut gpu, 0, PartitionMethod::Mig, 0, 14, 10).unwrap();
        let plugin = &config.benchmarks[0];
        assert_eq!(plugin.sm_mask, None);
        assert_eq!(plugin.mps_thread_percentage, None);
        assert!(
            gpu.calls
                .last()
                .unwrap()
                .contains(&String::from("2g.10gb"))
        );
    }

    #[test]
    fn cu_mask_configs() {
        let mask = CuMask::contiguous(4).unwrap();
        let config = cu_mask_config(mask, false);
        let plugin = &config.benchmarks[0];
        assert_eq!(plugin.label, "4");
        assert_eq!(plugin.sm_mask.as_deref(), Some("fffffffffffffff0"));
        assert_eq!(plugin.log_name, "cu_mask_fffffffffffffff0.json");
        assert_eq!(plugin.additional_info.matrix_width, 1024);
        assert_eq!(config.use_processes, None);

        let striped = cu_mask_config(mask, true);
        assert_eq!(striped.name, "Compute Unit Count vs. Performance (striped)");
        assert_eq!(
            striped.benchmarks[0].log_name,
            "cu_mask_striped_fffffffffffffff0.json"
        );
    }
}
