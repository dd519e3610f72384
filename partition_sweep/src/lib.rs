//! Sweeps a matrix-multiply benchmark over GPU TPC partition sizes.
//!
//! Each step builds a runner configuration ([`config`]), applies any
//! out-of-band partitioning ([`gpu`]) and hands the configuration to the
//! external runner ([`runner`]), one run at a time ([`sweep`]).

pub mod config;
pub mod cu_mask;
pub mod error;
pub mod gpu;
pub mod runner;
pub mod sweep;

pub use error::SweepError;

/// Exit status used for invalid TPC counts on the command line (EINVAL).
pub const EXIT_INVALID_ARGUMENT: u8 = 22;

/// Installs the logger used by the sweep binaries (`RUST_LOG` overrides).
pub fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
}

/// Outcome of one external tool invocation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ToolExit {
    /// `None` when the process was killed by a signal.
    pub code: Option<i32>,
}

impl ToolExit {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

impl From<std::process::ExitStatus> for ToolExit {
    fn from(status: std::process::ExitStatus) -> Self {
        ToolExit {
            code: status.code(),
        }
    }
}

impl std::fmt::Display for ToolExit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.code {
            Some(code) => write!(f, "exit status {}", code),
            None => write!(f, "terminated by signal"),
        }
    }
}
