use crate::EXIT_INVALID_ARGUMENT;
use smctrl_utils::SmctrlError;
use tpc_types::{MaskError, PartitionMethod, UnknownMethod};

#[derive(Debug, thiserror::Error)]
pub enum SweepError {
    /// Rejected command line TPC counts; reported with exit status 22.
    #[error("{0}")]
    InvalidTpcCount(&'static str),
    #[error("could not auto-detect the TPC count: {0}")]
    Detection(#[source] SmctrlError),
    #[error(transparent)]
    UnknownMethod(#[from] UnknownMethod),
    #[error("{active} active TPCs is not valid under {method} with {total} TPCs")]
    InvalidActiveCount {
        method: PartitionMethod,
        active: u32,
        total: u32,
    },
    #[error("no MiG geometry provides {0} TPCs (valid: 7, 14, 21, 28, 49)")]
    NoMigProfile(u32),
    #[error("MiG-capable GPU required for MiG experiments!")]
    MigNotCapable,
    #[error("Unable to create MiG instance with config {0}!")]
    MigCreation(&'static str),
    #[error(transparent)]
    Mask(#[from] MaskError),
    #[error("failed to serialize the benchmark configuration: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl SweepError {
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        SweepError::Io {
            context: context.into(),
            source,
        }
    }

    pub fn exit_code(&self) -> u8 {
        match self {
            SweepError::InvalidTpcCount(_) => EXIT_INVALID_ARGUMENT,
            _ => 1,
        }
    }
}
