//! Plain types shared by the sweep drivers and the result analysis.

pub mod mask;
pub mod method;

pub use mask::{CuMask, MaskError};
pub use method::{MigProfile, PartitionMethod, UnknownMethod};
