//! TPC topology queries backed by libsmctrl.
//!
//! Built without the `libsmctrl` feature, every query fails with
//! [`SmctrlError::Unavailable`] so callers fall back to user supplied counts.

mod smctrl_impl;
mod smctrl_noop;

#[cfg(feature = "libsmctrl")]
pub use smctrl_impl::*;

#[cfg(not(feature = "libsmctrl"))]
pub use smctrl_noop::*;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SmctrlError {
    #[error("libsmctrl support was not compiled in (enable the `libsmctrl` feature)")]
    Unavailable,
    #[error("{call} failed on device {device} with code {code}")]
    Failed {
        call: &'static str,
        device: i32,
        code: i32,
    },
    #[error("device {0} reported no GPCs")]
    NoGpcs(i32),
}
