#![cfg(not(feature = "libsmctrl"))]

use crate::SmctrlError;

pub fn tpc_count_cuda(_device: i32) -> Result<u32, SmctrlError> {
    Err(SmctrlError::Unavailable)
}

pub fn tpc_count(_device: i32) -> Result<u32, SmctrlError> {
    Err(SmctrlError::Unavailable)
}

pub fn gpc_masks(_device: i32) -> Result<Vec<u64>, SmctrlError> {
    Err(SmctrlError::Unavailable)
}
