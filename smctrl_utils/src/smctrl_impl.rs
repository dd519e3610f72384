#![cfg(feature = "libsmctrl")]

use crate::SmctrlError;
use core::ffi::c_int;
use log::debug;

#[link(name = "smctrl")]
unsafe extern "C" {
    fn libsmctrl_get_tpc_info_cuda(num_tpcs: *mut u32, cuda_dev: c_int) -> c_int;
    fn libsmctrl_get_tpc_info(num_tpcs: *mut u32, dev: c_int) -> c_int;
    fn libsmctrl_get_gpc_info(
        num_enabled_gpcs: *mut u32,
        tpcs_for_gpc: *mut *mut u64,
        dev: c_int,
    ) -> c_int;
}

/// Number of TPCs on `device`, numbered the CUDA way.
pub fn tpc_count_cuda(device: i32) -> Result<u32, SmctrlError> {
    let mut num_tpcs: u32 = 0;
    let code = unsafe { libsmctrl_get_tpc_info_cuda(&mut num_tpcs, device) };
    if code != 0 {
        return Err(SmctrlError::Failed {
            call: "libsmctrl_get_tpc_info_cuda",
            device,
            code,
        });
    }
    debug!("libsmctrl: device {} has {} TPCs (CUDA)", device, num_tpcs);
    Ok(num_tpcs)
}

/// Number of TPCs on `device`, numbered the nvdebug way.
pub fn tpc_count(device: i32) -> Result<u32, SmctrlError> {
    let mut num_tpcs: u32 = 0;
    let code = unsafe { libsmctrl_get_tpc_info(&mut num_tpcs, device) };
    if code != 0 {
        return Err(SmctrlError::Failed {
            call: "libsmctrl_get_tpc_info",
            device,
            code,
        });
    }
    debug!("libsmctrl: device {} has {} TPCs", device, num_tpcs);
    Ok(num_tpcs)
}

/// One mask of TPC bits per enabled GPC (requires the nvdebug module).
pub fn gpc_masks(device: i32) -> Result<Vec<u64>, SmctrlError> {
    let mut num_gpcs: u32 = 0;
    let mut tpcs_for_gpc: *mut u64 = core::ptr::null_mut();
    let code = unsafe { libsmctrl_get_gpc_info(&mut num_gpcs, &mut tpcs_for_gpc, device) };
    if code != 0 {
        return Err(SmctrlError::Failed {
            call: "libsmctrl_get_gpc_info",
            device,
            code,
        });
    }
    if num_gpcs == 0 || tpcs_for_gpc.is_null() {
        return Err(SmctrlError::NoGpcs(device));
    }
    // The array stays owned by libsmctrl, copy it out.
    let masks = unsafe { core::slice::from_raw_parts(tpcs_for_gpc, num_gpcs as usize) };
    Ok(masks.to_vec())
}
