use core::fmt::{Display, Formatter};

/// Width of the libsmctrl TPC masks.
pub const MASK_BITS: u32 = u64::BITS;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MaskError {
    #[error("cannot enable {0} TPCs in a 64 bit mask")]
    TooWide(u32),
    #[error("only {available} TPCs are available across all GPCs, {requested} requested")]
    Exhausted { requested: u32, available: u32 },
}

/// Renders the mask of the `active` lowest TPCs as `~0x...`.
///
/// The `~` marks it as an enable mask. The width is unbounded: the digits
/// are produced directly instead of going through an integer.
pub fn enable_mask_string(active: u32) -> String {
    let full_digits = (active / 4) as usize;
    let partial = active % 4;
    let mut s = String::with_capacity(full_digits + 4);
    s.push_str("~0x");
    if partial != 0 {
        if let Some(c) = char::from_digit((1 << partial) - 1, 16) {
            s.push(c);
        }
    }
    s.extend(core::iter::repeat_n('f', full_digits));
    if active == 0 {
        s.push('0');
    }
    s
}

/// A libsmctrl mask: a set bit *disables* the matching TPC.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct CuMask(pub u64);

impl CuMask {
    /// Enables the `active` lowest TPCs.
    pub fn contiguous(active: u32) -> Result<CuMask, MaskError> {
        if active > MASK_BITS {
            return Err(MaskError::TooWide(active));
        }
        let enabled = if active == MASK_BITS {
            u64::MAX
        } else {
            (1u64 << active) - 1
        };
        Ok(CuMask(!enabled))
    }

    /// Enables `active` TPCs distributed round-robin over the GPCs.
    ///
    /// `gpcs` holds, per GPC, the mask of TPCs it owns. Each step takes the
    /// lowest free TPC of the next GPC that still has one.
    pub fn striped(active: u32, gpcs: &[u64]) -> Result<CuMask, MaskError> {
        let mut free = gpcs.to_vec();
        let available = free.iter().map(|m| m.count_ones()).sum::<u32>();
        if active > available {
            return Err(MaskError::Exhausted {
                requested: active,
                available,
            });
        }
        let mut enabled = 0u64;
        let mut next_gpc = 0;
        for _ in 0..active {
            // active <= available guarantees some GPC still has a free TPC.
            loop {
                let gpc = next_gpc;
                next_gpc = (next_gpc + 1) % free.len();
                let lowest = free[gpc] & free[gpc].wrapping_neg();
                if lowest != 0 {
                    enabled |= lowest;
                    free[gpc] &= !lowest;
                    break;
                }
            }
        }
        Ok(CuMask(!enabled))
    }

    pub fn enabled(&self) -> u64 {
        !self.0
    }

    pub fn active_count(&self) -> u32 {
        self.enabled().count_ones()
    }

    /// 16 lowercase hex digits, the format the runner expects for `sm_mask`.
    pub fn hex(&self) -> String {
        format!("{:016x}", self.0)
    }
}

impl Display for CuMask {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_enable_mask(s: &str) -> u128 {
        let digits = s.strip_prefix("~0x").expect("missing prefix");
        u128::from_str_radix(digits, 16).expect("not hex")
    }

    #[test]
    fn five_tpcs() {
        assert_eq!(enable_mask_string(5), "~0x1f");
    }

    #[test]
    fn enable_masks_are_low_bits() {
        for active in 1..=100 {
            let bits = parse_enable_mask(&enable_mask_string(active));
            assert_eq!(bits.count_ones(), active);
            assert_eq!(bits, (1u128 << active) - 1);
        }
    }

    #[test]
    fn zero_tpcs() {
        assert_eq!(enable_mask_string(0), "~0x0");
    }

    #[test]
    fn contiguous_mask() {
        let mask = CuMask::contiguous(3).unwrap();
        assert_eq!(mask.hex(), "fffffffffffffff8");
        assert_eq!(mask.active_count(), 3);
        assert_eq!(CuMask::contiguous(64).unwrap(), CuMask(0));
        assert_eq!(CuMask::contiguous(65), Err(MaskError::TooWide(65)));
    }

    #[test]
    fn striped_mask_round_robin() {
        // Two GPCs: TPCs 0-3 and TPCs 4-7.
        let gpcs = [0x0f, 0xf0];
        let mask = CuMask::striped(3, &gpcs).unwrap();
        assert_eq!(mask.enabled(), 0x13);
        assert_eq!(mask.active_count(), 3);
    }

    #[test]
    fn striped_mask_skips_exhausted_gpcs() {
        let gpcs = [0x1, 0xf0];
        let mask = CuMask::striped(4, &gpcs).unwrap();
        assert_eq!(mask.enabled(), 0x71);
    }

    #[test]
    fn striped_mask_too_many() {
        assert_eq!(
            CuMask::striped(3, &[0x1, 0x2]),
            Err(MaskError::Exhausted {
                requested: 3,
                available: 2
            })
        );
    }
}
