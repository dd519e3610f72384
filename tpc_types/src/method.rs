use core::fmt::{Display, Formatter};
use core::str::FromStr;

/// The ways a GPU can be restricted to a subset of its TPCs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PartitionMethod {
    /// MPS active thread percentage.
    Mps,
    /// libsmctrl TPC enable mask.
    Libsmctrl,
    /// MiG GPU instance with a fixed geometry.
    Mig,
}

impl PartitionMethod {
    pub const SOFTWARE: [PartitionMethod; 2] = [PartitionMethod::Mps, PartitionMethod::Libsmctrl];

    pub fn name(&self) -> &'static str {
        match self {
            PartitionMethod::Mps => "mps",
            PartitionMethod::Libsmctrl => "libsmctrl",
            PartitionMethod::Mig => "mig",
        }
    }

    /// MiG is the only method bounded by the geometry table instead of the TPC count.
    pub fn is_hardware(&self) -> bool {
        matches!(self, PartitionMethod::Mig)
    }
}

impl Display for PartitionMethod {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown partitioning type '{0}'!")]
pub struct UnknownMethod(pub String);

impl FromStr for PartitionMethod {
    type Err = UnknownMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mps" => Ok(PartitionMethod::Mps),
            "libsmctrl" => Ok(PartitionMethod::Libsmctrl),
            "mig" => Ok(PartitionMethod::Mig),
            _ => Err(UnknownMethod(s.to_owned())),
        }
    }
}

/// Single-instance MiG geometries of the A100 40GB.
///
/// The TPC counts are the SM counts reported by
/// `nvidia-smi mig --list-gpu-instance-profiles` divided by two, out of 54 TPCs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MigProfile {
    OneSlice,
    TwoSlices,
    ThreeSlices,
    FourSlices,
    SevenSlices,
}

impl MigProfile {
    pub const ALL: [MigProfile; 5] = [
        MigProfile::OneSlice,
        MigProfile::TwoSlices,
        MigProfile::ThreeSlices,
        MigProfile::FourSlices,
        MigProfile::SevenSlices,
    ];

    pub fn tpc_count(&self) -> u32 {
        match self {
            MigProfile::OneSlice => 7,
            MigProfile::TwoSlices => 14,
            MigProfile::ThreeSlices => 21,
            MigProfile::FourSlices => 28,
            MigProfile::SevenSlices => 49,
        }
    }

    /// The profile name understood by `nvidia-smi mig --create-gpu-instance`.
    pub fn geometry(&self) -> &'static str {
        match self {
            MigProfile::OneSlice => "1g.10gb",
            MigProfile::TwoSlices => "2g.10gb",
            MigProfile::ThreeSlices => "3g.20gb",
            MigProfile::FourSlices => "4g.20gb",
            MigProfile::SevenSlices => "7g.40gb",
        }
    }

    pub fn from_tpc_count(tpcs: u32) -> Option<MigProfile> {
        Self::ALL.into_iter().find(|p| p.tpc_count() == tpcs)
    }

    pub fn tpc_counts() -> impl Iterator<Item = u32> {
        Self::ALL.into_iter().map(|p| p.tpc_count())
    }
}

impl Display for MigProfile {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.geometry())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_names_are_case_insensitive() {
        assert_eq!("MPS".parse::<PartitionMethod>(), Ok(PartitionMethod::Mps));
        assert_eq!("libSMctrl".parse::<PartitionMethod>(), Ok(PartitionMethod::Libsmctrl));
        assert_eq!("mig".parse::<PartitionMethod>(), Ok(PartitionMethod::Mig));
        assert_eq!(
            "green".parse::<PartitionMethod>(),
            Err(UnknownMethod(String::from("green")))
        );
    }

    #[test]
    fn mig_table() {
        let counts: Vec<u32> = MigProfile::tpc_counts().collect();
        assert_eq!(counts, vec![7, 14, 21, 28, 49]);
        assert_eq!(MigProfile::from_tpc_count(21).map(|p| p.geometry()), Some("3g.20gb"));
        for tpcs in (0..=54).filter(|t| !counts.contains(t)) {
            assert_eq!(MigProfile::from_tpc_count(tpcs), None);
        }
    }
}
