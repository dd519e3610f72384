use crate::results::{LatencySummary, ResultRecord};
use itertools::Itertools;
use log::warn;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// Why a result file was left out of the plot.
#[derive(Debug, thiserror::Error)]
pub enum SkipReason {
    #[error("could not read file: {0}")]
    Unreadable(#[source] std::io::Error),
    #[error("not a result file: {0}")]
    Malformed(#[source] serde_json::Error),
    #[error("no \"label\" field in file.")]
    NoLabel,
    #[error("no recorded times in file.")]
    NoTimes,
    #[error("label isn't a number.")]
    NonNumericLabel,
}

/// Numeric label to summary for one scenario. A repeated label replaces
/// the earlier summary.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScenarioDistribution {
    points: Vec<(f64, LatencySummary)>,
}

/// A distribution reshaped for plotting, sorted by label.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Series {
    pub x: Vec<f64>,
    pub min: Vec<f64>,
    pub max: Vec<f64>,
    pub mean: Vec<f64>,
}

impl ScenarioDistribution {
    pub fn insert(&mut self, label: f64, summary: LatencySummary) {
        match self.points.iter_mut().find(|(l, _)| *l == label) {
            Some(point) => point.1 = summary,
            None => self.points.push((label, summary)),
        }
    }

    pub fn get(&self, label: f64) -> Option<&LatencySummary> {
        self.points
            .iter()
            .find(|(l, _)| *l == label)
            .map(|(_, s)| s)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn series(&self) -> Series {
        let mut series = Series::default();
        for (label, summary) in self
            .points
            .iter()
            .sorted_by(|a, b| a.0.total_cmp(&b.0))
        {
            series.x.push(*label);
            series.min.push(summary.min);
            series.max.push(summary.max);
            series.mean.push(summary.mean);
        }
        series
    }
}

/// All scenarios, in the order they were first seen.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scenarios {
    scenarios: Vec<(String, ScenarioDistribution)>,
}

impl Scenarios {
    pub fn insert(&mut self, scenario: &str, label: f64, summary: LatencySummary) {
        match self.scenarios.iter_mut().find(|(name, _)| name == scenario) {
            Some((_, distribution)) => distribution.insert(label, summary),
            None => {
                let mut distribution = ScenarioDistribution::default();
                distribution.insert(label, summary);
                self.scenarios.push((scenario.to_owned(), distribution));
            }
        }
    }

    pub fn get(&self, scenario: &str) -> Option<&ScenarioDistribution> {
        self.scenarios
            .iter()
            .find(|(name, _)| name == scenario)
            .map(|(_, d)| d)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ScenarioDistribution)> {
        self.scenarios.iter().map(|(n, d)| (n.as_str(), d))
    }

    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }

    /// Adds one parsed record, or says why it cannot be plotted.
    pub fn add_record(&mut self, record: &ResultRecord, times_key: &str) -> Result<(), SkipReason> {
        if record.label.is_none() {
            return Err(SkipReason::NoLabel);
        }
        if record.timestamp_count(times_key) < 2 {
            return Err(SkipReason::NoTimes);
        }
        let label = record.numeric_label().ok_or(SkipReason::NonNumericLabel)?;
        // At least two timestamps means at least one pair.
        let summary = record.summary(times_key).ok_or(SkipReason::NoTimes)?;
        self.insert(&record.scenario_name, label, summary);
        Ok(())
    }

    pub fn add_file(&mut self, path: impl AsRef<Path>, times_key: &str) -> Result<(), SkipReason> {
        let text = std::fs::read_to_string(path).map_err(SkipReason::Unreadable)?;
        let record = ResultRecord::from_json(&text).map_err(SkipReason::Malformed)?;
        self.add_record(&record, times_key)
    }
}

/// Reads every file in order, skipping (and logging) those that cannot be
/// plotted.
pub fn aggregate_files(files: &[PathBuf], times_key: &str) -> Scenarios {
    let mut scenarios = Scenarios::default();
    for (i, file) in files.iter().enumerate() {
        println!("Parsing file {} / {}: {}", i + 1, files.len(), file.display());
        if let Err(reason) = scenarios.add_file(file, times_key) {
            warn!("Skipping {}: {}", file.display(), reason);
        }
    }
    scenarios
}

impl Display for Scenarios {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for (name, distribution) in self.iter() {
            writeln!(f, "{}: {} points", name, distribution.len())?;
        }
        Ok(())
    }
}
