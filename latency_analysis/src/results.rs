//! One result file written by the benchmark runner.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ResultRecord {
    /// Usually the stringified partition size; anything else is not plotted.
    /// `None` only when the key is missing, `"label": null` is `Some(Null)`.
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub label: Option<Value>,
    pub scenario_name: String,
    /// One object per kernel launch / iteration, each holding timestamp arrays.
    #[serde(default)]
    pub times: Vec<Map<String, Value>>,
}

/// Durations in milliseconds.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct LatencySummary {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

fn present<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Value>, D::Error> {
    Value::deserialize(deserializer).map(Some)
}

impl ResultRecord {
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// The label as a number, if it is one (or a string holding one).
    pub fn numeric_label(&self) -> Option<f64> {
        let value = match self.label.as_ref()? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }?;
        value.is_finite().then_some(value)
    }

    /// The timestamp arrays under `key`. An entry holding anything but
    /// numbers there is left out whole, so its pairs cannot shift.
    fn timestamp_arrays<'a>(&'a self, key: &'a str) -> impl Iterator<Item = Vec<f64>> + 'a {
        self.times.iter().filter_map(move |entry| {
            entry
                .get(key)
                .and_then(Value::as_array)
                .and_then(|a| a.iter().map(Value::as_f64).collect())
        })
    }

    pub fn timestamp_count(&self, key: &str) -> usize {
        self.timestamp_arrays(key).map(|a| a.len()).sum()
    }

    /// Durations in seconds, reading each timestamp array as (start, end)
    /// pairs. A trailing unpaired timestamp is ignored.
    pub fn durations(&self, key: &str) -> Vec<f64> {
        self.timestamp_arrays(key)
            .flat_map(|times| {
                times
                    .chunks_exact(2)
                    .map(|pair| pair[1] - pair[0])
                    .collect::<Vec<f64>>()
            })
            .collect()
    }

    pub fn summary(&self, key: &str) -> Option<LatencySummary> {
        LatencySummary::from_seconds(&self.durations(key))
    }
}

impl LatencySummary {
    pub fn from_seconds(durations: &[f64]) -> Option<LatencySummary> {
        if durations.is_empty() {
            return None;
        }
        let min = durations.iter().copied().fold(f64::INFINITY, f64::min);
        let max = durations.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let mean = durations.iter().sum::<f64>() / durations.len() as f64;
        Some(LatencySummary {
            min: min * 1000.0,
            max: max * 1000.0,
            mean: mean * 1000.0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn single_pair() {
        let record = ResultRecord::from_json(
            r#"{"label": "4", "scenario_name": "s", "times": [{"execute_times": [1.0, 1.002]}]}"#,
        )
        .unwrap();
        let summary = record.summary("execute_times").unwrap();
        assert!(close(summary.min, 2.0));
        assert!(close(summary.max, 2.0));
        assert!(close(summary.mean, 2.0));
    }

    #[test]
    fn pairs_across_entries() {
        let record = ResultRecord::from_json(
            r#"{"label": 3, "scenario_name": "s", "times": [
                {"cpu_times": [0.0, 10.0]},
                {"execute_times": [0.0, 0.001, 0.5, 0.504]},
                {"execute_times": [2.0, 2.003, 9.0]}
            ]}"#,
        )
        .unwrap();
        assert_eq!(record.timestamp_count("execute_times"), 7);
        let summary = record.summary("execute_times").unwrap();
        assert!(close(summary.min, 1.0));
        assert!(close(summary.max, 4.0));
        assert!(close(summary.mean, 8.0 / 3.0));
        assert!(close(record.summary("cpu_times").unwrap().mean, 10_000.0));
        assert_eq!(record.summary("missing"), None);
    }

    #[test]
    fn entries_with_non_numeric_times_are_left_out() {
        let record = ResultRecord::from_json(
            r#"{"label": "1", "scenario_name": "s", "times": [
                {"execute_times": [0.0, "late", 0.001, 0.002]},
                {"execute_times": [1.0, 1.004]}
            ]}"#,
        )
        .unwrap();
        assert_eq!(record.timestamp_count("execute_times"), 2);
        assert_eq!(record.durations("execute_times").len(), 1);
        assert!(close(record.summary("execute_times").unwrap().mean, 4.0));
    }

    #[test]
    fn null_label_is_present() {
        let null = ResultRecord::from_json(r#"{"label": null, "scenario_name": "s"}"#).unwrap();
        assert_eq!(null.label, Some(Value::Null));
        let missing = ResultRecord::from_json(r#"{"scenario_name": "s"}"#).unwrap();
        assert_eq!(missing.label, None);
    }

    #[test]
    fn labels() {
        let parse = |label: &str| {
            ResultRecord::from_json(&format!(
                r#"{{"label": {}, "scenario_name": "s"}}"#,
                label
            ))
            .unwrap()
            .numeric_label()
        };
        assert_eq!(parse(r#""12""#), Some(12.0));
        assert_eq!(parse(r#"" 2.5 ""#), Some(2.5));
        assert_eq!(parse("7"), Some(7.0));
        assert_eq!(parse(r#""striped""#), None);
        assert_eq!(parse(r#""nan""#), None);
        assert_eq!(parse("null"), None);
        assert_eq!(parse("[1]"), None);
    }
}
