//! Renders the mean latency of every scenario against its partition size.

use crate::aggregate::Scenarios;
use crate::AnalysisError;
use log::{info, warn};
use pgfplots::axis::plot::Type2D::ConstLeft;
use pgfplots::axis::plot::coordinate::Coordinate2D;
use pgfplots::axis::plot::{Plot2D, PlotKey};
use pgfplots::axis::{Axis, AxisKey};
use pgfplots::{Engine, Picture};
use std::path::{Path, PathBuf};

/// Pixel sizes are converted to inches at this resolution.
pub const DPI: f64 = 100.0;

/// Fraction of the data range added around the series.
pub const PADDING: f64 = 0.05;

const COLORS: &str = r#"\definecolor{SweepBlue}{HTML}{0277BD}
\definecolor{SweepOrange}{HTML}{F4B400}
\definecolor{SweepGreen}{HTML}{0F9D58}
"#;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesStyle {
    pub color: &'static str,
    pub line: &'static str,
    pub mark: &'static str,
    /// Radius, in points.
    pub mark_size: f64,
}

/// Cycled through, one per scenario, in this order.
pub const STYLES: [SeriesStyle; 3] = [
    SeriesStyle {
        color: "SweepGreen",
        line: "dashed",
        mark: "x",
        mark_size: 3.0,
    },
    SeriesStyle {
        color: "SweepOrange",
        line: "dotted",
        mark: "square*",
        mark_size: 2.5,
    },
    SeriesStyle {
        color: "SweepBlue",
        line: "solid",
        mark: "*",
        mark_size: 1.5,
    },
];

impl SeriesStyle {
    fn keys(&self) -> String {
        format!(
            "color={}, {}, mark={}, mark size={}pt, mark options={{solid, fill={}}}",
            self.color, self.line, self.mark, self.mark_size, self.color
        )
    }
}

/// Legend entry for a scenario, from the partitioning method in its name.
pub fn legend_name(scenario: &str) -> &'static str {
    if scenario.contains("mps") {
        "MPS"
    } else if scenario.contains("mig") {
        "MiG"
    } else {
        "nvsplit"
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlotSettings {
    pub width_px: u32,
    pub height_px: u32,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
}

impl Default for PlotSettings {
    fn default() -> Self {
        PlotSettings {
            width_px: 600,
            height_px: 400,
            title: String::from("TPC partition size vs. MM8192 Time"),
            x_label: String::from(r"TPC Partition Size (\# of TPCs)"),
            y_label: String::from("Average MM8192 Time (ms)"),
        }
    }
}

/// One step-drawn series of mean times per scenario on a log scale.
///
/// Without any scenario the axes are still drawn, empty.
pub fn build_picture(scenarios: &Scenarios, settings: &PlotSettings) -> Picture {
    if scenarios.is_empty() {
        warn!("No plottable results, the figure will be empty");
    }
    let mut axis = Axis::new();
    axis.set_title(settings.title.clone());
    let mut legend = Vec::new();
    for ((name, distribution), style) in scenarios.iter().zip(STYLES.iter().cycle()) {
        let series = distribution.series();
        let mut plot = Plot2D::new();
        plot.add_key(PlotKey::Type2D(ConstLeft));
        plot.add_key(PlotKey::Custom(style.keys()));
        plot.coordinates = series
            .x
            .iter()
            .zip(series.mean.iter())
            .map(|(x, y)| Coordinate2D::from((*x, *y)))
            .collect();
        axis.plots.push(plot);
        legend.push(format!("{{{}}}", legend_name(name)));
    }
    axis.add_key(AxisKey::Custom(format!(
        "width={}in, height={}in, ymode=log, enlarge x limits={}, enlarge y limits={{upper, value={}}}",
        settings.width_px as f64 / DPI,
        settings.height_px as f64 / DPI,
        PADDING,
        PADDING
    )));
    axis.add_key(AxisKey::Custom(format!(
        "xlabel={{{}}}, ylabel={{{}}}, tick align=outside, tick pos=left",
        settings.x_label, settings.y_label
    )));
    if !legend.is_empty() {
        axis.add_key(AxisKey::Custom(format!(
            "legend entries={{{}}}",
            legend.join(",")
        )));
    }

    let mut picture = Picture::new();
    picture.axes.push(Box::new(axis));
    picture.add_to_preamble(vec![String::from(COLORS)]);
    picture
}

/// Writes `<name>.tex` into `folder` and tries to compile it to a PDF with
/// LuaLaTeX. A failed compilation is logged; the `.tex` file is kept.
pub fn write_plot(
    picture: &Picture,
    folder: impl AsRef<Path>,
    name: &str,
) -> Result<PathBuf, AnalysisError> {
    let tex = folder.as_ref().join(format!("{}.tex", name));
    std::fs::write(&tex, picture.standalone_string())
        .map_err(|e| AnalysisError::io(format!("failed to write {}", tex.display()), e))?;
    info!("Wrote {}", tex.display());
    match picture.to_pdf(folder.as_ref(), name, Engine::LuaLatex) {
        Ok(_) => info!("Compiled {}.pdf", name),
        Err(e) => warn!("Failed to create PDF: {}, {:?}", name, e),
    }
    Ok(tex)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::results::LatencySummary;

    fn point(mean: f64) -> LatencySummary {
        LatencySummary {
            min: mean,
            max: mean,
            mean,
        }
    }

    #[test]
    fn legend_names() {
        assert_eq!(legend_name("TPC Count vs. Performance with mps"), "MPS");
        assert_eq!(legend_name("TPC Count vs. Performance with mig"), "MiG");
        assert_eq!(legend_name("TPC Count vs. Performance with libsmctrl"), "nvsplit");
    }

    #[test]
    fn empty_figure_without_results() {
        let tex = build_picture(&Scenarios::default(), &PlotSettings::default()).standalone_string();
        assert!(tex.contains("ymode=log"));
        assert!(!tex.contains("legend entries"));
    }

    #[test]
    fn picture_has_one_series_per_scenario() {
        let mut scenarios = Scenarios::default();
        scenarios.insert("with mps", 2.0, point(4.0));
        scenarios.insert("with mps", 1.0, point(8.0));
        scenarios.insert("with libsmctrl", 1.0, point(7.5));
        let tex = build_picture(&scenarios, &PlotSettings::default()).standalone_string();
        assert!(tex.contains("ymode=log"));
        assert!(tex.contains("legend entries={{MPS},{nvsplit}}"));
        assert!(tex.contains("width=6in, height=4in"));
        assert!(tex.contains("SweepGreen"));
        assert!(tex.contains("SweepOrange"));
        assert!(!tex.contains("color=SweepBlue"));
    }
}
