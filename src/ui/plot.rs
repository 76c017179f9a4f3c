use std::ops::RangeInclusive;

use anyhow::{bail, Result};
use chrono::NaiveDate;
use eframe::egui::{RichText, Ui};
use egui_plot::{Bar, BarChart, GridMark, Legend, Line, Plot, PlotPoints, Points};

use crate::color::CategoryColors;
use crate::data::model::{CellValue, Column, ColumnProfile, ColumnType, Dataset};

// ---------------------------------------------------------------------------
// Chart configuration
// ---------------------------------------------------------------------------

/// The five chart types offered by the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Line,
    Bar,
    Area,
    Scatter,
    Histogram,
}

impl ChartKind {
    pub const ALL: [ChartKind; 5] = [
        ChartKind::Line,
        ChartKind::Bar,
        ChartKind::Area,
        ChartKind::Scatter,
        ChartKind::Histogram,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ChartKind::Line => "Line Chart",
            ChartKind::Bar => "Bar Chart",
            ChartKind::Area => "Area Chart",
            ChartKind::Scatter => "Scatter Plot",
            ChartKind::Histogram => "Histogram",
        }
    }
}

/// What to plot: a chart type plus the two chosen columns.
/// The histogram only uses `y_column`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartConfig {
    pub kind: ChartKind,
    pub x_column: String,
    pub y_column: String,
}

impl Default for ChartConfig {
    fn default() -> Self {
        ChartConfig {
            kind: ChartKind::Line,
            x_column: String::new(),
            y_column: String::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Histogram binning
// ---------------------------------------------------------------------------

/// Fixed bin count, matching the dashboard's histogram widget.
pub const HISTOGRAM_BINS: usize = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct HistogramBin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

/// Split `values` into `bins` equal-width bins over the observed range.
/// The maximum value lands in the last bin. A constant column collapses
/// to a single bin holding everything.
pub fn histogram_bins(values: &[f64], bins: usize) -> Vec<HistogramBin> {
    if values.is_empty() || bins == 0 {
        return Vec::new();
    }
    let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let width = (max - min) / bins as f64;

    if width == 0.0 {
        return vec![HistogramBin {
            start: min,
            end: max,
            count: values.len(),
        }];
    }

    let mut counts = vec![0usize; bins];
    for &v in values {
        let idx = (((v - min) / width) as usize).min(bins - 1);
        counts[idx] += 1;
    }
    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| HistogramBin {
            start: min + i as f64 * width,
            end: min + (i + 1) as f64 * width,
            count,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// X-axis value mapping
// ---------------------------------------------------------------------------

/// Maps cells of the X column onto plot coordinates: numbers as-is,
/// dates as days since the Unix epoch, categories as their index in the
/// sorted distinct-value list.
#[derive(Clone)]
struct XAxis {
    ty: ColumnType,
    labels: Vec<String>,
}

fn epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(1970, 1, 1).unwrap()
}

impl XAxis {
    fn new(column: &Column) -> Self {
        let labels = match &column.profile {
            ColumnProfile::Text { unique } => unique.iter().cloned().collect(),
            _ => Vec::new(),
        };
        XAxis {
            ty: column.ty,
            labels,
        }
    }

    fn value(&self, cell: &CellValue) -> Option<f64> {
        match self.ty {
            ColumnType::Numeric => cell.as_number(),
            ColumnType::Temporal => cell
                .as_date()
                .map(|d| d.signed_duration_since(epoch()).num_days() as f64),
            ColumnType::Text => {
                let s = cell.as_text()?;
                self.labels.iter().position(|l| l == s).map(|i| i as f64)
            }
        }
    }

    fn format(&self, mark: GridMark, _range: &RangeInclusive<f64>) -> String {
        match self.ty {
            ColumnType::Numeric => format!("{}", mark.value),
            ColumnType::Temporal => {
                let d = epoch() + chrono::Duration::days(mark.value.round() as i64);
                d.format("%Y-%m-%d").to_string()
            }
            ColumnType::Text => {
                let idx = mark.value.round();
                if (mark.value - idx).abs() > 1e-6 || idx < 0.0 {
                    return String::new();
                }
                self.labels
                    .get(idx as usize)
                    .cloned()
                    .unwrap_or_default()
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Chart rendering
// ---------------------------------------------------------------------------

/// Render the configured chart from the filtered view.
///
/// Fails before drawing anything when a chosen column cannot carry the
/// chart (unknown name, non-numeric Y); the caller keeps the previous
/// output visible and surfaces the error.
pub fn render_chart(
    ui: &mut Ui,
    dataset: &Dataset,
    indices: &[usize],
    config: &ChartConfig,
) -> Result<()> {
    match config.kind {
        ChartKind::Histogram => render_histogram(ui, dataset, indices, config),
        _ => render_xy(ui, dataset, indices, config),
    }
}

fn numeric_column_index(dataset: &Dataset, name: &str) -> Result<usize> {
    let Some(idx) = dataset.column_index(name) else {
        bail!("unknown column '{name}'");
    };
    if dataset.columns[idx].ty != ColumnType::Numeric {
        bail!(
            "column '{name}' is {}, expected numeric",
            dataset.columns[idx].ty
        );
    }
    Ok(idx)
}

fn render_histogram(
    ui: &mut Ui,
    dataset: &Dataset,
    indices: &[usize],
    config: &ChartConfig,
) -> Result<()> {
    let y_idx = numeric_column_index(dataset, &config.y_column)?;
    let values: Vec<f64> = indices
        .iter()
        .filter_map(|&i| dataset.rows[i][y_idx].as_number())
        .collect();
    let bins = histogram_bins(&values, HISTOGRAM_BINS);

    let bars: Vec<Bar> = bins
        .iter()
        .map(|bin| {
            // A constant column collapses to one zero-width bin; give it
            // a visible width.
            let width = if bin.end > bin.start { bin.end - bin.start } else { 1.0 };
            Bar::new((bin.start + bin.end) / 2.0, bin.count as f64).width(width)
        })
        .collect();

    ui.label(RichText::new(format!("Histogram of {}", config.y_column)).strong());
    Plot::new("dashboard_chart")
        .legend(Legend::default())
        .x_axis_label(config.y_column.clone())
        .y_axis_label("count")
        .height(320.0)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).name(&config.y_column));
        });
    Ok(())
}

fn render_xy(
    ui: &mut Ui,
    dataset: &Dataset,
    indices: &[usize],
    config: &ChartConfig,
) -> Result<()> {
    let Some(x_idx) = dataset.column_index(&config.x_column) else {
        bail!("unknown column '{}'", config.x_column);
    };
    let y_idx = numeric_column_index(dataset, &config.y_column)?;
    let x_column = &dataset.columns[x_idx];
    let axis = XAxis::new(x_column);

    // Rows where either coordinate is null are dropped from the chart.
    let pairs: Vec<[f64; 2]> = indices
        .iter()
        .filter_map(|&i| {
            let row = &dataset.rows[i];
            let x = axis.value(&row[x_idx])?;
            let y = row[y_idx].as_number()?;
            Some([x, y])
        })
        .collect();

    let title = match config.kind {
        ChartKind::Bar => format!("{} by {}", config.y_column, config.x_column),
        _ => format!("{} vs {}", config.y_column, config.x_column),
    };
    ui.label(RichText::new(&title).strong());

    let formatter_axis = axis.clone();
    let plot = Plot::new("dashboard_chart")
        .legend(Legend::default())
        .x_axis_label(config.x_column.clone())
        .y_axis_label(config.y_column.clone())
        .x_axis_formatter(move |mark, range| formatter_axis.format(mark, range))
        .height(320.0)
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true);

    plot.show(ui, |plot_ui| match config.kind {
        ChartKind::Line => {
            let points: PlotPoints = pairs.iter().copied().collect();
            plot_ui.line(Line::new(points).name(&title).width(1.5));
        }
        ChartKind::Area => {
            let points: PlotPoints = pairs.iter().copied().collect();
            plot_ui.line(Line::new(points).name(&title).width(1.5).fill(0.0));
        }
        ChartKind::Scatter => {
            let points: PlotPoints = pairs.iter().copied().collect();
            plot_ui.points(Points::new(points).name(&title).radius(2.5));
        }
        ChartKind::Bar => {
            // One bar per row, coloured by category when X is text.
            let colors = match &x_column.profile {
                ColumnProfile::Text { unique } => Some(CategoryColors::new(unique)),
                _ => None,
            };
            let width = if x_column.ty == ColumnType::Text { 0.6 } else { 0.5 };
            let bars: Vec<Bar> = indices
                .iter()
                .filter_map(|&i| {
                    let row = &dataset.rows[i];
                    let x = axis.value(&row[x_idx])?;
                    let y = row[y_idx].as_number()?;
                    let mut bar = Bar::new(x, y).width(width);
                    if let (Some(colors), Some(label)) = (&colors, row[x_idx].as_text()) {
                        bar = bar.fill(colors.color_for(label)).name(label);
                    }
                    Some(bar)
                })
                .collect();
            plot_ui.bar_chart(BarChart::new(bars).name(&title));
        }
        ChartKind::Histogram => {}
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bins_cover_the_range_evenly() {
        let values: Vec<f64> = (0..100).map(|i| i as f64).collect();
        let bins = histogram_bins(&values, HISTOGRAM_BINS);
        assert_eq!(bins.len(), 10);
        assert!(bins.iter().all(|b| b.count == 10));
        assert_eq!(bins[0].start, 0.0);
        assert_eq!(bins[9].end, 99.0);
    }

    #[test]
    fn maximum_value_lands_in_the_last_bin() {
        let bins = histogram_bins(&[0.0, 5.0, 10.0], 10);
        assert_eq!(bins[9].count, 1);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 3);
    }

    #[test]
    fn constant_values_collapse_to_one_bin() {
        let bins = histogram_bins(&[4.0, 4.0, 4.0], 10);
        assert_eq!(bins.len(), 1);
        assert_eq!(bins[0].count, 3);
    }

    #[test]
    fn empty_input_yields_no_bins() {
        assert!(histogram_bins(&[], 10).is_empty());
    }
}
