//! Presentation adapter: turns the dataset and a filter selection into
//! everything the dashboard draws. Pure; recomputed on every interaction.

use std::fmt;

use crate::data::aggregate::{aggregate, summarize, Dimension, GroupOrder, Measure, SummaryMetrics};
use crate::data::filter::{apply, FilterSelection};
use crate::data::model::{CategoryColumn, SalesDataset};

/// Shown instead of the charts when no order passes the filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmptyResultWarning;

impl fmt::Display for EmptyResultWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("No orders match the current filters. Adjust the selection in the sidebar.")
    }
}

/// One bar of a chart.
#[derive(Debug, Clone, PartialEq)]
pub struct BarPoint {
    pub label: String,
    pub value: f64,
}

/// Formatted summary metrics.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricsView {
    pub total_sales: String,
    pub average_rating: String,
    pub stars: String,
    pub average_sale: String,
    pub raw: SummaryMetrics,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardView {
    pub visible: usize,
    pub total: usize,
    pub metrics: MetricsView,
    /// Sales per hour of day, hour ascending.
    pub hourly: Vec<BarPoint>,
    /// Sales per product line, ascending by sales.
    pub product_lines: Vec<BarPoint>,
    pub warning: Option<EmptyResultWarning>,
}

/// Build the dashboard for `selection` over `dataset`.
pub fn render(dataset: &SalesDataset, selection: &FilterSelection, currency: &str) -> DashboardView {
    let subset = apply(dataset, selection);
    log::debug!("{} of {} orders pass the filters", subset.len(), dataset.len());

    let metrics = metrics_view(summarize(&subset), currency);
    if subset.is_empty() {
        return DashboardView {
            visible: 0,
            total: dataset.len(),
            metrics,
            hourly: Vec::new(),
            product_lines: Vec::new(),
            warning: Some(EmptyResultWarning),
        };
    }

    let bars = |dimension, order| {
        aggregate(&subset, dimension, Measure::TOTAL_SALES, order)
            .into_iter()
            .map(|g| BarPoint {
                label: g.key.to_string(),
                value: g.value.unwrap_or(0.0),
            })
            .collect::<Vec<_>>()
    };

    DashboardView {
        visible: subset.len(),
        total: dataset.len(),
        metrics,
        hourly: bars(Dimension::Hour, GroupOrder::ByDimension),
        product_lines: bars(
            Dimension::Category(CategoryColumn::ProductLine),
            GroupOrder::ByMeasure,
        ),
        warning: None,
    }
}

/// Text for the three metric tiles.
///
/// A subset without ratings shows `0.0` and no stars. The star count rounds
/// the one-decimal rating half to even, so 6.5 earns six stars.
pub fn metrics_view(raw: SummaryMetrics, currency: &str) -> MetricsView {
    let rating = raw.average_rating.map(|r| (r * 10.0).round() / 10.0);
    let star_count = rating.filter(|r| *r > 0.0).map_or(0, |r| r.round_ties_even() as usize);

    MetricsView {
        total_sales: format!("{currency} {}", thousands(raw.total_sales.trunc() as i64)),
        average_rating: format!("{:.1}", rating.unwrap_or(0.0)),
        stars: "★".repeat(star_count),
        average_sale: format!("{currency} {:.2}", raw.average_sale),
        raw,
    }
}

/// `1234567` → `"1,234,567"`.
pub fn thousands(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if n < 0 {
        out.push('-');
    }
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
