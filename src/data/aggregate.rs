use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use super::filter::Subset;
use super::model::{CategoryColumn, Record};

// ---------------------------------------------------------------------------
// Dimensions and measures
// ---------------------------------------------------------------------------

/// What records are grouped by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    Category(CategoryColumn),
    /// The derived hour-of-day field.
    Hour,
}

impl Dimension {
    fn key(self, record: &Record) -> DimensionKey {
        match self {
            Dimension::Category(col) => DimensionKey::Category(record.category(col).to_string()),
            Dimension::Hour => DimensionKey::Hour(record.hour),
        }
    }
}

/// One group label. Orders naturally: hours numerically, categories lexically.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DimensionKey {
    Hour(u8),
    Category(String),
}

impl fmt::Display for DimensionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DimensionKey::Hour(h) => write!(f, "{h}"),
            DimensionKey::Category(s) => f.write_str(s),
        }
    }
}

/// Numeric column being reduced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeasureColumn {
    Total,
    Rating,
}

impl MeasureColumn {
    fn value(self, record: &Record) -> Option<f64> {
        match self {
            MeasureColumn::Total => Some(record.total),
            MeasureColumn::Rating => record.rating,
        }
    }
}

/// How the values of a group are reduced.
///
/// Missing values are skipped by every reduction:
/// * `Sum`   – a group with no values sums to `0`
/// * `Mean`  – a group with no values has no mean (`None`)
/// * `Count` – counts the values that are present
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reduction {
    Sum,
    Mean,
    Count,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Measure {
    pub column: MeasureColumn,
    pub reduction: Reduction,
}

impl Measure {
    pub const TOTAL_SALES: Measure = Measure {
        column: MeasureColumn::Total,
        reduction: Reduction::Sum,
    };

    pub const MEAN_RATING: Measure = Measure {
        column: MeasureColumn::Rating,
        reduction: Reduction::Mean,
    };
}

/// Order of the aggregated groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupOrder {
    /// Ascending by reduced value (bar comparison). Groups without a value first.
    ByMeasure,
    /// Ascending by dimension key (time series).
    ByDimension,
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

/// One row of an aggregate result.
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    pub key: DimensionKey,
    /// Reduced measure; `None` only for `Mean` over a group with no values.
    pub value: Option<f64>,
    /// Records that fell into this group.
    pub records: usize,
}

#[derive(Default)]
struct Accumulator {
    sum: f64,
    values: usize,
    records: usize,
}

impl Accumulator {
    fn push(&mut self, value: Option<f64>) {
        self.records += 1;
        if let Some(v) = value {
            self.sum += v;
            self.values += 1;
        }
    }

    fn finish(&self, reduction: Reduction) -> Option<f64> {
        match reduction {
            Reduction::Sum => Some(self.sum),
            Reduction::Count => Some(self.values as f64),
            Reduction::Mean if self.values == 0 => None,
            Reduction::Mean => Some(self.sum / self.values as f64),
        }
    }
}

/// Group `subset` by `dimension` and reduce `measure` per group.
///
/// Keys are exactly the distinct dimension values present in `subset`; an
/// empty subset yields an empty result.
pub fn aggregate(
    subset: &Subset<'_>,
    dimension: Dimension,
    measure: Measure,
    order: GroupOrder,
) -> Vec<Group> {
    let mut acc: BTreeMap<DimensionKey, Accumulator> = BTreeMap::new();
    for record in subset.iter() {
        acc.entry(dimension.key(record))
            .or_default()
            .push(measure.column.value(record));
    }

    // BTreeMap iteration already yields ByDimension order.
    let mut groups: Vec<Group> = acc
        .into_iter()
        .map(|(key, a)| Group {
            value: a.finish(measure.reduction),
            records: a.records,
            key,
        })
        .collect();

    if order == GroupOrder::ByMeasure {
        groups.sort_by(|a, b| compare_values(a.value, b.value).then_with(|| a.key.cmp(&b.key)));
    }
    groups
}

fn compare_values(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

// ---------------------------------------------------------------------------
// Summary metrics
// ---------------------------------------------------------------------------

/// Scalar metrics over a subset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SummaryMetrics {
    /// Sum of total price; `0` for an empty subset.
    pub total_sales: f64,
    /// Mean of the ratings that are present; `None` when there are none.
    pub average_rating: Option<f64>,
    /// Mean total price per order; `0` for an empty subset.
    pub average_sale: f64,
    pub transactions: usize,
}

pub fn summarize(subset: &Subset<'_>) -> SummaryMetrics {
    let mut sales = Accumulator::default();
    let mut ratings = Accumulator::default();
    for record in subset.iter() {
        sales.push(MeasureColumn::Total.value(record));
        ratings.push(MeasureColumn::Rating.value(record));
    }

    SummaryMetrics {
        total_sales: sales.sum,
        average_rating: ratings.finish(Reduction::Mean),
        average_sale: sales.finish(Reduction::Mean).unwrap_or(0.0),
        transactions: sales.records,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::data::filter::{apply, FilterSelection};
    use crate::data::model::tests::record;
    use crate::data::model::SalesDataset;

    fn three_orders() -> SalesDataset {
        SalesDataset::from_records(vec![
            record("1", "A", 10.0),
            record("2", "A", 20.0),
            record("3", "B", 5.0),
        ])
        .unwrap()
    }

    fn pairs(groups: &[Group]) -> Vec<(String, f64)> {
        groups
            .iter()
            .map(|g| (g.key.to_string(), g.value.unwrap()))
            .collect()
    }

    #[test]
    fn sum_by_city_ordered_by_measure() {
        let ds = three_orders();
        let groups = aggregate(
            &Subset::all(&ds),
            Dimension::Category(CategoryColumn::City),
            Measure::TOTAL_SALES,
            GroupOrder::ByMeasure,
        );
        assert_eq!(pairs(&groups), [("B".to_string(), 5.0), ("A".to_string(), 30.0)]);
        assert_eq!(groups[1].records, 2);
    }

    #[test]
    fn hours_are_ordered_naturally() {
        let mut recs = Vec::new();
        for (i, hour) in [19u8, 9, 10, 9].into_iter().enumerate() {
            let mut r = record(&i.to_string(), "A", 1.0 + i as f64);
            r.hour = hour;
            recs.push(r);
        }
        let ds = SalesDataset::from_records(recs).unwrap();
        let groups = aggregate(
            &Subset::all(&ds),
            Dimension::Hour,
            Measure::TOTAL_SALES,
            GroupOrder::ByDimension,
        );
        let keys: Vec<DimensionKey> = groups.iter().map(|g| g.key.clone()).collect();
        assert_eq!(
            keys,
            [DimensionKey::Hour(9), DimensionKey::Hour(10), DimensionKey::Hour(19)]
        );
        // hour 9 holds orders 1 and 3 → 2.0 + 4.0
        assert_eq!(groups[0].value, Some(6.0));
    }

    #[test]
    fn keys_are_exactly_the_values_present_in_the_subset() {
        let ds = three_orders();
        let subset = apply(&ds, &FilterSelection::new().with(CategoryColumn::City, ["A"]));
        let groups = aggregate(
            &subset,
            Dimension::Category(CategoryColumn::City),
            Measure::TOTAL_SALES,
            GroupOrder::ByDimension,
        );

        let keys: BTreeSet<String> = groups.iter().map(|g| g.key.to_string()).collect();
        let present: BTreeSet<String> = subset.iter().map(|r| r.city.clone()).collect();
        assert_eq!(keys, present);
    }

    #[test]
    fn empty_subset_aggregates_to_nothing() {
        let ds = three_orders();
        let subset = apply(&ds, &FilterSelection::new().with(CategoryColumn::City, ["Z"]));
        let groups = aggregate(&subset, Dimension::Hour, Measure::TOTAL_SALES, GroupOrder::ByMeasure);
        assert!(groups.is_empty());
    }

    #[test]
    fn mean_and_count_skip_missing_ratings() {
        let mut a = record("1", "A", 10.0);
        a.rating = None;
        let mut b = record("2", "A", 10.0);
        b.rating = Some(8.0);
        let mut c = record("3", "B", 10.0);
        c.rating = None;
        let ds = SalesDataset::from_records(vec![a, b, c]).unwrap();
        let subset = Subset::all(&ds);

        let means = aggregate(
            &subset,
            Dimension::Category(CategoryColumn::City),
            Measure::MEAN_RATING,
            GroupOrder::ByMeasure,
        );
        // B has no ratings at all: no value, sorted first
        assert_eq!(means[0].key, DimensionKey::Category("B".into()));
        assert_eq!(means[0].value, None);
        assert_eq!(means[1].value, Some(8.0));

        let counts = aggregate(
            &subset,
            Dimension::Category(CategoryColumn::City),
            Measure {
                column: MeasureColumn::Rating,
                reduction: Reduction::Count,
            },
            GroupOrder::ByDimension,
        );
        assert_eq!(counts[0].value, Some(1.0));
        assert_eq!(counts[0].records, 2);
        assert_eq!(counts[1].value, Some(0.0));
    }

    #[test]
    fn summary_over_orders() {
        let ds = three_orders();
        let m = summarize(&Subset::all(&ds));
        assert_eq!(m.total_sales, 35.0);
        assert_eq!(m.transactions, 3);
        assert!((m.average_sale - 35.0 / 3.0).abs() < 1e-9);
        assert_eq!(m.average_rating, Some(7.0));
    }

    #[test]
    fn summary_of_empty_subset_uses_placeholders() {
        let ds = three_orders();
        let subset = apply(&ds, &FilterSelection::new().with(CategoryColumn::City, ["Z"]));
        let m = summarize(&subset);
        assert_eq!(m.total_sales, 0.0);
        assert_eq!(m.average_sale, 0.0);
        assert_eq!(m.average_rating, None);
        assert_eq!(m.transactions, 0);
    }

    #[test]
    fn all_ratings_missing_gives_no_average() {
        let mut a = record("1", "A", 10.0);
        a.rating = None;
        let ds = SalesDataset::from_records(vec![a]).unwrap();
        let m = summarize(&Subset::all(&ds));
        assert_eq!(m.average_rating, None);
        assert_eq!(m.average_sale, 10.0);
    }
}
