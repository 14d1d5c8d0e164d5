use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::error::LoadError;

// ---------------------------------------------------------------------------
// CategoryColumn – the filterable / groupable text columns
// ---------------------------------------------------------------------------

/// The categorical columns of the sales table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryColumn {
    City,
    CustomerType,
    Gender,
    ProductLine,
}

impl CategoryColumn {
    pub const ALL: [CategoryColumn; 4] = [
        CategoryColumn::City,
        CategoryColumn::CustomerType,
        CategoryColumn::Gender,
        CategoryColumn::ProductLine,
    ];

    /// Header name in the source file.
    pub fn header(self) -> &'static str {
        match self {
            CategoryColumn::City => "city",
            CategoryColumn::CustomerType => "customer_type",
            CategoryColumn::Gender => "gender",
            CategoryColumn::ProductLine => "product_line",
        }
    }

    /// Human readable name for widgets and chart titles.
    pub fn label(self) -> &'static str {
        match self {
            CategoryColumn::City => "City",
            CategoryColumn::CustomerType => "Customer type",
            CategoryColumn::Gender => "Gender",
            CategoryColumn::ProductLine => "Product line",
        }
    }
}

impl fmt::Display for CategoryColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Record – one sales transaction
// ---------------------------------------------------------------------------

/// A single sales transaction (one row of the source table).
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub order_id: String,
    pub city: String,
    pub customer_type: String,
    pub gender: String,
    pub product_line: String,
    /// Total price of the order.
    pub total: f64,
    /// Customer rating; `None` when the cell was blank.
    pub rating: Option<f64>,
    /// Raw time-of-day text as found in the source.
    pub time: String,
    /// Derived from `time` at load time, always in `0..=23`.
    pub hour: u8,
}

impl Record {
    /// Value of a categorical column.
    pub fn category(&self, column: CategoryColumn) -> &str {
        match column {
            CategoryColumn::City => &self.city,
            CategoryColumn::CustomerType => &self.customer_type,
            CategoryColumn::Gender => &self.gender,
            CategoryColumn::ProductLine => &self.product_line,
        }
    }
}

/// Extract the hour from a `HH:MM:SS` (or `HH:MM`) time-of-day string.
pub fn hour_of_day(time: &str) -> Result<u8, chrono::ParseError> {
    let time = time.trim();
    let parsed = NaiveTime::parse_from_str(time, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(time, "%H:%M"))?;
    // NaiveTime::hour is 0..=23
    Ok(parsed.hour() as u8)
}

// ---------------------------------------------------------------------------
// SalesDataset – the complete loaded table
// ---------------------------------------------------------------------------

/// The full parsed table with the distinct values of each category column.
///
/// Immutable once built: filtering produces index views, never a modified copy.
#[derive(Debug, Clone, Default)]
pub struct SalesDataset {
    records: Vec<Record>,
    categories: BTreeMap<CategoryColumn, BTreeSet<String>>,
}

impl SalesDataset {
    /// Build the category index and check order-id uniqueness.
    pub fn from_records(records: Vec<Record>) -> Result<Self, LoadError> {
        let mut seen: HashSet<&str> = HashSet::with_capacity(records.len());
        for rec in &records {
            if !seen.insert(rec.order_id.as_str()) {
                return Err(LoadError::DuplicateOrderId(rec.order_id.clone()));
            }
        }

        let mut categories: BTreeMap<CategoryColumn, BTreeSet<String>> = CategoryColumn::ALL
            .iter()
            .map(|&col| (col, BTreeSet::new()))
            .collect();
        for rec in &records {
            for col in CategoryColumn::ALL {
                categories
                    .entry(col)
                    .or_default()
                    .insert(rec.category(col).to_string());
            }
        }

        Ok(SalesDataset {
            records,
            categories,
        })
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn get(&self, index: usize) -> Option<&Record> {
        self.records.get(index)
    }

    /// Sorted distinct values of a category column.
    pub fn distinct_values(&self, column: CategoryColumn) -> &BTreeSet<String> {
        static EMPTY: BTreeSet<String> = BTreeSet::new();
        self.categories.get(&column).unwrap_or(&EMPTY)
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
