use std::collections::{BTreeMap, BTreeSet};

use super::model::{CategoryColumn, Record, SalesDataset};

// ---------------------------------------------------------------------------
// Filter selection: which values are allowed per column
// ---------------------------------------------------------------------------

/// Per-column allow-lists.
///
/// A column that is absent, or whose set is empty, imposes no restriction.
/// Columns combine with logical AND.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSelection {
    allowed: BTreeMap<CategoryColumn, BTreeSet<String>>,
}

impl FilterSelection {
    /// No restriction on any column.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style: restrict `column` to `values`.
    pub fn with<I, S>(mut self, column: CategoryColumn, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed
            .insert(column, values.into_iter().map(Into::into).collect());
        self
    }

    /// Allowed values for `column` (empty means unrestricted).
    pub fn allowed(&self, column: CategoryColumn) -> Option<&BTreeSet<String>> {
        self.allowed.get(&column)
    }

    pub fn is_selected(&self, column: CategoryColumn, value: &str) -> bool {
        self.allowed
            .get(&column)
            .is_some_and(|set| set.contains(value))
    }

    /// Toggle a single value in a column's allow-list.
    pub fn toggle(&mut self, column: CategoryColumn, value: &str) {
        let selected = self.allowed.entry(column).or_default();
        if !selected.remove(value) {
            selected.insert(value.to_string());
        }
    }

    /// Allow every distinct value the dataset has for `column`.
    pub fn select_all(&mut self, column: CategoryColumn, dataset: &SalesDataset) {
        self.allowed
            .insert(column, dataset.distinct_values(column).clone());
    }

    /// Empty the allow-list, which lifts the restriction on `column`.
    pub fn clear(&mut self, column: CategoryColumn) {
        self.allowed.remove(&column);
    }

    /// Whether `record` passes every column's allow-list.
    pub fn matches(&self, record: &Record) -> bool {
        self.allowed
            .iter()
            .all(|(&column, selected)| {
                selected.is_empty() || selected.contains(record.category(column))
            })
    }

    /// Whether no column restricts anything.
    pub fn is_unrestricted(&self) -> bool {
        self.allowed.values().all(BTreeSet::is_empty)
    }
}

/// Initialise a [`FilterSelection`] with every value of `columns` selected,
/// which is how the sidebar starts out.
pub fn init_selection(dataset: &SalesDataset, columns: &[CategoryColumn]) -> FilterSelection {
    let mut selection = FilterSelection::new();
    for &column in columns {
        selection.select_all(column, dataset);
    }
    selection
}

// ---------------------------------------------------------------------------
// Subset – a borrowed view over the matching records
// ---------------------------------------------------------------------------

/// The records of a dataset that passed a filter, in source order.
#[derive(Debug, Clone)]
pub struct Subset<'a> {
    dataset: &'a SalesDataset,
    indices: Vec<usize>,
}

impl<'a> Subset<'a> {
    /// The whole dataset as a subset.
    pub fn all(dataset: &'a SalesDataset) -> Self {
        Subset {
            dataset,
            indices: (0..dataset.len()).collect(),
        }
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a Record> + '_ {
        let records = self.dataset.records();
        self.indices.iter().map(move |&i| &records[i])
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// An empty subset is a valid state ("no matching orders").
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// Return the records that pass `selection`.
pub fn apply<'a>(dataset: &'a SalesDataset, selection: &FilterSelection) -> Subset<'a> {
    if selection.is_unrestricted() {
        return Subset::all(dataset);
    }
    let indices = dataset
        .records()
        .iter()
        .enumerate()
        .filter(|(_, rec)| selection.matches(rec))
        .map(|(i, _)| i)
        .collect();
    Subset { dataset, indices }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::tests::record;

    fn three_orders() -> SalesDataset {
        let mut b = record("2", "A", 20.0);
        b.gender = "Male".into();
        SalesDataset::from_records(vec![record("1", "A", 10.0), b, record("3", "B", 5.0)])
            .unwrap()
    }

    fn ids(subset: &Subset<'_>) -> Vec<String> {
        subset.iter().map(|r| r.order_id.clone()).collect()
    }

    #[test]
    fn filtering_on_city_keeps_matching_rows() {
        let ds = three_orders();
        let sel = FilterSelection::new().with(CategoryColumn::City, ["A"]);
        let subset = apply(&ds, &sel);

        assert_eq!(ids(&subset), ["1", "2"]);
        assert_eq!(subset.iter().map(|r| r.total).sum::<f64>(), 30.0);
    }

    #[test]
    fn all_empty_selection_returns_everything() {
        let ds = three_orders();
        let sel = FilterSelection::new()
            .with(CategoryColumn::City, Vec::<String>::new())
            .with(CategoryColumn::CustomerType, Vec::<String>::new())
            .with(CategoryColumn::Gender, Vec::<String>::new())
            .with(CategoryColumn::ProductLine, Vec::<String>::new());

        assert_eq!(apply(&ds, &sel).len(), 3);
    }

    #[test]
    fn empty_set_equals_omitting_the_column() {
        let ds = three_orders();
        let with_empty = FilterSelection::new()
            .with(CategoryColumn::Gender, ["Female"])
            .with(CategoryColumn::City, Vec::<String>::new());
        let omitted = FilterSelection::new().with(CategoryColumn::Gender, ["Female"]);

        assert_eq!(apply(&ds, &with_empty).indices(), apply(&ds, &omitted).indices());
    }

    #[test]
    fn columns_combine_with_and() {
        let ds = three_orders();
        let sel = FilterSelection::new()
            .with(CategoryColumn::City, ["A"])
            .with(CategoryColumn::Gender, ["Female"]);
        assert_eq!(ids(&apply(&ds, &sel)), ["1"]);
    }

    #[test]
    fn zero_matches_is_an_empty_subset() {
        let ds = three_orders();
        let sel = FilterSelection::new()
            .with(CategoryColumn::City, ["B"])
            .with(CategoryColumn::Gender, ["Male"]);
        let subset = apply(&ds, &sel);
        assert!(subset.is_empty());
        assert_eq!(subset.iter().count(), 0);
    }

    #[test]
    fn subset_never_exceeds_dataset() {
        let ds = three_orders();
        let cities = [vec![], vec!["A"], vec!["B"], vec!["A", "B"], vec!["C"]];
        let genders = [vec![], vec!["Male"], vec!["Female", "Male"]];
        for c in &cities {
            for g in &genders {
                let sel = FilterSelection::new()
                    .with(CategoryColumn::City, c.iter().copied())
                    .with(CategoryColumn::Gender, g.iter().copied());
                assert!(apply(&ds, &sel).len() <= ds.len());
            }
        }
    }

    #[test]
    fn toggle_and_clear_edit_the_allow_list() {
        let ds = three_orders();
        let mut sel = init_selection(&ds, &[CategoryColumn::City]);
        assert!(sel.is_selected(CategoryColumn::City, "B"));

        sel.toggle(CategoryColumn::City, "B");
        assert!(!sel.is_selected(CategoryColumn::City, "B"));
        assert_eq!(apply(&ds, &sel).len(), 2);

        sel.toggle(CategoryColumn::City, "A");
        assert!(sel.is_unrestricted());
        assert_eq!(apply(&ds, &sel).len(), 3);

        sel.select_all(CategoryColumn::City, &ds);
        sel.clear(CategoryColumn::City);
        assert_eq!(sel.allowed(CategoryColumn::City), None);
    }
}
