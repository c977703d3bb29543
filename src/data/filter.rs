use std::collections::BTreeSet;

use super::model::{Dataset, Dimension, DistinctValueLists, Record};

// ---------------------------------------------------------------------------
// FilterSelection – which values are allowed per dimension
// ---------------------------------------------------------------------------

/// Selected values for each filterable dimension.
///
/// Membership is strict: an empty set for any dimension matches nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSelection {
    pub countries: BTreeSet<String>,
    pub products: BTreeSet<String>,
    pub segments: BTreeSet<String>,
}

impl FilterSelection {
    /// Every distinct value selected (i.e., show everything).
    pub fn full(lov: &DistinctValueLists) -> Self {
        FilterSelection {
            countries: lov.countries.iter().cloned().collect(),
            products: lov.products.iter().cloned().collect(),
            segments: lov.segments.iter().cloned().collect(),
        }
    }

    pub fn get(&self, dimension: Dimension) -> &BTreeSet<String> {
        match dimension {
            Dimension::Country => &self.countries,
            Dimension::Product => &self.products,
            Dimension::Segment => &self.segments,
        }
    }

    fn get_mut(&mut self, dimension: Dimension) -> &mut BTreeSet<String> {
        match dimension {
            Dimension::Country => &mut self.countries,
            Dimension::Product => &mut self.products,
            Dimension::Segment => &mut self.segments,
        }
    }

    /// Replace the selection of one dimension.
    pub fn set(&mut self, dimension: Dimension, values: impl IntoIterator<Item = String>) {
        *self.get_mut(dimension) = values.into_iter().collect();
    }

    /// Flip a single value in or out of a dimension's selection.
    pub fn toggle(&mut self, dimension: Dimension, value: &str) {
        let selected = self.get_mut(dimension);
        if !selected.remove(value) {
            selected.insert(value.to_string());
        }
    }

    pub fn select_all(&mut self, dimension: Dimension, lov: &DistinctValueLists) {
        self.set(dimension, lov.get(dimension).iter().cloned());
    }

    pub fn select_none(&mut self, dimension: Dimension) {
        self.get_mut(dimension).clear();
    }

    /// Whether `record` passes all three dimensions.
    pub fn matches(&self, record: &Record) -> bool {
        Dimension::ALL
            .iter()
            .all(|&d| self.get(d).contains(record.dimension(d)))
    }
}

// ---------------------------------------------------------------------------
// FilteredView – ordered indices of matching records
// ---------------------------------------------------------------------------

/// The records of a [`Dataset`] that pass a [`FilterSelection`],
/// stored as ascending indices so the view never outlives its dataset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilteredView {
    indices: Vec<usize>,
}

impl FilteredView {
    /// A view of every record in `dataset`.
    pub fn all(dataset: &Dataset) -> Self {
        FilteredView {
            indices: (0..dataset.len()).collect(),
        }
    }

    #[cfg(test)]
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Iterate the matching records in dataset order.
    pub fn records<'a>(&'a self, dataset: &'a Dataset) -> impl Iterator<Item = &'a Record> + 'a {
        self.indices.iter().filter_map(move |&i| dataset.records.get(i))
    }

    /// Collect the matching records for the aggregation functions.
    pub fn rows<'a>(&'a self, dataset: &'a Dataset) -> Vec<&'a Record> {
        self.records(dataset).collect()
    }
}

/// Return the stable subset of `dataset` whose country, product and segment
/// are all members of `selection`.
pub fn filter(dataset: &Dataset, selection: &FilterSelection) -> FilteredView {
    let indices = dataset
        .records
        .iter()
        .enumerate()
        .filter(|(_, r)| selection.matches(r))
        .map(|(i, _)| i)
        .collect();
    FilteredView { indices }
}

/// Recompute the view after the presentation layer changed `selection`.
pub fn on_filter_changed(dataset: &Dataset, selection: &FilterSelection) -> FilteredView {
    let view = filter(dataset, selection);
    log::debug!(
        "Filter changed: {}/{}/{} selected -> {} of {} records",
        selection.countries.len(),
        selection.products.len(),
        selection.segments.len(),
        view.len(),
        dataset.len()
    );
    view
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::fixtures::record;

    fn dataset() -> Dataset {
        Dataset::from_records(vec![
            record("US", "A", "Gov", 100.0, 10.0),
            record("US", "B", "Gov", 200.0, -5.0),
            record("FR", "A", "Ent", 50.0, 5.0),
            record("DE", "B", "Ent", 70.0, 7.0),
            record("US", "A", "Ent", 30.0, 3.0),
        ])
    }

    #[test]
    fn full_selection_is_identity() {
        let ds = dataset();
        let sel = FilterSelection::full(&ds.lov);
        let view = filter(&ds, &sel);
        assert_eq!(view, FilteredView::all(&ds));
        let rows = view.rows(&ds);
        assert_eq!(rows.len(), ds.len());
        assert!(rows.iter().zip(&ds.records).all(|(a, b)| *a == b));
    }

    #[test]
    fn empty_dimension_matches_nothing() {
        let ds = dataset();
        for dim in Dimension::ALL {
            let mut sel = FilterSelection::full(&ds.lov);
            sel.select_none(dim);
            assert!(filter(&ds, &sel).is_empty(), "{dim:?}");
        }
    }

    #[test]
    fn result_is_ordered_subsequence_of_matches() {
        let ds = dataset();
        let mut sel = FilterSelection::full(&ds.lov);
        sel.set(Dimension::Country, ["US".to_string()]);
        sel.toggle(Dimension::Segment, "Gov");

        let view = filter(&ds, &sel);
        assert_eq!(view.indices(), &[4]);

        sel.toggle(Dimension::Segment, "Gov");
        let view = filter(&ds, &sel);
        assert_eq!(view.indices(), &[0, 1, 4]);
        assert!(view.indices().windows(2).all(|w| w[0] < w[1]));
        for r in view.records(&ds) {
            assert!(sel.countries.contains(&r.country));
            assert!(sel.products.contains(&r.product));
            assert!(sel.segments.contains(&r.segment));
        }
    }

    #[test]
    fn unknown_values_match_nothing() {
        let ds = dataset();
        let mut sel = FilterSelection::full(&ds.lov);
        sel.set(Dimension::Product, ["Z".to_string()]);
        assert!(on_filter_changed(&ds, &sel).is_empty());
    }

    #[test]
    fn select_all_restores_dimension() {
        let ds = dataset();
        let mut sel = FilterSelection::full(&ds.lov);
        sel.select_none(Dimension::Product);
        sel.select_all(Dimension::Product, &ds.lov);
        assert_eq!(sel, FilterSelection::full(&ds.lov));
    }
}
