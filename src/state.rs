use std::sync::Arc;

use crate::color::ColorMap;
use crate::data::filter::{on_filter_changed, FilterSelection, FilteredView};
use crate::data::model::{Dataset, Dimension};

// ---------------------------------------------------------------------------
// Session – per-user filter state
// ---------------------------------------------------------------------------

/// The filter selection of one user and the view derived from it.
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub selection: FilterSelection,
    pub view: FilteredView,
}

impl Session {
    /// A session with every value selected.
    pub fn new(dataset: &Dataset) -> Self {
        Session {
            selection: FilterSelection::full(&dataset.lov),
            view: FilteredView::all(dataset),
        }
    }

    /// Recompute `view` from the current selection.
    pub fn on_filter_changed(&mut self, dataset: &Dataset) {
        self.view = on_filter_changed(dataset, &self.selection);
    }

    pub fn toggle(&mut self, dataset: &Dataset, dimension: Dimension, value: &str) {
        self.selection.toggle(dimension, value);
        self.on_filter_changed(dataset);
    }

    pub fn select_all(&mut self, dataset: &Dataset, dimension: Dimension) {
        self.selection.select_all(dimension, &dataset.lov);
        self.on_filter_changed(dataset);
    }

    pub fn select_none(&mut self, dataset: &Dataset, dimension: Dimension) {
        self.selection.select_none(dimension);
        self.on_filter_changed(dataset);
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// Dashboard pages, in navigation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Page {
    #[default]
    ExecutiveSummary,
    RegionalAnalytics,
    ProductDeepDive,
    DataExplorer,
}

impl Page {
    pub const ALL: [Page; 4] = [
        Page::ExecutiveSummary,
        Page::RegionalAnalytics,
        Page::ProductDeepDive,
        Page::DataExplorer,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Page::ExecutiveSummary => "Executive Summary",
            Page::RegionalAnalytics => "Regional Analytics",
            Page::ProductDeepDive => "Product Deep-Dive",
            Page::DataExplorer => "Data Explorer",
        }
    }
}

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Loaded dataset (None until a file is loaded).
    pub dataset: Option<Arc<Dataset>>,

    pub session: Session,

    /// Stable colours per product and per country.
    pub product_colors: ColorMap,
    pub country_colors: ColorMap,

    pub page: Page,

    /// Data explorer search text and current page.
    pub search: String,
    pub explorer_page: usize,
    pub page_size: usize,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(page_size: usize) -> Self {
        Self {
            dataset: None,
            session: Session::default(),
            product_colors: ColorMap::default(),
            country_colors: ColorMap::default(),
            page: Page::default(),
            search: String::new(),
            explorer_page: 0,
            page_size,
            status_message: None,
        }
    }

    /// Ingest a newly loaded dataset and reset filters to "everything".
    pub fn set_dataset(&mut self, dataset: Dataset) {
        self.session = Session::new(&dataset);
        self.product_colors = ColorMap::new(&dataset.lov.products);
        self.country_colors = ColorMap::new(&dataset.lov.countries);
        self.explorer_page = 0;
        self.dataset = Some(Arc::new(dataset));
        self.status_message = None;
    }

    pub fn toggle_filter_value(&mut self, dimension: Dimension, value: &str) {
        if let Some(ds) = &self.dataset {
            self.session.toggle(ds, dimension, value);
            self.explorer_page = 0;
        }
    }

    pub fn select_all(&mut self, dimension: Dimension) {
        if let Some(ds) = &self.dataset {
            self.session.select_all(ds, dimension);
            self.explorer_page = 0;
        }
    }

    pub fn select_none(&mut self, dimension: Dimension) {
        if let Some(ds) = &self.dataset {
            self.session.select_none(ds, dimension);
            self.explorer_page = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::fixtures::record;

    fn state() -> AppState {
        let mut st = AppState::new(15);
        st.set_dataset(Dataset::from_records(vec![
            record("US", "A", "Gov", 100.0, 10.0),
            record("FR", "B", "Ent", 50.0, 5.0),
        ]));
        st
    }

    #[test]
    fn none_then_all_restores_view() {
        let mut st = state();
        assert_eq!(st.session.view.len(), 2);

        st.select_none(Dimension::Segment);
        assert!(st.session.view.is_empty());

        st.select_all(Dimension::Segment);
        assert_eq!(st.session.view.len(), 2);
    }

    #[test]
    fn toggle_recomputes_view() {
        let mut st = state();
        st.explorer_page = 3;
        st.toggle_filter_value(Dimension::Country, "US");
        assert_eq!(st.session.view.indices(), &[1]);
        assert_eq!(st.explorer_page, 0);
    }

    #[test]
    fn sessions_are_independent() {
        let st = state();
        let ds = st.dataset.clone().unwrap();
        let mut a = Session::new(&ds);
        let b = Session::new(&ds);
        a.select_none(&ds, Dimension::Country);
        assert!(a.view.is_empty());
        assert_eq!(b.view.len(), 2);
    }
}
