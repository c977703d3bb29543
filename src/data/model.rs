use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chrono::NaiveDate;

// ---------------------------------------------------------------------------
// Measure / Dimension / GroupKey – the closed set of columns we reason about
// ---------------------------------------------------------------------------

/// Numeric columns that are normalized at load time and summed by views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Measure {
    Sales,
    Profit,
    UnitsSold,
    Cogs,
}

impl Measure {
    pub const ALL: [Measure; 4] = [
        Measure::Sales,
        Measure::Profit,
        Measure::UnitsSold,
        Measure::Cogs,
    ];

    /// Column label in the source file.
    pub fn label(self) -> &'static str {
        match self {
            Measure::Sales => "Sales",
            Measure::Profit => "Profit",
            Measure::UnitsSold => "Units Sold",
            Measure::Cogs => "COGS",
        }
    }
}

/// Columns the user can filter on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Dimension {
    Country,
    Product,
    Segment,
}

impl Dimension {
    pub const ALL: [Dimension; 3] = [Dimension::Country, Dimension::Product, Dimension::Segment];

    pub fn label(self) -> &'static str {
        match self {
            Dimension::Country => "Country",
            Dimension::Product => "Product",
            Dimension::Segment => "Segment",
        }
    }
}

/// Columns a grouped sum may be keyed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupKey {
    Date,
    Country,
    Product,
    Segment,
    DiscountBand,
}

// ---------------------------------------------------------------------------
// KeyValue – one component of a group key
// ---------------------------------------------------------------------------

/// A grouping key value. Dates order chronologically, text lexically.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum KeyValue {
    Date(NaiveDate),
    Text(String),
}

impl fmt::Display for KeyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            KeyValue::Text(s) => write!(f, "{s}"),
        }
    }
}

impl KeyValue {
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            KeyValue::Date(d) => Some(*d),
            KeyValue::Text(_) => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Record – one row of the sales table
// ---------------------------------------------------------------------------

/// A single sales row after cleaning.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub date: NaiveDate,
    pub country: String,
    pub product: String,
    pub segment: String,
    pub discount_band: String,
    pub sales: f64,
    pub profit: f64,
    pub units_sold: f64,
    pub cogs: f64,
    /// Passthrough columns (Manufacturing Price, Month Name, ...) kept verbatim.
    pub extra: BTreeMap<String, String>,
}

impl Record {
    pub fn measure(&self, measure: Measure) -> f64 {
        match measure {
            Measure::Sales => self.sales,
            Measure::Profit => self.profit,
            Measure::UnitsSold => self.units_sold,
            Measure::Cogs => self.cogs,
        }
    }

    pub fn dimension(&self, dimension: Dimension) -> &str {
        match dimension {
            Dimension::Country => &self.country,
            Dimension::Product => &self.product,
            Dimension::Segment => &self.segment,
        }
    }

    pub fn key(&self, key: GroupKey) -> KeyValue {
        match key {
            GroupKey::Date => KeyValue::Date(self.date),
            GroupKey::Country => KeyValue::Text(self.country.clone()),
            GroupKey::Product => KeyValue::Text(self.product.clone()),
            GroupKey::Segment => KeyValue::Text(self.segment.clone()),
            GroupKey::DiscountBand => KeyValue::Text(self.discount_band.clone()),
        }
    }
}

// ---------------------------------------------------------------------------
// DistinctValueLists – selector options per dimension
// ---------------------------------------------------------------------------

/// Sorted, deduplicated values of each filterable dimension.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DistinctValueLists {
    pub countries: Vec<String>,
    pub products: Vec<String>,
    pub segments: Vec<String>,
}

impl DistinctValueLists {
    pub fn from_records(records: &[Record]) -> Self {
        let mut countries = BTreeSet::new();
        let mut products = BTreeSet::new();
        let mut segments = BTreeSet::new();

        for r in records {
            countries.insert(r.country.clone());
            products.insert(r.product.clone());
            segments.insert(r.segment.clone());
        }

        DistinctValueLists {
            countries: countries.into_iter().collect(),
            products: products.into_iter().collect(),
            segments: segments.into_iter().collect(),
        }
    }

    pub fn get(&self, dimension: Dimension) -> &[String] {
        match dimension {
            Dimension::Country => &self.countries,
            Dimension::Product => &self.products,
            Dimension::Segment => &self.segments,
        }
    }
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

/// The full cleaned dataset. Built once, then shared read-only.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub records: Vec<Record>,
    pub lov: DistinctValueLists,
}

impl Dataset {
    pub fn from_records(records: Vec<Record>) -> Self {
        let lov = DistinctValueLists::from_records(&records);
        Dataset { records, lov }
    }

    /// Sorted names of every passthrough column seen in any record.
    pub fn extra_columns(&self) -> Vec<String> {
        let names: BTreeSet<&String> = self.records.iter().flat_map(|r| r.extra.keys()).collect();
        names.into_iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn record(country: &str, product: &str, segment: &str, sales: f64, profit: f64) -> Record {
        Record {
            date: NaiveDate::from_ymd_opt(2014, 1, 1).unwrap(),
            country: country.to_string(),
            product: product.to_string(),
            segment: segment.to_string(),
            discount_band: "None".to_string(),
            sales,
            profit,
            units_sold: 1.0,
            cogs: sales - profit,
            extra: BTreeMap::new(),
        }
    }
}
