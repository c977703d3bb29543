//! Pure summaries over a filtered set of records.
//!
//! Everything here is recomputed from scratch for every view; nothing is
//! cached between calls.

use std::collections::BTreeMap;

use super::model::{GroupKey, KeyValue, Measure, Record};

/// Sum of `measure` over `rows`. Zero for an empty view.
pub fn total(rows: &[&Record], measure: Measure) -> f64 {
    rows.iter().map(|r| r.measure(measure)).sum()
}

/// Profit as a percentage of sales, or zero when there are no sales.
pub fn margin_percent(rows: &[&Record]) -> f64 {
    let sales = total(rows, Measure::Sales);
    if sales > 0.0 {
        total(rows, Measure::Profit) / sales * 100.0
    } else {
        0.0
    }
}

/// Headline numbers for the KPI cards.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Kpis {
    pub sales: f64,
    pub profit: f64,
    pub units_sold: f64,
    pub margin_percent: f64,
    pub rows: usize,
}

pub fn kpis(rows: &[&Record]) -> Kpis {
    Kpis {
        sales: total(rows, Measure::Sales),
        profit: total(rows, Measure::Profit),
        units_sold: total(rows, Measure::UnitsSold),
        margin_percent: margin_percent(rows),
        rows: rows.len(),
    }
}

// ---------------------------------------------------------------------------
// Grouped sums
// ---------------------------------------------------------------------------

/// One output row of [`group_sum`]: the key tuple and one sum per measure.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupRow {
    pub keys: Vec<KeyValue>,
    pub values: Vec<f64>,
}

impl GroupRow {
    /// Key components joined for display, e.g. `Carretera / Government`.
    pub fn label(&self) -> String {
        self.keys
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" / ")
    }
}

/// Sum each of `values` per distinct combination of `by`, in ascending key order.
pub fn group_sum(rows: &[&Record], by: &[GroupKey], values: &[Measure]) -> Vec<GroupRow> {
    let mut groups: BTreeMap<Vec<KeyValue>, Vec<f64>> = BTreeMap::new();
    for r in rows {
        let key: Vec<KeyValue> = by.iter().map(|&k| r.key(k)).collect();
        let sums = groups.entry(key).or_insert_with(|| vec![0.0; values.len()]);
        for (sum, &m) in sums.iter_mut().zip(values) {
            *sum += r.measure(m);
        }
    }
    groups
        .into_iter()
        .map(|(keys, values)| GroupRow { keys, values })
        .collect()
}

/// A group's sum together with its share of the grand total.
#[derive(Debug, Clone, PartialEq)]
pub struct Share {
    pub key: KeyValue,
    pub value: f64,
    pub percent: f64,
}

/// Per-group sum of `measure` and its percentage of the overall total.
pub fn share_of_total(rows: &[&Record], by: GroupKey, measure: Measure) -> Vec<Share> {
    let grand = total(rows, measure);
    group_sum(rows, &[by], &[measure])
        .into_iter()
        .map(|g| {
            let value = g.values[0];
            let percent = if grand != 0.0 { value / grand * 100.0 } else { 0.0 };
            Share {
                key: g.keys.into_iter().next().unwrap_or(KeyValue::Text(String::new())),
                value,
                percent,
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Distribution statistics
// ---------------------------------------------------------------------------

/// Five-number summary of a group, for box plots.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxStats {
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
    pub n: usize,
}

impl BoxStats {
    /// `None` for an empty sample.
    pub fn from_values(mut values: Vec<f64>) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        values.sort_by(f64::total_cmp);
        Some(BoxStats {
            min: values[0],
            q1: quantile(&values, 0.25),
            median: quantile(&values, 0.5),
            q3: quantile(&values, 0.75),
            max: values[values.len() - 1],
            n: values.len(),
        })
    }
}

/// Linear-interpolation quantile of an ascending, non-empty slice.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = (sorted.len() - 1) as f64 * q;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

/// Box statistics of `measure` for every group of `by`.
pub fn box_stats(rows: &[&Record], by: &[GroupKey], measure: Measure) -> Vec<(Vec<KeyValue>, BoxStats)> {
    let mut groups: BTreeMap<Vec<KeyValue>, Vec<f64>> = BTreeMap::new();
    for r in rows {
        let key = by.iter().map(|&k| r.key(k)).collect();
        groups.entry(key).or_default().push(r.measure(measure));
    }
    groups
        .into_iter()
        .filter_map(|(k, v)| BoxStats::from_values(v).map(|s| (k, s)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::{filter, FilterSelection};
    use crate::data::loader::load_csv_reader;
    use crate::data::model::fixtures::record;
    use crate::data::model::Dimension;

    const EPS: f64 = 1e-9;

    #[test]
    fn empty_view_is_all_zero() {
        let rows: Vec<&Record> = Vec::new();
        assert_eq!(total(&rows, Measure::Sales), 0.0);
        assert_eq!(margin_percent(&rows), 0.0);
        assert_eq!(kpis(&rows), Kpis::default());
        assert!(group_sum(&rows, &[GroupKey::Country], &[Measure::Sales]).is_empty());
        assert!(share_of_total(&rows, GroupKey::Segment, Measure::Sales).is_empty());
    }

    #[test]
    fn zero_sales_margin_is_zero() {
        let a = record("US", "A", "Gov", 0.0, 25.0);
        let b = record("US", "B", "Gov", 0.0, -3.0);
        assert_eq!(margin_percent(&[&a, &b]), 0.0);
    }

    #[test]
    fn group_by_country_is_consistent_with_total() {
        let recs = vec![
            record("US", "A", "Gov", 100.0, 10.0),
            record("FR", "A", "Ent", 50.0, 5.0),
            record("US", "B", "Gov", 200.0, -5.0),
            record("DE", "B", "Ent", 70.25, 7.0),
        ];
        let rows: Vec<&Record> = recs.iter().collect();
        let groups = group_sum(&rows, &[GroupKey::Country], &[Measure::Sales, Measure::Profit]);

        let names: Vec<String> = groups.iter().map(|g| g.label()).collect();
        assert_eq!(names, vec!["DE", "FR", "US"]);
        assert!((groups[2].values[0] - 300.0).abs() < EPS);
        assert!((groups[2].values[1] - 5.0).abs() < EPS);

        let sales_sum: f64 = groups.iter().map(|g| g.values[0]).sum();
        let profit_sum: f64 = groups.iter().map(|g| g.values[1]).sum();
        assert!((sales_sum - total(&rows, Measure::Sales)).abs() < EPS);
        assert!((profit_sum - total(&rows, Measure::Profit)).abs() < EPS);
    }

    #[test]
    fn group_by_date_and_product() {
        let mut a = record("US", "A", "Gov", 1.0, 0.0);
        let mut b = record("US", "B", "Gov", 2.0, 0.0);
        let c = record("FR", "A", "Gov", 4.0, 0.0);
        a.date = chrono::NaiveDate::from_ymd_opt(2014, 2, 1).unwrap();
        b.date = a.date;
        let groups = group_sum(&[&a, &b, &c], &[GroupKey::Date, GroupKey::Product], &[Measure::Sales]);

        assert_eq!(groups.len(), 3);
        // 2014-01-01/A comes first, then 2014-02-01/A and 2014-02-01/B
        assert_eq!(groups[0].values, vec![4.0]);
        assert_eq!(groups[1].keys[1], KeyValue::Text("A".into()));
        assert_eq!(groups[2].keys[1], KeyValue::Text("B".into()));
    }

    #[test]
    fn shares_sum_to_hundred() {
        let recs = vec![
            record("US", "A", "Gov", 30.0, 0.0),
            record("US", "A", "Ent", 60.0, 0.0),
            record("US", "A", "Mid", 10.0, 0.0),
        ];
        let rows: Vec<&Record> = recs.iter().collect();
        let shares = share_of_total(&rows, GroupKey::Segment, Measure::Sales);
        let pct: f64 = shares.iter().map(|s| s.percent).sum();
        assert!((pct - 100.0).abs() < EPS);
        assert!((shares[0].percent - 60.0).abs() < EPS); // "Ent"
    }

    #[test]
    fn box_stats_interpolate_linearly() {
        let s = BoxStats::from_values(vec![4.0, 1.0, 3.0, 2.0]).unwrap();
        assert_eq!(s.min, 1.0);
        assert!((s.q1 - 1.75).abs() < EPS);
        assert!((s.median - 2.5).abs() < EPS);
        assert!((s.q3 - 3.25).abs() < EPS);
        assert_eq!(s.max, 4.0);
        assert_eq!(s.n, 4);
        assert!(BoxStats::from_values(Vec::new()).is_none());

        let single = BoxStats::from_values(vec![7.0]).unwrap();
        assert_eq!((single.q1, single.median, single.q3), (7.0, 7.0, 7.0));
    }

    #[test]
    fn box_stats_per_group() {
        let recs = vec![
            record("US", "A", "Gov", 10.0, 0.0),
            record("US", "A", "Gov", 20.0, 0.0),
            record("FR", "A", "Gov", 5.0, 0.0),
        ];
        let rows: Vec<&Record> = recs.iter().collect();
        let stats = box_stats(&rows, &[GroupKey::Country], Measure::Sales);
        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].1.n, 1);
        assert!((stats[1].1.median - 15.0).abs() < EPS);
    }

    #[test]
    fn end_to_end_us_filter() {
        let csv = "\
Date,Country,Product,Segment,Sales,Profit,Units Sold,COGS
2014-01-01,US,A,Gov,$100,$10,1,$90
2014-01-01,US,B,Gov,$200,($5),2,$205
2014-01-01,FR,A,Gov,$50,$5,1,$45
";
        let ds = load_csv_reader(csv.as_bytes()).unwrap();
        let mut sel = FilterSelection::full(&ds.lov);
        sel.set(Dimension::Country, ["US".to_string()]);

        let view = filter(&ds, &sel);
        let rows = view.rows(&ds);
        assert_eq!(rows.len(), 2);
        assert!((total(&rows, Measure::Sales) - 300.0).abs() < EPS);
        assert!((total(&rows, Measure::Profit) - 5.0).abs() < EPS);
        assert!((margin_percent(&rows) - 5.0 / 3.0).abs() < 1e-6);

        let k = kpis(&rows);
        assert_eq!(k.rows, 2);
        assert!((k.units_sold - 3.0).abs() < EPS);
    }
}
