use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Date32Array, Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::{Datelike, NaiveDate};
use parquet::arrow::ArrowWriter;
use serde::Serialize;

/// One row in the "financial sample" layout, as the CSV export writes it.
#[derive(Debug, Serialize)]
struct SampleRow {
    #[serde(rename = "Segment")]
    segment: String,
    #[serde(rename = "Country")]
    country: String,
    #[serde(rename = " Product ")]
    product: String,
    #[serde(rename = " Discount Band ")]
    discount_band: String,
    #[serde(rename = "Units Sold")]
    units_sold: String,
    #[serde(rename = "Manufacturing Price")]
    manufacturing_price: String,
    #[serde(rename = "Sale Price")]
    sale_price: String,
    #[serde(rename = "Gross Sales")]
    gross_sales: String,
    #[serde(rename = "Discounts")]
    discounts: String,
    #[serde(rename = " Sales")]
    sales: String,
    #[serde(rename = "COGS")]
    cogs: String,
    #[serde(rename = "Profit")]
    profit: String,
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "Month Number")]
    month_number: u32,
    #[serde(rename = " Month Name ")]
    month_name: String,
    #[serde(rename = "Year")]
    year: i32,
}

/// Numeric twin of [`SampleRow`] for the Parquet output.
struct Sale {
    date: NaiveDate,
    country: &'static str,
    product: &'static str,
    segment: &'static str,
    discount_band: &'static str,
    units_sold: f64,
    manufacturing_price: f64,
    sale_price: f64,
    discounts: f64,
    sales: f64,
    cogs: f64,
    profit: f64,
}

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn range(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.next_f64()
    }

    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[(self.next_u64() % items.len() as u64) as usize]
    }
}

/// `1234.5` → `" $1,234.50 "`, `-5` → `" $(5.00)"`, `0` → `" $-   "`.
fn accounting(v: f64) -> String {
    if v.abs() < 0.005 {
        return " $-   ".to_string();
    }
    let cents = (v.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();
    let mut grouped = String::new();
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let body = format!("{grouped}.{:02}", cents % 100);
    if v < 0.0 {
        format!(" $({body})")
    } else {
        format!(" ${body} ")
    }
}

fn generate(rng: &mut SimpleRng) -> Vec<Sale> {
    let countries: [&str; 5] = ["Canada", "France", "Germany", "Mexico", "United States of America"];
    // (segment, sale price range)
    let segments: [(&str, f64, f64); 5] = [
        ("Government", 7.0, 350.0),
        ("Midmarket", 15.0, 15.0),
        ("Channel Partners", 12.0, 12.0),
        ("Enterprise", 125.0, 125.0),
        ("Small Business", 300.0, 300.0),
    ];
    // (product, manufacturing price)
    let products: [(&str, f64); 6] = [
        ("Carretera", 3.0),
        ("Montana", 5.0),
        ("Paseo", 10.0),
        ("Velo", 120.0),
        ("VTT", 250.0),
        ("Amarilla", 260.0),
    ];
    // (band, discount rate range)
    let bands: [(&str, f64, f64); 4] = [
        ("None", 0.0, 0.0),
        ("Low", 0.01, 0.05),
        ("Medium", 0.05, 0.10),
        ("High", 0.10, 0.15),
    ];

    let mut sales = Vec::new();
    let mut month = NaiveDate::from_ymd_opt(2013, 9, 1).expect("valid start date");
    for _ in 0..16 {
        for _ in 0..44 {
            let &(segment, lo, hi) = rng.pick(&segments);
            let &(product, manufacturing_price) = rng.pick(&products);
            let &(band, d_lo, d_hi) = rng.pick(&bands);
            let country = *rng.pick(&countries);

            let units_sold = (rng.range(200.0, 3000.0) * 2.0).round() / 2.0;
            let sale_price = if hi > lo { *rng.pick(&[lo, 20.0, hi]) } else { lo };
            let gross = units_sold * sale_price;
            let discounts = gross * rng.range(d_lo, d_hi);
            let net = gross - discounts;
            let cogs = units_sold * manufacturing_price.min(sale_price * 0.9) * rng.range(0.8, 1.4);

            sales.push(Sale {
                date: month,
                country,
                product,
                segment,
                discount_band: band,
                units_sold,
                manufacturing_price,
                sale_price,
                discounts,
                sales: net,
                cogs,
                profit: net - cogs,
            });
        }
        month = month
            .checked_add_months(chrono::Months::new(1))
            .expect("month arithmetic within range");
    }
    sales
}

fn write_csv(path: &PathBuf, sales: &[Sale]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating CSV")?;
    for s in sales {
        writer.serialize(SampleRow {
            segment: s.segment.to_string(),
            country: s.country.to_string(),
            product: s.product.to_string(),
            discount_band: s.discount_band.to_string(),
            units_sold: format!(" {:.2} ", s.units_sold),
            manufacturing_price: accounting(s.manufacturing_price),
            sale_price: accounting(s.sale_price),
            gross_sales: accounting(s.sales + s.discounts),
            discounts: accounting(s.discounts),
            sales: accounting(s.sales),
            cogs: accounting(s.cogs),
            profit: accounting(s.profit),
            date: s.date.format("%m/%d/%Y").to_string(),
            month_number: s.date.month(),
            month_name: s.date.format("%B").to_string(),
            year: s.date.year(),
        })?;
    }
    writer.flush()?;
    Ok(())
}

fn write_parquet(path: &PathBuf, sales: &[Sale]) -> Result<()> {
    let strings = |f: fn(&Sale) -> &str| StringArray::from(sales.iter().map(f).collect::<Vec<_>>());
    let floats = |f: fn(&Sale) -> f64| Float64Array::from(sales.iter().map(f).collect::<Vec<_>>());

    let schema = Arc::new(Schema::new(vec![
        Field::new("Date", DataType::Date32, false),
        Field::new("Country", DataType::Utf8, false),
        Field::new("Product", DataType::Utf8, false),
        Field::new("Segment", DataType::Utf8, false),
        Field::new("Discount Band", DataType::Utf8, false),
        Field::new("Units Sold", DataType::Float64, false),
        Field::new("Manufacturing Price", DataType::Float64, false),
        Field::new("Sale Price", DataType::Float64, false),
        Field::new("Discounts", DataType::Float64, false),
        Field::new("Sales", DataType::Float64, false),
        Field::new("COGS", DataType::Float64, false),
        Field::new("Profit", DataType::Float64, false),
    ]));

    let dates = Date32Array::from(
        sales
            .iter()
            .map(|s| s.date.num_days_from_ce() - 719_163) // days since 1970-01-01
            .collect::<Vec<_>>(),
    );

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(dates),
            Arc::new(strings(|s| s.country)),
            Arc::new(strings(|s| s.product)),
            Arc::new(strings(|s| s.segment)),
            Arc::new(strings(|s| s.discount_band)),
            Arc::new(floats(|s| s.units_sold)),
            Arc::new(floats(|s| s.manufacturing_price)),
            Arc::new(floats(|s| s.sale_price)),
            Arc::new(floats(|s| s.discounts)),
            Arc::new(floats(|s| s.sales)),
            Arc::new(floats(|s| s.cogs)),
            Arc::new(floats(|s| s.profit)),
        ],
    )
    .context("building record batch")?;

    let file = std::fs::File::create(path).context("creating parquet file")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating writer")?;
    writer.write(&batch).context("writing batch")?;
    writer.close().context("closing writer")?;
    Ok(())
}

fn main() -> Result<()> {
    let out_dir = PathBuf::from(std::env::args().nth(1).unwrap_or_else(|| "data/generated".to_string()));
    std::fs::create_dir_all(&out_dir).with_context(|| format!("creating {}", out_dir.display()))?;

    let mut rng = SimpleRng::new(42);
    let sales = generate(&mut rng);

    let csv_path = out_dir.join("financial_data.csv");
    let parquet_path = out_dir.join("financial_data.parquet");
    write_csv(&csv_path, &sales)?;
    write_parquet(&parquet_path, &sales)?;

    println!(
        "Wrote {} sales rows to {} and {}",
        sales.len(),
        csv_path.display(),
        parquet_path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_rows_are_consistent() {
        let sales = generate(&mut SimpleRng::new(42));
        assert_eq!(sales.len(), 16 * 44);
        for s in &sales {
            assert!(s.units_sold >= 200.0 && s.units_sold <= 3000.0);
            assert!(s.cogs > 0.0);
            assert!((s.profit - (s.sales - s.cogs)).abs() < 1e-9);
        }
        assert_eq!(sales[0].date, NaiveDate::from_ymd_opt(2013, 9, 1).unwrap());
        assert_eq!(sales[sales.len() - 1].date, NaiveDate::from_ymd_opt(2014, 12, 1).unwrap());
    }

    #[test]
    fn accounting_strings() {
        assert_eq!(accounting(1234.5), " $1,234.50 ");
        assert_eq!(accounting(-5.0), " $(5.00)");
        assert_eq!(accounting(0.0), " $-   ");
    }
}
