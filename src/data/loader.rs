use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use arrow::array::{Array, ArrayRef, AsArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Date32Type, Float64Type};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::error::LoadError;
use super::model::{Dataset, Measure, Record};
use super::normalize::{normalize, RawValue};

/// Columns every source must provide (after trimming labels).
pub const REQUIRED_COLUMNS: [&str; 8] = [
    "Date",
    "Country",
    "Product",
    "Segment",
    "Sales",
    "Profit",
    "Units Sold",
    "COGS",
];

/// Optional column bound onto [`Record::discount_band`].
pub const DISCOUNT_BAND: &str = "Discount Band";

/// `%y` must come before `%Y`: chrono's `%Y` also takes a two-digit year
/// and would read `1/1/14` as the year 14.
const DATE_FORMATS: [&str; 5] = ["%Y-%m-%d", "%m/%d/%y", "%m/%d/%Y", "%Y/%m/%d", "%d-%b-%Y"];

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a sales dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row, accounting-formatted measures allowed
/// * `.json`    – `[{ "Date": "...", "Country": "...", "Sales": "$1.00", ... }, ...]`
/// * `.parquet` – flat table, string or numeric measure columns
pub fn load_file(path: &Path) -> Result<Dataset, LoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let result = match ext.as_str() {
        "csv" => std::fs::File::open(path)
            .map_err(LoadError::from)
            .and_then(load_csv_reader),
        "json" => load_json(path),
        "parquet" | "pq" => load_parquet(path),
        other => Err(LoadError::UnsupportedFormat(other.to_string())),
    };

    match &result {
        Ok(ds) => log::info!(
            "Loaded {} records from {} ({} countries, {} products, {} segments)",
            ds.len(),
            path.display(),
            ds.lov.countries.len(),
            ds.lov.products.len(),
            ds.lov.segments.len()
        ),
        Err(e) => log::error!("Failed to load {}: {e}", path.display()),
    }
    result
}

// ---------------------------------------------------------------------------
// Cell – an untyped value keyed by its trimmed column label
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
enum Cell {
    Text(String),
    Number(f64),
    Date(NaiveDate),
    Null,
}

impl Cell {
    fn as_text(&self) -> String {
        match self {
            Cell::Text(s) => s.trim().to_string(),
            Cell::Number(v) => v.to_string(),
            Cell::Date(d) => d.format("%Y-%m-%d").to_string(),
            Cell::Null => String::new(),
        }
    }
}

type Row = BTreeMap<String, Cell>;

fn check_required<'a>(labels: impl IntoIterator<Item = &'a str> + Clone) -> Result<(), LoadError> {
    for required in REQUIRED_COLUMNS {
        if !labels.clone().into_iter().any(|l| l == required) {
            return Err(LoadError::MissingColumn(required.to_string()));
        }
    }
    Ok(())
}

/// Bind one untyped row onto a [`Record`]. `row` is 1-based for messages.
fn build_record(row: usize, mut cells: Row) -> Result<Record, LoadError> {
    let mut take = |label: &str| -> Result<Cell, LoadError> {
        cells
            .remove(label)
            .ok_or_else(|| LoadError::MissingColumn(label.to_string()))
    };

    let date = match take("Date")? {
        Cell::Date(d) => d,
        Cell::Text(s) => parse_date(&s).ok_or(LoadError::InvalidDate { row, value: s })?,
        other => {
            return Err(LoadError::InvalidDate {
                row,
                value: other.as_text(),
            })
        }
    };

    let country = take("Country")?.as_text();
    let product = take("Product")?.as_text();
    let segment = take("Segment")?.as_text();

    let mut measure = |m: Measure| -> Result<f64, LoadError> {
        let raw = match take(m.label())? {
            Cell::Number(v) => RawValue::Number(v),
            Cell::Text(s) => RawValue::Text(s),
            Cell::Null => RawValue::Text(String::new()),
            Cell::Date(d) => RawValue::Text(d.to_string()),
        };
        normalize(&raw).map_err(|source| LoadError::InvalidNumber {
            row,
            column: m.label().to_string(),
            source,
        })
    };
    let sales = measure(Measure::Sales)?;
    let profit = measure(Measure::Profit)?;
    let units_sold = measure(Measure::UnitsSold)?;
    let cogs = measure(Measure::Cogs)?;

    let discount_band = cells
        .remove(DISCOUNT_BAND)
        .map(|c| c.as_text())
        .unwrap_or_default();

    let extra = cells
        .into_iter()
        .map(|(label, cell)| (label, cell.as_text()))
        .collect();

    Ok(Record {
        date,
        country,
        product,
        segment,
        discount_band,
        sales,
        profit,
        units_sold,
        cogs,
        extra,
    })
}

/// Parse a date cell. Time-of-day, if present, is dropped.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(dt.date());
    }
    DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive())
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// Load a CSV source. Header labels are trimmed before binding.
pub fn load_csv_reader<R: Read>(reader: R) -> Result<Dataset, LoadError> {
    let mut reader = csv::ReaderBuilder::new().flexible(false).from_reader(reader);
    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();
    check_required(headers.iter().map(String::as_str))?;

    let mut records = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let rec = result?;
        let cells: Row = headers
            .iter()
            .zip(rec.iter())
            .map(|(h, v)| (h.clone(), Cell::Text(v.to_string())))
            .collect();
        records.push(build_record(row_no + 1, cells)?);
    }

    Ok(Dataset::from_records(records))
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "Date": "2014-01-01", "Country": "Canada", "Sales": "$32,370.00", "Units Sold": 1618.5, ... },
///   ...
/// ]
/// ```
fn load_json(path: &Path) -> Result<Dataset, LoadError> {
    let text = std::fs::read_to_string(path)?;
    load_json_str(&text)
}

fn load_json_str(text: &str) -> Result<Dataset, LoadError> {
    let root: JsonValue = serde_json::from_str(text)?;
    let rows = root.as_array().ok_or_else(|| LoadError::InvalidRecord {
        row: 0,
        reason: "expected top-level JSON array".to_string(),
    })?;

    let mut records = Vec::with_capacity(rows.len());
    for (i, rec) in rows.iter().enumerate() {
        let obj = rec.as_object().ok_or_else(|| LoadError::InvalidRecord {
            row: i + 1,
            reason: "not a JSON object".to_string(),
        })?;

        let cells: Row = obj
            .iter()
            .map(|(k, v)| (k.trim().to_string(), json_to_cell(v)))
            .collect();
        check_required(cells.keys().map(String::as_str))?;
        records.push(build_record(i + 1, cells)?);
    }

    Ok(Dataset::from_records(records))
}

fn json_to_cell(val: &JsonValue) -> Cell {
    match val {
        JsonValue::String(s) => Cell::Text(s.clone()),
        JsonValue::Number(n) => match n.as_f64() {
            Some(f) => Cell::Number(f),
            None => Cell::Text(n.to_string()),
        },
        JsonValue::Null => Cell::Null,
        other => Cell::Text(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a flat Parquet table.
///
/// String columns are read as text (and normalized if they are measures),
/// numeric columns as `f64`, and date/timestamp columns as calendar dates.
/// Works with files written by both **Pandas** and **Polars**.
fn load_parquet(path: &Path) -> Result<Dataset, LoadError> {
    let file = std::fs::File::open(path)?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;

    // A zero-row file yields no batches, so check the schema itself.
    let labels: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().trim().to_string())
        .collect();
    check_required(labels.iter().map(String::as_str))?;

    let reader = builder.build()?;
    let mut records = Vec::new();

    for batch_result in reader {
        let batch = batch_result?;

        let columns = batch
            .columns()
            .iter()
            .map(canonical_column)
            .collect::<Result<Vec<_>, _>>()?;

        for row in 0..batch.num_rows() {
            let cells: Row = labels
                .iter()
                .zip(&columns)
                .map(|(label, col)| (label.clone(), extract_cell(col, row)))
                .collect();
            let row_no = records.len() + 1;
            records.push(build_record(row_no, cells)?);
        }
    }

    Ok(Dataset::from_records(records))
}

// -- Parquet / Arrow helpers --

/// Cast a column to one of the three shapes `extract_cell` understands:
/// Utf8, Float64 or Date32.
fn canonical_column(col: &ArrayRef) -> Result<ArrayRef, LoadError> {
    let target = match col.data_type() {
        DataType::Utf8 | DataType::Float64 | DataType::Date32 => return Ok(col.clone()),
        DataType::Date64 | DataType::Timestamp(_, _) => DataType::Date32,
        dt if dt.is_numeric() => DataType::Float64,
        _ => DataType::Utf8,
    };
    Ok(cast(col, &target)?)
}

fn extract_cell(col: &ArrayRef, row: usize) -> Cell {
    if col.is_null(row) {
        return Cell::Null;
    }
    match col.data_type() {
        DataType::Float64 => Cell::Number(col.as_primitive::<Float64Type>().value(row)),
        DataType::Date32 => col
            .as_primitive::<Date32Type>()
            .value_as_date(row)
            .map(Cell::Date)
            .unwrap_or(Cell::Null),
        _ => Cell::Text(col.as_string::<i32>().value(row).to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::Arc;

    use arrow::array::{Float64Array, Int64Array, StringArray, TimestampMillisecondArray};
    use arrow::datatypes::{Field, Schema, TimeUnit};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;

    const SAMPLE_CSV: &str = "\
Segment,Country, Product ,Discount Band,Units Sold,Manufacturing Price, Sales ,COGS,Profit,Date,Month Name
Government,Canada,Carretera,None,\" 1,618.50 \",$3.00,\" $32,370.00 \",\" $16,185.00 \",\" $16,185.00 \",01/01/2014,January
Government,Germany,Carretera,None,\" 1,321.00 \",$3.00,\" $26,420.00 \",\" $13,210.00 \",\" $13,210.00 \",01/01/2014,January
Midmarket,France,Carretera,Low,\" 2,178.00 \",$3.00,\" $32,670.00 \",\" $21,780.00 \",\" $(4,533.75)\",06/01/2014,June
Enterprise,France,Amarilla,High,\" 1,006.00 \",$260.00,\" $1,509.00 \",\" $1,509.00 \", $-   ,06/01/2014,June
";

    #[test]
    fn loads_sample_csv() {
        let ds = load_csv_reader(SAMPLE_CSV.as_bytes()).unwrap();
        assert_eq!(ds.len(), 4);

        let first = &ds.records[0];
        assert_eq!(first.date, NaiveDate::from_ymd_opt(2014, 1, 1).unwrap());
        assert_eq!(first.country, "Canada");
        assert_eq!(first.product, "Carretera");
        assert_eq!(first.sales, 32370.0);
        assert_eq!(first.units_sold, 1618.5);
        assert_eq!(first.extra.get("Month Name").map(String::as_str), Some("January"));
        assert_eq!(first.extra.get("Manufacturing Price").map(String::as_str), Some("$3.00"));

        assert_eq!(ds.records[2].profit, -4533.75);
        assert_eq!(ds.records[2].date, NaiveDate::from_ymd_opt(2014, 6, 1).unwrap());
        assert_eq!(ds.records[3].profit, 0.0);
        assert_eq!(ds.records[3].discount_band, "High");
    }

    #[test]
    fn lov_sorted_unique() {
        let ds = load_csv_reader(SAMPLE_CSV.as_bytes()).unwrap();
        assert_eq!(ds.lov.countries, vec!["Canada", "France", "Germany"]);
        assert_eq!(ds.lov.products, vec!["Amarilla", "Carretera"]);
        assert_eq!(ds.lov.segments, vec!["Enterprise", "Government", "Midmarket"]);
        for list in [&ds.lov.countries, &ds.lov.products, &ds.lov.segments] {
            assert!(list.windows(2).all(|w| w[0] < w[1]));
        }
    }

    #[test]
    fn missing_column_is_fatal() {
        let csv = "Date,Country,Product,Segment,Sales,Profit,Units Sold\n2014-01-01,US,A,Gov,1,1,1\n";
        let err = load_csv_reader(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, LoadError::MissingColumn(c) if c == "COGS"));
    }

    #[test]
    fn bad_date_is_fatal() {
        let csv = "Date,Country,Product,Segment,Sales,Profit,Units Sold,COGS\n\
                   2014-01-01,US,A,Gov,1,1,1,1\n\
                   someday,US,A,Gov,1,1,1,1\n";
        let err = load_csv_reader(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, LoadError::InvalidDate { row: 2, ref value } if value == "someday"));
    }

    #[test]
    fn bad_number_reports_row_and_column() {
        let csv = "Date,Country,Product,Segment,Sales,Profit,Units Sold,COGS\n\
                   2014-01-01,US,A,Gov,$10,oops,1,1\n";
        match load_csv_reader(csv.as_bytes()).unwrap_err() {
            LoadError::InvalidNumber { row, column, source } => {
                assert_eq!(row, 1);
                assert_eq!(column, "Profit");
                assert_eq!(source.value, "oops");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn header_only_is_empty_dataset() {
        let csv = "Date,Country,Product,Segment,Sales,Profit,Units Sold,COGS\n";
        let ds = load_csv_reader(csv.as_bytes()).unwrap();
        assert!(ds.is_empty());
        assert!(ds.lov.countries.is_empty());
    }

    #[test]
    fn date_formats() {
        let d = NaiveDate::from_ymd_opt(2014, 12, 1).unwrap();
        assert_eq!(parse_date("2014-12-01"), Some(d));
        assert_eq!(parse_date("12/01/2014"), Some(d));
        assert_eq!(parse_date("12/1/2014"), Some(d));
        assert_eq!(parse_date("12/01/14"), Some(d));
        assert_eq!(parse_date("12/1/14"), Some(d));
        assert_eq!(parse_date("01-Dec-2014"), Some(d));
        assert_eq!(parse_date("2014-12-01 00:00:00"), Some(d));
        assert_eq!(parse_date("2014-12-01T08:30:00Z"), Some(d));
        assert_eq!(parse_date("13/45/2014"), None);
    }

    #[test]
    fn json_numbers_pass_through() {
        let text = r#"[
            {"Date": "2014-01-01", "Country": "US", "Product": "A", "Segment": "Gov",
             "Sales": 100.5, "Profit": "($5)", "Units Sold": 3, "COGS": null, "Discount Band": "Low"}
        ]"#;
        let ds = load_json_str(text).unwrap();
        let r = &ds.records[0];
        assert_eq!(r.sales, 100.5);
        assert_eq!(r.profit, -5.0);
        assert_eq!(r.units_sold, 3.0);
        assert_eq!(r.cogs, 0.0);
        assert_eq!(r.discount_band, "Low");
    }

    #[test]
    fn load_file_dispatches_by_extension() {
        let dir = tempfile::tempdir().unwrap();

        let csv_path = dir.path().join("financial_data.csv");
        std::fs::File::create(&csv_path)
            .unwrap()
            .write_all(SAMPLE_CSV.as_bytes())
            .unwrap();
        assert_eq!(load_file(&csv_path).unwrap().len(), 4);

        let bad = dir.path().join("financial_data.xlsx");
        std::fs::write(&bad, b"").unwrap();
        assert!(matches!(
            load_file(&bad).unwrap_err(),
            LoadError::UnsupportedFormat(ext) if ext == "xlsx"
        ));
    }

    #[test]
    fn bundled_dataset_loads() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("data/financial_data.csv");
        let ds = load_file(&path).unwrap();
        assert_eq!(ds.len(), 14);
        assert_eq!(ds.lov.countries.len(), 5);
        assert_eq!(ds.lov.products.len(), 6);
        assert_eq!(ds.lov.segments.len(), 5);
        assert!(ds.records.iter().all(|r| r.sales.is_finite() && r.profit.is_finite()));
        assert_eq!(ds.records[10].profit, -32010.0);
        assert_eq!(ds.records[0].extra.get("Month Name").map(String::as_str), Some("January"));
    }

    #[test]
    fn two_digit_years_load_as_2000s() {
        let csv = "Date,Country,Product,Segment,Sales,Profit,Units Sold,COGS\n1/1/14,US,A,Gov,1,1,1,1\n";
        let ds = load_csv_reader(csv.as_bytes()).unwrap();
        assert_eq!(ds.records[0].date, NaiveDate::from_ymd_opt(2014, 1, 1).unwrap());
    }

    fn write_parquet(path: &Path, batch: &RecordBatch) {
        let file = std::fs::File::create(path).unwrap();
        let mut writer = ArrowWriter::try_new(file, batch.schema(), None).unwrap();
        writer.write(batch).unwrap();
        writer.close().unwrap();
    }

    #[test]
    fn parquet_columns_are_cast_and_bound() {
        let day = NaiveDate::from_ymd_opt(2014, 3, 1).unwrap();
        let millis = |h: u32, m: u32| day.and_hms_opt(h, m, 0).unwrap().and_utc().timestamp_millis();

        let schema = Arc::new(Schema::new(vec![
            Field::new("Date", DataType::Timestamp(TimeUnit::Millisecond, None), false),
            Field::new(" Country ", DataType::Utf8, false),
            Field::new("Product", DataType::Utf8, false),
            Field::new("Segment", DataType::Utf8, false),
            Field::new("Discount Band", DataType::Utf8, true),
            Field::new("Sales", DataType::Float64, true),
            Field::new("Profit", DataType::Int64, false),
            Field::new("Units Sold", DataType::Float64, false),
            Field::new("COGS", DataType::Utf8, false),
        ]));
        let batch = RecordBatch::try_new(
            schema,
            vec![
                Arc::new(TimestampMillisecondArray::from(vec![millis(0, 0), millis(12, 30)])),
                Arc::new(StringArray::from(vec!["US", "FR"])),
                Arc::new(StringArray::from(vec!["Paseo", "Velo"])),
                Arc::new(StringArray::from(vec!["Government", "Enterprise"])),
                Arc::new(StringArray::from(vec![Some("Low"), None])),
                Arc::new(Float64Array::from(vec![Some(100.5), None])),
                Arc::new(Int64Array::from(vec![10, -5])),
                Arc::new(Float64Array::from(vec![3.0, 1.5])),
                Arc::new(StringArray::from(vec!["$90.00", " $-   "])),
            ],
        )
        .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("financial_data.parquet");
        write_parquet(&path, &batch);

        let ds = load_file(&path).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.lov.countries, vec!["FR", "US"]);

        let (a, b) = (&ds.records[0], &ds.records[1]);
        assert_eq!(a.date, day);
        assert_eq!(b.date, day);
        assert_eq!(a.country, "US");
        assert_eq!((a.sales, a.profit, a.units_sold, a.cogs), (100.5, 10.0, 3.0, 90.0));
        assert_eq!((b.sales, b.profit, b.units_sold, b.cogs), (0.0, -5.0, 1.5, 0.0));
        assert_eq!(a.discount_band, "Low");
        assert_eq!(b.discount_band, "");
    }

    #[test]
    fn empty_parquet_without_required_columns_is_fatal() {
        let schema = Arc::new(Schema::new(vec![Field::new("Foo", DataType::Utf8, false)]));
        let batch = RecordBatch::try_new(schema, vec![Arc::new(StringArray::from(Vec::<&str>::new()))]).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.parquet");
        write_parquet(&path, &batch);

        assert!(matches!(
            load_file(&path).unwrap_err(),
            LoadError::MissingColumn(c) if c == "Date"
        ));
    }
}
