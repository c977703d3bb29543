use std::io::Write;
use std::path::Path;

use super::error::ExportError;
use super::filter::FilteredView;
use super::loader::DISCOUNT_BAND;
use super::model::{Dataset, Measure};

/// Write the records of `view` as CSV.
///
/// Canonical columns come first, passthrough columns follow in sorted order.
/// Measures are plain decimals so the file loads back without cleaning.
pub fn write_csv<W: Write>(dataset: &Dataset, view: &FilteredView, writer: W) -> Result<(), ExportError> {
    let extra = dataset.extra_columns();
    let mut out = csv::Writer::from_writer(writer);

    let mut header = vec!["Date", "Country", "Product", "Segment", DISCOUNT_BAND];
    header.extend(Measure::ALL.iter().map(|m| m.label()));
    header.extend(extra.iter().map(String::as_str));
    out.write_record(&header)?;

    for r in view.records(dataset) {
        let mut row = vec![
            r.date.format("%Y-%m-%d").to_string(),
            r.country.clone(),
            r.product.clone(),
            r.segment.clone(),
            r.discount_band.clone(),
        ];
        row.extend(Measure::ALL.iter().map(|&m| r.measure(m).to_string()));
        row.extend(extra.iter().map(|c| r.extra.get(c).cloned().unwrap_or_default()));
        out.write_record(&row)?;
    }

    out.flush()?;
    Ok(())
}

/// Export the filtered view to a CSV file at `path`.
pub fn export_csv(path: &Path, dataset: &Dataset, view: &FilteredView) -> Result<(), ExportError> {
    let file = std::fs::File::create(path)?;
    write_csv(dataset, view, std::io::BufWriter::new(file))?;
    log::info!("Exported {} records to {}", view.len(), path.display());
    Ok(())
}
