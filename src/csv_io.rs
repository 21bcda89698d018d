//! Loading and saving tables as CSV.
//!
//! Column types are inferred one column at a time: if every non-empty cell
//! parses as an integer the column is integer, if every one parses as a finite
//! number it is float, otherwise all of its cells are kept as text.

use csv::{ReaderBuilder, Trim, WriterBuilder};
use polars::prelude::{DataType, NamedFrom, Series};
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::Path;
use tracing::{debug, info};

use crate::error::Result;
use crate::table::Table;

/// Read a table from any CSV source
pub fn read_csv<R: Read>(source: R, delimiter: u8) -> Result<Table> {
    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .trim(Trim::All)
        .flexible(true) // short rows are padded with missing cells
        .from_reader(source);

    let headers = reader.headers()?.clone();
    let mut cells: Vec<Vec<Option<String>>> = vec![Vec::new(); headers.len()];

    for (row, record) in reader.records().enumerate() {
        let record = record?;
        if record.len() > headers.len() {
            debug!("Row {} has {} fields, extra fields ignored", row, record.len());
        }
        for (idx, column) in cells.iter_mut().enumerate() {
            let cell = record.get(idx).filter(|s| !s.is_empty()).map(str::to_string);
            column.push(cell);
        }
    }

    let columns = headers
        .iter()
        .zip(cells)
        .map(|(name, raw)| infer_column(Series::new(name.into(), raw)))
        .collect();
    Table::from_series(columns)
}

/// Load a table from a CSV file on disk
pub fn load_csv(path: &Path, delimiter: u8) -> Result<Table> {
    let file = File::open(path)?;
    let table = read_csv(file, delimiter)?;
    info!(
        "📥 Loaded {} rows, {} columns from {}",
        table.height(),
        table.width(),
        path.display()
    );
    Ok(table)
}

/// Write a table as CSV: header row, then one record per row. Missing cells are empty.
pub fn write_csv<W: Write>(table: &Table, sink: W, delimiter: u8) -> Result<()> {
    let mut writer = WriterBuilder::new().delimiter(delimiter).from_writer(sink);

    writer.write_record(table.column_names())?;
    for row in table.rows()? {
        writer.write_record(row.iter().map(|v| v.to_string()))?;
    }
    writer.flush()?;
    Ok(())
}

/// Save a table to a CSV file, creating parent directories as needed
pub fn save_csv(table: &Table, path: &Path, delimiter: u8) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let file = File::create(path)?;
    write_csv(table, file, delimiter)?;
    info!("💾 Saved {} rows to {}", table.height(), path.display());
    Ok(())
}

/// Narrow a text column to integer or float when every present cell parses
fn infer_column(raw: Series) -> Series {
    if raw.null_count() == raw.len() {
        return raw;
    }
    if let Ok(ints) = raw.strict_cast(&DataType::Int64) {
        return ints;
    }
    match raw.strict_cast(&DataType::Float64) {
        Ok(floats) if all_finite(&floats) => floats,
        _ => raw,
    }
}

fn all_finite(floats: &Series) -> bool {
    floats
        .f64()
        .map(|ca| ca.into_iter().flatten().all(f64::is_finite))
        .unwrap_or(false)
}
