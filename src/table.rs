use polars::prelude::{
    AnyValue, BooleanChunked, ChunkFillNullValue, ChunkFull, DataFrame, DataType, IntoSeries, NamedFrom,
    NewChunkedArray, Series, StringChunked, UniqueKeepStrategy,
};
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::error::{CleanerError, Result};

/// A single cell. `Missing` is the unset marker every failed coercion turns into.
#[derive(Debug, Clone)]
pub enum Value {
    Missing,
    Int(i64),
    Float(f64),
    Text(String),
}

impl Value {
    pub fn text(value: impl Into<String>) -> Self {
        Value::Text(value.into())
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Value::Int(_) | Value::Float(_))
    }

    /// Numeric view of the cell, `None` for text and missing cells
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    fn from_any(value: AnyValue<'_>) -> Self {
        match value {
            AnyValue::Null => Value::Missing,
            AnyValue::Int64(i) => Value::Int(i),
            AnyValue::Int32(i) => Value::Int(i.into()),
            AnyValue::UInt32(i) => Value::Int(i.into()),
            AnyValue::Float64(f) => Value::Float(f),
            AnyValue::Float32(f) => Value::Float(f.into()),
            AnyValue::String(s) => Value::text(s),
            AnyValue::StringOwned(s) => Value::text(s.as_str()),
            other => Value::text(other.to_string()),
        }
    }
}

// Floats compare bitwise so that `Eq` and `Hash` agree
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Missing, Value::Missing) => true,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
            (Value::Text(a), Value::Text(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Missing => {}
            Value::Int(i) => i.hash(state),
            Value::Float(f) => f.to_bits().hash(state),
            Value::Text(s) => s.hash(state),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Missing => Ok(()),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Value::Missing)
    }
}

/// Semantic type of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// No non-missing cells at all
    Empty,
    Integer,
    Float,
    Text,
}

impl ColumnKind {
    /// Kind of a polars column, judged by dtype and null count
    pub fn of(series: &Series) -> Self {
        let dtype = series.dtype();
        if series.null_count() == series.len() {
            ColumnKind::Empty
        } else if dtype.is_integer() {
            ColumnKind::Integer
        } else if dtype.is_float() {
            ColumnKind::Float
        } else {
            ColumnKind::Text
        }
    }

    /// Narrowest kind that holds every cell: integers widen to float, anything
    /// else widens to text.
    fn of_values(values: &[Value]) -> Self {
        values.iter().fold(ColumnKind::Empty, |kind, value| match (kind, value) {
            (kind, Value::Missing) => kind,
            (ColumnKind::Text, _) | (_, Value::Text(_)) => ColumnKind::Text,
            (ColumnKind::Float, _) | (_, Value::Float(_)) => ColumnKind::Float,
            (_, Value::Int(_)) => ColumnKind::Integer,
        })
    }
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ColumnKind::Empty => "empty",
            ColumnKind::Integer => "integer",
            ColumnKind::Float => "float",
            ColumnKind::Text => "text",
        };
        f.pad(name)
    }
}

/// Build a typed polars column from cells. Mixed integer and float cells give
/// a float column; any text makes every present cell text.
pub fn series_from_values(name: &str, values: &[Value]) -> Series {
    match ColumnKind::of_values(values) {
        ColumnKind::Empty => Series::full_null(name.into(), values.len(), &DataType::String),
        ColumnKind::Integer => {
            let ints: Vec<Option<i64>> = values
                .iter()
                .map(|v| match v {
                    Value::Int(i) => Some(*i),
                    _ => None,
                })
                .collect();
            Series::new(name.into(), ints)
        }
        ColumnKind::Float => {
            let floats: Vec<Option<f64>> = values.iter().map(Value::as_f64).collect();
            Series::new(name.into(), floats)
        }
        ColumnKind::Text => {
            let texts: Vec<Option<String>> = values
                .iter()
                .map(|v| (!v.is_missing()).then(|| v.to_string()))
                .collect();
            Series::new(name.into(), texts)
        }
    }
}

/// Read a polars column back as cells. Nulls become `Missing`.
pub fn values_from_series(series: &Series) -> Result<Vec<Value>> {
    let values: Vec<Value> = match series.dtype() {
        dtype if dtype.is_integer() => series.cast(&DataType::Int64)?.i64()?.into_iter().map(Value::from).collect(),
        dtype if dtype.is_float() => series.cast(&DataType::Float64)?.f64()?.into_iter().map(Value::from).collect(),
        DataType::String => series.str()?.into_iter().map(Value::from).collect(),
        DataType::Null => vec![Value::Missing; series.len()],
        _ => series.cast(&DataType::String)?.str()?.into_iter().map(Value::from).collect(),
    };
    Ok(values)
}

/// A polars frame plus a label for every row.
///
/// A freshly built table is labelled `0..height`. Dropping rows keeps the
/// labels of the survivors, so gaps show up until [`Table::reset_index`].
#[derive(Debug, Clone)]
pub struct Table {
    frame: DataFrame,
    index: Vec<usize>,
}

impl Default for Table {
    fn default() -> Self {
        Self::from_frame(DataFrame::empty())
    }
}

impl PartialEq for Table {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
            && self.frame.get_column_names() == other.frame.get_column_names()
            && self.frame.dtypes() == other.frame.dtypes()
            && self.frame.equals_missing(&other.frame)
    }
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an existing frame, labelling its rows `0..height`
    pub fn from_frame(frame: DataFrame) -> Self {
        let index = (0..frame.height()).collect();
        Self { frame, index }
    }

    /// Build a table from polars columns of equal length
    pub fn from_series(columns: Vec<Series>) -> Result<Self> {
        let height = columns.first().map(|s| s.len()).unwrap_or(0);
        if let Some(bad) = columns.iter().find(|c| c.len() != height) {
            return Err(CleanerError::ColumnLength {
                column: bad.name().to_string(),
                expected: height,
                found: bad.len(),
            });
        }

        let frame = DataFrame::new(columns.into_iter().map(Into::into).collect())?;
        Ok(Self::from_frame(frame))
    }

    /// Build a table from named columns of cells, typing each column from its cells
    pub fn from_values<S: AsRef<str>>(columns: Vec<(S, Vec<Value>)>) -> Result<Self> {
        Self::from_series(
            columns
                .iter()
                .map(|(name, values)| series_from_values(name.as_ref(), values))
                .collect(),
        )
    }

    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn into_frame(self) -> DataFrame {
        self.frame
    }

    pub fn height(&self) -> usize {
        self.frame.height()
    }

    pub fn width(&self) -> usize {
        self.frame.width()
    }

    pub fn is_empty(&self) -> bool {
        self.height() == 0
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.frame.get_column_names().into_iter().map(|name| name.as_str()).collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.frame.column(name).is_ok()
    }

    pub fn column(&self, name: &str) -> Result<&Series> {
        self.frame
            .column(name)
            .map(|column| column.as_materialized_series())
            .map_err(|_| CleanerError::MissingColumn(name.to_string()))
    }

    /// Cells of column `name`, in row order
    pub fn values(&self, name: &str) -> Result<Vec<Value>> {
        values_from_series(self.column(name)?)
    }

    /// Replace column `name` with `values`, retyping it from the new cells
    pub fn set_values(&mut self, name: &str, values: &[Value]) -> Result<()> {
        self.replace_column(series_from_values(name, values))
    }

    /// Swap in `series` for the existing column of the same name
    pub fn replace_column(&mut self, series: Series) -> Result<()> {
        let name = series.name().to_string();
        if !self.has_column(&name) {
            return Err(CleanerError::MissingColumn(name));
        }
        if series.len() != self.height() {
            return Err(CleanerError::ColumnLength {
                column: name,
                expected: self.height(),
                found: series.len(),
            });
        }
        self.frame.with_column(series)?;
        Ok(())
    }

    /// Rename every column at once. Fails on duplicate names.
    pub fn set_column_names(&mut self, names: &[String]) -> Result<()> {
        self.frame.set_column_names(names.iter().map(String::as_str))?;
        Ok(())
    }

    pub fn missing_count(&self, name: &str) -> Result<usize> {
        Ok(self.column(name)?.null_count())
    }

    pub fn column_kind(&self, name: &str) -> Result<ColumnKind> {
        Ok(ColumnKind::of(self.column(name)?))
    }

    /// Numeric cells of a numeric column, in row order. Empty for text columns.
    pub fn numeric_values(&self, name: &str) -> Result<Vec<f64>> {
        let series = self.column(name)?;
        if !(series.dtype().is_integer() || series.dtype().is_float()) {
            return Ok(Vec::new());
        }
        Ok(series.cast(&DataType::Float64)?.f64()?.into_iter().flatten().collect())
    }

    /// Text cells of a text column, in row order. Empty for numeric columns.
    pub fn text_values(&self, name: &str) -> Result<Vec<&str>> {
        let series = self.column(name)?;
        if series.dtype() != &DataType::String {
            return Ok(Vec::new());
        }
        Ok(series.str()?.into_iter().flatten().collect())
    }

    /// Replace every missing cell of column `name` with `fill`, returning how many were filled
    pub fn fill_missing(&mut self, name: &str, fill: &Value) -> Result<usize> {
        let series = self.column(name)?;
        let missing = series.null_count();
        if missing == 0 {
            return Ok(0);
        }

        let filled = match fill {
            Value::Missing => return Ok(0),
            Value::Int(i) => series.cast(&DataType::Int64)?.i64()?.fill_null_with_values(*i)?.into_series(),
            Value::Float(f) => series.cast(&DataType::Float64)?.f64()?.fill_null_with_values(*f)?.into_series(),
            Value::Text(s) => series
                .cast(&DataType::String)?
                .str()?
                .into_iter()
                .map(|v| Some(v.unwrap_or(s)))
                .collect::<StringChunked>()
                .with_name(name.into())
                .into_series(),
        };
        self.replace_column(filled)?;
        Ok(missing)
    }

    /// Row labels, one per row
    pub fn index(&self) -> &[usize] {
        &self.index
    }

    /// Cells of row `position` in column order
    pub fn row(&self, position: usize) -> Option<Vec<Value>> {
        if position >= self.height() {
            return None;
        }
        self.frame
            .get_columns()
            .iter()
            .map(|column| column.get(position).ok().map(Value::from_any))
            .collect()
    }

    /// Every row as cells, in column order
    pub fn rows(&self) -> Result<Vec<Vec<Value>>> {
        let columns = self
            .frame
            .get_columns()
            .iter()
            .map(|column| values_from_series(column.as_materialized_series()))
            .collect::<Result<Vec<_>>>()?;

        Ok((0..self.height())
            .map(|i| columns.iter().map(|cells| cells[i].clone()).collect())
            .collect())
    }

    /// `true` for every row where all cells are missing
    pub fn blank_rows(&self) -> Vec<bool> {
        self.all_missing_mask().into_iter().map(|flag| flag.unwrap_or(false)).collect()
    }

    fn all_missing_mask(&self) -> BooleanChunked {
        self.frame
            .get_columns()
            .iter()
            .fold(BooleanChunked::full("blank".into(), true, self.height()), |mask, column| {
                &mask & &column.is_null()
            })
    }

    fn complete_mask(&self) -> BooleanChunked {
        self.frame
            .get_columns()
            .iter()
            .fold(BooleanChunked::full("complete".into(), true, self.height()), |mask, column| {
                &mask & &column.is_not_null()
            })
    }

    /// Keep only the rows whose flag is `true`. Returns the number of rows dropped.
    pub fn retain_rows(&mut self, keep: &[bool]) -> Result<usize> {
        if keep.len() != self.height() {
            return Err(CleanerError::MaskLength {
                expected: self.height(),
                found: keep.len(),
            });
        }
        self.filter(&BooleanChunked::from_slice("keep".into(), keep))
    }

    /// Drop rows where every cell is missing
    pub fn drop_blank_rows(&mut self) -> Result<usize> {
        let keep = !self.all_missing_mask();
        self.filter(&keep)
    }

    /// Drop rows holding at least one missing cell
    pub fn drop_incomplete_rows(&mut self) -> Result<usize> {
        let keep = self.complete_mask();
        self.filter(&keep)
    }

    /// Drop rows equal to an earlier row, keeping the first of each.
    /// Surviving rows are relabelled from zero.
    pub fn drop_duplicates(&mut self) -> Result<usize> {
        let before = self.height();
        self.frame = self.frame.unique_stable(None, UniqueKeepStrategy::First, None)?;
        self.reset_index();
        Ok(before - self.height())
    }

    fn filter(&mut self, keep: &BooleanChunked) -> Result<usize> {
        let before = self.height();
        self.frame = self.frame.filter(keep)?;

        let mut flags = keep.into_iter();
        self.index.retain(|_| flags.next().flatten().unwrap_or(false));
        Ok(before - self.height())
    }

    /// Relabel rows contiguously from zero
    pub fn reset_index(&mut self) {
        self.index = (0..self.height()).collect();
    }
}
