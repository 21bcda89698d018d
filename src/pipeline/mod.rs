use metrics::counter;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::{info, instrument};

use crate::constants::COMPLETION_MESSAGE;
use crate::error::Result;
use crate::table::Table;

pub mod steps;

pub use steps::{CoerceIntegers, DropDuplicates, FormatValues, HandleNullValues, NormalizeColumnNames};

/// Common trait for all cleaning steps
pub trait CleaningStep {
    /// Apply this step to the table in place
    fn apply(&self, table: &mut Table) -> Result<StepResult>;

    /// Get the name of this step
    fn step_name(&self) -> &'static str;
}

/// Result of applying one cleaning step
#[derive(Debug, Clone, Serialize)]
pub struct StepResult {
    pub step: String,
    pub rows_before: usize,
    pub rows_after: usize,
    /// Cells rewritten or column names changed by the step
    pub values_changed: usize,
    /// Cells that could not be interpreted and became missing
    pub values_coerced_to_missing: usize,
    pub message: String,
    pub details: BTreeMap<String, String>,
}

impl StepResult {
    pub fn new(values_changed: usize, message: String) -> Self {
        Self {
            step: String::new(),
            rows_before: 0,
            rows_after: 0,
            values_changed,
            values_coerced_to_missing: 0,
            message,
            details: BTreeMap::new(),
        }
    }

    pub fn with_coerced_to_missing(mut self, count: usize) -> Self {
        self.values_coerced_to_missing = count;
        self
    }

    pub fn with_detail(mut self, key: &str, value: impl ToString) -> Self {
        self.details.insert(key.to_string(), value.to_string());
        self
    }

    pub fn rows_dropped(&self) -> usize {
        self.rows_before.saturating_sub(self.rows_after)
    }
}

/// Outcome of a full pipeline run
#[derive(Debug, Clone, Serialize)]
pub struct CleaningReport {
    pub rows_in: usize,
    pub rows_out: usize,
    pub columns: Vec<String>,
    pub steps: Vec<StepResult>,
}

impl CleaningReport {
    /// Write the report as pretty JSON
    pub fn write_json(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}

/// The five cleaning steps, run in a fixed order
pub struct CleaningPipeline {
    steps: Vec<Box<dyn CleaningStep>>,
}

impl Default for CleaningPipeline {
    fn default() -> Self {
        Self {
            steps: vec![
                Box::new(NormalizeColumnNames),
                Box::new(FormatValues),
                Box::new(HandleNullValues),
                Box::new(CoerceIntegers),
                Box::new(DropDuplicates),
            ],
        }
    }
}

impl CleaningPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step_names(&self) -> Vec<&'static str> {
        self.steps.iter().map(|s| s.step_name()).collect()
    }

    /// Run every step against `table`. Stops at the first error.
    #[instrument(skip_all, fields(rows = table.height(), columns = table.width()))]
    pub fn run(&self, table: &mut Table) -> Result<CleaningReport> {
        info!("🚀 Starting cleaning pipeline");
        let rows_in = table.height();
        let mut results = Vec::with_capacity(self.steps.len());

        for step in &self.steps {
            let name = step.step_name();
            let rows_before = table.height();

            let mut result = step.apply(table)?;
            result.step = name.to_string();
            result.rows_before = rows_before;
            result.rows_after = table.height();

            counter!("cleaner_rows_dropped_total", "step" => name).increment(result.rows_dropped() as u64);
            counter!("cleaner_values_coerced_total", "step" => name)
                .increment(result.values_coerced_to_missing as u64);

            info!("✅ [{}] {}", name, result.message);
            results.push(result);
        }

        info!("🏁 Cleaning finished: {} rows in, {} rows out", rows_in, table.height());
        println!("{}", COMPLETION_MESSAGE);

        Ok(CleaningReport {
            rows_in,
            rows_out: table.height(),
            columns: table.column_names().into_iter().map(str::to_string).collect(),
            steps: results,
        })
    }
}

/// Clean a customer table: normalize names, coerce values, handle nulls,
/// cast numbers to integers and drop duplicates.
pub fn clean(mut table: Table) -> Result<Table> {
    CleaningPipeline::default().run(&mut table)?;
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CleanerError;
    use crate::table::Value;

    fn customer_table() -> Table {
        Table::from_values(vec![
            ("ST", vec!["CA".into(), "WA".into(), "CA".into()]),
            ("GENDER", vec!["Male".into(), Value::Missing, "Male".into()]),
            ("Customer Lifetime Value", vec!["10%".into(), "20%".into(), "10%".into()]),
            ("Income", vec![Value::Int(50000), Value::Int(0), Value::Int(50000)]),
            ("Monthly Premium Auto", vec![Value::Int(100), Value::Int(80), Value::Int(100)]),
            ("Number of Open Complaints", vec!["1/2/3".into(), Value::Missing, "1/2/3".into()]),
        ])
        .unwrap()
    }

    #[test]
    fn test_steps_run_in_order() {
        let pipeline = CleaningPipeline::new();
        assert_eq!(
            pipeline.step_names(),
            vec![
                "normalize_column_names",
                "format_values",
                "handle_null_values",
                "coerce_integers",
                "drop_duplicates"
            ]
        );
    }

    #[test]
    fn test_report_tracks_rows_per_step() {
        let mut table = customer_table();
        let report = CleaningPipeline::new().run(&mut table).unwrap();

        assert_eq!(report.rows_in, 3);
        assert_eq!(report.rows_out, 2);
        assert_eq!(report.steps.len(), 5);

        let dedupe = report.steps.last().unwrap();
        assert_eq!(dedupe.step, "drop_duplicates");
        assert_eq!(dedupe.rows_dropped(), 1);
        assert_eq!(report.columns[0], "state");
    }

    #[test]
    fn test_clean_propagates_missing_column() {
        let table = Table::from_values(vec![("ST", vec!["CA".into()])]).unwrap();

        match clean(table) {
            Err(CleanerError::MissingColumn(name)) => assert_eq!(name, "gender"),
            other => panic!("expected MissingColumn, got {:?}", other),
        }
    }
}
