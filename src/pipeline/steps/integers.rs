use polars::prelude::DataType;
use tracing::{debug, warn};

use super::super::{CleaningStep, StepResult};
use crate::error::Result;
use crate::table::Table;

/// Truncate every fully numeric float column to integers
pub struct CoerceIntegers;

impl CleaningStep for CoerceIntegers {
    fn apply(&self, table: &mut Table) -> Result<StepResult> {
        let float_columns: Vec<String> = table
            .frame()
            .get_columns()
            .iter()
            .filter(|c| c.dtype().is_float() && c.null_count() == 0)
            .map(|c| c.name().to_string())
            .collect();

        let mut converted = 0;
        let mut cast_columns = 0;
        for name in &float_columns {
            let column = table.column(name)?;
            // Strict: fails instead of nulling anything outside the i64 range
            match column.strict_cast(&DataType::Int64) {
                Ok(ints) => {
                    converted += ints.len();
                    cast_columns += 1;
                    table.replace_column(ints)?;
                    debug!("Column '{}' cast to integer", name);
                }
                Err(err) => warn!("Column '{}' does not fit an integer, left as is: {}", name, err),
            }
        }

        Ok(StepResult::new(
            converted,
            format!("Cast {} numeric columns to integer ({} values truncated)", cast_columns, converted),
        ))
    }

    fn step_name(&self) -> &'static str {
        "coerce_integers"
    }
}
