use super::super::{CleaningStep, StepResult};
use crate::error::Result;
use crate::table::Table;

/// Drop rows equal to an earlier row, then relabel rows from zero
pub struct DropDuplicates;

impl CleaningStep for DropDuplicates {
    fn apply(&self, table: &mut Table) -> Result<StepResult> {
        let duplicates = table.drop_duplicates()?;

        Ok(StepResult::new(
            duplicates,
            format!("Dropped {} duplicate rows, {} rows remain", duplicates, table.height()),
        ))
    }

    fn step_name(&self) -> &'static str {
        "drop_duplicates"
    }
}
