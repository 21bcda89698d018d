use tracing::debug;

use super::super::{CleaningStep, StepResult};
use crate::constants::{SHORT_STATE_COLUMN, STATE_COLUMN};
use crate::error::Result;
use crate::table::Table;

/// Lowercase every column name, turn spaces into underscores and expand `st` to `state`
pub struct NormalizeColumnNames;

/// `"Customer Lifetime Value"` -> `"customer_lifetime_value"`
pub fn normalize_column_name(name: &str) -> String {
    name.to_lowercase().replace(' ', "_")
}

impl CleaningStep for NormalizeColumnNames {
    fn apply(&self, table: &mut Table) -> Result<StepResult> {
        let mut renamed = 0;
        let mut names = Vec::with_capacity(table.width());

        for original in table.column_names() {
            let mut name = normalize_column_name(original);
            if name != original {
                debug!("Renaming column '{}' -> '{}'", original, name);
                renamed += 1;
            }
            if name == SHORT_STATE_COLUMN {
                name = STATE_COLUMN.to_string();
                renamed += 1;
            }
            names.push(name);
        }

        table.set_column_names(&names)?;

        Ok(StepResult::new(
            renamed,
            format!("Normalized column names ({} renamed)", renamed),
        ))
    }

    fn step_name(&self) -> &'static str {
        "normalize_column_names"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Value;

    fn table_with(names: &[&str]) -> Table {
        Table::from_values(names.iter().map(|name| (*name, vec![Value::Missing])).collect()).unwrap()
    }

    #[test]
    fn test_normalize_column_name() {
        assert_eq!(normalize_column_name("Customer Lifetime Value"), "customer_lifetime_value");
        assert_eq!(normalize_column_name("Number of Open Complaints"), "number_of_open_complaints");
        assert_eq!(normalize_column_name("income"), "income");
    }

    #[test]
    fn test_st_becomes_state() {
        let mut table = table_with(&["ST", "Gender"]);
        let result = NormalizeColumnNames.apply(&mut table).unwrap();

        assert_eq!(table.column_names(), vec!["state", "gender"]);
        // "ST" -> "st" -> "state" counts once per rewrite
        assert_eq!(result.values_changed, 3);
    }

    #[test]
    fn test_without_st_column_is_noop_for_state() {
        let mut table = table_with(&["State", "Monthly Premium Auto"]);
        NormalizeColumnNames.apply(&mut table).unwrap();

        assert_eq!(table.column_names(), vec!["state", "monthly_premium_auto"]);
    }

    #[test]
    fn test_already_normalized_names_are_untouched() {
        let mut table = table_with(&["state", "gender"]);
        let result = NormalizeColumnNames.apply(&mut table).unwrap();

        assert_eq!(result.values_changed, 0);
    }

    #[test]
    fn test_names_colliding_after_normalization_fail() {
        let mut table = table_with(&["ST", "State"]);
        assert!(NormalizeColumnNames.apply(&mut table).is_err());
    }
}
