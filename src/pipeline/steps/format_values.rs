use tracing::debug;

use super::super::{CleaningStep, StepResult};
use crate::coerce::{coerce_gender, coerce_lifetime_value, coerce_open_complaints};
use crate::constants::{GENDER_COLUMN, LIFETIME_VALUE_COLUMN, OPEN_COMPLAINTS_COLUMN};
use crate::error::Result;
use crate::table::{Table, Value};

/// Repair the gender, lifetime value and open complaints encodings.
///
/// Cells that cannot be interpreted become missing; they are dealt with by
/// the null handling step. Rows that are blank across every column are left
/// blank (no complaints default) so that step can drop them before filling.
pub struct FormatValues;

#[derive(Debug, Default)]
struct ColumnChanges {
    changed: usize,
    to_missing: usize,
}

fn coerce_column(
    table: &mut Table,
    name: &str,
    blank_rows: &[bool],
    coerce: fn(&Value) -> Value,
) -> Result<ColumnChanges> {
    let mut values = table.values(name)?;
    let mut changes = ColumnChanges::default();

    for (value, blank) in values.iter_mut().zip(blank_rows) {
        if *blank {
            continue;
        }
        let coerced = coerce(value);
        if coerced == *value {
            continue;
        }
        if coerced.is_missing() {
            debug!(column = name, raw = %value, "Uninterpretable value, marking missing");
            changes.to_missing += 1;
        }
        changes.changed += 1;
        *value = coerced;
    }

    if changes.changed > 0 {
        table.set_values(name, &values)?;
    }
    Ok(changes)
}

impl CleaningStep for FormatValues {
    fn apply(&self, table: &mut Table) -> Result<StepResult> {
        let blank_rows = table.blank_rows();

        let gender = coerce_column(table, GENDER_COLUMN, &blank_rows, coerce_gender)?;
        let lifetime = coerce_column(table, LIFETIME_VALUE_COLUMN, &blank_rows, coerce_lifetime_value)?;
        let complaints = coerce_column(table, OPEN_COMPLAINTS_COLUMN, &blank_rows, coerce_open_complaints)?;

        let changed = gender.changed + lifetime.changed + complaints.changed;
        let to_missing = gender.to_missing + lifetime.to_missing + complaints.to_missing;

        Ok(StepResult::new(
            changed,
            format!("Formatted {} values ({} could not be interpreted)", changed, to_missing),
        )
        .with_coerced_to_missing(to_missing)
        .with_detail("gender_to_missing", gender.to_missing)
        .with_detail("customer_lifetime_value_to_missing", lifetime.to_missing)
        .with_detail("number_of_open_complaints_to_missing", complaints.to_missing))
    }

    fn step_name(&self) -> &'static str {
        "format_values"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CleanerError;

    fn formatted_table() -> Table {
        Table::from_values(vec![
            (
                "gender",
                vec!["Male".into(), "female".into(), "Femal".into(), "X".into(), Value::Missing],
            ),
            (
                "customer_lifetime_value",
                vec!["10%".into(), "12.5%".into(), "bad".into(), Value::Missing, "7".into()],
            ),
            (
                "number_of_open_complaints",
                vec!["1/2/3".into(), Value::Missing, "1/0/00".into(), "junk".into(), "0/1/0".into()],
            ),
        ])
        .unwrap()
    }

    #[test]
    fn test_format_values() {
        let mut table = formatted_table();
        let result = FormatValues.apply(&mut table).unwrap();

        assert_eq!(
            table.values("gender").unwrap(),
            vec![Value::text("M"), Value::text("F"), Value::text("F"), Value::Missing, Value::Missing]
        );
        assert_eq!(
            table.values("customer_lifetime_value").unwrap(),
            vec![Value::Float(10.0), Value::Float(12.5), Value::Missing, Value::Missing, Value::Float(7.0)]
        );
        assert_eq!(
            table.values("number_of_open_complaints").unwrap(),
            vec![Value::Int(2), Value::Int(0), Value::Int(0), Value::Missing, Value::Int(1)]
        );

        // "X", "bad" and "junk"
        assert_eq!(result.values_coerced_to_missing, 3);
    }

    #[test]
    fn test_blank_rows_stay_blank() {
        let mut table = Table::from_values(vec![
            ("gender", vec!["M".into(), Value::Missing]),
            ("customer_lifetime_value", vec!["1%".into(), Value::Missing]),
            ("number_of_open_complaints", vec![Value::Missing, Value::Missing]),
        ])
        .unwrap();
        FormatValues.apply(&mut table).unwrap();

        let complaints = table.values("number_of_open_complaints").unwrap();
        assert_eq!(complaints, vec![Value::Int(0), Value::Missing]);
    }

    #[test]
    fn test_lifetime_value_beyond_integer_range_is_missing() {
        let mut table = Table::from_values(vec![
            ("gender", vec!["M".into(), "F".into()]),
            ("customer_lifetime_value", vec!["1e30%".into(), "5%".into()]),
            ("number_of_open_complaints", vec!["0/1/0".into(), "0/1/0".into()]),
        ])
        .unwrap();
        let result = FormatValues.apply(&mut table).unwrap();

        assert_eq!(
            table.values("customer_lifetime_value").unwrap(),
            vec![Value::Missing, Value::Float(5.0)]
        );
        assert_eq!(result.values_coerced_to_missing, 1);
    }

    #[test]
    fn test_missing_gender_column_fails() {
        let mut table = Table::from_values(vec![("customer_lifetime_value", vec![])]).unwrap();

        let err = FormatValues.apply(&mut table).unwrap_err();
        assert!(matches!(err, CleanerError::MissingColumn(ref name) if name == "gender"));
    }
}
