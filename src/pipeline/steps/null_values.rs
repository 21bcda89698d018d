use tracing::{debug, warn};

use super::super::{CleaningStep, StepResult};
use crate::constants::{GENDER_COLUMN, INCOME_COLUMN, LIFETIME_VALUE_COLUMN, MONTHLY_PREMIUM_COLUMN};
use crate::error::Result;
use crate::stats;
use crate::table::{Table, Value};

/// Drop empty rows, fill the known gaps, then drop anything still incomplete
pub struct HandleNullValues;

/// How a column's gaps get filled
#[derive(Debug, Clone, Copy)]
enum Fill {
    Mode,
    Mean,
    Median,
}

impl Fill {
    fn label(self) -> &'static str {
        match self {
            Fill::Mode => "mode",
            Fill::Mean => "mean",
            Fill::Median => "median",
        }
    }
}

const FILLS: [(&str, Fill); 4] = [
    (GENDER_COLUMN, Fill::Mode),
    (LIFETIME_VALUE_COLUMN, Fill::Mean),
    (INCOME_COLUMN, Fill::Median),
    (MONTHLY_PREMIUM_COLUMN, Fill::Mean),
];

/// Fill value for a column, computed over its non-missing cells only.
/// A mean that overflows is no fill at all.
fn fill_value(table: &Table, name: &str, fill: Fill) -> Result<Option<Value>> {
    let value = match fill {
        Fill::Mode => stats::mode(&table.text_values(name)?).map(Value::text),
        Fill::Mean => stats::mean(&table.numeric_values(name)?)
            .filter(|mean| mean.is_finite())
            .map(Value::Float),
        Fill::Median => stats::median(&table.numeric_values(name)?).map(Value::Float),
    };
    Ok(value)
}

impl CleaningStep for HandleNullValues {
    fn apply(&self, table: &mut Table) -> Result<StepResult> {
        // 1. Rows with nothing in them go before any statistics are taken
        let empty_rows = table.drop_blank_rows()?;
        debug!("Dropped {} empty rows", empty_rows);

        // 2. Targeted fills
        let mut filled = 0;
        let mut fills = Vec::new();
        for (name, fill) in FILLS {
            match fill_value(table, name, fill)? {
                Some(value) => {
                    let count = table.fill_missing(name, &value)?;
                    debug!("Filled {} missing '{}' cells with {} {}", count, name, fill.label(), value);
                    filled += count;
                    fills.push((name, value));
                }
                None => {
                    warn!("Column '{}' has no usable values, its gaps cannot be filled", name);
                }
            }
        }

        // 3. Whatever is still incomplete goes
        let incomplete_rows = table.drop_incomplete_rows()?;

        let mut result = StepResult::new(
            filled,
            format!(
                "Dropped {} empty rows, filled {} missing values, dropped {} incomplete rows",
                empty_rows, filled, incomplete_rows
            ),
        )
        .with_detail("empty_rows_dropped", empty_rows)
        .with_detail("incomplete_rows_dropped", incomplete_rows);
        for (name, value) in fills {
            result = result.with_detail(&format!("{}_fill", name), value);
        }
        Ok(result)
    }

    fn step_name(&self) -> &'static str {
        "handle_null_values"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CleanerError;

    fn null_table(
        gender: Vec<Value>,
        lifetime: Vec<Value>,
        income: Vec<Value>,
        premium: Vec<Value>,
    ) -> Table {
        Table::from_values(vec![
            ("gender", gender),
            ("customer_lifetime_value", lifetime),
            ("income", income),
            ("monthly_premium_auto", premium),
        ])
        .unwrap()
    }

    #[test]
    fn test_missing_gender_is_filled_with_mode() {
        let mut table = null_table(
            vec!["F".into(), "M".into(), "M".into(), Value::Missing],
            vec![Value::Float(1.0); 4],
            vec![Value::Int(1); 4],
            vec![Value::Int(1); 4],
        );
        HandleNullValues.apply(&mut table).unwrap();

        assert_eq!(table.height(), 4);
        assert_eq!(table.values("gender").unwrap()[3], Value::text("M"));
    }

    #[test]
    fn test_numeric_gaps_use_mean_and_median() {
        let mut table = null_table(
            vec!["F".into(); 4],
            vec![Value::Float(1.0), Value::Float(2.0), Value::Float(6.0), Value::Missing],
            vec![Value::Int(10), Value::Int(40), Value::Int(20), Value::Missing],
            vec![Value::Int(100), Value::Missing, Value::Int(50), Value::Int(60)],
        );
        let result = HandleNullValues.apply(&mut table).unwrap();

        assert_eq!(table.values("customer_lifetime_value").unwrap()[3], Value::Float(3.0));
        assert_eq!(table.values("income").unwrap()[3], Value::Float(20.0));
        assert_eq!(table.values("monthly_premium_auto").unwrap()[1], Value::Float(70.0));
        assert_eq!(result.values_changed, 3);
        assert_eq!(result.details.get("income_fill").map(String::as_str), Some("20"));
    }

    #[test]
    fn test_empty_rows_dropped_before_fill() {
        // The empty row must not drag the gender mode or the means around
        let mut table = null_table(
            vec!["F".into(), Value::Missing, Value::Missing],
            vec![Value::Float(4.0), Value::Missing, Value::Float(2.0)],
            vec![Value::Int(1), Value::Missing, Value::Int(1)],
            vec![Value::Int(1), Value::Missing, Value::Int(1)],
        );
        let result = HandleNullValues.apply(&mut table).unwrap();

        assert_eq!(table.height(), 2);
        assert_eq!(table.index(), &[0, 2]);
        assert_eq!(table.values("gender").unwrap()[1], Value::text("F"));
        assert_eq!(result.details.get("empty_rows_dropped").map(String::as_str), Some("1"));
    }

    #[test]
    fn test_rows_with_other_gaps_are_dropped() {
        let mut table = Table::from_values(vec![
            ("state", vec!["CA".into(), Value::Missing]),
            ("gender", vec!["F".into(), "M".into()]),
            ("customer_lifetime_value", vec![Value::Float(1.0), Value::Float(2.0)]),
            ("income", vec![Value::Int(1), Value::Int(2)]),
            ("monthly_premium_auto", vec![Value::Int(1), Value::Int(2)]),
        ])
        .unwrap();
        HandleNullValues.apply(&mut table).unwrap();

        assert_eq!(table.height(), 1);
        assert_eq!(table.values("state").unwrap(), vec![Value::text("CA")]);
    }

    #[test]
    fn test_overflowing_mean_is_not_used() {
        let mut table = null_table(
            vec!["F".into(); 3],
            vec![Value::Float(f64::MAX), Value::Float(f64::MAX), Value::Missing],
            vec![Value::Int(1); 3],
            vec![Value::Int(1); 3],
        );
        let result = HandleNullValues.apply(&mut table).unwrap();

        assert_eq!(table.height(), 2);
        assert!(!result.details.contains_key("customer_lifetime_value_fill"));
    }

    #[test]
    fn test_missing_income_column_fails() {
        let mut table = Table::from_values(vec![
            ("gender", vec!["F".into()]),
            ("customer_lifetime_value", vec![Value::Float(1.0)]),
            ("monthly_premium_auto", vec![Value::Int(1)]),
        ])
        .unwrap();

        let err = HandleNullValues.apply(&mut table).unwrap_err();
        assert!(matches!(err, CleanerError::MissingColumn(ref name) if name == "income"));
    }
}
