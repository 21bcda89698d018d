/// Column names the pipeline knows about, in their normalized form
pub const STATE_COLUMN: &str = "state";
pub const GENDER_COLUMN: &str = "gender";
pub const LIFETIME_VALUE_COLUMN: &str = "customer_lifetime_value";
pub const OPEN_COMPLAINTS_COLUMN: &str = "number_of_open_complaints";
pub const INCOME_COLUMN: &str = "income";
pub const MONTHLY_PREMIUM_COLUMN: &str = "monthly_premium_auto";

/// Abbreviated state column as it appears after lowercasing
pub const SHORT_STATE_COLUMN: &str = "st";

/// Stand-in for a missing open complaints entry ("x/count/y" layout)
pub const DEFAULT_OPEN_COMPLAINTS: &str = "0/0/0";

/// Printed once the whole pipeline has finished
pub const COMPLETION_MESSAGE: &str = "Data cleaning and formatting complete.";

/// Accepted raw gender spellings and the code each one maps to.
/// Anything not listed here becomes missing.
pub const GENDER_MAP: [(&str, &str); 5] = [
    ("F", "F"),
    ("M", "M"),
    ("Male", "M"),
    ("female", "F"),
    ("Femal", "F"),
];

/// Columns that must exist (after name normalization) for the pipeline to run
pub fn required_columns() -> Vec<&'static str> {
    vec![
        GENDER_COLUMN,
        LIFETIME_VALUE_COLUMN,
        OPEN_COMPLAINTS_COLUMN,
        INCOME_COLUMN,
        MONTHLY_PREMIUM_COLUMN,
    ]
}
