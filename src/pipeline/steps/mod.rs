pub mod column_names;
pub mod dedupe;
pub mod format_values;
pub mod integers;
pub mod null_values;

pub use column_names::NormalizeColumnNames;
pub use dedupe::DropDuplicates;
pub use format_values::FormatValues;
pub use integers::CoerceIntegers;
pub use null_values::HandleNullValues;
