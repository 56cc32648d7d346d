//! Types that represent the core data model, such as `Expense` and `ExpenseTable`.
mod amount;
mod category;
mod expense;
mod mapping;

pub use amount::{Amount, AmountCell, AmountError};
pub use category::{Category, Source};
pub use expense::{parse_date, Expense, ExpenseTable, RawTable};
pub use mapping::{Header, Mapping};

pub(crate) use expense::{AMOUNT_STR, CATEGORY_STR, DATE_STR, DESCRIPTION_STR, SOURCE_STR};
