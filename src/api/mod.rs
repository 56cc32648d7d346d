//! Access to the external expense sheet, the entry form and the audit log form.
//!
//! The `Sheet` trait is the seam to the outside world. `GoogleSheet` implements it with HTTP
//! calls; `TestSheet` implements it in memory so the whole program can run without the network.

mod expense_sheet;
mod forms;
mod google;
mod test_sheet;

use crate::{Config, Result};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

pub use expense_sheet::{ExpenseSheet, Loaded};
pub use forms::NewExpense;
pub use test_sheet::{TestSheet, TestSheetState};

/// Environment variable that switches the program to the in-memory `TestSheet`.
pub const TEST_MODE_ENV: &str = "EXPENSE_DASH_IN_TEST_MODE";

/// Which form a submission goes to.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormTarget {
    /// The form that appends a row to the expense sheet.
    Expense,
    /// The form that appends a row to the audit log sheet.
    Log,
}

serde_plain::derive_display_from_serialize!(FormTarget);

/// Whether to talk to the real Google services or to in-memory test data.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq)]
pub enum Mode {
    #[default]
    Google,
    Test,
}

impl Mode {
    /// `Mode::Test` when `EXPENSE_DASH_IN_TEST_MODE` is set and non-empty, `Mode::Google`
    /// otherwise.
    pub fn from_env() -> Self {
        match std::env::var(TEST_MODE_ENV) {
            Ok(value) if !value.is_empty() => Mode::Test,
            _ => Mode::Google,
        }
    }
}

/// The operations the dashboard needs from the outside world.
#[async_trait::async_trait]
pub trait Sheet: Debug {
    /// Downloads the expense sheet as CSV text.
    async fn get_csv(&mut self) -> Result<String>;

    /// Posts form-encoded `fields` to the `target` form and returns the HTTP status code.
    async fn post_form(&mut self, target: FormTarget, fields: &[(String, String)]) -> Result<u16>;
}

/// Creates the `Sheet` implementation for `mode`.
pub fn sheet(config: &Config, mode: Mode) -> Box<dyn Sheet + Send> {
    match mode {
        Mode::Google => Box::new(google::GoogleSheet::new(config)),
        Mode::Test => Box::new(TestSheet::default()),
    }
}
