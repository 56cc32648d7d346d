//! Form payloads for the expense form and the audit log form.

use crate::config::{FormFields, LogFields};
use crate::model::{Amount, Category, Source};
use chrono::{DateTime, Local, NaiveDate};
use serde::{Deserialize, Serialize};

/// An expense entered by the user, to be appended to the sheet.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct NewExpense {
    pub date: NaiveDate,
    pub description: String,
    pub category: Category,
    pub amount: Amount,
    pub source: Source,
}

impl NewExpense {
    /// The form-encoded fields for the expense form.
    pub fn fields(&self, ids: &FormFields) -> Vec<(String, String)> {
        vec![
            (ids.date.clone(), self.date.format("%Y-%m-%d").to_string()),
            (ids.description.clone(), self.description.clone()),
            (ids.category.clone(), self.category.to_string()),
            (ids.amount.clone(), self.amount.plain()),
            (ids.source.clone(), self.source.to_string()),
        ]
    }

    /// One line describing the expense, e.g.
    /// `2024-01-01 | Nasi padang | Makan | Rp 20,000 | BRI`
    pub fn summary(&self) -> String {
        format!(
            "{} | {} | {} | {} | {}",
            self.date.format("%Y-%m-%d"),
            self.description,
            self.category,
            self.amount,
            self.source
        )
    }
}

/// The timestamp format of the audit log, `DD/MM/YYYY HH:MM:SS`.
pub fn log_timestamp(now: DateTime<Local>) -> String {
    now.format("%d/%m/%Y %H:%M:%S").to_string()
}

/// The form-encoded fields for an audit log entry.
pub fn log_fields(ids: &LogFields, now: DateTime<Local>, message: &str) -> Vec<(String, String)> {
    vec![
        (ids.timestamp.clone(), log_timestamp(now)),
        (ids.message.clone(), message.to_string()),
    ]
}
