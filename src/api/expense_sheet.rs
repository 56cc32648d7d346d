//! Loading the expense table and submitting expenses and audit log entries through a `Sheet`.

use crate::api::forms::{log_fields, NewExpense};
use crate::api::{FormTarget, Sheet};
use crate::cache::Cache;
use crate::config::{FormFields, LogFields};
use crate::model::{ExpenseTable, RawTable};
use crate::{Config, Result};
use chrono::{DateTime, Local, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

/// The outcome of loading the expense table.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Loaded {
    pub table: ExpenseTable,
    /// Whether the table came from the cache instead of a download.
    pub from_cache: bool,
    /// Set when the download failed and `table` is empty.
    pub warning: Option<String>,
}

/// Wraps a `Sheet` with the form field identifiers from the configuration.
#[derive(Debug)]
pub struct ExpenseSheet {
    sheet: Box<dyn Sheet + Send>,
    form_fields: FormFields,
    log_fields: LogFields,
}

impl ExpenseSheet {
    pub fn new(sheet: Box<dyn Sheet + Send>, config: &Config) -> Self {
        Self {
            sheet,
            form_fields: config.form_fields().clone(),
            log_fields: config.log_fields().clone(),
        }
    }

    /// Downloads and normalizes the expense table.
    pub async fn fetch(&mut self) -> Result<ExpenseTable> {
        let csv = self.sheet.get_csv().await?;
        let raw = RawTable::from_csv(&csv)?;
        ExpenseTable::normalize(&raw)
    }

    /// Returns the cached table if it is still fresh, otherwise downloads it. A failed download
    /// is logged to the audit log and gives an empty table with a warning; it is not cached.
    pub async fn load(&mut self, cache: &Cache, now: DateTime<Local>) -> Loaded {
        let utc_now = now.with_timezone(&Utc);
        if let Some(table) = cache.get::<ExpenseTable>(utc_now).await {
            return Loaded {
                table,
                from_cache: true,
                warning: None,
            };
        }

        match self.fetch().await {
            Ok(table) => {
                info!("Loaded {} rows from the expense sheet", table.len());
                self.log(&format!("Data loaded successfully, rows: {}", table.len()), now)
                    .await;
                if let Err(e) = cache.put(&table, utc_now).await {
                    warn!("Unable to cache the expense table: {e:#}");
                }
                Loaded {
                    table,
                    from_cache: false,
                    warning: None,
                }
            }
            Err(e) => {
                let message = format!("ERROR while loading data: {e:#}");
                warn!("{message}");
                self.log(&message, now).await;
                Loaded {
                    table: ExpenseTable::default(),
                    from_cache: false,
                    warning: Some(format!("Unable to load the expense data: {e:#}")),
                }
            }
        }
    }

    /// Submits `expense` to the expense form and records the attempt in the audit log, whether or
    /// not it succeeded. Returns `true` if the form answered with HTTP 200.
    ///
    /// # Errors
    /// - The form could not be reached at all.
    pub async fn append(&mut self, expense: &NewExpense, now: DateTime<Local>) -> Result<bool> {
        let fields = expense.fields(&self.form_fields);
        let posted = self.sheet.post_form(FormTarget::Expense, &fields).await;
        self.log(&format!("Expense added: {}", expense.summary()), now)
            .await;
        let status = posted?;
        debug!("The expense form answered with status {status}");
        Ok(status == 200)
    }

    /// Writes an entry to the audit log. Failures are logged and otherwise ignored.
    pub async fn log(&mut self, message: &str, now: DateTime<Local>) {
        let fields = log_fields(&self.log_fields, now, message);
        match self.sheet.post_form(FormTarget::Log, &fields).await {
            Ok(200) => {}
            Ok(status) => warn!("The audit log form answered with status {status}"),
            Err(e) => warn!("Unable to write to the audit log: {e:#}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{TestSheet, TestSheetState};
    use crate::model::{Amount, Category, Source};
    use crate::test::TestEnv;
    use chrono::{NaiveDate, TimeDelta};

    fn expense_sheet(env: &TestEnv, sheet: &TestSheet) -> ExpenseSheet {
        ExpenseSheet::new(Box::new(sheet.clone()), &env.config())
    }

    fn new_expense() -> NewExpense {
        NewExpense {
            date: NaiveDate::from_ymd_opt(2025, 1, 6).unwrap(),
            description: "Bakso".to_string(),
            category: Category::Makan,
            amount: Amount::from(25000),
            source: Source::Suami,
        }
    }

    #[tokio::test]
    async fn test_load_downloads_then_uses_cache() {
        let env = TestEnv::new().await;
        let sheet = TestSheet::default();
        let mut expenses = expense_sheet(&env, &sheet);
        let cache = Cache::for_table(&env.config());
        let now = Local::now();

        let first = expenses.load(&cache, now).await;
        assert!(!first.from_cache);
        assert!(first.warning.is_none());
        assert_eq!(first.table.len(), 10);
        assert_eq!(
            sheet.get_state().log_messages(),
            vec!["Data loaded successfully, rows: 10".to_string()]
        );

        // Change the sheet; the cached copy is still used.
        sheet.set_state(TestSheetState::new("Tanggal,Total Pengeluaran\n"));
        let second = expenses.load(&cache, now + TimeDelta::seconds(60)).await;
        assert!(second.from_cache);
        assert_eq!(second.table, first.table);

        // After the TTL the sheet is downloaded again.
        let third = expenses.load(&cache, now + TimeDelta::seconds(601)).await;
        assert!(!third.from_cache);
        assert!(third.table.is_empty());
    }

    #[tokio::test]
    async fn test_load_after_clear_downloads() {
        let env = TestEnv::new().await;
        let sheet = TestSheet::default();
        let mut expenses = expense_sheet(&env, &sheet);
        let cache = Cache::for_table(&env.config());
        let now = Local::now();
        expenses.load(&cache, now).await;
        cache.clear().await.unwrap();
        assert!(!expenses.load(&cache, now).await.from_cache);
    }

    #[tokio::test]
    async fn test_load_failure_is_empty_logged_and_not_cached() {
        let env = TestEnv::new().await;
        let mut state = TestSheetState::default();
        state.get_error = Some("connection refused".to_string());
        let sheet = TestSheet::new(state);
        let mut expenses = expense_sheet(&env, &sheet);
        let cache = Cache::for_table(&env.config());

        let loaded = expenses.load(&cache, Local::now()).await;
        assert!(loaded.table.is_empty());
        assert!(loaded.warning.unwrap().contains("connection refused"));
        let messages = sheet.get_state().log_messages();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].starts_with("ERROR while loading data"));
        assert!(!cache.path().exists());
    }

    #[tokio::test]
    async fn test_load_unparseable_sheet_is_a_fetch_failure() {
        let env = TestEnv::new().await;
        let sheet = TestSheet::new(TestSheetState::new("Nama,Harga\nx,1\n"));
        let mut expenses = expense_sheet(&env, &sheet);
        let cache = Cache::for_table(&env.config());
        let loaded = expenses.load(&cache, Local::now()).await;
        assert!(loaded.table.is_empty());
        assert!(loaded.warning.is_some());
    }

    #[tokio::test]
    async fn test_append_success() {
        let env = TestEnv::new().await;
        let sheet = TestSheet::default();
        let mut expenses = expense_sheet(&env, &sheet);
        assert!(expenses.append(&new_expense(), Local::now()).await.unwrap());

        let state = sheet.get_state();
        assert_eq!(state.expenses.len(), 1);
        assert_eq!(state.expenses[0][3].1, "25000");
        assert_eq!(
            state.log_messages(),
            vec!["Expense added: 2025-01-06 | Bakso | Makan | Rp 25,000 | Suami".to_string()]
        );
    }

    #[tokio::test]
    async fn test_append_rejected_is_still_logged() {
        let env = TestEnv::new().await;
        let mut state = TestSheetState::default();
        state.expense_status = 500;
        let sheet = TestSheet::new(state);
        let mut expenses = expense_sheet(&env, &sheet);
        assert!(!expenses.append(&new_expense(), Local::now()).await.unwrap());
        let state = sheet.get_state();
        assert!(state.expenses.is_empty());
        assert_eq!(state.logs.len(), 1);
    }

    #[tokio::test]
    async fn test_append_unreachable_is_an_error() {
        let env = TestEnv::new().await;
        let mut state = TestSheetState::default();
        state.post_error = Some("network down".to_string());
        let sheet = TestSheet::new(state);
        let mut expenses = expense_sheet(&env, &sheet);
        let result = expenses.append(&new_expense(), Local::now()).await;
        assert!(result.unwrap_err().to_string().contains("network down"));
    }
}
