//! Implements the `Sheet` trait using in-memory data for testing purposes.
//!
//! Note: this is compiled even in the "production" version of this app so that we can run the whole
//! app, top-to-bottom, without using Google Sheets.

use crate::api::{FormTarget, Sheet};
use crate::Result;
use anyhow::bail;
use std::sync::{Arc, Mutex, MutexGuard};

/// The data behind a `TestSheet` and everything that was posted to it.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct TestSheetState {
    /// The CSV returned by `get_csv`.
    pub csv: String,
    /// When set, `get_csv` fails with this message.
    pub get_error: Option<String>,
    /// The status code returned for expense form posts.
    pub expense_status: u16,
    /// When set, every form post fails with this message, as if the network were down.
    pub post_error: Option<String>,
    /// Successfully submitted expense forms.
    pub expenses: Vec<Vec<(String, String)>>,
    /// Submitted audit log entries.
    pub logs: Vec<Vec<(String, String)>>,
}

impl Default for TestSheetState {
    /// Seeded with `SEED_DATA`.
    fn default() -> Self {
        Self::new(SEED_DATA)
    }
}

impl TestSheetState {
    pub fn new(csv: impl Into<String>) -> Self {
        Self {
            csv: csv.into(),
            get_error: None,
            expense_status: 200,
            post_error: None,
            expenses: Vec::new(),
            logs: Vec::new(),
        }
    }

    /// The message field of every audit log entry.
    pub fn log_messages(&self) -> Vec<String> {
        self.logs
            .iter()
            .filter_map(|fields| fields.last().map(|(_, v)| v.clone()))
            .collect()
    }
}

/// An implementation of the `Sheet` trait that does not use Google. Clones share their state so
/// that a test can keep one to inspect what the code under test did.
#[derive(Debug, Clone, Default)]
pub struct TestSheet {
    state: Arc<Mutex<TestSheetState>>,
}

impl TestSheet {
    pub fn new(state: TestSheetState) -> Self {
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    /// A copy of the current state.
    pub fn get_state(&self) -> TestSheetState {
        self.lock().clone()
    }

    pub fn set_state(&self, state: TestSheetState) {
        *self.lock() = state;
    }

    fn lock(&self) -> MutexGuard<'_, TestSheetState> {
        // A poisoned lock only means another test thread panicked; the data is still usable.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait::async_trait]
impl Sheet for TestSheet {
    async fn get_csv(&mut self) -> Result<String> {
        let state = self.lock();
        match &state.get_error {
            Some(message) => bail!("{message}"),
            None => Ok(state.csv.clone()),
        }
    }

    async fn post_form(&mut self, target: FormTarget, fields: &[(String, String)]) -> Result<u16> {
        let mut state = self.lock();
        if let Some(message) = &state.post_error {
            bail!("Failed to send the {target} form: {message}");
        }
        match target {
            FormTarget::Expense => {
                if state.expense_status == 200 {
                    state.expenses.push(fields.to_vec());
                }
                Ok(state.expense_status)
            }
            FormTarget::Log => {
                state.logs.push(fields.to_vec());
                Ok(200)
            }
        }
    }
}

/// Seed expense data.
pub(crate) const SEED_DATA: &str = r##"Timestamp,Tanggal,Nama Pengeluaran,Kategori,Total Pengeluaran,Source
1/1/2025 8:15:02,2025-01-01,Nasi uduk,Makan,15000,Istri
1/1/2025 12:40:11,2025-01-01,Es kopi susu,Jajan,22000,Suami
1/1/2025 19:05:45,2025-01-01,Sayur dan lauk,Belanja,87500,BRI
1/2/2025 7:30:00,2025-01-02,Ojek ke kantor,Transportasi,18000,Suami
1/2/2025 13:10:27,2025-01-02,Nasi padang,Makan,28000,Suami
1/3/2025 9:00:00,2025-01-03,Cuci setrika 5kg,Laundry,35000,Istri
1/3/2025 16:20:13,2025-01-03,Martabak,Jajan,45000,BRI
1/4/2025 10:45:50,2025-01-04,Belanja bulanan,Belanja,640000,BRI
1/4/2025 11:02:31,2025-01-04,Pulsa,Lain - Lain,50000,Istri
1/5/2025 18:30:09,2025-01-05,Bensin,Transportasi,40000,Suami
"##;
