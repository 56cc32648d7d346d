use crate::commands::Out;
use crate::{Config, Result};
use anyhow::Context;
use std::path::Path;

/// Creates the data directory, its cache subdirectory and an initial `config.json` file holding
/// the three URLs along with default settings.
///
/// # Arguments
/// - `expense_home` - The directory that will be the root of data directory, e.g.
///   `$HOME/expense-dash`
/// - `sheet_url` - The URL of the Google Sheet where the expenses are stored.
/// - `form_url` - The `formResponse` URL of the Google Form that appends expenses.
/// - `log_form_url` - The `formResponse` URL of the Google Form that appends audit log entries.
///
/// # Errors
/// - Returns an error if a URL is invalid or any file operations fail.
pub async fn init(
    expense_home: &Path,
    sheet_url: &str,
    form_url: &str,
    log_form_url: &str,
) -> Result<Out<()>> {
    let config = Config::create(expense_home, sheet_url, form_url, log_form_url)
        .await
        .context("Unable to create the data directory and configs")?;
    Ok(format!(
        "Successfully created the expense directory and config at {}",
        config.root().display()
    )
    .into())
}
