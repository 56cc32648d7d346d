//! Configuration file handling.
//!
//! The configuration file is stored at `$EXPENSE_HOME/config.json` and contains the URLs of the
//! expense sheet, the entry form and the log form, the form field identifiers and the cache
//! settings.

use crate::{utils, Result};
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

const APP_NAME: &str = "expense-dash";
const CONFIG_VERSION: u8 = 1;
const CACHE_TTL_SECS: u64 = 600;
const CACHE: &str = ".cache";
const CONFIG_JSON: &str = "config.json";

/// The `Config` object represents the configuration of the app. You instantiate it by providing
/// the path to `$EXPENSE_HOME` and from there it loads `$EXPENSE_HOME/config.json`.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    cache_dir: PathBuf,
    config_path: PathBuf,
    config_file: ConfigFile,
    csv_url: Url,
}

impl Config {
    /// Creates the data directory, its cache subdirectory and an initial `config.json`.
    ///
    /// # Arguments
    /// - `dir` - The directory that will be the root of the data directory.
    /// - `sheet_url` - The expense sheet. Either a Google Sheets URL, which is turned into its CSV
    ///   export, or any URL serving CSV.
    /// - `form_url` - The `formResponse` URL of the entry form.
    /// - `log_form_url` - The `formResponse` URL of the audit log form.
    ///
    /// # Errors
    /// - Returns an error if a URL does not parse or any file operation fails.
    pub async fn create(
        dir: impl Into<PathBuf>,
        sheet_url: &str,
        form_url: &str,
        log_form_url: &str,
    ) -> Result<Self> {
        let config_file = ConfigFile {
            sheet_url: sheet_url.to_string(),
            form_url: form_url.to_string(),
            log_form_url: log_form_url.to_string(),
            ..ConfigFile::default()
        };
        let csv_url = config_file.validate()?;

        let maybe_relative = dir.into();
        utils::make_dir(&maybe_relative)
            .await
            .context("Unable to create the expense home directory")?;
        let root = utils::canonicalize(&maybe_relative).await?;

        let cache_dir = root.join(CACHE);
        utils::make_dir(&cache_dir).await?;

        let config_path = root.join(CONFIG_JSON);
        config_file.save(&config_path).await?;

        Ok(Self {
            root,
            cache_dir,
            config_path,
            config_file,
            csv_url,
        })
    }

    /// This will
    /// - validate that `expense_home` exists and that the config file exists
    /// - load and validate the config file
    /// - create the cache directory if it has gone missing
    pub async fn load(expense_home: impl Into<PathBuf>) -> Result<Self> {
        let maybe_relative = expense_home.into();
        let root = utils::canonicalize(&maybe_relative)
            .await
            .context("Expense home is missing, run 'expense init' first")?;

        let config_path = root.join(CONFIG_JSON);
        if !config_path.is_file() {
            bail!("The config file is missing '{}'", config_path.display())
        }
        let config_file = ConfigFile::load(&config_path).await?;
        let csv_url = config_file.validate()?;

        let cache_dir = root.join(CACHE);
        utils::make_dir(&cache_dir).await?;

        Ok(Self {
            root,
            cache_dir,
            config_path,
            config_file,
            csv_url,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    pub fn sheet_url(&self) -> &str {
        &self.config_file.sheet_url
    }

    /// The URL the expense CSV is downloaded from.
    pub fn csv_url(&self) -> &Url {
        &self.csv_url
    }

    pub fn form_url(&self) -> &str {
        &self.config_file.form_url
    }

    pub fn log_form_url(&self) -> &str {
        &self.config_file.log_form_url
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.config_file.cache_ttl_secs)
    }

    pub fn form_fields(&self) -> &FormFields {
        &self.config_file.form_fields
    }

    pub fn log_fields(&self) -> &LogFields {
        &self.config_file.log_fields
    }
}

/// The entry identifiers of the expense form.
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct FormFields {
    pub date: String,
    pub description: String,
    pub category: String,
    pub amount: String,
    pub source: String,
}

impl Default for FormFields {
    fn default() -> Self {
        Self {
            date: "entry.82515941".to_string(),
            description: "entry.777947910".to_string(),
            category: "entry.1731311708".to_string(),
            amount: "entry.335974527".to_string(),
            source: "entry.1970941208".to_string(),
        }
    }
}

/// The entry identifiers of the audit log form.
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct LogFields {
    pub timestamp: String,
    pub message: String,
}

impl Default for LogFields {
    fn default() -> Self {
        Self {
            timestamp: "entry.412909777".to_string(),
            message: "entry.1680040627".to_string(),
        }
    }
}

/// Represents the serialization and deserialization format of the configuration file.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "expense-dash",
///   "config_version": 1,
///   "sheet_url": "https://docs.google.com/spreadsheets/d/1XhB97l_K4kJbbKSgQoW2mGFW3AQr5C6Esc2acgh1IGI/edit",
///   "form_url": "https://docs.google.com/forms/d/e/FORM_ID/formResponse",
///   "log_form_url": "https://docs.google.com/forms/d/e/LOG_FORM_ID/formResponse",
///   "cache_ttl_secs": 600
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
struct ConfigFile {
    /// Application name, should always be "expense-dash"
    app_name: String,

    /// Configuration file version
    config_version: u8,

    /// URL of the expense sheet
    sheet_url: String,

    /// URL the expense form is posted to
    form_url: String,

    /// URL the audit log form is posted to
    log_form_url: String,

    /// How long a downloaded sheet is reused before it is downloaded again
    #[serde(default = "default_cache_ttl_secs")]
    cache_ttl_secs: u64,

    #[serde(default)]
    form_fields: FormFields,

    #[serde(default)]
    log_fields: LogFields,
}

fn default_cache_ttl_secs() -> u64 {
    CACHE_TTL_SECS
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            sheet_url: String::new(),
            form_url: String::new(),
            log_form_url: String::new(),
            cache_ttl_secs: CACHE_TTL_SECS,
            form_fields: FormFields::default(),
            log_fields: LogFields::default(),
        }
    }
}

impl ConfigFile {
    /// Loads a ConfigFile from the specified path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed, or has the wrong `app_name`.
    async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let config: ConfigFile = utils::deserialize(path).await?;

        anyhow::ensure!(
            config.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            config.app_name
        );

        Ok(config)
    }

    async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let p = path.as_ref();
        let data = serde_json::to_string_pretty(self).context("Unable to serialize config")?;
        utils::write(p, data)
            .await
            .context("Unable to write config file")
    }

    /// Checks that every URL parses and returns the CSV download URL.
    fn validate(&self) -> Result<Url> {
        Url::parse(&self.form_url)
            .with_context(|| format!("Invalid form_url '{}'", self.form_url))?;
        Url::parse(&self.log_form_url)
            .with_context(|| format!("Invalid log_form_url '{}'", self.log_form_url))?;
        csv_export_url(&self.sheet_url)
    }
}

/// Turns a Google Sheets URL into the URL of its CSV export. Other URLs are returned as they are.
///
/// e.g. `https://docs.google.com/spreadsheets/d/SPREADSHEET_ID/edit#gid=0` becomes
/// `https://docs.google.com/spreadsheets/d/SPREADSHEET_ID/gviz/tq?tqx=out:csv`
fn csv_export_url(sheet_url: &str) -> Result<Url> {
    let url = Url::parse(sheet_url).with_context(|| format!("Invalid sheet_url '{sheet_url}'"))?;
    if url.host_str() != Some("docs.google.com") {
        return Ok(url);
    }

    let segments: Vec<&str> = url.path_segments().map(|s| s.collect()).unwrap_or_default();
    match segments.as_slice() {
        ["spreadsheets", "d", id, ..] if !id.is_empty() => {
            let export = format!("https://docs.google.com/spreadsheets/d/{id}/gviz/tq?tqx=out:csv");
            Url::parse(&export).context("Unable to build the CSV export URL")
        }
        _ => bail!(
            "Invalid Google Sheets URL format. \
            Expected: https://docs.google.com/spreadsheets/d/SPREADSHEET_ID"
        ),
    }
}
