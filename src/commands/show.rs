use crate::api::{self, ExpenseSheet, Mode, Sheet};
use crate::args::ShowArgs;
use crate::cache::Cache;
use crate::commands::{Out, OutputFormat};
use crate::dashboard::Dashboard;
use crate::range::DateRange;
use crate::{render, Config, Result};
use anyhow::Context;
use chrono::{DateTime, Local};
use tracing::{debug, warn};

/// Loads the expense table (from the cache when it is fresh) and renders the dashboard for the
/// picked dates. With no dates the range is today; one date is a single day; two dates are the
/// start and end.
///
/// A load failure is not an error: the dashboard is rendered from an empty table with a warning.
/// Neither is a malformed date pick: the output is a prompt to pick a valid range.
pub async fn show(config: Config, mode: Mode, args: ShowArgs) -> Result<Out<Dashboard>> {
    let sheet = api::sheet(&config, mode);
    show_with(&config, sheet, &args, Local::now()).await
}

async fn show_with(
    config: &Config,
    sheet: Box<dyn Sheet + Send>,
    args: &ShowArgs,
    now: DateTime<Local>,
) -> Result<Out<Dashboard>> {
    let cache = Cache::for_table(config);
    if args.refresh() && cache.clear().await? {
        debug!("Cleared the cached expense data");
    }

    let mut expenses = ExpenseSheet::new(sheet, config);
    let loaded = expenses.load(&cache, now).await;

    let range = if args.dates().is_empty() {
        DateRange::day(now.date_naive())
    } else {
        match DateRange::from_picks(args.dates()) {
            Ok(range) => range,
            Err(e) => {
                warn!("{e}");
                return Ok(Out::new_message(e.to_string()));
            }
        }
    };
    debug!("Showing expenses for {range}");

    let dashboard = Dashboard::build(&loaded.table, range);
    let mut message = String::new();
    if let Some(warning) = &loaded.warning {
        message.push_str(&format!("WARNING: {warning}\n\n"));
    }
    match args.format() {
        OutputFormat::Table => message.push_str(&render::dashboard(&dashboard)),
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&dashboard)
                .context("Unable to serialize the dashboard")?;
            message.push_str(&json);
        }
    }
    Ok(Out::new(message, dashboard))
}
