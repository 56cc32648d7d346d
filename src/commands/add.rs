use crate::api::{self, ExpenseSheet, Mode, NewExpense, Sheet};
use crate::args::AddArgs;
use crate::commands::Out;
use crate::model::{Amount, Category, Source};
use crate::{Config, Result};
use anyhow::{bail, ensure};
use chrono::{DateTime, Local};
use tracing::info;

/// Appends an expense to the sheet by submitting the entry form. The attempt is written to the
/// audit log whether or not the submission succeeds.
///
/// # Errors
/// - The description is blank, or the category or source is not one of the form's choices.
/// - The form could not be reached, or answered with a status other than 200.
pub async fn add(config: Config, mode: Mode, args: AddArgs) -> Result<Out<NewExpense>> {
    let sheet = api::sheet(&config, mode);
    add_with(&config, sheet, &args, Local::now()).await
}

async fn add_with(
    config: &Config,
    sheet: Box<dyn Sheet + Send>,
    args: &AddArgs,
    now: DateTime<Local>,
) -> Result<Out<NewExpense>> {
    let expense = new_expense(args, now)?;
    let mut expenses = ExpenseSheet::new(sheet, config);
    if !expenses.append(&expense, now).await? {
        bail!("Failed to add the expense, the form did not accept the submission");
    }
    info!("Submitted the expense form");
    Ok(Out::new(
        format!("Expense added: {}", expense.summary()),
        expense,
    ))
}

fn new_expense(args: &AddArgs, now: DateTime<Local>) -> Result<NewExpense> {
    let description = args.description().trim();
    ensure!(!description.is_empty(), "The description must not be empty");
    ensure!(
        args.category().is_known(),
        "Unknown category '{}', expected one of: {}",
        args.category(),
        join(Category::KNOWN.iter())
    );
    ensure!(
        args.source().is_known(),
        "Unknown source '{}', expected one of: {}",
        args.source(),
        join(Source::KNOWN.iter())
    );
    Ok(NewExpense {
        date: args.date().unwrap_or_else(|| now.date_naive()),
        description: description.to_string(),
        category: args.category().clone(),
        amount: Amount::from(args.amount()),
        source: args.source().clone(),
    })
}

fn join<T: ToString>(items: impl Iterator<Item = T>) -> String {
    items.map(|i| i.to_string()).collect::<Vec<_>>().join(", ")
}
