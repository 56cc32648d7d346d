//! The derived dashboard view for one date range.

use crate::aggregate::{
    self, CategoryShare, CategoryTotals, DailyTotal, DataError, TrendBounds,
};
use crate::model::{Amount, Expense, ExpenseTable, Header};
use crate::range::DateRange;
use serde::{Deserialize, Serialize};

/// How many of the largest expenses are listed.
pub const TOP_COUNT: usize = 5;

/// Everything the dashboard shows for a date range, computed from a normalized table.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Dashboard {
    pub range: DateRange,
    /// Headers of the history table; timestamp columns are left out.
    pub columns: Vec<Header>,
    /// The filtered view.
    pub history: Vec<Expense>,
    pub total: Amount,
    pub by_category: CategoryTotals,
    pub daily: Vec<DailyTotal>,
    pub trend_bounds: Option<TrendBounds>,
    pub shares: Vec<CategoryShare>,
    pub top: Vec<Expense>,
    pub data_errors: Vec<DataError>,
}

impl Dashboard {
    pub fn build(table: &ExpenseTable, range: DateRange) -> Self {
        let history = aggregate::filter_by_range(table.data(), range.start, range.end);
        let by_category = aggregate::sum_by_category(&history);
        let daily = aggregate::daily_totals(&history);
        Self {
            range,
            columns: table
                .headers()
                .iter()
                .filter(|h| !is_timestamp(h))
                .cloned()
                .collect(),
            total: aggregate::total(&history),
            trend_bounds: aggregate::trend_bounds(&daily),
            shares: aggregate::category_shares(&by_category),
            top: aggregate::top_n(&history, TOP_COUNT),
            data_errors: aggregate::data_errors(&history),
            by_category,
            daily,
            history,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }
}

fn is_timestamp(header: &Header) -> bool {
    header.as_ref().to_lowercase().contains("timestamp")
}
