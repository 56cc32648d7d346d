//! Filtering and aggregation of expense records for the dashboard tables and charts.
//!
//! Every function takes a slice of records and returns a new derived value. Records whose amount
//! cell is invalid are left out of every sum and ranking and reported by `data_errors`.

use crate::model::{Amount, AmountCell, Category, Expense};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

/// Keeps the records dated within `start..=end`. Undated records are never kept, and a range
/// with `start > end` keeps nothing.
pub fn filter_by_range(records: &[Expense], start: NaiveDate, end: NaiveDate) -> Vec<Expense> {
    records
        .iter()
        .filter(|e| matches!(e.date(), Some(d) if start <= d && d <= end))
        .cloned()
        .collect()
}

/// Sum of all valid amounts.
pub fn total(records: &[Expense]) -> Amount {
    records.iter().filter_map(|e| e.amount().amount()).sum()
}

/// Totals per category.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryTotals(BTreeMap<Category, Amount>);

impl CategoryTotals {
    /// The total for `category`, zero when it has no records.
    pub fn get(&self, category: &Category) -> Amount {
        self.0.get(category).copied().unwrap_or_default()
    }

    /// The six known categories in display order, each with its total (possibly zero).
    pub fn known(&self) -> Vec<(Category, Amount)> {
        Category::KNOWN
            .into_iter()
            .map(|c| {
                let amount = self.get(&c);
                (c, amount)
            })
            .collect()
    }

    /// Categories found in the data that are not one of the known six.
    pub fn unknown(&self) -> Vec<(Category, Amount)> {
        self.0
            .iter()
            .filter(|(c, _)| !c.is_known())
            .map(|(c, a)| (c.clone(), *a))
            .collect()
    }

    /// Only the categories present in the data.
    pub fn iter(&self) -> impl Iterator<Item = (&Category, &Amount)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn total(&self) -> Amount {
        self.0.values().sum()
    }
}

pub fn sum_by_category(records: &[Expense]) -> CategoryTotals {
    let mut totals: BTreeMap<Category, Amount> = BTreeMap::new();
    for expense in records {
        if let Some(amount) = expense.amount().amount() {
            let entry = totals.entry(expense.category().clone()).or_default();
            *entry = *entry + amount;
        }
    }
    CategoryTotals(totals)
}

/// One point of the spending trend.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub struct DailyTotal {
    pub date: NaiveDate,
    pub total: Amount,
}

/// Valid amounts summed per day, in ascending date order. Undated records are skipped.
pub fn daily_totals(records: &[Expense]) -> Vec<DailyTotal> {
    let mut by_day: BTreeMap<NaiveDate, Amount> = BTreeMap::new();
    for expense in records {
        if let (Some(date), Some(amount)) = (expense.date(), expense.amount().amount()) {
            let entry = by_day.entry(date).or_default();
            *entry = *entry + amount;
        }
    }
    by_day
        .into_iter()
        .map(|(date, total)| DailyTotal { date, total })
        .collect()
}

/// The `n` records with the largest amounts, largest first. Equal amounts keep the order of the
/// input.
pub fn top_n(records: &[Expense], n: usize) -> Vec<Expense> {
    let mut ranked: Vec<(&Expense, Amount)> = records
        .iter()
        .filter_map(|e| e.amount().amount().map(|a| (e, a)))
        .collect();
    // sort_by is stable
    ranked.sort_by(|(_, a), (_, b)| b.cmp(a));
    ranked
        .into_iter()
        .take(n)
        .map(|(e, _)| e.clone())
        .collect()
}

/// The y-axis range of the trend chart.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub struct TrendBounds {
    pub lower: Amount,
    pub upper: Amount,
}

/// Half of the smallest daily total to one and a half times the largest. `None` when there are
/// no points.
pub fn trend_bounds(daily: &[DailyTotal]) -> Option<TrendBounds> {
    let min = daily.iter().map(|d| d.total).min()?;
    let max = daily.iter().map(|d| d.total).max()?;
    Some(TrendBounds {
        lower: min.scale(Decimal::new(5, 1)),
        upper: max.scale(Decimal::new(15, 1)),
    })
}

/// A pie chart slice.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct CategoryShare {
    pub category: Category,
    pub total: Amount,
    /// Share of the overall total, in percent, rounded to one decimal place.
    pub percent: Decimal,
}

/// Each category's share of the overall total. Empty when the total is zero.
pub fn category_shares(totals: &CategoryTotals) -> Vec<CategoryShare> {
    let grand_total = totals.total().value();
    if grand_total.is_zero() {
        return Vec::new();
    }
    totals
        .iter()
        .map(|(category, amount)| CategoryShare {
            category: category.clone(),
            total: *amount,
            percent: (amount.value() / grand_total * Decimal::ONE_HUNDRED).round_dp(1),
        })
        .collect()
}

/// A record whose amount could not be used.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct DataError {
    /// One-based sheet row number, counting the header row as row 1.
    pub sheet_row: usize,
    pub description: String,
    pub value: String,
}

impl Display for DataError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.value.is_empty() {
            write!(
                f,
                "row {} ({}): the amount is empty",
                self.sheet_row, self.description
            )
        } else {
            write!(
                f,
                "row {} ({}): '{}' is not a valid amount",
                self.sheet_row, self.description, self.value
            )
        }
    }
}

pub fn data_errors(records: &[Expense]) -> Vec<DataError> {
    records
        .iter()
        .filter_map(|e| match e.amount() {
            AmountCell::Valid(_) => None,
            AmountCell::Invalid(value) => Some(DataError {
                sheet_row: e.row() + 2,
                description: e.description().to_string(),
                value: value.clone(),
            }),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Source;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn expense(row: usize, d: &str, category: Category, amount: &str) -> Expense {
        Expense::new(
            row,
            crate::model::parse_date(d),
            format!("item {row}"),
            category,
            AmountCell::parse(amount),
            Source::Bri,
        )
    }

    fn example() -> Vec<Expense> {
        vec![
            expense(0, "2024-01-01", Category::Makan, "20000"),
            expense(1, "2024-01-01", Category::Jajan, "5000"),
            expense(2, "2024-01-02", Category::Makan, "15000"),
        ]
    }

    #[test]
    fn test_single_day_example() {
        let filtered = filter_by_range(&example(), date("2024-01-01"), date("2024-01-01"));
        assert_eq!(filtered.len(), 2);

        let sums = sum_by_category(&filtered);
        assert_eq!(sums.len(), 2);
        assert_eq!(sums.get(&Category::Makan), Amount::from(20000));
        assert_eq!(sums.get(&Category::Jajan), Amount::from(5000));

        let daily = daily_totals(&filtered);
        assert_eq!(
            daily,
            vec![DailyTotal {
                date: date("2024-01-01"),
                total: Amount::from(25000)
            }]
        );
    }

    #[test]
    fn test_filter_is_inclusive() {
        let filtered = filter_by_range(&example(), date("2024-01-01"), date("2024-01-02"));
        assert_eq!(filtered.len(), 3);
    }

    #[test]
    fn test_filter_reversed_range_is_empty() {
        let filtered = filter_by_range(&example(), date("2024-01-02"), date("2024-01-01"));
        assert!(filtered.is_empty());
    }

    #[test]
    fn test_filter_excludes_undated() {
        let records = vec![
            expense(0, "not a date", Category::Makan, "100"),
            expense(1, "2024-01-01", Category::Makan, "100"),
        ];
        let filtered = filter_by_range(&records, NaiveDate::MIN, NaiveDate::MAX);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].row(), 1);
    }

    #[test]
    fn test_known_categories_default_to_zero() {
        let sums = sum_by_category(&example());
        let known = sums.known();
        assert_eq!(known.len(), 6);
        assert_eq!(known[0], (Category::Makan, Amount::from(35000)));
        assert_eq!(known[2], (Category::Belanja, Amount::ZERO));
        assert!(sums.unknown().is_empty());
    }

    #[test]
    fn test_unknown_category_keeps_its_key() {
        let records = vec![expense(0, "2024-01-01", "Pulsa".parse().unwrap(), "50000")];
        let sums = sum_by_category(&records);
        assert_eq!(
            sums.unknown(),
            vec![(Category::Other("Pulsa".to_string()), Amount::from(50000))]
        );
        assert!(sums.known().iter().all(|(_, a)| a.is_zero()));
    }

    #[test]
    fn test_conservation() {
        let mut records = example();
        records.push(expense(3, "2024-01-03", Category::Laundry, "12000"));
        records.push(expense(4, "2024-01-03", "Pulsa".parse().unwrap(), "25000"));
        records.push(expense(5, "2024-01-03", Category::Laundry, "abc"));
        let sums = sum_by_category(&records);
        assert_eq!(sums.total(), total(&records));
        assert_eq!(total(&records), Amount::from(77000));
    }

    #[test]
    fn test_invalid_amount_is_excluded_and_flagged() {
        let records = vec![
            expense(0, "2024-01-01", Category::Makan, "20000"),
            expense(1, "2024-01-01", Category::Makan, "abc"),
        ];
        assert_eq!(total(&records), Amount::from(20000));
        assert_eq!(
            sum_by_category(&records).get(&Category::Makan),
            Amount::from(20000)
        );
        let errors = data_errors(&records);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].sheet_row, 3);
        assert_eq!(errors[0].value, "abc");
        assert_eq!(top_n(&records, 5).len(), 1);
    }

    #[test]
    fn test_empty_input() {
        let records: Vec<Expense> = Vec::new();
        assert!(filter_by_range(&records, NaiveDate::MIN, NaiveDate::MAX).is_empty());
        assert!(total(&records).is_zero());
        assert!(sum_by_category(&records).is_empty());
        assert!(daily_totals(&records).is_empty());
        assert!(top_n(&records, 5).is_empty());
        assert!(trend_bounds(&daily_totals(&records)).is_none());
        assert!(category_shares(&sum_by_category(&records)).is_empty());
        assert!(data_errors(&records).is_empty());
    }

    #[test]
    fn test_daily_totals_sorted() {
        let records = vec![
            expense(0, "2024-01-03", Category::Makan, "1"),
            expense(1, "2024-01-01", Category::Makan, "2"),
            expense(2, "2024-01-03", Category::Jajan, "3"),
        ];
        let daily = daily_totals(&records);
        assert_eq!(daily.len(), 2);
        assert_eq!(daily[0].date, date("2024-01-01"));
        assert_eq!(daily[1].total, Amount::from(4));
    }

    #[test]
    fn test_top_n_descending_and_stable() {
        let records = vec![
            expense(0, "2024-01-01", Category::Makan, "100"),
            expense(1, "2024-01-01", Category::Makan, "300"),
            expense(2, "2024-01-01", Category::Makan, "200"),
            expense(3, "2024-01-01", Category::Makan, "300"),
            expense(4, "2024-01-01", Category::Makan, "50"),
            expense(5, "2024-01-01", Category::Makan, "200"),
        ];
        let rows: Vec<usize> = top_n(&records, 5).iter().map(Expense::row).collect();
        assert_eq!(rows, vec![1, 3, 2, 5, 0]);
    }

    #[test]
    fn test_top_n_fewer_rows() {
        let top = top_n(&example(), 5);
        assert_eq!(top.len(), 3);
        assert_eq!(top[0].row(), 0);
        assert_eq!(top[2].row(), 1);
    }

    #[test]
    fn test_trend_bounds() {
        let daily = daily_totals(&example());
        let bounds = trend_bounds(&daily).unwrap();
        assert_eq!(bounds.lower, Amount::from(7500));
        assert_eq!(bounds.upper, Amount::from(37500));
    }

    #[test]
    fn test_huge_amounts_do_not_overflow() {
        let records = vec![
            expense(0, "2024-01-01", Category::Makan, "79228162514264337593543950335"),
            expense(1, "2024-01-01", Category::Makan, "18446744073709551615"),
            expense(2, "2024-01-01", Category::Jajan, "18446744073709551615"),
            expense(3, "2024-01-02", Category::Jajan, "18446744073709551615"),
        ];
        assert_eq!(data_errors(&records).len(), 1);
        let max = Amount::from(u64::MAX);
        let expected = max + max + max;
        assert_eq!(total(&records), expected);

        let daily = daily_totals(&records);
        let bounds = trend_bounds(&daily).unwrap();
        assert_eq!(bounds.lower, max.scale(Decimal::new(5, 1)));
        assert_eq!(bounds.upper, (max + max).scale(Decimal::new(15, 1)));

        let shares = category_shares(&sum_by_category(&records));
        assert_eq!(shares.len(), 2);
        assert_eq!(shares[1].percent, Decimal::new(667, 1));
    }

    #[test]
    fn test_category_shares() {
        let shares = category_shares(&sum_by_category(&example()));
        assert_eq!(shares.len(), 2);
        assert_eq!(shares[0].category, Category::Makan);
        assert_eq!(shares[0].percent, Decimal::new(875, 1));
        assert_eq!(shares[1].percent, Decimal::new(125, 1));
    }
}
