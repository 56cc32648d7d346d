//! Plain text rendering of a `Dashboard` for the terminal.

use crate::dashboard::Dashboard;
use crate::model::{Expense, DATE_STR, DESCRIPTION_STR, AMOUNT_STR};
use std::fmt::Write;

const NO_HISTORY: &str = "WARNING: There are no expenses in this date range.";
const NO_TREND: &str = "WARNING: There is no data for the trend chart.";
const NO_PIE: &str = "WARNING: There is no data for the distribution or the top 5 expenses.";

/// Renders every section of the dashboard.
pub fn dashboard(d: &Dashboard) -> String {
    let mut out = String::new();
    out.push_str(&history(d));
    out.push('\n');
    out.push_str(&summary(d));
    out.push('\n');
    out.push_str(&trend(d));
    out.push('\n');
    out.push_str(&distribution(d));
    out
}

/// The filtered history table, or a warning when it is empty.
pub fn history(d: &Dashboard) -> String {
    let mut out = heading("Riwayat Pengeluaran");
    if d.is_empty() {
        let _ = writeln!(out, "{NO_HISTORY}");
        return out;
    }
    let headers: Vec<String> = d.columns.iter().map(|h| h.to_string()).collect();
    let rows: Vec<Vec<String>> = d
        .history
        .iter()
        .map(|e| {
            d.columns
                .iter()
                .map(|h| history_cell(e, h.as_ref()))
                .collect()
        })
        .collect();
    out.push_str(&table(&headers, &rows));
    for error in &d.data_errors {
        let _ = writeln!(out, "WARNING: {error}");
    }
    out
}

fn history_cell(expense: &Expense, header: &str) -> String {
    match header {
        DATE_STR => expense
            .date()
            .map(|date| date.format("%d-%m-%Y").to_string())
            .unwrap_or_default(),
        _ => expense.get(header),
    }
}

/// The total banner and the category cards.
pub fn summary(d: &Dashboard) -> String {
    let mut out = heading("Total Pengeluaran");
    let _ = writeln!(out, "{}", d.total);
    out.push('\n');
    for (category, amount) in d.by_category.known() {
        let _ = writeln!(out, "{:<14}{amount}", category.label());
    }
    for (category, amount) in d.by_category.unknown() {
        let _ = writeln!(out, "{:<14}{amount}", category.label());
    }
    out
}

/// The trend chart data: one point per day with the y-axis range, then the daily totals table.
pub fn trend(d: &Dashboard) -> String {
    let mut out = heading("Grafik Trend Pengeluaran");
    let bounds = match d.trend_bounds {
        Some(bounds) if !d.daily.is_empty() => bounds,
        _ => {
            let _ = writeln!(out, "{NO_TREND}");
            return out;
        }
    };
    let max = d.daily.iter().map(|p| p.total).max().unwrap_or_default();
    for point in &d.daily {
        let _ = writeln!(
            out,
            "{}  {:<width$}  {}",
            point.date.format("%d-%b"),
            bar(point.total.to_f64(), max.to_f64()),
            point.total,
            width = BAR_WIDTH
        );
    }
    let _ = writeln!(out, "Y axis: {} - {}", bounds.lower, bounds.upper);
    let _ = writeln!(out, "Filter Tanggal: {}", d.range);
    out.push('\n');
    out.push_str(&heading("Total Pengeluaran Harian"));
    let rows: Vec<Vec<String>> = d
        .daily
        .iter()
        .map(|p| vec![p.date.format("%d-%b").to_string(), p.total.to_string()])
        .collect();
    out.push_str(&table(&[DATE_STR.to_string(), AMOUNT_STR.to_string()], &rows));
    out
}

/// The pie chart slices and the top 5 table.
pub fn distribution(d: &Dashboard) -> String {
    let mut out = heading("Distribusi Pengeluaran");
    if d.is_empty() {
        let _ = writeln!(out, "{NO_PIE}");
        return out;
    }
    for share in &d.shares {
        let _ = writeln!(
            out,
            "{:<14}{:>6}%  {}",
            share.category.label(),
            share.percent.to_string(),
            share.total
        );
    }
    out.push('\n');
    out.push_str(&heading("Top 5 Pengeluaran Terbesar"));
    let headers = [
        DATE_STR.to_string(),
        DESCRIPTION_STR.to_string(),
        AMOUNT_STR.to_string(),
    ];
    let rows: Vec<Vec<String>> = d
        .top
        .iter()
        .map(|e| {
            vec![
                history_cell(e, DATE_STR),
                e.description().to_string(),
                e.amount()
                    .amount()
                    .map(|a| a.to_string())
                    .unwrap_or_default(),
            ]
        })
        .collect();
    out.push_str(&table(&headers, &rows));
    out
}

fn heading(title: &str) -> String {
    format!("{title}\n{}\n", "=".repeat(title.chars().count()))
}

const BAR_WIDTH: usize = 30;

fn bar(value: f64, max: f64) -> String {
    if max <= 0.0 {
        return String::new();
    }
    let len = ((value / max) * BAR_WIDTH as f64).round() as usize;
    "#".repeat(len.clamp(1, BAR_WIDTH))
}

/// Formats rows as a markdown table with padded columns.
fn table(headers: &[String], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (ix, cell) in row.iter().enumerate() {
            if let Some(width) = widths.get_mut(ix) {
                *width = (*width).max(cell.chars().count());
            }
        }
    }

    let line = |cells: &[String]| -> String {
        let padded: Vec<String> = widths
            .iter()
            .enumerate()
            .map(|(ix, width)| {
                let cell = cells.get(ix).map(String::as_str).unwrap_or_default();
                format!("{cell:<width$}")
            })
            .collect();
        format!("| {} |\n", padded.join(" | "))
    };

    let mut out = line(headers);
    let separators: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push_str(&line(&separators));
    for row in rows {
        out.push_str(&line(row));
    }
    out
}
