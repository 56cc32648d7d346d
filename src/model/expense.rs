use crate::model::mapping::{Header, Mapping};
use crate::model::{AmountCell, Category, Source};
use crate::Result;
use anyhow::{bail, Context};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Cursor;

pub(crate) const DATE_STR: &str = "Tanggal";
pub(crate) const DESCRIPTION_STR: &str = "Nama Pengeluaran";
pub(crate) const CATEGORY_STR: &str = "Kategori";
pub(crate) const AMOUNT_STR: &str = "Total Pengeluaran";
pub(crate) const SOURCE_STR: &str = "Source";

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];
const DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

/// Rows exactly as they come out of the CSV feed: a header row and the data rows.
#[derive(Default, Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct RawTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    /// Parses CSV text. The first record is the header row. Rows may be shorter or longer than
    /// the header row.
    pub fn from_csv(csv_data: &str) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(Cursor::new(csv_data.as_bytes()));

        let mut records = rdr.records();
        let headers = match records.next() {
            Some(header_row) => header_row
                .context("Unable to read the CSV header row")?
                .iter()
                .map(str::to_string)
                .collect(),
            None => bail!("The CSV data is empty, there is no header row"),
        };

        let mut rows = Vec::new();
        for (ix, record) in records.enumerate() {
            let record = record.with_context(|| format!("Unable to read CSV row {}", ix + 2))?;
            rows.push(record.iter().map(str::to_string).collect());
        }
        Ok(Self { headers, rows })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }
}

/// The normalized expense table: cleaned headers and one typed `Expense` per data row.
#[derive(Default, Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ExpenseTable {
    mapping: Mapping,
    data: Vec<Expense>,
}

impl ExpenseTable {
    /// Normalizes a raw table. Headers are trimmed, whitespace-collapsed and title-cased; the
    /// `Tanggal` column is parsed into dates (values that do not parse become `None`); the
    /// amount column is parsed into `AmountCell`s; unknown columns are carried in
    /// `Expense::other_fields`. Blank headers and repeats of other headers are renamed, see
    /// `Mapping::new`.
    ///
    /// # Errors
    /// - The `Tanggal` or `Total Pengeluaran` column is missing or appears more than once.
    pub fn normalize(raw: &RawTable) -> Result<Self> {
        for required in [DATE_STR, AMOUNT_STR] {
            let count = raw
                .headers()
                .iter()
                .filter(|h| Header::normalize(h).as_ref() == required)
                .count();
            match count {
                0 => bail!("The expense sheet has no '{required}' column"),
                1 => {}
                _ => bail!("The expense sheet has {count} '{required}' columns"),
            }
        }
        let mapping = Mapping::new(raw.headers());

        let data = raw
            .rows()
            .iter()
            .enumerate()
            .map(|(row, values)| Expense::from_row(row, mapping.headers(), values))
            .collect();

        Ok(Self { mapping, data })
    }

    pub fn headers(&self) -> &[Header] {
        self.mapping.headers()
    }

    pub fn data(&self) -> &[Expense] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Writes the table back out as raw rows, in the order of its headers. Dates are written as
    /// `YYYY-MM-DD` and missing dates as an empty cell.
    pub fn to_raw(&self) -> RawTable {
        let headers: Vec<String> = self.headers().iter().map(|h| h.to_string()).collect();
        let rows = self
            .data
            .iter()
            .map(|expense| {
                self.headers()
                    .iter()
                    .map(|header| expense.get(header.as_ref()))
                    .collect()
            })
            .collect();
        RawTable::new(headers, rows)
    }
}

/// A single expense row.
#[derive(Default, Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Expense {
    /// Zero-based position of the row in the sheet, below the header row.
    pub(crate) row: usize,
    pub(crate) date: Option<NaiveDate>,
    pub(crate) description: String,
    pub(crate) category: Category,
    pub(crate) amount: AmountCell,
    pub(crate) source: Source,
    /// Columns the dashboard does not know about, keyed by normalized header.
    pub(crate) other_fields: BTreeMap<String, String>,
}

impl Expense {
    pub fn new(
        row: usize,
        date: Option<NaiveDate>,
        description: impl Into<String>,
        category: Category,
        amount: impl Into<AmountCell>,
        source: Source,
    ) -> Self {
        Self {
            row,
            date,
            description: description.into(),
            category,
            amount: amount.into(),
            source,
            other_fields: BTreeMap::new(),
        }
    }

    fn from_row(row: usize, headers: &[Header], values: &[String]) -> Self {
        let mut expense = Expense {
            row,
            ..Expense::default()
        };
        for (ix, header) in headers.iter().enumerate() {
            let value = values.get(ix).map(String::as_str).unwrap_or_default();
            expense.set_with_header(header.as_ref(), value);
        }
        expense
    }

    fn set_with_header(&mut self, header: &str, value: &str) {
        match header {
            DATE_STR => self.date = parse_date(value),
            DESCRIPTION_STR => self.description = value.to_string(),
            CATEGORY_STR => self.category = value.parse().unwrap_or_default(),
            AMOUNT_STR => self.amount = AmountCell::parse(value),
            SOURCE_STR => self.source = value.parse().unwrap_or_default(),
            other => {
                let _ = self.other_fields.insert(other.to_string(), value.to_string());
            }
        }
    }

    /// The value of the cell under `header`, as raw text.
    pub fn get(&self, header: &str) -> String {
        match header {
            DATE_STR => self
                .date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            DESCRIPTION_STR => self.description.clone(),
            CATEGORY_STR => self.category.to_string(),
            AMOUNT_STR => self.amount.raw(),
            SOURCE_STR => self.source.to_string(),
            other => self.other_fields.get(other).cloned().unwrap_or_default(),
        }
    }

    pub fn row(&self) -> usize {
        self.row
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn category(&self) -> &Category {
        &self.category
    }

    pub fn amount(&self) -> &AmountCell {
        &self.amount
    }

    pub fn source(&self) -> &Source {
        &self.source
    }

    pub fn other_fields(&self) -> &BTreeMap<String, String> {
        &self.other_fields
    }
}

/// Parses a sheet date. Anything that is not a recognizable calendar date gives `None`.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .or_else(|| {
            DATE_TIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
                .map(|dt| dt.date())
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Amount;

    const CSV: &str = r##"Timestamp, tanggal ,NAMA  PENGELUARAN,kategori,Total Pengeluaran,source
1/1/2024 08:00:00,2024-01-01,Nasi padang,Makan,20000,BRI
1/1/2024 09:00:00,1/1/2024,Es teh,Jajan,5000,Suami
1/2/2024 10:00:00,not a date,Bensin,Transportasi,abc,Istri
"##;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_from_csv() {
        let raw = RawTable::from_csv(CSV).unwrap();
        assert_eq!(raw.headers().len(), 6);
        assert_eq!(raw.rows().len(), 3);
        assert_eq!(raw.rows()[0][2], "Nasi padang");
    }

    #[test]
    fn test_from_csv_empty_is_error() {
        assert!(RawTable::from_csv("").is_err());
    }

    #[test]
    fn test_from_csv_headers_only() {
        let raw = RawTable::from_csv("Tanggal,Total Pengeluaran\n").unwrap();
        let table = ExpenseTable::normalize(&raw).unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn test_normalize() {
        let raw = RawTable::from_csv(CSV).unwrap();
        let table = ExpenseTable::normalize(&raw).unwrap();
        let headers: Vec<&str> = table.headers().iter().map(|h| h.as_ref()).collect();
        assert_eq!(
            headers,
            vec![
                "Timestamp",
                "Tanggal",
                "Nama Pengeluaran",
                "Kategori",
                "Total Pengeluaran",
                "Source"
            ]
        );

        let first = &table.data()[0];
        assert_eq!(first.row(), 0);
        assert_eq!(first.date(), Some(date("2024-01-01")));
        assert_eq!(first.description(), "Nasi padang");
        assert_eq!(first.category(), &Category::Makan);
        assert_eq!(first.amount().amount(), Some(Amount::from(20000)));
        assert_eq!(first.source(), &Source::Bri);
        assert_eq!(
            first.other_fields().get("Timestamp").map(String::as_str),
            Some("1/1/2024 08:00:00")
        );

        assert_eq!(table.data()[1].date(), Some(date("2024-01-01")));

        let third = &table.data()[2];
        assert_eq!(third.date(), None);
        assert_eq!(third.amount(), &AmountCell::Invalid("abc".to_string()));
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let raw = RawTable::from_csv(CSV).unwrap();
        let once = ExpenseTable::normalize(&raw).unwrap();
        let twice = ExpenseTable::normalize(&once.to_raw()).unwrap();
        assert_eq!(once, twice);
        assert_eq!(once.to_raw(), twice.to_raw());
    }

    #[test]
    fn test_normalize_missing_date_column() {
        let raw = RawTable::from_csv("Nama Pengeluaran,Total Pengeluaran\nx,1\n").unwrap();
        let err = ExpenseTable::normalize(&raw).unwrap_err();
        assert!(err.to_string().contains("Tanggal"));
    }

    #[test]
    fn test_normalize_missing_amount_column() {
        let raw = RawTable::from_csv("Tanggal,Kategori\n2024-01-01,Makan\n").unwrap();
        assert!(ExpenseTable::normalize(&raw).is_err());
    }

    #[test]
    fn test_normalize_duplicate_headers() {
        let raw = RawTable::from_csv("Tanggal,TANGGAL,Total Pengeluaran\n").unwrap();
        assert!(ExpenseTable::normalize(&raw).is_err());
    }

    #[test]
    fn test_normalize_blank_and_repeated_headers() {
        let raw = RawTable::from_csv(
            "Tanggal,Total Pengeluaran,,,Catatan,catatan\n2024-01-01,100,,,a,b\n",
        )
        .unwrap();
        let table = ExpenseTable::normalize(&raw).unwrap();
        let headers: Vec<&str> = table.headers().iter().map(|h| h.as_ref()).collect();
        assert_eq!(
            headers,
            vec![
                "Tanggal",
                "Total Pengeluaran",
                "Unnamed: 2",
                "Unnamed: 3",
                "Catatan",
                "Unnamed: 5"
            ]
        );
        let expense = &table.data()[0];
        assert_eq!(expense.amount().amount(), Some(Amount::from(100)));
        assert_eq!(expense.get("Catatan"), "a");
        assert_eq!(expense.get("Unnamed: 5"), "b");

        let again = ExpenseTable::normalize(&table.to_raw()).unwrap();
        assert_eq!(table, again);
    }

    #[test]
    fn test_short_rows_are_padded() {
        let raw = RawTable::from_csv("Tanggal,Total Pengeluaran,Kategori\n2024-01-05,100\n").unwrap();
        let table = ExpenseTable::normalize(&raw).unwrap();
        let expense = &table.data()[0];
        assert_eq!(expense.amount().amount(), Some(Amount::from(100)));
        assert_eq!(expense.category(), &Category::default());
    }

    #[test]
    fn test_parse_date_formats() {
        let expected = Some(date("2024-03-07"));
        assert_eq!(parse_date("2024-03-07"), expected);
        assert_eq!(parse_date("2024/03/07"), expected);
        assert_eq!(parse_date("3/7/2024"), expected);
        assert_eq!(parse_date("03/07/2024 13:45:00"), expected);
        assert_eq!(parse_date("2024-03-07T13:45:00"), expected);
        assert_eq!(parse_date(" 2024-03-07 "), expected);
    }

    #[test]
    fn test_parse_date_invalid() {
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("kemarin"), None);
        assert_eq!(parse_date("2024-02-30"), None);
        assert_eq!(parse_date("13/45/2024"), None);
    }

    #[test]
    fn test_table_serde() {
        let raw = RawTable::from_csv(CSV).unwrap();
        let table = ExpenseTable::normalize(&raw).unwrap();
        let json = serde_json::to_string(&table).unwrap();
        let back: ExpenseTable = serde_json::from_str(&json).unwrap();
        assert_eq!(table, back);
    }
}
