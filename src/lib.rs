mod aggregate;
mod api;
pub mod args;
mod cache;
pub mod commands;
mod config;
mod dashboard;
mod error;
pub mod model;
mod range;
mod render;
mod utils;


pub use aggregate::{CategoryShare, CategoryTotals, DailyTotal, DataError, TrendBounds};
pub use api::{Mode, NewExpense, TestSheet, TestSheetState, TEST_MODE_ENV};
pub use cache::Cache;
pub use config::Config;
pub use dashboard::Dashboard;
pub use error::Error;
pub use error::Result;
pub use range::{DateRange, DateRangeError};
