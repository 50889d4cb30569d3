//! Market data access port trait.
//!
//! Fetching, caching and provider specifics live behind this trait; the
//! analytics only ever see the bars it returns.

use crate::domain::error::AnalyzerError;
use crate::domain::ohlcv::OhlcvBar;
use chrono::NaiveDate;

pub trait DataPort {
    /// Bars for `code` between `start_date` and `end_date` inclusive, ascending by date.
    fn fetch_ohlcv(
        &self,
        code: &str,
        exchange: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<OhlcvBar>, AnalyzerError>;

    fn list_symbols(&self, exchange: &str) -> Result<Vec<String>, AnalyzerError>;

    /// (first date, last date, bar count), `None` when the code has no bars.
    fn get_data_range(
        &self,
        code: &str,
        exchange: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, AnalyzerError>;
}
