//! Market data handed to the inference client.
//!
//! The dashboard loads a price history through a [`DataLoader`], condenses it
//! with [`summarize`], and asks the model for commentary through
//! [`commentary_request`]. No provider ships with this crate.

use std::fmt;

use async_trait::async_trait;
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::types::generate::GenerateRequest;
use crate::{Error, Result};

/// Default number of leading and trailing rows in a digest.
pub const DEFAULT_SNAPSHOT_ROWS: usize = 5;

/// Length of the dashboard's default date range, in days.
pub const DEFAULT_RANGE_DAYS: u32 = 180;

/// One trading day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

/// Daily bars of one ticker, oldest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceHistory {
    pub ticker: String,
    pub bars: Vec<PriceBar>,
}

impl PriceHistory {
    /// Creates a history, sorting the bars by date.
    pub fn new(ticker: impl Into<String>, mut bars: Vec<PriceBar>) -> Self {
        bars.sort_by_key(|bar| bar.date);
        Self {
            ticker: ticker.into(),
            bars,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }
}

/// An inclusive range of calendar dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// # Errors
    ///
    /// Returns an [`Error::Client`] when `start` is after `end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(Error::Client(format!(
                "start date {} is after end date {}",
                start, end
            )));
        }
        Ok(Self { start, end })
    }

    /// The `days` days ending at `end`.
    pub fn trailing(end: NaiveDate, days: u32) -> Self {
        Self {
            start: end - Duration::days(i64::from(days)),
            end,
        }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }
}

/// Source of historical prices.
///
/// `Ok(None)` means the provider has no data for the ticker and range,
/// which is not an error.
#[async_trait]
pub trait DataLoader: Send + Sync {
    async fn load(&self, ticker: &str, range: DateRange) -> Result<Option<PriceHistory>>;
}

/// Text digest of a history: the first and last `rows` bars followed by
/// summary statistics. Rendered through [`Display`](fmt::Display).
#[derive(Debug, Clone, Copy)]
pub struct Snapshot<'a> {
    history: &'a PriceHistory,
    rows: usize,
}

impl<'a> Snapshot<'a> {
    pub fn new(history: &'a PriceHistory, rows: usize) -> Self {
        Self { history, rows }
    }
}

impl fmt::Display for Snapshot<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bars = &self.history.bars;
        let rows = self.rows;
        writeln!(f, "Ticker: {}", self.history.ticker)?;

        let (Some(first), Some(last)) = (bars.first(), bars.last()) else {
            return writeln!(f, "No data available for the selected range.");
        };

        writeln!(
            f,
            "Period: {} to {} ({} trading days)",
            first.date,
            last.date,
            bars.len()
        )?;
        writeln!(f)?;

        if bars.len() <= rows.saturating_mul(2) {
            writeln!(f, "All rows:")?;
            write_table(f, bars)?;
        } else {
            writeln!(f, "First {} rows:", rows)?;
            write_table(f, &bars[..rows])?;
            writeln!(f, "Last {} rows:", rows)?;
            write_table(f, &bars[bars.len() - rows..])?;
        }

        let count = bars.len() as f64;
        let change = last.close - first.close;
        let change_pct = if first.close != 0.0 {
            change / first.close * 100.0
        } else {
            0.0
        };
        let min_close = bars.iter().map(|b| b.close).fold(f64::INFINITY, f64::min);
        let max_close = bars.iter().map(|b| b.close).fold(f64::NEG_INFINITY, f64::max);
        let mean_close = bars.iter().map(|b| b.close).sum::<f64>() / count;
        let total_volume: u64 = bars.iter().map(|b| b.volume).sum();
        let mean_volume = total_volume as f64 / count;

        writeln!(f, "Summary:")?;
        writeln!(f, "  first close: {:.2}", first.close)?;
        writeln!(f, "  last close: {:.2}", last.close)?;
        writeln!(f, "  change: {:+.2} ({:+.2}%)", change, change_pct)?;
        writeln!(f, "  min close: {:.2}", min_close)?;
        writeln!(f, "  max close: {:.2}", max_close)?;
        writeln!(f, "  mean close: {:.2}", mean_close)?;
        writeln!(f, "  mean volume: {:.0}", mean_volume)?;
        writeln!(f, "  total volume: {}", total_volume)
    }
}

fn write_table(f: &mut fmt::Formatter<'_>, bars: &[PriceBar]) -> fmt::Result {
    writeln!(
        f,
        "{:<10} {:>10} {:>10} {:>10} {:>10} {:>12}",
        "date", "open", "high", "low", "close", "volume"
    )?;
    for bar in bars {
        writeln!(
            f,
            "{:<10} {:>10.2} {:>10.2} {:>10.2} {:>10.2} {:>12}",
            bar.date.to_string(),
            bar.open,
            bar.high,
            bar.low,
            bar.close,
            bar.volume
        )?;
    }
    Ok(())
}

/// Condenses a history into a short text digest for a prompt.
pub fn summarize(history: &PriceHistory, rows: usize) -> String {
    Snapshot::new(history, rows).to_string()
}

/// Builds a streaming request asking the model to comment on `history`.
pub fn commentary_request(history: &PriceHistory, rows: usize) -> GenerateRequest {
    let prompt = format!(
        "You are a financial analyst. Based on the following snapshot of daily \
         price and volume data, describe the trend, notable moves and volume \
         patterns in a few short paragraphs. Do not give investment advice.\n\n{}",
        summarize(history, rows)
    );
    GenerateRequest::new(prompt).stream(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn bar(day: u32, close: f64, volume: u64) -> PriceBar {
        PriceBar {
            date: date(2024, 3, day),
            open: close - 1.0,
            high: close + 1.0,
            low: close - 2.0,
            close,
            volume,
        }
    }

    #[test]
    fn date_range_rejects_inverted_bounds() {
        assert!(DateRange::new(date(2024, 3, 2), date(2024, 3, 1)).is_err());
        let range = DateRange::new(date(2024, 3, 1), date(2024, 3, 1)).unwrap();
        assert_eq!(range.start(), range.end());
    }

    #[test]
    fn trailing_range_counts_back_from_end() {
        let range = DateRange::trailing(date(2024, 7, 1), DEFAULT_RANGE_DAYS);
        assert_eq!(range.start(), date(2024, 1, 3));
        assert_eq!(range.end(), date(2024, 7, 1));
    }

    #[test]
    fn history_is_sorted_by_date() {
        let history = PriceHistory::new("AAPL", vec![bar(3, 3.0, 1), bar(1, 1.0, 1), bar(2, 2.0, 1)]);
        let days: Vec<_> = history.bars.iter().map(|b| b.close).collect();
        assert_eq!(days, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn empty_history_says_no_data() {
        let digest = summarize(&PriceHistory::new("TSLA", vec![]), DEFAULT_SNAPSHOT_ROWS);
        assert!(digest.contains("Ticker: TSLA"));
        assert!(digest.contains("No data available"));
    }

    #[test]
    fn short_history_lists_every_row_once() {
        let history = PriceHistory::new("MSFT", vec![bar(1, 100.0, 10), bar(2, 110.0, 30)]);
        let digest = summarize(&history, 5);
        assert!(digest.contains("All rows:"));
        assert_eq!(digest.matches("2024-03-01").count(), 2); // period line + row
        assert!(digest.contains("change: +10.00 (+10.00%)"));
        assert!(digest.contains("mean close: 105.00"));
        assert!(digest.contains("mean volume: 20"));
        assert!(digest.contains("total volume: 40"));
    }

    #[test]
    fn long_history_shows_head_and_tail() {
        let bars = (1..=20).map(|d| bar(d, f64::from(d), 100)).collect();
        let history = PriceHistory::new("NVDA", bars);
        let digest = summarize(&history, 2);

        assert!(digest.contains("First 2 rows:"));
        assert!(digest.contains("Last 2 rows:"));
        assert!(digest.contains("2024-03-02"));
        assert!(digest.contains("2024-03-19"));
        assert!(!digest.contains("2024-03-10"));
        assert!(digest.contains("min close: 1.00"));
        assert!(digest.contains("max close: 20.00"));
        assert!(digest.contains("(20 trading days)"));
    }

    #[test]
    fn huge_row_count_lists_every_row() {
        let history = PriceHistory::new("AMZN", vec![bar(1, 10.0, 1), bar(2, 11.0, 1)]);
        let digest = summarize(&history, usize::MAX);
        assert!(digest.contains("All rows:"));
        assert!(digest.contains("2024-03-02"));
    }

    #[test]
    fn commentary_request_streams_the_digest() {
        let history = PriceHistory::new("SPY", vec![bar(1, 500.0, 1_000)]);
        let request = commentary_request(&history, DEFAULT_SNAPSHOT_ROWS);
        assert!(request.stream);
        assert!(request.model.is_none());
        assert!(request.prompt.contains("Ticker: SPY"));
        assert!(request.prompt.ends_with(&summarize(&history, DEFAULT_SNAPSHOT_ROWS)));
    }
}
