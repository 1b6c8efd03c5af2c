//! CSV rendering and console summary for fetched datasets.

use std::path::Path;

use histdata::{Dataset, NormalizedRequest, OhlcvBar, Symbol};

/// Number of leading rows echoed in the console summary.
const SUMMARY_ROWS: usize = 5;

/// File name for a rendered dataset, derived from the normalized request so
/// repeated runs overwrite the same file.
pub(crate) fn csv_file_name(request: &NormalizedRequest) -> String {
    format!("{}.csv", request.cache_key())
}

/// Writes a dataset as CSV.
pub(crate) fn write_csv(dataset: &Dataset, path: &Path) -> csv::Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record([
        "timestamp",
        "open",
        "high",
        "low",
        "close",
        "adjusted_close",
        "volume",
    ])?;
    for bar in dataset.iter() {
        writer.write_record(&[
            format_timestamp(bar),
            bar.open.to_string(),
            bar.high.to_string(),
            bar.low.to_string(),
            bar.close.to_string(),
            bar.adjusted_close.map(|v| v.to_string()).unwrap_or_default(),
            bar.volume.to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

/// Prints the first rows, row count, and date range of a dataset.
pub(crate) fn print_summary(symbol: &Symbol, dataset: &Dataset) {
    println!("\nData for {symbol}:");
    println!(
        "{:>20} {:>10} {:>10} {:>10} {:>10} {:>12}",
        "timestamp", "open", "high", "low", "close", "volume"
    );
    for bar in dataset.iter().take(SUMMARY_ROWS) {
        println!(
            "{:>20} {:>10.2} {:>10.2} {:>10.2} {:>10.2} {:>12.0}",
            format_timestamp(bar),
            bar.open,
            bar.high,
            bar.low,
            bar.close,
            bar.volume
        );
    }
    if dataset.len() > SUMMARY_ROWS {
        println!("{:>20}", "...");
    }
    println!("\nRows: {}", dataset.len());
    if let Some((first, last)) = dataset.time_range() {
        println!("Date range: {} to {}", first.date_naive(), last.date_naive());
    }
}

/// Daily-and-coarser bars sit at midnight UTC and render as plain dates;
/// intraday bars keep the full timestamp.
fn format_timestamp(bar: &OhlcvBar) -> String {
    if bar.timestamp.time() == chrono::NaiveTime::MIN {
        bar.timestamp.date_naive().to_string()
    } else {
        bar.timestamp.to_rfc3339()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};
    use histdata::{Interval, RequestSpec};
    use tempfile::TempDir;

    fn sample_dataset() -> Dataset {
        let bars = (1..=3)
            .map(|day| {
                let timestamp = Utc.with_ymd_and_hms(2023, 1, day, 0, 0, 0).unwrap();
                OhlcvBar::new(timestamp, 100.0, 105.0, 99.0, 104.0, 1_000_000.0)
                    .with_adjusted_close(103.5)
            })
            .collect();
        Dataset::from_bars(bars)
    }

    #[test]
    fn file_name_includes_all_request_fields() {
        let request = RequestSpec::with_range(
            "AAPL",
            Interval::Daily,
            NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2023, 12, 31).unwrap(),
        )
        .unwrap()
        .normalized_at(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());

        assert_eq!(csv_file_name(&request), "AAPL_1d_2023-01-01_2023-12-31.csv");
    }

    #[test]
    fn csv_has_header_and_one_row_per_bar() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.csv");

        write_csv(&sample_dataset(), &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(
            lines[0],
            "timestamp,open,high,low,close,adjusted_close,volume"
        );
        assert!(lines[1].starts_with("2023-01-01,100,105,99,104,103.5,1000000"));
    }

    #[test]
    fn midnight_bars_render_as_dates() {
        let midnight = OhlcvBar::new(
            Utc.with_ymd_and_hms(2023, 1, 2, 0, 0, 0).unwrap(),
            1.0,
            2.0,
            0.5,
            1.5,
            10.0,
        );
        let intraday = OhlcvBar::new(
            Utc.with_ymd_and_hms(2023, 1, 2, 14, 30, 0).unwrap(),
            1.0,
            2.0,
            0.5,
            1.5,
            10.0,
        );
        assert_eq!(format_timestamp(&midnight), "2023-01-02");
        assert!(format_timestamp(&intraday).contains("14:30"));
    }
}
