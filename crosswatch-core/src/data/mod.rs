//! Price series loading and alert export.
//!
//! Input CSV has a header row with at least `date,open,high,low,close,volume`
//! (extra columns such as `adj_close` are ignored). Dates are `YYYY-MM-DD`.

use std::fs::File;
use std::io;
use std::path::Path;
use thiserror::Error;

use crate::domain::{validate_series, Alert, PriceBar, SeriesError};

#[derive(Debug, Error)]
pub enum DataError {
    #[error("open {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("line {line}: bar for {date} fails OHLC sanity checks")]
    InvalidBar { line: usize, date: chrono::NaiveDate },

    #[error(transparent)]
    Series(#[from] SeriesError),
}

/// Load and validate a daily price series from a CSV file.
pub fn load_csv(path: &Path) -> Result<Vec<PriceBar>, DataError> {
    let file = File::open(path).map_err(|source| DataError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let bars = read_csv(file)?;
    tracing::debug!(path = %path.display(), bars = bars.len(), "loaded price series");
    Ok(bars)
}

/// Parse a price series from any CSV source.
///
/// Every bar must pass `PriceBar::is_sane` and the series must be strictly
/// chronological.
pub fn read_csv<R: io::Read>(reader: R) -> Result<Vec<PriceBar>, DataError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut bars = Vec::new();
    for (index, record) in rdr.deserialize::<PriceBar>().enumerate() {
        let bar = record?;
        if !bar.is_sane() {
            return Err(DataError::InvalidBar {
                // +1 for the header, +1 for 1-based lines
                line: index + 2,
                date: bar.date,
            });
        }
        bars.push(bar);
    }
    validate_series(&bars)?;
    Ok(bars)
}

/// Render alerts as CSV, one row per alert.
pub fn export_alerts_csv(alerts: &[Alert]) -> Result<String, DataError> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "signal_type",
        "symbol",
        "date",
        "short_ma",
        "long_ma",
        "rsi",
        "macd",
        "macd_signal",
        "band",
        "score",
        "reasoning",
    ])?;
    for alert in alerts {
        wtr.write_record([
            alert.signal_type.to_string(),
            alert.symbol.clone(),
            alert.date.to_string(),
            format!("{:.4}", alert.short_ma),
            format!("{:.4}", alert.long_ma),
            format!("{:.4}", alert.rsi),
            format!("{:.4}", alert.macd),
            format!("{:.4}", alert.macd_signal),
            format!("{:.4}", alert.band),
            format!("{:.2}", alert.score),
            alert.reasoning.clone(),
        ])?;
    }
    let data = wtr
        .into_inner()
        .map_err(|e| DataError::Csv(csv::Error::from(e.into_error())))?;
    Ok(String::from_utf8_lossy(&data).into_owned())
}
