use crate::error::Result;
use crate::schema::stock::series::PriceSeries;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::io;
use std::path::Path;
use tracing::debug;

/// One CSV line: the bar, then its derived columns. Undefined values are empty cells.
///
/// ```text
/// date,open,high,low,close,volume,daily_return_pct,ma20,ma50
/// 2024-01-02,187.15,188.44,183.89,185.64,82488700,,,
/// 2024-01-03,184.22,185.88,183.43,184.25,58414500,-0.7487610428786911,,
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CsvRow {
    pub date: NaiveDate,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: f64,
    pub volume: Option<u64>,
    pub daily_return_pct: Option<f64>,
    pub ma20: Option<f64>,
    pub ma50: Option<f64>,
}

pub fn rows(series: &PriceSeries) -> Vec<CsvRow> {
    series
        .rows()
        .map(|row| CsvRow {
            date: row.bar.date,
            open: row.bar.open,
            high: row.bar.high,
            low: row.bar.low,
            close: row.bar.close,
            volume: row.bar.volume,
            daily_return_pct: row.daily_return_pct,
            ma20: row.ma20,
            ma50: row.ma50,
        })
        .collect()
}

/// Serialize `series` as UTF-8 CSV with a header row.
pub fn write_csv<W: io::Write>(series: &PriceSeries, writer: W) -> Result<()> {
    let mut writer = csv::Writer::from_writer(writer);
    for row in rows(series) {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn to_csv_bytes(series: &PriceSeries) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    write_csv(series, &mut buffer)?;
    Ok(buffer)
}

/// Parse a file written by [`write_csv`].
pub fn read_csv<R: io::Read>(reader: R) -> Result<Vec<CsvRow>> {
    let mut reader = csv::Reader::from_reader(reader);
    let rows = reader.deserialize().collect::<std::result::Result<Vec<CsvRow>, _>>()?;
    Ok(rows)
}

pub async fn save_csv(series: &PriceSeries, path: &Path) -> Result<()> {
    let bytes = to_csv_bytes(series)?;
    stockdash_util::write_file(path, &bytes).await?;
    debug!("[{}] {} rows exported to {}", series.symbol, series.len(), path.display());
    Ok(())
}

/// `"<label>_data.csv"`, keeping only characters that are safe in a file name.
pub fn file_name(label: &str) -> String {
    let mut stem: String = label
        .trim()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    if stem.trim_matches('_').is_empty() {
        stem = "stock".to_string();
    }
    format!("{stem}_data.csv")
}
