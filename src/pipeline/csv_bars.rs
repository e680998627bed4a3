use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use orb_stats::Bar;

/// CSV row structure: `timestamp,open,high,low,close[,volume]` with RFC 3339
/// timestamps.
#[derive(Debug, Deserialize)]
struct CsvRow {
    timestamp: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    #[serde(default)]
    volume: Option<u64>,
}

/// Load bars from a CSV file, zstd-decoding `.zst` files by extension.
/// Output is sorted by timestamp.
pub fn load_bars(path: &Path) -> Result<Vec<Bar>> {
    let file = File::open(path).with_context(|| format!("Failed to open file: {:?}", path))?;

    let reader: Box<dyn Read> = if path.extension().is_some_and(|ext| ext == "zst") {
        let decoder = zstd::stream::Decoder::new(file)
            .with_context(|| format!("Failed to create zstd decoder for: {:?}", path))?;
        Box::new(decoder)
    } else {
        Box::new(file)
    };

    let bars = read_bars(BufReader::new(reader))
        .with_context(|| format!("Failed to parse bars from: {:?}", path))?;

    tracing::debug!("Loaded {} bars from {:?}", bars.len(), path);
    Ok(bars)
}

fn read_bars<R: Read>(reader: R) -> Result<Vec<Bar>> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut bars = Vec::new();

    for result in csv_reader.deserialize() {
        let row: CsvRow = result.with_context(|| "Failed to parse CSV row")?;

        let timestamp = DateTime::parse_from_rfc3339(&row.timestamp)
            .with_context(|| format!("Failed to parse timestamp: {}", row.timestamp))?
            .with_timezone(&Utc);

        bars.push(Bar {
            timestamp,
            open: row.open,
            high: row.high,
            low: row.low,
            close: row.close,
            volume: row.volume.unwrap_or(0),
        });
    }

    bars.sort_by_key(|b| b.timestamp);
    Ok(bars)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_bars_with_volume() {
        let csv = "timestamp,open,high,low,close,volume\n\
                   2025-03-10T14:30:00Z,1.10,1.12,1.09,1.11,150\n\
                   2025-03-10T14:31:00Z,1.11,1.13,1.10,1.12,200\n";
        let bars = read_bars(csv.as_bytes()).unwrap();
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].open, 1.10);
        assert_eq!(bars[0].volume, 150);
        assert!(bars[0].timestamp < bars[1].timestamp);
    }

    #[test]
    fn test_read_bars_without_volume() {
        let csv = "timestamp,open,high,low,close\n\
                   2025-03-10T14:30:00Z,1.10,1.12,1.09,1.11\n";
        let bars = read_bars(csv.as_bytes()).unwrap();
        assert_eq!(bars[0].volume, 0);
    }

    #[test]
    fn test_read_bars_sorts_by_timestamp() {
        let csv = "timestamp,open,high,low,close\n\
                   2025-03-10T14:31:00Z,1.11,1.13,1.10,1.12\n\
                   2025-03-10T14:30:00Z,1.10,1.12,1.09,1.11\n";
        let bars = read_bars(csv.as_bytes()).unwrap();
        assert_eq!(bars[0].open, 1.10);
    }

    #[test]
    fn test_read_bars_bad_timestamp() {
        let csv = "timestamp,open,high,low,close\nnot-a-time,1.1,1.2,1.0,1.1\n";
        assert!(read_bars(csv.as_bytes()).is_err());
    }
}
