//! Line-oriented parser for the flat replay event log.
//!
//! A malformed line never aborts the parse: it is logged with its line number
//! and raw content, recorded in the skip report, and processing continues.

use std::str::FromStr;

use csv::ReaderBuilder;

use crate::data::{ReplayDataPoint, Vec2};

/// Field count every data line must carry.
pub const REPLAY_FIELD_COUNT: usize = 11;

/// One line that was dropped during parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedLine {
    /// 1-based line number in the input (the header is line 1).
    pub line: usize,
    pub reason: String,
    pub raw: String,
}

/// Result of parsing a replay log: points in file order plus the skip report.
#[derive(Debug, Default)]
pub struct CsvReport {
    pub points: Vec<ReplayDataPoint>,
    pub skipped: Vec<SkippedLine>,
}

impl CsvReport {
    /// Apparent unit of the recorded timestamps, judged from the delta
    /// between the first two points. Diagnostic only.
    pub fn timestamp_unit(&self) -> Option<TimestampUnit> {
        let first = self.points.first()?;
        let second = self.points.get(1)?;
        Some(classify_timestamp_delta(second.timestamp - first.timestamp))
    }
}

/// Coarse classification of the timestamp unit a log appears to use.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TimestampUnit {
    Microseconds,
    Milliseconds,
    SecondsOrCustom,
}

/// Classify a first-to-second timestamp delta. Thresholds assume adjacent
/// samples are fractions of a second to a few seconds apart.
pub fn classify_timestamp_delta(delta: i64) -> TimestampUnit {
    match delta.abs() {
        d if d > 100_000 => TimestampUnit::Microseconds,
        d if d > 100 => TimestampUnit::Milliseconds,
        _ => TimestampUnit::SecondsOrCustom,
    }
}

/// Parse a replay log: one header line (discarded unread) followed by
/// comma-separated data lines of at least [`REPLAY_FIELD_COUNT`] fields.
pub fn parse_replay_csv(text: &str) -> CsvReport {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut report = CsvReport::default();
    for (index, record) in reader.records().enumerate() {
        // Line 1 is the header, so the first data record is line 2.
        let line = index + 2;
        let record = match record {
            Ok(record) => record,
            Err(err) => {
                let reason = err.to_string();
                log::warn!("skipping replay log line {line}: {reason}");
                report.skipped.push(SkippedLine {
                    line,
                    reason,
                    raw: String::new(),
                });
                continue;
            }
        };
        match point_from_record(&record) {
            Ok(point) => report.points.push(point),
            Err(reason) => {
                let raw = record.iter().collect::<Vec<_>>().join(",");
                log::warn!("skipping replay log line {line}: {reason} (raw: {raw})");
                report.skipped.push(SkippedLine { line, reason, raw });
            }
        }
    }

    if let Some(unit) = report.timestamp_unit() {
        log::info!(
            "replay log loaded: {} points, {} skipped, timestamps look like {unit:?}",
            report.points.len(),
            report.skipped.len()
        );
    } else {
        log::debug!(
            "replay log loaded: {} points, {} skipped",
            report.points.len(),
            report.skipped.len()
        );
    }
    report
}

fn point_from_record(record: &csv::StringRecord) -> Result<ReplayDataPoint, String> {
    if record.len() < REPLAY_FIELD_COUNT {
        return Err(format!(
            "expected {REPLAY_FIELD_COUNT} fields, got {}",
            record.len()
        ));
    }
    Ok(ReplayDataPoint {
        id_prefix: record[0].to_string(),
        id: record[1].to_string(),
        position: Vec2 {
            x: parse_float(&record[2], "x")?,
            y: parse_float(&record[3], "y")?,
        },
        velocity: parse_float(&record[4], "velocityScalar")?,
        orientation: parse_float(&record[5], "orientation")?,
        timestamp: parse_int(&record[6], "timestamp")?,
        workstation: parse_int(&record[7], "workstation")?,
        trajectory_id: record[8].to_string(),
        start: parse_float(&record[9], "start")?,
        goal: parse_float(&record[10], "goal")?,
    })
}

/// Invariant float parse with one retry for tokens that carry stray
/// whitespace or scientific notation.
fn parse_float(raw: &str, field: &str) -> Result<f32, String> {
    if let Ok(value) = raw.parse::<f32>() {
        return Ok(value);
    }
    let trimmed = raw.trim();
    if trimmed != raw || trimmed.contains(['e', 'E']) {
        if let Ok(value) = trimmed.parse::<f32>() {
            return Ok(value);
        }
    }
    Err(format!("invalid {field} value {raw:?}"))
}

fn parse_int<T: FromStr>(raw: &str, field: &str) -> Result<T, String> {
    raw.trim()
        .parse::<T>()
        .map_err(|_| format!("invalid {field} value {raw:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delta_classification_bands() {
        assert_eq!(
            classify_timestamp_delta(2_000_000),
            TimestampUnit::Microseconds
        );
        assert_eq!(classify_timestamp_delta(250), TimestampUnit::Milliseconds);
        assert_eq!(classify_timestamp_delta(2), TimestampUnit::SecondsOrCustom);
        assert_eq!(
            classify_timestamp_delta(-2_000_000),
            TimestampUnit::Microseconds
        );
    }

    #[test]
    fn float_fallback_accepts_scientific_and_padding() {
        assert_eq!(parse_float("1.5e2", "x"), Ok(150.0));
        assert_eq!(parse_float(" 2.5", "x"), Ok(2.5));
        assert!(parse_float("abc", "x").is_err());
    }
}
