//! Precipitation history store.
//!
//! Append-only, date-ordered log of daily precipitation records for the
//! site, plus the line codec for the remote history log (a plain delimited
//! text resource, one row per day).
//!
//! The store is pure and synchronous: appends mutate only the local series,
//! and the remote log is written by the telemetry publisher, not here.

use chrono::NaiveDate;

use crate::model::{HistoryError, PrecipKind, PrecipitationRecord};

/// Number of trailing actual days in the dual-window table.
pub const PAST_WINDOW_DAYS: usize = 7;

/// Maximum number of forward forecast days in the dual-window table.
pub const FORECAST_WINDOW_DAYS: usize = 7;

// ---------------------------------------------------------------------------
// History series
// ---------------------------------------------------------------------------

/// Ordered sequence of daily precipitation records.
///
/// Invariants: dates strictly increasing, no duplicates, append-only
/// (no in-place edits). New records are appended by the telemetry
/// publisher after each cycle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistorySeries {
    records: Vec<PrecipitationRecord>,
}

impl HistorySeries {
    pub fn new() -> Self {
        HistorySeries { records: Vec::new() }
    }

    /// Builds a series from unordered records, rejecting duplicate dates.
    pub fn from_records(
        records: impl IntoIterator<Item = PrecipitationRecord>,
    ) -> Result<Self, HistoryError> {
        let mut series = HistorySeries::new();
        for record in records {
            series.append(record)?;
        }
        Ok(series)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[PrecipitationRecord] {
        &self.records
    }

    /// The most recent record's date, if any.
    pub fn latest_date(&self) -> Option<NaiveDate> {
        self.records.last().map(|r| r.date)
    }

    /// Inserts a record, preserving ascending date order.
    ///
    /// Fails with `DuplicateDate` if a record for that calendar day already
    /// exists — history is append-only and never overwritten.
    pub fn append(&mut self, record: PrecipitationRecord) -> Result<(), HistoryError> {
        match self.records.binary_search_by_key(&record.date, |r| r.date) {
            Ok(_) => Err(HistoryError::DuplicateDate(record.date)),
            Err(pos) => {
                self.records.insert(pos, record);
                Ok(())
            }
        }
    }

    /// The last `n` records by date; fewer if the history is shorter.
    /// Never fails — an empty history yields an empty slice.
    pub fn trailing_window(&self, n: usize) -> &[PrecipitationRecord] {
        let start = self.records.len().saturating_sub(n);
        &self.records[start..]
    }

    /// Builds the 14-day dual-window table: the last 7 actual records
    /// followed by up to 7 forecast records.
    ///
    /// If fewer than 7 actuals exist, only the available ones appear — no
    /// padding. Forecast entries dated on or before the newest actual are
    /// skipped so no calendar day appears twice across the boundary.
    ///
    /// When the forecast provider is down, the caller passes the synthetic
    /// fallback series instead; that substitution happens upstream, not here.
    pub fn merge_dual_window(&self, forecast: &[PrecipitationRecord]) -> Vec<PrecipTableRow> {
        let mut rows: Vec<PrecipTableRow> = self
            .trailing_window(PAST_WINDOW_DAYS)
            .iter()
            .map(PrecipTableRow::from_record)
            .collect();

        let boundary = self.latest_date();
        rows.extend(
            forecast
                .iter()
                .filter(|r| boundary.is_none_or(|last| r.date > last))
                .take(FORECAST_WINDOW_DAYS)
                .map(PrecipTableRow::from_record),
        );
        rows
    }
}

/// One row of the dual-window precipitation table handed to the
/// presentation layer.
#[derive(Debug, Clone, PartialEq)]
pub struct PrecipTableRow {
    pub date: NaiveDate,
    pub amount_in: f64,
    pub kind: PrecipKind,
    pub probability_pct: Option<u8>,
}

impl PrecipTableRow {
    fn from_record(record: &PrecipitationRecord) -> Self {
        PrecipTableRow {
            date: record.date,
            amount_in: record.amount_in,
            kind: record.kind,
            probability_pct: record.probability_pct,
        }
    }

    /// Probability column as rendered: "40%" for forecast rows, "-" for
    /// actuals.
    pub fn probability_label(&self) -> String {
        match self.probability_pct {
            Some(pct) => format!("{}%", pct),
            None => "-".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// History log codec
// ---------------------------------------------------------------------------

/// Column header of the remote history log. The two trailing columns are
/// reserved for future use: ignored on parse, written as zeros on append.
pub const HISTORY_HEADER: &str =
    "date,forecast_prob,precip_actual,sb3_capacity_pct,max_gust,reserved1,reserved2";

/// One parsed row of the remote history log.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryRow {
    pub date: NaiveDate,
    pub forecast_prob: u8,
    pub precip_actual: f64,
    pub sb3_capacity_pct: f64,
    pub max_gust: u32,
}

impl HistoryRow {
    /// Formats the row as one log line, reserved columns zeroed.
    pub fn to_line(&self) -> String {
        format!(
            "{},{},{},{},{},0,0",
            self.date.format("%Y-%m-%d"),
            self.forecast_prob,
            self.precip_actual,
            self.sb3_capacity_pct,
            self.max_gust,
        )
    }
}

/// Parses the full text of the history log.
///
/// The first line is the column header and is skipped, as are blank lines.
/// A malformed data row is an integrity error, not something to silently
/// drop — the log is the source of truth for the API calculation.
pub fn parse_history_log(text: &str) -> Result<Vec<HistoryRow>, HistoryError> {
    let mut rows = Vec::new();

    for (i, line) in text.lines().enumerate() {
        if i == 0 || line.trim().is_empty() {
            continue;
        }

        let fields: Vec<&str> = line.split(',').collect();
        if fields.len() < 5 {
            return Err(HistoryError::MalformedRow {
                line: i + 1,
                reason: format!("expected at least 5 columns, got {}", fields.len()),
            });
        }

        let malformed = |reason: String| HistoryError::MalformedRow { line: i + 1, reason };

        let date = NaiveDate::parse_from_str(fields[0].trim(), "%Y-%m-%d")
            .map_err(|e| malformed(format!("bad date '{}': {}", fields[0], e)))?;
        let forecast_prob: u8 = fields[1]
            .trim()
            .parse::<f64>()
            .map(|p| p.round().clamp(0.0, 100.0) as u8)
            .map_err(|e| malformed(format!("bad forecast_prob '{}': {}", fields[1], e)))?;
        let precip_actual: f64 = fields[2]
            .trim()
            .parse()
            .map_err(|e| malformed(format!("bad precip_actual '{}': {}", fields[2], e)))?;
        let sb3_capacity_pct: f64 = fields[3]
            .trim()
            .parse()
            .map_err(|e| malformed(format!("bad sb3_capacity_pct '{}': {}", fields[3], e)))?;
        let max_gust: u32 = fields[4]
            .trim()
            .parse::<f64>()
            .map(|g| g.round().max(0.0) as u32)
            .map_err(|e| malformed(format!("bad max_gust '{}': {}", fields[4], e)))?;

        rows.push(HistoryRow {
            date,
            forecast_prob,
            precip_actual,
            sb3_capacity_pct,
            max_gust,
        });
    }

    Ok(rows)
}

/// Builds the in-memory history series (actual records only) from parsed
/// log rows.
pub fn series_from_rows(rows: &[HistoryRow]) -> Result<HistorySeries, HistoryError> {
    HistorySeries::from_records(
        rows.iter()
            .map(|row| PrecipitationRecord::actual(row.date, row.precip_actual)),
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, d).unwrap()
    }

    fn series_with_days(days: &[u32]) -> HistorySeries {
        HistorySeries::from_records(
            days.iter().map(|&d| PrecipitationRecord::actual(date(d), 0.1)),
        )
        .expect("test series should have unique dates")
    }

    // --- append -------------------------------------------------------------

    #[test]
    fn test_append_duplicate_date_is_rejected() {
        let mut series = series_with_days(&[1, 2, 3]);
        let err = series
            .append(PrecipitationRecord::actual(date(2), 0.5))
            .expect_err("duplicate date should be rejected");
        assert_eq!(err, HistoryError::DuplicateDate(date(2)));
        // the original record is untouched
        assert_eq!(series.records()[1].amount_in, 0.1);
    }

    #[test]
    fn test_append_out_of_order_preserves_ascending_dates() {
        let mut series = series_with_days(&[1, 5]);
        series
            .append(PrecipitationRecord::actual(date(3), 0.2))
            .expect("gap date should append");
        let dates: Vec<_> = series.records().iter().map(|r| r.date).collect();
        assert_eq!(dates, vec![date(1), date(3), date(5)]);
    }

    // --- trailing_window ----------------------------------------------------

    #[test]
    fn test_trailing_window_returns_most_recent_records() {
        let series = series_with_days(&[1, 2, 3, 4, 5, 6]);
        let window = series.trailing_window(3);
        assert_eq!(window.len(), 3);
        assert_eq!(window[0].date, date(4));
        assert_eq!(window[2].date, date(6));
    }

    #[test]
    fn test_trailing_window_shorter_history_returns_all() {
        let series = series_with_days(&[1, 2]);
        assert_eq!(series.trailing_window(5).len(), 2);
    }

    #[test]
    fn test_trailing_window_on_empty_history_is_empty() {
        assert!(HistorySeries::new().trailing_window(7).is_empty());
    }

    // --- merge_dual_window --------------------------------------------------

    fn forecast_days(days: &[u32]) -> Vec<PrecipitationRecord> {
        days.iter()
            .map(|&d| PrecipitationRecord::forecast(date(d), 0.05, 40))
            .collect()
    }

    #[test]
    fn test_merge_dual_window_full_history_yields_fourteen_rows() {
        let series = series_with_days(&[1, 2, 3, 4, 5, 6, 7, 8, 9, 10]);
        let rows = series.merge_dual_window(&forecast_days(&[11, 12, 13, 14, 15, 16, 17]));
        assert_eq!(rows.len(), 14);
        assert_eq!(rows[0].date, date(4), "first row should be 7th-newest actual");
        assert!(rows[..7].iter().all(|r| r.kind == PrecipKind::Actual));
        assert!(rows[7..].iter().all(|r| r.kind == PrecipKind::Forecast));
    }

    #[test]
    fn test_merge_dual_window_short_history_has_no_padding() {
        let series = series_with_days(&[5, 6, 7]);
        let rows = series.merge_dual_window(&forecast_days(&[8, 9, 10]));
        assert_eq!(rows.len(), 6, "3 actuals + 3 forecasts, no synthetic fill");
    }

    #[test]
    fn test_merge_dual_window_never_duplicates_a_date_across_boundary() {
        let series = series_with_days(&[5, 6, 7]);
        // forecast overlaps the newest actual day
        let rows = series.merge_dual_window(&forecast_days(&[7, 8, 9]));
        let mut dates: Vec<_> = rows.iter().map(|r| r.date).collect();
        let before = dates.len();
        dates.dedup();
        assert_eq!(dates.len(), before, "no date should appear twice");
        assert_eq!(rows.len(), 5);
    }

    #[test]
    fn test_merge_dual_window_caps_forecast_at_seven() {
        let series = series_with_days(&[1]);
        let rows =
            series.merge_dual_window(&forecast_days(&[2, 3, 4, 5, 6, 7, 8, 9, 10]));
        assert_eq!(rows.len(), 1 + FORECAST_WINDOW_DAYS);
    }

    #[test]
    fn test_probability_label_rendering() {
        let actual = PrecipTableRow::from_record(&PrecipitationRecord::actual(date(1), 0.0));
        let forecast =
            PrecipTableRow::from_record(&PrecipitationRecord::forecast(date(2), 0.1, 60));
        assert_eq!(actual.probability_label(), "-");
        assert_eq!(forecast.probability_label(), "60%");
    }

    // --- log codec ----------------------------------------------------------

    const SAMPLE_LOG: &str = "\
date,forecast_prob,precip_actual,sb3_capacity_pct,max_gust,reserved1,reserved2
2026-08-25,40,0.0,58.0,12,0,14250000
2026-08-26,60,0.1,59.0,18,0,14250000

2026-08-27,10,0.2,60.0,9,0,14250000
";

    #[test]
    fn test_parse_history_log_skips_header_and_blank_lines() {
        let rows = parse_history_log(SAMPLE_LOG).expect("sample log should parse");
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1].date, date(26));
        assert_eq!(rows[1].precip_actual, 0.1);
        assert_eq!(rows[1].max_gust, 18);
    }

    #[test]
    fn test_parse_history_log_rejects_malformed_row() {
        let bad = "date,forecast_prob,precip_actual,sb3_capacity_pct,max_gust,r1,r2\n\
                   not-a-date,40,0.0,58.0,12,0,0\n";
        let err = parse_history_log(bad).expect_err("bad date should fail");
        match err {
            HistoryError::MalformedRow { line, .. } => assert_eq!(line, 2),
            other => panic!("expected MalformedRow, got {:?}", other),
        }
    }

    #[test]
    fn test_reserved_columns_are_ignored_on_parse() {
        // Older log rows carry legacy values in the reserved columns;
        // parsing must not depend on their content or presence.
        let text = format!(
            "{}\n2026-08-25,40,0.0,58.0,12,0,14250000\n2026-08-26,10,0.1,58.0,9,,\n",
            HISTORY_HEADER,
        );
        let rows = parse_history_log(&text).expect("reserved content must not matter");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].to_line(), "2026-08-25,40,0,58,12,0,0");
    }

    #[test]
    fn test_row_line_round_trip() {
        let row = HistoryRow {
            date: date(29),
            forecast_prob: 40,
            precip_actual: 0.25,
            sb3_capacity_pct: 60.5,
            max_gust: 22,
        };
        let text = format!("{}\n{}\n", HISTORY_HEADER, row.to_line());
        let parsed = parse_history_log(&text).expect("formatted line should parse");
        assert_eq!(parsed, vec![row]);
    }

    #[test]
    fn test_series_from_rows_builds_actuals_in_order() {
        let rows = parse_history_log(SAMPLE_LOG).unwrap();
        let series = series_from_rows(&rows).expect("log dates are unique");
        assert_eq!(series.len(), 3);
        assert!(series.records().iter().all(|r| r.kind == PrecipKind::Actual));
        assert_eq!(series.latest_date(), Some(date(27)));
    }
}
