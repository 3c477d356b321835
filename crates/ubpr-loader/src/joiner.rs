//! Merges per-schedule rows into one record per institution.

use std::collections::BTreeMap;

use tracing::warn;
use ubpr_types::{InstitutionRecord, Rssd};

use crate::parser::ParsedRow;
use crate::types::UbprResult;

/// Accumulates [`ParsedRow`]s from any number of schedules.
///
/// Rows sharing an RSSD are merged into a single [`InstitutionRecord`]. If a
/// code arrives twice for the same institution, the later value wins and the
/// conflict is logged and counted. The joiner does no filtering of its own.
#[derive(Debug, Default)]
pub struct RecordJoiner {
    records: BTreeMap<Rssd, InstitutionRecord>,
    conflicts: usize,
}

impl RecordJoiner {
    /// Creates an empty joiner.
    pub fn new() -> Self {
        Self::default()
    }

    /// Merges one row from `schedule`.
    pub fn absorb_row(&mut self, schedule: &str, row: ParsedRow) {
        let record = self
            .records
            .entry(row.rssd)
            .or_insert_with(|| InstitutionRecord::new(row.rssd));
        for (code, value) in row.values {
            if let Some(previous) = record.insert(code.clone(), value) {
                self.conflicts += 1;
                warn!(
                    "RSSD {}: {} redefined by schedule '{}' (replacing {})",
                    row.rssd, code, schedule, previous
                );
            }
        }
    }

    /// Merges every row of one schedule, stopping at the first error.
    ///
    /// Returns the number of rows merged.
    pub fn absorb<I>(&mut self, schedule: &str, rows: I) -> UbprResult<usize>
    where
        I: IntoIterator<Item = UbprResult<ParsedRow>>,
    {
        let mut count = 0;
        for row in rows {
            self.absorb_row(schedule, row?);
            count += 1;
        }
        Ok(count)
    }

    /// Number of institutions seen so far.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if no rows have been merged.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of code redefinitions seen.
    pub fn conflicts(&self) -> usize {
        self.conflicts
    }

    /// Returns the merged records ordered by RSSD.
    pub fn finish(self) -> Vec<InstitutionRecord> {
        self.records.into_values().collect()
    }
}

/// Joins rows from several schedules, processed in the given order.
///
/// # Example
///
/// ```
/// use std::collections::BTreeMap;
/// use ubpr_loader::{join_schedules, ParsedRow};
/// use ubpr_types::{FieldValue, MetricCode};
///
/// let row = |rssd, code: &str, v: f64| ParsedRow {
///     rssd,
///     values: BTreeMap::from([(MetricCode::new(code), FieldValue::Float(v))]),
/// };
/// let records = join_schedules(vec![
///     ("Summary Ratios", vec![Ok(row(1, "UBPRE569", -1.5))]),
///     ("Interest Rate Risk Analysis", vec![Ok(row(1, "UBPRM037", -0.5))]),
/// ])
/// .unwrap();
///
/// assert_eq!(records.len(), 1);
/// assert_eq!(records[0].len(), 2);
/// ```
pub fn join_schedules<I, S, R>(per_schedule: I) -> UbprResult<Vec<InstitutionRecord>>
where
    I: IntoIterator<Item = (S, R)>,
    S: AsRef<str>,
    R: IntoIterator<Item = UbprResult<ParsedRow>>,
{
    let mut joiner = RecordJoiner::new();
    for (schedule, rows) in per_schedule {
        joiner.absorb(schedule.as_ref(), rows)?;
    }
    Ok(joiner.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::UbprError;
    use ubpr_types::{FieldValue, MetricCode};

    fn row(rssd: Rssd, values: &[(&str, f64)]) -> ParsedRow {
        ParsedRow {
            rssd,
            values: values
                .iter()
                .map(|(code, v)| (MetricCode::new(code), FieldValue::Float(*v)))
                .collect(),
        }
    }

    fn schedule_a() -> Vec<UbprResult<ParsedRow>> {
        vec![Ok(row(1, &[("UBPRE567", 1.0)])), Ok(row(2, &[("UBPRE567", 2.0)]))]
    }

    fn schedule_b() -> Vec<UbprResult<ParsedRow>> {
        vec![Ok(row(2, &[("UBPRM037", -2.0)])), Ok(row(3, &[("UBPRM037", -3.0)]))]
    }

    fn schedule_c() -> Vec<UbprResult<ParsedRow>> {
        vec![Ok(row(1, &[("UBPRE100", 10.0)])), Ok(row(3, &[("UBPRE100", 30.0)]))]
    }

    #[test]
    fn test_join_unions_codes() {
        let records = join_schedules(vec![("A", schedule_a()), ("B", schedule_b())]).unwrap();

        assert_eq!(records.len(), 3);
        let two = records.iter().find(|r| r.rssd == 2).unwrap();
        assert_eq!(two.get("UBPRE567"), Some(&FieldValue::Float(2.0)));
        assert_eq!(two.get("UBPRM037"), Some(&FieldValue::Float(-2.0)));

        // institution 1 never appears in schedule B
        let one = records.iter().find(|r| r.rssd == 1).unwrap();
        assert!(!one.contains("UBPRM037"));
    }

    #[test]
    fn test_join_is_order_independent() {
        let forward = join_schedules(vec![
            ("A", schedule_a()),
            ("B", schedule_b()),
            ("C", schedule_c()),
        ])
        .unwrap();
        let backward = join_schedules(vec![
            ("C", schedule_c()),
            ("B", schedule_b()),
            ("A", schedule_a()),
        ])
        .unwrap();
        assert_eq!(forward, backward);
    }

    #[test]
    fn test_no_duplicate_identifiers() {
        let records = join_schedules(vec![
            ("A", schedule_a()),
            ("B", schedule_b()),
            ("C", schedule_c()),
        ])
        .unwrap();
        let mut ids: Vec<_> = records.iter().map(|r| r.rssd).collect();
        let before = ids.len();
        ids.dedup();
        assert_eq!(ids.len(), before);
    }

    #[test]
    fn test_conflict_later_schedule_wins() {
        let mut joiner = RecordJoiner::new();
        joiner.absorb_row("A", row(1, &[("UBPRE569", -1.0)]));
        joiner.absorb_row("B", row(1, &[("UBPRE569", -9.0)]));

        assert_eq!(joiner.conflicts(), 1);
        let records = joiner.finish();
        assert_eq!(records[0].get("UBPRE569"), Some(&FieldValue::Float(-9.0)));
    }

    #[test]
    fn test_absorb_stops_at_error() {
        let rows = vec![
            Ok(row(1, &[("UBPRE569", -1.0)])),
            Err(UbprError::UnknownCode {
                code: "UBPRX".to_string(),
            }),
            Ok(row(2, &[("UBPRE569", -2.0)])),
        ];
        let mut joiner = RecordJoiner::new();
        assert!(joiner.absorb("A", rows).is_err());
        assert_eq!(joiner.len(), 1);
    }

    #[test]
    fn test_row_without_values_still_creates_record() {
        let mut joiner = RecordJoiner::new();
        joiner.absorb_row("A", row(7, &[]));
        let records = joiner.finish();
        assert_eq!(records.len(), 1);
        assert!(records[0].is_empty());
    }
}
