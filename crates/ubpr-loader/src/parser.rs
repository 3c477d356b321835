//! Streaming schedule file parser.
//!
//! Reads one delimited UBPR schedule record-by-record, keeping only the
//! requested columns of the institutions that pass the RSSD filter.

use std::collections::{BTreeMap, HashSet};
use std::io::Read;

use csv::{Reader, ReaderBuilder, StringRecord};
use tracing::{debug, warn};
use ubpr_types::{FieldValue, MetricCode, Rssd};

use crate::convert::parse;
use crate::registry::{ColumnRef, FieldCodeSpec};
use crate::types::{normalize_header, ParseStats, ParserConfig, UbprError, UbprResult};

/// Set of institutions a query is restricted to.
pub type RssdFilter = HashSet<Rssd>;

/// One institution's converted values from a single schedule.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedRow {
    /// Institution identifier.
    pub rssd: Rssd,
    /// Converted values for the requested codes that had non-empty cells.
    pub values: BTreeMap<MetricCode, FieldValue>,
}

/// A streaming parser for one schedule file.
///
/// Rows whose RSSD is missing or unparseable are skipped and counted. Rows
/// outside the filter are dropped before any conversion runs. The first
/// conversion failure is returned as an error and ends the stream.
pub struct ScheduleParser<'a, R: Read> {
    reader: Reader<R>,
    schedule: String,
    identifier_column: usize,
    columns: Vec<(usize, FieldCodeSpec)>,
    filter: Option<&'a RssdFilter>,
    record: StringRecord,
    stats: ParseStats,
    finished: bool,
}

impl<'a, R: Read> ScheduleParser<'a, R> {
    /// Creates a parser over `reader`, reading the header row immediately.
    ///
    /// # Errors
    /// Returns an error if the header row is empty or a requested column
    /// does not exist.
    pub fn from_reader(
        reader: R,
        schedule: &str,
        specs: &[FieldCodeSpec],
        filter: Option<&'a RssdFilter>,
        config: &ParserConfig,
    ) -> UbprResult<Self> {
        let mut csv_reader = ReaderBuilder::new()
            .delimiter(config.delimiter)
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::None)
            .from_reader(reader);

        let headers = csv_reader.headers()?.clone();
        if headers.iter().all(|h| h.trim().is_empty()) {
            return Err(UbprError::InvalidHeader {
                schedule: schedule.to_string(),
            });
        }

        let identifier_column = headers
            .iter()
            .position(|h| config.is_identifier_header(h))
            .unwrap_or(0);

        let columns = specs
            .iter()
            .map(|spec| Ok((resolve_column(&headers, schedule, &spec.column)?, spec.clone())))
            .collect::<UbprResult<Vec<_>>>()?;

        debug!(
            "Schedule '{}': {} columns, identifier at {}, {} requested",
            schedule,
            headers.len(),
            identifier_column,
            columns.len()
        );

        Ok(Self {
            reader: csv_reader,
            schedule: schedule.to_string(),
            identifier_column,
            columns,
            filter,
            record: StringRecord::new(),
            stats: ParseStats::default(),
            finished: false,
        })
    }

    /// Returns the schedule name.
    pub fn schedule(&self) -> &str {
        &self.schedule
    }

    /// Returns statistics for the records read so far.
    pub fn stats(&self) -> &ParseStats {
        &self.stats
    }

    /// Parses all remaining rows into a Vec.
    ///
    /// Note: This loads all matching rows into memory.
    pub fn parse_all(mut self) -> UbprResult<Vec<ParsedRow>> {
        self.by_ref().collect()
    }

    fn convert_row(&self, rssd: Rssd) -> UbprResult<ParsedRow> {
        let mut values = BTreeMap::new();
        for (index, spec) in &self.columns {
            let raw = self.record.get(*index).unwrap_or("").trim();
            // Empty cells are unreported values.
            if raw.is_empty() {
                continue;
            }
            let value = spec
                .convert
                .convert(raw)
                .map_err(|reason| UbprError::ValueConversion {
                    code: spec.code.to_string(),
                    rssd,
                    raw: raw.to_string(),
                    schedule: self.schedule.clone(),
                    reason,
                })?;
            values.insert(spec.code.clone(), value);
        }
        Ok(ParsedRow { rssd, values })
    }

    fn finish(&mut self) {
        self.finished = true;
        if self.stats.skipped_records > 0 {
            warn!(
                "Schedule '{}': skipped {} rows without a valid RSSD",
                self.schedule, self.stats.skipped_records
            );
        }
        debug!("Schedule '{}' done: {:?}", self.schedule, self.stats);
    }
}

fn resolve_column(headers: &StringRecord, schedule: &str, column: &ColumnRef) -> UbprResult<usize> {
    let found = match column {
        ColumnRef::Index(index) => (*index < headers.len()).then_some(*index),
        ColumnRef::Header(name) => {
            let wanted = normalize_header(name);
            headers.iter().position(|h| normalize_header(h) == wanted)
        }
    };
    found.ok_or_else(|| UbprError::MissingColumn {
        schedule: schedule.to_string(),
        column: column.to_string(),
    })
}

impl<R: Read> Iterator for ScheduleParser<'_, R> {
    type Item = UbprResult<ParsedRow>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        loop {
            match self.reader.read_record(&mut self.record) {
                Ok(true) => {
                    self.stats.total_records += 1;

                    let raw_id = self.record.get(self.identifier_column).unwrap_or("");
                    let Some(rssd) = parse::rssd(raw_id) else {
                        self.stats.skipped_records += 1;
                        debug!(
                            "Schedule '{}': skipping row {} with RSSD {:?}",
                            self.schedule,
                            self.stats.total_records,
                            raw_id
                        );
                        continue;
                    };

                    if let Some(filter) = self.filter {
                        if !filter.contains(&rssd) {
                            self.stats.filtered_records += 1;
                            continue;
                        }
                    }

                    let row = self.convert_row(rssd);
                    match &row {
                        Ok(_) => self.stats.matched_records += 1,
                        Err(_) => self.finished = true,
                    }
                    return Some(row);
                }
                Ok(false) => {
                    self.finish();
                    return None;
                }
                Err(e) => {
                    self.finished = true;
                    return Some(Err(e.into()));
                }
            }
        }
    }
}
