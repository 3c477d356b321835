//! Loader-specific error, configuration and statistics types.

use std::path::PathBuf;

use thiserror::Error;
use ubpr_types::Rssd;

/// Where to obtain the UBPR bulk archive.
pub const UBPR_DOWNLOAD_URL: &str = "https://cdr.ffiec.gov/public/PWS/DownloadBulkData.aspx";

/// Errors that can occur while locating, parsing or querying UBPR data.
#[derive(Error, Debug)]
pub enum UbprError {
    /// The bulk archive, or a schedule file inside it, is not present.
    ///
    /// The display text is the full remediation message.
    #[error("{remediation}")]
    MissingArchive {
        /// Expected local path of the archive.
        archive: PathBuf,
        /// File name stem of the schedule that was required.
        schedule_file: String,
        /// Instructions for obtaining the file.
        remediation: String,
    },

    /// A requested metric code has no schema mapping.
    #[error("Unknown UBPR metric code: {code}")]
    UnknownCode {
        /// The offending code.
        code: String,
    },

    /// A cell could not be converted by its assigned converter.
    #[error(
        "Cannot convert {raw:?} for {code} (RSSD {rssd}) in schedule '{schedule}': {reason}"
    )]
    ValueConversion {
        /// Metric code of the column.
        code: String,
        /// Institution the row belongs to.
        rssd: Rssd,
        /// The raw cell text.
        raw: String,
        /// Schedule the row was read from.
        schedule: String,
        /// Converter failure message.
        reason: String,
    },

    /// A registered column does not exist in the schedule file.
    #[error("Schedule '{schedule}' has no column {column}")]
    MissingColumn {
        /// Schedule being parsed.
        schedule: String,
        /// Header name or index that was looked up.
        column: String,
    },

    /// The schedule file has no header row.
    #[error("Schedule '{schedule}' has an empty header row")]
    InvalidHeader {
        /// Schedule being parsed.
        schedule: String,
    },

    /// A line of a schema mapping file is malformed.
    #[error("Invalid schema registry entry on line {line}: {message}")]
    InvalidRegistryEntry {
        /// 1-based line number in the mapping file.
        line: u64,
        /// What was wrong with the entry.
        message: String,
    },

    /// I/O error reading archive or schedule.
    #[error("IO error reading UBPR data: {0}")]
    Io(#[from] std::io::Error),

    /// CSV parsing error.
    #[error("Delimited file parsing error: {0}")]
    Csv(#[from] csv::Error),

    /// Error reading the zip archive.
    #[error("Zip archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Error raised by the institution directory, passed through unchanged.
    #[error(transparent)]
    Directory(Box<dyn std::error::Error + Send + Sync>),
}

/// Result type for UBPR operations.
pub type UbprResult<T> = Result<T, UbprError>;

/// Configuration for parsing schedule files.
#[derive(Debug, Clone)]
pub struct ParserConfig {
    /// Field delimiter (tab for the bulk download).
    pub delimiter: u8,
    /// Header names recognized as the RSSD column. Matching ignores case and
    /// whitespace. If none is found, column 0 holds the identifier.
    pub identifier_columns: Vec<String>,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            delimiter: b'\t',
            identifier_columns: vec!["ID RSSD".to_string(), "IDRSSD".to_string()],
        }
    }
}

impl ParserConfig {
    /// Returns true if `header` names the identifier column.
    pub fn is_identifier_header(&self, header: &str) -> bool {
        let header = normalize_header(header);
        self.identifier_columns
            .iter()
            .any(|candidate| normalize_header(candidate) == header)
    }
}

/// Normalizes a header for comparison: strips BOM and whitespace, upper-cases.
pub(crate) fn normalize_header(header: &str) -> String {
    header
        .trim_start_matches('\u{feff}')
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_ascii_uppercase()
}

/// Statistics from parsing one schedule file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseStats {
    /// Data records read (header excluded).
    pub total_records: usize,
    /// Records emitted.
    pub matched_records: usize,
    /// Records dropped because their RSSD was not in the filter.
    pub filtered_records: usize,
    /// Records skipped for a missing or unparseable RSSD.
    pub skipped_records: usize,
}

impl ParseStats {
    /// Returns the percentage of records that were emitted.
    pub fn match_rate(&self) -> f64 {
        if self.total_records == 0 {
            0.0
        } else {
            (self.matched_records as f64 / self.total_records as f64) * 100.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parser_config_default() {
        let config = ParserConfig::default();
        assert_eq!(config.delimiter, b'\t');
        assert!(config.is_identifier_header("ID RSSD"));
        assert!(config.is_identifier_header("\u{feff}id rssd"));
        assert!(config.is_identifier_header("IDRSSD"));
        assert!(!config.is_identifier_header("Reporting Period"));
    }

    #[test]
    fn test_parse_stats_match_rate() {
        let stats = ParseStats {
            total_records: 200,
            matched_records: 50,
            ..Default::default()
        };
        assert!((stats.match_rate() - 25.0).abs() < 0.01);
        assert_eq!(ParseStats::default().match_rate(), 0.0);
    }

    #[test]
    fn test_missing_archive_displays_remediation() {
        let err = UbprError::MissingArchive {
            archive: PathBuf::from("/tmp/ubpr.zip"),
            schedule_file: "FFIEC CDR UBPR Ratios Summary Ratios".to_string(),
            remediation: "download it".to_string(),
        };
        assert_eq!(err.to_string(), "download it");
    }

    #[test]
    fn test_value_conversion_message_names_context() {
        let err = UbprError::ValueConversion {
            code: "UBPRE569".to_string(),
            rssd: 480228,
            raw: "abc".to_string(),
            schedule: "Summary Ratios".to_string(),
            reason: "not a number".to_string(),
        };
        let message = err.to_string();
        assert!(message.contains("UBPRE569"));
        assert!(message.contains("480228"));
        assert!(message.contains("\"abc\""));
        assert!(message.contains("Summary Ratios"));
    }
}
