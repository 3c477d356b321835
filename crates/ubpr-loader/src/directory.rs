//! Institution directory collaborators.
//!
//! The query facade only needs `fetch_institution_master_data()`. The CSV
//! implementation reads a local copy of the FDIC `institutions.csv` export;
//! retrieving that file over the network is left to the caller.

use std::collections::BTreeMap;
use std::convert::Infallible;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, StringRecord};
use thiserror::Error;
use tracing::{debug, info, warn};
use ubpr_types::InstitutionMasterRecord;

use crate::convert::parse;

const RSSD_COLUMN: &str = "FED_RSSD";
const NAME_COLUMN: &str = "NAME";
const ASSET_COLUMN: &str = "ASSET";
const DEPOSIT_COLUMN: &str = "DEP";
const CERT_COLUMN: &str = "CERT";
const INACTIVE_COLUMN: &str = "INACTIVE";

/// Source of institution master records.
pub trait InstitutionDirectory {
    /// Error raised when the directory cannot be read.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Returns every institution the directory knows about.
    fn fetch_institution_master_data(&self) -> Result<Vec<InstitutionMasterRecord>, Self::Error>;
}

/// Errors reading the institutions CSV.
#[derive(Error, Debug)]
pub enum DirectoryError {
    /// The institutions file does not exist.
    #[error("Institutions file not found: {path}")]
    FileNotFound {
        /// The path that was not found.
        path: String,
    },

    /// I/O error.
    #[error("IO error reading institutions file: {0}")]
    Io(#[from] std::io::Error),

    /// CSV parsing error.
    #[error("CSV parsing error in institutions file: {0}")]
    Csv(#[from] csv::Error),

    /// A required column is missing from the header.
    #[error("Missing required column in institutions file: {column}")]
    MissingColumn {
        /// The name of the missing column.
        column: String,
    },

    /// An amount column holds something other than a whole number.
    #[error("Invalid {column} value {value:?} on line {line}")]
    InvalidAmount {
        /// Column name.
        column: String,
        /// Raw value.
        value: String,
        /// 1-based line number.
        line: u64,
    },
}

/// Reads institutions from a local FDIC `institutions.csv`.
#[derive(Debug, Clone)]
pub struct CsvInstitutionDirectory {
    path: PathBuf,
    ignore_inactive: bool,
}

impl CsvInstitutionDirectory {
    /// Creates a directory over `path`, skipping inactive institutions.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            ignore_inactive: true,
        }
    }

    /// Controls whether inactive institutions are dropped.
    pub fn with_ignore_inactive(mut self, ignore_inactive: bool) -> Self {
        self.ignore_inactive = ignore_inactive;
        self
    }

    /// Path of the institutions file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Parses institutions from comma-delimited text with a header row.
    pub fn parse_reader<R: Read>(
        reader: R,
        ignore_inactive: bool,
    ) -> Result<Vec<InstitutionMasterRecord>, DirectoryError> {
        let mut csv_reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let headers: Vec<String> = csv_reader
            .headers()?
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
            .collect();
        let column = |name: &str| headers.iter().position(|h| h == name);
        let required = |name: &str| {
            column(name).ok_or_else(|| DirectoryError::MissingColumn {
                column: name.to_string(),
            })
        };

        let layout = Layout {
            rssd: required(RSSD_COLUMN)?,
            name: required(NAME_COLUMN)?,
            asset: column(ASSET_COLUMN),
            deposit: column(DEPOSIT_COLUMN),
            cert: column(CERT_COLUMN),
            inactive: column(INACTIVE_COLUMN),
        };

        let mut institutions = Vec::new();
        let mut record = StringRecord::new();
        let mut skipped = 0usize;
        let mut inactive = 0usize;
        while csv_reader.read_record(&mut record)? {
            let line = record.position().map(|p| p.line()).unwrap_or(0);
            let Some(institution) = layout.read(&record, &headers, line)? else {
                skipped += 1;
                continue;
            };
            if ignore_inactive && institution.inactive {
                inactive += 1;
                continue;
            }
            institutions.push(institution);
        }

        if skipped > 0 {
            warn!("Skipped {} institutions without a FED_RSSD", skipped);
        }
        debug!("Dropped {} inactive institutions", inactive);
        Ok(institutions)
    }
}

impl InstitutionDirectory for CsvInstitutionDirectory {
    type Error = DirectoryError;

    fn fetch_institution_master_data(&self) -> Result<Vec<InstitutionMasterRecord>, Self::Error> {
        if !self.path.exists() {
            return Err(DirectoryError::FileNotFound {
                path: self.path.display().to_string(),
            });
        }
        info!("Using institutions file at {}", self.path.display());
        let file = BufReader::new(File::open(&self.path)?);
        let institutions = Self::parse_reader(file, self.ignore_inactive)?;
        info!("Loaded {} institutions", institutions.len());
        Ok(institutions)
    }
}

/// Column positions of the institutions file.
struct Layout {
    rssd: usize,
    name: usize,
    asset: Option<usize>,
    deposit: Option<usize>,
    cert: Option<usize>,
    inactive: Option<usize>,
}

impl Layout {
    fn read(
        &self,
        record: &StringRecord,
        headers: &[String],
        line: u64,
    ) -> Result<Option<InstitutionMasterRecord>, DirectoryError> {
        let cell = |index: Option<usize>| {
            index
                .and_then(|i| record.get(i))
                .map(str::trim)
                .filter(|v| !v.is_empty())
        };

        let Some(rssd) = cell(Some(self.rssd)).and_then(parse::rssd) else {
            return Ok(None);
        };
        let amount = |index: Option<usize>, column: &str| -> Result<Option<i64>, DirectoryError> {
            cell(index)
                .map(|v| parse_amount(v, column, line))
                .transpose()
        };

        let known = [
            Some(self.rssd),
            Some(self.name),
            self.asset,
            self.deposit,
            self.cert,
            self.inactive,
        ];
        let extra: BTreeMap<String, String> = headers
            .iter()
            .enumerate()
            .filter(|(i, _)| !known.contains(&Some(*i)))
            .filter_map(|(i, h)| record.get(i).map(|v| (h.clone(), v.to_string())))
            .collect();

        Ok(Some(InstitutionMasterRecord {
            rssd,
            name: cell(Some(self.name)).unwrap_or_default().to_string(),
            asset: amount(self.asset, ASSET_COLUMN)?,
            deposit: amount(self.deposit, DEPOSIT_COLUMN)?,
            cert: cell(self.cert).map(str::to_string),
            inactive: cell(self.inactive) == Some("1"),
            extra,
        }))
    }
}

/// Parses a dollar amount; whole numbers written with a trailing `.0` are accepted.
fn parse_amount(value: &str, column: &str, line: u64) -> Result<i64, DirectoryError> {
    let invalid = || DirectoryError::InvalidAmount {
        column: column.to_string(),
        value: value.to_string(),
        line,
    };
    if let Ok(v) = value.parse::<i64>() {
        return Ok(v);
    }
    match value.parse::<f64>() {
        // 2^63 is exact as f64; anything at or beyond it would saturate.
        Ok(v) if v.is_finite() && v.fract() == 0.0 && v >= i64::MIN as f64 && v < i64::MAX as f64 => {
            Ok(v as i64)
        }
        _ => Err(invalid()),
    }
}

/// An in-memory directory.
#[derive(Debug, Clone, Default)]
pub struct StaticInstitutionDirectory {
    institutions: Vec<InstitutionMasterRecord>,
}

impl StaticInstitutionDirectory {
    /// Creates a directory holding `institutions`.
    pub fn new(institutions: Vec<InstitutionMasterRecord>) -> Self {
        Self { institutions }
    }
}

impl InstitutionDirectory for StaticInstitutionDirectory {
    type Error = Infallible;

    fn fetch_institution_master_data(&self) -> Result<Vec<InstitutionMasterRecord>, Self::Error> {
        Ok(self.institutions.clone())
    }
}
