//! # ubpr-loader
//!
//! Streaming parser and query engine for the FFIEC Uniform Bank Performance
//! Report (UBPR) bulk download.
//!
//! A query names a set of metric codes and optionally an RSSD filter. The
//! [`SchemaRegistry`] maps each code to its schedule file and column, the
//! [`ArchiveLocator`] opens those schedules from the bulk zip, the
//! [`ScheduleParser`] streams and converts the matching rows, and the
//! [`RecordJoiner`] merges them into one [`InstitutionRecord`] per bank.
//! [`BankDataService`] runs that pipeline and combines the result with FDIC
//! institution data.
//!
//! ```ignore
//! use std::sync::Arc;
//! use ubpr_loader::{request_codes, BankDataService, SchemaRegistry, UbprConfig};
//!
//! let service = BankDataService::from_config(
//!     &UbprConfig::from_env(),
//!     Arc::new(SchemaRegistry::ubpr_default()),
//! );
//! let records = service.get_ubpr_inst_data(&request_codes(["UBPRE569"]), None)?;
//! ```

#![warn(missing_docs)]

mod archive;
mod config;
mod convert;
mod directory;
mod joiner;
mod parser;
mod query;
mod registry;
mod sort;
mod types;

#[cfg(test)]
mod test_support;

pub use archive::{
    parse_schedule_file_name, schedule_file_stem, ArchiveLocator, ScheduleEntry, UbprArchive,
    SCHEDULE_FILE_PREFIX,
};
pub use config::{
    UbprConfig, DEFAULT_ARCHIVE_NAME, DEFAULT_INSTITUTIONS_NAME, FDIC_INST_FILE_ENV,
    UBPR_ZIP_FILE_ENV,
};
pub use convert::{parse, request_codes, CodeOptions, CodeRequest, ConvertOverride, Converter};
pub use directory::{
    CsvInstitutionDirectory, DirectoryError, InstitutionDirectory, StaticInstitutionDirectory,
};
pub use joiner::{join_schedules, RecordJoiner};
pub use parser::{ParsedRow, RssdFilter, ScheduleParser};
pub use query::{default_codes, merge_with_master, BankDataService, UbprQueryResult};
pub use registry::{ColumnRef, FieldCodeSpec, ResolvedSchedules, SchemaRegistry};
pub use sort::{default_sort_keys, sort_by_code, sort_institutions, MasterField, MetricSource, SortKey};
pub use types::{ParseStats, ParserConfig, UbprError, UbprResult, UBPR_DOWNLOAD_URL};

// Re-export ubpr-types for convenience
pub use ubpr_types;
pub use ubpr_types::{
    CombinedRecord, FieldValue, InstitutionMasterRecord, InstitutionRecord, MetricCode, Rssd,
    SortDirection,
};
