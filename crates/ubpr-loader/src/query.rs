//! UBPR query facade.
//!
//! Ties the pipeline together: the registry resolves codes to schedules, the
//! archive opens each schedule, the parser streams and filters its rows and
//! the joiner merges them into one record per institution.
//!
//! ```ignore
//! use std::sync::Arc;
//! use ubpr_loader::{request_codes, BankDataService, SchemaRegistry, SortDirection, UbprConfig};
//!
//! let config = UbprConfig::from_env();
//! let service = BankDataService::from_config(&config, Arc::new(SchemaRegistry::ubpr_default()));
//!
//! let top_50 = service.top_rssds(50)?;
//! let mut records = service.get_combined_inst_data(&request_codes(["UBPRE569"]), Some(&top_50))?;
//! ubpr_loader::sort_by_code(&mut records, "UBPRE569", SortDirection::Ascending);
//! ```

use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info, warn};
use ubpr_types::{well_known, CombinedRecord, InstitutionMasterRecord, InstitutionRecord};

use crate::archive::ArchiveLocator;
use crate::config::UbprConfig;
use crate::convert::{request_codes, CodeRequest};
use crate::directory::{CsvInstitutionDirectory, InstitutionDirectory};
use crate::joiner::RecordJoiner;
use crate::parser::{RssdFilter, ScheduleParser};
use crate::registry::SchemaRegistry;
use crate::sort::{default_sort_keys, sort_institutions, SortKey};
use crate::types::{ParseStats, ParserConfig, UbprError, UbprResult};

/// Records from one UBPR query plus per-schedule diagnostics.
#[derive(Debug, Clone, Default)]
pub struct UbprQueryResult {
    /// One record per institution, ordered by RSSD.
    pub records: Vec<InstitutionRecord>,
    /// Parse statistics keyed by schedule.
    pub stats: BTreeMap<String, ParseStats>,
    /// Number of codes reported by more than one schedule row.
    pub conflicts: usize,
}

impl UbprQueryResult {
    /// Total rows skipped for a missing or unparseable RSSD.
    pub fn skipped_records(&self) -> usize {
        self.stats.values().map(|s| s.skipped_records).sum()
    }
}

/// Entry point for UBPR and institution directory queries.
#[derive(Debug, Clone)]
pub struct BankDataService<D> {
    registry: Arc<SchemaRegistry>,
    locator: ArchiveLocator,
    directory: D,
    parser_config: ParserConfig,
}

impl BankDataService<CsvInstitutionDirectory> {
    /// Creates a service reading the archive and institutions file named by `config`.
    pub fn from_config(config: &UbprConfig, registry: Arc<SchemaRegistry>) -> Self {
        let directory = CsvInstitutionDirectory::new(&config.institutions_file)
            .with_ignore_inactive(config.ignore_inactive);
        Self::new(registry, &config.archive_path, directory)
            .with_parser_config(config.parser.clone())
    }
}

impl<D: InstitutionDirectory> BankDataService<D> {
    /// Creates a service over the archive at `archive_path`.
    pub fn new<P: AsRef<Path>>(registry: Arc<SchemaRegistry>, archive_path: P, directory: D) -> Self {
        Self {
            registry,
            locator: ArchiveLocator::new(archive_path),
            directory,
            parser_config: ParserConfig::default(),
        }
    }

    /// Replaces the schedule parser options.
    pub fn with_parser_config(mut self, parser_config: ParserConfig) -> Self {
        self.parser_config = parser_config;
        self
    }

    /// Returns the schema registry.
    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    /// Returns the archive locator.
    pub fn locator(&self) -> &ArchiveLocator {
        &self.locator
    }

    /// Returns the institution directory.
    pub fn directory(&self) -> &D {
        &self.directory
    }

    /// Extracts the requested UBPR metrics, one record per institution.
    ///
    /// When `rssd_filter` is given only those institutions are converted
    /// and returned. Records come back ordered by RSSD; sort them with
    /// [`sort_by_code`](crate::sort_by_code) as needed.
    ///
    /// # Errors
    /// Fails on an unknown code, a missing archive or schedule, a missing
    /// column, or any cell that its converter rejects.
    pub fn get_ubpr_inst_data(
        &self,
        codes: &CodeRequest,
        rssd_filter: Option<&RssdFilter>,
    ) -> UbprResult<Vec<InstitutionRecord>> {
        Ok(self.get_ubpr_inst_data_with_stats(codes, rssd_filter)?.records)
    }

    /// Same as [`get_ubpr_inst_data`](Self::get_ubpr_inst_data), also
    /// returning per-schedule statistics.
    pub fn get_ubpr_inst_data_with_stats(
        &self,
        codes: &CodeRequest,
        rssd_filter: Option<&RssdFilter>,
    ) -> UbprResult<UbprQueryResult> {
        let resolved = self.registry.resolve(codes)?;
        if resolved.is_empty() {
            return Ok(UbprQueryResult::default());
        }

        let mut archive = self.locator.open_archive(resolved.keys())?;
        let mut joiner = RecordJoiner::new();
        let mut stats = BTreeMap::new();

        for (schedule, specs) in &resolved {
            let reader = archive.open_schedule(schedule)?;
            let mut rows = ScheduleParser::from_reader(
                reader,
                schedule,
                specs,
                rssd_filter,
                &self.parser_config,
            )?;
            let merged = joiner.absorb(schedule, rows.by_ref())?;
            debug!("Schedule '{}': merged {} rows", schedule, merged);
            stats.insert(schedule.clone(), rows.stats().clone());
        }

        let conflicts = joiner.conflicts();
        let records = joiner.finish();
        info!(
            "UBPR query for {} codes over {} schedules returned {} institutions",
            codes.len(),
            resolved.len(),
            records.len()
        );

        Ok(UbprQueryResult {
            records,
            stats,
            conflicts,
        })
    }

    /// Returns directory institutions sorted by `sort_keys`.
    ///
    /// An empty key list means the default: assets then deposits, descending.
    /// The sort is stable.
    pub fn get_sorted_inst_data(&self, sort_keys: &[SortKey]) -> UbprResult<Vec<InstitutionMasterRecord>> {
        let mut institutions = self.fetch_institutions()?;
        if sort_keys.is_empty() {
            sort_institutions(&mut institutions, &default_sort_keys());
        } else {
            sort_institutions(&mut institutions, sort_keys);
        }
        Ok(institutions)
    }

    /// RSSDs of the `n` largest institutions by the default sort.
    pub fn top_rssds(&self, n: usize) -> UbprResult<RssdFilter> {
        Ok(self
            .get_sorted_inst_data(&[])?
            .into_iter()
            .take(n)
            .map(|i| i.rssd)
            .collect())
    }

    /// Runs the UBPR query and pairs each record with its directory entry.
    pub fn get_combined_inst_data(
        &self,
        codes: &CodeRequest,
        rssd_filter: Option<&RssdFilter>,
    ) -> UbprResult<Vec<CombinedRecord>> {
        let records = self.get_ubpr_inst_data(codes, rssd_filter)?;
        let institutions = self.fetch_institutions()?;
        Ok(merge_with_master(records, &institutions))
    }

    fn fetch_institutions(&self) -> UbprResult<Vec<InstitutionMasterRecord>> {
        self.directory
            .fetch_institution_master_data()
            .map_err(|e| UbprError::Directory(Box::new(e)))
    }
}

/// Pairs UBPR records with directory entries by RSSD.
///
/// Records without a directory entry are kept with `master: None`.
pub fn merge_with_master(
    records: Vec<InstitutionRecord>,
    institutions: &[InstitutionMasterRecord],
) -> Vec<CombinedRecord> {
    let by_rssd: HashMap<_, _> = institutions.iter().map(|i| (i.rssd, i)).collect();
    records
        .into_iter()
        .map(|ubpr| {
            let master = by_rssd.get(&ubpr.rssd).map(|i| (*i).clone());
            if master.is_none() {
                warn!("RSSD {} has UBPR data but no directory entry", ubpr.rssd);
            }
            CombinedRecord { master, ubpr }
        })
        .collect()
}

/// The overall risk indicator codes, with default conversion.
pub fn default_codes() -> CodeRequest {
    request_codes(well_known::DEFAULT_CODES.iter().copied())
}
