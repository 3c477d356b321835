//! UBPR bulk archive discovery.
//!
//! The bulk download is a zip holding one tab-delimited file per schedule,
//! named `FFIEC CDR UBPR Ratios <Schedule> <MMDDYYYY>.txt`. An extracted
//! copy of the archive (a directory of those files) works the same way.
//!
//! An absent archive or schedule is always an error carrying remediation
//! text, never an empty result.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use tracing::{debug, info, warn};
use zip::ZipArchive;

use crate::types::{UbprError, UbprResult, UBPR_DOWNLOAD_URL};

/// Prefix shared by every schedule file in the bulk download.
pub const SCHEDULE_FILE_PREFIX: &str = "FFIEC CDR UBPR Ratios";

fn schedule_file_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^FFIEC CDR UBPR Ratios (?P<schedule>.+?) (?P<period>[0-9]{8})\.txt$")
            .expect("schedule file pattern is valid")
    })
}

/// Returns the file name stem for `schedule`, e.g.
/// `FFIEC CDR UBPR Ratios Summary Ratios`.
pub fn schedule_file_stem(schedule: &str) -> String {
    format!("{SCHEDULE_FILE_PREFIX} {schedule}")
}

/// Splits a schedule file name into schedule name and reporting period.
///
/// Directory components are ignored.
pub fn parse_schedule_file_name(name: &str) -> Option<(String, String)> {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let captures = schedule_file_regex().captures(base)?;
    Some((
        captures["schedule"].to_string(),
        captures["period"].to_string(),
    ))
}

/// Converts an `MMDDYYYY` period into a sortable `YYYYMMDD` key.
fn period_key(period: &str) -> String {
    if period.len() == 8 {
        format!("{}{}", &period[4..], &period[..4])
    } else {
        period.to_string()
    }
}

/// A schedule file found in the archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleEntry {
    /// Schedule name, e.g. `Summary Ratios`.
    pub schedule: String,
    /// Reporting period as `MMDDYYYY`.
    pub period: String,
    /// Zip entry name, or file name inside the directory.
    pub file_name: String,
}

/// Knows where the archive should be and reports precisely when it is not.
#[derive(Debug, Clone)]
pub struct ArchiveLocator {
    path: PathBuf,
}

impl ArchiveLocator {
    /// Creates a locator for the archive at `path` (zip file or directory).
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Expected archive path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns true if something exists at the archive path.
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Opens the archive and checks that every schedule in `required` is present.
    ///
    /// # Errors
    /// Returns [`UbprError::MissingArchive`] if the archive is absent or lacks
    /// one of the required schedules.
    pub fn open_archive<I, S>(&self, required: I) -> UbprResult<UbprArchive>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let required: Vec<String> = required
            .into_iter()
            .map(|s| s.as_ref().to_string())
            .collect();

        if !self.exists() {
            let schedule = required.first().map(String::as_str).unwrap_or("<schedule>");
            return Err(missing_archive(&self.path, schedule));
        }

        let mut archive = UbprArchive::open(&self.path)?;
        for schedule in &required {
            if !archive.has_schedule(schedule) {
                return Err(missing_schedule(&self.path, schedule, archive.schedules()));
            }
        }
        archive.required = required;
        Ok(archive)
    }
}

enum ArchiveSource {
    Zip(ZipArchive<File>),
    Directory,
}

/// An opened UBPR archive indexed by schedule.
pub struct UbprArchive {
    path: PathBuf,
    source: ArchiveSource,
    entries: BTreeMap<String, ScheduleEntry>,
    required: Vec<String>,
}

impl std::fmt::Debug for UbprArchive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self.source {
            ArchiveSource::Zip(_) => "zip",
            ArchiveSource::Directory => "directory",
        };
        f.debug_struct("UbprArchive")
            .field("path", &self.path)
            .field("kind", &kind)
            .field("schedules", &self.entries.len())
            .finish()
    }
}

impl UbprArchive {
    /// Opens and indexes the archive at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> UbprResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(missing_archive(path, "<schedule>"));
        }

        let (source, names) = if path.is_dir() {
            let mut names = Vec::new();
            for entry in fs::read_dir(path)? {
                let entry = entry?;
                if entry.file_type()?.is_file() {
                    names.push(entry.file_name().to_string_lossy().into_owned());
                }
            }
            (ArchiveSource::Directory, names)
        } else {
            let archive = ZipArchive::new(File::open(path)?)?;
            let names = archive
                .file_names()
                .filter(|name| !name.ends_with('/'))
                .map(str::to_string)
                .collect();
            (ArchiveSource::Zip(archive), names)
        };

        let entries = index_entries(names);
        info!(
            "Opened UBPR archive {} ({} schedules)",
            path.display(),
            entries.len()
        );

        Ok(Self {
            path: path.to_path_buf(),
            source,
            entries,
            required: Vec::new(),
        })
    }

    /// Archive path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns true if `schedule` has a file in the archive.
    pub fn has_schedule(&self, schedule: &str) -> bool {
        self.entries.contains_key(schedule)
    }

    /// Lists the schedule files found, ordered by schedule name.
    pub fn schedules(&self) -> impl Iterator<Item = &ScheduleEntry> {
        self.entries.values()
    }

    /// Schedules that were required when the archive was opened.
    pub fn required(&self) -> &[String] {
        &self.required
    }

    /// Opens the schedule file for streaming.
    ///
    /// Each call starts reading from the top of the file.
    ///
    /// # Errors
    /// Returns [`UbprError::MissingArchive`] if the schedule is not present.
    pub fn open_schedule(&mut self, schedule: &str) -> UbprResult<Box<dyn Read + '_>> {
        let Some(entry) = self.entries.get(schedule) else {
            return Err(missing_schedule(&self.path, schedule, self.entries.values()));
        };
        debug!("Opening schedule '{}' from {}", schedule, entry.file_name);

        match &mut self.source {
            ArchiveSource::Zip(archive) => {
                let file = archive.by_name(&entry.file_name)?;
                Ok(Box::new(file))
            }
            ArchiveSource::Directory => {
                let file = File::open(self.path.join(&entry.file_name))?;
                Ok(Box::new(BufReader::new(file)))
            }
        }
    }
}

/// Builds the schedule index, keeping the latest period per schedule.
fn index_entries<I: IntoIterator<Item = String>>(names: I) -> BTreeMap<String, ScheduleEntry> {
    let mut entries: BTreeMap<String, ScheduleEntry> = BTreeMap::new();
    for name in names {
        let Some((schedule, period)) = parse_schedule_file_name(&name) else {
            let base = name.rsplit(['/', '\\']).next().unwrap_or(&name);
            if !base.eq_ignore_ascii_case("readme.txt") {
                warn!("Skipping unrecognized archive entry {}", name);
            }
            continue;
        };

        let candidate = ScheduleEntry {
            schedule: schedule.clone(),
            period,
            file_name: name,
        };
        let replace = match entries.get(&schedule) {
            Some(existing) if period_key(&existing.period) >= period_key(&candidate.period) => {
                info!(
                    "Schedule '{}': keeping period {} over {}",
                    schedule, existing.period, candidate.period
                );
                false
            }
            Some(existing) => {
                info!(
                    "Schedule '{}': using period {} over {}",
                    schedule, candidate.period, existing.period
                );
                true
            }
            None => true,
        };
        if replace {
            entries.insert(schedule, candidate);
        }
    }
    entries
}

fn missing_archive(path: &Path, schedule: &str) -> UbprError {
    let stem = schedule_file_stem(schedule);
    let remediation = format!(
        "No UBPR archive found at {path}.

The schedule file '{stem} <MMDDYYYY>.txt' is required and is read from that archive.
Please download the UBPR bulk file and save it to the path
    {path}
or point the UBPR_ZIP_FILE environment variable at your copy.

You can download the UBPR bulk file as follows:

  1. Go to {UBPR_DOWNLOAD_URL}
  2. Select \"UBPR Ratio -- Single Period\"
  3. Choose the tab delimited format.
  4. Click download to get the file.
",
        path = path.display(),
    );
    UbprError::MissingArchive {
        archive: path.to_path_buf(),
        schedule_file: stem,
        remediation,
    }
}

fn missing_schedule<'a, I>(path: &Path, schedule: &str, available: I) -> UbprError
where
    I: IntoIterator<Item = &'a ScheduleEntry>,
{
    let stem = schedule_file_stem(schedule);
    let available: Vec<&str> = available.into_iter().map(|e| e.schedule.as_str()).collect();
    let available = if available.is_empty() {
        "none".to_string()
    } else {
        available.join(", ")
    };
    let remediation = format!(
        "The UBPR archive at {path} has no file named '{stem} <MMDDYYYY>.txt'.
Schedules present: {available}.

The schedule file is required. Download a fresh copy of the UBPR bulk file
from {UBPR_DOWNLOAD_URL} (\"UBPR Ratio -- Single Period\",
tab delimited format) and save it to
    {path}
",
        path = path.display(),
    );
    UbprError::MissingArchive {
        archive: path.to_path_buf(),
        schedule_file: stem,
        remediation,
    }
}
