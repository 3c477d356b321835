//! Query configuration.

use std::path::PathBuf;

use crate::types::ParserConfig;

/// Environment variable overriding the UBPR archive location.
pub const UBPR_ZIP_FILE_ENV: &str = "UBPR_ZIP_FILE";
/// Environment variable overriding the FDIC institutions file location.
pub const FDIC_INST_FILE_ENV: &str = "FDIC_INST_FILE";

/// File name of the archive in the default location.
pub const DEFAULT_ARCHIVE_NAME: &str = "ubpr.zip";
/// File name of the institutions file in the default location.
pub const DEFAULT_INSTITUTIONS_NAME: &str = "fdic_institutions.csv";

/// Locations and parsing options for UBPR queries.
#[derive(Debug, Clone)]
pub struct UbprConfig {
    /// Bulk UBPR zip (or extracted directory).
    pub archive_path: PathBuf,
    /// Local copy of the FDIC institutions CSV.
    pub institutions_file: PathBuf,
    /// Whether inactive institutions are dropped from the directory.
    pub ignore_inactive: bool,
    /// Schedule parser options.
    pub parser: ParserConfig,
}

impl Default for UbprConfig {
    fn default() -> Self {
        let temp = std::env::temp_dir();
        Self {
            archive_path: temp.join(DEFAULT_ARCHIVE_NAME),
            institutions_file: temp.join(DEFAULT_INSTITUTIONS_NAME),
            ignore_inactive: true,
            parser: ParserConfig::default(),
        }
    }
}

impl UbprConfig {
    /// Builds a config from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config, reading overrides through `lookup`.
    ///
    /// Empty values are ignored.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(path) = lookup(UBPR_ZIP_FILE_ENV) {
            config.archive_path = PathBuf::from(path);
        }
        if let Some(path) = lookup(FDIC_INST_FILE_ENV) {
            config.institutions_file = PathBuf::from(path);
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_locations() {
        let config = UbprConfig::default();
        assert!(config.archive_path.ends_with(DEFAULT_ARCHIVE_NAME));
        assert!(config.institutions_file.ends_with(DEFAULT_INSTITUTIONS_NAME));
        assert!(config.ignore_inactive);
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = [
            (UBPR_ZIP_FILE_ENV, "/data/ubpr/bulk.zip"),
            (FDIC_INST_FILE_ENV, " "),
        ]
        .into_iter()
        .collect();
        let config = UbprConfig::from_lookup(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.archive_path, PathBuf::from("/data/ubpr/bulk.zip"));
        assert!(config.institutions_file.ends_with(DEFAULT_INSTITUTIONS_NAME));
    }
}
