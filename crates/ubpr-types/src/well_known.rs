//! Well-known UBPR metric codes and schedule names.
//!
//! The bulk "UBPR Ratio -- Single Period" download is split into one
//! tab-delimited file per report page (schedule). These constants name the
//! schedules and the metric codes the loader knows how to locate out of the
//! box.
//!
//! # Examples
//!
//! ```
//! use ubpr_types::well_known;
//!
//! assert_eq!(well_known::UBPRE569, "UBPRE569");
//! assert!(well_known::DEFAULT_CODES.contains(&well_known::UBPRE567));
//! ```

// =============================================================================
// Schedules
// =============================================================================

/// Summary ratios page, home of the overall risk indicators.
pub const SUMMARY_RATIOS: &str = "Summary Ratios";

/// Interest rate risk analysis page.
pub const INTEREST_RATE_RISK: &str = "Interest Rate Risk Analysis";

// =============================================================================
// Overall risk indicators
// =============================================================================

/// Off-balance-sheet items as a percent of assets (overall risk indicators).
pub const UBPRE567: &str = "UBPRE567";

/// Unrealized appreciation/depreciation (overall risk indicators).
pub const UBPRE568: &str = "UBPRE568";

/// Unrealized appreciation/depreciation as a percent of tier one capital.
pub const UBPRE569: &str = "UBPRE569";

// =============================================================================
// Interest rate risk
// =============================================================================

/// Unrealized appreciation/depreciation on held-to-maturity securities as a
/// percent of the securities' amortized cost.
pub const UBPRM037: &str = "UBPRM037";

/// Metric codes requested when a caller does not name any.
pub const DEFAULT_CODES: &[&str] = &[UBPRE567, UBPRE568, UBPRE569];
