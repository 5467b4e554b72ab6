//! Standard exit codes for CLI operations
//!
//! Grouped by failure category: configuration problems in the low range,
//! chart processing outcomes from 10 upward.

#![allow(dead_code)]

/// Success - operation completed without errors
pub const SUCCESS: i32 = 0;

/// General error - unspecified failure
pub const ERROR: i32 = 1;

/// Configuration error - invalid strategy, mappings or threshold
pub const CONFIG_ERROR: i32 = 2;

/// Chart error - chart not found or failed to load
pub const CHART_ERROR: i32 = 4;

/// IO error - file not found, permission denied, etc.
pub const IO_ERROR: i32 = 5;

/// Strict mode failure - unsupported image structures found
pub const UNSUPPORTED_STRUCTURE: i32 = 12;

/// Threshold failure - relocation match rate below the configured minimum
pub const THRESHOLD_NOT_MET: i32 = 13;
