//! Structured exit codes for machine-readable error handling.
//!
//! Scripts can tell configuration mistakes apart from remote failures
//! without parsing messages.

/// Success (standard convention)
#[allow(dead_code)]
pub const SUCCESS: i32 = 0;

/// General error (fallback for unknown errors)
pub const GENERAL_ERROR: i32 = 1;

/// CLI usage error (invalid arguments, unreadable input file)
pub const USAGE_ERROR: i32 = 2;

/// Configuration error (YAML parse failure, invalid or unsupported property)
pub const CONFIG_ERROR: i32 = 3;

/// Connection error (unknown connection object, remote unreachable)
pub const CONNECTION_ERROR: i32 = 4;

/// Query error (generation, rewrite or type mapping rejected the input)
pub const QUERY_ERROR: i32 = 5;
