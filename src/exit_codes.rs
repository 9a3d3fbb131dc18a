//! Exit code constants for the detect-node-support CLI.
//!
//! - 0: Success
//! - 1: User error (bad target, missing package, invalid arguments)
//! - 2: Configuration error (invalid imports, unresolvable CI references)
//! - 3: Loader failure (network, filesystem, registry)
//! - 4: Git operation failure

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// User error: bad target, missing package or file, invalid input.
pub const USER_ERROR: i32 = 1;

/// Configuration error: invalid merge mode, commitish or circular import, bad matrix reference.
pub const CONFIG_ERROR: i32 = 2;

/// Loader failure: network, registry or filesystem errors, unparseable documents.
pub const LOADER_FAILURE: i32 = 3;

/// Git operation failure: `rev-parse`, `ls-remote`.
pub const GIT_FAILURE: i32 = 4;
