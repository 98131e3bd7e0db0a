//! Host platform utility functions

use std::env;
use std::path::PathBuf;

/// Environment variable giving the root of the software tree, which contains the `params` and
/// `sessions` directories.
pub const SW_ROOT_ENV_VAR: &str = "NAV_SW_ROOT";

/// Get the software root directory from the `NAV_SW_ROOT` environment variable.
pub fn get_sw_root() -> Result<PathBuf, env::VarError> {
    env::var(SW_ROOT_ENV_VAR).map(PathBuf::from)
}
