//! Locating an executable on `PATH`, the way the original implementation's
//! launcher resolves `wpa_supplicant`/`wpa_cli` before spawning them.

use std::{
  env,
  path::{Path, PathBuf},
};

/// Searches each `:`-separated directory in `path_var` (in order) for a file
/// literally named `name`, returning the first one that exists. Returns
/// `None` if `path_var` is empty or no directory contains `name`.
pub fn search_path(path_var: &str, name: &str) -> Option<PathBuf> {
  path_var
    .split(':')
    .filter(|dir| !dir.is_empty())
    .map(|dir| Path::new(dir).join(name))
    .find(|candidate| candidate.is_file())
}

/// Convenience wrapper over [`search_path`] that reads `PATH` from the
/// process environment.
pub fn search_env_path(name: &str) -> Option<PathBuf> {
  let path_var = env::var("PATH").ok()?;
  search_path(&path_var, name)
}
