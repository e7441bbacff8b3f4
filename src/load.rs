//! `.env` file loading.
//!
//! The format is deliberately small: one `KEY=VALUE` per line, both sides
//! trimmed, blank lines and `#` comments skipped. There is no quoting, so
//! `A="x"` keeps its quotes and everything after the first `=` is the value.

use crate::error::LoadError;
use crate::hook;
use once_cell::sync::OnceCell;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Tried in order by [`load_once`] when no paths are given
pub const DEFAULT_PATHS: [&str; 2] = [".env", "/env/.env"];

static LOAD_ONCE: OnceCell<Result<(), LoadError>> = OnceCell::new();

/// Parse env-file text. `origin` names the file in errors.
pub fn parse_env_file(content: &str, origin: &str) -> Result<BTreeMap<String, String>, LoadError> {
    let mut vars = BTreeMap::new();

    for (index, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let invalid = || LoadError::InvalidLine {
            file: origin.to_string(),
            line: index + 1,
        };
        let (key, value) = line.split_once('=').ok_or_else(invalid)?;
        let key = key.trim();
        if key.is_empty() {
            return Err(invalid());
        }
        vars.insert(key.to_string(), value.trim().to_string());
    }

    Ok(vars)
}

/// Read and parse an env file without touching the environment
pub fn read_file(path: impl AsRef<Path>) -> Result<BTreeMap<String, String>, LoadError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| LoadError::io(path, e))?;
    let origin = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    parse_env_file(&content, &origin)
}

/// Write every pair into the process environment, overwriting existing values.
///
/// Keys the platform cannot hold (empty, or containing `=` or NUL) are skipped.
pub fn set_env_vars(vars: &BTreeMap<String, String>) {
    for (key, value) in vars {
        if key.is_empty() || key.contains(['=', '\0']) || value.contains('\0') {
            tracing::warn!(key = %key, "skipping unsettable variable");
            continue;
        }
        std::env::set_var(key, value);
    }
}

/// Read `path` and apply it to the process environment.
/// Returns the number of variables set.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<usize, LoadError> {
    let path = path.as_ref();
    let vars = read_file(path)?;
    set_env_vars(&vars);

    let source = path.display().to_string();
    tracing::debug!(source = %source, keys = vars.len(), "loaded env file");
    hook::call_on_load(&source, vars.len());
    Ok(vars.len())
}

/// Load the first existing regular file among `paths`.
/// No matching file is not an error.
fn load_first<P: AsRef<Path>>(paths: &[P]) -> Result<(), LoadError> {
    let candidates: Vec<&Path> = if paths.is_empty() {
        DEFAULT_PATHS.iter().map(Path::new).collect()
    } else {
        paths.iter().map(AsRef::as_ref).collect()
    };

    match candidates.into_iter().find(|p| p.is_file()) {
        Some(path) => load_from_path(path).map(|_| ()),
        None => {
            tracing::debug!("no env file found");
            Ok(())
        }
    }
}

/// Load an env file once per process.
///
/// Only the first call does any work; every later call returns that call's
/// result regardless of its own `paths`. An empty slice means
/// [`DEFAULT_PATHS`].
pub fn load_once<P: AsRef<Path>>(paths: &[P]) -> Result<(), LoadError> {
    LOAD_ONCE.get_or_init(|| load_first(paths)).clone()
}

/// Like [`load_once`], panicking on errors
pub fn must_load_once<P: AsRef<Path>>(paths: &[P]) {
    if let Err(err) = load_once(paths) {
        panic!("{}", err);
    }
}
