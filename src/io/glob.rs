//! Input path expansion for batch runs.
//!
//! Command-line inputs may be plain paths or glob patterns such as
//! `uploads/*.xlsx`. Patterns expand to files only, in sorted order, so a
//! batch always processes its inputs deterministically.

use anyhow::{Context, Result, bail};
use glob::glob;
use std::path::PathBuf;

/// Expand a glob pattern into a sorted vector of matching file paths.
///
/// Directories are skipped. No match yields an empty vector.
///
/// # Errors
/// Returns an error if the pattern is invalid or a matched entry cannot be read.
pub fn expand_glob(pattern: &str) -> Result<Vec<PathBuf>> {
    let paths = glob(pattern).with_context(|| format!("invalid glob pattern: {pattern}"))?;

    let mut result = Vec::new();
    for entry in paths {
        let path =
            entry.with_context(|| format!("error reading glob entry for pattern: {pattern}"))?;
        if path.is_file() {
            result.push(path);
        }
    }
    result.sort();
    Ok(result)
}

/// Like [`expand_glob`], but zero matches is an error.
///
/// # Errors
/// Returns an error if the pattern is invalid or matches no file.
pub fn expand_glob_required(pattern: &str) -> Result<Vec<PathBuf>> {
    let files = expand_glob(pattern)?;
    if files.is_empty() {
        bail!("no files found matching pattern: {pattern}");
    }
    Ok(files)
}

/// Whether `arg` contains glob metacharacters.
#[must_use]
pub fn is_pattern(arg: &str) -> bool {
    arg.contains(['*', '?', '['])
}

/// Resolve command-line inputs: patterns are expanded, plain paths pass through.
///
/// Order follows the arguments; within one pattern, matches are sorted.
///
/// # Errors
/// Returns an error for an invalid pattern or one that matches nothing.
pub fn expand_inputs<S: AsRef<str>>(args: &[S]) -> Result<Vec<PathBuf>> {
    let mut out = Vec::with_capacity(args.len());
    for arg in args {
        let arg = arg.as_ref();
        if is_pattern(arg) {
            out.extend(expand_glob_required(arg)?);
        } else {
            out.push(PathBuf::from(arg));
        }
    }
    Ok(out)
}
