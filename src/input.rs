//! Technician identifiers supplied by the operator.

use std::{collections::HashSet, fs, path::Path};

use crate::error::{Error, Result};

/// Read identifiers from a file, one per line.
///
/// Blank lines and lines starting with `#` are ignored.
pub fn read_identifier_file(path: &Path) -> Result<Vec<String>> {
    let contents = fs::read_to_string(path).map_err(|source| Error::IdentifierFileRead {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect())
}

/// Trim identifiers and drop blanks and repeats, keeping first-seen order.
pub fn dedup_identifiers<I, S>(identifiers: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    identifiers
        .into_iter()
        .filter_map(|identifier| {
            let trimmed = identifier.as_ref().trim();
            (!trimmed.is_empty() && seen.insert(trimmed.to_string())).then(|| trimmed.to_string())
        })
        .collect()
}

/// Merge command-line identifiers with an optional file.
///
/// Fails with [`Error::NoTechnicians`] when nothing remains.
pub fn collect_identifiers(arguments: &[String], file: Option<&Path>) -> Result<Vec<String>> {
    let mut all = arguments.to_vec();
    if let Some(path) = file {
        all.extend(read_identifier_file(path)?);
    }
    let identifiers = dedup_identifiers(all);
    if identifiers.is_empty() {
        return Err(Error::NoTechnicians);
    }
    Ok(identifiers)
}
