//! Checks a candidate document must pass before it can be served.

use std::collections::HashSet;

use crate::remote_config::document::ConfigFile;
use crate::remote_config::error::ValidationFailure;

/// Ensure every file name is distinct.
///
/// Scans left to right and reports the first name seen twice.
pub fn ensure_unique_names(files: &[ConfigFile]) -> Result<(), ValidationFailure> {
    let mut seen = HashSet::with_capacity(files.len());
    for file in files {
        if !seen.insert(file.name.as_str()) {
            return Err(ValidationFailure::DuplicateName(file.name.clone()));
        }
    }
    Ok(())
}
