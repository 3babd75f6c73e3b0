//! Input validation utilities
//!
//! Common validation for command-line parameters and file paths with
//! consistent error messages, using the structured error types from
//! [`crate::errors`].

use crate::errors::{GafSortError, Result};
use std::path::Path;

/// Validate that a file exists
///
/// # Arguments
/// * `path` - Path to validate
/// * `description` - Human-readable description of the file (e.g., "Input GAF")
///
/// # Errors
/// Returns an error if the file does not exist
///
/// # Example
/// ```
/// use gafsort_lib::validation::validate_file_exists;
///
/// let result = validate_file_exists("/nonexistent/file.gaf", "Input GAF");
/// assert!(result.is_err());
/// ```
pub fn validate_file_exists<P: AsRef<Path>>(path: P, description: &str) -> Result<()> {
    let path_ref = path.as_ref();
    if !path_ref.exists() {
        return Err(GafSortError::MissingFile {
            description: description.to_string(),
            path: path_ref.display().to_string(),
        });
    }
    Ok(())
}

/// Validate that multiple files exist
///
/// # Errors
/// Returns an error for the first file that doesn't exist
pub fn validate_files_exist<P: AsRef<Path>>(files: &[(P, &str)]) -> Result<()> {
    for (path, desc) in files {
        validate_file_exists(path, desc)?;
    }
    Ok(())
}
