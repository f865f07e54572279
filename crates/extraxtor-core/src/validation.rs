//! Input and output path validation performed before any extraction work.

use std::io::ErrorKind;
use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

use tracing::debug;

use crate::Result;
use crate::ValidationError;

/// Absolute input and output paths accepted by [`validate_paths`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedPaths {
    /// Absolute path of the archive file.
    pub input: PathBuf,
    /// Absolute path of the output root. May not exist yet.
    pub output: PathBuf,
}

/// Checks that `input` is a readable non-empty file and that `output` can
/// receive its contents.
///
/// `output` defaults to the current directory. Nothing on disk is modified.
///
/// # Errors
///
/// Returns `ExtractionError::Validation` describing the first failed check,
/// or `ExtractionError::Io` if the current directory or an output listing
/// cannot be read.
///
/// # Examples
///
/// ```no_run
/// use extraxtor_core::validation::validate_paths;
/// use std::path::Path;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let paths = validate_paths(Path::new("data.tar.gz"), Some(Path::new("out")), false)?;
/// assert!(paths.input.is_absolute());
/// # Ok(())
/// # }
/// ```
pub fn validate_paths(input: &Path, output: Option<&Path>, force: bool) -> Result<ValidatedPaths> {
    if input.as_os_str().is_empty() {
        return Err(ValidationError::MissingInput {
            path: input.to_path_buf(),
        }
        .into());
    }

    let input = absolutize(input)?;
    let metadata = std::fs::metadata(&input).map_err(|e| match e.kind() {
        ErrorKind::PermissionDenied => ValidationError::InputUnreadable {
            path: input.clone(),
        },
        _ => ValidationError::MissingInput {
            path: input.clone(),
        },
    })?;

    if metadata.is_dir() {
        return Err(ValidationError::InputIsDirectory { path: input }.into());
    }
    if metadata.len() == 0 {
        return Err(ValidationError::InputEmpty { path: input }.into());
    }
    if let Err(e) = std::fs::File::open(&input) {
        return Err(match e.kind() {
            ErrorKind::PermissionDenied => ValidationError::InputUnreadable { path: input }.into(),
            _ => e.into(),
        });
    }

    let output = absolutize(output.unwrap_or_else(|| Path::new(".")))?;

    if !force && input.parent().is_some_and(|parent| same_dir(parent, &output)) {
        return Err(ValidationError::OutputEqualsInputDirectory { path: output }.into());
    }

    match std::fs::metadata(&output) {
        Ok(meta) if !meta.is_dir() => {
            return Err(ValidationError::OutputIsNotDirectory { path: output }.into());
        }
        Ok(_) if !force && !is_dir_empty(&output)? => {
            return Err(ValidationError::OutputNotEmpty { path: output }.into());
        }
        _ => {}
    }

    debug!(input = %input.display(), output = %output.display(), "input validation completed");
    Ok(ValidatedPaths { input, output })
}

/// Returns `true` if `dir` has no entries. Reads at most one entry.
///
/// # Errors
///
/// Returns an error if `dir` cannot be listed.
pub fn is_dir_empty(dir: &Path) -> std::io::Result<bool> {
    let mut entries = std::fs::read_dir(dir)?;
    Ok(entries.next().is_none())
}

/// Makes `path` absolute against the current directory and removes `.` and
/// `..` components lexically.
fn absolutize(path: &Path) -> std::io::Result<PathBuf> {
    let absolute = std::path::absolute(path)?;
    let mut normalized = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other),
        }
    }
    Ok(normalized)
}

fn same_dir(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
