//! Removal of redundant single-directory wrappers.
//!
//! Many archives wrap their payload in one top-level directory, sometimes
//! several levels deep (`project-1.0/project-1.0/src/...`). The
//! [`Flattener`] hoists the contents of such wrappers into the root until
//! the root holds something other than a single non-empty directory.
//!
//! Moves use `rename` and fall back to copy-then-delete when the rename
//! fails, e.g. across filesystems.

use std::ffi::OsString;
use std::fs;
use std::fs::File;
use std::path::Path;
use std::path::PathBuf;

use filetime::FileTime;
use tracing::debug;
use tracing::info;
use tracing::warn;
use walkdir::WalkDir;

use crate::ExtractionError;
use crate::Result;
use crate::config::DEFAULT_MAX_FLATTEN_ITERATIONS;
use crate::copy::CopyBuffer;
use crate::copy::copy_with_buffer;
use crate::validation::is_dir_empty;

/// Result of a [`Flattener::flatten`] pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlattenOutcome {
    /// Number of wrapper directories removed.
    pub dirs_flattened: usize,
    /// `true` if the pass stopped at the iteration cap with a wrapper left.
    pub hit_iteration_cap: bool,
    /// Conflicts and failures encountered, one message each.
    pub warnings: Vec<String>,
}

/// Result of moving the children of one directory into another.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MoveSummary {
    /// Children moved successfully.
    pub moved: usize,
    /// Children left in place because the destination already existed.
    pub skipped: Vec<String>,
    /// Children that could not be moved, with the reason.
    pub failed: Vec<String>,
    /// `true` if the emptied source directory was removed.
    pub source_removed: bool,
}

impl MoveSummary {
    /// Returns `true` if every child was moved.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty() && self.failed.is_empty()
    }

    /// Human-readable messages for every skipped or failed child.
    #[must_use]
    pub fn warnings(&self) -> Vec<String> {
        self.skipped
            .iter()
            .map(|name| format!("destination exists, skipped: {name}"))
            .chain(self.failed.iter().map(|msg| format!("failed to move {msg}")))
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MoveOutcome {
    Moved,
    Skipped,
}

/// Collapses nested single-directory wrappers.
///
/// # Examples
///
/// ```no_run
/// use extraxtor_core::flatten::Flattener;
/// use std::path::Path;
///
/// let outcome = Flattener::new(false, 10).flatten(Path::new("/tmp/staging"));
/// println!("flattened {} directories", outcome.dirs_flattened);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Flattener {
    force: bool,
    max_iterations: usize,
}

impl Default for Flattener {
    fn default() -> Self {
        Self::new(false, DEFAULT_MAX_FLATTEN_ITERATIONS)
    }
}

impl Flattener {
    /// Creates a flattener.
    ///
    /// With `force`, children whose names already exist one level up replace
    /// the existing entries; otherwise they are skipped.
    #[must_use]
    pub fn new(force: bool, max_iterations: usize) -> Self {
        Self {
            force,
            max_iterations,
        }
    }

    /// Flattens `root` in place. Never fails: problems end the pass early
    /// and are reported as warnings.
    pub fn flatten(&self, root: &Path) -> FlattenOutcome {
        let mut outcome = FlattenOutcome::default();

        for _ in 0..self.max_iterations {
            let Some(wrapper) = sole_wrapper(root) else {
                break;
            };
            info!(dir = %display_name(&wrapper), "flattening");

            match self.unwrap(&wrapper, root) {
                Ok(summary) => {
                    outcome.warnings.extend(summary.warnings());
                    if !summary.source_removed {
                        break;
                    }
                    outcome.dirs_flattened += 1;
                }
                Err(e) => {
                    warn!(dir = %wrapper.display(), error = %e, "flattening stopped");
                    outcome.warnings.push(format!("flattening stopped at {}: {e}", display_name(&wrapper)));
                    break;
                }
            }
        }

        if outcome.dirs_flattened == self.max_iterations && sole_wrapper(root).is_some() {
            warn!(max = self.max_iterations, "flatten iteration cap reached");
            outcome.hit_iteration_cap = true;
        }

        if outcome.dirs_flattened > 0 {
            info!(count = outcome.dirs_flattened, "flattened directories");
        }
        outcome
    }

    /// Moves every child of `wrapper` into `dest` and removes `wrapper` if it
    /// ends up empty.
    ///
    /// A child named like the wrapper itself is handled by first renaming
    /// the wrapper to an unused sibling name, so the child never collides
    /// with its own parent. Moving stops at the first child that fails.
    ///
    /// # Errors
    ///
    /// Returns an error if `wrapper` cannot be listed or renamed.
    pub fn unwrap(&self, wrapper: &Path, dest: &Path) -> Result<MoveSummary> {
        let mut wrapper = wrapper.to_path_buf();
        let children = sorted_children(&wrapper)?;

        if let Some(name) = wrapper.file_name()
            && children.iter().any(|child| child == name)
            && dest.join(name) == wrapper
        {
            let renamed = unique_sibling(&wrapper);
            debug!(from = %wrapper.display(), to = %renamed.display(), "renaming wrapper that contains its own name");
            fs::rename(&wrapper, &renamed)?;
            wrapper = renamed;
        }

        let mut summary = MoveSummary::default();
        for name in &children {
            let src = wrapper.join(name);
            let dst = dest.join(name);
            let label = name.to_string_lossy();

            match move_child(&src, &dst, self.force) {
                Ok(MoveOutcome::Moved) => summary.moved += 1,
                Ok(MoveOutcome::Skipped) => {
                    warn!(entry = %label, "destination exists, skipping");
                    summary.skipped.push(label.into_owned());
                }
                Err(e) => {
                    warn!(entry = %label, error = %e, "failed to move");
                    summary.failed.push(format!("{label}: {e}"));
                    break;
                }
            }
        }

        if summary.is_complete() {
            match fs::remove_dir(&wrapper) {
                Ok(()) => summary.source_removed = true,
                Err(e) => {
                    warn!(dir = %wrapper.display(), error = %e, "failed to remove wrapper");
                }
            }
        }

        Ok(summary)
    }
}

/// Moves every child of `src_dir` into `dst_dir`, creating `dst_dir` first.
///
/// Existing destinations are skipped unless `force`, in which case they are
/// removed before the move. Failures are collected and do not stop the
/// remaining moves. `src_dir` itself is left in place.
///
/// # Errors
///
/// Returns an error if `dst_dir` cannot be created or `src_dir` listed.
pub fn move_contents(src_dir: &Path, dst_dir: &Path, force: bool) -> Result<MoveSummary> {
    fs::create_dir_all(dst_dir)?;
    let children = sorted_children(src_dir)?;
    debug!(count = children.len(), from = %src_dir.display(), to = %dst_dir.display(), "moving contents");

    let mut summary = MoveSummary::default();
    for name in &children {
        let label = name.to_string_lossy();
        match move_child(&src_dir.join(name), &dst_dir.join(name), force) {
            Ok(MoveOutcome::Moved) => {
                debug!(entry = %label, "moved");
                summary.moved += 1;
            }
            Ok(MoveOutcome::Skipped) => {
                warn!(entry = %label, "destination exists, skipping");
                summary.skipped.push(label.into_owned());
            }
            Err(e) => {
                warn!(entry = %label, error = %e, "failed to move");
                summary.failed.push(format!("{label}: {e}"));
            }
        }
    }

    Ok(summary)
}

/// Moves `src` to `dst`, copying and deleting the source if `rename` fails.
///
/// # Errors
///
/// Returns an error if both the rename and the copy fallback fail.
pub fn move_path(src: &Path, dst: &Path) -> Result<()> {
    match fs::rename(src, dst) {
        Ok(()) => Ok(()),
        Err(e) => {
            debug!(src = %src.display(), error = %e, "rename failed, copying instead");
            copy_and_remove(src, dst)
        }
    }
}

/// Copies `src` (file or directory tree) to `dst`, then removes `src`.
///
/// Files keep their permissions and modification time. Directories are
/// created with default permissions and receive the source's permissions
/// and times once their contents are in place.
///
/// # Errors
///
/// Returns an error if any copy step or the final removal fails. A failed
/// copy leaves `src` untouched.
pub fn copy_and_remove(src: &Path, dst: &Path) -> Result<()> {
    let metadata = fs::symlink_metadata(src)?;
    let mut buffer = CopyBuffer::new();

    if metadata.is_dir() {
        copy_tree(src, dst, &mut buffer)?;
        fs::remove_dir_all(src)?;
    } else {
        copy_file(src, dst, &mut buffer)?;
        fs::remove_file(src)?;
    }
    Ok(())
}

fn copy_tree(src: &Path, dst: &Path, buffer: &mut CopyBuffer) -> Result<()> {
    let mut dirs = Vec::new();

    for entry in WalkDir::new(src).follow_links(false) {
        let entry = entry.map_err(|e| ExtractionError::Io(e.into()))?;
        let relative = entry
            .path()
            .strip_prefix(src)
            .map_err(|e| ExtractionError::Io(std::io::Error::other(e)))?;
        let target = dst.join(relative);
        let file_type = entry.file_type();

        if file_type.is_dir() {
            fs::create_dir_all(&target)?;
            dirs.push((entry.path().to_path_buf(), target));
        } else if file_type.is_file() {
            copy_file(entry.path(), &target, buffer)?;
        } else {
            debug!(path = %entry.path().display(), "not copying special file");
        }
    }

    // Deepest first, so finishing a child does not disturb its parent's times.
    for (source, target) in dirs.iter().rev() {
        let metadata = fs::metadata(source)?;
        fs::set_permissions(target, metadata.permissions())?;
        filetime::set_file_times(
            target,
            FileTime::from_last_access_time(&metadata),
            FileTime::from_last_modification_time(&metadata),
        )?;
    }
    Ok(())
}

fn copy_file(src: &Path, dst: &Path, buffer: &mut CopyBuffer) -> Result<()> {
    let mut input = File::open(src)?;
    if let Some(parent) = dst.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut output = File::create(dst)?;
    copy_with_buffer(&mut input, &mut output, buffer)?;
    drop(output);

    let metadata = input.metadata()?;
    fs::set_permissions(dst, metadata.permissions())?;
    filetime::set_file_times(
        dst,
        FileTime::from_last_access_time(&metadata),
        FileTime::from_last_modification_time(&metadata),
    )?;
    Ok(())
}

fn move_child(src: &Path, dst: &Path, force: bool) -> Result<MoveOutcome> {
    if let Ok(existing) = fs::symlink_metadata(dst) {
        if !force {
            return Ok(MoveOutcome::Skipped);
        }
        if existing.is_dir() {
            fs::remove_dir_all(dst)?;
        } else {
            fs::remove_file(dst)?;
        }
        debug!(path = %dst.display(), "removed existing entry");
    }

    move_path(src, dst)?;
    Ok(MoveOutcome::Moved)
}

/// Returns the root's only child if it is a non-empty directory and the root
/// holds nothing else.
fn sole_wrapper(root: &Path) -> Option<PathBuf> {
    let entries = match fs::read_dir(root) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(dir = %root.display(), error = %e, "cannot read directory for flattening");
            return None;
        }
    };

    let mut wrapper = None;
    for entry in entries {
        let entry = entry.ok()?;
        if !entry.file_type().ok()?.is_dir() || wrapper.is_some() {
            return None;
        }
        wrapper = Some(entry.path());
    }

    let wrapper = wrapper?;
    match is_dir_empty(&wrapper) {
        Ok(false) => Some(wrapper),
        _ => None,
    }
}

fn sorted_children(dir: &Path) -> Result<Vec<OsString>> {
    let mut children = fs::read_dir(dir)?
        .map(|entry| entry.map(|e| e.file_name()))
        .collect::<std::io::Result<Vec<_>>>()?;
    children.sort();
    Ok(children)
}

fn unique_sibling(path: &Path) -> PathBuf {
    let base = path.file_name().map(OsString::from).unwrap_or_default();
    let mut n = 0u32;
    loop {
        let mut name = base.clone();
        name.push(format!(".extraxtor-{n}"));
        let candidate = path.with_file_name(name);
        if fs::symlink_metadata(&candidate).is_err() {
            return candidate;
        }
        n += 1;
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned())
}
