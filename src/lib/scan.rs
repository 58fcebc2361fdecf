use std::path::{Path, PathBuf};

use log::{debug, warn};
use walkdir::WalkDir;

use crate::{block::{BlockRef, parse_slab_dir_name}, errors::ScanError};

/// What to do with a file inside a slab directory that does not follow
/// the `<y>-<numblocks>.blocks` convention, or with an entry that cannot
/// be read at all (a dangling link).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum MalformedPolicy {
    #[default]
    Skip,
    Strict
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skipped {
    pub path: PathBuf,
    pub reason: String
}

impl Skipped {
    fn new(path: &Path, reason: impl Into<String>) -> Self {
        return Self { path: path.to_path_buf(), reason: reason.into() };
    }
}

#[derive(Debug, Default)]
pub struct ScanResult {
    pub blocks: Vec<BlockRef>,
    pub skipped: Vec<Skipped>
}

/// Walks `root` for `<z>.z/<y>-<numblocks>.blocks` payloads.
///
/// Entries one level below `root` that are not `<z>.z` directories are
/// skipped. Files inside slab directories that cannot be decoded are
/// skipped with a warning, or abort the scan under `MalformedPolicy::Strict`.
/// The returned blocks are ordered by z, then y, then block count.
/// * `root` - working directory holding the slab directories
/// * `policy` - handling of malformed block file names
pub fn scan_blocks(root: &Path, policy: MalformedPolicy) -> Result<ScanResult, ScanError> {
    if !root.is_dir() {
        return Err(ScanError::RootNotFound(root.to_path_buf()));
    }

    let mut result = ScanResult::default();

    // Symlinked slab directories and block files are common on shared
    // filesystems, so entries are judged by what they point to.
    let mut walker = WalkDir::new(root)
        .min_depth(1)
        .max_depth(2)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter();

    while let Some(entry) = walker.next() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                // Dangling links and link loops, for example.
                let path = match (policy, e.path().map(Path::to_path_buf)) {
                    (MalformedPolicy::Skip, Some(path)) => path,
                    _ => return Err(ScanError::Walk(e)),
                };
                warn!("Skipping {}: {}", path.display(), e);
                result.skipped.push(Skipped::new(&path, e.to_string()));
                continue;
            }
        };
        let path = entry.path();

        if entry.depth() == 1 {
            if !entry.file_type().is_dir() {
                debug!("Ignoring {}: not a slab directory", path.display());
                result.skipped.push(Skipped::new(path, "not a directory"));
            } else if !is_slab_dir(path) {
                debug!("Ignoring {}: not named <z>.z", path.display());
                result.skipped.push(Skipped::new(path, "directory not named <z>.z"));
                walker.skip_current_dir();
            }
            continue;
        }

        if !entry.file_type().is_file() {
            debug!("Ignoring {}: not a regular file", path.display());
            result.skipped.push(Skipped::new(path, "not a regular file"));
            continue;
        }

        match BlockRef::from_path(path) {
            Ok(block) => result.blocks.push(block),
            Err(e) => match policy {
                MalformedPolicy::Strict => return Err(ScanError::Malformed(path.to_path_buf(), e)),
                MalformedPolicy::Skip => {
                    warn!("Skipping {}: {}", path.display(), e);
                    result.skipped.push(Skipped::new(path, e.to_string()));
                }
            }
        }
    }

    result.blocks.sort_by_key(|b| (b.coord().zyx(), b.num_blocks));
    return Ok(result);
}

fn is_slab_dir(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .and_then(parse_slab_dir_name)
        .is_some()
}
