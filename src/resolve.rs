//! Resolve slash-delimited destination paths to containers.

use crate::error::RepositoryError;
use crate::repository::{ContainerId, Repository};

/// Display label for the root container.
pub const ROOT_LABEL: &str = "Root";

/// Split a destination path into trimmed, non-empty segments.
/// Backslashes are treated as forward slashes.
///
/// ```rust
/// use item_collect::resolve::path_segments;
///
/// assert_eq!(path_segments(r" /Delivery\\ VFX //"), vec!["Delivery", "VFX"]);
/// assert!(path_segments("   ").is_empty());
/// ```
#[must_use]
pub fn path_segments(path: &str) -> Vec<String> {
    path.replace('\\', "/")
        .split('/')
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map(ToString::to_string)
        .collect()
}

/// Find an existing container for `path` under `root` without creating anything.
///
/// Segments match child container names exactly.
/// A blank path resolves to `root`.
#[must_use]
pub fn find_path<R: Repository + ?Sized>(repository: &R, root: ContainerId, path: &str) -> Option<ContainerId> {
    path_segments(path)
        .iter()
        .try_fold(root, |parent, segment| repository.child_container(parent, segment))
}

/// Resolve `path` under `root`, optionally creating missing containers.
///
/// Returns `Ok(None)` when a segment is missing and `create_if_missing` is false.
/// In that case nothing is created.
/// When creating, only the missing tail of the path is added.
///
/// # Errors
/// Returns an error if creating a container fails.
pub fn resolve_path<R: Repository + ?Sized>(
    repository: &mut R,
    root: ContainerId,
    path: &str,
    create_if_missing: bool,
) -> Result<Option<ContainerId>, RepositoryError> {
    if !create_if_missing {
        return Ok(find_path(&*repository, root, path));
    }

    let mut current = root;
    for segment in path_segments(path) {
        current = match repository.child_container(current, &segment) {
            Some(existing) => existing,
            None => repository.create_container(current, &segment)?,
        };
    }
    Ok(Some(current))
}

/// Human-readable path of a container relative to `root`.
///
/// Returns [`ROOT_LABEL`] for the root itself.
#[must_use]
pub fn path_string<R: Repository + ?Sized>(repository: &R, container: ContainerId, root: ContainerId) -> String {
    if container == root {
        return ROOT_LABEL.to_string();
    }
    let mut names = Vec::new();
    let mut current = Some(container);
    while let Some(id) = current {
        if id == root {
            break;
        }
        if let Some(name) = repository.container_name(id) {
            names.push(name);
        }
        current = repository.container_parent(id);
    }
    names.reverse();
    names.join("/")
}
