//! Hierarchical item repository interface.
//!
//! A repository is a single-rooted tree of containers holding named items.
//! Item names are not unique. Containers and items are referred to by
//! stable handles that compare by identity, never by name.

mod filesystem;
mod memory;

use std::fmt;

pub use filesystem::{FsRepository, JournalEntry, NameMode};
pub use memory::MemoryRepository;

use crate::error::RepositoryError;

/// Handle to an item in a repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId(pub(crate) usize);

/// Handle to a container in a repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContainerId(pub(crate) usize);

/// Kind of repository entry together with its handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Item(ItemId),
    Container(ContainerId),
}

/// One entry from a full repository scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub kind: EntryKind,
    pub name: String,
    /// Current parent container. `None` only for the root.
    pub parent: Option<ContainerId>,
}

/// Read and write access to a repository.
pub trait Repository {
    /// The root container.
    fn root(&self) -> ContainerId;

    /// All entries in repository order, excluding the root itself.
    fn entries(&self) -> Vec<Entry>;

    /// Current parent of an item.
    ///
    /// # Errors
    /// Returns an error if the item no longer exists.
    fn item_parent(&self, item: ItemId) -> Result<ContainerId, RepositoryError>;

    /// Name of a container.
    fn container_name(&self, container: ContainerId) -> Option<String>;

    /// Parent of a container, `None` for the root.
    fn container_parent(&self, container: ContainerId) -> Option<ContainerId>;

    /// Direct child container of `parent` with exactly the given name.
    fn child_container(&self, parent: ContainerId, name: &str) -> Option<ContainerId>;

    /// Create a new child container.
    ///
    /// # Errors
    /// Returns an error if the container could not be created.
    fn create_container(&mut self, parent: ContainerId, name: &str) -> Result<ContainerId, RepositoryError>;

    /// Move an item into another container.
    ///
    /// # Errors
    /// Returns an error if the item could not be moved.
    fn reparent(&mut self, item: ItemId, destination: ContainerId) -> Result<(), RepositoryError>;

    /// Start a group of changes that is undone as one step.
    fn begin_undo_group(&mut self, label: &str);

    /// Close the group opened by [`Repository::begin_undo_group`].
    fn end_undo_group(&mut self);

    /// Deselect every entry.
    fn clear_selection(&mut self) {}

    /// Mark an item as selected or not.
    ///
    /// # Errors
    /// Backends may fail for individual items; callers treat that as best-effort.
    fn set_selected(&mut self, _item: ItemId, _selected: bool) -> Result<(), RepositoryError> {
        Ok(())
    }

    /// Collapse all containers in the host's tree view.
    /// Returns `false` when the backend has no way to do it.
    fn collapse_all(&mut self) -> bool {
        false
    }
}

/// Scoped undo group: begins on creation and always ends on drop.
pub struct UndoGroup<'a, R: Repository + ?Sized> {
    repository: &'a mut R,
}

impl<'a, R: Repository + ?Sized> UndoGroup<'a, R> {
    pub fn begin(repository: &'a mut R, label: &str) -> Self {
        repository.begin_undo_group(label);
        Self { repository }
    }

    pub fn repository(&mut self) -> &mut R {
        self.repository
    }
}

impl<R: Repository + ?Sized> Drop for UndoGroup<'_, R> {
    fn drop(&mut self) {
        self.repository.end_undo_group();
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "item#{}", self.0)
    }
}

impl fmt::Display for ContainerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "container#{}", self.0)
    }
}
