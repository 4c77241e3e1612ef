//! Filesystem-backed repository.
//!
//! Directories under the root are containers and regular files are items.
//! Hidden entries are skipped.

use std::collections::{BTreeSet, HashMap};
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use unicode_normalization::UnicodeNormalization;
use walkdir::WalkDir;

use crate::error::RepositoryError;
use crate::repository::{ContainerId, Entry, EntryKind, ItemId, Repository};

/// Which part of a file name is used as the item name.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum NameMode {
    /// Full file name including extension.
    #[default]
    FileName,
    /// File name without the extension.
    Stem,
}

/// A file moved during the last undo group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JournalEntry {
    pub from: PathBuf,
    pub to: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NodeKind {
    File,
    Directory,
}

#[derive(Debug)]
struct FsNode {
    /// Name used for matching.
    name: String,
    /// Name on disk.
    file_name: OsString,
    parent: Option<usize>,
    kind: NodeKind,
}

/// Repository rooted at a directory.
#[derive(Debug)]
pub struct FsRepository {
    root: PathBuf,
    nodes: Vec<FsNode>,
    group_label: Option<String>,
    journal: Vec<JournalEntry>,
    selected: BTreeSet<usize>,
}

impl FsRepository {
    /// Scan the directory tree under `root`.
    ///
    /// # Errors
    /// Returns an error if the directory tree cannot be read.
    pub fn open(root: &Path, name_mode: NameMode) -> Result<Self, RepositoryError> {
        let mut nodes = vec![FsNode {
            name: crate::get_normalized_dir_name(root).unwrap_or_default(),
            file_name: OsString::new(),
            parent: None,
            kind: NodeKind::Directory,
        }];
        let mut indices: HashMap<PathBuf, usize> = HashMap::from([(root.to_path_buf(), 0)]);

        let walker = WalkDir::new(root)
            .min_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !crate::is_hidden(e));

        for entry in walker {
            let entry = entry.map_err(|error| RepositoryError::Io {
                path: error.path().map_or_else(|| root.to_path_buf(), Path::to_path_buf),
                source: io::Error::from(error),
            })?;
            let file_type = entry.file_type();
            let kind = if file_type.is_dir() {
                NodeKind::Directory
            } else if file_type.is_file() {
                NodeKind::File
            } else {
                continue;
            };

            let Some(&parent) = entry.path().parent().and_then(|parent| indices.get(parent)) else {
                continue;
            };

            let file_name = entry.file_name().to_os_string();
            let name = match (kind, name_mode) {
                (NodeKind::File, NameMode::Stem) => crate::path_to_file_stem_string(entry.path()).nfc().collect(),
                _ => crate::os_str_to_string(&file_name).nfc().collect(),
            };

            nodes.push(FsNode {
                name,
                file_name,
                parent: Some(parent),
                kind,
            });
            if kind == NodeKind::Directory {
                indices.insert(entry.into_path(), nodes.len() - 1);
            }
        }

        Ok(Self {
            root: root.to_path_buf(),
            nodes,
            group_label: None,
            journal: Vec::new(),
            selected: BTreeSet::new(),
        })
    }

    /// Root directory of the repository.
    #[must_use]
    pub fn root_path(&self) -> &Path {
        &self.root
    }

    /// Current path of an item.
    #[must_use]
    pub fn item_path(&self, item: ItemId) -> Option<PathBuf> {
        self.node(item.0, NodeKind::File).map(|_| self.path_of(item.0))
    }

    /// Current path of a container.
    #[must_use]
    pub fn container_path(&self, container: ContainerId) -> Option<PathBuf> {
        self.node(container.0, NodeKind::Directory)
            .map(|_| self.path_of(container.0))
    }

    /// Files moved during the most recent undo group.
    #[must_use]
    pub fn journal(&self) -> &[JournalEntry] {
        &self.journal
    }

    /// Label of the open or most recent undo group.
    #[must_use]
    pub fn group_label(&self) -> Option<&str> {
        self.group_label.as_deref()
    }

    /// Paths of the selected items.
    #[must_use]
    pub fn selected_paths(&self) -> Vec<PathBuf> {
        self.selected.iter().map(|&index| self.path_of(index)).collect()
    }

    fn node(&self, index: usize, kind: NodeKind) -> Option<&FsNode> {
        self.nodes.get(index).filter(|node| node.kind == kind)
    }

    fn path_of(&self, index: usize) -> PathBuf {
        let mut parts = Vec::new();
        let mut current = Some(index);
        while let Some(i) = current {
            let node = &self.nodes[i];
            if node.parent.is_some() {
                parts.push(node.file_name.as_os_str());
            }
            current = node.parent;
        }
        let mut path = self.root.clone();
        path.extend(parts.into_iter().rev());
        path
    }
}

impl Repository for FsRepository {
    fn root(&self) -> ContainerId {
        ContainerId(0)
    }

    fn entries(&self) -> Vec<Entry> {
        self.nodes
            .iter()
            .enumerate()
            .skip(1)
            .map(|(index, node)| Entry {
                kind: match node.kind {
                    NodeKind::File => EntryKind::Item(ItemId(index)),
                    NodeKind::Directory => EntryKind::Container(ContainerId(index)),
                },
                name: node.name.clone(),
                parent: node.parent.map(ContainerId),
            })
            .collect()
    }

    fn item_parent(&self, item: ItemId) -> Result<ContainerId, RepositoryError> {
        self.node(item.0, NodeKind::File)
            .and_then(|node| node.parent)
            .map(ContainerId)
            .ok_or(RepositoryError::ItemNotFound(item))
    }

    fn container_name(&self, container: ContainerId) -> Option<String> {
        self.node(container.0, NodeKind::Directory).map(|node| node.name.clone())
    }

    fn container_parent(&self, container: ContainerId) -> Option<ContainerId> {
        self.node(container.0, NodeKind::Directory)
            .and_then(|node| node.parent)
            .map(ContainerId)
    }

    fn child_container(&self, parent: ContainerId, name: &str) -> Option<ContainerId> {
        self.nodes
            .iter()
            .position(|node| node.kind == NodeKind::Directory && node.parent == Some(parent.0) && node.name == name)
            .map(ContainerId)
    }

    fn create_container(&mut self, parent: ContainerId, name: &str) -> Result<ContainerId, RepositoryError> {
        if self.node(parent.0, NodeKind::Directory).is_none() {
            return Err(RepositoryError::ContainerNotFound(parent));
        }
        let path = self.path_of(parent.0).join(name);
        if name == "." || name == ".." {
            return Err(RepositoryError::Io {
                path,
                source: io::Error::new(io::ErrorKind::InvalidInput, "invalid directory name"),
            });
        }
        fs::create_dir(&path).map_err(|source| RepositoryError::Io { path, source })?;

        self.nodes.push(FsNode {
            name: name.nfc().collect(),
            file_name: OsString::from(name),
            parent: Some(parent.0),
            kind: NodeKind::Directory,
        });
        Ok(ContainerId(self.nodes.len() - 1))
    }

    fn reparent(&mut self, item: ItemId, destination: ContainerId) -> Result<(), RepositoryError> {
        if self.node(item.0, NodeKind::File).is_none() {
            return Err(RepositoryError::ItemNotFound(item));
        }
        if self.node(destination.0, NodeKind::Directory).is_none() {
            return Err(RepositoryError::ContainerNotFound(destination));
        }

        let from = self.path_of(item.0);
        if !from.is_file() {
            return Err(RepositoryError::ItemNotFound(item));
        }
        let to = self.path_of(destination.0).join(&self.nodes[item.0].file_name);
        if to.exists() {
            return Err(RepositoryError::AlreadyExists {
                name: crate::path_to_filename_string(&to),
            });
        }

        fs::rename(&from, &to).map_err(|source| RepositoryError::Io {
            path: from.clone(),
            source,
        })?;

        self.nodes[item.0].parent = Some(destination.0);
        if self.group_label.is_some() {
            self.journal.push(JournalEntry { from, to });
        }
        Ok(())
    }

    fn begin_undo_group(&mut self, label: &str) {
        self.group_label = Some(label.to_string());
        self.journal.clear();
    }

    fn end_undo_group(&mut self) {
        self.group_label = None;
    }

    fn clear_selection(&mut self) {
        self.selected.clear();
    }

    fn set_selected(&mut self, item: ItemId, selected: bool) -> Result<(), RepositoryError> {
        if self.node(item.0, NodeKind::File).is_none() {
            return Err(RepositoryError::ItemNotFound(item));
        }
        if selected {
            self.selected.insert(item.0);
        } else {
            self.selected.remove(&item.0);
        }
        Ok(())
    }
}
