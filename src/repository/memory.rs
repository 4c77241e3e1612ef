//! In-memory repository.

use std::collections::HashSet;
use std::io;
use std::path::PathBuf;

use crate::error::RepositoryError;
use crate::repository::{ContainerId, Entry, EntryKind, ItemId, Repository};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NodeKind {
    Item,
    Container,
}

#[derive(Debug, Clone)]
struct Node {
    name: String,
    parent: Option<usize>,
    kind: NodeKind,
    removed: bool,
    selected: bool,
}

#[derive(Debug, Clone, Copy)]
enum Change {
    Moved { item: usize, from: usize },
    Created { container: usize },
}

#[derive(Debug)]
struct ChangeGroup {
    label: String,
    changes: Vec<Change>,
}

/// Repository kept entirely in memory.
///
/// Entries are returned in insertion order.
/// Supports undo groups, selection and simulated failures.
#[derive(Debug)]
pub struct MemoryRepository {
    nodes: Vec<Node>,
    open_group: Option<ChangeGroup>,
    undo_stack: Vec<ChangeGroup>,
    groups_closed: usize,
    collapsed: bool,
    failing_items: HashSet<usize>,
    poison_after: Option<usize>,
    reparent_calls: usize,
}

impl MemoryRepository {
    /// Create an empty repository with only the root container.
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                name: String::new(),
                parent: None,
                kind: NodeKind::Container,
                removed: false,
                selected: false,
            }],
            open_group: None,
            undo_stack: Vec::new(),
            groups_closed: 0,
            collapsed: false,
            failing_items: HashSet::new(),
            poison_after: None,
            reparent_calls: 0,
        }
    }

    /// Add a container under `parent`. Does not check for existing names.
    pub fn add_container(&mut self, parent: ContainerId, name: &str) -> ContainerId {
        ContainerId(self.push_node(name, parent, NodeKind::Container))
    }

    /// Add an item under `parent`.
    pub fn add_item(&mut self, parent: ContainerId, name: &str) -> ItemId {
        ItemId(self.push_node(name, parent, NodeKind::Item))
    }

    /// Delete an item, as if something else removed it after scanning.
    pub fn remove_item(&mut self, item: ItemId) {
        if let Some(node) = self.nodes.get_mut(item.0) {
            node.removed = true;
        }
    }

    /// Name of an item.
    #[must_use]
    pub fn item_name(&self, item: ItemId) -> Option<&str> {
        self.item_node(item).map(|node| node.name.as_str())
    }

    /// Currently selected items in repository order.
    #[must_use]
    pub fn selected_items(&self) -> Vec<ItemId> {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| node.kind == NodeKind::Item && !node.removed && node.selected)
            .map(|(index, _)| ItemId(index))
            .collect()
    }

    /// Number of containers including the root.
    #[must_use]
    pub fn container_count(&self) -> usize {
        self.nodes
            .iter()
            .filter(|node| node.kind == NodeKind::Container && !node.removed)
            .count()
    }

    #[must_use]
    pub const fn is_collapsed(&self) -> bool {
        self.collapsed
    }

    #[must_use]
    pub const fn in_undo_group(&self) -> bool {
        self.open_group.is_some()
    }

    #[must_use]
    pub const fn undo_groups_closed(&self) -> usize {
        self.groups_closed
    }

    /// Label of the most recent undoable group.
    #[must_use]
    pub fn last_undo_label(&self) -> Option<&str> {
        self.undo_stack.last().map(|group| group.label.as_str())
    }

    /// Revert the most recently closed undo group.
    /// Returns `false` if there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        let Some(group) = self.undo_stack.pop() else {
            return false;
        };
        for change in group.changes.into_iter().rev() {
            match change {
                Change::Moved { item, from } => self.nodes[item].parent = Some(from),
                Change::Created { container } => self.nodes[container].removed = true,
            }
        }
        true
    }

    /// Make every move of this item fail.
    pub fn fail_on(&mut self, item: ItemId) {
        self.failing_items.insert(item.0);
    }

    /// Make the repository unavailable after `count` successful reparent calls.
    pub const fn poison_after(&mut self, count: usize) {
        self.poison_after = Some(count);
    }

    fn push_node(&mut self, name: &str, parent: ContainerId, kind: NodeKind) -> usize {
        self.nodes.push(Node {
            name: name.to_string(),
            parent: Some(parent.0),
            kind,
            removed: false,
            selected: false,
        });
        self.nodes.len() - 1
    }

    fn item_node(&self, item: ItemId) -> Option<&Node> {
        self.nodes
            .get(item.0)
            .filter(|node| node.kind == NodeKind::Item && !node.removed)
    }

    fn container_node(&self, container: ContainerId) -> Option<&Node> {
        self.nodes
            .get(container.0)
            .filter(|node| node.kind == NodeKind::Container && !node.removed)
    }

    fn record(&mut self, change: Change) {
        if let Some(group) = self.open_group.as_mut() {
            group.changes.push(change);
        }
    }
}

impl Default for MemoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl Repository for MemoryRepository {
    fn root(&self) -> ContainerId {
        ContainerId(0)
    }

    fn entries(&self) -> Vec<Entry> {
        self.nodes
            .iter()
            .enumerate()
            .skip(1)
            .filter(|(_, node)| !node.removed)
            .map(|(index, node)| Entry {
                kind: match node.kind {
                    NodeKind::Item => EntryKind::Item(ItemId(index)),
                    NodeKind::Container => EntryKind::Container(ContainerId(index)),
                },
                name: node.name.clone(),
                parent: node.parent.map(ContainerId),
            })
            .collect()
    }

    fn item_parent(&self, item: ItemId) -> Result<ContainerId, RepositoryError> {
        self.item_node(item)
            .and_then(|node| node.parent)
            .map(ContainerId)
            .ok_or(RepositoryError::ItemNotFound(item))
    }

    fn container_name(&self, container: ContainerId) -> Option<String> {
        self.container_node(container).map(|node| node.name.clone())
    }

    fn container_parent(&self, container: ContainerId) -> Option<ContainerId> {
        self.container_node(container)
            .and_then(|node| node.parent)
            .map(ContainerId)
    }

    fn child_container(&self, parent: ContainerId, name: &str) -> Option<ContainerId> {
        self.nodes
            .iter()
            .position(|node| {
                node.kind == NodeKind::Container && !node.removed && node.parent == Some(parent.0) && node.name == name
            })
            .map(ContainerId)
    }

    fn create_container(&mut self, parent: ContainerId, name: &str) -> Result<ContainerId, RepositoryError> {
        if self.container_node(parent).is_none() {
            return Err(RepositoryError::ContainerNotFound(parent));
        }
        let container = self.add_container(parent, name);
        self.record(Change::Created { container: container.0 });
        Ok(container)
    }

    fn reparent(&mut self, item: ItemId, destination: ContainerId) -> Result<(), RepositoryError> {
        if self.poison_after.is_some_and(|limit| self.reparent_calls >= limit) {
            return Err(RepositoryError::Unavailable("repository was closed".to_string()));
        }
        self.reparent_calls += 1;

        let from = self.item_parent(item)?;
        if self.container_node(destination).is_none() {
            return Err(RepositoryError::ContainerNotFound(destination));
        }
        if self.failing_items.contains(&item.0) {
            return Err(RepositoryError::Io {
                path: PathBuf::from(&self.nodes[item.0].name),
                source: io::Error::new(io::ErrorKind::PermissionDenied, "item is locked"),
            });
        }

        self.nodes[item.0].parent = Some(destination.0);
        self.record(Change::Moved { item: item.0, from: from.0 });
        Ok(())
    }

    fn begin_undo_group(&mut self, label: &str) {
        self.open_group = Some(ChangeGroup {
            label: label.to_string(),
            changes: Vec::new(),
        });
    }

    fn end_undo_group(&mut self) {
        if let Some(group) = self.open_group.take() {
            self.groups_closed += 1;
            self.undo_stack.push(group);
        }
    }

    fn clear_selection(&mut self) {
        for node in &mut self.nodes {
            node.selected = false;
        }
    }

    fn set_selected(&mut self, item: ItemId, selected: bool) -> Result<(), RepositoryError> {
        if self.item_node(item).is_none() {
            return Err(RepositoryError::ItemNotFound(item));
        }
        self.nodes[item.0].selected = selected;
        Ok(())
    }

    fn collapse_all(&mut self) -> bool {
        self.collapsed = true;
        true
    }
}
