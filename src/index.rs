//! Name lookup tables over all items in a repository.

use std::collections::HashMap;
use std::marker::PhantomData;

use crate::repository::{ContainerId, EntryKind, ItemId, Repository};

/// An item as seen when the index was built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemRecord {
    pub id: ItemId,
    pub name: String,
    /// Parent container at scan time.
    pub parent: ContainerId,
}

/// Exact and lowercase name lookup for the items of one repository scan.
///
/// The index borrows the repository it was built from,
/// so the repository cannot be changed while the index is alive.
/// Build a new index for every run.
#[derive(Debug)]
pub struct RepositoryIndex<'a> {
    items: Vec<ItemRecord>,
    exact: HashMap<String, Vec<usize>>,
    folded: HashMap<String, Vec<usize>>,
    repository: PhantomData<&'a ()>,
}

impl<'a> RepositoryIndex<'a> {
    /// Scan all repository entries and index the items.
    /// Containers are not indexed.
    pub fn build<R: Repository + ?Sized>(repository: &'a R) -> Self {
        let mut items = Vec::new();
        let mut exact: HashMap<String, Vec<usize>> = HashMap::new();
        let mut folded: HashMap<String, Vec<usize>> = HashMap::new();

        for entry in repository.entries() {
            let (EntryKind::Item(id), Some(parent)) = (entry.kind, entry.parent) else {
                continue;
            };
            let index = items.len();
            exact.entry(entry.name.clone()).or_default().push(index);
            folded.entry(entry.name.to_lowercase()).or_default().push(index);
            items.push(ItemRecord {
                id,
                name: entry.name,
                parent,
            });
        }

        Self {
            items,
            exact,
            folded,
            repository: PhantomData,
        }
    }

    /// Items with exactly this name, in scan order.
    #[must_use]
    pub fn exact(&self, name: &str) -> Vec<&ItemRecord> {
        self.bucket(self.exact.get(name))
    }

    /// Items whose lowercase name equals the lowercase of `name`, in scan order.
    #[must_use]
    pub fn folded(&self, name: &str) -> Vec<&ItemRecord> {
        self.bucket(self.folded.get(&name.to_lowercase()))
    }

    /// Look up a name either exactly or ignoring case.
    #[must_use]
    pub fn lookup(&self, name: &str, case_insensitive: bool) -> Vec<&ItemRecord> {
        if case_insensitive {
            self.folded(name)
        } else {
            self.exact(name)
        }
    }

    /// Number of indexed items.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn bucket(&self, indices: Option<&Vec<usize>>) -> Vec<&ItemRecord> {
        indices
            .map(|indices| indices.iter().map(|&i| &self.items[i]).collect())
            .unwrap_or_default()
    }
}
