//! Classify target names into items to move, items already in place and names not found.

use crate::index::{ItemRecord, RepositoryIndex};
use crate::repository::ContainerId;

/// Destination container with its display label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination {
    /// `None` when the destination does not exist yet and would be created by a real run.
    pub id: Option<ContainerId>,
    pub label: String,
}

impl Destination {
    #[must_use]
    pub const fn exists(&self) -> bool {
        self.id.is_some()
    }
}

/// Dry-run result for one collect run.
///
/// Every matched item is either in `to_move` or in `already_at_destination`.
/// Every target name either matched at least one item or is in `not_found`.
#[derive(Debug, Clone)]
pub struct MovePlan {
    pub destination: Destination,
    /// Number of target names the plan was made for.
    pub names_entered: usize,
    /// Number of target names that matched at least one item.
    pub names_matched: usize,
    /// All matched items. The same item appears once per name that matched it.
    pub matched: Vec<ItemRecord>,
    pub to_move: Vec<ItemRecord>,
    pub already_at_destination: Vec<ItemRecord>,
    pub not_found: Vec<String>,
}

/// Build a move plan for the given target names.
///
/// A name that matches several items moves all of them.
/// Output order follows the name order, then the index scan order.
#[must_use]
pub fn plan_moves(
    names: &[String],
    index: &RepositoryIndex<'_>,
    destination: &Destination,
    case_insensitive: bool,
) -> MovePlan {
    let mut plan = MovePlan {
        destination: destination.clone(),
        names_entered: names.len(),
        names_matched: 0,
        matched: Vec::new(),
        to_move: Vec::new(),
        already_at_destination: Vec::new(),
        not_found: Vec::new(),
    };

    for name in names {
        let pool = index.lookup(name, case_insensitive);
        if pool.is_empty() {
            plan.not_found.push(name.clone());
            continue;
        }
        plan.names_matched += 1;
        for item in pool {
            plan.matched.push(item.clone());
            if destination.id == Some(item.parent) {
                plan.already_at_destination.push(item.clone());
            } else {
                plan.to_move.push(item.clone());
            }
        }
    }

    plan
}

impl MovePlan {
    /// True when nothing would be moved.
    #[must_use]
    pub const fn is_noop(&self) -> bool {
        self.to_move.is_empty()
    }
}
