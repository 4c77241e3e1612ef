//! Apply a move plan to a repository.

use crate::error::RepositoryError;
use crate::index::ItemRecord;
use crate::plan::{Destination, MovePlan};
use crate::repository::{ContainerId, ItemId, Repository};

/// Undo group label used for a collect run.
pub const UNDO_GROUP_LABEL: &str = "Move Items";

/// An item that could not be moved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveFailure {
    pub item: ItemId,
    pub name: String,
    pub reason: String,
}

/// Result of executing a move plan.
#[derive(Debug, Clone)]
pub struct MoveOutcome {
    pub destination: Destination,
    /// Items actually moved, in plan order.
    pub moved: Vec<ItemId>,
    /// Items that failed individually. The batch continued past them.
    pub failures: Vec<MoveFailure>,
    /// Set when the batch stopped early because the repository failed as a whole.
    /// Moves applied before that point are kept.
    pub error: Option<String>,
    pub plan: MovePlan,
}

impl MoveOutcome {
    #[must_use]
    pub const fn moved_count(&self) -> usize {
        self.moved.len()
    }
}

/// Move every item in `plan.to_move` into the plan destination.
///
/// Each item's current parent is checked again before moving,
/// so an item is never moved twice and `moved` only counts real moves.
/// Callers should hold an [`UndoGroup`](crate::repository::UndoGroup) around this call.
/// A plan made against a destination that does not exist moves nothing.
pub fn execute_plan<R: Repository + ?Sized>(repository: &mut R, plan: MovePlan) -> MoveOutcome {
    let Some(destination) = plan.destination.id else {
        return MoveOutcome {
            destination: plan.destination.clone(),
            moved: Vec::new(),
            failures: Vec::new(),
            error: Some(format!("Destination '{}' does not exist", plan.destination.label)),
            plan,
        };
    };

    let mut moved = Vec::new();
    let mut failures = Vec::new();
    let mut error = None;

    for item in &plan.to_move {
        match move_item(repository, item, destination) {
            Ok(true) => moved.push(item.id),
            Ok(false) => {}
            Err(e) if e.is_fatal() => {
                error = Some(e.to_string());
                break;
            }
            Err(e) => failures.push(MoveFailure {
                item: item.id,
                name: item.name.clone(),
                reason: e.to_string(),
            }),
        }
    }

    MoveOutcome {
        destination: plan.destination.clone(),
        moved,
        failures,
        error,
        plan,
    }
}

/// Returns `Ok(false)` if the item is already in the destination.
fn move_item<R: Repository + ?Sized>(
    repository: &mut R,
    item: &ItemRecord,
    destination: ContainerId,
) -> Result<bool, RepositoryError> {
    if repository.item_parent(item.id)? == destination {
        return Ok(false);
    }
    repository.reparent(item.id, destination)?;
    Ok(true)
}
