//! One complete collect run: parse, resolve, plan, confirm, move and report.

use crate::error::CollectError;
use crate::execute::{MoveOutcome, UNDO_GROUP_LABEL, execute_plan};
use crate::index::RepositoryIndex;
use crate::names::{ParseOptions, parse_names};
use crate::plan::{Destination, MovePlan, plan_moves};
use crate::report::{format_outcome, format_preview};
use crate::repository::{Repository, UndoGroup};
use crate::resolve::{ROOT_LABEL, find_path, path_segments, path_string, resolve_path};

/// Options collected from the user for one run.
#[derive(Debug, Clone)]
pub struct CollectOptions {
    pub case_insensitive: bool,
    pub strip_extensions: bool,
    pub use_destination: bool,
    pub destination_path: String,
    pub create_destination: bool,
    pub select_moved: bool,
    pub collapse_after: bool,
}

impl Default for CollectOptions {
    fn default() -> Self {
        Self {
            case_insensitive: false,
            strip_extensions: true,
            use_destination: false,
            destination_path: String::new(),
            create_destination: true,
            select_moved: true,
            collapse_after: true,
        }
    }
}

/// Confirmation gate shown the dry-run preview before anything is moved.
pub trait Confirm {
    /// Return `true` to go ahead with the move.
    ///
    /// # Errors
    /// Returns an error if the answer could not be read.
    fn confirm(&mut self, preview: &str) -> anyhow::Result<bool>;
}

/// Confirms every preview without asking.
#[derive(Debug, Default, Clone, Copy)]
pub struct AutoConfirm;

impl Confirm for AutoConfirm {
    fn confirm(&mut self, _preview: &str) -> anyhow::Result<bool> {
        Ok(true)
    }
}

/// How a run ended.
#[derive(Debug)]
pub enum RunResult {
    /// The user declined at the confirmation gate. Nothing was moved.
    Cancelled { plan: MovePlan, preview: String },
    /// The plan was executed.
    Completed { outcome: MoveOutcome, report: String },
}

/// Parse names and resolve the destination, then build the dry-run plan.
///
/// Missing destination containers are created here when enabled.
///
/// # Errors
/// Returns an error if no names were given or the destination cannot be resolved.
pub fn prepare<R: Repository + ?Sized>(
    repository: &mut R,
    raw_names: &str,
    options: &CollectOptions,
) -> Result<MovePlan, CollectError> {
    let names = names_from(raw_names, options)?;
    let destination = resolve_destination(repository, options)?;
    let index = RepositoryIndex::build(&*repository);
    Ok(plan_moves(&names, &index, &destination, options.case_insensitive))
}

/// Build the dry-run plan without changing the repository.
///
/// A missing destination that would be created is planned against as pending,
/// so every match counts as a move.
///
/// # Errors
/// Returns an error if no names were given or the destination cannot be resolved.
pub fn preview<R: Repository + ?Sized>(
    repository: &R,
    raw_names: &str,
    options: &CollectOptions,
) -> Result<MovePlan, CollectError> {
    let names = names_from(raw_names, options)?;
    let root = repository.root();
    let destination = match destination_path(options)? {
        None => Destination {
            id: Some(root),
            label: ROOT_LABEL.to_string(),
        },
        Some(path) => match find_path(repository, root, path) {
            Some(id) => Destination {
                id: Some(id),
                label: path_string(repository, id, root),
            },
            None if options.create_destination => Destination {
                id: None,
                label: path_segments(path).join("/"),
            },
            None => return Err(CollectError::DestinationNotFound(path.to_string())),
        },
    };
    let index = RepositoryIndex::build(repository);
    Ok(plan_moves(&names, &index, &destination, options.case_insensitive))
}

/// Run a complete collect operation against a repository.
///
/// # Errors
/// Returns an error for invalid input or an unresolvable destination.
/// Failures while moving are reported in the outcome instead.
pub fn run<R: Repository + ?Sized, C: Confirm + ?Sized>(
    repository: &mut R,
    raw_names: &str,
    options: &CollectOptions,
    confirm: &mut C,
) -> Result<RunResult, CollectError> {
    let plan = prepare(repository, raw_names, options)?;
    let preview = format_preview(&plan);

    if !confirm.confirm(&preview).map_err(CollectError::Prompt)? {
        return Ok(RunResult::Cancelled { plan, preview });
    }

    let outcome = {
        let mut group = UndoGroup::begin(repository, UNDO_GROUP_LABEL);
        execute_plan(group.repository(), plan)
    };

    if options.select_moved {
        select_items(repository, &outcome);
    }
    if options.collapse_after {
        let _ = repository.collapse_all();
    }

    let report = format_outcome(&outcome);
    Ok(RunResult::Completed { outcome, report })
}

fn names_from(raw_names: &str, options: &CollectOptions) -> Result<Vec<String>, CollectError> {
    let names = parse_names(
        raw_names,
        ParseOptions {
            strip_extensions: options.strip_extensions,
        },
    );
    if names.is_empty() {
        return Err(CollectError::NoNames);
    }
    Ok(names)
}

/// The trimmed destination path, or `None` when moving to the root.
fn destination_path(options: &CollectOptions) -> Result<Option<&str>, CollectError> {
    if !options.use_destination {
        return Ok(None);
    }
    let path = options.destination_path.trim();
    if path.is_empty() {
        return Err(CollectError::EmptyDestination);
    }
    Ok(Some(path))
}

fn resolve_destination<R: Repository + ?Sized>(
    repository: &mut R,
    options: &CollectOptions,
) -> Result<Destination, CollectError> {
    let root = repository.root();
    let Some(path) = destination_path(options)? else {
        return Ok(Destination {
            id: Some(root),
            label: ROOT_LABEL.to_string(),
        });
    };

    let id = resolve_path(repository, root, path, options.create_destination)?
        .ok_or_else(|| CollectError::DestinationNotFound(path.to_string()))?;
    Ok(Destination {
        id: Some(id),
        label: path_string(&*repository, id, root),
    })
}

/// Replace the selection with the moved items. Failures are ignored.
fn select_items<R: Repository + ?Sized>(repository: &mut R, outcome: &MoveOutcome) {
    repository.clear_selection();
    for &item in &outcome.moved {
        let _ = repository.set_selected(item, true);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{ContainerId, ItemId, MemoryRepository};

    struct Decline;

    impl Confirm for Decline {
        fn confirm(&mut self, _preview: &str) -> anyhow::Result<bool> {
            Ok(false)
        }
    }

    struct Broken;

    impl Confirm for Broken {
        fn confirm(&mut self, _preview: &str) -> anyhow::Result<bool> {
            anyhow::bail!("stdin closed")
        }
    }

    #[derive(Default)]
    struct Recorder {
        previews: Vec<String>,
    }

    impl Confirm for Recorder {
        fn confirm(&mut self, preview: &str) -> anyhow::Result<bool> {
            self.previews.push(preview.to_string());
            Ok(true)
        }
    }

    fn destination_options(path: &str, create: bool) -> CollectOptions {
        CollectOptions {
            use_destination: true,
            destination_path: path.to_string(),
            create_destination: create,
            ..CollectOptions::default()
        }
    }

    /// Root holds "Shot_010", "Delivery" holds "shot_010".
    fn shot_repository() -> (MemoryRepository, ContainerId, ItemId, ItemId) {
        let mut repository = MemoryRepository::new();
        let root = repository.root();
        let delivery = repository.add_container(root, "Delivery");
        let upper = repository.add_item(root, "Shot_010");
        let lower = repository.add_item(delivery, "shot_010");
        (repository, delivery, upper, lower)
    }

    #[test]
    fn no_names_is_an_input_error() {
        let (mut repository, ..) = shot_repository();
        let result = run(&mut repository, " \n\n", &CollectOptions::default(), &mut AutoConfirm);
        assert!(matches!(result, Err(CollectError::NoNames)));
    }

    #[test]
    fn empty_destination_path_is_an_input_error() {
        let (mut repository, ..) = shot_repository();
        let result = run(
            &mut repository,
            "Shot_010",
            &destination_options("   ", true),
            &mut AutoConfirm,
        );
        assert!(matches!(result, Err(CollectError::EmptyDestination)));
    }

    #[test]
    fn missing_destination_without_create_aborts_before_moving() {
        let (mut repository, _, upper, _) = shot_repository();
        let root = repository.root();
        let result = run(
            &mut repository,
            "Shot_010",
            &destination_options("Delivery/VFX", false),
            &mut AutoConfirm,
        );

        match result {
            Err(CollectError::DestinationNotFound(path)) => assert_eq!(path, "Delivery/VFX"),
            other => panic!("unexpected result: {other:?}"),
        }
        assert_eq!(repository.item_parent(upper).unwrap(), root);
        assert_eq!(repository.container_count(), 2);
        assert_eq!(repository.undo_groups_closed(), 0);
    }

    #[test]
    fn case_insensitive_run_moves_only_items_outside_destination() {
        let (mut repository, delivery, upper, lower) = shot_repository();
        let options = CollectOptions {
            case_insensitive: true,
            ..destination_options("Delivery", false)
        };

        let result = run(&mut repository, "Shot_010", &options, &mut AutoConfirm).unwrap();
        let RunResult::Completed { outcome, report } = result else {
            panic!("run was cancelled");
        };

        assert_eq!(outcome.plan.matched.len(), 2);
        assert_eq!(outcome.plan.to_move[0].id, upper);
        assert_eq!(outcome.plan.already_at_destination[0].id, lower);
        assert!(outcome.plan.not_found.is_empty());
        assert_eq!(outcome.moved, vec![upper]);
        assert_eq!(repository.item_parent(upper).unwrap(), delivery);
        assert!(report.contains("Destination: Delivery"));
        assert!(report.contains("Moved to destination: 1"));
        assert!(report.contains("Already in destination: 1"));
    }

    #[test]
    fn stripped_name_without_match_is_not_found() {
        let (mut repository, ..) = shot_repository();
        let plan = prepare(&mut repository, "missing_comp.mov", &CollectOptions::default()).unwrap();
        assert_eq!(plan.not_found, vec!["missing_comp".to_string()]);
        assert_eq!(plan.destination.label, ROOT_LABEL);
    }

    #[test]
    fn declining_moves_nothing() {
        let (mut repository, _, upper, _) = shot_repository();
        let root = repository.root();

        let result = run(
            &mut repository,
            "Shot_010",
            &destination_options("Delivery", false),
            &mut Decline,
        )
        .unwrap();

        match result {
            RunResult::Cancelled { plan, preview } => {
                assert_eq!(plan.to_move.len(), 1);
                assert!(preview.starts_with("Dry Run - Move Items"));
            }
            RunResult::Completed { .. } => panic!("run should be cancelled"),
        }
        assert_eq!(repository.item_parent(upper).unwrap(), root);
        assert_eq!(repository.undo_groups_closed(), 0);
        assert!(!repository.is_collapsed());
    }

    #[test]
    fn confirm_error_aborts_run() {
        let (mut repository, ..) = shot_repository();
        let result = run(&mut repository, "Shot_010", &CollectOptions::default(), &mut Broken);
        assert!(matches!(result, Err(CollectError::Prompt(_))));
    }

    #[test]
    fn confirm_sees_preview() {
        let (mut repository, ..) = shot_repository();
        let mut recorder = Recorder::default();
        run(
            &mut repository,
            "Shot_010\nnope",
            &destination_options("Delivery", false),
            &mut recorder,
        )
        .unwrap();

        assert_eq!(recorder.previews.len(), 1);
        assert!(recorder.previews[0].contains("Would move: 1"));
        assert!(recorder.previews[0].contains(" - nope"));
    }

    #[test]
    fn creates_destination_and_wraps_moves_in_undo_group() {
        let (mut repository, _, upper, _) = shot_repository();
        let root = repository.root();

        let result = run(
            &mut repository,
            "Shot_010",
            &destination_options("Delivery/VFX", true),
            &mut AutoConfirm,
        )
        .unwrap();
        let RunResult::Completed { outcome, .. } = result else {
            panic!("run was cancelled");
        };

        assert_eq!(outcome.destination.label, "Delivery/VFX");
        assert_eq!(Some(repository.item_parent(upper).unwrap()), outcome.destination.id);
        assert_eq!(repository.last_undo_label(), Some(UNDO_GROUP_LABEL));
        assert!(repository.undo());
        assert_eq!(repository.item_parent(upper).unwrap(), root);
    }

    #[test]
    fn selects_moved_items_and_collapses() {
        let (mut repository, _, upper, lower) = shot_repository();
        repository.set_selected(lower, true).unwrap();

        run(
            &mut repository,
            "Shot_010",
            &destination_options("Delivery", false),
            &mut AutoConfirm,
        )
        .unwrap();

        assert_eq!(repository.selected_items(), vec![upper]);
        assert!(repository.is_collapsed());
    }

    #[test]
    fn selection_and_collapse_can_be_disabled() {
        let (mut repository, ..) = shot_repository();
        let options = CollectOptions {
            select_moved: false,
            collapse_after: false,
            ..destination_options("Delivery", false)
        };

        run(&mut repository, "Shot_010", &options, &mut AutoConfirm).unwrap();

        assert!(repository.selected_items().is_empty());
        assert!(!repository.is_collapsed());
    }

    #[test]
    fn preview_plans_missing_destination_without_creating_it() {
        let (repository, _, upper, lower) = shot_repository();
        let options = CollectOptions {
            case_insensitive: true,
            ..destination_options(" Delivery / VFX ", true)
        };

        let plan = preview(&repository, "Shot_010", &options).unwrap();

        assert_eq!(repository.container_count(), 2);
        assert!(!plan.destination.exists());
        assert_eq!(plan.destination.label, "Delivery/VFX");
        let moving: Vec<ItemId> = plan.to_move.iter().map(|item| item.id).collect();
        assert_eq!(moving, vec![upper, lower]);
        assert!(plan.already_at_destination.is_empty());
        assert!(format_preview(&plan).contains("Destination: Delivery/VFX (will be created)"));
    }

    #[test]
    fn preview_uses_existing_destination() {
        let (repository, delivery, upper, lower) = shot_repository();
        let options = CollectOptions {
            case_insensitive: true,
            ..destination_options("Delivery", true)
        };

        let plan = preview(&repository, "Shot_010", &options).unwrap();

        assert_eq!(plan.destination.id, Some(delivery));
        assert_eq!(plan.to_move[0].id, upper);
        assert_eq!(plan.already_at_destination[0].id, lower);
    }

    #[test]
    fn preview_without_create_reports_missing_destination() {
        let (repository, ..) = shot_repository();
        let result = preview(&repository, "Shot_010", &destination_options("Archive", false));
        assert!(matches!(result, Err(CollectError::DestinationNotFound(ref path)) if path == "Archive"));
        assert_eq!(repository.container_count(), 2);
    }

    #[test]
    fn preview_rejects_blank_input() {
        let (repository, ..) = shot_repository();
        assert!(matches!(
            preview(&repository, "\n \n", &CollectOptions::default()),
            Err(CollectError::NoNames)
        ));
        assert!(matches!(
            preview(&repository, "Shot_010", &destination_options(" ", true)),
            Err(CollectError::EmptyDestination)
        ));
    }

    #[test]
    fn catastrophic_failure_is_reported_not_returned() {
        let mut repository = MemoryRepository::new();
        let root = repository.root();
        let delivery = repository.add_container(root, "Delivery");
        let a = repository.add_item(root, "a");
        repository.add_item(root, "b");
        repository.poison_after(1);

        let result = run(
            &mut repository,
            "a\nb",
            &destination_options("Delivery", false),
            &mut AutoConfirm,
        )
        .unwrap();
        let RunResult::Completed { outcome, report } = result else {
            panic!("run was cancelled");
        };

        assert_eq!(outcome.moved, vec![a]);
        assert!(outcome.error.is_some());
        assert!(report.contains("Error during move:"));
        assert_eq!(repository.item_parent(a).unwrap(), delivery);
        assert!(!repository.in_undo_group());
    }
}
