//! Plain text dry-run preview and final report.

use crate::execute::MoveOutcome;
use crate::plan::{Destination, MovePlan};

/// Maximum number of items listed individually in the preview.
pub const PREVIEW_ITEM_LIMIT: usize = 20;

const RULE: &str = "--------------------------------------------";

/// Render the dry-run preview for a plan.
#[must_use]
pub fn format_preview(plan: &MovePlan) -> String {
    let mut lines = vec![
        "Dry Run - Move Items".to_string(),
        RULE.to_string(),
        destination_line(&plan.destination),
        format!("Names entered: {}", plan.names_entered),
        format!("Matched items: {}", plan.matched.len()),
        format!("Would move: {}", plan.to_move.len()),
        format!("Already in destination: {}", plan.already_at_destination.len()),
        String::new(),
    ];

    if !plan.to_move.is_empty() {
        lines.push("Will move these items:".to_string());
        lines.extend(
            plan.to_move
                .iter()
                .take(PREVIEW_ITEM_LIMIT)
                .map(|item| format!(" - {}", item.name)),
        );
        if plan.to_move.len() > PREVIEW_ITEM_LIMIT {
            lines.push(format!(" ... and {} more", plan.to_move.len() - PREVIEW_ITEM_LIMIT));
        }
        lines.push(String::new());
    }

    push_not_found(&mut lines, &plan.not_found);
    lines.join("\n")
}

/// Render the final report after executing a plan.
#[must_use]
pub fn format_outcome(outcome: &MoveOutcome) -> String {
    let plan = &outcome.plan;
    let mut lines = vec![
        "Move Items - Completed".to_string(),
        RULE.to_string(),
        format!("Destination: {}", outcome.destination.label),
        format!("Names entered: {}", plan.names_entered),
        format!("Matched items: {}", plan.matched.len()),
        format!("Moved to destination: {}", outcome.moved_count()),
        format!("Already in destination: {}", plan.already_at_destination.len()),
        String::new(),
    ];

    if let Some(error) = &outcome.error {
        lines.push(format!("Error during move: {error}"));
        lines.push(String::new());
    }

    if !outcome.failures.is_empty() {
        lines.push(format!("Failed to move ({}):", outcome.failures.len()));
        lines.extend(
            outcome
                .failures
                .iter()
                .map(|failure| format!(" - {}: {}", failure.name, failure.reason)),
        );
        lines.push(String::new());
    }

    push_not_found(&mut lines, &plan.not_found);
    lines.join("\n")
}

fn destination_line(destination: &Destination) -> String {
    if destination.exists() {
        format!("Destination: {}", destination.label)
    } else {
        format!("Destination: {} (will be created)", destination.label)
    }
}

fn push_not_found(lines: &mut Vec<String>, not_found: &[String]) {
    lines.push(format!("Not found ({}):", not_found.len()));
    if not_found.is_empty() {
        lines.push(" - None".to_string());
    } else {
        lines.extend(not_found.iter().map(|name| format!(" - {name}")));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::execute::MoveFailure;
    use crate::index::ItemRecord;
    use crate::repository::{ContainerId, ItemId};

    fn record(id: usize, name: &str, parent: usize) -> ItemRecord {
        ItemRecord {
            id: ItemId(id),
            name: name.to_string(),
            parent: ContainerId(parent),
        }
    }

    fn sample_plan(to_move: usize) -> MovePlan {
        let to_move: Vec<ItemRecord> = (0..to_move).map(|i| record(i + 10, &format!("comp_{i:02}"), 0)).collect();
        let already = vec![record(2, "shot_010", 1)];
        let mut matched = to_move.clone();
        matched.extend(already.clone());
        MovePlan {
            destination: Destination {
                id: Some(ContainerId(1)),
                label: "Delivery".to_string(),
            },
            names_entered: to_move.len() + 2,
            names_matched: to_move.len() + 1,
            matched,
            to_move,
            already_at_destination: already,
            not_found: vec!["missing_comp".to_string()],
        }
    }

    #[test]
    fn preview_lists_counts_and_items() {
        let text = format_preview(&sample_plan(2));
        let expected = "\
Dry Run - Move Items
--------------------------------------------
Destination: Delivery
Names entered: 4
Matched items: 3
Would move: 2
Already in destination: 1

Will move these items:
 - comp_00
 - comp_01

Not found (1):
 - missing_comp";
        assert_eq!(text, expected);
    }

    #[test]
    fn preview_marks_destination_to_be_created() {
        let mut plan = sample_plan(1);
        plan.destination = Destination {
            id: None,
            label: "Delivery/VFX".to_string(),
        };
        let text = format_preview(&plan);
        assert!(text.contains("\nDestination: Delivery/VFX (will be created)\n"));
    }

    #[test]
    fn preview_caps_item_list() {
        let text = format_preview(&sample_plan(25));
        assert!(text.contains(" - comp_19\n ... and 5 more\n"));
        assert!(!text.contains("comp_20"));
        assert!(text.contains("Would move: 25"));
    }

    #[test]
    fn preview_at_limit_has_no_more_line() {
        let text = format_preview(&sample_plan(PREVIEW_ITEM_LIMIT));
        assert!(!text.contains("more"));
    }

    #[test]
    fn preview_without_moves_skips_item_list() {
        let mut plan = sample_plan(0);
        plan.not_found.clear();
        let text = format_preview(&plan);
        assert!(!text.contains("Will move these items:"));
        assert!(text.ends_with("Not found (0):\n - None"));
    }

    #[test]
    fn outcome_reports_moved_count() {
        let plan = sample_plan(3);
        let outcome = MoveOutcome {
            destination: plan.destination.clone(),
            moved: vec![ItemId(10), ItemId(11)],
            failures: vec![MoveFailure {
                item: ItemId(12),
                name: "comp_02".to_string(),
                reason: "item is locked".to_string(),
            }],
            error: None,
            plan,
        };
        let expected = "\
Move Items - Completed
--------------------------------------------
Destination: Delivery
Names entered: 5
Matched items: 4
Moved to destination: 2
Already in destination: 1

Failed to move (1):
 - comp_02: item is locked

Not found (1):
 - missing_comp";
        assert_eq!(format_outcome(&outcome), expected);
    }

    #[test]
    fn outcome_includes_error_line() {
        let plan = sample_plan(1);
        let outcome = MoveOutcome {
            destination: plan.destination.clone(),
            moved: Vec::new(),
            failures: Vec::new(),
            error: Some("Repository unavailable: closed".to_string()),
            plan,
        };
        let text = format_outcome(&outcome);
        assert!(text.contains("Moved to destination: 0"));
        assert!(text.contains("Error during move: Repository unavailable: closed"));
        assert!(!text.contains("Failed to move"));
    }

    #[test]
    fn formatting_is_deterministic() {
        let plan = sample_plan(30);
        assert_eq!(format_preview(&plan), format_preview(&plan.clone()));
    }
}
