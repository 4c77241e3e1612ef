//! Parse a pasted list of item names.

use itertools::Itertools;

/// Media file extensions removed from names, checked in this order.
/// The first matching extension wins.
pub const KNOWN_EXTENSIONS: [&str; 14] = [
    ".mov", ".mp4", ".mxf", ".wav", ".aif", ".aiff", ".tif", ".tiff", ".png", ".jpg", ".jpeg", ".psd", ".exr", ".gif",
];

/// Trailing marker left behind by some render templates.
const NEW_MARKER: &str = ".new.";

/// Options for [`parse_names`].
#[derive(Debug, Default, Clone, Copy)]
pub struct ParseOptions {
    pub strip_extensions: bool,
}

/// Turn raw multi-line text into a list of target names.
///
/// Lines are trimmed and blank lines skipped. A name left empty by stripping is skipped too.
/// Names are deduplicated case-insensitively, keeping the first spelling and the input order.
///
/// ```rust
/// use item_collect::names::{ParseOptions, parse_names};
///
/// let names = parse_names("Shot_010.mov\r\nshot_010\n\n  Shot_020 \n", ParseOptions { strip_extensions: true });
/// assert_eq!(names, vec!["Shot_010", "Shot_020"]);
/// ```
#[must_use]
pub fn parse_names(raw: &str, options: ParseOptions) -> Vec<String> {
    normalize_line_endings(raw)
        .split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| {
            if options.strip_extensions {
                strip_known_suffixes(line)
            } else {
                line
            }
        })
        .filter(|name| !name.is_empty())
        .unique_by(|name| name.to_lowercase())
        .map(ToString::to_string)
        .collect()
}

/// Remove one known media extension and then a trailing `.new.` marker.
///
/// Both checks ignore case. The marker is checked whether or not an extension was removed.
#[must_use]
pub fn strip_known_suffixes(name: &str) -> &str {
    let name = KNOWN_EXTENSIONS
        .iter()
        .find_map(|extension| strip_suffix_ignore_case(name, extension))
        .unwrap_or(name);
    strip_suffix_ignore_case(name, NEW_MARKER).unwrap_or(name)
}

fn normalize_line_endings(raw: &str) -> String {
    raw.replace("\r\n", "\n").replace('\r', "\n")
}

/// ASCII case-insensitive `strip_suffix`. All suffixes used here are ASCII.
fn strip_suffix_ignore_case<'a>(name: &'a str, suffix: &str) -> Option<&'a str> {
    let split = name.len().checked_sub(suffix.len())?;
    if !name.is_char_boundary(split) {
        return None;
    }
    let (head, tail) = name.split_at(split);
    tail.eq_ignore_ascii_case(suffix).then_some(head)
}
