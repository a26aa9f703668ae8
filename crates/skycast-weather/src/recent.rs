//! Deduplication of raw search history into display suggestions.

use std::collections::HashSet;

/// Collapse a newest-first list of searched city names into at most
/// `limit` unique entries, preserving order of first appearance.
///
/// Names are compared case-insensitively after trimming; blank entries
/// are dropped. The survivors are title-cased for display.
pub fn recent_unique<S: AsRef<str>>(searches: &[S], limit: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();

    for search in searches {
        if out.len() >= limit {
            break;
        }

        let trimmed = search.as_ref().trim();
        if trimmed.is_empty() {
            continue;
        }

        let normalized = trimmed.to_lowercase();
        if !seen.insert(normalized) {
            continue;
        }

        out.push(title_case(trimmed));
    }

    out
}

/// Uppercase the first letter of each whitespace-separated word,
/// lowercasing the rest.
fn title_case(name: &str) -> String {
    name.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
