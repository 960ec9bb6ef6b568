//! Exact-text deduplication of result lines.
//!
//! Two lines are duplicates only when their text is identical, including
//! case and whitespace. The first occurrence is kept and the output follows
//! first-occurrence order, which keeps fixtures deterministic even though
//! callers must not depend on order.

use std::collections::HashSet;

use crate::types::ResultSet;

/// Drop every line that already appeared earlier in `lines`.
pub fn dedup_exact<I>(lines: I) -> ResultSet
where
    I: IntoIterator<Item = String>,
{
    let mut seen: HashSet<String> = HashSet::new();
    let mut out = Vec::new();
    for line in lines {
        if seen.insert(line.clone()) {
            out.push(line);
        }
    }
    out
}

/// Append the lines of `incoming` that `existing` does not already contain.
///
/// Returns how many lines were appended.
pub fn extend_unique(existing: &mut ResultSet, incoming: &[String]) -> usize {
    let mut seen: HashSet<&str> = existing.iter().map(String::as_str).collect();
    let fresh: Vec<String> = incoming
        .iter()
        .filter(|line| seen.insert(line.as_str()))
        .cloned()
        .collect();
    let added = fresh.len();
    existing.extend(fresh);
    added
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn duplicates_across_providers_collapse() {
        let merged = dedup_exact(
            lines(&["A: x", "B: y"])
                .into_iter()
                .chain(lines(&["B: y", "C: z"])),
        );
        let set: HashSet<String> = merged.iter().cloned().collect();
        assert_eq!(merged.len(), 3);
        assert_eq!(set, lines(&["A: x", "B: y", "C: z"]).into_iter().collect());
    }

    #[test]
    fn first_occurrence_order_is_kept() {
        let merged = dedup_exact(lines(&["b", "a", "b", "c", "a"]));
        assert_eq!(merged, lines(&["b", "a", "c"]));
    }

    #[test]
    fn comparison_is_exact() {
        let merged = dedup_exact(lines(&["A: x", "a: x", "A: x ", "A: x"]));
        assert_eq!(merged.len(), 3);
    }

    #[test]
    fn empty_input_returns_empty() {
        assert!(dedup_exact(Vec::<String>::new()).is_empty());
    }

    #[test]
    fn extend_unique_skips_known_lines() {
        let mut existing = lines(&["A: x", "B: y"]);
        let added = extend_unique(&mut existing, &lines(&["B: y", "C: z", "C: z"]));
        assert_eq!(added, 1);
        assert_eq!(existing, lines(&["A: x", "B: y", "C: z"]));
    }
}
