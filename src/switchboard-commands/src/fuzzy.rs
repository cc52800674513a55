//! Edit-distance suggestions for unknown command and plugin names.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// Default maximum edit distance for a candidate to be suggested.
pub const DEFAULT_MAX_DISTANCE: usize = 2;

/// Levenshtein distance between two strings (unit cost insert/delete/substitute).
///
/// Compares by `char`, case-sensitive. See [`find_similar`] for the
/// case-insensitive variant used for suggestions.
pub fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    let n = a.len();
    let m = b.len();

    if n == 0 {
        return m;
    }
    if m == 0 {
        return n;
    }

    // Two rows of the DP matrix are enough
    let mut prev: Vec<usize> = (0..=m).collect();
    let mut curr = vec![0usize; m + 1];

    for i in 1..=n {
        curr[0] = i;
        for j in 1..=m {
            let cost = usize::from(a[i - 1] != b[j - 1]);
            curr[j] = (prev[j] + 1).min(curr[j - 1] + 1).min(prev[j - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[m]
}

/// A name that may be suggested, with its declared priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate<'a> {
    pub name: &'a str,
    /// Higher priority wins ties on distance.
    pub priority: i32,
}

impl<'a> Candidate<'a> {
    pub fn new(name: &'a str, priority: i32) -> Self {
        Self { name, priority }
    }
}

impl<'a> From<&'a str> for Candidate<'a> {
    fn from(name: &'a str) -> Self {
        Self { name, priority: 0 }
    }
}

impl<'a> From<&'a String> for Candidate<'a> {
    fn from(name: &'a String) -> Self {
        Self {
            name: name.as_str(),
            priority: 0,
        }
    }
}

/// A ranked suggestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    pub candidate: String,
    pub distance: usize,
    #[serde(default)]
    pub priority: i32,
}

/// Find candidates within `max_distance` edits of `name`.
///
/// Results are sorted by ascending distance, then higher priority, then
/// lexical order. Comparison is case-insensitive. Duplicate names keep their
/// highest priority.
pub fn find_similar<'a, I, C>(name: &str, candidates: I, max_distance: usize) -> Vec<Suggestion>
where
    I: IntoIterator<Item = C>,
    C: Into<Candidate<'a>>,
{
    let needle = name.to_lowercase();
    let mut suggestions: Vec<Suggestion> = Vec::new();

    for candidate in candidates {
        let candidate = candidate.into();
        let distance = levenshtein_distance(&needle, &candidate.name.to_lowercase());
        if distance > max_distance {
            continue;
        }

        if let Some(existing) = suggestions
            .iter_mut()
            .find(|s| s.candidate == candidate.name)
        {
            existing.priority = existing.priority.max(candidate.priority);
            continue;
        }

        suggestions.push(Suggestion {
            candidate: candidate.name.to_string(),
            distance,
            priority: candidate.priority,
        });
    }

    suggestions.sort_by(compare_suggestions);
    suggestions
}

fn compare_suggestions(a: &Suggestion, b: &Suggestion) -> Ordering {
    a.distance
        .cmp(&b.distance)
        .then_with(|| b.priority.cmp(&a.priority))
        .then_with(|| a.candidate.cmp(&b.candidate))
}

/// Render a "did you mean" hint, or `None` when there is nothing to suggest.
pub fn did_you_mean(suggestions: &[Suggestion], prefix: &str, limit: usize) -> Option<String> {
    let names: Vec<String> = suggestions
        .iter()
        .take(limit)
        .map(|s| format!("{prefix}{}", s.candidate))
        .collect();

    match names.as_slice() {
        [] => None,
        [only] => Some(format!("Did you mean {only}?")),
        [rest @ .., last] => Some(format!("Did you mean {} or {last}?", rest.join(", "))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_levenshtein() {
        assert_eq!(levenshtein_distance("", ""), 0);
        assert_eq!(levenshtein_distance("abc", ""), 3);
        assert_eq!(levenshtein_distance("", "abc"), 3);
        assert_eq!(levenshtein_distance("kitten", "sitting"), 3);
        assert_eq!(levenshtein_distance("flaw", "lawn"), 2);
        assert_eq!(levenshtein_distance("comit", "commit"), 1);
        assert_eq!(levenshtein_distance("same", "same"), 0);
    }

    #[test]
    fn test_levenshtein_unicode() {
        assert_eq!(levenshtein_distance("café", "cafe"), 1);
        assert_eq!(levenshtein_distance("日本", "日本語"), 1);
    }

    #[test]
    fn test_find_similar_commit() {
        let found = find_similar("comit", ["commit", "branch", "status"], DEFAULT_MAX_DISTANCE);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].candidate, "commit");
        assert_eq!(found[0].distance, 1);
    }

    #[test]
    fn test_case_insensitive() {
        let found = find_similar("HELP", ["help", "helm"], DEFAULT_MAX_DISTANCE);
        assert_eq!(found[0].candidate, "help");
        assert_eq!(found[0].distance, 0);
        assert_eq!(found[1].candidate, "helm");
    }

    #[test]
    fn test_priority_breaks_ties_before_lexical_order() {
        let found = find_similar(
            "lag",
            [
                Candidate::new("log", 0),
                Candidate::new("bag", 0),
                Candidate::new("tag", 5),
            ],
            1,
        );
        let names: Vec<&str> = found.iter().map(|s| s.candidate.as_str()).collect();
        assert_eq!(names, vec!["tag", "bag", "log"]);
    }

    #[test]
    fn test_max_distance_filters() {
        assert!(find_similar("xyz", ["commit"], DEFAULT_MAX_DISTANCE).is_empty());
        assert_eq!(find_similar("cmt", ["commit"], 3).len(), 1);
    }

    #[test]
    fn test_duplicates_keep_highest_priority() {
        let found = find_similar(
            "git",
            [Candidate::new("git", 1), Candidate::new("git", 4)],
            DEFAULT_MAX_DISTANCE,
        );
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].priority, 4);
    }

    #[test]
    fn test_did_you_mean() {
        let found = find_similar("hel", ["help", "helm", "clear"], DEFAULT_MAX_DISTANCE);
        assert_eq!(
            did_you_mean(&found, "/", 3).as_deref(),
            Some("Did you mean /helm or /help?")
        );
        assert_eq!(
            did_you_mean(&found, "/", 1).as_deref(),
            Some("Did you mean /helm?")
        );
        assert_eq!(did_you_mean(&[], "/", 3), None);
    }
}
