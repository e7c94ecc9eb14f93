// src/utils.rs
use std::collections::HashSet;
use std::fs::File;
use std::hash::Hash;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

/// Reads lines from a file into a vector of strings.
pub fn read_lines(path: &Path) -> io::Result<Vec<String>> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    reader.lines().collect()
}

/// Lowercase `text` and drop every character outside `[a-z0-9.-]`.
pub fn sanitize(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .filter(|c| matches!(c, 'a'..='z' | '0'..='9' | '.' | '-'))
        .collect()
}

pub fn sanitize_all<I, S>(texts: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    texts.into_iter().map(|t| sanitize(t.as_ref())).collect()
}

/// Remove duplicates keeping first-seen order.
/// Returns the unique items and how many were dropped.
pub fn deduplicate<T>(items: Vec<T>) -> (Vec<T>, usize)
where
    T: Eq + Hash + Clone,
{
    let total = items.len();
    let mut seen = HashSet::with_capacity(total);
    let mut unique = Vec::with_capacity(total);

    for item in items {
        if seen.insert(item.clone()) {
            unique.push(item);
        }
    }

    let duplicates = total - unique.len();
    (unique, duplicates)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn in_alphabet(s: &str) -> bool {
        s.chars().all(|c| matches!(c, 'a'..='z' | '0'..='9' | '.' | '-'))
    }

    #[test]
    fn test_sanitize_removes_banned_characters() {
        assert_eq!(sanitize("My_Bucket!123"), "mybucket123");
        assert_eq!(sanitize("My_Bucket!1"), "mybucket1");
        assert_eq!(sanitize("acme.Corp-Logs"), "acme.corp-logs");
        assert_eq!(sanitize("  spaced out\t"), "spacedout");
        assert_eq!(sanitize(""), "");
    }

    #[test]
    fn test_sanitize_is_idempotent() {
        let inputs = [
            "My_Bucket!123",
            "ÜBER-Daten",
            "İstanbul",
            "a/b\\c:d",
            "---...",
            "日本語bucket",
            "",
        ];
        for input in inputs {
            let once = sanitize(input);
            assert_eq!(sanitize(&once), once, "input {:?}", input);
            assert!(in_alphabet(&once), "{:?} left characters outside the alphabet", once);
        }
    }

    #[test]
    fn test_sanitize_all() {
        let cleaned = sanitize_all(["Dev", "PROD_", "st age"]);
        assert_eq!(cleaned, vec!["dev", "prod", "stage"]);
    }

    #[test]
    fn test_deduplicate_keeps_first_seen_order() {
        let items: Vec<String> = ["b", "a", "b", "c", "a", "d"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        let (unique, duplicates) = deduplicate(items);
        assert_eq!(unique, vec!["b", "a", "c", "d"]);
        assert_eq!(duplicates, 2);
    }

    #[test]
    fn test_deduplicate_is_idempotent() {
        let items = vec![3, 1, 3, 3, 2, 1, 5];
        let (once, first_dups) = deduplicate(items);
        let (twice, second_dups) = deduplicate(once.clone());
        assert_eq!(first_dups, 3);
        assert_eq!(second_dups, 0);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_deduplicate_empty() {
        let (unique, duplicates) = deduplicate(Vec::<String>::new());
        assert!(unique.is_empty());
        assert_eq!(duplicates, 0);
    }
}
