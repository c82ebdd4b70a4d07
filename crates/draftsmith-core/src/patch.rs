//! Fuzzy content patcher.
//!
//! Replaces a search fragment inside rendered markup without ever
//! overwriting content it cannot locate. Matching runs in three steps:
//!
//! 1. A safety gate compares tag-stripped, whitespace-collapsed copies
//!    of the content and the search text. If the search text does not
//!    occur in that normalized view, the patch is refused outright.
//! 2. An exact substring match replaces the first occurrence in the
//!    original content, preserving all markup.
//! 3. Otherwise the search words are joined by a pattern that tolerates
//!    whitespace and interleaved tags, so a fragment the browser shows
//!    as contiguous text still matches across `<b>`/`<span>` boundaries.
//!    Every fuzzy occurrence is replaced.
//!
//! The replacement text is always inserted literally.

use regex::{NoExpand, Regex};

/// Result of a patch attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchOutcome {
    /// Content after the replacement; unchanged when `matched` is false
    pub content: String,
    /// Whether a safe match was found and replaced
    pub matched: bool,
}

/// Replaces the first occurrence of `search` in `content` with
/// `replace`, tolerating whitespace and markup differences.
///
/// Returns the original content untouched (with `matched: false`) when
/// no sufficiently safe match exists.
pub fn patch(content: &str, search: &str, replace: &str) -> PatchOutcome {
    if search.trim().is_empty() {
        return PatchOutcome {
            content: content.to_string(),
            matched: false,
        };
    }

    // The gate works on a markup-free view so a search phrase split by
    // inline tags is still considered present.
    if !normalize(content).contains(&normalize(search)) {
        return PatchOutcome {
            content: content.to_string(),
            matched: false,
        };
    }

    if content.contains(search) {
        log::debug!("Patch matched exactly");
        return PatchOutcome {
            content: content.replacen(search, replace, 1),
            matched: true,
        };
    }

    match fuzzy_regex(search) {
        Some(re) if re.is_match(content) => {
            log::debug!("Patch matched fuzzily (tag-agnostic)");
            PatchOutcome {
                content: re.replace_all(content, NoExpand(replace)).into_owned(),
                matched: true,
            }
        }
        _ => PatchOutcome {
            content: content.to_string(),
            matched: false,
        },
    }
}

/// Strips markup tags and collapses whitespace runs to single spaces.
fn normalize(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut in_tag = false;
    let mut pending_space = false;
    for c in raw.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if in_tag => {}
            c if c.is_whitespace() => pending_space = true,
            c => {
                if pending_space && !out.is_empty() {
                    out.push(' ');
                }
                pending_space = false;
                out.push(c);
            }
        }
    }
    out
}

/// Builds a pattern matching the search words with any amount of
/// whitespace or markup tags between them.
fn fuzzy_regex(search: &str) -> Option<Regex> {
    let words: Vec<String> = search
        .split_whitespace()
        .map(regex::escape)
        .collect();
    if words.is_empty() {
        return None;
    }
    Regex::new(&words.join(r"(?:\s+|<[^>]+>)*")).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match_replaces_first_occurrence() {
        let out = patch("<p>Hello World</p><p>Hello World</p>", "Hello World", "Hi");
        assert!(out.matched);
        assert_eq!(out.content, "<p>Hi</p><p>Hello World</p>");
    }

    #[test]
    fn test_fuzzy_match_spans_tags() {
        let out = patch("<p>Hello <b>World</b></p>", "Hello World", "Goodbye");
        assert!(out.matched);
        assert_eq!(out.content, "<p>Goodbye</p>");
    }

    #[test]
    fn test_fuzzy_match_tolerates_whitespace() {
        let out = patch("<p>Hello\n   World</p>", "Hello World", "Hi");
        assert!(out.matched);
        assert_eq!(out.content, "<p>Hi</p>");
    }

    #[test]
    fn test_no_match_leaves_content_untouched() {
        let content = "<p>Something else entirely</p>";
        let out = patch(content, "Hello World", "Hi");
        assert!(!out.matched);
        assert_eq!(out.content, content);
    }

    #[test]
    fn test_empty_search_never_matches() {
        let out = patch("<p>Hello</p>", "   ", "Hi");
        assert!(!out.matched);
        assert_eq!(out.content, "<p>Hello</p>");
    }

    #[test]
    fn test_replacement_is_literal() {
        let out = patch("<p>price: 10</p>", "price: 10", "cost: $1 ${x}");
        assert!(out.matched);
        assert_eq!(out.content, "<p>cost: $1 ${x}</p>");
    }

    #[test]
    fn test_regex_metacharacters_in_search() {
        let out = patch("<p>What (really)?</p>", "What (really)?", "Truly");
        assert!(out.matched);
        assert_eq!(out.content, "<p>Truly</p>");

        let fuzzy = patch("<p>Cost <b>$10</b> (total)</p>", "Cost $10 (total)", "Done");
        assert!(fuzzy.matched);
        assert_eq!(fuzzy.content, "<p>Done</p>");
    }

    #[test]
    fn test_normalize_strips_tags_and_collapses_whitespace() {
        assert_eq!(normalize("<p>Hello <b>World</b></p>"), "Hello World");
        assert_eq!(normalize("  a \n b  "), "a b");
    }
}
