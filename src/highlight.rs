use std::ops::Range;

use regex::{Regex, RegexBuilder};

use crate::search::SearchQuery;

pub fn build_highlight_regex(query: &SearchQuery) -> Option<Regex> {
    let mut terms: Vec<String> = query
        .highlight_terms()
        .into_iter()
        .filter(|term| !term.is_empty())
        .collect();
    if terms.is_empty() {
        return None;
    }
    terms.sort_by(|a, b| b.len().cmp(&a.len()));
    let pattern = terms
        .iter()
        .map(|term| regex::escape(term))
        .collect::<Vec<_>>()
        .join("|");
    RegexBuilder::new(&pattern)
        .case_insensitive(true)
        .build()
        .ok()
}

/// Byte ranges of `text` that match, in order and non-overlapping.
pub fn match_ranges(text: &str, regex: Option<&Regex>) -> Vec<Range<usize>> {
    match regex {
        Some(re) => re.find_iter(text).map(|m| m.range()).collect(),
        None => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::parse_query;

    #[test]
    fn finds_every_case_insensitive_occurrence() {
        let regex = build_highlight_regex(&parse_query("sea")).expect("regex");
        assert_eq!(
            match_ranges("Sea and seashell", Some(&regex)),
            vec![0..3, 8..11]
        );
    }

    #[test]
    fn metacharacters_are_literal() {
        let regex = build_highlight_regex(&parse_query("(a-z)")).expect("regex");
        assert_eq!(match_ranges("Title (A-Z)", Some(&regex)), vec![6..11]);
    }

    #[test]
    fn empty_query_highlights_nothing() {
        assert!(build_highlight_regex(&parse_query("")).is_none());
        assert!(match_ranges("anything", None).is_empty());
    }
}
