//! Pure views derived from a store snapshot.
//!
//! Nothing here is cached: every read recomputes from the poems it is given.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator};

use crate::poem::Poem;
use crate::search::SearchQuery;

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(ascii_case_insensitive)]
pub enum SortMode {
    #[default]
    #[strum(serialize = "Recent")]
    Recent,
    #[strum(serialize = "Oldest First")]
    OldestFirst,
    #[strum(serialize = "Title (A-Z)")]
    TitleAsc,
}

impl SortMode {
    /// Unknown labels sort like `Recent`.
    pub fn from_label(label: &str) -> Self {
        label.trim().parse().unwrap_or_default()
    }

    pub fn label(&self) -> &str {
        self.as_ref()
    }

    pub fn cycle(self) -> Self {
        let modes: Vec<SortMode> = SortMode::iter().collect();
        let idx = modes.iter().position(|m| *m == self).unwrap_or(0);
        modes[(idx + 1) % modes.len()]
    }

    pub fn apply(self, poems: &mut [Poem]) {
        match self {
            SortMode::Recent => poems.sort_by(|a, b| b.date.cmp(&a.date)),
            SortMode::OldestFirst => poems.sort_by(|a, b| a.date.cmp(&b.date)),
            SortMode::TitleAsc => poems.sort_by(|a, b| a.title.cmp(&b.title)),
        }
    }
}

/// Every poem, preamble included, newest first. Ties keep fetch order.
pub fn sorted_for_navigation(poems: &[Poem], preamble: Option<&Poem>) -> Vec<Poem> {
    let mut all: Vec<Poem> = poems.iter().map(Poem::summary).collect();
    if let Some(preamble) = preamble {
        if !all.iter().any(|p| p.id == preamble.id) {
            all.push(preamble.summary());
        }
    }
    SortMode::Recent.apply(&mut all);
    all
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Navigation {
    /// Position of the selection in navigation order; `None` when absent.
    pub index: Option<usize>,
    pub total: usize,
    pub prev: Option<Poem>,
    pub next: Option<Poem>,
}

impl Navigation {
    pub fn position_label(&self) -> String {
        let shown = self.index.map(|idx| idx + 1).unwrap_or(0);
        format!("{shown} of {}", self.total)
    }
}

pub fn navigation(ordered: &[Poem], selected_id: Option<&str>) -> Navigation {
    let index =
        selected_id.and_then(|id| ordered.iter().position(|poem| poem.id.as_str() == id));
    let prev = index
        .filter(|idx| *idx > 0)
        .and_then(|idx| ordered.get(idx - 1))
        .cloned();
    let next = index.and_then(|idx| ordered.get(idx + 1)).cloned();
    Navigation {
        index,
        total: ordered.len(),
        prev,
        next,
    }
}

/// The searchable list: preamble excluded, search applied, then sorted.
pub fn filtered_poems(
    poems: &[Poem],
    preamble: Option<&Poem>,
    query: &SearchQuery,
    sort: SortMode,
) -> Vec<Poem> {
    let preamble_id = preamble.map(|p| p.id.as_str());
    let mut visible: Vec<Poem> = poems
        .iter()
        .filter(|poem| Some(poem.id.as_str()) != preamble_id)
        .filter(|poem| query.matches(poem))
        .map(Poem::summary)
        .collect();
    sort.apply(&mut visible);
    visible
}

/// Groups lines into stanzas separated by whitespace-only lines.
pub fn stanzas(lines: &[String]) -> Vec<String> {
    let mut stanzas = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    for line in lines {
        if line.trim().is_empty() {
            if !current.is_empty() {
                stanzas.push(current.join("\n"));
                current.clear();
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        stanzas.push(current.join("\n"));
    }
    stanzas
}

pub fn collection_stats(total: usize, filtered: usize, query: &SearchQuery, sort: SortMode) -> String {
    if !query.is_empty() || sort != SortMode::Recent {
        format!("Showing {filtered} of {total} poems")
    } else {
        format!("{total} poems in collection")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::poem::fixture;
    use crate::search::parse_query;

    fn sample() -> Vec<Poem> {
        vec![
            fixture("a", "Winter Field", "2023-12-01", "snow over stubble..."),
            fixture("b", "lost", "2024-03-10", "where it began..."),
            fixture("c", "Harbor", "2024-01-15", "gulls and rope..."),
            fixture("d", "Afterimage", "2022-07-04", "a light kept burning..."),
        ]
    }

    fn ids(poems: &[Poem]) -> Vec<&str> {
        poems.iter().map(|p| p.id.as_str()).collect()
    }

    #[test]
    fn stanza_grouping_collapses_blank_runs() {
        let lines: Vec<String> = ["a", "", "b", "c", "", "", "d"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(stanzas(&lines), vec!["a", "b\nc", "d"]);
    }

    #[test]
    fn stanza_grouping_trims_edges_and_whitespace_lines() {
        let lines: Vec<String> = ["", "  ", "one", "two", "\t", ""]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(stanzas(&lines), vec!["one\ntwo"]);
        assert!(stanzas(&[]).is_empty());
    }

    #[test]
    fn filtered_list_never_contains_preamble() {
        let poems = sample();
        let preamble = poems[1].clone();
        for sort in SortMode::iter() {
            for term in ["", "l", "lost", "began"] {
                let result = filtered_poems(&poems, Some(&preamble), &parse_query(term), sort);
                assert!(!result.iter().any(|p| p.id == "b"), "{sort} / {term:?}");
            }
        }
    }

    #[test]
    fn search_partitions_non_preamble_poems() {
        let poems = sample();
        let preamble = poems[1].clone();
        let query = parse_query("R");
        let result = filtered_poems(&poems, Some(&preamble), &query, SortMode::Recent);
        for poem in poems.iter().filter(|p| p.id != preamble.id) {
            let included = result.iter().any(|p| p.id == poem.id);
            let hit = poem.title.to_lowercase().contains('r')
                || poem.excerpt.to_lowercase().contains('r');
            assert_eq!(included, hit, "{}", poem.id);
        }
    }

    #[test]
    fn title_sort_is_ordered_and_idempotent() {
        let poems = sample();
        let once = filtered_poems(&poems, None, &SearchQuery::default(), SortMode::TitleAsc);
        assert!(once.windows(2).all(|w| w[0].title <= w[1].title));
        let mut twice = once.clone();
        SortMode::TitleAsc.apply(&mut twice);
        assert_eq!(once, twice);
    }

    #[test]
    fn recent_reversed_equals_oldest_first_for_distinct_dates() {
        let poems = sample();
        let mut recent = filtered_poems(&poems, None, &SearchQuery::default(), SortMode::Recent);
        let oldest = filtered_poems(&poems, None, &SearchQuery::default(), SortMode::OldestFirst);
        recent.reverse();
        assert_eq!(recent, oldest);
    }

    #[test]
    fn date_sort_is_stable_for_ties() {
        let poems = vec![
            fixture("x", "X", "2024-01-01", ""),
            fixture("y", "Y", "2024-01-01", ""),
            fixture("z", "Z", "", ""),
        ];
        let ordered = sorted_for_navigation(&poems, None);
        assert_eq!(ids(&ordered), vec!["x", "y", "z"]);
    }

    #[test]
    fn navigation_includes_preamble_once() {
        let poems = sample();
        let ordered = sorted_for_navigation(&poems, Some(&poems[1]));
        assert_eq!(ids(&ordered), vec!["b", "c", "a", "d"]);

        let detached = fixture("p", "Lost", "2025-01-01", "");
        let ordered = sorted_for_navigation(&poems, Some(&detached));
        assert_eq!(ordered.len(), 5);
        assert_eq!(ordered[0].id, "p");
    }

    #[test]
    fn neighbors_are_symmetric() {
        let ordered = sorted_for_navigation(&sample(), None);
        for poem in &ordered {
            let nav = navigation(&ordered, Some(poem.id.as_str()));
            if let Some(next) = nav.next {
                let back = navigation(&ordered, Some(next.id.as_str()));
                assert_eq!(back.prev.map(|p| p.id), Some(poem.id.clone()));
            }
        }
    }

    #[test]
    fn navigation_edges_and_missing_selection() {
        let ordered = sorted_for_navigation(&sample(), None);
        let first = navigation(&ordered, Some("b"));
        assert_eq!(first.index, Some(0));
        assert!(first.prev.is_none());
        assert_eq!(first.next.map(|p| p.id), Some("c".to_string()));

        let last = navigation(&ordered, Some("d"));
        assert!(last.next.is_none());
        assert_eq!(last.position_label(), "4 of 4");

        let missing = navigation(&ordered, Some("nope"));
        assert_eq!(missing.index, None);
        assert!(missing.prev.is_none() && missing.next.is_none());
        assert_eq!(navigation(&ordered, None).index, None);
    }

    #[test]
    fn sort_labels_round_trip_and_fall_back() {
        assert_eq!(SortMode::from_label("Oldest First"), SortMode::OldestFirst);
        assert_eq!(SortMode::from_label("title (a-z)"), SortMode::TitleAsc);
        assert_eq!(SortMode::from_label("By Mood"), SortMode::Recent);
        assert_eq!(SortMode::TitleAsc.label(), "Title (A-Z)");
        assert_eq!(SortMode::TitleAsc.cycle(), SortMode::Recent);
    }

    #[test]
    fn stats_reflect_overrides() {
        let empty = SearchQuery::default();
        insta::assert_snapshot!(collection_stats(12, 12, &empty, SortMode::Recent), @"12 poems in collection");
        insta::assert_snapshot!(
            collection_stats(12, 3, &parse_query("sea"), SortMode::Recent),
            @"Showing 3 of 12 poems"
        );
        assert_eq!(
            collection_stats(12, 11, &empty, SortMode::TitleAsc),
            "Showing 11 of 12 poems"
        );
        assert_eq!(
            collection_stats(12, 4, &parse_query(" "), SortMode::Recent),
            "Showing 4 of 12 poems"
        );
    }
}
