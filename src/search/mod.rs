use crate::poem::Poem;

/// A case-insensitive substring query over poem titles and excerpts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchQuery {
    raw: String,
    needle: String,
}

impl SearchQuery {
    pub fn is_empty(&self) -> bool {
        self.needle.is_empty()
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn matches(&self, poem: &Poem) -> bool {
        if self.needle.is_empty() {
            return true;
        }
        poem.title.to_lowercase().contains(&self.needle)
            || poem.excerpt.to_lowercase().contains(&self.needle)
    }

    pub fn highlight_terms(&self) -> Vec<String> {
        if self.raw.is_empty() {
            Vec::new()
        } else {
            vec![self.raw.clone()]
        }
    }
}

/// The whole input, spaces included, is one term. Only empty input means no search.
pub fn parse_query(input: &str) -> SearchQuery {
    if input.is_empty() {
        return SearchQuery::default();
    }
    SearchQuery {
        raw: input.to_string(),
        needle: input.to_lowercase(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::poem::fixture;

    #[test]
    fn matches_title_or_excerpt_ignoring_case() {
        let poem = fixture("1", "Morning Tide", "2024-01-01", "salt on the window...");
        assert!(parse_query("tide").matches(&poem));
        assert!(parse_query("SALT").matches(&poem));
        assert!(!parse_query("dusk").matches(&poem));
    }

    #[test]
    fn empty_input_matches_everything() {
        let query = parse_query("");
        assert!(query.is_empty());
        assert!(query.highlight_terms().is_empty());
        assert!(query.matches(&fixture("1", "Any", "", "")));
    }

    #[test]
    fn whitespace_only_input_is_a_real_term() {
        let query = parse_query(" ");
        assert!(!query.is_empty());
        assert!(query.matches(&fixture("1", "Two Words", "", "")));
        assert!(!query.matches(&fixture("2", "Single", "", "one...")));
    }

    #[test]
    fn keeps_inner_whitespace_as_part_of_the_term() {
        let poem = fixture("1", "the long road", "", "");
        assert!(parse_query("long road").matches(&poem));
        assert!(!parse_query("long  road").matches(&poem));
    }
}
