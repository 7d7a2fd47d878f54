use serde::{Deserialize, Serialize};

pub const UNTITLED: &str = "Untitled";
pub const NO_CONTENT: &str = "No content.";

/// A normalized poem record as shown in the collection and detail views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Poem {
    pub id: String,
    pub title: String,
    /// ISO date string, empty when the source has no date.
    pub date: String,
    pub image_url: Option<String>,
    pub excerpt: String,
    /// Populated only for the selected poem once its blocks are loaded.
    #[serde(default)]
    pub content: Vec<String>,
}

impl Poem {
    pub fn has_content(&self) -> bool {
        !self.content.is_empty()
    }

    /// A copy suitable for list views, with content cleared.
    pub fn summary(&self) -> Poem {
        Poem {
            content: Vec::new(),
            ..self.clone()
        }
    }
}

#[cfg(test)]
pub(crate) fn fixture(id: &str, title: &str, date: &str, excerpt: &str) -> Poem {
    Poem {
        id: id.to_string(),
        title: title.to_string(),
        date: date.to_string(),
        image_url: None,
        excerpt: excerpt.to_string(),
        content: Vec::new(),
    }
}
