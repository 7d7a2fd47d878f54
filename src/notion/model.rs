use std::collections::HashMap;

use serde::Deserialize;
use serde_with::{serde_as, DefaultOnNull};

/// Response of a database query. Entries stay raw so each one is decoded on its own.
#[derive(Debug, Deserialize)]
pub struct QueryResponse {
    #[serde(default)]
    pub results: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub struct BlockList {
    #[serde(default)]
    pub results: Vec<Block>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PageObject {
    pub id: String,
    #[serde(default)]
    pub properties: HashMap<String, PropertyValue>,
}

impl PageObject {
    pub fn property(&self, name: &str) -> Option<&PropertyValue> {
        self.properties.get(name)
    }
}

/// Only the property shapes a poem uses; everything else is ignored.
#[serde_as]
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PropertyValue {
    #[serde_as(deserialize_as = "DefaultOnNull")]
    #[serde(default)]
    pub title: Vec<RichText>,
    #[serde(default)]
    pub date: Option<DateValue>,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    #[serde(default)]
    pub files: Vec<FileAttachment>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DateValue {
    #[serde(default)]
    pub start: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FileAttachment {
    #[serde(default)]
    pub file: Option<HostedFile>,
    #[serde(default)]
    pub external: Option<HostedFile>,
}

impl FileAttachment {
    pub fn url(&self) -> Option<&str> {
        self.file
            .as_ref()
            .or(self.external.as_ref())
            .map(|hosted| hosted.url.as_str())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct HostedFile {
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RichText {
    #[serde(default)]
    pub plain_text: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Block {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub paragraph: Option<Paragraph>,
}

impl Block {
    /// Text segments of a paragraph block; `None` for every other block type.
    pub fn paragraph_segments(&self) -> Option<&[RichText]> {
        if self.kind != "paragraph" {
            return None;
        }
        Some(
            self.paragraph
                .as_ref()
                .map(|p| p.rich_text.as_slice())
                .unwrap_or(&[]),
        )
    }
}

#[serde_as]
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Paragraph {
    #[serde_as(deserialize_as = "DefaultOnNull")]
    #[serde(default)]
    pub rich_text: Vec<RichText>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_page_properties_and_ignores_unknown_shapes() {
        let page: PageObject = serde_json::from_value(json!({
            "id": "p1",
            "object": "page",
            "properties": {
                "Title": {"id": "title", "type": "title", "title": [{"plain_text": "Ember"}]},
                "Date": {"id": "d", "type": "date", "date": null},
                "Image": {"id": "i", "type": "files", "files": [
                    {"name": "x.png", "type": "external", "external": {"url": "https://img/x.png"}}
                ]},
                "Tags": {"id": "t", "type": "multi_select", "multi_select": [{"name": "fire"}]}
            }
        }))
        .expect("page decodes");
        assert_eq!(page.property("Title").unwrap().title[0].plain_text, "Ember");
        assert!(page.property("Date").unwrap().date.is_none());
        assert_eq!(
            page.property("Image").unwrap().files[0].url(),
            Some("https://img/x.png")
        );
    }

    #[test]
    fn non_paragraph_blocks_have_no_segments() {
        let blocks: BlockList = serde_json::from_value(json!({
            "results": [
                {"id": "1", "type": "heading_1", "heading_1": {"rich_text": []}},
                {"id": "2", "type": "paragraph", "paragraph": {"rich_text": null}}
            ]
        }))
        .expect("blocks decode");
        assert!(blocks.results[0].paragraph_segments().is_none());
        assert_eq!(blocks.results[1].paragraph_segments().map(|s| s.len()), Some(0));
    }
}
