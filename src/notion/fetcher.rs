use futures::future::join_all;

use super::model::{Block, PageObject};
use super::{ContentApi, FetchError};
use crate::poem::{Poem, NO_CONTENT, UNTITLED};

const EXCERPT_SEGMENTS: usize = 3;
const EXCERPT_SUFFIX: &str = "...";

/// Turns database entries into poems.
#[derive(Debug, Clone)]
pub struct PoemFetcher<A> {
    api: A,
    excerpt_page_size: u32,
}

impl<A: ContentApi> PoemFetcher<A> {
    pub fn new(api: A, excerpt_page_size: u32) -> Self {
        Self {
            api,
            excerpt_page_size,
        }
    }

    /// Fetches every entry and converts them concurrently.
    ///
    /// Only the database query itself can fail the call. An entry that cannot be
    /// decoded, or whose blocks cannot be read, is logged and left out.
    pub async fn fetch_collection(&self, database_id: &str) -> Result<Vec<Poem>, FetchError> {
        let entries = self.api.query_database(database_id).await?;
        let total = entries.len();
        let processed = join_all(entries.into_iter().map(|entry| self.process_entry(entry))).await;
        let poems: Vec<Poem> = processed.into_iter().flatten().collect();
        if poems.len() < total {
            tracing::warn!(
                dropped = total - poems.len(),
                total,
                "some database entries were skipped"
            );
        }
        tracing::info!(count = poems.len(), "fetched poem collection");
        Ok(poems)
    }

    /// Every paragraph of one entry, one line per block.
    pub async fn fetch_content(&self, poem_id: &str) -> Result<Vec<String>, FetchError> {
        let blocks = self.api.list_children(poem_id, None).await?;
        Ok(content_lines(&blocks))
    }

    async fn process_entry(&self, entry: serde_json::Value) -> Option<Poem> {
        let page: PageObject = match serde_json::from_value(entry) {
            Ok(page) => page,
            Err(err) => {
                tracing::error!(?err, "failed to decode database entry");
                return None;
            }
        };
        match self
            .api
            .list_children(&page.id, Some(self.excerpt_page_size))
            .await
        {
            Ok(blocks) => Some(process_page(&page, &blocks)),
            Err(err) => {
                tracing::error!(page_id = %page.id, ?err, "failed to process page");
                None
            }
        }
    }
}

/// Normalizes a page and its leading blocks into a list-view poem.
pub fn process_page(page: &PageObject, blocks: &[Block]) -> Poem {
    let title = page
        .property("Title")
        .and_then(|prop| prop.title.first())
        .map(|text| text.plain_text.clone())
        .unwrap_or_else(|| UNTITLED.to_string());
    let date = page
        .property("Date")
        .and_then(|prop| prop.date.as_ref())
        .and_then(|date| date.start.clone())
        .unwrap_or_default();
    let image_url = page
        .property("Image")
        .and_then(|prop| prop.files.first())
        .and_then(|file| file.url())
        .map(str::to_string);
    Poem {
        id: page.id.clone(),
        title,
        date,
        image_url,
        excerpt: build_excerpt(blocks),
        content: Vec::new(),
    }
}

/// First segment of up to three non-empty paragraphs, joined and suffixed.
pub fn build_excerpt(blocks: &[Block]) -> String {
    let segments: Vec<&str> = blocks
        .iter()
        .filter_map(Block::paragraph_segments)
        .filter_map(|segments| segments.first())
        .map(|text| text.plain_text.as_str())
        .take(EXCERPT_SEGMENTS)
        .collect();
    if segments.is_empty() {
        NO_CONTENT.to_string()
    } else {
        format!("{}{EXCERPT_SUFFIX}", segments.join(" "))
    }
}

/// Paragraph blocks flattened to lines; an empty paragraph stays as `""`.
pub fn content_lines(blocks: &[Block]) -> Vec<String> {
    blocks
        .iter()
        .filter_map(Block::paragraph_segments)
        .map(|segments| {
            segments
                .iter()
                .map(|text| text.plain_text.as_str())
                .collect::<String>()
        })
        .collect()
}

/// The first poem whose title matches the sentinel, ignoring case.
pub fn find_preamble<'a>(poems: &'a [Poem], sentinel: &str) -> Option<&'a Poem> {
    let sentinel = sentinel.to_lowercase();
    poems
        .iter()
        .find(|poem| poem.title.to_lowercase() == sentinel)
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::{HashMap, HashSet};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::notion::Connect;

    /// Scripted in-memory API.
    #[derive(Debug, Clone, Default)]
    pub struct ScriptedApi {
        pub pages: Vec<serde_json::Value>,
        pub blocks: HashMap<String, Vec<Block>>,
        pub failing_query: bool,
        pub failing_children: HashSet<String>,
        pub query_calls: Arc<AtomicUsize>,
    }

    impl ScriptedApi {
        pub fn with_page(mut self, id: &str, title: &str, date: &str, lines: &[&str]) -> Self {
            self.pages.push(page_json(id, title, date));
            self.blocks.insert(id.to_string(), paragraphs(lines));
            self
        }

        pub fn failing_blocks_for(mut self, id: &str) -> Self {
            self.failing_children.insert(id.to_string());
            self
        }

        pub fn queries(&self) -> usize {
            self.query_calls.load(Ordering::SeqCst)
        }
    }

    impl ContentApi for ScriptedApi {
        async fn query_database(&self, _database_id: &str) -> Result<Vec<serde_json::Value>, FetchError> {
            self.query_calls.fetch_add(1, Ordering::SeqCst);
            if self.failing_query {
                return Err(FetchError::Status {
                    status: 502,
                    body: "bad gateway".to_string(),
                });
            }
            Ok(self.pages.clone())
        }

        async fn list_children(
            &self,
            block_id: &str,
            page_size: Option<u32>,
        ) -> Result<Vec<Block>, FetchError> {
            if self.failing_children.contains(block_id) {
                return Err(FetchError::Status {
                    status: 500,
                    body: "internal error".to_string(),
                });
            }
            let blocks = self.blocks.get(block_id).cloned().unwrap_or_default();
            Ok(match page_size {
                Some(size) => blocks.into_iter().take(size as usize).collect(),
                None => blocks,
            })
        }
    }

    /// Hands out clones of the scripted API, or reports a missing token.
    #[derive(Debug, Clone)]
    pub struct ScriptedConnector(pub Option<ScriptedApi>);

    impl Connect for ScriptedConnector {
        type Api = ScriptedApi;

        fn connect(&self) -> Result<ScriptedApi, FetchError> {
            self.0
                .clone()
                .ok_or_else(|| FetchError::MissingCredential("NOTION_API_KEY".to_string()))
        }
    }

    pub fn page_json(id: &str, title: &str, date: &str) -> serde_json::Value {
        json!({
            "id": id,
            "properties": {
                "Title": {"type": "title", "title": [{"plain_text": title}]},
                "Date": {"type": "date", "date": if date.is_empty() { json!(null) } else { json!({"start": date}) }},
                "Image": {"type": "files", "files": []}
            }
        })
    }

    pub fn paragraphs(lines: &[&str]) -> Vec<Block> {
        lines
            .iter()
            .map(|line| {
                let rich_text = if line.is_empty() {
                    json!([])
                } else {
                    json!([{"plain_text": line}])
                };
                serde_json::from_value(json!({
                    "id": format!("b-{line}"),
                    "type": "paragraph",
                    "paragraph": {"rich_text": rich_text}
                }))
                .expect("paragraph block")
            })
            .collect()
    }
}
