//! Fetch operations that commit their results into the [`PoemStore`].
//!
//! Each operation catches every failure at its outer edge and turns it into
//! store state; callers never see an error. The `spawn_*` variants run the same
//! operations as detached tokio tasks.

use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::config::AppConfig;
use crate::notion::{find_preamble, Connect, FetchError, PoemFetcher};
use crate::store::PoemStore;

pub const CONTENT_KEY_MISSING: &str = "Notion API key not configured.";
pub const CONTENT_FAILED: &str = "A problem occurred while loading the poem.";

pub struct PoetryService<C> {
    connector: Arc<C>,
    store: PoemStore,
    database_id: String,
    preamble_title: String,
    excerpt_page_size: u32,
}

impl<C> Clone for PoetryService<C> {
    fn clone(&self) -> Self {
        Self {
            connector: Arc::clone(&self.connector),
            store: self.store.clone(),
            database_id: self.database_id.clone(),
            preamble_title: self.preamble_title.clone(),
            excerpt_page_size: self.excerpt_page_size,
        }
    }
}

impl<C: Connect> PoetryService<C> {
    pub fn new(connector: C, store: PoemStore, config: &AppConfig) -> Self {
        Self {
            connector: Arc::new(connector),
            store,
            database_id: config.notion.database_id.clone(),
            preamble_title: config.preamble_title.clone(),
            excerpt_page_size: config.notion.excerpt_page_size,
        }
    }

    pub fn store(&self) -> &PoemStore {
        &self.store
    }

    /// Loads the whole collection and publishes it in one commit.
    pub async fn fetch_poems(&self) {
        self.store.begin_loading();
        let api = match self.connector.connect() {
            Ok(api) => api,
            Err(FetchError::MissingCredential(var)) => {
                tracing::warn!(%var, "content API credential missing");
                self.store.fail_loading(format!(
                    "{var} is not set. Please add it to your environment variables."
                ));
                return;
            }
            Err(err) => {
                tracing::error!(?err, "failed to build content API client");
                self.store
                    .fail_loading(format!("Failed to fetch poems: {err}"));
                return;
            }
        };
        let fetcher = PoemFetcher::new(api, self.excerpt_page_size);
        match fetcher.fetch_collection(&self.database_id).await {
            Ok(poems) => {
                let preamble = find_preamble(&poems, &self.preamble_title).cloned();
                if let Some(preamble) = &preamble {
                    tracing::debug!(poem_id = %preamble.id, "preamble poem found");
                }
                self.store.finish_loading(poems, preamble);
            }
            Err(err) => {
                tracing::error!(?err, database_id = %self.database_id, "failed to fetch poems");
                self.store
                    .fail_loading(format!("Failed to fetch poems: {err}"));
            }
        }
    }

    /// Selects a poem and fills in its full text.
    ///
    /// The collection is fetched first only when nothing is loaded yet.
    pub async fn load_poem(&self, poem_id: &str) {
        if poem_id.is_empty() {
            return;
        }
        self.store.begin_selection(poem_id);
        if !self.store.has_poems() {
            self.fetch_poems().await;
        }
        if self.store.resolve_selection(poem_id).is_none() {
            tracing::info!(%poem_id, "requested poem is not in the collection");
            return;
        }
        let api = match self.connector.connect() {
            Ok(api) => api,
            Err(FetchError::MissingCredential(var)) => {
                tracing::warn!(%var, "content API credential missing");
                self.store.fail_detail(poem_id, CONTENT_KEY_MISSING);
                return;
            }
            Err(err) => {
                tracing::error!(?err, %poem_id, "failed to build content API client");
                self.store.fail_detail(poem_id, CONTENT_FAILED);
                return;
            }
        };
        let fetcher = PoemFetcher::new(api, self.excerpt_page_size);
        match fetcher.fetch_content(poem_id).await {
            Ok(lines) => {
                if !self.store.merge_content(poem_id, lines) {
                    tracing::debug!(%poem_id, "selection moved on before content arrived");
                }
            }
            Err(err) => {
                tracing::error!(?err, %poem_id, "failed to fetch poem content");
                self.store.fail_detail(poem_id, CONTENT_FAILED);
            }
        }
    }

    pub fn spawn_fetch_poems(&self, runtime: &Handle) -> JoinHandle<()> {
        let service = self.clone();
        runtime.spawn(async move { service.fetch_poems().await })
    }

    pub fn spawn_load_poem(&self, runtime: &Handle, poem_id: String) -> JoinHandle<()> {
        let service = self.clone();
        runtime.spawn(async move { service.load_poem(&poem_id).await })
    }
}
