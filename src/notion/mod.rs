//! Access to the Notion content API and conversion of its pages into poems.

use std::future::Future;

use thiserror::Error;

mod client;
mod fetcher;
pub mod model;

pub use client::{EnvConnector, NotionHttpClient};
pub use fetcher::{build_excerpt, content_lines, find_preamble, process_page, PoemFetcher};

#[cfg(test)]
pub(crate) use fetcher::testing;

use self::model::Block;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("missing API credential: environment variable {0} is not set")]
    MissingCredential(String),
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("content API returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// The two endpoints poems are built from.
///
/// Futures must be `Send` so fetches can run as detached tokio tasks.
pub trait ContentApi: Send + Sync + 'static {
    /// Raw entries of a database, one JSON object per page.
    fn query_database(
        &self,
        database_id: &str,
    ) -> impl Future<Output = Result<Vec<serde_json::Value>, FetchError>> + Send;

    fn list_children(
        &self,
        block_id: &str,
        page_size: Option<u32>,
    ) -> impl Future<Output = Result<Vec<Block>, FetchError>> + Send;
}

/// Produces an API client per fetch, so a credential set after startup is picked up.
pub trait Connect: Send + Sync + 'static {
    type Api: ContentApi;

    fn connect(&self) -> Result<Self::Api, FetchError>;
}
