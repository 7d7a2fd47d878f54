use std::env;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;

use super::model::{Block, BlockList, QueryResponse};
use super::{Connect, ContentApi, FetchError};
use crate::config::NotionOptions;

const NOTION_VERSION_HEADER: &str = "Notion-Version";

#[derive(Debug, Clone)]
pub struct NotionHttpClient {
    http: Client,
    base_url: String,
}

impl NotionHttpClient {
    pub fn new(token: &str, options: &NotionOptions) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|_| FetchError::MissingCredential(options.token_env.clone()))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        if let Ok(version) = HeaderValue::from_str(&options.api_version) {
            headers.insert(NOTION_VERSION_HEADER, version);
        }
        let http = Client::builder()
            .default_headers(headers)
            .timeout(options.request_timeout())
            .build()?;
        Ok(Self {
            http,
            base_url: options.base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, FetchError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(serde_json::from_str(&body)?)
    }
}

impl ContentApi for NotionHttpClient {
    async fn query_database(&self, database_id: &str) -> Result<Vec<serde_json::Value>, FetchError> {
        let url = format!("{}/v1/databases/{database_id}/query", self.base_url);
        tracing::debug!(%url, "querying database");
        let request = self.http.post(url).json(&serde_json::json!({}));
        let response: QueryResponse = self.send_json(request).await?;
        Ok(response.results)
    }

    async fn list_children(
        &self,
        block_id: &str,
        page_size: Option<u32>,
    ) -> Result<Vec<Block>, FetchError> {
        let url = format!("{}/v1/blocks/{block_id}/children", self.base_url);
        let mut request = self.http.get(url);
        if let Some(size) = page_size {
            request = request.query(&[("page_size", size)]);
        }
        let response: BlockList = self.send_json(request).await?;
        Ok(response.results)
    }
}

/// Builds a client from the bearer token held in the configured environment variable.
#[derive(Debug, Clone)]
pub struct EnvConnector {
    options: NotionOptions,
}

impl EnvConnector {
    pub fn new(options: NotionOptions) -> Self {
        Self { options }
    }
}

impl Connect for EnvConnector {
    type Api = NotionHttpClient;

    fn connect(&self) -> Result<NotionHttpClient, FetchError> {
        let token = env::var(&self.options.token_env)
            .ok()
            .filter(|value| !value.trim().is_empty())
            .ok_or_else(|| FetchError::MissingCredential(self.options.token_env.clone()))?;
        NotionHttpClient::new(token.trim(), &self.options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn missing_token_is_reported_not_panicked() {
        let mut options = NotionOptions::default();
        options.token_env = "POETRY_TEST_TOKEN_THAT_IS_NEVER_SET".to_string();
        let connector = EnvConnector::new(options);
        assert_matches!(
            connector.connect(),
            Err(FetchError::MissingCredential(name)) if name == "POETRY_TEST_TOKEN_THAT_IS_NEVER_SET"
        );
    }
}
