//! HTTP client for the posts REST API
//!
//! Wraps the `/posts` and `/users` endpoints of a JSONPlaceholder-style API.
//! Collection requests are made force-cache: a previously stored response is
//! preferred over the network whenever one exists.

use reqwest::Client;
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use super::{ApiError, Post, PostDraft, User};
use crate::cache::CacheManager;

/// Default base URL for the posts API
pub const DEFAULT_BASE_URL: &str = "https://jsonplaceholder.typicode.com";

/// Client for the posts API
#[derive(Debug, Clone)]
pub struct PostsClient {
    /// HTTP client for making requests
    http_client: Client,
    /// Store for force-cache responses; `None` disables it
    cache_manager: Option<CacheManager>,
    /// Base URL for the API (allows override for testing)
    base_url: String,
}

impl Default for PostsClient {
    fn default() -> Self {
        Self::new()
    }
}

impl PostsClient {
    /// Creates a new PostsClient with default configuration
    pub fn new() -> Self {
        Self {
            http_client: Client::new(),
            cache_manager: CacheManager::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Replaces the base URL; a trailing slash is ignored
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Replaces the response cache (`None` disables force-cache storage)
    pub fn with_cache(mut self, cache_manager: Option<CacheManager>) -> Self {
        self.cache_manager = cache_manager;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn cache_key(url: &str) -> String {
        format!("GET {}", url)
    }

    /// Drops the stored GET response for `url`, if any
    fn invalidate(&self, url: &str) {
        if let Some(ref cache_manager) = self.cache_manager {
            if let Err(e) = cache_manager.remove(&Self::cache_key(url)) {
                warn!(%url, error = %e, "failed to drop stored response");
            } else {
                debug!(%url, "stored response dropped");
            }
        }
    }

    /// Fetches every post (force-cache)
    pub async fn get_posts(&self) -> Result<Vec<Post>, ApiError> {
        self.get_force_cache("/posts").await
    }

    /// Fetches a single post
    pub async fn get_post(&self, id: u64) -> Result<Post, ApiError> {
        let url = self.url(&format!("/posts/{}", id));
        debug!(%url, "GET");
        let response = self.http_client.get(&url).send().await?;
        parse_body(response).await
    }

    /// Creates a post and returns the server's copy of it
    ///
    /// A successful create drops the stored `GET /posts` response, so the
    /// next `get_posts` goes back to the network.
    pub async fn create_post(&self, draft: &PostDraft) -> Result<Post, ApiError> {
        let url = self.url("/posts");
        debug!(%url, title = %draft.title, "POST");
        let response = self.http_client.post(&url).json(draft).send().await?;
        let status = response.status();
        let post = parse_body(response).await?;
        if status.is_success() {
            self.invalidate(&url);
        }
        Ok(post)
    }

    /// Replaces a post and returns the server's copy of it
    pub async fn update_post(&self, id: u64, draft: &PostDraft) -> Result<Post, ApiError> {
        let url = self.url(&format!("/posts/{}", id));
        debug!(%url, "PUT");
        let response = self.http_client.put(&url).json(draft).send().await?;
        parse_body(response).await
    }

    /// Deletes a post
    ///
    /// # Returns
    /// * `Ok(true)` if the server answered with a 2xx status
    /// * `Ok(false)` for any other status
    /// * `Err(ApiError)` if the request could not be made
    pub async fn delete_post(&self, id: u64) -> Result<bool, ApiError> {
        let url = self.url(&format!("/posts/{}", id));
        debug!(%url, "DELETE");
        let response = self.http_client.delete(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            warn!(%url, %status, "delete rejected");
        }
        Ok(status.is_success())
    }

    /// Fetches every user (force-cache)
    pub async fn get_users(&self) -> Result<Vec<User>, ApiError> {
        self.get_force_cache("/users").await
    }

    /// GET with force-cache semantics
    ///
    /// A stored response for the same URL is returned regardless of its age.
    /// Otherwise the network is used and the parsed response stored. Failing
    /// to store is logged and does not fail the request.
    async fn get_force_cache<T>(&self, path: &str) -> Result<T, ApiError>
    where
        T: Serialize + DeserializeOwned,
    {
        let url = self.url(path);
        let cache_key = Self::cache_key(&url);

        if let Some(ref cache_manager) = self.cache_manager {
            if let Some(cached) = cache_manager.read::<T>(&cache_key) {
                debug!(%url, cached_at = %cached.cached_at, "served from response cache");
                return Ok(cached.data);
            }
        }

        debug!(%url, "GET");
        let response = self.http_client.get(&url).send().await?;
        let data: T = parse_body(response).await?;

        if let Some(ref cache_manager) = self.cache_manager {
            if let Err(e) = cache_manager.write(&cache_key, &data) {
                warn!(%url, error = %e, "failed to store response");
            }
        }

        Ok(data)
    }
}

/// Reads the body as JSON without looking at the status code
async fn parse_body<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
    let text = response.text().await?;
    Ok(serde_json::from_str(&text)?)
}
