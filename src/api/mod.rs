pub mod activity;
pub mod costs;
pub mod datasources;
pub mod executions;
pub mod format;
pub mod models;
pub mod pagination;
pub mod roles;
pub mod solutions;
pub mod users;
pub mod workspaces;

use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::auth::{PermissionSource, Session};
use crate::cache::{CacheKey, QueryCache, Tag};
use crate::config::AppConfig;
use crate::error::{ClientError, ClientResult};
use crate::http::{ApiRequest, CancelToken, HttpClient};

pub use pagination::{PageRequest, PageWindow, Paged, Pagination};

/// Typed access to the workbench API. Queries go through the tag cache;
/// mutations invalidate the tags they declare once the server accepts them.
#[derive(Debug, Clone)]
pub struct WorkbenchApi {
    http: HttpClient,
    cache: QueryCache,
    session: Option<Arc<Session>>,
}

impl WorkbenchApi {
    pub fn new(http: HttpClient, cache: QueryCache) -> Self {
        Self {
            http,
            cache,
            session: None,
        }
    }

    pub fn from_config(config: &AppConfig) -> ClientResult<Self> {
        Ok(Self::new(
            HttpClient::from_config(&config.api)?,
            QueryCache::new(config.cache.enabled),
        ))
    }

    pub fn with_session(mut self, session: Session) -> Self {
        self.session = Some(Arc::new(session));
        self
    }

    /// Attach a session after login
    pub fn begin_session(&mut self, session: Session) {
        self.cache.reset();
        self.session = Some(Arc::new(session));
    }

    /// Drop the session and everything cached under it
    pub fn end_session(&mut self) {
        self.session = None;
        self.cache.reset();
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_deref()
    }

    /// Session or an `Unauthenticated` error
    pub fn require_session(&self) -> ClientResult<&Session> {
        self.session()
            .ok_or_else(|| ClientError::Unauthenticated("no active session, run 'workbench auth login'".to_string()))
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    pub fn http(&self) -> &HttpClient {
        &self.http
    }

    fn bearer(&self) -> Option<&str> {
        self.session.as_deref().map(Session::access_token)
    }

    /// Serve `key` from cache or fetch it; `provides` computes the tags for
    /// the decoded response.
    pub(crate) async fn query<T, F>(
        &self,
        key: CacheKey,
        request: ApiRequest,
        provides: F,
        cancel: &CancelToken,
    ) -> ClientResult<T>
    where
        T: DeserializeOwned,
        F: FnOnce(&T) -> Vec<Tag>,
    {
        if let Some(hit) = self.cache.get::<T>(&key) {
            tracing::trace!("cache hit for {}", key);
            return Ok(hit);
        }

        let ticket = self.cache.begin();
        let value: Value = self.http.send(request, self.bearer(), cancel).await?;
        let decoded: T = serde_json::from_value(value.clone())?;

        // A late response after teardown is handed back but never cached
        if !cancel.is_cancelled() {
            let tags = provides(&decoded);
            self.cache.store(ticket, key, tags, value);
        }
        Ok(decoded)
    }

    /// Drop the cached entry for `key` and fetch it again
    pub(crate) async fn refetch<T, F>(
        &self,
        key: CacheKey,
        request: ApiRequest,
        provides: F,
        cancel: &CancelToken,
    ) -> ClientResult<T>
    where
        T: DeserializeOwned,
        F: FnOnce(&T) -> Vec<Tag>,
    {
        self.cache.remove(&key);
        self.query(key, request, provides, cancel).await
    }

    /// Run a mutation and invalidate `invalidates` once it succeeds. Failed
    /// or cancelled mutations leave the cache alone.
    pub(crate) async fn mutate<T>(
        &self,
        request: ApiRequest,
        invalidates: Vec<Tag>,
        cancel: &CancelToken,
    ) -> ClientResult<T>
    where
        T: DeserializeOwned,
    {
        let method = request.method.clone();
        let path = request.path.clone();
        let result = self.http.send::<T>(request, self.bearer(), cancel).await;

        if result.is_ok() {
            let removed = self.cache.invalidate(&invalidates);
            tracing::debug!(
                "{} {} invalidated {} cached entr{}",
                method,
                path,
                removed,
                if removed == 1 { "y" } else { "ies" }
            );
        }
        result
    }

    /// Invalidate tags directly, e.g. after an out-of-band change
    pub fn invalidate(&self, tags: &[Tag]) -> usize {
        self.cache.invalidate(tags)
    }
}

#[async_trait]
impl PermissionSource for WorkbenchApi {
    async fn role_permissions(
        &self,
        role: &str,
        access_token: &str,
        cancel: &CancelToken,
    ) -> ClientResult<Vec<String>> {
        // No session exists yet, so the bearer comes from the fresh tokens
        let request = ApiRequest::get(format!("/roles/{}", encode_segment(role)));
        let role: models::Role = self.http.send(request, Some(access_token), cancel).await?;
        Ok(role.permissions)
    }
}

/// Percent-encode a single path segment
pub(crate) fn encode_segment(segment: &str) -> String {
    url::form_urlencoded::byte_serialize(segment.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}
