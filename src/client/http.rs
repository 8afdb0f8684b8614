//! REST implementation of RecordApi over reqwest

use crate::client::envelope::{decode_ack, decode_list, decode_page};
use crate::config::{ApiConfig, EndpointConfig, ViewConfig};
use crate::core::error::{FetchError, MutationError};
use crate::core::query::{ListQuery, Page};
use crate::core::record::{Record, RecordId};
use crate::core::service::{Ack, Fields, RecordApi};
use crate::core::session::SessionContext;
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde_json::{Value, json};
use std::marker::PhantomData;
use std::time::Duration;

/// Header carrying the active profile
pub const PROFILE_HEADER: &str = "X-Profile-Id";

/// Record API talking to the admin REST endpoints
///
/// Every request carries the session token as `Authorization: Bearer` and,
/// when a profile is active, its id in [`PROFILE_HEADER`].
pub struct HttpRecordApi<T> {
    client: Client,
    base_url: String,
    resource: String,
    collection_key: String,
    endpoints: EndpointConfig,
    session: SessionContext,
    timeout: Duration,
    _record: PhantomData<fn() -> T>,
}

impl<T> Clone for HttpRecordApi<T> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            base_url: self.base_url.clone(),
            resource: self.resource.clone(),
            collection_key: self.collection_key.clone(),
            endpoints: self.endpoints.clone(),
            session: self.session.clone(),
            timeout: self.timeout,
            _record: PhantomData,
        }
    }
}

impl<T: Record> HttpRecordApi<T> {
    /// Create a client for the view's resource
    pub fn new(api: &ApiConfig, view: &ViewConfig, session: SessionContext) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(api.request_timeout()).build()?;

        Ok(Self {
            client,
            base_url: api.base_url.trim_end_matches('/').to_string(),
            resource: view.resource.clone(),
            collection_key: view.collection_key().to_string(),
            endpoints: view.endpoints.clone(),
            session,
            timeout: api.request_timeout(),
            _record: PhantomData,
        })
    }

    /// Same client acting for another session
    pub fn with_session(mut self, session: SessionContext) -> Self {
        self.session = session;
        self
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    fn request(&self, method: Method, template: &str, id: Option<&RecordId>) -> RequestBuilder {
        let url = format!(
            "{}{}",
            self.base_url,
            EndpointConfig::render(template, &self.resource, id)
        );
        tracing::debug!(resource = %self.resource, %method, %url, "Sending request");

        let mut builder = self.client.request(method, url);
        if let Some(token) = self.session.bearer_token() {
            builder = builder.bearer_auth(token);
        }
        if let Some(profile) = self.session.profile_id() {
            builder = builder.header(PROFILE_HEADER, profile.as_str());
        }
        builder
    }

    fn after_ms(&self) -> u64 {
        self.timeout.as_millis() as u64
    }

    async fn fetch(&self, builder: RequestBuilder) -> Result<Value, FetchError> {
        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout {
                    after_ms: self.after_ms(),
                }
            } else {
                FetchError::Transport(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Transport(format!("HTTP {}", status)));
        }

        let body = response
            .text()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;
        serde_json::from_str(&body).map_err(|e| FetchError::Parse(e.to_string()))
    }

    async fn mutate(
        &self,
        builder: RequestBuilder,
        operation: &str,
        id: Option<&RecordId>,
    ) -> Result<Ack<T>, MutationError> {
        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                MutationError::Timeout {
                    after_ms: self.after_ms(),
                }
            } else {
                MutationError::Transport(e.to_string())
            }
        })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| MutationError::Transport(e.to_string()))?;

        if status == StatusCode::NOT_FOUND {
            if let Some(id) = id {
                return Err(MutationError::NotFound { id: id.clone() });
            }
        }

        let value = if body.trim().is_empty() {
            Value::Null
        } else {
            match serde_json::from_str::<Value>(&body) {
                Ok(value) => value,
                Err(_) if status.is_success() => {
                    return Err(MutationError::Transport("Invalid JSON response".to_string()));
                }
                Err(_) => return Err(MutationError::Transport(format!("HTTP {}", status))),
            }
        };

        let ack = decode_ack(value, operation)?;
        if !status.is_success() {
            return Err(MutationError::Transport(format!("HTTP {}", status)));
        }
        Ok(ack)
    }
}

#[async_trait]
impl<T: Record> RecordApi<T> for HttpRecordApi<T> {
    async fn list(&self) -> Result<Vec<T>, FetchError> {
        let body = self
            .fetch(self.request(Method::GET, &self.endpoints.list, None))
            .await?;
        decode_list(body, &self.collection_key)
    }

    async fn list_page(&self, query: ListQuery) -> Result<Page<T>, FetchError> {
        let builder = self
            .request(Method::GET, &self.endpoints.list, None)
            .query(&query);
        let body = self.fetch(builder).await?;
        decode_page(body, &self.collection_key, query)
    }

    async fn create(&self, fields: Fields) -> Result<Ack<T>, MutationError> {
        let builder = self
            .request(Method::POST, &self.endpoints.create, None)
            .json(&fields);
        self.mutate(builder, "create", None).await
    }

    async fn update(&self, id: &RecordId, fields: Fields) -> Result<Ack<T>, MutationError> {
        let builder = self
            .request(Method::POST, &self.endpoints.update, Some(id))
            .json(&fields);
        self.mutate(builder, "update", Some(id)).await
    }

    async fn remove(&self, id: &RecordId) -> Result<Ack<T>, MutationError> {
        let builder = self.request(Method::POST, &self.endpoints.remove, Some(id));
        self.mutate(builder, "remove", Some(id)).await
    }

    async fn toggle(&self, id: &RecordId, flag: &str, value: bool) -> Result<Ack<T>, MutationError> {
        let builder = self
            .request(Method::POST, &self.endpoints.toggle, Some(id))
            .json(&json!({ "flag": flag, "value": value }));
        self.mutate(builder, "toggle", Some(id)).await
    }

    async fn clear_all(&self) -> Result<Ack<T>, MutationError> {
        let builder = self.request(Method::POST, &self.endpoints.clear_all, None);
        self.mutate(builder, "clear_all", None).await
    }
}
