//! Configuration loading and management

use crate::core::error::ConfigError;
use crate::core::query::SortSpec;
use crate::core::record::{Record, RecordId};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;

/// Where pagination happens
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaginationMode {
    /// Fetch everything, search/sort/paginate locally
    #[default]
    Local,
    /// Fetch one page at a time from the API
    Server,
}

/// How the record store is reconciled after a successful mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReconcilePolicy {
    /// Patch the affected record in place, keep search/sort/page
    Patch,
    /// Refetch the whole collection
    Reload,
}

/// Reconcile policy per operation type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcileConfig {
    pub create: ReconcilePolicy,
    pub update: ReconcilePolicy,
    pub remove: ReconcilePolicy,
    pub toggle: ReconcilePolicy,
    pub clear_all: ReconcilePolicy,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            create: ReconcilePolicy::Reload,
            update: ReconcilePolicy::Reload,
            remove: ReconcilePolicy::Reload,
            toggle: ReconcilePolicy::Patch,
            clear_all: ReconcilePolicy::Reload,
        }
    }
}

/// Route templates, relative to the API base URL
///
/// `{resource}` and `{id}` are substituted when a request is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
    pub list: String,
    pub create: String,
    pub update: String,
    pub remove: String,
    pub toggle: String,
    pub clear_all: String,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            list: "/{resource}".to_string(),
            create: "/{resource}/create".to_string(),
            update: "/{resource}/{id}/update".to_string(),
            remove: "/{resource}/{id}/delete".to_string(),
            toggle: "/{resource}/{id}/toggle".to_string(),
            clear_all: "/{resource}/clear".to_string(),
        }
    }
}

impl EndpointConfig {
    /// Fill a route template
    pub fn render(template: &str, resource: &str, id: Option<&RecordId>) -> String {
        let path = template.replace("{resource}", resource);
        match id {
            Some(id) => path.replace("{id}", id.as_str()),
            None => path,
        }
    }
}

/// Connection settings shared by all views
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL every route is appended to
    pub base_url: String,

    /// Transport-level timeout for one HTTP request
    pub request_timeout_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000/api".to_string(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

impl ApiConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

/// Configuration of one listing view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewConfig {
    /// View name (e.g., "admin-users")
    pub name: String,

    /// Resource segment used in routes (e.g., "users")
    pub resource: String,

    /// Key holding the collection in list responses; defaults to `resource`
    #[serde(default)]
    pub collection_key: Option<String>,

    #[serde(default = "default_page_size")]
    pub page_size: usize,

    #[serde(default)]
    pub pagination: PaginationMode,

    /// Fields searched; empty means the record type's searchable fields
    #[serde(default)]
    pub search_fields: Vec<String>,

    /// Sort applied before the user picks one
    #[serde(default)]
    pub default_sort: Option<SortSpec>,

    /// How long success and error notices stay visible
    #[serde(default = "default_notice_ttl_ms")]
    pub notice_ttl_ms: u64,

    /// Deadline for one fetch or mutation
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// Message shown instead of the list when loading fails
    #[serde(default = "default_error_message")]
    pub generic_error_message: String,

    /// Notice text when the server does not send one
    #[serde(default = "default_success_message")]
    pub success_message: String,

    #[serde(default)]
    pub reconcile: ReconcileConfig,

    #[serde(default)]
    pub endpoints: EndpointConfig,
}

fn default_page_size() -> usize {
    10
}

fn default_notice_ttl_ms() -> u64 {
    2000
}

fn default_request_timeout_ms() -> u64 {
    15_000
}

fn default_error_message() -> String {
    "Une erreur est survenue lors du chargement des données.".to_string()
}

fn default_success_message() -> String {
    "Opération effectuée avec succès".to_string()
}

impl ViewConfig {
    /// Configuration with every default for `resource`
    pub fn new(name: impl Into<String>, resource: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            resource: resource.into(),
            collection_key: None,
            page_size: default_page_size(),
            pagination: PaginationMode::default(),
            search_fields: Vec::new(),
            default_sort: None,
            notice_ttl_ms: default_notice_ttl_ms(),
            request_timeout_ms: default_request_timeout_ms(),
            generic_error_message: default_error_message(),
            success_message: default_success_message(),
            reconcile: ReconcileConfig::default(),
            endpoints: EndpointConfig::default(),
        }
    }

    /// Default configuration for a record type
    pub fn for_record<T: Record>() -> Self {
        let mut config = Self::new(T::resource_name(), T::resource_name());
        config.search_fields = T::searchable_fields().iter().map(|f| f.to_string()).collect();
        config
    }

    pub fn collection_key(&self) -> &str {
        self.collection_key.as_deref().unwrap_or(&self.resource)
    }

    pub fn notice_ttl(&self) -> Duration {
        Duration::from_millis(self.notice_ttl_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Check values that would make the view unusable
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |message: &str| ConfigError::InvalidView {
            view: self.name.clone(),
            message: message.to_string(),
        };

        if self.resource.trim().is_empty() {
            return Err(invalid("resource cannot be empty"));
        }
        if self.page_size == 0 {
            return Err(invalid("page_size must be at least 1"));
        }
        if self.request_timeout_ms == 0 {
            return Err(invalid("request_timeout_ms must be at least 1"));
        }
        Ok(())
    }
}

/// Complete configuration: API settings plus every view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TabulaConfig {
    #[serde(default)]
    pub api: ApiConfig,

    pub views: Vec<ViewConfig>,
}

impl TabulaConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every view and reject duplicate names
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for view in &self.views {
            view.validate()?;
            if !seen.insert(view.name.as_str()) {
                return Err(ConfigError::DuplicateView(view.name.clone()));
            }
        }
        Ok(())
    }

    /// Find a view by name
    pub fn view(&self, name: &str) -> Result<&ViewConfig, ConfigError> {
        self.views
            .iter()
            .find(|view| view.name == name)
            .ok_or_else(|| ConfigError::UnknownView(name.to_string()))
    }

    /// Create a default configuration for the admin dashboards
    pub fn default_config() -> Self {
        let mut users = ViewConfig::new("admin-users", "users");
        users.search_fields = vec!["name".to_string(), "email".to_string()];
        users.default_sort = Some(SortSpec::ascending("name"));

        let mut movies = ViewConfig::new("admin-movies", "movies");
        movies.search_fields = vec!["title".to_string(), "genres".to_string()];
        movies.page_size = 12;

        let mut logs = ViewConfig::new("admin-logs", "logs");
        logs.pagination = PaginationMode::Server;
        logs.page_size = 20;
        logs.search_fields = vec!["action".to_string(), "user".to_string()];
        logs.default_sort = Some(SortSpec::descending("created_at"));

        Self {
            api: ApiConfig::default(),
            views: vec![users, movies, logs],
        }
    }
}
