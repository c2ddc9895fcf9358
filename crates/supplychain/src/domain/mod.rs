//! Domain types for supply-chain navigation.
//!
//! This module contains the data carried between the source, the graph
//! builder and the navigator. Wire names follow the collaborator's JSON
//! (`mainApp`, `applicationId`, ...), so snapshots deserialize directly.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Unique identifier for an application
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApplicationId(pub String);

impl ApplicationId {
    /// Create a new application ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the ID is empty (a missing id on the wire)
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ApplicationId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ApplicationId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// An application as the collaborator reports it.
///
/// Identity is `id`; `name` is display-only and not guaranteed unique.
/// Missing or `null` fields deserialize to empty strings so that malformed
/// neighbor entries survive decoding and can be filtered by the graph builder.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Application {
    /// Application identifier
    #[serde(rename = "applicationId", default, deserialize_with = "null_as_default")]
    pub id: ApplicationId,

    /// Display name
    #[serde(rename = "applicationName", default, deserialize_with = "null_as_default")]
    pub name: String,
}

impl Application {
    /// Create a new application
    pub fn new(id: impl Into<ApplicationId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }

    /// Whether both the id and the name are present
    pub fn is_complete(&self) -> bool {
        !self.id.is_empty() && !self.name.is_empty()
    }
}

/// Descriptive fields of an application, shown next to the centered node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationDetails {
    /// Business capability the application belongs to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capability_name: Option<String>,

    /// Name of the API the application exposes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_name: Option<String>,

    /// Endpoint of that API
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_endpoint: Option<String>,
}

impl ApplicationDetails {
    /// Whether no field is set
    pub fn is_empty(&self) -> bool {
        self.capability_name.is_none() && self.api_name.is_none() && self.api_endpoint.is_none()
    }

    /// The exposed API, if the application names one
    pub fn api(&self) -> Option<ApiSummary> {
        let api_name = self.api_name.as_deref().filter(|name| !name.is_empty())?;
        Some(ApiSummary {
            api_name: api_name.to_string(),
            api_endpoint: self.api_endpoint.clone(),
        })
    }
}

/// An API exposed by an application
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiSummary {
    /// API name
    pub api_name: String,

    /// Endpoint, when one was registered
    pub api_endpoint: Option<String>,
}

/// Endpoint suggested for an API name.
///
/// A trailing `API` (any case) is dropped, the rest is split into
/// kebab-case words at ASCII capitals, and the result is appended to
/// `/api/v1`: `OrderHistoryAPI` gives `/api/v1order-history`. Returns `None`
/// for an empty name.
pub fn default_api_endpoint(api_name: &str) -> Option<String> {
    if api_name.is_empty() {
        return None;
    }
    let base = match api_name.len().checked_sub(3) {
        Some(i) if api_name.get(i..).is_some_and(|tail| tail.eq_ignore_ascii_case("api")) => {
            &api_name[..i]
        }
        _ => api_name,
    };

    let mut kebab = String::with_capacity(base.len() + 4);
    for c in base.chars() {
        if c.is_ascii_uppercase() {
            kebab.push('-');
        }
        kebab.push(c);
    }
    let kebab = kebab.to_lowercase();
    let kebab = kebab.strip_prefix('-').unwrap_or(&kebab);
    Some(format!("/api/v1{kebab}"))
}

/// One fetch result: a main application and its immediate neighbors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupplyChainSnapshot {
    /// The application the snapshot is centered on
    pub main_app: Application,

    /// Applications feeding into the main application
    #[serde(default)]
    pub upstream_apps: Vec<Application>,

    /// Applications consuming the main application
    #[serde(default)]
    pub downstream_apps: Vec<Application>,

    /// Descriptive fields of the main application, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main_details: Option<ApplicationDetails>,
}

impl SupplyChainSnapshot {
    /// Whether the main application has no neighbors other than `origin`.
    ///
    /// Seen from `origin`, such an application leads nowhere new.
    pub fn is_dead_end_from(&self, origin: &ApplicationId) -> bool {
        !self
            .upstream_apps
            .iter()
            .chain(&self.downstream_apps)
            .any(|app| app.is_complete() && app.id != *origin && app.id != self.main_app.id)
    }
}

/// One step of the breadcrumb trail
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Application identifier
    pub id: ApplicationId,

    /// Display name at the time of the visit
    pub name: String,
}

impl HistoryEntry {
    /// Create a new history entry
    pub fn new(id: impl Into<ApplicationId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

impl From<&Application> for HistoryEntry {
    fn from(app: &Application) -> Self {
        Self {
            id: app.id.clone(),
            name: app.name.clone(),
        }
    }
}

/// A neighbor reference inside an [`ApplicationRecord`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelatedApplication {
    /// Neighbor identifier
    #[serde(rename = "appId", default, deserialize_with = "null_as_default")]
    pub app_id: ApplicationId,

    /// Neighbor display name
    #[serde(rename = "appName", default, deserialize_with = "null_as_default")]
    pub app_name: String,
}

impl RelatedApplication {
    /// Create a new neighbor reference
    pub fn new(app_id: impl Into<ApplicationId>, app_name: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
            app_name: app_name.into(),
        }
    }

    /// Whether both the id and the name are present
    pub fn is_complete(&self) -> bool {
        !self.app_id.is_empty() && !self.app_name.is_empty()
    }
}

/// An application registration: the application itself plus its direct
/// relations, as submitted by the create-application form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationRecord {
    /// Application identifier
    #[serde(default, deserialize_with = "null_as_default")]
    pub application_id: ApplicationId,

    /// Display name
    #[serde(default, deserialize_with = "null_as_default")]
    pub application_name: String,

    /// Descriptive fields
    #[serde(flatten)]
    pub details: ApplicationDetails,

    /// Applications providing to this one
    #[serde(default)]
    pub upstream_apps: Vec<RelatedApplication>,

    /// Applications this one provides to
    #[serde(default)]
    pub downstream_apps: Vec<RelatedApplication>,
}

impl ApplicationRecord {
    /// Create a record with no details and no relations
    pub fn new(id: impl Into<ApplicationId>, name: impl Into<String>) -> Self {
        Self {
            application_id: id.into(),
            application_name: name.into(),
            ..Self::default()
        }
    }

    /// Add an upstream relation
    #[must_use]
    pub fn with_upstream(mut self, id: impl Into<ApplicationId>, name: impl Into<String>) -> Self {
        self.upstream_apps.push(RelatedApplication::new(id, name));
        self
    }

    /// Add a downstream relation
    #[must_use]
    pub fn with_downstream(
        mut self,
        id: impl Into<ApplicationId>,
        name: impl Into<String>,
    ) -> Self {
        self.downstream_apps.push(RelatedApplication::new(id, name));
        self
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
