//! Deployment manifest models.
//!
//! Manifests are plain JSON documents edited by users and relayed to the
//! deploy endpoint. The client reads only what it needs: the project
//! manifest drives the build-and-apply flow, and service manifests pass
//! through an image-tag override with every unrecognised field preserved.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while reading manifests.
#[derive(Error, Debug)]
pub enum ManifestError {
    /// The manifest is not valid JSON.
    #[error("invalid manifest JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The manifest declares a schema version this client does not know.
    #[error("unsupported manifest version {0:?} (supported: {VERSION_V1})")]
    UnsupportedVersion(String),

    /// A required field is missing or empty.
    #[error("manifest field `{0}` is missing or empty")]
    EmptyField(&'static str),
}

/// Result type for manifest operations.
pub type Result<T> = std::result::Result<T, ManifestError>;

/// Manifest schema version accepted by this client.
pub const VERSION_V1: &str = "v1";

/// Version-peek envelope for a project manifest.
///
/// Deserialising only the `version` field lets callers decide which
/// concrete schema to commit to before touching the rest of the document.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Project {
    /// Declared schema version; empty when the manifest predates versioning.
    #[serde(default)]
    pub version: String,
}

impl Project {
    /// Peek at the schema version declared in raw manifest bytes.
    pub fn peek_version(bytes: &[u8]) -> Result<String> {
        let envelope: Self = serde_json::from_slice(bytes)?;
        Ok(envelope.version)
    }
}

/// A v1 project manifest.
///
/// The wire form uses camelCase keys (`teamName`, `projectName`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectV1 {
    /// Declared schema version.
    #[serde(default)]
    pub version: String,

    /// Team owning the project; first segment of built image tags.
    #[serde(default)]
    pub team_name: String,

    /// Project name; second segment of built image tags.
    #[serde(default)]
    pub project_name: String,

    /// Deploy endpoint this project's services are applied to.
    #[serde(default)]
    pub endpoint: String,

    /// Route manifest files belonging to the project.
    #[serde(default)]
    pub routes: Vec<String>,

    /// Service manifest files to apply after a build.
    #[serde(default)]
    pub services: Vec<String>,
}

impl ProjectV1 {
    /// Parse a project manifest, enforcing the version guard.
    ///
    /// A missing or empty `version` is treated as v1. Any other value is
    /// rejected; schema evolution beyond this guard is out of scope.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let version = Project::peek_version(bytes)?;
        if !version.is_empty() && version != VERSION_V1 {
            return Err(ManifestError::UnsupportedVersion(version));
        }
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Build the container image tag for this project at a revision.
    ///
    /// The revision usually comes from `git rev-parse --short HEAD`,
    /// whose output carries a trailing newline; whitespace is trimmed
    /// here so the tag stays valid.
    pub fn image_tag(&self, revision: &str) -> Result<String> {
        let revision = revision.trim();
        if self.team_name.is_empty() {
            return Err(ManifestError::EmptyField("teamName"));
        }
        if self.project_name.is_empty() {
            return Err(ManifestError::EmptyField("projectName"));
        }
        if revision.is_empty() {
            return Err(ManifestError::EmptyField("revision"));
        }
        Ok(format!(
            "{}/{}:{}",
            self.team_name, self.project_name, revision
        ))
    }
}

/// A single containerised workload and its image tag.
///
/// Only `name` and `image` are interpreted; everything else in the
/// document rides along in `rest`, so a locally-mutated service can be
/// PUT back without dropping server-owned fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Service {
    /// Service name, used for progress reporting. `None` when the
    /// document carries no `name` key, so serialising adds nothing;
    /// an explicit `"name": ""` is kept as-is.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Container image the service runs.
    #[serde(default)]
    pub image: String,

    /// Fields this client does not interpret.
    #[serde(flatten)]
    pub rest: serde_json::Map<String, serde_json::Value>,
}

impl Service {
    /// Parse a service manifest.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Serialise the service back to JSON bytes.
    pub fn to_vec(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }
}
