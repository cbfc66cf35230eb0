use anyhow::{anyhow, bail, Context, Result};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Environment variable consulted when a cluster has no token of its own
pub const TOKEN_ENV: &str = "ACP_TOKEN";

/// Root of `clusters.yaml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClustersConfig {
    /// Cluster used when a call names none
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_cluster: Option<String>,

    #[serde(default)]
    pub clusters: BTreeMap<String, ClusterConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClusterConfig {
    /// Public API base URL, e.g. `https://public-api-ambient.apps.example.com`
    pub server: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_project: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Bearer token. Never written back out.
    #[serde(default, skip_serializing, deserialize_with = "deserialize_secret")]
    pub token: Option<SecretString>,

    /// File holding the bearer token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_file: Option<PathBuf>,
}

fn deserialize_secret<'de, D>(deserializer: D) -> std::result::Result<Option<SecretString>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.filter(|t| !t.is_empty()).map(SecretString::from))
}

impl ClusterConfig {
    pub fn new(server: impl Into<String>) -> Self {
        Self {
            server: server.into(),
            ..Default::default()
        }
    }

    pub fn with_default_project(mut self, project: impl Into<String>) -> Self {
        self.default_project = Some(project.into());
        self
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(SecretString::from(token.into()));
        self
    }

    /// Resolve the bearer token: configured token, then `token_file`, then `ACP_TOKEN`.
    pub fn resolve_token(&self) -> Result<SecretString> {
        if let Some(token) = &self.token {
            return Ok(token.clone());
        }

        if let Some(path) = &self.token_file {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read token file: {}", path.display()))?;
            let token = content.trim();
            if token.is_empty() {
                bail!("Token file is empty: {}", path.display());
            }
            return Ok(SecretString::from(token.to_string()));
        }

        std::env::var(TOKEN_ENV)
            .ok()
            .filter(|t| !t.is_empty())
            .map(SecretString::from)
            .ok_or_else(|| {
                anyhow!(
                    "No authentication token available. Set 'token' in clusters.yaml or {TOKEN_ENV} environment variable."
                )
            })
    }

    pub fn has_token(&self) -> bool {
        self.resolve_token()
            .map(|token| !token.expose_secret().is_empty())
            .unwrap_or(false)
    }
}

impl ClustersConfig {
    pub fn cluster(&self, name: &str) -> Option<&ClusterConfig> {
        self.clusters.get(name)
    }

    pub fn cluster_mut(&mut self, name: &str) -> Option<&mut ClusterConfig> {
        self.clusters.get_mut(name)
    }

    pub fn cluster_names(&self) -> Vec<&str> {
        self.clusters.keys().map(String::as_str).collect()
    }

    /// Check cross-field constraints that serde cannot express.
    pub fn validate(&self) -> Result<()> {
        if let Some(default) = &self.default_cluster {
            if !self.clusters.contains_key(default) {
                bail!(
                    "default_cluster '{}' is not defined. Configured clusters: {}",
                    default,
                    self.cluster_names().join(", ")
                );
            }
        }

        for (name, cluster) in &self.clusters {
            let server = cluster.server.trim();
            if !(server.starts_with("https://") || server.starts_with("http://")) {
                bail!("Cluster '{name}' server must be an http(s) URL, got '{server}'");
            }
        }

        Ok(())
    }
}
