//! Cluster selection and in-memory credentials for one server instance

use acp_config::{ClusterConfig, ClustersConfig};
use acp_core::ClusterTarget;
use anyhow::{anyhow, Result};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct ClusterSummary {
    pub name: String,
    pub server: String,
    pub description: String,
    pub default_project: Option<String>,
    pub is_default: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ClusterList {
    pub clusters: Vec<ClusterSummary>,
    pub default_cluster: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Whoami {
    pub cluster: String,
    pub server: String,
    pub project: String,
    pub token_valid: bool,
    pub authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Switched {
    pub switched: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current: Option<String>,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Login {
    pub authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cluster: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server: Option<String>,
    pub message: String,
}

fn unknown_cluster(name: &str) -> String {
    format!("Unknown cluster: {name}. Use acp_list_clusters to see available clusters.")
}

/// The selected cluster plus any tokens supplied through `acp_login`.
///
/// Owned by a single server; callers take a [`ClusterTarget`] snapshot per
/// tool call so a concurrent switch never changes a request in flight.
#[derive(Debug, Clone)]
pub struct ClusterContext {
    config: ClustersConfig,
    selected: Option<String>,
}

impl ClusterContext {
    pub fn new(config: ClustersConfig) -> Self {
        let selected = config.default_cluster.clone();
        Self { config, selected }
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    fn current(&self) -> Result<(&str, &ClusterConfig)> {
        let name = self
            .selected
            .as_deref()
            .ok_or_else(|| anyhow!("No cluster specified and no default_cluster configured"))?;
        let cluster = self
            .config
            .cluster(name)
            .ok_or_else(|| anyhow!("Cluster '{name}' not found in configuration"))?;
        Ok((name, cluster))
    }

    /// `default_project` of the selected cluster, used when a call names no project.
    pub fn default_project(&self) -> Option<&str> {
        self.current()
            .ok()
            .and_then(|(_, cluster)| cluster.default_project.as_deref())
    }

    /// Snapshot the selected cluster for one call.
    pub fn target(&self, project: &str) -> Result<ClusterTarget> {
        let (_, cluster) = self.current()?;
        let token = cluster.resolve_token()?;
        Ok(ClusterTarget::new(
            cluster.server.clone(),
            project,
            token.expose_secret(),
        ))
    }

    pub fn list_clusters(&self) -> ClusterList {
        let default_cluster = self.selected.clone();
        let clusters = self
            .config
            .clusters
            .iter()
            .map(|(name, cluster)| ClusterSummary {
                name: name.clone(),
                server: cluster.server.clone(),
                description: cluster.description.clone().unwrap_or_default(),
                default_project: cluster.default_project.clone(),
                is_default: default_cluster.as_deref() == Some(name.as_str()),
            })
            .collect();

        ClusterList {
            clusters,
            default_cluster,
        }
    }

    pub fn whoami(&self) -> Whoami {
        match self.current() {
            Ok((name, cluster)) => {
                let token_valid = cluster.has_token();
                Whoami {
                    cluster: name.to_string(),
                    server: cluster.server.clone(),
                    project: cluster
                        .default_project
                        .clone()
                        .unwrap_or_else(|| "unknown".to_string()),
                    token_valid,
                    authenticated: token_valid,
                    error: None,
                }
            }
            Err(err) => Whoami {
                cluster: "unknown".to_string(),
                server: "unknown".to_string(),
                project: "unknown".to_string(),
                token_valid: false,
                authenticated: false,
                error: Some(err.to_string()),
            },
        }
    }

    pub fn switch(&mut self, name: &str) -> Switched {
        if self.config.cluster(name).is_none() {
            return Switched {
                switched: false,
                previous: None,
                current: None,
                message: unknown_cluster(name),
            };
        }

        let previous = self.selected.replace(name.to_string());
        let from = previous.as_deref().unwrap_or("none");
        Switched {
            switched: true,
            message: format!("Switched from {from} to {name}"),
            previous,
            current: Some(name.to_string()),
        }
    }

    /// Store `token` for `name` (in memory only) and check a token resolves.
    ///
    /// The selected cluster is left unchanged.
    pub fn login(&mut self, name: &str, token: Option<String>) -> Login {
        let Some(cluster) = self.config.cluster_mut(name) else {
            return Login {
                authenticated: false,
                cluster: None,
                server: None,
                message: unknown_cluster(name),
            };
        };

        if let Some(token) = token.filter(|t| !t.is_empty()) {
            cluster.token = Some(SecretString::from(token));
        }

        match cluster.resolve_token() {
            Ok(_) => Login {
                authenticated: true,
                cluster: Some(name.to_string()),
                server: Some(cluster.server.clone()),
                message: format!("Successfully authenticated to cluster '{name}'"),
            },
            Err(err) => Login {
                authenticated: false,
                cluster: Some(name.to_string()),
                server: None,
                message: err.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ClustersConfig {
        let mut config = ClustersConfig {
            default_cluster: Some("prod".to_string()),
            ..Default::default()
        };
        config.clusters.insert(
            "prod".to_string(),
            ClusterConfig::new("https://prod.example.com")
                .with_default_project("workspace")
                .with_token("prod-token"),
        );
        config.clusters.insert(
            "staging".to_string(),
            ClusterConfig::new("https://staging.example.com"),
        );
        config
    }

    #[test]
    fn test_target_uses_selected_cluster() {
        let context = ClusterContext::new(config());
        let target = context.target("workspace").unwrap();
        assert_eq!(target.server, "https://prod.example.com");
        assert_eq!(target.project, "workspace");
        assert_eq!(target.token().expose_secret(), "prod-token");
        assert_eq!(context.default_project(), Some("workspace"));
    }

    #[test]
    fn test_list_clusters_marks_default() {
        let list = ClusterContext::new(config()).list_clusters();
        assert_eq!(list.default_cluster.as_deref(), Some("prod"));
        assert_eq!(list.clusters.len(), 2);
        assert!(list.clusters.iter().any(|c| c.name == "prod" && c.is_default));
        assert!(list.clusters.iter().any(|c| c.name == "staging" && !c.is_default));
    }

    #[test]
    fn test_switch_cluster() {
        let mut context = ClusterContext::new(config());

        let switched = context.switch("staging");
        assert!(switched.switched);
        assert_eq!(switched.previous.as_deref(), Some("prod"));
        assert_eq!(switched.message, "Switched from prod to staging");
        assert_eq!(context.selected(), Some("staging"));

        let rejected = context.switch("nope");
        assert!(!rejected.switched);
        assert_eq!(
            rejected.message,
            "Unknown cluster: nope. Use acp_list_clusters to see available clusters."
        );
        assert_eq!(context.selected(), Some("staging"));
    }

    #[test]
    fn test_login_sets_token_without_switching() {
        let mut context = ClusterContext::new(config());

        let login = context.login("staging", Some("fresh-token".to_string()));
        assert!(login.authenticated);
        assert_eq!(login.server.as_deref(), Some("https://staging.example.com"));
        assert_eq!(context.selected(), Some("prod"));

        context.switch("staging");
        let target = context.target("other").unwrap();
        assert_eq!(target.token().expose_secret(), "fresh-token");
    }

    #[test]
    fn test_login_unknown_cluster() {
        let mut context = ClusterContext::new(config());
        let login = context.login("nope", Some("t".to_string()));
        assert!(!login.authenticated);
        assert!(login.message.starts_with("Unknown cluster: nope"));
    }

    #[test]
    fn test_whoami_without_selection() {
        let mut config = config();
        config.default_cluster = None;
        let whoami = ClusterContext::new(config).whoami();
        assert_eq!(whoami.cluster, "unknown");
        assert!(!whoami.authenticated);
        assert_eq!(
            whoami.error.as_deref(),
            Some("No cluster specified and no default_cluster configured")
        );
    }

    #[test]
    fn test_whoami_reports_selected_cluster() {
        let whoami = ClusterContext::new(config()).whoami();
        assert_eq!(whoami.cluster, "prod");
        assert_eq!(whoami.project, "workspace");
        assert!(whoami.token_valid);
    }
}
