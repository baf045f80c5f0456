//! Remote workspace entity.

use serde::{Deserialize, Serialize};

/// A workspace as reported by the remote run-management service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workspace {
    /// Stable external ID (e.g. `ws-3yVQZvHzf5j3WRJ1`). Survives renames.
    pub id: String,
    /// Mutable, organization-scoped name.
    pub name: String,
    /// Owning organization. `None` when the response did not include it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization: Option<Organization>,
    pub auto_apply: bool,
    pub file_triggers_enabled: bool,
    pub operations: bool,
    pub queue_all_runs: bool,
    /// Pinned Terraform version. Empty when the server has not reported one.
    #[serde(default)]
    pub terraform_version: String,
    #[serde(default)]
    pub trigger_prefixes: Vec<String>,
    /// Working directory. The empty string is a real value (repository root).
    #[serde(default)]
    pub working_directory: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssh_key: Option<SshKeyRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vcs_repo: Option<VcsRepo>,
}

impl Workspace {
    /// Returns the organization name, if the entity carries one.
    #[must_use]
    pub fn organization_name(&self) -> Option<&str> {
        self.organization.as_ref().map(|o| o.name.as_str())
    }

    /// Returns the linked SSH key ID, or an empty string when none is linked.
    #[must_use]
    pub fn ssh_key_id(&self) -> &str {
        self.ssh_key.as_ref().map(|k| k.id.as_str()).unwrap_or_default()
    }
}

/// Organization reference embedded in a workspace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    pub name: String,
}

impl Organization {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// SSH key linked to a workspace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SshKeyRef {
    pub id: String,
}

/// VCS repository connected to a workspace.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VcsRepo {
    /// Repository identifier, e.g. `acme/web`.
    pub identifier: String,
    /// Tracked branch. Empty means the repository default branch.
    #[serde(default)]
    pub branch: String,
    #[serde(default)]
    pub ingress_submodules: bool,
    pub oauth_token_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessors_without_links() {
        let ws = Workspace {
            id: "ws-1".into(),
            name: "web".into(),
            ..Default::default()
        };
        assert_eq!(ws.organization_name(), None);
        assert_eq!(ws.ssh_key_id(), "");
    }

    #[test]
    fn test_accessors_with_links() {
        let ws = Workspace {
            id: "ws-1".into(),
            name: "web".into(),
            organization: Some(Organization::new("acme")),
            ssh_key: Some(SshKeyRef {
                id: "sshkey-1".into(),
            }),
            ..Default::default()
        };
        assert_eq!(ws.organization_name(), Some("acme"));
        assert_eq!(ws.ssh_key_id(), "sshkey-1");
    }

    #[test]
    fn test_deserialize_omitted_optionals() {
        let ws: Workspace = serde_json::from_value(serde_json::json!({
            "id": "ws-1",
            "name": "web",
            "auto_apply": true,
            "file_triggers_enabled": true,
            "operations": true,
            "queue_all_runs": false
        }))
        .unwrap();
        assert!(ws.auto_apply);
        assert!(ws.trigger_prefixes.is_empty());
        assert_eq!(ws.working_directory, "");
        assert!(ws.vcs_repo.is_none());
    }
}
