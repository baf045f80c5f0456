//! Persisted workspace state.

use serde::{Deserialize, Serialize};
use tfsync_core::{IdError, Workspace, pack_workspace_id};

/// The minimal record needed to find a workspace again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalRecord {
    /// Packed `<organization>/<name>` identifier. May be in the legacy
    /// `<name>|<organization>` form when it predates the current format.
    pub id: String,
    /// Cached external ID. Empty if it was never observed.
    #[serde(default)]
    pub external_id: String,
}

impl LocalRecord {
    pub fn new(id: impl Into<String>, external_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            external_id: external_id.into(),
        }
    }
}

/// Observed attributes of a workspace after a successful read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceState {
    pub id: String,
    pub external_id: String,
    pub name: String,
    pub organization: String,
    pub auto_apply: bool,
    pub file_triggers_enabled: bool,
    pub operations: bool,
    pub queue_all_runs: bool,
    #[serde(default)]
    pub terraform_version: String,
    #[serde(default)]
    pub trigger_prefixes: Vec<String>,
    #[serde(default)]
    pub working_directory: String,
    /// Empty when no key is linked.
    #[serde(default)]
    pub ssh_key_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vcs_repo: Option<VcsRepoState>,
}

/// Observed VCS block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VcsRepoState {
    pub identifier: String,
    /// Only recorded when the configuration tracks an explicit branch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    pub ingress_submodules: bool,
    pub oauth_token_id: String,
}

impl WorkspaceState {
    /// Builds the state from a fetched workspace, re-packing its identifier
    /// from the current organization and name.
    pub fn from_workspace(workspace: &Workspace, track_branch: bool) -> Result<Self, IdError> {
        let id = pack_workspace_id(workspace)?;
        let organization = workspace
            .organization_name()
            .ok_or(IdError::MissingOrganization)?
            .to_string();

        Ok(Self {
            id,
            external_id: workspace.id.clone(),
            name: workspace.name.clone(),
            organization,
            auto_apply: workspace.auto_apply,
            file_triggers_enabled: workspace.file_triggers_enabled,
            operations: workspace.operations,
            queue_all_runs: workspace.queue_all_runs,
            terraform_version: workspace.terraform_version.clone(),
            trigger_prefixes: workspace.trigger_prefixes.clone(),
            working_directory: workspace.working_directory.clone(),
            ssh_key_id: workspace.ssh_key_id().to_string(),
            vcs_repo: workspace.vcs_repo.as_ref().map(|vcs| VcsRepoState {
                identifier: vcs.identifier.clone(),
                branch: track_branch.then(|| vcs.branch.clone()),
                ingress_submodules: vcs.ingress_submodules,
                oauth_token_id: vcs.oauth_token_id.clone(),
            }),
        })
    }

    #[must_use]
    pub fn record(&self) -> LocalRecord {
        LocalRecord::new(self.id.clone(), self.external_id.clone())
    }
}

#[cfg(test)]
mod tests {
    use tfsync_core::{Organization, VcsRepo};

    use super::*;

    fn workspace() -> Workspace {
        Workspace {
            id: "ws-abc".into(),
            name: "web".into(),
            organization: Some(Organization::new("acme")),
            vcs_repo: Some(VcsRepo {
                identifier: "acme/web".into(),
                branch: "main".into(),
                ingress_submodules: false,
                oauth_token_id: "ot-1".into(),
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_from_workspace_packs_current_id() {
        let state = WorkspaceState::from_workspace(&workspace(), false).unwrap();
        assert_eq!(state.id, "acme/web");
        assert_eq!(state.record(), LocalRecord::new("acme/web", "ws-abc"));
        assert_eq!(state.ssh_key_id, "");
    }

    #[test]
    fn test_branch_only_recorded_when_tracked() {
        let untracked = WorkspaceState::from_workspace(&workspace(), false).unwrap();
        assert_eq!(untracked.vcs_repo.unwrap().branch, None);

        let tracked = WorkspaceState::from_workspace(&workspace(), true).unwrap();
        assert_eq!(tracked.vcs_repo.unwrap().branch.as_deref(), Some("main"));
    }

    #[test]
    fn test_missing_organization() {
        let mut ws = workspace();
        ws.organization = None;
        assert_eq!(
            WorkspaceState::from_workspace(&ws, false),
            Err(IdError::MissingOrganization)
        );
    }

    #[test]
    fn test_json_shape() {
        let state = WorkspaceState::from_workspace(&workspace(), false).unwrap();
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["id"], "acme/web");
        assert!(json["vcs_repo"].get("branch").is_none());
        let back: WorkspaceState = serde_json::from_value(json).unwrap();
        assert_eq!(back, state);
    }
}
