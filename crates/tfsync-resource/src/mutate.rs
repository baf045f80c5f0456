//! Create, update and delete requests.

use tfsync_client::{
    OpContext, VcsRepoOptions, WorkspaceClient, WorkspaceCreateOptions, WorkspaceUpdateOptions,
};
use tfsync_core::{WorkspaceId, pack_workspace_id};
use tracing::{debug, info, warn};

use crate::diff::ChangeSet;
use crate::error::{Operation, ResourceError};
use crate::schema::{VcsRepoConfig, WorkspaceConfig};
use crate::state::{LocalRecord, WorkspaceState};

/// Builds the create request from the declared configuration.
#[must_use]
pub fn create_options(config: &WorkspaceConfig) -> WorkspaceCreateOptions {
    WorkspaceCreateOptions {
        name: config.name.clone(),
        auto_apply: Some(config.auto_apply),
        file_triggers_enabled: Some(config.file_triggers_enabled),
        operations: Some(config.operations),
        queue_all_runs: Some(config.queue_all_runs),
        terraform_version: config.declared_terraform_version().map(str::to_string),
        trigger_prefixes: (!config.trigger_prefixes.is_empty())
            .then(|| config.trigger_prefixes.clone()),
        working_directory: Some(
            config
                .working_directory
                .as_deref()
                .unwrap_or_default()
                .to_string(),
        ),
        vcs_repo: config.vcs_repo.as_ref().map(|vcs| VcsRepoOptions {
            branch: (!vcs.branch.is_empty()).then(|| vcs.branch.clone()),
            ..vcs_options(vcs)
        }),
    }
}

/// Builds the update request. Working directory is only sent when declared;
/// an undeclared Terraform version re-sends the last observed one.
#[must_use]
pub fn update_options(config: &WorkspaceConfig, prior: &WorkspaceState) -> WorkspaceUpdateOptions {
    let terraform_version = match config.declared_terraform_version() {
        Some(version) => Some(version.to_string()),
        None => (!prior.terraform_version.is_empty()).then(|| prior.terraform_version.clone()),
    };

    WorkspaceUpdateOptions {
        name: Some(config.name.clone()),
        auto_apply: Some(config.auto_apply),
        file_triggers_enabled: Some(config.file_triggers_enabled),
        operations: Some(config.operations),
        queue_all_runs: Some(config.queue_all_runs),
        terraform_version,
        trigger_prefixes: Some(config.trigger_prefixes.clone()),
        working_directory: config.working_directory.as_deref().map(str::to_string),
        vcs_repo: config.vcs_repo.as_ref().map(|vcs| VcsRepoOptions {
            branch: Some(vcs.branch.clone()),
            ..vcs_options(vcs)
        }),
    }
}

fn vcs_options(vcs: &VcsRepoConfig) -> VcsRepoOptions {
    VcsRepoOptions {
        identifier: Some(vcs.identifier.clone()),
        branch: None,
        ingress_submodules: Some(vcs.ingress_submodules),
        oauth_token_id: Some(vcs.oauth_token_id.clone()),
    }
}

/// The SSH key step of one create or update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SshKeyAction {
    Assign(String),
    Unassign,
}

impl SshKeyAction {
    /// Maps a declared key to the action that links it. Empty unlinks.
    #[must_use]
    pub fn for_declared(ssh_key_id: &str) -> Self {
        if ssh_key_id.is_empty() {
            Self::Unassign
        } else {
            Self::Assign(ssh_key_id.to_string())
        }
    }

    fn verb(&self) -> &'static str {
        match self {
            Self::Assign(_) => "assigning",
            Self::Unassign => "unassigning",
        }
    }
}

async fn apply_ssh_key<C>(
    client: &C,
    ctx: &OpContext,
    external_id: &str,
    action: &SshKeyAction,
    name: &str,
    identifier: &str,
) -> Result<(), ResourceError>
where
    C: WorkspaceClient + ?Sized,
{
    debug!(external_id, name, action = action.verb(), "linking SSH key");
    let result = match action {
        SshKeyAction::Assign(key) => client.assign_ssh_key(ctx, external_id, key).await,
        SshKeyAction::Unassign => client.unassign_ssh_key(ctx, external_id).await,
    };
    result.map(|_| ()).map_err(|source| ResourceError::SshKey {
        action: action.verb(),
        name: name.to_string(),
        identifier: identifier.to_string(),
        source,
    })
}

/// Creates the workspace and links its SSH key, returning the new record.
///
/// A failure of the SSH key step leaves the workspace in place remotely.
pub async fn create_workspace<C>(
    client: &C,
    ctx: &OpContext,
    config: &WorkspaceConfig,
) -> Result<LocalRecord, ResourceError>
where
    C: WorkspaceClient + ?Sized,
{
    debug!(
        organization = %config.organization,
        name = %config.name,
        backend = client.backend_name(),
        "creating workspace"
    );
    let workspace = client
        .create(ctx, &config.organization, &create_options(config))
        .await
        .map_err(|e| ResourceError::remote(Operation::Create, &config.organization, &config.name, e))?;

    let id = pack_workspace_id(&workspace).map_err(|source| ResourceError::PackId {
        name: config.name.clone(),
        source,
    })?;
    info!(id = %id, external_id = %workspace.id, "created workspace");

    if !config.ssh_key_id.is_empty() {
        let action = SshKeyAction::for_declared(&config.ssh_key_id);
        apply_ssh_key(client, ctx, &workspace.id, &action, &config.name, &id).await?;
    }

    Ok(LocalRecord::new(id, workspace.id))
}

/// Applies `changes` to the workspace described by `prior`.
///
/// The primary request is skipped when only the SSH key changed. The key is
/// linked through the cached external ID, so it still resolves after a
/// rename in the same cycle.
pub async fn update_workspace<C>(
    client: &C,
    ctx: &OpContext,
    prior: &WorkspaceState,
    config: &WorkspaceConfig,
    changes: &ChangeSet,
) -> Result<LocalRecord, ResourceError>
where
    C: WorkspaceClient + ?Sized,
{
    let current = WorkspaceId::parse(&prior.id)?.0;
    let mut id = current.pack();

    if changes.has_primary() {
        debug!(
            organization = %current.organization,
            name = %current.name,
            changes = %changes,
            "updating workspace"
        );
        let workspace = client
            .update(
                ctx,
                &current.organization,
                &current.name,
                &update_options(config, prior),
            )
            .await
            .map_err(|e| {
                ResourceError::remote(Operation::Update, &current.organization, &current.name, e)
            })?;

        id = pack_workspace_id(&workspace).map_err(|source| ResourceError::PackId {
            name: config.name.clone(),
            source,
        })?;
        if workspace.name != current.name {
            info!(from = %current.name, to = %workspace.name, "renamed workspace");
        }
    }

    if changes.ssh_key_changed() {
        let action = SshKeyAction::for_declared(&config.ssh_key_id);
        apply_ssh_key(client, ctx, &prior.external_id, &action, &config.name, &id).await?;
    }

    Ok(LocalRecord::new(id, prior.external_id.clone()))
}

/// Deletes the workspace behind `id`. A workspace that is already gone
/// counts as deleted.
pub async fn delete_workspace<C>(client: &C, ctx: &OpContext, id: &str) -> Result<(), ResourceError>
where
    C: WorkspaceClient + ?Sized,
{
    let (target, _) = WorkspaceId::parse(id)?;

    match client.delete(ctx, &target.organization, &target.name).await {
        Ok(()) => {
            info!(organization = %target.organization, name = %target.name, "deleted workspace");
            Ok(())
        }
        Err(e) if e.is_not_found() => {
            warn!(
                organization = %target.organization,
                name = %target.name,
                "workspace already deleted"
            );
            Ok(())
        }
        Err(e) => Err(ResourceError::remote(
            Operation::Delete,
            &target.organization,
            &target.name,
            e,
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Declared;

    fn prior() -> WorkspaceState {
        WorkspaceState {
            id: "acme/web".into(),
            external_id: "ws-1".into(),
            name: "web".into(),
            organization: "acme".into(),
            auto_apply: false,
            file_triggers_enabled: true,
            operations: true,
            queue_all_runs: true,
            terraform_version: "1.6.0".into(),
            trigger_prefixes: vec!["modules/".into()],
            working_directory: "infra".into(),
            ssh_key_id: String::new(),
            vcs_repo: None,
        }
    }

    #[test]
    fn test_create_options_defaults() {
        let options = create_options(&WorkspaceConfig::new("acme", "web"));
        assert_eq!(options.name, "web");
        assert_eq!(options.auto_apply, Some(false));
        assert_eq!(options.queue_all_runs, Some(true));
        assert_eq!(options.terraform_version, None);
        assert_eq!(options.trigger_prefixes, None);
        assert_eq!(options.working_directory.as_deref(), Some(""));
        assert!(options.vcs_repo.is_none());
    }

    #[test]
    fn test_create_options_branch_only_when_set() {
        let mut config = WorkspaceConfig::new("acme", "web");
        config.vcs_repo = Some(VcsRepoConfig::new("acme/web", "ot-1"));
        let vcs = create_options(&config).vcs_repo.unwrap();
        assert_eq!(vcs.branch, None);
        assert_eq!(vcs.identifier.as_deref(), Some("acme/web"));

        config.vcs_repo.as_mut().unwrap().branch = "main".into();
        let vcs = create_options(&config).vcs_repo.unwrap();
        assert_eq!(vcs.branch.as_deref(), Some("main"));
    }

    #[test]
    fn test_update_options_working_directory_only_when_declared() {
        let mut config = WorkspaceConfig::new("acme", "web");
        assert_eq!(update_options(&config, &prior()).working_directory, None);

        config.working_directory = Declared::Empty;
        assert_eq!(
            update_options(&config, &prior()).working_directory.as_deref(),
            Some("")
        );
    }

    #[test]
    fn test_update_options_resends_prior_terraform_version() {
        let config = WorkspaceConfig::new("acme", "web");
        let options = update_options(&config, &prior());
        assert_eq!(options.terraform_version.as_deref(), Some("1.6.0"));
        // Undeclared prefixes clear the prior list.
        assert_eq!(options.trigger_prefixes, Some(Vec::new()));
    }

    #[test]
    fn test_update_options_always_sends_branch() {
        let mut config = WorkspaceConfig::new("acme", "web");
        config.vcs_repo = Some(VcsRepoConfig::new("acme/web", "ot-1"));
        let vcs = update_options(&config, &prior()).vcs_repo.unwrap();
        assert_eq!(vcs.branch.as_deref(), Some(""));
    }

    #[test]
    fn test_ssh_key_action_for_declared() {
        assert_eq!(
            SshKeyAction::for_declared("sshkey-1"),
            SshKeyAction::Assign("sshkey-1".into())
        );
        assert_eq!(SshKeyAction::for_declared(""), SshKeyAction::Unassign);
    }
}
