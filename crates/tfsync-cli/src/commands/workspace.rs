use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;
use tfsync_client::{OpContext, WorkspaceClient};
use tfsync_resource::{ReadOutcome, WorkspaceConfig, WorkspaceResource};

use crate::cli::OutputFormat;
use crate::output::{print_state, print_success, print_warning};
use crate::state_file;

pub type Resource = WorkspaceResource<dyn WorkspaceClient>;

fn load_optional_config(path: Option<&Path>) -> Result<Option<WorkspaceConfig>> {
    path.map(state_file::load_config).transpose()
}

/// Writes a present outcome to the state file and drops the file otherwise.
fn persist(state_path: &Path, outcome: ReadOutcome) -> Result<()> {
    match outcome {
        ReadOutcome::Present(state) => {
            state_file::save(state_path, &state)?;
            print_success(&format!("Workspace {} is in sync", state.id.cyan()));
        }
        ReadOutcome::Gone => {
            state_file::remove(state_path)?;
            print_warning("Workspace no longer exists; removed it from the state file");
        }
    }
    Ok(())
}

async fn create(resource: &Resource, ctx: &OpContext, config: &WorkspaceConfig) -> Result<ReadOutcome> {
    resource.create(ctx, config).await.with_context(|| {
        format!(
            "Failed to create workspace {}/{}",
            config.organization, config.name
        )
    })
}

pub async fn apply(
    resource: &Resource,
    ctx: &OpContext,
    state_path: &Path,
    config_path: &Path,
) -> Result<()> {
    let config = state_file::load_config(config_path)?;
    config.validate()?;

    let outcome = match state_file::load(state_path)? {
        None => create(resource, ctx, &config).await?,
        Some(prior) => {
            let refreshed = resource
                .read(ctx, &prior.record(), Some(&config))
                .await
                .with_context(|| format!("Failed to refresh workspace {}", prior.id))?;
            match refreshed {
                ReadOutcome::Gone => {
                    print_warning(&format!("Workspace {} no longer exists; creating it", prior.id));
                    create(resource, ctx, &config).await?
                }
                ReadOutcome::Present(current) => {
                    match resource.update(ctx, &current, &config).await {
                        Ok(outcome) => outcome,
                        Err(e) if e.requires_replacement() => {
                            print_warning(&format!("{e}; replacing {}", current.id));
                            resource
                                .delete(ctx, &current.id)
                                .await
                                .with_context(|| format!("Failed to delete workspace {}", current.id))?;
                            state_file::remove(state_path)?;
                            create(resource, ctx, &config).await?
                        }
                        Err(e) => {
                            return Err(e)
                                .with_context(|| format!("Failed to update workspace {}", current.id));
                        }
                    }
                }
            }
        }
    };

    persist(state_path, outcome)
}

pub async fn refresh(
    resource: &Resource,
    ctx: &OpContext,
    state_path: &Path,
    config_path: Option<&Path>,
) -> Result<()> {
    let config = load_optional_config(config_path)?;
    let Some(prior) = state_file::load(state_path)? else {
        anyhow::bail!(
            "No workspace in {}. Run `tfsync apply` or `tfsync import` first",
            state_path.display()
        );
    };

    let outcome = resource
        .read(ctx, &prior.record(), config.as_ref())
        .await
        .with_context(|| format!("Failed to refresh workspace {}", prior.id))?;
    persist(state_path, outcome)
}

pub async fn import(
    resource: &Resource,
    ctx: &OpContext,
    state_path: &Path,
    id: &str,
    config_path: Option<&Path>,
) -> Result<()> {
    if let Some(existing) = state_file::load(state_path)? {
        anyhow::bail!(
            "{} already tracks workspace {}",
            state_path.display(),
            existing.id
        );
    }
    let config = load_optional_config(config_path)?;

    let state = resource
        .import(ctx, id, config.as_ref())
        .await
        .with_context(|| format!("Failed to import workspace {id}"))?;
    persist(state_path, ReadOutcome::Present(state))
}

pub async fn destroy(resource: &Resource, ctx: &OpContext, state_path: &Path) -> Result<()> {
    let Some(prior) = state_file::load(state_path)? else {
        print_warning("Nothing to destroy");
        return Ok(());
    };

    // Refresh first so a workspace renamed out of band is deleted under its
    // current name rather than reported gone by a stale one.
    let current = resource
        .read(ctx, &prior.record(), None)
        .await
        .with_context(|| format!("Failed to refresh workspace {}", prior.id))?;
    let ReadOutcome::Present(current) = current else {
        state_file::remove(state_path)?;
        print_warning(&format!(
            "Workspace {} no longer exists; removed it from the state file",
            prior.id
        ));
        return Ok(());
    };

    resource
        .delete(ctx, &current.id)
        .await
        .with_context(|| format!("Failed to delete workspace {}", current.id))?;
    state_file::remove(state_path)?;
    print_success(&format!("Deleted workspace {}", current.id.cyan()));
    Ok(())
}

pub fn show(state_path: &Path, format: OutputFormat) -> Result<()> {
    match state_file::load(state_path)? {
        Some(state) => print_state(&state, format),
        None => {
            println!("No workspace in {}.", state_path.display());
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;
    use std::sync::Arc;

    use tfsync_client_memory::{InMemoryWorkspaceClient, Operation, RecordedCall};

    use super::*;

    struct Fixture {
        _dir: tempfile::TempDir,
        client: Arc<InMemoryWorkspaceClient>,
        resource: Resource,
        state: PathBuf,
        config: PathBuf,
    }

    fn fixture(declaration: &str) -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("web.toml");
        fs::write(&config, declaration).unwrap();
        let client = Arc::new(InMemoryWorkspaceClient::new());
        let dyn_client: Arc<dyn WorkspaceClient> = client.clone();
        Fixture {
            state: dir.path().join("workspace.tfstate.json"),
            config,
            resource: WorkspaceResource::new(dyn_client),
            client,
            _dir: dir,
        }
    }

    const WEB: &str = "name = \"web\"\norganization = \"acme\"\n";

    #[tokio::test]
    async fn test_apply_creates_then_updates() {
        let f = fixture(WEB);
        let ctx = OpContext::new();

        apply(&f.resource, &ctx, &f.state, &f.config).await.unwrap();
        let created = state_file::load(&f.state).unwrap().unwrap();
        assert_eq!(created.id, "acme/web");

        fs::write(&f.config, format!("{WEB}auto_apply = true\n")).unwrap();
        apply(&f.resource, &ctx, &f.state, &f.config).await.unwrap();
        let updated = state_file::load(&f.state).unwrap().unwrap();
        assert!(updated.auto_apply);
        assert_eq!(updated.external_id, created.external_id);
        assert_eq!(f.client.call_count(Operation::Create).await, 1);
    }

    #[tokio::test]
    async fn test_apply_recreates_gone_workspace() {
        let f = fixture(WEB);
        let ctx = OpContext::new();
        apply(&f.resource, &ctx, &f.state, &f.config).await.unwrap();
        let first = state_file::load(&f.state).unwrap().unwrap();
        f.client.remove(&first.external_id).await;

        apply(&f.resource, &ctx, &f.state, &f.config).await.unwrap();
        let second = state_file::load(&f.state).unwrap().unwrap();
        assert_ne!(second.external_id, first.external_id);
    }

    #[tokio::test]
    async fn test_apply_replaces_on_organization_change() {
        let f = fixture(WEB);
        let ctx = OpContext::new();
        apply(&f.resource, &ctx, &f.state, &f.config).await.unwrap();

        fs::write(&f.config, "name = \"web\"\norganization = \"other\"\n").unwrap();
        apply(&f.resource, &ctx, &f.state, &f.config).await.unwrap();

        let state = state_file::load(&f.state).unwrap().unwrap();
        assert_eq!(state.id, "other/web");
        assert_eq!(f.client.call_count(Operation::Delete).await, 1);
        assert_eq!(f.client.count().await, 1);
    }

    #[tokio::test]
    async fn test_refresh_follows_rename_and_drops_gone() {
        let f = fixture(WEB);
        let ctx = OpContext::new();
        apply(&f.resource, &ctx, &f.state, &f.config).await.unwrap();
        let state = state_file::load(&f.state).unwrap().unwrap();

        f.client.rename(&state.external_id, "web-renamed").await;
        refresh(&f.resource, &ctx, &f.state, None).await.unwrap();
        let renamed = state_file::load(&f.state).unwrap().unwrap();
        assert_eq!(renamed.id, "acme/web-renamed");

        f.client.remove(&state.external_id).await;
        refresh(&f.resource, &ctx, &f.state, None).await.unwrap();
        assert!(!f.state.exists());
    }

    #[tokio::test]
    async fn test_failed_apply_keeps_state_file() {
        let f = fixture(WEB);
        let ctx = OpContext::new();
        apply(&f.resource, &ctx, &f.state, &f.config).await.unwrap();
        let before = fs::read_to_string(&f.state).unwrap();

        fs::write(&f.config, format!("{WEB}auto_apply = true\n")).unwrap();
        f.client
            .fail_next(
                Operation::Update,
                tfsync_client::ClientError::http(500, "boom"),
            )
            .await;
        let err = apply(&f.resource, &ctx, &f.state, &f.config)
            .await
            .unwrap_err();
        assert!(format!("{err:#}").contains("HTTP 500: boom"));
        assert_eq!(fs::read_to_string(&f.state).unwrap(), before);
    }

    #[tokio::test]
    async fn test_import_and_destroy() {
        let f = fixture(WEB);
        let ctx = OpContext::new();
        f.client.seed("acme", "web").await;

        import(&f.resource, &ctx, &f.state, "web|acme", None)
            .await
            .unwrap();
        assert_eq!(state_file::load(&f.state).unwrap().unwrap().id, "acme/web");

        // A second import into the same state file is refused.
        assert!(
            import(&f.resource, &ctx, &f.state, "acme/web", None)
                .await
                .is_err()
        );

        destroy(&f.resource, &ctx, &f.state).await.unwrap();
        assert!(!f.state.exists());
        assert_eq!(f.client.count().await, 0);
    }

    #[tokio::test]
    async fn test_destroy_follows_rename() {
        let f = fixture(WEB);
        let ctx = OpContext::new();
        apply(&f.resource, &ctx, &f.state, &f.config).await.unwrap();
        let state = state_file::load(&f.state).unwrap().unwrap();
        f.client.rename(&state.external_id, "web-renamed").await;

        destroy(&f.resource, &ctx, &f.state).await.unwrap();

        assert!(!f.state.exists());
        assert_eq!(f.client.count().await, 0);
        assert!(f.client.calls().await.contains(&RecordedCall::Delete {
            organization: "acme".into(),
            name: "web-renamed".into(),
        }));
    }

    #[tokio::test]
    async fn test_destroy_of_gone_workspace_only_drops_state() {
        let f = fixture(WEB);
        let ctx = OpContext::new();
        apply(&f.resource, &ctx, &f.state, &f.config).await.unwrap();
        let state = state_file::load(&f.state).unwrap().unwrap();
        f.client.remove(&state.external_id).await;

        destroy(&f.resource, &ctx, &f.state).await.unwrap();

        assert!(!f.state.exists());
        assert_eq!(f.client.call_count(Operation::Delete).await, 0);
    }

    #[tokio::test]
    async fn test_import_missing_workspace_fails() {
        let f = fixture(WEB);
        let err = import(&f.resource, &OpContext::new(), &f.state, "acme/nope", None)
            .await
            .unwrap_err();
        assert!(format!("{err:#}").contains("workspace not found"));
        assert!(!f.state.exists());
    }
}
