//! Workspace lifecycle entry points.
//!
//! Every operation returns new state instead of mutating the caller's
//! record. On error the caller keeps what it had and retries the whole
//! operation.

use std::sync::Arc;

use tfsync_client::{OpContext, WorkspaceClient};
use tfsync_core::IdFormat;
use tracing::{debug, info, warn};

use crate::diff::ChangeSet;
use crate::drift::{Reconciled, reconcile};
use crate::error::ResourceError;
use crate::mutate::{create_workspace, delete_workspace, update_workspace};
use crate::schema::WorkspaceConfig;
use crate::state::{LocalRecord, WorkspaceState};

/// Result of a read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    Present(WorkspaceState),
    /// The workspace no longer exists; the caller drops its record.
    Gone,
}

impl ReadOutcome {
    #[must_use]
    pub fn is_gone(&self) -> bool {
        matches!(self, Self::Gone)
    }

    #[must_use]
    pub fn into_state(self) -> Option<WorkspaceState> {
        match self {
            Self::Present(state) => Some(state),
            Self::Gone => None,
        }
    }
}

/// Manages one workspace through a [`WorkspaceClient`].
pub struct WorkspaceResource<C: WorkspaceClient + ?Sized> {
    client: Arc<C>,
    page_size: Option<u32>,
}

impl<C: WorkspaceClient + ?Sized> Clone for WorkspaceResource<C> {
    fn clone(&self) -> Self {
        Self {
            client: Arc::clone(&self.client),
            page_size: self.page_size,
        }
    }
}

impl<C: WorkspaceClient + ?Sized> WorkspaceResource<C> {
    pub fn new(client: Arc<C>) -> Self {
        Self {
            client,
            page_size: None,
        }
    }

    /// Sets the page size used when scanning for renamed workspaces.
    #[must_use]
    pub fn with_page_size(mut self, page_size: Option<u32>) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Creates the workspace and reads it back.
    pub async fn create(
        &self,
        ctx: &OpContext,
        config: &WorkspaceConfig,
    ) -> Result<ReadOutcome, ResourceError> {
        config.validate()?;
        let record = create_workspace(self.client.as_ref(), ctx, config).await?;
        self.read(ctx, &record, Some(config)).await
    }

    /// Refreshes the state behind `record`.
    ///
    /// The returned state always carries a current-format identifier, even
    /// when `record` was in the legacy format or the workspace was renamed.
    pub async fn read(
        &self,
        ctx: &OpContext,
        record: &LocalRecord,
        config: Option<&WorkspaceConfig>,
    ) -> Result<ReadOutcome, ResourceError> {
        let (workspace, lookup, format) =
            match reconcile(self.client.as_ref(), ctx, record, self.page_size).await? {
                Reconciled::Found {
                    workspace,
                    lookup,
                    format,
                } => (workspace, lookup, format),
                Reconciled::Gone => {
                    info!(id = %record.id, "workspace no longer exists");
                    return Ok(ReadOutcome::Gone);
                }
            };

        let track_branch = config.is_some_and(WorkspaceConfig::tracks_branch);
        let state = WorkspaceState::from_workspace(&workspace, track_branch).map_err(|source| {
            ResourceError::PackId {
                name: workspace.name.clone(),
                source,
            }
        })?;

        if format == IdFormat::Legacy {
            warn!(from = %record.id, to = %state.id, "rewriting legacy workspace identifier");
        } else if state.id != record.id {
            info!(from = %record.id, to = %state.id, "workspace identifier changed");
        }
        debug!(id = %state.id, lookup = ?lookup, "read workspace");

        Ok(ReadOutcome::Present(state))
    }

    /// Brings the workspace described by `prior` in line with `config`.
    pub async fn update(
        &self,
        ctx: &OpContext,
        prior: &WorkspaceState,
        config: &WorkspaceConfig,
    ) -> Result<ReadOutcome, ResourceError> {
        config.validate()?;

        let changes = ChangeSet::between(prior, config);
        if let Some(field) = changes.requires_replacement() {
            return Err(ResourceError::RequiresReplacement {
                field: field.as_str(),
            });
        }

        if changes.is_empty() {
            debug!(id = %prior.id, "workspace is up to date");
            return self.read(ctx, &prior.record(), Some(config)).await;
        }

        let record = update_workspace(self.client.as_ref(), ctx, prior, config, &changes).await?;
        self.read(ctx, &record, Some(config)).await
    }

    /// Deletes the workspace behind `id`.
    pub async fn delete(&self, ctx: &OpContext, id: &str) -> Result<(), ResourceError> {
        delete_workspace(self.client.as_ref(), ctx, id).await
    }

    /// Adopts an existing workspace by identifier, in either format.
    pub async fn import(
        &self,
        ctx: &OpContext,
        id: &str,
        config: Option<&WorkspaceConfig>,
    ) -> Result<WorkspaceState, ResourceError> {
        let record = LocalRecord::new(id, "");
        self.read(ctx, &record, config)
            .await?
            .into_state()
            .ok_or_else(|| ResourceError::ImportNotFound { id: id.to_string() })
    }
}
