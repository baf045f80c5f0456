//! The remote workspace client contract.

use async_trait::async_trait;
use tfsync_core::Workspace;

use crate::context::OpContext;
use crate::error::ClientError;
use crate::types::{ListOptions, WorkspaceCreateOptions, WorkspaceList, WorkspaceUpdateOptions};

/// Operations the reconciliation core needs from the remote service.
///
/// Workspaces are addressed by `(organization, name)` for CRUD and by their
/// external ID for the SSH key relationship. Implementations own transport
/// concerns (auth, retries, timeouts) and must be thread-safe.
///
/// # Example
///
/// ```ignore
/// use tfsync_client::{ClientError, OpContext, WorkspaceClient};
///
/// async fn exists(client: &dyn WorkspaceClient, org: &str, name: &str) -> Result<bool, ClientError> {
///     match client.read(&OpContext::new(), org, name).await {
///         Ok(_) => Ok(true),
///         Err(e) if e.is_not_found() => Ok(false),
///         Err(e) => Err(e),
///     }
/// }
/// ```
#[async_trait]
pub trait WorkspaceClient: Send + Sync {
    /// Creates a workspace in `organization`.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::InvalidRequest` if the service rejects the options.
    async fn create(
        &self,
        ctx: &OpContext,
        organization: &str,
        options: &WorkspaceCreateOptions,
    ) -> Result<Workspace, ClientError>;

    /// Reads a workspace by organization and name.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::NotFound` if no workspace has that name.
    async fn read(
        &self,
        ctx: &OpContext,
        organization: &str,
        name: &str,
    ) -> Result<Workspace, ClientError>;

    /// Updates a workspace addressed by its current name.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::NotFound` if no workspace has that name.
    async fn update(
        &self,
        ctx: &OpContext,
        organization: &str,
        name: &str,
        options: &WorkspaceUpdateOptions,
    ) -> Result<Workspace, ClientError>;

    /// Deletes a workspace.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::NotFound` if no workspace has that name.
    async fn delete(&self, ctx: &OpContext, organization: &str, name: &str)
    -> Result<(), ClientError>;

    /// Lists one page of the workspaces in `organization`.
    async fn list(
        &self,
        ctx: &OpContext,
        organization: &str,
        options: &ListOptions,
    ) -> Result<WorkspaceList, ClientError>;

    /// Links an SSH key to the workspace with the given external ID.
    async fn assign_ssh_key(
        &self,
        ctx: &OpContext,
        workspace_id: &str,
        ssh_key_id: &str,
    ) -> Result<Workspace, ClientError>;

    /// Removes the SSH key link from the workspace with the given external ID.
    async fn unassign_ssh_key(
        &self,
        ctx: &OpContext,
        workspace_id: &str,
    ) -> Result<Workspace, ClientError>;

    /// Returns the name of this client for logging/debugging.
    fn backend_name(&self) -> &'static str;
}
