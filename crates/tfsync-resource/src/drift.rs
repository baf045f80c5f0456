//! Drift reconciliation for the read path.
//!
//! A workspace is looked up by its `(organization, name)` pair first. When
//! that fails with not-found the workspace may have been renamed out of
//! band, so the organization is scanned page by page for the cached
//! external ID, which survives renames.

use std::future::Future;

use tfsync_client::{ClientError, ListOptions, OpContext, WorkspaceClient, WorkspaceList};
use tfsync_core::{IdFormat, Workspace, WorkspaceId};
use tracing::{debug, info};

use crate::error::{Operation, ResourceError};
use crate::state::LocalRecord;

/// How a workspace was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup {
    /// By organization and name.
    Direct,
    /// By external ID, after the name lookup missed.
    Scan,
}

/// Result of reconciling a local record against the remote service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reconciled {
    Found {
        workspace: Workspace,
        lookup: Lookup,
        /// Format of the identifier the lookup started from.
        format: IdFormat,
    },
    /// Neither lookup found the workspace.
    Gone,
}

/// Scans pages returned by `fetch_page` for a workspace with the given
/// external ID.
///
/// The scan ends at the first match, on the last page the service reports,
/// or when a page does not point to a later one.
pub async fn find_by_external_id<F, Fut>(
    mut fetch_page: F,
    external_id: &str,
    page_size: Option<u32>,
) -> Result<Option<Workspace>, ClientError>
where
    F: FnMut(ListOptions) -> Fut,
    Fut: Future<Output = Result<WorkspaceList, ClientError>>,
{
    if external_id.is_empty() {
        return Ok(None);
    }

    let mut options = ListOptions::first_page(page_size);
    loop {
        let page = fetch_page(options).await?;
        let last = page.is_last_page() || options.page_number >= page.pagination.total_pages;
        let next = page.pagination.next_page;

        if let Some(found) = page.items.into_iter().find(|w| w.id == external_id) {
            return Ok(Some(found));
        }
        if last {
            return Ok(None);
        }
        match next {
            Some(n) if n > options.page_number => options = options.with_page(n),
            _ => {
                debug!(
                    page = options.page_number,
                    next = ?next,
                    "workspace listing did not advance, ending scan"
                );
                return Ok(None);
            }
        }
    }
}

/// Locates the workspace behind `record`, recovering from out-of-band renames.
pub async fn reconcile<C>(
    client: &C,
    ctx: &OpContext,
    record: &LocalRecord,
    page_size: Option<u32>,
) -> Result<Reconciled, ResourceError>
where
    C: WorkspaceClient + ?Sized,
{
    let (id, format) = WorkspaceId::parse(&record.id)?;

    match client.read(ctx, &id.organization, &id.name).await {
        Ok(workspace) => {
            return Ok(Reconciled::Found {
                workspace,
                lookup: Lookup::Direct,
                format,
            });
        }
        Err(e) if e.is_not_found() => {}
        Err(e) => return Err(ResourceError::remote(Operation::Read, &id.organization, &id.name, e)),
    }

    if record.external_id.is_empty() {
        debug!(
            organization = %id.organization,
            name = %id.name,
            "workspace not found and no external ID cached"
        );
        return Ok(Reconciled::Gone);
    }

    debug!(
        organization = %id.organization,
        name = %id.name,
        external_id = %record.external_id,
        "workspace not found by name, scanning by external ID"
    );

    let organization = id.organization.as_str();
    let found = find_by_external_id(
        move |options| async move { client.list(ctx, organization, &options).await },
        &record.external_id,
        page_size,
    )
    .await
    .map_err(|source| ResourceError::ListWorkspaces {
        organization: id.organization.clone(),
        source,
    })?;

    match found {
        Some(workspace) => {
            info!(
                organization = %id.organization,
                old_name = %id.name,
                new_name = %workspace.name,
                external_id = %workspace.id,
                "found renamed workspace by external ID"
            );
            Ok(Reconciled::Found {
                workspace,
                lookup: Lookup::Scan,
                format,
            })
        }
        None => Ok(Reconciled::Gone),
    }
}
