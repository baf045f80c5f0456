use std::collections::VecDeque;

use async_trait::async_trait;
use tfsync_client::{
    ClientError, ListOptions, OpContext, Pagination, VcsRepoOptions, WorkspaceClient,
    WorkspaceCreateOptions, WorkspaceList, WorkspaceUpdateOptions,
};
use tfsync_core::{Organization, SshKeyRef, VcsRepo, Workspace};
use tokio::sync::{Mutex, RwLock};

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const DEFAULT_TERRAFORM_VERSION: &str = "1.6.0";

const WORKSPACE: &str = "workspace";

/// Contract operations, used to target injected failures and count calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Create,
    Read,
    Update,
    Delete,
    List,
    AssignSshKey,
    UnassignSshKey,
}

/// A call received by the client, with its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedCall {
    Create {
        organization: String,
        options: WorkspaceCreateOptions,
    },
    Read {
        organization: String,
        name: String,
    },
    Update {
        organization: String,
        name: String,
        options: WorkspaceUpdateOptions,
    },
    Delete {
        organization: String,
        name: String,
    },
    List {
        organization: String,
        options: ListOptions,
    },
    AssignSshKey {
        workspace_id: String,
        ssh_key_id: String,
    },
    UnassignSshKey {
        workspace_id: String,
    },
}

impl RecordedCall {
    #[must_use]
    pub fn operation(&self) -> Operation {
        match self {
            Self::Create { .. } => Operation::Create,
            Self::Read { .. } => Operation::Read,
            Self::Update { .. } => Operation::Update,
            Self::Delete { .. } => Operation::Delete,
            Self::List { .. } => Operation::List,
            Self::AssignSshKey { .. } => Operation::AssignSshKey,
            Self::UnassignSshKey { .. } => Operation::UnassignSshKey,
        }
    }
}

/// In-memory implementation of the remote workspace service.
///
/// Workspaces are kept in creation order so listings are stable.
#[derive(Debug)]
pub struct InMemoryWorkspaceClient {
    workspaces: RwLock<Vec<Workspace>>,
    calls: Mutex<Vec<RecordedCall>>,
    failures: Mutex<VecDeque<(Operation, ClientError)>>,
    page_size: u32,
    omit_organization: RwLock<bool>,
}

impl Default for InMemoryWorkspaceClient {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryWorkspaceClient {
    pub fn new() -> Self {
        Self::with_page_size(DEFAULT_PAGE_SIZE)
    }

    /// Creates a client whose listings default to `page_size` items per page.
    pub fn with_page_size(page_size: u32) -> Self {
        Self {
            workspaces: RwLock::new(Vec::new()),
            calls: Mutex::new(Vec::new()),
            failures: Mutex::new(VecDeque::new()),
            page_size: page_size.max(1),
            omit_organization: RwLock::new(false),
        }
    }

    /// Inserts a workspace with server defaults without recording a call.
    pub async fn seed(&self, organization: &str, name: &str) -> Workspace {
        let ws = new_workspace(organization, &WorkspaceCreateOptions::new(name));
        self.workspaces.write().await.push(ws.clone());
        ws
    }

    /// Renames a workspace out of band. Returns false if the ID is unknown.
    pub async fn rename(&self, external_id: &str, new_name: &str) -> bool {
        let mut guard = self.workspaces.write().await;
        match guard.iter_mut().find(|w| w.id == external_id) {
            Some(ws) => {
                ws.name = new_name.to_string();
                true
            }
            None => false,
        }
    }

    /// Deletes a workspace out of band. Returns false if the ID is unknown.
    pub async fn remove(&self, external_id: &str) -> bool {
        let mut guard = self.workspaces.write().await;
        let before = guard.len();
        guard.retain(|w| w.id != external_id);
        guard.len() != before
    }

    /// Returns the stored workspace with the given external ID.
    pub async fn get(&self, external_id: &str) -> Option<Workspace> {
        self.workspaces
            .read()
            .await
            .iter()
            .find(|w| w.id == external_id)
            .cloned()
    }

    pub async fn count(&self) -> usize {
        self.workspaces.read().await.len()
    }

    /// Makes the next call of `operation` fail with `error`.
    pub async fn fail_next(&self, operation: Operation, error: ClientError) {
        self.failures.lock().await.push_back((operation, error));
    }

    /// Strips the organization from every returned workspace, like a
    /// response that did not include the relationship.
    pub async fn set_omit_organization(&self, omit: bool) {
        *self.omit_organization.write().await = omit;
    }

    /// Returns all recorded calls in order.
    pub async fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().await.clone()
    }

    /// Returns how many calls of `operation` were recorded.
    pub async fn call_count(&self, operation: Operation) -> usize {
        self.calls
            .lock()
            .await
            .iter()
            .filter(|c| c.operation() == operation)
            .count()
    }

    pub async fn clear_calls(&self) {
        self.calls.lock().await.clear();
    }

    /// Checks the context, records the call and pops an injected failure.
    async fn enter(&self, ctx: &OpContext, call: RecordedCall) -> Result<(), ClientError> {
        ctx.check()?;
        let operation = call.operation();
        self.calls.lock().await.push(call);

        let mut failures = self.failures.lock().await;
        if let Some(pos) = failures.iter().position(|(op, _)| *op == operation)
            && let Some((_, err)) = failures.remove(pos)
        {
            tracing::debug!(?operation, error = %err, "injected failure");
            return Err(err);
        }
        Ok(())
    }

    async fn respond(&self, mut ws: Workspace) -> Workspace {
        if *self.omit_organization.read().await {
            ws.organization = None;
        }
        ws
    }
}

fn generate_external_id() -> String {
    let simple = uuid::Uuid::new_v4().simple().to_string();
    format!("ws-{}", &simple[..16])
}

fn in_org(ws: &Workspace, organization: &str) -> bool {
    ws.organization_name() == Some(organization)
}

fn vcs_from_options(options: &VcsRepoOptions) -> VcsRepo {
    VcsRepo {
        identifier: options.identifier.clone().unwrap_or_default(),
        branch: options.branch.clone().unwrap_or_default(),
        ingress_submodules: options.ingress_submodules.unwrap_or(false),
        oauth_token_id: options.oauth_token_id.clone().unwrap_or_default(),
    }
}

fn new_workspace(organization: &str, options: &WorkspaceCreateOptions) -> Workspace {
    Workspace {
        id: generate_external_id(),
        name: options.name.clone(),
        organization: Some(Organization::new(organization)),
        auto_apply: options.auto_apply.unwrap_or(false),
        file_triggers_enabled: options.file_triggers_enabled.unwrap_or(true),
        operations: options.operations.unwrap_or(true),
        queue_all_runs: options.queue_all_runs.unwrap_or(true),
        terraform_version: options
            .terraform_version
            .clone()
            .unwrap_or_else(|| DEFAULT_TERRAFORM_VERSION.to_string()),
        trigger_prefixes: options.trigger_prefixes.clone().unwrap_or_default(),
        working_directory: options.working_directory.clone().unwrap_or_default(),
        ssh_key: None,
        vcs_repo: options.vcs_repo.as_ref().map(vcs_from_options),
    }
}

fn apply_update(ws: &mut Workspace, options: &WorkspaceUpdateOptions) {
    if let Some(name) = &options.name {
        ws.name = name.clone();
    }
    if let Some(v) = options.auto_apply {
        ws.auto_apply = v;
    }
    if let Some(v) = options.file_triggers_enabled {
        ws.file_triggers_enabled = v;
    }
    if let Some(v) = options.operations {
        ws.operations = v;
    }
    if let Some(v) = options.queue_all_runs {
        ws.queue_all_runs = v;
    }
    if let Some(v) = &options.terraform_version {
        ws.terraform_version = v.clone();
    }
    if let Some(v) = &options.trigger_prefixes {
        ws.trigger_prefixes = v.clone();
    }
    if let Some(v) = &options.working_directory {
        ws.working_directory = v.clone();
    }
    if let Some(v) = &options.vcs_repo {
        ws.vcs_repo = Some(vcs_from_options(v));
    }
}

#[async_trait]
impl WorkspaceClient for InMemoryWorkspaceClient {
    async fn create(
        &self,
        ctx: &OpContext,
        organization: &str,
        options: &WorkspaceCreateOptions,
    ) -> Result<Workspace, ClientError> {
        self.enter(
            ctx,
            RecordedCall::Create {
                organization: organization.to_string(),
                options: options.clone(),
            },
        )
        .await?;

        if options.name.is_empty() {
            return Err(ClientError::invalid_request("Name can't be blank"));
        }
        let mut guard = self.workspaces.write().await;
        if guard
            .iter()
            .any(|w| in_org(w, organization) && w.name == options.name)
        {
            return Err(ClientError::invalid_request("Name has already been taken"));
        }
        let ws = new_workspace(organization, options);
        guard.push(ws.clone());
        drop(guard);
        Ok(self.respond(ws).await)
    }

    async fn read(
        &self,
        ctx: &OpContext,
        organization: &str,
        name: &str,
    ) -> Result<Workspace, ClientError> {
        self.enter(
            ctx,
            RecordedCall::Read {
                organization: organization.to_string(),
                name: name.to_string(),
            },
        )
        .await?;

        let found = self
            .workspaces
            .read()
            .await
            .iter()
            .find(|w| in_org(w, organization) && w.name == name)
            .cloned();
        match found {
            Some(ws) => Ok(self.respond(ws).await),
            None => Err(ClientError::not_found(WORKSPACE, format!("{organization}/{name}"))),
        }
    }

    async fn update(
        &self,
        ctx: &OpContext,
        organization: &str,
        name: &str,
        options: &WorkspaceUpdateOptions,
    ) -> Result<Workspace, ClientError> {
        self.enter(
            ctx,
            RecordedCall::Update {
                organization: organization.to_string(),
                name: name.to_string(),
                options: options.clone(),
            },
        )
        .await?;

        let mut guard = self.workspaces.write().await;
        if let Some(new_name) = &options.name
            && new_name != name
            && guard
                .iter()
                .any(|w| in_org(w, organization) && &w.name == new_name)
        {
            return Err(ClientError::invalid_request("Name has already been taken"));
        }
        let Some(ws) = guard
            .iter_mut()
            .find(|w| in_org(w, organization) && w.name == name)
        else {
            return Err(ClientError::not_found(WORKSPACE, format!("{organization}/{name}")));
        };
        apply_update(ws, options);
        let updated = ws.clone();
        drop(guard);
        Ok(self.respond(updated).await)
    }

    async fn delete(
        &self,
        ctx: &OpContext,
        organization: &str,
        name: &str,
    ) -> Result<(), ClientError> {
        self.enter(
            ctx,
            RecordedCall::Delete {
                organization: organization.to_string(),
                name: name.to_string(),
            },
        )
        .await?;

        let mut guard = self.workspaces.write().await;
        let before = guard.len();
        guard.retain(|w| !(in_org(w, organization) && w.name == name));
        if guard.len() == before {
            return Err(ClientError::not_found(WORKSPACE, format!("{organization}/{name}")));
        }
        Ok(())
    }

    async fn list(
        &self,
        ctx: &OpContext,
        organization: &str,
        options: &ListOptions,
    ) -> Result<WorkspaceList, ClientError> {
        self.enter(
            ctx,
            RecordedCall::List {
                organization: organization.to_string(),
                options: *options,
            },
        )
        .await?;

        let size = options.page_size.unwrap_or(self.page_size).max(1) as usize;
        let page = options.page_number.max(1);
        let all: Vec<Workspace> = self
            .workspaces
            .read()
            .await
            .iter()
            .filter(|w| in_org(w, organization))
            .cloned()
            .collect();

        let total_count = all.len();
        let total_pages = total_count.div_ceil(size) as u32;
        let start = (page as usize - 1) * size;
        let mut items = Vec::new();
        for ws in all.into_iter().skip(start).take(size) {
            items.push(self.respond(ws).await);
        }

        Ok(WorkspaceList {
            items,
            pagination: Pagination {
                current_page: page,
                next_page: (page < total_pages).then_some(page + 1),
                total_pages,
                total_count: total_count as u32,
            },
        })
    }

    async fn assign_ssh_key(
        &self,
        ctx: &OpContext,
        workspace_id: &str,
        ssh_key_id: &str,
    ) -> Result<Workspace, ClientError> {
        self.enter(
            ctx,
            RecordedCall::AssignSshKey {
                workspace_id: workspace_id.to_string(),
                ssh_key_id: ssh_key_id.to_string(),
            },
        )
        .await?;

        let mut guard = self.workspaces.write().await;
        let Some(ws) = guard.iter_mut().find(|w| w.id == workspace_id) else {
            return Err(ClientError::not_found(WORKSPACE, workspace_id));
        };
        ws.ssh_key = Some(SshKeyRef {
            id: ssh_key_id.to_string(),
        });
        let updated = ws.clone();
        drop(guard);
        Ok(self.respond(updated).await)
    }

    async fn unassign_ssh_key(
        &self,
        ctx: &OpContext,
        workspace_id: &str,
    ) -> Result<Workspace, ClientError> {
        self.enter(
            ctx,
            RecordedCall::UnassignSshKey {
                workspace_id: workspace_id.to_string(),
            },
        )
        .await?;

        let mut guard = self.workspaces.write().await;
        let Some(ws) = guard.iter_mut().find(|w| w.id == workspace_id) else {
            return Err(ClientError::not_found(WORKSPACE, workspace_id));
        };
        ws.ssh_key = None;
        let updated = ws.clone();
        drop(guard);
        Ok(self.respond(updated).await)
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_crud_round() {
        let client = InMemoryWorkspaceClient::new();
        let ctx = OpContext::new();

        let created = client
            .create(&ctx, "acme", &WorkspaceCreateOptions::new("web"))
            .await
            .unwrap();
        assert!(created.id.starts_with("ws-"));
        assert!(created.file_triggers_enabled);
        assert_eq!(created.terraform_version, DEFAULT_TERRAFORM_VERSION);

        let read = client.read(&ctx, "acme", "web").await.unwrap();
        assert_eq!(read, created);

        let options = WorkspaceUpdateOptions {
            name: Some("web-2".into()),
            auto_apply: Some(true),
            ..Default::default()
        };
        let updated = client.update(&ctx, "acme", "web", &options).await.unwrap();
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.name, "web-2");
        assert!(updated.auto_apply);

        client.delete(&ctx, "acme", "web-2").await.unwrap();
        assert!(client.delete(&ctx, "acme", "web-2").await.unwrap_err().is_not_found());
        assert_eq!(client.count().await, 0);
    }

    #[tokio::test]
    async fn test_duplicate_name_rejected() {
        let client = InMemoryWorkspaceClient::new();
        let ctx = OpContext::new();
        client.seed("acme", "web").await;
        let err = client
            .create(&ctx, "acme", &WorkspaceCreateOptions::new("web"))
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::InvalidRequest { .. }));

        // Same name in another organization is fine.
        client
            .create(&ctx, "other", &WorkspaceCreateOptions::new("web"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_list_pagination() {
        let client = InMemoryWorkspaceClient::with_page_size(2);
        for name in ["a", "b", "c", "d", "e"] {
            client.seed("acme", name).await;
        }
        client.seed("other", "x").await;
        let ctx = OpContext::new();

        let first = client
            .list(&ctx, "acme", &ListOptions::default())
            .await
            .unwrap();
        assert_eq!(first.items.len(), 2);
        assert_eq!(first.pagination.current_page, 1);
        assert_eq!(first.pagination.next_page, Some(2));
        assert_eq!(first.pagination.total_pages, 3);
        assert_eq!(first.pagination.total_count, 5);

        let last = client
            .list(&ctx, "acme", &ListOptions::first_page(None).with_page(3))
            .await
            .unwrap();
        assert_eq!(last.items.len(), 1);
        assert_eq!(last.items[0].name, "e");
        assert_eq!(last.pagination.next_page, None);
        assert!(last.is_last_page());
    }

    #[tokio::test]
    async fn test_injected_failure_hits_once() {
        let client = InMemoryWorkspaceClient::new();
        let ctx = OpContext::new();
        client.seed("acme", "web").await;
        client
            .fail_next(Operation::Read, ClientError::http(500, "boom"))
            .await;

        assert_eq!(
            client.read(&ctx, "acme", "web").await.unwrap_err(),
            ClientError::http(500, "boom")
        );
        assert!(client.read(&ctx, "acme", "web").await.is_ok());
        assert_eq!(client.call_count(Operation::Read).await, 2);
    }

    #[tokio::test]
    async fn test_rename_out_of_band() {
        let client = InMemoryWorkspaceClient::new();
        let ctx = OpContext::new();
        let ws = client.seed("acme", "web").await;
        assert!(client.rename(&ws.id, "web-new").await);

        assert!(client.read(&ctx, "acme", "web").await.unwrap_err().is_not_found());
        assert_eq!(client.read(&ctx, "acme", "web-new").await.unwrap().id, ws.id);
    }

    #[tokio::test]
    async fn test_ssh_key_link() {
        let client = InMemoryWorkspaceClient::new();
        let ctx = OpContext::new();
        let ws = client.seed("acme", "web").await;

        let linked = client.assign_ssh_key(&ctx, &ws.id, "sshkey-1").await.unwrap();
        assert_eq!(linked.ssh_key_id(), "sshkey-1");
        let unlinked = client.unassign_ssh_key(&ctx, &ws.id).await.unwrap();
        assert_eq!(unlinked.ssh_key_id(), "");

        assert!(client
            .assign_ssh_key(&ctx, "ws-missing", "sshkey-1")
            .await
            .unwrap_err()
            .is_not_found());
    }

    #[tokio::test]
    async fn test_cancelled_context_is_not_recorded() {
        let client = InMemoryWorkspaceClient::new();
        let ctx = OpContext::new();
        ctx.cancel();
        let err = client
            .create(&ctx, "acme", &WorkspaceCreateOptions::new("web"))
            .await
            .unwrap_err();
        assert!(err.is_cancelled());
        assert!(client.calls().await.is_empty());
        assert_eq!(client.count().await, 0);
    }
}
