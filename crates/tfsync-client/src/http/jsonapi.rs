//! JSON:API wire documents used by the remote service.

use serde::{Deserialize, Serialize};
use tfsync_core::{Organization, SshKeyRef, VcsRepo, Workspace};

use crate::types::{
    Pagination, VcsRepoOptions, WorkspaceCreateOptions, WorkspaceList, WorkspaceUpdateOptions,
};

pub(crate) const WORKSPACES_TYPE: &str = "workspaces";

// ==================== Responses ====================

#[derive(Debug, Deserialize)]
pub(crate) struct Document<T> {
    pub data: T,
    #[serde(default)]
    pub meta: Option<Meta>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WorkspaceData {
    pub id: String,
    #[serde(default)]
    pub attributes: WorkspaceAttributes,
    #[serde(default)]
    pub relationships: Relationships,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub(crate) struct WorkspaceAttributes {
    pub name: String,
    pub auto_apply: bool,
    pub file_triggers_enabled: bool,
    pub operations: bool,
    pub queue_all_runs: bool,
    pub terraform_version: Option<String>,
    pub trigger_prefixes: Vec<String>,
    pub working_directory: Option<String>,
    pub vcs_repo: Option<VcsRepoAttributes>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub(crate) struct VcsRepoAttributes {
    pub identifier: String,
    pub branch: Option<String>,
    pub ingress_submodules: bool,
    pub oauth_token_id: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub(crate) struct Relationships {
    pub organization: Option<Relation>,
    pub ssh_key: Option<Relation>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Relation {
    #[serde(default)]
    pub data: Option<ResourceRef>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ResourceRef {
    pub id: String,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct Meta {
    #[serde(default)]
    pub pagination: Option<PaginationMeta>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub(crate) struct PaginationMeta {
    pub current_page: u32,
    pub next_page: Option<u32>,
    pub total_pages: u32,
    pub total_count: u32,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorDocument {
    #[serde(default)]
    pub errors: Vec<ErrorObject>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct ErrorObject {
    pub title: Option<String>,
    pub detail: Option<String>,
}

impl From<WorkspaceData> for Workspace {
    fn from(data: WorkspaceData) -> Self {
        let WorkspaceData {
            id,
            attributes: a,
            relationships: r,
        } = data;
        Workspace {
            id,
            name: a.name,
            organization: r
                .organization
                .and_then(|rel| rel.data)
                .map(|org| Organization::new(org.id)),
            auto_apply: a.auto_apply,
            file_triggers_enabled: a.file_triggers_enabled,
            operations: a.operations,
            queue_all_runs: a.queue_all_runs,
            terraform_version: a.terraform_version.unwrap_or_default(),
            trigger_prefixes: a.trigger_prefixes,
            working_directory: a.working_directory.unwrap_or_default(),
            ssh_key: r
                .ssh_key
                .and_then(|rel| rel.data)
                .map(|key| SshKeyRef { id: key.id }),
            vcs_repo: a.vcs_repo.map(|v| VcsRepo {
                identifier: v.identifier,
                branch: v.branch.unwrap_or_default(),
                ingress_submodules: v.ingress_submodules,
                oauth_token_id: v.oauth_token_id,
            }),
        }
    }
}

impl Document<Vec<WorkspaceData>> {
    pub(crate) fn into_list(self) -> WorkspaceList {
        let pagination = self
            .meta
            .and_then(|m| m.pagination)
            .map(|p| Pagination {
                current_page: p.current_page,
                next_page: p.next_page,
                total_pages: p.total_pages,
                total_count: p.total_count,
            })
            .unwrap_or_default();
        WorkspaceList {
            items: self.data.into_iter().map(Workspace::from).collect(),
            pagination,
        }
    }
}

impl ErrorDocument {
    /// Joins the error details (or titles) into one message.
    pub(crate) fn message(&self) -> Option<String> {
        let msgs: Vec<&str> = self
            .errors
            .iter()
            .filter_map(|e| e.detail.as_deref().or(e.title.as_deref()))
            .collect();
        (!msgs.is_empty()).then(|| msgs.join("; "))
    }
}

// ==================== Requests ====================

#[derive(Debug, Serialize)]
pub(crate) struct RequestDocument<A> {
    pub data: RequestData<A>,
}

#[derive(Debug, Serialize)]
pub(crate) struct RequestData<A> {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub attributes: A,
}

impl<A> RequestDocument<A> {
    pub(crate) fn workspaces(attributes: A) -> Self {
        Self {
            data: RequestData {
                kind: WORKSPACES_TYPE,
                attributes,
            },
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "kebab-case")]
pub(crate) struct WorkspaceBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_apply: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_triggers_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operations: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub queue_all_runs: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub terraform_version: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trigger_prefixes: Option<&'a [String]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub working_directory: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vcs_repo: Option<VcsRepoBody<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "kebab-case")]
pub(crate) struct VcsRepoBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identifier: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ingress_submodules: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oauth_token_id: Option<&'a str>,
}

impl<'a> From<&'a VcsRepoOptions> for VcsRepoBody<'a> {
    fn from(o: &'a VcsRepoOptions) -> Self {
        Self {
            identifier: o.identifier.as_deref(),
            branch: o.branch.as_deref(),
            ingress_submodules: o.ingress_submodules,
            oauth_token_id: o.oauth_token_id.as_deref(),
        }
    }
}

impl<'a> From<&'a WorkspaceCreateOptions> for WorkspaceBody<'a> {
    fn from(o: &'a WorkspaceCreateOptions) -> Self {
        Self {
            name: Some(&o.name),
            auto_apply: o.auto_apply,
            file_triggers_enabled: o.file_triggers_enabled,
            operations: o.operations,
            queue_all_runs: o.queue_all_runs,
            terraform_version: o.terraform_version.as_deref(),
            trigger_prefixes: o.trigger_prefixes.as_deref(),
            working_directory: o.working_directory.as_deref(),
            vcs_repo: o.vcs_repo.as_ref().map(VcsRepoBody::from),
        }
    }
}

impl<'a> From<&'a WorkspaceUpdateOptions> for WorkspaceBody<'a> {
    fn from(o: &'a WorkspaceUpdateOptions) -> Self {
        Self {
            name: o.name.as_deref(),
            auto_apply: o.auto_apply,
            file_triggers_enabled: o.file_triggers_enabled,
            operations: o.operations,
            queue_all_runs: o.queue_all_runs,
            terraform_version: o.terraform_version.as_deref(),
            trigger_prefixes: o.trigger_prefixes.as_deref(),
            working_directory: o.working_directory.as_deref(),
            vcs_repo: o.vcs_repo.as_ref().map(VcsRepoBody::from),
        }
    }
}

/// Attributes of the ssh-key relationship request. `None` serializes as
/// `null`, which unlinks the key.
#[derive(Debug, Serialize)]
pub(crate) struct SshKeyBody<'a> {
    pub id: Option<&'a str>,
}
