//! Request and response types for the workspace client.
//!
//! Option fields left as `None` are omitted from the request, which the
//! remote service treats as "keep the current value" (update) or "use the
//! server default" (create).

use serde::{Deserialize, Serialize};
use tfsync_core::Workspace;

/// Options for creating a workspace.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceCreateOptions {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_apply: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_triggers_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operations: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub queue_all_runs: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terraform_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger_prefixes: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub working_directory: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vcs_repo: Option<VcsRepoOptions>,
}

impl WorkspaceCreateOptions {
    /// Creates options with only the name set.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

/// Options for updating a workspace.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceUpdateOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_apply: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_triggers_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operations: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub queue_all_runs: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terraform_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger_prefixes: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub working_directory: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vcs_repo: Option<VcsRepoOptions>,
}

/// VCS repository settings sent with create and update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VcsRepoOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ingress_submodules: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oauth_token_id: Option<String>,
}

/// Pagination parameters for listing workspaces.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListOptions {
    /// 1-based page number. `0` means "first page".
    pub page_number: u32,
    /// Page size. `None` leaves it to the service.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
}

impl ListOptions {
    #[must_use]
    pub fn first_page(page_size: Option<u32>) -> Self {
        Self {
            page_number: 1,
            page_size,
        }
    }

    #[must_use]
    pub fn with_page(mut self, page_number: u32) -> Self {
        self.page_number = page_number;
        self
    }
}

/// Pagination metadata reported with each page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub current_page: u32,
    /// `None` on the last page.
    #[serde(default)]
    pub next_page: Option<u32>,
    pub total_pages: u32,
    #[serde(default)]
    pub total_count: u32,
}

/// One page of workspaces.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceList {
    pub items: Vec<Workspace>,
    pub pagination: Pagination,
}

impl WorkspaceList {
    /// Returns true if this page is the last one the service reported.
    #[must_use]
    pub fn is_last_page(&self) -> bool {
        self.pagination.current_page >= self.pagination.total_pages
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_page_detection() {
        let mut page = WorkspaceList::default();
        page.pagination.current_page = 1;
        page.pagination.total_pages = 2;
        assert!(!page.is_last_page());

        page.pagination.current_page = 2;
        assert!(page.is_last_page());
    }

    #[test]
    fn test_empty_listing_counts_as_last_page() {
        // A listing of an empty organization reports zero pages.
        assert!(WorkspaceList::default().is_last_page());
    }

    #[test]
    fn test_update_options_skip_unset_fields() {
        let options = WorkspaceUpdateOptions {
            name: Some("web".into()),
            ..Default::default()
        };
        let json = serde_json::to_value(&options).unwrap();
        assert_eq!(json, serde_json::json!({ "name": "web" }));
    }
}
