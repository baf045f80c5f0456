//! In-memory workspace client for tfsync.
//!
//! [`InMemoryWorkspaceClient`] implements the `WorkspaceClient` trait from
//! `tfsync-client` over a process-local list of workspaces. Besides the
//! contract operations it can:
//!
//! - record every call it receives ([`RecordedCall`])
//! - rename or remove workspaces out of band, the way another user would
//! - fail the next call of a given [`Operation`] with a chosen error
//! - paginate listings with a configurable page size
//!
//! # Example
//!
//! ```ignore
//! use tfsync_client::{OpContext, WorkspaceClient};
//! use tfsync_client_memory::InMemoryWorkspaceClient;
//!
//! let client = InMemoryWorkspaceClient::new();
//! let seeded = client.seed("acme", "web").await;
//! client.rename(&seeded.id, "web-renamed").await;
//! assert!(client.read(&OpContext::new(), "acme", "web").await.is_err());
//! ```

mod client;

pub use client::{
    DEFAULT_PAGE_SIZE, DEFAULT_TERRAFORM_VERSION, InMemoryWorkspaceClient, Operation,
    RecordedCall,
};
