//! # tfsync-client
//!
//! Client contract for the remote run-management service.
//!
//! The reconciliation core only talks to the service through the
//! [`WorkspaceClient`] trait. This crate provides:
//!
//! - the trait and its request/response types
//! - [`ClientError`], where "not found" is a distinct, checkable variant
//! - [`OpContext`], the explicit cancellation context threaded through every call
//! - [`TfeClient`], an HTTP implementation of the trait
//!
//! ## Example
//!
//! ```ignore
//! use tfsync_client::{OpContext, TfeClient, TfeClientConfig, WorkspaceClient};
//!
//! let client = TfeClient::new(TfeClientConfig::new("https://app.terraform.io").with_token(token))?;
//! let ws = client.read(&OpContext::new(), "acme", "web").await?;
//! println!("{} has external ID {}", ws.name, ws.id);
//! ```

mod context;
mod error;
pub mod http;
mod traits;
mod types;

pub use context::OpContext;
pub use error::{ClientError, ErrorCategory};
pub use http::{DEFAULT_ADDRESS, TfeClient, TfeClientConfig};
pub use traits::WorkspaceClient;
pub use types::{
    ListOptions, Pagination, VcsRepoOptions, WorkspaceCreateOptions, WorkspaceList,
    WorkspaceUpdateOptions,
};

/// Type alias for a client result.
pub type ClientResult<T> = Result<T, ClientError>;

/// Type alias for a shareable client trait object.
pub type DynWorkspaceClient = std::sync::Arc<dyn WorkspaceClient>;
