//! Workspace lifecycle reconciliation for tfsync.
//!
//! [`WorkspaceResource`] keeps a locally persisted workspace record in sync
//! with the remote service:
//!
//! - create, update and delete from a declared [`WorkspaceConfig`]
//! - refresh that follows out-of-band renames through the external ID
//! - self-healing of legacy `<name>|<organization>` identifiers
//! - import of existing workspaces
//!
//! The remote service is reached through any
//! [`WorkspaceClient`](tfsync_client::WorkspaceClient).

pub mod diff;
pub mod drift;
pub mod error;
pub mod lifecycle;
pub mod mutate;
pub mod schema;
pub mod state;

pub use diff::{ChangeSet, Field};
pub use drift::{Lookup, Reconciled, find_by_external_id, reconcile};
pub use error::{Operation, ResourceError};
pub use lifecycle::{ReadOutcome, WorkspaceResource};
pub use mutate::SshKeyAction;
pub use schema::{Declared, VcsRepoConfig, WorkspaceConfig};
pub use state::{LocalRecord, VcsRepoState, WorkspaceState};
