//! # tfsync-core
//!
//! Shared model for the workspace reconciliation crates:
//!
//! - [`Workspace`] and its linked records as returned by the remote service
//! - the persisted identifier codec ([`pack_workspace_id`], [`unpack_workspace_id`])
//!
//! The identifier is what callers store locally. The current format is
//! `<organization>/<name>`; the legacy `<name>|<organization>` format is still
//! decoded but never produced.

pub mod id;
pub mod workspace;

pub use id::{IdError, IdFormat, WorkspaceId, pack_workspace_id, unpack_workspace_id};
pub use workspace::{Organization, SshKeyRef, VcsRepo, Workspace};
