//! Error types for workspace lifecycle operations.

use std::fmt;

use tfsync_client::ClientError;
use tfsync_core::IdError;

/// Remote operation that failed, used in error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    Read,
    Update,
    Delete,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Create => write!(f, "creating"),
            Self::Read => write!(f, "reading configuration of"),
            Self::Update => write!(f, "updating"),
            Self::Delete => write!(f, "deleting"),
        }
    }
}

/// Errors returned by the lifecycle entry points.
///
/// None of these leave a new identifier behind: the caller keeps whatever
/// record it had before the call.
#[derive(Debug, thiserror::Error)]
pub enum ResourceError {
    /// The persisted identifier could not be decoded.
    #[error("error unpacking workspace ID")]
    InvalidId(#[from] IdError),

    /// The declared configuration is unusable.
    #[error("invalid workspace configuration: {message}")]
    InvalidConfig { message: String },

    /// A primary remote call failed.
    #[error("error {operation} workspace {name} for organization {organization}")]
    Remote {
        operation: Operation,
        name: String,
        organization: String,
        #[source]
        source: ClientError,
    },

    /// Listing workspaces during the recovery scan failed.
    #[error("error retrieving workspaces for organization {organization}")]
    ListWorkspaces {
        organization: String,
        #[source]
        source: ClientError,
    },

    /// The remote entity could not be turned into an identifier.
    #[error("error creating ID for workspace {name}")]
    PackId {
        name: String,
        #[source]
        source: IdError,
    },

    /// The SSH key link step failed after the workspace itself was
    /// created or updated.
    #[error(
        "error {action} SSH key for workspace {name} ({identifier}); the workspace itself is in place"
    )]
    SshKey {
        action: &'static str,
        name: String,
        identifier: String,
        #[source]
        source: ClientError,
    },

    /// The change cannot be applied in place.
    #[error("changing {field} requires replacing the workspace")]
    RequiresReplacement { field: &'static str },

    /// Import was asked for a workspace that does not exist.
    #[error("cannot import workspace {id}: workspace not found")]
    ImportNotFound { id: String },
}

impl ResourceError {
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    pub(crate) fn remote(
        operation: Operation,
        organization: &str,
        name: &str,
        source: ClientError,
    ) -> Self {
        Self::Remote {
            operation,
            name: name.to_string(),
            organization: organization.to_string(),
            source,
        }
    }

    /// Returns the client error behind this failure, if any.
    #[must_use]
    pub fn client_error(&self) -> Option<&ClientError> {
        match self {
            Self::Remote { source, .. }
            | Self::ListWorkspaces { source, .. }
            | Self::SshKey { source, .. } => Some(source),
            _ => None,
        }
    }

    /// Returns `true` if the operation stopped because its context was cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.client_error().is_some_and(ClientError::is_cancelled)
    }

    /// Returns `true` for failures of the secondary SSH key link step.
    #[must_use]
    pub fn is_secondary_link(&self) -> bool {
        matches!(self, Self::SshKey { .. })
    }

    /// Returns `true` if the workspace must be deleted and created again.
    #[must_use]
    pub fn requires_replacement(&self) -> bool {
        matches!(self, Self::RequiresReplacement { .. })
    }
}
