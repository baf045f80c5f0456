//! Persisted workspace identifier codec.
//!
//! Two formats exist:
//!
//! | format  | shape                   | produced |
//! |---------|-------------------------|----------|
//! | current | `<organization>/<name>` | yes      |
//! | legacy  | `<name>\|<organization>` | never    |
//!
//! [`WorkspaceId::parse`] tries the legacy delimiter first, then the current
//! one, and reports which format matched.

use std::fmt;

use thiserror::Error;

use crate::workspace::Workspace;

const CURRENT_DELIMITER: char = '/';
const LEGACY_DELIMITER: char = '|';

/// Errors produced while packing or unpacking a workspace identifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdError {
    #[error("invalid workspace ID format: {0} (expected <ORGANIZATION>/<WORKSPACE>)")]
    InvalidFormat(String),

    #[error("no organization in workspace response")]
    MissingOrganization,
}

impl IdError {
    pub fn invalid_format(id: impl Into<String>) -> Self {
        Self::InvalidFormat(id.into())
    }
}

/// Which encoding a persisted identifier was written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdFormat {
    Current,
    Legacy,
}

/// Decoded `(organization, name)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WorkspaceId {
    pub organization: String,
    pub name: String,
}

impl WorkspaceId {
    pub fn new(organization: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            organization: organization.into(),
            name: name.into(),
        }
    }

    /// Decodes a persisted identifier and reports the format it was in.
    pub fn parse(id: &str) -> Result<(Self, IdFormat), IdError> {
        if let Some((name, organization)) = id.split_once(LEGACY_DELIMITER) {
            return Self::checked(id, organization, name).map(|w| (w, IdFormat::Legacy));
        }

        let parts: Vec<&str> = id.split(CURRENT_DELIMITER).collect();
        match parts.as_slice() {
            [organization, name] => {
                Self::checked(id, organization, name).map(|w| (w, IdFormat::Current))
            }
            _ => Err(IdError::invalid_format(id)),
        }
    }

    fn checked(id: &str, organization: &str, name: &str) -> Result<Self, IdError> {
        if organization.is_empty() || name.is_empty() {
            return Err(IdError::invalid_format(id));
        }
        Ok(Self::new(organization, name))
    }

    /// Encodes in the current format.
    #[must_use]
    pub fn pack(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for WorkspaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.organization, CURRENT_DELIMITER, self.name)
    }
}

/// Builds the persisted identifier from a remote entity.
///
/// Fails when the entity was constructed without its organization, or when
/// either component is empty or contains a delimiter, since the result
/// would not decode back to the same pair.
pub fn pack_workspace_id(workspace: &Workspace) -> Result<String, IdError> {
    let organization = workspace
        .organization_name()
        .ok_or(IdError::MissingOrganization)?;
    let id = WorkspaceId::new(organization, &workspace.name);
    let packed = id.pack();
    let clean = |s: &str| !s.is_empty() && !s.contains([CURRENT_DELIMITER, LEGACY_DELIMITER]);
    if !clean(&id.organization) || !clean(&id.name) {
        return Err(IdError::invalid_format(packed));
    }
    Ok(packed)
}

/// Decodes a persisted identifier in either format.
pub fn unpack_workspace_id(id: &str) -> Result<WorkspaceId, IdError> {
    WorkspaceId::parse(id).map(|(ws, _)| ws)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workspace::Organization;

    #[test]
    fn test_pack_unpack_round_trip() {
        let ws = Workspace {
            id: "ws-1".into(),
            name: "web".into(),
            organization: Some(Organization::new("acme")),
            ..Default::default()
        };
        let id = pack_workspace_id(&ws).unwrap();
        assert_eq!(id, "acme/web");
        assert_eq!(unpack_workspace_id(&id).unwrap(), WorkspaceId::new("acme", "web"));
    }

    fn workspace(organization: &str, name: &str) -> Workspace {
        Workspace {
            id: "ws-1".into(),
            name: name.into(),
            organization: Some(Organization::new(organization)),
            ..Default::default()
        }
    }

    #[test]
    fn test_round_trip_over_pairs() {
        let pairs = [
            ("acme", "web"),
            ("my-org", "my_workspace"),
            ("Org.1", "web-prod-2"),
            ("a", "b"),
            ("acme", "name with spaces"),
        ];
        for (organization, name) in pairs {
            let id = pack_workspace_id(&workspace(organization, name)).unwrap();
            assert_eq!(
                unpack_workspace_id(&id).unwrap(),
                WorkspaceId::new(organization, name),
                "round trip of {id}"
            );
        }
    }

    #[test]
    fn test_pack_rejects_undecodable_components() {
        let pairs = [
            ("a|b", "c"),
            ("acme", "we|b"),
            ("acme", "we/b"),
            ("a/b", "c"),
            ("acme", ""),
        ];
        for (organization, name) in pairs {
            assert!(
                matches!(
                    pack_workspace_id(&workspace(organization, name)),
                    Err(IdError::InvalidFormat(_))
                ),
                "{organization:?}/{name:?} should not pack"
            );
        }
    }

    #[test]
    fn test_pack_without_organization() {
        let ws = Workspace {
            id: "ws-1".into(),
            name: "web".into(),
            ..Default::default()
        };
        assert_eq!(pack_workspace_id(&ws), Err(IdError::MissingOrganization));
    }

    #[test]
    fn test_legacy_format_is_reversed() {
        let (id, format) = WorkspaceId::parse("myws|myorg").unwrap();
        assert_eq!(id, WorkspaceId::new("myorg", "myws"));
        assert_eq!(format, IdFormat::Legacy);
        // Re-encoding always yields the current format.
        assert_eq!(id.pack(), "myorg/myws");
    }

    #[test]
    fn test_current_format_detected() {
        let (_, format) = WorkspaceId::parse("acme/web").unwrap();
        assert_eq!(format, IdFormat::Current);
    }

    #[test]
    fn test_rejects_malformed() {
        for bad in ["no-slash-or-pipe", "a/b/c", "", "/web", "acme/", "|acme", "web|"] {
            let err = unpack_workspace_id(bad).unwrap_err();
            assert_eq!(err, IdError::invalid_format(bad), "{bad}");
        }
    }

    #[test]
    fn test_error_message_names_expected_shape() {
        let err = unpack_workspace_id("a/b/c").unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid workspace ID format: a/b/c (expected <ORGANIZATION>/<WORKSPACE>)"
        );
    }
}
