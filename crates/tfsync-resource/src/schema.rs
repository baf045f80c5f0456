//! Declared workspace configuration.
//!
//! This is the desired state supplied by the caller. Field defaults match
//! the remote service's own defaults so that an omitted field and an
//! explicit default produce the same requests.

use serde::{Deserialize, Serialize};

use crate::error::ResourceError;

/// A string setting that distinguishes "not declared" from "declared empty".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "Option<String>")]
pub enum Declared {
    #[default]
    Unset,
    Empty,
    Value(String),
}

impl Declared {
    #[must_use]
    pub fn is_set(&self) -> bool {
        !matches!(self, Self::Unset)
    }

    /// Returns the declared value, `Some("")` for [`Declared::Empty`].
    #[must_use]
    pub fn as_deref(&self) -> Option<&str> {
        match self {
            Self::Unset => None,
            Self::Empty => Some(""),
            Self::Value(v) => Some(v),
        }
    }
}

impl From<Option<String>> for Declared {
    fn from(value: Option<String>) -> Self {
        match value {
            None => Self::Unset,
            Some(v) if v.is_empty() => Self::Empty,
            Some(v) => Self::Value(v),
        }
    }
}

impl From<&str> for Declared {
    fn from(value: &str) -> Self {
        Some(value.to_string()).into()
    }
}

impl From<Declared> for Option<String> {
    fn from(value: Declared) -> Self {
        match value {
            Declared::Unset => None,
            Declared::Empty => Some(String::new()),
            Declared::Value(v) => Some(v),
        }
    }
}

fn default_true() -> bool {
    true
}

/// Desired state of one workspace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WorkspaceConfig {
    pub name: String,
    /// Owning organization. Cannot change after creation.
    pub organization: String,
    #[serde(default)]
    pub auto_apply: bool,
    #[serde(default = "default_true")]
    pub file_triggers_enabled: bool,
    #[serde(default = "default_true")]
    pub operations: bool,
    #[serde(default = "default_true")]
    pub queue_all_runs: bool,
    /// Linked SSH key. Empty means no key.
    #[serde(default)]
    pub ssh_key_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terraform_version: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub trigger_prefixes: Vec<String>,
    #[serde(default)]
    pub working_directory: Declared,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vcs_repo: Option<VcsRepoConfig>,
}

/// Declared VCS repository block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VcsRepoConfig {
    pub identifier: String,
    /// Tracked branch. Empty means the repository default branch.
    #[serde(default)]
    pub branch: String,
    #[serde(default)]
    pub ingress_submodules: bool,
    pub oauth_token_id: String,
}

impl VcsRepoConfig {
    pub fn new(identifier: impl Into<String>, oauth_token_id: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            branch: String::new(),
            ingress_submodules: false,
            oauth_token_id: oauth_token_id.into(),
        }
    }
}

impl WorkspaceConfig {
    /// Creates a configuration with every optional field at its default.
    pub fn new(organization: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            organization: organization.into(),
            auto_apply: false,
            file_triggers_enabled: true,
            operations: true,
            queue_all_runs: true,
            ssh_key_id: String::new(),
            terraform_version: None,
            trigger_prefixes: Vec::new(),
            working_directory: Declared::Unset,
            vcs_repo: None,
        }
    }

    /// Returns the Terraform version if one is declared and non-empty.
    #[must_use]
    pub fn declared_terraform_version(&self) -> Option<&str> {
        self.terraform_version.as_deref().filter(|v| !v.is_empty())
    }

    /// Returns true if a non-empty VCS branch is declared.
    #[must_use]
    pub fn tracks_branch(&self) -> bool {
        self.vcs_repo.as_ref().is_some_and(|v| !v.branch.is_empty())
    }

    /// Checks the fields that end up in the persisted identifier and the
    /// required parts of the VCS block.
    pub fn validate(&self) -> Result<(), ResourceError> {
        check_id_component("name", &self.name)?;
        check_id_component("organization", &self.organization)?;
        if let Some(vcs) = &self.vcs_repo {
            if vcs.identifier.is_empty() {
                return Err(ResourceError::invalid_config(
                    "vcs_repo.identifier must not be empty",
                ));
            }
            if vcs.oauth_token_id.is_empty() {
                return Err(ResourceError::invalid_config(
                    "vcs_repo.oauth_token_id must not be empty",
                ));
            }
        }
        Ok(())
    }
}

fn check_id_component(field: &str, value: &str) -> Result<(), ResourceError> {
    if value.is_empty() {
        return Err(ResourceError::invalid_config(format!(
            "{field} must not be empty"
        )));
    }
    if value.contains(['/', '|']) {
        return Err(ResourceError::invalid_config(format!(
            "{field} {value:?} must not contain '/' or '|'"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_toml() {
        let cfg: WorkspaceConfig = toml::from_str(
            r#"
name = "web"
organization = "acme"
"#,
        )
        .unwrap();
        assert_eq!(cfg, WorkspaceConfig::new("acme", "web"));
        assert!(!cfg.auto_apply);
        assert!(cfg.file_triggers_enabled);
        assert!(cfg.operations);
        assert!(cfg.queue_all_runs);
        assert_eq!(cfg.working_directory, Declared::Unset);
    }

    #[test]
    fn test_working_directory_three_states() {
        let empty: WorkspaceConfig = toml::from_str(
            r#"
name = "web"
organization = "acme"
working_directory = ""
"#,
        )
        .unwrap();
        assert_eq!(empty.working_directory, Declared::Empty);
        assert_eq!(empty.working_directory.as_deref(), Some(""));

        let value: WorkspaceConfig = toml::from_str(
            r#"
name = "web"
organization = "acme"
working_directory = "infra/prod"
"#,
        )
        .unwrap();
        assert_eq!(
            value.working_directory,
            Declared::Value("infra/prod".to_string())
        );
        assert!(value.working_directory.is_set());
    }

    #[test]
    fn test_vcs_block() {
        let cfg: WorkspaceConfig = toml::from_str(
            r#"
name = "web"
organization = "acme"

[vcs_repo]
identifier = "acme/web"
oauth_token_id = "ot-1"
branch = "main"
"#,
        )
        .unwrap();
        let vcs = cfg.vcs_repo.as_ref().unwrap();
        assert!(!vcs.ingress_submodules);
        assert!(cfg.tracks_branch());
        cfg.validate().unwrap();
    }

    #[test]
    fn test_unknown_field_rejected() {
        let res: Result<WorkspaceConfig, _> = toml::from_str(
            r#"
name = "web"
organization = "acme"
speculative = true
"#,
        );
        assert!(res.is_err());
    }

    #[test]
    fn test_validate_identifier_components() {
        assert!(WorkspaceConfig::new("acme", "").validate().is_err());
        assert!(WorkspaceConfig::new("", "web").validate().is_err());
        assert!(WorkspaceConfig::new("acme", "we/b").validate().is_err());
        assert!(WorkspaceConfig::new("ac|me", "web").validate().is_err());
        assert!(WorkspaceConfig::new("acme", "web").validate().is_ok());
    }

    #[test]
    fn test_validate_vcs_required_fields() {
        let mut cfg = WorkspaceConfig::new("acme", "web");
        cfg.vcs_repo = Some(VcsRepoConfig::new("", "ot-1"));
        assert!(matches!(
            cfg.validate(),
            Err(ResourceError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn test_empty_terraform_version_is_undeclared() {
        let mut cfg = WorkspaceConfig::new("acme", "web");
        cfg.terraform_version = Some(String::new());
        assert_eq!(cfg.declared_terraform_version(), None);
    }
}
