//! Change detection between persisted state and declared configuration.

use std::collections::BTreeSet;
use std::fmt;

use crate::schema::{VcsRepoConfig, WorkspaceConfig};
use crate::state::{VcsRepoState, WorkspaceState};

/// A declared field of a workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Name,
    Organization,
    AutoApply,
    FileTriggersEnabled,
    Operations,
    QueueAllRuns,
    TerraformVersion,
    TriggerPrefixes,
    WorkingDirectory,
    VcsRepo,
    SshKeyId,
}

impl Field {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Organization => "organization",
            Self::AutoApply => "auto_apply",
            Self::FileTriggersEnabled => "file_triggers_enabled",
            Self::Operations => "operations",
            Self::QueueAllRuns => "queue_all_runs",
            Self::TerraformVersion => "terraform_version",
            Self::TriggerPrefixes => "trigger_prefixes",
            Self::WorkingDirectory => "working_directory",
            Self::VcsRepo => "vcs_repo",
            Self::SshKeyId => "ssh_key_id",
        }
    }

    /// Fields carried by the primary update request.
    #[must_use]
    pub fn is_primary(&self) -> bool {
        !matches!(self, Self::Organization | Self::SshKeyId)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The set of declared fields that differ from the prior state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    fields: BTreeSet<Field>,
}

impl ChangeSet {
    pub fn between(prior: &WorkspaceState, config: &WorkspaceConfig) -> Self {
        let mut fields = BTreeSet::new();
        let mut mark = |field: Field, changed: bool| {
            if changed {
                fields.insert(field);
            }
        };

        mark(Field::Name, prior.name != config.name);
        mark(Field::Organization, prior.organization != config.organization);
        mark(Field::AutoApply, prior.auto_apply != config.auto_apply);
        mark(
            Field::FileTriggersEnabled,
            prior.file_triggers_enabled != config.file_triggers_enabled,
        );
        mark(Field::Operations, prior.operations != config.operations);
        mark(Field::QueueAllRuns, prior.queue_all_runs != config.queue_all_runs);
        // Server-computed unless declared.
        mark(
            Field::TerraformVersion,
            config
                .declared_terraform_version()
                .is_some_and(|v| v != prior.terraform_version),
        );
        mark(
            Field::TriggerPrefixes,
            prior.trigger_prefixes != config.trigger_prefixes,
        );
        mark(
            Field::WorkingDirectory,
            config
                .working_directory
                .as_deref()
                .is_some_and(|v| v != prior.working_directory),
        );
        mark(
            Field::VcsRepo,
            !vcs_matches(prior.vcs_repo.as_ref(), config.vcs_repo.as_ref()),
        );
        mark(Field::SshKeyId, prior.ssh_key_id != config.ssh_key_id);

        Self { fields }
    }

    #[must_use]
    pub fn contains(&self, field: Field) -> bool {
        self.fields.contains(&field)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Field> + '_ {
        self.fields.iter().copied()
    }

    /// Returns true if the primary update request has to be sent.
    #[must_use]
    pub fn has_primary(&self) -> bool {
        self.fields.iter().any(Field::is_primary)
    }

    #[must_use]
    pub fn ssh_key_changed(&self) -> bool {
        self.contains(Field::SshKeyId)
    }

    /// Returns the first changed field that cannot be updated in place.
    #[must_use]
    pub fn requires_replacement(&self) -> Option<Field> {
        self.contains(Field::Organization)
            .then_some(Field::Organization)
    }
}

impl fmt::Display for ChangeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.fields.iter().map(Field::as_str).collect();
        f.write_str(&names.join(", "))
    }
}

fn vcs_matches(prior: Option<&VcsRepoState>, declared: Option<&VcsRepoConfig>) -> bool {
    match (prior, declared) {
        (None, None) => true,
        (Some(p), Some(d)) => {
            p.identifier == d.identifier
                && p.ingress_submodules == d.ingress_submodules
                && p.oauth_token_id == d.oauth_token_id
                && p.branch.as_deref().unwrap_or_default() == d.branch
        }
        _ => false,
    }
}
