use anyhow::Result;
use colored::Colorize;
use tabled::builder::Builder;
use tabled::settings::Style;
use tfsync_resource::WorkspaceState;

use crate::cli::OutputFormat;

pub fn print_state(state: &WorkspaceState, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(state)?),
        OutputFormat::Table => println!("{}", state_table(state)),
    }
    Ok(())
}

pub fn print_success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

pub fn print_warning(msg: &str) {
    eprintln!("{} {}", "!".yellow(), msg);
}

pub fn print_error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg.red());
}

fn state_table(state: &WorkspaceState) -> String {
    let mut builder = Builder::default();
    builder.push_record(["Attribute", "Value"]);

    let flag = |b: bool| b.to_string();
    let or_dash = |s: &str| if s.is_empty() { "-".to_string() } else { s.to_string() };

    builder.push_record(["id".to_string(), state.id.clone()]);
    builder.push_record(["external_id".to_string(), state.external_id.clone()]);
    builder.push_record(["name".to_string(), state.name.clone()]);
    builder.push_record(["organization".to_string(), state.organization.clone()]);
    builder.push_record(["auto_apply".to_string(), flag(state.auto_apply)]);
    builder.push_record([
        "file_triggers_enabled".to_string(),
        flag(state.file_triggers_enabled),
    ]);
    builder.push_record(["operations".to_string(), flag(state.operations)]);
    builder.push_record(["queue_all_runs".to_string(), flag(state.queue_all_runs)]);
    builder.push_record([
        "terraform_version".to_string(),
        or_dash(&state.terraform_version),
    ]);
    builder.push_record([
        "trigger_prefixes".to_string(),
        or_dash(&state.trigger_prefixes.join(", ")),
    ]);
    builder.push_record([
        "working_directory".to_string(),
        or_dash(&state.working_directory),
    ]);
    builder.push_record(["ssh_key_id".to_string(), or_dash(&state.ssh_key_id)]);
    if let Some(vcs) = &state.vcs_repo {
        builder.push_record(["vcs_repo.identifier".to_string(), vcs.identifier.clone()]);
        builder.push_record([
            "vcs_repo.branch".to_string(),
            or_dash(vcs.branch.as_deref().unwrap_or_default()),
        ]);
        builder.push_record([
            "vcs_repo.ingress_submodules".to_string(),
            flag(vcs.ingress_submodules),
        ]);
        builder.push_record([
            "vcs_repo.oauth_token_id".to_string(),
            vcs.oauth_token_id.clone(),
        ]);
    }

    builder.build().with(Style::rounded()).to_string()
}

#[cfg(test)]
mod tests {
    use tfsync_resource::VcsRepoState;

    use super::*;

    #[test]
    fn test_state_table_lists_attributes() {
        let state = WorkspaceState {
            id: "acme/web".into(),
            external_id: "ws-1".into(),
            name: "web".into(),
            organization: "acme".into(),
            auto_apply: true,
            file_triggers_enabled: true,
            operations: true,
            queue_all_runs: false,
            terraform_version: "1.6.0".into(),
            trigger_prefixes: vec!["modules/".into()],
            working_directory: String::new(),
            ssh_key_id: String::new(),
            vcs_repo: Some(VcsRepoState {
                identifier: "acme/web".into(),
                branch: None,
                ingress_submodules: false,
                oauth_token_id: "ot-1".into(),
            }),
        };
        let table = state_table(&state);
        assert!(table.contains("acme/web"));
        assert!(table.contains("modules/"));
        assert!(table.contains("vcs_repo.oauth_token_id"));
    }
}
