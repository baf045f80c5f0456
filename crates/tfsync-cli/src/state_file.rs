use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use tfsync_resource::{WorkspaceConfig, WorkspaceState};

/// Reads the state file. A missing file means no workspace is managed yet.
pub fn load(path: &Path) -> Result<Option<WorkspaceState>> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read state file: {}", path.display()))?;
    let state = serde_json::from_str(&content)
        .with_context(|| format!("Invalid state file: {}", path.display()))?;
    Ok(Some(state))
}

/// Writes the state file through a temporary file in the same directory so
/// a crash never leaves a partial file behind.
pub fn save(path: &Path, state: &WorkspaceState) -> Result<()> {
    let content = serde_json::to_string_pretty(state)?;
    let tmp = path.with_extension("json.tmp");
    {
        let mut file = fs::File::create(&tmp)
            .with_context(|| format!("Failed to create {}", tmp.display()))?;
        file.write_all(content.as_bytes())?;
        file.write_all(b"\n")?;
        file.sync_all()?;
    }
    fs::rename(&tmp, path)
        .with_context(|| format!("Failed to replace state file: {}", path.display()))?;
    Ok(())
}

/// Removes the state file if present.
pub fn remove(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => {
            Err(e).with_context(|| format!("Failed to remove state file: {}", path.display()))
        }
    }
}

/// Reads a workspace declaration.
pub fn load_config(path: &Path) -> Result<WorkspaceConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read workspace declaration: {}", path.display()))?;
    toml::from_str(&content)
        .with_context(|| format!("Invalid workspace declaration: {}", path.display()))
}
