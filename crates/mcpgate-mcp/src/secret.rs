//! Secret resolution: evaluate `secret_commands` before spawning
//! a child, producing `{env_var: value}` overlay entries.

use std::collections::HashMap;
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tracing::warn;

/// Wall-clock budget for a single secret command.
const SECRET_COMMAND_TIMEOUT: Duration = Duration::from_secs(10);

/// Runs every configured secret command for one child and returns the
/// env-var overlay for the entries that succeeded.
///
/// Per-entry failure (non-zero exit, timeout, or spawn error) is logged as a
/// warning and the entry is omitted — it never fails the caller. This is
/// deliberate: operators may configure optional secrets.
pub async fn resolve_secrets(
    child_id: &str,
    secret_commands: &HashMap<String, Vec<String>>,
) -> HashMap<String, String> {
    let mut resolved = HashMap::with_capacity(secret_commands.len());
    for (env_var, argv) in secret_commands {
        match resolve_one(argv).await {
            Ok(value) => {
                resolved.insert(env_var.clone(), value);
            }
            Err(reason) => {
                warn!(
                    child_id,
                    env_var, reason, "secret command failed, omitting env var"
                );
            }
        }
    }
    resolved
}

async fn resolve_one(argv: &[String]) -> Result<String, String> {
    let (program, args) = argv
        .split_first()
        .ok_or_else(|| "empty secret command argv".to_string())?;

    let mut command = Command::new(program);
    command
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null());

    let run = async {
        let output = command
            .output()
            .await
            .map_err(|e| format!("spawn failed: {e}"))?;
        if !output.status.success() {
            return Err(format!(
                "exited with status {}",
                output
                    .status
                    .code()
                    .map(|c| c.to_string())
                    .unwrap_or_else(|| "signal".to_string())
            ));
        }
        let text = String::from_utf8_lossy(&output.stdout);
        Ok(text.trim_end_matches(['\n', '\r']).trim().to_string())
    };

    match tokio::time::timeout(SECRET_COMMAND_TIMEOUT, run).await {
        Ok(result) => result,
        Err(_) => Err("timed out".to_string()),
    }
}
