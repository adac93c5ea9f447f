//! Shared fixtures for the gateway integration tests.
//!
//! Every fake child here is a tiny inline python3 script, the same style the
//! unit test in `mcpgate_mcp::child_session` already uses: one process,
//! line-delimited JSON-RPC on stdio, no framework. Tests that need one skip
//! gracefully if `python3` isn't on `PATH`.

use std::collections::HashMap;

use mcpgate_core::ChildConfig;

/// Returns the `python3` interpreter path, or `None` (after printing why) if
/// it isn't available in this environment.
pub fn require_python() -> Option<String> {
    match which::which("python3") {
        Ok(path) => Some(path.to_string_lossy().into_owned()),
        Err(_) => {
            eprintln!("skipping: python3 not available in this environment");
            None
        }
    }
}

fn script_config(id: &str, script: &str) -> ChildConfig {
    ChildConfig {
        id: id.to_string(),
        command: "python3".to_string(),
        args: vec!["-c".to_string(), script.to_string()],
        env: HashMap::new(),
        secret_commands: HashMap::new(),
    }
}

/// A child exposing one tool, `say`, that echoes `arguments.msg` back as a
/// single text content block.
const ECHO_CHILD_SRC: &str = r#"
import sys, json

def write(obj):
    sys.stdout.write(json.dumps(obj) + "\n")
    sys.stdout.flush()

for line in sys.stdin:
    line = line.strip()
    if not line:
        continue
    try:
        req = json.loads(line)
    except Exception:
        continue
    method = req.get("method")
    rid = req.get("id")
    if method == "initialize":
        write({"jsonrpc": "2.0", "id": rid, "result": {
            "protocolVersion": "2025-06-18", "capabilities": {}, "serverInfo": {}}})
    elif method == "notifications/initialized":
        pass
    elif method == "tools/list":
        write({"jsonrpc": "2.0", "id": rid, "result": {"tools": [
            {"name": "say", "description": "says something back",
             "inputSchema": {"type": "object"}}]}})
    elif method == "tools/call":
        msg = req.get("params", {}).get("arguments", {}).get("msg", "")
        write({"jsonrpc": "2.0", "id": rid, "result": {
            "content": [{"type": "text", "text": msg}]}})
"#;

pub fn echo_child(id: &str) -> ChildConfig {
    script_config(id, ECHO_CHILD_SRC)
}

/// Like [`echo_child`], but writes one line of garbage to stdout right after
/// answering `tools/list`, sandwiched between two valid responses.
const FLAKY_CHILD_SRC: &str = r#"
import sys, json

def write(obj):
    sys.stdout.write(json.dumps(obj) + "\n")
    sys.stdout.flush()

for line in sys.stdin:
    line = line.strip()
    if not line:
        continue
    try:
        req = json.loads(line)
    except Exception:
        continue
    method = req.get("method")
    rid = req.get("id")
    if method == "initialize":
        write({"jsonrpc": "2.0", "id": rid, "result": {
            "protocolVersion": "2025-06-18", "capabilities": {}, "serverInfo": {}}})
    elif method == "notifications/initialized":
        pass
    elif method == "tools/list":
        write({"jsonrpc": "2.0", "id": rid, "result": {"tools": [
            {"name": "say", "description": "says something back",
             "inputSchema": {"type": "object"}}]}})
        sys.stdout.write("not even json\n")
        sys.stdout.flush()
    elif method == "tools/call":
        msg = req.get("params", {}).get("arguments", {}).get("msg", "")
        write({"jsonrpc": "2.0", "id": rid, "result": {
            "content": [{"type": "text", "text": msg}]}})
"#;

pub fn flaky_child(id: &str) -> ChildConfig {
    script_config(id, FLAKY_CHILD_SRC)
}

/// A child exposing one tool, `boom`, that exits without responding the
/// moment it's called — simulates a peer crashing mid-call.
const CRASHING_CHILD_SRC: &str = r#"
import sys, json, os

def write(obj):
    sys.stdout.write(json.dumps(obj) + "\n")
    sys.stdout.flush()

for line in sys.stdin:
    line = line.strip()
    if not line:
        continue
    try:
        req = json.loads(line)
    except Exception:
        continue
    method = req.get("method")
    rid = req.get("id")
    if method == "initialize":
        write({"jsonrpc": "2.0", "id": rid, "result": {
            "protocolVersion": "2025-06-18", "capabilities": {}, "serverInfo": {}}})
    elif method == "notifications/initialized":
        pass
    elif method == "tools/list":
        write({"jsonrpc": "2.0", "id": rid, "result": {"tools": [
            {"name": "boom", "description": "exits without responding",
             "inputSchema": {"type": "object"}}]}})
    elif method == "tools/call":
        os._exit(1)
"#;

pub fn crashing_child(id: &str) -> ChildConfig {
    script_config(id, CRASHING_CHILD_SRC)
}
