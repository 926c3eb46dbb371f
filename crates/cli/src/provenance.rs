//! `<stem>.provenance.json` sidecars: which code produced an artifact, and with what inputs.

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::panic::Location;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::OnceLock;

/// Run parameters plus the optional run identifier from `--run-id`.
pub struct Payload {
    pub params: Value,
    pub run_id: Option<String>,
}

impl Payload {
    pub fn new(params: Value, run_id: Option<String>) -> Self {
        Self { params, run_id }
    }
}

#[derive(Serialize)]
struct Callsite {
    file: &'static str,
    line: u32,
}

#[derive(Serialize)]
struct Record<'a> {
    code_rev: &'static str,
    centerline_version: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    callsite: Option<Callsite>,
    run_id: Option<&'a str>,
    params: &'a Value,
    outputs: Vec<String>,
}

impl<'a> Record<'a> {
    fn new(run_id: Option<&'a str>, params: &'a Value) -> Self {
        Self {
            code_rev: code_rev(),
            centerline_version: centerline::VERSION,
            callsite: None,
            run_id,
            params,
            outputs: Vec::new(),
        }
    }
}

/// Record `payload` next to `artifact`; the caller's source location is kept too.
#[track_caller]
pub fn write_sidecar<P: AsRef<Path>>(artifact: P, payload: Payload) -> Result<PathBuf> {
    let caller = Location::caller();
    let artifact = artifact.as_ref();
    let path = sidecar_path(artifact);
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    }

    let record = Record {
        callsite: Some(Callsite {
            file: caller.file(),
            line: caller.line(),
        }),
        outputs: vec![artifact.display().to_string()],
        ..Record::new(payload.run_id.as_deref(), &payload.params)
    };
    fs::write(&path, serde_json::to_vec_pretty(&record)?)
        .with_context(|| format!("writing {}", path.display()))?;
    tracing::debug!(path = %path.display(), "provenance written");
    Ok(path)
}

/// `dir/lines.csv` → `dir/lines.provenance.json`.
fn sidecar_path(artifact: &Path) -> PathBuf {
    artifact.with_extension("provenance.json")
}

/// Provenance of the running binary alone, for `cli report`.
pub fn report_block(run_id: Option<String>) -> Result<Value> {
    let params = Value::Object(Default::default());
    Ok(serde_json::to_value(Record::new(run_id.as_deref(), &params))?)
}

/// `GIT_COMMIT` if set, otherwise `git rev-parse HEAD`, otherwise `"unknown"`. Looked up once.
fn code_rev() -> &'static str {
    static REV: OnceLock<String> = OnceLock::new();
    REV.get_or_init(|| {
        std::env::var("GIT_COMMIT")
            .ok()
            .filter(|rev| !rev.is_empty())
            .or_else(git_head)
            .unwrap_or_else(|| "unknown".to_string())
    })
}

fn git_head() -> Option<String> {
    let output = Command::new("git").args(["rev-parse", "HEAD"]).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let rev = String::from_utf8(output.stdout).ok()?;
    Some(rev.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn sidecar_path_replaces_extension() {
        assert_eq!(
            sidecar_path(Path::new("/tmp/output/lines.csv")),
            Path::new("/tmp/output/lines.provenance.json")
        );
        assert_eq!(
            sidecar_path(Path::new("out")),
            Path::new("out.provenance.json")
        );
    }

    #[test]
    fn write_sidecar_records_params_and_output() {
        let dir = tempdir().unwrap();
        let artifact = dir.path().join("nested").join("sol.json");
        let payload = Payload::new(json!({"seeds": [0, 4]}), Some("run-7".into()));
        let path = write_sidecar(&artifact, payload).unwrap();
        assert_eq!(path, dir.path().join("nested").join("sol.provenance.json"));
        let parsed: Value = serde_json::from_slice(&fs::read(path).unwrap()).unwrap();
        assert_eq!(parsed["outputs"][0], artifact.display().to_string());
        assert_eq!(parsed["params"]["seeds"][1], 4);
        assert_eq!(parsed["run_id"], "run-7");
        assert_eq!(parsed["centerline_version"], centerline::VERSION);
        assert!(parsed["callsite"]["file"]
            .as_str()
            .unwrap()
            .ends_with("provenance.rs"));
    }

    #[test]
    fn report_block_has_no_outputs_or_callsite() {
        let block = report_block(None).unwrap();
        assert!(block["outputs"].as_array().unwrap().is_empty());
        assert!(block["run_id"].is_null());
        assert!(block.get("callsite").is_none());
        assert!(!block["code_rev"].as_str().unwrap().is_empty());
    }
}
