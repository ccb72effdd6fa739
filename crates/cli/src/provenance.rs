//! `<output>.provenance.json` sidecars: which build produced an output, from which inputs,
//! and what the resulting diagram looked like.

use anyhow::{Context, Result};
use planevd::VoronoiDiagram;
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Shape of a finished diagram, as recorded next to every `run` output.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DiagramSummary {
    pub far: f64,
    pub bins: usize,
    pub point_sites: usize,
    pub line_sites: usize,
    pub rejected: usize,
    pub check: bool,
}

impl DiagramSummary {
    pub fn of(vd: &VoronoiDiagram, bins: usize, rejected: usize) -> Self {
        Self {
            far: vd.far_radius(),
            bins,
            point_sites: vd.num_point_sites(),
            line_sites: vd.num_line_sites(),
            rejected,
            check: vd.check(),
        }
    }
}

/// Everything a sidecar records besides the build identity.
#[derive(Debug, Serialize)]
pub struct Payload {
    /// Subcommand that wrote the output.
    pub command: &'static str,
    pub params: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagram: Option<DiagramSummary>,
    /// Extra files written by the same command, listed after the primary output.
    #[serde(skip)]
    pub extra_outputs: Vec<PathBuf>,
}

impl Payload {
    pub fn new(command: &'static str, params: Value) -> Self {
        Self {
            command,
            params,
            diagram: None,
            extra_outputs: Vec::new(),
        }
    }

    pub fn with_diagram(mut self, summary: DiagramSummary) -> Self {
        self.diagram = Some(summary);
        self
    }

    pub fn with_output(mut self, path: &Path) -> Self {
        self.extra_outputs.push(path.to_path_buf());
        self
    }
}

#[derive(Serialize)]
struct Sidecar<'a> {
    version: &'static str,
    code_rev: String,
    outputs: Vec<String>,
    #[serde(flatten)]
    payload: &'a Payload,
}

/// Write the sidecar of `artifact` and return its path.
pub fn write_sidecar(artifact: &Path, payload: &Payload) -> Result<PathBuf> {
    let path = provenance_path(artifact);
    let outputs = std::iter::once(artifact)
        .chain(payload.extra_outputs.iter().map(PathBuf::as_path))
        .map(|p| p.to_string_lossy().into_owned())
        .collect();
    let doc = Sidecar {
        version: planevd::VERSION,
        code_rev: current_git_rev(),
        outputs,
        payload,
    };
    fs::write(&path, serde_json::to_vec_pretty(&doc)?)
        .with_context(|| format!("writing {}", path.display()))?;
    tracing::debug!(path = %path.display(), command = payload.command, "wrote provenance");
    Ok(path)
}

/// `dir/report.json` → `dir/report.provenance.json`.
fn provenance_path(artifact: &Path) -> PathBuf {
    let stem = artifact
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    artifact.with_file_name(format!("{stem}.provenance.json"))
}

/// Commit of the running build: `GIT_COMMIT` at compile or run time, else `git rev-parse`.
pub fn current_git_rev() -> String {
    option_env!("GIT_COMMIT")
        .map(str::to_string)
        .or_else(|| std::env::var("GIT_COMMIT").ok())
        .filter(|rev| !rev.is_empty())
        .or_else(|| {
            let out = Command::new("git").args(["rev-parse", "HEAD"]).output().ok()?;
            out.status
                .success()
                .then(|| String::from_utf8_lossy(&out.stdout).trim().to_string())
        })
        .unwrap_or_else(|| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use planevd::point::Point;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn sidecar_sits_next_to_the_output() {
        assert_eq!(
            provenance_path(Path::new("/tmp/output/report.json")),
            Path::new("/tmp/output/report.provenance.json")
        );
        assert_eq!(provenance_path(Path::new("sites.csv")), Path::new("sites.provenance.json"));
    }

    #[test]
    fn sidecar_records_the_diagram_summary() {
        let mut vd = VoronoiDiagram::new(10.0, 3).unwrap();
        let a = vd.insert_point_site(Point::new(-2.0, 0.5)).unwrap();
        let b = vd.insert_point_site(Point::new(3.0, -1.0)).unwrap();
        vd.insert_line_site(a, b).unwrap();
        let summary = DiagramSummary::of(&vd, 3, 1);
        assert_eq!((summary.point_sites, summary.line_sites, summary.rejected), (2, 1, 1));
        assert!(summary.check);

        let dir = tempdir().unwrap();
        let report = dir.path().join("report.json");
        let edges = dir.path().join("edges.parquet");
        let payload = Payload::new("run", json!({"tag": "t1"}))
            .with_diagram(summary)
            .with_output(&edges);
        let path = write_sidecar(&report, &payload).unwrap();
        let doc: Value = serde_json::from_slice(&fs::read(path).unwrap()).unwrap();
        assert_eq!(doc["version"], planevd::VERSION);
        assert_eq!(doc["command"], "run");
        assert_eq!(doc["params"]["tag"], "t1");
        assert_eq!(doc["diagram"]["far"], 10.0);
        assert_eq!(doc["diagram"]["line_sites"], 1);
        assert_eq!(doc["diagram"]["check"], true);
        assert_eq!(doc["outputs"][0], report.to_string_lossy().as_ref());
        assert_eq!(doc["outputs"][1], edges.to_string_lossy().as_ref());
    }

    #[test]
    fn sample_sidecar_has_no_diagram() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("cloud.csv");
        let path = write_sidecar(&out, &Payload::new("sample", json!({"n": 5}))).unwrap();
        let doc: Value = serde_json::from_slice(&fs::read(path).unwrap()).unwrap();
        assert!(doc.get("diagram").is_none());
        assert_eq!(doc["outputs"].as_array().map(Vec::len), Some(1));
    }
}
