mod provenance;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use planevd::prelude::*;
use planevd::sample::{random_points, random_polygon, PointCloudCfg, PolygonCfg, ReplayToken};
use polars::prelude::*;
use provenance::{write_sidecar, DiagramSummary, Payload};
use serde::Serialize;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing_subscriber::fmt::SubscriberBuilder;

#[derive(Parser)]
#[command(name = "cli")]
#[command(about = "Build Voronoi diagrams of point and segment sites from CSV input")]
struct Cmd {
    /// Optional run label; propagated to outputs and logs
    #[arg(long)]
    tag: Option<String>,

    #[command(subcommand)]
    action: Action,
}

#[derive(Subcommand)]
enum Action {
    /// Build a diagram and write a JSON report of counts and check results
    Run {
        /// CSV with columns `x,y`, one point site per row
        #[arg(long)]
        input: PathBuf,
        /// CSV with columns `a,b`: zero-based row indices of the points to join
        #[arg(long)]
        segments: Option<PathBuf>,
        #[arg(long)]
        out: PathBuf,
        /// Far radius; defaults to 1.1 times the largest point norm
        #[arg(long)]
        far: Option<f64>,
        /// Face-grid bins per axis; defaults to the square root of the point count
        #[arg(long)]
        bins: Option<usize>,
        /// Run the topology checker inside every insertion
        #[arg(long, default_value_t = false)]
        check_each: bool,
        /// Optional Parquet file of sampled edge polylines (`edge,kind,i,x,y`)
        #[arg(long)]
        edges: Option<PathBuf>,
    },
    /// Write a seeded random point cloud, or a closed star polygon with its segments
    Sample {
        #[arg(long, default_value_t = 100)]
        n: usize,
        #[arg(long, default_value_t = 0)]
        seed: u64,
        #[arg(long, default_value_t = false)]
        polygon: bool,
        /// Points CSV; with `--polygon` a `<stem>.segments.csv` is written next to it
        #[arg(long)]
        out: PathBuf,
    },
    /// Print version and provenance
    Report,
}

fn main() -> Result<()> {
    SubscriberBuilder::default().with_target(false).init();
    let cmd = Cmd::parse();
    match cmd.action {
        Action::Run {
            input,
            segments,
            out,
            far,
            bins,
            check_each,
            edges,
        } => {
            let opts = RunOpts {
                far,
                bins,
                check_each,
                edges,
                tag: cmd.tag,
            };
            run(&input, segments.as_deref(), &out, &opts).map(drop)
        }
        Action::Sample {
            n,
            seed,
            polygon,
            out,
        } => sample(n, seed, polygon, &out),
        Action::Report => report(cmd.tag),
    }
}

#[derive(Debug, Default, Serialize)]
struct RunReport {
    version: &'static str,
    far: f64,
    bins: usize,
    point_sites: usize,
    line_sites: usize,
    vertices: usize,
    faces: usize,
    vertex_types: Vec<(String, usize)>,
    rejected: Vec<String>,
    check: bool,
    elapsed_ms: f64,
}

fn read_points(path: &Path) -> Result<Vec<Point>> {
    let df = LazyCsvReader::new(path)
        .with_infer_schema_length(Some(100))
        .finish()?
        .collect()
        .with_context(|| format!("reading {}", path.display()))?;
    let xs = df.column("x")?.cast(&DataType::Float64)?;
    let ys = df.column("y")?.cast(&DataType::Float64)?;
    xs.f64()?
        .into_iter()
        .zip(ys.f64()?.into_iter())
        .enumerate()
        .map(|(i, (x, y))| match (x, y) {
            (Some(x), Some(y)) => Ok(Point::new(x, y)),
            _ => bail!("row {i} of {} has a missing coordinate", path.display()),
        })
        .collect()
}

fn read_segments(path: &Path) -> Result<Vec<(usize, usize)>> {
    let df = LazyCsvReader::new(path)
        .with_infer_schema_length(Some(100))
        .finish()?
        .collect()
        .with_context(|| format!("reading {}", path.display()))?;
    let a = df.column("a")?.cast(&DataType::Int64)?;
    let b = df.column("b")?.cast(&DataType::Int64)?;
    a.i64()?
        .into_iter()
        .zip(b.i64()?.into_iter())
        .enumerate()
        .map(|(i, (a, b))| match (a, b) {
            (Some(a), Some(b)) if a >= 0 && b >= 0 => Ok((a as usize, b as usize)),
            _ => bail!("row {i} of {} is not a pair of point indices", path.display()),
        })
        .collect()
}

/// Knobs of the `run` subcommand besides its input and output paths.
#[derive(Debug, Default)]
struct RunOpts {
    far: Option<f64>,
    bins: Option<usize>,
    check_each: bool,
    edges: Option<PathBuf>,
    tag: Option<String>,
}

fn run(input: &Path, segments: Option<&Path>, out: &Path, opts: &RunOpts) -> Result<VoronoiDiagram> {
    let RunOpts {
        far,
        bins,
        check_each,
        ref edges,
        ref tag,
    } = *opts;
    tracing::info!(input = %input.display(), out = %out.display(), tag = ?tag, "run");
    let points = read_points(input)?;
    let pairs = match segments {
        Some(p) => read_segments(p)?,
        None => Vec::new(),
    };
    let far = far.unwrap_or_else(|| 1.1 * points.iter().map(|p| p.norm()).fold(1.0, f64::max));
    let bins = bins.unwrap_or_else(|| ((points.len() as f64).sqrt().ceil() as usize).max(1));
    let cfg = VdCfg {
        check_each_insert: check_each,
        ..VdCfg::default()
    };

    let start = Instant::now();
    let mut vd = VoronoiDiagram::with_cfg(far, bins, cfg)?;
    let mut rejected = Vec::new();
    let mut ids = Vec::with_capacity(points.len());
    for (i, p) in points.iter().enumerate() {
        match vd.insert_point_site(*p) {
            Ok(id) => ids.push(Some(id)),
            Err(err) => {
                tracing::warn!(row = i, error = %err, "point rejected");
                rejected.push(format!("point {i}: {err}"));
                ids.push(None);
            }
        }
    }
    for (i, &(a, b)) in pairs.iter().enumerate() {
        let (Some(&Some(sa)), Some(&Some(sb))) = (ids.get(a), ids.get(b)) else {
            rejected.push(format!("segment {i}: endpoint {a} or {b} was not inserted"));
            continue;
        };
        if let Err(err) = vd.insert_line_site(sa, sb) {
            tracing::warn!(row = i, error = %err, "segment rejected");
            rejected.push(format!("segment {i}: {err}"));
        }
    }
    let elapsed_ms = start.elapsed().as_secs_f64() * 1e3;

    let kinds = [
        VertexType::Outer,
        VertexType::Normal,
        VertexType::PointSite,
        VertexType::EndPoint,
        VertexType::SepPoint,
        VertexType::Apex,
        VertexType::Split,
    ];
    let report = RunReport {
        version: planevd::VERSION,
        far,
        bins,
        point_sites: vd.num_point_sites(),
        line_sites: vd.num_line_sites(),
        vertices: vd.num_vertices(),
        faces: vd.num_faces(),
        vertex_types: kinds
            .iter()
            .map(|&k| (format!("{k:?}"), vd.num_vertex_type(k)))
            .collect(),
        rejected,
        check: vd.check(),
        elapsed_ms,
    };
    let summary = DiagramSummary::of(&vd, bins, report.rejected.len());
    tracing::info!(
        points = report.point_sites,
        segments = report.line_sites,
        check = report.check,
        elapsed_ms,
        "diagram built"
    );

    if let Some(parent) = out.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(out, serde_json::to_vec_pretty(&report)?)?;
    let params = serde_json::json!({
        "input": input.to_string_lossy(),
        "segments": segments.map(|p| p.to_string_lossy().into_owned()),
        "check_each": check_each,
        "tag": tag,
    });
    let mut payload = Payload::new("run", params).with_diagram(summary);
    if let Some(path) = edges {
        write_edges(&vd, path)?;
        payload = payload.with_output(path);
    }
    write_sidecar(out, &payload)?;
    Ok(vd)
}

/// Samples per curved edge; straight edges get their two ends only.
const CURVE_SAMPLES: usize = 16;

fn write_edges(vd: &VoronoiDiagram, path: &Path) -> Result<()> {
    let (mut ids, mut kinds, mut idx, mut xs, mut ys) = (vec![], vec![], vec![], vec![], vec![]);
    for e in vd.edges().iter().filter(|e| e.valid) {
        let n = match e.kind {
            EdgeType::Parabola | EdgeType::Ellipse | EdgeType::Hyperbola => CURVE_SAMPLES,
            _ => 1,
        };
        for (i, p) in vd.sample(e.id, n).unwrap_or_default().into_iter().enumerate() {
            ids.push(e.id.0 as u64);
            kinds.push(format!("{:?}", e.kind));
            idx.push(i as u32);
            xs.push(p.x);
            ys.push(p.y);
        }
    }
    let mut df = df!("edge" => ids, "kind" => kinds, "i" => idx, "x" => xs, "y" => ys)?;
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    ParquetWriter::new(File::create(path)?).finish(&mut df)?;
    tracing::info!(rows = df.height(), path = %path.display(), "wrote edge table");
    Ok(())
}

fn sample(n: usize, seed: u64, polygon: bool, out: &Path) -> Result<()> {
    tracing::info!(n, seed, polygon, out = %out.display(), "sample");
    let tok = ReplayToken::new(seed, 0);
    let pts = if polygon {
        random_polygon(
            PolygonCfg {
                vertices: n,
                ..PolygonCfg::default()
            },
            tok,
        )
    } else {
        random_points(
            PointCloudCfg {
                count: n,
                ..PointCloudCfg::default()
            },
            tok,
        )
    };
    if let Some(parent) = out.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let xs: Vec<f64> = pts.iter().map(|p| p.x).collect();
    let ys: Vec<f64> = pts.iter().map(|p| p.y).collect();
    let mut df = df!("x" => xs, "y" => ys)?;
    CsvWriter::new(File::create(out)?).finish(&mut df)?;

    let mut seg_path = None;
    if polygon {
        let m = pts.len() as i64;
        let a: Vec<i64> = (0..m).collect();
        let b: Vec<i64> = (0..m).map(|i| (i + 1) % m).collect();
        let mut segs = df!("a" => a, "b" => b)?;
        let stem = out.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default();
        let path = out.with_file_name(format!("{stem}.segments.csv"));
        CsvWriter::new(File::create(&path)?).finish(&mut segs)?;
        seg_path = Some(path);
    }
    let mut payload = Payload::new("sample", serde_json::json!({"n": n, "seed": seed, "polygon": polygon}));
    if let Some(path) = seg_path {
        payload = payload.with_output(&path);
    }
    write_sidecar(out, &payload)?;
    Ok(())
}

fn report(tag: Option<String>) -> Result<()> {
    let obj = serde_json::json!({
        "version": planevd::VERSION,
        "code_rev": provenance::current_git_rev(),
        "tag": tag,
    });
    println!("{}", serde_json::to_string_pretty(&obj)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use tempfile::tempdir;

    fn read_json(path: &Path) -> Value {
        serde_json::from_slice(&std::fs::read(path).unwrap()).unwrap()
    }

    #[test]
    fn run_writes_report_and_sidecar() {
        let dir = tempdir().unwrap();
        let pts = dir.path().join("pts.csv");
        std::fs::write(&pts, "x,y\n0.0,0.0\n1.0,0.2\n0.3,1.1\n-0.8,0.4\n").unwrap();
        let segs = dir.path().join("segs.csv");
        std::fs::write(&segs, "a,b\n0,1\n7,0\n").unwrap();
        let out = dir.path().join("out").join("report.json");
        let opts = RunOpts {
            check_each: true,
            ..RunOpts::default()
        };
        run(&pts, Some(&segs), &out, &opts).unwrap();

        let v = read_json(&out);
        assert_eq!(v["point_sites"], 4);
        assert_eq!(v["line_sites"], 1);
        assert_eq!(v["check"], true);
        assert_eq!(v["rejected"].as_array().unwrap().len(), 1);
        let prov = read_json(&dir.path().join("out").join("report.provenance.json"));
        assert_eq!(prov["command"], "run");
        assert_eq!(prov["diagram"]["point_sites"], 4);
        assert_eq!(prov["diagram"]["rejected"], 1);
        assert_eq!(prov["diagram"]["check"], true);
        assert_eq!(prov["diagram"]["bins"], v["bins"]);
    }

    #[test]
    fn edge_table_is_written_as_parquet() {
        let dir = tempdir().unwrap();
        let pts = dir.path().join("pts.csv");
        std::fs::write(&pts, "x,y\n0.0,0.0\n1.0,0.2\n0.3,1.1\n").unwrap();
        let segs = dir.path().join("segs.csv");
        std::fs::write(&segs, "a,b\n0,1\n").unwrap();
        let out = dir.path().join("report.json");
        let table = dir.path().join("edges.parquet");
        let opts = RunOpts {
            edges: Some(table.clone()),
            ..RunOpts::default()
        };
        run(&pts, Some(&segs), &out, &opts).unwrap();
        let prov = read_json(&dir.path().join("report.provenance.json"));
        assert_eq!(prov["outputs"][1], table.to_string_lossy().as_ref());

        let df = ParquetReader::new(File::open(&table).unwrap()).finish().unwrap();
        assert_eq!(df.width(), 5);
        let kinds = df.column("kind").unwrap().str().unwrap();
        assert!(kinds.into_iter().any(|k| k == Some("Parabola")));
        assert!(kinds.into_iter().any(|k| k == Some("LineSite")));
    }

    #[test]
    fn sampled_polygon_round_trips_through_run() {
        let dir = tempdir().unwrap();
        let pts = dir.path().join("poly.csv");
        sample(6, 3, true, &pts).unwrap();
        let segs = dir.path().join("poly.segments.csv");
        assert!(segs.exists());
        assert_eq!(read_points(&pts).unwrap().len(), 6);
        assert_eq!(read_segments(&segs).unwrap()[5], (5, 0));
        let prov = read_json(&dir.path().join("poly.provenance.json"));
        assert_eq!(prov["command"], "sample");
        assert_eq!(prov["outputs"][1], segs.to_string_lossy().as_ref());
    }
}
