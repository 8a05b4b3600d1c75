// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

use chrono::{DateTime, Utc};
use courier_routing_model::{
    problem::loader::InstanceLoader, solution::io::SolutionWriter, validation::FeasibilityChecker,
};
use courier_routing_solver::engine::solver::{Solver, SolverConfig};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

fn enable_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
}

fn find_instances_dir() -> Option<PathBuf> {
    let mut cur: Option<&Path> = Some(Path::new(env!("CARGO_MANIFEST_DIR")));
    while let Some(p) = cur {
        let cand = p.join("instances");
        if cand.is_dir() {
            return Some(cand);
        }
        cur = p.parent();
    }
    None
}

fn has_courier_table(dir: &Path) -> bool {
    std::fs::read_dir(dir)
        .map(|entries| {
            entries.filter_map(|e| e.ok()).any(|e| {
                e.file_name()
                    .to_str()
                    .map(|n| n.ends_with("couriers.csv"))
                    .unwrap_or(false)
            })
        })
        .unwrap_or(false)
}

/// The root itself when it holds the tables directly, otherwise every
/// direct subdirectory that does, sorted by name.
fn instance_dirs(root: &Path) -> Vec<PathBuf> {
    if has_courier_table(root) {
        return vec![root.to_path_buf()];
    }
    let mut dirs: Vec<PathBuf> = std::fs::read_dir(root)
        .map(|entries| {
            entries
                .filter_map(|e| e.ok())
                .map(|e| e.path())
                .filter(|p| p.is_dir() && has_courier_table(p))
                .collect()
        })
        .unwrap_or_default();
    dirs.sort();
    dirs
}

#[derive(Debug, Clone)]
struct CliArgs {
    instances_root: Option<PathBuf>,
    solver: SolverConfig,
}

fn parse_args() -> Result<CliArgs, String> {
    let mut args = CliArgs {
        instances_root: None,
        solver: SolverConfig::default().with_time_limit(Duration::from_secs(10)),
    };
    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--time-limit-secs" => {
                let v = it.next().ok_or("--time-limit-secs needs a value")?;
                let secs: u64 = v.parse().map_err(|_| format!("bad time limit: {v}"))?;
                args.solver.time_limit = Duration::from_secs(secs);
            }
            "--seed" => {
                let v = it.next().ok_or("--seed needs a value")?;
                args.solver.seed = v.parse().map_err(|_| format!("bad seed: {v}"))?;
            }
            "--workers" => {
                let v = it.next().ok_or("--workers needs a value")?;
                args.solver.workers = v.parse().map_err(|_| format!("bad worker count: {v}"))?;
            }
            "--no-stacking" => args.solver.stacking = false,
            _ if arg.starts_with("--") => return Err(format!("unknown flag: {arg}")),
            _ => args.instances_root = Some(PathBuf::from(arg)),
        }
    }
    Ok(args)
}

#[derive(Serialize)]
struct RunRecord {
    instance: String,
    start_ts: DateTime<Utc>,
    end_ts: DateTime<Utc>,
    runtime_ms: u128,
    total_delivery_time: Option<f64>,
    feasible: Option<bool>,
}

fn dir_name(dir: &Path) -> String {
    dir.file_name()
        .and_then(|s| s.to_str())
        .map(|s| s.to_string())
        .unwrap_or_else(|| dir.to_string_lossy().into_owned())
}

fn run_instance(dir: &Path, config: &SolverConfig) -> RunRecord {
    let name = dir_name(dir);
    let start_ts = Utc::now();
    let t0 = Instant::now();

    let outcome = InstanceLoader::new()
        .from_dir(dir)
        .map_err(|e| e.to_string())
        .and_then(|instance| {
            tracing::info!(
                instance = %name,
                couriers = instance.courier_count(),
                deliveries = instance.delivery_count(),
                "solving"
            );
            Solver::new()
                .solve(&instance, config)
                .map(|sol| (instance, sol))
                .map_err(|e| e.to_string())
        });

    let runtime = t0.elapsed();
    let end_ts = Utc::now();

    match outcome {
        Ok((instance, solution)) => {
            let report = FeasibilityChecker::new().check(&instance, &solution);
            if !report.is_feasible() {
                tracing::error!(instance = %name, "infeasible solution: {report}");
            }
            tracing::info!(
                instance = %name,
                total = solution.total_delivery_time(),
                feasible = report.is_feasible(),
                "finished in {:?}",
                runtime
            );

            let out_path = PathBuf::from(format!("{name}_solution.csv"));
            let written = File::create(&out_path).and_then(|f| {
                let mut w = BufWriter::new(f);
                SolutionWriter::new().write(&solution, &mut w)?;
                w.flush()
            });
            match written {
                Ok(()) => tracing::info!(instance = %name, "wrote {}", out_path.display()),
                Err(e) => tracing::error!(instance = %name, "failed to write {}: {e}", out_path.display()),
            }

            RunRecord {
                instance: name,
                start_ts,
                end_ts,
                runtime_ms: runtime.as_millis(),
                total_delivery_time: Some(solution.total_delivery_time()),
                feasible: Some(report.is_feasible()),
            }
        }
        Err(e) => {
            tracing::error!(instance = %name, "failed: {e}");
            RunRecord {
                instance: name,
                start_ts,
                end_ts,
                runtime_ms: runtime.as_millis(),
                total_delivery_time: None,
                feasible: None,
            }
        }
    }
}

fn write_report(results: &[RunRecord]) {
    let out_path = PathBuf::from("solver_results.json");
    let serialized = match serde_json::to_string_pretty(results) {
        Ok(json) => json,
        Err(e) => {
            tracing::error!("failed to serialize run records: {e}");
            return;
        }
    };
    match File::create(&out_path).and_then(|mut f| f.write_all(serialized.as_bytes())) {
        Ok(()) => tracing::info!(
            "wrote {} run record(s) to {}",
            results.len(),
            out_path.display()
        ),
        Err(e) => tracing::error!("failed to write {}: {e}", out_path.display()),
    }
}

fn main() -> ExitCode {
    enable_tracing();

    let args = match parse_args() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("{e}");
            eprintln!(
                "usage: courier-routing-cli [--time-limit-secs N] [--seed N] [--workers N] [--no-stacking] [instances-dir]"
            );
            return ExitCode::FAILURE;
        }
    };

    let root = match args.instances_root.or_else(find_instances_dir) {
        Some(root) => root,
        None => {
            tracing::error!(
                "no instances directory given and none found in any ancestor of CARGO_MANIFEST_DIR"
            );
            return ExitCode::FAILURE;
        }
    };

    let dirs = instance_dirs(&root);
    if dirs.is_empty() {
        tracing::error!("no instance directories under {}", root.display());
        return ExitCode::FAILURE;
    }

    let results: Vec<RunRecord> = dirs
        .iter()
        .map(|dir| run_instance(dir, &args.solver))
        .collect();
    write_report(&results);

    if results.iter().any(|r| r.total_delivery_time.is_none()) {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
