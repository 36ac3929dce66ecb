//! Entry point for the Payroll Engine binary.
//!
//! Running this binary executes one pay run from JSON files and
//! prints the issued records and department summaries as JSON.  The
//! deduction policy file may be specified via the
//! `PAYROLL_POLICY_FILE` environment variable; if unset the engine
//! looks for `policy.json` relative to the current working directory.
//! Alternatively, set `PAYROLL_POLICY_DIR` to a directory of
//! versioned policy files and `PAYROLL_POLICY_VERSION` to pick one.
//!
//! Usage: `payroll_engine <roster.json> <payrun.json>`
//!
//! - `roster.json` — an array of employees (id, name, department,
//!   position) used to build the in-memory directory.
//! - `payrun.json` — a pay run input: the pay period plus one
//!   employee-id/basic-pay request per line item.

use anyhow::{bail, Context, Result};
use payroll_engine::models::{Employee, PayRunInput};
use payroll_engine::tax::{load_policy_snapshot, load_policy_snapshots_from_dir, PolicySnapshot};
use payroll_engine::{engine, logging, report, InMemoryEmployeeDirectory};
use std::path::{Path, PathBuf};

fn main() -> Result<()> {
    logging::init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() != 3 {
        bail!("usage: {} <roster.json> <payrun.json>", args[0]);
    }

    let snapshot = load_snapshot()?;
    tracing::info!(version = %snapshot.version, "loaded deduction policy");

    let roster: Vec<Employee> = serde_json::from_str(
        &std::fs::read_to_string(&args[1]).with_context(|| format!("reading {}", args[1]))?,
    )
    .context("parsing employee roster")?;
    let input: PayRunInput = serde_json::from_str(
        &std::fs::read_to_string(&args[2]).with_context(|| format!("reading {}", args[2]))?,
    )
    .context("parsing pay run input")?;

    let directory = InMemoryEmployeeDirectory::new(roster);
    let result = engine::run_payroll(input, &directory, &snapshot.policy)?;
    let summaries = report::aggregate(&result.records, &directory)?;

    let output = serde_json::json!({
        "pay_run": result,
        "summaries": summaries,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

/// Resolves the deduction policy from the environment.
///
/// `PAYROLL_POLICY_DIR` + `PAYROLL_POLICY_VERSION` select one snapshot
/// out of a directory of versioned policy files; otherwise the single
/// file named by `PAYROLL_POLICY_FILE` (default `policy.json`) is
/// loaded.
fn load_snapshot() -> Result<PolicySnapshot> {
    if let Ok(dir) = std::env::var("PAYROLL_POLICY_DIR") {
        let version = std::env::var("PAYROLL_POLICY_VERSION")
            .context("PAYROLL_POLICY_DIR is set but PAYROLL_POLICY_VERSION is not")?;
        let snapshots = load_policy_snapshots_from_dir(Path::new(&dir))
            .with_context(|| format!("loading policies from {dir}"))?;
        return snapshots
            .into_iter()
            .find(|snapshot| snapshot.version == version)
            .with_context(|| format!("no policy with version {version:?} under {dir}"));
    }

    let policy_path =
        PathBuf::from(std::env::var("PAYROLL_POLICY_FILE").unwrap_or_else(|_| "policy.json".into()));
    load_policy_snapshot(&policy_path)
        .with_context(|| format!("loading policy from {}", policy_path.display()))
}
