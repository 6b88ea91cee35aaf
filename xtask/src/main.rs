//! Custom cargo commands for the canary stack.
//!
//! Usage:
//!   cargo xtask verify    - Run full verification suite
//!   cargo xtask test      - Run all tests
//!   cargo xtask kani      - Run Kani proofs
//!   cargo xtask fuzz      - Run every fuzz target briefly
//!   cargo xtask check     - Quick check (no Kani, no fuzzing)

use anyhow::{bail, Context, Result};
use std::env;
use std::path::PathBuf;
use std::process::Command;

/// Fuzz targets under fuzz/fuzz_targets
const FUZZ_TARGETS: &[&str] = &["op_sequence", "scenario_json"];

/// Constants the proof crate duplicates, with the file that owns each one
const SHARED_CONSTANTS: &[(&str, &str)] = &[
    ("FLOOR_CAPACITY", "src/policy.rs"),
    ("DATA_GUARD_CONST", "src/guard.rs"),
];

fn main() -> Result<()> {
    let task = env::args().nth(1);
    match task.as_deref() {
        Some("verify") => verify()?,
        Some("test") => test()?,
        Some("kani") => kani()?,
        Some("fuzz") => fuzz(env::args().nth(2).as_deref())?,
        Some("check") => check()?,
        Some("bench") => bench()?,
        _ => print_help(),
    }
    Ok(())
}

fn print_help() {
    eprintln!(
        r#"
cargo xtask <COMMAND>

Commands:
  verify        Run full verification suite (tests + clippy + Kani + constant alignment)
  test          Run all Rust tests
  kani          Run Kani proofs only
  fuzz [SECS]   Run each fuzz target for SECS seconds (default 30)
  check         Quick check (cargo test + clippy, no Kani)
  bench         Run benchmarks
"#
    );
}

/// Full verification suite
fn verify() -> Result<()> {
    println!("==========================================");
    println!("Canary Stack Verification Suite");
    println!("==========================================\n");

    println!("[1/4] Running Rust tests...");
    run_cargo(&["test", "--quiet"])?;
    println!("✓ All Rust tests passed\n");

    println!("[2/4] Running clippy...");
    run_cargo(&["clippy", "--quiet", "--", "-D", "warnings"])?;
    println!("✓ Clippy passed\n");

    println!("[3/4] Verifying proof crate constants...");
    verify_constants()?;
    println!("✓ Constants aligned\n");

    println!("[4/4] Running Kani proofs...");
    kani()?;
    println!("✓ Kani proofs hold\n");

    println!("==========================================");
    println!("✓ ALL VERIFICATION CHECKS PASSED");
    println!("==========================================");

    Ok(())
}

/// Run all tests
fn test() -> Result<()> {
    run_cargo(&["test"])
}

/// Run Kani proofs
fn kani() -> Result<()> {
    let proofs_dir = project_root()?.join("kani-proofs");

    let status = Command::new("cargo")
        .arg("kani")
        .current_dir(&proofs_dir)
        .status()
        .context("Failed to run cargo kani (is kani-verifier installed?)")?;

    if !status.success() {
        bail!("Kani proofs failed");
    }

    Ok(())
}

/// Run every fuzz target for a fixed time
fn fuzz(seconds: Option<&str>) -> Result<()> {
    let seconds: u64 = match seconds {
        Some(s) => s.parse().with_context(|| format!("invalid seconds: {}", s))?,
        None => 30,
    };
    let fuzz_dir = project_root()?.join("fuzz");

    for target in FUZZ_TARGETS {
        println!("Fuzzing {} for {}s...", target, seconds);
        let status = Command::new("cargo")
            .args(["+nightly", "fuzz", "run", target, "--"])
            .arg(format!("-max_total_time={}", seconds))
            .current_dir(&fuzz_dir)
            .status()
            .with_context(|| format!("Failed to run cargo fuzz for {}", target))?;

        if !status.success() {
            bail!("fuzz target {} failed", target);
        }
    }

    println!("\n✓ Fuzz targets clean");
    Ok(())
}

/// Quick check (no Kani)
fn check() -> Result<()> {
    println!("Running quick checks...\n");

    println!("[1/3] cargo check...");
    run_cargo(&["check"])?;

    println!("[2/3] cargo test...");
    run_cargo(&["test", "--quiet"])?;

    println!("[3/3] cargo clippy...");
    run_cargo(&["clippy", "--quiet", "--", "-D", "warnings"])?;

    println!("\n✓ Quick checks passed");
    Ok(())
}

/// Run benchmarks
fn bench() -> Result<()> {
    run_cargo(&["bench"])
}

// ============================================================================
// Helper functions
// ============================================================================

fn project_root() -> Result<PathBuf> {
    let manifest_dir = match env::var("CARGO_MANIFEST_DIR") {
        Ok(dir) => PathBuf::from(dir),
        Err(_) => env::current_dir().context("Failed to read current directory")?,
    };

    // xtask is in project_root/xtask, so go up one level
    let root = manifest_dir.parent().unwrap_or(&manifest_dir);
    Ok(root.to_path_buf())
}

fn run_cargo(args: &[&str]) -> Result<()> {
    let root = project_root()?;

    let status = Command::new("cargo")
        .args(args)
        .current_dir(&root)
        .status()
        .with_context(|| format!("Failed to run cargo {:?}", args))?;

    if !status.success() {
        bail!("cargo {:?} failed", args);
    }

    Ok(())
}

/// The proof crate copies constants instead of depending on the main crate.
/// Make sure the copies have not drifted.
fn verify_constants() -> Result<()> {
    let root = project_root()?;
    let proofs = std::fs::read_to_string(root.join("kani-proofs/src/lib.rs"))
        .context("Failed to read kani-proofs/src/lib.rs")?;

    for (name, owner) in SHARED_CONSTANTS {
        let source = std::fs::read_to_string(root.join(owner))
            .with_context(|| format!("Failed to read {}", owner))?;

        let Some(ours) = extract_const(&source, name) else {
            bail!("{} not found in {}", name, owner);
        };
        let Some(theirs) = extract_const(&proofs, name) else {
            bail!("{} not found in kani-proofs", name);
        };

        if ours != theirs {
            bail!("{}: {} has {} but kani-proofs has {}", name, owner, ours, theirs);
        }
    }

    Ok(())
}

fn extract_const(content: &str, name: &str) -> Option<String> {
    // Look for "pub const NAME: type = value;"
    let needle = format!("const {}:", name);
    content
        .lines()
        .find(|line| line.contains(&needle))
        .and_then(|line| line.split('=').nth(1))
        .map(|value| value.trim().trim_end_matches(';').trim().replace('_', ""))
}
