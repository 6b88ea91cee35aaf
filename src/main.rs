use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use canary_stack::{
    dump_stack, selftest, CanaryStack, CanaryTarget, DemoScenario, Reallocator, StackConfig,
    StackError, VerifyMode, GUARD_WIDTH,
};

mod cli;
use cli::display::{self, row, section_bot, section_top};
use cli::{Cli, Commands, ModeArgs};

/// Run one stack call; on failure print `line N: call = code` and carry on.
macro_rules! step {
    ($call:expr) => {{
        let result = $call;
        if let Err(err) = &result {
            println!(
                "{}",
                display::failed_call(line!(), stringify!($call), err)
            );
        }
        result
    }};
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let outcome = match cli.command {
        Commands::Demo { scenario, mode } => run_demo(scenario.as_deref(), &mode),
        Commands::Selftest { values } => run_selftest(values),
        Commands::Ram { push, bytes } => run_ram(&push, bytes),
    };

    match outcome {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("{} {:#}", display::themed(display::RED, &[display::BOLD], "error:"), e);
            std::process::exit(1);
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "canary_stack=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn demo_config(scenario: &DemoScenario, mode: &ModeArgs) -> StackConfig {
    match (mode.strict, mode.entry_only) {
        (_, true) => StackConfig::entry_only(),
        (true, _) => StackConfig::strict(),
        _ => scenario.stack,
    }
}

/// Load the scenario, pick the verify mode and run the script on stdout.
fn run_demo(scenario: Option<&Path>, mode: &ModeArgs) -> Result<bool> {
    let scenario = match scenario {
        Some(path) => DemoScenario::load(path)?,
        None => DemoScenario::default(),
    };
    let config = demo_config(&scenario, mode);
    let mode_name = match config.verify_mode {
        VerifyMode::Strict => "strict",
        VerifyMode::EntryOnly => "entry-only",
    };

    section_top("DEMO");
    row(&format!(
        " {} pushes, {} pops, verify mode {}",
        scenario.pushes.len(),
        scenario.pops,
        mode_name
    ));
    section_bot();

    let mut out = io::stdout().lock();
    let mut stk = CanaryStack::with_config(config);
    let ok = run_script(&mut stk, &scenario, &mut out)?;
    out.flush()?;
    Ok(ok)
}

/// The classic walk: dump, push, dump, peek, pop, dump, destroy, dump.
///
/// Returns whether every call succeeded. A pop on an empty stack is the one
/// tolerated failure, so scenarios may pop more than they push.
fn run_script<R, W>(
    stk: &mut CanaryStack<R>,
    scenario: &DemoScenario,
    out: &mut W,
) -> Result<bool>
where
    R: Reallocator + Clone,
    W: Write,
{
    let mut ok = true;

    ok &= step!(stk.initialize()).is_ok();
    dump_stack!(out, &*stk)?;

    for &value in &scenario.pushes {
        ok &= step!(stk.push(value)).is_ok();
    }
    dump_stack!(out, &*stk)?;

    if scenario.peek {
        match step!(stk.peek()) {
            Ok(top) => println!("{}", display::value_line("peek", top)),
            Err(_) => ok = false,
        }
    }

    for _ in 0..scenario.pops {
        match step!(stk.pop()) {
            Ok(value) => println!("{}", display::value_line("pop", value)),
            Err(StackError::Underflow) => {}
            Err(_) => ok = false,
        }
    }
    dump_stack!(out, &*stk)?;

    if scenario.self_test && stk.is_initialized() {
        ok &= print_self_tests(stk);
    }

    ok &= step!(stk.destroy()).is_ok();
    dump_stack!(out, &*stk)?;
    dump_stack!(out, None::<&CanaryStack<R>>)?;

    Ok(ok)
}

fn run_selftest(values: usize) -> Result<bool> {
    let mut stk = CanaryStack::new();
    stk.initialize().context("initialize")?;
    for i in 0..values {
        stk.push(i as f64 + 0.5).context("push")?;
    }
    let ok = print_self_tests(&stk);
    stk.destroy().context("destroy")?;
    Ok(ok)
}

fn print_self_tests<R: Reallocator + Clone>(stk: &CanaryStack<R>) -> bool {
    section_top("CANARY SELF-TEST");
    let mut all = true;
    for target in CanaryTarget::ALL {
        let line = match selftest::self_test(stk, target) {
            Ok(report) => format!(
                " {}  {:<26} tripped after {}/{} bytes as {}",
                display::verdict(true),
                target.label(),
                report.iterations,
                report.budget,
                report.detected.name()
            ),
            Err(err) => {
                all = false;
                format!(
                    " {}  {:<26} {} ({})",
                    display::verdict(false),
                    target.label(),
                    err.name(),
                    err.code()
                )
            }
        };
        row(&line);
    }
    section_bot();
    all
}

/// Hex view of the backing block, 8 bytes (one word) per line.
fn run_ram(push: &[f64], bytes: Option<usize>) -> Result<bool> {
    let mut stk = CanaryStack::new();
    stk.initialize().context("initialize")?;
    for &value in push {
        stk.push(value).context("push")?;
    }

    let storage = stk.storage();
    let raw = storage.to_bytes();
    let shown = bytes.unwrap_or(raw.len()).min(raw.len());
    let last_word = storage.capacity() + 1;

    section_top(&format!(
        "RAM {} bytes, capacity {}, region {}",
        storage.byte_len(),
        storage.capacity(),
        storage.region()
    ));
    for (word, chunk) in raw[..shown].chunks(GUARD_WIDTH).enumerate() {
        let guard = word == 0 || word == last_word;
        let hex: Vec<String> = chunk.iter().map(|&b| display::hex_byte(b, guard)).collect();
        let label = match word {
            0 => "leading guard".to_string(),
            w if w == last_word => "trailing guard".to_string(),
            w => format!("slot {}", w - 1),
        };
        row(&format!(" +{:04}  {}  {}", word * GUARD_WIDTH, hex.join(" "), label));
    }
    section_bot();

    stk.destroy().context("destroy")?;
    Ok(true)
}
