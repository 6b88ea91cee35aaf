// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! CLI definitions for the canary-stack command-line interface.
//!
//! Three subcommands: `demo` walks a stack through a scripted sequence and
//! dumps it along the way, `selftest` proves each guard trips, and `ram`
//! prints the raw bytes of a fresh stack's backing block.

pub mod display;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "canary-stack",
    about = "Canary-guarded stack: demo, self-test and memory view",
    version
)]
pub struct Cli {
    /// Log library events at debug level (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the scripted push/peek/pop sequence with dumps
    Demo {
        /// JSON scenario file (pushes, pops, peek, selfTest, stack)
        #[arg(long)]
        scenario: Option<PathBuf>,

        #[command(flatten)]
        mode: ModeArgs,
    },

    /// Corrupt a copy of a populated stack and check every guard trips
    Selftest {
        /// Number of values to push before testing
        #[arg(short, long, default_value = "3")]
        values: usize,
    },

    /// Print the backing block of a fresh stack byte by byte
    Ram {
        /// Values to push first
        #[arg(long, value_delimiter = ',')]
        push: Vec<f64>,

        /// Maximum number of bytes to print
        #[arg(short, long)]
        bytes: Option<usize>,
    },
}

#[derive(Args, Default)]
#[group(multiple = false)]
pub struct ModeArgs {
    /// Verify on entry and before returning (default)
    #[arg(long)]
    pub strict: bool,

    /// Verify on entry only
    #[arg(long)]
    pub entry_only: bool,
}
