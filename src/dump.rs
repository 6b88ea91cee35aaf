// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Diagnostic dump: the full internal state as human-readable text.
//!
//! Every field, both container guards, both data guards with their distance
//! from the base constant, and every allocated slot up to `capacity` (not just
//! up to `size`). Slots holding live elements are marked with `*`; anything
//! non-zero in an unmarked slot was written where nothing should be.
//!
//! The format is for people. It is not meant to be parsed back.
//!
//! ```text
//! ------- STACK DUMP ---------
//! called from src/main.rs:42 (canary_stack) as `stk`
//! Stack `stk` [instance #7] {
//!   .leading_canary  = 0xbaadf00dfeedfad5 (expected 0xbaadf00dfeedfad5, delta +0x7)
//!   ...
//! }
//! ----------------------------
//! ```

use std::io::{self, Write};

use crate::allocator::Reallocator;
use crate::guard::{self, GuardWord, CONTAINER_GUARD_CONST, DATA_GUARD_CONST};
use crate::stack::CanaryStack;

/// Where a dump was requested from, and what the caller calls the stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DumpSite {
    pub file: &'static str,
    pub line: u32,
    pub function: &'static str,
    pub name: &'static str,
}

impl DumpSite {
    /// Name with any leading `&` from `stringify!` removed.
    pub fn display_name(&self) -> &str {
        self.name.trim_start_matches('&').trim()
    }
}

/// Dump `stack` to `sink`, tagged with the caller's location and the
/// expression text.
///
/// ```ignore
/// dump_stack!(&mut std::io::stdout(), &stk)?;
/// dump_stack!(&mut out, None::<&CanaryStack>)?;
/// ```
#[macro_export]
macro_rules! dump_stack {
    ($sink:expr, $stack:expr $(,)?) => {
        $crate::dump::dump(
            $sink,
            &$crate::dump::DumpSite {
                file: file!(),
                line: line!(),
                function: module_path!(),
                name: stringify!($stack),
            },
            $stack,
        )
    };
}

const OPEN: &str = "------- STACK DUMP ---------";
const CLOSE: &str = "----------------------------";

/// Render `stack` (or the null record) to `sink`.
pub fn dump<'a, R, W>(
    sink: &mut W,
    site: &DumpSite,
    stack: impl Into<Option<&'a CanaryStack<R>>>,
) -> io::Result<()>
where
    R: Reallocator + 'a,
    W: Write + ?Sized,
{
    writeln!(sink, "{}", OPEN)?;
    writeln!(
        sink,
        "called from {}:{} ({}) as `{}`",
        site.file,
        site.line,
        site.function,
        site.display_name()
    )?;

    match stack.into() {
        None => writeln!(sink, "Stack (null) {{}}")?,
        Some(stack) => write_stack(sink, site.display_name(), stack)?,
    }

    writeln!(sink, "{}", CLOSE)
}

fn write_stack<R, W>(sink: &mut W, name: &str, stack: &CanaryStack<R>) -> io::Result<()>
where
    R: Reallocator,
    W: Write + ?Sized,
{
    let expected_container = stack.expected_container_guard();
    let storage = stack.storage();

    writeln!(sink, "Stack `{}` [instance {}] {{", name, stack.instance())?;
    writeln!(
        sink,
        "  .leading_canary  = {}",
        guard_line(stack.leading_canary(), expected_container, CONTAINER_GUARD_CONST)
    )?;
    writeln!(
        sink,
        "  .trailing_canary = {}",
        guard_line(stack.trailing_canary(), expected_container, CONTAINER_GUARD_CONST)
    )?;
    writeln!(sink, "  .initialized     = {}", stack.is_initialized())?;
    writeln!(sink, "  .size            = {}", stack.len())?;
    writeln!(sink, "  .capacity        = {}", stack.capacity())?;
    match stack.verify() {
        Ok(()) => writeln!(sink, "  .status          = OK")?,
        Err(err) => writeln!(
            sink,
            "  .status          = {} ({}): {}",
            err.name(),
            err.code(),
            err
        )?,
    }

    if storage.is_null() {
        writeln!(sink, "  .data[{}] (null) {{}}", stack.capacity())?;
    } else {
        let expected_data = storage.expected_guard();
        writeln!(
            sink,
            "  .data[{}] (region {}) {{",
            stack.capacity(),
            storage.region()
        )?;
        writeln!(
            sink,
            "    .leading_guard  = {}",
            optional_guard_line(storage.leading_guard(), expected_data)
        )?;
        for (i, slot) in storage.slots().enumerate() {
            let mark = if i < stack.len() { '*' } else { ' ' };
            match slot {
                Some(value) => writeln!(sink, "   {}[{}]: {}", mark, i, value)?,
                None => writeln!(sink, "   {}[{}]: <out of block>", mark, i)?,
            }
        }
        writeln!(
            sink,
            "    .trailing_guard = {}",
            optional_guard_line(storage.trailing_guard(), expected_data)
        )?;
        writeln!(sink, "  }}")?;
    }

    writeln!(sink, "}}")
}

fn guard_line(found: GuardWord, expected: GuardWord, constant: GuardWord) -> String {
    let verdict = if found == expected { "" } else { " DEAD" };
    format!(
        "{:#018x} (expected {:#018x}, delta +{:#x}){}",
        found,
        expected,
        guard::delta(constant, found),
        verdict
    )
}

fn optional_guard_line(found: Option<GuardWord>, expected: GuardWord) -> String {
    match found {
        Some(found) => guard_line(found, expected, DATA_GUARD_CONST),
        None => "(null)".to_string(),
    }
}
