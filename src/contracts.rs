// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Hard-abort contracts for programmer errors.
//!
//! Data-driven failures (underflow, dead guards, allocation failure) are never
//! asserted: they come back as [`StackError`](crate::StackError) values. The
//! macro here is reserved for states the crate itself must never produce, such
//! as a freshly allocated buffer below the floor capacity.
//!
//! Like `debug_assert!`, the check is compiled in debug builds only. On
//! failure it reports the expression, file, line and enclosing module, then
//! terminates the process with exit code 1.
//!
//! ```ignore
//! canary_assert!(capacity >= FLOOR_CAPACITY);
//! ```

/// Abort the process if `cond` is false (debug builds only).
#[macro_export]
macro_rules! canary_assert {
    ($cond:expr $(,)?) => {
        if cfg!(debug_assertions) && !$cond {
            $crate::contracts::contract_violation(
                stringify!($cond),
                file!(),
                line!(),
                module_path!(),
            );
        }
    };
}

/// Report a broken contract and exit.
#[cold]
#[inline(never)]
pub fn contract_violation(expr: &str, file: &str, line: u32, function: &str) -> ! {
    tracing::error!(expr, file, line, function, "contract violation");
    eprintln!(
        "canary_assert failed in {}: {}\n  line {}: {}\n",
        file, function, line, expr
    );
    std::process::exit(1);
}
