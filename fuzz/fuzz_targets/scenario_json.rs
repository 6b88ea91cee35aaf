// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Fuzz target for scenario parsing.
//!
//! Arbitrary bytes must either parse or return an error. A scenario that
//! parses must run to completion without panicking.

#![no_main]

use canary_stack::{CanaryStack, DemoScenario};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(scenario) = DemoScenario::from_json(text) else {
        return;
    };

    let mut stk = CanaryStack::with_config(scenario.stack);
    if stk.initialize().is_err() {
        return;
    }
    // Cap work to avoid timeouts
    for &v in scenario.pushes.iter().take(4_096) {
        let _ = stk.push(v);
    }
    if scenario.peek {
        let _ = stk.peek();
    }
    for _ in 0..scenario.pops.min(4_096) {
        let _ = stk.pop();
    }
    assert_eq!(stk.verify(), Ok(()));
    assert_eq!(stk.destroy(), Ok(()));
});
