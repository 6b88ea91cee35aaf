// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Self-test: prove the guards actually fire.
//!
//! Each test clones the caller's stack (the live instance is never touched),
//! then overwrites memory next to one guard a byte at a time, re-verifying
//! after each byte. The guard must report its own mismatch kind within a
//! bounded number of bytes.
//!
//! | Target              | What gets overwritten                                         |
//! |---------------------|---------------------------------------------------------------|
//! | `LeadingContainer`  | bytes of a `#[repr(C)]` frame, from the sentinel before the stack forward |
//! | `TrailingContainer` | bytes of the frame, from the sentinel after the stack backward |
//! | `LeadingData`       | bytes of the backing block, from the payload start backward   |
//! | `TrailingData`      | bytes of the backing block, from the payload end forward      |
//!
//! The container targets need raw writes that deliberately cross a field
//! boundary. That is the only `unsafe` in the crate, and the writes are
//! bounded to the sentinel, the alignment padding and the guard word itself:
//! the loop never reaches a field that could hold an invalid value.

#![allow(unsafe_code)]

use std::ptr;

use tracing::{info, warn};

use crate::allocator::Reallocator;
use crate::error::{Result, StackError};
use crate::guard::GUARD_WIDTH;
use crate::stack::CanaryStack;

/// Byte written over the protected neighbourhood.
const POISON: u8 = 0x00;

/// Which guard a self-test attacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CanaryTarget {
    LeadingContainer,
    TrailingContainer,
    LeadingData,
    TrailingData,
}

impl CanaryTarget {
    pub const ALL: [CanaryTarget; 4] = [
        CanaryTarget::LeadingContainer,
        CanaryTarget::TrailingContainer,
        CanaryTarget::LeadingData,
        CanaryTarget::TrailingData,
    ];

    pub fn label(self) -> &'static str {
        match self {
            CanaryTarget::LeadingContainer => "leading container guard",
            CanaryTarget::TrailingContainer => "trailing container guard",
            CanaryTarget::LeadingData => "leading data guard",
            CanaryTarget::TrailingData => "trailing data guard",
        }
    }

    /// Whether `err` is the mismatch this target must produce.
    pub fn is_expected(self, err: &StackError) -> bool {
        matches!(
            (self, err),
            (
                CanaryTarget::LeadingContainer,
                StackError::LeadingContainerGuard { .. }
            ) | (
                CanaryTarget::TrailingContainer,
                StackError::TrailingContainerGuard { .. }
            ) | (CanaryTarget::LeadingData, StackError::LeadingDataGuard { .. })
                | (CanaryTarget::TrailingData, StackError::TrailingDataGuard { .. })
        )
    }
}

/// Outcome of a successful self-test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelfTestReport {
    pub target: CanaryTarget,
    /// Bytes overwritten before verification tripped.
    pub iterations: usize,
    /// Bytes the guard was allowed to take.
    pub budget: usize,
    pub detected: StackError,
}

/// Stack copy with one sentinel byte on either side.
#[repr(C)]
struct CanaryTestFrame<R: Reallocator> {
    before: [u8; 1],
    stack: CanaryStack<R>,
    after: [u8; 1],
}

/// Attack one guard of a copy of `stack`.
///
/// `stack` must verify cleanly first; if it does not, its own error comes
/// back unchanged.
pub fn self_test<R>(stack: &CanaryStack<R>, target: CanaryTarget) -> Result<SelfTestReport>
where
    R: Reallocator + Clone,
{
    if let Err(err) = stack.verify() {
        warn!(%err, "stack is already broken, self-test skipped");
        return Err(err);
    }

    let result = match target {
        CanaryTarget::LeadingContainer | CanaryTarget::TrailingContainer => {
            attack_container(stack, target)
        }
        CanaryTarget::LeadingData | CanaryTarget::TrailingData => attack_data(stack, target),
    };

    match &result {
        Ok(report) => info!(
            target = target.label(),
            iterations = report.iterations,
            budget = report.budget,
            "canary test passed"
        ),
        Err(err) => warn!(target = target.label(), %err, "canary test failed"),
    }
    result
}

/// Run all four targets, stopping at the first failure.
pub fn run_all<R>(stack: &CanaryStack<R>) -> Result<Vec<SelfTestReport>>
where
    R: Reallocator + Clone,
{
    CanaryTarget::ALL
        .iter()
        .map(|&target| self_test(stack, target))
        .collect()
}

/// Walk `budget` bytes, verifying before each write. `write(i)` overwrites
/// the `i`-th byte of the walk.
fn walk(
    target: CanaryTarget,
    budget: usize,
    mut verify: impl FnMut() -> Result<()>,
    mut write: impl FnMut(usize),
) -> Result<SelfTestReport> {
    let mut last = String::from("OK");
    for i in 0..=budget {
        match verify() {
            Err(err) if target.is_expected(&err) => {
                return Ok(SelfTestReport {
                    target,
                    iterations: i,
                    budget,
                    detected: err,
                });
            }
            Err(err) => last = err.name().to_string(),
            Ok(()) => last = String::from("OK"),
        }
        if i < budget {
            write(i);
        }
    }

    Err(StackError::TestFailed {
        target: target.label(),
        budget,
        last,
    })
}

fn attack_container<R>(stack: &CanaryStack<R>, target: CanaryTarget) -> Result<SelfTestReport>
where
    R: Reallocator + Clone,
{
    let mut frame = CanaryTestFrame {
        before: [0],
        stack: stack.clone(),
        after: [0],
    };

    let base = ptr::addr_of!(frame) as usize;
    let before = ptr::addr_of!(frame.before) as usize - base;
    let after = ptr::addr_of!(frame.after) as usize - base;
    let leading = ptr::addr_of!(frame.stack.leading_canary) as usize - base;
    let trailing = ptr::addr_of!(frame.stack.trailing_canary) as usize - base;

    // Offsets (relative to the frame) of every byte the walk may write,
    // nearest to the sentinel first.
    let offsets: Vec<usize> = match target {
        CanaryTarget::LeadingContainer => (before..leading + GUARD_WIDTH).collect(),
        _ => (trailing..=after).rev().collect(),
    };
    let budget = offsets.len();

    let frame_ptr: *mut CanaryTestFrame<R> = &mut frame;
    walk(
        target,
        budget,
        // SAFETY: `frame_ptr` points at the live local `frame`; the shared
        // borrow ends before the next write.
        || unsafe { (*frame_ptr).stack.verify() },
        |i| {
            // SAFETY: every offset lies inside `frame` and covers only a
            // sentinel byte, padding, or a byte of a `u64` guard word. Any bit
            // pattern is valid there and no other field is touched.
            unsafe {
                let byte = frame_ptr.cast::<u8>().add(offsets[i]);
                ptr::write_volatile(byte, POISON);
            }
        },
    )
}

fn attack_data<R>(stack: &CanaryStack<R>, target: CanaryTarget) -> Result<SelfTestReport>
where
    R: Reallocator + Clone,
{
    let mut copy = stack.clone();
    let (word, order): (usize, Vec<usize>) = match target {
        CanaryTarget::LeadingData => (
            copy.storage.leading.ok_or(StackError::NullLeadingGuard)?,
            (0..GUARD_WIDTH).rev().collect(),
        ),
        _ => (
            copy.storage.trailing.ok_or(StackError::NullTrailingGuard)?,
            (0..GUARD_WIDTH).collect(),
        ),
    };

    let cell = std::cell::RefCell::new(&mut copy);
    walk(
        target,
        GUARD_WIDTH,
        || cell.borrow().verify(),
        |i| {
            let mut stack = cell.borrow_mut();
            if let Some(slot) = stack.storage.words_mut().get_mut(word) {
                let mut bytes = slot.to_ne_bytes();
                bytes[order[i]] = POISON;
                *slot = u64::from_ne_bytes(bytes);
            }
        },
    )
}
