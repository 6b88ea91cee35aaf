// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! The verification protocol.
//!
//! Answers "is this container structurally sound right now?" with the single
//! invariant that broke. Checks run in a fixed order and stop at the first
//! failure:
//!
//! | # | Check                              | Error                     |
//! |---|------------------------------------|---------------------------|
//! | 1 | container present                  | `NullContainer`           |
//! | 2 | leading container guard            | `LeadingContainerGuard`   |
//! | 3 | trailing container guard           | `TrailingContainerGuard`  |
//! | 4 | initialized flag                   | `NotInitialized`          |
//! | 5 | `size <= capacity`                 | `Overflow`                |
//! | 6 | `capacity >= FLOOR_CAPACITY`       | `CapacityBelowFloor`      |
//! | 7 | payload location present           | `NullPayload`             |
//! | 8 | guard slot locations present       | `NullLeadingGuard` / `NullTrailingGuard` |
//! | 9 | leading data guard value           | `LeadingDataGuard`        |
//! | 10| trailing data guard value          | `TrailingDataGuard`       |
//!
//! Verification has no side effects beyond trace/warn events.

use tracing::{trace, warn};

use crate::allocator::Reallocator;
use crate::error::{Result, StackError};
use crate::policy::FLOOR_CAPACITY;
use crate::stack::CanaryStack;

/// Verify `stack`; `None` models a null container.
pub fn verify<R: Reallocator>(stack: Option<&CanaryStack<R>>) -> Result<()> {
    let result = run_checks(stack);
    match &result {
        Ok(()) => trace!("verification passed"),
        Err(err) => warn!(code = err.code(), kind = err.name(), %err, "verification failed"),
    }
    result
}

fn run_checks<R: Reallocator>(stack: Option<&CanaryStack<R>>) -> Result<()> {
    let stack = stack.ok_or(StackError::NullContainer)?;

    check_container_guards(stack)?;

    if !stack.initialized {
        return Err(StackError::NotInitialized);
    }

    check_bounds(stack)?;
    check_locations(stack)?;
    check_data_guards(stack)
}

/// A zeroed, uninitialized container (no instance token, both guards zero)
/// has nothing to protect yet and skips these checks. A live stack never
/// does, even if its whole header has been wiped.
fn check_container_guards<R: Reallocator>(stack: &CanaryStack<R>) -> Result<()> {
    let zeroed = !stack.initialized
        && stack.instance.is_none()
        && stack.leading_canary == 0
        && stack.trailing_canary == 0;
    if zeroed {
        return Ok(());
    }

    let expected = stack.expected_container_guard();
    if stack.leading_canary != expected {
        return Err(StackError::LeadingContainerGuard {
            found: stack.leading_canary,
            expected,
        });
    }
    if stack.trailing_canary != expected {
        return Err(StackError::TrailingContainerGuard {
            found: stack.trailing_canary,
            expected,
        });
    }
    Ok(())
}

fn check_bounds<R: Reallocator>(stack: &CanaryStack<R>) -> Result<()> {
    let size = stack.size;
    let capacity = stack.storage.capacity();

    if size > capacity {
        return Err(StackError::Overflow { size, capacity });
    }
    if capacity < FLOOR_CAPACITY {
        return Err(StackError::CapacityBelowFloor {
            capacity,
            floor: FLOOR_CAPACITY,
        });
    }
    Ok(())
}

fn check_locations<R: Reallocator>(stack: &CanaryStack<R>) -> Result<()> {
    let storage = &stack.storage;

    if storage.payload_offset().is_none() {
        return Err(StackError::NullPayload);
    }
    if storage.leading_guard().is_none() {
        return Err(StackError::NullLeadingGuard);
    }
    if storage.trailing_guard().is_none() {
        return Err(StackError::NullTrailingGuard);
    }
    Ok(())
}

fn check_data_guards<R: Reallocator>(stack: &CanaryStack<R>) -> Result<()> {
    let storage = &stack.storage;
    let expected = storage.expected_guard();

    let leading = storage.leading_guard().ok_or(StackError::NullLeadingGuard)?;
    if leading != expected {
        return Err(StackError::LeadingDataGuard {
            found: leading,
            expected,
        });
    }

    let trailing = storage
        .trailing_guard()
        .ok_or(StackError::NullTrailingGuard)?;
    if trailing != expected {
        return Err(StackError::TrailingDataGuard {
            found: trailing,
            expected,
        });
    }
    Ok(())
}
