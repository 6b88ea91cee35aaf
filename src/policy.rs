// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Capacity policy: doubling growth, quarter-watermark shrink.
//!
//! Pure arithmetic with no allocation, so the same functions are checked by
//! the Kani proofs in `kani-proofs/` and used by the storage engine.
//!
//! The hysteresis gap (grow at 100%, shrink at 25%) means a push/pop pair at
//! a boundary never reallocates twice.

/// Smallest capacity an initialized stack ever holds.
pub const FLOOR_CAPACITY: usize = 4;

/// `max(requested, FLOOR_CAPACITY)`.
#[inline]
pub fn effective_capacity(requested: usize) -> usize {
    requested.max(FLOOR_CAPACITY)
}

/// Capacity after growth, or `None` if doubling overflows `usize`.
#[inline]
pub fn grown_capacity(capacity: usize) -> Option<usize> {
    effective_capacity(capacity).checked_mul(2)
}

/// True when one more element does not fit.
#[inline]
pub fn needs_growth(size: usize, capacity: usize) -> bool {
    size >= capacity
}

/// Capacity to shrink to after a removal, or `None` to keep the current one.
///
/// Triggers at `size <= capacity / 4` and only when the target is strictly
/// smaller than the current capacity.
#[inline]
pub fn shrink_target(size: usize, capacity: usize) -> Option<usize> {
    if size > capacity / 4 {
        return None;
    }
    let target = effective_capacity(size);
    (target < capacity).then_some(target)
}

/// Capacity reached from the floor by repeated doubling until `n` fits.
pub fn capacity_for(n: usize) -> usize {
    let mut capacity = FLOOR_CAPACITY;
    while capacity < n {
        capacity *= 2;
    }
    capacity
}
