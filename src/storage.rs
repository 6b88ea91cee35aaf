// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! The storage engine: one owned block with guards packed around the payload.
//!
//! # Layout
//!
//! ```text
//!  word 0            words 1..=capacity                word capacity + 1
//! ┌───────────────┬──────────────────────────────────┬────────────────┐
//! │ leading guard │ slot 0 │ slot 1 │ ... │ slot C-1 │ trailing guard │
//! └───────────────┴──────────────────────────────────┴────────────────┘
//!   DATA_GUARD_CONST + region        f64 bits          DATA_GUARD_CONST + region
//! ```
//!
//! The guards live in the same allocation as the payload, so an off-by-one
//! write to `data[capacity]` lands on the trailing guard and a write to
//! `data[-1]` lands on the leading one.
//!
//! Payload and guard locations are word offsets into the block. `None` is the
//! null location: a released buffer has no payload and no guard slots. All
//! accesses go through bounds-checked lookups; no sub-range of the block is
//! handed out.
//!
//! Every reallocation draws a new region token, so the expected guard value
//! changes with the block and the guards are re-stamped immediately.

use tracing::debug;

use crate::allocator::{AllocError, Reallocator};
use crate::guard::{self, GuardWord, Token, DATA_GUARD_CONST, GUARD_WIDTH};
use crate::policy::{self, FLOOR_CAPACITY};
use crate::StackValue;

#[derive(Debug, Default)]
pub struct GuardedBuffer {
    words: Vec<GuardWord>,
    pub(crate) capacity: usize,
    pub(crate) region: Token,
    pub(crate) payload: Option<usize>,
    pub(crate) leading: Option<usize>,
    pub(crate) trailing: Option<usize>,
}

impl GuardedBuffer {
    /// A buffer with no storage (the null state).
    pub const fn empty() -> Self {
        Self {
            words: Vec::new(),
            capacity: 0,
            region: Token::NONE,
            payload: None,
            leading: None,
            trailing: None,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn region(&self) -> Token {
        self.region
    }

    /// True when no payload is attached.
    pub fn is_null(&self) -> bool {
        self.payload.is_none()
    }

    pub fn payload_offset(&self) -> Option<usize> {
        self.payload
    }

    /// Guard value this buffer should carry in both guard slots.
    pub fn expected_guard(&self) -> GuardWord {
        guard::expected(DATA_GUARD_CONST, self.region)
    }

    /// Stored leading guard, or `None` if the slot is null or out of range.
    pub fn leading_guard(&self) -> Option<GuardWord> {
        self.leading.and_then(|at| self.words.get(at).copied())
    }

    /// Stored trailing guard, or `None` if the slot is null or out of range.
    pub fn trailing_guard(&self) -> Option<GuardWord> {
        self.trailing.and_then(|at| self.words.get(at).copied())
    }

    /// Resize to `max(requested, FLOOR_CAPACITY)` slots, keeping the payload
    /// prefix that fits, and re-stamp the guards.
    ///
    /// On failure the buffer is released: nothing half-updated survives.
    pub fn allocate<R: Reallocator>(
        &mut self,
        requested: usize,
        alloc: &R,
    ) -> Result<usize, AllocError> {
        let capacity = policy::effective_capacity(requested);
        let Some(total) = capacity.checked_add(2) else {
            self.release();
            return Err(AllocError { words: usize::MAX });
        };

        let old_capacity = if self.is_null() { 0 } else { self.capacity };
        let block = std::mem::take(&mut self.words);

        match alloc.recalloc(block, total) {
            Ok(words) => self.words = words,
            Err(err) => {
                self.release();
                return Err(err);
            }
        }

        // The old trailing guard slot is a payload slot now.
        if old_capacity > 0 && old_capacity < capacity {
            self.words[old_capacity + 1] = 0;
        }

        self.capacity = capacity;
        self.region = Token::issue();
        self.leading = Some(0);
        self.payload = Some(1);
        self.trailing = Some(capacity + 1);
        self.stamp_guards();

        debug!(
            from = old_capacity,
            to = capacity,
            region = self.region.get(),
            "storage allocated"
        );
        crate::canary_assert!(self.capacity >= FLOOR_CAPACITY);
        Ok(capacity)
    }

    /// Double the capacity if `size` slots already fill it.
    ///
    /// Returns the new capacity when a reallocation happened.
    pub fn grow_if_full<R: Reallocator>(
        &mut self,
        size: usize,
        alloc: &R,
    ) -> Result<Option<usize>, AllocError> {
        if !policy::needs_growth(size, self.capacity) {
            return Ok(None);
        }
        let Some(target) = policy::grown_capacity(self.capacity) else {
            self.release();
            return Err(AllocError { words: usize::MAX });
        };
        debug!(size, capacity = self.capacity, target, "growing storage");
        self.allocate(target, alloc).map(Some)
    }

    /// Shrink to `max(size, FLOOR_CAPACITY)` once `size <= capacity / 4`.
    ///
    /// Returns the new capacity when a reallocation happened.
    pub fn shrink_if_sparse<R: Reallocator>(
        &mut self,
        size: usize,
        alloc: &R,
    ) -> Result<Option<usize>, AllocError> {
        let Some(target) = policy::shrink_target(size, self.capacity) else {
            return Ok(None);
        };
        debug!(size, capacity = self.capacity, target, "shrinking storage");
        self.allocate(target, alloc).map(Some)
    }

    /// Write `DATA_GUARD_CONST + region` into both guard slots.
    pub fn stamp_guards(&mut self) {
        let value = self.expected_guard();
        for at in [self.leading, self.trailing].into_iter().flatten() {
            if let Some(word) = self.words.get_mut(at) {
                *word = value;
            }
        }
    }

    /// Wipe and free the block, returning every field to the null state.
    pub fn release(&mut self) {
        self.words.fill(0);
        *self = Self::empty();
    }

    /// Payload slot `index`, if it exists.
    pub fn slot(&self, index: usize) -> Option<StackValue> {
        self.slot_word(index).map(StackValue::from_bits)
    }

    pub fn set_slot(&mut self, index: usize, value: StackValue) -> bool {
        match self.slot_word_mut(index) {
            Some(word) => {
                *word = value.to_bits();
                true
            }
            None => false,
        }
    }

    /// Zero slot `index` (the type's zero value).
    pub fn clear_slot(&mut self, index: usize) -> bool {
        self.set_slot(index, 0.0)
    }

    /// Every allocated slot in order, `None` where the block is too short.
    pub fn slots(&self) -> impl Iterator<Item = Option<StackValue>> + '_ {
        (0..self.capacity).map(move |i| self.slot(i))
    }

    /// Copy of the whole block in memory byte order.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.words.iter().flat_map(|w| w.to_ne_bytes()).collect()
    }

    /// Size of the block in bytes.
    pub fn byte_len(&self) -> usize {
        self.words.len() * GUARD_WIDTH
    }

    /// Mutable view of the raw block, guards included.
    ///
    /// Only the self-test harness and the corruption helpers in `testing` use
    /// this. It bypasses every layout rule above.
    pub(crate) fn words_mut(&mut self) -> &mut [GuardWord] {
        &mut self.words
    }

    fn slot_word(&self, index: usize) -> Option<GuardWord> {
        if index >= self.capacity {
            return None;
        }
        let base = self.payload?;
        self.words.get(base + index).copied()
    }

    fn slot_word_mut(&mut self, index: usize) -> Option<&mut GuardWord> {
        if index >= self.capacity {
            return None;
        }
        let base = self.payload?;
        self.words.get_mut(base + index)
    }
}

impl Clone for GuardedBuffer {
    /// Copies the block into a new region with its own token and guards.
    fn clone(&self) -> Self {
        let mut copy = Self {
            words: self.words.clone(),
            capacity: self.capacity,
            region: self.region,
            payload: self.payload,
            leading: self.leading,
            trailing: self.trailing,
        };
        if !copy.is_null() {
            copy.region = Token::issue();
            copy.stamp_guards();
        }
        copy
    }
}
