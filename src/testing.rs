//! Test utilities shared across unit and integration tests.
//!
//! This module is always compiled but hidden from documentation.
//! It provides an allocator with injectable failures and corruption helpers
//! that reach under the storage engine's layout rules on purpose.

#![doc(hidden)]

use std::cell::Cell;
use std::rc::Rc;

use crate::allocator::{AllocError, Reallocator, SystemReallocator};
use crate::guard::{GuardWord, GUARD_WIDTH};
use crate::stack::CanaryStack;
use crate::StackValue;

/// Allocator that succeeds `successes` times, then fails every call.
///
/// Clones share the countdown.
#[derive(Debug, Clone)]
pub struct FailingReallocator {
    remaining: Rc<Cell<usize>>,
    calls: Rc<Cell<usize>>,
}

impl FailingReallocator {
    pub fn after(successes: usize) -> Self {
        Self {
            remaining: Rc::new(Cell::new(successes)),
            calls: Rc::new(Cell::new(0)),
        }
    }

    /// Total recalloc calls seen, failed ones included.
    pub fn calls(&self) -> usize {
        self.calls.get()
    }
}

impl Reallocator for FailingReallocator {
    fn recalloc(
        &self,
        block: Vec<GuardWord>,
        new_len: usize,
    ) -> Result<Vec<GuardWord>, AllocError> {
        self.calls.set(self.calls.get() + 1);
        match self.remaining.get() {
            0 => Err(AllocError { words: new_len }),
            n => {
                self.remaining.set(n - 1);
                SystemReallocator.recalloc(block, new_len)
            }
        }
    }
}

/// Initialized stack holding `values`, bottom first.
pub fn stack_of(values: &[StackValue]) -> CanaryStack {
    let mut stack = CanaryStack::new();
    stack.initialize().expect("initialize");
    for &v in values {
        stack.push(v).expect("push");
    }
    stack
}

/// Overwrite one byte of the backing block, addressed relative to the start
/// of the payload. Offsets `capacity * 8 ..` land on the trailing guard;
/// negative offsets land on the leading guard.
///
/// Returns false if the byte lies outside the block.
pub fn poke_payload_byte<R: Reallocator>(
    stack: &mut CanaryStack<R>,
    offset: isize,
    value: u8,
) -> bool {
    let Some(payload) = stack.storage.payload else {
        return false;
    };
    let absolute = payload as isize * GUARD_WIDTH as isize + offset;
    if absolute < 0 {
        return false;
    }
    let absolute = absolute as usize;
    let (word, byte) = (absolute / GUARD_WIDTH, absolute % GUARD_WIDTH);

    match stack.storage.words_mut().get_mut(word) {
        Some(slot) => {
            let mut bytes = slot.to_ne_bytes();
            bytes[byte] = value;
            *slot = GuardWord::from_ne_bytes(bytes);
            true
        }
        None => false,
    }
}

/// Overwrite the stored size without touching anything else.
pub fn force_size<R: Reallocator>(stack: &mut CanaryStack<R>, size: usize) {
    stack.size = size;
}

/// Overwrite the leading container guard.
pub fn smash_leading_canary<R: Reallocator>(stack: &mut CanaryStack<R>, value: GuardWord) {
    stack.leading_canary = value;
}

/// Overwrite the trailing container guard.
pub fn smash_trailing_canary<R: Reallocator>(stack: &mut CanaryStack<R>, value: GuardWord) {
    stack.trailing_canary = value;
}
