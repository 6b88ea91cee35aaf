// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! The low-level allocator the storage engine resizes through.
//!
//! `recalloc` semantics: hand back a block of exactly `new_len` words whose
//! prefix `[0, min(old, new))` is copied from the old block and whose tail is
//! zeroed. The old block is always released, on success and on failure.
//! Asking for zero words releases the block and returns an empty one.

use thiserror::Error;

use crate::guard::GuardWord;

/// The underlying allocation could not be satisfied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("cannot reserve {words} words")]
pub struct AllocError {
    pub words: usize,
}

/// Resize-with-copy allocator consumed by the storage engine.
pub trait Reallocator {
    fn recalloc(&self, block: Vec<GuardWord>, new_len: usize)
        -> Result<Vec<GuardWord>, AllocError>;
}

/// Heap allocator backed by `Vec::try_reserve_exact`.
///
/// Always moves to a fresh block, so a reallocation never keeps the old
/// region's identity.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemReallocator;

impl Reallocator for SystemReallocator {
    fn recalloc(
        &self,
        block: Vec<GuardWord>,
        new_len: usize,
    ) -> Result<Vec<GuardWord>, AllocError> {
        if new_len == 0 {
            return Ok(Vec::new());
        }

        let mut fresh = Vec::new();
        fresh
            .try_reserve_exact(new_len)
            .map_err(|_| AllocError { words: new_len })?;

        let keep = block.len().min(new_len);
        fresh.extend_from_slice(&block[..keep]);
        fresh.resize(new_len, 0);
        Ok(fresh)
    }
}

impl<R: Reallocator + ?Sized> Reallocator for &R {
    fn recalloc(
        &self,
        block: Vec<GuardWord>,
        new_len: usize,
    ) -> Result<Vec<GuardWord>, AllocError> {
        (**self).recalloc(block, new_len)
    }
}
