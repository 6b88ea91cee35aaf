// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! `CanaryStack`: the push/pop/peek surface over the guarded storage engine.
//!
//! Every operation verifies the container first, acts, and (in
//! [`VerifyMode::Strict`]) verifies again before returning, so corruption
//! introduced during the call itself is reported instead of a false success.
//!
//! # Container guards
//!
//! The struct is `#[repr(C)]` with a guard word as its first and last field.
//! Both hold `CONTAINER_GUARD_CONST + instance`, where `instance` is a token
//! issued on `initialize` (and on clone). A write that runs off the end of a
//! neighbouring object into this one hits a container guard before it reaches
//! `size` or the storage handle.
//!
//! A zeroed stack (fresh from [`CanaryStack::new`] or after `destroy`) has no
//! instance token and zero guards. It carries no identity to protect, so it
//! verifies as `NotInitialized` rather than as a dead guard.

use tracing::{debug, warn};

use crate::allocator::{Reallocator, SystemReallocator};
use crate::config::StackConfig;
use crate::error::{Result, StackError};
use crate::guard::{self, GuardWord, Token, CONTAINER_GUARD_CONST};
use crate::policy::FLOOR_CAPACITY;
use crate::storage::GuardedBuffer;
use crate::verify;
use crate::StackValue;

#[repr(C)]
#[derive(Debug)]
pub struct CanaryStack<R: Reallocator = SystemReallocator> {
    pub(crate) leading_canary: GuardWord,
    pub(crate) storage: GuardedBuffer,
    pub(crate) size: usize,
    pub(crate) instance: Token,
    pub(crate) initialized: bool,
    config: StackConfig,
    alloc: R,
    pub(crate) trailing_canary: GuardWord,
}

impl CanaryStack<SystemReallocator> {
    /// A zeroed, uninitialized stack on the system allocator.
    pub fn new() -> Self {
        Self::with_allocator(SystemReallocator)
    }

    pub fn with_config(config: StackConfig) -> Self {
        let mut stack = Self::new();
        stack.config = config;
        stack
    }
}

impl Default for CanaryStack<SystemReallocator> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Reallocator> CanaryStack<R> {
    pub fn with_allocator(alloc: R) -> Self {
        Self {
            leading_canary: 0,
            storage: GuardedBuffer::empty(),
            size: 0,
            instance: Token::NONE,
            initialized: false,
            config: StackConfig::default(),
            alloc,
            trailing_canary: 0,
        }
    }

    pub fn configured(mut self, config: StackConfig) -> Self {
        self.config = config;
        self
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Allocate the floor capacity, stamp every guard and mark initialized.
    pub fn initialize(&mut self) -> Result<()> {
        if self.initialized {
            return Err(StackError::AlreadyInitialized);
        }

        self.instance = Token::issue();
        self.stamp_container_guards();

        if let Err(err) = self.storage.allocate(FLOOR_CAPACITY, &self.alloc) {
            self.destroy_in_place();
            warn!(words = err.words, "initial allocation failed");
            return Err(StackError::AllocationFailed {
                requested: FLOOR_CAPACITY,
            });
        }

        self.size = 0;
        self.initialized = true;
        debug!(instance = self.instance.get(), "stack initialized");

        self.verify()
    }

    /// Release storage and zero every field, guards included.
    ///
    /// Idempotent: destroying a destroyed (or never initialized) stack is a
    /// no-op that succeeds.
    pub fn destroy(&mut self) -> Result<()> {
        if self.initialized {
            debug!(instance = self.instance.get(), "stack destroyed");
        }
        self.destroy_in_place();
        Ok(())
    }

    fn destroy_in_place(&mut self) {
        self.storage.release();
        self.size = 0;
        self.initialized = false;
        self.instance = Token::NONE;
        self.leading_canary = 0;
        self.trailing_canary = 0;
    }

    // ------------------------------------------------------------------
    // Operations
    // ------------------------------------------------------------------

    pub fn push(&mut self, value: StackValue) -> Result<()> {
        self.verify()?;

        let size = self.size;
        if let Err(err) = self.storage.grow_if_full(size, &self.alloc) {
            self.destroy_in_place();
            warn!(size, words = err.words, "growth failed, stack destroyed");
            return Err(StackError::AllocationFailed {
                requested: size.saturating_mul(2),
            });
        }

        crate::canary_assert!(self.size < self.storage.capacity());
        if !self.storage.set_slot(size, value) {
            return Err(StackError::NullPayload);
        }
        self.size += 1;

        self.verify_on_exit()
    }

    pub fn pop(&mut self) -> Result<StackValue> {
        self.verify()?;

        if self.size == 0 {
            return Err(StackError::Underflow);
        }

        let top = self.size - 1;
        let value = self.storage.slot(top).ok_or(StackError::NullPayload)?;
        self.storage.clear_slot(top);
        self.size = top;

        if let Err(err) = self.storage.shrink_if_sparse(self.size, &self.alloc) {
            let requested = self.size.max(FLOOR_CAPACITY);
            self.destroy_in_place();
            warn!(requested, words = err.words, "shrink failed, stack destroyed");
            return Err(StackError::ShrinkFailed { requested });
        }

        self.verify_on_exit()?;
        Ok(value)
    }

    pub fn peek(&self) -> Result<StackValue> {
        self.verify()?;

        if self.size == 0 {
            return Err(StackError::Underflow);
        }
        let value = self
            .storage
            .slot(self.size - 1)
            .ok_or(StackError::NullPayload)?;

        self.verify_on_exit()?;
        Ok(value)
    }

    /// Run the full verification protocol.
    pub fn verify(&self) -> Result<()> {
        verify::verify(Some(self))
    }

    fn verify_on_exit(&self) -> Result<()> {
        if self.config.verify_mode.verifies_on_exit() {
            self.verify()
        } else {
            Ok(())
        }
    }

    // ------------------------------------------------------------------
    // Inspection
    // ------------------------------------------------------------------

    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    pub fn capacity(&self) -> usize {
        self.storage.capacity()
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn config(&self) -> StackConfig {
        self.config
    }

    pub fn allocator(&self) -> &R {
        &self.alloc
    }

    /// Token the container guards are keyed on.
    pub fn instance(&self) -> Token {
        self.instance
    }

    /// Token the data guards are keyed on.
    pub fn region(&self) -> Token {
        self.storage.region()
    }

    pub fn leading_canary(&self) -> GuardWord {
        self.leading_canary
    }

    pub fn trailing_canary(&self) -> GuardWord {
        self.trailing_canary
    }

    pub fn expected_container_guard(&self) -> GuardWord {
        guard::expected(CONTAINER_GUARD_CONST, self.instance)
    }

    pub fn storage(&self) -> &GuardedBuffer {
        &self.storage
    }

    /// Logically valid elements, bottom first.
    pub fn values(&self) -> Vec<StackValue> {
        (0..self.size).filter_map(|i| self.storage.slot(i)).collect()
    }

    fn stamp_container_guards(&mut self) {
        let value = self.expected_container_guard();
        self.leading_canary = value;
        self.trailing_canary = value;
    }
}

impl<R: Reallocator + Clone> Clone for CanaryStack<R> {
    /// Deep copy with a fresh instance token, a fresh storage region and
    /// freshly stamped guards. A zeroed stack clones to a zeroed stack.
    fn clone(&self) -> Self {
        let mut copy = Self {
            leading_canary: self.leading_canary,
            storage: self.storage.clone(),
            size: self.size,
            instance: self.instance,
            initialized: self.initialized,
            config: self.config,
            alloc: self.alloc.clone(),
            trailing_canary: self.trailing_canary,
        };
        if !copy.instance.is_none() {
            copy.instance = Token::issue();
            copy.stamp_container_guards();
        }
        copy
    }
}
