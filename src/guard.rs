// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Guard-word arithmetic.
//!
//! A guard word is `constant + identity`, where the identity is a token that
//! names the protected region. Tokens come from a process-wide monotonic
//! counter, so two regions never share an expected value, and a corrupting
//! write that happens to store the bare constant is still caught.
//!
//! Data guards are keyed by the *region* token (fresh on every reallocation).
//! Container guards are keyed by the *instance* token (fresh on every
//! `initialize` and every clone).

use std::sync::atomic::{AtomicU64, Ordering};

/// Guard word type. One guard is exactly one word wide.
pub type GuardWord = u64;

/// Width of one guard word in bytes.
pub const GUARD_WIDTH: usize = std::mem::size_of::<GuardWord>();

/// Base constant for the two guards around the payload buffer.
pub const DATA_GUARD_CONST: GuardWord = 0xDEAD_BEEF_CAFE_BABE;

/// Base constant for the two guards around the container itself.
pub const CONTAINER_GUARD_CONST: GuardWord = 0xBAAD_F00D_FEED_FACE;

/// Identity token of a protected region. Zero is never issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Token(u64);

static NEXT_TOKEN: AtomicU64 = AtomicU64::new(1);

impl Token {
    /// The "no region" token carried by destroyed or never-initialized state.
    pub const NONE: Token = Token(0);

    /// Issue a token that has never been handed out before in this process.
    pub fn issue() -> Token {
        Token(NEXT_TOKEN.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(self) -> u64 {
        self.0
    }

    pub fn is_none(self) -> bool {
        self.0 == 0
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Expected value of a guard word protecting `token` with base `constant`.
#[inline]
pub fn expected(constant: GuardWord, token: Token) -> GuardWord {
    constant.wrapping_add(token.0)
}

/// Distance of a stored guard from its base constant. For a live guard this
/// equals the token.
#[inline]
pub fn delta(constant: GuardWord, found: GuardWord) -> GuardWord {
    found.wrapping_sub(constant)
}
