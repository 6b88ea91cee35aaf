// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Error taxonomy for stack operations.
//!
//! Every failure is a distinct, reportable kind. Nothing here is used for
//! control flow inside the crate: helpers return the error to their caller and
//! the caller decides. The numeric codes are stable and match the classic
//! return-code table, so a demo driver (or a log line) can print either the
//! symbolic or the numeric form.
//!
//! | Code | Variant                   | Class       |
//! |------|---------------------------|-------------|
//! | 1    | `AlreadyInitialized`      | Lifecycle   |
//! | 2    | `NotInitialized`          | Lifecycle   |
//! | 3    | `AllocationFailed`        | Resource    |
//! | 4    | `ShrinkFailed`            | Resource    |
//! | 5    | `Underflow`               | Bounds      |
//! | 6    | `Overflow`                | Bounds      |
//! | 7    | `CapacityBelowFloor`      | Bounds      |
//! | 8    | `NullContainer`           | NullPointer |
//! | 9    | `NullPayload`             | NullPointer |
//! | 10   | `LeadingContainerGuard`   | Corruption  |
//! | 11   | `TrailingContainerGuard`  | Corruption  |
//! | 12   | `LeadingDataGuard`        | Corruption  |
//! | 13   | `TrailingDataGuard`       | Corruption  |
//! | 14   | `NullLeadingGuard`        | NullPointer |
//! | 15   | `NullTrailingGuard`       | NullPointer |
//! | 16   | `TestFailed`              | Test        |

use thiserror::Error;

/// Broad category of a [`StackError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorClass {
    Lifecycle,
    Resource,
    Bounds,
    NullPointer,
    Corruption,
    Test,
}

/// Everything a stack operation can report.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StackError {
    #[error("stack is already initialized")]
    AlreadyInitialized,
    #[error("stack is not initialized")]
    NotInitialized,

    #[error("cannot allocate storage for {requested} slots")]
    AllocationFailed { requested: usize },
    #[error("cannot shrink storage to {requested} slots")]
    ShrinkFailed { requested: usize },

    #[error("stack underflow: no elements to read")]
    Underflow,
    #[error("stack overflow: size {size} exceeds capacity {capacity}")]
    Overflow { size: usize, capacity: usize },
    #[error("capacity {capacity} is below the floor of {floor}")]
    CapacityBelowFloor { capacity: usize, floor: usize },

    #[error("container is null")]
    NullContainer,
    #[error("payload pointer is null")]
    NullPayload,

    #[error("leading container guard is dead: found {found:#018x}, expected {expected:#018x}")]
    LeadingContainerGuard { found: u64, expected: u64 },
    #[error("trailing container guard is dead: found {found:#018x}, expected {expected:#018x}")]
    TrailingContainerGuard { found: u64, expected: u64 },
    #[error("leading data guard is dead: found {found:#018x}, expected {expected:#018x}")]
    LeadingDataGuard { found: u64, expected: u64 },
    #[error("trailing data guard is dead: found {found:#018x}, expected {expected:#018x}")]
    TrailingDataGuard { found: u64, expected: u64 },

    #[error("leading data guard slot is null")]
    NullLeadingGuard,
    #[error("trailing data guard slot is null")]
    NullTrailingGuard,

    #[error("self-test did not detect corruption of the {target} within {budget} bytes (last verify: {last})")]
    TestFailed {
        target: &'static str,
        budget: usize,
        last: String,
    },
}

impl StackError {
    /// Stable numeric classification.
    pub fn code(&self) -> u8 {
        match self {
            StackError::AlreadyInitialized => 1,
            StackError::NotInitialized => 2,
            StackError::AllocationFailed { .. } => 3,
            StackError::ShrinkFailed { .. } => 4,
            StackError::Underflow => 5,
            StackError::Overflow { .. } => 6,
            StackError::CapacityBelowFloor { .. } => 7,
            StackError::NullContainer => 8,
            StackError::NullPayload => 9,
            StackError::LeadingContainerGuard { .. } => 10,
            StackError::TrailingContainerGuard { .. } => 11,
            StackError::LeadingDataGuard { .. } => 12,
            StackError::TrailingDataGuard { .. } => 13,
            StackError::NullLeadingGuard => 14,
            StackError::NullTrailingGuard => 15,
            StackError::TestFailed { .. } => 16,
        }
    }

    /// Symbolic name, independent of the payload.
    pub fn name(&self) -> &'static str {
        match self {
            StackError::AlreadyInitialized => "ALREADY_INITIALIZED",
            StackError::NotInitialized => "NOT_INITIALIZED",
            StackError::AllocationFailed { .. } => "ALLOCATION_FAILED",
            StackError::ShrinkFailed { .. } => "SHRINK_FAILED",
            StackError::Underflow => "UNDERFLOW",
            StackError::Overflow { .. } => "OVERFLOW",
            StackError::CapacityBelowFloor { .. } => "CAPACITY_BELOW_FLOOR",
            StackError::NullContainer => "NULL_CONTAINER",
            StackError::NullPayload => "NULL_PAYLOAD",
            StackError::LeadingContainerGuard { .. } => "DEAD_LEADING_CONTAINER_GUARD",
            StackError::TrailingContainerGuard { .. } => "DEAD_TRAILING_CONTAINER_GUARD",
            StackError::LeadingDataGuard { .. } => "DEAD_LEADING_DATA_GUARD",
            StackError::TrailingDataGuard { .. } => "DEAD_TRAILING_DATA_GUARD",
            StackError::NullLeadingGuard => "NULL_LEADING_GUARD",
            StackError::NullTrailingGuard => "NULL_TRAILING_GUARD",
            StackError::TestFailed { .. } => "TEST_FAILED",
        }
    }

    pub fn class(&self) -> ErrorClass {
        match self {
            StackError::AlreadyInitialized | StackError::NotInitialized => ErrorClass::Lifecycle,
            StackError::AllocationFailed { .. } | StackError::ShrinkFailed { .. } => {
                ErrorClass::Resource
            }
            StackError::Underflow
            | StackError::Overflow { .. }
            | StackError::CapacityBelowFloor { .. } => ErrorClass::Bounds,
            StackError::NullContainer
            | StackError::NullPayload
            | StackError::NullLeadingGuard
            | StackError::NullTrailingGuard => ErrorClass::NullPointer,
            StackError::LeadingContainerGuard { .. }
            | StackError::TrailingContainerGuard { .. }
            | StackError::LeadingDataGuard { .. }
            | StackError::TrailingDataGuard { .. } => ErrorClass::Corruption,
            StackError::TestFailed { .. } => ErrorClass::Test,
        }
    }

    /// True for the guard-mismatch kinds.
    pub fn is_corruption(&self) -> bool {
        self.class() == ErrorClass::Corruption
    }
}

pub type Result<T> = std::result::Result<T, StackError>;
