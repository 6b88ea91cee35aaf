//! A growable `f64` stack instrumented with canaries.
//!
//! Guard words sit immediately before and after the payload buffer (inside the
//! same allocation) and around the container itself. Every operation runs the
//! verification protocol before acting, so an overrun, an underrun or a stray
//! write into the control fields is reported as the specific guard that died,
//! at the next operation after it happened.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌──────────────┐     ┌──────────────┐
//! │  policy.rs  │────▶│  storage.rs  │────▶│   stack.rs   │
//! │ (grow/shrink│     │(GuardedBuffer│     │ (CanaryStack │
//! │  arithmetic)│     │ guards+slots)│     │ push/pop/peek│
//! └─────────────┘     └──────────────┘     └──────────────┘
//!        ▲                   │                    │
//!  allocator.rs         guard.rs                  ▼
//! (Reallocator)     (const + token)    ┌─────────────────────┐
//!                                      │      verify.rs      │
//!                                      │ (ordered checks,    │
//!                                      │  first failure wins)│
//!                                      └─────────────────────┘
//!                                         │              │
//!                                         ▼              ▼
//!                                     dump.rs       selftest.rs
//! ```
//!
//! # Usage
//!
//! ```
//! use canary_stack::{CanaryStack, StackError};
//!
//! let mut stk = CanaryStack::new();
//! stk.initialize().unwrap();
//! stk.push(8.5).unwrap();
//! stk.push(9.5).unwrap();
//!
//! assert_eq!(stk.peek(), Ok(9.5));
//! assert_eq!(stk.pop(), Ok(9.5));
//! assert_eq!(stk.pop(), Ok(8.5));
//! assert_eq!(stk.pop(), Err(StackError::Underflow));
//!
//! stk.destroy().unwrap();
//! ```

// Module declarations
pub mod allocator;
pub mod config;
pub mod contracts;
pub mod dump;
pub mod error;
pub mod guard;
pub mod policy;
pub mod selftest;
mod stack;
pub mod storage;
pub mod testing;
mod verify;

/// The one element type the stack holds.
pub type StackValue = f64;

// Re-exports for public API
pub use allocator::{AllocError, Reallocator, SystemReallocator};
pub use config::{ConfigError, DemoScenario, StackConfig, VerifyMode};
pub use dump::{dump, DumpSite};
pub use error::{ErrorClass, Result, StackError};
pub use guard::{GuardWord, Token, CONTAINER_GUARD_CONST, DATA_GUARD_CONST, GUARD_WIDTH};
pub use policy::FLOOR_CAPACITY;
pub use selftest::{run_all, self_test, CanaryTarget, SelfTestReport};
pub use stack::CanaryStack;
pub use storage::GuardedBuffer;
pub use verify::verify;
