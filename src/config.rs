// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Stack and demo-scenario configuration.
//!
//! Both types deserialize from JSON with every field optional, so an empty
//! object `{}` yields the defaults.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::StackValue;

/// When operations re-run verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VerifyMode {
    /// Verify on entry and again before returning.
    #[default]
    Strict,
    /// Verify on entry only.
    EntryOnly,
}

impl VerifyMode {
    pub fn verifies_on_exit(self) -> bool {
        matches!(self, VerifyMode::Strict)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StackConfig {
    pub verify_mode: VerifyMode,
}

impl StackConfig {
    pub fn strict() -> Self {
        Self {
            verify_mode: VerifyMode::Strict,
        }
    }

    pub fn entry_only() -> Self {
        Self {
            verify_mode: VerifyMode::EntryOnly,
        }
    }
}

/// Script for the demo driver.
///
/// The defaults reproduce the classic sequence: push 8.5 and 9.5, peek, pop
/// twice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DemoScenario {
    pub pushes: Vec<StackValue>,
    pub pops: usize,
    pub peek: bool,
    pub self_test: bool,
    pub stack: StackConfig,
}

impl Default for DemoScenario {
    fn default() -> Self {
        Self {
            pushes: vec![8.5, 9.5],
            pops: 2,
            peek: true,
            self_test: false,
            stack: StackConfig::default(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read scenario {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid scenario {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl DemoScenario {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}
