// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Session abstraction for the remote backend.
//!
//! The engine only ever talks to these traits; the HTTP implementation and
//! the test stand-ins are interchangeable behind them.

use async_trait::async_trait;
use serde::Deserialize;

use crate::errors::EngineError;

/// Structured error reported by the remote runtime for a failed execution.
#[derive(Debug, Deserialize)]
pub struct SandboxError {
    /// Error class name, e.g. `NameError`.
    pub name: String,
}

/// Raw outcome of one code submission inside a sandbox.
///
/// All fields default so partial provider responses deserialize cleanly.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SandboxExecution {
    pub stdout: Vec<String>,
    pub stderr: Vec<String>,
    pub error: Option<SandboxError>,
    pub results: Vec<serde_json::Value>,
}

/// A live sandbox able to run code until killed.
#[async_trait]
pub trait SandboxSession: Send + Sync {
    /// Submit code and wait for the execution outcome.
    async fn run_code(&self, code: &str) -> Result<SandboxExecution, EngineError>;

    /// Tear the sandbox down. Infallible by contract; implementations log
    /// teardown failures rather than surfacing them.
    async fn kill(&self);
}

/// Provisions fresh sandbox sessions.
#[async_trait]
pub trait SessionFactory: Send + Sync {
    async fn create(&self) -> Result<Box<dyn SandboxSession>, EngineError>;
}
