// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for execution lifecycle events.
//!
//! Each struct captures one loggable event with its context, and renders a
//! stable human-readable line through `Display`. Emitted via `tracing` at
//! the level noted on each type.

use std::fmt::{Display, Formatter};

/// An execution finished and its envelope is about to be returned.
///
/// # Log Level
/// `info!` - Important operational event
pub struct ExecutionFinished<'a> {
    pub runtime: &'a str,
    pub language: &'a str,
    pub success: bool,
    pub elapsed_ms: u64,
}

impl Display for ExecutionFinished<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Execution finished: runtime={} language={} success={} elapsed={}ms",
            self.runtime, self.language, self.success, self.elapsed_ms
        )
    }
}

/// Backend construction failed before any code ran.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct EngineCreationFailed<'a> {
    pub runtime: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for EngineCreationFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Failed to create {} engine: {}",
            self.runtime, self.error
        )
    }
}

/// A WASM module compiled successfully.
///
/// # Log Level
/// `debug!`
pub struct ModuleCompiled {
    pub size_bytes: usize,
}

impl Display for ModuleCompiled {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Compiled WASM module ({} bytes)", self.size_bytes)
    }
}

/// The entry point chosen for a WASM module.
///
/// # Log Level
/// `debug!`
pub struct EntryPointResolved<'a> {
    pub strategy: &'a str,
}

impl Display for EntryPointResolved<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Resolved WASM entry point: {}", self.strategy)
    }
}

/// A remote sandbox session was provisioned.
///
/// # Log Level
/// `info!`
pub struct SessionProvisioned<'a> {
    pub sandbox_id: &'a str,
}

impl Display for SessionProvisioned<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Provisioned remote sandbox session: {}", self.sandbox_id)
    }
}

/// A remote sandbox session was torn down.
///
/// # Log Level
/// `info!`
pub struct SessionTornDown<'a> {
    pub sandbox_id: &'a str,
}

impl Display for SessionTornDown<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Tore down remote sandbox session: {}", self.sandbox_id)
    }
}

/// The remote backend is running without a credential.
///
/// # Log Level
/// `warn!` - Degraded-but-available mode
pub struct DemoModeSelected;

impl Display for DemoModeSelected {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "No sandbox credential configured; simulating remote execution in demo mode"
        )
    }
}
