// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Execution backend implementations.
//!
//! Each backend implements the [`crate::traits::Engine`] capability surface
//! and is constructed through a dependency-injected factory. Three execution
//! strategies are provided:
//!
//! ## JavaScript Backend
//! In-process interpreted execution with a per-request embedded engine:
//! - **Captured console**: `console.log`/`console.error` substituted before
//!   evaluation
//! - **Strict-mode evaluation** with a stable source label for diagnostics
//! - **Use Case**: untrusted snippets, expression evaluation
//!
//! ## WASM Backend
//! Sandboxed native-binary execution:
//! - **Binary-only policy**: WAT and source text are rejected with hints
//! - **Stub host imports**: numeric print plus no-op WASI preview1 surface
//! - **Prioritized entry-point resolution**: explicit → `_start` → `main` →
//!   export listing
//! - **Use Case**: precompiled modules, whole-program or single-function runs
//!
//! ## Remote Backend
//! Ephemeral cloud sandbox execution:
//! - **Session-per-request** with unconditional teardown
//! - **Demo mode** when no provisioning credential is configured
//! - **Use Case**: languages without an in-process runtime (Python)
//!
//! # Architecture
//!
//! All backends follow a consistent factory pattern:
//! ```text
//! Configuration → EngineFactory → Engine instance → Executor
//! ```

pub mod javascript;
pub mod remote;
pub mod wasm;
