// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Native-binary backend: sandboxed WebAssembly execution.
//!
//! This backend only ever executes compiled binary modules. Text input is
//! classified first: WAT source is rejected with precompilation guidance,
//! and any other source text is redirected toward the interpreted backend.
//! Accepted binaries run against a fixed stub host-import surface with a
//! fuel-metered engine, and an entry point resolved in a fixed priority
//! order (explicit name → `_start` → `main` → export listing).

mod detector;
mod engine;
mod error;

pub use engine::{WasmEngine, WasmEngineFactory, RUNTIME_LABEL};
pub use error::{WasmError, WasmResult};
