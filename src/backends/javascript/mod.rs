// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Interpreted-language backend: per-request embedded JavaScript engine.
//!
//! Each request gets a fresh interpreter context. Before user code runs, a
//! `console` object with host-backed `log` and `error` functions replaces
//! the language's standard output surface; each call appends its stringified
//! arguments, space-joined, to one of two captured line buffers. After
//! evaluation the buffers are read once and discarded with the engine.
//!
//! Evaluation failures are reported inside the result envelope, never as
//! transport-level failures.

mod engine;

pub use engine::{BoaEngineFactory, JsEngine, RUNTIME_LABEL};
