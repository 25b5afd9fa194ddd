// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Capability traits implemented by every execution backend.
//!
//! Three unrelated execution models (embedded interpreter, native module
//! execution, remote RPC sandbox) sit behind the same `{execute, dispose}`
//! surface. Coordinators never construct a backend directly; they receive an
//! [`EngineFactory`] at construction time, which keeps every backend
//! substitutable with a deterministic test double.
//!
//! Engine futures are declared `?Send`: interpreter contexts are
//! thread-bound, and each request runs synchronous-sequentially on a single
//! thread, so nothing ever crosses threads mid-execution.

use async_trait::async_trait;

use crate::errors::EngineError;
use crate::protocol::{ExecutionRequest, ExecutionResult};

/// One isolated execution context, alive for exactly one request.
///
/// An engine owns its underlying resources (interpreter VM, compiled module
/// instance, or remote session handle) and is never reused across requests.
/// The coordinator that created it is solely responsible for calling
/// [`Engine::dispose`], which it does on every exit path.
#[async_trait(?Send)]
pub trait Engine {
    /// Run the request once. Domain failures (syntax errors, traps,
    /// structured sandbox errors) are reported inside the `Ok` envelope;
    /// `Err` is reserved for failures the backend could not classify.
    async fn execute(&mut self, request: &ExecutionRequest) -> Result<ExecutionResult, EngineError>;

    /// Release the engine's resources. Called exactly once per instance by
    /// the owning coordinator; implementations must tolerate the call on
    /// failure paths.
    fn dispose(&mut self);

    /// Label identifying this backend in result envelopes and logs.
    fn runtime_label(&self) -> &'static str;
}

/// Constructor-injected backend factory.
///
/// Creation may involve I/O (interpreter startup, remote provisioning) and
/// may fail; the coordinator converts such failures into the normalized
/// envelope without invoking the engine.
#[async_trait(?Send)]
pub trait EngineFactory: Send + Sync {
    async fn create(&self) -> Result<Box<dyn Engine>, EngineError>;
}
