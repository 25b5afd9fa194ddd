// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Remote-sandbox backend: ephemeral cloud execution sessions.
//!
//! A session factory is supplied via dependency injection, never hard-wired,
//! so tests substitute a deterministic stand-in. When no provisioning
//! credential is configured the backend skips provisioning entirely and
//! returns a clearly labeled simulated result (demo mode) - a deliberate
//! degraded-but-available mode, not an error.
//!
//! Session teardown is unconditional: `kill` runs whether submission
//! succeeded, returned a structured error, or failed outright.

mod http;
mod session;

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::consts::SANDBOX_API_KEY_VAR;
use crate::config::RemoteConfig;
use crate::errors::EngineError;
use crate::observability::messages::DemoModeSelected;
use crate::protocol::{ExecutionRequest, ExecutionResult, NO_OUTPUT_PLACEHOLDER};
use crate::traits::{Engine, EngineFactory};

pub use http::HttpSessionFactory;
pub use session::{SandboxError, SandboxExecution, SandboxSession, SessionFactory};

/// Label identifying the live remote backend in result envelopes.
pub const RUNTIME_LABEL: &str = "Cloud Sandbox";

/// Label used for simulated executions.
pub const DEMO_RUNTIME_LABEL: &str = "Demo Mode";

/// One remote execution context for a single request.
///
/// `sessions` is `None` when no credential is configured; every execution
/// then short-circuits into demo mode.
pub struct RemoteEngine {
    sessions: Option<Arc<dyn SessionFactory>>,
}

impl RemoteEngine {
    pub fn new(sessions: Option<Arc<dyn SessionFactory>>) -> Self {
        Self { sessions }
    }

    fn demo_result(code: &str, language: &str) -> ExecutionResult {
        let output = format!(
            "[Demo Mode] Code execution is simulated.\n\nCode:\n{code}\n\n\
             Note: Set {SANDBOX_API_KEY_VAR} environment variable to enable real code execution."
        );
        ExecutionResult::success(output, DEMO_RUNTIME_LABEL, language)
    }
}

#[async_trait(?Send)]
impl Engine for RemoteEngine {
    async fn execute(&mut self, request: &ExecutionRequest) -> Result<ExecutionResult, EngineError> {
        let language = request.language.map_or("python", |l| l.as_str());

        let Some(factory) = self.sessions.as_ref() else {
            tracing::warn!("{}", DemoModeSelected);
            return Ok(Self::demo_result(&request.code, language));
        };

        // Scoped acquisition: teardown below runs on every path once a
        // session exists.
        let session = match factory.create().await {
            Ok(session) => session,
            Err(err) => {
                return Ok(ExecutionResult::failure(
                    err.to_string(),
                    RUNTIME_LABEL,
                    language,
                ))
            }
        };

        let outcome = session.run_code(&request.code).await;
        session.kill().await;

        match outcome {
            Ok(execution) => {
                let success = execution.error.is_none();
                let error = execution
                    .error
                    .map(|e| e.name)
                    .or_else(|| {
                        if execution.stderr.is_empty() {
                            None
                        } else {
                            Some(execution.stderr.join("\n"))
                        }
                    });

                if success {
                    let output = if execution.stdout.is_empty() {
                        NO_OUTPUT_PLACEHOLDER.to_string()
                    } else {
                        execution.stdout.join("\n")
                    };
                    let mut result = ExecutionResult::success(output, RUNTIME_LABEL, language);
                    result.error = error;
                    if !execution.results.is_empty() {
                        result.results = Some(execution.results);
                    }
                    Ok(result)
                } else {
                    let mut result = ExecutionResult::failure(
                        error.unwrap_or_else(|| "Execution failed".to_string()),
                        RUNTIME_LABEL,
                        language,
                    );
                    if !execution.results.is_empty() {
                        result.results = Some(execution.results);
                    }
                    Ok(result)
                }
            }
            Err(err) => Ok(ExecutionResult::failure(
                err.to_string(),
                RUNTIME_LABEL,
                language,
            )),
        }
    }

    // Teardown happens inside execute, scoped around the session lifetime.
    fn dispose(&mut self) {}

    fn runtime_label(&self) -> &'static str {
        if self.sessions.is_some() {
            RUNTIME_LABEL
        } else {
            DEMO_RUNTIME_LABEL
        }
    }
}

/// Factory wiring for the remote backend. Demo mode is selected if and only
/// if no credential is configured, independent of code content.
pub struct RemoteEngineFactory {
    sessions: Option<Arc<dyn SessionFactory>>,
}

impl RemoteEngineFactory {
    /// Live wiring against an injected session factory.
    pub fn live(sessions: Arc<dyn SessionFactory>) -> Self {
        Self {
            sessions: Some(sessions),
        }
    }

    /// Credential-less wiring; every execution is simulated.
    pub fn demo() -> Self {
        Self { sessions: None }
    }

    /// Wire from configuration: credential presence decides live vs demo.
    pub fn from_config(config: &RemoteConfig) -> Self {
        match config.api_key.as_deref().filter(|k| !k.trim().is_empty()) {
            Some(api_key) => Self::live(Arc::new(HttpSessionFactory::new(config, api_key))),
            None => Self::demo(),
        }
    }
}

#[async_trait(?Send)]
impl EngineFactory for RemoteEngineFactory {
    async fn create(&self) -> Result<Box<dyn Engine>, EngineError> {
        Ok(Box::new(RemoteEngine::new(self.sessions.clone())))
    }
}
