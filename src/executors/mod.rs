// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Per-language coordinators.
//!
//! A coordinator owns the full lifecycle of one execution: validate input,
//! create an engine through its injected factory, run the request, and
//! release the engine on every exit path. It is the only layer that stamps
//! wall-clock timing onto the envelope, and it never panics on backend
//! failure; every outcome becomes a normalized [`ExecutionResult`].

use std::sync::Arc;
use std::time::Instant;

use crate::observability::messages::{EngineCreationFailed, ExecutionFinished};
use crate::protocol::{ExecutionRequest, ExecutionResult};
use crate::traits::EngineFactory;

/// Coordinates executions for one backend family.
pub struct Executor {
    factory: Arc<dyn EngineFactory>,
    runtime_label: &'static str,
    default_language: &'static str,
}

impl Executor {
    pub fn new(
        factory: Arc<dyn EngineFactory>,
        runtime_label: &'static str,
        default_language: &'static str,
    ) -> Self {
        Self {
            factory,
            runtime_label,
            default_language,
        }
    }

    /// Run one request through this coordinator's backend.
    ///
    /// Empty submissions are rejected before the factory is invoked. Once an
    /// engine exists, `dispose` runs whether execution succeeded or failed.
    pub async fn execute(&self, request: &ExecutionRequest) -> ExecutionResult {
        let language = request
            .language
            .map_or(self.default_language, |l| l.as_str());

        if !request.has_payload() {
            return ExecutionResult::no_code(self.runtime_label, language);
        }

        let started = Instant::now();

        let mut result = match self.factory.create().await {
            Ok(mut engine) => {
                let outcome = engine.execute(request).await;
                let engine_label = engine.runtime_label();
                engine.dispose();

                match outcome {
                    Ok(result) => result,
                    Err(err) => ExecutionResult::from_engine_error(&err, engine_label, language),
                }
            }
            Err(err) => {
                tracing::error!(
                    "{}",
                    EngineCreationFailed {
                        runtime: self.runtime_label,
                        error: &err,
                    }
                );
                ExecutionResult::from_engine_error(&err, self.runtime_label, language)
            }
        };

        result.execution_time_ms = Some(started.elapsed().as_millis() as u64);

        tracing::info!(
            "{}",
            ExecutionFinished {
                runtime: &result.runtime,
                language: &result.language,
                success: result.success,
                elapsed_ms: result.execution_time_ms.unwrap_or(0),
            }
        );

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::EngineError;
    use crate::protocol::Language;
    use crate::traits::Engine;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct MockEngine {
        outcome: Result<(), String>,
        dispose_count: Arc<AtomicUsize>,
    }

    #[async_trait(?Send)]
    impl Engine for MockEngine {
        async fn execute(
            &mut self,
            request: &ExecutionRequest,
        ) -> Result<ExecutionResult, EngineError> {
            let language = request.language.map_or("javascript", |l| l.as_str());
            match &self.outcome {
                Ok(()) => Ok(ExecutionResult::success("ok", "Mock", language)),
                Err(message) => Err(EngineError::Evaluation(message.clone())),
            }
        }

        fn dispose(&mut self) {
            self.dispose_count.fetch_add(1, Ordering::SeqCst);
        }

        fn runtime_label(&self) -> &'static str {
            "Mock"
        }
    }

    struct MockFactory {
        outcome: Result<(), String>,
        fail_create: bool,
        create_count: Arc<AtomicUsize>,
        dispose_count: Arc<AtomicUsize>,
    }

    #[async_trait(?Send)]
    impl EngineFactory for MockFactory {
        async fn create(&self) -> Result<Box<dyn Engine>, EngineError> {
            self.create_count.fetch_add(1, Ordering::SeqCst);
            if self.fail_create {
                return Err(EngineError::Internal("engine unavailable".to_string()));
            }
            Ok(Box::new(MockEngine {
                outcome: self.outcome.clone(),
                dispose_count: self.dispose_count.clone(),
            }))
        }
    }

    struct Counters {
        create: Arc<AtomicUsize>,
        dispose: Arc<AtomicUsize>,
    }

    fn executor(outcome: Result<(), String>, fail_create: bool) -> (Executor, Counters) {
        let counters = Counters {
            create: Arc::new(AtomicUsize::new(0)),
            dispose: Arc::new(AtomicUsize::new(0)),
        };
        let factory = MockFactory {
            outcome,
            fail_create,
            create_count: counters.create.clone(),
            dispose_count: counters.dispose.clone(),
        };
        (Executor::new(Arc::new(factory), "Mock", "javascript"), counters)
    }

    #[tokio::test]
    async fn test_empty_request_rejected_without_creating_engine() {
        let (executor, counters) = executor(Ok(()), false);
        let request = ExecutionRequest::from_code("   ", Language::Javascript);

        let result = executor.execute(&request).await;
        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("No code provided"));
        assert_eq!(counters.create.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_successful_execution_disposes_engine_and_stamps_timing() {
        let (executor, counters) = executor(Ok(()), false);
        let request = ExecutionRequest::from_code("1+1", Language::Javascript);

        let result = executor.execute(&request).await;
        assert!(result.success);
        assert!(result.execution_time_ms.is_some());
        assert_eq!(counters.create.load(Ordering::SeqCst), 1);
        assert_eq!(counters.dispose.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_engine_failure_still_disposes_engine() {
        let (executor, counters) = executor(Err("boom".to_string()), false);
        let request = ExecutionRequest::from_code("boom()", Language::Javascript);

        let result = executor.execute(&request).await;
        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("boom"));
        assert_eq!(counters.dispose.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_factory_failure_becomes_failure_envelope() {
        let (executor, counters) = executor(Ok(()), true);
        let request = ExecutionRequest::from_code("1+1", Language::Javascript);

        let result = executor.execute(&request).await;
        assert!(!result.success);
        assert_eq!(result.runtime, "Mock");
        assert_eq!(result.error.as_deref(), Some("engine unavailable"));
        assert!(
            result.execution_time_ms.is_some(),
            "timing must be stamped on factory failures too"
        );
        assert_eq!(counters.dispose.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_language_tag_falls_back_to_default() {
        let (executor, _) = executor(Ok(()), false);
        let request = ExecutionRequest {
            code: String::new(),
            ..ExecutionRequest::default()
        };

        let result = executor.execute(&request).await;
        assert_eq!(result.language, "javascript");
    }
}
