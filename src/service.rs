// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Dispatch boundary: routes requests to the right coordinator by language.
//!
//! The service owns one coordinator per backend family and is wired once at
//! startup from configuration. Routing failures (unknown or missing
//! language, oversized snippets) are reported through the same normalized
//! envelope as execution failures.

use std::sync::Arc;

use crate::backends::javascript::BoaEngineFactory;
use crate::backends::remote::RemoteEngineFactory;
use crate::backends::wasm::WasmEngineFactory;
use crate::backends::{javascript, remote, wasm};
use crate::config::Config;
use crate::executors::Executor;
use crate::protocol::{ExecutionRequest, ExecutionResult, Language};
use crate::traits::EngineFactory;

/// Runtime label on envelopes produced before any backend was selected.
const DISPATCH_LABEL: &str = "None";

/// Front door for all executions.
pub struct ExecutionService {
    javascript: Executor,
    wasm: Executor,
    remote: Executor,
    max_code_size: usize,
    max_encoded_module_size: usize,
}

impl ExecutionService {
    /// Assemble the service from explicit factories. Tests inject doubles
    /// here; production wiring goes through [`ExecutionService::from_config`].
    pub fn new(
        javascript_factory: Arc<dyn EngineFactory>,
        wasm_factory: Arc<dyn EngineFactory>,
        remote_factory: Arc<dyn EngineFactory>,
        max_code_size: usize,
        max_module_size: usize,
    ) -> Self {
        Self {
            javascript: Executor::new(javascript_factory, javascript::RUNTIME_LABEL, "javascript"),
            wasm: Executor::new(wasm_factory, wasm::RUNTIME_LABEL, "wasm"),
            remote: Executor::new(remote_factory, remote::RUNTIME_LABEL, "python"),
            max_code_size,
            // base64 inflates 3 decoded bytes into 4 encoded characters;
            // anything above this bound cannot decode under the module
            // ceiling, so it is rejected before any decoding work.
            max_encoded_module_size: max_module_size / 3 * 4 + 4,
        }
    }

    /// Production wiring. Remote sessions are live when a credential is
    /// configured, simulated otherwise.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            Arc::new(BoaEngineFactory),
            Arc::new(WasmEngineFactory::new(config.limits.clone())),
            Arc::new(RemoteEngineFactory::from_config(&config.remote)),
            config.limits.max_code_size,
            config.limits.max_module_size,
        )
    }

    /// Route one request to its coordinator and return the envelope.
    pub async fn execute(&self, request: &ExecutionRequest) -> ExecutionResult {
        if request.code.len() > self.max_code_size {
            return ExecutionResult::failure(
                format!(
                    "Code too large: {} bytes (max: {} bytes)",
                    request.code.len(),
                    self.max_code_size
                ),
                DISPATCH_LABEL,
                request.language.map_or("unknown", |l| l.as_str()),
            );
        }

        if let Some(encoded) = request.precompiled_bytes.as_deref() {
            if encoded.len() > self.max_encoded_module_size {
                return ExecutionResult::failure(
                    format!(
                        "Module payload too large: {} encoded bytes (max: {} bytes)",
                        encoded.len(),
                        self.max_encoded_module_size
                    ),
                    DISPATCH_LABEL,
                    request.language.map_or("unknown", |l| l.as_str()),
                );
            }
        }

        match request.language {
            Some(Language::Javascript) | Some(Language::Typescript) => {
                self.javascript.execute(request).await
            }
            Some(Language::Wasm) => self.wasm.execute(request).await,
            Some(Language::Python) => self.remote.execute(request).await,
            None => ExecutionResult::failure(
                "No language specified",
                DISPATCH_LABEL,
                "unknown",
            ),
        }
    }
}
