// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Execution request/response envelope shared by all backends.
//!
//! This module is the single wire contract of the service: a request carries
//! the code (or a precompiled binary payload) plus a language tag, and every
//! backend's heterogeneous outcome is normalized into [`ExecutionResult`]
//! before it leaves the coordinator. The JSON field names use camelCase to
//! match the transport contract.

use serde::{Deserialize, Serialize};

use crate::errors::{EngineError, NO_CODE_PROVIDED};

/// Language tag selecting the backend family for a request.
///
/// * `Javascript` / `Typescript` → interpreted backend (TypeScript arrives
///   already transpiled by the transport layer)
/// * `Wasm` → native-binary backend
/// * `Python` → remote sandbox backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Javascript,
    Typescript,
    Wasm,
    Python,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Javascript => "javascript",
            Language::Typescript => "typescript",
            Language::Wasm => "wasm",
            Language::Python => "python",
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single, complete, stateless execution request.
///
/// Either `code` or `precompiled_bytes` must be non-empty; the coordinator
/// rejects the request before constructing any backend otherwise.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionRequest {
    #[serde(default)]
    pub code: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<Language>,

    /// Base64-encoded WASM binary, used by the native backend in place of
    /// source text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precompiled_bytes: Option<String>,

    /// Exported function to invoke in a native module, tried before the
    /// conventional `_start`/`main` entry points.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry_point: Option<String>,

    /// Numeric arguments passed to an explicit entry point.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<f64>,
}

impl ExecutionRequest {
    /// Build a plain source-code request.
    pub fn from_code(code: impl Into<String>, language: Language) -> Self {
        Self {
            code: code.into(),
            language: Some(language),
            ..Self::default()
        }
    }

    /// True when the request carries something a backend could run.
    pub fn has_payload(&self) -> bool {
        !self.code.trim().is_empty()
            || self
                .precompiled_bytes
                .as_deref()
                .is_some_and(|b| !b.trim().is_empty())
    }
}

/// Normalized outcome of one execution, regardless of backend.
///
/// Invariants upheld by the constructors below:
/// * `output` is `None` whenever `success` is false
/// * `error` is `None` whenever `success` is true, with one deliberate
///   exception: interpreted executions that wrote to the error channel keep
///   their `error` text even though evaluation itself succeeded
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionResult {
    pub success: bool,
    pub output: Option<String>,
    pub error: Option<String>,
    /// Label identifying the backend that handled the request.
    pub runtime: String,
    pub language: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub execution_time_ms: Option<u64>,
    /// Guidance toward a corrected request, set on certain classified
    /// failures (e.g. WAT submitted where a binary was expected).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    /// Structured result payloads, remote backend only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results: Option<Vec<serde_json::Value>>,
}

/// Placeholder output for executions that succeed without producing any.
pub const NO_OUTPUT_PLACEHOLDER: &str = "Code executed successfully (no output)";

impl ExecutionResult {
    /// Successful execution with captured output.
    pub fn success(output: impl Into<String>, runtime: &str, language: &str) -> Self {
        Self {
            success: true,
            output: Some(output.into()),
            error: None,
            runtime: runtime.to_string(),
            language: language.to_string(),
            execution_time_ms: None,
            hint: None,
            results: None,
        }
    }

    /// Failed execution carrying an error message and no output.
    pub fn failure(error: impl Into<String>, runtime: &str, language: &str) -> Self {
        Self {
            success: false,
            output: None,
            error: Some(error.into()),
            runtime: runtime.to_string(),
            language: language.to_string(),
            execution_time_ms: None,
            hint: None,
            results: None,
        }
    }

    /// Rejection for empty or whitespace-only submissions.
    pub fn no_code(runtime: &str, language: &str) -> Self {
        Self::failure(NO_CODE_PROVIDED, runtime, language)
    }

    /// Map a backend error into the envelope, preserving any corrective hint.
    pub fn from_engine_error(err: &EngineError, runtime: &str, language: &str) -> Self {
        let mut result = Self::failure(err.to_string(), runtime, language);
        result.hint = err.hint().map(str::to_string);
        result
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_tags_round_trip() {
        for (tag, language) in [
            ("\"javascript\"", Language::Javascript),
            ("\"typescript\"", Language::Typescript),
            ("\"wasm\"", Language::Wasm),
            ("\"python\"", Language::Python),
        ] {
            let parsed: Language = serde_json::from_str(tag).unwrap();
            assert_eq!(parsed, language);
            assert_eq!(serde_json::to_string(&language).unwrap(), tag);
        }
    }

    #[test]
    fn test_request_payload_detection() {
        let empty = ExecutionRequest::default();
        assert!(!empty.has_payload());

        let whitespace = ExecutionRequest::from_code("   \n\t", Language::Javascript);
        assert!(!whitespace.has_payload());

        let code = ExecutionRequest::from_code("1+1", Language::Javascript);
        assert!(code.has_payload());

        let bytes_only = ExecutionRequest {
            precompiled_bytes: Some("AGFzbQ==".to_string()),
            language: Some(Language::Wasm),
            ..ExecutionRequest::default()
        };
        assert!(bytes_only.has_payload());
    }

    #[test]
    fn test_envelope_uses_camel_case_field_names() {
        let request: ExecutionRequest = serde_json::from_str(
            r#"{"code":"f()","language":"wasm","entryPoint":"f","args":[1,2]}"#,
        )
        .unwrap();
        assert_eq!(request.entry_point.as_deref(), Some("f"));
        assert_eq!(request.args, vec![1.0, 2.0]);

        let mut result = ExecutionResult::success("→ 2", "Boa (Sandboxed)", "javascript");
        result.execution_time_ms = Some(3);
        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains("\"executionTimeMs\":3"));
        assert!(json.contains("\"runtime\":\"Boa (Sandboxed)\""));
    }

    #[test]
    fn test_failure_envelope_has_no_output() {
        let result = ExecutionResult::no_code("WebAssembly (Native)", "wasm");
        assert!(!result.success);
        assert!(result.output.is_none());
        assert_eq!(result.error.as_deref(), Some("No code provided"));
    }

    #[test]
    fn test_engine_error_mapping_preserves_hint() {
        let err = EngineError::Load {
            message: "WAT format detected".to_string(),
            hint: Some("Use 'wat2wasm' from WABT to compile WAT to WASM.".to_string()),
        };
        let result = ExecutionResult::from_engine_error(&err, "WebAssembly (Native)", "wasm");
        assert!(!result.success);
        assert!(result.hint.is_some());
    }
}
