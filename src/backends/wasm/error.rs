// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Error types for WASM backend operations.
//!
//! Covers input classification, base64 decoding, binary validation, module
//! compilation, instantiation, and execution. All errors implement
//! `std::error::Error` via the `thiserror` crate; classification failures
//! additionally carry a corrective hint for the caller.

use thiserror::Error;

use crate::errors::EngineError;

/// Hint attached when WAT text is submitted where a binary was expected.
pub const WAT_HINT: &str = "Use 'wat2wasm' from WABT to compile WAT to WASM.";

/// Hint attached when non-WASM source text is submitted.
pub const SOURCE_TEXT_HINT: &str =
    "Route source code to the JavaScript executor; this backend only runs compiled WASM binaries.";

/// Comprehensive error type for all WASM backend operations.
#[derive(Error, Debug)]
pub enum WasmError {
    /// Text-format module representation detected; cannot be executed
    /// without precompilation.
    #[error("WAT format detected. Please compile to WASM binary first.")]
    WatText,

    /// Arbitrary source text detected; this backend never executes source.
    #[error("Only precompiled WASM binaries can be executed.")]
    SourceText,

    /// `precompiledBytes` was not valid base64.
    #[error("Invalid base64 in precompiled bytes: {0}")]
    Base64(#[from] base64::DecodeError),

    /// Invalid or malformed WASM binary format.
    #[error("Invalid WASM binary: {0}")]
    InvalidBinary(String),

    /// Unsupported WASM encoding (e.g. a Component Model binary).
    #[error("Unsupported WASM encoding: {0}")]
    UnsupportedEncoding(String),

    /// Module exceeds the configured size ceiling.
    #[error("WASM module too large: {size} bytes (max: {max} bytes)")]
    TooLarge { size: usize, max: usize },

    /// Module compilation or instantiation error.
    #[error("WASM module error: {0}")]
    ModuleError(String),

    /// Wasmtime runtime execution error (traps, fuel exhaustion).
    #[error("WASM execution error: {0}")]
    ExecutionError(#[from] wasmtime::Error),

    /// Wasmtime engine creation or configuration error.
    #[error("Engine creation error: {0}")]
    EngineError(String),

    /// WASM binary parsing error from wasmparser.
    #[error("WASM parser error: {0}")]
    ParserError(#[from] wasmparser::BinaryReaderError),
}

/// Result type alias for WASM operations.
pub type WasmResult<T> = Result<T, WasmError>;

impl WasmError {
    /// Corrective guidance for classification failures.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            WasmError::WatText => Some(WAT_HINT),
            WasmError::SourceText => Some(SOURCE_TEXT_HINT),
            _ => None,
        }
    }
}

impl From<WasmError> for EngineError {
    fn from(err: WasmError) -> Self {
        let hint = err.hint().map(str::to_string);
        match err {
            WasmError::EngineError(message) => EngineError::Internal(message),
            other => EngineError::Load {
                message: other.to_string(),
                hint,
            },
        }
    }
}
