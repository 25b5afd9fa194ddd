// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Request input classification for the native-binary backend.
//!
//! This module decides whether a request can reach compilation at all, using
//! wasmparser to validate binary payloads before compilation. Only a
//! base64-encoded core WASM module proceeds; WAT text and arbitrary source
//! text are rejected with corrective hints before any compilation work.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use wasmparser::{Encoding, Parser, Payload};

use crate::backends::wasm::error::{WasmError, WasmResult};
use crate::protocol::ExecutionRequest;

/// Leading token identifying the WASM text format.
const WAT_MODULE_TOKEN: &str = "(module";

/// Returns true when the snippet looks like a text-format module.
pub fn is_wat(code: &str) -> bool {
    code.trim_start().starts_with(WAT_MODULE_TOKEN)
}

/// Classify the request input and decode the binary payload.
///
/// Resolution order mirrors the execution contract: a precompiled payload is
/// preferred and validated; otherwise text is classified and rejected with
/// the appropriate hint. The size ceiling applies to the decoded bytes.
pub fn decode_binary(request: &ExecutionRequest, max_size: usize) -> WasmResult<Vec<u8>> {
    if let Some(encoded) = request
        .precompiled_bytes
        .as_deref()
        .filter(|b| !b.trim().is_empty())
    {
        let bytes = BASE64.decode(encoded.trim())?;
        if bytes.len() > max_size {
            return Err(WasmError::TooLarge {
                size: bytes.len(),
                max: max_size,
            });
        }
        validate_core_module(&bytes)?;
        return Ok(bytes);
    }

    if is_wat(&request.code) {
        Err(WasmError::WatText)
    } else {
        Err(WasmError::SourceText)
    }
}

/// Check that the bytes are a classic core WASM module.
///
/// Component Model binaries are rejected; this backend binds a core-module
/// host-import surface only.
fn validate_core_module(bytes: &[u8]) -> WasmResult<()> {
    let parser = Parser::new(0);
    let mut encoding = None;

    for payload in parser.parse_all(bytes) {
        if let Payload::Version { encoding: enc, .. } = payload? {
            encoding = Some(enc);
        }
    }

    match encoding {
        Some(Encoding::Module) => Ok(()),
        Some(Encoding::Component) => Err(WasmError::UnsupportedEncoding(
            "Component Model binaries are not supported; submit a core WASM module".to_string(),
        )),
        None => Err(WasmError::InvalidBinary(
            "missing WASM version header".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::consts::DEFAULT_MAX_MODULE_SIZE;
    use crate::protocol::Language;

    fn binary_request(bytes: &[u8]) -> ExecutionRequest {
        ExecutionRequest {
            precompiled_bytes: Some(BASE64.encode(bytes)),
            language: Some(Language::Wasm),
            ..ExecutionRequest::default()
        }
    }

    #[test]
    fn test_wat_detection() {
        assert!(is_wat("(module)"));
        assert!(is_wat("  \n(module (func))"));
        assert!(!is_wat("console.log(1)"));
        assert!(!is_wat("// (module"));
    }

    #[test]
    fn test_wat_text_rejected_before_compilation() {
        let request = ExecutionRequest::from_code("(module)", Language::Wasm);
        let err = decode_binary(&request, DEFAULT_MAX_MODULE_SIZE).unwrap_err();
        assert!(matches!(err, WasmError::WatText));
        assert!(err.hint().is_some());
    }

    #[test]
    fn test_source_text_redirected() {
        let request = ExecutionRequest::from_code("1 + 1", Language::Wasm);
        let err = decode_binary(&request, DEFAULT_MAX_MODULE_SIZE).unwrap_err();
        assert!(matches!(err, WasmError::SourceText));
        assert!(err.hint().is_some());
    }

    #[test]
    fn test_invalid_base64_rejected() {
        let request = ExecutionRequest {
            precompiled_bytes: Some("not-base64!!!".to_string()),
            ..ExecutionRequest::default()
        };
        let err = decode_binary(&request, DEFAULT_MAX_MODULE_SIZE).unwrap_err();
        assert!(matches!(err, WasmError::Base64(_)));
    }

    #[test]
    fn test_garbage_bytes_rejected() {
        let request = binary_request(&[0u8; 8]);
        let result = decode_binary(&request, DEFAULT_MAX_MODULE_SIZE);
        assert!(result.is_err());
    }

    #[test]
    fn test_valid_module_accepted() {
        let bytes = wat::parse_str("(module)").unwrap();
        let request = binary_request(&bytes);
        let decoded = decode_binary(&request, DEFAULT_MAX_MODULE_SIZE).unwrap();
        assert_eq!(decoded, bytes);
    }

    #[test]
    fn test_size_ceiling_enforced() {
        let bytes = wat::parse_str("(module)").unwrap();
        let request = binary_request(&bytes);
        let err = decode_binary(&request, 4).unwrap_err();
        assert!(matches!(err, WasmError::TooLarge { .. }));
    }

    #[test]
    fn test_precompiled_bytes_take_priority_over_text() {
        let bytes = wat::parse_str("(module)").unwrap();
        let mut request = binary_request(&bytes);
        request.code = "(module this text is ignored".to_string();
        assert!(decode_binary(&request, DEFAULT_MAX_MODULE_SIZE).is_ok());
    }
}
