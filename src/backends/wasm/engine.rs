// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! WASM module execution with stub host imports and fuel protection.
//!
//! ## Responsibilities
//! - Compile validated binaries with a hardened engine configuration
//! - Instantiate modules against the fixed host-import surface
//! - Resolve and invoke the entry point in priority order
//! - Render function results and export listings into output text
//!
//! All compilation, instantiation and trap failures are reported inside the
//! result envelope; nothing propagates as a transport-level failure.

use async_trait::async_trait;
use wasmtime::{Caller, Config, Engine as Wasmtime, ExternType, Func, Linker, Module, Store, Val, ValType};

use crate::backends::wasm::detector;
use crate::backends::wasm::error::{WasmError, WasmResult};
use crate::config::LimitsConfig;
use crate::errors::EngineError;
use crate::observability::messages::{EntryPointResolved, ModuleCompiled};
use crate::protocol::{ExecutionRequest, ExecutionResult};
use crate::traits::{Engine, EngineFactory};

/// Label identifying this backend in result envelopes.
pub const RUNTIME_LABEL: &str = "WebAssembly (Native)";

/// Fixed completion message for whole-program (`_start`) runs.
const START_COMPLETION_MESSAGE: &str = "WASM module executed (_start)";

/// Output accumulated by host imports during one execution.
#[derive(Default)]
struct HostOutput {
    output: String,
}

/// One native-binary execution context, alive for a single request.
pub struct WasmEngine {
    engine: Wasmtime,
    fuel: u64,
    max_module_size: usize,
}

impl WasmEngine {
    pub fn new(limits: &LimitsConfig) -> Result<Self, EngineError> {
        let engine = Self::create_engine()?;
        Ok(Self {
            engine,
            fuel: limits.fuel,
            max_module_size: limits.max_module_size,
        })
    }

    /// Create a wasmtime engine with security-focused configuration.
    fn create_engine() -> WasmResult<Wasmtime> {
        let mut config = Config::new();

        config.wasm_threads(false);
        config.wasm_simd(false);
        config.wasm_relaxed_simd(false);
        config.wasm_multi_memory(false);
        config.wasm_memory64(false);

        // Fuel prevents infinite loops and bounds computational resource
        // usage; when the budget is exhausted, execution traps.
        config.consume_fuel(true);
        config.epoch_interruption(false);

        Wasmtime::new(&config).map_err(|e| WasmError::EngineError(e.to_string()))
    }

    fn run(&self, request: &ExecutionRequest) -> WasmResult<String> {
        let bytes = detector::decode_binary(request, self.max_module_size)?;

        let module = Module::new(&self.engine, &bytes)
            .map_err(|e| WasmError::ModuleError(e.to_string()))?;
        tracing::debug!(
            "{}",
            ModuleCompiled {
                size_bytes: bytes.len()
            }
        );

        let mut linker: Linker<HostOutput> = Linker::new(&self.engine);
        self.bind_host_imports(&mut linker)?;

        let mut store = Store::new(&self.engine, HostOutput::default());
        store.set_fuel(self.fuel)?;

        let instance = linker
            .instantiate(&mut store, &module)
            .map_err(|e| WasmError::ModuleError(e.to_string()))?;

        self.invoke_entry_point(&mut store, &instance, &module, request)?;

        Ok(store.into_data().output)
    }

    /// Bind the fixed host-import surface.
    ///
    /// `env.print` appends a numeric value and newline. `env.print_str`
    /// appends a placeholder description: in-module linear memory cannot be
    /// resolved without an agreed memory-export convention. The WASI stubs
    /// satisfy modules compiled against preview1 without performing any I/O.
    fn bind_host_imports(&self, linker: &mut Linker<HostOutput>) -> WasmResult<()> {
        linker.func_wrap("env", "print", |mut caller: Caller<'_, HostOutput>, value: i32| {
            caller.data_mut().output.push_str(&format!("{value}\n"));
        })?;
        linker.func_wrap(
            "env",
            "print_str",
            |mut caller: Caller<'_, HostOutput>, ptr: i32, len: i32| {
                caller
                    .data_mut()
                    .output
                    .push_str(&format!("[String at {ptr}, length {len}]\n"));
            },
        )?;

        linker.func_wrap(
            "wasi_snapshot_preview1",
            "fd_write",
            |_: i32, _: i32, _: i32, _: i32| -> i32 { 0 },
        )?;
        linker.func_wrap("wasi_snapshot_preview1", "fd_close", |_: i32| -> i32 { 0 })?;
        linker.func_wrap(
            "wasi_snapshot_preview1",
            "fd_seek",
            |_: i32, _: i64, _: i32, _: i32| -> i32 { 0 },
        )?;
        linker.func_wrap("wasi_snapshot_preview1", "proc_exit", |_: i32| {})?;

        Ok(())
    }

    /// Resolve and invoke the entry point in fixed priority order, stopping
    /// at the first match:
    /// 1. caller-specified function name with the caller's numeric arguments
    /// 2. conventional `_start` export
    /// 3. conventional `main` export
    /// 4. none found: list all callable exports instead
    fn invoke_entry_point(
        &self,
        store: &mut Store<HostOutput>,
        instance: &wasmtime::Instance,
        module: &Module,
        request: &ExecutionRequest,
    ) -> WasmResult<()> {
        if let Some(name) = request.entry_point.as_deref().filter(|n| !n.is_empty()) {
            if let Some(func) = instance.get_func(&mut *store, name) {
                tracing::debug!("{}", EntryPointResolved { strategy: name });
                let rendered = Self::call_numeric(store, &func, &request.args)?;
                let joined = request
                    .args
                    .iter()
                    .map(f64::to_string)
                    .collect::<Vec<_>>()
                    .join(", ");
                let line = format!("{name}({joined}) = {rendered}");
                store.data_mut().output.push_str(&line);
                return Ok(());
            }
        }

        if let Some(func) = instance.get_func(&mut *store, "_start") {
            tracing::debug!("{}", EntryPointResolved { strategy: "_start" });
            Self::call_numeric(store, &func, &[])?;
            store.data_mut().output.push_str(START_COMPLETION_MESSAGE);
            return Ok(());
        }

        if let Some(func) = instance.get_func(&mut *store, "main") {
            tracing::debug!("{}", EntryPointResolved { strategy: "main" });
            let rendered = Self::call_numeric(store, &func, &[])?;
            store
                .data_mut()
                .output
                .push_str(&format!("main() = {rendered}"));
            return Ok(());
        }

        tracing::debug!("{}", EntryPointResolved { strategy: "export listing" });
        let names: Vec<&str> = module
            .exports()
            .filter(|export| matches!(export.ty(), ExternType::Func(_)))
            .map(|export| export.name())
            .collect();
        let listing = if names.is_empty() {
            "none".to_string()
        } else {
            names.join(", ")
        };
        store.data_mut().output = format!("Available exports: {listing}");
        Ok(())
    }

    /// Call a function with numeric arguments coerced to its parameter
    /// types, rendering the first result (or `()` for empty signatures).
    fn call_numeric(store: &mut Store<HostOutput>, func: &Func, args: &[f64]) -> WasmResult<String> {
        let ty = func.ty(&mut *store);

        let param_types: Vec<ValType> = ty.params().collect();
        if param_types.len() != args.len() {
            return Err(WasmError::ModuleError(format!(
                "function expects {} argument(s), got {}",
                param_types.len(),
                args.len()
            )));
        }

        let params: Vec<Val> = param_types
            .iter()
            .zip(args)
            .map(|(ty, arg)| Self::coerce_arg(*arg, ty))
            .collect::<WasmResult<_>>()?;

        let mut results: Vec<Val> = ty
            .results()
            .map(|ty| Self::zero_val(&ty))
            .collect::<WasmResult<_>>()?;

        func.call(&mut *store, &params, &mut results)?;

        Ok(match results.as_slice() {
            [] => "()".to_string(),
            [single] => Self::render_val(single),
            many => many
                .iter()
                .map(Self::render_val)
                .collect::<Vec<_>>()
                .join(", "),
        })
    }

    fn coerce_arg(arg: f64, ty: &ValType) -> WasmResult<Val> {
        match ty {
            ValType::I32 => Ok(Val::I32(arg as i32)),
            ValType::I64 => Ok(Val::I64(arg as i64)),
            ValType::F32 => Ok(Val::F32((arg as f32).to_bits())),
            ValType::F64 => Ok(Val::F64(arg.to_bits())),
            other => Err(WasmError::ModuleError(format!(
                "unsupported parameter type: {other:?}"
            ))),
        }
    }

    fn zero_val(ty: &ValType) -> WasmResult<Val> {
        match ty {
            ValType::I32 => Ok(Val::I32(0)),
            ValType::I64 => Ok(Val::I64(0)),
            ValType::F32 => Ok(Val::F32(0)),
            ValType::F64 => Ok(Val::F64(0)),
            other => Err(WasmError::ModuleError(format!(
                "unsupported result type: {other:?}"
            ))),
        }
    }

    fn render_val(val: &Val) -> String {
        match val {
            Val::I32(v) => v.to_string(),
            Val::I64(v) => v.to_string(),
            Val::F32(bits) => f32::from_bits(*bits).to_string(),
            Val::F64(bits) => f64::from_bits(*bits).to_string(),
            other => format!("{other:?}"),
        }
    }
}

#[async_trait(?Send)]
impl Engine for WasmEngine {
    async fn execute(&mut self, request: &ExecutionRequest) -> Result<ExecutionResult, EngineError> {
        let language = request.language.map_or("wasm", |l| l.as_str());

        match self.run(request) {
            Ok(output) => {
                let output = if output.is_empty() {
                    "WASM executed successfully (no output)".to_string()
                } else {
                    output
                };
                Ok(ExecutionResult::success(output, RUNTIME_LABEL, language))
            }
            Err(err) => {
                let hint = err.hint();
                let mut result = ExecutionResult::failure(err.to_string(), RUNTIME_LABEL, language);
                result.hint = hint.map(str::to_string);
                Ok(result)
            }
        }
    }

    // Native module instances have no explicit teardown beyond scope exit.
    fn dispose(&mut self) {}

    fn runtime_label(&self) -> &'static str {
        RUNTIME_LABEL
    }
}

/// Default factory wiring for the native-binary backend. Each request gets
/// its own engine instance configured from the service limits.
pub struct WasmEngineFactory {
    limits: LimitsConfig,
}

impl WasmEngineFactory {
    pub fn new(limits: LimitsConfig) -> Self {
        Self { limits }
    }
}

#[async_trait(?Send)]
impl EngineFactory for WasmEngineFactory {
    async fn create(&self) -> Result<Box<dyn Engine>, EngineError> {
        Ok(Box::new(WasmEngine::new(&self.limits)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::Language;
    use base64::engine::general_purpose::STANDARD as BASE64;
    use base64::Engine as _;

    fn wasm_request(wat_source: &str) -> ExecutionRequest {
        let bytes = wat::parse_str(wat_source).unwrap();
        ExecutionRequest {
            precompiled_bytes: Some(BASE64.encode(bytes)),
            language: Some(Language::Wasm),
            ..ExecutionRequest::default()
        }
    }

    async fn run(request: &ExecutionRequest) -> ExecutionResult {
        let mut engine = WasmEngine::new(&LimitsConfig::default()).unwrap();
        let result = engine.execute(request).await.unwrap();
        engine.dispose();
        result
    }

    #[tokio::test]
    async fn test_wat_text_reports_failure_with_hint() {
        let request = ExecutionRequest::from_code("(module)", Language::Wasm);
        let result = run(&request).await;
        assert!(!result.success);
        assert!(result.error.unwrap().contains("WAT format detected"));
        assert!(result.hint.is_some());
        assert!(result.output.is_none());
    }

    #[tokio::test]
    async fn test_source_text_reports_failure_with_hint() {
        let request = ExecutionRequest::from_code("console.log(1)", Language::Wasm);
        let result = run(&request).await;
        assert!(!result.success);
        assert!(result.hint.is_some());
    }

    #[tokio::test]
    async fn test_explicit_entry_point_with_args() {
        let mut request = wasm_request(
            r#"(module
                (func (export "add") (param i32 i32) (result i32)
                    local.get 0
                    local.get 1
                    i32.add))"#,
        );
        request.entry_point = Some("add".to_string());
        request.args = vec![2.0, 3.0];

        let result = run(&request).await;
        assert!(result.success);
        assert_eq!(result.output.as_deref(), Some("add(2, 3) = 5"));
    }

    #[tokio::test]
    async fn test_explicit_entry_point_wins_over_main() {
        let mut request = wasm_request(
            r#"(module
                (func (export "compute") (result i32) (i32.const 7))
                (func (export "main") (result i32) (i32.const 1)))"#,
        );
        request.entry_point = Some("compute".to_string());

        let result = run(&request).await;
        assert_eq!(result.output.as_deref(), Some("compute() = 7"));
    }

    #[tokio::test]
    async fn test_start_preferred_over_main() {
        let request = wasm_request(
            r#"(module
                (import "env" "print" (func $print (param i32)))
                (func (export "_start") (call $print (i32.const 7)))
                (func (export "main") (result i32) (i32.const 1)))"#,
        );

        let result = run(&request).await;
        assert!(result.success);
        assert_eq!(
            result.output.as_deref(),
            Some("7\nWASM module executed (_start)")
        );
    }

    #[tokio::test]
    async fn test_main_fallback() {
        let request = wasm_request(r#"(module (func (export "main") (result i32) (i32.const 42)))"#);
        let result = run(&request).await;
        assert_eq!(result.output.as_deref(), Some("main() = 42"));
    }

    #[tokio::test]
    async fn test_missing_entry_points_lists_exports() {
        let request = wasm_request(
            r#"(module
                (func (export "alpha") (result i32) (i32.const 1))
                (func (export "beta") (result i32) (i32.const 2)))"#,
        );
        let result = run(&request).await;
        assert!(result.success);
        assert_eq!(result.output.as_deref(), Some("Available exports: alpha, beta"));
    }

    #[tokio::test]
    async fn test_module_without_exports_lists_none() {
        let request = wasm_request("(module)");
        let result = run(&request).await;
        assert_eq!(result.output.as_deref(), Some("Available exports: none"));
    }

    #[tokio::test]
    async fn test_missing_named_entry_falls_through() {
        let mut request = wasm_request(
            r#"(module (func (export "main") (result i32) (i32.const 3)))"#,
        );
        request.entry_point = Some("nonexistent".to_string());

        let result = run(&request).await;
        assert_eq!(result.output.as_deref(), Some("main() = 3"));
    }

    #[tokio::test]
    async fn test_print_str_placeholder() {
        let request = wasm_request(
            r#"(module
                (import "env" "print_str" (func $p (param i32 i32)))
                (func (export "_start") (call $p (i32.const 16) (i32.const 5))))"#,
        );
        let result = run(&request).await;
        assert_eq!(
            result.output.as_deref(),
            Some("[String at 16, length 5]\nWASM module executed (_start)")
        );
    }

    #[tokio::test]
    async fn test_wasi_stubs_satisfy_imports() {
        let request = wasm_request(
            r#"(module
                (import "wasi_snapshot_preview1" "fd_write"
                    (func $fd_write (param i32 i32 i32 i32) (result i32)))
                (func (export "main") (result i32)
                    (call $fd_write (i32.const 0) (i32.const 0) (i32.const 0) (i32.const 0))))"#,
        );
        let result = run(&request).await;
        assert!(result.success);
        assert_eq!(result.output.as_deref(), Some("main() = 0"));
    }

    #[tokio::test]
    async fn test_argument_count_mismatch_reported() {
        let mut request = wasm_request(
            r#"(module (func (export "add") (param i32 i32) (result i32)
                local.get 0 local.get 1 i32.add))"#,
        );
        request.entry_point = Some("add".to_string());
        request.args = vec![1.0];

        let result = run(&request).await;
        assert!(!result.success);
        assert!(result.error.unwrap().contains("expects 2 argument(s)"));
    }

    #[tokio::test]
    async fn test_fuel_exhaustion_is_reported_not_fatal() {
        let request = wasm_request(
            r#"(module (func (export "_start") (loop $l (br $l))))"#,
        );
        let result = run(&request).await;
        assert!(!result.success);
        assert!(result.error.is_some());
    }

    #[tokio::test]
    async fn test_invalid_binary_reported() {
        let request = ExecutionRequest {
            precompiled_bytes: Some(BASE64.encode([0u8; 16])),
            language: Some(Language::Wasm),
            ..ExecutionRequest::default()
        };
        let result = run(&request).await;
        assert!(!result.success);
        assert!(result.output.is_none());
    }
}
