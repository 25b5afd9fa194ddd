// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Embedded JavaScript engine built on Boa.
//!
//! Handles console substitution, strict-mode evaluation, completion-value
//! rendering, and the merge of error-channel lines into the reported error
//! text. Success is governed only by whether evaluation threw; error-channel
//! writes during a successful evaluation still populate `error`.

use std::path::Path;

use async_trait::async_trait;
use boa_engine::object::ObjectInitializer;
use boa_engine::property::Attribute;
use boa_engine::{js_string, Context, JsError, JsResult, JsValue, NativeFunction, Source};
use boa_gc::{Gc, GcRefCell};

use crate::errors::EngineError;
use crate::protocol::{ExecutionRequest, ExecutionResult, NO_OUTPUT_PLACEHOLDER};
use crate::traits::{Engine, EngineFactory};

/// Label identifying this backend in result envelopes.
pub const RUNTIME_LABEL: &str = "Boa (Sandboxed)";

/// Source label attached to evaluated snippets for diagnostics.
const SOURCE_LABEL: &str = "user-code.js";

/// Captured-output buffer shared between the interpreter's console functions
/// and the engine. Read once at the end of execution.
type LineBuffer = Gc<GcRefCell<Vec<String>>>;

/// Host function body installed as both `console.log` and `console.error`,
/// differing only in the captured buffer.
fn append_line(
    _this: &JsValue,
    args: &[JsValue],
    buffer: &LineBuffer,
    context: &mut Context,
) -> JsResult<JsValue> {
    let mut parts = Vec::with_capacity(args.len());
    for arg in args {
        parts.push(arg.to_string(context)?.to_std_string_escaped());
    }
    buffer.borrow_mut().push(parts.join(" "));
    Ok(JsValue::undefined())
}

/// One interpreter instance, alive for a single request.
pub struct JsEngine {
    context: Context,
    logs: LineBuffer,
    errors: LineBuffer,
    disposed: bool,
}

impl JsEngine {
    /// Create a fresh strict-mode context with the captured console
    /// installed. Installation happens before any user code can run, so the
    /// snippet only ever observes the substituted output surface.
    pub fn new() -> Result<Self, EngineError> {
        let mut context = Context::default();
        context.strict(true);

        let logs: LineBuffer = Gc::new(GcRefCell::new(Vec::new()));
        let errors: LineBuffer = Gc::new(GcRefCell::new(Vec::new()));

        let log_fn = NativeFunction::from_copy_closure_with_captures(append_line, logs.clone());
        let error_fn = NativeFunction::from_copy_closure_with_captures(append_line, errors.clone());

        let console = ObjectInitializer::new(&mut context)
            .function(log_fn, js_string!("log"), 0)
            .function(error_fn, js_string!("error"), 0)
            .build();

        context
            .register_global_property(js_string!("console"), console, Attribute::all())
            .map_err(|e| EngineError::Internal(format!("failed to install console: {e}")))?;

        Ok(Self {
            context,
            logs,
            errors,
            disposed: false,
        })
    }

    /// Render a completion value for display: structured values as
    /// pretty-printed JSON, everything else via string conversion.
    fn render_value(&mut self, value: &JsValue) -> String {
        if value.is_object() && !value.is_callable() {
            if let Ok(json) = value.to_json(&mut self.context) {
                if let Ok(pretty) = serde_json::to_string_pretty(&json) {
                    return pretty;
                }
            }
        }
        match value.to_string(&mut self.context) {
            Ok(text) => text.to_std_string_escaped(),
            Err(_) => value.display().to_string(),
        }
    }

    /// Extract the message of a thrown value: its `message` property if it
    /// is an object carrying one, else its string form, else a fixed
    /// fallback.
    fn thrown_message(&mut self, err: JsError) -> String {
        let value = err.to_opaque(&mut self.context);
        if let Some(object) = value.as_object() {
            if let Ok(message) = object.get(js_string!("message"), &mut self.context) {
                if !message.is_undefined() {
                    if let Ok(text) = message.to_string(&mut self.context) {
                        return text.to_std_string_escaped();
                    }
                }
            }
        }
        value
            .to_string(&mut self.context)
            .map(|text| text.to_std_string_escaped())
            .unwrap_or_else(|_| "Unknown error".to_string())
    }
}

#[async_trait(?Send)]
impl Engine for JsEngine {
    async fn execute(&mut self, request: &ExecutionRequest) -> Result<ExecutionResult, EngineError> {
        let language = request.language.map_or("javascript", |l| l.as_str());
        let source = Source::from_reader(request.code.as_bytes(), Some(Path::new(SOURCE_LABEL)));

        let mut output = String::new();
        let mut success = true;
        let mut error_message = String::new();

        match self.context.eval(source) {
            Ok(value) => {
                {
                    let logs = self.logs.borrow();
                    if !logs.is_empty() {
                        output = logs.join("\n");
                    }
                }
                if !value.is_null_or_undefined() {
                    let rendered = self.render_value(&value);
                    output = if output.is_empty() {
                        format!("→ {rendered}")
                    } else {
                        format!("{output}\n→ {rendered}")
                    };
                }
            }
            Err(err) => {
                success = false;
                error_message = self.thrown_message(err);
            }
        }

        // Error-channel lines are prepended to any evaluation error and are
        // reported even when evaluation itself succeeded; success stays tied
        // to the evaluation outcome alone.
        {
            let errors = self.errors.borrow();
            if !errors.is_empty() {
                error_message = if error_message.is_empty() {
                    errors.join("\n")
                } else {
                    format!("{}\n{}", errors.join("\n"), error_message)
                };
            }
        }

        Ok(ExecutionResult {
            success,
            output: if success {
                Some(if output.is_empty() {
                    NO_OUTPUT_PLACEHOLDER.to_string()
                } else {
                    output
                })
            } else {
                None
            },
            error: if error_message.is_empty() {
                None
            } else {
                Some(error_message)
            },
            runtime: RUNTIME_LABEL.to_string(),
            language: language.to_string(),
            execution_time_ms: None,
            hint: None,
            results: None,
        })
    }

    fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.logs.borrow_mut().clear();
        self.errors.borrow_mut().clear();
        self.disposed = true;
        // Interpreter resources are released when the coordinator drops the
        // engine at the end of the request.
    }

    fn runtime_label(&self) -> &'static str {
        RUNTIME_LABEL
    }
}

/// Default factory wiring for the interpreted backend.
pub struct BoaEngineFactory;

#[async_trait(?Send)]
impl EngineFactory for BoaEngineFactory {
    async fn create(&self) -> Result<Box<dyn Engine>, EngineError> {
        Ok(Box::new(JsEngine::new()?))
    }
}
