// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Crate-wide error taxonomy for execution backends and coordinators.
//!
//! Every variant maps to one failure class of the execution contract:
//! rejected input, evaluation failure inside an interpreter, unloadable
//! binary input, remote provisioning failure, or an unexpected internal
//! error. All of them are recovered into the normalized result envelope by
//! the coordinator; none of them escape a request as a panic.

use thiserror::Error;

/// Fixed message returned for empty or whitespace-only submissions.
pub const NO_CODE_PROVIDED: &str = "No code provided";

/// Failure classes shared by all execution backends.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Request carried no code and no precompiled bytes. Rejected before any
    /// backend is constructed.
    #[error("{NO_CODE_PROVIDED}")]
    EmptyInput,

    /// The interpreted backend could not evaluate the snippet (syntax error
    /// or runtime exception). The message is the thrown value's message.
    #[error("{0}")]
    Evaluation(String),

    /// The native backend was given input it can never execute (source text,
    /// WAT text, or a malformed binary). Carries a corrective hint for the
    /// caller when one exists.
    #[error("{message}")]
    Load {
        message: String,
        hint: Option<String>,
    },

    /// Remote session creation or submission failed at the network level.
    #[error("{0}")]
    Provisioning(String),

    /// Unexpected failure anywhere inside a backend or coordinator.
    #[error("{0}")]
    Internal(String),
}

impl EngineError {
    /// Corrective guidance attached to this failure, if any.
    pub fn hint(&self) -> Option<&str> {
        match self {
            EngineError::Load { hint, .. } => hint.as_deref(),
            _ => None,
        }
    }
}
