// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Observability module for structured logging and tracing.
//!
//! Message types follow a struct-based pattern with `Display`
//! implementations to eliminate magic strings scattered throughout the
//! codebase and keep diagnostic output consistent across backends.

pub mod messages;
