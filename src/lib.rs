// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod backends;      // execution backends (interpreted, native, remote)
pub mod config;        // config + limits
pub mod errors;        // error handling
pub mod executors;     // per-language coordinators
pub mod observability;
pub mod protocol;      // request/result envelope
pub mod service;       // language dispatch
pub mod traits;        // unified abstractions
