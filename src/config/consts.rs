// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

/// Default fuel level for WASM execution (100 million instructions)
pub const DEFAULT_FUEL_LEVEL: u64 = 100_000_000;
/// Minimum allowed fuel level (1 million instructions)
pub const MIN_FUEL_LEVEL: u64 = 1_000_000;
/// Maximum allowed fuel level (500 million instructions) - security limit
pub const MAX_FUEL_LEVEL: u64 = 500_000_000;

/// Maximum accepted source snippet size (1MB)
pub const DEFAULT_MAX_CODE_SIZE: usize = 1024 * 1024;
/// Maximum accepted WASM module size after base64 decoding (16MB)
pub const DEFAULT_MAX_MODULE_SIZE: usize = 16 * 1024 * 1024;

/// Environment variable holding the remote sandbox credential.
/// When absent, the remote backend runs in demo mode.
pub const SANDBOX_API_KEY_VAR: &str = "SANDBOX_API_KEY";

/// Default base URL of the remote sandbox API.
pub const DEFAULT_SANDBOX_BASE_URL: &str = "https://api.sandbox.example.com/v1";
