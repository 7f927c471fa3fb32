//! Shared test utilities for config module tests.

use std::sync::Mutex;

use super::env_parser::{MODEL_VAR, WORKSPACE_VAR};

/// Mutex to serialize environment variable tests and prevent race conditions.
pub static ENV_MUTEX: Mutex<()> = Mutex::new(());

/// Clean up environment variables read by the config module.
pub fn cleanup_env_vars() {
    for var in [WORKSPACE_VAR, MODEL_VAR] {
        unsafe { std::env::remove_var(var) };
    }
}
