// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use std::fmt;

use tracing::Level;

/// Sink for migration progress and diagnostics. Purely informational, the
/// output of a pass never depends on it.
pub trait Logger: Send + Sync {
    fn log(&self, level: Level, args: fmt::Arguments<'_>);
}

/// Forwards to `tracing` at the matching level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn log(&self, level: Level, args: fmt::Arguments<'_>) {
        match level {
            Level::ERROR => tracing::error!("{args}"),
            Level::WARN => tracing::warn!("{args}"),
            Level::INFO => tracing::info!("{args}"),
            Level::DEBUG => tracing::debug!("{args}"),
            _ => tracing::trace!("{args}"),
        }
    }
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopLogger;

impl Logger for NoopLogger {
    fn log(&self, _level: Level, _args: fmt::Arguments<'_>) {}
}
