// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! Shared cancellation scope of a migration pass: records the first error
//! raised by any task and wakes every task blocked on a stream.

use std::convert::Infallible;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crossbeam_channel::{Receiver, Sender, select};
use parking_lot::Mutex;

use super::errors::MigrationError;

struct Inner {
    cancelled: AtomicBool,
    first_error: Mutex<Option<anyhow::Error>>,
    /// Dropped on cancellation, which disconnects `signal`.
    trigger: Mutex<Option<Sender<Infallible>>>,
    signal: Receiver<Infallible>,
}

/// Owner side of the scope, held by the orchestrator and its tasks.
#[derive(Clone)]
pub struct MigrationScope {
    inner: Arc<Inner>,
}

/// Read-only view handed to migrators so long running ones can bail out.
#[derive(Clone)]
pub struct CancellationToken {
    inner: Arc<Inner>,
}

impl Default for MigrationScope {
    fn default() -> Self {
        Self::new()
    }
}

impl MigrationScope {
    pub fn new() -> Self {
        let (trigger, signal) = crossbeam_channel::bounded(0);
        Self {
            inner: Arc::new(Inner {
                cancelled: AtomicBool::new(false),
                first_error: Mutex::new(None),
                trigger: Mutex::new(Some(trigger)),
                signal,
            }),
        }
    }

    pub fn token(&self) -> CancellationToken {
        CancellationToken {
            inner: self.inner.clone(),
        }
    }

    /// Records `err` unless an earlier error was recorded, then cancels.
    pub fn fail(&self, err: anyhow::Error) {
        {
            let mut first = self.inner.first_error.lock();
            if first.is_none() {
                tracing::debug!("state migration scope failed: {err:#}");
                *first = Some(err);
            }
        }
        self.cancel();
    }

    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::Release);
        self.inner.trigger.lock().take();
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::Acquire)
    }

    /// Runs a task body and routes its error into the scope.
    pub fn run(&self, task: impl FnOnce() -> anyhow::Result<()>) {
        if let Err(e) = task() {
            self.fail(e);
        }
    }

    /// Becomes ready (disconnected) once the scope is cancelled.
    pub fn signal(&self) -> &Receiver<Infallible> {
        &self.inner.signal
    }

    /// Sends `value`, blocking while the stream is full, unless the scope
    /// gets cancelled first.
    pub fn send<T>(&self, tx: &Sender<T>, value: T) -> anyhow::Result<()> {
        select! {
            send(tx, value) -> res => res.map_err(|_| anyhow::anyhow!("migration stream closed")),
            recv(self.signal()) -> _ => Err(MigrationError::Cancelled.into()),
        }
    }

    /// Receives the next value. `Ok(None)` means the stream was closed and
    /// drained.
    pub fn recv<T>(&self, rx: &Receiver<T>) -> anyhow::Result<Option<T>> {
        select! {
            recv(rx) -> res => Ok(res.ok()),
            recv(self.signal()) -> _ => Err(MigrationError::Cancelled.into()),
        }
    }

    /// Takes the first recorded error, if any.
    pub fn take_error(&self) -> Option<anyhow::Error> {
        self.inner.first_error.lock().take()
    }
}

impl CancellationToken {
    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::Acquire)
    }

    /// Returns [`MigrationError::Cancelled`] once the pass has been aborted.
    pub fn check(&self) -> anyhow::Result<()> {
        if self.is_cancelled() {
            Err(MigrationError::Cancelled.into())
        } else {
            Ok(())
        }
    }
}
