// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use std::convert::Infallible;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, select};
use tracing::Level;

use super::logger::Logger;
use super::scope::MigrationScope;

/// Job counters shared by the dispatcher, the workers and the monitor.
#[derive(Debug, Default)]
pub(super) struct Progress {
    pub jobs: AtomicU64,
    pub done: AtomicU64,
}

impl Progress {
    pub fn log(&self, logger: &dyn Logger, started: Instant) {
        let jobs = self.jobs.load(Ordering::Relaxed);
        let done = self.done.load(Ordering::Relaxed);
        let elapsed = started.elapsed();
        let rate = done as f64 / elapsed.as_secs_f64().max(f64::EPSILON);
        logger.log(
            Level::INFO,
            format_args!(
                "{jobs} jobs created, {done} done, {pending} pending after {elapsed} ({rate:.0}/s)",
                pending = jobs.saturating_sub(done),
                elapsed = humantime::format_duration(truncate_to_millis(elapsed)),
            ),
        );
    }
}

/// Logs progress every `period` until `finished` disconnects (all workers
/// have exited) or the scope is cancelled.
pub(super) fn monitor(
    progress: &Progress,
    logger: &dyn Logger,
    period: Duration,
    started: Instant,
    finished: &Receiver<Infallible>,
    scope: &MigrationScope,
) {
    let ticker = crossbeam_channel::tick(period);
    loop {
        select! {
            recv(ticker) -> _ => progress.log(logger, started),
            recv(finished) -> _ => break,
            recv(scope.signal()) -> _ => break,
        }
    }
    logger.log(Level::DEBUG, format_args!("Job queue monitor done"));
}

/// Drops the sub-millisecond part, which only adds noise to logs.
pub(super) fn truncate_to_millis(d: Duration) -> Duration {
    Duration::from_millis(d.as_millis() as u64)
}
