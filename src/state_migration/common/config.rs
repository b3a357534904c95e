// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::errors::MigrationError;

const MAX_WORKERS_ENV: &str = "FOREST_STATE_MIGRATION_MAX_WORKERS";
const JOB_QUEUE_SIZE_ENV: &str = "FOREST_STATE_MIGRATION_JOB_QUEUE_SIZE";
const RESULT_QUEUE_SIZE_ENV: &str = "FOREST_STATE_MIGRATION_RESULT_QUEUE_SIZE";
const PROGRESS_LOG_PERIOD_ENV: &str = "FOREST_STATE_MIGRATION_PROGRESS_LOG_PERIOD";

/// Parameterizes a state tree migration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Number of migration workers. More workers enables higher CPU
    /// utilization doing migration computations (including state encoding).
    pub max_workers: usize,
    /// Capacity of the queue of jobs available to workers (zero for unbuffered).
    /// A queue length of hundreds to thousands improves throughput at the cost of memory.
    pub job_queue_size: usize,
    /// Capacity of the queue receiving migration results from workers, for
    /// persisting (zero for unbuffered).
    pub result_queue_size: usize,
    /// Time between progress logs. Zero results in no progress logs.
    pub progress_log_period: Duration,
}

impl Default for Config {
    fn default() -> Self {
        let max_workers = num_cpus::get();
        Self {
            max_workers,
            job_queue_size: max_workers / 2,
            result_queue_size: max_workers / 2,
            progress_log_period: Duration::ZERO,
        }
    }
}

impl Config {
    /// Default config with overrides read from `FOREST_STATE_MIGRATION_*`
    /// environment variables. Malformed values are ignored.
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            max_workers: env_or(MAX_WORKERS_ENV, default.max_workers),
            job_queue_size: env_or(JOB_QUEUE_SIZE_ENV, default.job_queue_size),
            result_queue_size: env_or(RESULT_QUEUE_SIZE_ENV, default.result_queue_size),
            progress_log_period: std::env::var(PROGRESS_LOG_PERIOD_ENV)
                .ok()
                .and_then(|v| match humantime::parse_duration(&v) {
                    Ok(period) => Some(period),
                    Err(e) => {
                        tracing::warn!("Invalid {PROGRESS_LOG_PERIOD_ENV} value {v}: {e}");
                        None
                    }
                })
                .unwrap_or(default.progress_log_period),
        }
    }

    pub fn validate(&self) -> Result<(), MigrationError> {
        if self.max_workers == 0 {
            return Err(MigrationError::InvalidConfig {
                max_workers: self.max_workers,
            });
        }
        Ok(())
    }

    pub fn with_max_workers(mut self, max_workers: usize) -> Self {
        self.max_workers = max_workers;
        self
    }

    pub fn with_queue_sizes(mut self, job_queue_size: usize, result_queue_size: usize) -> Self {
        self.job_queue_size = job_queue_size;
        self.result_queue_size = result_queue_size;
        self
    }

    pub fn with_progress_log_period(mut self, period: Duration) -> Self {
        self.progress_log_period = period;
        self
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| match v.parse::<T>() {
            Ok(parsed) => Some(parsed),
            Err(_) => {
                tracing::warn!("Invalid {key} value {v}. A non-negative integer is expected.");
                None
            }
        })
        .unwrap_or(default)
}
