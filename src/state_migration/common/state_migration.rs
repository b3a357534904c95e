// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use std::convert::Infallible;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use crate::shim::{clock::ChainEpoch, state_tree::StateTree};
use ahash::{HashMap, HashSet};
use anyhow::Context as _;
use cid::Cid;
use fvm_ipld_blockstore::Blockstore;
use tracing::Level;

use super::config::Config;
use super::errors::MigrationError;
use super::logger::Logger;
use super::migration_job::{MigrationJob, MigrationJobOutput};
use super::progress::{self, Progress};
use super::scope::MigrationScope;
use super::{MigrationCache, Migrator};

/// Migration specification: maps every prior actor code CID to the migrator
/// producing its successor. Built once, then only read by the pass.
pub struct StateMigration<BS: Blockstore> {
    migrations: HashMap<Cid, Migrator<BS>>,
    /// Actors with these codes are skipped by the pass.
    deferred: HashSet<Cid>,
}

impl<BS: Blockstore> Default for StateMigration<BS> {
    fn default() -> Self {
        Self::new()
    }
}

impl<BS: Blockstore> StateMigration<BS> {
    pub fn new() -> Self {
        Self {
            migrations: HashMap::default(),
            deferred: HashSet::default(),
        }
    }

    /// Inserts a new migrator into the migration specification.
    pub fn add_migrator(&mut self, prior_cid: Cid, migrator: Migrator<BS>) {
        self.migrations.insert(prior_cid, migrator);
    }

    /// Marks a prior code CID as deferred: its actors are not migrated by the
    /// pass and do not appear in the output tree.
    pub fn add_deferred(&mut self, prior_cid: Cid) {
        self.deferred.insert(prior_cid);
    }

    pub fn migrator(&self, prior_cid: &Cid) -> Option<&Migrator<BS>> {
        self.migrations.get(prior_cid)
    }

    pub fn is_deferred(&self, prior_cid: &Cid) -> bool {
        self.deferred.contains(prior_cid)
    }

    /// Number of registered migrators, deferred codes excluded.
    pub fn len(&self) -> usize {
        self.migrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.migrations.is_empty()
    }

    /// Checks that migrators and deferred codes together cover all `expected`
    /// actor kinds of the prior version.
    pub fn verify_complete(&self, expected: usize) -> Result<(), MigrationError> {
        let (count, deferred) = (self.migrations.len(), self.deferred.len());
        if count + deferred != expected {
            return Err(MigrationError::IncompleteRegistry {
                count,
                deferred,
                expected,
            });
        }
        Ok(())
    }
}

impl<BS: Blockstore + Send + Sync> StateMigration<BS> {
    /// Migrates every actor of the tree rooted at `actors_root_in` and
    /// returns the root of the migrated tree.
    ///
    /// The result only depends on the input tree and the migrators, never on
    /// `config`. On failure nothing is flushed and the first error raised by
    /// any task of the pass is returned.
    pub fn migrate_state_tree(
        &self,
        store: &Arc<BS>,
        actors_root_in: &Cid,
        prior_epoch: ChainEpoch,
        config: &Config,
        logger: &dyn Logger,
        cache: Arc<dyn MigrationCache>,
    ) -> anyhow::Result<Cid> {
        config.validate()?;

        let actors_in = StateTree::new_from_root(store.clone(), actors_root_in)?;
        let mut actors_out = StateTree::new(store.clone());

        let threads = pool_threads(config.max_workers);
        tracing::info!(
            "Using {} workers for migration, job queue size {} and result queue size {}",
            config.max_workers,
            config.job_queue_size,
            config.result_queue_size
        );

        let pool = rayon::ThreadPoolBuilder::new()
            .thread_name(|id| format!("state migration thread: {id}"))
            .num_threads(threads)
            .build()
            .context("failed to build state migration thread pool")?;

        let scope = MigrationScope::new();
        let progress = Progress::default();
        let workers_done = AtomicUsize::new(0);
        let started = Instant::now();

        let (job_tx, job_rx) = crossbeam_channel::bounded(config.job_queue_size);
        let (result_tx, result_rx) = crossbeam_channel::bounded(config.result_queue_size);
        // disconnected once every worker has exited
        let (finished_tx, finished_rx) = crossbeam_channel::bounded::<Infallible>(0);

        pool.scope(|s| {
            let (scope, progress) = (&scope, &progress);

            s.spawn(move |_| {
                scope.run(|| {
                    logger.log(
                        Level::INFO,
                        format_args!("Creating migration jobs for tree {actors_root_in}"),
                    );
                    actors_in.for_each(|address, actor_state| {
                        if self.is_deferred(&actor_state.code) {
                            return Ok(());
                        }
                        let actor_migration = self
                            .migrator(&actor_state.code)
                            .ok_or(MigrationError::UnmappedCode {
                                code: actor_state.code,
                                address,
                            })?
                            .clone();
                        let job = MigrationJob {
                            address,
                            actor_state: actor_state.clone(),
                            actor_migration,
                            cache: cache.clone(),
                        };
                        progress.jobs.fetch_add(1, Ordering::Relaxed);
                        scope.send(&job_tx, job)?;
                        Ok(())
                    })
                    .with_context(|| {
                        format!("failed iterating actors of state tree {actors_root_in}")
                    })?;
                    logger.log(
                        Level::INFO,
                        format_args!(
                            "Done creating {} migration jobs for tree {actors_root_in} after {}",
                            progress.jobs.load(Ordering::Relaxed),
                            humantime::format_duration(progress::truncate_to_millis(
                                started.elapsed()
                            )),
                        ),
                    );
                    Ok(())
                });
                // closes the job stream
                drop(job_tx);
            });

            for worker in 0..config.max_workers {
                let (job_rx, result_tx, finished_tx) =
                    (job_rx.clone(), result_tx.clone(), finished_tx.clone());
                let workers_done = &workers_done;
                s.spawn(move |_| {
                    scope.run(|| {
                        while let Some(job) = scope.recv::<MigrationJob<BS>>(&job_rx)? {
                            let output = job.run(store, prior_epoch, scope.token())?;
                            scope.send(&result_tx, output)?;
                            progress.done.fetch_add(1, Ordering::Relaxed);
                        }
                        logger.log(Level::INFO, format_args!("Worker {worker} done"));
                        Ok(())
                    });
                    if workers_done.fetch_add(1, Ordering::AcqRel) + 1 == config.max_workers {
                        logger.log(
                            Level::INFO,
                            format_args!(
                                "All workers done after {}",
                                humantime::format_duration(progress::truncate_to_millis(
                                    started.elapsed()
                                )),
                            ),
                        );
                    }
                    drop((result_tx, finished_tx));
                });
            }
            drop((job_rx, result_tx, finished_tx));
            logger.log(
                Level::INFO,
                format_args!("Started {} workers", config.max_workers),
            );

            if !config.progress_log_period.is_zero() {
                let finished_rx = &finished_rx;
                s.spawn(move |_| {
                    progress::monitor(
                        progress,
                        logger,
                        config.progress_log_period,
                        started,
                        finished_rx,
                        scope,
                    )
                });
            }

            // the only writer of the output tree
            scope.run(|| {
                logger.log(Level::INFO, format_args!("Result writer started"));
                let mut written = 0u64;
                while let Some(MigrationJobOutput {
                    address,
                    actor_state,
                }) = scope.recv(&result_rx)?
                {
                    actors_out.set_actor(&address, actor_state).with_context(|| {
                        format!("failed setting new actor state at address {address}")
                    })?;
                    written += 1;
                }
                logger.log(
                    Level::INFO,
                    format_args!(
                        "Result writer wrote {written} results to state tree after {}",
                        humantime::format_duration(progress::truncate_to_millis(
                            started.elapsed()
                        )),
                    ),
                );
                Ok(())
            });
        });

        if let Some(err) = scope.take_error() {
            return Err(err);
        }

        logger.log(
            Level::INFO,
            format_args!(
                "All {} done after {} ({:.0}/s). Flushing state tree root.",
                progress.done.load(Ordering::Relaxed),
                humantime::format_duration(progress::truncate_to_millis(started.elapsed())),
                progress.done.load(Ordering::Relaxed) as f64
                    / started.elapsed().as_secs_f64().max(f64::EPSILON),
            ),
        );
        actors_out
            .flush()
            .context("failed to flush migrated state tree")
    }
}

/// Workers plus the dispatcher, the progress monitor and the result writer.
fn pool_threads(max_workers: usize) -> usize {
    max_workers.saturating_add(3)
}
