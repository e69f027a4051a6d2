//! Bounded-parallel execution of units
//!
//! One task per unit; a semaphore of `parallel` permits bounds how many run
//! the resolve → checksum → lookup → run → commit → evict sequence at once.
//! `run_all` returns only after every task has finished, so callers can
//! merge fragments safely afterwards.
//!
//! Failure policy: the first failing unit aborts its siblings (their child
//! processes are killed on drop) and its error is returned. Fragments
//! committed before the failure stay on disk; an interrupted run leaves at
//! most a `.partial` file, which is never treated as a hit.

use crate::cache::{checksum_dir, CacheStore, Checksum, UnitKey};
use crate::error::{CovcacheError, CovcacheResult};
use crate::runner::UnitRunner;
use crate::units::{Unit, UnitSource};
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info};

/// What happened to a single unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnitStatus {
    /// Fragment for the current checksum already existed
    Hit,
    /// Verification ran and its fragment was committed
    Ran {
        stdout: String,
        /// Stale fragments removed afterwards
        evicted: Vec<PathBuf>,
    },
}

/// Result of processing one unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitOutcome {
    pub unit: Unit,
    pub checksum: Checksum,
    pub status: UnitStatus,
}

impl UnitOutcome {
    pub fn is_hit(&self) -> bool {
        matches!(self.status, UnitStatus::Hit)
    }
}

/// Outcomes of a whole invocation, in completion order
#[derive(Debug, Default)]
pub struct RunSummary {
    pub outcomes: Vec<UnitOutcome>,
}

impl RunSummary {
    pub fn hits(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_hit()).count()
    }

    pub fn ran(&self) -> usize {
        self.outcomes.len() - self.hits()
    }
}

/// Fans units out to a bounded worker pool
pub struct Coordinator {
    store: Arc<CacheStore>,
    source: Arc<dyn UnitSource>,
    runner: Arc<dyn UnitRunner>,
    parallel: usize,
}

impl Coordinator {
    /// `parallel` is clamped to at least one
    pub fn new(
        store: Arc<CacheStore>,
        source: Arc<dyn UnitSource>,
        runner: Arc<dyn UnitRunner>,
        parallel: usize,
    ) -> Self {
        Self {
            store,
            source,
            runner,
            parallel: parallel.max(1),
        }
    }

    pub fn parallel(&self) -> usize {
        self.parallel
    }

    /// Process every unit and wait for all of them.
    ///
    /// `on_complete` is called once per finished unit, in completion order.
    /// Repeated identifiers are processed once.
    pub async fn run_all<F>(
        &self,
        mut units: Vec<String>,
        on_complete: F,
    ) -> CovcacheResult<RunSummary>
    where
        F: Fn(&UnitOutcome),
    {
        self.store.ensure_dir().await?;

        // Two tasks on one key would race on its `.partial` file
        let mut seen = HashSet::new();
        units.retain(|id| seen.insert(id.clone()));

        let semaphore = Arc::new(Semaphore::new(self.parallel));
        let mut join_set = JoinSet::new();

        info!(
            "Processing {} units with up to {} in parallel",
            units.len(),
            self.parallel
        );

        for id in units {
            let semaphore = Arc::clone(&semaphore);
            let store = Arc::clone(&self.store);
            let source = Arc::clone(&self.source);
            let runner = Arc::clone(&self.runner);

            join_set.spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .map_err(|e| CovcacheError::Internal(format!("worker pool closed: {e}")))?;
                process_unit(&store, source.as_ref(), runner.as_ref(), id).await
            });
        }

        let mut summary = RunSummary::default();
        while let Some(joined) = join_set.join_next().await {
            let result = joined.map_err(|e| CovcacheError::Internal(format!("unit task failed: {e}")));
            match result.and_then(|r| r) {
                Ok(outcome) => {
                    on_complete(&outcome);
                    summary.outcomes.push(outcome);
                }
                Err(e) => {
                    debug!("Aborting {} in-flight units after failure", join_set.len());
                    join_set.abort_all();
                    while join_set.join_next().await.is_some() {}
                    return Err(e);
                }
            }
        }

        info!("{} cached, {} verified", summary.hits(), summary.ran());
        Ok(summary)
    }
}

async fn process_unit(
    store: &CacheStore,
    source: &dyn UnitSource,
    runner: &dyn UnitRunner,
    id: String,
) -> CovcacheResult<UnitOutcome> {
    let key = UnitKey::encode(&id)?;
    let dir = source.resolve(&id).await?;

    let checksum = {
        let dir = dir.clone();
        tokio::task::spawn_blocking(move || checksum_dir(&dir))
            .await
            .map_err(|e| CovcacheError::Internal(format!("checksum task failed: {e}")))??
    };
    let unit = Unit { id, dir };

    if store.lookup(&key, &checksum).await? {
        debug!("{} unchanged ({}), fragment exists", unit.id, checksum.short());
        return Ok(UnitOutcome {
            unit,
            checksum,
            status: UnitStatus::Hit,
        });
    }

    debug!("{} changed ({}), running {}", unit.id, checksum.short(), runner.runner_name());
    store.discard_partial(&key, &checksum).await?;
    let partial = store.partial_path(&key, &checksum);
    let output = runner.run(&unit, &partial).await?;
    store.commit(&key, &checksum).await?;
    let evicted = store.evict_stale(&key, &checksum).await?;

    Ok(UnitOutcome {
        unit,
        checksum,
        status: UnitStatus::Ran {
            stdout: output.stdout,
            evicted,
        },
    })
}
