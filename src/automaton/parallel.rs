//! Multi-worker evolution with boundary exchange.
//!
//! The grid is cut into contiguous shards in id order, one per worker. Each
//! worker runs on its own thread of a dedicated rayon pool and owns its cells
//! outright; the only data crossing workers are copies of boundary states sent
//! over channels.
//!
//! Per step the coordinator sends `Step(n)` to every worker. A worker evolves
//! its shard, publishes the step-n states its neighbors hold ghosts of,
//! receives theirs, and reports back. Step n + 1 is only issued once all
//! workers reported step n, so no worker can run ahead of any other.
//!
//! A worker that fails reports the error and exits; the disconnect fails its
//! peers in turn. The coordinator then poisons the strategy.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::ops::Range;
use std::sync::Arc;

use crossbeam_channel::{unbounded, Receiver, Sender};
use tracing::{debug, error, trace};

use super::grid::Grid;
use super::shard::Shard;
use super::EvolutionStrategy;
use crate::cell::Cell;
use crate::config::ActivityMode;
use crate::error::{AutomatonError, Result};
use crate::rule::Rule;

#[derive(Debug, Clone, Copy)]
enum Command {
    Step(u64),
    Snapshot,
    AcknowledgeRedraw,
    Shutdown,
}

enum Report<V> {
    Stepped { step: u64, evaluated: usize },
    Cells(Vec<Cell<V>>),
    Redrawn,
    Failed(AutomatonError),
}

struct BoundaryUpdate<V> {
    step: u64,
    states: Vec<Vec<V>>,
}

/// Owned cells another shard keeps ghosts of.
struct Publication<V> {
    subscriber: usize,
    locals: Vec<usize>,
    tx: Sender<BoundaryUpdate<V>>,
}

/// Ghosts fed by another shard, in the publisher's sending order.
struct Subscription<V> {
    publisher: usize,
    ghosts: Vec<usize>,
    rx: Receiver<BoundaryUpdate<V>>,
}

struct Worker<R: Rule> {
    index: usize,
    rule: Arc<R>,
    shard: Shard<R::Value>,
    activity: ActivityMode,
    publications: Vec<Publication<R::Value>>,
    subscriptions: Vec<Subscription<R::Value>>,
    commands: Receiver<Command>,
    reports: Sender<Report<R::Value>>,
}

impl<R: Rule> Worker<R> {
    fn run(mut self) {
        debug!(
            shard = self.index,
            ids = ?self.shard.owned(),
            ghosts = self.shard.ghost_ids().count(),
            "worker started"
        );

        while let Ok(command) = self.commands.recv() {
            let report = match command {
                Command::Step(step) => match self.step(step) {
                    Ok(evaluated) => Report::Stepped { step, evaluated },
                    Err(err) => {
                        error!(shard = self.index, step, %err, "worker step failed");
                        let _ = self.reports.send(Report::Failed(err));
                        return;
                    }
                },
                Command::Snapshot => Report::Cells(self.shard.cells().to_vec()),
                Command::AcknowledgeRedraw => {
                    for cell in self.shard.cells_mut() {
                        cell.was_redrawn();
                    }
                    Report::Redrawn
                }
                Command::Shutdown => break,
            };

            if self.reports.send(report).is_err() {
                break;
            }
        }

        debug!(shard = self.index, "worker stopped");
    }

    fn step(&mut self, step: u64) -> Result<usize> {
        let evaluated = self.shard.evolve(&*self.rule, step, self.activity)?;

        for publication in &self.publications {
            let states = self.shard.boundary_states(step, &publication.locals);
            publication
                .tx
                .send(BoundaryUpdate { step, states })
                .map_err(|_| AutomatonError::WorkerFailed {
                    shard: publication.subscriber,
                })?;
        }

        for subscription in &self.subscriptions {
            let update = subscription
                .rx
                .recv()
                .map_err(|_| AutomatonError::WorkerFailed {
                    shard: subscription.publisher,
                })?;
            debug_assert_eq!(update.step, step);
            self.shard
                .apply_ghost_states(step, &subscription.ghosts, update.states, self.activity)?;
        }

        trace!(shard = self.index, step, evaluated, "boundary exchanged");
        Ok(evaluated)
    }
}

struct WorkerHandle<V> {
    commands: Sender<Command>,
    reports: Receiver<Report<V>>,
}

/// Strategy that evolves one shard per worker thread.
pub struct ParallelEvolution<V> {
    workers: Vec<WorkerHandle<V>>,
    _pool: rayon::ThreadPool,
    poisoned: bool,
}

/// Contiguous, near-equal id ranges covering `0..size`.
fn shard_ranges(size: usize, workers: usize) -> Vec<Range<usize>> {
    (0..workers)
        .map(|k| k * size / workers..(k + 1) * size / workers)
        .collect()
}

impl<V> ParallelEvolution<V>
where
    V: Clone + PartialEq + Send + 'static,
{
    pub(crate) fn new<R>(
        rule: Arc<R>,
        grid: Grid<V>,
        workers: usize,
        activity: ActivityMode,
    ) -> Result<Self>
    where
        R: Rule<Value = V>,
    {
        let size = grid.cells.len();
        if workers == 0 {
            return Err(AutomatonError::InvalidWorkerCount(workers));
        }
        if workers > size {
            return Err(AutomatonError::TooManyWorkers {
                workers,
                cells: size,
            });
        }

        let ranges = shard_ranges(size, workers);
        let shards: Vec<Shard<V>> = ranges
            .iter()
            .map(|range| Shard::partition(&grid.cells, range.clone(), &grid.dependents))
            .collect();
        drop(grid);

        let owner = |id: usize| ranges.partition_point(|range| range.end <= id);
        let mut publications: Vec<Vec<Publication<V>>> = (0..workers).map(|_| Vec::new()).collect();
        let mut subscriptions: Vec<Vec<Subscription<V>>> = (0..workers).map(|_| Vec::new()).collect();

        for (subscriber, shard) in shards.iter().enumerate() {
            let mut by_publisher: BTreeMap<usize, (Vec<usize>, Vec<usize>)> = BTreeMap::new();
            for (ghost, id) in shard.ghost_ids().enumerate() {
                let publisher = owner(id);
                let (locals, ghosts) = by_publisher.entry(publisher).or_default();
                locals.push(id - ranges[publisher].start);
                ghosts.push(ghost);
            }

            for (publisher, (locals, ghosts)) in by_publisher {
                let (tx, rx) = unbounded();
                publications[publisher].push(Publication {
                    subscriber,
                    locals,
                    tx,
                });
                subscriptions[subscriber].push(Subscription {
                    publisher,
                    ghosts,
                    rx,
                });
            }
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("ca-worker-{i}"))
            .panic_handler(|_| error!("automaton worker panicked"))
            .build()
            .map_err(|err| AutomatonError::ThreadPool(err.to_string()))?;

        let mut handles = Vec::with_capacity(workers);
        let wiring = shards.into_iter().zip(publications).zip(subscriptions);
        for (index, ((shard, publications), subscriptions)) in wiring.enumerate() {
            let (command_tx, command_rx) = unbounded();
            let (report_tx, report_rx) = unbounded();
            let worker = Worker {
                index,
                rule: Arc::clone(&rule),
                shard,
                activity,
                publications,
                subscriptions,
                commands: command_rx,
                reports: report_tx,
            };
            pool.spawn(move || worker.run());
            handles.push(WorkerHandle {
                commands: command_tx,
                reports: report_rx,
            });
        }

        Ok(Self {
            workers: handles,
            _pool: pool,
            poisoned: false,
        })
    }

    /// Send `command` to every worker and collect one report from each, in
    /// shard order. Any failure poisons the strategy.
    fn round_trip(&mut self, command: Command) -> Result<Vec<Report<V>>> {
        if self.poisoned {
            return Err(AutomatonError::Poisoned);
        }

        let mut failures = Vec::new();
        for (shard, worker) in self.workers.iter().enumerate() {
            if worker.commands.send(command).is_err() {
                failures.push(AutomatonError::WorkerFailed { shard });
            }
        }

        let mut reports = Vec::with_capacity(self.workers.len());
        for (shard, worker) in self.workers.iter().enumerate() {
            match worker.reports.recv() {
                Ok(Report::Failed(err)) => failures.push(err),
                Ok(report) => reports.push(report),
                Err(_) => failures.push(AutomatonError::WorkerFailed { shard }),
            }
        }

        if failures.is_empty() {
            return Ok(reports);
        }

        self.poisoned = true;
        error!(?command, ?failures, "worker failure, automaton poisoned");
        // the root cause beats the disconnects it caused
        let root = failures
            .iter()
            .position(|err| !matches!(err, AutomatonError::WorkerFailed { .. }))
            .unwrap_or(0);
        Err(failures.swap_remove(root))
    }
}

impl<V> EvolutionStrategy<V> for ParallelEvolution<V>
where
    V: Clone + PartialEq + Send + 'static,
{
    fn evolve(&mut self, step: u64) -> Result<()> {
        let reports = self.round_trip(Command::Step(step))?;
        let evaluated: usize = reports
            .iter()
            .map(|report| match report {
                Report::Stepped {
                    step: reported,
                    evaluated,
                } => {
                    debug_assert_eq!(*reported, step);
                    *evaluated
                }
                _ => 0,
            })
            .sum();
        trace!(step, evaluated, workers = self.workers.len(), "parallel step");
        Ok(())
    }

    fn cells(&mut self) -> Result<Cow<'_, [Cell<V>]>> {
        let reports = self.round_trip(Command::Snapshot)?;
        let mut cells = Vec::new();
        for report in reports {
            if let Report::Cells(shard_cells) = report {
                cells.extend(shard_cells);
            }
        }
        Ok(Cow::Owned(cells))
    }

    fn mark_redrawn(&mut self) -> Result<()> {
        self.round_trip(Command::AcknowledgeRedraw)?;
        Ok(())
    }

    fn worker_count(&self) -> usize {
        self.workers.len()
    }
}

impl<V> Drop for ParallelEvolution<V> {
    fn drop(&mut self) {
        for worker in &self.workers {
            let _ = worker.commands.send(Command::Shutdown);
        }
        // a worker's report channel closes once it has exited
        for worker in &self.workers {
            while worker.reports.recv().is_ok() {}
        }
        debug!(workers = self.workers.len(), "workers shut down");
    }
}
