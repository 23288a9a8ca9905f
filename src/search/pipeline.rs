// src/search/pipeline.rs

//! Type-ahead search pipeline.
//!
//! ```text
//! submit(term) ──▶ debounce ──▶ distinct-adjacent ──▶ switch-dispatch ──▶ results
//!                  (quiet period)  (vs. last emitted)    (newest generation only)
//! ```
//!
//! One coordinator task owns all pipeline state and is driven by the input
//! channel, the debounce deadline and a completion channel. Searches run in
//! their own tasks and report back to the coordinator, which forwards a result
//! only if no newer search has been dispatched since. Superseded searches are
//! not aborted; their results are dropped when they arrive.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep_until};

use crate::error::{AppError, Result};
use crate::models::{Hero, SearchConfig};
use crate::search::Searcher;
use crate::search::stages::{Debouncer, DistinctAdjacent, GenerationGuard};

/// Deadline used while nothing is pending; the branch is disabled then.
const IDLE: Duration = Duration::from_secs(3600);

/// Results for one dispatched term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResults {
    pub term: String,
    pub heroes: Vec<Hero>,
}

/// Handle to a running search pipeline.
///
/// Must be created inside a tokio runtime.
pub struct SearchPipeline {
    terms: UnboundedSender<String>,
    worker: JoinHandle<()>,
}

impl SearchPipeline {
    /// Start a pipeline using the configured debounce period.
    pub fn spawn(
        searcher: Arc<dyn Searcher>,
        config: &SearchConfig,
    ) -> (Self, UnboundedReceiver<SearchResults>) {
        Self::with_debounce(searcher, config.debounce())
    }

    /// Start a pipeline with an explicit debounce period.
    pub fn with_debounce(
        searcher: Arc<dyn Searcher>,
        quiet: Duration,
    ) -> (Self, UnboundedReceiver<SearchResults>) {
        let (terms_tx, terms_rx) = mpsc::unbounded_channel();
        let (results_tx, results_rx) = mpsc::unbounded_channel();
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();

        let coordinator = Coordinator {
            searcher,
            debouncer: Debouncer::new(quiet),
            distinct: DistinctAdjacent::new(),
            generations: GenerationGuard::new(),
            awaiting: false,
            results: results_tx,
            completions: completions_tx,
        };
        let worker = tokio::spawn(coordinator.run(terms_rx, completions_rx));

        (
            Self {
                terms: terms_tx,
                worker,
            },
            results_rx,
        )
    }

    /// Submit a raw query term, typically one per keystroke.
    pub fn submit(&self, term: impl Into<String>) -> Result<()> {
        self.terms
            .send(term.into())
            .map_err(|_| AppError::PipelineClosed)
    }

    /// Stop accepting input and wait for the pipeline to drain.
    ///
    /// A term still inside its quiet period is searched right away, and the
    /// newest search is awaited before the results stream ends. Without
    /// `api.timeout_secs` a hung backend keeps that wait open until the
    /// results receiver is dropped.
    pub async fn close(self) {
        let Self { terms, worker } = self;
        drop(terms);
        if let Err(e) = worker.await {
            log::error!("Search pipeline task failed: {}", e);
        }
    }
}

struct Completion {
    generation: u64,
    term: String,
    heroes: Vec<Hero>,
}

struct Coordinator {
    searcher: Arc<dyn Searcher>,
    debouncer: Debouncer,
    distinct: DistinctAdjacent,
    generations: GenerationGuard,
    /// The newest dispatched search has not reported back yet
    awaiting: bool,
    results: UnboundedSender<SearchResults>,
    completions: UnboundedSender<Completion>,
}

impl Coordinator {
    async fn run(
        mut self,
        mut terms: UnboundedReceiver<String>,
        mut completions: UnboundedReceiver<Completion>,
    ) {
        let mut input_open = true;
        let listener = self.results.clone();

        loop {
            if !input_open && !self.debouncer.is_pending() && !self.awaiting {
                break;
            }

            let deadline = self
                .debouncer
                .deadline()
                .unwrap_or_else(|| Instant::now() + IDLE);

            tokio::select! {
                term = terms.recv(), if input_open => match term {
                    Some(term) => self.debouncer.push(term, Instant::now()),
                    None => {
                        input_open = false;
                        if let Some(term) = self.debouncer.flush() {
                            self.dispatch(term);
                        }
                    }
                },
                _ = sleep_until(deadline), if self.debouncer.is_pending() => {
                    if let Some(term) = self.debouncer.take_due(Instant::now()) {
                        self.dispatch(term);
                    }
                }
                Some(done) = completions.recv() => {
                    if !self.complete(done) {
                        log::debug!("Search results receiver dropped, stopping pipeline");
                        break;
                    }
                }
                _ = listener.closed() => {
                    log::debug!("Search results receiver dropped, stopping pipeline");
                    break;
                }
            }
        }
    }

    /// Pass a debounced term through distinct-adjacent and start its search.
    fn dispatch(&mut self, term: String) {
        if !self.distinct.admit(&term) {
            log::debug!("Skipping repeated search term {:?}", term);
            return;
        }

        let generation = self.generations.advance();
        self.awaiting = true;
        log::debug!("Dispatching search {} for {:?}", generation, term);

        let searcher = Arc::clone(&self.searcher);
        let completions = self.completions.clone();
        tokio::spawn(async move {
            let heroes = searcher.search(&term).await;
            // The coordinator may already be gone; nothing to report to then.
            let _ = completions.send(Completion {
                generation,
                term,
                heroes,
            });
        });
    }

    /// Forward a finished search if it is still the newest one.
    ///
    /// Returns `false` once nobody is listening for results.
    fn complete(&mut self, done: Completion) -> bool {
        if !self.generations.is_current(done.generation) {
            log::debug!(
                "Discarding stale results for {:?} (search {}, current {})",
                done.term,
                done.generation,
                self.generations.current()
            );
            return true;
        }

        self.awaiting = false;
        self.results
            .send(SearchResults {
                term: done.term,
                heroes: done.heroes,
            })
            .is_ok()
    }
}
