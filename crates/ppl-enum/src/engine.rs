//! Enumeration engine: a single dispatch loop over the steps returned by the program.

use std::rc::Rc;

use ppl_core::errors::ErrorInfo;
use ppl_core::{EnumError, Erp};
use serde::Serialize;
use tracing::{debug, trace};

use crate::config::{EnumerateConfig, Strategy};
use crate::frontier::{frontier_for, Frontier, Scored};
use crate::handler::HandlerStack;
use crate::marginal::MarginalBuilder;
use crate::report::{Enumeration, EnumerationReport};
use crate::state::BranchState;
use crate::step::{ExtraScore, MarginalContinuation, Program, Resumption, Step};

/// Per-run state of one enumeration, nested or not.
struct Frame<S, V> {
    config: EnumerateConfig,
    running_score: f64,
    accumulator: MarginalBuilder<V>,
    completed: usize,
    expansions: usize,
    max_frontier_len: usize,
    frontier: Box<dyn Frontier<BranchState<S, V>>>,
    saved_store: S,
    continuation: Option<MarginalContinuation<S, V>>,
}

impl<S, V> Frame<S, V>
where
    S: Clone + 'static,
    V: Clone + Serialize + 'static,
{
    fn new(
        config: EnumerateConfig,
        saved_store: S,
        continuation: Option<MarginalContinuation<S, V>>,
    ) -> Self {
        let frontier = frontier_for(config.strategy);
        Self {
            config,
            running_score: 0.0,
            accumulator: MarginalBuilder::new(),
            completed: 0,
            expansions: 0,
            max_frontier_len: 0,
            frontier,
            saved_store,
            continuation,
        }
    }

    fn branch_on_choice(
        &mut self,
        store: S,
        resumption: Resumption<S, V>,
        erp: &dyn Erp<V>,
        params: &[f64],
        extra_score: Option<ExtraScore<V>>,
    ) -> Result<(), EnumError> {
        let support = erp.support(params).ok_or_else(|| {
            EnumError::UnsupportedDistribution(
                ErrorInfo::new(
                    "unsupported-erp",
                    "enumeration requires a distribution with finite support",
                )
                .with_context("erp", erp.name())
                .with_context("params", format!("{params:?}")),
            )
        })?;
        if support.is_empty() {
            return Err(EnumError::EmptySupport(
                ErrorInfo::new("empty-support", "choice point enumerated an empty support")
                    .with_context("erp", erp.name())
                    .with_context("params", format!("{params:?}")),
            ));
        }

        let arity = support.len();
        for value in support {
            let extra = extra_score.as_ref().map_or(0.0, |score| score(&value));
            let path_score = self.running_score + erp.score(params, &value) + extra;
            self.frontier.insert(BranchState::new(
                Rc::clone(&resumption),
                value,
                path_score,
                store.clone(),
            ));
        }
        self.expansions += 1;
        self.max_frontier_len = self.max_frontier_len.max(self.frontier.len());
        trace!(
            erp = erp.name(),
            arity,
            frontier = self.frontier.len(),
            "expanded choice point"
        );
        Ok(())
    }

    fn apply_weight(&mut self, log_weight: f64) {
        self.running_score += log_weight;
    }

    fn next_branch(&mut self) -> Result<BranchState<S, V>, EnumError> {
        let state = self.frontier.remove_next()?;
        self.running_score = state.path_score();
        Ok(state)
    }

    fn complete_path(&mut self, value: &V) -> Result<(), EnumError> {
        if self.running_score != f64::NEG_INFINITY {
            self.accumulator
                .accumulate(value, self.running_score.exp())?;
        }
        self.completed += 1;
        trace!(
            score = self.running_score,
            completed = self.completed,
            pending = self.frontier.len(),
            "completed execution"
        );
        Ok(())
    }

    fn has_next(&self) -> bool {
        !self.frontier.is_empty() && self.config.allows(self.completed)
    }

    fn finish(mut self) -> (S, Option<MarginalContinuation<S, V>>, Enumeration<V>) {
        let discarded_states = self.frontier.discard();
        let report = EnumerationReport {
            strategy: self.frontier.strategy(),
            max_executions: self.config.max_executions,
            completed_executions: self.completed,
            discarded_states,
            expansions: self.expansions,
            max_frontier_len: self.max_frontier_len,
            exhausted: discarded_states == 0,
        };
        let enumeration = Enumeration {
            marginal: self.accumulator.build(),
            report,
        };
        (self.saved_store, self.continuation, enumeration)
    }
}

/// Runs programs to completion under one [`EnumerateConfig`].
#[derive(Debug, Clone, Default)]
pub struct Enumerator {
    config: EnumerateConfig,
}

impl Enumerator {
    /// Creates an enumerator; the configuration is validated when a run starts.
    pub fn new(config: EnumerateConfig) -> Self {
        Self { config }
    }

    /// Settings applied to every run.
    pub fn config(&self) -> &EnumerateConfig {
        &self.config
    }

    /// Enumerates `program` from `store`, returning the original store and the result.
    pub fn run<S, V, P>(&self, store: S, program: P) -> Result<(S, Enumeration<V>), EnumError>
    where
        S: Clone + 'static,
        V: Clone + Serialize + 'static,
        P: FnOnce(S) -> Step<S, V> + 'static,
    {
        self.start(store, program, |store, enumeration| (store, enumeration))
    }

    /// Enumerates `program` and hands the original store and the result to `k`.
    pub fn start<S, V, P, K, R>(&self, store: S, program: P, k: K) -> Result<R, EnumError>
    where
        S: Clone + 'static,
        V: Clone + Serialize + 'static,
        P: FnOnce(S) -> Step<S, V> + 'static,
        K: FnOnce(S, Enumeration<V>) -> R,
    {
        let (store, enumeration) = drive(self.config.clone(), store, Box::new(program))?;
        Ok(k(store, enumeration))
    }
}

fn drive<S, V>(
    config: EnumerateConfig,
    store: S,
    program: Program<S, V>,
) -> Result<(S, Enumeration<V>), EnumError>
where
    S: Clone + 'static,
    V: Clone + Serialize + 'static,
{
    config.validate()?;
    let mut handlers = HandlerStack::new();
    let budget = config.max_executions;
    let root = handlers.install(Frame::new(config, store.clone(), None));
    let strategy = handlers.active_mut()?.frontier.strategy();
    debug!(
        frame = root.as_raw(),
        strategy = strategy.as_str(),
        budget = ?budget,
        "enumeration started"
    );
    let mut step = program(store);

    loop {
        step = match step {
            Step::Branch {
                store,
                resumption,
                erp,
                params,
                extra_score,
            } => {
                let frame = handlers.active_mut()?;
                frame.branch_on_choice(
                    store,
                    resumption,
                    &*erp,
                    &params,
                    extra_score,
                )?;
                frame.next_branch()?.resume()
            }
            Step::Weight {
                store,
                continuation,
                log_weight,
            } => {
                handlers.active_mut()?.apply_weight(log_weight);
                continuation(store)
            }
            Step::Complete { store: _, value } => {
                let frame = handlers.active_mut()?;
                frame.complete_path(&value)?;
                if frame.has_next() {
                    frame.next_branch()?.resume()
                } else {
                    let id = handlers.active().ok_or_else(|| {
                        EnumError::Handler(ErrorInfo::new(
                            "no-active-handler",
                            "execution completed with no enumeration installed",
                        ))
                    })?;
                    let (frame, parent) = handlers.restore(id)?;
                    let (saved_store, continuation, enumeration) = frame.finish();
                    debug!(
                        frame = id.as_raw(),
                        parent = ?parent.map(|parent| parent.as_raw()),
                        strategy = enumeration.report.strategy.as_str(),
                        completed = enumeration.report.completed_executions,
                        discarded = enumeration.report.discarded_states,
                        exhausted = enumeration.report.exhausted,
                        "enumeration finished"
                    );
                    match continuation {
                        Some(k) => k(saved_store, enumeration.marginal),
                        None => return Ok((saved_store, enumeration)),
                    }
                }
            }
            Step::Enumerate {
                store,
                config,
                program,
                continuation,
            } => {
                config.validate()?;
                let id = handlers.install(Frame::new(config, store.clone(), Some(continuation)));
                let strategy = handlers.active_mut()?.frontier.strategy();
                debug!(
                    frame = id.as_raw(),
                    depth = handlers.depth(),
                    strategy = strategy.as_str(),
                    "nested enumeration started"
                );
                            program(store)
            }
        };
    }
}

fn run_with<S, V, P>(
    strategy: Strategy,
    store: S,
    program: P,
    max_executions: Option<usize>,
) -> Result<(S, Enumeration<V>), EnumError>
where
    S: Clone + 'static,
    V: Clone + Serialize + 'static,
    P: FnOnce(S) -> Step<S, V> + 'static,
{
    let config = EnumerateConfig {
        strategy,
        max_executions,
    };
    Enumerator::new(config).run(store, program)
}

/// Enumerates with the default ordering (most probable first).
pub fn enumerate<S, V, P>(
    store: S,
    program: P,
    max_executions: Option<usize>,
) -> Result<(S, Enumeration<V>), EnumError>
where
    S: Clone + 'static,
    V: Clone + Serialize + 'static,
    P: FnOnce(S) -> Step<S, V> + 'static,
{
    run_with(Strategy::MostProbableFirst, store, program, max_executions)
}

/// Enumerates highest-scoring branches first.
pub fn enumerate_likely_first<S, V, P>(
    store: S,
    program: P,
    max_executions: Option<usize>,
) -> Result<(S, Enumeration<V>), EnumError>
where
    S: Clone + 'static,
    V: Clone + Serialize + 'static,
    P: FnOnce(S) -> Step<S, V> + 'static,
{
    run_with(Strategy::MostProbableFirst, store, program, max_executions)
}

/// Enumerates branches in the order they were created.
pub fn enumerate_breadth_first<S, V, P>(
    store: S,
    program: P,
    max_executions: Option<usize>,
) -> Result<(S, Enumeration<V>), EnumError>
where
    S: Clone + 'static,
    V: Clone + Serialize + 'static,
    P: FnOnce(S) -> Step<S, V> + 'static,
{
    run_with(Strategy::BreadthFirst, store, program, max_executions)
}

/// Enumerates the most recently created branch first.
pub fn enumerate_depth_first<S, V, P>(
    store: S,
    program: P,
    max_executions: Option<usize>,
) -> Result<(S, Enumeration<V>), EnumError>
where
    S: Clone + 'static,
    V: Clone + Serialize + 'static,
    P: FnOnce(S) -> Step<S, V> + 'static,
{
    run_with(Strategy::DepthFirst, store, program, max_executions)
}
