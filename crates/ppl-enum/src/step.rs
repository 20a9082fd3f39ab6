//! Continuation protocol between a program and the engine.
//!
//! A program never calls the engine. Each decision point returns a [`Step`]
//! describing what it needs, together with the continuation that carries the
//! rest of the computation, and the engine's dispatch loop decides what runs next.

use std::fmt;
use std::rc::Rc;

use ppl_core::Erp;

use crate::config::EnumerateConfig;
use crate::marginal::Marginal;

/// Continuation resumed once per support value of a choice point.
pub type Resumption<S, V> = Rc<dyn Fn(S, V) -> Step<S, V>>;

/// Continuation resumed exactly once, after a weight adjustment.
pub type Continuation<S, V> = Box<dyn FnOnce(S) -> Step<S, V>>;

/// Continuation receiving the result of a nested enumeration.
pub type MarginalContinuation<S, V> = Box<dyn FnOnce(S, Marginal<V>) -> Step<S, V>>;

/// Entry point of an enumerated program.
pub type Program<S, V> = Box<dyn FnOnce(S) -> Step<S, V>>;

/// Extra log-weight applied per support value when ranking branches.
pub type ExtraScore<V> = Box<dyn Fn(&V) -> f64>;

/// Decision point reached by a running program.
pub enum Step<S, V> {
    /// Random choice: one branch per support value of `erp`.
    Branch {
        /// Environment at the choice point.
        store: S,
        /// Continuation receiving the chosen value.
        resumption: Resumption<S, V>,
        /// Distribution providing the support and scores.
        erp: Rc<dyn Erp<V>>,
        /// Distribution parameters.
        params: Vec<f64>,
        /// Optional per-value adjustment folded into each branch score.
        extra_score: Option<ExtraScore<V>>,
    },
    /// Soft conditioning: adds `log_weight` to the running score and continues.
    Weight {
        /// Environment at the factor statement.
        store: S,
        /// Rest of the computation.
        continuation: Continuation<S, V>,
        /// Log-weight added to the current path.
        log_weight: f64,
    },
    /// The program returned `value`.
    Complete {
        /// Environment at exit.
        store: S,
        /// Return value of this execution.
        value: V,
    },
    /// Enumerate `program` to completion and hand its marginal to `continuation`.
    Enumerate {
        /// Environment handed to the nested program and restored afterwards.
        store: S,
        /// Settings of the nested run.
        config: EnumerateConfig,
        /// The nested program.
        program: Program<S, V>,
        /// Rest of the outer computation.
        continuation: MarginalContinuation<S, V>,
    },
}

impl<S, V> fmt::Debug for Step<S, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Branch { erp, params, .. } => f
                .debug_struct("Branch")
                .field("erp", &erp.name())
                .field("params", params)
                .finish_non_exhaustive(),
            Step::Weight { log_weight, .. } => f
                .debug_struct("Weight")
                .field("log_weight", log_weight)
                .finish_non_exhaustive(),
            Step::Complete { .. } => f.debug_struct("Complete").finish_non_exhaustive(),
            Step::Enumerate { config, .. } => f
                .debug_struct("Enumerate")
                .field("config", config)
                .finish_non_exhaustive(),
        }
    }
}

/// Branches over the support of `erp`, resuming `k` with each value.
pub fn sample<S, V, E, K>(store: S, erp: E, params: &[f64], k: K) -> Step<S, V>
where
    E: Erp<V> + 'static,
    K: Fn(S, V) -> Step<S, V> + 'static,
{
    Step::Branch {
        store,
        resumption: Rc::new(k),
        erp: Rc::new(erp),
        params: params.to_vec(),
        extra_score: None,
    }
}

/// Like [`sample`], with `extra` added to each branch score to steer exploration.
pub fn sample_with_score<S, V, E, X, K>(
    store: S,
    erp: E,
    params: &[f64],
    extra: X,
    k: K,
) -> Step<S, V>
where
    E: Erp<V> + 'static,
    X: Fn(&V) -> f64 + 'static,
    K: Fn(S, V) -> Step<S, V> + 'static,
{
    Step::Branch {
        store,
        resumption: Rc::new(k),
        erp: Rc::new(erp),
        params: params.to_vec(),
        extra_score: Some(Box::new(extra)),
    }
}

/// Adds `log_weight` to the current path and continues with `k`.
pub fn factor<S, V, K>(store: S, log_weight: f64, k: K) -> Step<S, V>
where
    K: FnOnce(S) -> Step<S, V> + 'static,
{
    Step::Weight {
        store,
        continuation: Box::new(k),
        log_weight,
    }
}

/// Completes the current execution with `value`.
pub fn exit<S, V>(store: S, value: V) -> Step<S, V> {
    Step::Complete { store, value }
}

/// Runs `program` as a nested enumeration and passes its marginal to `k`.
pub fn enumerate_nested<S, V, P, K>(store: S, config: EnumerateConfig, program: P, k: K) -> Step<S, V>
where
    P: FnOnce(S) -> Step<S, V> + 'static,
    K: FnOnce(S, Marginal<V>) -> Step<S, V> + 'static,
{
    Step::Enumerate {
        store,
        config,
        program: Box::new(program),
        continuation: Box::new(k),
    }
}
