//! Run counters returned with every marginal.

use serde::{Deserialize, Serialize};

use crate::config::Strategy;
use crate::marginal::Marginal;

/// Counters describing how an enumeration run ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumerationReport {
    /// Ordering used for the run.
    pub strategy: Strategy,
    /// Budget in force, if any.
    pub max_executions: Option<usize>,
    /// Executions that reached completion, including zero-probability ones.
    pub completed_executions: usize,
    /// Pending branches dropped unresumed when the budget stopped the run.
    pub discarded_states: usize,
    /// Choice points expanded into the frontier.
    pub expansions: usize,
    /// Largest frontier size observed.
    pub max_frontier_len: usize,
    /// True when every branch was resumed; false for a budget-truncated run.
    pub exhausted: bool,
}

/// Output of a finished run.
#[derive(Debug, Clone, PartialEq)]
pub struct Enumeration<V> {
    /// Distribution over return values.
    pub marginal: Marginal<V>,
    /// Run counters.
    pub report: EnumerationReport,
}
