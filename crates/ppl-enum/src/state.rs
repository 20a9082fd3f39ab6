//! Branch states held in the frontier.

use crate::frontier::Scored;
use crate::step::{Resumption, Step};

/// A pending branch: a resumption point, the value to resume it with, its path score
/// and its private environment snapshot.
///
/// Fields are fixed at construction; [`BranchState::resume`] consumes the state.
pub struct BranchState<S, V> {
    resumption: Resumption<S, V>,
    resume_value: V,
    path_score: f64,
    store: S,
}

impl<S, V> BranchState<S, V> {
    /// Captures a branch ready to be enqueued.
    pub fn new(resumption: Resumption<S, V>, resume_value: V, path_score: f64, store: S) -> Self {
        Self {
            resumption,
            resume_value,
            path_score,
            store,
        }
    }

    /// Value the resumption will receive.
    pub fn resume_value(&self) -> &V {
        &self.resume_value
    }

    /// Environment snapshot owned by this branch.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Drives the program forward from this branch until its next decision point.
    pub fn resume(self) -> Step<S, V> {
        (self.resumption)(self.store, self.resume_value)
    }
}

impl<S, V> Scored for BranchState<S, V> {
    fn path_score(&self) -> f64 {
        self.path_score
    }
}
