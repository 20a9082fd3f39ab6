#![deny(missing_docs)]

//! Exhaustive and priority enumeration over the discrete choice points of a
//! program written in continuation-passing form.
//!
//! A program is a function from an environment to a [`Step`]. The engine runs a
//! single dispatch loop: choice points expand the frontier with one branch per
//! support value, weights adjust the running score, and each completed execution
//! folds `exp(score)` into the [`Marginal`] bucket of its return value.

pub mod config;
pub mod engine;
pub mod frontier;
pub mod handler;
pub mod marginal;
pub mod report;
pub mod state;
pub mod step;

pub use config::{EnumerateConfig, Strategy};
pub use engine::{
    enumerate, enumerate_breadth_first, enumerate_depth_first, enumerate_likely_first,
    Enumerator,
};
pub use frontier::{Frontier, PriorityFrontier, QueueFrontier, Scored, StackFrontier};
pub use handler::{FrameId, HandlerStack};
pub use marginal::{Marginal, MarginalBuilder, MarginalEntry};
pub use report::{Enumeration, EnumerationReport};
pub use state::BranchState;
pub use step::{enumerate_nested, exit, factor, sample, sample_with_score, Step};
