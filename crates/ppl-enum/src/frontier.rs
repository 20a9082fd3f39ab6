//! Pending-branch worklists for the three orderings.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, VecDeque};

use ppl_core::errors::ErrorInfo;
use ppl_core::EnumError;

use crate::config::Strategy;

/// Items ranked by the priority frontier.
pub trait Scored {
    /// Cumulative log-probability; higher is removed first.
    fn path_score(&self) -> f64;
}

/// Worklist of pending branches.
pub trait Frontier<T> {
    /// Adds a pending item.
    fn insert(&mut self, item: T);

    /// Removes the next item according to the ordering.
    fn remove_next(&mut self) -> Result<T, EnumError>;

    /// Number of pending items.
    fn len(&self) -> usize;

    /// Returns true when nothing is pending.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops every pending item without handing it out, returning how many were dropped.
    fn discard(&mut self) -> usize;

    /// Ordering label.
    fn strategy(&self) -> Strategy;
}

fn frontier_empty(strategy: Strategy) -> EnumError {
    EnumError::FrontierEmpty(
        ErrorInfo::new("frontier-empty", "remove_next called with no pending branches")
            .with_context("strategy", strategy.as_str()),
    )
}

/// Last in, first out: depth-first traversal.
#[derive(Debug)]
pub struct StackFrontier<T> {
    items: Vec<T>,
}

impl<T> Default for StackFrontier<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T> Frontier<T> for StackFrontier<T> {
    fn insert(&mut self, item: T) {
        self.items.push(item);
    }

    fn remove_next(&mut self) -> Result<T, EnumError> {
        self.items
            .pop()
            .ok_or_else(|| frontier_empty(Strategy::DepthFirst))
    }

    fn len(&self) -> usize {
        self.items.len()
    }

    fn discard(&mut self) -> usize {
        let dropped = self.items.len();
        self.items.clear();
        dropped
    }

    fn strategy(&self) -> Strategy {
        Strategy::DepthFirst
    }
}

/// First in, first out: breadth-first traversal.
#[derive(Debug)]
pub struct QueueFrontier<T> {
    items: VecDeque<T>,
}

impl<T> Default for QueueFrontier<T> {
    fn default() -> Self {
        Self {
            items: VecDeque::new(),
        }
    }
}

impl<T> Frontier<T> for QueueFrontier<T> {
    fn insert(&mut self, item: T) {
        self.items.push_back(item);
    }

    fn remove_next(&mut self) -> Result<T, EnumError> {
        self.items
            .pop_front()
            .ok_or_else(|| frontier_empty(Strategy::BreadthFirst))
    }

    fn len(&self) -> usize {
        self.items.len()
    }

    fn discard(&mut self) -> usize {
        let dropped = self.items.len();
        self.items.clear();
        dropped
    }

    fn strategy(&self) -> Strategy {
        Strategy::BreadthFirst
    }
}

struct Ranked<T> {
    score: f64,
    seq: u64,
    item: T,
}

impl<T> PartialEq for Ranked<T> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<T> Eq for Ranked<T> {}

impl<T> PartialOrd for Ranked<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Ranked<T> {
    // Max-heap on score; equal scores come out in insertion order.
    fn cmp(&self, other: &Self) -> Ordering {
        self.score
            .total_cmp(&other.score)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Highest path score first: most-probable-first traversal.
pub struct PriorityFrontier<T> {
    heap: BinaryHeap<Ranked<T>>,
    next_seq: u64,
}

impl<T> Default for PriorityFrontier<T> {
    fn default() -> Self {
        Self {
            heap: BinaryHeap::new(),
            next_seq: 0,
        }
    }
}

impl<T: Scored> Frontier<T> for PriorityFrontier<T> {
    fn insert(&mut self, item: T) {
        let ranked = Ranked {
            score: item.path_score(),
            seq: self.next_seq,
            item,
        };
        self.next_seq += 1;
        self.heap.push(ranked);
    }

    fn remove_next(&mut self) -> Result<T, EnumError> {
        self.heap
            .pop()
            .map(|ranked| ranked.item)
            .ok_or_else(|| frontier_empty(Strategy::MostProbableFirst))
    }

    fn len(&self) -> usize {
        self.heap.len()
    }

    fn discard(&mut self) -> usize {
        let dropped = self.heap.len();
        self.heap.clear();
        dropped
    }

    fn strategy(&self) -> Strategy {
        Strategy::MostProbableFirst
    }
}

/// Builds the frontier implementing `strategy`.
pub fn frontier_for<T: Scored + 'static>(strategy: Strategy) -> Box<dyn Frontier<T>> {
    match strategy {
        Strategy::MostProbableFirst => Box::<PriorityFrontier<T>>::default(),
        Strategy::BreadthFirst => Box::<QueueFrontier<T>>::default(),
        Strategy::DepthFirst => Box::<StackFrontier<T>>::default(),
    }
}
