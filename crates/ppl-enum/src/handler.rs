//! Handler delegation: which enumeration receives the decision points of the running code.
//!
//! Every installed handler remembers the handler that was active when it was
//! installed and hands control back to exactly that one when it is restored.
//! Nested runs therefore unwind in stack order at any depth.

use ppl_core::errors::ErrorInfo;
use ppl_core::EnumError;

/// Identifier of an installed handler, unique within one stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FrameId(u64);

impl FrameId {
    /// Returns the raw integer representation of the identifier.
    pub fn as_raw(&self) -> u64 {
        self.0
    }
}

struct Installed<H> {
    id: FrameId,
    parent: Option<FrameId>,
    handler: H,
}

/// Stack of installed handlers; the top entry is the active one.
pub struct HandlerStack<H> {
    frames: Vec<Installed<H>>,
    next_id: u64,
}

impl<H> Default for HandlerStack<H> {
    fn default() -> Self {
        Self {
            frames: Vec::new(),
            next_id: 0,
        }
    }
}

impl<H> HandlerStack<H> {
    /// Creates an empty stack with no active handler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs `handler` as the active one, recording the current occupant as its parent.
    pub fn install(&mut self, handler: H) -> FrameId {
        let id = FrameId(self.next_id);
        self.next_id += 1;
        let parent = self.active();
        self.frames.push(Installed {
            id,
            parent,
            handler,
        });
        id
    }

    /// Identifier of the active handler.
    pub fn active(&self) -> Option<FrameId> {
        self.frames.last().map(|frame| frame.id)
    }

    /// Number of installed handlers.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Mutable access to the active handler.
    pub fn active_mut(&mut self) -> Result<&mut H, EnumError> {
        self.frames
            .last_mut()
            .map(|frame| &mut frame.handler)
            .ok_or_else(|| {
                EnumError::Handler(ErrorInfo::new(
                    "no-active-handler",
                    "decision point reached with no enumeration installed",
                ))
            })
    }

    /// Uninstalls `id`, reactivating the parent captured at install time.
    ///
    /// Only the active handler may be restored. Returns the handler together with
    /// the identifier that is active afterwards.
    pub fn restore(&mut self, id: FrameId) -> Result<(H, Option<FrameId>), EnumError> {
        match self.frames.last() {
            Some(top) if top.id == id => {}
            Some(top) => {
                return Err(EnumError::Handler(
                    ErrorInfo::new("restore-out-of-order", "handler is not the active one")
                        .with_context("requested", id.as_raw().to_string())
                        .with_context("active", top.id.as_raw().to_string()),
                ))
            }
            None => {
                return Err(EnumError::Handler(
                    ErrorInfo::new("restore-empty", "no handler installed")
                        .with_context("requested", id.as_raw().to_string()),
                ))
            }
        }
        let frame = self.frames.pop().ok_or_else(|| {
            EnumError::Handler(ErrorInfo::new("restore-empty", "no handler installed"))
        })?;
        debug_assert_eq!(self.active(), frame.parent);
        Ok((frame.handler, frame.parent))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_installs_restore_their_parent() {
        let mut stack = HandlerStack::new();
        assert!(stack.active().is_none());
        let outer = stack.install("outer");
        let inner = stack.install("inner");
        assert_eq!(stack.active(), Some(inner));
        assert_eq!(*stack.active_mut().unwrap(), "inner");

        let (handler, now_active) = stack.restore(inner).unwrap();
        assert_eq!(handler, "inner");
        assert_eq!(now_active, Some(outer));
        assert_eq!(*stack.active_mut().unwrap(), "outer");

        let (_, now_active) = stack.restore(outer).unwrap();
        assert_eq!(now_active, None);
        assert_eq!(stack.depth(), 0);
    }

    #[test]
    fn restoring_a_buried_handler_fails() {
        let mut stack = HandlerStack::new();
        let outer = stack.install(1);
        stack.install(2);
        let err = stack.restore(outer).unwrap_err();
        assert_eq!(err.info().code, "restore-out-of-order");
        assert_eq!(stack.depth(), 2);
    }

    #[test]
    fn empty_stack_has_no_active_handler() {
        let mut stack: HandlerStack<u8> = HandlerStack::new();
        assert!(matches!(stack.active_mut(), Err(EnumError::Handler(_))));
    }
}
