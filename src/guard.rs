//! Recursion tracking for the writer.
//!
//! [`CycleGuard`] keeps the stack of containers currently being written. With
//! detection on, entering a node whose [`NodeId`] is already on the stack is
//! either an [`Error::Cycle`] or, with `ignore_recursions`, a [`Visit::Prune`].
//! With detection off nothing is tracked by identity and the only protection
//! is a depth bound.
//!
//! ```rust
//! use serde_uon::guard::{CycleGuard, Visit};
//! use serde_uon::{Arena, Value};
//!
//! let mut arena = Arena::new();
//! let id = arena.alloc(Value::Null);
//!
//! let mut guard = CycleGuard::new(true, false, 100);
//! assert_eq!(guard.check("root", "R1", Some(id)).unwrap(), Visit::Fresh);
//! let err = guard.check("self", "R1", Some(id)).unwrap_err();
//! assert_eq!(err.to_string(), "Recursion detected: [0]root:R1 -> [1]self:R1");
//! ```

use crate::{Config, Error, NodeId, Result};
use std::fmt::Write;

/// Outcome of entering a container.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Visit {
    /// Not on the stack; it has been pushed and must be popped on the way out.
    Fresh,
    /// A recursive edge to be left out. Nothing was pushed.
    Prune,
}

#[derive(Debug)]
struct Frame {
    label: String,
    type_name: String,
    identity: Option<NodeId>,
}

#[derive(Debug)]
pub struct CycleGuard {
    detect: bool,
    ignore: bool,
    max_depth: usize,
    stack: Vec<Frame>,
}

impl CycleGuard {
    #[must_use]
    pub fn new(detect: bool, ignore: bool, max_depth: usize) -> Self {
        CycleGuard {
            detect,
            ignore,
            max_depth,
            stack: Vec::new(),
        }
    }

    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.detect_recursions(),
            config.ignore_recursions(),
            config.max_depth(),
        )
    }

    /// Enters a container reached through `label`.
    ///
    /// `identity` is `Some` only for arena nodes; inline containers cannot
    /// recur and are tracked for the chain and the depth bound only.
    pub fn check(
        &mut self,
        label: &str,
        type_name: &str,
        identity: Option<NodeId>,
    ) -> Result<Visit> {
        if self.detect {
            if let Some(id) = identity {
                if self.stack.iter().any(|f| f.identity == Some(id)) {
                    if self.ignore {
                        tracing::debug!(label, type_name, node = %id, "pruning recursive edge");
                        return Ok(Visit::Prune);
                    }
                    let mut chain = self.chain();
                    if !chain.is_empty() {
                        chain.push_str(" -> ");
                    }
                    let _ = write!(chain, "[{}]{}:{}", self.stack.len(), label, type_name);
                    return Err(Error::Cycle { chain });
                }
            }
        } else if self.stack.len() >= self.max_depth {
            return Err(Error::DepthExceeded {
                depth: self.stack.len() + 1,
                max: self.max_depth,
            });
        }
        self.stack.push(Frame {
            label: label.to_string(),
            type_name: type_name.to_string(),
            identity,
        });
        Ok(Visit::Fresh)
    }

    /// Leaves the most recently entered container.
    pub fn pop(&mut self) {
        self.stack.pop();
    }

    #[must_use]
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// The current stack as `[0]root:Type -> [1]field:Type -> ...`.
    #[must_use]
    pub fn chain(&self) -> String {
        let mut out = String::new();
        for (i, frame) in self.stack.iter().enumerate() {
            if i > 0 {
                out.push_str(" -> ");
            }
            let _ = write!(out, "[{}]{}:{}", i, frame.label, frame.type_name);
        }
        out
    }
}
