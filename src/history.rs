//! Undo/redo history over recorded commands.
//!
//! Two stacks, newest at the back:
//!
//! ```text
//! execute(c1..c4)
//!   past:   [c1, c2, c3, c4]
//!   future: []
//!
//! undo() x2
//!   past:   [c1, c2]
//!   future: [c4, c3]
//!
//! execute(c5)          <- new branch, future is discarded
//!   past:   [c1, c2, c5]
//!   future: []
//! ```
//!
//! Invariants:
//! 1. `can_undo() == !past.is_empty()` and `can_redo() == !future.is_empty()`.
//! 2. Executing a new command clears `future`.
//! 3. `past.len() <= max_depth` after every operation (when `max_depth > 0`).
//!
//! Undo and redo on an empty stack are no-ops that return `None`.

#[cfg(test)]
#[path = "history_test.rs"]
mod history_test;

use std::collections::VecDeque;

use crate::command::{Command, CommandKind};
use crate::consts::DEFAULT_HISTORY_DEPTH;
use crate::layout::Layout;

/// Limits for the history stacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryConfig {
    /// Maximum commands kept for undo; the oldest is evicted past this. `0` means unbounded.
    pub max_depth: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self { max_depth: DEFAULT_HISTORY_DEPTH }
    }
}

/// Summary of a command moved by `undo` or `redo`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replayed {
    pub kind: CommandKind,
    pub description: String,
}

impl Replayed {
    fn of(cmd: &Command) -> Self {
        Self { kind: cmd.kind(), description: cmd.description().to_string() }
    }
}

pub struct History {
    past: VecDeque<Command>,
    future: Vec<Command>,
    config: HistoryConfig,
}

impl std::fmt::Debug for History {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("History")
            .field("undo_depth", &self.past.len())
            .field("redo_depth", &self.future.len())
            .field("config", &self.config)
            .finish()
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new(HistoryConfig::default())
    }
}

impl History {
    #[must_use]
    pub fn new(config: HistoryConfig) -> Self {
        Self { past: VecDeque::new(), future: Vec::new(), config }
    }

    // --- Transitions ---

    /// Apply `cmd` to `layout`, push it onto the undo stack, and drop the redo stack.
    pub(crate) fn execute(&mut self, cmd: Command, layout: &mut Layout) {
        cmd.execute(layout);
        tracing::debug!(kind = ?cmd.kind(), description = cmd.description(), "command executed");
        self.future.clear();
        self.past.push_back(cmd);
        self.enforce_depth();
    }

    /// Revert the newest command. `None` when there is nothing to undo.
    pub(crate) fn undo(&mut self, layout: &mut Layout) -> Option<Replayed> {
        let cmd = self.past.pop_back()?;
        cmd.undo(layout);
        tracing::debug!(kind = ?cmd.kind(), description = cmd.description(), "command undone");
        let replayed = Replayed::of(&cmd);
        self.future.push(cmd);
        Some(replayed)
    }

    /// Re-apply the most recently undone command. `None` when there is nothing to redo.
    pub(crate) fn redo(&mut self, layout: &mut Layout) -> Option<Replayed> {
        let cmd = self.future.pop()?;
        cmd.execute(layout);
        tracing::debug!(kind = ?cmd.kind(), description = cmd.description(), "command redone");
        let replayed = Replayed::of(&cmd);
        self.past.push_back(cmd);
        self.enforce_depth();
        Some(replayed)
    }

    /// Forget both stacks without touching the layout.
    pub fn clear(&mut self) {
        self.past.clear();
        self.future.clear();
    }

    // --- Queries ---

    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    #[must_use]
    pub fn undo_depth(&self) -> usize {
        self.past.len()
    }

    #[must_use]
    pub fn redo_depth(&self) -> usize {
        self.future.len()
    }

    /// Description of the command `undo` would revert.
    #[must_use]
    pub fn next_undo_description(&self) -> Option<&str> {
        self.past.back().map(Command::description)
    }

    /// Description of the command `redo` would re-apply.
    #[must_use]
    pub fn next_redo_description(&self) -> Option<&str> {
        self.future.last().map(Command::description)
    }

    /// Undo descriptions, most recent first.
    #[must_use]
    pub fn undo_descriptions(&self, limit: usize) -> Vec<&str> {
        self.past.iter().rev().take(limit).map(Command::description).collect()
    }

    #[must_use]
    pub fn config(&self) -> HistoryConfig {
        self.config
    }

    fn enforce_depth(&mut self) {
        if self.config.max_depth == 0 {
            return;
        }
        while self.past.len() > self.config.max_depth {
            if let Some(evicted) = self.past.pop_front() {
                tracing::debug!(description = evicted.description(), "history depth exceeded, evicting oldest");
            }
        }
    }
}
