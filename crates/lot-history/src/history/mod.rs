//! Undo/Redo History
//!
//! Keeps executed commands on a bounded undo stack and undone commands on
//! a redo stack. History is strictly linear: executing a new command
//! discards everything that could have been redone.

use std::collections::VecDeque;

use crate::command::Command;

/// Default number of entries kept on the undo stack
pub const DEFAULT_MAX_HISTORY: usize = 100;

/// Manages undo and redo stacks of executed commands
pub struct CommandHistory {
    /// Executed commands, oldest at the front
    undo_stack: VecDeque<Box<dyn Command>>,
    /// Undone commands, most recently undone at the back
    redo_stack: Vec<Box<dyn Command>>,
    /// Maximum undo depth; older entries are dropped silently
    max_size: usize,
}

impl Default for CommandHistory {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_HISTORY)
    }
}

impl std::fmt::Debug for CommandHistory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandHistory")
            .field("undo", &self.undo_stack.len())
            .field("redo", &self.redo_stack.len())
            .field("max_size", &self.max_size)
            .finish()
    }
}

impl CommandHistory {
    /// Create a history holding at most `max_size` undoable entries
    pub fn new(max_size: usize) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: Vec::new(),
            max_size: max_size.max(1),
        }
    }

    /// Maximum undo depth
    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Number of undoable entries
    pub fn len(&self) -> usize {
        self.undo_stack.len()
    }

    /// Check if nothing can be undone
    pub fn is_empty(&self) -> bool {
        self.undo_stack.is_empty()
    }

    /// Number of redoable entries
    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }

    /// Check if there is anything to undo
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Check if there is anything to redo
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Description of the command `undo` would revert
    pub fn undo_description(&self) -> Option<&str> {
        self.undo_stack.back().map(|c| c.description())
    }

    /// Description of the command `redo` would re-apply
    pub fn redo_description(&self) -> Option<&str> {
        self.redo_stack.last().map(|c| c.description())
    }

    /// Ledger cost of the command `redo` would re-apply
    pub fn redo_cost(&self) -> Option<f64> {
        self.redo_stack.last().map(|c| c.cost())
    }

    /// Descriptions of undoable entries, oldest first
    pub fn descriptions(&self) -> impl Iterator<Item = &str> {
        self.undo_stack.iter().map(|c| c.description())
    }

    /// Execute a command and record it.
    ///
    /// Returns `false` without touching either stack when the command
    /// refuses to run.
    pub fn execute(&mut self, mut command: Box<dyn Command>) -> bool {
        if !command.execute() {
            tracing::debug!("Command '{}' did not execute", command.description());
            return false;
        }

        tracing::debug!("Executed '{}'", command.description());
        self.redo_stack.clear();
        self.push_undo(command);
        true
    }

    /// Undo the most recent command. Returns `false` if there is none.
    pub fn undo(&mut self) -> bool {
        let Some(mut command) = self.undo_stack.pop_back() else {
            return false;
        };

        command.undo();
        tracing::debug!("Undid '{}'", command.description());
        self.redo_stack.push(command);
        true
    }

    /// Re-execute the most recently undone command.
    ///
    /// A command that fails to re-execute stays on the redo stack.
    pub fn redo(&mut self) -> bool {
        let Some(mut command) = self.redo_stack.pop() else {
            return false;
        };

        if !command.execute() {
            tracing::debug!("Redo of '{}' failed", command.description());
            self.redo_stack.push(command);
            return false;
        }

        tracing::debug!("Redid '{}'", command.description());
        self.push_undo(command);
        true
    }

    /// Drop both stacks
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    fn push_undo(&mut self, command: Box<dyn Command>) {
        self.undo_stack.push_back(command);
        while self.undo_stack.len() > self.max_size {
            if let Some(evicted) = self.undo_stack.pop_front() {
                tracing::debug!("History full, dropping '{}'", evicted.description());
            }
        }
    }
}
